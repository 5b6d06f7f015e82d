// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! ds-core: Shared library for the datasync client
//!
//! This crate provides the record types, GraphQL documents, wire protocol
//! and rendering used by both the datasync client and the development
//! backend.

pub mod document;
pub mod error;
pub mod protocol;
pub mod record;
pub mod render;
pub mod text;
pub mod validate;

pub use document::{Operation, OperationKind};
pub use error::{Error, Result};
pub use protocol::{ClientMessage, ExecutionResult, GraphqlError, ServerMessage, SUBPROTOCOL};
pub use record::{Record, RecordFields, RecordId, RecordKind, Talk, TalkFields, Todo, TodoFields};
pub use render::{render, Fragment};
pub use text::UntrustedText;
