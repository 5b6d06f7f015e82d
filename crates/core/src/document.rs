// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! GraphQL documents for the three supported operations.
//!
//! For a record kind `Todo` these are `ListTodos`, `CreateTodo` and
//! `OnCreateTodo`, selecting the fields listed by
//! [`RecordKind::selection`].

use serde::Serialize;
use serde_json::{json, Value};

use crate::error::Result;
use crate::record::RecordKind;

/// The GraphQL operation type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationKind {
    Query,
    Mutation,
    Subscription,
}

impl OperationKind {
    pub fn keyword(self) -> &'static str {
        match self {
            OperationKind::Query => "query",
            OperationKind::Mutation => "mutation",
            OperationKind::Subscription => "subscription",
        }
    }
}

/// A ready-to-send GraphQL operation.
#[derive(Debug, Clone, PartialEq)]
pub struct Operation {
    pub kind: OperationKind,
    pub record_kind: RecordKind,
    /// Operation name, e.g. `ListTodos`.
    pub name: String,
    /// Root field of the response data, e.g. `listTodos`.
    pub root_field: String,
    pub document: String,
    pub variables: Option<Value>,
}

impl Operation {
    /// `query ListTodos { listTodos { items { ... } } }`
    pub fn list(record_kind: RecordKind) -> Self {
        let name = format!("List{}s", record_kind.type_name());
        let root_field = lower_first(&name);
        let document = format!(
            "query {name} {{ {root_field} {{ items {{ {} }} }} }}",
            selection(record_kind)
        );
        Operation {
            kind: OperationKind::Query,
            record_kind,
            name,
            root_field,
            document,
            variables: None,
        }
    }

    /// `mutation CreateTodo($input: CreateTodoInput!) { createTodo(input: $input) { ... } }`
    pub fn create<F: Serialize>(record_kind: RecordKind, fields: &F) -> Result<Self> {
        let name = format!("Create{}", record_kind.type_name());
        let root_field = lower_first(&name);
        let document = format!(
            "mutation {name}($input: {name}Input!) {{ {root_field}(input: $input) {{ {} }} }}",
            selection(record_kind)
        );
        let input = serde_json::to_value(fields)?;
        Ok(Operation {
            kind: OperationKind::Mutation,
            record_kind,
            name,
            root_field,
            document,
            variables: Some(json!({ "input": input })),
        })
    }

    /// `subscription OnCreateTodo { onCreateTodo { ... } }`
    pub fn on_create(record_kind: RecordKind) -> Self {
        let name = format!("OnCreate{}", record_kind.type_name());
        let root_field = lower_first(&name);
        let document = format!(
            "subscription {name} {{ {root_field} {{ {} }} }}",
            selection(record_kind)
        );
        Operation {
            kind: OperationKind::Subscription,
            record_kind,
            name,
            root_field,
            document,
            variables: None,
        }
    }

    /// Maps an operation name produced by this module back to its kinds.
    pub fn resolve(operation_name: &str) -> Option<(OperationKind, RecordKind)> {
        RecordKind::ALL.into_iter().find_map(|record_kind| {
            let type_name = record_kind.type_name();
            match operation_name.strip_suffix(type_name) {
                Some("OnCreate") => Some((OperationKind::Subscription, record_kind)),
                Some("Create") => Some((OperationKind::Mutation, record_kind)),
                _ if operation_name
                    .strip_suffix('s')
                    .and_then(|s| s.strip_prefix("List"))
                    == Some(type_name) =>
                {
                    Some((OperationKind::Query, record_kind))
                }
                _ => None,
            }
        })
    }

    /// Root field for an operation on the given kinds.
    pub fn root_field_for(kind: OperationKind, record_kind: RecordKind) -> String {
        let type_name = record_kind.type_name();
        match kind {
            OperationKind::Query => format!("list{type_name}s"),
            OperationKind::Mutation => format!("create{type_name}"),
            OperationKind::Subscription => format!("onCreate{type_name}"),
        }
    }
}

fn selection(record_kind: RecordKind) -> String {
    record_kind.selection().join(" ")
}

fn lower_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_ascii_lowercase().to_string() + chars.as_str(),
        None => String::new(),
    }
}

#[cfg(test)]
#[path = "document_tests.rs"]
mod tests;
