// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::io::Write;

use ds_core::Record;

use super::print_records;
use crate::error::Result;
use crate::session::SyncSession;
use crate::sync::Connector;

pub async fn run<R: Record, C: Connector>(
    session: &mut SyncSession<R, C>,
    out: &mut impl Write,
) -> Result<()> {
    session.refresh().await?;
    print_records(out, session.query_view().records())
}

#[cfg(test)]
#[path = "list_tests.rs"]
mod tests;
