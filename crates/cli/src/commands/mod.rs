// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

pub mod create;
pub mod list;
pub mod watch;

use std::io::Write;

use ds_core::Record;

use crate::error::Result;

/// Print one fragment per line.
pub(crate) fn print_records<R: Record>(out: &mut impl Write, records: &[R]) -> Result<()> {
    for record in records {
        writeln!(out, "{}", record.fragment())?;
    }
    Ok(())
}
