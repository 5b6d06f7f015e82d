// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::future::Future;
use std::io::Write;

use futures_util::StreamExt;
use tracing::{info, warn};

use ds_core::Record;

use super::print_records;
use crate::error::{Error, Result};
use crate::session::SyncSession;
use crate::sync::{Connector, SyncError};

/// Print the current list, then each newly created record until `stop`
/// resolves or the subscription ends.
///
/// The subscription is opened before listing so no creation falls between
/// the two. Undecodable events are reported and skipped.
pub async fn run<R: Record, C: Connector>(
    session: &mut SyncSession<R, C>,
    out: &mut impl Write,
    stop: impl Future<Output = ()>,
) -> Result<()> {
    let mut subscription = session.subscribe().await?;
    session.refresh().await?;
    print_records(out, session.query_view().records())?;
    out.flush()?;

    tokio::pin!(stop);
    let outcome = loop {
        tokio::select! {
            _ = &mut stop => {
                info!("stopping watch");
                break Ok(());
            }
            event = subscription.next() => match event {
                Some(Ok(record)) => {
                    let fragment = record.fragment();
                    if session.apply_event(record) {
                        writeln!(out, "{}", fragment)?;
                        out.flush()?;
                    }
                }
                Some(Err(SyncError::Protocol(message))) => {
                    warn!("skipping event: {}", message);
                    session.record_error(message);
                }
                Some(Err(e)) => {
                    session.record_error(e.to_string());
                    break Err(Error::from(e));
                }
                None => {
                    info!("subscription ended by backend");
                    break Ok(());
                }
            },
        }
    };

    subscription.shutdown().await;
    outcome
}

#[cfg(test)]
#[path = "watch_tests.rs"]
mod tests;
