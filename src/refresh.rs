//! Periodic poll-parse-build-publish loop.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::bird::{DaemonClient, SHOW_PROTOCOLS_ALL, SHOW_STATUS, parse_protocols, parse_status};
use crate::error::Result;
use crate::mib;
use crate::snapshot::{Snapshot, SnapshotCell};

/// Whether a refresh cycle is in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RefreshState {
    #[default]
    Idle,
    Refreshing,
}

/// Poll the daemon once and build a snapshot from its replies.
///
/// The two commands are sent one after the other on the same connection.
/// Any communication or parse failure is returned as is.
pub async fn collect_snapshot<D: DaemonClient>(client: &mut D) -> Result<Snapshot> {
    let status_text = client.request(SHOW_STATUS).await?;
    let protocols_text = client.request(SHOW_PROTOCOLS_ALL).await?;

    let status = parse_status(&status_text);
    let sessions = parse_protocols(&protocols_text)?;
    Ok(mib::build_snapshot(&status, &sessions, Utc::now()))
}

/// Owns the daemon client and keeps the [`SnapshotCell`] current.
///
/// `refresh` takes `&mut self`, so cycles of one refresher never overlap.
#[derive(Debug)]
pub struct Refresher<D> {
    client: D,
    cell: Arc<SnapshotCell>,
    state: RefreshState,
}

impl<D: DaemonClient> Refresher<D> {
    /// Build the initial snapshot and the cell holding it.
    ///
    /// # Errors
    ///
    /// Fails if the first poll fails; there is nothing to serve without it.
    pub async fn start(mut client: D) -> Result<Self> {
        let initial = collect_snapshot(&mut client).await?;
        tracing::info!(
            bird.entries = initial.store.len(),
            "initial snapshot built"
        );
        Ok(Self::with_cell(client, Arc::new(SnapshotCell::new(initial))))
    }

    /// Refresh into an existing cell.
    pub fn with_cell(client: D, cell: Arc<SnapshotCell>) -> Self {
        Self {
            client,
            cell,
            state: RefreshState::Idle,
        }
    }

    /// The cell this refresher publishes into.
    pub fn cell(&self) -> &Arc<SnapshotCell> {
        &self.cell
    }

    pub fn state(&self) -> RefreshState {
        self.state
    }

    /// Run one cycle.
    ///
    /// On success the new snapshot is published. On failure the error is
    /// logged and returned, and the previous snapshot stays current.
    pub async fn refresh(&mut self) -> Result<()> {
        self.state = RefreshState::Refreshing;
        let result = collect_snapshot(&mut self.client).await;
        self.state = RefreshState::Idle;

        match result {
            Ok(snapshot) => {
                let entries = snapshot.store.len();
                let previous = self.cell.publish(snapshot);
                tracing::debug!(
                    bird.entries = entries,
                    bird.previous_age_ms = (Utc::now() - previous.built_at).num_milliseconds(),
                    "published snapshot"
                );
                Ok(())
            }
            Err(e) => {
                if e.is_daemon_communication() {
                    tracing::warn!(error = %e, "refresh failed, keeping previous snapshot");
                } else {
                    tracing::error!(error = %e, "refresh failed, keeping previous snapshot");
                }
                Err(e)
            }
        }
    }

    /// Refresh every `interval` until `cancel` fires.
    ///
    /// The first refresh happens one interval after the call, since
    /// [`start`](Self::start) already built a snapshot. Ticks missed while a
    /// slow cycle runs are delayed, not replayed in a burst.
    pub async fn run(mut self, interval: Duration, cancel: CancellationToken) {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => {
                    // failures are already logged; the next tick retries
                    let _ = self.refresh().await;
                }
            }
        }
        tracing::debug!("refresh loop stopped");
    }
}
