//! Live QA log view with an owned refresh loop

use super::fetch_table;
use crate::backend::{Backend, Resource};
use crate::models::{display_timestamp, pretty_json, QaLogEntry};
use crate::render::{Cell, Column, RenderedTable};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info, warn};

/// Columns of the QA log table; the filter matches the prompt column
pub const LOG_COLUMNS: [Column<QaLogEntry>; 6] = [
    Column::new("Time", |l: &QaLogEntry| Cell::text(display_timestamp(l.created_at.as_deref()))),
    Column::new("Agent", |l: &QaLogEntry| Cell::text(l.agent_id.clone().unwrap_or_default())),
    Column::new("Model", |l: &QaLogEntry| Cell::text(l.model.clone().unwrap_or_default())),
    Column::new("Device", |l: &QaLogEntry| Cell::text(l.device.clone().unwrap_or_default())),
    Column::new("Prompt", |l: &QaLogEntry| Cell::text(l.request_summary())),
    Column::new("Response", |l: &QaLogEntry| Cell::detail("show", pretty_json(&l.response_json))),
];

pub const LOG_FILTER_COLUMN: usize = 4;
pub const LOG_DETAIL_COLUMN: usize = 5;

/// Latest outcome of the fetch-and-render cycle
#[derive(Debug, Clone, PartialEq)]
pub enum ViewSnapshot {
    /// Nothing fetched yet
    Loading,
    Ready(RenderedTable),
    /// Fetch failed; shown as plain text in place of the table
    Failed(String),
}

impl ViewSnapshot {
    pub fn table(&self) -> Option<&RenderedTable> {
        match self {
            ViewSnapshot::Ready(table) => Some(table),
            _ => None,
        }
    }
}

/// QA log table that re-polls the backend.
///
/// Each refresh replaces the whole snapshot, so filter text and disclosure
/// state do not survive it. Overlapping refreshes are not serialized: the
/// last one to finish wins.
pub struct LiveLogView {
    backend: Arc<dyn Backend>,
    snapshot: watch::Sender<ViewSnapshot>,
}

impl LiveLogView {
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        let (snapshot, _) = watch::channel(ViewSnapshot::Loading);
        Self { backend, snapshot }
    }

    /// Run one fetch-and-render cycle and publish the result
    pub async fn refresh(&self) -> ViewSnapshot {
        let snapshot = match fetch_table(
            self.backend.as_ref(),
            Resource::QaLogs,
            &LOG_COLUMNS,
            LOG_FILTER_COLUMN,
        )
        .await
        {
            Ok(table) => ViewSnapshot::Ready(table),
            Err(e) => {
                warn!(backend = %self.backend.base_url(), error = %e, "QA log refresh failed");
                ViewSnapshot::Failed(e.to_string())
            }
        };

        self.snapshot.send_replace(snapshot.clone());
        snapshot
    }

    pub fn current(&self) -> ViewSnapshot {
        self.snapshot.borrow().clone()
    }

    /// Receiver notified on every published snapshot
    pub fn subscribe(&self) -> watch::Receiver<ViewSnapshot> {
        self.snapshot.subscribe()
    }

    /// Start the refresh loop. The first cycle runs immediately; the loop
    /// stops when the returned task is stopped or dropped.
    pub fn mount(self: &Arc<Self>, every: Duration) -> RefreshTask {
        let view = Arc::clone(self);
        info!(interval_secs = every.as_secs(), "Mounting live QA log view");

        let handle = tokio::spawn(async move {
            let mut ticker = interval(every);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                debug!("Refreshing QA logs");
                view.refresh().await;
            }
        });

        RefreshTask { handle }
    }
}

/// Handle to a mounted refresh loop
pub struct RefreshTask {
    handle: JoinHandle<()>,
}

impl RefreshTask {
    /// Tear down the loop; an in-flight fetch is abandoned
    pub fn stop(self) {
        self.handle.abort();
    }

    pub fn is_running(&self) -> bool {
        !self.handle.is_finished()
    }
}

impl Drop for RefreshTask {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
