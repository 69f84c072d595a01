//! Table of submitted sankalpas

use super::fetch_table;
use crate::backend::{Backend, RelayError, Resource};
use crate::models::{display_timestamp, Intention};
use crate::render::{Cell, Column, RenderedTable};
use std::sync::Arc;

/// Columns of the intentions table; the filter matches the text column
pub const INTENTION_COLUMNS: [Column<Intention>; 5] = [
    Column::new("ID", |i: &Intention| Cell::text(i.short_id())),
    Column::new("Sankalpa", |i: &Intention| Cell::text(i.text.clone().unwrap_or_default())),
    Column::new("Context", |i: &Intention| Cell::text(i.context.clone().unwrap_or_default())),
    Column::new("Status", |i: &Intention| Cell::text(i.status.clone().unwrap_or_default())),
    Column::new("Created", |i: &Intention| Cell::text(display_timestamp(i.created_at.as_deref()))),
];

pub const INTENTION_FILTER_COLUMN: usize = 1;

/// One-shot view of `GET /sankalpa`, rendered per page load
pub struct IntentionsView {
    backend: Arc<dyn Backend>,
}

impl IntentionsView {
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self { backend }
    }

    /// Fetch and render, with `filter` pre-applied
    pub async fn load(&self, filter: &str) -> Result<RenderedTable, RelayError> {
        let mut table = fetch_table(
            self.backend.as_ref(),
            Resource::Sankalpa,
            &INTENTION_COLUMNS,
            INTENTION_FILTER_COLUMN,
        )
        .await?;
        table.apply_filter(filter);
        Ok(table)
    }
}
