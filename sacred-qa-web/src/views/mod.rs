//! Fetch-and-render views over upstream collections

pub mod intentions;
pub mod logs;

pub use intentions::IntentionsView;
pub use logs::{LiveLogView, RefreshTask, ViewSnapshot};

use crate::backend::{decode_error, Backend, RelayError, Resource};
use crate::render::{render, Column, RenderedTable};
use serde::de::DeserializeOwned;
use tracing::debug;

/// Fetch `resource`, decode every record as `T`, and render the table.
///
/// A record that does not decode fails the whole fetch so the view never
/// shows a partial table.
pub async fn fetch_table<T: DeserializeOwned>(
    backend: &dyn Backend,
    resource: Resource,
    columns: &[Column<T>],
    filter_column: usize,
) -> Result<RenderedTable, RelayError> {
    let values = backend.fetch_collection(resource).await?;

    let records = values
        .into_iter()
        .enumerate()
        .map(|(idx, value)| {
            serde_json::from_value::<T>(value).map_err(|e| {
                decode_error(
                    resource,
                    format!("{} record {} is malformed: {}", resource, idx, e),
                )
            })
        })
        .collect::<Result<Vec<T>, _>>()?;

    debug!(resource = %resource, records = records.len(), "Rendered collection");
    Ok(render(&records, columns, filter_column))
}
