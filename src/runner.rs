//! Runs a batch of items against TMDB.
//!
//! Items are independent, so each one gets its own task; a semaphore caps how
//! many requests are in flight. Handles are awaited in input order, which
//! keeps outputs aligned with inputs and makes the reported failure the
//! lowest-indexed one.

use crate::enrich::enrich;
use crate::error::{NodeError, RunError};
use crate::operation::{ItemParams, Request};
use crate::tmdb::TmdbApi;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};

pub const DEFAULT_CONCURRENCY: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunOptions {
    /// Record failures on the item and keep going instead of aborting.
    pub continue_on_fail: bool,
    pub concurrency: usize,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            continue_on_fail: false,
            concurrency: DEFAULT_CONCURRENCY,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemOutput {
    pub json: Value,
    pub error: Option<String>,
    pub paired_item: usize,
}

/// Parses one item's parameters, fetches the resource and enriches it.
pub async fn execute_item(api: &dyn TmdbApi, params: &Value) -> Result<Value, NodeError> {
    let params = ItemParams::from_value(params)?;
    let request = Request::from_params(&params)?;
    debug!(operation = %request.operation, path = %request.path, "Executing item");
    let body = api.get_json(&request.path_and_query()).await?;
    Ok(enrich(request.operation.resource(), body))
}

pub async fn run_items(
    api: Arc<dyn TmdbApi>,
    items: Vec<Value>,
    options: RunOptions,
) -> Result<Vec<ItemOutput>, RunError> {
    let concurrency = options.concurrency.max(1);
    info!(
        items = items.len(),
        concurrency,
        continue_on_fail = options.continue_on_fail,
        "Processing batch"
    );
    let sem = Arc::new(Semaphore::new(concurrency));

    let handles: Vec<_> = items
        .into_iter()
        .map(|item| {
            let api = api.clone();
            let sem = sem.clone();
            tokio::spawn(async move {
                let _permit = sem.acquire_owned().await.ok();
                let result = execute_item(api.as_ref(), &item).await;
                (item, result)
            })
        })
        .collect();

    let mut outputs = Vec::with_capacity(handles.len());
    let mut pending = handles.into_iter().enumerate();
    while let Some((index, handle)) = pending.next() {
        let (item, result) = match handle.await {
            Ok(done) => done,
            Err(e) => std::panic::resume_unwind(e.into_panic()),
        };
        match result {
            Ok(json) => outputs.push(ItemOutput {
                json,
                error: None,
                paired_item: index,
            }),
            Err(e) if options.continue_on_fail => {
                warn!("Item {} failed, continuing: {}", index, e);
                outputs.push(ItemOutput {
                    json: item,
                    error: Some(e.to_string()),
                    paired_item: index,
                });
            }
            Err(e) => {
                warn!("Item {} failed, aborting batch: {}", index, e);
                for (_, rest) in pending {
                    rest.abort();
                }
                return Err(RunError {
                    item_index: index,
                    source: e,
                });
            }
        }
    }

    info!(items = outputs.len(), "Batch finished");
    Ok(outputs)
}
