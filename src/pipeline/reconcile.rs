// src/pipeline/reconcile.rs

//! Feed reconciliation pass.
//!
//! One pass probes the feed for its total record count, fetches the trailing
//! window, maps each raw record onto the stored item with the same
//! identifier and upserts the whole batch at once. Running a pass twice
//! against an unchanged feed leaves the store unchanged.

use crate::error::{AppError, Result};
use crate::models::{LostCategory, LostItem, LostStatus, RawLostItem};
use crate::services::FeedSource;
use crate::store::LostItemStore;

/// Outcome of one reconciliation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileSummary {
    /// Total record count the feed reported
    pub feed_total: u32,
    /// Index range actually fetched, if any
    pub range: Option<(u32, u32)>,
    /// Records the fetched page carried
    pub fetched: usize,
    /// Records dropped as unusable
    pub skipped: usize,
    /// Items written to the store
    pub upserted: usize,
}

/// Tail index range for a feed reporting `total` records.
///
/// The feed appends new records at the end, so the trailing `window` indices
/// hold everything new since the previous pass. The start never goes below
/// index 1; an empty feed yields no range at all.
pub fn tail_range(total: u32, window: u32) -> Option<(u32, u32)> {
    if total == 0 {
        return None;
    }
    Some((total.saturating_sub(window).max(1), total))
}

/// Run one reconciliation pass.
///
/// A feed or store failure aborts the pass with nothing written; the next
/// scheduled pass starts from scratch. Individual unusable records are
/// logged and skipped without failing the batch.
pub async fn run_reconcile(
    feed: &dyn FeedSource,
    store: &dyn LostItemStore,
    window: u32,
) -> Result<ReconcileSummary> {
    let probe = feed.fetch_page(1, 1).await?;
    let total = probe.total_count;

    let Some((start, end)) = tail_range(total, window) else {
        log::info!("Feed reports no records; nothing to reconcile");
        return Ok(ReconcileSummary::default());
    };

    let page = feed.fetch_page(start, end).await?;
    log::info!(
        "Fetched {} record(s) for range {}/{} (feed total {})",
        page.rows.len(),
        start,
        end,
        total
    );

    let mut summary = ReconcileSummary {
        feed_total: total,
        range: Some((start, end)),
        fetched: page.rows.len(),
        ..ReconcileSummary::default()
    };

    let mut batch: Vec<LostItem> = Vec::with_capacity(page.rows.len());
    for raw in &page.rows {
        match merge_record(raw, store).await {
            Ok(item) => batch.push(item),
            Err(AppError::Record { id, message }) => {
                log::warn!("Skipping feed record {id}: {message}");
                summary.skipped += 1;
            }
            Err(e) => return Err(e),
        }
    }

    store.upsert_all(&batch).await?;
    summary.upserted = batch.len();
    log::info!(
        "Upserted {} lost item(s), skipped {}",
        summary.upserted,
        summary.skipped
    );
    Ok(summary)
}

/// Map one raw record onto its stored item, or onto a blank one when the
/// identifier has never been seen.
async fn merge_record(raw: &RawLostItem, store: &dyn LostItemStore) -> Result<LostItem> {
    let id = raw
        .id
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AppError::record(None, "missing ID"))?;
    let status_code = raw
        .status
        .as_deref()
        .ok_or_else(|| AppError::record(Some(id), "missing STATUS code"))?;
    let category_code = raw
        .category
        .as_deref()
        .ok_or_else(|| AppError::record(Some(id), "missing CATE code"))?;

    let category = LostCategory::from_code(category_code);
    let status = LostStatus::from_code(status_code);

    let mut item = store
        .find_by_id(id)
        .await?
        .unwrap_or_else(|| LostItem::new(id));
    item.apply_feed(raw, category, status);
    Ok(item)
}
