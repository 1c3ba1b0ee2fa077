//! Storage abstractions for lost items, members and reports.
//!
//! Two seams cover everything the passes need:
//! - [`LostItemStore`]: the canonical set of found items from the feed
//! - [`ReportRegistry`]: member-filed reports and their owners
//!
//! [`LocalStore`] implements both on the local filesystem.

mod local;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::models::{LostItem, Member, MemberLostItem};

pub use local::{LocalStore, StoreSummary};

/// Canonical set of found lost items, keyed by the feed identifier.
#[async_trait]
pub trait LostItemStore: Send + Sync {
    /// Look up one item by its feed identifier.
    async fn find_by_id(&self, id: &str) -> Result<Option<LostItem>>;

    /// Insert or replace every item in one batch, with no partial
    /// application. Content fields are last-write-wins; a `sent` flag
    /// already set in the store survives the replace.
    async fn upsert_all(&self, items: &[LostItem]) -> Result<()>;

    /// Items answering a report, in stable identifier order.
    async fn find_matching(&self, report: &MemberLostItem) -> Result<Vec<LostItem>>;

    /// Conditionally flip the item's `sent` flag: set it if and only if it
    /// is still unset, and return whether this call was the one that set it.
    /// Unknown identifiers are an error.
    async fn mark_notified(&self, id: &str) -> Result<bool>;
}

/// Member-filed lost-item reports joined with their owners.
#[async_trait]
pub trait ReportRegistry: Send + Sync {
    /// Reports not yet notified, each with its owning member, in stable
    /// identifier order.
    async fn list_unnotified_with_member(&self) -> Result<Vec<(MemberLostItem, Member)>>;

    /// Conditionally flip the report's `notified` flag, returning whether
    /// this call was the one that set it. Unknown identifiers are an error.
    async fn mark_report_notified(&self, report_id: u64) -> Result<bool>;
}

/// Envelope written around every stored collection file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredFile<T> {
    pub updated_at: DateTime<Utc>,
    pub count: usize,
    pub entries: Vec<T>,
}

impl<T> StoredFile<T> {
    pub fn new(entries: Vec<T>) -> Self {
        Self {
            updated_at: Utc::now(),
            count: entries.len(),
            entries,
        }
    }
}
