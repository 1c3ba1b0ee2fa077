//! Local filesystem store.
//!
//! One JSON file per collection under a data directory, each wrapped in a
//! [`StoredFile`] envelope and replaced atomically (write to temp, then
//! rename). A write lock serializes every read-modify-write cycle, so the
//! two periodic passes can share one store without clobbering each other.
//!
//! ## Layout
//!
//! ```text
//! {root}/
//! ├── lost_items.json   # Found items mirrored from the feed
//! ├── members.json      # Registered members
//! └── reports.json      # Member-filed lost-item reports
//! ```

use std::collections::BTreeMap;
use std::path::PathBuf;

use async_trait::async_trait;
use serde::{Serialize, de::DeserializeOwned};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use crate::error::{AppError, Result};
use crate::models::{LostItem, Member, MemberLostItem};
use crate::store::{LostItemStore, ReportRegistry, StoredFile};

const ITEMS_FILE: &str = "lost_items.json";
const MEMBERS_FILE: &str = "members.json";
const REPORTS_FILE: &str = "reports.json";

/// Collection counts for the status report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreSummary {
    pub lost_items: usize,
    pub sent_items: usize,
    pub members: usize,
    pub reports: usize,
    pub unnotified_reports: usize,
}

/// Filesystem-backed implementation of both storage seams.
pub struct LocalStore {
    root_dir: PathBuf,
    write_lock: Mutex<()>,
}

impl LocalStore {
    /// Create a new LocalStore rooted at the given directory.
    pub fn new(root_dir: impl Into<PathBuf>) -> Self {
        Self {
            root_dir: root_dir.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Get the full path for a relative key.
    fn path(&self, key: &str) -> PathBuf {
        self.root_dir.join(key)
    }

    /// Ensure parent directory exists.
    async fn ensure_dir(&self, path: &PathBuf) -> Result<()> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        Ok(())
    }

    /// Write bytes atomically (write to temp, then rename).
    async fn write_bytes(&self, key: &str, bytes: &[u8]) -> Result<()> {
        let path = self.path(key);
        self.ensure_dir(&path).await?;

        let tmp = path.with_extension("tmp");
        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(bytes).await?;
        file.flush().await?;
        drop(file);

        tokio::fs::rename(&tmp, &path).await?;
        Ok(())
    }

    /// Write JSON data.
    async fn write_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<()> {
        let bytes = serde_json::to_vec_pretty(value)?;
        self.write_bytes(key, &bytes).await
    }

    /// Read bytes, returning None if file doesn't exist.
    async fn read_bytes(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let path = self.path(key);
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AppError::Io(e)),
        }
    }

    /// Read JSON data.
    async fn read_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match self.read_bytes(key).await? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    async fn load_items(&self) -> Result<BTreeMap<String, LostItem>> {
        let file = self.read_json::<StoredFile<LostItem>>(ITEMS_FILE).await?;
        Ok(file
            .map(|f| f.entries.into_iter().map(|i| (i.id.clone(), i)).collect())
            .unwrap_or_default())
    }

    async fn save_items(&self, items: &BTreeMap<String, LostItem>) -> Result<()> {
        let file = StoredFile::new(items.values().cloned().collect());
        self.write_json(ITEMS_FILE, &file).await
    }

    async fn load_members(&self) -> Result<BTreeMap<u64, Member>> {
        let file = self.read_json::<StoredFile<Member>>(MEMBERS_FILE).await?;
        Ok(file
            .map(|f| f.entries.into_iter().map(|m| (m.id, m)).collect())
            .unwrap_or_default())
    }

    async fn save_members(&self, members: &BTreeMap<u64, Member>) -> Result<()> {
        let file = StoredFile::new(members.values().cloned().collect());
        self.write_json(MEMBERS_FILE, &file).await
    }

    async fn load_reports(&self) -> Result<BTreeMap<u64, MemberLostItem>> {
        let file = self
            .read_json::<StoredFile<MemberLostItem>>(REPORTS_FILE)
            .await?;
        Ok(file
            .map(|f| f.entries.into_iter().map(|r| (r.id, r)).collect())
            .unwrap_or_default())
    }

    async fn save_reports(&self, reports: &BTreeMap<u64, MemberLostItem>) -> Result<()> {
        let file = StoredFile::new(reports.values().cloned().collect());
        self.write_json(REPORTS_FILE, &file).await
    }

    /// Insert or replace a member.
    pub async fn insert_member(&self, member: Member) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let mut members = self.load_members().await?;
        members.insert(member.id, member);
        self.save_members(&members).await
    }

    /// Insert or replace a report.
    pub async fn insert_report(&self, report: MemberLostItem) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let mut reports = self.load_reports().await?;
        reports.insert(report.id, report);
        self.save_reports(&reports).await
    }

    /// Count every collection.
    pub async fn summary(&self) -> Result<StoreSummary> {
        let items = self.load_items().await?;
        let members = self.load_members().await?;
        let reports = self.load_reports().await?;
        Ok(StoreSummary {
            lost_items: items.len(),
            sent_items: items.values().filter(|i| i.sent).count(),
            members: members.len(),
            reports: reports.len(),
            unnotified_reports: reports.values().filter(|r| !r.notified).count(),
        })
    }
}

#[async_trait]
impl LostItemStore for LocalStore {
    async fn find_by_id(&self, id: &str) -> Result<Option<LostItem>> {
        Ok(self.load_items().await?.get(id).cloned())
    }

    async fn upsert_all(&self, items: &[LostItem]) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let mut stored = self.load_items().await?;
        for item in items {
            let mut next = item.clone();
            if let Some(existing) = stored.get(&next.id) {
                next.sent = existing.sent || next.sent;
            }
            stored.insert(next.id.clone(), next);
        }
        self.save_items(&stored).await
    }

    async fn find_matching(&self, report: &MemberLostItem) -> Result<Vec<LostItem>> {
        let items = self.load_items().await?;
        Ok(items
            .values()
            .filter(|item| report.matches(item))
            .cloned()
            .collect())
    }

    async fn mark_notified(&self, id: &str) -> Result<bool> {
        let _guard = self.write_lock.lock().await;
        let mut items = self.load_items().await?;
        let item = items
            .get_mut(id)
            .ok_or_else(|| AppError::store(format!("no lost item with id {id}")))?;
        if item.sent {
            return Ok(false);
        }
        item.sent = true;
        self.save_items(&items).await?;
        Ok(true)
    }
}

#[async_trait]
impl ReportRegistry for LocalStore {
    async fn list_unnotified_with_member(&self) -> Result<Vec<(MemberLostItem, Member)>> {
        let reports = self.load_reports().await?;
        let members = self.load_members().await?;

        let mut joined = Vec::new();
        for report in reports.values().filter(|r| !r.notified) {
            match members.get(&report.member_id) {
                Some(member) => joined.push((report.clone(), member.clone())),
                None => log::warn!(
                    "Report {} references missing member {}; skipping",
                    report.id,
                    report.member_id
                ),
            }
        }
        Ok(joined)
    }

    async fn mark_report_notified(&self, report_id: u64) -> Result<bool> {
        let _guard = self.write_lock.lock().await;
        let mut reports = self.load_reports().await?;
        let report = reports
            .get_mut(&report_id)
            .ok_or_else(|| AppError::store(format!("no report with id {report_id}")))?;
        if report.notified {
            return Ok(false);
        }
        report.notified = true;
        self.save_reports(&reports).await?;
        Ok(true)
    }
}
