//! Members and the lost-item reports they file.

use serde::{Deserialize, Serialize};

use crate::models::item::{LostCategory, LostItem};

/// A registered member who can file reports and receive mail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub id: u64,
    pub name: String,
    pub email: String,
}

/// A lost-item report filed by a member.
///
/// Reports are filed outside this pipeline; here they are only read, matched
/// and eventually marked notified. `notified` flips to `true` at most once,
/// when a notification for the report has been dispatched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberLostItem {
    pub id: u64,
    /// Owning member
    pub member_id: u64,
    /// Category the member filed under
    pub category: LostCategory,
    /// Name of the lost item, e.g. `"검정색 지갑"`
    pub item_name: String,
    /// Optional free-text description
    #[serde(default)]
    pub item_detail: String,
    /// Whether a match notification has been dispatched for this report
    #[serde(default)]
    pub notified: bool,
}

impl MemberLostItem {
    /// Whether a found item answers this report.
    ///
    /// True when the categories are equal, the item is still claimable, no
    /// notification has gone out for it, and the descriptions agree: one
    /// normalized item name contains the other, and when the report carries
    /// a detail text the item's detail contains it.
    pub fn matches(&self, item: &LostItem) -> bool {
        if item.sent || !item.status.is_claimable() || item.category != self.category {
            return false;
        }

        let report_name = normalize(&self.item_name);
        let item_name = normalize(&item.item_name);
        if report_name.is_empty() || item_name.is_empty() {
            return false;
        }
        if !item_name.contains(&report_name) && !report_name.contains(&item_name) {
            return false;
        }

        let report_detail = normalize(&self.item_detail);
        report_detail.is_empty() || normalize(&item.item_detail).contains(&report_detail)
    }
}

/// Collapse whitespace and case so cosmetic differences do not break a match.
fn normalize(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}
