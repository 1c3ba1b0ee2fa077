//! Found lost-item entity and the feed code enumerations.

use serde::{Deserialize, Serialize};

use crate::models::feed::RawLostItem;

/// Item category, decoded from the feed's `CATE` field.
///
/// The mapping is total: a code outside the known set becomes `Unknown`
/// instead of failing the record, so a new feed code never stalls ingestion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LostCategory {
    Bag,
    Wallet,
    Phone,
    Card,
    Cash,
    Jewelry,
    Clothing,
    Book,
    Electronics,
    Instrument,
    Document,
    Etc,
    Unknown,
}

impl LostCategory {
    /// Decode a feed category code.
    pub fn from_code(code: &str) -> Self {
        match code.trim() {
            "가방" => Self::Bag,
            "지갑" => Self::Wallet,
            "휴대폰" | "핸드폰" => Self::Phone,
            "카드" => Self::Card,
            "현금" => Self::Cash,
            "귀금속" => Self::Jewelry,
            "의류" => Self::Clothing,
            "책" | "도서용품" => Self::Book,
            "전자제품" | "컴퓨터" => Self::Electronics,
            "악기" => Self::Instrument,
            "서류" | "서류봉투" => Self::Document,
            "기타" => Self::Etc,
            _ => Self::Unknown,
        }
    }

    /// Display label, as shown in notification mail.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Bag => "가방",
            Self::Wallet => "지갑",
            Self::Phone => "휴대폰",
            Self::Card => "카드",
            Self::Cash => "현금",
            Self::Jewelry => "귀금속",
            Self::Clothing => "의류",
            Self::Book => "도서용품",
            Self::Electronics => "전자제품",
            Self::Instrument => "악기",
            Self::Document => "서류",
            Self::Etc => "기타",
            Self::Unknown => "미분류",
        }
    }
}

/// Custody status, decoded from the feed's `STATUS` field.
///
/// Total mapping, same policy as [`LostCategory`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LostStatus {
    /// Held at the pickup location and claimable.
    InCustody,
    /// Already returned to its owner.
    Received,
    /// Handed over to another custodian, still claimable there.
    Transferred,
    /// Disposed of after the retention period.
    Disposed,
    Unknown,
}

impl LostStatus {
    /// Decode a feed status code.
    pub fn from_code(code: &str) -> Self {
        match code.trim() {
            "보관중" => Self::InCustody,
            "수령" => Self::Received,
            "이관" => Self::Transferred,
            "폐기" => Self::Disposed,
            _ => Self::Unknown,
        }
    }

    /// Display label, as shown in notification mail.
    pub fn label(&self) -> &'static str {
        match self {
            Self::InCustody => "보관중",
            Self::Received => "수령",
            Self::Transferred => "이관",
            Self::Disposed => "폐기",
            Self::Unknown => "미상",
        }
    }

    /// Whether an item in this status can still be picked up by its owner.
    pub fn is_claimable(&self) -> bool {
        matches!(self, Self::InCustody | Self::Transferred)
    }
}

/// A found item mirrored from the public feed, keyed by the feed identifier.
///
/// Every field except `sent` is owned by the feed and overwritten on each
/// reconciliation pass. `sent` is owned by the notification dispatcher and
/// flips to `true` at most once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LostItem {
    /// Feed identifier, e.g. `"F2024060100123"`
    pub id: String,
    pub category: LostCategory,
    pub status: LostStatus,
    /// Item name, e.g. `"검정색 지갑"`
    pub item_name: String,
    /// Free-text description
    pub item_detail: String,
    /// Where the item was found
    pub take_place: String,
    /// Where the item is held for pickup
    pub take_position: String,
    /// Feed registration date, kept verbatim
    pub reg_date: String,
    /// Date the item was found, kept verbatim
    pub get_date: String,
    /// Whether a match notification has gone out for this item
    #[serde(default)]
    pub sent: bool,
}

impl LostItem {
    /// Blank item for an identifier seen for the first time.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            category: LostCategory::Unknown,
            status: LostStatus::Unknown,
            item_name: String::new(),
            item_detail: String::new(),
            take_place: String::new(),
            take_position: String::new(),
            reg_date: String::new(),
            get_date: String::new(),
            sent: false,
        }
    }

    /// Overwrite every feed-owned field with freshly fetched values.
    ///
    /// `sent` is not feed-owned and is left untouched.
    pub fn apply_feed(&mut self, raw: &RawLostItem, category: LostCategory, status: LostStatus) {
        self.category = category;
        self.status = status;
        self.item_name = raw.item_name.clone().unwrap_or_default();
        self.item_detail = raw.item_detail.clone().unwrap_or_default();
        self.take_place = raw.take_place.clone().unwrap_or_default();
        self.take_position = raw.take_position.clone().unwrap_or_default();
        self.reg_date = raw.reg_date.clone().unwrap_or_default();
        self.get_date = raw.get_date.clone().unwrap_or_default();
    }
}
