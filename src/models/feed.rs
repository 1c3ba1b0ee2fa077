//! Wire types for the public lost-item feed.
//!
//! The feed serves JSON pages addressed by a 1-based inclusive index range.
//! Row keys are upper-case and every value arrives as a string, including
//! the total record count.

use serde::{Deserialize, Deserializer, Serialize};

/// One page of the feed, after envelope unwrapping.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedPage {
    /// Total record count the feed reports. Arrives as an int-as-string
    /// (`"1234"`); a bare number is tolerated too.
    #[serde(
        rename = "list_total_count",
        deserialize_with = "count_from_string_or_int"
    )]
    pub total_count: u32,

    /// Raw records in feed order.
    #[serde(rename = "row", default)]
    pub rows: Vec<RawLostItem>,
}

/// One feed record, exactly as served.
///
/// Every field is optional at the wire level; which ones a usable record
/// must carry is decided during mapping, not here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawLostItem {
    #[serde(rename = "ID", default)]
    pub id: Option<String>,

    /// Custody status code, e.g. `"보관중"`
    #[serde(rename = "STATUS", default)]
    pub status: Option<String>,

    /// Category code, e.g. `"지갑"`
    #[serde(rename = "CATE", default)]
    pub category: Option<String>,

    #[serde(rename = "GET_NAME", default)]
    pub item_name: Option<String>,

    #[serde(rename = "GET_THING", default)]
    pub item_detail: Option<String>,

    #[serde(rename = "TAKE_PLACE", default)]
    pub take_place: Option<String>,

    #[serde(rename = "GET_POSITION", default)]
    pub take_position: Option<String>,

    #[serde(rename = "REG_DATE", default)]
    pub reg_date: Option<String>,

    #[serde(rename = "GET_DATE", default)]
    pub get_date: Option<String>,
}

fn count_from_string_or_int<'de, D>(deserializer: D) -> std::result::Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(u64),
        Text(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Number(n) => {
            u32::try_from(n).map_err(|_| serde::de::Error::custom("list_total_count out of range"))
        }
        Raw::Text(s) => s.trim().parse::<u32>().map_err(|_| {
            serde::de::Error::custom(format!("list_total_count is not a number: {s:?}"))
        }),
    }
}
