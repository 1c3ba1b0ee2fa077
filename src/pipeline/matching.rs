// src/pipeline/matching.rs

//! Match scan between member reports and stored found items.

use crate::error::Result;
use crate::models::{LostItem, Member, MemberLostItem};
use crate::store::{LostItemStore, ReportRegistry};

/// One report paired with one found item that answers it.
///
/// Candidates live only inside a single pass; nothing is persisted until the
/// dispatcher commits the flags.
#[derive(Debug, Clone)]
pub struct MatchCandidate {
    pub report: MemberLostItem,
    pub member: Member,
    pub item: LostItem,
}

/// Scan every unnotified report against the store.
///
/// Read-only: flag mutation is the dispatcher's job. The order is stable
/// within one call, reports in identifier order and each report's items in
/// identifier order.
pub async fn find_matches(
    store: &dyn LostItemStore,
    registry: &dyn ReportRegistry,
) -> Result<Vec<MatchCandidate>> {
    let mut candidates = Vec::new();
    for (report, member) in registry.list_unnotified_with_member().await? {
        for item in store.find_matching(&report).await? {
            candidates.push(MatchCandidate {
                report: report.clone(),
                member: member.clone(),
                item,
            });
        }
    }
    if !candidates.is_empty() {
        log::info!("Match scan found {} candidate(s)", candidates.len());
    }
    Ok(candidates)
}
