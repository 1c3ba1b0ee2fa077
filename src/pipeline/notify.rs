// src/pipeline/notify.rs

//! Match notification dispatch.
//!
//! Dispatch order is the duplicate-suppression protocol: flags are committed
//! to the store before the mail goes out. A send failure after the commit is
//! a permanently lost notification for that candidate; a duplicate mail is
//! the one outcome this ordering refuses to risk.

use crate::error::{AppError, Result};
use crate::pipeline::matching::{MatchCandidate, find_matches};
use crate::services::{MatchMail, Mailer};
use crate::store::{LostItemStore, ReportRegistry};

/// Outcome of one notification pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NotifySummary {
    /// Candidates the match scan produced
    pub candidates: usize,
    /// Notifications handed to the mailer
    pub sent: usize,
    /// Candidates dropped because their item was already notified
    pub skipped: usize,
    /// Candidates whose dispatch failed
    pub failed: usize,
}

/// What dispatching a single candidate did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// This call claimed the item and handed the mail to the mailer.
    Sent,
    /// The item's `sent` flag was already set; no mail went out.
    AlreadyNotified,
}

/// Dispatch one candidate.
///
/// The item's `sent` flag is the at-most-once gate: if this call is not the
/// one that flips it, the candidate is dropped without mail. The report flag
/// is best-effort; failing to set it must not block the mail that the gate
/// already committed to.
pub async fn dispatch(
    store: &dyn LostItemStore,
    registry: &dyn ReportRegistry,
    mailer: &dyn Mailer,
    candidate: &MatchCandidate,
) -> Result<DispatchOutcome> {
    if !store.mark_notified(&candidate.item.id).await? {
        log::info!(
            "Lost item {} already notified; skipping report {}",
            candidate.item.id,
            candidate.report.id
        );
        return Ok(DispatchOutcome::AlreadyNotified);
    }

    if let Err(e) = registry.mark_report_notified(candidate.report.id).await {
        log::warn!(
            "Failed to mark report {} notified: {e}",
            candidate.report.id
        );
    }

    let mail = MatchMail::new(&candidate.member, &candidate.item);
    mailer.send(&mail).await?;
    log::info!(
        "Notified {} about lost item {} ({})",
        candidate.member.email,
        candidate.item.id,
        candidate.item.item_name
    );
    Ok(DispatchOutcome::Sent)
}

/// Run one matching and notification pass.
///
/// Candidates are dispatched independently; one failure never blocks the
/// rest of the pass.
pub async fn run_notify(
    store: &dyn LostItemStore,
    registry: &dyn ReportRegistry,
    mailer: &dyn Mailer,
) -> Result<NotifySummary> {
    let candidates = find_matches(store, registry).await?;
    let mut summary = NotifySummary {
        candidates: candidates.len(),
        ..NotifySummary::default()
    };

    for candidate in &candidates {
        match dispatch(store, registry, mailer, candidate).await {
            Ok(DispatchOutcome::Sent) => summary.sent += 1,
            Ok(DispatchOutcome::AlreadyNotified) => summary.skipped += 1,
            Err(AppError::Mail(e)) => {
                summary.failed += 1;
                log::error!(
                    "Notification for report {} / lost item {} permanently lost: {e}",
                    candidate.report.id,
                    candidate.item.id
                );
            }
            Err(e) => {
                summary.failed += 1;
                log::error!(
                    "Dispatch abandoned for report {} / lost item {}: {e}",
                    candidate.report.id,
                    candidate.item.id
                );
            }
        }
    }

    if summary.candidates > 0 {
        log::info!(
            "Notification pass: {} candidate(s), {} sent, {} skipped, {} failed",
            summary.candidates,
            summary.sent,
            summary.skipped,
            summary.failed
        );
    }
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{LostCategory, LostItem, LostStatus, Member, MemberLostItem};
    use crate::store::LocalStore;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use tempfile::TempDir;

    /// Mailer double that records every accepted payload.
    #[derive(Default)]
    struct RecordingMailer {
        sent: Mutex<Vec<MatchMail>>,
    }

    impl RecordingMailer {
        fn recipients(&self) -> Vec<String> {
            self.sent.lock().unwrap().iter().map(|m| m.to.clone()).collect()
        }
    }

    #[async_trait]
    impl Mailer for RecordingMailer {
        async fn send(&self, mail: &MatchMail) -> Result<()> {
            self.sent.lock().unwrap().push(mail.clone());
            Ok(())
        }
    }

    /// Mailer double that rejects one recipient and records the rest.
    struct FlakyMailer {
        reject: String,
        sent: Mutex<Vec<MatchMail>>,
    }

    impl FlakyMailer {
        fn new(reject: &str) -> Self {
            Self {
                reject: reject.to_string(),
                sent: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl Mailer for FlakyMailer {
        async fn send(&self, mail: &MatchMail) -> Result<()> {
            if mail.to == self.reject {
                return Err(AppError::mail("relay rejected the message"));
            }
            self.sent.lock().unwrap().push(mail.clone());
            Ok(())
        }
    }

    /// Registry double whose flag write always fails.
    struct BrokenRegistry;

    #[async_trait]
    impl ReportRegistry for BrokenRegistry {
        async fn list_unnotified_with_member(&self) -> Result<Vec<(MemberLostItem, Member)>> {
            Ok(Vec::new())
        }

        async fn mark_report_notified(&self, _report_id: u64) -> Result<bool> {
            Err(AppError::store("reports file is read-only"))
        }
    }

    /// Store double whose notified-flag write fails for one item.
    struct FailingGateStore {
        inner: LocalStore,
        fail_id: String,
    }

    #[async_trait]
    impl LostItemStore for FailingGateStore {
        async fn find_by_id(&self, id: &str) -> Result<Option<LostItem>> {
            self.inner.find_by_id(id).await
        }

        async fn upsert_all(&self, items: &[LostItem]) -> Result<()> {
            self.inner.upsert_all(items).await
        }

        async fn find_matching(&self, report: &MemberLostItem) -> Result<Vec<LostItem>> {
            self.inner.find_matching(report).await
        }

        async fn mark_notified(&self, id: &str) -> Result<bool> {
            if id == self.fail_id {
                return Err(AppError::store("lost items file is read-only"));
            }
            self.inner.mark_notified(id).await
        }
    }

    fn item(id: &str, name: &str) -> LostItem {
        LostItem {
            id: id.to_string(),
            category: LostCategory::Wallet,
            status: LostStatus::InCustody,
            item_name: name.to_string(),
            item_detail: String::new(),
            take_place: String::new(),
            take_position: String::new(),
            reg_date: String::new(),
            get_date: String::new(),
            sent: false,
        }
    }

    fn member(id: u64) -> Member {
        Member {
            id,
            name: format!("member-{id}"),
            email: format!("m{id}@example.org"),
        }
    }

    fn report(id: u64, member_id: u64, name: &str) -> MemberLostItem {
        MemberLostItem {
            id,
            member_id,
            category: LostCategory::Wallet,
            item_name: name.to_string(),
            item_detail: String::new(),
            notified: false,
        }
    }

    async fn store_with(
        tmp: &TempDir,
        items: &[LostItem],
        reports: Vec<MemberLostItem>,
    ) -> LocalStore {
        let store = LocalStore::new(tmp.path());
        store.upsert_all(items).await.unwrap();
        for r in &reports {
            store.insert_member(member(r.member_id)).await.unwrap();
        }
        for r in reports {
            store.insert_report(r).await.unwrap();
        }
        store
    }

    #[tokio::test]
    async fn dispatch_commits_flags_then_sends() {
        let tmp = TempDir::new().unwrap();
        let store = store_with(&tmp, &[item("F1", "지갑")], vec![report(1, 10, "지갑")]).await;
        let mailer = RecordingMailer::default();

        let candidates = find_matches(&store, &store).await.unwrap();
        let outcome = dispatch(&store, &store, &mailer, &candidates[0])
            .await
            .unwrap();

        assert_eq!(outcome, DispatchOutcome::Sent);
        assert!(store.find_by_id("F1").await.unwrap().unwrap().sent);
        assert_eq!(store.summary().await.unwrap().unnotified_reports, 0);
        assert_eq!(mailer.recipients(), vec!["m10@example.org"]);
    }

    #[tokio::test]
    async fn second_dispatch_for_the_same_item_sends_nothing() {
        let tmp = TempDir::new().unwrap();
        let store = store_with(&tmp, &[item("F1", "지갑")], vec![report(1, 10, "지갑")]).await;
        let mailer = RecordingMailer::default();

        let candidates = find_matches(&store, &store).await.unwrap();
        dispatch(&store, &store, &mailer, &candidates[0])
            .await
            .unwrap();
        let outcome = dispatch(&store, &store, &mailer, &candidates[0])
            .await
            .unwrap();

        assert_eq!(outcome, DispatchOutcome::AlreadyNotified);
        assert_eq!(mailer.recipients().len(), 1);
    }

    #[tokio::test]
    async fn notified_item_disappears_from_later_scans() {
        let tmp = TempDir::new().unwrap();
        let store = store_with(&tmp, &[item("F1", "지갑")], vec![report(1, 10, "지갑")]).await;
        let mailer = RecordingMailer::default();

        run_notify(&store, &store, &mailer).await.unwrap();
        let again = run_notify(&store, &store, &mailer).await.unwrap();

        assert_eq!(again.candidates, 0);
        assert_eq!(mailer.recipients().len(), 1);
    }

    #[tokio::test]
    async fn two_reports_one_item_only_first_gets_mail() {
        let tmp = TempDir::new().unwrap();
        let store = store_with(
            &tmp,
            &[item("F1", "지갑")],
            vec![report(1, 10, "지갑"), report(2, 20, "검정색 지갑")],
        )
        .await;
        let mailer = RecordingMailer::default();

        let summary = run_notify(&store, &store, &mailer).await.unwrap();
        assert_eq!(summary.candidates, 2);
        assert_eq!(summary.sent, 1);
        assert_eq!(summary.skipped, 1);
        assert_eq!(mailer.recipients(), vec!["m10@example.org"]);

        // The losing report stays open for future items.
        assert_eq!(store.summary().await.unwrap().unnotified_reports, 1);
    }

    #[tokio::test]
    async fn one_failing_send_does_not_block_the_rest() {
        let tmp = TempDir::new().unwrap();
        let mut bag = item("F2", "가방");
        bag.category = LostCategory::Bag;
        let mut card = item("F3", "카드");
        card.category = LostCategory::Card;
        let mut bag_report = report(2, 20, "가방");
        bag_report.category = LostCategory::Bag;
        let mut card_report = report(3, 30, "카드");
        card_report.category = LostCategory::Card;

        let store = store_with(
            &tmp,
            &[item("F1", "지갑"), bag, card],
            vec![report(1, 10, "지갑"), bag_report, card_report],
        )
        .await;

        let mailer = FlakyMailer::new("m20@example.org");
        let summary = run_notify(&store, &store, &mailer).await.unwrap();

        assert_eq!(summary.candidates, 3);
        assert_eq!(summary.sent, 2);
        assert_eq!(summary.failed, 1);

        // The gate committed before the failing send, so no retry can
        // duplicate the mail later.
        for id in ["F1", "F2", "F3"] {
            assert!(store.find_by_id(id).await.unwrap().unwrap().sent);
        }
        let again = run_notify(&store, &store, &mailer).await.unwrap();
        assert_eq!(again.candidates, 0);
    }

    #[tokio::test]
    async fn registry_failure_does_not_cancel_the_send() {
        let tmp = TempDir::new().unwrap();
        let store = store_with(&tmp, &[item("F1", "지갑")], Vec::new()).await;
        let mailer = RecordingMailer::default();

        let candidate = MatchCandidate {
            report: report(1, 10, "지갑"),
            member: member(10),
            item: item("F1", "지갑"),
        };
        let outcome = dispatch(&store, &BrokenRegistry, &mailer, &candidate)
            .await
            .unwrap();

        // The gate committed before the report write, so the mail is owed.
        assert_eq!(outcome, DispatchOutcome::Sent);
        assert_eq!(mailer.recipients(), vec!["m10@example.org"]);
        assert!(store.find_by_id("F1").await.unwrap().unwrap().sent);
    }

    #[tokio::test]
    async fn gate_failure_abandons_one_candidate_not_the_pass() {
        let tmp = TempDir::new().unwrap();
        let mut bag = item("F2", "가방");
        bag.category = LostCategory::Bag;
        let mut bag_report = report(2, 20, "가방");
        bag_report.category = LostCategory::Bag;

        let store = store_with(
            &tmp,
            &[item("F1", "지갑"), bag],
            vec![report(1, 10, "지갑"), bag_report],
        )
        .await;
        let gate = FailingGateStore {
            inner: store,
            fail_id: "F1".to_string(),
        };
        let mailer = RecordingMailer::default();

        let summary = run_notify(&gate, &gate.inner, &mailer).await.unwrap();

        assert_eq!(summary.candidates, 2);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.sent, 1);
        assert_eq!(mailer.recipients(), vec!["m20@example.org"]);

        // The abandoned candidate left no flag behind and comes back
        // in the next pass.
        assert!(!gate.find_by_id("F1").await.unwrap().unwrap().sent);
        let again = run_notify(&gate, &gate.inner, &mailer).await.unwrap();
        assert_eq!(again.candidates, 1);
        assert_eq!(again.failed, 1);
    }

    #[tokio::test]
    async fn concurrent_dispatches_send_exactly_one_mail() {
        let tmp = TempDir::new().unwrap();
        let store = store_with(&tmp, &[item("F1", "지갑")], vec![report(1, 10, "지갑")]).await;
        let mailer = RecordingMailer::default();

        let candidates = find_matches(&store, &store).await.unwrap();
        let candidate = &candidates[0];

        let outcomes = tokio::join!(
            dispatch(&store, &store, &mailer, candidate),
            dispatch(&store, &store, &mailer, candidate),
            dispatch(&store, &store, &mailer, candidate),
            dispatch(&store, &store, &mailer, candidate),
        );
        let outcomes = [
            outcomes.0.unwrap(),
            outcomes.1.unwrap(),
            outcomes.2.unwrap(),
            outcomes.3.unwrap(),
        ];

        let sent = outcomes
            .iter()
            .filter(|&&o| o == DispatchOutcome::Sent)
            .count();
        assert_eq!(sent, 1);
        assert_eq!(mailer.recipients().len(), 1);
        assert!(store.find_by_id("F1").await.unwrap().unwrap().sent);
    }
}
