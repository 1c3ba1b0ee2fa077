//! Pipeline entry points for the periodic passes.
//!
//! - `run_reconcile`: Pull the feed tail and upsert it into the store
//! - `run_notify`: Match open reports against the store and send mail
//! - `run_scheduler`: Drive both passes on their configured intervals

pub mod matching;
pub mod notify;
pub mod reconcile;
pub mod scheduler;

pub use matching::{MatchCandidate, find_matches};
pub use notify::{DispatchOutcome, NotifySummary, dispatch, run_notify};
pub use reconcile::{ReconcileSummary, run_reconcile, tail_range};
pub use scheduler::run_scheduler;
