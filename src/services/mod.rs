//! Service layer: the outward-facing capabilities of the pipeline.
//!
//! This module contains the clients for external systems:
//! - Feed paging (`FeedClient`)
//! - Notification mail (`HttpMailer`)

mod feed;
mod mail;

pub use feed::{FeedClient, FeedSource};
pub use mail::{HttpMailer, Mailer, MatchMail};
