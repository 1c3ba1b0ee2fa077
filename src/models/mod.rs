// src/models/mod.rs

//! Domain models for the reconciliation pipeline.
//!
//! This module contains all data structures used throughout the application,
//! organized by their primary purpose.

mod config;
mod feed;
mod item;
mod report;

// Re-export all public types
pub use config::{Config, FeedConfig, MailConfig, ScheduleConfig, StoreConfig};
pub use feed::{FeedPage, RawLostItem};
pub use item::{LostCategory, LostItem, LostStatus};
pub use report::{Member, MemberLostItem};
