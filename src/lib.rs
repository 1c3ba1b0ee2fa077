// src/lib.rs

//! refound: lost-and-found feed reconciliation and match notification.

pub mod error;
pub mod models;
pub mod pipeline;
pub mod services;
pub mod store;
pub mod utils;
