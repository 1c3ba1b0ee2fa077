// src/services/mail.rs

//! Match notification mail.

use async_trait::async_trait;
use serde::Serialize;

use crate::error::{AppError, Result};
use crate::models::{LostItem, MailConfig, Member};
use crate::utils::http::create_async_client;

/// Payload of one match notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchMail {
    /// Recipient address
    pub to: String,
    pub category: String,
    pub status: String,
    pub item_name: String,
    pub item_detail: String,
    /// Where the item can be picked up
    pub take_position: String,
}

impl MatchMail {
    /// Assemble the notification for a member and the item found for them.
    pub fn new(member: &Member, item: &LostItem) -> Self {
        Self {
            to: member.email.clone(),
            category: item.category.label().to_string(),
            status: item.status.label().to_string(),
            item_name: item.item_name.clone(),
            item_detail: item.item_detail.clone(),
            take_position: item.take_position.clone(),
        }
    }
}

/// Email sending capability. One shot per call: success or failure, no retry.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, mail: &MatchMail) -> Result<()>;
}

/// Mailer backed by an HTTP relay that accepts the payload as JSON.
pub struct HttpMailer {
    endpoint_url: String,
    from: String,
    client: reqwest::Client,
}

impl HttpMailer {
    pub fn new(config: &MailConfig) -> Result<Self> {
        let user_agent = concat!("refound/", env!("CARGO_PKG_VERSION"));
        Ok(Self {
            endpoint_url: config.endpoint_url.clone(),
            from: config.from.clone(),
            client: create_async_client(user_agent, config.timeout_secs)?,
        })
    }
}

#[derive(Serialize)]
struct RelayPayload<'a> {
    from: &'a str,
    #[serde(flatten)]
    mail: &'a MatchMail,
}

#[async_trait]
impl Mailer for HttpMailer {
    async fn send(&self, mail: &MatchMail) -> Result<()> {
        let payload = RelayPayload {
            from: &self.from,
            mail,
        };
        self.client
            .post(&self.endpoint_url)
            .json(&payload)
            .send()
            .await
            .map_err(AppError::mail)?
            .error_for_status()
            .map_err(AppError::mail)?;
        log::debug!("Mail relay accepted notification for {}", mail.to);
        Ok(())
    }
}
