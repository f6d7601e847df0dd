//! # SendGrid
//!
//! Production [`Notifier`] over the v3 mail-send endpoint.
//!
//! - One POST per report, `Authorization: Bearer <key>`
//! - Any 2xx is success (SendGrid answers 202)
//! - Anything else becomes [`DeliveryError::Provider`] with the response text
//! - No timeout beyond the client's own. A hung provider hangs the request
//!
//! Every free-text field goes through [`safe_str`] before it is serialized.

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use tracing::{debug, info};

use crate::{
    config::DeliveryConfig,
    notifier::{DeliveryError, Notifier},
    report::DeliveryReport,
    utils::{ADDRESS_MAX, BODY_MAX, SENDER_NAME_MAX, SUBJECT_MAX, safe_str},
};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Address {
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct MailSend {
    personalizations: Vec<Personalization>,
    from: Address,
    #[serde(skip_serializing_if = "Option::is_none")]
    reply_to: Option<Address>,
    subject: String,
    content: Vec<Content>,
}

#[derive(Debug, Serialize)]
struct Personalization {
    to: Vec<Address>,
}

#[derive(Debug, Serialize)]
struct Content {
    #[serde(rename = "type")]
    kind: &'static str,
    value: String,
}

pub struct SendGridNotifier {
    client: Client,
    api_url: String,
    api_key: String,
    from: Address,
    reply_to: Option<Address>,
}

impl SendGridNotifier {
    pub fn new(config: &DeliveryConfig) -> Result<Self, DeliveryError> {
        let client = Client::builder()
            .build()
            .map_err(|e| DeliveryError::Transport(e.to_string()))?;

        Ok(Self::with_client(client, config))
    }

    pub fn with_client(client: Client, config: &DeliveryConfig) -> Self {
        let from = Address {
            email: config.from_email.clone(),
            name: config
                .from_name
                .as_deref()
                .map(|name| safe_str(name, SENDER_NAME_MAX)),
        };

        let reply_to = config.reply_to.as_deref().map(|email| Address {
            email: safe_str(email, ADDRESS_MAX),
            name: None,
        });

        info!(
            from = %from.email,
            reply_to = ?reply_to.as_ref().map(|a| &a.email),
            "SendGrid notifier ready"
        );

        Self {
            client,
            api_url: config.api_url.clone(),
            api_key: config.api_key.clone(),
            from,
            reply_to,
        }
    }

    pub fn payload(&self, report: &DeliveryReport) -> MailSend {
        MailSend {
            personalizations: vec![Personalization {
                to: vec![Address {
                    email: safe_str(&report.recipient, ADDRESS_MAX),
                    name: None,
                }],
            }],
            from: self.from.clone(),
            reply_to: self.reply_to.clone(),
            subject: safe_str(&report.subject, SUBJECT_MAX),
            content: vec![Content {
                kind: "text/plain",
                value: safe_str(&report.body, BODY_MAX),
            }],
        }
    }
}

#[async_trait]
impl Notifier for SendGridNotifier {
    async fn deliver(&self, report: DeliveryReport) -> Result<(), DeliveryError> {
        let payload = self.payload(&report);

        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|e| DeliveryError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();

            return Err(DeliveryError::Provider {
                status: status.as_u16(),
                message,
            });
        }

        debug!(status = status.as_u16(), "SendGrid accepted message");

        Ok(())
    }
}
