use std::sync::Arc;

use crate::{
    audit::{AuditTrail, TracingAuditTrail},
    config::Config,
    gateway::Gateway,
    notifier::{DeliveryError, Notifier},
    sendgrid::SendGridNotifier,
    tokens::AccessTokens,
};

pub struct AppState {
    pub config: Config,
    pub tokens: Arc<AccessTokens>,
    pub gateway: Gateway,
}

impl AppState {
    pub fn new(config: Config) -> Result<Arc<Self>, DeliveryError> {
        let notifier = Arc::new(SendGridNotifier::new(&config.delivery)?);

        Ok(Self::with_parts(config, notifier, Arc::new(TracingAuditTrail)))
    }

    pub fn with_parts(
        config: Config,
        notifier: Arc<dyn Notifier>,
        audit: Arc<dyn AuditTrail>,
    ) -> Arc<Self> {
        let tokens = Arc::new(AccessTokens::new(config.access_tokens.iter().cloned()));

        let gateway = Gateway::new(
            tokens.clone(),
            config.delivery.to_email.clone(),
            notifier,
            audit,
        );

        Arc::new(Self {
            config,
            tokens,
            gateway,
        })
    }
}
