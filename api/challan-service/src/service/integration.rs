use super::auth_service::OperatorTokenVerifier;
use super::detection_service::AiGatewayClient;
use super::payment_gateway_service::RazorpayClient;
use super::registry_service::RegistryClient;
use super::sms_service::Msg91Client;
use crate::config::environment::AppConfig;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::warn;

/// Whether an external dependency has credentials. Handlers match on this once
/// instead of re-checking individual env keys.
#[derive(Debug, Clone)]
pub enum Integration<C> {
    Configured(C),
    Unconfigured,
}

impl<C> Integration<C> {
    pub fn from_option(client: Option<C>) -> Self {
        match client {
            Some(c) => Self::Configured(c),
            None => Self::Unconfigured,
        }
    }

    pub fn is_configured(&self) -> bool {
        matches!(self, Self::Configured(_))
    }
}

#[derive(Debug, Clone)]
pub struct Integrations {
    pub detection: Integration<AiGatewayClient>,
    pub registry: Integration<RegistryClient>,
    pub sms: Integration<Msg91Client>,
    pub payments: Integration<RazorpayClient>,
    pub operator_auth: Integration<OperatorTokenVerifier>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntegrationStatus {
    pub detection: bool,
    pub registry: bool,
    pub sms: bool,
    pub payments: bool,
    pub operator_auth: bool,
}

impl Integrations {
    pub fn from_config(config: &AppConfig) -> Self {
        let http = build_http_client(config.upstream_timeout_seconds);

        let detection = config
            .ai_gateway_api_key
            .clone()
            .map(|api_key| AiGatewayClient {
                http: http.clone(),
                endpoint: config.ai_gateway_url.clone(),
                api_key,
                model: config.ai_model.clone(),
            });
        let registry = config
            .vehicle_registry_api_key
            .clone()
            .map(|api_key| RegistryClient {
                http: http.clone(),
                endpoint: config.vehicle_registry_api_url.clone(),
                api_key,
            });
        let sms = config.msg91_auth_key.clone().map(|auth_key| Msg91Client {
            http: http.clone(),
            endpoint: config.msg91_api_url.clone(),
            auth_key,
            sender_id: config.msg91_sender_id.clone(),
            template_id: config.msg91_template_id.clone(),
        });
        let payments = match (&config.razorpay_key_id, &config.razorpay_key_secret) {
            (Some(key_id), Some(key_secret)) => Some(RazorpayClient {
                http: http.clone(),
                api_url: config.razorpay_api_url.clone(),
                key_id: key_id.clone(),
                key_secret: key_secret.clone(),
            }),
            _ => None,
        };
        let operator_auth = config
            .operator_jwt_secret
            .clone()
            .map(OperatorTokenVerifier::new);

        Self {
            detection: Integration::from_option(detection),
            registry: Integration::from_option(registry),
            sms: Integration::from_option(sms),
            payments: Integration::from_option(payments),
            operator_auth: Integration::from_option(operator_auth),
        }
    }

    pub fn status(&self) -> IntegrationStatus {
        IntegrationStatus {
            detection: self.detection.is_configured(),
            registry: self.registry.is_configured(),
            sms: self.sms.is_configured(),
            payments: self.payments.is_configured(),
            operator_auth: self.operator_auth.is_configured(),
        }
    }
}

fn build_http_client(timeout_seconds: Option<u64>) -> Client {
    let mut builder = Client::builder();
    if let Some(secs) = timeout_seconds {
        builder = builder.timeout(Duration::from_secs(secs));
    }
    match builder.build() {
        Ok(client) => client,
        Err(e) => {
            warn!(error = %e, "failed to build configured http client; using defaults");
            Client::new()
        }
    }
}
