//! The SES quota boundary.
//!
//! [QuotaSource] is the only place the check talks to the outside world. [SesQuotaSource]
//! implements it with the SES v2 `GetAccount` call.

use async_trait::async_trait;
use aws_config::retry::RetryConfig;
use aws_config::BehaviorVersion;
use aws_credential_types::Credentials;
use aws_sdk_sesv2::error::DisplayErrorContext;
use aws_sdk_sesv2::Client;

use crate::config::CheckConfig;

const CREDENTIALS_PROVIDER_NAME: &str = "check-ses-limit";

/// The account's cap for the rolling 24 hour window.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SendLimit {
    Limited(u64),
    /// SES reports `-1` for accounts without a sending cap.
    Unlimited,
}

/// The account's sending counters for the rolling 24 hour window.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SendQuota {
    pub sent_last_24_hours: u64,
    pub max_24_hour_send: SendLimit,
}

impl SendQuota {
    /// SES reports both counters as doubles. Fractions are truncated, a negative cap means
    /// unlimited.
    pub fn from_ses(sent_last_24_hours: f64, max_24_hour_send: f64) -> Self {
        let max_24_hour_send = if max_24_hour_send < 0.0 {
            SendLimit::Unlimited
        } else {
            SendLimit::Limited(max_24_hour_send as u64)
        };

        SendQuota {
            sent_last_24_hours: sent_last_24_hours as u64,
            max_24_hour_send,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum QuotaError {
    /// The provider call failed: credentials, transport or a service side error.
    #[error("{0}")]
    Api(String),
}

#[async_trait]
pub trait QuotaSource {
    /// Performs exactly one request. `Ok(None)` means the provider answered without quota data.
    async fn send_quota(&self) -> Result<Option<SendQuota>, QuotaError>;
}

pub struct SesQuotaSource {
    client: Client,
}

impl SesQuotaSource {
    /// Builds an SES v2 client for the configured region.
    ///
    /// Static credentials are used when configured, otherwise the default provider chain
    /// resolves them. The SDK's own retries are disabled so each run is a single round trip.
    pub async fn new(config: &CheckConfig) -> Self {
        let mut loader = aws_config::defaults(BehaviorVersion::latest())
            .region(aws_config::Region::new(config.region.clone()))
            .retry_config(RetryConfig::disabled());

        if let Some(ref key) = config.access_key {
            loader = loader.credentials_provider(Credentials::new(
                key.id.clone(),
                key.secret.clone(),
                None,
                None,
                CREDENTIALS_PROVIDER_NAME,
            ));
        }

        if let Some(ref endpoint) = config.endpoint_url {
            loader = loader.endpoint_url(endpoint);
        }

        let sdk_config = loader.load().await;

        SesQuotaSource {
            client: Client::new(&sdk_config),
        }
    }
}

#[async_trait]
impl QuotaSource for SesQuotaSource {
    async fn send_quota(&self) -> Result<Option<SendQuota>, QuotaError> {
        tracing::debug!("requesting SES account details");

        let output = self.client.get_account().send().await.map_err(|err| {
            let msg = DisplayErrorContext(&err).to_string();
            tracing::warn!(error = %msg, "SES GetAccount failed");
            QuotaError::Api(msg)
        })?;

        let quota = output
            .send_quota()
            .map(|q| SendQuota::from_ses(q.sent_last24_hours(), q.max24_hour_send()));

        tracing::debug!(?quota, "SES account details received");

        Ok(quota)
    }
}
