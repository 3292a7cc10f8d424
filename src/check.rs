//! Turns the account quota into a service state.

use crate::quota::{QuotaError, QuotaSource, SendLimit, SendQuota};
use crate::{Metric, Resource, ServiceState, Unit};

/// The name printed in front of every output line.
pub const CHECK_NAME: &str = "CheckSESLimit";

pub const EMPTY_QUOTA_MESSAGE: &str = "SES returned no sending quota data";

pub const UNLIMITED_QUOTA_MESSAGE: &str = "SES sending limit is unlimited";

/// Warning and critical levels in percent. A level of zero or less never triggers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Thresholds {
    pub warning: i64,
    pub critical: i64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Thresholds {
            warning: 75,
            critical: 90,
        }
    }
}

impl Thresholds {
    /// Critical takes precedence over warning.
    pub fn evaluate(&self, percent: u64) -> ServiceState {
        if Self::triggers(self.critical, percent) {
            ServiceState::Critical
        } else if Self::triggers(self.warning, percent) {
            ServiceState::Warning
        } else {
            ServiceState::Ok
        }
    }

    fn triggers(level: i64, percent: u64) -> bool {
        Self::enabled(level).is_some_and(|level| percent >= level)
    }

    fn enabled(level: i64) -> Option<u64> {
        u64::try_from(level).ok().filter(|level| *level > 0)
    }
}

/// Percentage of the quota used, truncated toward zero.
///
/// Returns `None` for a zero or unlimited cap.
pub fn usage_percent(quota: &SendQuota) -> Option<u64> {
    let max = match quota.max_24_hour_send {
        SendLimit::Limited(0) | SendLimit::Unlimited => return None,
        SendLimit::Limited(max) => max,
    };

    let percent = u128::from(quota.sent_last_24_hours) * 100 / u128::from(max);

    Some(u64::try_from(percent).unwrap_or(u64::MAX))
}

/// Reduces a quota response to the resource that gets printed.
///
/// An absent quota or a zero cap is reported as [ServiceState::Unknown]. An unlimited cap is
/// always [ServiceState::Ok].
pub fn evaluate(quota: Option<SendQuota>, thresholds: Thresholds) -> Resource {
    let Some(quota) = quota else {
        return empty_quota();
    };

    if quota.max_24_hour_send == SendLimit::Unlimited {
        tracing::debug!(sent = quota.sent_last_24_hours, "SES sending quota is unlimited");
        return Resource::new(CHECK_NAME)
            .with_state(ServiceState::Ok)
            .with_description(UNLIMITED_QUOTA_MESSAGE)
            .with_metric(
                Metric::new("sent_last_24_hours", quota.sent_last_24_hours)
                    .with_range(Some(0), None),
            );
    }

    let (Some(percent), SendLimit::Limited(max)) =
        (usage_percent(&quota), quota.max_24_hour_send)
    else {
        return empty_quota();
    };

    let state = thresholds.evaluate(percent);
    tracing::debug!(
        sent = quota.sent_last_24_hours,
        max,
        percent,
        %state,
        "evaluated SES sending quota"
    );

    Resource::new(CHECK_NAME)
        .with_state(state)
        .with_description(format!("SES sending limit is at {}%", percent))
        .with_metric(
            Metric::new("usage", percent)
                .with_unit(Unit::Percentage)
                .with_thresholds(
                    Thresholds::enabled(thresholds.warning),
                    Thresholds::enabled(thresholds.critical),
                )
                .with_range(Some(0), Some(100)),
        )
        .with_metric(
            Metric::new("sent_last_24_hours", quota.sent_last_24_hours)
                .with_range(Some(0), Some(max)),
        )
}

fn empty_quota() -> Resource {
    tracing::debug!("no usable quota in the SES response");
    Resource::new(CHECK_NAME)
        .with_state(ServiceState::Unknown)
        .with_description(EMPTY_QUOTA_MESSAGE)
}

#[derive(Debug, thiserror::Error)]
pub enum CheckError {
    #[error("failed to start the async runtime: {0}")]
    Runtime(#[from] std::io::Error),
    #[error("An issue occurred while communicating with the AWS SES API: {0}")]
    Quota(#[from] QuotaError),
}

impl CheckError {
    /// Provider failures are critical. A check that never reached the provider is unknown.
    pub fn service_state(&self) -> ServiceState {
        match self {
            CheckError::Runtime(_) => ServiceState::Unknown,
            CheckError::Quota(_) => ServiceState::Critical,
        }
    }
}

/// Fetches the quota once and evaluates it.
pub async fn run_check<S>(source: &S, thresholds: Thresholds) -> Result<Resource, CheckError>
where
    S: QuotaSource + ?Sized,
{
    let quota = source.send_quota().await?;
    Ok(evaluate(quota, thresholds))
}
