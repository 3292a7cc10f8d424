//! A nagios/icinga/sensu check for the AWS SES 24 hour sending quota.
//!
//! The check asks SES for the number of messages sent in the last 24 hours and the account's
//! cap for that window, and alerts when the used percentage reaches the warning or critical
//! level. See [check::evaluate] for the decision and [quota::QuotaSource] for the provider
//! boundary.

#[macro_use]
mod macros;

pub mod check;
pub mod config;
pub mod config_generator;
pub mod quota;
mod resource;
mod runner;
mod state;

pub use crate::resource::{Metric, PerfData, Resource, ToPerfString, Unit};
pub use crate::runner::{Runner, RunnerResult};
pub use crate::state::ServiceState;

/// Initializes tracing on stderr. Stdout is reserved for the single plugin output line.
///
/// The filter is read from `RUST_LOG` and defaults to `warn`.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();
}
