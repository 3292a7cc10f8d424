//! Command line surface and the validated configuration derived from it.
//!
//! Environment lookups (`AWS_ACCESS_KEY`, `AWS_SECRET_KEY`) happen here, once, through clap.
//! Everything downstream receives a [CheckConfig].

use std::fmt;

use clap::Parser;

use crate::check::Thresholds;

pub const DEFAULT_REGION: &str = "us-east-1";

/// Gets your SES sending limit and alerts based on the percentage of the 24 hour quota used.
#[derive(Debug, Parser)]
#[command(name = "check-ses-limit", version)]
pub struct Cli {
    /// AWS access key id. Either set AWS_ACCESS_KEY or provide it as an option
    #[arg(short = 'a', long = "aws-access-key", env = "AWS_ACCESS_KEY")]
    pub aws_access_key: Option<String>,

    /// AWS secret access key. Either set AWS_SECRET_KEY or provide it as an option
    #[arg(
        short = 'k',
        long = "aws-secret-access-key",
        env = "AWS_SECRET_KEY",
        hide_env_values = true
    )]
    pub aws_secret_access_key: Option<String>,

    /// AWS region
    #[arg(short = 'r', long = "aws-region", default_value = DEFAULT_REGION)]
    pub aws_region: String,

    /// Warn when the percentage of mail sent is at or above this number (0 disables)
    #[arg(
        short = 'W',
        long = "warn_perc",
        default_value_t = 75,
        allow_negative_numbers = true
    )]
    pub warn_perc: i64,

    /// Critical when the percentage of mail sent is at or above this number (0 disables)
    #[arg(
        short = 'C',
        long = "crit_perc",
        default_value_t = 90,
        allow_negative_numbers = true
    )]
    pub crit_perc: i64,

    /// Override the SES endpoint, e.g. for a VPC interface endpoint
    #[arg(long = "endpoint-url")]
    pub endpoint_url: Option<String>,
}

/// A static access key pair. The secret never shows up in `Debug` output.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessKey {
    pub id: String,
    pub secret: String,
}

impl fmt::Debug for AccessKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessKey")
            .field("id", &self.id)
            .field("secret", &"**redacted**")
            .finish()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CheckConfig {
    /// `None` leaves credential resolution to the AWS default provider chain.
    pub access_key: Option<AccessKey>,
    pub region: String,
    pub thresholds: Thresholds,
    pub endpoint_url: Option<String>,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("--aws-access-key and --aws-secret-access-key must be given together")]
    IncompleteAccessKey,
    #[error("--aws-region must not be empty")]
    EmptyRegion,
}

impl TryFrom<Cli> for CheckConfig {
    type Error = ConfigError;

    fn try_from(cli: Cli) -> Result<Self, Self::Error> {
        let access_key = match (cli.aws_access_key, cli.aws_secret_access_key) {
            (Some(id), Some(secret)) => Some(AccessKey { id, secret }),
            (None, None) => None,
            _ => return Err(ConfigError::IncompleteAccessKey),
        };

        let region = cli.aws_region.trim().to_owned();
        if region.is_empty() {
            return Err(ConfigError::EmptyRegion);
        }

        Ok(CheckConfig {
            access_key,
            region,
            thresholds: Thresholds {
                warning: cli.warn_perc,
                critical: cli.crit_perc,
            },
            endpoint_url: cli.endpoint_url,
        })
    }
}
