use std::net::TcpListener;

use anyhow::Result;
use check_ses_limit::check::{run_check, CheckError, Thresholds, CHECK_NAME};
use check_ses_limit::config::{AccessKey, CheckConfig};
use check_ses_limit::quota::{QuotaSource, SendLimit, SendQuota, SesQuotaSource};
use check_ses_limit::ServiceState;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const ACCOUNT_PATH: &str = "/v2/email/account";

fn unused_port() -> u16 {
    TcpListener::bind("127.0.0.1:0")
        .expect("failed to bind ephemeral port")
        .local_addr()
        .expect("listener has no local addr")
        .port()
}

fn test_config(endpoint_url: String, thresholds: Thresholds) -> CheckConfig {
    CheckConfig {
        access_key: Some(AccessKey {
            id: "AKIDEXAMPLE".to_string(),
            secret: "wJalrXUtnFEMI/K7MDENG+bPxRfiCYEXAMPLEKEY".to_string(),
        }),
        region: "us-east-1".to_string(),
        thresholds,
        endpoint_url: Some(endpoint_url),
    }
}

async fn mount_account(server: &MockServer, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path(ACCOUNT_PATH))
        .respond_with(response)
        .expect(1)
        .mount(server)
        .await;
}

async fn check_error(config: &CheckConfig) -> CheckError {
    let source = SesQuotaSource::new(config).await;
    match run_check(&source, config.thresholds).await {
        Ok(resource) => panic!("expected the check to fail, got: {}", resource.to_nagios_string()),
        Err(err) => err,
    }
}

fn account_body(sent: f64, max: f64) -> serde_json::Value {
    json!({
        "DedicatedIpAutoWarmupEnabled": false,
        "EnforcementStatus": "HEALTHY",
        "ProductionAccessEnabled": true,
        "SendingEnabled": true,
        "SendQuota": {
            "Max24HourSend": max,
            "MaxSendRate": 14.0,
            "SentLast24Hours": sent
        }
    })
}

#[tokio::test]
async fn quota_is_read_from_get_account() -> Result<()> {
    let server = MockServer::start().await;
    mount_account(
        &server,
        ResponseTemplate::new(200).set_body_json(account_body(37600.0, 50000.0)),
    )
    .await;

    let config = test_config(server.uri(), Thresholds::default());
    let source = SesQuotaSource::new(&config).await;

    assert_eq!(
        source.send_quota().await?,
        Some(SendQuota {
            sent_last_24_hours: 37600,
            max_24_hour_send: SendLimit::Limited(50000),
        })
    );

    Ok(())
}

#[tokio::test]
async fn usage_above_warning_is_warning() -> Result<()> {
    let server = MockServer::start().await;
    mount_account(
        &server,
        ResponseTemplate::new(200).set_body_json(account_body(37600.0, 50000.0)),
    )
    .await;

    let config = test_config(server.uri(), Thresholds::default());
    let source = SesQuotaSource::new(&config).await;
    let resource = run_check(&source, config.thresholds).await?;

    assert_eq!(resource.state(), ServiceState::Warning);
    assert_eq!(
        resource.to_nagios_string(),
        "CheckSESLimit WARNING: SES sending limit is at 75% | usage=75%;75;90;0;100 sent_last_24_hours=37600;;;0;50000"
    );

    Ok(())
}

#[tokio::test]
async fn usage_below_thresholds_is_ok() -> Result<()> {
    let server = MockServer::start().await;
    mount_account(
        &server,
        ResponseTemplate::new(200).set_body_json(account_body(749.0, 1000.0)),
    )
    .await;

    let config = test_config(server.uri(), Thresholds::default());
    let source = SesQuotaSource::new(&config).await;
    let resource = run_check(&source, config.thresholds).await?;

    assert_eq!(resource.state(), ServiceState::Ok);
    assert_eq!(resource.description(), Some("SES sending limit is at 74%"));

    Ok(())
}

#[tokio::test]
async fn disabled_critical_never_triggers() -> Result<()> {
    let server = MockServer::start().await;
    mount_account(
        &server,
        ResponseTemplate::new(200).set_body_json(account_body(950.0, 1000.0)),
    )
    .await;

    let thresholds = Thresholds {
        warning: 75,
        critical: 0,
    };
    let config = test_config(server.uri(), thresholds);
    let source = SesQuotaSource::new(&config).await;
    let resource = run_check(&source, config.thresholds).await?;

    assert_eq!(resource.state(), ServiceState::Warning);
    assert_eq!(resource.description(), Some("SES sending limit is at 95%"));

    Ok(())
}

#[tokio::test]
async fn missing_send_quota_is_unknown() -> Result<()> {
    let server = MockServer::start().await;
    mount_account(
        &server,
        ResponseTemplate::new(200).set_body_json(json!({ "SendingEnabled": true })),
    )
    .await;

    let config = test_config(server.uri(), Thresholds::default());
    let source = SesQuotaSource::new(&config).await;
    let resource = run_check(&source, config.thresholds).await?;

    assert_eq!(resource.state(), ServiceState::Unknown);
    assert_eq!(
        resource.to_nagios_string(),
        "CheckSESLimit UNKNOWN: SES returned no sending quota data"
    );

    Ok(())
}

#[tokio::test]
async fn unlimited_quota_is_ok() -> Result<()> {
    let server = MockServer::start().await;
    mount_account(
        &server,
        ResponseTemplate::new(200).set_body_json(json!({
            "SendQuota": { "Max24HourSend": -1.0, "SentLast24Hours": 1200.0 }
        })),
    )
    .await;

    let config = test_config(server.uri(), Thresholds::default());
    let source = SesQuotaSource::new(&config).await;
    let resource = run_check(&source, config.thresholds).await?;

    assert_eq!(resource.state(), ServiceState::Ok);
    assert_eq!(resource.exit_code(), 0);
    assert_eq!(
        resource.to_nagios_string(),
        "CheckSESLimit OK: SES sending limit is unlimited | sent_last_24_hours=1200;;;0"
    );

    Ok(())
}

#[tokio::test]
async fn zero_cap_is_unknown() -> Result<()> {
    let server = MockServer::start().await;
    mount_account(
        &server,
        ResponseTemplate::new(200).set_body_json(account_body(0.0, 0.0)),
    )
    .await;

    let config = test_config(server.uri(), Thresholds::default());
    let source = SesQuotaSource::new(&config).await;
    let resource = run_check(&source, config.thresholds).await?;

    assert_eq!(resource.state(), ServiceState::Unknown);

    Ok(())
}

#[tokio::test]
async fn service_error_is_critical_with_provider_message() -> Result<()> {
    let server = MockServer::start().await;
    mount_account(
        &server,
        ResponseTemplate::new(400)
            .insert_header("x-amzn-ErrorType", "BadRequestException")
            .set_body_json(json!({
                "message": "The security token included in the request is invalid."
            })),
    )
    .await;

    let config = test_config(server.uri(), Thresholds::default());
    let err = check_error(&config).await;

    assert!(matches!(err, CheckError::Quota(_)));
    assert_eq!(err.service_state(), ServiceState::Critical);

    let msg = err.to_string();
    assert!(
        msg.starts_with("An issue occurred while communicating with the AWS SES API: "),
        "{msg}"
    );
    assert!(
        msg.contains("The security token included in the request is invalid."),
        "{msg}"
    );

    Ok(())
}

#[tokio::test]
async fn unrecognized_client_is_critical() -> Result<()> {
    let server = MockServer::start().await;
    mount_account(
        &server,
        ResponseTemplate::new(403)
            .insert_header("x-amzn-ErrorType", "UnrecognizedClientException")
            .set_body_json(json!({
                "message": "The security token included in the request is invalid."
            })),
    )
    .await;

    let config = test_config(server.uri(), Thresholds::default());
    let err = check_error(&config).await;

    assert_eq!(err.service_state(), ServiceState::Critical);
    assert!(err.to_string().contains("UnrecognizedClientException"), "{err}");

    Ok(())
}

#[tokio::test]
async fn server_error_is_not_retried() -> Result<()> {
    let server = MockServer::start().await;
    // `expect(1)` is verified when the server is dropped
    mount_account(
        &server,
        ResponseTemplate::new(500)
            .insert_header("x-amzn-ErrorType", "InternalFailure")
            .set_body_json(json!({ "message": "internal failure" })),
    )
    .await;

    let config = test_config(server.uri(), Thresholds::default());
    let err = check_error(&config).await;

    assert_eq!(err.service_state(), ServiceState::Critical);

    Ok(())
}

#[tokio::test]
async fn unreachable_endpoint_is_critical() -> Result<()> {
    let config = test_config(
        format!("http://127.0.0.1:{}", unused_port()),
        Thresholds::default(),
    );
    let err = check_error(&config).await;

    assert!(matches!(err, CheckError::Quota(_)));
    assert_eq!(err.service_state(), ServiceState::Critical);
    assert!(
        err.to_string()
            .starts_with("An issue occurred while communicating with the AWS SES API: "),
        "{err}"
    );

    Ok(())
}

#[tokio::test]
async fn repeated_runs_are_identical() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(ACCOUNT_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(account_body(900.0, 1000.0)))
        .expect(2)
        .mount(&server)
        .await;

    let config = test_config(server.uri(), Thresholds::default());
    let source = SesQuotaSource::new(&config).await;
    let first = run_check(&source, config.thresholds).await?;
    let second = run_check(&source, config.thresholds).await?;

    assert_eq!(first.state(), ServiceState::Critical);
    assert_eq!(first.state(), second.state());
    assert_eq!(first.to_nagios_string(), second.to_nagios_string());
    assert!(first.to_nagios_string().starts_with(CHECK_NAME));

    Ok(())
}
