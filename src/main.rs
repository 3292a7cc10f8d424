use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};

use check_ses_limit::check::{run_check, CheckError, CHECK_NAME};
use check_ses_limit::config::{CheckConfig, Cli};
use check_ses_limit::config_generator::print_icinga_command_config_if_env_and_exit;
use check_ses_limit::quota::SesQuotaSource;
use check_ses_limit::{init_tracing, Runner, ServiceState};

const ICINGA_COMMAND_NAME: &str = "ses_limit";

fn main() {
    if let Err(e) = print_icinga_command_config_if_env_and_exit(ICINGA_COMMAND_NAME, &Cli::command())
    {
        exit_unknown(&e.to_string());
    }

    let cli = Cli::try_parse().unwrap_or_else(|e| match e.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => e.exit(),
        kind => {
            let _ = e.print();
            exit_unknown(&format!(
                "invalid command line: {}",
                kind.as_str().unwrap_or("unknown cause")
            ))
        }
    });

    let config = CheckConfig::try_from(cli).unwrap_or_else(|e| exit_unknown(&e.to_string()));

    init_tracing();

    Runner::new(CHECK_NAME)
        .on_error(|e: &CheckError| (e.service_state(), e.to_string()))
        .safe_run(|| {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()?;

            runtime.block_on(async {
                let source = SesQuotaSource::new(&config).await;
                run_check(&source, config.thresholds).await
            })
        })
        .print_and_exit()
}

fn exit_unknown(msg: &str) -> ! {
    println!("{} {}: {}", CHECK_NAME, ServiceState::Unknown, msg);
    std::process::exit(ServiceState::Unknown.exit_code());
}
