use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;

use rfcnits::cli::Cli;
use rfcnits::config::ConfigManager;
use rfcnits::engine::ValidationEngine;
use rfcnits::output::Output;
use rfcnits::remote::{HttpMetadataSource, MetadataSource, OfflineMetadataSource, RemoteConfig};
use rfcnits::rules::RunOptions;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse_args();
    if let Err(message) = cli.validate() {
        eprintln!("rfcnits: {message}");
        return ExitCode::from(2);
    }

    match run(&cli).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(err) => {
            eprintln!("rfcnits: {err:#}");
            ExitCode::from(2)
        }
    }
}

async fn run(cli: &Cli) -> anyhow::Result<bool> {
    let config = ConfigManager::load_config(cli)
        .await
        .context("failed to load configuration")?;

    let remote: Arc<dyn MetadataSource> = if config.network.offline {
        Arc::new(OfflineMetadataSource)
    } else {
        Arc::new(HttpMetadataSource::new(RemoteConfig {
            base_url: config.network.base_url.clone(),
            timeout_seconds: config.network.timeout_seconds,
            ..RemoteConfig::default()
        })?)
    };

    let options = RunOptions {
        mode: config.validation.mode,
        expected_year: config.validation.expected_year,
        today: chrono::Utc::now().date_naive(),
    };

    let engine = ValidationEngine::new(remote, options);
    let report = engine
        .validate_file(&cli.path)
        .await
        .with_context(|| format!("failed to validate {}", cli.path.display()))?;

    print!("{}", Output::new(config.output.format).format_report(&report));
    Ok(report.passed())
}
