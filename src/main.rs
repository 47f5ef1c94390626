// Copyright 2025 coScene
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use anyhow::Result;
use clap::Parser;
use emqx_s3_backup::config::{BackupConfig, ConfigLoader, LoggingConfig};
use emqx_s3_backup::error::{BackupError, ConfigError};
use emqx_s3_backup::{BackupPipeline, BackupReport, BackupTarget, ExportClient, StoreFactory};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::level_filters::LevelFilter;
use tracing::{error, info, Level};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Back up EMQX cluster configuration to S3
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Optional YAML configuration file; environment variables take precedence
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log level (overrides config and LOG_LEVEL)
    #[arg(short, long)]
    log_level: Option<String>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let args = Args::parse();

    // Loaded before tracing so the configured level applies; a load error
    // is logged once tracing is up
    let config = ConfigLoader::load(args.config.as_deref());

    let logging = match &config {
        Ok(config) => config.logging.clone(),
        Err(_) => LoggingConfig::default(),
    };
    let level = args.log_level.as_deref().unwrap_or(&logging.level);
    if let Err(e) = init_tracing(level, &logging.format) {
        eprintln!("emqx-s3-backup: failed to initialize logging: {}", e);
        return ExitCode::FAILURE;
    }

    match run(config).await {
        Ok(report) => {
            info!(
                "Backup complete: {} ({} bytes) stored as {}/{}",
                report.local_name, report.bytes, report.bucket, report.object_key
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("Backup failed at {} stage: {}", e.stage(), e);
            ExitCode::FAILURE
        }
    }
}

async fn run(config: Result<BackupConfig, ConfigError>) -> Result<BackupReport, BackupError> {
    let config = config?;

    info!("Starting EMQX backup");
    info!("Broker: {}", config.broker.url);
    info!(
        "Storage backend: {} (bucket '{}', region '{}', prefix '{}')",
        config.storage.backend, config.storage.bucket, config.storage.region, config.storage.prefix
    );

    let exporter = ExportClient::new(&config.broker, config.export.clone())?
        .with_artifact_dir(config.artifact_dir.clone());
    let store = StoreFactory::create(&config.storage)?;

    let pipeline = BackupPipeline::new(
        Arc::new(exporter),
        store,
        BackupTarget::from(&config.storage),
    );
    pipeline.run().await
}

fn init_tracing(level: &str, format: &str) -> Result<()> {
    let log_level = match level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    // RUST_LOG wins when set
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::default().add_directive(LevelFilter::from_level(log_level).into()));

    let builder = FmtSubscriber::builder().with_env_filter(filter);
    match format {
        "compact" => tracing::subscriber::set_global_default(builder.compact().finish())?,
        _ => tracing::subscriber::set_global_default(builder.finish())?,
    }

    Ok(())
}
