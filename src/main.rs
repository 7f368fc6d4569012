use std::sync::{Arc, Mutex};

use amr_data_entry::{
    config::{app_config::AppConfig, telemetry_config::TelemetryConfig},
    prettyprint::prettyprint::PrettyFormatter,
};
use anyhow::Context;
use clap::Parser;
use indicatif::ProgressStyle;
use opentelemetry::KeyValue;
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::trace as sdktrace;
use opentelemetry_sdk::Resource;
use tracing::{error, info, warn};
use tracing_indicatif::IndicatifLayer;
use tracing_opentelemetry::OpenTelemetryLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Registry};

mod cli;

use cli::{args::Cli, cli_adapter::CliAdapter};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let (config, config_error) = match AppConfig::load(&cli.config) {
        Ok(config) => (config, None),
        Err(report) if !cli.command.needs_remote_store() => (AppConfig::default(), Some(report)),
        Err(report) => {
            eprintln!("{:?}", report);
            return Err(format!("Could not load configuration '{}'", cli.config).into());
        }
    };

    setup_tracing(&config.telemetry, cli.verbose)?;
    setup_panic_hook();

    if let Some(report) = config_error {
        warn!("Using default configuration: {}", report);
    }

    info!("Starting amr-data-entry");

    let cli_adapter = Arc::new(CliAdapter::new(config));
    let result = cli_adapter.run(cli.command.into()).await;

    match &result {
        Ok(_) => info!("CLI execution completed successfully"),
        Err(e) => error!("CLI execution failed: {}", e),
    }

    opentelemetry::global::shutdown_tracer_provider();
    result
}

fn setup_tracing(telemetry: &TelemetryConfig, verbose: bool) -> anyhow::Result<()> {
    let indicatif_layer = IndicatifLayer::new().with_progress_style(
        ProgressStyle::with_template("{span_child_prefix}{spinner:.green} {span_name} {span_fields}")
            .context("Invalid progress template")?,
    );

    let stdout_layer = tracing_subscriber::fmt::layer()
        .event_format(PrettyFormatter::new(true))
        .with_writer(indicatif_layer.get_stderr_writer());

    let log_file = std::fs::File::create(&telemetry.log_file)
        .with_context(|| format!("Could not create log file '{}'", telemetry.log_file))?;
    let log_file_layer = tracing_subscriber::fmt::layer()
        .event_format(PrettyFormatter::new(false))
        .with_writer(Mutex::new(log_file))
        .with_ansi(false);

    let otel_layer = match &telemetry.otlp_endpoint {
        Some(endpoint) => {
            let exporter = opentelemetry_otlp::new_exporter()
                .tonic()
                .with_endpoint(endpoint);

            let tracer = opentelemetry_otlp::new_pipeline()
                .tracing()
                .with_exporter(exporter)
                .with_trace_config(sdktrace::config().with_resource(Resource::new(vec![
                    KeyValue::new("service.name", "amr_data_entry"),
                ])))
                .install_batch(opentelemetry_sdk::runtime::Tokio)
                .context("Could not install the OTLP pipeline")?;

            Some(OpenTelemetryLayer::new(tracer))
        }
        None => None,
    };

    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    Registry::default()
        .with(tracing_subscriber::filter::Targets::new().with_target("amr_data_entry", level))
        .with(otel_layer)
        .with(indicatif_layer)
        .with(log_file_layer)
        .with(stdout_layer)
        .init();

    Ok(())
}

fn setup_panic_hook() {
    tracing::trace!("Setting panic hook");
    std::panic::set_hook(Box::new(|info| {
        tracing::error!("panic: {info}");
        opentelemetry::global::shutdown_tracer_provider();
    }));
}
