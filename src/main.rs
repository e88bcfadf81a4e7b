use clap::Parser;
use portprobe::cli::Cli;
use portprobe::config::AppSettings;
use portprobe::output;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    let settings = match AppSettings::load(cli.config.as_deref()) {
        Ok(settings) => settings,
        Err(e) => {
            output::print_error(&e.to_string());
            return Ok(ExitCode::FAILURE);
        }
    };

    init_logging(&cli.log_filter(&settings))?;

    if let Err(e) = cli.execute(&settings).await {
        output::print_error(&e.to_string());
        return Ok(ExitCode::FAILURE);
    }

    Ok(ExitCode::SUCCESS)
}

/// Install the stderr subscriber; `RUST_LOG` overrides the flag-derived filter.
fn init_logging(default_filter: &str) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_filter))?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!(e))
}
