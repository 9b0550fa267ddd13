use std::process::ExitCode;

use pmd_precommit::cli::{self, Cli};
use pmd_precommit::core::config::APP_NAME;

fn main() -> ExitCode {
    let (cli, parse_error) = match Cli::parse_args() {
        Ok(cli) => (cli, None),
        Err(e) => (Cli::default(), Some(e)),
    };
    init_logging(cli.debug);
    if let Some(e) = parse_error {
        tracing::warn!("{} ignoring invalid arguments: {}", APP_NAME, e.kind());
    }

    match cli::run(&cli) {
        Ok(code) => code,
        Err(e) => {
            tracing::warn!("{} {:#}", APP_NAME, e);
            ExitCode::SUCCESS
        }
    }
}

/// Initialize tracing on stderr; `RUST_LOG` overrides the level.
fn init_logging(debug: bool) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let level = if debug { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .with(filter)
        .try_init();
}
