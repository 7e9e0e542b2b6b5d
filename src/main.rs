// Entrypoint for the CLI application.
// - Keeps `main` small: resolve configuration, build the session store and
//   API client, and hand the parsed command to `ui::run`.
// - Any failure is printed on stderr and the process exits with status 1.

use anyhow::Result;
use clap::Parser;
use roomchat::cli::Cli;
use roomchat::config::Config;
use roomchat::{ui, ApiClient, FileSessionStore, HttpTransport};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match execute(cli) {
        Ok(outcome) => ui::report(&outcome),
        Err(err) => {
            tracing::debug!("command failed: {:#}", err);
            ui::report_error(&err);
            std::process::exit(1);
        }
    }
}

fn execute(cli: Cli) -> Result<roomchat::Outcome> {
    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    config.apply_overrides(cli.base_url, cli.session);

    let store = FileSessionStore::new(config.session_path());
    let api = ApiClient::new(HttpTransport::new(&config.server.base_url)?)
        .with_message_limit(config.limits.message_bytes);
    tracing::debug!(base_url = %config.server.base_url, session = ?store.path(), "configured");

    ui::run(cli.command, &api, &store)
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        "roomchat=debug"
    } else {
        "roomchat=warn"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
