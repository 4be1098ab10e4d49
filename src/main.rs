use std::io;

use clap::Parser;
use tracing::error;
use tracing_subscriber::EnvFilter;

use bizcalc::cli::{Cli, log_level, run};
use bizcalc::core::RuleBook;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level(cli.verbose)));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(cli.verbose >= 2)
        .init();

    let rules = match RuleBook::tax_year_2026() {
        Ok(rules) => rules,
        Err(e) => {
            error!(%e, "built-in rule tables are invalid");
            eprintln!("Rule table error: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = run(cli.command, rules, io::stdin().lock(), &mut io::stdout()).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
