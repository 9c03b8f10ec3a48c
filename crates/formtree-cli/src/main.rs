//! Formtree CLI: the `formtree` command.

mod cli;
mod commands;
mod support;

use clap::Parser;
use cli::{Cli, Commands};
use tracing_subscriber::EnvFilter;

const LOG_ENV: &str = "FORMTREE_LOG";

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Forms { schema, json } => commands::forms::run(schema, json),

        Commands::Normalize {
            schema,
            form,
            payload,
        } => commands::normalize::run(schema, form, payload),

        Commands::Check {
            schema,
            form,
            payload,
            source,
            extra,
            index_errors,
            skip_nested,
            skip_arrays,
            context,
            json,
        } => commands::check::run(commands::check::Args {
            schema,
            form,
            payload,
            source,
            extra,
            index_errors,
            skip_nested,
            skip_arrays,
            context,
            json,
        }),
    }
}

/// Events go to stderr so stdout stays machine-readable.
fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
