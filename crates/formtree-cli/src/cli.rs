use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(
    name = "formtree",
    about = "Formtree: bind nested payloads onto declared form trees and validate them",
    version
)]
pub struct Cli {
    /// Log debug events to stderr (overrides FORMTREE_LOG)
    #[arg(long, short, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List the form types declared in a schema file
    Forms {
        /// Schema document (.toml or .json)
        #[arg(long)]
        schema: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the canonical payload for one form type
    Normalize {
        /// Schema document (.toml or .json)
        #[arg(long)]
        schema: String,

        /// Form type name
        #[arg(long)]
        form: String,

        /// Payload JSON file (`-` reads stdin)
        #[arg(long)]
        payload: String,
    },

    /// Bind a payload, validate the tree and report errors
    Check {
        /// Schema document (.toml or .json)
        #[arg(long)]
        schema: String,

        /// Form type name
        #[arg(long)]
        form: String,

        /// Payload JSON file (`-` reads stdin)
        #[arg(long)]
        payload: String,

        /// How the payload is read
        #[arg(long, value_enum, default_value_t = Source::Payload)]
        source: Source,

        /// Extra root-level value as key=value (value parsed as JSON, else a string)
        #[arg(long = "extra", value_name = "KEY=VALUE")]
        extra: Vec<String>,

        /// Qualify collection error keys with element indices
        #[arg(long)]
        index_errors: bool,

        /// Do not validate nested forms
        #[arg(long)]
        skip_nested: bool,

        /// Do not validate nested form collections
        #[arg(long)]
        skip_arrays: bool,

        /// Context JSON object applied to every node before validation
        #[arg(long)]
        context: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Source {
    /// Raw payload: normalized, then bound
    Payload,
    /// Request params keyed by the form's model name
    Params,
    /// JSON text handed to the builder verbatim
    Json,
    /// A domain document read field by field
    Model,
}
