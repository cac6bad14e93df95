use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "assume",
    about = "Assume: declarative assumptions over known, unknown, and null values",
    version
)]
pub struct Cli {
    /// Log filter used when RUST_LOG is not set (e.g. `debug`, `assume_kernel=trace`)
    #[arg(long, global = true, default_value = "warn")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Evaluate one assumption case file (JSON or TOML)
    Eval {
        /// Path to the case file; `.toml` selects TOML, anything else JSON
        case: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Call an assumption function with inline JSON arguments
    Call {
        /// Function name, e.g. `notnull` or `listlengthmin`
        function: String,

        /// Arguments as JSON values, value argument first
        args: Vec<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List the assumption function catalog
    Functions {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}
