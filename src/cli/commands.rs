use clap::{Parser, Subcommand};
use qf_calculator::report::OutputFormat;

#[derive(Parser)]
#[command(name = "qf-calc")]
#[command(about = "Quadratic Funding match calculator with shareable links")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show the state carried by a shared query (defaults if none)
    Show {
        /// Shared query string or URL, e.g. "grant=1,2&grant=&match=1000"
        #[arg(short, long)]
        query: Option<String>,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },

    /// Compute matches for explicitly listed grants
    Compute {
        /// Contributions of one grant, comma separated; repeat once per grant
        #[arg(short, long = "grant", allow_hyphen_values = true)]
        grants: Vec<String>,

        /// Match budget (defaults to the configured budget)
        #[arg(short, long, allow_hyphen_values = true)]
        budget: Option<String>,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },

    /// Append an empty grant
    Add {
        #[arg(short, long)]
        query: Option<String>,

        #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },

    /// Remove a grant by its number (as shown in the table)
    Remove {
        /// Grant number, starting at 1
        number: usize,

        #[arg(short, long)]
        query: Option<String>,

        #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },

    /// Replace a grant's contributions
    Update {
        /// Grant number, starting at 1
        number: usize,

        /// Contribution amounts, space or comma separated
        #[arg(allow_hyphen_values = true)]
        amounts: Vec<String>,

        #[arg(short, long)]
        query: Option<String>,

        #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },

    /// Set the match budget
    Budget {
        /// New match budget
        #[arg(allow_hyphen_values = true)]
        value: String,

        #[arg(short, long)]
        query: Option<String>,

        #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },

    /// Start an interactive calculator session
    Session {
        /// Shared query string or URL to start from
        #[arg(short, long)]
        query: Option<String>,
    },

    /// Write the default configuration file
    Init {
        /// Where to write the file
        #[arg(short, long)]
        path: Option<String>,

        /// Overwrite without asking
        #[arg(short, long)]
        yes: bool,
    },
}
