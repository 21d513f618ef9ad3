use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "agroinsights",
    version,
    about = "Agronomic insights and reports for parcel sensor readings"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to config.yaml
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Override SQLite data directory
    #[arg(short, long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Increase log verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fleet statistics plus an analysis of every parcela with recent readings
    Insights,
    /// Analysis of a single parcela
    Parcela {
        /// Parcela identifier
        id: String,
    },
    /// Write reports for one or more parcelas
    Export {
        /// Parcela identifiers
        #[arg(required = true)]
        ids: Vec<String>,

        /// Report format (defaults to the configured one)
        #[arg(short, long, value_enum)]
        format: Option<FormatArg>,

        /// Output directory (defaults to the configured one, then the current directory)
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
    /// Load parcelas and readings from a JSON or YAML bundle
    Import {
        /// Bundle file (.json, .yaml or .yml)
        file: PathBuf,
    },
    /// Run interactive setup
    Init,
    /// Validate config and the reading store
    Check,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FormatArg {
    Structured,
    Narrative,
}

impl From<FormatArg> for agroinsights::report::ReportFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Structured => Self::Structured,
            FormatArg::Narrative => Self::Narrative,
        }
    }
}
