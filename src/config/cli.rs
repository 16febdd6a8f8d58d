use crate::domain::model::{Delimiter, LeadType};
use crate::utils::error::Result;
use crate::utils::validation::{validate_file_extension, validate_path, Validate};
use clap::{Parser, Subcommand};

const IMPORT_EXTENSIONS: &[&str] = &["csv", "txt"];

#[derive(Debug, Clone, Parser)]
#[command(name = "leads-etl")]
#[command(about = "Import and export CRM leads as CSV")]
pub struct CliConfig {
    #[arg(long, global = true, help = "Path to a TOML config file")]
    pub config: Option<String>,

    #[arg(short, long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, global = true, help = "Emit logs as JSON")]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Import leads from a CSV file (comma or semicolon separated)
    Import {
        file: String,

        #[arg(long, help = "Lead type used when a row has no lead_type column")]
        lead_type: Option<LeadType>,

        #[arg(long, help = "Map and validate rows without persisting them")]
        dry_run: bool,
    },
    /// Export stored leads to a CSV file
    Export {
        #[arg(long, help = "Only export leads of this type")]
        lead_type: Option<LeadType>,

        #[arg(long, help = "Output delimiter: ',' or ';'")]
        delimiter: Option<Delimiter>,

        #[arg(long, help = "Output directory")]
        output: Option<String>,
    },
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        if let Some(config) = &self.config {
            validate_path("config", config)?;
        }

        match &self.command {
            Command::Import { file, .. } => {
                validate_path("file", file)?;
                validate_file_extension("file", file, IMPORT_EXTENSIONS)
            }
            Command::Export { output, .. } => match output {
                Some(output) => validate_path("output", output),
                None => Ok(()),
            },
        }
    }
}
