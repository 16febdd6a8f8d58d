pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::{CliConfig, Command};
pub use config::TomlConfig;

pub use adapters::{HttpLeadRepository, JsonFileLeadRepository, LocalStorage, MemoryLeadRepository};
pub use core::{
    csv_codec::{parse_csv, to_csv},
    etl::LeadEtlEngine,
    export::leads_to_csv,
    import::import_leads,
    mapping::map_row,
    numeric::{parse_int_or_null, parse_money_to_number},
};
pub use domain::model::{CsvRow, Delimiter, ImportSummary, Lead, LeadEmail, LeadPhone, LeadType, NewLead};
pub use utils::error::{LeadError, Result};
