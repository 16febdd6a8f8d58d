pub mod csv_codec;
pub mod etl;
pub mod export;
pub mod import;
pub mod mapping;
pub mod numeric;

pub use crate::domain::model::{CsvRow, ImportSummary, Lead, LeadType, NewLead};
pub use crate::domain::ports::{ConfigProvider, LeadRepository, Storage};
pub use crate::utils::error::Result;
