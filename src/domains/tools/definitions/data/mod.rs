//! Data processing tools.
//!
//! - `validate`: email, URL and phone format checks
//! - `convert`: CSV <-> JSON conversion
//! - `text`: string cleaning and whitespace normalization
//! - `detect`: data type classification
//! - `duplicates`: duplicate detection
//! - `statistics`: descriptive statistics

pub mod convert;
pub mod detect;
pub mod duplicates;
pub mod statistics;
pub mod text;
pub mod validate;

pub use convert::{CsvToJsonTool, JsonToCsvTool};
pub use detect::DetectDataTypeTool;
pub use duplicates::FindDuplicatesTool;
pub use statistics::CalculateStatisticsTool;
pub use text::{CleanStringTool, NormalizeWhitespaceTool};
pub use validate::{ValidateEmailTool, ValidatePhoneTool, ValidateUrlTool};
