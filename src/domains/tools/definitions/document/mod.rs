//! Document tools module.
//!
//! - `pdf`: PDF download, text, table and metadata extraction
//! - `text`: cleaning, counting and extraction over plain text

pub mod pdf;
pub mod text;

pub use pdf::{
    CountPdfPagesTool, ExtractPdfMetadataTool, ExtractTablesFromPdfTool, ExtractTextFromPdfTool,
};
pub use text::{CleanTextTool, CountWordsTool, ExtractEmailsTool, ExtractUrlsTool};
