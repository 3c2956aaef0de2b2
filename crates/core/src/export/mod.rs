//! CSV export of the transaction history.

pub mod csv;

pub use self::csv::{write_csv, ExportError};
