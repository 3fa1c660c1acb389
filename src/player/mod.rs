//! Player record structures and extract loading

mod data;
pub mod loader;

pub use data::{PlayerRecord, RangeLabel};
pub use loader::{load_records, load_records_from_reader, records_from_rows, REQUIRED_COLUMNS};
