//! Storage layer: the overwritten-per-run results JSON file and debug page dumps.

mod dump;
mod error;
mod results;

pub use dump::{PageDumper, slug};
pub use error::StoreError;
pub use results::ResultsFile;
