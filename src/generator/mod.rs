//! Random query and import dataset generation.

mod import;
mod query;

pub use import::{generate_import_csv, ImportRow, ImportRows, ImportSpec};
pub use query::{IdToFrame, QueryGenerator, DEFAULT_FRAME};
