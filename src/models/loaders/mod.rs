pub mod tsv_loader;

pub use tsv_loader::{load_spec_table, parse_spec_table, SpecColumns};
