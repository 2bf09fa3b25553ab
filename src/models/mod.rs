pub mod directive;
pub mod loaders;

pub use directive::{normalize_title, PageDirective, SpecTable};
pub use loaders::{load_spec_table, parse_spec_table, SpecColumns};
