pub mod concatenator;
pub mod optimizer;
pub mod splitter;

pub use concatenator::Concatenator;
pub use optimizer::Optimizer;
pub use splitter::Splitter;
