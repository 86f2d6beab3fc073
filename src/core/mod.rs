pub mod context;
pub mod extractor;
pub mod query;
pub mod scheduler;
pub mod term;

pub use context::IdentifierTable;
pub use extractor::{DatasetMapper, ExtractionResult, RuleStats};
pub use query::DocumentQuery;
pub use scheduler::{schedule, unprovided_requirements};
pub use term::{Term, Triple};
