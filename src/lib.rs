pub mod config;
pub mod core;
pub mod error;
pub mod handlers;
pub mod knowledge_graph;
pub mod rules;
pub mod utils;
pub mod vocab;

pub use config::Configuration;
pub use core::{DatasetMapper, ExtractionResult, Term, Triple};
pub use error::{MappingError, MappingResult};
pub use handlers::{DatasetSource, DataverseClient};
pub use knowledge_graph::Graph;
