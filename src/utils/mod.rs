pub mod iri;
pub mod language;
pub mod serialization;
pub mod topo;

pub use iri::{document_iri, find_iri, html_to_text, license_literal};
pub use language::{LanguageResolver, ResolvedLanguage};
pub use serialization::{archive_file_name, export_file_name, RdfSerializer};
pub use topo::topological_sort;
