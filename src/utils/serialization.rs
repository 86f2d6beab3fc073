use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use rio_api::formatter::TriplesFormatter;
use rio_api::model;
use rio_turtle::NTriplesFormatter;

use crate::config::OutputFormat;
use crate::core::term::{escape_literal, Term, Triple};
use crate::knowledge_graph::Graph;
use crate::vocab::{rdf, xsd, PREFIXES};

/// Local names that can be written as `prefix:local` without escaping.
static LOCAL_NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_\-]*$").expect("valid regex"));

pub struct RdfSerializer;

impl RdfSerializer {
    pub fn serialize(graph: &Graph, format: &OutputFormat) -> Result<String> {
        match format {
            OutputFormat::Turtle => Ok(Self::serialize_turtle(graph)),
            OutputFormat::NTriples => Self::serialize_ntriples(graph),
            OutputFormat::Json => Self::serialize_json(graph),
        }
    }

    /// Prefix declarations followed by one statement per line.
    fn serialize_turtle(graph: &Graph) -> String {
        let mut output = String::new();

        for (prefix, namespace) in PREFIXES {
            output.push_str(&format!("@prefix {}: <{}> .\n", prefix, namespace));
        }
        output.push('\n');

        for triple in graph {
            let predicate = match triple.predicate.as_iri() {
                Some(rdf::TYPE) => "a".to_string(),
                _ => Self::format_term_for_turtle(&triple.predicate),
            };
            output.push_str(&format!(
                "{} {} {} .\n",
                Self::format_term_for_turtle(&triple.subject),
                predicate,
                Self::format_term_for_turtle(&triple.object)
            ));
        }

        output
    }

    fn format_term_for_turtle(term: &Term) -> String {
        match term {
            Term::Iri(iri) => Self::format_iri_for_turtle(iri),
            Term::BlankNode(id) => format!("_:{}", id),
            Term::Literal {
                value,
                language: Some(language),
                ..
            } => format!("\"{}\"@{}", escape_literal(value), language),
            Term::Literal { value, datatype, .. } if datatype == xsd::STRING => {
                format!("\"{}\"", escape_literal(value))
            }
            Term::Literal { value, datatype, .. } => format!(
                "\"{}\"^^{}",
                escape_literal(value),
                Self::format_iri_for_turtle(datatype)
            ),
        }
    }

    fn format_iri_for_turtle(iri: &str) -> String {
        PREFIXES
            .iter()
            .find_map(|(prefix, namespace)| {
                iri.strip_prefix(namespace)
                    .filter(|local| LOCAL_NAME_RE.is_match(local))
                    .map(|local| format!("{}:{}", prefix, local))
            })
            .unwrap_or_else(|| format!("<{}>", iri))
    }

    fn serialize_ntriples(graph: &Graph) -> Result<String> {
        let mut buffer = Vec::new();
        {
            let mut formatter = NTriplesFormatter::new(&mut buffer);
            for triple in graph {
                formatter
                    .format(&Self::to_rio(triple)?)
                    .context("Failed to write N-Triples statement")?;
            }
        }
        String::from_utf8(buffer).context("N-Triples output is not valid UTF-8")
    }

    fn to_rio(triple: &Triple) -> Result<model::Triple<'_>> {
        let subject = match &triple.subject {
            Term::Iri(iri) => model::Subject::NamedNode(model::NamedNode { iri }),
            Term::BlankNode(id) => model::Subject::BlankNode(model::BlankNode { id }),
            Term::Literal { .. } => anyhow::bail!("Literal in subject position: {}", triple.subject),
        };
        let predicate = match &triple.predicate {
            Term::Iri(iri) => model::NamedNode { iri },
            other => anyhow::bail!("Predicate is not an IRI: {}", other),
        };
        let object = match &triple.object {
            Term::Iri(iri) => model::Term::NamedNode(model::NamedNode { iri }),
            Term::BlankNode(id) => model::Term::BlankNode(model::BlankNode { id }),
            Term::Literal {
                value,
                language: Some(language),
                ..
            } => model::Term::Literal(model::Literal::LanguageTaggedString { value, language }),
            Term::Literal { value, datatype, .. } if datatype == xsd::STRING => {
                model::Term::Literal(model::Literal::Simple { value })
            }
            Term::Literal { value, datatype, .. } => model::Term::Literal(model::Literal::Typed {
                value,
                datatype: model::NamedNode { iri: datatype },
            }),
        };

        Ok(model::Triple {
            subject,
            predicate,
            object,
        })
    }

    fn serialize_json(graph: &Graph) -> Result<String> {
        let triples: Vec<&Triple> = graph.iter().collect();
        serde_json::to_string_pretty(&triples).context("Failed to serialize to JSON")
    }
}

/// The persistent identifier without characters that are not allowed in
/// file names.
fn file_stem(persistent_id: &str) -> String {
    persistent_id
        .chars()
        .filter(|c| !matches!(c, '\\' | '/' | ':' | '*' | '?' | '<' | '>' | '|'))
        .collect()
}

/// File name for an exported dataset graph.
pub fn export_file_name(persistent_id: &str, format: &OutputFormat) -> String {
    format!("{}.{}", file_stem(persistent_id), format.extension())
}

/// File name for the zip archive of a dataset's files.
pub fn archive_file_name(persistent_id: &str) -> String {
    format!("{}.zip", file_stem(persistent_id))
}
