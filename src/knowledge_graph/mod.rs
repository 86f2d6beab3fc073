use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fs;
use std::path::Path;
use tracing::info;

use crate::config::OutputFormat;
use crate::core::term::{Term, Triple};
use crate::utils::serialization::RdfSerializer;
use crate::vocab::rdf;

/// Set of triples produced by one extraction run.
///
/// Iteration follows the total order on triples, so two serializations of
/// the same graph are identical.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Graph {
    triples: BTreeSet<Triple>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `false` when the triple was already present.
    pub fn insert(&mut self, triple: Triple) -> bool {
        self.triples.insert(triple)
    }

    pub fn len(&self) -> usize {
        self.triples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triples.is_empty()
    }

    pub fn contains(&self, triple: &Triple) -> bool {
        self.triples.contains(triple)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Triple> {
        self.triples.iter()
    }

    /// Subjects typed `class` with `rdf:type`.
    pub fn subjects_of_type(&self, class: &str) -> Vec<&Term> {
        self.triples
            .iter()
            .filter(|t| t.predicate.as_iri() == Some(rdf::TYPE) && t.object.as_iri() == Some(class))
            .map(|t| &t.subject)
            .collect()
    }

    /// Objects of `predicate` on `subject`.
    pub fn objects(&self, subject: &Term, predicate: &str) -> Vec<&Term> {
        self.triples
            .iter()
            .filter(|t| &t.subject == subject && t.predicate.as_iri() == Some(predicate))
            .map(|t| &t.object)
            .collect()
    }

    /// Number of statements per predicate IRI.
    pub fn predicate_counts(&self) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for triple in &self.triples {
            let predicate = match triple.predicate.as_iri() {
                Some(iri) => iri.to_string(),
                None => triple.predicate.to_string(),
            };
            *counts.entry(predicate).or_insert(0) += 1;
        }
        counts
    }

    pub fn statistics(&self) -> GraphStats {
        let mut unique_subjects = HashSet::new();
        let mut unique_predicates = HashSet::new();
        let mut unique_objects = HashSet::new();
        let mut blank_nodes = HashSet::new();

        for triple in &self.triples {
            unique_subjects.insert(&triple.subject);
            unique_predicates.insert(&triple.predicate);
            unique_objects.insert(&triple.object);
            for term in [&triple.subject, &triple.object] {
                if term.is_blank_node() {
                    blank_nodes.insert(term);
                }
            }
        }

        GraphStats {
            total_triples: self.triples.len(),
            unique_subjects: unique_subjects.len(),
            unique_predicates: unique_predicates.len(),
            unique_objects: unique_objects.len(),
            blank_nodes: blank_nodes.len(),
        }
    }

    pub fn export_to_file<P: AsRef<Path>>(&self, file_path: P, format: &OutputFormat) -> Result<()> {
        let file_path = file_path.as_ref();
        let content = RdfSerializer::serialize(self, format)?;

        fs::write(file_path, content)
            .with_context(|| format!("Failed to write export file: {}", file_path.display()))?;

        info!(
            "Graph exported to: {} (format: {}, {} triples)",
            file_path.display(),
            format,
            self.len()
        );
        Ok(())
    }
}

impl Extend<Triple> for Graph {
    fn extend<I: IntoIterator<Item = Triple>>(&mut self, iter: I) {
        self.triples.extend(iter);
    }
}

impl FromIterator<Triple> for Graph {
    fn from_iter<I: IntoIterator<Item = Triple>>(iter: I) -> Self {
        Self {
            triples: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for Graph {
    type Item = Triple;
    type IntoIter = std::collections::btree_set::IntoIter<Triple>;

    fn into_iter(self) -> Self::IntoIter {
        self.triples.into_iter()
    }
}

impl<'a> IntoIterator for &'a Graph {
    type Item = &'a Triple;
    type IntoIter = std::collections::btree_set::Iter<'a, Triple>;

    fn into_iter(self) -> Self::IntoIter {
        self.triples.iter()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphStats {
    pub total_triples: usize,
    pub unique_subjects: usize,
    pub unique_predicates: usize,
    pub unique_objects: usize,
    pub blank_nodes: usize,
}

impl std::fmt::Display for GraphStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Graph Statistics:\n\
             Total Triples: {}\n\
             Unique Subjects: {}\n\
             Unique Predicates: {}\n\
             Unique Objects: {}\n\
             Blank Nodes: {}",
            self.total_triples,
            self.unique_subjects,
            self.unique_predicates,
            self.unique_objects,
            self.blank_nodes
        )
    }
}
