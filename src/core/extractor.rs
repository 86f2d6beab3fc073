use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use std::time::Instant;
use tracing::{debug, info};
use uuid::Uuid;

use crate::core::context::IdentifierTable;
use crate::core::query::DocumentQuery;
use crate::core::scheduler::schedule_indices;
use crate::core::term::Term;
use crate::error::MappingResult;
use crate::knowledge_graph::Graph;
use crate::rules::{catalogue, Rule};

/// What one rule contributed to a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleStats {
    pub rule: String,
    pub matches: usize,
    pub triples: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExtractionResult {
    pub id: String,
    pub document_source: String,
    pub extraction_timestamp: DateTime<Utc>,
    pub processing_time_seconds: f64,
    pub rule_stats: Vec<RuleStats>,
    pub graph: Graph,
}

impl ExtractionResult {
    fn new(
        document_source: String,
        rule_stats: Vec<RuleStats>,
        graph: Graph,
        processing_time_seconds: f64,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            document_source,
            extraction_timestamp: Utc::now(),
            processing_time_seconds,
            rule_stats,
            graph,
        }
    }
}

struct ScheduledRule {
    rule: Rule,
    query: DocumentQuery,
}

/// Maps Dataverse dataset documents to DCAT graphs.
///
/// Queries are parsed and the rules ordered once, when the mapper is built.
/// A mapper holds no per-run state and can be shared between threads; each
/// call owns its own identifier table and graph.
pub struct DatasetMapper {
    rules: Vec<ScheduledRule>,
}

impl DatasetMapper {
    pub fn new(rules: Vec<Rule>) -> MappingResult<Self> {
        let order = schedule_indices(&rules)?;

        let mut slots: Vec<Option<Rule>> = rules.into_iter().map(Some).collect();
        let mut scheduled = Vec::with_capacity(slots.len());
        for index in order {
            if let Some(rule) = slots[index].take() {
                let query = DocumentQuery::parse(&rule.query)?;
                scheduled.push(ScheduledRule { rule, query });
            }
        }

        debug!(
            "Rule schedule: {}",
            scheduled
                .iter()
                .map(|s| s.rule.name)
                .collect::<Vec<_>>()
                .join(" -> ")
        );

        Ok(Self { rules: scheduled })
    }

    /// Mapper over the built-in rule catalogue.
    pub fn with_catalogue() -> MappingResult<Self> {
        Self::new(catalogue())
    }

    /// Rule names in execution order.
    pub fn rule_names(&self) -> Vec<&'static str> {
        self.rules.iter().map(|s| s.rule.name).collect()
    }

    pub fn extract(&self, document: &Value) -> MappingResult<Graph> {
        self.run(document, "document").map(|result| result.graph)
    }

    /// The extracted graph as plain `(subject, predicate, object)` tuples.
    pub fn extract_to_triples_sequence(
        &self,
        document: &Value,
    ) -> MappingResult<Vec<(Term, Term, Term)>> {
        Ok(self
            .extract(document)?
            .into_iter()
            .map(|triple| triple.into_parts())
            .collect())
    }

    /// Run every rule over `document`, keeping per-rule statistics.
    ///
    /// The first failing rule aborts the run and nothing is returned.
    pub fn run(&self, document: &Value, source: &str) -> MappingResult<ExtractionResult> {
        let start_time = Instant::now();
        info!("Starting extraction from document: {}", source);

        let mut ids = IdentifierTable::new();
        let mut graph = Graph::new();
        let mut rule_stats = Vec::with_capacity(self.rules.len());

        for ScheduledRule { rule, query } in &self.rules {
            let matches = query.select(document);
            let mut produced = 0;
            for sub_document in &matches {
                let triples = rule.apply(sub_document, &mut ids)?;
                produced += triples.len();
                graph.extend(triples);
            }

            debug!(
                "Rule {} matched {} value(s), produced {} triple(s)",
                rule.name,
                matches.len(),
                produced
            );
            rule_stats.push(RuleStats {
                rule: rule.name.to_string(),
                matches: matches.len(),
                triples: produced,
            });
        }

        let processing_time = start_time.elapsed().as_secs_f64();
        info!(
            "Extraction completed: {} triples extracted in {:.2}s",
            graph.len(),
            processing_time
        );

        Ok(ExtractionResult::new(source.to_string(), rule_stats, graph, processing_time))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::term::Triple;
    use crate::error::MappingError;
    use crate::vocab::{dcat, dcterms, foaf, rdf};
    use serde_json::json;

    fn citation(fields: Value) -> Value {
        json!({"citation": {"displayName": "Citation Metadata", "fields": fields}})
    }

    fn minimal_document() -> Value {
        json!({
            "id": 42,
            "persistentUrl": "https://doi.org/10.15454/DOWA7X",
            "publicationDate": "2021-03-04",
            "publisher": "Recherche Data Gouv",
            "latestVersion": {
                "lastUpdateTime": "2021-03-04T10:11:12Z",
                "versionNumber": 1,
                "versionMinorNumber": 0,
                "termsOfUse": "All rights reserved",
                "metadataBlocks": citation(json!([
                    {"typeName": "title", "multiple": false, "typeClass": "primitive",
                     "value": "Soil carbon"},
                    {"typeName": "author", "multiple": true, "typeClass": "compound",
                     "value": [{"authorName": {"typeName": "authorName", "value": "INRAE"}}]}
                ]))
            }
        })
    }

    fn shape(graph: &Graph) -> Vec<(String, String)> {
        let mut shape: Vec<(String, String)> = graph
            .iter()
            .map(|t| {
                let object = if t.object.is_blank_node() {
                    "_".to_string()
                } else {
                    t.object.to_string()
                };
                (t.predicate.to_string(), object)
            })
            .collect();
        shape.sort();
        shape
    }

    #[test]
    fn test_minimal_document() {
        let mapper = DatasetMapper::with_catalogue().unwrap();
        let graph = mapper.extract(&minimal_document()).unwrap();

        assert_eq!(graph.len(), 12);
        assert_eq!(graph.subjects_of_type(dcat::DATASET).len(), 1);
        assert_eq!(graph.subjects_of_type(foaf::AGENT).len(), 1);
        assert_eq!(graph.subjects_of_type(foaf::ORGANIZATION).len(), 1);

        let dataset = graph.subjects_of_type(dcat::DATASET)[0].clone();
        assert!(graph.contains(&Triple::new(dataset, dcterms::TITLE, Term::string("Soil carbon"))));
    }

    #[test]
    fn test_runs_differ_only_in_blank_nodes() {
        let mapper = DatasetMapper::with_catalogue().unwrap();
        let first = mapper.extract(&minimal_document()).unwrap();
        let second = mapper.extract(&minimal_document()).unwrap();
        assert_eq!(shape(&first), shape(&second));
    }

    #[test]
    fn test_triples_sequence_matches_graph() {
        let mapper = DatasetMapper::with_catalogue().unwrap();
        let sequence = mapper.extract_to_triples_sequence(&minimal_document()).unwrap();
        assert_eq!(sequence.len(), 12);
        assert!(sequence
            .iter()
            .any(|(_, p, o)| p == &Term::iri(rdf::TYPE) && o == &Term::iri(dcat::DATASET)));
    }

    #[test]
    fn test_run_reports_rule_stats() {
        let mapper = DatasetMapper::with_catalogue().unwrap();
        let result = mapper.run(&minimal_document(), "doi:10.15454/DOWA7X").unwrap();
        assert_eq!(result.document_source, "doi:10.15454/DOWA7X");
        assert_eq!(result.rule_stats.len(), mapper.rule_names().len());
        assert_eq!(
            result.rule_stats[0],
            RuleStats {
                rule: "general_publisher".to_string(),
                matches: 1,
                triples: 2
            }
        );
        let keyword = result.rule_stats.iter().find(|s| s.rule == "citation_keyword").unwrap();
        assert_eq!(keyword.matches, 0);
    }

    #[test]
    fn test_missing_publisher_aborts() {
        let mut document = minimal_document();
        document.as_object_mut().unwrap().remove("publisher");
        let mapper = DatasetMapper::with_catalogue().unwrap();
        assert_eq!(
            mapper.extract(&document).unwrap_err(),
            MappingError::UnresolvedReference { role: "publisher".to_string() }
        );
    }

    #[test]
    fn test_unsupported_language_aborts_whole_run() {
        let mut document = minimal_document();
        document["latestVersion"]["metadataBlocks"]["citation"]["fields"]
            .as_array_mut()
            .unwrap()
            .push(json!({"typeName": "language", "multiple": true,
                         "typeClass": "controlledVocabulary", "value": ["Martian"]}));
        let mapper = DatasetMapper::with_catalogue().unwrap();
        assert_eq!(
            mapper.extract(&document).unwrap_err(),
            MappingError::UnsupportedLanguage { language: "Martian".to_string() }
        );
    }

    #[test]
    fn test_invalid_license_iri_aborts_run() {
        let mut document = minimal_document();
        document["latestVersion"]["license"] =
            json!({"name": "Mine", "uri": "http://example.org/my license"});
        let mapper = DatasetMapper::with_catalogue().unwrap();
        assert!(matches!(
            mapper.extract(&document),
            Err(MappingError::MalformedDocumentField { field, .. }) if field == "latestVersion.license.uri"
        ));
    }

    #[test]
    fn test_invalid_query_rejected_at_build() {
        fn noop(_: &Value, _: &mut IdentifierTable) -> MappingResult<Vec<Triple>> {
            Ok(Vec::new())
        }
        let result = DatasetMapper::new(vec![Rule::new("broken", "publisher", noop)]);
        assert!(matches!(result, Err(MappingError::InvalidQuery { .. })));
    }

    #[test]
    fn test_mapper_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<DatasetMapper>();
    }
}
