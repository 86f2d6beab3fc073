//! Catalogue of mapping rules.
//!
//! A rule is a plain function tagged with the query selecting its input and
//! the labels it provides and requires. The scheduler orders rules from those
//! labels alone, so a rule body never needs to know who runs before it.

pub mod citation;
pub mod files;
pub mod general;

use serde_json::Value;
use std::collections::BTreeSet;
use std::fmt;

use crate::core::context::IdentifierTable;
use crate::core::term::Triple;
use crate::error::{MappingError, MappingResult};

/// Identifier role and label of the dataset entity.
pub const DATASET: &str = "dataset";
/// Identifier role and label of the publisher entity.
pub const PUBLISHER: &str = "publisher";

pub type RuleFn = fn(&Value, &mut IdentifierTable) -> MappingResult<Vec<Triple>>;

/// Ordering label. Carries no data.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Label {
    /// Required by rules that depend on nothing
    Any,
    Named(&'static str),
    /// Self label every rule provides
    Rule(&'static str),
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Label::Any => f.write_str("*"),
            Label::Named(name) => f.write_str(name),
            Label::Rule(name) => write!(f, "rule:{}", name),
        }
    }
}

/// Tagged rule descriptor.
#[derive(Debug, Clone)]
pub struct Rule {
    pub name: &'static str,
    pub query: String,
    provides: Vec<&'static str>,
    requires: Vec<&'static str>,
    body: RuleFn,
}

impl Rule {
    pub fn new(name: &'static str, query: impl Into<String>, body: RuleFn) -> Self {
        Self {
            name,
            query: query.into(),
            provides: Vec::new(),
            requires: Vec::new(),
            body,
        }
    }

    pub fn provides(mut self, labels: &[&'static str]) -> Self {
        self.provides.extend_from_slice(labels);
        self
    }

    pub fn requires(mut self, labels: &[&'static str]) -> Self {
        self.requires.extend_from_slice(labels);
        self
    }

    /// Explicit labels plus the rule's self label.
    pub fn provided_labels(&self) -> BTreeSet<Label> {
        self.provides
            .iter()
            .map(|&name| Label::Named(name))
            .chain(std::iter::once(Label::Rule(self.name)))
            .collect()
    }

    /// Explicit requirements, or the wildcard when there are none.
    pub fn required_labels(&self) -> BTreeSet<Label> {
        if self.requires.is_empty() {
            BTreeSet::from([Label::Any])
        } else {
            self.requires.iter().map(|&name| Label::Named(name)).collect()
        }
    }

    pub fn apply(&self, document: &Value, ids: &mut IdentifierTable) -> MappingResult<Vec<Triple>> {
        (self.body)(document, ids)
    }
}

/// Query selecting the citation block field with the given `typeName`.
pub fn citation_field(type_name: &str) -> String {
    format!(
        r#"$.latestVersion.metadataBlocks.citation.fields[?(@.typeName == "{}")]"#,
        type_name
    )
}

/// Every rule the mapper runs on a Dataverse dataset.
pub fn catalogue() -> Vec<Rule> {
    vec![
        Rule::new("general_dataset", "$", general::general_dataset)
            .provides(&[DATASET])
            .requires(&[PUBLISHER]),
        Rule::new("general_publisher", "$.publisher", general::general_publisher)
            .provides(&[PUBLISHER]),
        Rule::new("citation_title", citation_field("title"), citation::title)
            .requires(&[DATASET]),
        Rule::new(
            "citation_alternative_title",
            citation_field("alternativeTitle"),
            citation::alternative_title,
        )
        .requires(&[DATASET]),
        Rule::new("citation_author", citation_field("author"), citation::author)
            .requires(&[DATASET]),
        Rule::new(
            "citation_dataset_contact",
            citation_field("datasetContact"),
            citation::dataset_contact,
        )
        .requires(&[DATASET]),
        Rule::new(
            "citation_description",
            citation_field("dsDescription"),
            citation::description,
        )
        .requires(&[DATASET]),
        Rule::new("citation_language", citation_field("language"), citation::language)
            .requires(&[DATASET]),
        Rule::new("citation_keyword", citation_field("keyword"), citation::keyword)
            .requires(&[DATASET]),
        Rule::new("citation_subject", citation_field("subject"), citation::subject)
            .requires(&[DATASET]),
        Rule::new("files_distribution", "$.latestVersion.files[*]", files::distribution)
            .requires(&[DATASET]),
    ]
}

// ---------------------------------------------------------------------------
// Field access shared by the rule bodies
// ---------------------------------------------------------------------------

/// Value at a dotted member path, failing when any step is missing.
pub(crate) fn field<'a>(doc: &'a Value, path: &str) -> MappingResult<&'a Value> {
    path.split('.').try_fold(doc, |current, member| {
        current.get(member).ok_or_else(|| MappingError::missing(path))
    })
}

/// String at a dotted member path.
pub(crate) fn str_field<'a>(doc: &'a Value, path: &str) -> MappingResult<&'a str> {
    field(doc, path)?
        .as_str()
        .ok_or_else(|| MappingError::malformed(path, "expected a string"))
}

/// String or number at a dotted member path, rendered as text.
pub(crate) fn scalar_field(doc: &Value, path: &str) -> MappingResult<String> {
    match field(doc, path)? {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        _ => Err(MappingError::malformed(path, "expected a string or a number")),
    }
}

/// Records of a compound citation field (`{"typeName": .., "value": [..]}`).
pub(crate) fn compound_values<'a>(doc: &'a Value, type_name: &str) -> MappingResult<&'a [Value]> {
    match doc.get("value") {
        Some(Value::Array(records)) => Ok(records.as_slice()),
        Some(record @ Value::Object(_)) => Ok(std::slice::from_ref(record)),
        Some(_) => Err(MappingError::malformed(
            format!("{}.value", type_name),
            "expected a list of records",
        )),
        None => Err(MappingError::missing(format!("{}.value", type_name))),
    }
}

/// Values of a primitive or controlled-vocabulary citation field, single or
/// multiple.
pub(crate) fn string_values<'a>(doc: &'a Value, type_name: &str) -> MappingResult<Vec<&'a str>> {
    let path = format!("{}.value", type_name);
    match doc.get("value") {
        Some(Value::String(s)) => Ok(vec![s.as_str()]),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| {
                item.as_str()
                    .ok_or_else(|| MappingError::malformed(path.as_str(), "expected a list of strings"))
            })
            .collect(),
        Some(_) => Err(MappingError::malformed(path, "expected a string or a list of strings")),
        None => Err(MappingError::missing(path)),
    }
}

/// `value` of a sub-field inside a compound record, when present.
pub(crate) fn subfield<'a>(record: &'a Value, name: &str) -> Option<&'a str> {
    record
        .get(name)
        .and_then(|sub| sub.get("value"))
        .and_then(Value::as_str)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_self_label_always_provided() {
        let rule = Rule::new("citation_title", citation_field("title"), citation::title)
            .requires(&[DATASET]);
        assert_eq!(
            rule.provided_labels(),
            BTreeSet::from([Label::Rule("citation_title")])
        );

        let rule = Rule::new("general_publisher", "$.publisher", general::general_publisher)
            .provides(&[PUBLISHER]);
        assert_eq!(
            rule.provided_labels(),
            BTreeSet::from([Label::Named(PUBLISHER), Label::Rule("general_publisher")])
        );
    }

    #[test]
    fn test_no_requirements_means_wildcard() {
        let rule = Rule::new("general_publisher", "$.publisher", general::general_publisher);
        assert_eq!(rule.required_labels(), BTreeSet::from([Label::Any]));
    }

    #[test]
    fn test_catalogue_names_are_unique() {
        let rules = catalogue();
        let names: BTreeSet<&str> = rules.iter().map(|r| r.name).collect();
        assert_eq!(names.len(), rules.len());
    }

    #[test]
    fn test_field_helpers() {
        let doc = json!({"latestVersion": {"versionNumber": 2, "termsOfUse": "CC0"}});
        assert_eq!(str_field(&doc, "latestVersion.termsOfUse").unwrap(), "CC0");
        assert_eq!(scalar_field(&doc, "latestVersion.versionNumber").unwrap(), "2");
        assert_eq!(
            str_field(&doc, "latestVersion.lastUpdateTime").unwrap_err(),
            MappingError::missing("latestVersion.lastUpdateTime")
        );
        assert!(matches!(
            str_field(&doc, "latestVersion.versionNumber"),
            Err(MappingError::MalformedDocumentField { .. })
        ));
    }

    #[test]
    fn test_string_values_single_or_multiple() {
        let single = json!({"typeName": "title", "value": "Soil"});
        assert_eq!(string_values(&single, "title").unwrap(), vec!["Soil"]);

        let multiple = json!({"typeName": "language", "value": ["English", "French"]});
        assert_eq!(string_values(&multiple, "language").unwrap(), vec!["English", "French"]);

        let broken = json!({"typeName": "language", "value": [1]});
        assert!(string_values(&broken, "language").is_err());
    }
}
