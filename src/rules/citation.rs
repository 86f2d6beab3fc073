//! Rules for the fields of the `citation` metadata block.

use serde_json::Value;

use super::{compound_values, str_field, string_values, subfield, DATASET};
use crate::core::context::IdentifierTable;
use crate::core::term::{Term, Triple};
use crate::error::{MappingError, MappingResult};
use crate::utils::iri::document_iri;
use crate::utils::language::LanguageResolver;
use crate::vocab::{dcat, dcterms, foaf, rdf, vcard};

/// Placeholder Dataverse stores when a description was never provided.
pub const DESCRIPTION_UNAVAILABLE: &str = "value unavailable";

/// Whether a named party is a person belonging to an organization, or an
/// organization in its own right.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgentKind<'a> {
    Person { affiliation: &'a str },
    Organization,
}

/// A party whose affiliation repeats its own name is the organization itself;
/// keeping the affiliation would link it to itself.
pub fn classify_agent<'a>(name: &str, affiliation: Option<&'a str>) -> AgentKind<'a> {
    match affiliation.map(str::trim) {
        Some(affiliation)
            if !affiliation.is_empty()
                && affiliation.to_lowercase() != name.trim().to_lowercase() =>
        {
            AgentKind::Person { affiliation }
        }
        _ => AgentKind::Organization,
    }
}

pub fn title(doc: &Value, ids: &mut IdentifierTable) -> MappingResult<Vec<Triple>> {
    let dataset = ids.get(DATASET)?;
    Ok(vec![Triple::new(
        dataset.clone(),
        dcterms::TITLE,
        Term::string(str_field(doc, "value")?),
    )])
}

pub fn alternative_title(doc: &Value, ids: &mut IdentifierTable) -> MappingResult<Vec<Triple>> {
    let dataset = ids.get(DATASET)?;
    Ok(string_values(doc, "alternativeTitle")?
        .into_iter()
        .map(|value| Triple::new(dataset.clone(), dcterms::TITLE, Term::string(value)))
        .collect())
}

pub fn author(doc: &Value, _ids: &mut IdentifierTable) -> MappingResult<Vec<Triple>> {
    let mut triples = Vec::new();

    for record in compound_values(doc, "author")? {
        let name = subfield(record, "authorName")
            .ok_or_else(|| MappingError::missing("author.authorName"))?;
        let author = Term::fresh_blank_node();

        match classify_agent(name, subfield(record, "authorAffiliation")) {
            AgentKind::Person { .. } => {
                let organization = Term::fresh_blank_node();
                triples.push(Triple::new(author.clone(), rdf::TYPE, Term::iri(foaf::AGENT)));
                triples.push(Triple::new(
                    organization.clone(),
                    rdf::TYPE,
                    Term::iri(foaf::ORGANIZATION),
                ));
                triples.push(Triple::new(author, foaf::MEMBER, organization));
            }
            AgentKind::Organization => {
                triples.push(Triple::new(author, rdf::TYPE, Term::iri(foaf::ORGANIZATION)));
            }
        }
    }

    Ok(triples)
}

pub fn dataset_contact(doc: &Value, ids: &mut IdentifierTable) -> MappingResult<Vec<Triple>> {
    let dataset = ids.get(DATASET)?;
    let mut triples = Vec::new();

    for record in compound_values(doc, "datasetContact")? {
        let name = subfield(record, "datasetContactName")
            .ok_or_else(|| MappingError::missing("datasetContact.datasetContactName"))?;
        let contact = Term::fresh_blank_node();

        match classify_agent(name, subfield(record, "datasetContactAffiliation")) {
            AgentKind::Person { affiliation } => {
                triples.push(Triple::new(contact.clone(), rdf::TYPE, Term::iri(vcard::KIND)));
                triples.push(Triple::new(
                    contact.clone(),
                    vcard::ORGANIZATION_NAME,
                    Term::string(affiliation),
                ));
            }
            AgentKind::Organization => {
                triples.push(Triple::new(
                    contact.clone(),
                    rdf::TYPE,
                    Term::iri(vcard::ORGANIZATION),
                ));
            }
        }

        triples.push(Triple::new(contact.clone(), vcard::FN, Term::string(name)));

        if let Some(email) = subfield(record, "datasetContactEmail").filter(|e| !e.is_empty()) {
            triples.push(Triple::new(
                contact.clone(),
                vcard::HAS_EMAIL,
                document_iri(
                    format!("mailto:{}", email),
                    "datasetContact.datasetContactEmail",
                )?,
            ));
        }

        triples.push(Triple::new(dataset.clone(), dcat::CONTACT_POINT, contact));
    }

    Ok(triples)
}

pub fn description(doc: &Value, ids: &mut IdentifierTable) -> MappingResult<Vec<Triple>> {
    let dataset = ids.get(DATASET)?;
    let mut triples = Vec::new();

    for record in compound_values(doc, "dsDescription")? {
        let value = subfield(record, "dsDescriptionValue")
            .ok_or_else(|| MappingError::missing("dsDescription.dsDescriptionValue"))?;
        if value == DESCRIPTION_UNAVAILABLE {
            continue;
        }

        let text = match subfield(record, "dsDescriptionDate") {
            Some(date) => format!("{} (Description provided on {})", value, date),
            None => value.to_string(),
        };
        triples.push(Triple::new(dataset.clone(), dcterms::DESCRIPTION, Term::string(text)));
    }

    Ok(triples)
}

/// One `dcterms:language` statement per resolved ISO 639 code.
pub fn language(doc: &Value, ids: &mut IdentifierTable) -> MappingResult<Vec<Triple>> {
    let dataset = ids.get(DATASET)?;
    let resolver = LanguageResolver::new();
    let mut triples = Vec::new();

    for raw in string_values(doc, "language")? {
        for resolved in resolver.resolve(raw)? {
            triples.push(Triple::new(
                dataset.clone(),
                dcterms::LANGUAGE,
                Term::iri(resolved.uri),
            ));
        }
    }

    Ok(triples)
}

pub fn keyword(doc: &Value, ids: &mut IdentifierTable) -> MappingResult<Vec<Triple>> {
    let dataset = ids.get(DATASET)?;
    compound_values(doc, "keyword")?
        .iter()
        .map(|record| {
            subfield(record, "keywordValue")
                .map(|value| Triple::new(dataset.clone(), dcat::KEYWORD, Term::string(value)))
                .ok_or_else(|| MappingError::missing("keyword.keywordValue"))
        })
        .collect()
}

pub fn subject(doc: &Value, ids: &mut IdentifierTable) -> MappingResult<Vec<Triple>> {
    let dataset = ids.get(DATASET)?;
    Ok(string_values(doc, "subject")?
        .into_iter()
        .map(|value| Triple::new(dataset.clone(), dcterms::SUBJECT, Term::string(value)))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ids_with_dataset() -> IdentifierTable {
        let mut ids = IdentifierTable::new();
        ids.mint(DATASET);
        ids
    }

    fn author_field(name: &str, affiliation: Option<&str>) -> Value {
        let mut record = json!({
            "authorName": {"typeName": "authorName", "value": name}
        });
        if let Some(affiliation) = affiliation {
            record["authorAffiliation"] =
                json!({"typeName": "authorAffiliation", "value": affiliation});
        }
        json!({"typeName": "author", "multiple": true, "typeClass": "compound", "value": [record]})
    }

    fn types(triples: &[Triple]) -> Vec<&str> {
        triples
            .iter()
            .filter(|t| t.predicate.as_iri() == Some(rdf::TYPE))
            .filter_map(|t| t.object.as_iri())
            .collect()
    }

    #[test]
    fn test_classify_agent() {
        assert_eq!(classify_agent("Acme", Some("ACME ")), AgentKind::Organization);
        assert_eq!(classify_agent("Acme", None), AgentKind::Organization);
        assert_eq!(classify_agent("Acme", Some("")), AgentKind::Organization);
        assert_eq!(
            classify_agent("Jane Doe", Some("Acme")),
            AgentKind::Person { affiliation: "Acme" }
        );
    }

    #[test]
    fn test_author_same_as_affiliation_is_organization() {
        let mut ids = ids_with_dataset();
        let triples = author(&author_field("Acme", Some("acme")), &mut ids).unwrap();
        assert_eq!(triples.len(), 1);
        assert_eq!(types(&triples), vec![foaf::ORGANIZATION]);
    }

    #[test]
    fn test_author_with_affiliation_is_member() {
        let mut ids = ids_with_dataset();
        let triples = author(&author_field("Jane Doe", Some("Acme")), &mut ids).unwrap();
        assert_eq!(triples.len(), 3);

        let membership = triples
            .iter()
            .find(|t| t.predicate.as_iri() == Some(foaf::MEMBER))
            .unwrap();
        assert_ne!(membership.subject, membership.object);
        assert!(triples.contains(&Triple::new(
            membership.subject.clone(),
            rdf::TYPE,
            Term::iri(foaf::AGENT)
        )));
        assert!(triples.contains(&Triple::new(
            membership.object.clone(),
            rdf::TYPE,
            Term::iri(foaf::ORGANIZATION)
        )));
    }

    #[test]
    fn test_author_without_name_is_rejected() {
        let mut ids = ids_with_dataset();
        let doc = json!({"typeName": "author", "value": [
            {"authorAffiliation": {"typeName": "authorAffiliation", "value": "Acme"}}
        ]});
        assert_eq!(
            author(&doc, &mut ids).unwrap_err(),
            MappingError::missing("author.authorName")
        );
    }

    #[test]
    fn test_contact_person_with_email() {
        let mut ids = ids_with_dataset();
        let doc = json!({"typeName": "datasetContact", "value": [{
            "datasetContactName": {"value": "Doe, Jane"},
            "datasetContactAffiliation": {"value": "INRAE"},
            "datasetContactEmail": {"value": "jane.doe@example.org"}
        }]});
        let triples = dataset_contact(&doc, &mut ids).unwrap();
        assert_eq!(triples.len(), 5);
        assert_eq!(types(&triples), vec![vcard::KIND]);

        let contact = &triples
            .iter()
            .find(|t| t.predicate.as_iri() == Some(dcat::CONTACT_POINT))
            .unwrap()
            .object;
        assert!(triples.contains(&Triple::new(
            contact.clone(),
            vcard::HAS_EMAIL,
            Term::iri("mailto:jane.doe@example.org")
        )));
        assert!(triples.contains(&Triple::new(
            contact.clone(),
            vcard::ORGANIZATION_NAME,
            Term::string("INRAE")
        )));
    }

    #[test]
    fn test_contact_with_invalid_email_is_malformed() {
        let mut ids = ids_with_dataset();
        let doc = json!({"typeName": "datasetContact", "value": [{
            "datasetContactName": {"value": "Doe, Jane"},
            "datasetContactEmail": {"value": "jane doe@example.org"}
        }]});
        match dataset_contact(&doc, &mut ids) {
            Err(MappingError::MalformedDocumentField { field, .. }) => {
                assert_eq!(field, "datasetContact.datasetContactEmail")
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_contact_organization_drops_affiliation() {
        let mut ids = ids_with_dataset();
        let doc = json!({"typeName": "datasetContact", "value": [{
            "datasetContactName": {"value": "INRAE"},
            "datasetContactAffiliation": {"value": "inrae"}
        }]});
        let triples = dataset_contact(&doc, &mut ids).unwrap();
        assert_eq!(triples.len(), 3);
        assert_eq!(types(&triples), vec![vcard::ORGANIZATION]);
        assert!(triples
            .iter()
            .all(|t| t.predicate.as_iri() != Some(vcard::ORGANIZATION_NAME)));
    }

    #[test]
    fn test_description_skips_sentinel_and_appends_date() {
        let mut ids = ids_with_dataset();
        let doc = json!({"typeName": "dsDescription", "value": [
            {"dsDescriptionValue": {"value": "value unavailable"}},
            {"dsDescriptionValue": {"value": "Soil cores."},
             "dsDescriptionDate": {"value": "2020-01-31"}}
        ]});
        let triples = description(&doc, &mut ids).unwrap();
        assert_eq!(triples.len(), 1);
        assert_eq!(
            triples[0].object,
            Term::string("Soil cores. (Description provided on 2020-01-31)")
        );
    }

    #[test]
    fn test_language_emits_one_statement_per_code() {
        let mut ids = ids_with_dataset();
        let doc = json!({"typeName": "language", "value": ["English", "Castillian", "Not applicable"]});
        let objects: Vec<Term> = language(&doc, &mut ids)
            .unwrap()
            .into_iter()
            .map(|t| t.object)
            .collect();
        assert_eq!(
            objects,
            vec![
                Term::iri("http://id.loc.gov/vocabulary/iso639-1/en"),
                Term::iri("http://id.loc.gov/vocabulary/iso639-1/es"),
                Term::iri("http://id.loc.gov/vocabulary/iso639-2/zxx"),
            ]
        );
    }

    #[test]
    fn test_language_failure_aborts() {
        let mut ids = ids_with_dataset();
        let doc = json!({"typeName": "language", "value": ["Martian"]});
        assert!(matches!(
            language(&doc, &mut ids),
            Err(MappingError::UnsupportedLanguage { .. })
        ));
    }

    #[test]
    fn test_keywords_and_subjects() {
        let mut ids = ids_with_dataset();
        let keywords = json!({"typeName": "keyword", "value": [
            {"keywordValue": {"value": "soil"}},
            {"keywordValue": {"value": "carbon"}}
        ]});
        assert_eq!(keyword(&keywords, &mut ids).unwrap().len(), 2);

        let subjects = json!({"typeName": "subject", "value": ["Earth and Environmental Sciences"]});
        let triples = subject(&subjects, &mut ids).unwrap();
        assert_eq!(triples[0].object, Term::string("Earth and Environmental Sciences"));
    }

    #[test]
    fn test_rules_need_the_dataset() {
        let mut ids = IdentifierTable::new();
        let doc = json!({"typeName": "title", "value": "Soil"});
        assert!(matches!(
            title(&doc, &mut ids),
            Err(MappingError::UnresolvedReference { .. })
        ));
    }
}
