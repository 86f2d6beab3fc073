//! Rules for the files attached to the latest dataset version.

use serde_json::Value;

use super::{field, str_field, DATASET};
use crate::core::context::IdentifierTable;
use crate::core::term::{Term, Triple};
use crate::error::{MappingError, MappingResult};
use crate::utils::iri::document_iri;
use crate::vocab::{dcat, dcterms, rdf, xsd};

/// Base of the IANA media type registry.
pub const IANA_MEDIA_TYPES: &str = "https://www.iana.org/assignments/media-types/";

/// One `dcat:Distribution` per file entry of `latestVersion.files`.
pub fn distribution(doc: &Value, ids: &mut IdentifierTable) -> MappingResult<Vec<Triple>> {
    let dataset = ids.get(DATASET)?;
    let data_file = field(doc, "dataFile")?;

    let title = match doc.get("label").and_then(Value::as_str) {
        Some(label) if !label.is_empty() => label,
        _ => str_field(data_file, "filename")
            .map_err(|_| MappingError::missing("dataFile.filename"))?,
    };

    let distribution = Term::fresh_blank_node();
    let mut triples = vec![
        Triple::new(dataset.clone(), dcat::HAS_DISTRIBUTION, distribution.clone()),
        Triple::new(distribution.clone(), rdf::TYPE, Term::iri(dcat::DISTRIBUTION)),
        Triple::new(distribution.clone(), dcterms::TITLE, Term::string(title)),
    ];

    if let Some(content_type) = data_file.get("contentType").and_then(Value::as_str) {
        // Parameters such as "; charset=US-ASCII" are not part of the registry name
        let media_type = content_type.split(';').next().unwrap_or_default().trim();
        if !media_type.is_empty() {
            triples.push(Triple::new(
                distribution.clone(),
                dcat::MEDIA_TYPE,
                document_iri(
                    format!("{}{}", IANA_MEDIA_TYPES, media_type),
                    "dataFile.contentType",
                )?,
            ));
        }
    }

    match data_file.get("filesize") {
        None | Some(Value::Null) => {}
        Some(Value::Number(size)) if size.is_u64() => {
            triples.push(Triple::new(
                distribution.clone(),
                dcat::BYTE_SIZE,
                Term::typed(size.to_string(), xsd::NON_NEGATIVE_INTEGER),
            ));
        }
        Some(_) => {
            return Err(MappingError::malformed(
                "dataFile.filesize",
                "expected a non-negative integer",
            ))
        }
    }

    if let Some(pid) = data_file
        .get("persistentId")
        .and_then(Value::as_str)
        .filter(|pid| !pid.is_empty())
    {
        triples.push(Triple::new(distribution, dcterms::IDENTIFIER, Term::string(pid)));
    }

    Ok(triples)
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

    #[test]
    fn test_full_file_entry() {
        let mut ids = ids_with_dataset();
        let doc = json!({
            "label": "cores.tab",
            "dataFile": {
                "filename": "cores.tab",
                "contentType": "text/tab-separated-values; charset=US-ASCII",
                "filesize": 2048,
                "persistentId": "doi:10.15454/DOWA7X/QWERTY"
            }
        });
        let triples = distribution(&doc, &mut ids).unwrap();
        assert_eq!(triples.len(), 6);

        let dist = triples[0].object.clone();
        assert_eq!(&triples[0].subject, ids.get(DATASET).unwrap());
        assert!(triples.contains(&Triple::new(
            dist.clone(),
            dcat::MEDIA_TYPE,
            Term::iri("https://www.iana.org/assignments/media-types/text/tab-separated-values")
        )));
        assert!(triples.contains(&Triple::new(
            dist,
            dcat::BYTE_SIZE,
            Term::typed("2048", xsd::NON_NEGATIVE_INTEGER)
        )));
    }

    #[test]
    fn test_title_falls_back_to_filename() {
        let mut ids = ids_with_dataset();
        let doc = json!({"dataFile": {"filename": "readme.txt"}});
        let triples = distribution(&doc, &mut ids).unwrap();
        assert_eq!(triples.len(), 3);
        assert_eq!(triples[2].object, Term::string("readme.txt"));
    }

    #[test]
    fn test_entry_without_name_is_rejected() {
        let mut ids = ids_with_dataset();
        let doc = json!({"dataFile": {"filesize": 10}});
        assert_eq!(
            distribution(&doc, &mut ids).unwrap_err(),
            MappingError::missing("dataFile.filename")
        );
    }

    #[test]
    fn test_invalid_content_type_is_malformed() {
        let mut ids = ids_with_dataset();
        let doc = json!({"label": "a", "dataFile": {"contentType": "text/x weird"}});
        match distribution(&doc, &mut ids) {
            Err(MappingError::MalformedDocumentField { field, .. }) => {
                assert_eq!(field, "dataFile.contentType")
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_negative_size_is_malformed() {
        let mut ids = ids_with_dataset();
        let doc = json!({"label": "a", "dataFile": {"filesize": -1}});
        assert!(matches!(
            distribution(&doc, &mut ids),
            Err(MappingError::MalformedDocumentField { .. })
        ));
    }
}
