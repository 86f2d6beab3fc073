//! Rules reading the top level of the dataset document.

use serde_json::Value;

use super::{field, scalar_field, str_field, DATASET, PUBLISHER};
use crate::core::context::IdentifierTable;
use crate::core::term::{Term, Triple};
use crate::error::{MappingError, MappingResult};
use crate::utils::iri::{document_iri, license_literal};
use crate::vocab::{dcat, dcterms, foaf, owl, pav, rdf, xsd};

/// The dataset entity itself: identity, dates, version, publisher and
/// license.
pub fn general_dataset(doc: &Value, ids: &mut IdentifierTable) -> MappingResult<Vec<Triple>> {
    let publisher = ids.get(PUBLISHER)?.clone();

    let persistent_url = str_field(doc, "persistentUrl")?;
    let publication_date = str_field(doc, "publicationDate")?;
    let last_update = str_field(doc, "latestVersion.lastUpdateTime")?;
    let version = format!(
        "{}.{}",
        scalar_field(doc, "latestVersion.versionNumber")?,
        scalar_field(doc, "latestVersion.versionMinorNumber")?
    );
    let terms_of_use = str_field(doc, "latestVersion.termsOfUse")?;

    let dataset = ids.mint(DATASET);
    let version = Term::string(version);

    let mut triples = vec![
        Triple::new(dataset.clone(), rdf::TYPE, Term::iri(dcat::DATASET)),
        Triple::new(
            dataset.clone(),
            dcterms::IDENTIFIER,
            Term::typed(persistent_url, xsd::ANY_URI),
        ),
        Triple::new(
            dataset.clone(),
            dcterms::ISSUED,
            Term::typed(publication_date, xsd::DATE),
        ),
        Triple::new(
            dataset.clone(),
            dcterms::MODIFIED,
            Term::typed(last_update, xsd::DATE_TIME),
        ),
        Triple::new(dataset.clone(), dcterms::PUBLISHER, publisher),
        Triple::new(dataset.clone(), pav::VERSION, version.clone()),
        Triple::new(dataset.clone(), owl::VERSION_INFO, version),
        Triple::new(dataset.clone(), dcterms::LICENSE, license_literal(terms_of_use)),
    ];

    if let Some(license) = version_license(field(doc, "latestVersion")?)? {
        triples.push(Triple::new(dataset, dcterms::LICENSE, license));
    }

    Ok(triples)
}

/// License declared on the version itself, besides the terms of use.
///
/// Older Dataverse releases give a name (`"CC0"`, or `"NONE"` for no
/// license); newer ones give an object with `name` and `uri`.
fn version_license(latest_version: &Value) -> MappingResult<Option<Term>> {
    match latest_version.get("license") {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(name)) if name.eq_ignore_ascii_case("none") => Ok(None),
        Some(Value::String(name)) => Ok(Some(license_literal(name))),
        Some(license @ Value::Object(_)) => {
            if let Some(uri) = license.get("uri").and_then(Value::as_str) {
                document_iri(uri, "latestVersion.license.uri").map(Some)
            } else if let Some(name) = license.get("name").and_then(Value::as_str) {
                Ok(Some(license_literal(name)))
            } else {
                Err(MappingError::malformed(
                    "latestVersion.license",
                    "license object has neither 'uri' nor 'name'",
                ))
            }
        }
        Some(_) => Err(MappingError::malformed(
            "latestVersion.license",
            "expected a string or an object",
        )),
    }
}

/// The publisher as a FOAF agent, from its plain name.
pub fn general_publisher(doc: &Value, ids: &mut IdentifierTable) -> MappingResult<Vec<Triple>> {
    let name = doc
        .as_str()
        .ok_or_else(|| MappingError::malformed("publisher", "expected a string"))?;

    let publisher = ids.mint(PUBLISHER);
    Ok(vec![
        Triple::new(publisher.clone(), rdf::TYPE, Term::iri(foaf::AGENT)),
        Triple::new(publisher, foaf::NAME, Term::string(name)),
    ])
}
