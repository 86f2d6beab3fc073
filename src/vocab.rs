//! Vocabulary IRIs emitted by the mapping rules.
//!
//! Downstream DCAT consumers match on these exact strings, so the namespaces
//! must not be altered.

pub mod rdf {
    pub const NS: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#";
    pub const TYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#type";
    pub const LANG_STRING: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#langString";
}

pub mod xsd {
    pub const NS: &str = "http://www.w3.org/2001/XMLSchema#";
    pub const STRING: &str = "http://www.w3.org/2001/XMLSchema#string";
    pub const ANY_URI: &str = "http://www.w3.org/2001/XMLSchema#anyURI";
    pub const DATE: &str = "http://www.w3.org/2001/XMLSchema#date";
    pub const DATE_TIME: &str = "http://www.w3.org/2001/XMLSchema#dateTime";
    pub const NON_NEGATIVE_INTEGER: &str = "http://www.w3.org/2001/XMLSchema#nonNegativeInteger";
}

pub mod dcat {
    pub const NS: &str = "http://www.w3.org/ns/dcat#";
    pub const DATASET: &str = "http://www.w3.org/ns/dcat#Dataset";
    pub const DISTRIBUTION: &str = "http://www.w3.org/ns/dcat#Distribution";
    pub const CONTACT_POINT: &str = "http://www.w3.org/ns/dcat#contactPoint";
    pub const KEYWORD: &str = "http://www.w3.org/ns/dcat#keyword";
    pub const HAS_DISTRIBUTION: &str = "http://www.w3.org/ns/dcat#distribution";
    pub const MEDIA_TYPE: &str = "http://www.w3.org/ns/dcat#mediaType";
    pub const BYTE_SIZE: &str = "http://www.w3.org/ns/dcat#byteSize";
}

pub mod dcterms {
    pub const NS: &str = "http://purl.org/dc/terms/";
    pub const IDENTIFIER: &str = "http://purl.org/dc/terms/identifier";
    pub const ISSUED: &str = "http://purl.org/dc/terms/issued";
    pub const MODIFIED: &str = "http://purl.org/dc/terms/modified";
    pub const PUBLISHER: &str = "http://purl.org/dc/terms/publisher";
    pub const LICENSE: &str = "http://purl.org/dc/terms/license";
    pub const TITLE: &str = "http://purl.org/dc/terms/title";
    pub const DESCRIPTION: &str = "http://purl.org/dc/terms/description";
    pub const LANGUAGE: &str = "http://purl.org/dc/terms/language";
    pub const SUBJECT: &str = "http://purl.org/dc/terms/subject";
}

pub mod foaf {
    pub const NS: &str = "http://xmlns.com/foaf/0.1/";
    pub const AGENT: &str = "http://xmlns.com/foaf/0.1/Agent";
    pub const ORGANIZATION: &str = "http://xmlns.com/foaf/0.1/Organization";
    pub const NAME: &str = "http://xmlns.com/foaf/0.1/name";
    pub const MEMBER: &str = "http://xmlns.com/foaf/0.1/member";
}

pub mod owl {
    pub const NS: &str = "http://www.w3.org/2002/07/owl#";
    pub const VERSION_INFO: &str = "http://www.w3.org/2002/07/owl#versionInfo";
}

pub mod pav {
    pub const NS: &str = "http://pav-ontology.github.io/pav/";
    pub const VERSION: &str = "http://pav-ontology.github.io/pav/version";
}

pub mod vcard {
    pub const NS: &str = "http://www.w3.org/2006/vcard/ns#";
    pub const KIND: &str = "http://www.w3.org/2006/vcard/ns#Kind";
    pub const ORGANIZATION: &str = "http://www.w3.org/2006/vcard/ns#Organization";
    pub const ORGANIZATION_NAME: &str = "http://www.w3.org/2006/vcard/ns#organization-name";
    pub const FN: &str = "http://www.w3.org/2006/vcard/ns#fn";
    pub const HAS_EMAIL: &str = "http://www.w3.org/2006/vcard/ns#hasEmail";
}

/// Base of the Library of Congress ISO 639 vocabularies.
pub const LOC_VOCABULARY: &str = "http://id.loc.gov/vocabulary";

/// Prefix table used for Turtle output, in declaration order.
pub const PREFIXES: &[(&str, &str)] = &[
    ("dcat", dcat::NS),
    ("dcterms", dcterms::NS),
    ("foaf", foaf::NS),
    ("owl", owl::NS),
    ("pav", pav::NS),
    ("rdf", rdf::NS),
    ("vcard", vcard::NS),
    ("xsd", xsd::NS),
];
