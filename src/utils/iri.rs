//! Detection of absolute IRIs (RFC 3987) inside free text.
//!
//! Dataverse stores licenses and terms of use as free text, frequently HTML.
//! When the text carries a link we keep only the link, typed `xsd:anyURI`;
//! otherwise the markup is stripped and the text is kept as `xsd:string`.

use once_cell::sync::Lazy;
use oxiri::Iri;
use regex::{Regex, RegexBuilder};
use scraper::Html;

use crate::core::Term;
use crate::error::{MappingError, MappingResult};
use crate::vocab::xsd;

/// RFC 3987 `IRI` production, built from its ABNF rules.
fn iri_pattern() -> String {
    let ucschar = concat!(
        r"\x{A0}-\x{D7FF}\x{F900}-\x{FDCF}\x{FDF0}-\x{FFEF}",
        r"\x{10000}-\x{1FFFD}\x{20000}-\x{2FFFD}\x{30000}-\x{3FFFD}",
        r"\x{40000}-\x{4FFFD}\x{50000}-\x{5FFFD}\x{60000}-\x{6FFFD}",
        r"\x{70000}-\x{7FFFD}\x{80000}-\x{8FFFD}\x{90000}-\x{9FFFD}",
        r"\x{A0000}-\x{AFFFD}\x{B0000}-\x{BFFFD}\x{C0000}-\x{CFFFD}",
        r"\x{D0000}-\x{DFFFD}\x{E1000}-\x{EFFFD}",
    );
    let iprivate = r"\x{E000}-\x{F8FF}\x{F0000}-\x{FFFFD}\x{100000}-\x{10FFFD}";
    let iunreserved = format!(r"a-zA-Z0-9\-._~{}", ucschar);
    let pct = r"%[0-9A-Fa-f]{2}";
    let sub_delims = r"!$&'()*+,;=";

    let ipchar = format!(r"(?:[{iunreserved}]|{pct}|[{sub_delims}:@])");
    let userinfo = format!(r"(?:[{iunreserved}]|{pct}|[{sub_delims}:])*");
    let reg_name = format!(r"(?:[{iunreserved}]|{pct}|[{sub_delims}])*");

    let dec_octet = r"(?:25[0-5]|2[0-4][0-9]|1[0-9]{2}|[1-9][0-9]|[0-9])";
    let ipv4 = format!(r"{d}\.{d}\.{d}\.{d}", d = dec_octet);
    let h16 = r"[0-9A-Fa-f]{1,4}";
    let ls32 = format!(r"(?:{h16}:{h16}|{ipv4})");
    let ipv6 = [
        format!(r"(?:{h16}:){{6}}{ls32}"),
        format!(r"::(?:{h16}:){{5}}{ls32}"),
        format!(r"(?:{h16})?::(?:{h16}:){{4}}{ls32}"),
        format!(r"(?:(?:{h16}:){{0,1}}{h16})?::(?:{h16}:){{3}}{ls32}"),
        format!(r"(?:(?:{h16}:){{0,2}}{h16})?::(?:{h16}:){{2}}{ls32}"),
        format!(r"(?:(?:{h16}:){{0,3}}{h16})?::{h16}:{ls32}"),
        format!(r"(?:(?:{h16}:){{0,4}}{h16})?::{ls32}"),
        format!(r"(?:(?:{h16}:){{0,5}}{h16})?::{h16}"),
        format!(r"(?:(?:{h16}:){{0,6}}{h16})?::"),
    ]
    .join("|");
    let ipvfuture = r"[vV][0-9A-Fa-f]+\.[a-zA-Z0-9\-._~!$&'()*+,;=:]+";
    let ip_literal = format!(r"\[(?:{ipv6}|{ipvfuture})\]");

    let host = format!(r"(?:{ip_literal}|{ipv4}|{reg_name})");
    let authority = format!(r"(?:{userinfo}@)?{host}(?::[0-9]*)?");
    let path_abempty = format!(r"(?:/{ipchar}*)*");
    let path_absolute = format!(r"/(?:{ipchar}+(?:/{ipchar}*)*)?");
    let path_rootless = format!(r"{ipchar}+(?:/{ipchar}*)*");
    let hier_part =
        format!(r"(?://{authority}{path_abempty}|{path_absolute}|{path_rootless}|)");
    let query = format!(r"(?:{ipchar}|[{iprivate}/?])*");
    let fragment = format!(r"(?:{ipchar}|[/?])*");

    format!(r"[a-zA-Z][a-zA-Z0-9+\-.]*:{hier_part}(?:\?{query})?(?:#{fragment})?")
}

static IRI_RE: Lazy<Regex> = Lazy::new(|| {
    RegexBuilder::new(&iri_pattern())
        .size_limit(1 << 26)
        .build()
        .expect("valid RFC 3987 regex")
});

/// A match only counts when the whitespace-free run it starts contains a
/// `:` followed by something, which rules out bare schemes such as `"see:"`.
fn has_content_after_colon(candidate: &str) -> bool {
    let run: Vec<char> = candidate.chars().take_while(|c| !c.is_whitespace()).collect();
    run.iter()
        .enumerate()
        .any(|(i, &c)| c == ':' && i + 1 < run.len())
}

/// Leftmost absolute IRI contained in `text`, if any.
pub fn find_iri(text: &str) -> Option<&str> {
    let mut start = 0;
    while start <= text.len() {
        let found = IRI_RE.find_at(text, start)?;
        if has_content_after_colon(&text[found.start()..]) {
            return Some(found.as_str());
        }
        let skip = text[found.start()..]
            .chars()
            .next()
            .map(char::len_utf8)
            .unwrap_or(1);
        start = found.start() + skip;
    }
    None
}

/// Text content of an HTML fragment, tags removed and entities decoded.
pub fn html_to_text(html: &str) -> String {
    Html::parse_fragment(html).root_element().text().collect()
}

/// License term for a free-text license or terms-of-use statement.
pub fn license_literal(text: &str) -> Term {
    match find_iri(text) {
        Some(iri) => Term::typed(iri, xsd::ANY_URI),
        None => Term::typed(html_to_text(text), xsd::STRING),
    }
}

/// IRI term for a value read from `field`, which must be an absolute IRI.
pub fn document_iri(value: impl Into<String>, field: &str) -> MappingResult<Term> {
    let value = value.into();
    if let Err(error) = Iri::parse(value.as_str()) {
        return Err(MappingError::malformed(
            field,
            format!("'{}' is not a valid IRI: {}", value, error),
        ));
    }
    Ok(Term::Iri(value))
}
