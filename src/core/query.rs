//! Path expressions selecting the sub-documents a rule receives.
//!
//! Supports the JSONPath subset used by the rule catalogue: the root `$`,
//! member access `.name`, the wildcard `[*]` and equality filters of the
//! form `[?(@.key == "value")]`.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use std::fmt;

use crate::error::{MappingError, MappingResult};

static FILTER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"^\[\?\(@\.([A-Za-z0-9_]+)\s*==\s*(?:"([^"]*)"|'([^']*)')\)\]"#)
        .expect("valid regex")
});

static MEMBER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\.([A-Za-z0-9_\-]+)").expect("valid regex"));

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Member(String),
    Wildcard,
    Filter { key: String, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentQuery {
    source: String,
    segments: Vec<Segment>,
}

impl DocumentQuery {
    pub fn parse(path: &str) -> MappingResult<Self> {
        let invalid = |reason: &str| MappingError::InvalidQuery {
            query: path.to_string(),
            reason: reason.to_string(),
        };

        let mut rest = path
            .trim()
            .strip_prefix('$')
            .ok_or_else(|| invalid("query must start at the root '$'"))?;
        let mut segments = Vec::new();

        while !rest.is_empty() {
            if let Some(caps) = MEMBER_RE.captures(rest) {
                segments.push(Segment::Member(caps[1].to_string()));
                rest = &rest[caps[0].len()..];
            } else if let Some(tail) = rest.strip_prefix("[*]") {
                segments.push(Segment::Wildcard);
                rest = tail;
            } else if let Some(caps) = FILTER_RE.captures(rest) {
                let value = caps
                    .get(2)
                    .or_else(|| caps.get(3))
                    .map(|m| m.as_str().to_string())
                    .unwrap_or_default();
                segments.push(Segment::Filter {
                    key: caps[1].to_string(),
                    value,
                });
                rest = &rest[caps[0].len()..];
            } else {
                return Err(invalid(&format!("unexpected input at '{}'", rest)));
            }
        }

        Ok(Self {
            source: path.to_string(),
            segments,
        })
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Every sub-document of `root` the path selects, in document order.
    pub fn select<'a>(&self, root: &'a Value) -> Vec<&'a Value> {
        let mut current = vec![root];

        for segment in &self.segments {
            let mut next = Vec::new();
            for value in current {
                match segment {
                    Segment::Member(name) => {
                        if let Some(child) = value.get(name.as_str()) {
                            next.push(child);
                        }
                    }
                    Segment::Wildcard => match value {
                        Value::Array(items) => next.extend(items.iter()),
                        Value::Object(map) => next.extend(map.values()),
                        _ => {}
                    },
                    Segment::Filter { key, value: expected } => {
                        if let Value::Array(items) = value {
                            next.extend(items.iter().filter(|item| {
                                item.get(key.as_str()).and_then(Value::as_str)
                                    == Some(expected.as_str())
                            }));
                        }
                    }
                }
            }
            current = next;
        }

        current
    }
}

impl fmt::Display for DocumentQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}
