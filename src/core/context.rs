use std::collections::HashMap;
use tracing::debug;

use crate::core::term::Term;
use crate::error::{MappingError, MappingResult};

/// Identifiers minted during one extraction run, keyed by semantic role
/// (`"dataset"`, `"publisher"`, ...).
///
/// Rules that mint an entity write its role here; rules that attach
/// statements to it read the role back. The scheduler guarantees the writer
/// runs first, so a missing role is a catalogue defect.
#[derive(Debug, Default, Clone)]
pub struct IdentifierTable {
    entries: HashMap<String, Term>,
}

impl IdentifierTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Assign a fresh blank node to `role` and return it.
    pub fn mint(&mut self, role: &str) -> Term {
        let node = Term::fresh_blank_node();
        if self.entries.insert(role.to_string(), node.clone()).is_some() {
            debug!("Identifier role '{}' re-minted", role);
        }
        node
    }

    pub fn get(&self, role: &str) -> MappingResult<&Term> {
        self.entries
            .get(role)
            .ok_or_else(|| MappingError::UnresolvedReference {
                role: role.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mint_then_get() {
        let mut table = IdentifierTable::new();
        let node = table.mint("dataset");
        assert!(node.is_blank_node());
        assert_eq!(table.get("dataset").unwrap(), &node);
    }

    #[test]
    fn test_remint_replaces_identifier() {
        let mut table = IdentifierTable::new();
        let first = table.mint("dataset");
        let second = table.mint("dataset");
        assert_ne!(first, second);
        assert_eq!(table.get("dataset").unwrap(), &second);
    }

    #[test]
    fn test_unknown_role_is_unresolved() {
        let table = IdentifierTable::new();
        assert_eq!(
            table.get("publisher").unwrap_err(),
            MappingError::UnresolvedReference {
                role: "publisher".to_string()
            }
        );
    }
}
