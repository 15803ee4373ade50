use std::collections::HashSet;

use crate::domain::{error::DomainError, resolve::RecordGraph};

/// Structural checks that span several definitions.
pub struct DomainValidator;

impl DomainValidator {
    /// Field names must be unique across a record and all its ancestors.
    pub fn validate_fields(graph: &RecordGraph<'_>) -> Result<(), DomainError> {
        for &record in graph.ordered() {
            let mut seen: HashSet<&str> = HashSet::new();
            let inherited = graph
                .ancestors(record)
                .into_iter()
                .flat_map(|ancestor| ancestor.field_names());
            for name in inherited.chain(record.field_names()) {
                if !seen.insert(name) {
                    return Err(DomainError::DuplicateField {
                        record: record.name().to_string(),
                        field: name.to_string(),
                    });
                }
            }
        }
        Ok(())
    }
}
