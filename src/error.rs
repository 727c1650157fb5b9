//! Typed errors for contract violations the core can name.
//!
//! Orchestration code wraps these in `anyhow` with context; tests match on
//! the variants directly.
use std::fmt;
use thiserror::Error;

/// Fatal problems found while turning a surface manifest into a model.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("unsupported surface manifest schema_version {found} (expected {expected})")]
    UnsupportedSchema { found: u32, expected: u32 },
    #[error("type {type_name} is missing its {annotation} declaration")]
    MissingAnnotation {
        type_name: String,
        annotation: &'static str,
    },
    #[error("type {type_name} derives from unknown type {base}")]
    UnknownBaseType { type_name: String, base: String },
    #[error("inheritance cycle detected starting at type {type_name}")]
    InheritanceCycle { type_name: String },
    #[error("command {name} is declared more than once")]
    DuplicateCommand { name: String },
    #[error("command {command} declares parameter {parameter} more than once")]
    DuplicateParameter { command: String, parameter: String },
}

/// One override entry that could not be resolved to a service key.
#[derive(Debug)]
pub struct EntryFailure {
    pub token: String,
    pub reason: String,
}

/// Every failing override entry of one run, reported together.
#[derive(Debug, Error)]
pub struct AggregateError {
    pub failures: Vec<EntryFailure>,
}

impl fmt::Display for AggregateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let noun = if self.failures.len() == 1 {
            "entry"
        } else {
            "entries"
        };
        write!(
            f,
            "{} override {noun} could not be resolved",
            self.failures.len()
        )?;
        for failure in &self.failures {
            write!(f, "\n  {}: {}", failure.token, failure.reason)?;
        }
        Ok(())
    }
}
