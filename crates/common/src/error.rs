use thiserror::Error;

/// An identifier was constructed from an empty raw value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind} identifier cannot be empty")]
pub struct EmptyIdentifierError {
    /// Kind of identifier that was being built.
    pub kind: &'static str,
}
