//! Error types for the montage domain.

/// Errors raised by the montage domain.
///
/// Inside the crate the enums make unknown keys unrepresentable, so these
/// only surface when parsing strings from the outside world.
#[derive(Debug, thiserror::Error)]
pub enum MontageError {
    /// A montage difficulty key that is not easy, moderate, or hard.
    #[error("unknown montage difficulty: {0}")]
    UnknownMontageDifficulty(String),

    /// An individual test difficulty key that is not easy, medium, or hard.
    #[error("unknown test difficulty: {0}")]
    UnknownTestDifficulty(String),

    /// An action type key that is not roll, aid, ability, or nothing.
    #[error("unknown action type: {0}")]
    UnknownActionType(String),

    /// A characteristic key the ruleset does not define.
    #[error("unknown characteristic: {0}")]
    UnknownCharacteristic(String),

    /// A record violates one of its structural invariants.
    #[error("invariant violated: {0}")]
    Invariant(String),
}

/// Convenience result type for montage domain operations.
pub type MontageResult<T> = Result<T, MontageError>;
