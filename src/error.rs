use thiserror::Error;

/// Errors raised by the cleaning pipeline.
///
/// The four imputable fields (`children`, `country`, `agent`, `company`)
/// never raise; they fall back to defaults. Everything else that the
/// pipeline needs but cannot read aborts the whole batch on first contact,
/// so a cleaned dataset is either complete or absent.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CleanError {
    #[error("required column `{column}` is missing from the input header")]
    MissingField { column: String },

    #[error("row {row}: field `{field}` expected {expected}, got `{value}`")]
    TypeMismatch {
        row: usize,
        field: &'static str,
        expected: &'static str,
        value: String,
    },

    #[error("row {row}: {detail}")]
    MalformedRecord { row: usize, detail: String },
}
