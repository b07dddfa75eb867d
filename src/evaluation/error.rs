use thiserror::Error;

/// Failures that move an evaluation into the error state.
///
/// Empty candidate sets and degenerate scores are not errors: they produce an
/// empty ranking or a score of 0.
#[derive(Debug, Error)]
pub enum EvaluationError {
    /// The back-translation service could not be reached or rejected the request.
    #[error("back-translation request failed: {0:#}")]
    Collaborator(anyhow::Error),

    /// The back-translation service answered with data we cannot use.
    #[error("malformed back-translation response: {0}")]
    MalformedResponse(String),
}
