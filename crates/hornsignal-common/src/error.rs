use thiserror::Error;

/// The component-level error taxonomy from the pipeline's error handling design.
/// Every variant is logged and localized at its stage boundary; only
/// `StoreWrite` (excluding UNIQUE-violation) and startup store corruption
/// are allowed to propagate out of a pipeline cycle.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("feed fetch failed: {0}")]
    FeedFetch(String),

    #[error("URL resolution failed: {0}")]
    UrlResolution(String),

    #[error("image scrape failed: {0}")]
    ImageScrape(String),

    #[error("LLM call failed: {0}")]
    LlmCall(String),

    #[error("LLM output did not parse as JSON: {0}")]
    LlmParse(String),

    #[error("event validation failed: {0}")]
    Validation(String),

    #[error("store write failed: {0}")]
    StoreWrite(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
