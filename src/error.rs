use thiserror::Error;

#[derive(Error, Debug)]
pub enum TrainerError {
    #[error("No key prompt to compare")]
    EmptyPrompt,

    #[error("Cannot summarize because no assessments")]
    NoAssessments,

    #[error("Key Set Error: {0}")]
    KeySet(String),

    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON Parsing Error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type TrainerResult<T> = Result<T, TrainerError>;
