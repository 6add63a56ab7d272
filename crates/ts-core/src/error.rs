use thiserror::Error;

pub type TsResult<T> = Result<T, TsError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum TsError {
    #[error("Malformed record {record}: {reason}")]
    MalformedRecord { record: String, reason: String },

    #[error("Duplicate vertex: {id}")]
    DuplicateVertex { id: String },

    #[error("Unknown vertex: {id}")]
    UnknownVertex { id: String },

    #[error("Unknown line: {id}")]
    UnknownLine { id: String },

    #[error("Ridership source references {id}, which is not in the graph")]
    UnresolvedReference { id: String },

    #[error("Invalid edit: {reason}")]
    InvalidEdit { reason: String },

    #[error("Vertex {id} has no estimated ridership")]
    NotEstimated { id: String },

    #[error("Non-finite numeric value for {what}: {value}")]
    NonFinite { what: &'static str, value: f64 },

    #[error("Invariant violated: {what}")]
    Invariant { what: String },
}

impl TsError {
    pub fn malformed(record: impl Into<String>, reason: impl Into<String>) -> Self {
        TsError::MalformedRecord {
            record: record.into(),
            reason: reason.into(),
        }
    }

    pub fn invalid_edit(reason: impl Into<String>) -> Self {
        TsError::InvalidEdit {
            reason: reason.into(),
        }
    }
}
