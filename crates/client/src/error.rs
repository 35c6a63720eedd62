use domain::models::GroupId;
use thiserror::Error;

/// Failure of a remote call or of local request validation.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("HTTP transport error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Server returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Malformed response: {0}")]
    Decode(#[from] DecodeError),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl ClientError {
    pub fn status(status: u16, message: impl Into<String>) -> Self {
        ClientError::Status {
            status,
            message: message.into(),
        }
    }

    /// True for 404 responses.
    pub fn is_not_found(&self) -> bool {
        matches!(self, ClientError::Status { status: 404, .. })
    }
}

/// A response payload that could not be turned into a domain value.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DecodeError {
    #[error("missing field `{field}` in {entity}")]
    MissingField {
        entity: &'static str,
        field: &'static str,
    },

    #[error("invalid value for `{field}` in {entity}: {value}")]
    InvalidValue {
        entity: &'static str,
        field: &'static str,
        value: String,
    },

    #[error("unexpected payload shape: {0}")]
    Shape(String),
}

impl From<serde_json::Error> for DecodeError {
    fn from(err: serde_json::Error) -> Self {
        DecodeError::Shape(err.to_string())
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        ClientError::Decode(err.into())
    }
}

impl From<validator::ValidationErrors> for ClientError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let details: Vec<String> = errors
            .field_errors()
            .iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |e| {
                    let message = e
                        .message
                        .clone()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| e.code.to_string());
                    format!("{}: {}", field, message)
                })
            })
            .collect();

        let message = if details.len() == 1 {
            details[0].clone()
        } else {
            format!("{} validation errors: {}", details.len(), details.join("; "))
        };

        ClientError::Validation(message)
    }
}

/// Misuse of a group editing session, or a failure while saving one.
#[derive(Debug, Error)]
pub enum EditorError {
    #[error("An edit is already in progress")]
    EditInProgress,

    #[error("No edit is in progress")]
    NoActiveEdit,

    #[error("Group {0} not found")]
    GroupNotFound(GroupId),

    #[error(transparent)]
    Client(#[from] ClientError),
}

impl From<validator::ValidationErrors> for EditorError {
    fn from(errors: validator::ValidationErrors) -> Self {
        EditorError::Client(errors.into())
    }
}

pub type ClientResult<T> = Result<T, ClientError>;
