//! Error types for the CRUD façade.
//!
//! Every SDK failure is funnelled through [`map_sdk_error`], which classifies it by the
//! service error code so callers can branch on [`ErrorKind`] instead of string matching.

use aws_sdk_dynamodb::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Coarse classification of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Missing or invalid credentials or region, or a request that could not be built.
    Configuration,
    /// The addressed table does not exist.
    NotFound,
    /// Table name already taken, or a guarded put hit an existing key.
    Conflict,
    /// Network failure, throttling or an unexpected service response. Never retried here.
    Transport,
    /// The request shape was rejected, locally or by the service.
    Validation,
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("failed to start blocking runtime: {0}")]
    Runtime(#[from] std::io::Error),

    #[error("table '{table}' not found")]
    TableNotFound { table: String },

    #[error("table '{table}' already exists or is in use")]
    TableInUse { table: String },

    #[error("an item with the same key already exists in '{table}'")]
    ItemExists { table: String },

    #[error("request throttled: {0}")]
    Throttled(String),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("{code}: {message}")]
    Remote { code: String, message: String },

    #[error("timed out waiting for table '{table}' to become {state}")]
    WaitTimeout { table: String, state: &'static str },

    #[error("malformed response: {0}")]
    MalformedResponse(String),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("unsupported attribute value: {0}")]
    UnsupportedAttribute(String),

    #[error("record conversion failed: {0}")]
    Record(#[from] serde_dynamo::Error),
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Config(_) | Error::Runtime(_) => ErrorKind::Configuration,
            Error::TableNotFound { .. } => ErrorKind::NotFound,
            Error::TableInUse { .. } | Error::ItemExists { .. } => ErrorKind::Conflict,
            Error::Throttled(_)
            | Error::Transport(_)
            | Error::Remote { .. }
            | Error::WaitTimeout { .. }
            | Error::MalformedResponse(_) => ErrorKind::Transport,
            Error::Validation(_) | Error::UnsupportedAttribute(_) | Error::Record(_) => {
                ErrorKind::Validation
            }
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NotFound
    }

    pub fn is_conflict(&self) -> bool {
        self.kind() == ErrorKind::Conflict
    }
}

/// Map any SDK error to an [`Error`], attributing it to `table`.
pub(crate) fn map_sdk_error<E, R>(err: SdkError<E, R>, table: &str) -> Error
where
    E: ProvideErrorMetadata + std::error::Error + Send + Sync + 'static,
    R: std::fmt::Debug,
{
    let detail = DisplayErrorContext(&err).to_string();

    match err {
        SdkError::ServiceError(service) => {
            let service = service.into_err();
            classify(service.code(), service.message(), table)
        }
        _ if mentions_credentials(&detail) => Error::Config(detail),
        SdkError::ConstructionFailure(_) => Error::Config(detail),
        _ => Error::Transport(detail),
    }
}

/// Classify a service error by its code.
pub(crate) fn classify(code: Option<&str>, message: Option<&str>, table: &str) -> Error {
    let message = message.unwrap_or_default().to_string();

    match code {
        Some("ResourceNotFoundException") => Error::TableNotFound {
            table: table.to_string(),
        },
        Some("ResourceInUseException") => Error::TableInUse {
            table: table.to_string(),
        },
        Some("ConditionalCheckFailedException") => Error::ItemExists {
            table: table.to_string(),
        },
        Some(
            code @ ("ProvisionedThroughputExceededException"
            | "ThrottlingException"
            | "RequestLimitExceeded"
            | "LimitExceededException"),
        ) => Error::Throttled(if message.is_empty() {
            code.to_string()
        } else {
            message
        }),
        Some("ValidationException" | "SerializationException") => Error::Validation(message),
        Some(
            "UnrecognizedClientException"
            | "InvalidSignatureException"
            | "MissingAuthenticationTokenException"
            | "ExpiredTokenException"
            | "AccessDeniedException",
        ) => Error::Config(message),
        Some(code) => Error::Remote {
            code: code.to_string(),
            message,
        },
        None => Error::Remote {
            code: "Unknown".to_string(),
            message,
        },
    }
}

fn mentions_credentials(detail: &str) -> bool {
    let lower = detail.to_lowercase();
    lower.contains("credentials") || lower.contains("no region")
}

#[cfg(test)]
mod tests {
    use super::*;
    use aws_sdk_dynamodb::operation::list_tables::ListTablesError;

    #[test]
    fn service_codes_map_to_kinds() {
        let cases = [
            ("ResourceNotFoundException", ErrorKind::NotFound),
            ("ResourceInUseException", ErrorKind::Conflict),
            ("ConditionalCheckFailedException", ErrorKind::Conflict),
            ("ProvisionedThroughputExceededException", ErrorKind::Transport),
            ("ThrottlingException", ErrorKind::Transport),
            ("ValidationException", ErrorKind::Validation),
            ("UnrecognizedClientException", ErrorKind::Configuration),
            ("InternalServerError", ErrorKind::Transport),
        ];

        for (code, kind) in cases {
            assert_eq!(classify(Some(code), None, "t").kind(), kind, "{code}");
        }
    }

    #[test]
    fn not_found_names_the_table() {
        let err = classify(Some("ResourceNotFoundException"), Some("nope"), "orders");
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "table 'orders' not found");
    }

    #[test]
    fn throttling_falls_back_to_code_without_message() {
        let err = classify(Some("ThrottlingException"), None, "orders");
        assert_eq!(err.to_string(), "request throttled: ThrottlingException");
    }

    #[test]
    fn unknown_codes_are_kept() {
        let err = classify(Some("InternalServerError"), Some("boom"), "orders");
        assert!(matches!(err, Error::Remote { ref code, .. } if code == "InternalServerError"));
        assert_eq!(err.to_string(), "InternalServerError: boom");
    }

    #[test]
    fn unbuildable_requests_are_configuration_errors() {
        let err = SdkError::<ListTablesError, ()>::construction_failure("missing endpoint");
        let mapped = map_sdk_error(err, "t");
        assert!(matches!(mapped, Error::Config(_)));
        assert_eq!(mapped.kind(), ErrorKind::Configuration);
    }

    #[test]
    fn credential_failures_outside_the_service_are_configuration_errors() {
        let err = SdkError::<ListTablesError, ()>::timeout_error(
            "failed to load credentials from the provider chain",
        );
        assert_eq!(map_sdk_error(err, "t").kind(), ErrorKind::Configuration);

        let err = SdkError::<ListTablesError, ()>::timeout_error("connection reset by peer");
        assert_eq!(map_sdk_error(err, "t").kind(), ErrorKind::Transport);
    }
}
