use std::error::Error as StdError;

use serde::ser::{Serialize, SerializeStruct, Serializer};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::status::StatusCode;

/// An error that carries a [`StatusCode`].
///
/// Useful when a piece of code knows which HTTP failure the response has got
/// to have and needs to propagate that up the call stack. Serializes to
/// `{code, message, exception_id, extras}`; `extras` is always a JSON object,
/// `{}` when none were supplied.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct HttpError {
    status: StatusCode,
    message: String,
    error_id: Option<String>,
    extras: Option<Map<String, Value>>,
    #[source]
    cause: Option<Box<dyn StdError + Send + Sync>>,
}

impl HttpError {
    /// A new error for the given status, with the reason phrase as message.
    pub fn new(status: StatusCode) -> Self {
        HttpError {
            status,
            message: status.reason().to_owned(),
            error_id: None,
            extras: None,
            cause: None,
        }
    }

    /// Replaces the default message.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Sets an identifier that tells apart causes sharing a status code,
    /// e.g. `"user_not_found"` vs `"post_not_found"` on a 404.
    pub fn with_error_id(mut self, error_id: impl Into<String>) -> Self {
        self.error_id = Some(error_id.into());
        self
    }

    /// Sets the extras map included in the serialized form.
    pub fn with_extras(mut self, extras: Map<String, Value>) -> Self {
        self.extras = Some(extras);
        self
    }

    /// Adds a single entry to the extras map.
    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extras
            .get_or_insert_with(Map::new)
            .insert(key.into(), value.into());
        self
    }

    /// Chains the underlying cause, reachable through [`StdError::source`].
    pub fn with_cause(mut self, cause: impl StdError + Send + Sync + 'static) -> Self {
        self.cause = Some(Box::new(cause));
        self
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// The numeric status code, e.g. `404`.
    pub fn code(&self) -> u16 {
        self.status.code()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn error_id(&self) -> Option<&str> {
        self.error_id.as_deref()
    }

    pub fn extras(&self) -> Option<&Map<String, Value>> {
        self.extras.as_ref()
    }
}

/// 500 Internal Server Error with its default message.
impl Default for HttpError {
    fn default() -> Self {
        HttpError::new(StatusCode::InternalServerError)
    }
}

impl Serialize for HttpError {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("HttpError", 4)?;
        state.serialize_field("code", &self.code())?;
        state.serialize_field("message", &self.message)?;
        state.serialize_field("exception_id", &self.error_id)?;
        // extras must stay an object even when empty, never null.
        match &self.extras {
            Some(extras) => state.serialize_field("extras", extras)?,
            None => state.serialize_field("extras", &Map::new())?,
        }
        state.end()
    }
}

/// Header lookup and mutation failures. These indicate caller misuse, not
/// transient conditions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HeaderError {
    /// A required header is absent.
    #[error("header '{0}' not found")]
    NotFound(String),

    /// Mutation was attempted after the headers were flushed to the client.
    #[error("headers have already been sent")]
    AlreadySent,

    /// A stored name or value does not fit the target representation.
    #[error("invalid header: {0}")]
    Invalid(String),
}
