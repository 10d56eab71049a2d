//! Request decoding and parameter extraction.
//!
//! A framed request is decoded into a [`Request`]: the `requestid` that
//! selects the handler plus the full JSON object, which handlers read their
//! own fields from through [`RequestParams`].

use serde_json::{Map, Value};

use super::errors::CommandError;

/// Field carrying the request identifier.
pub const REQUEST_ID_FIELD: &str = "requestid";

/// Field carrying positional command arguments.
pub const COMMAND_PARAMS_FIELD: &str = "command_params";

/// Decodes one framed request into a JSON value.
///
/// # Errors
///
/// Returns [`CommandError::InvalidJson`] when the frame is not valid UTF-8
/// JSON.
pub fn decode_frame(frame: &[u8]) -> Result<Value, CommandError> {
    serde_json::from_slice(frame).map_err(CommandError::from_json_error)
}

/// A validated request envelope.
#[derive(Debug, Clone)]
pub struct Request {
    request_id: String,
    params: RequestParams,
}

impl Request {
    /// Validates the shape of a decoded request.
    ///
    /// # Errors
    ///
    /// Returns [`CommandError::InvalidMessage`] unless the value is an object
    /// whose `requestid` field is a string.
    pub fn from_value(value: Value) -> Result<Self, CommandError> {
        let Value::Object(fields) = value else {
            return Err(CommandError::invalid_message("request must be a JSON object"));
        };
        let request_id = match fields.get(REQUEST_ID_FIELD) {
            Some(Value::String(id)) => id.clone(),
            Some(_) => {
                return Err(CommandError::invalid_message(
                    "requestid field must be a string",
                ));
            }
            None => return Err(CommandError::invalid_message("missing requestid field")),
        };
        Ok(Self {
            request_id,
            params: RequestParams(fields),
        })
    }

    /// The identifier exactly as the client sent it, echoed in responses.
    #[must_use]
    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    /// Registry key form of the identifier (surrounding whitespace removed).
    #[must_use]
    pub fn canonical_id(&self) -> &str {
        self.request_id.trim()
    }

    /// The full request object.
    #[must_use]
    pub fn params(&self) -> &RequestParams {
        &self.params
    }
}

/// Read-only view over a request's fields.
#[derive(Debug, Clone, Default)]
pub struct RequestParams(Map<String, Value>);

impl RequestParams {
    /// Reads a required identifier field.
    ///
    /// Strings are returned as-is; integers are accepted and rendered in
    /// decimal.
    ///
    /// # Errors
    ///
    /// Returns [`CommandError::InvalidParameters`] when the field is absent or
    /// is neither a string nor an integer.
    pub fn required_id(&self, field: &str) -> Result<String, CommandError> {
        match self.0.get(field) {
            Some(Value::String(value)) => Ok(value.clone()),
            Some(Value::Number(number)) if number.is_i64() || number.is_u64() => {
                Ok(number.to_string())
            }
            Some(_) => Err(CommandError::invalid_parameters(format!(
                "{field} must be a string or integer"
            ))),
            None => Err(CommandError::invalid_parameters(format!(
                "missing {field} field"
            ))),
        }
    }

    /// Reads the optional `command_params` argument list.
    ///
    /// # Errors
    ///
    /// Returns [`CommandError::InvalidParameters`] when the field is present
    /// but not an array.
    pub fn command_params(&self) -> Result<Vec<Value>, CommandError> {
        match self.0.get(COMMAND_PARAMS_FIELD) {
            None | Some(Value::Null) => Ok(Vec::new()),
            Some(Value::Array(values)) => Ok(values.clone()),
            Some(_) => Err(CommandError::invalid_parameters(
                "command_params must be an array",
            )),
        }
    }

    /// Raw access to a field.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }
}
