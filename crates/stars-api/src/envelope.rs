use serde::Serialize;
use serde_json::Value;

use crate::error::ApiError;

/// The uniform result of every Stars API operation.
///
/// A failed envelope always carries an error message and never data; a successful one never
/// carries an error. The fields are private so the only way to build one is through
/// [`ResultEnvelope::success`] and [`ResultEnvelope::failure`].
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ResultEnvelope {
    success: bool,
    data: Option<Value>,
    error: Option<String>,
}

impl ResultEnvelope {
    pub fn success(data: Value) -> Self {
        Self {
            success: true,
            data: (!data.is_null()).then_some(data),
            error: None,
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.success
    }

    pub fn data(&self) -> Option<&Value> {
        self.data.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Reshape the payload of a successful envelope. Failures pass through untouched.
    pub fn map_data(self, f: impl FnOnce(Value) -> Value) -> Self {
        if self.success {
            Self::success(f(self.data.unwrap_or(Value::Null)))
        } else {
            self
        }
    }

    /// Like [`ResultEnvelope::map_data`], but the transformation may itself fail
    pub fn and_then(self, f: impl FnOnce(Value) -> Result<Value, String>) -> Self {
        if self.success {
            match f(self.data.unwrap_or(Value::Null)) {
                Ok(data) => Self::success(data),
                Err(error) => Self::failure(error),
            }
        } else {
            self
        }
    }

    pub fn into_result(self) -> Result<Value, String> {
        match self.error {
            Some(error) => Err(error),
            None => Ok(self.data.unwrap_or(Value::Null)),
        }
    }
}

impl From<Result<Value, ApiError>> for ResultEnvelope {
    fn from(result: Result<Value, ApiError>) -> Self {
        match result {
            Ok(data) => Self::success(data),
            Err(error) => Self::failure(error.to_string()),
        }
    }
}
