use std::fmt;

use http::HeaderValue;
use http::header::InvalidHeaderValue;

/// Bearer token presented to the API server.
///
/// Surrounding whitespace is dropped (token files usually end in a newline).
/// The value never appears in `Debug` output.
#[derive(Clone)]
pub struct Credential(String);

impl Credential {
    pub fn new(token: impl AsRef<str>) -> Self {
        Self(token.as_ref().trim().to_string())
    }

    /// Token file contents; invalid UTF-8 is replaced rather than rejected so
    /// the failure surfaces as a request-build error with context.
    pub fn from_bytes(raw: &[u8]) -> Self {
        Self::new(String::from_utf8_lossy(raw))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// `Authorization` value, marked sensitive.
    pub fn bearer_header(&self) -> Result<HeaderValue, InvalidHeaderValue> {
        let mut value = HeaderValue::from_str(&format!("Bearer {}", self.0))?;
        value.set_sensitive(true);
        Ok(value)
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Credential").field(&"<redacted>").finish()
    }
}
