//! Form field storage.
//!
//! Both `application/x-www-form-urlencoded` bodies and the text parts of a
//! `multipart/form-data` body end up in a [`FormData`].

use crate::ExtractionError;

/// Ordered, multi-valued form fields.
///
/// # Example
///
/// ```rust
/// use emporium_extract::FormData;
///
/// let form = FormData::from_urlencoded(b"username=johndoe&password=s%3Dcret").unwrap();
/// assert_eq!(form.get("username"), Some("johndoe"));
/// assert_eq!(form.get("password"), Some("s=cret"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormData {
    fields: Vec<(String, String)>,
}

impl FormData {
    /// Creates an empty form.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a urlencoded body. `+` decodes to a space.
    pub fn from_urlencoded(body: &[u8]) -> Result<Self, ExtractionError> {
        let fields = serde_urlencoded::from_bytes(body)
            .map_err(|e| ExtractionError::malformed(format!("invalid form body: {e}")))?;
        Ok(Self { fields })
    }

    /// Appends a field.
    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.fields.push((name.into(), value.into()));
    }

    /// Returns the last value sent for `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .rev()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Returns every value sent for `name`, in order.
    #[must_use]
    pub fn get_all(&self, name: &str) -> Vec<&str> {
        self.fields
            .iter()
            .filter(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
            .collect()
    }

    /// Returns the number of fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns true if there are no fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}
