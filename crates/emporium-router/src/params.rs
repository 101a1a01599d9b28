//! Captured path parameters.
//!
//! Routes rarely capture more than a couple of segments, so parameters are
//! kept in a small vector that stays on the stack for the common case.

use smallvec::SmallVec;

/// Maximum number of parameters stored inline (stack allocated).
const INLINE_PARAMS: usize = 4;

/// Path parameters captured by a route match, in template order.
///
/// # Example
///
/// ```rust
/// use emporium_router::Params;
///
/// let mut params = Params::new();
/// params.push("user_id", "alice");
/// params.push("item_id", "foo");
///
/// assert_eq!(params.get("user_id"), Some("alice"));
/// assert_eq!(params.get("item_id"), Some("foo"));
/// assert_eq!(params.get("unknown"), None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Params {
    inner: SmallVec<[(String, String); INLINE_PARAMS]>,
}

impl Params {
    /// Creates an empty parameter set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a captured parameter.
    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.inner.push((name.into(), value.into()));
    }

    /// Returns the value captured for `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.inner
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Returns true if nothing was captured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Returns the number of captured parameters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Iterates over `(name, value)` pairs in template order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.inner.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }
}

impl FromIterator<(String, String)> for Params {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            inner: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_params_new() {
        let params = Params::new();
        assert!(params.is_empty());
        assert_eq!(params.len(), 0);
    }

    #[test]
    fn test_params_push_and_get() {
        let mut params = Params::new();
        params.push("car_id", "3fa85f64-5717-4562-b3fc-2c963f66afa6");
        params.push("item_id", "42");

        assert_eq!(
            params.get("car_id"),
            Some("3fa85f64-5717-4562-b3fc-2c963f66afa6")
        );
        assert_eq!(params.get("item_id"), Some("42"));
        assert_eq!(params.get("model_name"), None);
    }

    #[test]
    fn test_params_iter_keeps_order() {
        let mut params = Params::new();
        params.push("user_id", "alice");
        params.push("item_id", "foo");

        let pairs: Vec<_> = params.iter().collect();
        assert_eq!(pairs, vec![("user_id", "alice"), ("item_id", "foo")]);
    }

    #[test]
    fn test_params_from_iterator() {
        let params: Params = vec![
            ("a".to_string(), "1".to_string()),
            ("b".to_string(), "2".to_string()),
        ]
        .into_iter()
        .collect();

        assert_eq!(params.len(), 2);
        assert_eq!(params.get("b"), Some("2"));
    }

    #[test]
    fn test_params_spill_to_heap() {
        let mut params = Params::new();
        for i in 0..10 {
            params.push(format!("key{i}"), format!("value{i}"));
        }

        assert_eq!(params.len(), 10);
        assert_eq!(params.get("key7"), Some("value7"));
    }
}
