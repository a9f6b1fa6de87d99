//! Search query string construction

use std::fmt;

/// Ordered list of search parameters.
///
/// Parameters keep the order they were added in and values are percent-encoded, so the
/// same sequence of calls always yields the same query string (and the same cache key).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchQuery {
    params: Vec<(String, String)>,
}

impl SearchQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `name=value`.
    pub fn param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.push((name.into(), value.into()));
        self
    }

    /// Append `name=value` when `value` is present.
    pub fn param_opt(self, name: impl Into<String>, value: Option<impl Into<String>>) -> Self {
        match value {
            Some(value) => self.param(name, value),
            None => self,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    pub fn params(&self) -> &[(String, String)] {
        &self.params
    }
}

impl fmt::Display for SearchQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (name, value)) in self.params.iter().enumerate() {
            if i > 0 {
                f.write_str("&")?;
            }
            // Modifiers such as `code:text` keep their colon
            write!(
                f,
                "{}={}",
                urlencoding::encode(name).replace("%3A", ":"),
                urlencoding::encode(value)
            )?;
        }
        Ok(())
    }
}

impl<K, V> FromIterator<(K, V)> for SearchQuery
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        iter.into_iter()
            .fold(SearchQuery::new(), |query, (k, v)| query.param(k, v))
    }
}
