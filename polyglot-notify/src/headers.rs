//! Custom HTTP headers for webhook requests
//!
//! Deployments either configure a fixed set of headers or a function that
//! computes them from the target endpoint (for example to sign requests per
//! host). Both are resolved through [`HeaderProvider::resolve`].

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Header names to values
pub type Headers = BTreeMap<String, String>;

type HeaderFn = dyn Fn(&str) -> Headers + Send + Sync;

/// Source of the custom headers sent with every webhook request
#[derive(Clone)]
pub enum HeaderProvider {
    /// Same headers for every endpoint
    Static(Headers),
    /// Headers computed from the endpoint URL
    Dynamic(Arc<HeaderFn>),
}

impl HeaderProvider {
    /// Fixed headers from `(name, value)` pairs
    pub fn fixed<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        HeaderProvider::Static(
            pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// Headers computed per endpoint
    pub fn dynamic<F>(f: F) -> Self
    where
        F: Fn(&str) -> Headers + Send + Sync + 'static,
    {
        HeaderProvider::Dynamic(Arc::new(f))
    }

    /// Headers to send to `endpoint`
    pub fn resolve(&self, endpoint: &str) -> Headers {
        match self {
            HeaderProvider::Static(headers) => headers.clone(),
            HeaderProvider::Dynamic(f) => f(endpoint),
        }
    }
}

impl Default for HeaderProvider {
    fn default() -> Self {
        HeaderProvider::Static(Headers::new())
    }
}

impl fmt::Debug for HeaderProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            // values may hold credentials
            HeaderProvider::Static(headers) => f
                .debug_tuple("Static")
                .field(&headers.keys().collect::<Vec<_>>())
                .finish(),
            HeaderProvider::Dynamic(_) => f.write_str("Dynamic(<fn>)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_empty() {
        assert!(HeaderProvider::default().resolve("https://example.com").is_empty());
    }

    #[test]
    fn test_static_ignores_endpoint() {
        let provider = HeaderProvider::fixed([("X-Token", "abc")]);
        assert_eq!(provider.resolve("https://a.example")["X-Token"], "abc");
        assert_eq!(provider.resolve("https://b.example")["X-Token"], "abc");
    }

    #[test]
    fn test_dynamic_sees_endpoint() {
        let provider = HeaderProvider::dynamic(|endpoint| {
            let mut headers = Headers::new();
            if endpoint.starts_with("https://internal.") {
                headers.insert("X-Internal".to_string(), "1".to_string());
            }
            headers
        });
        assert!(provider.resolve("https://internal.example/hook").contains_key("X-Internal"));
        assert!(provider.resolve("https://public.example/hook").is_empty());
    }

    #[test]
    fn test_debug_hides_values() {
        let provider = HeaderProvider::fixed([("Authorization", "Bearer secret")]);
        let debug = format!("{:?}", provider);
        assert!(debug.contains("Authorization"));
        assert!(!debug.contains("secret"));
        assert_eq!(
            format!("{:?}", HeaderProvider::dynamic(|_| Headers::new())),
            "Dynamic(<fn>)"
        );
    }
}
