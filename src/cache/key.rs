//! Cache Key Module
//!
//! Builds cache keys from resource identity and request parameters.
//!
//! Default key shape: `<resource>:<uri path>[:<id>][?<query>]`

use std::fmt;
use std::sync::Arc;

use serde_json::{Map, Value};
use url::form_urlencoded;

/// Request parameters as received by a resource handler.
pub type QueryParams = Map<String, Value>;

/// Custom key builder: `(resource, uri_path, params) -> key`.
pub type KeyGenerator = Arc<dyn Fn(&str, &str, &QueryParams) -> String + Send + Sync>;

/// Parameters checked, in order, for a resource identifier.
pub const ID_PARAMS: [&str; 3] = ["system_id", "id", "name"];

// == Key Options ==
#[derive(Clone, Default)]
pub struct KeyOptions {
    /// Append the request parameters to the key
    pub include_query_params: bool,
    /// Only append these parameters, in this order
    pub include_query_params_list: Option<Vec<String>>,
    /// Replaces the default key shape entirely
    pub key_generator: Option<KeyGenerator>,
}

impl KeyOptions {
    /// Append every parameter.
    pub fn with_query_params() -> Self {
        Self {
            include_query_params: true,
            ..Self::default()
        }
    }

    /// Append only the named parameters.
    pub fn with_query_params_list<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            include_query_params: true,
            include_query_params_list: Some(names.into_iter().map(Into::into).collect()),
            ..Self::default()
        }
    }

    pub fn with_key_generator<F>(generator: F) -> Self
    where
        F: Fn(&str, &str, &QueryParams) -> String + Send + Sync + 'static,
    {
        Self {
            key_generator: Some(Arc::new(generator)),
            ..Self::default()
        }
    }
}

impl fmt::Debug for KeyOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyOptions")
            .field("include_query_params", &self.include_query_params)
            .field("include_query_params_list", &self.include_query_params_list)
            .field("key_generator", &self.key_generator.as_ref().map(|_| ".."))
            .finish()
    }
}

// == Generate Key ==
/// Builds the cache key for a resource request.
///
/// Never fails; empty inputs give a degenerate key such as `":"`.
pub fn generate_key(
    resource: &str,
    uri_path: &str,
    params: &QueryParams,
    options: Option<&KeyOptions>,
) -> String {
    if let Some(generator) = options.and_then(|o| o.key_generator.as_ref()) {
        return generator(resource, uri_path, params);
    }

    let mut key = format!("{}:{}", resource, uri_path);

    if let Some(id) = extract_resource_id(params) {
        key.push(':');
        key.push_str(&id);
    }

    if let Some(options) = options.filter(|o| o.include_query_params) {
        let query = match &options.include_query_params_list {
            Some(names) => render_listed(params, names),
            None => render_all(params),
        };
        if !query.is_empty() {
            key.push('?');
            key.push_str(&query);
        }
    }

    key
}

/// Returns the first identifier found among [`ID_PARAMS`].
pub fn extract_resource_id(params: &QueryParams) -> Option<String> {
    ID_PARAMS.iter().find_map(|name| match params.get(*name)? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

/// Every parameter, sorted by name so key order in the request does not matter.
fn render_all(params: &QueryParams) -> String {
    let mut pairs: Vec<(&String, &Value)> = params.iter().collect();
    pairs.sort_by(|a, b| a.0.cmp(b.0));

    encode_pairs(pairs.into_iter().map(|(name, value)| (name.as_str(), value)))
}

/// Only the listed parameters that are present, in list order.
fn render_listed(params: &QueryParams, names: &[String]) -> String {
    encode_pairs(
        names
            .iter()
            .filter_map(|name| params.get(name).map(|value| (name.as_str(), value))),
    )
}

/// Form-encodes the pairs so `&` and `=` inside a value cannot forge another pair.
fn encode_pairs<'a>(pairs: impl Iterator<Item = (&'a str, &'a Value)>) -> String {
    let mut query = form_urlencoded::Serializer::new(String::new());
    for (name, value) in pairs {
        query.append_pair(name, &render_value(value));
    }
    query.finish()
}

fn render_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
