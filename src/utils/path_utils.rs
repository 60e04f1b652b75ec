use crate::error::{Result, VerifierError};
use regex::Regex;
use serde_json::Value;
use std::collections::BTreeMap;

pub struct PathUtils;

impl PathUtils {
    /// Substitute every `{name}` placeholder in `template` with the
    /// percent-encoded parameter value
    pub fn resolve_template(template: &str, params: &BTreeMap<String, Value>) -> Result<String> {
        let placeholder = Regex::new(r"\{([A-Za-z_][A-Za-z0-9_]*)\}")?;
        let mut resolved = String::with_capacity(template.len());
        let mut last = 0;

        for captures in placeholder.captures_iter(template) {
            let Some(whole) = captures.get(0) else {
                continue;
            };
            let name = &captures[1];
            let value = params
                .get(name)
                .ok_or_else(|| VerifierError::MissingParameter(name.to_string(), template.to_string()))?;
            resolved.push_str(&template[last..whole.start()]);
            resolved.push_str(&urlencoding::encode(&Self::render_segment(value)));
            last = whole.end();
        }
        resolved.push_str(&template[last..]);
        Ok(resolved)
    }

    /// Drop a trailing `/{name}` segment, turning an item path into its
    /// collection path. Returns `None` when the template does not end in one.
    pub fn collection_template<'a>(template: &'a str, name: &str) -> Option<&'a str> {
        let suffix = format!("/{{{}}}", name);
        template.strip_suffix(suffix.as_str())
    }

    /// Name of the placeholder forming the last path segment, if any
    pub fn trailing_placeholder(template: &str) -> Option<&str> {
        let (_, last) = template.rsplit_once('/')?;
        last.strip_prefix('{')?.strip_suffix('}').filter(|name| !name.is_empty())
    }

    /// Append percent-encoded query pairs
    pub fn append_query(path: &str, query: &[(String, String)]) -> String {
        if query.is_empty() {
            return path.to_string();
        }
        let encoded: Vec<String> = query
            .iter()
            .map(|(key, value)| format!("{}={}", urlencoding::encode(key), urlencoding::encode(value)))
            .collect();
        let separator = if path.contains('?') { '&' } else { '?' };
        format!("{}{}{}", path, separator, encoded.join("&"))
    }

    /// Join a base URL and an absolute path without doubling the slash
    pub fn join_url(base_url: &str, path: &str) -> String {
        let base = base_url.trim_end_matches('/');
        if path.starts_with('/') {
            format!("{}{}", base, path)
        } else {
            format!("{}/{}", base, path)
        }
    }

    fn render_segment(value: &Value) -> String {
        match value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }
}
