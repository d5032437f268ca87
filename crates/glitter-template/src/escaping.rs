//! HTML escaping helpers
//!
//! Escaped characters:
//! - `<` → `&lt;`
//! - `>` → `&gt;`
//! - `&` → `&amp;`
//! - `"` → `&quot;`
//! - `'` → `&#x27;`

use crate::TemplateResult;
use serde::Serialize;

/// Escape HTML special characters
///
/// # Examples
///
/// ```
/// use glitter_template::escape_html;
///
/// assert_eq!(escape_html("<b>Tom & Jerry's</b>"),
///            "&lt;b&gt;Tom &amp; Jerry&#x27;s&lt;/b&gt;");
/// ```
pub fn escape_html(text: &str) -> String {
	let mut result = String::with_capacity(text.len() + 10);
	for ch in text.chars() {
		match ch {
			'&' => result.push_str("&amp;"),
			'<' => result.push_str("&lt;"),
			'>' => result.push_str("&gt;"),
			'"' => result.push_str("&quot;"),
			'\'' => result.push_str("&#x27;"),
			_ => result.push(ch),
		}
	}
	result
}

/// Serialize a value to JSON that can be embedded inside an HTML `<script>` element
///
/// `<`, `>` and `&` are written as unicode escapes so the output never closes
/// the surrounding element. The result is still valid JSON.
///
/// # Examples
///
/// ```
/// use glitter_template::to_html_safe_json;
/// use serde_json::json;
///
/// let encoded = to_html_safe_json(&json!({ "content": "<p>a & b</p>" })).unwrap();
/// assert_eq!(encoded, r#"{"content":"\u003cp\u003ea \u0026 b\u003c/p\u003e"}"#);
/// ```
pub fn to_html_safe_json<T: Serialize + ?Sized>(value: &T) -> TemplateResult<String> {
	let raw = serde_json::to_string(value)?;
	let mut encoded = String::with_capacity(raw.len());
	for ch in raw.chars() {
		match ch {
			'<' => encoded.push_str("\\u003c"),
			'>' => encoded.push_str("\\u003e"),
			'&' => encoded.push_str("\\u0026"),
			_ => encoded.push(ch),
		}
	}
	Ok(encoded)
}
