//! Text filters shared by the column templates and the renderers
//!
//! Each filter is available both as a plain function and as a Tera filter.

use std::collections::HashMap;
use tera::{Result as TeraResult, Value};

/// Convert text to a URL and CSS friendly slug
///
/// Lowercases, keeps letters, digits and underscores, drops other
/// punctuation, turns every run of whitespace or dashes into a single `-`
/// and trims dashes and underscores from both ends.
///
/// # Examples
///
/// ```
/// use glitter_template::slugify;
///
/// assert_eq!(slugify("Main Content"), "main-content");
/// assert_eq!(slugify("main_content"), "main_content");
/// assert_eq!(slugify("  --Hello, World!-- "), "hello-world");
/// ```
pub fn slugify(text: &str) -> String {
	let mut slug = String::with_capacity(text.len());
	let mut pending_dash = false;

	for ch in text.to_lowercase().chars() {
		if ch.is_alphanumeric() || ch == '_' {
			if pending_dash && !slug.is_empty() {
				slug.push('-');
			}
			pending_dash = false;
			slug.push(ch);
		} else if ch == '-' || ch.is_whitespace() {
			pending_dash = true;
		}
	}

	slug.trim_matches(|c| c == '-' || c == '_').to_string()
}

/// Uppercase the first character, leaving the rest untouched
///
/// # Examples
///
/// ```
/// use glitter_template::capfirst;
///
/// assert_eq!(capfirst("image block"), "Image block");
/// assert_eq!(capfirst("HTML"), "HTML");
/// assert_eq!(capfirst(""), "");
/// ```
pub fn capfirst(text: &str) -> String {
	let mut chars = text.chars();
	match chars.next() {
		Some(first) => first.to_uppercase().chain(chars).collect(),
		None => String::new(),
	}
}

/// Tera filter wrapping [`slugify`]
///
/// ```tera
/// {{ column_name | slugify }}
/// ```
pub fn slugify_filter(value: &Value, _args: &HashMap<String, Value>) -> TeraResult<Value> {
	let s = value
		.as_str()
		.ok_or_else(|| tera::Error::msg("slugify filter requires a string"))?;
	Ok(Value::String(slugify(s)))
}

/// Tera filter wrapping [`capfirst`]
pub fn capfirst_filter(value: &Value, _args: &HashMap<String, Value>) -> TeraResult<Value> {
	let s = value
		.as_str()
		.ok_or_else(|| tera::Error::msg("capfirst filter requires a string"))?;
	Ok(Value::String(capfirst(s)))
}
