//! # Glitter Templates
//!
//! Template engine for Glitter page rendering using Tera.
//!
//! ## Features
//!
//! - Built-in column templates (`glitter/include/column.html` and
//!   `glitter/include/column_edit.html`)
//! - `slugify` and `capfirst` filters
//! - HTML escaping for widgets that build markup by hand
//! - An HTML-safe JSON encoder for embedding rendered columns in `<script>` tags
//!
//! ## Example
//!
//! ```rust
//! use glitter_template::TemplateEngine;
//! use serde_json::json;
//!
//! let mut engine = TemplateEngine::new().unwrap();
//! engine.add_raw_template("hello.html", "Hello {{ name | slugify }}!").unwrap();
//!
//! let html = engine.render("hello.html", &json!({ "name": "Main Column" })).unwrap();
//! assert_eq!(html, "Hello main-column!");
//! ```

pub mod engine;
pub mod escaping;
pub mod filters;

pub use engine::{COLUMN_EDIT_TEMPLATE, COLUMN_TEMPLATE, TemplateEngine};
pub use escaping::{escape_html, to_html_safe_json};
pub use filters::{capfirst, slugify};

/// Template errors
#[derive(Debug, thiserror::Error)]
pub enum TemplateError {
	/// Template parsing or rendering failed
	#[error("Template error: {0}")]
	Tera(#[from] tera::Error),

	/// A context or payload could not be serialized
	#[error("Serialization error: {0}")]
	Json(#[from] serde_json::Error),
}

/// Result type for template operations
pub type TemplateResult<T> = Result<T, TemplateError>;
