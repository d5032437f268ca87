//! `<select>` controls for the editing UI
//!
//! The choice lists are the contract with the surrounding admin UI; the
//! markup here is a minimal rendering of them.

use glitter_template::escape_html;
use std::fmt::Write;

/// Choices offered by a [`Select`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Choices {
	/// `(value, label)` pairs
	Flat(Vec<(String, String)>),
	/// `(group label, [(value, label)])` rendered with `<optgroup>`
	Grouped(Vec<(String, Vec<(String, String)>)>),
}

/// A `<select>` element
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Select {
	attrs: Vec<(String, String)>,
	placeholder: Option<String>,
	choices: Choices,
}

impl Select {
	/// Select with flat choices
	pub fn new(choices: Vec<(String, String)>) -> Self {
		Self {
			attrs: Vec::new(),
			placeholder: None,
			choices: Choices::Flat(choices),
		}
	}

	/// Select with grouped choices
	pub fn grouped(choices: Vec<(String, Vec<(String, String)>)>) -> Self {
		Self {
			attrs: Vec::new(),
			placeholder: None,
			choices: Choices::Grouped(choices),
		}
	}

	/// Add an HTML attribute
	pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
		self.attrs.push((name.into(), value.into()));
		self
	}

	/// Add an empty first option with this label
	pub fn placeholder(mut self, label: impl Into<String>) -> Self {
		self.placeholder = Some(label.into());
		self
	}

	/// Render the element; `value` marks the selected option
	pub fn render(&self, name: &str, value: Option<&str>) -> String {
		let mut html = String::from("<select");
		if !name.is_empty() {
			let _ = write!(html, r#" name="{}""#, escape_html(name));
		}
		for (attr, attr_value) in &self.attrs {
			let _ = write!(html, r#" {}="{}""#, attr, escape_html(attr_value));
		}
		html.push('>');

		if let Some(label) = &self.placeholder {
			let _ = write!(html, r#"<option value="">{}</option>"#, escape_html(label));
		}

		match &self.choices {
			Choices::Flat(choices) => push_options(&mut html, choices, value),
			Choices::Grouped(groups) => {
				for (group, choices) in groups {
					let _ = write!(html, r#"<optgroup label="{}">"#, escape_html(group));
					push_options(&mut html, choices, value);
					html.push_str("</optgroup>");
				}
			}
		}

		html.push_str("</select>");
		html
	}
}

fn push_options(html: &mut String, choices: &[(String, String)], value: Option<&str>) {
	for (option_value, label) in choices {
		let selected = if value == Some(option_value.as_str()) {
			" selected"
		} else {
			""
		};
		let _ = write!(
			html,
			r#"<option value="{}"{}>{}</option>"#,
			escape_html(option_value),
			selected,
			escape_html(label)
		);
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	fn test_flat_select_marks_selected() {
		let select = Select::new(vec![
			("main".to_string(), "Main".to_string()),
			("side".to_string(), "Side & more".to_string()),
		])
		.attr("class", "glitter-move-column-select");

		let html = select.render("", Some("side"));

		assert_eq!(
			html,
			concat!(
				r#"<select class="glitter-move-column-select">"#,
				r#"<option value="main">Main</option>"#,
				r#"<option value="side" selected>Side &amp; more</option>"#,
				"</select>"
			)
		);
	}

	#[rstest]
	fn test_grouped_select_with_placeholder() {
		let select = Select::grouped(vec![(
			"Text".to_string(),
			vec![("glitter_html.HTML".to_string(), "HTML".to_string())],
		)])
		.placeholder("Add block");

		let html = select.render("block_type", None);

		assert!(html.starts_with(r#"<select name="block_type"><option value="">Add block</option>"#));
		assert!(html.contains(r#"<optgroup label="Text"><option value="glitter_html.HTML">HTML</option></optgroup>"#));
		assert!(!html.contains("selected"));
	}
}
