//! HTML fragments for pages: navigation, breadcrumbs, buttons and widgets.
//!
//! Arguments typed as `&str` are treated as text and escaped. [`Markup`] is
//! trusted, already rendered HTML and is inserted verbatim.

use std::collections::HashMap;
use std::fmt;

pub mod blocks;
pub mod nav;
pub mod widgets;

pub use blocks::{Breadcrumb, FormButtons};
pub use nav::{nav_link, NavLink, NavTarget};

/// Rendered HTML that is safe to insert into a page as is.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Markup(String);

impl Markup {
    pub fn new(html: impl Into<String>) -> Self {
        Self(html.into())
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Markup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<Markup> for String {
    fn from(markup: Markup) -> Self {
        markup.0
    }
}

/// Escapes text for use in element content and quoted attribute values.
pub fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Values available while rendering nodes.
#[derive(Debug, Clone, Default)]
pub struct Context {
    request_path: String,
    variables: HashMap<String, String>,
}

impl Context {
    pub fn new(request_path: impl Into<String>) -> Self {
        Self {
            request_path: request_path.into(),
            variables: HashMap::new(),
        }
    }

    pub fn with(mut self, name: &str, value: impl Into<String>) -> Self {
        self.variables.insert(name.to_string(), value.into());
        self
    }

    pub fn request_path(&self) -> &str {
        &self.request_path
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.variables.get(name).map(|v| v.as_str())
    }
}

/// Something that renders to HTML against a [`Context`].
pub trait Node {
    fn render(&self, context: &Context) -> String;
}

/// Literal template text, rendered verbatim.
impl Node for &str {
    fn render(&self, _context: &Context) -> String {
        self.to_string()
    }
}

impl Node for String {
    fn render(&self, _context: &Context) -> String {
        self.clone()
    }
}

impl Node for Markup {
    fn render(&self, _context: &Context) -> String {
        self.0.clone()
    }
}

/// A context variable, rendered escaped. Missing variables render empty.
#[derive(Debug, Clone)]
pub struct Variable(pub String);

impl Variable {
    pub fn new(name: &str) -> Self {
        Self(name.to_string())
    }
}

impl Node for Variable {
    fn render(&self, context: &Context) -> String {
        context.get(&self.0).map(escape).unwrap_or_default()
    }
}
