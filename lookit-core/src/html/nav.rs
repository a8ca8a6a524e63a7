use super::{escape, Markup};
use crate::{urls, Error};

const DEFAULT_NAV_CLASSES: &[&str] = &[
    "nav-link",
    "navbar-link",
    "link-secondary",
    "text-center",
    "px-3",
];

/// Where a navigation item points to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavTarget<'a> {
    /// A route name, resolved with [`urls::reverse`].
    Route(&'a str),
    /// A URL used as is.
    Url(&'a str),
}

impl<'a> NavTarget<'a> {
    pub fn resolve(&self) -> Result<String, Error> {
        match self {
            NavTarget::Route(name) => urls::reverse(name),
            NavTarget::Url(url) => Ok(url.to_string()),
        }
    }
}

/// A navigation bar item.
#[derive(Debug, Clone)]
pub struct NavLink<'a> {
    pub target: NavTarget<'a>,
    pub text: &'a str,
    pub classes: Option<Vec<String>>,
    pub query_string: Option<&'a str>,
    pub list: bool,
}

impl<'a> NavLink<'a> {
    pub fn new(target: NavTarget<'a>, text: &'a str) -> Self {
        Self {
            target,
            text,
            classes: None,
            query_string: None,
            list: false,
        }
    }

    pub fn classes(mut self, classes: &[&str]) -> Self {
        self.classes = Some(classes.iter().map(|c| c.to_string()).collect());
        self
    }

    pub fn query_string(mut self, query_string: &'a str) -> Self {
        self.query_string = Some(query_string);
        self
    }

    pub fn list(mut self, list: bool) -> Self {
        self.list = list;
        self
    }
}

/// Whether `url` is the page being viewed. Exact comparison, trailing slashes
/// and query strings are significant.
pub fn is_active(request_path: &str, url: &str) -> bool {
    request_path == url
}

/// Renders a navigation anchor, marked active when its URL is the current
/// request path.
pub fn nav_link(request_path: &str, link: NavLink<'_>) -> Result<Markup, Error> {
    let mut classes = link
        .classes
        .unwrap_or_else(|| DEFAULT_NAV_CLASSES.iter().map(|c| c.to_string()).collect());

    let mut url = link.target.resolve()?;

    let mut aria_current = "";
    if is_active(request_path, &url) {
        classes.extend(["active".to_string(), "btn-secondary".to_string()]);
        aria_current = r#" aria-current="page""#;
    }

    if let Some(query_string) = link.query_string.filter(|q| !q.is_empty()) {
        url.push_str(query_string);
    }

    let anchor = format!(
        r#"<a class="{}"{} href="{}">{}</a>"#,
        classes.join(" "),
        aria_current,
        escape(&url),
        escape(link.text)
    );

    if link.list {
        Ok(Markup::new(format!(r#"<li class="nav-item">{}</li>"#, anchor)))
    } else {
        Ok(Markup::new(anchor))
    }
}

pub fn dropdown_item(request_path: &str, target: NavTarget<'_>, text: &str) -> Result<Markup, Error> {
    nav_link(request_path, NavLink::new(target, text).classes(&["dropdown-item"]))
}

/// Form that submits to `url` with the current path as the `next` argument,
/// styled as a button or as a navigation link.
pub fn nav_next(request_path: &str, url: &str, text: &str, button: bool) -> Markup {
    let css_class = if button {
        "btn btn-light link-secondary border-secondary text-center"
    } else if is_active(request_path, url) {
        "btn active btn-light link-secondary text-center"
    } else {
        "nav-link navbar-link link-secondary border-0 text-center"
    };

    let form = format!(
        r#"<form action="{}" method="get">
    <button class="{}" type="submit" value="login">{}</button>
    <input type="hidden" name="next" value="{}" />
    </form>"#,
        escape(url),
        css_class,
        escape(text),
        escape(request_path)
    );

    if button {
        Markup::new(form)
    } else {
        Markup::new(format!("<li>{}</li>", form))
    }
}

pub fn nav_login(request_path: &str, text: Option<&str>, button: bool) -> Result<Markup, Error> {
    let url = urls::reverse(urls::LOGIN)?;
    Ok(nav_next(request_path, &url, text.unwrap_or("Login"), button))
}

pub fn nav_signup(request_path: &str, text: Option<&str>, button: bool) -> Result<Markup, Error> {
    let url = urls::reverse(urls::PARTICIPANT_SIGNUP)?;
    Ok(nav_next(request_path, &url, text.unwrap_or("Sign up"), button))
}
