use lookit_core::html::widgets::google_tag_manager;
use lookit_core::html::{escape, nav_link, Markup, NavLink, NavTarget};
use lookit_core::{urls, Error};

use crate::settings::Settings;

/// What every page needs to render its shell.
pub struct Page<'a> {
    pub request_path: &'a str,
    pub settings: &'a Settings,
    pub title: &'a str,
}

impl<'a> Page<'a> {
    pub fn new(request_path: &'a str, settings: &'a Settings, title: &'a str) -> Self {
        Self {
            request_path,
            settings,
            title,
        }
    }

    /// Wraps `body` in the site shell: head, navigation bar and footer.
    pub fn render(&self, body: &Markup) -> Result<Markup, Error> {
        let static_url = self.settings.storage.static_url();
        let site_name = escape(&self.settings.site_name);

        Ok(Markup::new(format!(
            r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title} | {site_name}</title>
{analytics}<link rel="stylesheet" href="{static_url}css/site.css">
</head>
<body>
{navbar}
<main class="container">
{body}
</main>
<footer class="container text-center text-muted py-4">{site_name}</footer>
</body>
</html>
"#,
            title = escape(self.title),
            analytics = google_tag_manager(self.settings.google_tag_manager_id.as_deref()),
            static_url = escape(static_url),
            navbar = self.navbar()?,
        )))
    }

    fn navbar(&self) -> Result<Markup, Error> {
        let path = self.request_path;
        let items = [
            nav_link(path, NavLink::new(NavTarget::Route(urls::STUDIES_LIST), "Studies").list(true))?,
            nav_link(
                path,
                NavLink::new(NavTarget::Route(urls::EXP_STUDY_LIST), "Experimenter").list(true),
            )?,
        ];

        Ok(Markup::new(format!(
            r#"<nav class="navbar navbar-expand-lg navbar-light bg-light mb-4">
<div class="container">
<a class="navbar-brand" href="{home}">{site_name}</a>
<ul class="navbar-nav ms-auto">
{items}
</ul>
</div>
</nav>"#,
            home = urls::reverse(urls::HOME)?,
            site_name = escape(&self.settings.site_name),
            items = items
                .iter()
                .map(|m| m.as_str())
                .collect::<Vec<_>>()
                .join("\n"),
        )))
    }
}
