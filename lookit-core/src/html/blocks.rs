use super::{Context, Markup, Node};

/// Breadcrumb trail built from alternating `href`, `label` nodes followed by
/// the label of the current page.
///
/// Nodes that render blank are skipped. When an odd number of nodes precedes
/// the current page, the last unpaired one is dropped.
#[derive(Default)]
pub struct Breadcrumb {
    nodes: Vec<Box<dyn Node>>,
}

impl Breadcrumb {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn node(mut self, node: impl Node + 'static) -> Self {
        self.nodes.push(Box::new(node));
        self
    }

    /// Adds a linked crumb.
    pub fn link(self, href: impl Node + 'static, label: impl Node + 'static) -> Self {
        self.node(href).node(label)
    }

    pub fn render(&self, context: &Context) -> Markup {
        let mut rendered: Vec<String> = self
            .nodes
            .iter()
            .map(|node| node.render(context))
            .filter(|output| !output.trim().is_empty())
            .collect();

        let current = match rendered.pop() {
            Some(current) => current,
            None => return Markup::empty(),
        };

        let mut html = String::from(
            r#"<nav aria-label="breadcrumb" class="my-2 breadcrumb"><ol class="breadcrumb">"#,
        );

        for pair in rendered.chunks_exact(2) {
            html.push_str(r#"<li class="breadcrumb-item">"#);
            html.push_str(&format!(r#"<a href="{}">{}</a>"#, pair[0], pair[1]));
            html.push_str("</li>");
        }

        html.push_str(&format!(
            r#"<li class="breadcrumb-item active" aria-current="page">{}</li>"#,
            current
        ));
        html.push_str("</ol></nav>");

        Markup::new(html)
    }
}

/// Right aligned row of form buttons.
#[derive(Default)]
pub struct FormButtons {
    nodes: Vec<Box<dyn Node>>,
}

impl FormButtons {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn node(mut self, node: impl Node + 'static) -> Self {
        self.nodes.push(Box::new(node));
        self
    }

    pub fn render(&self, context: &Context) -> Markup {
        let buttons: String = self.nodes.iter().map(|n| n.render(context)).collect();
        Markup::new(format!(
            r#"<div class="d-flex justify-content-end gap-1">{}</div>"#,
            buttons
        ))
    }
}
