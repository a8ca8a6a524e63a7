use serde::{Deserialize, Serialize};

use super::{escape, Markup};

/// Google Analytics tag, or nothing when no tag manager ID is configured.
pub fn google_tag_manager(tag_manager_id: Option<&str>) -> Markup {
    match tag_manager_id.filter(|id| !id.is_empty()) {
        Some(id) => {
            let id = escape(id);
            Markup::new(format!(
                r#"<!-- Google tag (gtag.js) - Google Analytics -->
<script async src="https://www.googletagmanager.com/gtag/js?id={id}"></script>
<script>
    window.dataLayer = window.dataLayer || [];
    function gtag(){{dataLayer.push(arguments);}}
    gtag('js', new Date());
    gtag('config', '{id}');
</script>
"#
            ))
        }
        None => Markup::empty(),
    }
}

pub fn page_title(title: &str, right_side_elements: Option<&Markup>) -> Markup {
    match right_side_elements.filter(|m| !m.is_empty()) {
        Some(right_side) => Markup::new(format!(
            r#"<div class="d-flex flex-row bd-highlight mb-4 align-items-center">
        <h1 class="me-auto">{}</h1>
        <div>{}</div>
        </div>"#,
            escape(title),
            right_side
        )),
        None => Markup::new(format!(
            r#"<h1 class="mt-4 mb-4 text-center">{}</h1>"#,
            escape(title)
        )),
    }
}

fn join_classes(base: &[&str], extra_classes: Option<&str>) -> String {
    let mut classes = base.to_vec();
    if let Some(extra) = extra_classes.filter(|e| !e.is_empty()) {
        classes.push(extra);
    }
    classes.join(" ")
}

pub fn button_primary_classes(extra_classes: Option<&str>) -> String {
    join_classes(&["btn", "btn-primary"], extra_classes)
}

pub fn button_secondary_classes(extra_classes: Option<&str>) -> String {
    join_classes(
        &["btn", "btn-light", "link-secondary", "border-secondary"],
        extra_classes,
    )
}

pub fn study_info_table_heading_classes() -> &'static str {
    "col-sm-12 col-md-4 py-2 align-top"
}

pub fn study_info_table_content_classes() -> &'static str {
    "col-sm-12 col-md-8 py-2 ps-2 align-top"
}

/// Layout of a staff profile card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProfileSize {
    /// Rows of 4 on large screens, 1 on mobile with a smaller image.
    #[default]
    Large,
    /// Rows of 6 on large screens, 2 on mobile.
    Small,
}

pub fn staff_profile(name: &str, img: &str, blurb: &Markup, size: ProfileSize) -> Markup {
    let (profile_div_classes, img_div_classes, blurb_classes) = match size {
        ProfileSize::Large => ("col-12 col-md-6 col-lg-3", "col-8 col-lg-12", ""),
        ProfileSize::Small => ("col-6 col-md-4 col-lg-2", "col-12", "text-center"),
    };
    let name = escape(name);

    Markup::new(format!(
        r#"<div class="{profile_div_classes}">
    <div class="row justify-content-center">
    <div class="{img_div_classes}">
    <img class="img-fluid w-100 mx-auto d-block rounded-circle shadow mb-3" alt="{name}" src="{img}"/>
    </div>
    </div>
    <h3 class="text-center">{name}</h3>
    <p class="pb-4 {blurb_classes}">{blurb}</p>
    </div>"#,
        img = escape(img),
    ))
}

/// Tabs of the public study list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StudyListTab {
    #[default]
    AllStudies,
    SynchronousStudies,
    AsynchronousStudies,
}

impl StudyListTab {
    pub fn all() -> &'static [StudyListTab] {
        &[
            StudyListTab::AllStudies,
            StudyListTab::SynchronousStudies,
            StudyListTab::AsynchronousStudies,
        ]
    }

    pub fn value(&self) -> &'static str {
        match self {
            StudyListTab::AllStudies => "0",
            StudyListTab::SynchronousStudies => "1",
            StudyListTab::AsynchronousStudies => "2",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            StudyListTab::AllStudies => "All studies",
            StudyListTab::SynchronousStudies => "Studies happening right now",
            StudyListTab::AsynchronousStudies => "Scheduled studies",
        }
    }

    pub fn from_value(value: &str) -> Option<Self> {
        Self::all().iter().copied().find(|t| t.value() == value)
    }

    pub fn help_text(&self) -> &'static str {
        match self {
            StudyListTab::AllStudies => "Use the tabs above to see activities you can do right now, or scheduled activities you can sign up for.\n\nPlease note you'll need a laptop or desktop computer (not a mobile device) running Chrome or Firefox to participate, unless a specific study says otherwise.",
            StudyListTab::SynchronousStudies => "You and your child can participate in these studies right now by choosing a study and then clicking \"Participate.\" Please note you'll need a laptop or desktop computer (not a mobile device) running Chrome or Firefox to participate, unless a specific study says otherwise.",
            StudyListTab::AsynchronousStudies => "You and your child can participate in these studies by scheduling a time to meet with a researcher (usually over video conferencing). Choose a study and then click \"Participate\" to sign up for a study session in the future.",
        }
    }
}

/// A rendered tab and whether it is the one being shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tab {
    pub tab: StudyListTab,
    pub selected: bool,
}

impl Tab {
    /// One entry per tab, with `selected` marked.
    pub fn list(selected: StudyListTab) -> Vec<Tab> {
        StudyListTab::all()
            .iter()
            .map(|&tab| Tab {
                tab,
                selected: tab == selected,
            })
            .collect()
    }
}

/// Value of the first selected tab.
pub fn studies_tab_selected(tabs: &[Tab]) -> Option<&'static str> {
    tabs.iter().find(|t| t.selected).map(|t| t.tab.value())
}

/// Help text shown under the study list tabs for the selected tab.
pub fn studies_tab_text(tabs: &[Tab]) -> Option<&'static str> {
    tabs.iter().find(|t| t.selected).map(|t| t.tab.help_text())
}
