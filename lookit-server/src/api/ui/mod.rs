use std::sync::Arc;

use axum::{
    extract::Path,
    http::{StatusCode, Uri},
    response::{Html, IntoResponse, Response},
    routing::get,
    Extension, Router,
};
use lookit_core::html::widgets::{
    button_primary_classes, button_secondary_classes, page_title, studies_tab_text,
    study_info_table_content_classes, study_info_table_heading_classes, StudyListTab, Tab,
};
use lookit_core::html::{
    escape, nav_link, Breadcrumb, Context, FormButtons, Markup, NavLink, NavTarget, Variable,
};
use lookit_core::query::{query_transform, values_list, QueryOverrides, QueryParams};
use lookit_core::{forms::study::field_label, urls};
use miette::Diagnostic;
use thiserror::Error;
use uuid::Uuid;

use crate::api::v1::studies::PAGE_SIZE;
use crate::repository::{self, study_type, Repository, RepositoryError, StudyQuery, StudySort};
use crate::settings::Settings;

mod assets;
mod layout;

use layout::Page;

/// Study states a researcher can filter the study list by.
pub const STUDY_STATES: &[&str] = &[
    "created",
    "submitted",
    "rejected",
    "retracted",
    "approved",
    "active",
    "paused",
    "deactivated",
    "archived",
];

#[derive(Error, Diagnostic, Debug)]
pub enum UiError {
    #[error("repository error")]
    #[diagnostic(code(lookit::error::repository))]
    Repository(#[from] RepositoryError),
    #[error("failed to render page: {0}")]
    #[diagnostic(code(lookit::error::render))]
    Render(#[from] lookit_core::Error),
}

impl IntoResponse for UiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            UiError::Repository(RepositoryError::NotFound { .. }) => {
                (StatusCode::NOT_FOUND, "Page not found.")
            }
            _ => {
                tracing::error!(error = self.to_string().as_str(), "failed to render page");
                (StatusCode::INTERNAL_SERVER_ERROR, "Something went wrong.")
            }
        };

        (
            status,
            Html(format!(
                r#"<!DOCTYPE html><html lang="en"><body><main class="container"><h1>{}</h1></main></body></html>"#,
                message
            )),
        )
            .into_response()
    }
}

type PageResult = Result<Html<String>, UiError>;

pub fn router(settings: &Settings) -> Router {
    let router = Router::new()
        .route("/", get(home))
        .route("/studies/", get(studies_list))
        .route("/exp/studies/", get(exp_study_list))
        .route("/exp/studies/:id/", get(exp_study_detail));

    if settings.storage.serves_static_assets() {
        assets::register_routes(router)
    } else {
        router
    }
}

/// Handler for `GET /`
async fn home(uri: Uri, Extension(settings): Extension<Arc<Settings>>) -> PageResult {
    let path = uri.path();
    let body = render_home(&settings)?;
    Ok(Html(Page::new(path, &settings, "Home").render(&body)?.into_string()))
}

/// Handler for `GET /studies/`
async fn studies_list(
    uri: Uri,
    Extension(settings): Extension<Arc<Settings>>,
    Extension(repository): Extension<Repository>,
) -> PageResult {
    let params = QueryParams::parse(uri.query().unwrap_or(""));
    let tab = params
        .get("tab")
        .and_then(StudyListTab::from_value)
        .unwrap_or_default();
    let page = page_number(&params);

    let query = StudyQuery {
        state: Some("active".to_string()),
        public_only: true,
        study_type_id: match tab {
            StudyListTab::AllStudies => None,
            StudyListTab::SynchronousStudies => Some(study_type::EMBER_FRAME_PLAYER_ID),
            StudyListTab::AsynchronousStudies => Some(study_type::EXTERNAL_ID),
        },
        limit: PAGE_SIZE,
        offset: offset(page),
        ..Default::default()
    };
    let (studies, total) = repository.study().read_page(&query).await?;

    let body = render_studies_list(&params, tab, &studies, page, total);
    let path = uri.path();
    Ok(Html(Page::new(path, &settings, "Studies").render(&body)?.into_string()))
}

/// Handler for `GET /exp/studies/`
async fn exp_study_list(
    uri: Uri,
    Extension(settings): Extension<Arc<Settings>>,
    Extension(repository): Extension<Repository>,
) -> PageResult {
    let params = QueryParams::parse(uri.query().unwrap_or(""));
    let page = page_number(&params);

    let query = StudyQuery {
        state: params
            .get("state")
            .filter(|s| STUDY_STATES.contains(s))
            .map(|s| s.to_string()),
        matching: params.get("match").filter(|m| !m.is_empty()).map(|m| m.to_string()),
        sort: params
            .get("sort")
            .and_then(StudySort::from_param)
            .unwrap_or_default(),
        limit: PAGE_SIZE,
        offset: offset(page),
        ..Default::default()
    };
    let (studies, total) = repository.study().read_page(&query).await?;

    let path = uri.path();
    let current = uri.to_string();
    let body = render_exp_study_list(path, &current, &params, &studies, page, total)?;
    Ok(Html(Page::new(path, &settings, "Manage Studies").render(&body)?.into_string()))
}

/// Handler for `GET /exp/studies/:id/`
async fn exp_study_detail(
    uri: Uri,
    Path(id): Path<Uuid>,
    Extension(settings): Extension<Arc<Settings>>,
    Extension(repository): Extension<Repository>,
) -> PageResult {
    let study = repository.study().read_one(&id).await?;

    let path = uri.path();
    let body = render_exp_study_detail(path, &study)?;
    Ok(Html(Page::new(path, &settings, &study.name).render(&body)?.into_string()))
}

fn page_number(params: &QueryParams) -> u32 {
    params
        .get("page")
        .and_then(|p| p.parse::<u32>().ok())
        .filter(|p| *p > 0)
        .unwrap_or(1)
}

fn offset(page: u32) -> i64 {
    (i64::from(page) - 1) * PAGE_SIZE
}

fn render_home(settings: &Settings) -> Result<Markup, lookit_core::Error> {
    let studies = urls::reverse(urls::STUDIES_LIST)?;
    Ok(Markup::new(format!(
        r#"{title}
<p class="lead text-center">Help us understand how children learn, from home.</p>
<div class="d-flex justify-content-center gap-2">
<a class="{primary}" href="{studies}">Find a study</a>
</div>"#,
        title = page_title(&format!("Welcome to {}", settings.site_name), None),
        primary = button_primary_classes(None),
        studies = escape(&studies),
    )))
}

fn render_studies_list(
    params: &QueryParams,
    selected: StudyListTab,
    studies: &[repository::Study],
    page: u32,
    total: i64,
) -> Markup {
    let tabs = Tab::list(selected);

    let tab_links: String = tabs
        .iter()
        .map(|t| {
            let mut tab_params = params.clone();
            tab_params.set("tab", t.tab.value());
            tab_params.set("page", "1");
            format!(
                r#"<li class="nav-item"><a class="nav-link{}" href="?{}">{}</a></li>"#,
                if t.selected { " active" } else { "" },
                escape(&tab_params.urlencode()),
                escape(t.tab.label())
            )
        })
        .collect();

    let help = studies_tab_text(&tabs)
        .map(|text| {
            text.split("\n\n")
                .map(|p| format!(r#"<p class="text-muted">{}</p>"#, escape(p)))
                .collect::<String>()
        })
        .unwrap_or_default();

    let cards: String = if studies.is_empty() {
        r#"<p class="text-center">No studies found.</p>"#.to_string()
    } else {
        studies
            .iter()
            .map(|s| {
                let image = s
                    .image
                    .as_deref()
                    .map(|src| {
                        format!(
                            r#"<img class="card-img-top" alt="{}" src="{}">"#,
                            escape(&s.name),
                            escape(src)
                        )
                    })
                    .unwrap_or_default();
                format!(
                    r#"<div class="col"><div class="card study-card h-100">{}<div class="card-body"><h5 class="card-title">{}</h5><p class="card-text">{}</p></div></div></div>"#,
                    image,
                    escape(&s.name),
                    escape(&s.short_description)
                )
            })
            .collect()
    };

    Markup::new(format!(
        r#"{title}
<ul class="nav nav-tabs mb-3">{tab_links}</ul>
{help}
<div class="row row-cols-1 row-cols-md-3 g-4">{cards}</div>
{pagination}"#,
        title = page_title("Studies", None),
        pagination = pagination(params, page, total),
    ))
}

/// `current` is the full request URI, used to mark the active state filter.
fn render_exp_study_list(
    path: &str,
    current: &str,
    params: &QueryParams,
    studies: &[repository::Study],
    page: u32,
    total: i64,
) -> Result<Markup, lookit_core::Error> {
    let sort_links = [("Name", StudySort::Name), ("Newest", StudySort::Newest)]
        .iter()
        .map(|(label, sort)| {
            let query = query_transform(
                params,
                &QueryOverrides {
                    sort: Some(sort.param().to_string()),
                    ..Default::default()
                },
            );
            format!(
                r#"<a class="{}" href="?{}">{}</a>"#,
                button_secondary_classes(Some("btn-sm")),
                escape(&query),
                label
            )
        })
        .collect::<Vec<_>>()
        .join(" ");

    let state_links = STUDY_STATES
        .iter()
        .map(|state| {
            let query = query_transform(
                params,
                &QueryOverrides {
                    state: Some(state.to_string()),
                    page: Some(1),
                    ..Default::default()
                },
            );
            let url = format!("{}?{}", path, query);
            nav_link(
                current,
                NavLink::new(NavTarget::Url(&url), state)
                    .classes(&["nav-link", "text-capitalize"])
                    .list(true),
            )
            .map(|m| m.into_string())
        })
        .collect::<Result<String, _>>()?;

    let rows: String = studies
        .iter()
        .map(|s| {
            format!(
                r#"<tr><td><a href="{}">{}</a></td><td>{}</td><td>{}</td></tr>"#,
                escape(&urls::exp_study_detail(s.uuid)),
                escape(&s.name),
                escape(&s.state),
                s.created_at.format("%Y-%m-%d")
            )
        })
        .collect();

    let ids = values_list(studies.iter().map(|s| s.uuid))?;

    Ok(Markup::new(format!(
        r#"{title}
<ul class="nav mb-3">{state_links}</ul>
<form method="get" action="{path}" class="mb-3">
<input class="form-control" type="search" name="match" placeholder="Filter studies" value="{matching}">
</form>
<table class="table">
<thead><tr><th>Name</th><th>State</th><th>Created</th></tr></thead>
<tbody>{rows}</tbody>
</table>
<script id="study-ids" type="application/json">{ids}</script>
{pagination}"#,
        title = page_title("Manage Studies", Some(&Markup::new(sort_links))),
        path = escape(path),
        matching = escape(params.get("match").unwrap_or("")),
        pagination = pagination(params, page, total),
    )))
}

fn render_exp_study_detail(path: &str, study: &repository::Study) -> Result<Markup, lookit_core::Error> {
    let context = Context::new(path).with("study", study.name.as_str());

    let breadcrumb = Breadcrumb::new()
        .link(urls::reverse(urls::EXP_STUDY_LIST)?, "Manage Studies")
        .node(Variable::new("study"))
        .render(&context);

    let buttons = FormButtons::new()
        .node(Markup::new(format!(
            r#"<a class="{}" href="{}">Back</a>"#,
            button_secondary_classes(None),
            escape(&urls::reverse(urls::EXP_STUDY_LIST)?)
        )))
        .node(Markup::new(format!(
            r#"<a class="{}" href="/api/v1/studies/{}">View JSON</a>"#,
            button_primary_classes(None),
            study.uuid
        )))
        .render(&context);

    let age_range = format!(
        "{} years, {} months, {} days to {} years, {} months, {} days",
        study.min_age_years,
        study.min_age_months,
        study.min_age_days,
        study.max_age_years,
        study.max_age_months,
        study.max_age_days
    );

    let fields: [(&str, String); 8] = [
        ("short_description", study.short_description.clone()),
        ("long_description", study.long_description.clone()),
        ("criteria", study.criteria.clone()),
        ("duration", study.duration.clone()),
        ("contact_info", study.contact_info.clone()),
        ("exit_url", study.exit_url.clone().unwrap_or_default()),
        ("study_type", study.study_type_name.clone()),
        ("public", if study.public { "Yes" } else { "No" }.to_string()),
    ];

    let mut rows = vec![row("Eligible Ages", &age_range)];
    rows.extend(
        fields
            .iter()
            .filter_map(|(field, value)| field_label(field).map(|label| row(label, value))),
    );

    Ok(Markup::new(format!(
        r#"{breadcrumb}
{title}
<table class="study-info-table">{rows}</table>
{buttons}"#,
        title = page_title(&study.name, None),
        rows = rows.join(""),
    )))
}

fn row(label: &str, value: &str) -> String {
    format!(
        r#"<tr><th class="{}">{}</th><td class="{}">{}</td></tr>"#,
        study_info_table_heading_classes(),
        escape(label),
        study_info_table_content_classes(),
        escape(value)
    )
}

/// Previous and next page links that keep the rest of the query string.
fn pagination(params: &QueryParams, page: u32, total: i64) -> Markup {
    let pages = u32::try_from((total + PAGE_SIZE - 1) / PAGE_SIZE)
        .unwrap_or(u32::MAX)
        .max(1);
    if pages <= 1 {
        return Markup::empty();
    }

    let link = |target: u32, label: &str, enabled: bool| {
        if enabled {
            format!(
                r#"<li class="page-item"><a class="page-link" href="?{}">{}</a></li>"#,
                escape(&query_transform(params, &QueryOverrides::page(target))),
                label
            )
        } else {
            format!(
                r#"<li class="page-item disabled"><span class="page-link">{}</span></li>"#,
                label
            )
        }
    };

    Markup::new(format!(
        r#"<nav><ul class="pagination justify-content-center">{}<li class="page-item active"><span class="page-link">Page {} of {}</span></li>{}</ul></nav>"#,
        link(page.saturating_sub(1), "Previous", page > 1),
        page,
        pages,
        link(page.saturating_add(1), "Next", page < pages),
    ))
}
