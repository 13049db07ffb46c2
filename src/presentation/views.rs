use crate::application::error::{ErrorReport, HttpError};
use askama::{Error as AskamaError, Template};
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use thiserror::Error;

const BRAND: &str = "keydash";

#[derive(Debug, Error)]
#[error("{public_message}")]
pub struct TemplateRenderError {
    pub(crate) source: &'static str,
    pub(crate) public_message: &'static str,
    #[source]
    pub(crate) error: AskamaError,
}

impl TemplateRenderError {
    pub fn new(source: &'static str, public_message: &'static str, error: AskamaError) -> Self {
        Self {
            source,
            public_message,
            error,
        }
    }
}

impl From<TemplateRenderError> for HttpError {
    fn from(err: TemplateRenderError) -> Self {
        let TemplateRenderError {
            source,
            public_message,
            error,
        } = err;

        HttpError::from_error(
            source,
            StatusCode::INTERNAL_SERVER_ERROR,
            public_message,
            &error,
        )
    }
}

pub fn render_template<T: Template>(template: T) -> Result<Html<String>, HttpError> {
    template.render().map(Html).map_err(|err| {
        TemplateRenderError::new(
            "presentation::views::render_template",
            "Template rendering failed",
            err,
        )
        .into()
    })
}

pub fn render_template_response<T: Template>(template: T, status: StatusCode) -> Response {
    match render_template(template) {
        Ok(html) => (status, html).into_response(),
        Err(err) => err.into_response(),
    }
}

/// The one not-found page. Its bytes never depend on why the resource was unavailable.
pub fn render_not_found_response() -> Response {
    let view = DashboardLayout::new(DashboardChrome::for_page("Not found"), NotFoundView::new());
    with_not_found_report(render_template_response(
        NotFoundTemplate { view },
        StatusCode::NOT_FOUND,
    ))
}

/// A failed render already carries its own report; only a rendered 404 gets one.
fn with_not_found_report(mut response: Response) -> Response {
    if response.status() == StatusCode::NOT_FOUND {
        ErrorReport::from_message(
            "presentation::views::render_not_found_response",
            StatusCode::NOT_FOUND,
            "Resource not found",
        )
        .attach(&mut response);
    }
    response
}

#[derive(Clone)]
pub struct DashboardChrome {
    pub brand: String,
    pub title: String,
}

impl DashboardChrome {
    pub fn for_page(page_title: &str) -> Self {
        Self {
            brand: BRAND.to_string(),
            title: format!("{page_title} · {BRAND}"),
        }
    }
}

#[derive(Clone)]
pub struct DashboardLayout<T> {
    pub chrome: DashboardChrome,
    pub asset_version: String,
    pub content: T,
}

impl<T> DashboardLayout<T> {
    pub fn new(chrome: DashboardChrome, content: T) -> Self {
        Self {
            chrome,
            asset_version: asset_version(),
            content,
        }
    }
}

fn asset_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

#[derive(Clone)]
pub struct NotFoundView {
    pub heading: String,
    pub message: String,
    pub home_href: String,
}

impl NotFoundView {
    pub fn new() -> Self {
        Self {
            heading: "404".to_string(),
            message: "This page could not be found.".to_string(),
            home_href: "/apis".to_string(),
        }
    }
}

impl Default for NotFoundView {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Template)]
#[template(path = "not_found.html")]
pub struct NotFoundTemplate {
    pub view: DashboardLayout<NotFoundView>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    #[tokio::test]
    async fn not_found_pages_are_byte_identical() {
        let first = render_not_found_response();
        let second = render_not_found_response();
        assert_eq!(first.status(), StatusCode::NOT_FOUND);

        let first = to_bytes(first.into_body(), usize::MAX).await.expect("body");
        let second = to_bytes(second.into_body(), usize::MAX).await.expect("body");
        assert_eq!(first, second);

        let html = String::from_utf8(first.to_vec()).expect("utf8");
        assert!(html.contains("This page could not be found."));
    }

    #[test]
    fn render_failures_keep_their_own_report() {
        let failed = HttpError::new(
            "tests",
            StatusCode::INTERNAL_SERVER_ERROR,
            "Template rendering failed",
            "missing field",
        )
        .into_response();

        let response = with_not_found_report(failed);
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let report = response.extensions().get::<ErrorReport>().expect("report");
        assert_eq!(report.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(report.messages, vec!["missing field"]);

        let response = render_not_found_response();
        let report = response.extensions().get::<ErrorReport>().expect("report");
        assert_eq!(report.status, StatusCode::NOT_FOUND);
    }

    #[test]
    fn chrome_titles_include_brand() {
        assert_eq!(DashboardChrome::for_page("Settings").title, "Settings · keydash");
    }
}
