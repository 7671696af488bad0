//! Page rendering via embedded Jinja templates.
//!
//! All templates under `templates/` are compiled into the binary and loaded
//! into a single shared environment on first use.

use axum::http::StatusCode;
use axum::response::Html;
use chrono::DateTime;
use minijinja::{Environment, Value};
use std::sync::OnceLock;

use crate::core::error::AppError;

/// Global template environment
static TEMPLATE_ENV: OnceLock<Environment<'static>> = OnceLock::new();

/// Embedded template sources, addressed by the same relative names the
/// handlers use.
const TEMPLATES: &[(&str, &str)] = &[
    ("base.html", include_str!("../../templates/base.html")),
    (
        "includes/post_card.html",
        include_str!("../../templates/includes/post_card.html"),
    ),
    (
        "includes/paginator.html",
        include_str!("../../templates/includes/paginator.html"),
    ),
    (
        "blog/index.html",
        include_str!("../../templates/blog/index.html"),
    ),
    (
        "blog/category.html",
        include_str!("../../templates/blog/category.html"),
    ),
    (
        "blog/profile.html",
        include_str!("../../templates/blog/profile.html"),
    ),
    (
        "blog/detail.html",
        include_str!("../../templates/blog/detail.html"),
    ),
    (
        "blog/create.html",
        include_str!("../../templates/blog/create.html"),
    ),
    (
        "blog/comment.html",
        include_str!("../../templates/blog/comment.html"),
    ),
    (
        "blog/user.html",
        include_str!("../../templates/blog/user.html"),
    ),
    (
        "registration/login.html",
        include_str!("../../templates/registration/login.html"),
    ),
    (
        "registration/registration_form.html",
        include_str!("../../templates/registration/registration_form.html"),
    ),
    (
        "pages/404.html",
        include_str!("../../templates/pages/404.html"),
    ),
    (
        "pages/500.html",
        include_str!("../../templates/pages/500.html"),
    ),
];

fn build_environment() -> Environment<'static> {
    let mut env = Environment::new();

    for (name, source) in TEMPLATES {
        if let Err(e) = env.add_template(name, source) {
            tracing::error!("Failed to load template {}: {}", name, e);
        }
    }

    env.add_filter("datetime", format_datetime);

    env
}

fn environment() -> &'static Environment<'static> {
    TEMPLATE_ENV.get_or_init(build_environment)
}

/// Format an RFC 3339 timestamp for display. Values that do not parse are
/// passed through unchanged.
fn format_datetime(value: String) -> String {
    DateTime::parse_from_rfc3339(&value)
        .map(|dt| dt.format("%d %b %Y %H:%M").to_string())
        .unwrap_or(value)
}

/// Render a template into a full HTML response body.
pub fn render(name: &str, ctx: Value) -> Result<Html<String>, AppError> {
    let template = environment()
        .get_template(name)
        .map_err(|_| AppError::Template(format!("template '{}' not found", name)))?;

    template
        .render(ctx)
        .map(Html)
        .map_err(|e| AppError::Template(e.to_string()))
}

/// Best-effort error page body. Falls back to a bare message when the error
/// template itself cannot be rendered.
pub fn error_page(status: StatusCode) -> String {
    let name = if status == StatusCode::NOT_FOUND {
        "pages/404.html"
    } else {
        "pages/500.html"
    };

    environment()
        .get_template(name)
        .and_then(|t| t.render(minijinja::context! {}))
        .unwrap_or_else(|_| {
            format!(
                "<!doctype html><html><body><h1>{}</h1></body></html>",
                status
            )
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use minijinja::context;

    #[test]
    fn test_all_templates_load() {
        let env = environment();
        for (name, _) in TEMPLATES {
            assert!(env.get_template(name).is_ok(), "template {} missing", name);
        }
    }

    #[test]
    fn test_error_page_renders() {
        let body = error_page(StatusCode::NOT_FOUND);
        assert!(body.contains("404"));
        let body = error_page(StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body.contains("500"));
    }

    #[test]
    fn test_datetime_filter() {
        assert_eq!(
            format_datetime("2024-03-05T14:30:00Z".to_string()),
            "05 Mar 2024 14:30"
        );
        // Unparseable values pass through
        assert_eq!(format_datetime("soon".to_string()), "soon");
    }

    #[test]
    fn test_render_login_page() {
        let page = render(
            "registration/login.html",
            context! { user => Value::UNDEFINED, errors => Value::UNDEFINED, next => "/" },
        )
        .expect("login template renders");
        assert!(page.0.contains("form"));
    }
}
