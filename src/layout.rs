//! The default page shell and the asset bundle it depends on.

use std::path::PathBuf;

use axum::{routing::get_service, Router};
use chrono::NaiveDate;
use tower_http::services::{ServeDir, ServeFile};
use tracing::info;

use crate::contact::contact_href;
use crate::error::LayoutError;
use crate::models::PostSummary;
use crate::state::RouterState;

const HOT_RELOAD_SCRIPT: &str = r#"
<script>
    const socket = new WebSocket("ws://" + window.location.host + "/ws");
    socket.onmessage = (event) => {
        if (event.data === "reload") {
            window.location.reload();
        }
    };
</script>
"#;

const CONTENT_PLACEHOLDER: &str = "{{ content }}";
const CONTACT_OPEN: &str = "{{ contact:";
const PLACEHOLDER_CLOSE: &str = " }}";
const SITE_TITLE: &str = "Sebastián Larrieu";
const ASSET_STYLESHEET: &str = "styles.css";

/// Page-specific parts the layout wraps.
pub struct LayoutPage<'a> {
    pub title: Option<&'a str>,
    pub content: &'a str,
}

#[derive(Debug, Clone)]
pub struct DefaultLayout {
    template: String,
    banner: String,
}

impl DefaultLayout {
    pub fn new(template: String, banner: String) -> Result<Self, LayoutError> {
        if !template.contains(CONTENT_PLACEHOLDER) {
            return Err(LayoutError::MissingPlaceholder(CONTENT_PLACEHOLDER));
        }
        Ok(Self { template, banner })
    }

    pub fn render(
        &self,
        page: &LayoutPage<'_>,
        posts: &[PostSummary],
        is_development: bool,
    ) -> String {
        let mut list_items = String::new();
        for post in posts {
            list_items.push_str(&format!(
                "<li><a href=\"/blog/{}\">{}</a> <time>{}</time></li>",
                post.slug,
                escape_text(&post.title),
                htmlescape::encode_minimal(&display_date(&post.date)),
            ));
        }

        let title = match page.title {
            Some(title) => format!("{} | {}", title, SITE_TITLE),
            None => SITE_TITLE.to_string(),
        };

        // The page body goes in last so placeholders inside post content stay literal.
        let mut page_html = self
            .template
            .replace("{{ title }}", &escape_text(&title))
            .replace("{{ banner }}", &self.banner)
            .replace("{{ posts }}", &list_items);
        page_html = resolve_contact_placeholders(&page_html);
        page_html = page_html.replace(CONTENT_PLACEHOLDER, page.content);

        if is_development {
            page_html = page_html.replace("</body>", &format!("{}</body>", HOT_RELOAD_SCRIPT));
        }

        page_html
    }
}

/// HTML-escapes `text` and encodes braces so it can never form a placeholder.
fn escape_text(text: &str) -> String {
    htmlescape::encode_minimal(text)
        .replace('{', "&#123;")
        .replace('}', "&#125;")
}

/// Replaces every `{{ contact:<kind> }}` with its href, `#` for kinds we don't know.
fn resolve_contact_placeholders(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut rest = html;

    while let Some(start) = rest.find(CONTACT_OPEN) {
        let after_open = &rest[start + CONTACT_OPEN.len()..];
        let Some(end) = after_open.find(PLACEHOLDER_CLOSE) else {
            break;
        };
        let kind = &after_open[..end];
        if !is_placeholder_name(kind) {
            out.push_str(&rest[..start + CONTACT_OPEN.len()]);
            rest = after_open;
            continue;
        }
        out.push_str(&rest[..start]);
        out.push_str(contact_href(kind, "#"));
        rest = &after_open[end + PLACEHOLDER_CLOSE.len()..];
    }

    out.push_str(rest);
    out
}

fn is_placeholder_name(name: &str) -> bool {
    !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// Header markup for a post page.
pub fn post_header(title: &str, date: &str) -> String {
    format!(
        "<h1>{}</h1><p class=\"post-date\"><time datetime=\"{}\">{}</time></p>",
        htmlescape::encode_minimal(title),
        htmlescape::encode_attribute(date),
        htmlescape::encode_minimal(&display_date(date)),
    )
}

/// `2020-01-01` becomes `January 1, 2020`; anything else is shown as written.
pub fn display_date(date: &str) -> String {
    match NaiveDate::parse_from_str(date, "%Y-%m-%d") {
        Ok(parsed) => parsed.format("%B %-d, %Y").to_string(),
        Err(_) => date.to_string(),
    }
}

pub struct LayoutContext {
    pub static_dir: PathBuf,
    pub is_development: bool,
}

/// Installs the layout's asset bundle into the application router.
pub fn register(
    router: Router<RouterState>,
    ctx: &LayoutContext,
) -> Result<Router<RouterState>, LayoutError> {
    let stylesheet = ctx.static_dir.join(ASSET_STYLESHEET);
    if !stylesheet.is_file() {
        return Err(LayoutError::MissingAssets(stylesheet));
    }
    info!(
        dir = %ctx.static_dir.display(),
        development = ctx.is_development,
        "Registering default layout assets"
    );

    let static_dir = get_service(ServeDir::new(&ctx.static_dir));
    let favicon_ico = get_service(ServeFile::new(ctx.static_dir.join("favicon.ico")));
    let favicon_png = get_service(ServeFile::new(ctx.static_dir.join("favicon.png")));

    Ok(router
        .nest_service("/static", static_dir)
        .route_service("/favicon.ico", favicon_ico)
        .route_service("/favicon.png", favicon_png))
}
