use pulldown_cmark::{html, CowStr, Event, Options, Parser};

#[derive(Debug, Clone, Copy)]
pub struct MarkdownRenderer {
    math: bool,
}

impl MarkdownRenderer {
    pub fn new(math: bool) -> Self {
        Self { math }
    }

    fn options(&self) -> Options {
        let mut options = Options::empty();
        options.insert(Options::ENABLE_STRIKETHROUGH);
        options.insert(Options::ENABLE_TABLES);
        if self.math {
            options.insert(Options::ENABLE_MATH);
        }
        options
    }

    pub fn render(&self, markdown: &str) -> String {
        let mut html_out = String::new();

        if !self.math {
            html::push_html(&mut html_out, Parser::new_ext(markdown, self.options()));
            return html_out;
        }

        let normalized = normalize_latex_delimiters(markdown);
        let parser = Parser::new_ext(&normalized, self.options()).map(|event| match event {
            Event::InlineMath(math) => Event::Html(math_html(&math, false)),
            Event::DisplayMath(math) => Event::Html(math_html(&math, true)),
            other => other,
        });
        html::push_html(&mut html_out, parser);
        html_out
    }
}

fn math_html(source: &str, display_mode: bool) -> CowStr<'static> {
    CowStr::Boxed(render_math_html(source, display_mode).into_boxed_str())
}

/// Rewrites `\(..\)` to `$..$` and `\[..\]` to `$$..$$`.
/// Multi-line inline math is promoted to display math.
fn normalize_latex_delimiters(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(ch) = rest.chars().next() {
        if let Some((close, display_mode)) = closing_delimiter(rest) {
            let body = &rest[2..];
            if let Some(close_at) = body.find(close) {
                let math = &body[..close_at];
                let fence = if display_mode || math.contains('\n') { "$$" } else { "$" };
                out.push_str(fence);
                out.push_str(math);
                out.push_str(fence);
                rest = &body[close_at + close.len()..];
                continue;
            }
        }

        out.push(ch);
        rest = &rest[ch.len_utf8()..];
    }

    out
}

fn closing_delimiter(tail: &str) -> Option<(&'static str, bool)> {
    if tail.starts_with("\\(") {
        Some(("\\)", false))
    } else if tail.starts_with("\\[") {
        Some(("\\]", true))
    } else {
        None
    }
}

fn render_math_html(source: &str, display_mode: bool) -> String {
    let rendered = katex::Opts::builder()
        .display_mode(display_mode)
        .build()
        .ok()
        .and_then(|opts| katex::render_with_opts(source, opts).ok());

    rendered.unwrap_or_else(|| {
        let class_name = if display_mode { "math math-display" } else { "math math-inline" };
        format!("<span class=\"{class_name}\">{}</span>", htmlescape::encode_minimal(source))
    })
}
