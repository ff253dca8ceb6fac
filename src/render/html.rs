//! Built-in HTML presenter.

use std::fmt::Write as _;

use crate::render::{HelpPage, PreviewReport, Presenter};

/// Plain inline-styled pages, no external assets.
#[derive(Debug, Clone)]
pub struct HtmlPresenter {
    max_chars: usize,
}

impl HtmlPresenter {
    /// `max_chars` bounds how much of the body the preview embeds.
    pub fn new(max_chars: usize) -> Self {
        Self { max_chars }
    }
}

impl Presenter for HtmlPresenter {
    fn render_help(&self, page: &HelpPage) -> String {
        let action = escape_html(&page.action);
        format!(
            r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<title>Subscription Proxy</title>
<style>
body {{ font-family: -apple-system, sans-serif; display: flex; justify-content: center; align-items: center; height: 100vh; background: #f0f0f0; margin: 0; }}
.card {{ background: white; padding: 2rem; border-radius: 12px; box-shadow: 0 4px 12px rgba(0,0,0,0.1); width: 90%; max-width: 420px; text-align: center; }}
input {{ width: 100%; padding: 10px; margin: 15px 0; border: 1px solid #ddd; border-radius: 6px; box-sizing: border-box; }}
button {{ background: #000; color: white; border: none; padding: 10px 20px; border-radius: 6px; cursor: pointer; font-weight: bold; width: 100%; }}
</style>
</head>
<body>
<div class="card">
<h2>Subscription Proxy</h2>
<p style="color:#666; font-size: 0.9em">Paste a subscription link to get a proxied address. Browsers see a preview, clients get the raw file.</p>
<form method="get" action="{action}">
<input type="text" name="url" placeholder="https://provider.example/api/v1/client/subscribe?token=...">
<button type="submit">Open</button>
</form>
</div>
</body>
</html>"#
        )
    }

    fn render_preview(&self, report: &PreviewReport) -> String {
        let color = if (200..300).contains(&report.upstream_status) {
            "#10b981"
        } else {
            "#ef4444"
        };
        let (excerpt, truncated) = truncate_chars(&report.body, self.max_chars);

        let mut html = String::with_capacity(excerpt.len() + 2048);
        html.push_str(
            r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>Subscription Preview</title>
<style>
body { background: #111; color: #eee; font-family: monospace; padding: 20px; }
.status { font-weight: bold; }
.box { background: #222; padding: 15px; border-radius: 8px; margin-top: 20px; overflow: auto; }
.warn { background: #422006; color: #fdba74; padding: 10px; border-radius: 6px; margin-bottom: 20px; border: 1px solid #9a3412; }
pre { white-space: pre-wrap; word-break: break-all; }
a { color: #60a5fa; }
</style>
</head>
<body>
"#,
        );

        if report.blocked {
            html.push_str(
                "<div class=\"warn\">Warning: the target looks like it blocked this request (403/503/WAF challenge). \
                 Add the link to your client directly instead of refreshing it in a browser.</div>\n",
            );
        }

        let _ = write!(
            html,
            "<div>Target: {target}</div>\n\
             <div style=\"margin-top: 10px\">Status: <span class=\"status\" style=\"color: {color}\">{status}</span> \
             | Time: {elapsed}ms | Size: {bytes} bytes</div>\n\
             <div style=\"margin-top: 10px\">Presented as: {identity} (format: {format}, caller: {caller})</div>\n\
             <div style=\"margin-top: 20px\"><a href=\"{raw_link}\">View raw content</a></div>\n",
            target = escape_html(&report.target),
            status = report.upstream_status,
            elapsed = report.elapsed_ms,
            bytes = report.body_bytes,
            identity = escape_html(&report.presented_identity),
            format = report.format,
            caller = report.caller,
            raw_link = escape_html(&report.raw_link),
        );

        let _ = write!(
            html,
            "<div class=\"box\"><pre>{}{}</pre></div>\n</body>\n</html>",
            escape_html(excerpt),
            if truncated { "\n..." } else { "" },
        );

        html
    }
}

/// First `max_chars` characters of `text`, and whether anything was cut.
fn truncate_chars(text: &str, max_chars: usize) -> (&str, bool) {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => (&text[..idx], true),
        None => (text, false),
    }
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
