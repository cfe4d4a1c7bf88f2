//! Page-body assembly: turn upload results into the HTML document.
//!
//! The publishing service accepts a restricted HTML vocabulary; the page
//! body built here sticks to `<h4>`, `<img>`, `<br>`, `<p>` and `<a>`.
//! Fragment order follows the input slice, which the publisher has already
//! put into natural filename order — assembly itself never reorders.

use crate::config::PublishConfig;
use crate::output::UploadResult;

/// Build the HTML page body from the batch results.
///
/// One `<img>` fragment per successful upload, in slice order; failed files
/// contribute nothing. Optional header (title) and footer (publish date and
/// author credit) wrap the fragments.
pub fn assemble_document(uploads: &[UploadResult], config: &PublishConfig) -> String {
    let mut parts: Vec<String> = Vec::new();

    if config.include_header {
        parts.push(format!("<h4>{}</h4><br>", escape_html(&config.title)));
    }

    for upload in uploads {
        if let Some(url) = &upload.url {
            parts.push(image_fragment(url));
        }
    }

    if config.include_footer {
        parts.push(footer_fragment(
            &config.author_name,
            &config.author_url,
            &chrono::Utc::now().format("%Y-%m-%d").to_string(),
        ));
    }

    parts.concat()
}

/// One embedded image followed by spacing.
fn image_fragment(url: &str) -> String {
    format!(r#"<img src="{}"><br><br>"#, escape_attr(url))
}

fn footer_fragment(author_name: &str, author_url: &str, date: &str) -> String {
    if author_url.is_empty() {
        format!(
            "<p>Published {date} by {}</p>",
            escape_html(author_name)
        )
    } else {
        format!(
            r#"<p>Published {date} by <a href="{}">{}</a></p>"#,
            escape_attr(author_url),
            escape_html(author_name)
        )
    }
}

/// Escape text content for element bodies.
fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Escape a value for a double-quoted attribute.
fn escape_attr(s: &str) -> String {
    escape_html(s).replace('"', "&quot;")
}
