//! Bundled frontend
//!
//! The HTML page and its script are embedded at compile time; the API URL
//! placeholders are substituted when the page is rendered.

const INDEX_TEMPLATE: &str = include_str!("../../assets/index.html");
const SCRIPT_BUNDLE: &str = include_str!("../../assets/nanomanager.js");

const API_URL_MARKER: &str = "%NANOMANAGER_API_URL%";
const SCRIPT_MARKER: &str = "%NANOMANAGER_SCRIPT%";

/// Renders the frontend page pointing at `api_url`.
pub fn render_frontend(api_url: &str) -> String {
    let script = SCRIPT_BUNDLE.replace(API_URL_MARKER, &escape_js_string(api_url));

    INDEX_TEMPLATE
        .replace(API_URL_MARKER, &escape_html_attribute(api_url))
        .replace(SCRIPT_MARKER, &script)
}

fn escape_html_attribute(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            other => escaped.push(other),
        }
    }
    escaped
}

/// Escapes a value for use inside a double-quoted string in an inline script.
fn escape_js_string(value: &str) -> String {
    let quoted = serde_json::Value::String(value.to_string()).to_string();
    quoted[1..quoted.len() - 1].replace("</", "<\\/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn substitutes_api_url_everywhere() {
        let page = render_frontend("/admin/files");
        assert!(page.contains(r#"<nano-manager api-url="/admin/files">"#));
        assert!(page.contains(r#"const FALLBACK_API_URL = "/admin/files";"#));
        assert!(page.contains("customElements.define"));
        assert!(!page.contains(API_URL_MARKER));
        assert!(!page.contains(SCRIPT_MARKER));
    }

    #[test]
    fn escapes_hostile_api_url() {
        let page = render_frontend(r#""><script>alert(1)</script>"#);
        assert!(page.contains(r#"api-url="&quot;&gt;&lt;script&gt;alert(1)&lt;/script&gt;""#));
        assert!(page.contains(r#"const FALLBACK_API_URL = "\"><script>alert(1)<\/script>";"#));
    }
}
