//! Page shell and HTML helpers

use cemboard_core::config::SiteConfig;

/// HTML escape for text and attribute values
pub fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Minimal query-string encoding for links built from user input
pub fn encode_query(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for b in s.bytes() {
        match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(b as char)
            }
            b' ' => out.push('+'),
            _ => out.push_str(&format!("%{:02X}", b)),
        }
    }
    out
}

const NAV: [(&str, &str); 7] = [
    ("/", "Home"),
    ("/graves", "Graves"),
    ("/find", "Find a loved one"),
    ("/notices", "Notices"),
    ("/stats", "Statistics"),
    ("/contact", "Contact"),
    ("/location", "Location"),
];

const STYLE: &str = r#"
* { margin: 0; padding: 0; box-sizing: border-box; }
body { font-family: system-ui, -apple-system, sans-serif; background: #f5f5f5; color: #1a1a1a; }
header { background: #14532d; color: white; padding: 1rem 2rem; }
header h1 { font-size: 1.4rem; margin-bottom: 0.5rem; }
nav a { color: #d1fae5; margin-right: 1rem; text-decoration: none; }
main { max-width: 1100px; margin: 2rem auto; padding: 0 1rem; }
h2 { margin-bottom: 1rem; }
p { line-height: 1.6; margin-bottom: 0.75rem; }
.grid { display: grid; grid-template-columns: repeat(auto-fill, minmax(90px, 1fr)); gap: 0.5rem; }
.cell { padding: 0.75rem; text-align: center; border-radius: 6px; text-decoration: none; color: white; }
.cell.used { background: #b91c1c; }
.cell.free { background: #15803d; }
.cards { display: grid; grid-template-columns: repeat(auto-fill, minmax(240px, 1fr)); gap: 1rem; }
.card { background: white; padding: 1rem; border-radius: 8px; box-shadow: 0 2px 8px rgba(0,0,0,0.08); }
.card img { width: 100%; height: 160px; object-fit: cover; border-radius: 6px; }
.muted { color: #666; }
.more { display: inline-block; margin-top: 1rem; }
table { border-collapse: collapse; background: white; }
td, th { padding: 0.4rem 0.8rem; border-bottom: 1px solid #e5e5e5; text-align: left; }
.blocks a { margin-right: 0.5rem; }
.blocks a.active { font-weight: bold; }
"#;

/// Wrap page content in the site chrome
pub fn layout(site: &SiteConfig, title: &str, body: &str) -> String {
    let nav: String = NAV
        .iter()
        .map(|(href, label)| format!(r#"<a href="{}">{}</a>"#, href, label))
        .collect();
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title} - {site}</title>
    <style>{style}</style>
</head>
<body>
    <header><h1>{site}</h1><nav>{nav}</nav></header>
    <main>{body}</main>
</body>
</html>"#,
        title = escape(title),
        site = escape(&site.name),
        style = STYLE,
        nav = nav,
        body = body,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape() {
        assert_eq!(
            escape(r#"<b>"Tom" & 'Jerry'</b>"#),
            "&lt;b&gt;&quot;Tom&quot; &amp; &#39;Jerry&#39;&lt;/b&gt;"
        );
    }

    #[test]
    fn test_encode_query() {
        assert_eq!(encode_query("abdul karim"), "abdul+karim");
        assert_eq!(encode_query("a&b=c"), "a%26b%3Dc");
    }

    #[test]
    fn test_layout_escapes_title() {
        let page = layout(&SiteConfig::default(), "<script>", "<p>ok</p>");
        assert!(page.contains("&lt;script&gt;"));
        assert!(page.contains("<p>ok</p>"));
        assert!(page.contains(r#"href="/graves""#));
    }
}
