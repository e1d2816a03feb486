const PAGE_STYLES: &str = r#"
        :root { color-scheme: light; }
        body { font-family: "Helvetica Neue", Arial, sans-serif; margin: 0; background: #0b0b12; color: #f8fafc; }
        header { padding: 1.5rem; display: flex; justify-content: space-between; align-items: center; border-bottom: 1px solid #1e1b4b; }
        header a { color: #c4b5fd; text-decoration: none; font-weight: 600; }
        main { padding: 2rem 1.5rem; max-width: 720px; margin: 0 auto; box-sizing: border-box; }
        .panel { background: #15132b; border-radius: 12px; border: 1px solid #312e81; padding: 1.5rem; }
        label { display: block; margin: 0.75rem 0 0.35rem; font-weight: 600; }
        input { width: 100%; padding: 0.75rem; border-radius: 8px; border: 1px solid #4338ca; background: #0b0b12; color: #f8fafc; box-sizing: border-box; }
        button { margin-top: 1rem; padding: 0.8rem 1.2rem; border: none; border-radius: 8px; background: #7c3aed; color: #ffffff; font-weight: 600; cursor: pointer; }
        button:hover { background: #6d28d9; }
        .status-box { margin-top: 1rem; min-height: 1.5rem; color: #fca5a5; }
"#;

pub fn escape_html(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Wraps `body_html` in the shared site chrome. `title` is escaped, the body is not.
pub fn render_page(title: &str, body_html: &str) -> String {
    let title = escape_html(title);
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <title>{title} | SlayCanvas</title>
    <style>{PAGE_STYLES}</style>
</head>
<body>
    <header>
        <a href="/">SlayCanvas</a>
        <nav><a href="/boards">Boards</a></nav>
    </header>
    <main>
        <h1>{title}</h1>
        {body_html}
    </main>
</body>
</html>"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_markup() {
        assert_eq!(
            escape_html(r#"<a href="x">Tom & 'Jerry'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; &#39;Jerry&#39;&lt;/a&gt;"
        );
    }

    #[test]
    fn page_title_is_escaped() {
        let html = render_page("<Boards>", "<p>ok</p>");
        assert!(html.contains("<title>&lt;Boards&gt; | SlayCanvas</title>"));
        assert!(html.contains("<p>ok</p>"));
    }
}
