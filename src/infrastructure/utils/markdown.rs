use ammonia::{Builder, UrlRelative};
use pulldown_cmark::{html, Options, Parser};

/// Converts Markdown to HTML with scripts, event handlers and relative links stripped.
pub fn safe_markdown_to_html(markdown: &str) -> String {
    let parser = Parser::new_ext(markdown, Options::all());

    let mut raw_html = String::with_capacity(markdown.len() * 2);
    html::push_html(&mut raw_html, parser);

    sanitize_html(&raw_html)
}

pub fn sanitize_html(content: &str) -> String {
    Builder::default()
        .link_rel(Some("nofollow noopener noreferrer"))
        .url_relative(UrlRelative::Deny)
        .clean(content)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paragraphs_become_html() {
        let html = safe_markdown_to_html("Network engineer.\n\nAlso **builds** web apps.");
        assert!(html.contains("<p>Network engineer.</p>"));
        assert!(html.contains("<strong>builds</strong>"));
    }

    #[test]
    fn scripts_are_removed() {
        let html = safe_markdown_to_html("hi <script>alert(1)</script>");
        assert!(!html.contains("<script>"));
    }

    #[test]
    fn links_get_safe_rel() {
        let html = safe_markdown_to_html("[repo](https://github.com/me)");
        assert!(html.contains("rel=\"nofollow noopener noreferrer\""));
    }
}
