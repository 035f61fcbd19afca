use super::BlogError;
use super::store::BlogPost;

/// Converts a post body to HTML using GitHub flavored markdown.
pub fn markdown_to_html(body: &str) -> Result<String, BlogError> {
    markdown::to_html_with_options(body, &markdown::Options::gfm())
        .map_err(|message| BlogError::Render(message.to_string()))
}

/// Wraps a rendered post in a standalone HTML page.
#[must_use]
pub fn page(post: &BlogPost) -> String {
    let meta = &post.meta;
    let mut out = String::with_capacity(post.content_html.len() + 512);
    out.push_str("<!doctype html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n");
    out.push_str(&format!("<title>{}</title>\n", escape(&meta.title)));
    if !meta.excerpt.is_empty() {
        out.push_str(&format!(
            "<meta name=\"description\" content=\"{}\">\n",
            escape(&meta.excerpt)
        ));
    }
    out.push_str("</head>\n<body>\n<article>\n<header>\n");
    out.push_str(&format!("<h1>{}</h1>\n", escape(&meta.title)));

    let byline: Vec<&str> = [&meta.date, &meta.category, &meta.read_time]
        .into_iter()
        .map(String::as_str)
        .filter(|s| !s.is_empty())
        .collect();
    if !byline.is_empty() {
        out.push_str(&format!("<p>{}</p>\n", escape(&byline.join(" · "))));
    }
    out.push_str("</header>\n");
    out.push_str(&post.content_html);
    out.push_str("\n</article>\n</body>\n</html>\n");
    out
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blog::PostMeta;

    #[test]
    fn renders_gfm() {
        let html = markdown_to_html("| a | b |\n|---|---|\n| 1 | 2 |\n\n~~gone~~").unwrap();
        assert!(html.contains("<table>"));
        assert!(html.contains("<del>gone</del>"));
    }

    #[test]
    fn page_escapes_metadata() {
        let post = BlogPost {
            meta: PostMeta {
                slug: "x".into(),
                title: "Tips & <Tricks>".into(),
                date: "2024-03-01".into(),
                category: "Education".into(),
                ..PostMeta::default()
            },
            content_html: "<p>hi</p>".into(),
        };

        let html = page(&post);
        assert!(html.contains("<title>Tips &amp; &lt;Tricks&gt;</title>"));
        assert!(html.contains("<p>2024-03-01 · Education</p>"));
        assert!(html.contains("<p>hi</p>"));
        assert!(!html.contains("description"));
    }
}
