//! Embedded image discovery and rewriting for imported post HTML.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

/// Matches the `src` attribute of an `<img>` tag. Group 1 is everything up to
/// the opening quote, group 2 the quote, group 3 the URL.
static IMG_SRC: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)(<img\b[^>]*?\bsrc\s*=\s*)(["'])([^"']+)["']"#)
        .expect("image src pattern is valid")
});

/// Returns the distinct absolute image URLs in `html`, in first-seen order.
pub fn image_sources(html: &str) -> Vec<String> {
    let mut urls: Vec<String> = Vec::new();
    for caps in IMG_SRC.captures_iter(html) {
        let url = &caps[3];
        if is_remote(url) && !urls.iter().any(|u| u == url) {
            urls.push(url.to_string());
        }
    }
    urls
}

/// Replaces `<img src>` URLs found in `replacements`; other markup, and
/// images without a replacement, are left untouched.
pub fn rewrite_image_sources(html: &str, replacements: &HashMap<String, String>) -> String {
    IMG_SRC
        .replace_all(html, |caps: &Captures| {
            let url = &caps[3];
            let quote = &caps[2];
            let target = replacements.get(url).map(String::as_str).unwrap_or(url);
            format!("{}{}{}{}", &caps[1], quote, target, quote)
        })
        .into_owned()
}

fn is_remote(url: &str) -> bool {
    url.starts_with("https://") || url.starts_with("http://")
}

#[cfg(test)]
mod tests {
    use super::*;

    const HTML: &str = r#"<p>Intro</p><img src="https://c10.patreonusercontent.com/a.png" alt="a"><p><IMG class="wide" SRC='https://c10.patreonusercontent.com/b.jpg'></p><img src="https://c10.patreonusercontent.com/a.png"><img src="data:image/png;base64,AAAA">"#;

    #[test]
    fn finds_distinct_remote_sources_in_order() {
        assert_eq!(
            image_sources(HTML),
            vec![
                "https://c10.patreonusercontent.com/a.png",
                "https://c10.patreonusercontent.com/b.jpg",
            ]
        );
    }

    #[test]
    fn rewrites_every_occurrence() {
        let replacements = HashMap::from([(
            "https://c10.patreonusercontent.com/a.png".to_string(),
            "https://cms.example.com/content/images/a.png".to_string(),
        )]);

        let out = rewrite_image_sources(HTML, &replacements);

        assert_eq!(out.matches("https://cms.example.com/content/images/a.png").count(), 2);
        assert!(!out.contains("https://c10.patreonusercontent.com/a.png"));
        // Unreplaced images and surrounding markup survive.
        assert!(out.contains("SRC='https://c10.patreonusercontent.com/b.jpg'"));
        assert!(out.contains(r#"alt="a""#));
        assert!(out.contains("<p>Intro</p>"));
    }

    #[test]
    fn html_without_images_is_unchanged() {
        let html = "<p>No pictures here</p>";
        assert!(image_sources(html).is_empty());
        assert_eq!(rewrite_image_sources(html, &HashMap::new()), html);
    }
}
