use std::collections::HashSet;

use lazy_static::lazy_static;
use regex::Regex;

/// Domain of the blog being migrated
pub const INTERNAL_DOMAIN: &str = "mseeeen.msen.jp";

lazy_static! {
    static ref HTML_IMG_REGEX: Regex = Regex::new(r#"<img [^>]*?src="([^"]+)""#).unwrap();
    static ref MD_IMG_REGEX: Regex = Regex::new(r#"!\[[^\]]*\]\(([^)\s]+)(?:\s+"[^"]*")?\)"#).unwrap();
    static ref INTERNAL_LINK_REGEX: Regex = Regex::new(
        &format!(r#"https?://{}[^\s"'<>()\[\]]*"#, regex::escape(INTERNAL_DOMAIN))
    ).unwrap();
}

/// Image urls referenced by `<img src="...">` tags and `![alt](url)`
/// markdown, in order of appearance and without duplicates.
pub fn extract_image_urls(body: &str) -> Vec<String> {
    let mut found: Vec<(usize, &str)> = HTML_IMG_REGEX.captures_iter(body)
        .chain(MD_IMG_REGEX.captures_iter(body))
        .filter_map(|cap| cap.get(1))
        .map(|m| (m.start(), m.as_str()))
        .collect();
    found.sort_by_key(|(pos, _)| *pos);

    unique_in_order(found.into_iter().map(|(_, url)| url))
}

/// Every link to the blog itself, in order of appearance and without duplicates
pub fn extract_internal_links(body: &str) -> Vec<String> {
    unique_in_order(INTERNAL_LINK_REGEX.find_iter(body).map(|m| m.as_str()))
}

/// Old posts link to the blog over plain http
pub fn upgrade_internal_scheme(body: &str) -> String {
    body.replace(
        &format!("http://{}", INTERNAL_DOMAIN),
        &format!("https://{}", INTERNAL_DOMAIN),
    )
}

fn unique_in_order<'a>(items: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen = HashSet::new();
    items.filter(|item| seen.insert(*item))
        .map(|item| item.to_string())
        .collect()
}
