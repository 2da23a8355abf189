use std::fmt::{self, Display, Formatter};
use std::path::PathBuf;

use serde::Deserialize;

use crate::image_ref::ImageRef;

pub const PUBLISH_STATUS: &str = "publish";

/// One record of the WordPress export
#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
pub struct RawPost {
    #[serde(default)]
    pub author_name: String,
    /// SQL timestamp, e.g. `2020-05-01 10:00:00`
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(rename = "post_content_filtered", default)]
    pub content: Option<String>,
    #[serde(rename = "post_status", default)]
    pub status: String,
    #[serde(rename = "imageUrl", default)]
    pub image_url: Option<String>,
    /// Comma separated tag names
    #[serde(default)]
    pub tagnames: Option<String>,
}

impl RawPost {
    pub fn slug(&self) -> Option<&str> {
        self.slug.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }

    pub fn eyecatch_url(&self) -> Option<&str> {
        self.image_url.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }

    /// A post without a slug can't get its final url, so it stays a draft
    pub fn is_draft(&self) -> bool {
        self.status != PUBLISH_STATUS || self.slug().is_none()
    }

    pub fn tags(&self) -> Vec<String> {
        match self.tagnames {
            None => vec![],
            Some(ref tagnames) => tagnames.split(',')
                .map(|x| x.trim())
                .filter(|x| !x.is_empty())
                .map(|x| x.to_string())
                .collect(),
        }
    }
}

/// A post ready to be written, with every path already computed
#[derive(Debug, Clone, PartialEq)]
pub struct TransformedPost {
    pub author_id: String,
    /// `YYYY-MM-DD`
    pub iso_date: String,
    /// Title already escaped for the front matter
    pub title: String,
    pub destination_dir: PathBuf,
    pub is_draft: bool,
    pub tags: Vec<String>,
    pub slug: Option<String>,
    pub body: String,
    pub images: Vec<ImageRef>,
    pub eyecatch: Option<ImageRef>,
    pub internal_links: Vec<String>,
}

impl TransformedPost {
    /// Body images first, then the eyecatch
    pub fn all_images(&self) -> impl Iterator<Item = &ImageRef> {
        self.images.iter().chain(self.eyecatch.iter())
    }
}

impl Display for TransformedPost {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "dir={}, date={}, author={}, draft={}\ntitle={}\nimages={}, links={}",
               self.destination_dir.display(),
               self.iso_date,
               self.author_id,
               self.is_draft,
               self.title,
               self.images.len(),
               self.internal_links.len(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw_post(status: &str, slug: Option<&str>) -> RawPost {
        RawPost {
            status: status.to_string(),
            slug: slug.map(|s| s.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_draft_routing() {
        assert!(!raw_post("publish", Some("hello")).is_draft());
        assert!(raw_post("draft", Some("hello")).is_draft());
        assert!(raw_post("private", Some("hello")).is_draft());
        assert!(raw_post("publish", None).is_draft());
        assert!(raw_post("publish", Some("")).is_draft());
        assert!(raw_post("publish", Some("  ")).is_draft());
    }

    #[test]
    fn test_tags() {
        let mut post = raw_post("publish", Some("hello"));
        assert!(post.tags().is_empty());

        post.tagnames = Some("Rust, WordPress ,,  Markdown".to_string());
        assert_eq!(post.tags(), ["Rust", "WordPress", "Markdown"]);

        post.tagnames = Some("".to_string());
        assert!(post.tags().is_empty());
    }

    #[test]
    fn test_deserialize() {
        let yaml = r#"
author_name: kenzauros
date: 2020-05-01 10:00:00
title: Hello
slug: hello
post_content_filtered: null
post_status: publish
imageUrl: https://mseeeen.msen.jp/wp-content/uploads/2020/eye.png
tagnames: a,b
ID: 42
"#;
        let post: RawPost = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(post.author_name, "kenzauros");
        assert_eq!(post.date, "2020-05-01 10:00:00");
        assert_eq!(post.slug(), Some("hello"));
        assert_eq!(post.content, None);
        assert_eq!(post.eyecatch_url(), Some("https://mseeeen.msen.jp/wp-content/uploads/2020/eye.png"));
        assert_eq!(post.tags(), ["a", "b"]);
    }

    #[test]
    fn test_display() {
        let post = crate::post_transformer::transform_post(&crate::test_data::hello_post(), std::path::Path::new("result")).unwrap();
        assert_eq!(post.to_string(), "dir=result/kenzauros/2020/hello, date=2020-05-01, author=kenzauros, draft=false\ntitle=Hello\nimages=1, links=0");
    }
}
