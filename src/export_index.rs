use std::collections::HashSet;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::post::{RawPost, TransformedPost};

pub const TAGS_FILE: &str = "tags.json";
pub const SLUGS_FILE: &str = "slugs.json";
pub const LINKS_FILE: &str = "links.json";

/// Unique values in the order they were first added
#[derive(Default, Debug)]
pub struct UniqueList {
    seen: HashSet<String>,
    items: Vec<String>,
}

impl UniqueList {
    pub fn push(&mut self, item: &str) {
        if !item.is_empty() && self.seen.insert(item.to_string()) {
            self.items.push(item.to_string());
        }
    }

    pub fn items(&self) -> &[String] {
        &self.items
    }
}

/// Every tag used by the export
pub fn collect_tags(posts: &[RawPost]) -> UniqueList {
    let mut tags = UniqueList::default();
    for tag in posts.iter().flat_map(|p| p.tags()) {
        tags.push(&tag);
    }
    tags
}

pub fn collect_slugs(posts: &[RawPost]) -> UniqueList {
    let mut slugs = UniqueList::default();
    for slug in posts.iter().filter_map(|p| p.slug()) {
        slugs.push(slug);
    }
    slugs
}

/// `(slug, internal links)` of the posts that link to the blog itself, used
/// later to rewrite those links.
pub fn collect_links(posts: &[TransformedPost]) -> Vec<(String, Vec<String>)> {
    posts.iter()
        .filter(|p| !p.internal_links.is_empty())
        .filter_map(|p| p.slug.as_ref().map(|slug| (slug.clone(), p.internal_links.clone())))
        .collect()
}

pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)
        .with_context(|| format!("Error serializing {}", path.display()))?;
    fs::write(path, json)
        .with_context(|| format!("Error writing {}", path.display()))
}
