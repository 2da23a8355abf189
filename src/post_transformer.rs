use std::collections::HashSet;
use std::path::{Path, PathBuf};

use chrono::Datelike;
use spdlog::warn;
use thiserror::Error;

use crate::content::extract::{extract_image_urls, extract_internal_links, upgrade_internal_scheme};
use crate::content::normalizer::normalize_content;
use crate::image_ref::{ImageRef, POST_IMAGE_DIR};
use crate::name_translation::translate_name;
use crate::post::{RawPost, TransformedPost};
use crate::text_utils::{format_date, parse_date_time, sanitize_file_name};

/// Subtree of the output holding drafts
pub const DRAFT_DIR: &str = ".draft";
const NO_TITLE: &str = "No Title";
const UNTITLED_DIR: &str = "untitled";

#[derive(Error, Debug, Clone, PartialEq)]
pub enum TransformError {
    #[error("Invalid date in post \"{title}\": {reason}")]
    InvalidDate { title: String, reason: String },
}

/// Computes everything needed to write a post. No file or network access.
pub fn transform_post(raw: &RawPost, base_dir: &Path) -> Result<TransformedPost, TransformError> {
    let author_id = translate_name(&raw.author_name).to_string();
    let date = parse_date_time(&raw.date).map_err(|reason| TransformError::InvalidDate {
        title: raw.title.clone().unwrap_or_default(),
        reason,
    })?;

    let slug = raw.slug();
    let is_draft = raw.is_draft();
    let destination_dir = destination_dir(base_dir, is_draft, &author_id, date.year(), &dir_name(raw));
    let image_dir = destination_dir.join(POST_IMAGE_DIR);

    let body = raw.content.as_deref().map(normalize_content).unwrap_or_default();

    let mut images: Vec<ImageRef> = vec![];
    // Extra body urls of an image already listed, with its position in `images`
    let mut aliases: Vec<(String, usize)> = vec![];
    let mut index = 0;
    for url in extract_image_urls(&body).iter() {
        match ImageRef::indexed(url, &image_dir, slug, index + 1) {
            Ok(im) => match images.iter().position(|other| other.source_url == im.source_url) {
                Some(pos) => aliases.push((im.fallback_url, pos)),
                None => {
                    images.push(im);
                    index += 1;
                }
            },
            Err(e) => {
                warn!("{}: image dropped: {}", destination_dir.display(), e);
                index += 1;
            }
        }
    }

    let eyecatch = raw.eyecatch_url().and_then(|url| {
        match ImageRef::singleton(url, &image_dir, slug) {
            Ok(im) => Some(im),
            Err(e) => {
                warn!("{}: eyecatch dropped: {}", destination_dir.display(), e);
                None
            }
        }
    });
    let (images, eyecatch) = unique_file_names(images, eyecatch);

    let body = replace_image_urls(&body, &images, &aliases);
    let body = upgrade_internal_scheme(&body);
    let internal_links = extract_internal_links(&body);

    Ok(TransformedPost {
        author_id,
        iso_date: format_date(&date),
        title: escape_title(raw.title.as_deref()),
        destination_dir,
        is_draft,
        tags: raw.tags(),
        slug: slug.map(|s| s.to_string()),
        body,
        images,
        eyecatch,
        internal_links,
    })
}

/// `<base>/[.draft/]<author>/<year>/<dir>`. An unknown author adds no level.
pub fn destination_dir(base_dir: &Path, is_draft: bool, author_id: &str, year: i32, dir_name: &str) -> PathBuf {
    let mut path = base_dir.to_path_buf();
    if is_draft {
        path.push(DRAFT_DIR);
    }
    if !author_id.is_empty() {
        path.push(author_id);
    }
    path.push(year.to_string());
    path.push(dir_name);
    path
}

fn dir_name(raw: &RawPost) -> String {
    let name = raw.slug()
        .map(sanitize_file_name)
        .filter(|s| !s.is_empty())
        .or_else(|| raw.title.as_deref().map(sanitize_file_name))
        .unwrap_or_default();

    if name.trim().is_empty() {
        UNTITLED_DIR.to_string()
    } else {
        name
    }
}

/// Front matter values are plain YAML scalars, so titles with YAML syntax
/// characters are quoted. Double quotes are dropped to keep quoting trivial.
pub fn escape_title(title: Option<&str>) -> String {
    let title = match title.map(str::trim) {
        Some(t) if !t.is_empty() => t,
        _ => NO_TITLE,
    };

    let title = title.replace('"', "");
    if title.contains(['[', ']', ':']) {
        format!("\"{}\"", title)
    } else {
        title
    }
}

/// Renames images whose file name is already taken within the post. Only
/// possible for posts without slug, where remote file names are kept.
fn unique_file_names(images: Vec<ImageRef>, eyecatch: Option<ImageRef>) -> (Vec<ImageRef>, Option<ImageRef>) {
    let mut used: HashSet<String> = HashSet::new();
    let mut make_unique = |im: ImageRef| {
        let mut res = im.clone();
        let mut n = 2;
        while used.contains(&res.filename) {
            res = im.with_suffix(n);
            n += 1;
        }
        used.insert(res.filename.clone());
        res
    };

    let images: Vec<ImageRef> = images.into_iter().map(&mut make_unique).collect();
    let eyecatch = eyecatch.map(&mut make_unique);
    (images, eyecatch)
}

/// Points every image of the body at its local copy. Longer urls go first so
/// a url that is a prefix of another one does not break it.
fn replace_image_urls(body: &str, images: &[ImageRef], aliases: &[(String, usize)]) -> String {
    let mut replacements: Vec<(&str, String)> = vec![];
    for im in images {
        replacements.push((im.source_url.as_str(), im.relative_path()));
        if im.fallback_url != im.source_url {
            replacements.push((im.fallback_url.as_str(), im.relative_path()));
        }
    }
    for (url, pos) in aliases {
        if let Some(im) = images.get(*pos) {
            replacements.push((url.as_str(), im.relative_path()));
        }
    }
    replacements.sort_by(|a, b| b.0.len().cmp(&a.0.len()));

    let mut body = body.to_string();
    for (url, local) in replacements {
        body = body.replace(url, &local);
    }
    body
}
