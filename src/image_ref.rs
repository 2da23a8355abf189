//! Resolution of remote image URLs into local files.
//!
//! WordPress serves resized copies of every upload as `<name>-<w>x<h>.<ext>`
//! next to the original `<name>.<ext>`. Posts usually embed a resized copy, so
//! the original is tried first and the embedded URL is kept as a fallback.

use std::fmt::{self, Display, Formatter};
use std::path::{Path, PathBuf};

use lazy_static::lazy_static;
use regex::Regex;
use thiserror::Error;

/// Directory, relative to the post directory, where images are stored.
pub const POST_IMAGE_DIR: &str = "images";

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ImageError {
    #[error("No file name can be extracted from the image url {0}")]
    MalformedUrl(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImageRef {
    /// Url tried first, the full size original when the embedded one is a thumbnail
    pub source_url: String,
    /// Url as found in the post
    pub fallback_url: String,
    pub filename: String,
    pub local_path: PathBuf,
}

impl ImageRef {
    /// Resolves an image embedded in the body. `index` starts at 1.
    pub fn indexed(remote_url: &str, image_dir: &Path, slug: Option<&str>, index: usize) -> Result<ImageRef, ImageError> {
        resolve(remote_url, image_dir, slug, index)
    }

    /// Resolves the eyecatch, which is never numbered.
    pub fn singleton(remote_url: &str, image_dir: &Path, slug: Option<&str>) -> Result<ImageRef, ImageError> {
        resolve(remote_url, image_dir, slug, 0)
    }

    /// Path used to reference the image from the post body
    pub fn relative_path(&self) -> String {
        format!("{}/{}", POST_IMAGE_DIR, self.filename)
    }

    /// Same image stored under `<stem>-<n><ext>`, used when two remote images
    /// share a file name.
    pub fn with_suffix(&self, n: usize) -> ImageRef {
        let (stem, ext) = split_extension(&self.filename);
        let filename = format!("{}-{}{}", stem, n, ext);
        let local_path = match self.local_path.parent() {
            Some(dir) => dir.join(&filename),
            None => PathBuf::from(&filename),
        };
        ImageRef {
            source_url: self.source_url.clone(),
            fallback_url: self.fallback_url.clone(),
            filename,
            local_path,
        }
    }
}

impl Display for ImageRef {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.source_url, self.filename)
    }
}

/// Derives the canonical url, the fallback url and the local file name of a
/// remote image. A zero `index` means the image is not numbered.
pub fn resolve(remote_url: &str, image_dir: &Path, slug: Option<&str>, index: usize) -> Result<ImageRef, ImageError> {
    let (path_part, query) = split_query(remote_url);
    let remote_filename = match path_part.rsplit('/').next() {
        Some(name) if !name.is_empty() => name,
        _ => return Err(ImageError::MalformedUrl(remote_url.to_string())),
    };
    let (_, ext) = split_extension(remote_filename);

    let source_url = match original_of_thumbnail(path_part) {
        Some(base) => format!("{}{}{}", base, ext, query),
        None => remote_url.to_string(),
    };

    let filename = match slug.filter(|s| !s.is_empty()) {
        Some(slug) if index > 0 => format!("{}-{}{}", slug, index, ext),
        Some(slug) => format!("{}{}", slug, ext),
        None => remote_filename.to_string(),
    };

    Ok(ImageRef {
        source_url,
        fallback_url: remote_url.to_string(),
        local_path: image_dir.join(&filename),
        filename,
    })
}

/// Splits `http://host/a.jpg?x=1` into `http://host/a.jpg` and `?x=1`
fn split_query(url: &str) -> (&str, &str) {
    match url.find(|c: char| c == '?' || c == '#') {
        Some(pos) => (&url[..pos], &url[pos..]),
        None => (url, ""),
    }
}

/// Splits `name.jpg` into `name` and `.jpg`. The extension is empty when the
/// file name has no dot.
fn split_extension(filename: &str) -> (&str, &str) {
    match filename.rfind('.') {
        Some(pos) => (&filename[..pos], &filename[pos..]),
        None => (filename, ""),
    }
}

fn original_of_thumbnail(url: &str) -> Option<&str> {
    lazy_static! {
        static ref THUMBNAIL_REGEX: Regex = Regex::new(r"^(.+)-\d+x\d+\.[^./]+$").unwrap();
    }
    THUMBNAIL_REGEX.captures(url)
        .and_then(|cap| cap.get(1))
        .map(|base| base.as_str())
}
