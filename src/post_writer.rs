use std::fmt::Write;
use std::fs;
use std::path::Path;

use spdlog::{debug, error, info};

use crate::image_fetcher::{FetchOutcome, HttpClient, ImageFetcher};
use crate::image_ref::POST_IMAGE_DIR;
use crate::post::TransformedPost;

pub const INDEX_FILE_NAME: &str = "index.md";

#[derive(Clone, Copy, Debug, Default)]
pub struct MaterializeOptions {
    pub download_images: bool,
}

/// What happened to one post, summed up by the migration report
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PostReport {
    pub written: bool,
    pub images_downloaded: usize,
    pub images_existing: usize,
    pub images_failed: usize,
}

pub fn render_front_matter(post: &TransformedPost) -> String {
    let mut buf = String::new();

    let _ = writeln!(&mut buf, "---");
    let _ = writeln!(&mut buf, "title: {}", post.title);
    let _ = writeln!(&mut buf, "date: {}", post.iso_date);
    let _ = writeln!(&mut buf, "author: {}", post.author_id);
    if !post.tags.is_empty() {
        let _ = writeln!(&mut buf, "tags: [{}]", post.tags.join(", "));
    }
    if let Some(ref eyecatch) = post.eyecatch {
        let _ = writeln!(&mut buf, "hero: {}", eyecatch.fallback_url);
    }
    let _ = writeln!(&mut buf, "---");
    buf
}

/// Full content of `index.md`: front matter, a blank line and the body
pub fn render_post(post: &TransformedPost) -> String {
    format!("{}\n{}", render_front_matter(post), post.body)
}

/// Writes the post under its destination directory and, when asked, downloads
/// its images. Errors are logged and never stop the caller.
pub fn materialize<C: HttpClient>(post: &TransformedPost, options: MaterializeOptions,
                                  fetcher: &mut ImageFetcher<C>) -> PostReport {
    let mut report = PostReport::default();
    let dir_path = &post.destination_dir;

    if let Err(e) = fs::create_dir_all(dir_path) {
        error!("Error creating directory {}: {}", dir_path.display(), e);
    }

    debug!("{}", post);
    let file_path = dir_path.join(INDEX_FILE_NAME);
    match fs::write(&file_path, render_post(post)) {
        Ok(_) => {
            report.written = true;
            info!("{} : done", file_path.display());
        }
        Err(e) => error!("Error writing {}: {}", file_path.display(), e),
    }

    if options.download_images {
        download_images(post, &dir_path.join(POST_IMAGE_DIR), fetcher, &mut report);
    }

    report
}

fn download_images<C: HttpClient>(post: &TransformedPost, image_dir: &Path,
                                  fetcher: &mut ImageFetcher<C>, report: &mut PostReport) {
    if post.all_images().next().is_none() {
        return;
    }

    if let Err(e) = fs::create_dir_all(image_dir) {
        let count = post.all_images().count();
        error!("Error creating image directory {}: {} - skipping {} image(s)", image_dir.display(), e, count);
        report.images_failed += count;
        return;
    }

    for im in post.all_images() {
        match fetcher.fetch(im) {
            Ok(FetchOutcome::Exists) => {
                report.images_existing += 1;
                info!("  {} : exists", im.local_path.display());
            }
            Ok(FetchOutcome::Downloaded) => {
                report.images_downloaded += 1;
                info!("  {} : done", im);
            }
            Ok(FetchOutcome::DownloadedFallback) => {
                report.images_downloaded += 1;
                info!("  {} : done (fallback {})", im, im.fallback_url);
            }
            Err(e) => {
                report.images_failed += 1;
                error!("  {}", e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tempfile::TempDir;

    use crate::post_transformer::transform_post;
    use crate::test_data::{hello_post, FakeClient};

    use super::*;

    const ORIGINAL_URL: &str = "https://mseeeen.msen.jp/wp-content/uploads/2020/img.png";
    const EYECATCH_URL: &str = "https://mseeeen.msen.jp/wp-content/uploads/2020/eye.jpg";

    fn fetcher(images: &[(&str, &str)]) -> ImageFetcher<FakeClient> {
        ImageFetcher::new(FakeClient::with_images(images), Duration::ZERO)
    }

    #[test]
    fn test_render_post() {
        let mut raw = hello_post();
        raw.image_url = Some(EYECATCH_URL.to_string());
        let post = transform_post(&raw, Path::new("result")).unwrap();

        assert_eq!(render_post(&post), r#"---
title: Hello
date: 2020-05-01
author: kenzauros
tags: [Rust, Markdown]
hero: https://mseeeen.msen.jp/wp-content/uploads/2020/eye.jpg
---

Hello from the old blog.

![alt](images/hello-1.png)

The end."#);
    }

    #[test]
    fn test_render_without_tags() {
        let mut raw = hello_post();
        raw.tagnames = None;
        raw.title = Some("Intro: Part [1]".to_string());
        raw.content = None;
        let post = transform_post(&raw, Path::new("result")).unwrap();

        assert_eq!(render_post(&post), "---\ntitle: \"Intro: Part [1]\"\ndate: 2020-05-01\nauthor: kenzauros\n---\n\n");
    }

    #[test]
    fn test_materialize_without_images() {
        let dir = TempDir::new().unwrap();
        let post = transform_post(&hello_post(), dir.path()).unwrap();
        let mut fetcher = fetcher(&[(ORIGINAL_URL, "png")]);

        let report = materialize(&post, MaterializeOptions::default(), &mut fetcher);
        assert!(report.written);
        assert_eq!(report.images_downloaded, 0);

        let index = dir.path().join("kenzauros/2020/hello/index.md");
        assert_eq!(fs::read_to_string(index).unwrap(), render_post(&post));
        assert!(!dir.path().join("kenzauros/2020/hello/images").exists());
        assert!(fetcher.client().requests().is_empty());
    }

    #[test]
    fn test_materialize_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let mut raw = hello_post();
        raw.image_url = Some(EYECATCH_URL.to_string());
        let post = transform_post(&raw, dir.path()).unwrap();
        let options = MaterializeOptions { download_images: true };

        let mut first = fetcher(&[(ORIGINAL_URL, "png"), (EYECATCH_URL, "jpg")]);
        let report = materialize(&post, options, &mut first);
        assert_eq!(report, PostReport { written: true, images_downloaded: 2, images_existing: 0, images_failed: 0 });
        assert_eq!(first.client().requests(), [ORIGINAL_URL, EYECATCH_URL]);

        let index = dir.path().join("kenzauros/2020/hello/index.md");
        let first_content = fs::read_to_string(&index).unwrap();
        assert_eq!(fs::read(dir.path().join("kenzauros/2020/hello/images/hello-1.png")).unwrap(), b"png");
        assert_eq!(fs::read(dir.path().join("kenzauros/2020/hello/images/hello.jpg")).unwrap(), b"jpg");

        let mut second = fetcher(&[(ORIGINAL_URL, "png"), (EYECATCH_URL, "jpg")]);
        let report = materialize(&post, options, &mut second);
        assert_eq!(report, PostReport { written: true, images_downloaded: 0, images_existing: 2, images_failed: 0 });
        assert!(second.client().requests().is_empty());
        assert_eq!(fs::read_to_string(&index).unwrap(), first_content);
    }

    #[test]
    fn test_failed_image_does_not_stop_others() {
        let dir = TempDir::new().unwrap();
        let mut raw = hello_post();
        raw.image_url = Some(EYECATCH_URL.to_string());
        let post = transform_post(&raw, dir.path()).unwrap();

        let mut fetcher = fetcher(&[(EYECATCH_URL, "jpg")]);
        let report = materialize(&post, MaterializeOptions { download_images: true }, &mut fetcher);
        assert_eq!(report.images_failed, 1);
        assert_eq!(report.images_downloaded, 1);
        assert!(!dir.path().join("kenzauros/2020/hello/images/hello-1.png").exists());
        assert!(dir.path().join("kenzauros/2020/hello/images/hello.jpg").exists());
    }

    #[test]
    fn test_existing_index_is_overwritten() {
        let dir = TempDir::new().unwrap();
        let post = transform_post(&hello_post(), dir.path()).unwrap();
        let post_dir = dir.path().join("kenzauros/2020/hello");
        fs::create_dir_all(&post_dir).unwrap();
        fs::write(post_dir.join(INDEX_FILE_NAME), "old content").unwrap();

        let mut fetcher = fetcher(&[]);
        materialize(&post, MaterializeOptions::default(), &mut fetcher);
        assert_eq!(fs::read_to_string(post_dir.join(INDEX_FILE_NAME)).unwrap(), render_post(&post));
    }

    #[test]
    fn test_write_failure_is_reported() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, "not a directory").unwrap();
        let post = transform_post(&hello_post(), &blocker).unwrap();

        let mut fetcher = fetcher(&[]);
        let report = materialize(&post, MaterializeOptions { download_images: true }, &mut fetcher);
        assert!(!report.written);
        assert_eq!(report.images_failed, 1);
        assert!(fetcher.client().requests().is_empty());
    }
}
