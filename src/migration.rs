use std::fmt::{self, Display, Formatter};
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use spdlog::{error, info};

use crate::config::Config;
use crate::export_index::{collect_links, collect_slugs, collect_tags, write_json, LINKS_FILE, SLUGS_FILE, TAGS_FILE};
use crate::image_fetcher::{HttpClient, ImageFetcher, ReqwestClient};
use crate::post::{RawPost, TransformedPost};
use crate::post_transformer::transform_post;
use crate::post_writer::{materialize, MaterializeOptions};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RunReport {
    pub posts: usize,
    pub posts_written: usize,
    pub posts_failed: usize,
    pub images_downloaded: usize,
    pub images_existing: usize,
    pub images_failed: usize,
}

impl Display for RunReport {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{} post(s): {} written, {} failed - images: {} downloaded, {} existing, {} failed",
               self.posts, self.posts_written, self.posts_failed,
               self.images_downloaded, self.images_existing, self.images_failed)
    }
}

pub fn load_posts(path: &Path) -> Result<Vec<RawPost>> {
    let yaml = fs::read_to_string(path)
        .with_context(|| format!("Error opening export file {}", path.display()))?;
    parse_posts(&yaml)
        .with_context(|| format!("Error parsing export file {}", path.display()))
}

pub fn parse_posts(yaml: &str) -> Result<Vec<RawPost>> {
    Ok(serde_yaml::from_str::<Vec<RawPost>>(yaml)?)
}

/// Runs the whole migration with the real http client
pub fn run(config: &Config) -> Result<RunReport> {
    let client = ReqwestClient::new().context("Error creating http client")?;
    run_with_client(config, client)
}

/// Only a failure to read the export or to write the indexes aborts the run.
/// Failures of a single post are logged and counted.
pub fn run_with_client<C: HttpClient>(config: &Config, client: C) -> Result<RunReport> {
    let base_dir = &config.paths.base_dir;
    fs::create_dir_all(base_dir)
        .with_context(|| format!("Error creating output directory {}", base_dir.display()))?;

    let posts = load_posts(&config.paths.source_file)?;
    info!("{} post(s) loaded from {}", posts.len(), config.paths.source_file.display());

    write_json(&base_dir.join(TAGS_FILE), collect_tags(&posts).items())?;
    write_json(&base_dir.join(SLUGS_FILE), collect_slugs(&posts).items())?;

    let mut report = RunReport {
        posts: posts.len(),
        ..Default::default()
    };

    let mut records: Vec<TransformedPost> = Vec::with_capacity(posts.len());
    for raw in posts.iter() {
        match transform_post(raw, base_dir) {
            Ok(record) => records.push(record),
            Err(e) => {
                error!("{}", e);
                report.posts_failed += 1;
            }
        }
    }

    write_json(&base_dir.join(LINKS_FILE), &collect_links(&records))?;

    let options = MaterializeOptions { download_images: config.image_download };
    let mut fetcher = ImageFetcher::new(client, config.fetch_delay);
    for record in records.iter() {
        let post_report = materialize(record, options, &mut fetcher);
        if post_report.written {
            report.posts_written += 1;
        } else {
            report.posts_failed += 1;
        }
        report.images_downloaded += post_report.images_downloaded;
        report.images_existing += post_report.images_existing;
        report.images_failed += post_report.images_failed;
    }

    info!("{}", report);
    Ok(report)
}
