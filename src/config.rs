use std::path::PathBuf;
use std::time::Duration;

pub const SOURCE_FILE: &str = "wp_posts.yml";
pub const TARGET_BASE_DIR: &str = "result";
/// Pause between two image requests to the remote host
pub const FETCH_DELAY: Duration = Duration::from_millis(500);

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum LogLevel {
    Critical = 0,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

pub struct Paths {
    pub source_file: PathBuf,
    pub base_dir: PathBuf,
}

pub struct Config {
    pub paths: Paths,
    pub image_download: bool,
    pub fetch_delay: Duration,
    pub log_level: LogLevel,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            paths: Paths {
                source_file: PathBuf::from(SOURCE_FILE),
                base_dir: PathBuf::from(TARGET_BASE_DIR),
            },
            image_download: false,
            fetch_delay: FETCH_DELAY,
            log_level: LogLevel::Info,
        }
    }
}

impl Config {
    pub fn with_image_download(image_download: bool) -> Config {
        Config {
            image_download,
            ..Default::default()
        }
    }
}
