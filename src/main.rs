use std::process::ExitCode;

use clap::Parser;
use spdlog::error;

use wp2md::config::Config;
use wp2md::logger::configure_logger;
use wp2md::migration;

/// Converts the WordPress export `wp_posts.yml` into markdown posts under `result/`
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Also download the images of every post
    #[arg(long)]
    include_images: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();
    let config = Config::with_image_download(args.include_images);

    if let Err(e) = configure_logger(&config) {
        eprintln!("Error configuring logger: {}", e);
    }

    match migration::run(&config) {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}
