pub mod config;
pub mod logger;
pub mod migration;
pub mod post;
pub mod post_transformer;
pub mod post_writer;
pub mod image_ref;
pub mod image_fetcher;
pub mod export_index;
pub mod name_translation;
mod content;
mod text_utils;
mod test_data;

pub use migration::{run, RunReport};
