pub mod extract;
pub mod normalizer;
