pub mod encoding;
pub mod error;
pub mod extra;
pub mod unicode_path;
