//! # HTTPエンドポイント

pub mod upload;

pub use upload::handle_upload;
