//! Common utilities and shared types for outliers.
//!
//! This crate provides foundational components used across all outliers crates:
//!
//! - **Configuration**: Application settings via [`Config`]
//! - **Error handling**: Unified error types via [`AppError`] and [`AppResult`]
//! - **ID Generation**: ULID-based identifiers and opaque tokens via [`IdGenerator`]
//! - **Storage**: Bucketed file storage backends (local, S3-compatible)
//! - **Display**: Reader-facing date formatting via [`DateFormatter`]
//!
//! # Example
//!
//! ```no_run
//! use outliers_common::{Config, IdGenerator, AppResult};
//!
//! fn example() -> AppResult<()> {
//!     let config = Config::load()?;
//!     let id_gen = IdGenerator::new();
//!     let id = id_gen.generate();
//!     println!("Generated ID: {} for {}", id, config.server.url);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod display;
pub mod error;
pub mod id;
pub mod storage;

pub use config::Config;
pub use display::DateFormatter;
pub use error::{AppError, AppResult, INVALID_CREDENTIALS_MESSAGE};
pub use id::{IdGenerator, hash_secret};
#[cfg(feature = "s3")]
pub use storage::S3Storage;
pub use storage::{
    LocalStorage, StorageBackend, UploadedFile, content_thumbnail_key, profile_photo_key,
};
