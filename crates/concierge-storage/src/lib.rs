//! concierge-storage: Profile record storage
//!
//! This crate provides the read-only record store consumed by the
//! authorization gateway, including:
//! - RecordStore trait for id lookups and full listings
//! - In-memory implementation for tests and the default deployment
//! - JSON file implementation seeded once when empty
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │             concierge-storage                │
//! ├─────────────────────────────────────────────┤
//! │  traits.rs    - RecordStore trait           │
//! │  memory.rs    - In-memory implementation    │
//! │  json_file.rs - JSON file implementation    │
//! │  seed.rs      - Default profiles            │
//! └─────────────────────────────────────────────┘
//! ```

pub mod error;
pub mod json_file;
pub mod memory;
pub mod seed;
pub mod traits;

// Re-export commonly used types
pub use error::{StorageError, StorageResult};
pub use json_file::JsonFileRecordStore;
pub use memory::MemoryRecordStore;
pub use seed::default_records;
pub use traits::RecordStore;
