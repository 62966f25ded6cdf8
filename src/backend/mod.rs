//! Backend abstraction layer
//!
//! Provides the [`GpuBackend`] trait plus the shared types every backend
//! implementation speaks, and a headless reference backend.

pub mod headless;
pub mod traits;
pub mod types;

pub use headless::{HeadlessBackend, RecordedCall};
pub use traits::*;
pub use types::*;
