//! Window targeting and coordinate-transform engine
//!
//! Resolves which window receives each pointer or key event: per-display
//! rotation and one-hand-mode geometry, a hot-area index for resize
//! cursors, a versioned window catalog, a z-order and occlusion aware
//! target resolver, and a dispatch router that keeps every client's
//! enter/leave/cancel bookkeeping consistent.
//!
//! [`engine::TargetingEngine`] is the composition root; everything else
//! is usable on its own for tools and tests.

pub mod bind;
pub mod catalog;
pub mod config;
pub mod engine;
pub mod errors;
pub mod event;
pub mod geometry;
pub mod hot_area;
pub mod ports;
pub mod resolver;
pub mod router;
pub mod session;
pub mod types;

pub use catalog::WindowCatalog;
pub use config::Config;
pub use engine::{ExtraData, TargetingEngine};
pub use errors::TargetingError;
pub use resolver::{Resolution, Target, TargetResolver};
pub use router::{DispatchAction, DispatchRouter, ShiftWindowParam};
