//! Test harness for the targeting engine
//!
//! Provides infrastructure for exercising the full targeting pipeline
//! without a real transport or display stack.
//!
//! # Modules
//!
//! - `headless`: engine wrapper with recording ports (no service required)
//! - `fixtures`: display/window/group builders for common scenarios
//! - `assertions`: delivery-log assertions (ordering, targeting)

pub mod assertions;
pub mod fixtures;
pub mod headless;

pub use headless::{DeliveryLog, TestEngine, TestError};
