//! Shared test utilities for the marine-data workspace.
//!
//! This crate provides common testing infrastructure including:
//! - Stub stations, directories and wave models that count their calls
//! - Synthetic reading and tide generators
//! - Common test fixtures
//!
//! # Usage
//!
//! Add to your crate's `Cargo.toml`:
//!
//! ```toml
//! [dev-dependencies]
//! test-utils = { path = "../../crates/test-utils" }
//! ```
//!
//! Then import in your tests:
//!
//! ```ignore
//! use test_utils::{fixtures, StubDirectory, StubStation};
//! ```

pub mod fixtures;
pub mod generators;
pub mod stubs;

// Re-export commonly used items at the crate root
pub use fixtures::*;
pub use generators::*;
pub use stubs::*;

/// Macro for approximate floating-point equality assertions.
///
/// # Usage
///
/// ```ignore
/// use test_utils::assert_approx_eq;
///
/// assert_approx_eq!(2.0001_f64, 2.0_f64, 0.001_f64); // passes
/// assert_approx_eq!(2.1_f64, 2.0_f64, 0.001_f64);    // fails
/// ```
#[macro_export]
macro_rules! assert_approx_eq {
    ($left:expr, $right:expr, $epsilon:expr) => {{
        let left: f64 = $left as f64;
        let right: f64 = $right as f64;
        let epsilon: f64 = $epsilon as f64;
        let diff = (left - right).abs();
        if diff > epsilon {
            panic!(
                "assertion failed: `(left ≈ right)`\n  left: `{:?}`,\n right: `{:?}`,\n  diff: `{:?}` > epsilon `{:?}`",
                left, right, diff, epsilon
            );
        }
    }};
}
