//! # Statehouse Test Suite
//!
//! Unified test crate containing:
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! ├── fixtures.rs          # Shared store builders
//! └── integration/
//!     ├── properties.rs    # Commit, dispatch, namespacing, strict mode
//!     ├── dynamic_modules.rs
//!     ├── subscriptions.rs
//!     └── shopping_cart.rs # The demo store end to end
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! # All tests
//! cargo test -p statehouse-tests
//!
//! # By category
//! cargo test -p statehouse-tests integration::subscriptions::
//!
//! # Benchmarks
//! cargo bench -p statehouse-tests
//! ```

#![allow(dead_code)]

pub mod fixtures;
pub mod integration;
