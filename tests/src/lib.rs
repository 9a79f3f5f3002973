//! # Mosaic Shell Test Suite
//!
//! Unified test crate for cross-component flows.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! └── integration/
//!     ├── tenant_isolation.rs    # Scoping and tenant-switch behavior
//!     ├── request_flows.rs       # Request/response, timeout, retry
//!     └── plugin_choreography.rs # Multi-plugin event flows
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! # All tests
//! cargo test -p shell-tests
//!
//! # By category
//! cargo test -p shell-tests integration::tenant_isolation
//! cargo test -p shell-tests integration::request_flows
//! ```

#![allow(dead_code)]

pub mod integration;
