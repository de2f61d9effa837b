//! # Task Aggregator Test Suite
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! ├── fixtures.rs       # Signing operators, wired harness
//! └── integration/      # Cross-component flows
//!     ├── vote_flow.rs  # vote → decide → queue → settle
//!     ├── fleet.rs      # redundant-forward reconciliation
//!     └── http.rs       # router over the real service
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p ag-tests
//! cargo test -p ag-tests integration::fleet
//!
//! # Benchmarks
//! cargo bench -p ag-tests
//! ```

#![allow(dead_code)]

pub mod fixtures;
pub mod integration;
