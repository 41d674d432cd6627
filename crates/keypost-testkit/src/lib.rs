//! # keypost Testkit
//!
//! Testing utilities for keypost.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Fixtures**: Helper structs for setting up name-record test scenarios
//! - **Generators**: Proptest strategies for property-based testing
//!
//! ## Test Fixtures
//!
//! Quickly set up test scenarios:
//!
//! ```rust
//! use keypost_testkit::fixtures::TestFixture;
//!
//! let fixture = TestFixture::new();
//! let record = fixture.make_record(b"/target/abc");
//! assert_eq!(record.sequence, 0);
//! ```
//!
//! ## Property Testing
//!
//! Use the generators with proptest:
//!
//! ```rust,ignore
//! use proptest::prelude::*;
//! use keypost_testkit::generators::{record_from_params, RecordParams};
//!
//! proptest! {
//!     #[test]
//!     fn record_roundtrips(params: RecordParams) {
//!         let record = record_from_params(&params);
//!         let decoded = keypost_core::Record::from_bytes(&record.to_bytes()).unwrap();
//!         prop_assert_eq!(decoded.sequence, record.sequence);
//!     }
//! }
//! ```

pub mod fixtures;
pub mod generators;

pub use fixtures::{multi_party_fixtures, TestFixture};
pub use generators::{record_from_params, RecordParams};
