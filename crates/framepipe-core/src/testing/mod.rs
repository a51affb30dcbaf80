//! Test utilities for integration testing.
//!
//! This module is only available when compiling tests or when the
//! `testing` feature is enabled.

pub mod harness;

pub use harness::PipeTestHarness;
