//! Test support utilities for formkit layout integration tests
//!
//! This module provides helpers for writing integration tests:
//! - FormHost: In-memory component host
//! - Assertions: Custom layout assertions
//! - Tracing setup honoring `RUST_LOG`

mod form_host;

pub use assertions::*;
pub use form_host::FormHost;

use std::sync::Arc;

use formkit_layout::UnitConverter;
use tracing_subscriber::EnvFilter;

/// Install a test subscriber once. Filtered by `RUST_LOG`, silent by default.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// A converter with default settings, independent of the shared one.
///
/// Without a metrics source dialog base units fall back to 6 x 12 pixels, so
/// `4dlu` is 6px wide and `8dlu` is 12px high.
pub fn converter() -> Arc<UnitConverter> {
    Arc::new(UnitConverter::new())
}
