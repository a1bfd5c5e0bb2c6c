//! Architectural Enforcement Integration Tests
//!
//! This package contains integration tests that enforce architectural
//! principles of the animation engine:
//! - Render-loop discipline: no sleeping, no thread spawning, no locks
//! - Single-writer discipline: only the blend state writes influences
//!
//! These tests are designed to catch violations early in the development
//! cycle.

#![allow(dead_code)]

use std::path::PathBuf;

/// Root of the engine core crate's sources, relative to this package.
pub fn engine_src_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../engine/core/src")
}
