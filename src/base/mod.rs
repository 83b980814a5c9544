//! Foundation types for the SDSL toolchain.
//!
//! This module provides fundamental types used throughout the analyzer:
//! - [`Position`], [`Span`] - Line/column positions for declaration nodes
//! - [`SourceTier`] - The provenance root a shader was discovered under
//! - Domain constants (file extensions, reserved receivers)
//!
//! This module has NO dependencies on other sdsl modules.

pub mod constants;
mod position;
mod tier;

pub use position::{Position, Span};
pub use tier::SourceTier;
