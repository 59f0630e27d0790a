//! Utility functions for waypoint.
//!
//! - [`text`]: case conversion helpers used when deriving handler names from
//!   path segments.

pub mod text;
