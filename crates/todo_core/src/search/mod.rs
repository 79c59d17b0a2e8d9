//! Search entry points.
//!
//! # Responsibility
//! - Rank tasks by fuzzy title similarity.
//! - Keep scoring and result shaping inside core.

pub mod fuzzy;
