//! Odds and ends shared by every crate in the workspace.

pub mod assert;
pub mod env;
pub mod hash;
