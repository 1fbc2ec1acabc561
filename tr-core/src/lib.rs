//! Resolves the configuration of build targets.
//!
//! Every target starts from the defaults declared in [`cfgs::target_schema`], then the preset of
//! its archetype, config files, target rules and finally the command line get layered on top.
//! Targets that share a build environment are then checked for options that have to agree.
//!
//! The usual entry point is an [`engine::Engine`], often created from a [`defs::PlanSpec`].

pub mod args;
pub mod cfgs;
pub mod config_file;
mod defines;
pub mod defs;
pub mod emit;
pub mod engine;
pub mod environment;
mod error;
pub mod options;
pub mod platform;
pub mod policy;
pub mod resolver;
pub mod rules;
pub mod snapshot;
pub mod validate;


pub use error::{Error, ErrorChain, PlanErrors};
