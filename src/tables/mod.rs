//! Hand-authored vendor tag dictionaries.
//!
//! The source this crate's structure is modeled on generates these tables at
//! build time from upstream tag databases (`tables/mod.rs`,
//! `include!(concat!(env!("OUT_DIR"), "/generated_tags.rs"))`). This crate
//! has no such external database to codegen from, so the dictionaries below
//! are hand-authored at the scale this spec's vendor set actually needs.

pub mod canon_tags;
pub mod fujifilm_tags;
pub mod panasonic_tags;
