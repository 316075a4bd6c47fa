//! Output generation for a collected briefing.
//!
//! # Submodules
//!
//! - [`text`]: renders the briefing document printed to stdout
//! - [`json`]: optionally writes the collected data as a JSON file

pub mod json;
pub mod text;
