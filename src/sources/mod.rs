//! Fetchers for every upstream data source.
//!
//! | Source | Module | Format | Timeout |
//! |--------|--------|--------|---------|
//! | News feeds | [`feeds`] | RSS 2.0 / Atom | 10 s |
//! | Article pages | [`preview`] | HTML | 5 s |
//! | OpenWeatherMap One Call | [`weather`] | JSON | 10 s |
//! | Useless Facts, JokeAPI, byabbe.se | [`novelty`] | JSON | 5 s |
//!
//! # Common Patterns
//!
//! Every public fetcher returns a plain value rather than a `Result`: an empty
//! `Vec`, an empty `String` or `None` on failure. The cause is logged with the
//! source and URL so one broken upstream never takes the briefing down.

pub mod feeds;
pub mod novelty;
pub mod preview;
pub mod weather;
