//! Driver layer for stealth browser automation.
//!
//! This crate exposes the browser session the plan interpreter drives,
//! wrapped so that automated interaction stays close to human behavior.
//!
//! - [`waypoint_browser::session::StealthSession`]: WebDriver session with
//!   humanized primitives behind the [`waypoint_browser::session::BrowserSession`] trait
//! - [`waypoint_browser::behavioral::BehavioralEngine`]: human-like timings and typing
//! - [`waypoint_browser::stealth`]: fixed fingerprint, launch arguments, JS evasions
pub mod waypoint_browser;
