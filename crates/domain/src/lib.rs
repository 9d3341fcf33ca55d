//! # airhub-domain
//!
//! Pure domain model for the airhub environmental automation core.
//!
//! ## Responsibilities
//! - Foundational types: device identifiers, error conventions, timestamps
//! - Define **Snapshots** (immutable readings of all tracked metrics)
//! - Define **Devices** (descriptors for registered actuators: fans,
//!   humidifiers, purifiers, alarms, …)
//! - Define **Threshold rules** (edge-triggered crossing predicates keyed
//!   by device kind)
//! - Contain all invariant enforcement and domain logic
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod device;
pub mod error;
pub mod rule;
pub mod snapshot;
pub mod time;
