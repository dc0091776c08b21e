//! Adapter utilities for the `sticky-headers` crate.
//!
//! The `sticky-headers` crate is UI-agnostic and only talks to a [`LayoutOracle`]. This crate
//! provides small, framework-neutral helpers commonly needed by adapters:
//!
//! - One capability over linear, grid and staggered grid layouts ([`LayoutStrategy`])
//! - A reference list/grid geometry with dividers for hosts without a layout engine
//! - A [`Controller`] that drives the sticky state machine from scroll events
//!
//! This crate is intentionally framework-agnostic (no ratatui/egui bindings).
//!
//! [`LayoutOracle`]: sticky_headers::LayoutOracle
#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

extern crate alloc;

#[cfg(test)]
extern crate std;

#[macro_use]
mod macros;

mod controller;
mod fenwick;
mod geometry;
mod layout;


pub use controller::Controller;
pub use geometry::{ListGeometry, ListGeometryState};
pub use layout::{GridLayout, LayoutStrategy, LinearLayout, StaggeredGridLayout};
