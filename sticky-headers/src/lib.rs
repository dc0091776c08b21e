//! A headless sticky group header engine for virtualized lists.
//!
//! For layout adaptation helpers (linear/grid/staggered layouts, a reference list geometry and a
//! frame controller), see the `sticky-headers-adapter` crate.
//!
//! Given a list where some items are *headers* that start a group, this crate decides on every
//! frame which header should be pinned to the top of the viewport, and when the pinned overlay
//! should be shown or hidden:
//! - a backward scan finds the nearest header at or before the item under the overlay
//! - a small PINNED/UNPINNED state machine only touches the overlay on transitions
//! - structural changes of the data source invalidate cached state without flicker
//!
//! It is UI-agnostic. A TUI/GUI layer is expected to provide:
//! - a [`LayoutOracle`] (which item is under a point)
//! - a [`DataSource`] (item count, item types, change notifications)
//! - a [`StickyHeaderSurface`] (the overlay that renders the pinned header)
#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

extern crate alloc;

#[cfg(test)]
extern crate std;

#[macro_use]
mod macros;

mod host;
mod observer;
mod options;
mod resolver;
mod state;
mod sticky;
mod types;

#[cfg(test)]
mod tests;

pub use host::{DataSource, LayoutOracle, StickyHeaderSurface};
pub use observer::ChangeObserver;
pub use options::{ProbePolicy, StickyOptions};
pub use resolver::find_header_at_or_before;
pub use state::StickySnapshot;
pub use sticky::StickyHeaders;
pub use types::{
    CachedHeader, FrameOutcome, ItemType, PinState, Point, SourceId, StructuralChange,
    SubscriptionId, Viewport,
};
