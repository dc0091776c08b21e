use crate::{CachedHeader, PinState, SourceId};

/// A lightweight, serializable snapshot of the sticky state record.
///
/// With `feature = "serde"`, this type implements `Serialize`/`Deserialize`.
///
/// Two snapshots compare equal iff no observable state changed in between, which makes this
/// handy for asserting that a frame was a no-op.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StickySnapshot {
    pub pin_state: PinState,
    pub cached_header: CachedHeader,
    /// Whether the cached header was verified against the current data.
    pub cache_trusted: bool,
    /// The header most recently pushed into the surface, while pinned.
    pub pushed_header: Option<usize>,
    pub source: Option<SourceId>,
}
