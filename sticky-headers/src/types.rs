/// An opaque per-item classifier reported by the data source (aka "view type").
///
/// Exactly one value is configured as the header type in [`crate::StickyOptions`].
pub type ItemType = i32;

/// A point in viewport coordinates (origin at the top-left of the list's viewport).
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// The size of the list's viewport for the current frame.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// The horizontal center, used as the probe's x coordinate.
    pub fn center_x(&self) -> f32 {
        self.width / 2.0
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PinState {
    #[default]
    Unpinned,
    Pinned,
}

/// The last resolved header position.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CachedHeader {
    /// Nothing resolved since creation or since the data source changed.
    #[default]
    Uninitialized,
    /// A full scan found no header at or before the probed item.
    NotFound,
    At(usize),
}

impl CachedHeader {
    pub fn index(&self) -> Option<usize> {
        match self {
            Self::At(index) => Some(*index),
            Self::Uninitialized | Self::NotFound => None,
        }
    }
}

/// Identity of a data source. Two sources with the same id are treated as the same source.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SourceId(pub u64);

/// A handle returned by [`crate::DataSource::subscribe`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SubscriptionId(pub u64);

/// A structural change reported by a data source.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StructuralChange {
    /// The whole data set may have changed.
    DataSetChanged,
    Changed { start: usize, count: usize },
    Inserted { start: usize, count: usize },
    Removed { start: usize, count: usize },
    Moved { from: usize, to: usize, count: usize },
}

/// What a single [`crate::StickyHeaders::on_draw`] call decided.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FrameOutcome {
    /// No data source is attached yet, or sticky headers are disabled.
    Skipped,
    /// The probe landed between items (e.g. on a divider). Nothing changed this frame.
    NoItemUnderProbe,
    Pinned { header: usize, probed: usize },
    /// `probed` is `None` when the list is empty and no probe was made.
    Unpinned { probed: Option<usize> },
}

impl FrameOutcome {
    pub fn is_pinned(&self) -> bool {
        matches!(self, Self::Pinned { .. })
    }
}
