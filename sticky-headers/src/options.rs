use crate::ItemType;

/// How the item "under" the pinned header is sampled each frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ProbePolicy {
    /// Probe at the viewport's horizontal center, at the surface's top edge.
    #[default]
    SurfaceOffset,
    /// Probe at the viewport's horizontal center, at the surface's bottom edge.
    SurfaceBottom,
    /// Use [`crate::LayoutOracle::first_visible_index`] instead of a point probe.
    FirstVisible,
    /// Use [`crate::LayoutOracle::first_completely_visible_index`] instead of a point probe.
    FirstCompletelyVisible,
}

/// Configuration for [`crate::StickyHeaders`].
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StickyOptions {
    /// The item type that marks the start of a group.
    pub header_type: ItemType,

    /// Enables/disables pinning. When disabled, frames are skipped and the surface is hidden.
    pub enabled: bool,

    pub probe: ProbePolicy,
}

impl StickyOptions {
    pub fn new(header_type: ItemType) -> Self {
        Self {
            header_type,
            enabled: true,
            probe: ProbePolicy::default(),
        }
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn with_probe(mut self, probe: ProbePolicy) -> Self {
        self.probe = probe;
        self
    }
}
