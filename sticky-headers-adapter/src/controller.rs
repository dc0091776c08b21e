use alloc::vec::Vec;

use sticky_headers::{
    DataSource, FrameOutcome, StickyHeaderSurface, StickyHeaders, StickyOptions,
    StructuralChange, Viewport,
};

use crate::ListGeometry;

/// A framework-neutral controller that pairs a [`StickyHeaders`] state machine with a
/// [`ListGeometry`].
///
/// This type does not hold any UI objects. Adapters drive it by calling:
/// - `on_viewport` / `on_scroll` when UI events occur
/// - `apply_change` when the data set changes
/// - `draw(source)` once per frame
#[derive(Debug)]
pub struct Controller<S> {
    sticky: StickyHeaders<S>,
    geometry: ListGeometry,
}

impl<S: StickyHeaderSurface + 'static> Controller<S> {
    pub fn new(options: StickyOptions, surface: S, geometry: ListGeometry) -> Self {
        Self {
            sticky: StickyHeaders::new(options, surface),
            geometry,
        }
    }

    pub fn from_parts(sticky: StickyHeaders<S>, geometry: ListGeometry) -> Self {
        Self { sticky, geometry }
    }

    pub fn sticky(&self) -> &StickyHeaders<S> {
        &self.sticky
    }

    pub fn sticky_mut(&mut self) -> &mut StickyHeaders<S> {
        &mut self.sticky
    }

    pub fn geometry(&self) -> &ListGeometry {
        &self.geometry
    }

    pub fn geometry_mut(&mut self) -> &mut ListGeometry {
        &mut self.geometry
    }

    pub fn into_parts(self) -> (StickyHeaders<S>, ListGeometry) {
        (self.sticky, self.geometry)
    }

    pub fn on_viewport(&mut self, viewport: Viewport) {
        self.geometry.set_viewport(viewport);
    }

    /// Call this when the UI reports a scroll offset change.
    ///
    /// Returns the applied (clamped) offset.
    pub fn on_scroll(&mut self, scroll_offset: u64) -> u64 {
        let applied = self.geometry.set_scroll_offset(scroll_offset);
        vtrace!(scroll_offset, applied, "Controller::on_scroll");
        applied
    }

    /// Scrolls so that the row holding `index` starts at the top of the viewport.
    ///
    /// Returns the applied (clamped) offset, or `None` if `index` is out of bounds.
    pub fn scroll_to_item(&mut self, index: usize) -> Option<u64> {
        let start = self.geometry.item_start(index)?;
        Some(self.geometry.set_scroll_offset(start))
    }

    /// Applies a data set change: relays out the list from `item_sizes` and resets the pinned
    /// header's transient state right away.
    ///
    /// Use this when the host routes change notifications itself instead of relying on the
    /// observer subscribed on the data source.
    pub fn apply_change(&mut self, change: StructuralChange, item_sizes: Vec<u32>) {
        vdebug!(?change, items = item_sizes.len(), "Controller::apply_change");
        self.geometry.set_item_sizes(item_sizes);
        self.sticky.on_structural_change(change);
    }

    /// Runs one frame against the current geometry.
    pub fn draw<D: DataSource + ?Sized>(&mut self, source: Option<&mut D>) -> FrameOutcome {
        let viewport = self.geometry.viewport();
        self.sticky.on_draw(source, &self.geometry, viewport)
    }
}
