//! Interfaces implemented by the host UI layer.

use crate::{ChangeObserver, ItemType, Point, SourceId, SubscriptionId};

/// Answers geometric questions about the current list layout.
pub trait LayoutOracle {
    /// Returns the index of the item whose visual bounds contain `point`.
    ///
    /// Returns `None` when the point falls between items (dividers, decorations, padding).
    fn item_under(&self, point: Point) -> Option<usize>;

    /// The first item with any part visible.
    fn first_visible_index(&self) -> Option<usize> {
        None
    }

    /// The first item that is entirely inside the viewport.
    fn first_completely_visible_index(&self) -> Option<usize> {
        None
    }
}

/// The authoritative item sequence.
pub trait DataSource {
    /// A stable identity. Returning a different id tells the state machine the source was
    /// swapped.
    fn source_id(&self) -> SourceId;

    fn item_count(&self) -> usize;

    fn item_type(&self, index: usize) -> ItemType;

    /// Registers `observer` for structural change notifications.
    fn subscribe(&mut self, observer: ChangeObserver) -> SubscriptionId;

    fn unsubscribe(&mut self, subscription: SubscriptionId);
}

/// The overlay that renders the pinned header.
///
/// The surface is expected to start hidden.
pub trait StickyHeaderSurface {
    fn set_visible(&mut self, visible: bool);

    /// Binds the header at `header_index` into the overlay.
    fn push_data(&mut self, header_index: usize);

    /// Clears transient visual state (e.g. a sub-scroll offset of the overlay content).
    fn reset(&mut self);

    fn height(&self) -> f32;

    /// The overlay's top edge in viewport coordinates.
    fn vertical_offset(&self) -> f32;
}
