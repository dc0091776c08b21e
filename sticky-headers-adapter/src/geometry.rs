use alloc::vec::Vec;

use sticky_headers::{LayoutOracle, Point, Viewport};

use crate::fenwick::Fenwick;
use crate::{GridLayout, LinearLayout};

/// The serializable inputs of a [`ListGeometry`].
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ListGeometryState {
    pub item_sizes: Vec<u32>,
    pub span_count: usize,
    pub divider: u32,
    pub scroll_offset: u64,
    pub viewport: Viewport,
}

impl From<ListGeometryState> for ListGeometry {
    fn from(state: ListGeometryState) -> Self {
        Self::from_state(state)
    }
}

/// A reference list/grid layout that answers [`LayoutOracle`] queries.
///
/// Items are placed in rows of `span_count` columns that split the viewport width evenly. A row
/// is as tall as its tallest item and every row except the last is followed by a divider of
/// `divider` pixels. Offsets are in whole pixels along the scroll axis.
///
/// This is meant for hosts without their own layout engine (TUIs, tests, simulations); hosts
/// with a real layout engine implement [`LayoutOracle`] or one of the layout traits directly.
#[derive(Clone, Debug)]
pub struct ListGeometry {
    item_sizes: Vec<u32>,
    span_count: usize,
    divider: u32,

    row_sizes: Vec<u32>,
    rows: Fenwick,

    scroll_offset: u64,
    viewport: Viewport,
}

impl ListGeometry {
    pub fn new(item_sizes: Vec<u32>, span_count: usize, divider: u32) -> Self {
        let mut g = Self {
            item_sizes,
            span_count: span_count.max(1),
            divider,
            row_sizes: Vec::new(),
            rows: Fenwick::from_rows(&[], divider),
            scroll_offset: 0,
            viewport: Viewport::default(),
        };
        g.rebuild_rows();
        g
    }

    /// Rebuilds a geometry from a saved [`ListGeometryState`].
    pub fn from_state(state: ListGeometryState) -> Self {
        let mut g = Self::new(state.item_sizes, state.span_count, state.divider);
        g.viewport = state.viewport;
        g.scroll_offset = g.clamp_scroll_offset(state.scroll_offset);
        g
    }

    /// Captures the inputs of this geometry; row extents and prefix sums are derived again by
    /// [`ListGeometry::from_state`].
    pub fn state(&self) -> ListGeometryState {
        ListGeometryState {
            item_sizes: self.item_sizes.clone(),
            span_count: self.span_count,
            divider: self.divider,
            scroll_offset: self.scroll_offset,
            viewport: self.viewport,
        }
    }

    /// A single-column list.
    pub fn linear(item_sizes: Vec<u32>, divider: u32) -> Self {
        Self::new(item_sizes, 1, divider)
    }

    pub fn uniform(count: usize, size: u32, span_count: usize, divider: u32) -> Self {
        Self::new(alloc::vec![size; count], span_count, divider)
    }

    pub fn with_viewport(mut self, viewport: Viewport) -> Self {
        self.set_viewport(viewport);
        self
    }

    pub fn item_count(&self) -> usize {
        self.item_sizes.len()
    }

    pub fn span_count(&self) -> usize {
        self.span_count
    }

    pub fn divider(&self) -> u32 {
        self.divider
    }

    pub fn row_count(&self) -> usize {
        self.row_sizes.len()
    }

    pub fn total_size(&self) -> u64 {
        self.rows.total()
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        self.scroll_offset = self.clamp_scroll_offset(self.scroll_offset);
    }

    pub fn scroll_offset(&self) -> u64 {
        self.scroll_offset
    }

    pub fn max_scroll_offset(&self) -> u64 {
        self.total_size().saturating_sub(self.viewport_main())
    }

    pub fn clamp_scroll_offset(&self, offset: u64) -> u64 {
        offset.min(self.max_scroll_offset())
    }

    /// Sets the scroll offset, clamped to the scrollable range. Returns the applied offset.
    pub fn set_scroll_offset(&mut self, offset: u64) -> u64 {
        self.scroll_offset = self.clamp_scroll_offset(offset);
        self.scroll_offset
    }

    pub fn set_item_sizes(&mut self, item_sizes: Vec<u32>) {
        self.item_sizes = item_sizes;
        self.rebuild_rows();
        self.scroll_offset = self.clamp_scroll_offset(self.scroll_offset);
    }

    pub fn set_item_size(&mut self, index: usize, size: u32) {
        if index >= self.item_sizes.len() {
            vwarn!(
                index,
                item_count = self.item_sizes.len(),
                "ListGeometry::set_item_size: index out of range"
            );
            return;
        }
        self.item_sizes[index] = size;

        let row = index / self.span_count;
        let next = self.row_extent(row);
        let cur = self.row_sizes[row];
        if next != cur {
            self.row_sizes[row] = next;
            self.rows.add(row, next as i64 - cur as i64);
        }
        self.scroll_offset = self.clamp_scroll_offset(self.scroll_offset);
    }

    pub fn row_of(&self, index: usize) -> usize {
        index / self.span_count
    }

    /// The scroll offset at which `row` starts.
    pub fn row_start(&self, row: usize) -> Option<u64> {
        (row < self.row_count()).then(|| self.rows.prefix_sum(row))
    }

    pub fn item_start(&self, index: usize) -> Option<u64> {
        if index >= self.item_count() {
            return None;
        }
        self.row_start(self.row_of(index))
    }

    /// The item whose bounds contain `point` (viewport coordinates).
    ///
    /// Returns `None` outside the viewport, inside a divider, below an item that is shorter than
    /// its row, or in the empty cells of a partially filled last row.
    pub fn item_at(&self, point: Point) -> Option<usize> {
        let inside = point.x >= 0.0
            && point.y >= 0.0
            && point.x < self.viewport.width
            && point.y < self.viewport.height;
        if !inside {
            return None;
        }

        let offset = self.scroll_offset.saturating_add(point.y as u64);
        let row = self.row_at_offset(offset)?;
        let column = ((point.x / self.viewport.width) * self.span_count as f32) as usize;
        let index = row * self.span_count + column.min(self.span_count - 1);
        let size = *self.item_sizes.get(index)?;

        let within = offset - self.rows.prefix_sum(row);
        (within < size as u64).then_some(index)
    }

    /// The first item of the first row with any part inside the viewport.
    pub fn first_visible_item(&self) -> Option<usize> {
        let view_end = self.scroll_offset.saturating_add(self.viewport_main());
        let mut row = self.row_at_offset(self.scroll_offset)?;
        let within = self.scroll_offset - self.rows.prefix_sum(row);
        if within >= self.row_sizes[row] as u64 {
            // The top edge sits in a divider.
            row += 1;
        }
        let start = self.row_start(row)?;
        (start < view_end).then_some(row * self.span_count)
    }

    /// The first item of the first row that is entirely inside the viewport.
    pub fn first_completely_visible_item(&self) -> Option<usize> {
        let view_end = self.scroll_offset.saturating_add(self.viewport_main());
        let mut row = self.row_at_offset(self.scroll_offset)?;
        if self.rows.prefix_sum(row) < self.scroll_offset {
            row += 1;
        }
        let start = self.row_start(row)?;
        let end = start.saturating_add(self.row_sizes[row] as u64);
        (end <= view_end).then_some(row * self.span_count)
    }

    fn viewport_main(&self) -> u64 {
        self.viewport.height.max(0.0) as u64
    }

    fn row_at_offset(&self, offset: u64) -> Option<usize> {
        (offset < self.total_size()).then(|| self.rows.lower_bound(offset))
    }

    fn row_extent(&self, row: usize) -> u32 {
        let start = row * self.span_count;
        let end = (start + self.span_count).min(self.item_sizes.len());
        self.item_sizes[start..end].iter().copied().max().unwrap_or(0)
    }

    fn rebuild_rows(&mut self) {
        let rows = self.item_sizes.len().div_ceil(self.span_count);
        let row_sizes: Vec<u32> = (0..rows).map(|row| self.row_extent(row)).collect();
        self.row_sizes = row_sizes;
        self.rows = Fenwick::from_rows(&self.row_sizes, self.divider);
        vdebug!(
            items = self.item_sizes.len(),
            rows,
            total = self.rows.total(),
            "ListGeometry::rebuild_rows"
        );
    }
}

impl LinearLayout for ListGeometry {
    fn item_under(&self, point: Point) -> Option<usize> {
        self.item_at(point)
    }

    fn find_first_visible_item(&self) -> Option<usize> {
        self.first_visible_item()
    }

    fn find_first_completely_visible_item(&self) -> Option<usize> {
        self.first_completely_visible_item()
    }
}

impl GridLayout for ListGeometry {
    fn span_count(&self) -> usize {
        self.span_count
    }
}

impl LayoutOracle for ListGeometry {
    fn item_under(&self, point: Point) -> Option<usize> {
        self.item_at(point)
    }

    fn first_visible_index(&self) -> Option<usize> {
        self.first_visible_item()
    }

    fn first_completely_visible_index(&self) -> Option<usize> {
        self.first_completely_visible_item()
    }
}
