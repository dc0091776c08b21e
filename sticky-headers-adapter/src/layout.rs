use alloc::vec::Vec;
use core::fmt;

use sticky_headers::{LayoutOracle, Point};

/// A list laid out along one axis, one item per row.
pub trait LinearLayout {
    fn item_under(&self, point: Point) -> Option<usize>;

    fn find_first_visible_item(&self) -> Option<usize>;

    fn find_first_completely_visible_item(&self) -> Option<usize>;
}

/// A grid whose rows hold `span_count` items and share a single row offset.
pub trait GridLayout: LinearLayout {
    fn span_count(&self) -> usize;
}

/// A grid whose spans (columns) are laid out independently.
pub trait StaggeredGridLayout {
    fn item_under(&self, point: Point) -> Option<usize>;

    fn span_count(&self) -> usize;

    /// Writes the first visible item of span `i` into `into[i]`, or `None` for an empty span.
    ///
    /// `into.len()` equals `span_count()`.
    fn find_first_visible_items(&self, into: &mut [Option<usize>]);

    /// Same as `find_first_visible_items`, for completely visible items.
    fn find_first_completely_visible_items(&self, into: &mut [Option<usize>]);
}

/// The layout strategies a list can use, dispatched without downcasting.
///
/// Implements [`LayoutOracle`], so it can be passed straight to
/// [`sticky_headers::StickyHeaders::on_draw`].
///
/// For staggered grids, the first (completely) visible index is the minimum over all spans;
/// empty spans are ignored.
#[derive(Clone, Copy)]
pub enum LayoutStrategy<'a> {
    Linear(&'a dyn LinearLayout),
    Grid(&'a dyn GridLayout),
    Staggered(&'a dyn StaggeredGridLayout),
}

impl LayoutStrategy<'_> {
    pub fn span_count(&self) -> usize {
        match self {
            Self::Linear(_) => 1,
            Self::Grid(grid) => grid.span_count().max(1),
            Self::Staggered(staggered) => staggered.span_count().max(1),
        }
    }

    /// Same as [`LayoutOracle::first_visible_index`], reusing `scratch` for per-span results.
    pub fn first_visible_index_with(&self, scratch: &mut Vec<Option<usize>>) -> Option<usize> {
        match self {
            Self::Linear(linear) => linear.find_first_visible_item(),
            Self::Grid(grid) => grid.find_first_visible_item(),
            Self::Staggered(staggered) => min_over_spans(*staggered, scratch, |s, into| {
                s.find_first_visible_items(into)
            }),
        }
    }

    /// Same as [`LayoutOracle::first_completely_visible_index`], reusing `scratch` for per-span
    /// results.
    pub fn first_completely_visible_index_with(
        &self,
        scratch: &mut Vec<Option<usize>>,
    ) -> Option<usize> {
        match self {
            Self::Linear(linear) => linear.find_first_completely_visible_item(),
            Self::Grid(grid) => grid.find_first_completely_visible_item(),
            Self::Staggered(staggered) => min_over_spans(*staggered, scratch, |s, into| {
                s.find_first_completely_visible_items(into)
            }),
        }
    }
}

fn min_over_spans(
    layout: &dyn StaggeredGridLayout,
    scratch: &mut Vec<Option<usize>>,
    fill: impl FnOnce(&dyn StaggeredGridLayout, &mut [Option<usize>]),
) -> Option<usize> {
    scratch.clear();
    scratch.resize(layout.span_count(), None);
    fill(layout, scratch.as_mut_slice());
    let first = scratch.iter().flatten().copied().min();
    vtrace!(spans = scratch.len(), ?first, "staggered first index");
    first
}

impl LayoutOracle for LayoutStrategy<'_> {
    fn item_under(&self, point: Point) -> Option<usize> {
        match self {
            Self::Linear(linear) => linear.item_under(point),
            Self::Grid(grid) => grid.item_under(point),
            Self::Staggered(staggered) => staggered.item_under(point),
        }
    }

    fn first_visible_index(&self) -> Option<usize> {
        self.first_visible_index_with(&mut Vec::new())
    }

    fn first_completely_visible_index(&self) -> Option<usize> {
        self.first_completely_visible_index_with(&mut Vec::new())
    }
}

impl fmt::Debug for LayoutStrategy<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Linear(_) => "Linear",
            Self::Grid(_) => "Grid",
            Self::Staggered(_) => "Staggered",
        };
        f.debug_struct("LayoutStrategy")
            .field("kind", &name)
            .field("span_count", &self.span_count())
            .finish_non_exhaustive()
    }
}
