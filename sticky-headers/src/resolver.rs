use crate::ItemType;

/// Returns the nearest header index at or before `from_index`.
///
/// Scans `from_index, from_index - 1, ..., 0` and returns the first index whose type equals
/// `header_type`. Headers are sparse group markers, so the nearest one at or before an item is
/// always that item's group.
///
/// - `item_count == 0` returns `None` without querying `type_of`.
/// - `from_index >= item_count` is clamped to the last item.
pub fn find_header_at_or_before(
    from_index: usize,
    item_count: usize,
    mut type_of: impl FnMut(usize) -> ItemType,
    header_type: ItemType,
) -> Option<usize> {
    if item_count == 0 {
        return None;
    }
    let from = from_index.min(item_count - 1);
    (0..=from).rev().find(|&index| type_of(index) == header_type)
}
