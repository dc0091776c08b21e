use crate::*;

use alloc::vec::Vec;
use core::cell::Cell;

const ITEM: ItemType = 0;
const HEADER: ItemType = 1;

#[derive(Clone, Copy, Debug)]
struct Lcg(u64);

impl Lcg {
    fn new(seed: u64) -> Self {
        Self(seed)
    }

    fn next_u64(&mut self) -> u64 {
        // Deterministic, dependency-free PRNG for tests.
        self.0 = self
            .0
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        self.0
    }

    fn gen_range_usize(&mut self, start: usize, end_exclusive: usize) -> usize {
        debug_assert!(start < end_exclusive);
        let span = (end_exclusive - start) as u64;
        start + (self.next_u64() % span) as usize
    }

    fn gen_ratio(&mut self, num: u64, den: u64) -> bool {
        self.next_u64() % den < num
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum SurfaceCall {
    Visible(bool),
    Push(usize),
    Reset,
}

#[derive(Debug, Default)]
struct RecordingSurface {
    calls: Vec<SurfaceCall>,
    visible: bool,
    offset: f32,
    height: f32,
}

impl RecordingSurface {
    fn take_calls(&mut self) -> Vec<SurfaceCall> {
        core::mem::take(&mut self.calls)
    }
}

impl StickyHeaderSurface for RecordingSurface {
    fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
        self.calls.push(SurfaceCall::Visible(visible));
    }

    fn push_data(&mut self, header_index: usize) {
        self.calls.push(SurfaceCall::Push(header_index));
    }

    fn reset(&mut self) {
        self.calls.push(SurfaceCall::Reset);
    }

    fn height(&self) -> f32 {
        self.height
    }

    fn vertical_offset(&self) -> f32 {
        self.offset
    }
}

struct VecSource {
    id: SourceId,
    types: Vec<ItemType>,
    observers: Vec<(SubscriptionId, ChangeObserver)>,
    next_subscription: u64,
    type_queries: Cell<usize>,
}

impl VecSource {
    fn with_headers(id: u64, count: usize, headers: &[usize]) -> Self {
        let types = (0..count)
            .map(|i| if headers.contains(&i) { HEADER } else { ITEM })
            .collect();
        Self {
            id: SourceId(id),
            types,
            observers: Vec::new(),
            next_subscription: 0,
            type_queries: Cell::new(0),
        }
    }

    fn emit(&self, change: StructuralChange) {
        for (_, observer) in &self.observers {
            observer.notify(change);
        }
    }

    fn insert(&mut self, at: usize, item_type: ItemType) {
        self.types.insert(at, item_type);
        self.emit(StructuralChange::Inserted {
            start: at,
            count: 1,
        });
    }

    fn take_queries(&self) -> usize {
        self.type_queries.replace(0)
    }
}

impl DataSource for VecSource {
    fn source_id(&self) -> SourceId {
        self.id
    }

    fn item_count(&self) -> usize {
        self.types.len()
    }

    fn item_type(&self, index: usize) -> ItemType {
        self.type_queries.set(self.type_queries.get() + 1);
        self.types[index]
    }

    fn subscribe(&mut self, observer: ChangeObserver) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.observers.push((id, observer));
        id
    }

    fn unsubscribe(&mut self, subscription: SubscriptionId) {
        self.observers.retain(|(id, _)| *id != subscription);
    }
}

#[derive(Default)]
struct FixedProbe {
    under: Option<usize>,
    first_visible: Option<usize>,
    first_completely_visible: Option<usize>,
    last_point: Cell<Option<Point>>,
}

impl FixedProbe {
    fn at(index: usize) -> Self {
        Self {
            under: Some(index),
            ..Self::default()
        }
    }

    fn gap() -> Self {
        Self::default()
    }
}

impl LayoutOracle for FixedProbe {
    fn item_under(&self, point: Point) -> Option<usize> {
        self.last_point.set(Some(point));
        self.under
    }

    fn first_visible_index(&self) -> Option<usize> {
        self.first_visible
    }

    fn first_completely_visible_index(&self) -> Option<usize> {
        self.first_completely_visible
    }
}

fn viewport() -> Viewport {
    Viewport::new(100.0, 400.0)
}

fn sticky() -> StickyHeaders<RecordingSurface> {
    StickyHeaders::new(StickyOptions::new(HEADER), RecordingSurface::default())
}

fn draw(
    s: &mut StickyHeaders<RecordingSurface>,
    source: &mut VecSource,
    probed: Option<usize>,
) -> FrameOutcome {
    let probe = FixedProbe {
        under: probed,
        ..FixedProbe::default()
    };
    s.on_draw(Some(source), &probe, viewport())
}

#[test]
fn resolver_finds_nearest_header_at_or_before() {
    let types = [HEADER, ITEM, ITEM, ITEM, HEADER, ITEM, ITEM, HEADER, ITEM, ITEM];
    let type_of = |i: usize| types[i];

    assert_eq!(find_header_at_or_before(0, 10, type_of, HEADER), Some(0));
    assert_eq!(find_header_at_or_before(3, 10, type_of, HEADER), Some(0));
    assert_eq!(find_header_at_or_before(4, 10, type_of, HEADER), Some(4));
    assert_eq!(find_header_at_or_before(6, 10, type_of, HEADER), Some(4));
    assert_eq!(find_header_at_or_before(9, 10, type_of, HEADER), Some(7));
    // Past the end clamps to the last item.
    assert_eq!(find_header_at_or_before(42, 10, type_of, HEADER), Some(7));
    // A type scheme without the header type finds nothing.
    assert_eq!(find_header_at_or_before(9, 10, type_of, 5), None);
}

#[test]
fn resolver_skips_type_queries_for_empty_lists() {
    let mut queried = false;
    let found = find_header_at_or_before(
        3,
        0,
        |_| {
            queried = true;
            HEADER
        },
        HEADER,
    );
    assert_eq!(found, None);
    assert!(!queried);
}

#[test]
fn resolver_matches_max_header_leq_from_randomized() {
    let mut rng = Lcg::new(0x5eed);
    for _ in 0..200 {
        let count = rng.gen_range_usize(1, 64);
        let types: Vec<ItemType> = (0..count)
            .map(|_| if rng.gen_ratio(1, 6) { HEADER } else { ITEM })
            .collect();
        let from = rng.gen_range_usize(0, count);

        let expected = (0..=from).filter(|&i| types[i] == HEADER).max();
        let got = find_header_at_or_before(from, count, |i| types[i], HEADER);
        assert_eq!(got, expected, "types={types:?} from={from}");
    }
}

#[test]
fn scrolling_through_groups_pins_the_current_header() {
    let mut source = VecSource::with_headers(1, 10, &[0, 4, 7]);
    let mut s = sticky();

    assert_eq!(
        draw(&mut s, &mut source, Some(5)),
        FrameOutcome::Pinned {
            header: 4,
            probed: 5
        }
    );
    assert_eq!(
        s.surface_mut().take_calls(),
        [SurfaceCall::Visible(true), SurfaceCall::Push(4)]
    );

    assert_eq!(
        draw(&mut s, &mut source, Some(3)),
        FrameOutcome::Pinned {
            header: 0,
            probed: 3
        }
    );
    assert_eq!(s.surface_mut().take_calls(), [SurfaceCall::Push(0)]);

    assert_eq!(
        draw(&mut s, &mut source, Some(8)),
        FrameOutcome::Pinned {
            header: 7,
            probed: 8
        }
    );
    assert_eq!(s.surface_mut().take_calls(), [SurfaceCall::Push(7)]);
    assert_eq!(s.pinned_header(), Some(7));
    assert!(s.surface().visible);
}

#[test]
fn probing_above_the_first_header_unpins_once() {
    let mut source = VecSource::with_headers(1, 10, &[3, 6]);
    let mut s = sticky();

    // Already unpinned: nothing to hide.
    assert_eq!(
        draw(&mut s, &mut source, Some(1)),
        FrameOutcome::Unpinned { probed: Some(1) }
    );
    assert!(s.surface_mut().take_calls().is_empty());
    assert_eq!(s.cached_header(), CachedHeader::NotFound);

    assert!(draw(&mut s, &mut source, Some(7)).is_pinned());
    s.surface_mut().take_calls();

    assert_eq!(
        draw(&mut s, &mut source, Some(1)),
        FrameOutcome::Unpinned { probed: Some(1) }
    );
    assert_eq!(
        s.surface_mut().take_calls(),
        [SurfaceCall::Reset, SurfaceCall::Visible(false)]
    );
    assert_eq!(s.pin_state(), PinState::Unpinned);
    assert!(!s.surface().visible);

    // The edge already fired.
    draw(&mut s, &mut source, Some(2));
    assert!(s.surface_mut().take_calls().is_empty());
}

#[test]
fn repeated_frames_with_unchanged_inputs_are_idempotent() {
    let mut source = VecSource::with_headers(1, 10, &[0, 4, 7]);
    let mut s = sticky();

    draw(&mut s, &mut source, Some(5));
    s.surface_mut().take_calls();
    let settled = s.snapshot();

    for _ in 0..3 {
        draw(&mut s, &mut source, Some(5));
        assert!(s.surface_mut().take_calls().is_empty());
        assert_eq!(s.snapshot(), settled);
    }
}

#[test]
fn probe_between_items_leaves_state_untouched() {
    let mut source = VecSource::with_headers(1, 10, &[0, 4, 7]);
    let mut s = sticky();

    draw(&mut s, &mut source, Some(5));
    s.surface_mut().take_calls();
    let before = s.snapshot();

    let outcome = s.on_draw(Some(&mut source), &FixedProbe::gap(), viewport());
    assert_eq!(outcome, FrameOutcome::NoItemUnderProbe);
    assert_eq!(s.snapshot(), before);
    assert!(s.surface_mut().take_calls().is_empty());
    assert!(s.surface().visible);
}

#[test]
fn empty_source_stays_unpinned_without_scanning() {
    let mut source = VecSource::with_headers(1, 0, &[]);
    let mut s = sticky();

    for _ in 0..3 {
        assert_eq!(
            draw(&mut s, &mut source, Some(0)),
            FrameOutcome::Unpinned { probed: None }
        );
    }
    assert_eq!(source.take_queries(), 0);
    assert!(s.surface_mut().take_calls().is_empty());
}

#[test]
fn clearing_the_list_unpins_on_the_next_frame() {
    let mut source = VecSource::with_headers(1, 10, &[0, 4, 7]);
    let mut s = sticky();
    draw(&mut s, &mut source, Some(5));
    s.surface_mut().take_calls();

    source.types.clear();
    source.emit(StructuralChange::DataSetChanged);

    assert_eq!(
        draw(&mut s, &mut source, Some(5)),
        FrameOutcome::Unpinned { probed: None }
    );
    assert_eq!(
        s.surface_mut().take_calls(),
        [
            SurfaceCall::Reset,
            SurfaceCall::Reset,
            SurfaceCall::Visible(false)
        ]
    );
}

#[test]
fn insert_resets_surface_once_before_the_next_decision() {
    let mut source = VecSource::with_headers(1, 10, &[0, 4, 7]);
    let mut s = sticky();
    draw(&mut s, &mut source, Some(5));
    s.surface_mut().take_calls();

    source.insert(0, ITEM);
    assert!(s.observer().has_pending());
    assert_eq!(s.surface_mut().take_calls(), [SurfaceCall::Reset]);
    assert!(s.is_pinned());

    // Item 5 moved to 6; its header moved from 4 to 5.
    assert_eq!(
        draw(&mut s, &mut source, Some(6)),
        FrameOutcome::Pinned {
            header: 5,
            probed: 6
        }
    );
    assert_eq!(s.surface_mut().take_calls(), [SurfaceCall::Push(5)]);
    assert!(!s.observer().has_pending());
}

#[test]
fn every_notification_resets_the_surface_when_it_arrives() {
    let mut source = VecSource::with_headers(1, 10, &[0, 4, 7]);
    let mut s = sticky();
    draw(&mut s, &mut source, Some(5));
    s.surface_mut().take_calls();

    source.insert(10, ITEM);
    assert_eq!(s.surface_mut().take_calls(), [SurfaceCall::Reset]);
    source.insert(11, ITEM);
    source.emit(StructuralChange::Changed { start: 3, count: 1 });
    assert_eq!(
        s.surface_mut().take_calls(),
        [SurfaceCall::Reset, SurfaceCall::Reset]
    );
    assert_eq!(s.observer().pending(), 3);

    // The outcome is unchanged, but the header is re-bound without another reset.
    assert!(draw(&mut s, &mut source, Some(5)).is_pinned());
    assert_eq!(s.surface_mut().take_calls(), [SurfaceCall::Push(4)]);
}

#[test]
fn notification_while_the_surface_is_borrowed_resets_on_the_next_frame() {
    let mut source = VecSource::with_headers(1, 10, &[0, 4, 7]);
    let mut s = sticky();
    draw(&mut s, &mut source, Some(5));
    s.surface_mut().take_calls();

    {
        let surface = s.surface();
        source.insert(10, ITEM);
        assert!(surface.calls.is_empty());
    }
    assert!(s.surface_mut().take_calls().is_empty());

    assert!(draw(&mut s, &mut source, Some(5)).is_pinned());
    assert_eq!(
        s.surface_mut().take_calls(),
        [SurfaceCall::Reset, SurfaceCall::Push(4)]
    );
}

#[test]
fn observers_outliving_the_state_machine_are_inert() {
    let mut source = VecSource::with_headers(1, 10, &[0, 4, 7]);
    {
        let mut s = sticky();
        draw(&mut s, &mut source, Some(5));
        assert!(source.observers[0].1.is_connected());
    }
    assert!(!source.observers[0].1.is_connected());
    source.insert(0, ITEM);
    assert_eq!(source.observers[0].1.pending(), 1);
}

#[test]
fn structural_change_does_not_unpin_immediately() {
    let mut source = VecSource::with_headers(1, 10, &[0, 4, 7]);
    let mut s = sticky();
    draw(&mut s, &mut source, Some(5));
    s.surface_mut().take_calls();

    s.on_structural_change(StructuralChange::Changed { start: 2, count: 1 });
    assert_eq!(s.surface_mut().take_calls(), [SurfaceCall::Reset]);
    assert!(s.is_pinned());
    assert!(s.surface().visible);
    assert!(!s.snapshot().cache_trusted);
}

#[test]
fn removing_every_header_unpins_instead_of_trusting_the_cache() {
    let mut source = VecSource::with_headers(1, 10, &[0, 4, 7]);
    let mut s = sticky();
    draw(&mut s, &mut source, Some(5));
    s.surface_mut().take_calls();

    for t in source.types.iter_mut() {
        *t = ITEM;
    }
    source.emit(StructuralChange::Changed {
        start: 0,
        count: 10,
    });

    assert_eq!(
        draw(&mut s, &mut source, Some(5)),
        FrameOutcome::Unpinned { probed: Some(5) }
    );
    assert_eq!(s.cached_header(), CachedHeader::NotFound);
    assert_eq!(
        s.surface_mut().take_calls(),
        [
            SurfaceCall::Reset,
            SurfaceCall::Reset,
            SurfaceCall::Visible(false)
        ]
    );
}

#[test]
fn swapping_sources_resets_the_cache_and_rescans() {
    let mut a = VecSource::with_headers(1, 10, &[0, 4, 7]);
    let mut s = sticky();
    draw(&mut s, &mut a, Some(9));
    assert_eq!(s.cached_header(), CachedHeader::At(7));
    s.surface_mut().take_calls();

    let mut b = VecSource::with_headers(2, 10, &[2]);
    assert_eq!(
        draw(&mut s, &mut b, Some(9)),
        FrameOutcome::Pinned {
            header: 2,
            probed: 9
        }
    );
    // Full scan: 9, 8, ..., 2.
    assert_eq!(b.take_queries(), 8);
    // Re-pinned in the same frame: the overlay stays up and is re-bound.
    assert_eq!(s.surface_mut().take_calls(), [SurfaceCall::Push(2)]);
    assert_eq!(s.source(), Some(SourceId(2)));
    assert_eq!(b.observers.len(), 1);
    assert!(!a.observers[0].1.is_connected());

    // The old subscription is handed back to the host.
    let stale = s.take_stale_subscriptions();
    assert_eq!(stale, [(SourceId(1), SubscriptionId(0))]);
    for (_, subscription) in stale {
        a.unsubscribe(subscription);
    }
    assert!(a.observers.is_empty());
}

#[test]
fn swapping_to_a_source_without_headers_unpins() {
    let mut a = VecSource::with_headers(1, 10, &[0, 4, 7]);
    let mut s = sticky();
    draw(&mut s, &mut a, Some(9));
    s.surface_mut().take_calls();

    let mut b = VecSource::with_headers(2, 10, &[]);
    assert_eq!(
        draw(&mut s, &mut b, Some(9)),
        FrameOutcome::Unpinned { probed: Some(9) }
    );
    assert_eq!(s.cached_header(), CachedHeader::NotFound);
    assert_eq!(b.take_queries(), 10);
    assert_eq!(
        s.surface_mut().take_calls(),
        [SurfaceCall::Reset, SurfaceCall::Visible(false)]
    );
}

#[test]
fn swapping_sources_with_nothing_under_the_probe_unpins() {
    let mut a = VecSource::with_headers(1, 10, &[0, 4, 7]);
    let mut s = sticky();
    draw(&mut s, &mut a, Some(5));
    s.surface_mut().take_calls();

    let mut b = VecSource::with_headers(2, 10, &[0, 4, 7]);
    let outcome = s.on_draw(Some(&mut b), &FixedProbe::gap(), viewport());
    assert_eq!(outcome, FrameOutcome::NoItemUnderProbe);
    assert_eq!(s.pin_state(), PinState::Unpinned);
    assert_eq!(s.cached_header(), CachedHeader::Uninitialized);
    assert_eq!(
        s.surface_mut().take_calls(),
        [SurfaceCall::Reset, SurfaceCall::Visible(false)]
    );
}

#[test]
fn notifications_from_a_replaced_source_are_ignored() {
    let mut a = VecSource::with_headers(1, 10, &[0, 4, 7]);
    let mut b = VecSource::with_headers(2, 10, &[0, 4, 7]);
    let mut s = sticky();
    draw(&mut s, &mut a, Some(5));
    draw(&mut s, &mut b, Some(5));
    s.surface_mut().take_calls();

    a.insert(0, HEADER);
    assert!(s.surface_mut().take_calls().is_empty());
    assert!(!s.observer().has_pending());
    assert!(!a.observers[0].1.same_listener(s.observer()));

    draw(&mut s, &mut b, Some(5));
    assert!(s.surface_mut().take_calls().is_empty());
}

#[test]
fn detach_unsubscribes_and_forgets_state() {
    let mut a = VecSource::with_headers(1, 10, &[0, 4, 7]);
    let mut other = VecSource::with_headers(9, 3, &[0]);
    let mut s = sticky();
    draw(&mut s, &mut a, Some(5));
    s.surface_mut().take_calls();

    assert!(!s.detach(&mut other));
    assert!(s.detach(&mut a));
    assert!(a.observers.is_empty());
    assert!(s.take_stale_subscriptions().is_empty());
    assert_eq!(
        s.snapshot(),
        StickySnapshot {
            pin_state: PinState::Unpinned,
            cached_header: CachedHeader::Uninitialized,
            cache_trusted: false,
            pushed_header: None,
            source: None,
        }
    );
    assert_eq!(
        s.surface_mut().take_calls(),
        [SurfaceCall::Reset, SurfaceCall::Visible(false)]
    );
}

#[test]
fn frames_without_a_source_are_skipped() {
    let mut s = sticky();
    let outcome = s.on_draw(None::<&mut VecSource>, &FixedProbe::at(3), viewport());
    assert_eq!(outcome, FrameOutcome::Skipped);
    assert_eq!(s.snapshot(), StickySnapshot::default());
    assert!(s.surface_mut().take_calls().is_empty());
}

#[test]
fn losing_the_source_unpins_and_reports_the_subscription() {
    let mut a = VecSource::with_headers(1, 10, &[0, 4, 7]);
    let mut s = sticky();
    draw(&mut s, &mut a, Some(5));
    s.surface_mut().take_calls();

    let outcome = s.on_draw(None::<&mut VecSource>, &FixedProbe::at(5), viewport());
    assert_eq!(outcome, FrameOutcome::Skipped);
    assert_eq!(
        s.surface_mut().take_calls(),
        [SurfaceCall::Reset, SurfaceCall::Visible(false)]
    );
    assert_eq!(
        s.take_stale_subscriptions(),
        [(SourceId(1), SubscriptionId(0))]
    );
    assert_eq!(s.source(), None);
}

#[test]
fn disabling_hides_the_surface_and_skips_frames() {
    let mut source = VecSource::with_headers(1, 10, &[0, 4, 7]);
    let mut s = sticky();
    draw(&mut s, &mut source, Some(5));
    s.surface_mut().take_calls();
    source.take_queries();

    s.set_enabled(false);
    assert_eq!(
        s.surface_mut().take_calls(),
        [SurfaceCall::Reset, SurfaceCall::Visible(false)]
    );
    assert_eq!(draw(&mut s, &mut source, Some(5)), FrameOutcome::Skipped);
    assert_eq!(source.take_queries(), 0);

    s.set_enabled(true);
    assert!(draw(&mut s, &mut source, Some(5)).is_pinned());
}

#[test]
fn changing_the_header_type_resolves_against_the_new_type() {
    let mut source = VecSource::with_headers(1, 10, &[0, 4, 7]);
    source.types[2] = 7;
    let mut s = sticky();
    draw(&mut s, &mut source, Some(5));
    assert_eq!(s.pinned_header(), Some(4));

    s.update_options(|o| o.header_type = 7);
    assert_eq!(s.cached_header(), CachedHeader::Uninitialized);
    assert_eq!(
        draw(&mut s, &mut source, Some(5)),
        FrameOutcome::Pinned {
            header: 2,
            probed: 5
        }
    );
}

#[test]
fn mismatched_header_type_never_pins() {
    let mut source = VecSource::with_headers(1, 10, &[0, 4, 7]);
    let mut s = StickyHeaders::new(StickyOptions::new(42), RecordingSurface::default());
    assert_eq!(
        draw(&mut s, &mut source, Some(9)),
        FrameOutcome::Unpinned { probed: Some(9) }
    );
    assert_eq!(s.cached_header(), CachedHeader::NotFound);
}

#[test]
fn probe_policies_sample_the_expected_point() {
    let mut source = VecSource::with_headers(1, 10, &[0, 4, 7]);
    let surface = RecordingSurface {
        offset: 12.0,
        height: 30.0,
        ..RecordingSurface::default()
    };
    let mut s = StickyHeaders::new(StickyOptions::new(HEADER), surface);
    let probe = FixedProbe {
        under: Some(5),
        first_visible: Some(8),
        first_completely_visible: Some(3),
        ..FixedProbe::default()
    };

    assert!(s.on_draw(Some(&mut source), &probe, viewport()).is_pinned());
    assert_eq!(probe.last_point.take(), Some(Point::new(50.0, 12.0)));

    s.update_options(|o| o.probe = ProbePolicy::SurfaceBottom);
    s.on_draw(Some(&mut source), &probe, viewport());
    assert_eq!(probe.last_point.take(), Some(Point::new(50.0, 42.0)));

    s.update_options(|o| o.probe = ProbePolicy::FirstVisible);
    assert_eq!(
        s.on_draw(Some(&mut source), &probe, viewport()),
        FrameOutcome::Pinned {
            header: 7,
            probed: 8
        }
    );
    assert_eq!(probe.last_point.take(), None);

    s.update_options(|o| o.probe = ProbePolicy::FirstCompletelyVisible);
    assert_eq!(
        s.on_draw(Some(&mut source), &probe, viewport()),
        FrameOutcome::Pinned {
            header: 0,
            probed: 3
        }
    );
}

#[test]
fn oracle_index_beyond_the_source_is_clamped() {
    let mut source = VecSource::with_headers(1, 10, &[0, 4, 7]);
    let mut s = sticky();
    assert_eq!(
        draw(&mut s, &mut source, Some(15)),
        FrameOutcome::Pinned {
            header: 7,
            probed: 15
        }
    );
}
