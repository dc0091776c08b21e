use alloc::rc::{Rc, Weak};
use alloc::vec::Vec;
use core::cell::{Ref, RefCell, RefMut};

use crate::observer::ResetTarget;
use crate::resolver::find_header_at_or_before;
use crate::{
    CachedHeader, ChangeObserver, DataSource, FrameOutcome, LayoutOracle, PinState, Point,
    ProbePolicy, SourceId, StickyHeaderSurface, StickyOptions, StickySnapshot, StructuralChange,
    SubscriptionId, Viewport,
};

/// A headless sticky header state machine.
///
/// This type is UI-agnostic:
/// - It owns the header surface but knows nothing about how it is drawn.
/// - Your adapter drives it by calling [`StickyHeaders::on_draw`] once per frame, with the
///   current data source and a layout oracle.
/// - Structural changes arrive through the [`ChangeObserver`] it subscribes on the data source,
///   or directly through [`StickyHeaders::on_structural_change`].
///
/// All calls must happen on the thread that draws the list. The surface must be `'static`
/// because the subscribed [`ChangeObserver`] keeps a weak handle to it.
#[derive(Debug)]
pub struct StickyHeaders<S> {
    options: StickyOptions,
    // Shared weakly with the subscribed observer, which resets it on structural changes.
    surface: Rc<RefCell<S>>,

    pin_state: PinState,
    cached: CachedHeader,
    cache_trusted: bool,
    pushed: Option<usize>,

    source: Option<SourceId>,
    subscription: Option<SubscriptionId>,
    stale_subscriptions: Vec<(SourceId, SubscriptionId)>,
    observer: ChangeObserver,
}

impl<S: StickyHeaderSurface + 'static> StickyHeaders<S> {
    /// Creates a state machine around `surface`, which must start hidden.
    pub fn new(options: StickyOptions, surface: S) -> Self {
        vdebug!(
            header_type = options.header_type,
            enabled = options.enabled,
            "StickyHeaders::new"
        );
        Self {
            options,
            surface: Rc::new(RefCell::new(surface)),
            pin_state: PinState::Unpinned,
            cached: CachedHeader::Uninitialized,
            cache_trusted: false,
            pushed: None,
            source: None,
            subscription: None,
            stale_subscriptions: Vec::new(),
            observer: ChangeObserver::new(),
        }
    }

    pub fn options(&self) -> &StickyOptions {
        &self.options
    }

    pub fn set_options(&mut self, options: StickyOptions) {
        let header_type_changed = self.options.header_type != options.header_type;
        self.options = options;
        vtrace!(
            header_type = self.options.header_type,
            enabled = self.options.enabled,
            "StickyHeaders::set_options"
        );

        if header_type_changed {
            self.cached = CachedHeader::Uninitialized;
            self.cache_trusted = false;
        }
        if !self.options.enabled {
            self.unpin();
        }
    }

    /// Clones the current options, applies `f`, then delegates to `set_options`.
    pub fn update_options(&mut self, f: impl FnOnce(&mut StickyOptions)) {
        let mut next = self.options.clone();
        f(&mut next);
        self.set_options(next);
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        if self.options.enabled == enabled {
            return;
        }
        self.update_options(|o| o.enabled = enabled);
    }

    /// Borrows the surface.
    ///
    /// A notification that arrives while the guard is held cannot reset the surface; the reset
    /// then runs at the start of the next frame.
    pub fn surface(&self) -> Ref<'_, S> {
        self.surface.borrow()
    }

    pub fn surface_mut(&mut self) -> RefMut<'_, S> {
        self.surface.borrow_mut()
    }

    pub fn pin_state(&self) -> PinState {
        self.pin_state
    }

    pub fn is_pinned(&self) -> bool {
        self.pin_state == PinState::Pinned
    }

    pub fn cached_header(&self) -> CachedHeader {
        self.cached
    }

    /// The header currently shown by the surface.
    pub fn pinned_header(&self) -> Option<usize> {
        if self.is_pinned() {
            self.cached.index()
        } else {
            None
        }
    }

    /// The data source observed by the last frame.
    pub fn source(&self) -> Option<SourceId> {
        self.source
    }

    pub fn subscription(&self) -> Option<SubscriptionId> {
        self.subscription
    }

    /// The listener currently subscribed on the attached data source.
    pub fn observer(&self) -> &ChangeObserver {
        &self.observer
    }

    pub fn snapshot(&self) -> StickySnapshot {
        StickySnapshot {
            pin_state: self.pin_state,
            cached_header: self.cached,
            cache_trusted: self.cache_trusted,
            pushed_header: self.pushed,
            source: self.source,
        }
    }

    /// Returns subscriptions left behind on data sources that were replaced without
    /// [`StickyHeaders::detach`].
    ///
    /// The state machine cannot reach a replaced source; the host owns it and may unsubscribe
    /// these ids. Their observers are already disconnected from the surface.
    pub fn take_stale_subscriptions(&mut self) -> Vec<(SourceId, SubscriptionId)> {
        core::mem::take(&mut self.stale_subscriptions)
    }

    /// Unsubscribes from `source` and forgets all state tied to it.
    ///
    /// Call this before swapping data sources. Returns `false` if `source` is not the attached
    /// source.
    pub fn detach<D: DataSource + ?Sized>(&mut self, source: &mut D) -> bool {
        let id = source.source_id();
        if self.source != Some(id) {
            return false;
        }
        if let Some(subscription) = self.subscription.take() {
            source.unsubscribe(subscription);
        }
        vdebug!(?id, "StickyHeaders::detach");
        self.source = None;
        self.observer.disconnect();
        self.observer = ChangeObserver::new();
        self.reset_for_new_source();
        true
    }

    /// Runs the invalidation path for a structural change of the attached data source.
    ///
    /// The surface's transient state is reset immediately. The pinned state is kept: the next
    /// frame re-resolves the header with a full scan.
    #[cfg_attr(not(feature = "tracing"), allow(unused_variables))]
    pub fn on_structural_change(&mut self, change: StructuralChange) {
        vdebug!(?change, "StickyHeaders::on_structural_change");
        self.invalidate();
    }

    /// Per-frame update.
    ///
    /// `source == None` means the list has no data source yet; the frame is skipped.
    pub fn on_draw<D, L>(
        &mut self,
        source: Option<&mut D>,
        layout: &L,
        viewport: Viewport,
    ) -> FrameOutcome
    where
        D: DataSource + ?Sized,
        L: LayoutOracle + ?Sized,
    {
        let Some(source) = source else {
            if self.source.is_some() {
                vdebug!("StickyHeaders::on_draw: data source removed");
                self.forget_source();
            }
            return FrameOutcome::Skipped;
        };

        self.observe_source(source);

        let pending = self.observer.take_pending();
        if pending > 0 {
            vdebug!(pending, "StickyHeaders::on_draw: structural changes");
            if self.observer.take_missed_reset() {
                self.surface.borrow_mut().reset();
            }
            self.forget_verified();
        }

        if !self.options.enabled {
            self.unpin();
            return FrameOutcome::Skipped;
        }

        let item_count = source.item_count();
        if item_count == 0 {
            self.unpin();
            return FrameOutcome::Unpinned { probed: None };
        }

        let Some(probed) = self.probe(layout, viewport) else {
            vtrace!("StickyHeaders::on_draw: no item under probe");
            if self.is_pinned() && self.cached.index().is_none() {
                // Nothing confirms the pinned header after a swap or a header type change.
                self.unpin();
            }
            return FrameOutcome::NoItemUnderProbe;
        };
        if probed >= item_count {
            vwarn!(
                probed,
                item_count,
                "StickyHeaders::on_draw: layout reported an index beyond the data source"
            );
        }

        let header_type = self.options.header_type;
        let found =
            find_header_at_or_before(probed, item_count, |i| source.item_type(i), header_type);
        self.update_cache(found);

        match self.cached {
            CachedHeader::At(header) if probed >= header => {
                self.pin(header);
                vtrace!(probed, header, "StickyHeaders::on_draw: pinned");
                FrameOutcome::Pinned { header, probed }
            }
            _ => {
                self.unpin();
                vtrace!(probed, "StickyHeaders::on_draw: unpinned");
                FrameOutcome::Unpinned {
                    probed: Some(probed),
                }
            }
        }
    }

    fn probe<L: LayoutOracle + ?Sized>(&self, layout: &L, viewport: Viewport) -> Option<usize> {
        let x = viewport.center_x();
        match self.options.probe {
            ProbePolicy::SurfaceOffset => {
                let y = self.surface.borrow().vertical_offset();
                layout.item_under(Point::new(x, y))
            }
            ProbePolicy::SurfaceBottom => {
                let y = {
                    let surface = self.surface.borrow();
                    surface.vertical_offset() + surface.height()
                };
                layout.item_under(Point::new(x, y))
            }
            ProbePolicy::FirstVisible => layout.first_visible_index(),
            ProbePolicy::FirstCompletelyVisible => layout.first_completely_visible_index(),
        }
    }

    fn update_cache(&mut self, found: Option<usize>) {
        match found {
            Some(header) => {
                if self.cached != CachedHeader::At(header) {
                    vdebug!(header, prev = ?self.cached, "StickyHeaders: header resolved");
                    self.cached = CachedHeader::At(header);
                }
            }
            // With a verified cache this only happens while scrolled above the cached header,
            // which unpins anyway. Without one, nothing is left to pin.
            None if !self.cache_trusted => self.cached = CachedHeader::NotFound,
            None => {}
        }
        self.cache_trusted = true;
    }

    fn pin(&mut self, header: usize) {
        if self.pin_state == PinState::Unpinned {
            vdebug!(header, "StickyHeaders: pin");
            self.pin_state = PinState::Pinned;
            self.surface.borrow_mut().set_visible(true);
        }
        if self.pushed != Some(header) {
            self.surface.borrow_mut().push_data(header);
            self.pushed = Some(header);
        }
    }

    fn unpin(&mut self) {
        if self.pin_state == PinState::Unpinned {
            return;
        }
        vdebug!("StickyHeaders: unpin");
        self.pin_state = PinState::Unpinned;
        self.pushed = None;
        let mut surface = self.surface.borrow_mut();
        surface.reset();
        surface.set_visible(false);
    }

    fn invalidate(&mut self) {
        self.surface.borrow_mut().reset();
        self.forget_verified();
    }

    fn forget_verified(&mut self) {
        self.cache_trusted = false;
        // The header's content may have changed even if its index did not.
        self.pushed = None;
    }

    fn observe_source<D: DataSource + ?Sized>(&mut self, source: &mut D) {
        let id = source.source_id();
        if self.source == Some(id) {
            return;
        }
        if self.source.is_some() {
            vwarn!(
                prev = ?self.source,
                next = ?id,
                "StickyHeaders: data source replaced without detach"
            );
            self.retire_subscription();
            // Stay pinned for now: this frame either re-pins from a fresh scan or unpins.
            self.cached = CachedHeader::Uninitialized;
            self.forget_verified();
        }

        self.observer = ChangeObserver::connected(self.reset_target());
        self.subscription = Some(source.subscribe(self.observer.clone()));
        self.source = Some(id);
        vdebug!(?id, subscription = ?self.subscription, "StickyHeaders: attached");
    }

    fn forget_source(&mut self) {
        self.retire_subscription();
        self.reset_for_new_source();
    }

    fn retire_subscription(&mut self) {
        if let (Some(prev), Some(subscription)) = (self.source, self.subscription.take()) {
            self.stale_subscriptions.push((prev, subscription));
        }
        self.source = None;
        self.observer.disconnect();
        self.observer = ChangeObserver::new();
    }

    fn reset_target(&self) -> Weak<dyn ResetTarget> {
        let target: Weak<RefCell<S>> = Rc::downgrade(&self.surface);
        target
    }

    fn reset_for_new_source(&mut self) {
        self.unpin();
        self.cached = CachedHeader::Uninitialized;
        self.cache_trusted = false;
        self.pushed = None;
    }
}
