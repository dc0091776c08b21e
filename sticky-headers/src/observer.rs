use alloc::rc::{Rc, Weak};
use core::cell::{Cell, RefCell};
use core::fmt;

use crate::{StickyHeaderSurface, StructuralChange};

/// A header surface that can be reset outside of a frame.
pub(crate) trait ResetTarget {
    /// Returns `false` if the surface is currently borrowed.
    fn reset_now(&self) -> bool;
}

impl<S: StickyHeaderSurface> ResetTarget for RefCell<S> {
    fn reset_now(&self) -> bool {
        match self.try_borrow_mut() {
            Ok(mut surface) => {
                surface.reset();
                true
            }
            Err(_) => false,
        }
    }
}

#[derive(Default)]
struct Listener {
    pending: Cell<u32>,
    missed_reset: Cell<bool>,
    target: RefCell<Option<Weak<dyn ResetTarget>>>,
}

/// The listener half of a data-source subscription.
///
/// A [`crate::StickyHeaders`] hands a clone of its observer to [`crate::DataSource::subscribe`].
/// The data source calls [`ChangeObserver::notify`] whenever its structure changes. Every
/// notification resets the header surface right away; the cached header is re-verified on the
/// next frame.
///
/// The observer only holds a weak handle to the surface. Once the state machine moves on to
/// another data source, notifications from the old one no longer reach it.
///
/// The observer is `!Send`: notifications must arrive on the thread that draws the list.
#[derive(Clone, Default)]
pub struct ChangeObserver {
    listener: Rc<Listener>,
}

impl ChangeObserver {
    /// An observer that is not connected to any surface. Notifications are only counted.
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn connected(target: Weak<dyn ResetTarget>) -> Self {
        let observer = Self::new();
        *observer.listener.target.borrow_mut() = Some(target);
        observer
    }

    #[cfg_attr(not(feature = "tracing"), allow(unused_variables))]
    pub fn notify(&self, change: StructuralChange) {
        vtrace!(?change, "ChangeObserver::notify");
        let listener = &self.listener;
        listener
            .pending
            .set(listener.pending.get().saturating_add(1));

        let target = listener.target.borrow().as_ref().and_then(Weak::upgrade);
        if let Some(target) = target {
            if !target.reset_now() {
                vdebug!("ChangeObserver::notify: surface borrowed, reset on the next frame");
                listener.missed_reset.set(true);
            }
        }
    }

    /// Number of notifications not yet seen by a frame.
    pub fn pending(&self) -> u32 {
        self.listener.pending.get()
    }

    pub fn has_pending(&self) -> bool {
        self.listener.pending.get() > 0
    }

    /// Returns `true` while notifications reach a live header surface.
    pub fn is_connected(&self) -> bool {
        self.listener
            .target
            .borrow()
            .as_ref()
            .is_some_and(|target| target.strong_count() > 0)
    }

    /// Returns `true` if both handles feed the same listener.
    pub fn same_listener(&self, other: &ChangeObserver) -> bool {
        Rc::ptr_eq(&self.listener, &other.listener)
    }

    pub(crate) fn take_pending(&self) -> u32 {
        self.listener.pending.replace(0)
    }

    pub(crate) fn take_missed_reset(&self) -> bool {
        self.listener.missed_reset.replace(false)
    }

    /// Stops forwarding notifications to the surface, for every clone of this observer.
    pub(crate) fn disconnect(&self) {
        self.listener.target.borrow_mut().take();
    }
}

impl fmt::Debug for ChangeObserver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChangeObserver")
            .field("pending", &self.pending())
            .field("connected", &self.is_connected())
            .finish()
    }
}
