//! Delivery path from collectors to the presenter.
//!
//! Each snapshot kind has a single slot holding the latest undelivered
//! notification. Publishing overwrites the slot, so a presenter that falls
//! behind sees only the newest value of each kind and memory stays bounded.

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use log::{debug, trace};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use crate::shared::error::SubscribeError;
use crate::shared::snapshot::{Notification, SnapshotKind};
use crate::shared::traits::Presenter;

type Slot = Option<Arc<Notification>>;

/// Handler invoked on the presenter's context with the latest notification of one kind.
pub type Handler = Box<dyn FnMut(&Notification)>;

/// Thread-safe, latest-wins conduit from collectors to the presenter.
///
/// Cloning is cheap; all clones publish into the same slots.
#[derive(Clone)]
pub struct NotificationChannel {
    slots: Arc<[watch::Sender<Slot>; 4]>,
}

impl NotificationChannel {
    pub fn new() -> Self {
        let slots = SnapshotKind::ALL.map(|_| watch::Sender::new(None));
        Self {
            slots: Arc::new(slots),
        }
    }

    /// Replaces the slot of the notification's kind. Never waits on the presenter.
    pub fn publish(&self, notification: Notification) {
        let kind = notification.kind();
        let superseded = self.slots[kind.index()].send_replace(Some(Arc::new(notification)));
        trace!(
            "published {} notification (previous: {})",
            kind,
            if superseded.is_some() { "replaced" } else { "empty" }
        );
    }

    /// The most recently published notification of `kind`, delivered or not.
    pub fn latest(&self, kind: SnapshotKind) -> Option<Arc<Notification>> {
        self.slots[kind.index()].borrow().clone()
    }

    /// Creates the presenter-side endpoint.
    ///
    /// Only notifications published after this call are delivered to it.
    pub fn dispatcher(&self) -> Dispatcher {
        Dispatcher {
            receivers: SnapshotKind::ALL.map(|kind| self.slots[kind.index()].subscribe()),
            handlers: Default::default(),
            delivered: [0; 4],
        }
    }
}

impl Default for NotificationChannel {
    fn default() -> Self {
        Self::new()
    }
}

/// Presenter-side endpoint of a [`NotificationChannel`].
///
/// Not `Send`: it lives on the presenter's thread and calls its handlers there.
pub struct Dispatcher {
    receivers: [watch::Receiver<Slot>; 4],
    handlers: [Option<Handler>; 4],
    delivered: [u64; 4],
}

impl Dispatcher {
    /// Registers the one handler for `kind`.
    pub fn subscribe<F>(&mut self, kind: SnapshotKind, handler: F) -> Result<(), SubscribeError>
    where
        F: FnMut(&Notification) + 'static,
    {
        let slot = &mut self.handlers[kind.index()];
        if slot.is_some() {
            return Err(SubscribeError::AlreadySubscribed(kind));
        }
        *slot = Some(Box::new(handler));
        debug!("handler subscribed for {}", kind);
        Ok(())
    }

    /// Routes every kind to `presenter`. Registers nothing if any kind is already taken.
    pub fn subscribe_presenter<P>(&mut self, presenter: Rc<RefCell<P>>) -> Result<(), SubscribeError>
    where
        P: Presenter + ?Sized + 'static,
    {
        if let Some(taken) = SnapshotKind::ALL
            .into_iter()
            .find(|kind| self.handlers[kind.index()].is_some())
        {
            return Err(SubscribeError::AlreadySubscribed(taken));
        }

        for kind in SnapshotKind::ALL {
            let presenter = Rc::clone(&presenter);
            self.subscribe(kind, move |notification| {
                present(&mut *presenter.borrow_mut(), notification)
            })?;
        }
        Ok(())
    }

    /// Delivers whatever is pending without waiting. Returns the number of handler calls.
    pub fn dispatch_pending(&mut self) -> usize {
        let mut calls = 0;
        for kind in SnapshotKind::ALL {
            if matches!(self.receivers[kind.index()].has_changed(), Ok(true)) && self.deliver(kind) {
                calls += 1;
            }
        }
        calls
    }

    /// Waits for publications and delivers them until `shutdown` fires or every
    /// publisher is gone.
    pub async fn run(&mut self, shutdown: &CancellationToken) {
        debug!("dispatcher running");
        loop {
            let kind = {
                let [system, processes, services, tasks] = &mut self.receivers;
                tokio::select! {
                    _ = shutdown.cancelled() => break,
                    Ok(()) = system.changed() => SnapshotKind::System,
                    Ok(()) = processes.changed() => SnapshotKind::Processes,
                    Ok(()) = services.changed() => SnapshotKind::Services,
                    Ok(()) = tasks.changed() => SnapshotKind::Tasks,
                    else => break,
                }
            };
            self.deliver(kind);
        }
        debug!("dispatcher stopped after {} deliveries", self.delivered.iter().sum::<u64>());
    }

    /// Number of handler calls made so far for `kind`.
    pub fn delivered(&self, kind: SnapshotKind) -> u64 {
        self.delivered[kind.index()]
    }

    fn deliver(&mut self, kind: SnapshotKind) -> bool {
        // Clone the Arc out so the slot is not borrowed while the handler runs.
        let latest = self.receivers[kind.index()].borrow_and_update().clone();
        let Some(notification) = latest else {
            return false;
        };

        match self.handlers[kind.index()].as_mut() {
            Some(handler) => {
                handler(&notification);
                self.delivered[kind.index()] += 1;
                true
            }
            None => {
                trace!("no handler for {}, notification dropped", kind);
                false
            }
        }
    }
}

fn present<P: Presenter + ?Sized>(presenter: &mut P, notification: &Notification) {
    match notification {
        Notification::Snapshot(snapshot) => presenter.show_snapshot(snapshot),
        Notification::NoData { kind, error } => presenter.show_no_data(*kind, error),
    }
}
