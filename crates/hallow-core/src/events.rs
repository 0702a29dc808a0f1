//! Events this engine produces, and the bus that fans them out.

use std::fmt;

use hallow_types::{PlayerId, SiteId};

use crate::host::SubscriptionId;

/// A player crossed a holy-site boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SiteAreaEvent {
    /// The player moved into (or logged in inside) a site.
    Entered {
        /// The player.
        player: PlayerId,
        /// The site entered.
        site: SiteId,
    },
    /// The player left a site, including by disconnecting.
    Exited {
        /// The player.
        player: PlayerId,
        /// The site left.
        site: SiteId,
    },
}

impl SiteAreaEvent {
    /// The player this event concerns.
    pub const fn player(&self) -> PlayerId {
        match self {
            Self::Entered { player, .. } | Self::Exited { player, .. } => *player,
        }
    }

    /// The site this event concerns.
    pub const fn site(&self) -> SiteId {
        match self {
            Self::Entered { site, .. } | Self::Exited { site, .. } => *site,
        }
    }
}

type Listener<E> = Box<dyn FnMut(&E)>;

/// Synchronous in-process publish/subscribe.
///
/// Listeners run in subscription order on the publishing call.
pub struct EventBus<E> {
    next_id: u64,
    listeners: Vec<(SubscriptionId, Listener<E>)>,
}

impl<E> EventBus<E> {
    /// An empty bus.
    pub const fn new() -> Self {
        Self {
            next_id: 0,
            listeners: Vec::new(),
        }
    }

    /// Register a listener.
    pub fn subscribe(&mut self, listener: impl FnMut(&E) + 'static) -> SubscriptionId {
        self.next_id = self.next_id.saturating_add(1);
        let id = SubscriptionId(self.next_id);
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Remove a listener. Returns `false` if it was not registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(sid, _)| *sid != id);
        self.listeners.len() != before
    }

    /// Deliver `event` to every listener. Returns how many received it.
    pub fn publish(&mut self, event: &E) -> usize {
        for (_, listener) in &mut self.listeners {
            listener(event);
        }
        self.listeners.len()
    }

    /// Drop all listeners.
    pub fn clear(&mut self) {
        self.listeners.clear();
    }

    /// Number of live listeners.
    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    /// Whether the bus has no listeners.
    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}

impl<E> Default for EventBus<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> fmt::Debug for EventBus<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}
