//! Publish/subscribe dispatcher routed by [`EventKind`] masks.
//!
//! A handler is registered under a mask and fires for every published
//! message whose flags are a superset of that mask. Delivery is synchronous
//! on the publishing thread.
//!
//! # Subscriber Types
//!
//! - **Passive handlers**: observe the message and mutate the context.
//! - **Reactive handlers**: additionally return follow-up messages, which
//!   are published after the current message has reached every handler.
//!
//! # Context
//!
//! The dispatcher is generic over a context type `C` that every handler
//! receives mutably. The simulation-owning loop passes its state as the
//! context, so handlers mutate the economy without shared ownership.

use std::collections::VecDeque;

use crate::fixed::Ticks;
use crate::id::SubscriptionId;
use crate::input::{Key, MouseEvent, Size};
use crate::kind::EventKind;

/// Upper bound on follow-up messages produced while handling one publish.
/// Protects against reactive handlers that keep re-triggering each other.
pub const MAX_CASCADE: usize = 1024;

// ---------------------------------------------------------------------------
// Messages
// ---------------------------------------------------------------------------

/// Message payload. Which variant to expect is a convention of the flags.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Payload {
    #[default]
    None,
    Tick(Ticks),
    Resize(Size),
    Key(Key),
    Mouse(MouseEvent),
    Error(String),
    Text(String),
}

/// A flagged message routed by the [`Dispatcher`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub flags: EventKind,
    pub payload: Payload,
}

impl Message {
    pub fn new(flags: EventKind, payload: Payload) -> Self {
        Self { flags, payload }
    }

    /// A message with no payload.
    pub fn signal(flags: EventKind) -> Self {
        Self::new(flags, Payload::None)
    }

    pub fn tick(tick: Ticks) -> Self {
        Self::new(EventKind::TICK, Payload::Tick(tick))
    }

    pub fn quit() -> Self {
        Self::signal(EventKind::QUIT)
    }

    pub fn key(key: Key) -> Self {
        Self::new(EventKind::KEY, Payload::Key(key))
    }

    pub fn mouse(event: MouseEvent) -> Self {
        Self::new(EventKind::MOUSE, Payload::Mouse(event))
    }

    pub fn resize(width: u32, height: u32) -> Self {
        Self::new(EventKind::RESIZE, Payload::Resize(Size::new(width, height)))
    }

    pub fn error(detail: impl Into<String>) -> Self {
        Self::new(EventKind::ERROR, Payload::Error(detail.into()))
    }

    /// Whether the message belongs to every category in `kind`.
    pub fn is(&self, kind: EventKind) -> bool {
        self.flags.contains(kind)
    }

    pub fn as_tick(&self) -> Option<Ticks> {
        match self.payload {
            Payload::Tick(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_key(&self) -> Option<Key> {
        match self.payload {
            Payload::Key(k) => Some(k),
            _ => None,
        }
    }

    pub fn as_mouse(&self) -> Option<MouseEvent> {
        match self.payload {
            Payload::Mouse(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_resize(&self) -> Option<Size> {
        match self.payload {
            Payload::Resize(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match &self.payload {
            Payload::Text(s) | Payload::Error(s) => Some(s),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// A passive handler observes a message and may mutate the context.
pub type PassiveHandler<C> = Box<dyn FnMut(&mut C, &Message)>;

/// A reactive handler returns follow-up messages to publish once the
/// current message has been fully delivered.
pub type ReactiveHandler<C> = Box<dyn FnMut(&mut C, &Message) -> Vec<Message>>;

enum Handler<C> {
    Passive(PassiveHandler<C>),
    Reactive(ReactiveHandler<C>),
}

struct HandlerEntry<C> {
    id: SubscriptionId,
    handler: Handler<C>,
}

/// All handlers registered under one mask, in registration order.
struct Subscription<C> {
    mask: EventKind,
    handlers: Vec<HandlerEntry<C>>,
}

// ---------------------------------------------------------------------------
// Dispatcher
// ---------------------------------------------------------------------------

/// Mask-routed publish/subscribe dispatcher.
///
/// Subscriptions are scanned linearly on every publish. Masks are visited
/// in the order they were first registered; handlers under one mask run in
/// registration order.
pub struct Dispatcher<C = ()> {
    subscriptions: Vec<Subscription<C>>,
    next_id: u64,
    published: u64,
    deliveries: u64,
    dropped_cascade: u64,
}

impl<C> std::fmt::Debug for Dispatcher<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field(
                "masks",
                &self.subscriptions.iter().map(|s| s.mask).collect::<Vec<_>>(),
            )
            .field("handlers", &self.handler_count())
            .field("published", &self.published)
            .field("deliveries", &self.deliveries)
            .finish_non_exhaustive()
    }
}

impl<C> Default for Dispatcher<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> Dispatcher<C> {
    pub fn new() -> Self {
        Self {
            subscriptions: Vec::new(),
            next_id: 0,
            published: 0,
            deliveries: 0,
            dropped_cascade: 0,
        }
    }

    /// Register a passive handler for messages whose flags contain `mask`.
    pub fn subscribe<F>(&mut self, mask: EventKind, handler: F) -> SubscriptionId
    where
        F: FnMut(&mut C, &Message) + 'static,
    {
        self.insert(mask, Handler::Passive(Box::new(handler)))
    }

    /// Register a reactive handler for messages whose flags contain `mask`.
    pub fn subscribe_reactive<F>(&mut self, mask: EventKind, handler: F) -> SubscriptionId
    where
        F: FnMut(&mut C, &Message) -> Vec<Message> + 'static,
    {
        self.insert(mask, Handler::Reactive(Box::new(handler)))
    }

    fn insert(&mut self, mask: EventKind, handler: Handler<C>) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;

        let entry = HandlerEntry { id, handler };
        match self.subscriptions.iter_mut().find(|s| s.mask == mask) {
            Some(sub) => sub.handlers.push(entry),
            None => self.subscriptions.push(Subscription {
                mask,
                handlers: vec![entry],
            }),
        }
        id
    }

    /// Remove a handler. Returns `false` if the id is unknown.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let found = self.subscriptions.iter().enumerate().find_map(|(idx, sub)| {
            sub.handlers
                .iter()
                .position(|e| e.id == id)
                .map(|pos| (idx, pos))
        });
        let Some((idx, pos)) = found else {
            return false;
        };
        let sub = &mut self.subscriptions[idx];
        sub.handlers.remove(pos);
        if sub.handlers.is_empty() {
            self.subscriptions.remove(idx);
        }
        true
    }

    /// Deliver `message` to every handler whose mask it satisfies, then
    /// deliver any follow-ups returned by reactive handlers, oldest first.
    pub fn publish(&mut self, ctx: &mut C, message: Message) {
        let mut queue = VecDeque::from([message]);
        let mut cascade = 0usize;

        while let Some(message) = queue.pop_front() {
            self.published += 1;
            for sub in &mut self.subscriptions {
                if !message.flags.contains(sub.mask) {
                    continue;
                }
                for entry in &mut sub.handlers {
                    self.deliveries += 1;
                    match &mut entry.handler {
                        Handler::Passive(h) => h(ctx, &message),
                        Handler::Reactive(h) => {
                            for follow_up in h(ctx, &message) {
                                if cascade >= MAX_CASCADE {
                                    self.dropped_cascade += 1;
                                    tracing::warn!(
                                        flags = %follow_up.flags,
                                        "dropping follow-up message, cascade limit reached"
                                    );
                                    continue;
                                }
                                cascade += 1;
                                queue.push_back(follow_up);
                            }
                        }
                    }
                }
            }
        }
    }

    /// Whether any handler would fire for a message with these flags.
    pub fn has_subscribers(&self, flags: EventKind) -> bool {
        self.subscriptions
            .iter()
            .any(|s| flags.contains(s.mask) && !s.handlers.is_empty())
    }

    /// Total registered handlers across all masks.
    pub fn handler_count(&self) -> usize {
        self.subscriptions.iter().map(|s| s.handlers.len()).sum()
    }

    /// Number of distinct masks with at least one handler.
    pub fn mask_count(&self) -> usize {
        self.subscriptions.len()
    }

    /// Messages published so far, follow-ups included.
    pub fn published_count(&self) -> u64 {
        self.published
    }

    /// Handler invocations so far.
    pub fn delivery_count(&self) -> u64 {
        self.deliveries
    }

    /// Follow-up messages discarded because of [`MAX_CASCADE`].
    pub fn dropped_cascade_count(&self) -> u64 {
        self.dropped_cascade
    }
}

// ===========================================================================
// Tests
// ===========================================================================
