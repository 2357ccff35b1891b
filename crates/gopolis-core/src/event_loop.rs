//! Single-consumer event loop.
//!
//! Input producers (keyboard, mouse, resize, anything else) run on their
//! own threads and hold a [`Publisher`]. The loop owns the receiving end,
//! drains one message at a time and publishes it through the
//! [`Dispatcher`] on the thread that owns the context. Between messages it
//! publishes a tick whenever the tick interval has elapsed.

use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::time::{Duration, Instant};

use tracing::{debug, trace};

use crate::event::{Dispatcher, Message};
use crate::fixed::Ticks;
use crate::session::LoopControl;

/// The loop has shut down and no longer accepts messages.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("event loop has shut down")]
pub struct LoopClosed(pub Message);

/// Cloneable sending handle for producer threads.
#[derive(Debug, Clone)]
pub struct Publisher {
    tx: Sender<Message>,
}

impl Publisher {
    pub fn publish(&self, message: Message) -> Result<(), LoopClosed> {
        self.tx.send(message).map_err(|e| LoopClosed(e.0))
    }
}

/// Why [`EventLoop::run`] returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopExit {
    /// The context reported it stopped running.
    Stopped,
    /// Every publisher was dropped.
    Disconnected,
}

pub struct EventLoop<C> {
    dispatcher: Dispatcher<C>,
    rx: Receiver<Message>,
    tick_interval: Duration,
    ticks: Ticks,
}

impl<C> std::fmt::Debug for EventLoop<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventLoop")
            .field("dispatcher", &self.dispatcher)
            .field("tick_interval", &self.tick_interval)
            .field("ticks", &self.ticks)
            .finish_non_exhaustive()
    }
}

impl<C: LoopControl> EventLoop<C> {
    /// Create a loop and the first publisher for it.
    pub fn new(dispatcher: Dispatcher<C>, tick_interval: Duration) -> (Self, Publisher) {
        let (tx, rx) = mpsc::channel();
        let event_loop = Self {
            dispatcher,
            rx,
            tick_interval: tick_interval.max(Duration::from_millis(1)),
            ticks: 0,
        };
        (event_loop, Publisher { tx })
    }

    pub fn dispatcher(&self) -> &Dispatcher<C> {
        &self.dispatcher
    }

    pub fn dispatcher_mut(&mut self) -> &mut Dispatcher<C> {
        &mut self.dispatcher
    }

    /// Ticks published so far.
    pub fn ticks(&self) -> Ticks {
        self.ticks
    }

    /// Publish the next tick right away.
    pub fn tick(&mut self, ctx: &mut C) {
        self.ticks += 1;
        trace!(tick = self.ticks, "tick");
        self.dispatcher.publish(ctx, Message::tick(self.ticks));
    }

    /// Block until `ctx` stops or every publisher is gone.
    ///
    /// A stop takes effect before the next tick: the loop checks the
    /// context after every message.
    pub fn run(&mut self, ctx: &mut C) -> LoopExit {
        let mut next_tick = Instant::now() + self.tick_interval;

        while ctx.is_running() {
            let now = Instant::now();
            if now >= next_tick {
                self.tick(ctx);
                next_tick += self.tick_interval;
                if next_tick <= now {
                    // Fell behind: skip the missed ticks instead of bursting.
                    next_tick = now + self.tick_interval;
                }
                continue;
            }

            match self.rx.recv_timeout(next_tick - now) {
                Ok(message) => self.dispatcher.publish(ctx, message),
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => {
                    debug!("all publishers dropped");
                    return LoopExit::Disconnected;
                }
            }
        }
        debug!(ticks = self.ticks, "event loop stopped");
        LoopExit::Stopped
    }

    /// Publish everything already queued, without blocking or ticking.
    /// Returns how many messages were taken off the channel.
    pub fn run_until_idle(&mut self, ctx: &mut C) -> usize {
        let mut drained = 0;
        while ctx.is_running() {
            match self.rx.try_recv() {
                Ok(message) => {
                    drained += 1;
                    self.dispatcher.publish(ctx, message);
                }
                Err(TryRecvError::Empty | TryRecvError::Disconnected) => break,
            }
        }
        drained
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::Simulation;
    use crate::input::{Key, Size};
    use crate::kind::EventKind;
    use crate::session::{NullRenderer, Session};
    use crate::test_utils::gopher_town;

    fn session() -> Session {
        Session::new(Simulation::new(gopher_town(), 42), NullRenderer, Size::new(80, 25))
    }

    fn session_loop(interval: Duration) -> (EventLoop<Session>, Publisher) {
        let mut dispatcher = Dispatcher::new();
        Session::<NullRenderer>::install(&mut dispatcher);
        EventLoop::new(dispatcher, interval)
    }

    #[test]
    fn run_until_idle_drains_in_order() {
        let (mut el, publisher) = session_loop(Duration::from_secs(60));
        let mut s = session();

        publisher.publish(Message::key(Key::F(2))).unwrap();
        publisher.publish(Message::key(Key::F(3))).unwrap();
        assert_eq!(el.run_until_idle(&mut s), 2);
        assert_eq!(s.console(), "commercial mode");
        assert_eq!(el.run_until_idle(&mut s), 0);
    }

    #[test]
    fn quit_stops_draining() {
        let (mut el, publisher) = session_loop(Duration::from_secs(60));
        let mut s = session();

        publisher.publish(Message::key(Key::Esc)).unwrap();
        publisher.publish(Message::key(Key::F(4))).unwrap();
        assert_eq!(el.run_until_idle(&mut s), 1);
        assert!(!s.is_running());
        assert_eq!(s.console(), "initialized");
    }

    #[test]
    fn manual_tick_runs_a_day() {
        let (mut el, _publisher) = session_loop(Duration::from_secs(60));
        let mut s = session();
        el.tick(&mut s);
        el.tick(&mut s);
        assert_eq!(el.ticks(), 2);
        assert_eq!(s.simulation().day(), 2);
    }

    #[test]
    fn run_returns_when_publishers_drop() {
        let (mut el, publisher) = session_loop(Duration::from_secs(60));
        let mut s = session();
        publisher.publish(Message::key(Key::F(5))).unwrap();
        drop(publisher);

        assert_eq!(el.run(&mut s), LoopExit::Disconnected);
        assert_eq!(s.console(), "delete mode");
        assert!(s.is_running());
    }

    #[test]
    fn producer_thread_escape_stops_run() {
        let (mut el, publisher) = session_loop(Duration::from_millis(1));
        let mut s = session();

        let producer = std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(30));
            publisher.publish(Message::key(Key::Esc)).unwrap();
            // Keep the channel open until the loop has seen the quit.
            std::thread::sleep(Duration::from_millis(200));
        });

        assert_eq!(el.run(&mut s), LoopExit::Stopped);
        assert!(el.ticks() >= 1);
        assert_eq!(s.frames(), el.ticks());
        producer.join().unwrap();
    }

    #[test]
    fn publishing_after_shutdown_fails() {
        let (el, publisher) = session_loop(Duration::from_secs(1));
        drop(el);
        let err = publisher.publish(Message::quit()).unwrap_err();
        assert_eq!(err.0.flags, EventKind::QUIT);
    }
}
