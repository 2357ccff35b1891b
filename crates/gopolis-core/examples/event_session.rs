//! An interactive-style session without a terminal.
//!
//! A producer thread plays the part of the keyboard and mouse: it switches
//! click modes, clicks, resizes and finally presses Esc. The main thread
//! runs the event loop, which ticks the city between inputs and hands each
//! frame to a renderer that prints the console line and the day summary.
//!
//! Run with: `cargo run -p gopolis-core --example event_session --features test-utils`

use std::thread;
use std::time::Duration;

use gopolis_core::config::SimulationConfig;
use gopolis_core::driver::Simulation;
use gopolis_core::event::{Dispatcher, Message};
use gopolis_core::event_loop::{EventLoop, LoopExit};
use gopolis_core::input::{Key, MouseButton, MouseEvent, Size};
use gopolis_core::session::{Frame, Session};
use gopolis_core::test_utils::gopher_town;
use tracing_subscriber::EnvFilter;

fn print_frame(frame: &Frame) {
    println!(
        "[tick {:>3}] day {:>2} | {:<28} | {} shopped, {} worked",
        frame.tick, frame.report.day, frame.console, frame.report.shopped, frame.report.worked
    );
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = SimulationConfig::default();
    let simulation = Simulation::with_config(gopher_town(), &config);
    let mut session = Session::new(simulation, print_frame, Size::new(80, 25));

    let mut dispatcher = Dispatcher::new();
    Session::install(&mut dispatcher);
    let (mut event_loop, publisher) = EventLoop::new(dispatcher, config.tick_interval());

    let input = thread::spawn(move || {
        let script = [
            Message::key(Key::F(2)),
            Message::mouse(MouseEvent {
                button: MouseButton::Left,
                x: 12,
                y: 7,
            }),
            Message::key(Key::F(4)),
            Message::resize(120, 40),
            Message::mouse(MouseEvent {
                button: MouseButton::Left,
                x: 130,
                y: 2,
            }),
            Message::key(Key::Esc),
        ];
        for message in script {
            thread::sleep(Duration::from_millis(40));
            if publisher.publish(message).is_err() {
                break;
            }
        }
    });

    let exit = event_loop.run(&mut session);
    let _ = input.join();

    println!();
    match exit {
        LoopExit::Stopped => println!("stopped after {} days", session.simulation().day()),
        LoopExit::Disconnected => println!("input closed after {} days", session.simulation().day()),
    }
    println!("{}", session.simulation().snapshot());
}
