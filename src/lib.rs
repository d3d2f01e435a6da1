//! Terminal typing-speed game.
//!
//! The typing session is a pure state machine (`session`); `reporter` turns
//! its transitions into relay events, `app` wires it to ticks, text sources
//! and the relay, and `ui` draws it.

pub mod app;
pub mod config;
pub mod event;
pub mod provider;
pub mod relay;
pub mod reporter;
pub mod session;
pub mod share;
pub mod timer;
pub mod ui;
