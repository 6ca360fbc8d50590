//! Terminal Pomodoro timer.
//!
//! [`session`] and [`clock`] hold the timer state machine, [`tasks`] the short
//! task list, and [`controller`] owns both and broadcasts snapshots to the
//! surfaces drawn by [`ui`]. [`shell`] is the boundary to the host: ticks, the
//! intent channel and desktop notifications.

pub mod app;
pub mod clock;
pub mod config;
pub mod controller;
pub mod error;
pub mod logging;
pub mod session;
pub mod shell;
pub mod tasks;
pub mod ui;
