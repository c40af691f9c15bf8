// SPDX-License-Identifier: MIT OR Apache-2.0

pub mod listener;
pub mod match_window;

pub use listener::{Listener, ListenerRegistry};
pub use match_window::{MatchWindow, WindowChange, WindowEvent};
