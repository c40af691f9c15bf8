// SPDX-License-Identifier: MIT OR Apache-2.0

//! Ready-made notification consumers.

pub mod collecting_sink;
pub mod log_sink;

pub use collecting_sink::CollectingSink;
pub use log_sink::LogSink;
