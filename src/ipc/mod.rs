//! Command transport over a Unix socket.
//!
//! A UI bridge, scripts or key-bind helpers connect to the socket and send
//! newline-delimited JSON [`Command`](crate::command::Command)s, which are
//! forwarded to the board's main loop.

pub mod listener;
