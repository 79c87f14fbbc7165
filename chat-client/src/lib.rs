//! Terminal chat client speaking a JSON-lines protocol over TCP.
//!
//! - [`message`] defines the [`message::Message`] value and its wire codec.
//! - [`connection`] holds the shared state of one TCP connection and makes
//!   closing it idempotent.
//! - [`receiver`] is the background read loop spawned per connection.
//! - [`listener`] lets observers follow connection and message events.
//! - [`client`] ties these together as [`client::ChatClient`].
//! - [`console`] drives a client from lines of user input.
//! - [`cli`] parses the command line.

pub mod cli;
pub mod client;
pub mod connection;
pub mod console;
pub mod listener;
pub mod message;
pub mod receiver;
