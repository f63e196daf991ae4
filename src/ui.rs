//! Terminal console that stands in for a chat network: the user types
//! messages, the bot's replies and page images show up in a transcript, and
//! the collection keyboard sits under it like a chat client's reply keyboard.

mod app;
mod helpers;
mod terminal;

pub use app::{ConsoleApp, ConsoleTransport, Entry};
pub use terminal::run_console;
