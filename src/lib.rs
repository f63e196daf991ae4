//! Hymn lookup bot: pick a hymnal, send a number or part of a title, get the
//! hymn's page images back.
//!
//! The lookup core (catalog, resolver, asset locator, sessions) does not know
//! about any chat network; [`bot::Bot`] drives it through the
//! [`bot::Transport`] trait and [`ui`] provides a terminal console transport.
pub mod assets;
pub mod audit;
pub mod bot;
pub mod catalog;
pub mod config;
pub mod error;
pub mod extract;
pub mod health;
pub mod logging;
pub mod models;
pub mod resolver;
pub mod session;
pub mod ui;

pub use assets::AssetStore;
pub use bot::{Bot, Inbound, Keyboard, Transport};
pub use catalog::Catalog;
pub use error::{AssetError, CatalogError};
pub use models::{AssetSet, Collection, HymnRecord, MatchOutcome, UserId};
pub use resolver::Query;
pub use session::SessionStore;
pub use ui::{run_console, ConsoleApp};
