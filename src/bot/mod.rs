//! The conversation handler: turns one inbound text event into replies.
//!
//! Expected outcomes (nothing selected, no match, no pages) are ordinary
//! replies. Only storage and delivery failures become errors, and those are
//! caught in [`Bot::handle`], logged with the user and hymn involved, and
//! answered with a generic apology.

pub mod messages;
mod transport;

use std::sync::Arc;

use anyhow::{Context, Result};
use log::{error, info};

pub use transport::{Inbound, Keyboard, Transport};

use crate::assets::AssetStore;
use crate::audit::{Action, AuditLog};
use crate::catalog::Catalog;
use crate::models::{Collection, HymnRecord, MatchOutcome, UserId};
use crate::resolver::Query;
use crate::session::SessionStore;

/// Command that shows the collection chooser.
pub const START_COMMAND: &str = "/start";

pub struct Bot {
    catalog: Arc<Catalog>,
    assets: AssetStore,
    sessions: SessionStore,
    audit: AuditLog,
    keyboard: Keyboard,
}

impl Bot {
    pub fn new(catalog: Arc<Catalog>, assets: AssetStore, audit: AuditLog) -> Self {
        Self {
            catalog,
            assets,
            sessions: SessionStore::new(),
            audit,
            keyboard: Keyboard::collections(),
        }
    }

    pub fn keyboard(&self) -> &Keyboard {
        &self.keyboard
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    pub fn audit(&self) -> &AuditLog {
        &self.audit
    }

    /// Handle one event. Never fails: internal errors are logged and the user
    /// gets a generic reply.
    pub fn handle(&self, event: &Inbound, transport: &mut dyn Transport) {
        if let Err(err) = self.dispatch(event, transport) {
            error!(
                "user {}: failed to handle message {:?}: {err:#}",
                event.user_id, event.text
            );
            if let Err(err) = transport.send_text(
                event.user_id,
                messages::SOMETHING_WENT_WRONG,
                &self.keyboard,
            ) {
                error!("user {}: failed to send error reply: {err:#}", event.user_id);
            }
        }
    }

    fn dispatch(&self, event: &Inbound, transport: &mut dyn Transport) -> Result<()> {
        let text = event.text.trim();
        if text == START_COMMAND {
            self.audit.action(event.user_id, Action::Start);
            return transport.send_text(event.user_id, messages::CHOOSE_COLLECTION, &self.keyboard);
        }
        if let Some(collection) = Collection::from_label(text) {
            return self.choose_collection(event.user_id, collection, transport);
        }
        self.search(event.user_id, text, transport)
    }

    fn choose_collection(
        &self,
        user_id: UserId,
        collection: Collection,
        transport: &mut dyn Transport,
    ) -> Result<()> {
        self.sessions.select(user_id, collection);
        self.audit
            .action(user_id, Action::ChooseCollection(collection));
        transport.send_text(
            user_id,
            &messages::collection_selected(collection),
            &self.keyboard,
        )
    }

    fn search(&self, user_id: UserId, text: &str, transport: &mut dyn Transport) -> Result<()> {
        let Some(collection) = self.sessions.current(user_id) else {
            return transport.send_text(user_id, messages::SELECT_FIRST, &self.keyboard);
        };

        let query = Query::parse(text);
        match &query {
            Query::Number(number) => self.audit.action(user_id, Action::SearchNumber(number)),
            Query::Title(title) => self.audit.action(user_id, Action::SearchTitle(title)),
        }

        match self.catalog.resolve_query(&query, collection) {
            MatchOutcome::ExactNumber(record) => self.send_hymn(user_id, record, transport),
            MatchOutcome::TitleMatches(matches) => match matches.as_slice() {
                [] => {
                    let reply = match query {
                        Query::Number(_) => messages::NUMBER_NOT_FOUND,
                        Query::Title(_) => messages::TITLE_NOT_FOUND,
                    };
                    transport.send_text(user_id, reply, &self.keyboard)
                }
                [record] => self.send_hymn(user_id, record, transport),
                _ => transport.send_text(
                    user_id,
                    &messages::disambiguation(&matches),
                    &self.keyboard,
                ),
            },
        }
    }

    fn send_hymn(
        &self,
        user_id: UserId,
        record: &HymnRecord,
        transport: &mut dyn Transport,
    ) -> Result<()> {
        let pages = self.assets.locate(record).with_context(|| {
            format!(
                "failed to locate pages of hymn {} ({})",
                record.number, record.collection
            )
        })?;

        if pages.is_empty() {
            return transport.send_text(user_id, messages::NO_PAGES, &self.keyboard);
        }

        for page in pages.iter() {
            transport
                .send_image(user_id, page, &self.keyboard)
                .with_context(|| {
                    format!(
                        "failed to send {} of hymn {} ({})",
                        page.display(),
                        record.number,
                        record.collection
                    )
                })?;
        }

        self.audit.action(
            user_id,
            Action::SendHymn(record.collection, &record.number),
        );
        self.audit
            .delivery(user_id, record.collection, &record.number);
        info!(
            "user {user_id}: sent hymn {} ({}) in {} page(s)",
            record.number,
            record.collection,
            pages.len()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::fs::{self, File};
    use std::path::{Path, PathBuf};

    use anyhow::anyhow;
    use rusqlite::Connection;
    use tempfile::TempDir;

    use super::*;
    use crate::audit::{ensure_schema, fetch_actions_for_user, fetch_recent_deliveries};

    #[derive(Debug, PartialEq, Eq)]
    enum Sent {
        Text(String),
        Image(String),
    }

    #[derive(Default)]
    struct Recorder {
        sent: Vec<Sent>,
        fail_images: bool,
    }

    impl Transport for Recorder {
        fn send_text(&mut self, _user_id: UserId, text: &str, _keyboard: &Keyboard) -> Result<()> {
            self.sent.push(Sent::Text(text.to_string()));
            Ok(())
        }

        fn send_image(&mut self, _user_id: UserId, path: &Path, _keyboard: &Keyboard) -> Result<()> {
            if self.fail_images {
                return Err(anyhow!("upload rejected"));
            }
            let name = path.file_name().unwrap().to_string_lossy().into_owned();
            self.sent.push(Sent::Image(name));
            Ok(())
        }
    }

    fn fixture() -> (TempDir, Bot) {
        let dir = tempfile::tempdir().unwrap();
        let red: PathBuf = dir.path().join("red");
        fs::create_dir(&red).unwrap();
        for name in ["12_1.jpg", "12_2.jpg", "123_1.jpg", "2_1.jpg"] {
            File::create(red.join(name)).unwrap();
        }

        let catalog = Catalog::parse(
            "collection;number;title\n\
             red;12;Amazing Grace\n\
             red;123;Another Hymn\n\
             red;2;Grace Greater Than Our Sin\n\
             red;40;Holy Night\n\
             youth;1;Grace Alone\n",
        )
        .unwrap();

        let conn = Connection::open_in_memory().unwrap();
        ensure_schema(&conn).unwrap();
        let bot = Bot::new(
            Arc::new(catalog),
            AssetStore::new(dir.path()),
            AuditLog::new(conn),
        );
        (dir, bot)
    }

    fn send(bot: &Bot, transport: &mut Recorder, user_id: UserId, text: &str) {
        bot.handle(&Inbound::new(user_id, text), transport);
    }

    fn text(value: &str) -> Sent {
        Sent::Text(value.to_string())
    }

    fn image(value: &str) -> Sent {
        Sent::Image(value.to_string())
    }

    #[test]
    fn start_shows_the_chooser() {
        let (_dir, bot) = fixture();
        let mut out = Recorder::default();
        send(&bot, &mut out, 1, "/start");

        assert_eq!(out.sent, [text(messages::CHOOSE_COLLECTION)]);
        assert_eq!(bot.keyboard().buttons, ["Red hymnal", "Youth hymnal"]);
    }

    #[test]
    fn queries_need_a_collection() {
        let (_dir, bot) = fixture();
        let mut out = Recorder::default();
        send(&bot, &mut out, 1, "12");
        send(&bot, &mut out, 1, "grace");

        assert_eq!(
            out.sent,
            [text(messages::SELECT_FIRST), text(messages::SELECT_FIRST)]
        );
    }

    #[test]
    fn number_query_sends_pages_in_order() {
        let (_dir, bot) = fixture();
        let mut out = Recorder::default();
        send(&bot, &mut out, 1, "Red hymnal");
        out.sent.clear();

        send(&bot, &mut out, 1, "12");
        assert_eq!(out.sent, [image("12_1.jpg"), image("12_2.jpg")]);

        let deliveries = fetch_recent_deliveries(bot.audit().connection(), 10).unwrap();
        assert_eq!(deliveries.len(), 1);
        assert_eq!(deliveries[0].number, "12");
        assert_eq!(
            fetch_actions_for_user(bot.audit().connection(), 1).unwrap(),
            ["choose_collection:red", "search_number:12", "send_hymn:red:12"]
        );
    }

    #[test]
    fn single_title_match_is_sent_directly() {
        let (_dir, bot) = fixture();
        let mut out = Recorder::default();
        send(&bot, &mut out, 1, "Red hymnal");
        out.sent.clear();

        send(&bot, &mut out, 1, "AMAZING");
        assert_eq!(out.sent, [image("12_1.jpg"), image("12_2.jpg")]);
    }

    #[test]
    fn several_title_matches_ask_for_a_number() {
        let (_dir, bot) = fixture();
        let mut out = Recorder::default();
        send(&bot, &mut out, 1, "Red hymnal");
        out.sent.clear();

        send(&bot, &mut out, 1, "grace");
        let [Sent::Text(reply)] = out.sent.as_slice() else {
            panic!("expected one text reply, got {:?}", out.sent);
        };
        assert!(reply.contains("12 — Amazing Grace\n2 — Grace Greater Than Our Sin"));
    }

    #[test]
    fn unknown_number_is_not_looked_up() {
        let (_dir, bot) = fixture();
        let mut out = Recorder::default();
        send(&bot, &mut out, 1, "Red hymnal");
        out.sent.clear();

        send(&bot, &mut out, 1, "99");
        send(&bot, &mut out, 1, "nothing like this");
        assert_eq!(
            out.sent,
            [text(messages::NUMBER_NOT_FOUND), text(messages::TITLE_NOT_FOUND)]
        );
    }

    #[test]
    fn hymn_without_pages_says_so() {
        let (_dir, bot) = fixture();
        let mut out = Recorder::default();
        send(&bot, &mut out, 1, "Red hymnal");
        out.sent.clear();

        send(&bot, &mut out, 1, "hymn 40");
        assert_eq!(out.sent, [text(messages::NO_PAGES)]);
        assert!(fetch_recent_deliveries(bot.audit().connection(), 10)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn missing_collection_folder_gets_generic_reply() {
        let (_dir, bot) = fixture();
        let mut out = Recorder::default();
        send(&bot, &mut out, 1, "Youth hymnal");
        out.sent.clear();

        send(&bot, &mut out, 1, "1");
        assert_eq!(out.sent, [text(messages::SOMETHING_WENT_WRONG)]);
    }

    #[test]
    fn delivery_failure_gets_generic_reply() {
        let (_dir, bot) = fixture();
        let mut out = Recorder {
            fail_images: true,
            ..Recorder::default()
        };
        send(&bot, &mut out, 1, "Red hymnal");
        out.sent.clear();

        send(&bot, &mut out, 1, "2");
        assert_eq!(out.sent, [text(messages::SOMETHING_WENT_WRONG)]);
    }

    #[test]
    fn selections_are_per_user() {
        let (_dir, bot) = fixture();
        let mut out = Recorder::default();
        send(&bot, &mut out, 1, "Red hymnal");
        send(&bot, &mut out, 2, "Youth hymnal");
        out.sent.clear();

        send(&bot, &mut out, 1, "2");
        send(&bot, &mut out, 3, "2");
        assert_eq!(out.sent, [image("2_1.jpg"), text(messages::SELECT_FIRST)]);
        assert_eq!(bot.sessions().current(2), Some(Collection::Youth));
    }
}
