//! Audit trail of what users asked for and which hymns were sent.
//!
//! Writing the trail is best effort: a failed insert is logged and the
//! conversation carries on as if nothing happened.

mod connection;
mod records;

use log::warn;
use rusqlite::Connection;

pub use connection::{ensure_schema, open_audit_store};
pub use records::{
    fetch_actions_for_user, fetch_recent_deliveries, record_action, record_delivery, Delivery,
};

use crate::models::{Collection, UserId};

/// Something a user did, as written to the `actions` table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action<'a> {
    Start,
    ChooseCollection(Collection),
    SearchNumber(&'a str),
    SearchTitle(&'a str),
    SendHymn(Collection, &'a str),
}

impl Action<'_> {
    pub fn describe(&self) -> String {
        match self {
            Action::Start => "start".to_string(),
            Action::ChooseCollection(collection) => format!("choose_collection:{collection}"),
            Action::SearchNumber(number) => format!("search_number:{number}"),
            Action::SearchTitle(query) => format!("search_title:{query}"),
            Action::SendHymn(collection, number) => format!("send_hymn:{collection}:{number}"),
        }
    }
}

pub struct AuditLog {
    conn: Connection,
}

impl AuditLog {
    pub fn new(conn: Connection) -> Self {
        Self { conn }
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    pub fn action(&self, user_id: UserId, action: Action<'_>) {
        let description = action.describe();
        if let Err(err) = record_action(&self.conn, user_id, &description) {
            warn!("audit: could not record `{description}` for user {user_id}: {err:#}");
        }
    }

    pub fn delivery(&self, user_id: UserId, collection: Collection, number: &str) {
        if let Err(err) = record_delivery(&self.conn, user_id, collection, number) {
            warn!(
                "audit: could not record delivery of {collection}:{number} to user {user_id}: {err:#}"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn audit() -> AuditLog {
        let conn = Connection::open_in_memory().unwrap();
        ensure_schema(&conn).unwrap();
        AuditLog::new(conn)
    }

    #[test]
    fn actions_are_recorded_in_order() {
        let audit = audit();
        audit.action(7, Action::Start);
        audit.action(7, Action::ChooseCollection(Collection::Youth));
        audit.action(8, Action::SearchTitle("grace"));
        audit.action(7, Action::SearchNumber("12"));

        let actions = fetch_actions_for_user(audit.connection(), 7).unwrap();
        assert_eq!(
            actions,
            ["start", "choose_collection:youth", "search_number:12"]
        );
    }

    #[test]
    fn recent_deliveries_come_newest_first() {
        let audit = audit();
        audit.delivery(1, Collection::Red, "12");
        audit.delivery(2, Collection::Youth, "7");
        audit.delivery(1, Collection::Red, "3");

        let deliveries = fetch_recent_deliveries(audit.connection(), 2).unwrap();
        let numbers: Vec<_> = deliveries.iter().map(|d| d.number.as_str()).collect();
        assert_eq!(numbers, ["3", "7"]);
        assert_eq!(deliveries[1].collection, "youth");
        assert!(!deliveries[0].delivered_at.is_empty());
    }

    #[test]
    fn deliveries_are_stamped_in_local_time() {
        let audit = audit();
        audit.delivery(1, Collection::Red, "12");

        let recent: bool = audit
            .connection()
            .query_row(
                "SELECT delivered_at BETWEEN datetime('now', 'localtime', '-1 minute')
                                         AND datetime('now', 'localtime', '+1 minute')
                 FROM deliveries",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert!(recent);
    }

    #[test]
    fn write_failures_do_not_panic() {
        let conn = Connection::open_in_memory().unwrap();
        let audit = AuditLog::new(conn);
        audit.action(1, Action::SendHymn(Collection::Red, "1"));
        audit.delivery(1, Collection::Red, "1");
    }

    #[test]
    fn schema_creation_is_repeatable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("audit.sqlite");
        drop(open_audit_store(&path).unwrap());
        let conn = open_audit_store(&path).unwrap();
        record_action(&conn, 1, "start").unwrap();
    }
}
