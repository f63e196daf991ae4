use anyhow::{Context, Result};
use rusqlite::{params, Connection};

use crate::models::{Collection, UserId};

/// One row of the `deliveries` table, as shown by the usage report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    pub user_id: UserId,
    pub collection: String,
    pub number: String,
    pub delivered_at: String,
}

pub fn record_action(conn: &Connection, user_id: UserId, action: &str) -> Result<()> {
    conn.execute(
        "INSERT INTO actions (user_id, action) VALUES (?1, ?2)",
        params![user_id, action],
    )
    .context("failed to record action")?;
    Ok(())
}

pub fn record_delivery(
    conn: &Connection,
    user_id: UserId,
    collection: Collection,
    number: &str,
) -> Result<()> {
    conn.execute(
        "INSERT INTO deliveries (user_id, collection, number) VALUES (?1, ?2, ?3)",
        params![user_id, collection.id(), number],
    )
    .context("failed to record delivery")?;
    Ok(())
}

/// Actions of one user, oldest first.
pub fn fetch_actions_for_user(conn: &Connection, user_id: UserId) -> Result<Vec<String>> {
    let mut stmt = conn
        .prepare("SELECT action FROM actions WHERE user_id = ?1 ORDER BY id")
        .context("failed to prepare actions query")?;

    let actions = stmt
        .query_map([user_id], |row| row.get(0))
        .context("failed to iterate actions")?
        .collect::<Result<Vec<String>, _>>()
        .context("failed to collect actions")?;

    Ok(actions)
}

/// Most recent deliveries first.
pub fn fetch_recent_deliveries(conn: &Connection, limit: usize) -> Result<Vec<Delivery>> {
    let mut stmt = conn
        .prepare(
            "SELECT user_id, collection, number, delivered_at
             FROM deliveries
             ORDER BY id DESC
             LIMIT ?1",
        )
        .context("failed to prepare deliveries query")?;

    let deliveries = stmt
        .query_map([limit as i64], |row| {
            Ok(Delivery {
                user_id: row.get(0)?,
                collection: row.get(1)?,
                number: row.get(2)?,
                delivered_at: row.get(3)?,
            })
        })
        .context("failed to iterate deliveries")?
        .collect::<Result<Vec<_>, _>>()
        .context("failed to collect deliveries")?;

    Ok(deliveries)
}
