//! Database schema migrations for SQLite.
//!
//! Versioned migrations: each version is applied once, inside one
//! transaction, and recorded in `schema_migrations`.

use rusqlite::{Connection, OptionalExtension};
use tracing::info;

use docseal_core::now_millis;

use crate::error::{Result, StoreError};

/// Current schema version.
pub const CURRENT_VERSION: u32 = 1;

/// Initialize or migrate the database schema.
///
/// Idempotent: running it against an up-to-date database does nothing.
pub fn migrate(conn: &mut Connection) -> Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version INTEGER PRIMARY KEY,
            applied_at INTEGER NOT NULL
        )",
        [],
    )?;

    let current: u32 = conn
        .query_row("SELECT MAX(version) FROM schema_migrations", [], |row| {
            row.get::<_, Option<u32>>(0)
        })
        .optional()?
        .flatten()
        .unwrap_or(0);

    if current > CURRENT_VERSION {
        return Err(StoreError::Migration(format!(
            "database schema version {} is newer than supported version {}",
            current, CURRENT_VERSION
        )));
    }

    if current < CURRENT_VERSION {
        let tx = conn.transaction()?;
        for version in (current + 1)..=CURRENT_VERSION {
            apply_migration(&tx, version)?;
            tx.execute(
                "INSERT INTO schema_migrations (version, applied_at) VALUES (?1, ?2)",
                rusqlite::params![version, now_millis()],
            )?;
        }
        tx.commit()?;
        info!(from = current, to = CURRENT_VERSION, "migrated store schema");
    }

    Ok(())
}

fn apply_migration(conn: &Connection, version: u32) -> Result<()> {
    match version {
        1 => apply_v1(conn),
        _ => Err(StoreError::Migration(format!(
            "unknown migration version: {}",
            version
        ))),
    }
}

/// Migration v1: directory, wrapped keys, blobs.
fn apply_v1(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        -- One active public key per identity
        CREATE TABLE public_keys (
            owner_id TEXT PRIMARY KEY,
            public_key BLOB NOT NULL,          -- SPKI, DER
            published_at INTEGER NOT NULL,     -- Unix ms
            updated_at INTEGER NOT NULL
        );

        -- Password-wrapped private keys, stored as the JSON record
        CREATE TABLE wrapped_keys (
            owner_id TEXT PRIMARY KEY,
            record TEXT NOT NULL,
            updated_at INTEGER NOT NULL
        );

        -- Encrypted envelopes, keyed by BLAKE3 hex of their bytes
        CREATE TABLE blobs (
            locator TEXT PRIMARY KEY,
            content BLOB NOT NULL,
            stored_at INTEGER NOT NULL
        );
        "#,
    )?;

    Ok(())
}
