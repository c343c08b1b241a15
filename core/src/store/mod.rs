//! SQLite persistence for the team roster.
//!
//! RULE: Only the store talks to the database.
//! The engine never sees a connection; callers load a snapshot with
//! `list_members()` and pass the slice in.
//!
//! Every mutation validates the member first and runs in its own
//! transaction, so the stored roster is always written back whole.

use crate::error::PlanResult;
mod roster;
use rusqlite::Connection;

pub struct RosterStore {
    conn: Connection,
}

impl RosterStore {
    pub fn open(path: &str) -> PlanResult<Self> {
        let conn = Connection::open_with_flags(
            path,
            rusqlite::OpenFlags::SQLITE_OPEN_READ_WRITE
                | rusqlite::OpenFlags::SQLITE_OPEN_CREATE
                | rusqlite::OpenFlags::SQLITE_OPEN_URI,
        )?;
        // WAL mode only for real files (shared-memory and :memory: ignore it).
        let _ = conn.execute_batch("PRAGMA journal_mode=WAL;");
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Ok(Self { conn })
    }

    /// Open an in-memory database (used in tests).
    pub fn in_memory() -> PlanResult<Self> {
        let conn = Connection::open(":memory:")?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Ok(Self { conn })
    }

    /// Apply all schema migrations in order.
    pub fn migrate(&self) -> PlanResult<()> {
        self.conn
            .execute_batch(include_str!("../../../migrations/001_roster.sql"))?;
        Ok(())
    }
}
