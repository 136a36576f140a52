use crate::models::{AdminRow, ContactRow, SubscriberRow};
use crate::Database;
use anyhow::{anyhow, Result};
use rusqlite::{Connection, OptionalExtension};

/// Outcome of a subscriber insert. The UNIQUE constraint on email is the
/// source of truth for duplicates, so a race between two inserts of the same
/// address still produces exactly one row — the loser lands here as
/// `AlreadySubscribed` instead of an error.
pub enum SubscriberInsert {
    Created(SubscriberRow),
    AlreadySubscribed,
}

impl Database {
    // -- Contact messages --

    /// Insert a contact message and return the stored row, including the
    /// id and timestamp SQLite assigned.
    pub fn create_contact(
        &self,
        full_name: &str,
        email: &str,
        phone: Option<&str>,
        message: &str,
    ) -> Result<ContactRow> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO contact_messages (full_name, email, phone, message)
                 VALUES (?1, ?2, ?3, ?4)",
                rusqlite::params![full_name, email, phone, message],
            )?;
            let id = conn.last_insert_rowid();
            query_contact_by_id(conn, id)?.ok_or_else(|| anyhow!("Contact not found after insert: {}", id))
        })
    }

    /// Non-archived messages, newest first.
    pub fn list_contacts(&self) -> Result<Vec<ContactRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, full_name, email, phone, message, archived, created_at
                 FROM contact_messages
                 WHERE archived = 0
                 ORDER BY created_at DESC, id DESC",
            )?;

            let rows = stmt
                .query_map([], contact_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            Ok(rows)
        })
    }

    pub fn get_contact(&self, id: i64) -> Result<Option<ContactRow>> {
        self.with_conn(|conn| query_contact_by_id(conn, id))
    }

    /// Soft-delete. Returns false when no such message exists.
    pub fn archive_contact(&self, id: i64) -> Result<bool> {
        self.with_conn(|conn| {
            let changed =
                conn.execute("UPDATE contact_messages SET archived = 1 WHERE id = ?1", [id])?;
            Ok(changed > 0)
        })
    }

    // -- Newsletter subscribers --

    pub fn find_subscriber_by_email(&self, email: &str) -> Result<Option<SubscriberRow>> {
        self.with_conn(|conn| {
            let row = conn
                .query_row(
                    "SELECT id, email, subscribed_at FROM newsletter_subscribers WHERE email = ?1",
                    [email],
                    subscriber_from_row,
                )
                .optional()?;
            Ok(row)
        })
    }

    pub fn create_subscriber(&self, email: &str) -> Result<SubscriberInsert> {
        self.with_conn(|conn| {
            let inserted = conn.execute(
                "INSERT INTO newsletter_subscribers (email) VALUES (?1)",
                [email],
            );

            match inserted {
                Ok(_) => {
                    let id = conn.last_insert_rowid();
                    let row = conn.query_row(
                        "SELECT id, email, subscribed_at FROM newsletter_subscribers WHERE id = ?1",
                        [id],
                        subscriber_from_row,
                    )?;
                    Ok(SubscriberInsert::Created(row))
                }
                Err(e) if is_unique_violation(&e) => Ok(SubscriberInsert::AlreadySubscribed),
                Err(e) => Err(e.into()),
            }
        })
    }

    /// All subscribers, newest first.
    pub fn list_subscribers(&self) -> Result<Vec<SubscriberRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, email, subscribed_at
                 FROM newsletter_subscribers
                 ORDER BY subscribed_at DESC, id DESC",
            )?;

            let rows = stmt
                .query_map([], subscriber_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            Ok(rows)
        })
    }

    /// Hard delete. Returns false when no such subscriber exists.
    pub fn delete_subscriber(&self, id: i64) -> Result<bool> {
        self.with_conn(|conn| {
            let changed = conn.execute("DELETE FROM newsletter_subscribers WHERE id = ?1", [id])?;
            Ok(changed > 0)
        })
    }

    // -- Admin users --

    pub fn get_admin(&self, email: &str) -> Result<Option<AdminRow>> {
        self.with_conn(|conn| {
            let row = conn
                .query_row(
                    "SELECT email, password, created_at FROM admin_users WHERE email = ?1",
                    [email],
                    |row| {
                        Ok(AdminRow {
                            email: row.get(0)?,
                            password: row.get(1)?,
                            created_at: row.get(2)?,
                        })
                    },
                )
                .optional()?;
            Ok(row)
        })
    }

    /// Seed the admin account. Returns true when the row was created,
    /// false when one already existed (the stored hash is left untouched).
    pub fn create_admin_if_missing(&self, email: &str, password_hash: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let inserted = conn.execute(
                "INSERT OR IGNORE INTO admin_users (email, password) VALUES (?1, ?2)",
                [email, password_hash],
            )?;
            Ok(inserted > 0)
        })
    }
}

fn query_contact_by_id(conn: &Connection, id: i64) -> Result<Option<ContactRow>> {
    let row = conn
        .query_row(
            "SELECT id, full_name, email, phone, message, archived, created_at
             FROM contact_messages WHERE id = ?1",
            [id],
            contact_from_row,
        )
        .optional()?;
    Ok(row)
}

fn contact_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<ContactRow> {
    Ok(ContactRow {
        id: row.get(0)?,
        full_name: row.get(1)?,
        email: row.get(2)?,
        phone: row.get(3)?,
        message: row.get(4)?,
        archived: row.get::<_, i64>(5)? != 0,
        created_at: row.get(6)?,
    })
}

fn subscriber_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<SubscriberRow> {
    Ok(SubscriberRow {
        id: row.get(0)?,
        email: row.get(1)?,
        subscribed_at: row.get(2)?,
    })
}

fn is_unique_violation(e: &rusqlite::Error) -> bool {
    matches!(
        e,
        rusqlite::Error::SqliteFailure(err, _)
            if err.code == rusqlite::ErrorCode::ConstraintViolation
    )
}
