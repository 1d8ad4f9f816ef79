use rusqlite::{Connection, ErrorCode, OptionalExtension, Row};

use chirp_types::models::{Account, Message, NewAccount, NewMessageRow};

use crate::store::{AccountStore, MessageStore};
use crate::{Database, Result, StoreError};

const ACCOUNT_COLUMNS: &str = "account_id, username, password";
const MESSAGE_COLUMNS: &str = "message_id, posted_by, message_text, time_posted_epoch";

// -- Accounts --

impl AccountStore for Database {
    fn find_by_username(&self, username: &str) -> Result<Option<Account>> {
        self.with_conn(|conn| {
            let sql = format!("SELECT {ACCOUNT_COLUMNS} FROM account WHERE username = ?1");
            Ok(conn.query_row(&sql, [username], account_from_row).optional()?)
        })
    }

    fn find_by_username_and_password(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Option<Account>> {
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {ACCOUNT_COLUMNS} FROM account WHERE username = ?1 AND password = ?2"
            );
            Ok(conn
                .query_row(&sql, [username, password], account_from_row)
                .optional()?)
        })
    }

    fn exists_by_id(&self, account_id: i64) -> Result<bool> {
        self.with_conn(|conn| {
            let exists: bool = conn.query_row(
                "SELECT EXISTS(SELECT 1 FROM account WHERE account_id = ?1)",
                [account_id],
                |row| row.get(0),
            )?;
            Ok(exists)
        })
    }

    fn find_by_id(&self, account_id: i64) -> Result<Option<Account>> {
        self.with_conn(|conn| query_account_by_id(conn, account_id))
    }

    fn save(&self, account: &NewAccount) -> Result<Account> {
        self.with_conn(|conn| {
            let inserted = conn.execute(
                "INSERT INTO account (username, password) VALUES (?1, ?2)",
                (&account.username, &account.password),
            );

            match inserted {
                Ok(_) => {}
                Err(e) if is_unique_violation(&e) => {
                    return Err(StoreError::DuplicateUsername(account.username.clone()));
                }
                Err(e) => return Err(e.into()),
            }

            Ok(Account {
                account_id: conn.last_insert_rowid(),
                username: account.username.clone(),
                password: account.password.clone(),
            })
        })
    }
}

// -- Messages --

impl MessageStore for Database {
    fn find_by_id(&self, message_id: i64) -> Result<Option<Message>> {
        self.with_conn(|conn| {
            let sql = format!("SELECT {MESSAGE_COLUMNS} FROM message WHERE message_id = ?1");
            Ok(conn.query_row(&sql, [message_id], message_from_row).optional()?)
        })
    }

    fn find_by_posted_by(&self, account_id: i64) -> Result<Vec<Message>> {
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {MESSAGE_COLUMNS} FROM message WHERE posted_by = ?1 ORDER BY message_id"
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map([account_id], message_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    fn find_all(&self) -> Result<Vec<Message>> {
        self.with_conn(|conn| {
            let sql = format!("SELECT {MESSAGE_COLUMNS} FROM message ORDER BY message_id");
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map([], message_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    fn save(&self, message: &NewMessageRow) -> Result<Message> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO message (posted_by, message_text, time_posted_epoch) VALUES (?1, ?2, ?3)",
                rusqlite::params![
                    message.posted_by,
                    message.message_text,
                    message.time_posted_epoch
                ],
            )?;

            Ok(Message {
                message_id: conn.last_insert_rowid(),
                posted_by: message.posted_by,
                message_text: message.message_text.clone(),
                time_posted_epoch: message.time_posted_epoch,
            })
        })
    }

    fn delete(&self, message_id: i64) -> Result<bool> {
        self.with_conn(|conn| {
            let removed = conn.execute("DELETE FROM message WHERE message_id = ?1", [message_id])?;
            Ok(removed > 0)
        })
    }

    fn update_text(&self, message_id: i64, message_text: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let updated = conn.execute(
                "UPDATE message SET message_text = ?1 WHERE message_id = ?2",
                rusqlite::params![message_text, message_id],
            )?;
            Ok(updated > 0)
        })
    }
}

fn query_account_by_id(conn: &Connection, account_id: i64) -> Result<Option<Account>> {
    let sql = format!("SELECT {ACCOUNT_COLUMNS} FROM account WHERE account_id = ?1");
    Ok(conn.query_row(&sql, [account_id], account_from_row).optional()?)
}

fn account_from_row(row: &Row<'_>) -> rusqlite::Result<Account> {
    Ok(Account {
        account_id: row.get(0)?,
        username: row.get(1)?,
        password: row.get(2)?,
    })
}

fn message_from_row(row: &Row<'_>) -> rusqlite::Result<Message> {
    Ok(Message {
        message_id: row.get(0)?,
        posted_by: row.get(1)?,
        message_text: row.get(2)?,
        time_posted_epoch: row.get(3)?,
    })
}

fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _)
            if e.code == ErrorCode::ConstraintViolation
                && e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
    )
}
