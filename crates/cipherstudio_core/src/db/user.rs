//! Account storage operations backed by redb.

use crate::db::tables::{USERS, USERS_BY_EMAIL, USERS_BY_NAME};
use crate::error::AppError;
use crate::models::user::User;
use crate::text::normalize_email;
use redb::{ReadableDatabase, ReadableTable};
use std::sync::Arc;

/// Message returned when a username or email is already registered.
pub const USER_EXISTS_MESSAGE: &str = "User already exists";

/// Accessor for the account tables.
pub struct UserDb {
    db: Arc<redb::Database>,
}

impl UserDb {
    /// Initialize account tables if they do not exist yet.
    ///
    /// # Errors
    /// Returns an error when redb transaction/table initialization fails.
    pub fn new(db: Arc<redb::Database>) -> Result<Self, AppError> {
        let write_txn = db.begin_write()?;
        write_txn.open_table(USERS)?;
        write_txn.open_table(USERS_BY_NAME)?;
        write_txn.open_table(USERS_BY_EMAIL)?;
        write_txn.commit()?;
        Ok(Self { db })
    }

    /// Insert an account and its username/email index rows atomically.
    ///
    /// # Errors
    /// Returns [`AppError::BadRequest`] when either the username or the email
    /// is already registered, or a storage error.
    pub fn create(&self, user: &User) -> Result<(), AppError> {
        let encoded = bincode::serialize(user)?;
        let email_key = normalize_email(&user.email);

        let write_txn = self.db.begin_write()?;
        {
            let mut users = write_txn.open_table(USERS)?;
            let mut by_name = write_txn.open_table(USERS_BY_NAME)?;
            let mut by_email = write_txn.open_table(USERS_BY_EMAIL)?;

            if by_name.get(user.username.as_str())?.is_some()
                || by_email.get(email_key.as_str())?.is_some()
            {
                return Err(AppError::BadRequest(USER_EXISTS_MESSAGE.to_string()));
            }

            users.insert(user.id.as_str(), encoded.as_slice())?;
            by_name.insert(user.username.as_str(), user.id.as_str())?;
            by_email.insert(email_key.as_str(), user.id.as_str())?;
        }
        write_txn.commit()?;
        tracing::info!("Registered user {}", user.username);
        Ok(())
    }

    /// Fetch an account by id.
    ///
    /// # Errors
    /// Returns an error when storage access or deserialization fails.
    pub fn get(&self, id: &str) -> Result<Option<User>, AppError> {
        let read_txn = self.db.begin_read()?;
        let users = read_txn.open_table(USERS)?;
        match users.get(id)? {
            Some(value) => Ok(Some(bincode::deserialize(value.value())?)),
            None => Ok(None),
        }
    }

    /// Fetch an account by exact username.
    ///
    /// # Errors
    /// Returns an error when storage access or deserialization fails.
    pub fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        let read_txn = self.db.begin_read()?;
        let by_name = read_txn.open_table(USERS_BY_NAME)?;
        let users = read_txn.open_table(USERS)?;
        let Some(id) = by_name.get(username)? else {
            return Ok(None);
        };
        match users.get(id.value())? {
            Some(value) => Ok(Some(bincode::deserialize(value.value())?)),
            None => Ok(None),
        }
    }

    /// Fetch an account by email, ignoring case and surrounding whitespace.
    ///
    /// # Errors
    /// Returns an error when storage access or deserialization fails.
    pub fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let read_txn = self.db.begin_read()?;
        let by_email = read_txn.open_table(USERS_BY_EMAIL)?;
        let users = read_txn.open_table(USERS)?;
        let email_key = normalize_email(email);
        let Some(id) = by_email.get(email_key.as_str())? else {
            return Ok(None);
        };
        match users.get(id.value())? {
            Some(value) => Ok(Some(bincode::deserialize(value.value())?)),
            None => Ok(None),
        }
    }
}
