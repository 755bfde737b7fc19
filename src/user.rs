//! Code for creating the user table and keeping user records in sync with the identity provider.

use std::fmt::Display;

use rusqlite::{Connection, OptionalExtension};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::Error;

/// A newtype wrapper for integer user IDs.
///
/// This helps disambiguate user IDs from other types of IDs, leading to better compile time
/// errors, and lets the identity middleware pass the ID to handlers as a request extension.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct UserId(i64);

impl UserId {
    /// Create a new user ID.
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    /// Cast the user ID to a 64 bit integer.
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// A user of the application.
///
/// Users are owned by the external identity provider, this record only mirrors
/// the profile fields the app displays.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    /// The user's ID in the application database.
    pub id: UserId,
    /// The ID the identity provider uses for this user.
    pub external_id: String,
    /// The user's display name, may be empty.
    pub name: String,
    /// The user's primary email address, if the provider supplied one.
    pub email: Option<String>,
    /// URL of the user's profile image.
    pub image_url: Option<String>,
    /// When the user was first seen by the app.
    pub created_at: OffsetDateTime,
}

/// The profile fields supplied by the identity provider.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct UserProfile {
    /// The user's display name, may be empty.
    pub name: String,
    /// The user's primary email address.
    pub email: Option<String>,
    /// URL of the user's profile image.
    pub image_url: Option<String>,
}

/// A user along with the number of records they own.
#[derive(Debug, Clone, PartialEq)]
pub struct UserSummary {
    /// The user.
    pub user: User,
    /// The number of accounts the user owns.
    pub account_count: usize,
    /// The number of transactions the user owns.
    pub transaction_count: usize,
}

/// Create the user table.
///
/// # Errors
///
/// This function will return an error if the SQL query failed.
pub fn create_user_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS user (
                id INTEGER PRIMARY KEY,
                external_id TEXT NOT NULL UNIQUE,
                name TEXT NOT NULL DEFAULT '',
                email TEXT,
                image_url TEXT,
                created_at TEXT NOT NULL
                )",
        (),
    )?;

    Ok(())
}

fn map_user_row(row: &rusqlite::Row) -> Result<User, rusqlite::Error> {
    Ok(User {
        id: UserId::new(row.get(0)?),
        external_id: row.get(1)?,
        name: row.get(2)?,
        email: row.get(3)?,
        image_url: row.get(4)?,
        created_at: row.get(5)?,
    })
}

/// Make sure a user row exists for `external_id` and return its ID.
///
/// Existing users are left untouched, profile details arrive via the user webhook.
///
/// # Errors
///
/// Returns a [Error::SqlError] if an SQL related error occurred.
pub fn ensure_user(external_id: &str, connection: &Connection) -> Result<UserId, Error> {
    connection.execute(
        "INSERT INTO user (external_id, created_at) VALUES (?1, ?2)
        ON CONFLICT(external_id) DO NOTHING",
        (external_id, OffsetDateTime::now_utc()),
    )?;

    connection
        .query_row(
            "SELECT id FROM user WHERE external_id = ?1",
            (external_id,),
            |row| row.get(0).map(UserId::new),
        )
        .map_err(|error| error.into())
}

/// Insert the user or overwrite the profile of the existing user with the same `external_id`.
///
/// # Errors
///
/// Returns a [Error::SqlError] if an SQL related error occurred.
pub fn upsert_user(
    external_id: &str,
    profile: &UserProfile,
    connection: &Connection,
) -> Result<User, Error> {
    connection.execute(
        "INSERT INTO user (external_id, name, email, image_url, created_at)
        VALUES (?1, ?2, ?3, ?4, ?5)
        ON CONFLICT(external_id) DO UPDATE SET
            name = excluded.name,
            email = excluded.email,
            image_url = excluded.image_url",
        (
            external_id,
            &profile.name,
            &profile.email,
            &profile.image_url,
            OffsetDateTime::now_utc(),
        ),
    )?;

    get_user_by_external_id(external_id, connection)?.ok_or(Error::NotFound)
}

/// Overwrite the profile of an existing user.
///
/// # Errors
///
/// Returns [Error::UpdateMissingUser] if no user has the ID `external_id`,
/// or [Error::SqlError] if an SQL related error occurred.
pub fn update_user(
    external_id: &str,
    profile: &UserProfile,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "UPDATE user SET name = ?1, email = ?2, image_url = ?3 WHERE external_id = ?4",
        (&profile.name, &profile.email, &profile.image_url, external_id),
    )?;

    if rows_affected == 0 {
        return Err(Error::UpdateMissingUser);
    }

    Ok(())
}

/// Delete a user along with their accounts and transactions.
///
/// # Errors
///
/// Returns [Error::DeleteMissingUser] if no user has the ID `external_id`,
/// or [Error::SqlError] if an SQL related error occurred.
pub fn delete_user(external_id: &str, connection: &Connection) -> Result<(), Error> {
    // Accounts and transactions are removed by the `ON DELETE CASCADE` foreign keys.
    let rows_affected =
        connection.execute("DELETE FROM user WHERE external_id = ?1", (external_id,))?;

    if rows_affected == 0 {
        return Err(Error::DeleteMissingUser);
    }

    Ok(())
}

/// Get the user the identity provider knows as `external_id`.
///
/// # Errors
///
/// Returns a [Error::SqlError] if an SQL related error occurred.
pub fn get_user_by_external_id(
    external_id: &str,
    connection: &Connection,
) -> Result<Option<User>, Error> {
    connection
        .query_row(
            "SELECT id, external_id, name, email, image_url, created_at
            FROM user WHERE external_id = ?1",
            (external_id,),
            map_user_row,
        )
        .optional()
        .map_err(|error| error.into())
}

/// Get every user with a count of the records they own, ordered by ID.
///
/// # Errors
///
/// Returns a [Error::SqlError] if an SQL related error occurred.
pub fn list_users_with_counts(connection: &Connection) -> Result<Vec<UserSummary>, Error> {
    connection
        .prepare(
            "SELECT u.id, u.external_id, u.name, u.email, u.image_url, u.created_at,
                (SELECT COUNT(*) FROM account a WHERE a.user_id = u.id),
                (SELECT COUNT(*) FROM \"transaction\" t WHERE t.user_id = u.id)
            FROM user u
            ORDER BY u.id ASC",
        )?
        .query_map([], |row| {
            Ok(UserSummary {
                user: map_user_row(row)?,
                account_count: row.get::<_, i64>(6)? as usize,
                transaction_count: row.get::<_, i64>(7)? as usize,
            })
        })?
        .map(|summary| summary.map_err(Error::from))
        .collect()
}
