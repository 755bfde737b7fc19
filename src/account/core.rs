use rusqlite::Connection;

use crate::{Error, user::UserId};

pub type AccountId = i64;

/// A bank account or credit card owned by a user.
#[derive(Debug, Clone, PartialEq)]
pub struct Account {
    /// The id for the account.
    pub id: AccountId,
    /// The user that owns the account.
    pub user_id: UserId,
    /// The display name of the account.
    pub name: String,
    /// Whether the dashboard should select this account first.
    pub is_default: bool,
}

/// The data needed to create an [Account].
#[derive(Debug, Clone, PartialEq)]
pub struct NewAccount {
    pub name: String,
    pub is_default: bool,
}

pub fn create_account_table(connection: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS account (
            id INTEGER PRIMARY KEY,
            user_id INTEGER NOT NULL,
            name TEXT NOT NULL,
            is_default INTEGER NOT NULL DEFAULT 0,
            FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE
        )",
        (),
    )?;

    Ok(())
}

fn map_row_to_account(row: &rusqlite::Row) -> Result<Account, rusqlite::Error> {
    let id = row.get(0)?;
    let user_id = UserId::new(row.get(1)?);
    let name = row.get(2)?;
    let is_default = row.get(3)?;

    Ok(Account {
        id,
        user_id,
        name,
        is_default,
    })
}

/// Create a new account for `user_id`.
///
/// A user may only have one default account, so creating a default account
/// clears the flag on the user's other accounts.
///
/// # Errors
/// Returns [Error::SqlError] if the SQL query fails, e.g., `user_id` does not
/// refer to a user.
pub fn create_account(
    account: NewAccount,
    user_id: UserId,
    connection: &Connection,
) -> Result<Account, Error> {
    if account.is_default {
        connection.execute(
            "UPDATE account SET is_default = 0 WHERE user_id = ?1",
            (user_id.as_i64(),),
        )?;
    }

    connection.execute(
        "INSERT INTO account (user_id, name, is_default) VALUES (?1, ?2, ?3)",
        (user_id.as_i64(), &account.name, account.is_default),
    )?;

    Ok(Account {
        id: connection.last_insert_rowid(),
        user_id,
        name: account.name,
        is_default: account.is_default,
    })
}

/// Get all of the accounts owned by `user_id` in the order they were created.
///
/// # Errors
/// Returns [Error::SqlError] if the SQL query fails.
pub fn get_accounts_for_user(
    user_id: UserId,
    connection: &Connection,
) -> Result<Vec<Account>, Error> {
    connection
        .prepare(
            "SELECT id, user_id, name, is_default FROM account
            WHERE user_id = ?1 ORDER BY id ASC",
        )?
        .query_map((user_id.as_i64(),), map_row_to_account)?
        .map(|account| account.map_err(Error::from))
        .collect()
}

/// The account to select when the user has not picked one: the account
/// flagged as default, otherwise the first account.
pub fn default_account(accounts: &[Account]) -> Option<&Account> {
    accounts
        .iter()
        .find(|account| account.is_default)
        .or_else(|| accounts.first())
}

/// The name of the account with `account_id`, or "Unknown Account".
pub fn account_name(accounts: &[Account], account_id: AccountId) -> &str {
    accounts
        .iter()
        .find(|account| account.id == account_id)
        .map(|account| account.name.as_str())
        .unwrap_or("Unknown Account")
}

#[cfg(test)]
mod create_table_tests {
    use rusqlite::Connection;

    use crate::user::create_user_table;

    use super::create_account_table;

    #[test]
    fn sql_is_valid() {
        let connection =
            Connection::open_in_memory().expect("Could not initialise in-memory SQLite database");
        create_user_table(&connection).unwrap();

        assert_eq!(Ok(()), create_account_table(&connection));
    }
}

#[cfg(test)]
mod account_query_tests {
    use rusqlite::Connection;

    use crate::{db::initialize, user::ensure_user};

    use super::{
        Account, NewAccount, account_name, create_account, default_account, get_accounts_for_user,
    };

    fn get_test_connection() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        conn
    }

    fn new_account(name: &str, is_default: bool) -> NewAccount {
        NewAccount {
            name: name.to_owned(),
            is_default,
        }
    }

    #[test]
    fn returns_only_the_users_accounts() {
        let conn = get_test_connection();
        let alice = ensure_user("alice", &conn).unwrap();
        let bob = ensure_user("bob", &conn).unwrap();
        let checking = create_account(new_account("Checking", true), alice, &conn).unwrap();
        create_account(new_account("Savings", true), bob, &conn).unwrap();

        let got = get_accounts_for_user(alice, &conn).unwrap();

        assert_eq!(got, vec![checking]);
    }

    #[test]
    fn creating_a_default_account_clears_the_previous_default() {
        let conn = get_test_connection();
        let user = ensure_user("alice", &conn).unwrap();
        create_account(new_account("Checking", true), user, &conn).unwrap();
        let savings = create_account(new_account("Savings", true), user, &conn).unwrap();

        let accounts = get_accounts_for_user(user, &conn).unwrap();
        let defaults: Vec<&Account> = accounts.iter().filter(|a| a.is_default).collect();

        assert_eq!(defaults, vec![&savings]);
    }

    #[test]
    fn default_account_prefers_flagged_account() {
        let conn = get_test_connection();
        let user = ensure_user("alice", &conn).unwrap();
        create_account(new_account("Checking", false), user, &conn).unwrap();
        let savings = create_account(new_account("Savings", true), user, &conn).unwrap();
        let accounts = get_accounts_for_user(user, &conn).unwrap();

        assert_eq!(default_account(&accounts), Some(&savings));
    }

    #[test]
    fn default_account_falls_back_to_first_account() {
        let conn = get_test_connection();
        let user = ensure_user("alice", &conn).unwrap();
        let checking = create_account(new_account("Checking", false), user, &conn).unwrap();
        create_account(new_account("Savings", false), user, &conn).unwrap();
        let accounts = get_accounts_for_user(user, &conn).unwrap();

        assert_eq!(default_account(&accounts), Some(&checking));
        assert_eq!(default_account(&[]), None);
    }

    #[test]
    fn unknown_account_name() {
        let conn = get_test_connection();
        let user = ensure_user("alice", &conn).unwrap();
        let checking = create_account(new_account("Checking", false), user, &conn).unwrap();
        let accounts = vec![checking.clone()];

        assert_eq!(account_name(&accounts, checking.id), "Checking");
        assert_eq!(account_name(&accounts, checking.id + 1), "Unknown Account");
    }
}
