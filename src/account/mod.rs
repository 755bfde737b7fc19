//! Bank accounts and credit cards that transactions are recorded against.

mod core;

pub use core::{
    Account, AccountId, NewAccount, account_name, create_account, create_account_table,
    default_account, get_accounts_for_user,
};
