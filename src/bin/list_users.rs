use std::{error::Error, path::Path, process::exit};

use clap::Parser;
use rusqlite::Connection;

use spendsense::list_users_with_counts;

/// A utility for listing the users in a SpendSense AI database.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to the application SQLite database.
    #[arg(long)]
    db_path: String,
}

/// Print every user along with how many accounts and transactions they own.
fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    let db_path = Path::new(&args.db_path);

    if !db_path.is_file() {
        eprintln!("File does not exist at {db_path:#?}!");
        exit(1);
    }

    let conn = Connection::open(db_path)?;
    let users = list_users_with_counts(&conn)?;

    if users.is_empty() {
        println!("No users found.");
        return Ok(());
    }

    println!("Found {} user(s):", users.len());

    for summary in users {
        let user = summary.user;
        println!();
        println!("{} ({})", user.name, user.external_id);
        println!("  Email: {}", user.email.as_deref().unwrap_or("-"));
        println!("  Created: {}", user.created_at);
        println!("  Accounts: {}", summary.account_count);
        println!("  Transactions: {}", summary.transaction_count);
    }

    Ok(())
}
