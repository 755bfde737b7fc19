use std::{error::Error, path::Path, process::exit};

use clap::Parser;
use rusqlite::Connection;

use spendsense::{delete_user, get_user_by_external_id, initialize_db};

/// A utility for deleting a user and everything they own.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to the application SQLite database.
    #[arg(long)]
    db_path: String,

    /// The identity provider's ID for the user, e.g. "user_2abc...".
    #[arg(long)]
    external_id: String,
}

/// Delete one user along with their accounts and transactions.
fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    let db_path = Path::new(&args.db_path);

    if !db_path.is_file() {
        eprintln!("File does not exist at {db_path:#?}!");
        exit(1);
    }

    let conn = Connection::open(db_path)?;
    // Turns on the foreign keys that delete the user's accounts and transactions.
    initialize_db(&conn)?;

    let Some(user) = get_user_by_external_id(&args.external_id, &conn)? else {
        eprintln!("No user with the ID {}", args.external_id);
        exit(1);
    };

    println!("Deleting {} ({})...", user.name, user.external_id);
    delete_user(&user.external_id, &conn)?;
    println!("Success!");

    Ok(())
}
