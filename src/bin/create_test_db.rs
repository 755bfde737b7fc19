use std::error::Error;
use std::path::Path;
use std::process::exit;

use clap::Parser;
use rusqlite::Connection;
use time::{Duration, OffsetDateTime};

use spendsense::{
    NewAccount, NewTransaction, TransactionType, UserProfile, create_account, create_transaction,
    initialize_db, upsert_user,
};

/// A utility for creating a test database for the SpendSense AI web server.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to save the SQLite database to.
    #[arg(long, short)]
    output_path: String,

    /// The identity provider's ID for the test user, send it in the identity header.
    #[arg(long, default_value = "user_test")]
    external_id: String,
}

const EXPENSES: [(&str, &str, f64); 10] = [
    ("Food & Dining", "Groceries", 84.30),
    ("Transportation", "Fuel", 62.10),
    ("Shopping", "New shoes", 120.00),
    ("Entertainment", "Movie night", 32.50),
    ("Bills & Utilities", "Power bill", 145.72),
    ("Healthcare", "Pharmacy", 18.99),
    ("Travel", "Weekend away", 310.00),
    ("Home", "Hardware store", 56.45),
    ("Food & Dining", "Coffee", 5.50),
    ("Business", "Software subscription", 24.00),
];

/// Create and populate a database for manual testing.
fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let output_path = Path::new(&args.output_path);

    match output_path.extension() {
        None => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        Some(extension) if extension.is_empty() => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        _ => {}
    }

    if output_path.is_file() {
        eprintln!("File already exists at {output_path:#?}!");
        exit(1);
    }

    println!("Creating database at {output_path:#?}");
    let conn = Connection::open(output_path)?;

    initialize_db(&conn)?;

    println!("Creating test user {}...", args.external_id);
    let user = upsert_user(
        &args.external_id,
        &UserProfile {
            name: "Test User".to_owned(),
            email: Some("test@example.com".to_owned()),
            image_url: None,
        },
        &conn,
    )?;

    println!("Creating accounts...");
    let everyday = create_account(
        NewAccount {
            name: "Everyday".to_owned(),
            is_default: true,
        },
        user.id,
        &conn,
    )?;
    let credit_card = create_account(
        NewAccount {
            name: "Credit Card".to_owned(),
            is_default: false,
        },
        user.id,
        &conn,
    )?;

    println!("Creating transactions...");
    let now = OffsetDateTime::now_utc();
    let mut count = 0;

    for week in 0..52_i64 {
        let (category, description, amount) = EXPENSES[week as usize % EXPENSES.len()];
        let account = if week % 3 == 0 { &credit_card } else { &everyday };

        create_transaction(
            NewTransaction {
                account_id: account.id,
                transaction_type: TransactionType::Expense,
                category: Some(category.to_owned()),
                amount: amount + (week % 5) as f64,
                description: Some(description.to_owned()),
                date: now - Duration::weeks(week) - Duration::hours(week % 24),
            },
            user.id,
            &conn,
        )?;
        count += 1;

        if week % 2 == 0 {
            create_transaction(
                NewTransaction {
                    account_id: everyday.id,
                    transaction_type: TransactionType::Income,
                    category: Some("Income".to_owned()),
                    amount: 2450.0,
                    description: Some("Salary".to_owned()),
                    date: now - Duration::weeks(week) - Duration::days(1),
                },
                user.id,
                &conn,
            )?;
            count += 1;
        }
    }

    // One transaction without a category or description.
    create_transaction(
        NewTransaction {
            account_id: everyday.id,
            transaction_type: TransactionType::Expense,
            category: None,
            amount: 12.0,
            description: None,
            date: now - Duration::days(2),
        },
        user.id,
        &conn,
    )?;
    count += 1;

    println!("Created {count} transactions.");
    println!("Success!");

    Ok(())
}
