use std::error::Error;
use std::path::Path;
use std::process::exit;

use clap::Parser;
use rusqlite::{Connection, Transaction};
use time::{Date, OffsetDateTime};

use finanzas_rs::initialize_db;

/// A utility for creating a test database for the finanzas_rs server.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to save the SQLite database to.
    #[arg(long, short)]
    output_path: String,

    /// The email address of the test user.
    #[arg(long, default_value = "test@example.com")]
    email: String,
}

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
    let mut conn = Connection::open(output_path)?;

    initialize_db(&conn)?;

    let tx = conn.transaction()?;

    println!("Creating test user {}...", args.email);
    tx.execute("INSERT INTO user (email) VALUES (?1)", (&args.email,))?;
    let user_id = tx.last_insert_rowid();

    println!("Creating accounts and categories...");
    let wallet = insert_account(&tx, user_id, "Wallet", "PEN", "150.00")?;
    let bank = insert_account(&tx, user_id, "Bank", "PEN", "2500.00")?;
    let dollars = insert_account(&tx, user_id, "Dollar savings", "USD", "800.00")?;

    let salary = insert_category(&tx, user_id, "Salary", "income")?;
    let food = insert_category(&tx, user_id, "Food", "expense")?;
    let transport = insert_category(&tx, user_id, "Transport", "expense")?;
    let housing = insert_category(&tx, user_id, "Housing", "expense")?;

    println!("Creating transactions...");
    let today = OffsetDateTime::now_utc().date();
    let day = |number: u8| today.replace_day(number.min(today.day()));

    let entries = [
        ("income", "4200.00", "PEN", day(1)?, bank, Some(salary), Some("Monthly pay")),
        ("expense", "1200.00", "PEN", day(2)?, bank, Some(housing), Some("Rent")),
        ("expense", "86.40", "PEN", day(3)?, wallet, Some(food), None),
        ("expense", "12.50", "PEN", day(4)?, wallet, Some(transport), Some("Taxi")),
        ("expense", "35.00", "USD", day(5)?, dollars, Some(food), Some("Dinner abroad")),
        ("expense", "19.90", "PEN", day(6)?, wallet, None, None),
    ];

    for (kind, amount, currency, date, account_id, category_id, note) in entries {
        insert_entry(
            &tx,
            user_id,
            kind,
            amount,
            currency,
            date,
            account_id,
            category_id,
            note,
            false,
        )?;
    }

    println!("Creating a transfer and budgets...");
    let transfer_date = day(7)?;
    insert_entry(
        &tx,
        user_id,
        "expense",
        "300.00",
        "PEN",
        transfer_date,
        bank,
        None,
        Some("Transfer to Wallet"),
        true,
    )?;
    insert_entry(
        &tx,
        user_id,
        "income",
        "300.00",
        "PEN",
        transfer_date,
        wallet,
        None,
        Some("Transfer from Bank"),
        true,
    )?;
    tx.execute(
        "INSERT INTO transfer (user_id, from_account_id, to_account_id, amount, currency, date)
        VALUES (?1, ?2, ?3, '300.00', 'PEN', ?4)",
        (user_id, bank, wallet, transfer_date),
    )?;

    for (category_id, limit) in [(food, "300.00"), (transport, "10.00"), (housing, "1200.00")] {
        tx.execute(
            "INSERT INTO budget (user_id, category_id, month, year, limit_amount, currency)
            VALUES (?1, ?2, ?3, ?4, ?5, 'PEN')",
            (user_id, category_id, today.month() as u8, today.year(), limit),
        )?;
    }

    tx.commit()?;

    println!("Success!");

    Ok(())
}

fn insert_account(
    tx: &Transaction,
    user_id: i64,
    name: &str,
    currency: &str,
    starting_balance: &str,
) -> Result<i64, rusqlite::Error> {
    tx.execute(
        "INSERT INTO account (user_id, name, currency, starting_balance) VALUES (?1, ?2, ?3, ?4)",
        (user_id, name, currency, starting_balance),
    )?;

    Ok(tx.last_insert_rowid())
}

fn insert_category(
    tx: &Transaction,
    user_id: i64,
    name: &str,
    kind: &str,
) -> Result<i64, rusqlite::Error> {
    tx.execute(
        "INSERT INTO category (user_id, name, kind) VALUES (?1, ?2, ?3)",
        (user_id, name, kind),
    )?;

    Ok(tx.last_insert_rowid())
}

#[allow(clippy::too_many_arguments)]
fn insert_entry(
    tx: &Transaction,
    user_id: i64,
    kind: &str,
    amount: &str,
    currency: &str,
    date: Date,
    account_id: i64,
    category_id: Option<i64>,
    note: Option<&str>,
    is_transfer: bool,
) -> Result<(), rusqlite::Error> {
    tx.execute(
        "INSERT INTO \"transaction\"
            (user_id, kind, amount, currency, date, note, account_id, category_id, is_transfer)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        (
            user_id,
            kind,
            amount,
            currency,
            date,
            note,
            account_id,
            category_id,
            is_transfer,
        ),
    )?;

    Ok(())
}
