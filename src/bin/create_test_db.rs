use std::error::Error;
use std::path::Path;
use std::process::exit;
use std::sync::{Arc, Mutex};

use clap::Parser;
use rusqlite::Connection;

use session_ledger::{
    SQLiteTransactionStore, SessionId, Transaction, TransactionStore, TransactionType,
    initialize_db,
};

/// A utility for creating a test database for the session ledger server.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to save the SQLite database to.
    #[arg(long, short)]
    output_path: String,
}

/// Create and populate a database for manual testing.
fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let output_path = Path::new(&args.output_path);

    match output_path.extension() {
        Some(extension) if !extension.is_empty() => {}
        _ => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
    }

    if output_path.is_file() {
        eprintln!("File already exists at {output_path:#?}!");
        exit(1);
    }

    println!("Creating database at {output_path:#?}");
    let conn = Connection::open(output_path)?;

    initialize_db(&conn)?;

    println!("Creating demo session...");

    let store = SQLiteTransactionStore::new(Arc::new(Mutex::new(conn)));
    let session_id = SessionId::generate();

    for (title, amount, kind) in [
        ("Salary", 100.0, TransactionType::Credit),
        ("Coffee", 5.0, TransactionType::Debit),
        ("Groceries", 42.5, TransactionType::Debit),
    ] {
        store.create(Transaction::build(session_id.clone(), title, amount, kind))?;
    }

    println!("Success! Set the cookie sessionId={session_id} to view the demo transactions.");

    Ok(())
}
