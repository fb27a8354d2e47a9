//! Shared test utilities.
//!
//! Every test gets its own in-memory SQLite database seeded with a small
//! `users` table, so tests never share state.

use std::io;
use std::sync::{Arc, Mutex};

use rstest::fixture;

use crate::db::{ConnectOptions, Database, DatabaseConfig};

/// Schema and rows loaded into every test database.
pub const USERS_FIXTURE: &str = "
    CREATE TABLE users (
        id INTEGER PRIMARY KEY,
        name TEXT NOT NULL
    );
    INSERT INTO users (id, name) VALUES (1, 'Ada');
    INSERT INTO users (id, name) VALUES (2, 'Alan');
";

/// Open an in-memory database seeded with [`USERS_FIXTURE`].
///
/// Counters start at zero; the seeding statements are not counted.
pub fn open_memory_db() -> Database {
    open_memory_db_with(ConnectOptions::default())
}

/// Like [`open_memory_db`] with explicit session options.
pub fn open_memory_db_with(options: ConnectOptions) -> Database {
    let mut db = Database::open(&DatabaseConfig::Memory, options)
        .expect("Failed to open in-memory database");
    seed(&mut db, USERS_FIXTURE);
    db.reset_session_state();
    db
}

/// Run each `;`-separated statement of `script`.
pub fn seed(db: &mut Database, script: &str) {
    for statement in script.split(';').map(str::trim).filter(|s| !s.is_empty()) {
        db.execute(statement, &[])
            .unwrap_or_else(|e| panic!("Fixture statement failed: {}\n{}", e, statement));
    }
}

/// rstest fixture wrapping [`open_memory_db`].
#[fixture]
pub fn users_db() -> Database {
    open_memory_db()
}

/// Shared in-memory sink for formatted log output.
#[derive(Clone, Default)]
struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl io::Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Run `f` with a thread-local subscriber and return the `ERROR` lines it logged.
pub fn capture_errors(f: impl FnOnce()) -> Vec<String> {
    let buffer = LogBuffer::default();
    let writer = buffer.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || writer.clone())
        .with_ansi(false)
        .with_max_level(tracing::Level::ERROR)
        .finish();
    tracing::subscriber::with_default(subscriber, f);

    let bytes = buffer.0.lock().unwrap().clone();
    String::from_utf8_lossy(&bytes)
        .lines()
        .filter(|line| line.contains("ERROR"))
        .map(str::to_string)
        .collect()
}
