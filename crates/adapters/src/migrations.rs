pub const MIGRATIONS: &[&str] = &["CREATE TABLE IF NOT EXISTS snapshots (
        key TEXT PRIMARY KEY NOT NULL,
        value TEXT NOT NULL,
        updated_at TEXT NOT NULL
    );"];
