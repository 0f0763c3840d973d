//! SQL schema for the CryptoLingo SQLite store.
//!
//! Executed once at connection startup via `PRAGMA user_version`. Future
//! migrations will be gated on that version number.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS users (
    wallet      TEXT PRIMARY KEY,
    total_xp    INTEGER NOT NULL DEFAULT 0,
    level       INTEGER NOT NULL DEFAULT 1,
    streak_days INTEGER NOT NULL DEFAULT 1,
    last_active TEXT,               -- ISO 8601 UTC; NULL before first activity
    created_at  TEXT NOT NULL,
    updated_at  TEXT NOT NULL
);

-- Static curriculum; written only by seeding and content authoring.
CREATE TABLE IF NOT EXISTS learning_paths (
    path_id       TEXT PRIMARY KEY,
    title         TEXT NOT NULL,
    description   TEXT NOT NULL,
    position      INTEGER NOT NULL UNIQUE,   -- display order across paths
    total_xp      INTEGER NOT NULL,
    total_lessons INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS lessons (
    lesson_id TEXT PRIMARY KEY,
    path_id   TEXT NOT NULL REFERENCES learning_paths(path_id),
    title     TEXT NOT NULL,
    position  INTEGER NOT NULL,   -- 1-based unlock order within the path
    xp_reward INTEGER NOT NULL,
    content   TEXT NOT NULL,      -- JSON-encoded LessonContent
    UNIQUE (path_id, position)
);

-- One row per (wallet, lesson). The UNIQUE pair is the authoritative
-- guard against double completion.
CREATE TABLE IF NOT EXISTS user_progress (
    progress_id  TEXT PRIMARY KEY,
    wallet       TEXT NOT NULL REFERENCES users(wallet),
    lesson_id    TEXT NOT NULL REFERENCES lessons(lesson_id),
    completed    INTEGER NOT NULL DEFAULT 0,
    completed_at TEXT,
    xp_earned    INTEGER NOT NULL DEFAULT 0,
    UNIQUE (wallet, lesson_id)
);

-- Badge unlocks are written once and never revoked.
CREATE TABLE IF NOT EXISTS achievement_unlocks (
    unlock_id      TEXT PRIMARY KEY,
    wallet         TEXT NOT NULL REFERENCES users(wallet),
    achievement_id TEXT NOT NULL,
    unlocked_at    TEXT NOT NULL,
    UNIQUE (wallet, achievement_id)
);

CREATE INDEX IF NOT EXISTS lessons_path_idx    ON lessons(path_id);
CREATE INDEX IF NOT EXISTS progress_wallet_idx ON user_progress(wallet);
CREATE INDEX IF NOT EXISTS unlocks_wallet_idx  ON achievement_unlocks(wallet);

PRAGMA user_version = 1;
";
