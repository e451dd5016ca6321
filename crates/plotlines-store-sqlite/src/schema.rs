//! SQL schema for the plotlines SQLite store.
//!
//! Executed once at connection startup. Column names double as the JSON field
//! names served by the API, hence `pictureURL` and `imageURL`.

/// Version written to `PRAGMA user_version` by [`SCHEMA`].
pub const SCHEMA_VERSION: i64 = 1;

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS people (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    name        TEXT NOT NULL,
    pictureURL  TEXT,
    bio         TEXT,
    arrived     INTEGER,   -- first episode on screen; NULL = from the start
    deactivated INTEGER    -- first episode off screen; NULL = still in
);

-- One row per directed friendship per episode.
CREATE TABLE IF NOT EXISTS friends (
    friend_1 INTEGER NOT NULL REFERENCES people(id) ON DELETE CASCADE,
    friend_2 INTEGER NOT NULL REFERENCES people(id) ON DELETE CASCADE,
    emoji    TEXT,
    context  TEXT,
    episode  INTEGER NOT NULL,
    imageURL TEXT,
    PRIMARY KEY (friend_1, friend_2, episode),
    CHECK (friend_1 != friend_2)
);

-- Rivalries have no episode; they last for the whole season.
CREATE TABLE IF NOT EXISTS enemies (
    id      INTEGER PRIMARY KEY AUTOINCREMENT,
    enemy_1 INTEGER NOT NULL REFERENCES people(id) ON DELETE CASCADE,
    enemy_2 INTEGER NOT NULL REFERENCES people(id) ON DELETE CASCADE,
    emoji   TEXT,
    context TEXT,
    CHECK (enemy_1 != enemy_2)
);

CREATE TABLE IF NOT EXISTS pairs (
    pair_1  INTEGER NOT NULL REFERENCES people(id) ON DELETE CASCADE,
    pair_2  INTEGER NOT NULL REFERENCES people(id) ON DELETE CASCADE,
    episode INTEGER NOT NULL,
    UNIQUE (pair_1, pair_2, episode),
    CHECK  (pair_1 != pair_2)
);

CREATE INDEX IF NOT EXISTS friends_episode_idx ON friends(episode);
CREATE INDEX IF NOT EXISTS pairs_episode_idx   ON pairs(episode);

PRAGMA user_version = 1;
";
