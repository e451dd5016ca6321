//! [`SqliteStore`]: the SQLite implementation of [`PlotStore`].

use std::path::Path;

use rusqlite::{OptionalExtension as _, params};
use tracing::debug;

use plotlines_core::{
  person::{NewPerson, Person, PersonId, PersonPatch},
  relation::{EnemyEdge, EnemyKey, FriendEdge, FriendKey, PairEdge, PairKey},
  store::PlotStore,
};

use crate::{
  Error, Result,
  encode::{self, ENEMY_COLUMNS, FRIEND_COLUMNS, PAIR_COLUMNS, PERSON_COLUMNS},
  schema::{SCHEMA, SCHEMA_VERSION},
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A plotlines store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    let found: i64 = self
      .conn
      .call(|conn| Ok(conn.query_row("PRAGMA user_version", [], |r| r.get(0))?))
      .await?;
    if found > SCHEMA_VERSION {
      return Err(Error::SchemaVersion { found, supported: SCHEMA_VERSION });
    }

    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    debug!(version = SCHEMA_VERSION, "schema ready");
    Ok(())
  }

  async fn select<T, F>(&self, sql: String, map: F) -> Result<Vec<T>>
  where
    T: Send + 'static,
    F: Fn(&rusqlite::Row<'_>) -> rusqlite::Result<T> + Send + 'static,
  {
    let rows = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map([], |row| map(row))?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(rows)
  }
}

// ─── PlotStore impl ──────────────────────────────────────────────────────────

impl PlotStore for SqliteStore {
  type Error = Error;

  // ── People ────────────────────────────────────────────────────────────────

  async fn list_people(&self) -> Result<Vec<Person>> {
    self
      .select(
        format!("SELECT {PERSON_COLUMNS} FROM people ORDER BY name COLLATE NOCASE, id"),
        encode::person,
      )
      .await
  }

  async fn get_person(&self, id: PersonId) -> Result<Option<Person>> {
    let person = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!("SELECT {PERSON_COLUMNS} FROM people WHERE id = ?1"),
            params![id],
            encode::person,
          )
          .optional()?)
      })
      .await?;
    Ok(person)
  }

  async fn add_person(&self, input: NewPerson) -> Result<Person> {
    let person = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO people (name, pictureURL, bio, arrived, deactivated)
           VALUES (?1, ?2, ?3, ?4, ?5)",
          params![
            input.name,
            input.picture_url,
            input.bio,
            input.arrived,
            input.deactivated,
          ],
        )?;
        Ok(input.into_person(conn.last_insert_rowid()))
      })
      .await?;
    Ok(person)
  }

  async fn update_person(&self, id: PersonId, patch: PersonPatch) -> Result<Option<Person>> {
    let updated = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let current = tx
          .query_row(
            &format!("SELECT {PERSON_COLUMNS} FROM people WHERE id = ?1"),
            params![id],
            encode::person,
          )
          .optional()?;
        let Some(mut person) = current else {
          return Ok(None);
        };

        patch.apply(&mut person);
        tx.execute(
          "UPDATE people
           SET name = ?2, pictureURL = ?3, bio = ?4, arrived = ?5, deactivated = ?6
           WHERE id = ?1",
          params![
            person.id,
            person.name,
            person.picture_url,
            person.bio,
            person.arrived,
            person.deactivated,
          ],
        )?;
        tx.commit()?;
        Ok(Some(person))
      })
      .await?;
    Ok(updated)
  }

  /// Relations go with the person through `ON DELETE CASCADE`.
  async fn remove_person(&self, id: PersonId) -> Result<bool> {
    let n = self
      .conn
      .call(move |conn| Ok(conn.execute("DELETE FROM people WHERE id = ?1", params![id])?))
      .await?;
    Ok(n > 0)
  }

  // ── Friends ───────────────────────────────────────────────────────────────

  async fn list_friends(&self) -> Result<Vec<FriendEdge>> {
    self
      .select(format!("SELECT {FRIEND_COLUMNS} FROM friends ORDER BY rowid"), encode::friend)
      .await
  }

  /// Re-adding the same `(friend_1, friend_2, episode)` replaces the
  /// annotations in place.
  async fn add_friend(&self, edge: FriendEdge) -> Result<FriendEdge> {
    let row = edge.clone();
    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO friends (friend_1, friend_2, emoji, context, episode, imageURL)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6)
           ON CONFLICT (friend_1, friend_2, episode) DO UPDATE SET
             emoji = excluded.emoji,
             context = excluded.context,
             imageURL = excluded.imageURL",
          params![row.person_a, row.person_b, row.emoji, row.context, row.episode, row.image_url],
        )?;
        Ok(())
      })
      .await?;
    Ok(edge)
  }

  async fn remove_friend(&self, key: FriendKey) -> Result<bool> {
    let n = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM friends WHERE friend_1 = ?1 AND friend_2 = ?2 AND episode = ?3",
          params![key.person_a, key.person_b, key.episode],
        )?)
      })
      .await?;
    Ok(n > 0)
  }

  // ── Enemies ───────────────────────────────────────────────────────────────

  async fn list_enemies(&self) -> Result<Vec<EnemyEdge>> {
    self
      .select(format!("SELECT {ENEMY_COLUMNS} FROM enemies ORDER BY id"), encode::enemy)
      .await
  }

  async fn add_enemy(&self, edge: EnemyEdge) -> Result<EnemyEdge> {
    let row = edge.clone();
    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO enemies (enemy_1, enemy_2, emoji, context) VALUES (?1, ?2, ?3, ?4)",
          params![row.person_a, row.person_b, row.emoji, row.context],
        )?;
        Ok(())
      })
      .await?;
    Ok(edge)
  }

  async fn remove_enemy(&self, key: EnemyKey) -> Result<bool> {
    let n = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM enemies
           WHERE (enemy_1 = ?1 AND enemy_2 = ?2) OR (enemy_1 = ?2 AND enemy_2 = ?1)",
          params![key.person_a, key.person_b],
        )?)
      })
      .await?;
    Ok(n > 0)
  }

  // ── Pairs ─────────────────────────────────────────────────────────────────

  async fn list_pairs(&self) -> Result<Vec<PairEdge>> {
    self
      .select(format!("SELECT {PAIR_COLUMNS} FROM pairs ORDER BY rowid"), encode::pair)
      .await
  }

  /// Recording a pair that already exists in either order is a no-op.
  async fn add_pair(&self, pair: PairEdge) -> Result<PairEdge> {
    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO pairs (pair_1, pair_2, episode)
           SELECT ?1, ?2, ?3
           WHERE NOT EXISTS (
             SELECT 1 FROM pairs
             WHERE episode = ?3
               AND ((pair_1 = ?1 AND pair_2 = ?2) OR (pair_1 = ?2 AND pair_2 = ?1))
           )",
          params![pair.person_a, pair.person_b, pair.episode],
        )?;
        Ok(())
      })
      .await?;
    Ok(pair)
  }

  async fn remove_pair(&self, key: PairKey) -> Result<bool> {
    let n = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM pairs
           WHERE episode = ?3
             AND ((pair_1 = ?1 AND pair_2 = ?2) OR (pair_1 = ?2 AND pair_2 = ?1))",
          params![key.person_a, key.person_b, key.episode],
        )?)
      })
      .await?;
    Ok(n > 0)
  }
}
