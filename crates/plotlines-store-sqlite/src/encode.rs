//! Row mapping between SQLite rows and the core row types.
//!
//! Every `SELECT` in the store lists columns in the order given by the
//! `*_COLUMNS` constants, so the mappers can read by position.

use plotlines_core::{
  person::Person,
  relation::{EnemyEdge, FriendEdge, PairEdge},
};
use rusqlite::Row;

pub const PERSON_COLUMNS: &str = "id, name, pictureURL, bio, arrived, deactivated";

pub const FRIEND_COLUMNS: &str = "friend_1, friend_2, emoji, context, episode, imageURL";

pub const ENEMY_COLUMNS: &str = "enemy_1, enemy_2, emoji, context";

pub const PAIR_COLUMNS: &str = "pair_1, pair_2, episode";

pub fn person(row: &Row<'_>) -> rusqlite::Result<Person> {
  Ok(Person {
    id:          row.get(0)?,
    name:        row.get(1)?,
    picture_url: row.get(2)?,
    bio:         row.get(3)?,
    arrived:     row.get(4)?,
    deactivated: row.get(5)?,
  })
}

pub fn friend(row: &Row<'_>) -> rusqlite::Result<FriendEdge> {
  Ok(FriendEdge {
    person_a:  row.get(0)?,
    person_b:  row.get(1)?,
    emoji:     row.get(2)?,
    context:   row.get(3)?,
    episode:   row.get(4)?,
    image_url: row.get(5)?,
  })
}

pub fn enemy(row: &Row<'_>) -> rusqlite::Result<EnemyEdge> {
  Ok(EnemyEdge {
    person_a: row.get(0)?,
    person_b: row.get(1)?,
    emoji:    row.get(2)?,
    context:  row.get(3)?,
  })
}

pub fn pair(row: &Row<'_>) -> rusqlite::Result<PairEdge> {
  Ok(PairEdge {
    person_a: row.get(0)?,
    person_b: row.get(1)?,
    episode:  row.get(2)?,
  })
}
