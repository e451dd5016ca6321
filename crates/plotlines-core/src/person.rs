//! People appearing on the show, and the episodes during which they are on
//! screen.

use serde::{Deserialize, Deserializer, Serialize};
use strum::{Display, EnumString};

use crate::error::ValidationError;

/// Primary key of a [`Person`] row.
pub type PersonId = i64;

/// Index of a time-ordered segment of the show.
pub type Episode = i64;

// ─── Person ──────────────────────────────────────────────────────────────────

/// A row of the `people` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
  pub id:          PersonId,
  pub name:        String,
  #[serde(rename = "pictureURL", default)]
  pub picture_url: Option<String>,
  #[serde(default)]
  pub bio:         Option<String>,
  /// First episode the person is on screen. `None` means from the start.
  #[serde(default)]
  pub arrived:     Option<Episode>,
  /// First episode the person is gone. `None` means they never leave.
  #[serde(default)]
  pub deactivated: Option<Episode>,
}

/// Where a person stands at a given episode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
  /// Not introduced yet; the person is left out of the graph entirely.
  NotArrived,
  Active,
  /// Introduced and later deactivated; still drawn, but muted.
  Departed,
}

/// Which predicate decides a person's [`Presence`].
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize,
  Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum VisibilityModel {
  /// Episode-range membership: active on `[arrived, deactivated)`.
  #[default]
  Range,
  /// Plain `isActive` flag, derived as `deactivated.is_none()`. Arrival is
  /// ignored and everyone is always introduced.
  Flag,
}

impl Person {
  /// The boolean-model view of this person.
  pub fn is_active(&self) -> bool { self.deactivated.is_none() }

  pub fn presence(&self, episode: Episode, model: VisibilityModel) -> Presence {
    match model {
      VisibilityModel::Range => {
        if self.arrived.is_some_and(|arrived| arrived > episode) {
          Presence::NotArrived
        } else if self.deactivated.is_some_and(|gone| gone <= episode) {
          Presence::Departed
        } else {
          Presence::Active
        }
      }
      VisibilityModel::Flag => {
        if self.is_active() {
          Presence::Active
        } else {
          Presence::Departed
        }
      }
    }
  }
}

// ─── NewPerson ───────────────────────────────────────────────────────────────

/// Input to [`crate::store::PlotStore::add_person`]. The id is assigned by the
/// store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPerson {
  pub name:        String,
  #[serde(rename = "pictureURL", default)]
  pub picture_url: Option<String>,
  #[serde(default)]
  pub bio:         Option<String>,
  #[serde(default)]
  pub arrived:     Option<Episode>,
  #[serde(default)]
  pub deactivated: Option<Episode>,
}

impl NewPerson {
  pub fn named(name: impl Into<String>) -> Self {
    Self { name: name.into(), ..Self::default() }
  }

  pub fn validate(&self) -> Result<(), ValidationError> {
    if self.name.trim().is_empty() {
      return Err(ValidationError::EmptyName);
    }
    Ok(())
  }

  /// Build the stored row once the store has assigned `id`.
  pub fn into_person(self, id: PersonId) -> Person {
    Person {
      id,
      name: self.name,
      picture_url: self.picture_url,
      bio: self.bio,
      arrived: self.arrived,
      deactivated: self.deactivated,
    }
  }
}

// ─── PersonPatch ─────────────────────────────────────────────────────────────

/// A partial update of a [`Person`].
///
/// Nullable columns are tri-state: an absent field is left alone, an explicit
/// `null` clears the column, and a value sets it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonPatch {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub name:        Option<String>,
  #[serde(
    rename = "pictureURL",
    default,
    deserialize_with = "present",
    skip_serializing_if = "Option::is_none"
  )]
  pub picture_url: Option<Option<String>>,
  #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
  pub bio:         Option<Option<String>>,
  #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
  pub arrived:     Option<Option<Episode>>,
  #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
  pub deactivated: Option<Option<Episode>>,
}

/// Distinguishes an explicit `null` from a missing field.
fn present<'de, D, T>(de: D) -> Result<Option<Option<T>>, D::Error>
where
  D: Deserializer<'de>,
  T: Deserialize<'de>,
{
  Option::<T>::deserialize(de).map(Some)
}

impl PersonPatch {
  /// Toggle a person in or out of the show as of `episode`.
  pub fn activity(active: bool, episode: Episode) -> Self {
    Self {
      deactivated: Some((!active).then_some(episode)),
      ..Self::default()
    }
  }

  pub fn is_empty(&self) -> bool { *self == Self::default() }

  pub fn validate(&self) -> Result<(), ValidationError> {
    match &self.name {
      Some(name) if name.trim().is_empty() => Err(ValidationError::EmptyName),
      _ => Ok(()),
    }
  }

  pub fn apply(&self, person: &mut Person) {
    if let Some(name) = &self.name {
      person.name = name.clone();
    }
    if let Some(url) = &self.picture_url {
      person.picture_url = url.clone();
    }
    if let Some(bio) = &self.bio {
      person.bio = bio.clone();
    }
    if let Some(arrived) = self.arrived {
      person.arrived = arrived;
    }
    if let Some(deactivated) = self.deactivated {
      person.deactivated = deactivated;
    }
  }
}
