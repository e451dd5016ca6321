//! Error types for `plotlines-core`.

use thiserror::Error;

use crate::person::{Episode, PersonId};

/// Input rejected before any store call is made.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
  #[error("person {0} cannot be related to themselves")]
  SelfRelation(PersonId),

  #[error("name must not be empty")]
  EmptyName,

  #[error("person {person} is already paired in episode {episode}")]
  AlreadyPaired { person: PersonId, episode: Episode },

  #[error("unknown person: {0}")]
  UnknownPerson(PersonId),
}

#[derive(Debug, Error)]
pub enum Error {
  #[error("invalid input: {0}")]
  Validation(#[from] ValidationError),

  #[error("person not found: {0}")]
  PersonNotFound(PersonId),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  pub fn is_validation(&self) -> bool { matches!(self, Self::Validation(_)) }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
