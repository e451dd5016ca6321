//! The tips board: a short, process-local list of advice for newcomers.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/tips` | `{"tips":[..]}` |
//! | `POST` | `/tips` | Body: `{"participant":".."}`; appends and returns the full list |
//!
//! Tips are not persisted; a restart brings back the seed list.

use std::sync::{Arc, Mutex, PoisonError};

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};

/// The tips every board starts with.
pub const SEED_TIPS: [&str; 4] = [
  "Når man legger til en ny route, så må man huske å legge de til i listen i routes.ts-filen.",
  "Sanne er personen man bør gå til om man har veldig veldig vanskelige spørsmål.",
  "Det er ofte snacks ved vinduet i kantina!",
  "Vi låser Skuret på kvelden, så du kan fint legge igjen sekk og pc.",
];

#[derive(Debug)]
pub struct TipBoard {
  tips: Mutex<Vec<String>>,
}

impl Default for TipBoard {
  fn default() -> Self { Self::with_tips(SEED_TIPS.iter().map(|t| (*t).to_owned())) }
}

impl TipBoard {
  pub fn with_tips(tips: impl IntoIterator<Item = String>) -> Self {
    Self { tips: Mutex::new(tips.into_iter().collect()) }
  }

  pub fn all(&self) -> Vec<String> {
    self.tips.lock().unwrap_or_else(PoisonError::into_inner).clone()
  }

  /// Append `tip` and return the list as it stands afterwards.
  pub fn add(&self, tip: String) -> Vec<String> {
    let mut tips = self.tips.lock().unwrap_or_else(PoisonError::into_inner);
    tips.push(tip);
    tips.clone()
  }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TipsBody {
  pub tips: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct NewTip {
  pub participant: String,
}

/// `GET /tips`
pub async fn list(State(board): State<Arc<TipBoard>>) -> Json<TipsBody> {
  Json(TipsBody { tips: board.all() })
}

/// `POST /tips`
///
/// The tip is stored exactly as sent.
pub async fn create(
  State(board): State<Arc<TipBoard>>,
  Json(body): Json<NewTip>,
) -> Json<TipsBody> {
  tracing::debug!(tip = %body.participant, "tip added");
  Json(TipsBody { tips: board.add(body.participant) })
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn board_starts_with_the_seed_tips() {
    let board = TipBoard::default();
    assert_eq!(board.all(), SEED_TIPS);
  }

  #[test]
  fn added_tips_go_last() {
    let board = TipBoard::with_tips(Vec::new());
    board.add("Ta med innesko".into());
    assert_eq!(board.add("Husk navneskilt".into()), ["Ta med innesko", "Husk navneskilt"]);
  }

  #[tokio::test]
  async fn posted_tips_are_kept_as_sent() {
    let board = Arc::new(TipBoard::with_tips(Vec::new()));
    for participant in ["  Husk solkrem  ", ""] {
      create(State(Arc::clone(&board)), Json(NewTip { participant: participant.into() })).await;
    }
    assert_eq!(board.all(), ["  Husk solkrem  ", ""]);
  }
}
