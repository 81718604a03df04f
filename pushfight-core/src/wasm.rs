//! WASM bindings for pushfight-core
//!
//! Provides a JavaScript-friendly API for the rules engine. Fields are
//! passed as indices (0-25), pieces as compact codes (see [`crate::piece`]).

use serde::Serialize;
use wasm_bindgen::prelude::*;

use crate::{Color, Field, Perm, Position, Turn, Validity};

/// WASM-friendly wrapper around Position
#[wasm_bindgen]
pub struct WasmPosition {
    inner: Position,
}

fn field(index: u8) -> Result<Field, JsError> {
    Field::new(index as usize).ok_or_else(|| JsError::new(&format!("no such field: {}", index)))
}

fn color(player: u8) -> Result<Color, JsError> {
    Color::from_index(player).ok_or_else(|| JsError::new(&format!("no such player: {}", player)))
}

#[wasm_bindgen]
impl WasmPosition {
    /// Create the standard starting position
    #[wasm_bindgen(constructor)]
    pub fn new() -> WasmPosition {
        WasmPosition { inner: Position::initial() }
    }

    /// Parse a 26-character position string
    pub fn parse(s: &str) -> Result<WasmPosition, JsError> {
        let inner: Position = s.parse()?;
        Ok(WasmPosition { inner })
    }

    /// Create the in-progress position with the given permutation index
    /// (red to move)
    #[wasm_bindgen(js_name = fromIndex)]
    pub fn from_index(index: u64) -> Result<WasmPosition, JsError> {
        let perm = Perm::at_index(index)?;
        Ok(WasmPosition { inner: perm.to_position() })
    }

    #[wasm_bindgen(js_name = toString)]
    pub fn to_string_js(&self) -> String {
        self.inner.to_string()
    }

    /// Position string with the anchor (if any) on blue
    pub fn normalized(&self) -> String {
        self.inner.to_normalized_string()
    }

    /// Classification as { kind, nextPlayer?, index?, winner?, reason? }
    pub fn validate(&self) -> Result<JsValue, JsError> {
        let model = ValidityModel::from(self.inner.validate());
        Ok(serde_wasm_bindgen::to_value(&model)?)
    }

    /// Compact piece code on a field
    #[wasm_bindgen(js_name = pieceAt)]
    pub fn piece_at(&self, index: u8) -> Result<u8, JsError> {
        Ok(self.inner[field(index)?].to_code())
    }

    /// Empty fields the piece on `index` can slide to, breadth-first
    #[wasm_bindgen(js_name = moveDestinations)]
    pub fn move_destinations(&self, index: u8) -> Result<Vec<u8>, JsError> {
        let dests = crate::moves::move_destinations(self.inner.pieces(), field(index)?);
        Ok(dests.into_iter().map(|f| f.index() as u8).collect())
    }

    /// Fields the piece on `index` can push into
    #[wasm_bindgen(js_name = pushDestinations)]
    pub fn push_destinations(&self, index: u8) -> Result<Vec<u8>, JsError> {
        let dests = crate::moves::push_destinations(self.inner.pieces(), field(index)?);
        Ok(dests.into_iter().map(|f| f.index() as u8).collect())
    }

    /// Validate and play a turn such as "d4-c4,c2-d2" for player 0 (red)
    /// or 1 (blue). Returns the eliminated color (0 or 1), or -1.
    #[wasm_bindgen(js_name = applyTurn)]
    pub fn apply_turn(&mut self, player: u8, turn: &str) -> Result<i8, JsError> {
        let player = color(player)?;
        let turn: Turn = turn.parse()?;
        let next = self.inner.validate_turn(player, &turn)?;
        let eliminated = self.inner.apply(&turn);
        debug_assert_eq!(self.inner, next);
        Ok(eliminated.map_or(-1, |c| c.index() as i8))
    }

    /// Every distinct turn for the player, as turn strings
    pub fn successors(&self, player: u8) -> Result<Vec<String>, JsError> {
        let player = color(player)?;
        Ok(self
            .inner
            .successors(player)
            .into_iter()
            .map(|s| s.turn.to_string())
            .collect())
    }

    /// Clone the position
    #[wasm_bindgen(js_name = clone)]
    pub fn clone_position(&self) -> WasmPosition {
        WasmPosition { inner: self.inner }
    }
}

impl Default for WasmPosition {
    fn default() -> Self {
        Self::new()
    }
}

/// Serializable classification for JavaScript
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ValidityModel {
    kind: &'static str,
    next_player: Option<Color>,
    index: Option<u64>,
    winner: Option<Color>,
    reason: Option<String>,
}

impl From<Validity> for ValidityModel {
    fn from(validity: Validity) -> Self {
        let mut model = ValidityModel {
            kind: "",
            next_player: None,
            index: None,
            winner: None,
            reason: None,
        };
        match validity {
            Validity::Started { next_player } => {
                model.kind = "started";
                model.next_player = Some(next_player);
            }
            Validity::InProgress { next_player, index } => {
                model.kind = "inProgress";
                model.next_player = Some(next_player);
                model.index = Some(index);
            }
            Validity::Finished { winner } => {
                model.kind = "finished";
                model.winner = Some(winner);
            }
            Validity::Invalid(reason) => {
                model.kind = "invalid";
                model.reason = Some(reason.to_string());
            }
        }
        model
    }
}
