//! Saved names.
//!
//! Saved names are copies, not references to generated rows, so they outlive
//! the batch they came from.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{CharacterBreakdown, NameData, SavedNameId, UserId};

/// A name the user kept.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedName {
    /// Saved name id.
    pub id: SavedNameId,
    /// Owner.
    pub user_id: UserId,
    /// Name in Chinese characters.
    pub chinese_name: String,
    /// Full pinyin.
    pub pinyin: String,
    /// Overall meaning.
    pub meaning: String,
    /// Cultural background.
    pub cultural_notes: String,
    /// Personality fit.
    pub personality_match: String,
    /// Per-character breakdown.
    pub characters: Vec<CharacterBreakdown>,
    /// Starred by the user.
    pub is_favorite: bool,
    /// The one name the user picked. At most one per user.
    pub is_selected: bool,
    /// When the name was saved.
    pub created_at: DateTime<Utc>,
    /// When the name was last changed.
    pub updated_at: DateTime<Utc>,
}

impl SavedName {
    /// Copy a generated name into a new saved name.
    #[must_use]
    pub fn from_name(user_id: UserId, name: &NameData, is_favorite: bool) -> Self {
        let now = Utc::now();
        Self {
            id: SavedNameId::generate(),
            user_id,
            chinese_name: name.chinese.clone(),
            pinyin: name.pinyin.clone(),
            meaning: name.meaning.clone(),
            cultural_notes: name.cultural_notes.clone(),
            personality_match: name.personality_match.clone(),
            characters: name.characters.clone(),
            is_favorite,
            is_selected: false,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Partial update of a saved name. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedNameUpdate {
    /// New favorite flag.
    pub is_favorite: Option<bool>,
    /// New selected flag. `Some(true)` clears every other selection.
    pub is_selected: Option<bool>,
    /// Replacement meaning text.
    pub meaning: Option<String>,
    /// Replacement cultural notes.
    pub cultural_notes: Option<String>,
    /// Replacement personality fit.
    pub personality_match: Option<String>,
}
