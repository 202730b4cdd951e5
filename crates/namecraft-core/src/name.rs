//! The `NameData` wire shape shared by every endpoint.

use serde::{Deserialize, Serialize};

/// One character of a generated name with its reading and meaning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterBreakdown {
    /// The Chinese character.
    pub character: String,
    /// Its pinyin with tone marks.
    #[serde(default)]
    pub pinyin: String,
    /// Short gloss.
    #[serde(default)]
    pub meaning: String,
    /// Why the character was chosen.
    #[serde(default)]
    pub explanation: String,
}

/// A generated Chinese name.
///
/// Optional descriptive fields default to empty strings so that model output
/// missing them still deserializes; [`NameData::is_complete`] checks the
/// fields a name cannot do without.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NameData {
    /// The full name in Chinese characters.
    #[serde(default)]
    pub chinese: String,
    /// Full pinyin.
    #[serde(default)]
    pub pinyin: String,
    /// Per-character breakdown.
    #[serde(default)]
    pub characters: Vec<CharacterBreakdown>,
    /// Overall meaning.
    #[serde(default)]
    pub meaning: String,
    /// Cultural background.
    #[serde(default)]
    pub cultural_notes: String,
    /// How the name fits the requested personality.
    #[serde(default)]
    pub personality_match: String,
    /// Style tag (e.g. "classic", "modern").
    #[serde(default)]
    pub style: String,
}

impl NameData {
    /// Whether the name carries `chinese`, `pinyin` and at least one character.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        !self.chinese.trim().is_empty()
            && !self.pinyin.trim().is_empty()
            && !self.characters.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_shape_uses_camel_case() {
        let name = NameData {
            chinese: "王浩然".into(),
            pinyin: "Wáng Hàorán".into(),
            characters: vec![CharacterBreakdown {
                character: "王".into(),
                pinyin: "wáng".into(),
                meaning: "king".into(),
                explanation: "surname".into(),
            }],
            meaning: "vast and upright".into(),
            cultural_notes: "from Mencius".into(),
            personality_match: "bold".into(),
            style: "classic".into(),
        };
        let value = serde_json::to_value(&name).unwrap();
        assert_eq!(value["culturalNotes"], "from Mencius");
        assert_eq!(value["personalityMatch"], "bold");
        assert_eq!(value["characters"][0]["character"], "王");
    }

    #[test]
    fn missing_characters_is_incomplete() {
        let name: NameData =
            serde_json::from_str(r#"{"chinese":"李白","pinyin":"Lǐ Bái"}"#).unwrap();
        assert!(!name.is_complete());
        assert_eq!(name.style, "");
    }
}
