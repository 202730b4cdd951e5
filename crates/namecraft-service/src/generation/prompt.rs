//! Prompt construction for one name slot.

use std::fmt::Write as _;

use namecraft_core::{GenerationParams, Plan};

use super::fallback::Surname;

/// System instruction sent with every slot.
pub const SYSTEM_INSTRUCTION: &str = "You are an expert in Chinese naming culture. \
Reply with exactly one JSON object and nothing else: no prose, no markdown, no code fences. \
The object must have the keys chinese, pinyin, characters (an array of objects with \
character, pinyin, meaning, explanation), meaning, culturalNotes, personalityMatch and style.";

/// Per-slot entropy drawn before the call.
#[derive(Debug, Clone)]
pub struct SlotSeed {
    /// Surname the model is asked to use.
    pub surname: &'static Surname,
    /// Random number quoted in the prompt.
    pub seed: u32,
    /// Random unique id quoted in the prompt.
    pub nonce: String,
}

/// Build the user prompt for one slot.
///
/// Personality and preferences are only included for signed-in callers.
#[must_use]
pub fn build_prompt(
    params: &GenerationParams,
    authenticated: bool,
    slot: &SlotSeed,
    already_generated: &[String],
) -> String {
    let mut prompt = String::with_capacity(1024);

    let _ = writeln!(
        prompt,
        "Create one Chinese name for a person whose English name is \"{}\".",
        params.english_name
    );
    let _ = writeln!(prompt, "Gender: {}.", params.gender);
    if let Some(year) = params.birth_year {
        let _ = writeln!(prompt, "Born in {year}.");
    }

    if authenticated {
        if let Some(traits) = params.personality_traits.as_deref().filter(|s| !s.trim().is_empty()) {
            let _ = writeln!(prompt, "Personality: {}.", traits.trim());
        }
        if let Some(prefs) = params.name_preferences.as_deref().filter(|s| !s.trim().is_empty()) {
            let _ = writeln!(prompt, "Naming preferences: {}.", prefs.trim());
        }
    }

    let _ = writeln!(
        prompt,
        "Use the surname {} ({}).",
        slot.surname.character, slot.surname.pinyin
    );

    if !already_generated.is_empty() {
        let _ = writeln!(
            prompt,
            "Do not reuse any of these names: {}.",
            already_generated.join(", ")
        );
    }

    match params.plan_type {
        Plan::Premium => prompt.push_str(
            "This is a premium request: choose rare, literary characters with layered meaning, \
             draw on classical poetry where fitting, and explain the cultural background in depth.\n",
        ),
        Plan::Standard => {
            prompt.push_str("Choose characters that are meaningful and easy to pronounce.\n");
        }
    }

    let _ = writeln!(prompt, "Variation seed: {} / request id: {}.", slot.seed, slot.nonce);

    prompt
}
