//! Name generation engine.
//!
//! Each slot is filled in two stages: [`NameGenerator`] first asks the
//! completion API for a name, producing either a name or a [`SlotFailure`];
//! any failure is then handed to the pure [`fallback::fallback_name`]. A slot
//! falls back at most once and there is no retry against the API, so a call
//! for `count` names always yields exactly `count` distinct names.

pub mod fallback;
pub mod parse;
pub mod prompt;

use std::sync::Arc;

use rand::Rng;

use namecraft_core::{GenerationParams, NameData};

use crate::upstream::{CompletionClient, CompletionRequest, LlmError};

use self::fallback::{fallback_name, SURNAMES};
use self::prompt::{build_prompt, SlotSeed, SYSTEM_INSTRUCTION};

/// Why a slot could not be filled by the completion API.
#[derive(Debug, thiserror::Error)]
pub enum SlotFailure {
    /// No completion client is configured.
    #[error("completion API not configured")]
    NotConfigured,

    /// The completion call failed.
    #[error("completion failed: {0}")]
    Upstream(#[from] LlmError),

    /// The reply held no decodable JSON object.
    #[error("reply was not a JSON name object")]
    Unparseable,

    /// The reply lacked `chinese`, `pinyin` or `characters`.
    #[error("reply was missing required fields")]
    Incomplete,

    /// The reply repeated a name already produced in this call.
    #[error("duplicate name {0}")]
    Duplicate(String),
}

/// Draw the per-slot surname, seed and nonce.
pub fn draw_seeds<R: Rng + ?Sized>(rng: &mut R, count: usize) -> Vec<SlotSeed> {
    (0..count)
        .map(|_| SlotSeed {
            surname: &SURNAMES[rng.random_range(0..SURNAMES.len())],
            seed: rng.random_range(0..1_000_000),
            nonce: format!("{:016x}", rng.random::<u64>()),
        })
        .collect()
}

/// Produces names for a generation call.
#[derive(Clone, Default)]
pub struct NameGenerator {
    client: Option<Arc<dyn CompletionClient>>,
}

impl std::fmt::Debug for NameGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NameGenerator")
            .field("configured", &self.client.is_some())
            .finish()
    }
}

impl NameGenerator {
    /// Create a generator. Without a client every slot uses the fallback.
    #[must_use]
    pub fn new(client: Option<Arc<dyn CompletionClient>>) -> Self {
        Self { client }
    }

    /// Whether a completion client is configured.
    #[must_use]
    pub fn is_configured(&self) -> bool {
        self.client.is_some()
    }

    /// Generate exactly `count` distinct names.
    pub async fn generate(
        &self,
        params: &GenerationParams,
        authenticated: bool,
        count: usize,
    ) -> Vec<NameData> {
        let seeds = {
            let mut rng = rand::rng();
            draw_seeds(&mut rng, count)
        };
        self.generate_with_seeds(params, authenticated, seeds).await
    }

    /// Generate one name per pre-drawn seed.
    pub async fn generate_with_seeds(
        &self,
        params: &GenerationParams,
        authenticated: bool,
        seeds: Vec<SlotSeed>,
    ) -> Vec<NameData> {
        let mut names: Vec<NameData> = Vec::with_capacity(seeds.len());
        let mut seen: Vec<String> = Vec::with_capacity(seeds.len());

        for (index, seed) in seeds.iter().enumerate() {
            let name = match self.attempt_slot(params, authenticated, seed, &seen).await {
                Ok(name) => name,
                Err(failure) => {
                    tracing::warn!(
                        slot = index,
                        surname = %seed.surname.character,
                        reason = %failure,
                        "Using fallback name"
                    );
                    fallback_name(index, seed.surname, params.gender, &seen)
                }
            };

            seen.push(name.chinese.clone());
            names.push(name);
        }

        names
    }

    async fn attempt_slot(
        &self,
        params: &GenerationParams,
        authenticated: bool,
        seed: &SlotSeed,
        seen: &[String],
    ) -> Result<NameData, SlotFailure> {
        let client = self.client.as_ref().ok_or(SlotFailure::NotConfigured)?;

        let prompt = build_prompt(params, authenticated, seed, seen);
        let raw = client
            .complete(&CompletionRequest {
                system: SYSTEM_INSTRUCTION,
                prompt: &prompt,
                temperature: params.plan_type.temperature(),
                top_p: params.plan_type.top_p(),
            })
            .await?;

        let name = parse::parse_name(&raw).ok_or(SlotFailure::Unparseable)?;
        if !name.is_complete() {
            return Err(SlotFailure::Incomplete);
        }
        if seen.contains(&name.chinese) {
            return Err(SlotFailure::Duplicate(name.chinese));
        }

        Ok(name)
    }
}
