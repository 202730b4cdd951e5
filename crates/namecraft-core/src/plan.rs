//! Generation plans and request parameters.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;

// ============================================================================
// Constants
// ============================================================================

/// Names produced per call for anonymous visitors.
pub const ANONYMOUS_NAME_COUNT: usize = 3;

/// Names produced per call for signed-in customers.
pub const AUTHENTICATED_NAME_COUNT: usize = 6;

/// Credits charged for rendering one PDF certificate.
pub const PDF_CERTIFICATE_COST: i64 = 1;

/// The generation plan chosen by the caller.
///
/// On the wire a plan is the string `"1"` (standard) or `"4"` (premium),
/// which is also its credit cost per generation call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Plan {
    /// One credit per call.
    #[serde(rename = "1")]
    Standard,
    /// Four credits per call, more adventurous sampling.
    #[serde(rename = "4")]
    Premium,
}

impl Plan {
    /// Credits charged per generation call, independent of the name count.
    #[must_use]
    pub const fn cost(self) -> i64 {
        match self {
            Self::Standard => 1,
            Self::Premium => 4,
        }
    }

    /// Sampling temperature passed to the completion API.
    #[must_use]
    pub const fn temperature(self) -> f32 {
        match self {
            Self::Standard => 0.8,
            Self::Premium => 0.9,
        }
    }

    /// Nucleus sampling parameter passed to the completion API.
    #[must_use]
    pub const fn top_p(self) -> f32 {
        match self {
            Self::Standard => 0.9,
            Self::Premium => 0.95,
        }
    }

    /// Wire code (`"1"` or `"4"`).
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Standard => "1",
            Self::Premium => "4",
        }
    }
}

impl fmt::Display for Plan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Plan {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "1" => Ok(Self::Standard),
            "4" => Ok(Self::Premium),
            other => Err(CoreError::InvalidPlan(other.to_string())),
        }
    }
}

/// Gender preference for a generated name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    /// Masculine names.
    Male,
    /// Feminine names.
    Female,
    /// Unisex names.
    Neutral,
}

impl Gender {
    /// Lowercase wire form.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Male => "male",
            Self::Female => "female",
            Self::Neutral => "neutral",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Gender {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "male" | "m" | "boy" => Ok(Self::Male),
            "female" | "f" | "girl" => Ok(Self::Female),
            "neutral" | "unisex" | "other" | "any" => Ok(Self::Neutral),
            other => Err(CoreError::InvalidGender(other.to_string())),
        }
    }
}

/// The fixed input parameters of a generation batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationParams {
    /// The caller's English name.
    pub english_name: String,
    /// Desired gender of the name.
    pub gender: Gender,
    /// Birth year, if given.
    pub birth_year: Option<i32>,
    /// Free-text personality traits.
    pub personality_traits: Option<String>,
    /// Free-text naming preferences.
    pub name_preferences: Option<String>,
    /// Plan the batch was opened with.
    pub plan_type: Plan,
}

impl GenerationParams {
    /// Whether personality traits were supplied.
    #[must_use]
    pub fn has_personality(&self) -> bool {
        self.personality_traits
            .as_deref()
            .is_some_and(|s| !s.trim().is_empty())
    }

    /// Whether naming preferences were supplied.
    #[must_use]
    pub fn has_preferences(&self) -> bool {
        self.name_preferences
            .as_deref()
            .is_some_and(|s| !s.trim().is_empty())
    }
}
