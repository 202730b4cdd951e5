//! Row types and conversions between SQLite rows and domain types.
//!
//! Identifiers are stored as TEXT, timestamps as RFC 3339 TEXT in UTC with
//! microsecond precision (so they sort lexicographically), and structured
//! fields as JSON TEXT.

use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::types::Json;
use sqlx::FromRow;

use namecraft_core::{
    CharacterBreakdown, CreditTransaction, Customer, GeneratedName, GenerationBatch,
    GenerationParams, NameData, SavedName,
};

use crate::error::{Result, StoreError};

/// Encode a timestamp for storage.
pub(crate) fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_timestamp(value: &str) -> Result<DateTime<Utc>> {
    Ok(DateTime::parse_from_rfc3339(value)?.with_timezone(&Utc))
}

#[derive(Debug, FromRow)]
pub(crate) struct CustomerRow {
    pub user_id: String,
    pub email: Option<String>,
    pub credits: i64,
    pub subscription_status: Option<String>,
    pub subscription_id: Option<String>,
    pub product_id: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl TryFrom<CustomerRow> for Customer {
    type Error = StoreError;

    fn try_from(row: CustomerRow) -> Result<Self> {
        Ok(Self {
            user_id: row.user_id.parse()?,
            email: row.email,
            credits: row.credits,
            subscription_status: row
                .subscription_status
                .as_deref()
                .map(str::parse)
                .transpose()?,
            subscription_id: row.subscription_id,
            product_id: row.product_id,
            created_at: parse_timestamp(&row.created_at)?,
            updated_at: parse_timestamp(&row.updated_at)?,
        })
    }
}

#[derive(Debug, FromRow)]
pub(crate) struct TransactionRow {
    pub id: String,
    pub user_id: String,
    pub amount: i64,
    pub kind: String,
    pub operation: String,
    pub description: String,
    pub order_id: Option<String>,
    pub metadata: Json<serde_json::Value>,
    pub created_at: String,
}

impl TryFrom<TransactionRow> for CreditTransaction {
    type Error = StoreError;

    fn try_from(row: TransactionRow) -> Result<Self> {
        Ok(Self {
            id: row.id.parse()?,
            user_id: row.user_id.parse()?,
            amount: row.amount,
            kind: row.kind.parse()?,
            operation: row.operation.parse()?,
            description: row.description,
            order_id: row.order_id,
            metadata: row.metadata.0,
            created_at: parse_timestamp(&row.created_at)?,
        })
    }
}

#[derive(Debug, FromRow)]
pub(crate) struct BatchRow {
    pub id: String,
    pub user_id: String,
    pub english_name: String,
    pub gender: String,
    pub birth_year: Option<i32>,
    pub personality_traits: Option<String>,
    pub name_preferences: Option<String>,
    pub plan_type: String,
    pub names_count: i64,
    pub credits_used: i64,
    pub current_round: i64,
    pub created_at: String,
    pub updated_at: String,
}

impl TryFrom<BatchRow> for GenerationBatch {
    type Error = StoreError;

    fn try_from(row: BatchRow) -> Result<Self> {
        Ok(Self {
            id: row.id.parse()?,
            user_id: row.user_id.parse()?,
            params: GenerationParams {
                english_name: row.english_name,
                gender: row.gender.parse()?,
                birth_year: row.birth_year,
                personality_traits: row.personality_traits,
                name_preferences: row.name_preferences,
                plan_type: row.plan_type.parse()?,
            },
            names_count: row.names_count,
            credits_used: row.credits_used,
            current_round: row.current_round,
            created_at: parse_timestamp(&row.created_at)?,
            updated_at: parse_timestamp(&row.updated_at)?,
        })
    }
}

#[derive(Debug, FromRow)]
pub(crate) struct GeneratedNameRow {
    pub id: String,
    pub batch_id: String,
    pub chinese: String,
    pub pinyin: String,
    pub characters: Json<Vec<CharacterBreakdown>>,
    pub meaning: String,
    pub cultural_notes: String,
    pub personality_match: String,
    pub style: String,
    pub position_in_batch: i64,
    pub generation_round: i64,
    pub created_at: String,
}

impl TryFrom<GeneratedNameRow> for GeneratedName {
    type Error = StoreError;

    fn try_from(row: GeneratedNameRow) -> Result<Self> {
        Ok(Self {
            id: row.id.parse()?,
            batch_id: row.batch_id.parse()?,
            name: NameData {
                chinese: row.chinese,
                pinyin: row.pinyin,
                characters: row.characters.0,
                meaning: row.meaning,
                cultural_notes: row.cultural_notes,
                personality_match: row.personality_match,
                style: row.style,
            },
            position_in_batch: row.position_in_batch,
            generation_round: row.generation_round,
            created_at: parse_timestamp(&row.created_at)?,
        })
    }
}

#[derive(Debug, FromRow)]
pub(crate) struct SavedNameRow {
    pub id: String,
    pub user_id: String,
    pub chinese_name: String,
    pub pinyin: String,
    pub meaning: String,
    pub cultural_notes: String,
    pub personality_match: String,
    pub characters: Json<Vec<CharacterBreakdown>>,
    pub is_favorite: bool,
    pub is_selected: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl TryFrom<SavedNameRow> for SavedName {
    type Error = StoreError;

    fn try_from(row: SavedNameRow) -> Result<Self> {
        Ok(Self {
            id: row.id.parse()?,
            user_id: row.user_id.parse()?,
            chinese_name: row.chinese_name,
            pinyin: row.pinyin,
            meaning: row.meaning,
            cultural_notes: row.cultural_notes,
            personality_match: row.personality_match,
            characters: row.characters.0,
            is_favorite: row.is_favorite,
            is_selected: row.is_selected,
            created_at: parse_timestamp(&row.created_at)?,
            updated_at: parse_timestamp(&row.updated_at)?,
        })
    }
}

/// Convert a list of rows, failing on the first bad one.
pub(crate) fn convert_all<R, T>(rows: Vec<R>) -> Result<Vec<T>>
where
    T: TryFrom<R, Error = StoreError>,
{
    rows.into_iter().map(T::try_from).collect()
}
