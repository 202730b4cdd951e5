//! Core types for namecraft.
//!
//! This crate provides the domain types shared by the store and the HTTP
//! service:
//!
//! - **Identifiers**: `UserId`, `BatchId`, `GeneratedNameId`, `SavedNameId`, `TransactionId`
//! - **Plans**: `Plan`, `Gender`, `GenerationParams`
//! - **Names**: `NameData`, `CharacterBreakdown`
//! - **Customers & credits**: `Customer`, `CreditTransaction`, `CreditOperation`
//! - **Batches**: `GenerationBatch`, `GeneratedName`, `RoundPagination`
//! - **Saved names & analytics**: `SavedName`, `GenerationLog`
//!
//! # Credits
//!
//! Credits are whole numbers stored as `i64`. A standard generation call
//! costs 1 credit, a premium call 4, a PDF certificate 1.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod batch;
pub mod credits;
pub mod customer;
pub mod error;
pub mod ids;
pub mod log;
pub mod name;
pub mod plan;
pub mod saved;

pub use batch::{AppendedRound, BatchWithNames, GeneratedName, GenerationBatch, RoundPage, RoundPagination};
pub use credits::{CreditOperation, CreditTransaction, TransactionKind};
pub use customer::{Customer, SubscriptionStatus};
pub use error::{CoreError, Result};
pub use ids::{BatchId, GeneratedNameId, GenerationLogId, IdError, SavedNameId, TransactionId, UserId};
pub use log::{GenerationLog, GenerationStats};
pub use name::{CharacterBreakdown, NameData};
pub use plan::{
    Gender, GenerationParams, Plan, ANONYMOUS_NAME_COUNT, AUTHENTICATED_NAME_COUNT,
    PDF_CERTIFICATE_COST,
};
pub use saved::{SavedName, SavedNameUpdate};
