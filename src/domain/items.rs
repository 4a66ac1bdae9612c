//! Catalog item entity mirrored from persistent storage.

use rust_decimal::Decimal;
use time::OffsetDateTime;
use uuid::Uuid;

/// A single catalog item.
///
/// `id` is assigned exactly once at creation and never reused. `version`
/// starts at 1 and advances on every successful replace; the store refuses a
/// replace carrying a stale version. The field stays internal to the service
/// and is not part of the wire representation.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemRecord {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
    pub version: i32,
}
