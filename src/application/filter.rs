//! Listing filter compilation.
//!
//! A sparse [`ItemFilter`] compiles into an [`ItemPredicate`]: the
//! conjunction of one clause per present field. The predicate is what stores
//! consume; in-memory implementations evaluate it directly while the
//! Postgres repository translates it clause-for-clause into SQL.
//!
//! Pattern matching follows the store's native `LIKE`: `%` matches any run of
//! characters (including the empty run), every other character matches
//! itself, and comparison is case-sensitive. Filter values are used verbatim
//! as patterns; nothing is wrapped or escaped on the caller's behalf.

use std::hash::{DefaultHasher, Hash, Hasher};

use rust_decimal::Decimal;

use crate::domain::items::ItemRecord;

/// The sparse set of optional listing constraints. An absent field means
/// "no constraint on that field", never "match empty".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ItemFilter {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub price_less_than: Option<Decimal>,
    pub price_greater_than: Option<Decimal>,
}

#[derive(Debug, Clone, PartialEq, Hash)]
pub enum FilterClause {
    NameLike(String),
    DescriptionLike(String),
    PriceEq(Decimal),
    PriceLt(Decimal),
    PriceGt(Decimal),
}

/// A compiled conjunction of filter clauses. Empty means always-true.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ItemPredicate {
    clauses: Vec<FilterClause>,
}

impl ItemFilter {
    /// Compile into a predicate. Pure and idempotent: equal filters always
    /// produce equal predicates.
    pub fn compile(&self) -> ItemPredicate {
        let mut clauses = Vec::new();

        if let Some(name) = self.name.as_ref() {
            clauses.push(FilterClause::NameLike(name.clone()));
        }
        if let Some(description) = self.description.as_ref() {
            clauses.push(FilterClause::DescriptionLike(description.clone()));
        }
        if let Some(price) = self.price {
            clauses.push(FilterClause::PriceEq(price));
        }
        if let Some(bound) = self.price_less_than {
            clauses.push(FilterClause::PriceLt(bound));
        }
        if let Some(bound) = self.price_greater_than {
            clauses.push(FilterClause::PriceGt(bound));
        }

        ItemPredicate { clauses }
    }
}

impl ItemPredicate {
    pub fn clauses(&self) -> &[FilterClause] {
        &self.clauses
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    /// Evaluate the conjunction against one record.
    pub fn matches(&self, item: &ItemRecord) -> bool {
        self.clauses.iter().all(|clause| match clause {
            FilterClause::NameLike(pattern) => like_match(pattern, &item.name),
            FilterClause::DescriptionLike(pattern) => like_match(pattern, &item.description),
            FilterClause::PriceEq(price) => item.price == *price,
            FilterClause::PriceLt(bound) => item.price < *bound,
            FilterClause::PriceGt(bound) => item.price > *bound,
        })
    }

    /// Stable hash of the clause list, used for cache keying.
    pub fn fingerprint(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.clauses.hash(&mut hasher);
        hasher.finish()
    }
}

/// `LIKE`-style matching with `%` as the only wildcard.
fn like_match(pattern: &str, text: &str) -> bool {
    if !pattern.contains('%') {
        return pattern == text;
    }

    // A pattern containing `%` always splits into at least two segments.
    let segments: Vec<&str> = pattern.split('%').collect();
    let first = segments[0];
    let last = segments[segments.len() - 1];
    let middle = &segments[1..segments.len() - 1];

    if !text.starts_with(first) {
        return false;
    }
    let mut position = first.len();

    for segment in middle {
        if segment.is_empty() {
            continue;
        }
        match text[position..].find(segment) {
            Some(found) => position += found + segment.len(),
            None => return false,
        }
    }

    if last.is_empty() {
        return true;
    }
    text.len() >= position + last.len() && text[position..].ends_with(last)
}
