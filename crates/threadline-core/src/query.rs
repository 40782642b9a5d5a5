//! # Filter/Sort Engine
//!
//! Narrows and orders an already-fetched list without touching the network.
//!
//! ## Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  &[T] (last successful fetch, never mutated)                            │
//! │     │                                                                   │
//! │     ▼                                                                   │
//! │  search term ──► any searchable field contains it (case-insensitive)    │
//! │     │                                                                   │
//! │     ▼                                                                   │
//! │  facets ───────► every facet value equals (case-insensitive)            │
//! │     │                                                                   │
//! │     ▼                                                                   │
//! │  sort ─────────► stable; text case-insensitive, numbers numeric,        │
//! │     │            missing = "" or 0                                      │
//! │     ▼                                                                   │
//! │  Vec<&T>  (a subsequence of the input, in display order)                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Entities opt in by implementing [`Listable`], which names their searchable
//! fields, facet keys and sort keys.

use std::borrow::Cow;
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;

// =============================================================================
// Sort Values
// =============================================================================

/// A comparable projection of one record field.
#[derive(Debug, Clone, PartialEq)]
pub enum SortValue {
    /// Lowercased text; missing values are the empty string.
    Text(String),
    /// Numeric value; missing values are zero.
    Number(f64),
}

impl SortValue {
    pub fn text(value: Option<&str>) -> Self {
        SortValue::Text(value.unwrap_or_default().to_lowercase())
    }

    pub fn number(value: Option<f64>) -> Self {
        SortValue::Number(value.unwrap_or(0.0))
    }

    fn compare(&self, other: &Self) -> Ordering {
        match (self, other) {
            (SortValue::Text(a), SortValue::Text(b)) => a.cmp(b),
            (SortValue::Number(a), SortValue::Number(b)) => a.total_cmp(b),
            // One key always projects to one variant; mixed pairs keep order.
            _ => Ordering::Equal,
        }
    }
}

// =============================================================================
// Listable
// =============================================================================

/// An entity that can be searched, faceted and sorted on a list screen.
pub trait Listable {
    /// Categorical fields that support equality filters (category, role, status).
    type Facet: Copy + Eq + fmt::Debug + FromStr<Err = CoreError> + 'static;

    /// Enumerated sort keys (name, price, stock, ...).
    type SortKey: Copy + Eq + fmt::Debug + FromStr<Err = CoreError> + 'static;

    /// Values matched by the free-text search, in field order.
    fn search_fields(&self) -> Vec<Option<&str>>;

    /// Current value of a facet field, if set.
    fn facet_value(&self, facet: Self::Facet) -> Option<Cow<'_, str>>;

    /// Comparable projection used for sorting.
    fn sort_value(&self, key: Self::SortKey) -> SortValue;
}

// =============================================================================
// Query
// =============================================================================

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    #[default]
    Ascending,
    Descending,
}

impl FromStr for Direction {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "asc" | "ascending" => Ok(Direction::Ascending),
            "desc" | "descending" => Ok(Direction::Descending),
            other => Err(CoreError::UnknownValue {
                kind: "sort direction",
                value: other.to_string(),
            }),
        }
    }
}

/// A sort key plus direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sort<K> {
    pub key: K,
    pub direction: Direction,
}

impl<K> Sort<K> {
    pub fn ascending(key: K) -> Self {
        Sort {
            key,
            direction: Direction::Ascending,
        }
    }

    pub fn descending(key: K) -> Self {
        Sort {
            key,
            direction: Direction::Descending,
        }
    }
}

/// Filter criteria and ordering for one list screen.
#[derive(Debug, Clone)]
pub struct ListQuery<T: Listable> {
    pub search: String,
    pub facets: Vec<(T::Facet, String)>,
    pub sort: Option<Sort<T::SortKey>>,
}

impl<T: Listable> Default for ListQuery<T> {
    fn default() -> Self {
        ListQuery {
            search: String::new(),
            facets: Vec::new(),
            sort: None,
        }
    }
}

impl<T: Listable> ListQuery<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn search(mut self, term: impl Into<String>) -> Self {
        self.search = term.into();
        self
    }

    pub fn facet(mut self, facet: T::Facet, value: impl Into<String>) -> Self {
        self.facets.push((facet, value.into()));
        self
    }

    pub fn sort_by(mut self, sort: Sort<T::SortKey>) -> Self {
        self.sort = Some(sort);
        self
    }

    /// Whether the record satisfies every criterion.
    pub fn matches(&self, record: &T) -> bool {
        matches_search(record, &self.search)
            && self.facets.iter().all(|(facet, expected)| {
                record
                    .facet_value(*facet)
                    .map(|actual| actual.trim().to_lowercase() == expected.trim().to_lowercase())
                    .unwrap_or(false)
            })
    }
}

fn matches_search<T: Listable>(record: &T, term: &str) -> bool {
    let needle = term.trim().to_lowercase();
    if needle.is_empty() {
        return true;
    }
    record
        .search_fields()
        .into_iter()
        .flatten()
        .any(|field| field.to_lowercase().contains(&needle))
}

// =============================================================================
// Engine
// =============================================================================

/// Returns the records matching every criterion, in input order.
pub fn filter<'a, T: Listable>(items: &'a [T], query: &ListQuery<T>) -> Vec<&'a T> {
    items.iter().filter(|item| query.matches(item)).collect()
}

/// Stable sort by one key. Ties keep their incoming relative order in both
/// directions.
pub fn sort<'a, T: Listable>(items: Vec<&'a T>, by: Sort<T::SortKey>) -> Vec<&'a T> {
    let mut keyed: Vec<(SortValue, &'a T)> = items
        .into_iter()
        .map(|item| (item.sort_value(by.key), item))
        .collect();

    keyed.sort_by(|(a, _), (b, _)| match by.direction {
        Direction::Ascending => a.compare(b),
        Direction::Descending => b.compare(a),
    });

    keyed.into_iter().map(|(_, item)| item).collect()
}

/// Filter then sort; what a list screen displays.
pub fn apply<'a, T: Listable>(items: &'a [T], query: &ListQuery<T>) -> Vec<&'a T> {
    let filtered = filter(items, query);
    match query.sort {
        Some(by) => sort(filtered, by),
        None => filtered,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Row {
        name: &'static str,
        code: Option<&'static str>,
        kind: &'static str,
        price: Option<f64>,
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum RowFacet {
        Kind,
    }

    impl FromStr for RowFacet {
        type Err = CoreError;
        fn from_str(s: &str) -> Result<Self, Self::Err> {
            match s {
                "kind" => Ok(RowFacet::Kind),
                _ => Err(CoreError::UnknownValue {
                    kind: "facet",
                    value: s.to_string(),
                }),
            }
        }
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum RowSort {
        Name,
        Price,
    }

    impl FromStr for RowSort {
        type Err = CoreError;
        fn from_str(s: &str) -> Result<Self, Self::Err> {
            match s {
                "name" => Ok(RowSort::Name),
                "price" => Ok(RowSort::Price),
                _ => Err(CoreError::UnknownValue {
                    kind: "sort key",
                    value: s.to_string(),
                }),
            }
        }
    }

    impl Listable for Row {
        type Facet = RowFacet;
        type SortKey = RowSort;

        fn search_fields(&self) -> Vec<Option<&str>> {
            vec![Some(self.name), self.code]
        }

        fn facet_value(&self, facet: RowFacet) -> Option<Cow<'_, str>> {
            match facet {
                RowFacet::Kind => Some(Cow::Borrowed(self.kind)),
            }
        }

        fn sort_value(&self, key: RowSort) -> SortValue {
            match key {
                RowSort::Name => SortValue::text(Some(self.name)),
                RowSort::Price => SortValue::number(self.price),
            }
        }
    }

    fn rows() -> Vec<Row> {
        vec![
            Row { name: "shirt", code: Some("A-1"), kind: "Tops", price: Some(20.0) },
            Row { name: "Jeans", code: None, kind: "Bottoms", price: Some(35.0) },
            Row { name: "Blouse", code: Some("A-2"), kind: "tops", price: None },
            Row { name: "Shirt", code: Some("B-9"), kind: "Tops", price: Some(20.0) },
        ]
    }

    fn names(items: &[&Row]) -> Vec<&'static str> {
        items.iter().map(|r| r.name).collect()
    }

    #[test]
    fn test_search_is_case_insensitive_across_fields() {
        let rows = rows();
        let q = ListQuery::<Row>::new().search("SHIRT");
        assert_eq!(names(&filter(&rows, &q)), vec!["shirt", "Shirt"]);

        let q = ListQuery::<Row>::new().search("a-");
        assert_eq!(names(&filter(&rows, &q)), vec!["shirt", "Blouse"]);
    }

    #[test]
    fn test_blank_search_matches_everything() {
        let rows = rows();
        let q = ListQuery::<Row>::new().search("   ");
        assert_eq!(filter(&rows, &q).len(), rows.len());
    }

    #[test]
    fn test_facets_are_anded_with_search() {
        let rows = rows();
        let q = ListQuery::<Row>::new()
            .facet(RowFacet::Kind, "TOPS")
            .search("b");
        assert_eq!(names(&filter(&rows, &q)), vec!["Blouse", "Shirt"]);
    }

    #[test]
    fn test_filter_is_an_idempotent_subsequence() {
        let rows = rows();
        let q = ListQuery::<Row>::new().facet(RowFacet::Kind, "tops");
        let once = filter(&rows, &q);

        let mut cursor = rows.iter();
        for picked in &once {
            assert!(cursor.any(|r| std::ptr::eq(r, *picked)));
        }

        let owned: Vec<Row> = once.iter().map(|r| (*r).clone()).collect();
        let twice = filter(&owned, &q);
        assert_eq!(names(&once), names(&twice));
    }

    #[test]
    fn test_sort_text_is_case_insensitive_and_stable() {
        let rows = rows();
        let all = filter(&rows, &ListQuery::new());
        let sorted = sort(all, Sort::ascending(RowSort::Name));
        // "shirt" precedes "Shirt": equal keys keep input order.
        assert_eq!(names(&sorted), vec!["Blouse", "Jeans", "shirt", "Shirt"]);
    }

    #[test]
    fn test_sort_descending_keeps_ties_stable() {
        let rows = rows();
        let all = filter(&rows, &ListQuery::new());
        let sorted = sort(all, Sort::descending(RowSort::Price));
        assert_eq!(names(&sorted), vec!["Jeans", "shirt", "Shirt", "Blouse"]);
    }

    #[test]
    fn test_missing_numbers_sort_as_zero() {
        let rows = rows();
        let all = filter(&rows, &ListQuery::new());
        let sorted = sort(all, Sort::ascending(RowSort::Price));
        assert_eq!(sorted[0].name, "Blouse");
    }

    #[test]
    fn test_sorting_twice_equals_sorting_once() {
        let rows = rows();
        let q = ListQuery::<Row>::new().sort_by(Sort::ascending(RowSort::Price));
        let once = apply(&rows, &q);
        let twice = sort(once.clone(), Sort::ascending(RowSort::Price));
        assert_eq!(names(&once), names(&twice));
    }

    #[test]
    fn test_input_is_not_mutated() {
        let rows = rows();
        let before = rows.clone();
        let q = ListQuery::<Row>::new().sort_by(Sort::descending(RowSort::Name));
        let _ = apply(&rows, &q);
        assert_eq!(rows, before);
    }

    #[test]
    fn test_direction_parsing() {
        assert_eq!("desc".parse::<Direction>().unwrap(), Direction::Descending);
        assert_eq!("ASC".parse::<Direction>().unwrap(), Direction::Ascending);
        assert!("up".parse::<Direction>().is_err());
    }
}
