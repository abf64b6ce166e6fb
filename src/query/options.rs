//! Query options
//!
//! The caller-owned description of one query: paging, sort keys, filter
//! criteria and free-text search. Executors borrow it read-only.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::field::FieldValue;

use super::errors::{QueryError, QueryResult};

/// Page size used when the caller does not ask for one
pub const DEFAULT_PAGE_SIZE: usize = 20;

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    #[serde(alias = "asc")]
    Ascending,
    #[serde(alias = "desc")]
    Descending,
}

impl SortDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Ascending => "asc",
            SortDirection::Descending => "desc",
        }
    }

    /// Applies the direction to an ascending comparison result
    pub fn apply(&self, ordering: Ordering) -> Ordering {
        match self {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        }
    }
}

/// One sort key. The first spec in a list is the primary key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortSpec {
    pub field: String,
    pub direction: SortDirection,
}

impl SortSpec {
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Ascending,
        }
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Descending,
        }
    }
}

/// Filter operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterOperator {
    /// Field equals value
    Equals,
    /// Stringified field contains value
    Contains,
    /// Field > value
    GreaterThan,
    /// Field < value
    LessThan,
    /// lower <= field <= upper, either bound optional
    Range,
}

impl FilterOperator {
    /// Short name used in URL parameters
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterOperator::Equals => "eq",
            FilterOperator::Contains => "contains",
            FilterOperator::GreaterThan => "gt",
            FilterOperator::LessThan => "lt",
            FilterOperator::Range => "range",
        }
    }

    /// Returns true if the operator needs an ordered field kind
    pub fn requires_order(&self) -> bool {
        matches!(
            self,
            FilterOperator::GreaterThan | FilterOperator::LessThan | FilterOperator::Range
        )
    }
}

/// Operand of a filter criterion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterValue {
    Scalar(FieldValue),
    Range {
        lower: Option<FieldValue>,
        upper: Option<FieldValue>,
    },
}

/// A single filter: field, operator, operand
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterCriterion {
    pub field: String,
    pub operator: FilterOperator,
    pub value: FilterValue,
}

impl FilterCriterion {
    fn scalar(field: impl Into<String>, operator: FilterOperator, value: FieldValue) -> Self {
        Self {
            field: field.into(),
            operator,
            value: FilterValue::Scalar(value),
        }
    }

    pub fn equals(field: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        Self::scalar(field, FilterOperator::Equals, value.into())
    }

    pub fn contains(field: impl Into<String>, needle: impl Into<String>) -> Self {
        Self::scalar(field, FilterOperator::Contains, FieldValue::Text(needle.into()))
    }

    pub fn greater_than(field: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        Self::scalar(field, FilterOperator::GreaterThan, value.into())
    }

    pub fn less_than(field: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        Self::scalar(field, FilterOperator::LessThan, value.into())
    }

    /// Inclusive range; `None` leaves that side unbounded
    pub fn range(
        field: impl Into<String>,
        lower: Option<FieldValue>,
        upper: Option<FieldValue>,
    ) -> Self {
        Self {
            field: field.into(),
            operator: FilterOperator::Range,
            value: FilterValue::Range { lower, upper },
        }
    }

    /// Inclusive range with both bounds
    pub fn between(
        field: impl Into<String>,
        lower: impl Into<FieldValue>,
        upper: impl Into<FieldValue>,
    ) -> Self {
        Self::range(field, Some(lower.into()), Some(upper.into()))
    }
}

/// Paging, sorting, filtering and search for one query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryOptions {
    /// Zero-based page index
    pub page_index: usize,
    /// Records per page, must be > 0
    pub page_size: usize,
    /// Sort keys in precedence order
    pub sort_specs: Vec<SortSpec>,
    /// Filter criteria, combined with AND
    pub filters: Vec<FilterCriterion>,
    /// Free-text search across the searchable fields
    pub search_text: String,
    /// Case-insensitive text matching for Equals, Contains and search
    pub ignore_case: bool,
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self {
            page_index: 0,
            page_size: DEFAULT_PAGE_SIZE,
            sort_specs: Vec::new(),
            filters: Vec::new(),
            search_text: String::new(),
            ignore_case: false,
        }
    }
}

impl QueryOptions {
    /// Creates options for one page with no sort, filter or search
    pub fn new(page_index: usize, page_size: usize) -> Self {
        Self {
            page_index,
            page_size,
            ..Self::default()
        }
    }

    /// Appends a sort key
    pub fn sort_by(mut self, spec: SortSpec) -> Self {
        self.sort_specs.push(spec);
        self
    }

    /// Adds a filter criterion
    pub fn filter(mut self, criterion: FilterCriterion) -> Self {
        self.filters.push(criterion);
        self
    }

    /// Sets the free-text search
    pub fn search(mut self, text: impl Into<String>) -> Self {
        self.search_text = text.into();
        self
    }

    /// Sets case-insensitive matching
    pub fn ignore_case(mut self, ignore_case: bool) -> Self {
        self.ignore_case = ignore_case;
        self
    }

    /// Moves to another page, keeping everything else
    pub fn with_page(mut self, page_index: usize) -> Self {
        self.page_index = page_index;
        self
    }

    /// Checks paging invariants before any data is touched
    pub fn validate(&self) -> QueryResult<()> {
        if self.page_size == 0 {
            return Err(QueryError::invalid("page size must be greater than zero"));
        }
        Ok(())
    }

    /// Number of records skipped before this page
    pub fn offset(&self) -> usize {
        self.page_index.saturating_mul(self.page_size)
    }

    /// Search text with surrounding whitespace removed
    pub fn search_needle(&self) -> &str {
        self.search_text.trim()
    }

    pub fn has_search(&self) -> bool {
        !self.search_needle().is_empty()
    }

    pub fn has_filters(&self) -> bool {
        !self.filters.is_empty()
    }

    pub fn has_sort(&self) -> bool {
        !self.sort_specs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_builder() {
        let options = QueryOptions::new(1, 25)
            .sort_by(SortSpec::asc("name"))
            .sort_by(SortSpec::desc("age"))
            .filter(FilterCriterion::greater_than("age", 18))
            .search("ann")
            .ignore_case(true);

        assert_eq!(options.offset(), 25);
        assert_eq!(options.sort_specs[0].field, "name");
        assert_eq!(options.sort_specs[1].direction, SortDirection::Descending);
        assert!(options.has_filters());
        assert!(options.has_search());
        assert!(options.ignore_case);
    }

    #[test]
    fn test_zero_page_size_rejected() {
        let err = QueryOptions::new(0, 0).validate().unwrap_err();
        assert!(matches!(err, QueryError::InvalidQuery(_)));
        assert!(QueryOptions::new(3, 1).validate().is_ok());
    }

    #[test]
    fn test_offset_saturates() {
        let options = QueryOptions::new(usize::MAX, 2);
        assert_eq!(options.offset(), usize::MAX);
    }

    #[test]
    fn test_whitespace_search_is_empty() {
        assert!(!QueryOptions::default().search("   ").has_search());
        assert_eq!(QueryOptions::default().search(" an ").search_needle(), "an");
    }

    #[test]
    fn test_direction_apply() {
        assert_eq!(SortDirection::Ascending.apply(Ordering::Less), Ordering::Less);
        assert_eq!(SortDirection::Descending.apply(Ordering::Less), Ordering::Greater);
    }

    #[test]
    fn test_json_form() {
        let options: QueryOptions = serde_json::from_value(json!({
            "page_index": 2,
            "page_size": 10,
            "sort_specs": [{"field": "name", "direction": "desc"}],
            "filters": [
                {"field": "age", "operator": "range", "value": {"lower": 18}},
                {"field": "name", "operator": "contains", "value": "an"}
            ]
        }))
        .unwrap();

        assert_eq!(options.page_index, 2);
        assert_eq!(options.sort_specs[0], SortSpec::desc("name"));
        assert_eq!(
            options.filters[0],
            FilterCriterion::range("age", Some(FieldValue::Int(18)), None)
        );
        assert_eq!(options.filters[1], FilterCriterion::contains("name", "an"));
        assert!(!options.ignore_case);

        let defaults: QueryOptions = serde_json::from_value(json!({})).unwrap();
        assert_eq!(defaults, QueryOptions::default());
    }
}
