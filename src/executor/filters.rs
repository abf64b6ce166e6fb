//! Predicate filtering for query execution
//!
//! Criteria are compiled against the field registry once per query. All
//! validation happens at compile time, so a scan never fails halfway.

use std::cmp::Ordering;

use crate::field::{FieldDef, FieldRegistry, FieldValue};
use crate::query::{FilterCriterion, FilterOperator, FilterValue, QueryError, QueryResult};

/// Compiled test for one criterion
#[derive(Debug)]
enum Test {
    Equals(FieldValue),
    Contains(String),
    GreaterThan(FieldValue),
    LessThan(FieldValue),
    Range {
        lower: Option<FieldValue>,
        upper: Option<FieldValue>,
    },
}

/// A criterion bound to its field accessor
struct CompiledPredicate<'r, T> {
    field: &'r FieldDef<T>,
    test: Test,
}

impl<T> CompiledPredicate<'_, T> {
    fn matches(&self, record: &T, ignore_case: bool) -> bool {
        let actual = self.field.read(record);

        match &self.test {
            Test::Equals(expected) => actual.matches_eq(expected, ignore_case),
            Test::Contains(needle) => contains(&actual, needle, ignore_case),
            // Null values never satisfy ordering tests
            Test::GreaterThan(bound) => {
                !actual.is_null() && actual.total_cmp(bound) == Ordering::Greater
            }
            Test::LessThan(bound) => !actual.is_null() && actual.total_cmp(bound) == Ordering::Less,
            Test::Range { lower, upper } => {
                !actual.is_null()
                    && lower
                        .as_ref()
                        .map_or(true, |lo| actual.total_cmp(lo) != Ordering::Less)
                    && upper
                        .as_ref()
                        .map_or(true, |hi| actual.total_cmp(hi) != Ordering::Greater)
            }
        }
    }
}

/// Substring test on the stringified value. `needle` is pre-lowered when
/// `ignore_case` is set.
fn contains(actual: &FieldValue, needle: &str, ignore_case: bool) -> bool {
    let haystack = actual.to_string();
    if ignore_case {
        haystack.to_lowercase().contains(needle)
    } else {
        haystack.contains(needle)
    }
}

fn fold_case(s: &str, ignore_case: bool) -> String {
    if ignore_case {
        s.to_lowercase()
    } else {
        s.to_string()
    }
}

/// Evaluates filter criteria against records (AND semantics)
pub struct PredicateFilter<'r, T> {
    predicates: Vec<CompiledPredicate<'r, T>>,
    ignore_case: bool,
}

impl<'r, T> PredicateFilter<'r, T> {
    /// Compiles criteria against the registry.
    ///
    /// Fails with `InvalidQuery` on unknown fields, mismatched operand shapes
    /// or operands that cannot be read as the field's kind, and with
    /// `UnsupportedComparison` when an ordering operator targets an unordered
    /// field.
    pub fn compile(
        registry: &'r FieldRegistry<T>,
        criteria: &[FilterCriterion],
        ignore_case: bool,
    ) -> QueryResult<Self> {
        let predicates = criteria
            .iter()
            .map(|criterion| compile_one(registry, criterion, ignore_case))
            .collect::<QueryResult<Vec<_>>>()?;

        Ok(Self {
            predicates,
            ignore_case,
        })
    }

    /// Checks if a record matches all criteria
    pub fn matches(&self, record: &T) -> bool {
        self.predicates
            .iter()
            .all(|pred| pred.matches(record, self.ignore_case))
    }

    /// Evaluates a single criterion against a single record
    pub fn evaluate(
        registry: &'r FieldRegistry<T>,
        record: &T,
        criterion: &FilterCriterion,
        ignore_case: bool,
    ) -> QueryResult<bool> {
        let predicate = compile_one(registry, criterion, ignore_case)?;
        Ok(predicate.matches(record, ignore_case))
    }

    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }

    pub fn len(&self) -> usize {
        self.predicates.len()
    }
}

fn compile_one<'r, T>(
    registry: &'r FieldRegistry<T>,
    criterion: &FilterCriterion,
    ignore_case: bool,
) -> QueryResult<CompiledPredicate<'r, T>> {
    let field = registry.resolve(&criterion.field)?;
    let kind = field.kind();

    if criterion.operator.requires_order() && !kind.is_ordered() {
        return Err(QueryError::unsupported(
            field.name(),
            format!(
                "operator '{}' needs an ordered field, '{}' is a {}",
                criterion.operator.as_str(),
                field.name(),
                kind
            ),
        ));
    }

    let test = match (criterion.operator, &criterion.value) {
        (FilterOperator::Range, FilterValue::Range { lower, upper }) => Test::Range {
            lower: lower
                .clone()
                .map(|v| coerce_operand(field, v))
                .transpose()?,
            upper: upper
                .clone()
                .map(|v| coerce_operand(field, v))
                .transpose()?,
        },
        (FilterOperator::Range, FilterValue::Scalar(_)) => {
            return Err(QueryError::invalid(format!(
                "range filter on '{}' needs lower and/or upper bounds",
                field.name()
            )));
        }
        (op, FilterValue::Range { .. }) => {
            return Err(QueryError::invalid(format!(
                "operator '{}' on '{}' takes a single value, not a range",
                op.as_str(),
                field.name()
            )));
        }
        (FilterOperator::Contains, FilterValue::Scalar(value)) => {
            Test::Contains(fold_case(&value.to_string(), ignore_case))
        }
        (FilterOperator::Equals, FilterValue::Scalar(value)) => {
            Test::Equals(coerce_operand(field, value.clone())?)
        }
        (FilterOperator::GreaterThan, FilterValue::Scalar(value)) => {
            Test::GreaterThan(coerce_ordered_operand(field, value.clone())?)
        }
        (FilterOperator::LessThan, FilterValue::Scalar(value)) => {
            Test::LessThan(coerce_ordered_operand(field, value.clone())?)
        }
    };

    Ok(CompiledPredicate { field, test })
}

fn coerce_operand<T>(field: &FieldDef<T>, value: FieldValue) -> QueryResult<FieldValue> {
    let shown = value.to_string();
    value.coerce(field.kind()).ok_or_else(|| {
        QueryError::invalid(format!(
            "value '{}' is not a valid {} for field '{}'",
            shown,
            field.kind(),
            field.name()
        ))
    })
}

fn coerce_ordered_operand<T>(field: &FieldDef<T>, value: FieldValue) -> QueryResult<FieldValue> {
    if value.is_null() {
        return Err(QueryError::invalid(format!(
            "ordering filter on '{}' needs a non-null value",
            field.name()
        )));
    }
    coerce_operand(field, value)
}

/// Free-text search: Contains, OR-ed across the searchable fields
pub struct SearchFilter<'r, T> {
    fields: Vec<&'r FieldDef<T>>,
    needle: String,
    ignore_case: bool,
}

impl<'r, T> SearchFilter<'r, T> {
    /// Compiles a search. Returns `None` when the text is empty or
    /// whitespace, in which case search excludes nothing.
    pub fn compile<S: AsRef<str>>(
        registry: &'r FieldRegistry<T>,
        searchable: &[S],
        search_text: &str,
        ignore_case: bool,
    ) -> QueryResult<Option<Self>> {
        let needle = search_text.trim();
        if needle.is_empty() {
            return Ok(None);
        }

        let fields = searchable
            .iter()
            .map(|name| registry.resolve(name.as_ref()))
            .collect::<QueryResult<Vec<_>>>()?;

        Ok(Some(Self {
            fields,
            needle: fold_case(needle, ignore_case),
            ignore_case,
        }))
    }

    /// Checks if any searchable field contains the search text
    pub fn matches(&self, record: &T) -> bool {
        self.fields
            .iter()
            .any(|field| contains(&field.read(record), &self.needle, self.ignore_case))
    }
}
