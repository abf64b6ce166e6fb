//! # Query Parameter Parser
//!
//! Builds [`QueryOptions`] from URL-style key/value pairs.
//!
//! Reserved keys: `page`, `size`, `sort`, `search`, `ignore_case`.
//! Every other key is a filter written `field=op.value`, where `op` is one of
//! `eq`, `contains`, `gt`, `lt`, `range`. Without a known operator the whole
//! value is an equality operand. Ranges are written `range.lo..hi` and either
//! side may be empty.

use crate::field::FieldValue;

use super::errors::{QueryError, QueryResult};
use super::options::{
    FilterCriterion, FilterOperator, FilterValue, QueryOptions, SortDirection, SortSpec,
    DEFAULT_PAGE_SIZE,
};

/// Largest page a caller may request by default
pub const MAX_PAGE_SIZE: usize = 1000;

/// Paging limits applied while parsing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseLimits {
    pub default_page_size: usize,
    pub max_page_size: usize,
}

impl Default for ParseLimits {
    fn default() -> Self {
        Self {
            default_page_size: DEFAULT_PAGE_SIZE,
            max_page_size: MAX_PAGE_SIZE,
        }
    }
}

impl ParseLimits {
    /// Rejects page sizes above the configured maximum
    pub fn check(&self, options: &QueryOptions) -> QueryResult<()> {
        if options.page_size > self.max_page_size {
            return Err(QueryError::invalid(format!(
                "page size {} exceeds maximum {}",
                options.page_size, self.max_page_size
            )));
        }
        Ok(())
    }
}

/// Parses query parameters into options.
///
/// Filters keep parameter order. Filter operands stay text (or null) here;
/// they are converted to the field's kind when the query is compiled.
pub fn parse_params<K, V>(params: &[(K, V)], limits: &ParseLimits) -> QueryResult<QueryOptions>
where
    K: AsRef<str>,
    V: AsRef<str>,
{
    let mut options = QueryOptions::new(0, limits.default_page_size);

    for (key, value) in params {
        let (key, value) = (key.as_ref(), value.as_ref());
        match key {
            "page" => options.page_index = parse_index(value)?,
            "size" => options.page_size = parse_size(value)?,
            "sort" => options.sort_specs = parse_sort(value)?,
            "search" => options.search_text = value.to_string(),
            "ignore_case" => options.ignore_case = parse_bool(key, value)?,
            "" => return Err(QueryError::invalid("empty parameter name")),
            field => options.filters.push(parse_filter(field, value)?),
        }
    }

    options.validate()?;
    limits.check(&options)?;

    Ok(options)
}

/// Parse page index (zero-based, non-negative)
fn parse_index(value: &str) -> QueryResult<usize> {
    let index: i64 = value
        .trim()
        .parse()
        .map_err(|_| QueryError::invalid(format!("Invalid page index: {}", value)))?;
    usize::try_from(index)
        .map_err(|_| QueryError::invalid(format!("page index must not be negative: {}", index)))
}

/// Parse page size (positive)
fn parse_size(value: &str) -> QueryResult<usize> {
    let size: i64 = value
        .trim()
        .parse()
        .map_err(|_| QueryError::invalid(format!("Invalid page size: {}", value)))?;
    if size <= 0 {
        return Err(QueryError::invalid(format!(
            "page size must be greater than zero: {}",
            size
        )));
    }
    usize::try_from(size).map_err(|_| QueryError::invalid(format!("Invalid page size: {}", value)))
}

/// Parse sort parameter (comma-separated field.direction)
fn parse_sort(value: &str) -> QueryResult<Vec<SortSpec>> {
    let mut specs = Vec::new();

    for part in value.split(',') {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }

        let spec = match part.rsplit_once('.') {
            Some((field, direction)) if is_direction(direction) => {
                let direction = match direction.to_lowercase().as_str() {
                    "asc" => SortDirection::Ascending,
                    _ => SortDirection::Descending,
                };
                SortSpec {
                    field: field.to_string(),
                    direction,
                }
            }
            Some((_, direction)) if direction.eq_ignore_ascii_case("ascending")
                || direction.eq_ignore_ascii_case("descending") =>
            {
                return Err(QueryError::invalid(format!(
                    "Invalid sort direction: {} (use asc or desc)",
                    direction
                )));
            }
            // no direction suffix: ascending, dotted names allowed
            _ => SortSpec::asc(part),
        };

        if spec.field.is_empty() {
            return Err(QueryError::invalid(format!("Invalid sort key: {}", part)));
        }
        specs.push(spec);
    }

    Ok(specs)
}

fn is_direction(s: &str) -> bool {
    s.eq_ignore_ascii_case("asc") || s.eq_ignore_ascii_case("desc")
}

fn parse_bool(key: &str, value: &str) -> QueryResult<bool> {
    match value.trim() {
        "true" | "1" => Ok(true),
        "false" | "0" | "" => Ok(false),
        other => Err(QueryError::invalid(format!("Invalid {}: {}", key, other))),
    }
}

/// Parse a filter from field=op.value
fn parse_filter(field: &str, value: &str) -> QueryResult<FilterCriterion> {
    let Some((op, operand)) = value.split_once('.') else {
        return Ok(FilterCriterion::equals(field, parse_operand(value)));
    };

    let operator = match op {
        "eq" => FilterOperator::Equals,
        "contains" => FilterOperator::Contains,
        "gt" => FilterOperator::GreaterThan,
        "lt" => FilterOperator::LessThan,
        "range" => FilterOperator::Range,
        // A bare lowercase word before the dot is an operator name; dotted
        // equality values are written as eq.value
        other if !other.is_empty() && other.bytes().all(|b| b.is_ascii_lowercase()) => {
            return Err(QueryError::invalid(format!(
                "Invalid filter operator for '{}': {}",
                field, other
            )));
        }
        _ => return Ok(FilterCriterion::equals(field, parse_operand(value))),
    };

    let value = match operator {
        FilterOperator::Range => {
            let (lower, upper) = operand.split_once("..").ok_or_else(|| {
                QueryError::invalid(format!(
                    "Invalid range for '{}': {} (expected lo..hi)",
                    field, operand
                ))
            })?;
            FilterValue::Range {
                lower: parse_bound(lower),
                upper: parse_bound(upper),
            }
        }
        FilterOperator::Contains => FilterValue::Scalar(FieldValue::Text(operand.to_string())),
        _ => FilterValue::Scalar(parse_operand(operand)),
    };

    Ok(FilterCriterion {
        field: field.to_string(),
        operator,
        value,
    })
}

fn parse_bound(raw: &str) -> Option<FieldValue> {
    if raw.trim().is_empty() {
        None
    } else {
        Some(parse_operand(raw))
    }
}

fn parse_operand(raw: &str) -> FieldValue {
    if raw == "null" {
        FieldValue::Null
    } else {
        FieldValue::Text(raw.to_string())
    }
}
