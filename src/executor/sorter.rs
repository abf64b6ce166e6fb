//! Result sorting
//!
//! Multi-key, stable. Keys are read once per record before sorting, so
//! accessors run O(n) times rather than once per comparison.

use std::cmp::Ordering;

use crate::field::{FieldDef, FieldRegistry, FieldValue};
use crate::query::{QueryError, QueryResult, SortDirection, SortSpec};

struct SortKey<'r, T> {
    field: &'r FieldDef<T>,
    direction: SortDirection,
}

/// Composite comparator built from sort specs
pub struct ResultSorter<'r, T> {
    keys: Vec<SortKey<'r, T>>,
}

impl<'r, T> ResultSorter<'r, T> {
    /// Builds a comparator. The first spec is the primary key.
    ///
    /// Unknown fields are `InvalidQuery`; unordered kinds are
    /// `UnsupportedComparison`.
    pub fn build(registry: &'r FieldRegistry<T>, specs: &[SortSpec]) -> QueryResult<Self> {
        let keys = specs
            .iter()
            .map(|spec| {
                let field = registry.resolve(&spec.field)?;
                if !field.kind().is_ordered() {
                    return Err(QueryError::unsupported(
                        field.name(),
                        format!("cannot sort by '{}', a {} field", field.name(), field.kind()),
                    ));
                }
                Ok(SortKey {
                    field,
                    direction: spec.direction,
                })
            })
            .collect::<QueryResult<Vec<_>>>()?;

        Ok(Self { keys })
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Compares two records key by key; the first non-equal key decides
    pub fn compare(&self, a: &T, b: &T) -> Ordering {
        for key in &self.keys {
            let ord = key
                .direction
                .apply(key.field.read(a).total_cmp(&key.field.read(b)));
            if ord != Ordering::Equal {
                return ord;
            }
        }
        Ordering::Equal
    }

    /// Sorts records, keeping the input order of ties
    pub fn sort<'a>(&self, records: Vec<&'a T>) -> Vec<&'a T> {
        if self.keys.is_empty() {
            return records;
        }

        let mut decorated: Vec<(Vec<FieldValue>, &'a T)> = records
            .into_iter()
            .map(|record| {
                let values = self.keys.iter().map(|k| k.field.read(record)).collect();
                (values, record)
            })
            .collect();

        // sort_by is stable
        decorated.sort_by(|(a, _), (b, _)| self.compare_keys(a, b));

        decorated.into_iter().map(|(_, record)| record).collect()
    }

    fn compare_keys(&self, a: &[FieldValue], b: &[FieldValue]) -> Ordering {
        for ((key, x), y) in self.keys.iter().zip(a).zip(b) {
            let ord = key.direction.apply(x.total_cmp(y));
            if ord != Ordering::Equal {
                return ord;
            }
        }
        Ordering::Equal
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::FieldKind;

    #[derive(Debug, PartialEq)]
    struct Row {
        id: u32,
        group: &'static str,
        score: Option<i64>,
        tags: Vec<&'static str>,
    }

    fn row(id: u32, group: &'static str, score: Option<i64>) -> Row {
        Row {
            id,
            group,
            score,
            tags: vec![],
        }
    }

    fn registry() -> FieldRegistry<Row> {
        FieldRegistry::new()
            .field("id", FieldKind::Int, |r: &Row| FieldValue::from(r.id))
            .field("group", FieldKind::Text, |r: &Row| FieldValue::from(r.group))
            .field("score", FieldKind::Int, |r: &Row| FieldValue::from(r.score))
            .field("tags", FieldKind::List, |r: &Row| FieldValue::from(r.tags.clone()))
    }

    fn ids(rows: &[&Row]) -> Vec<u32> {
        rows.iter().map(|r| r.id).collect()
    }

    #[test]
    fn test_multi_key_sort() {
        let rows = vec![
            row(1, "b", Some(3)),
            row(2, "a", Some(1)),
            row(3, "b", Some(9)),
            row(4, "a", Some(5)),
        ];
        let registry = registry();
        let sorter = ResultSorter::build(
            &registry,
            &[SortSpec::asc("group"), SortSpec::desc("score")],
        )
        .unwrap();

        let sorted = sorter.sort(rows.iter().collect());
        assert_eq!(ids(&sorted), vec![4, 2, 3, 1]);
    }

    #[test]
    fn test_stable_for_ties() {
        let rows = vec![row(1, "x", None), row(2, "x", None), row(3, "x", None)];
        let registry = registry();
        let sorter = ResultSorter::build(&registry, &[SortSpec::desc("group")]).unwrap();

        let sorted = sorter.sort(rows.iter().collect());
        assert_eq!(ids(&sorted), vec![1, 2, 3]);
    }

    #[test]
    fn test_nulls_first_ascending_last_descending() {
        let rows = vec![row(1, "a", Some(2)), row(2, "a", None), row(3, "a", Some(1))];
        let registry = registry();

        let asc = ResultSorter::build(&registry, &[SortSpec::asc("score")]).unwrap();
        assert_eq!(ids(&asc.sort(rows.iter().collect())), vec![2, 3, 1]);

        let desc = ResultSorter::build(&registry, &[SortSpec::desc("score")]).unwrap();
        assert_eq!(ids(&desc.sort(rows.iter().collect())), vec![1, 3, 2]);
    }

    #[test]
    fn test_compare_matches_sort() {
        let registry = registry();
        let sorter = ResultSorter::build(&registry, &[SortSpec::asc("id")]).unwrap();
        let (a, b) = (row(1, "a", None), row(2, "a", None));

        assert_eq!(sorter.compare(&a, &b), Ordering::Less);
        assert_eq!(sorter.compare(&b, &a), Ordering::Greater);
        assert_eq!(sorter.compare(&a, &a), Ordering::Equal);
    }

    #[test]
    fn test_empty_specs_keep_order() {
        let rows = vec![row(3, "a", None), row(1, "a", None)];
        let registry = registry();
        let sorter = ResultSorter::build(&registry, &[]).unwrap();

        assert!(sorter.is_empty());
        assert_eq!(ids(&sorter.sort(rows.iter().collect())), vec![3, 1]);
    }

    #[test]
    fn test_build_errors() {
        let registry = registry();

        let err = ResultSorter::build(&registry, &[SortSpec::asc("nope")]).err().unwrap();
        assert!(matches!(err, QueryError::InvalidQuery(_)));

        let err = ResultSorter::build(&registry, &[SortSpec::asc("tags")]).err().unwrap();
        assert!(matches!(err, QueryError::UnsupportedComparison { .. }));
    }
}
