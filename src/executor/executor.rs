//! Query executor for gridquery
//!
//! Runs one query against an in-memory slice of records.
//!
//! Execution flow (strict order):
//! 1. Free-text search (if search text is non-empty)
//! 2. Filter criteria (AND)
//! 3. Count survivors
//! 4. Stable sort (if sort specs are present)
//! 5. Skip `page_index * page_size`, take `page_size`
//! 6. Return items, count and flags

use crate::field::FieldRegistry;
use crate::query::{QueryOptions, QueryResult};

use super::filters::{PredicateFilter, SearchFilter};
use super::result::ResultPage;
use super::sorter::ResultSorter;

/// Executes queries against an in-memory source
pub struct QueryExecutor<'r, T> {
    registry: &'r FieldRegistry<T>,
}

impl<'r, T: Clone> QueryExecutor<'r, T> {
    /// Creates a new executor over a field registry
    pub fn new(registry: &'r FieldRegistry<T>) -> Self {
        Self { registry }
    }

    /// Executes a query and returns one page.
    ///
    /// Options are validated and every criterion and sort key is compiled
    /// before the first record is read, so errors never leave a partial page.
    /// The source is not modified.
    pub fn execute<S: AsRef<str>>(
        &self,
        source: &[T],
        options: &QueryOptions,
        searchable: &[S],
    ) -> QueryResult<ResultPage<T>> {
        options.validate()?;

        let search = SearchFilter::compile(
            self.registry,
            searchable,
            &options.search_text,
            options.ignore_case,
        )?;
        let filter = PredicateFilter::compile(self.registry, &options.filters, options.ignore_case)?;
        let sorter = ResultSorter::build(self.registry, &options.sort_specs)?;

        // Steps 1-2: search, then filters
        let survivors: Vec<&T> = source
            .iter()
            .filter(|record| search.as_ref().map_or(true, |s| s.matches(record)))
            .filter(|record| filter.matches(record))
            .collect();

        // Step 3: count before pagination
        let total_count = survivors.len();

        // Step 4: sort (source order otherwise)
        let ordered = sorter.sort(survivors);

        // Step 5: paginate, no clamping past the end
        let items: Vec<T> = ordered
            .into_iter()
            .skip(options.offset())
            .take(options.page_size)
            .cloned()
            .collect();

        // Step 6
        Ok(ResultPage {
            items,
            total_count,
            is_filtered: options.has_filters(),
            is_sorted: options.has_sort(),
            is_searched: search.is_some(),
            page_index: options.page_index,
            page_size: options.page_size,
        })
    }
}
