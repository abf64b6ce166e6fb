//! Data sources a pipeline can query

use std::fmt;
use std::sync::Arc;

use crate::field::FieldRegistry;
use crate::remote::RemoteAdapter;

/// An in-memory record snapshot with its field model
pub struct LocalSource<T> {
    records: Vec<T>,
    registry: FieldRegistry<T>,
    searchable: Vec<String>,
}

impl<T> LocalSource<T> {
    /// `searchable` names the fields free-text search looks at
    pub fn new<S: Into<String>>(
        records: Vec<T>,
        registry: FieldRegistry<T>,
        searchable: impl IntoIterator<Item = S>,
    ) -> Self {
        Self {
            records,
            registry,
            searchable: searchable.into_iter().map(Into::into).collect(),
        }
    }

    pub fn records(&self) -> &[T] {
        &self.records
    }

    pub fn registry(&self) -> &FieldRegistry<T> {
        &self.registry
    }

    pub fn searchable(&self) -> &[String] {
        &self.searchable
    }
}

/// Where a pipeline's records come from
pub enum DataSource<T> {
    Local(LocalSource<T>),
    Remote(Arc<dyn RemoteAdapter<T>>),
}

impl<T> DataSource<T> {
    pub fn is_remote(&self) -> bool {
        matches!(self, DataSource::Remote(_))
    }
}

impl<T> fmt::Debug for DataSource<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataSource::Local(local) => f
                .debug_struct("Local")
                .field("records", &local.records.len())
                .field("searchable", &local.searchable)
                .finish(),
            DataSource::Remote(adapter) => f.debug_tuple("Remote").field(&adapter.describe()).finish(),
        }
    }
}
