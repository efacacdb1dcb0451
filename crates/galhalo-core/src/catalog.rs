//! # Catalog Module
//!
//! In-memory column tables for halo and galaxy catalogs, and the argument
//! type through which models read halo properties.
//!
//! - A `Catalog` is an ordered set of rows with named `f64` columns.
//! - Every column has the same length.
//! - Models never mutate a halo catalog; CAM writes exactly one column of a
//!   galaxy catalog when asked to.

use crate::GalhaloError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// =============================================================================
// CATALOG
// =============================================================================

/// Ordered rows with string-keyed numeric columns.
///
/// Serialized as a map from column name to values; deserialization runs the
/// same length check as [`Catalog::insert_column`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(
    try_from = "BTreeMap<String, Vec<f64>>",
    into = "BTreeMap<String, Vec<f64>>"
)]
pub struct Catalog {
    columns: BTreeMap<String, Vec<f64>>,
    len: usize,
}

impl Catalog {
    /// Create an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style column insertion.
    pub fn with_column(
        mut self,
        key: impl Into<String>,
        values: Vec<f64>,
    ) -> Result<Self, GalhaloError> {
        self.insert_column(key, values)?;
        Ok(self)
    }

    /// Insert or replace a column.
    ///
    /// The first column fixes the row count; later columns must match it.
    pub fn insert_column(
        &mut self,
        key: impl Into<String>,
        values: Vec<f64>,
    ) -> Result<(), GalhaloError> {
        if !self.columns.is_empty() && values.len() != self.len {
            return Err(GalhaloError::LengthMismatch {
                expected: self.len,
                found: values.len(),
            });
        }
        self.len = values.len();
        self.columns.insert(key.into(), values);
        Ok(())
    }

    /// Borrow a column by name.
    pub fn column(&self, key: &str) -> Result<&[f64], GalhaloError> {
        self.columns
            .get(key)
            .map(Vec::as_slice)
            .ok_or_else(|| GalhaloError::MissingColumn(key.to_string()))
    }

    /// Check whether a column exists.
    #[must_use]
    pub fn contains_column(&self, key: &str) -> bool {
        self.columns.contains_key(key)
    }

    /// Column names in name order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(String::as_str)
    }

    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Check if the catalog has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// New catalog holding the given rows, in the given order.
    ///
    /// Indices may repeat (one halo row per hosted galaxy).
    pub fn select(&self, indices: &[usize]) -> Result<Catalog, GalhaloError> {
        if let Some(&bad) = indices.iter().find(|&&i| i >= self.len) {
            return Err(GalhaloError::LengthMismatch {
                expected: self.len,
                found: bad + 1,
            });
        }
        let columns = self
            .columns
            .iter()
            .map(|(key, values)| (key.clone(), indices.iter().map(|&i| values[i]).collect()))
            .collect();
        Ok(Catalog {
            columns,
            len: indices.len(),
        })
    }
}

// =============================================================================
// HALO QUERY
// =============================================================================

/// Call-site halo input of every model method.
///
/// Either a direct array of the primary halo property or a halo table from
/// which the model reads its own `prim_haloprop_key` column. When both are
/// supplied the table wins. When neither is supplied every model call fails
/// with `GalhaloError::MissingHaloInput`.
#[derive(Debug, Clone, Copy, Default)]
pub struct HaloQuery<'a> {
    prim_haloprop: Option<&'a [f64]>,
    halo_table: Option<&'a Catalog>,
}

impl<'a> HaloQuery<'a> {
    /// Query with no halo input at all.
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    /// Query with a direct array of the primary halo property.
    #[must_use]
    pub fn prim_haloprop(values: &'a [f64]) -> Self {
        Self {
            prim_haloprop: Some(values),
            halo_table: None,
        }
    }

    /// Query with a full halo table.
    #[must_use]
    pub fn halo_table(table: &'a Catalog) -> Self {
        Self {
            prim_haloprop: None,
            halo_table: Some(table),
        }
    }

    /// The halo table, if one was supplied.
    #[must_use]
    pub fn table(&self) -> Option<&'a Catalog> {
        self.halo_table
    }

    /// Resolve the primary halo property for a model keyed on `key`.
    ///
    /// `caller` names the operation in the error message.
    pub fn resolve(&self, key: &str, caller: &str) -> Result<&'a [f64], GalhaloError> {
        match (self.halo_table, self.prim_haloprop) {
            (Some(table), _) => table.column(key),
            (None, Some(values)) => Ok(values),
            (None, None) => Err(GalhaloError::MissingHaloInput(caller.to_string())),
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

impl TryFrom<BTreeMap<String, Vec<f64>>> for Catalog {
    type Error = GalhaloError;

    fn try_from(columns: BTreeMap<String, Vec<f64>>) -> Result<Self, Self::Error> {
        let mut catalog = Catalog::new();
        for (key, values) in columns {
            catalog.insert_column(key, values)?;
        }
        Ok(catalog)
    }
}

impl From<Catalog> for BTreeMap<String, Vec<f64>> {
    fn from(catalog: Catalog) -> Self {
        catalog.columns
    }
}
