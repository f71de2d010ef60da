// src/error.rs

use thiserror::Error;

use crate::typed::FieldKind;

/// Failures surfaced by table lookup, row iteration, typed projection and
/// page retrieval.
///
/// Reconstruction problems inside a single table never appear here: such a
/// table is logged and dropped, and the rest of the document is unaffected.
#[derive(Debug, Error)]
pub enum Error {
    /// The page body could not be retrieved from the given URL.
    #[error("fetching {url}")]
    Fetch {
        url: String,
        #[source]
        source: anyhow::Error,
    },

    /// No table's header contains all of the requested column names.
    #[error("cannot find table with columns: {}", columns.join(", "))]
    NotFound { columns: Vec<String> },

    /// More than one table matches the requested column names.
    #[error(
        "more than one table matches columns `{}`: [{first_index}] {first} and [{second_index}] {second}",
        columns.join(", ")
    )]
    AmbiguousMatch {
        columns: Vec<String>,
        first_index: usize,
        first: String,
        second_index: usize,
        second: String,
    },

    /// A declared record field has a kind projection cannot coerce into.
    #[error("setting field is not supported, {field} is {kind}")]
    UnsupportedFieldType { field: String, kind: FieldKind },

    /// A cell's text could not be coerced to the declared field kind.
    #[error("row {row}: {column}: {message}")]
    Coercion {
        row: usize,
        column: String,
        message: String,
    },

    /// A row callback reported failure; iteration stopped at that row.
    #[error("row {row}: {source}")]
    Callback {
        row: usize,
        #[source]
        source: anyhow::Error,
    },
}
