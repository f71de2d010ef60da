// src/typed.rs

use std::fmt;

use tracing::debug;

use crate::error::Error;
use crate::page::{Page, Table};

/// Kinds a record field may declare.
///
/// Projection coerces cell text into `Text`, `Integer` and `Boolean`; other
/// kinds are declarable (external schemas name more kinds than projection
/// supports) but rejected before any row is read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Integer,
    Boolean,
    Float,
}

impl FieldKind {
    fn is_supported(self) -> bool {
        matches!(self, FieldKind::Text | FieldKind::Integer | FieldKind::Boolean)
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FieldKind::Text => "text",
            FieldKind::Integer => "integer",
            FieldKind::Boolean => "boolean",
            FieldKind::Float => "float",
        };
        f.write_str(name)
    }
}

/// One declared record field: the header column it binds to and its kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSpec {
    pub column: String,
    pub kind: FieldKind,
}

/// A coerced cell value handed to a field setter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    Integer(i64),
    Boolean(bool),
}

type Setter<T> = Box<dyn Fn(&mut T, FieldValue)>;

/// Declares how table columns map onto a record type.
///
/// Fields are declared in order with a column name, a kind and a setter
/// closure; no runtime type introspection is involved. [`extract`] locates
/// the unique table whose header covers every declared column and
/// materializes one record per data row.
///
/// [`extract`]: RecordSchema::extract
///
/// ```
/// use htmlgrid::{Page, RecordSchema};
///
/// #[derive(Default)]
/// struct Part {
///     name: String,
///     qty: i64,
/// }
///
/// let page = Page::from_html(
///     "<table>
///         <tr><th>Name</th><th>Qty</th></tr>
///         <tr><td>bolt</td><td>42</td></tr>
///     </table>",
/// );
/// let parts = RecordSchema::<Part>::new()
///     .text("Name", |part, v| part.name = v)
///     .integer("Qty", |part, v| part.qty = v)
///     .extract(&page)
///     .unwrap();
/// assert_eq!(parts[0].qty, 42);
/// ```
pub struct RecordSchema<T> {
    fields: Vec<FieldSpec>,
    setters: Vec<Setter<T>>,
}

impl<T: Default> RecordSchema<T> {
    pub fn new() -> Self {
        RecordSchema {
            fields: Vec::new(),
            setters: Vec::new(),
        }
    }

    /// Declares a text field bound to `column`.
    pub fn text(self, column: &str, set: impl Fn(&mut T, String) + 'static) -> Self {
        self.field(column, FieldKind::Text, move |record, value| {
            if let FieldValue::Text(v) = value {
                set(record, v);
            }
        })
    }

    /// Declares an integer field bound to `column`.
    pub fn integer(self, column: &str, set: impl Fn(&mut T, i64) + 'static) -> Self {
        self.field(column, FieldKind::Integer, move |record, value| {
            if let FieldValue::Integer(v) = value {
                set(record, v);
            }
        })
    }

    /// Declares a boolean field bound to `column`. Cells reading `yes`, `y`,
    /// `true` or `t` (any case) coerce to `true`, anything else to `false`.
    pub fn boolean(self, column: &str, set: impl Fn(&mut T, bool) + 'static) -> Self {
        self.field(column, FieldKind::Boolean, move |record, value| {
            if let FieldValue::Boolean(v) = value {
                set(record, v);
            }
        })
    }

    /// Declares a field of an arbitrary kind. Kinds outside the supported
    /// set make [`extract`](RecordSchema::extract) fail with
    /// [`Error::UnsupportedFieldType`].
    pub fn field(
        mut self,
        column: &str,
        kind: FieldKind,
        set: impl Fn(&mut T, FieldValue) + 'static,
    ) -> Self {
        self.fields.push(FieldSpec {
            column: column.to_string(),
            kind,
        });
        self.setters.push(Box::new(set));
        self
    }

    /// Materializes one record per data row of the unique table whose header
    /// contains every declared column.
    ///
    /// A cell that cannot be coerced to its field's kind aborts the whole
    /// projection with [`Error::Coercion`]; no partial result is returned.
    /// Rows shorter than the column mapping leave the missing trailing
    /// fields at their [`Default`] value.
    pub fn extract(&self, page: &Page) -> Result<Vec<T>, Error> {
        for spec in &self.fields {
            if !spec.kind.is_supported() {
                return Err(Error::UnsupportedFieldType {
                    field: spec.column.clone(),
                    kind: spec.kind,
                });
            }
        }
        let columns: Vec<&str> = self.fields.iter().map(|f| f.column.as_str()).collect();
        let table = page.find_with_columns(&columns)?;
        let mapping = self.mapping(table);

        let mut records = Vec::with_capacity(table.rows.len());
        for (row_index, row) in table.rows.iter().enumerate() {
            let mut record = T::default();
            for &(column_index, field_index) in &mapping {
                let Some(cell) = row.get(column_index) else {
                    // short row: the field keeps its default value
                    continue;
                };
                let value =
                    coerce(cell, self.fields[field_index].kind).map_err(|message| {
                        Error::Coercion {
                            row: row_index,
                            column: table.header[column_index].clone(),
                            message,
                        }
                    })?;
                (self.setters[field_index])(&mut record, value);
            }
            records.push(record);
        }
        Ok(records)
    }

    /// Extracts records straight from raw markup.
    pub fn extract_from_html(&self, html: &str) -> Result<Vec<T>, Error> {
        self.extract(&Page::from_html(html))
    }

    /// Fetches `url` and extracts records from it.
    pub async fn extract_from_url(&self, url: &str) -> Result<Vec<T>, Error> {
        self.extract(&Page::from_url(url).await?)
    }

    /// Column position to field index; header columns matching no declared
    /// field are ignored.
    fn mapping(&self, table: &Table) -> Vec<(usize, usize)> {
        let mut mapping = Vec::new();
        for (column_index, header) in table.header.iter().enumerate() {
            if let Some(field_index) = self.fields.iter().position(|f| &f.column == header) {
                mapping.push((column_index, field_index));
            }
        }
        debug!(
            mapped = mapping.len(),
            fields = self.fields.len(),
            "mapped header columns to record fields"
        );
        mapping
    }
}

impl<T: Default> Default for RecordSchema<T> {
    fn default() -> Self {
        Self::new()
    }
}

const TRUTHY: [&str; 4] = ["yes", "y", "true", "t"];

fn coerce(cell: &str, kind: FieldKind) -> Result<FieldValue, String> {
    match kind {
        FieldKind::Text => Ok(FieldValue::Text(cell.to_string())),
        FieldKind::Integer => cell
            .parse::<i64>()
            .map(FieldValue::Integer)
            .map_err(|err| err.to_string()),
        FieldKind::Boolean => Ok(FieldValue::Boolean(
            TRUTHY.contains(&cell.to_lowercase().as_str()),
        )),
        // rejected before any row is read
        FieldKind::Float => Err(format!("unsupported kind {kind}")),
    }
}
