//! Structured data extraction from HTML tables and URLs.
//!
//! A [`Page`] holds every logical table found in one document. Table cells
//! carrying `colspan`/`rowspan` attributes are resolved into a rectangular
//! grid of trimmed string values, two-level merged headers are joined into
//! single column names, and decorative divider rows are discarded. Tables are
//! looked up by the set of column names their header must contain, and rows
//! can be projected onto caller-declared record types via [`RecordSchema`].
//!
//! ```
//! use htmlgrid::Page;
//!
//! let page = Page::from_html(
//!     "<table>
//!         <tr><th>Model</th><th>Cores</th></tr>
//!         <tr><td>1950X</td><td>16</td></tr>
//!     </table>",
//! );
//! let table = page.find_with_columns(&["Model", "Cores"]).unwrap();
//! assert_eq!(table.rows[0], vec!["1950X", "16"]);
//! ```

mod collect;
mod fetch;
mod grid;

pub mod error;
pub mod page;
pub mod typed;

pub use error::Error;
pub use page::{Page, Table};
pub use typed::{FieldKind, FieldSpec, FieldValue, RecordSchema};
