// src/page.rs

use std::fmt;

use reqwest::Client;
use scraper::Html;
use serde::Serialize;

use crate::collect::Collector;
use crate::error::Error;
use crate::fetch;

/// A reconstructed logical table: ordered header plus row grid.
///
/// Every cell value is trimmed of surrounding whitespace. Header names may
/// repeat and their order is significant. Rows may be shorter than the header
/// when the source table is jagged; missing cells are absent, not empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Table {
    /// Column names, in document order.
    pub header: Vec<String>,
    /// Data rows, in document order.
    pub rows: Vec<Vec<String>>,
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Table[{}] ({} rows)",
            self.header.join(", "),
            self.rows.len()
        )
    }
}

/// All logical tables parseable from one document, in document order.
#[derive(Debug, Clone)]
pub struct Page {
    tables: Vec<Table>,
}

impl Page {
    /// Extracts every table from raw markup. The underlying parser recovers
    /// from malformed HTML, so this never fails; tables whose structure
    /// cannot be reconstructed are logged and skipped.
    pub fn from_html(html: &str) -> Page {
        let document = Html::parse_document(html);
        Page {
            tables: Collector::collect(&document),
        }
    }

    /// Fetches `url` with a one-off client and extracts every table.
    pub async fn from_url(url: &str) -> Result<Page, Error> {
        Self::from_url_with_client(&Client::new(), url).await
    }

    /// Fetches `url` with the given client and extracts every table.
    pub async fn from_url_with_client(client: &Client, url: &str) -> Result<Page, Error> {
        let body = fetch::get_text(client, url).await?;
        Ok(Self::from_html(&body))
    }

    /// Number of tables found on the page.
    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// All tables, in document order.
    pub fn tables(&self) -> &[Table] {
        &self.tables
    }

    /// Finds the unique table whose header contains every name in `columns`
    /// verbatim, in any order.
    ///
    /// Fails with [`Error::AmbiguousMatch`] naming both candidates when more
    /// than one table qualifies, and with [`Error::NotFound`] when none does.
    pub fn find_with_columns(&self, columns: &[&str]) -> Result<&Table, Error> {
        let mut found: Option<usize> = None;
        for (index, table) in self.tables.iter().enumerate() {
            let matches = columns
                .iter()
                .all(|column| table.header.iter().any(|header| header == column));
            if !matches {
                continue;
            }
            if let Some(first_index) = found {
                return Err(Error::AmbiguousMatch {
                    columns: owned(columns),
                    first_index,
                    first: self.tables[first_index].to_string(),
                    second_index: index,
                    second: table.to_string(),
                });
            }
            found = Some(index);
        }
        match found {
            Some(index) => Ok(&self.tables[index]),
            None => Err(Error::NotFound {
                columns: owned(columns),
            }),
        }
    }

    /// Invokes `f` once per data row of the unique table matching `columns`,
    /// passing the row's values for those columns in the requested order.
    /// Typically used with one to three columns.
    ///
    /// Rows too short to cover every requested column are silently skipped.
    /// A callback error stops iteration and surfaces as
    /// [`Error::Callback`] tagged with the failing row's index.
    pub fn each_row<const N: usize>(
        &self,
        columns: [&str; N],
        mut f: impl FnMut([&str; N]) -> anyhow::Result<()>,
    ) -> Result<(), Error> {
        let table = self.find_with_columns(&columns)?;
        let mut offsets = [0usize; N];
        for (slot, column) in offsets.iter_mut().zip(columns.iter()) {
            // find_with_columns guarantees presence
            *slot = table
                .header
                .iter()
                .position(|header| header == column)
                .ok_or_else(|| Error::NotFound {
                    columns: owned(&columns),
                })?;
        }
        for (index, row) in table.rows.iter().enumerate() {
            if offsets.iter().any(|&offset| offset >= row.len()) {
                continue;
            }
            let values = offsets.map(|offset| row[offset].as_str());
            f(values).map_err(|source| Error::Callback { row: index, source })?;
        }
        Ok(())
    }
}

fn owned(columns: &[&str]) -> Vec<String> {
    columns.iter().map(|c| (*c).to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;

    const FIXTURE: &str = "<body>
    <h1>foo</h1>
    <table>
        <tr><td>a</td><td>b</td></tr>
        <tr><td> 1 </td><td>2</td></tr>
        <tr><td>3  </td><td>4   </td></tr>
    </table>
    <h1>bar</h1>
    <table>
        <tr><th>b</th><th>c</th><th>d</th></tr>
        <tr><td>1</td><td>2</td><td>5</td></tr>
        <tr><td>3</td><td>4</td><td>6</td></tr>
    </table>
    </body>";

    // public domain data from https://en.wikipedia.org/wiki/List_of_S&P_500_companies
    const FIXTURE_COLSPANS: &str = r##"<table>
    <thead>
        <tr>
            <th rowspan="2">Date</th>
            <th colspan="2">Added</th>
            <th colspan="2">Removed</th>
            <th rowspan="2">Reason</th>
        </tr>
        <tr>
            <th rowspan="@#$%^&">Ticker</th>
            <th>Security</th>
            <th>Ticker</th>
            <th>Security</th>
        </tr>
    </thead>
    <tbody>
        <tr>
            <td>June 21, 2022</td>
            <td>KDP</td>
            <td><a href="/wiki/Keurig_Dr_Pepper">Keurig Dr Pepper</a></td>
            <td>UA/UAA</td>
            <td><a href="/wiki/Under_Armour">Under Armour</a></td>
            <td>Market capitalization change.<sup class="reference"><a href="#cite_note-4">[4]</a></sup></td>
        </tr>
        <tr>
            <td>June 21, 2022</td>
            <td>ON</td>
            <td><a href="/wiki/ON_Semiconductor">ON Semiconductor</a></td>
            <td>IPGP</td>
            <td><a href="/wiki/IPG_Photonics">IPG Photonics</a></td>
            <td>Market capitalization change.<sup class="reference"><a href="#cite_note-4">[4]</a></sup></td>
        </tr>
    </tbody>
    </table>"##;

    #[test]
    fn finds_all_tables() {
        let page = Page::from_html(FIXTURE);
        assert_eq!(page.len(), 2);
        assert!(!page.is_empty());
    }

    #[test]
    fn page_without_tables_is_empty_and_never_matches() {
        let page = Page::from_html("<body><h1>nothing here</h1></body>");
        assert_eq!(page.len(), 0);
        let err = page.find_with_columns(&["a"]).unwrap_err();
        assert_eq!(err.to_string(), "cannot find table with columns: a");
    }

    #[test]
    fn merged_headers_and_spanned_cells_resolve() {
        let page = Page::from_html(FIXTURE_COLSPANS);
        assert_eq!(page.len(), 1);
        let table = &page.tables()[0];
        assert_eq!(
            table.header,
            vec![
                "Date",
                "Added Ticker",
                "Added Security",
                "Removed Ticker",
                "Removed Security",
                "Reason"
            ]
        );
        assert_eq!(table.rows[0][5], "Market capitalization change.[4]");
        assert_eq!(table.rows.len(), 2);
    }

    #[test]
    fn finds_table_by_column_names() {
        let page = Page::from_html(FIXTURE);
        let table = page.find_with_columns(&["c", "d"]).unwrap();
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0], vec!["1", "2", "5"]);
    }

    #[test]
    fn more_than_one_match_is_ambiguous() {
        let page = Page::from_html(FIXTURE);
        let err = page.find_with_columns(&["b"]).unwrap_err();
        assert_eq!(
            err.to_string(),
            "more than one table matches columns `b`: \
             [0] Table[a, b] (2 rows) and [1] Table[b, c, d] (2 rows)"
        );
    }

    #[test]
    fn no_match_lists_requested_columns() {
        let page = Page::from_html(FIXTURE);
        let err = page.find_with_columns(&["x", "y", "z"]).unwrap_err();
        assert_eq!(err.to_string(), "cannot find table with columns: x, y, z");
    }

    #[test]
    fn each_row_single_column() {
        let page = Page::from_html(FIXTURE);
        let mut seen = Vec::new();
        page.each_row(["a"], |[a]| {
            seen.push(a.to_string());
            Ok(())
        })
        .unwrap();
        assert_eq!(seen, vec!["1", "3"]);
    }

    #[test]
    fn each_row_passes_values_in_requested_order() {
        let page = Page::from_html(FIXTURE);
        let mut seen = Vec::new();
        page.each_row(["c", "d"], |[c, d]| {
            seen.push((c.to_string(), d.to_string()));
            Ok(())
        })
        .unwrap();
        assert_eq!(
            seen,
            vec![
                ("2".to_string(), "5".to_string()),
                ("4".to_string(), "6".to_string())
            ]
        );
    }

    #[test]
    fn callback_failure_is_tagged_with_row_index() {
        let page = Page::from_html(FIXTURE);
        let err = page
            .each_row(["a"], |[_]| Err(anyhow!("nope")))
            .unwrap_err();
        assert_eq!(err.to_string(), "row 0: nope");
    }

    #[test]
    fn each_row_on_unknown_columns_is_not_found() {
        let page = Page::from_html(FIXTURE);
        let err = page.each_row(["x", "y"], |[_, _]| Ok(())).unwrap_err();
        assert_eq!(err.to_string(), "cannot find table with columns: x, y");
    }

    #[test]
    fn each_row_skips_rows_shorter_than_requested_columns() {
        let page = Page::from_html(
            "<table>
                <tr><th>a</th><th>b</th><th>c</th></tr>
                <tr><td>1</td><td>2</td></tr>
                <tr><td>3</td><td>4</td><td>5</td></tr>
            </table>",
        );
        let mut seen = Vec::new();
        page.each_row(["c"], |[c]| {
            seen.push(c.to_string());
            Ok(())
        })
        .unwrap();
        assert_eq!(seen, vec!["5"]);
    }

    #[test]
    fn divider_rows_do_not_shift_row_indices() {
        let page = Page::from_html(
            r#"<table>
                <tr><th>a</th><th>b</th></tr>
                <tr><td colspan="2">----</td></tr>
                <tr><td>1</td><td>2</td></tr>
            </table>"#,
        );
        let err = page
            .each_row(["a"], |[_]| Err(anyhow!("nope")))
            .unwrap_err();
        assert_eq!(err.to_string(), "row 0: nope");
    }

    #[test]
    fn table_display_summarizes_header_and_row_count() {
        let page = Page::from_html(FIXTURE);
        let table = page.find_with_columns(&["c"]).unwrap();
        assert_eq!(table.to_string(), "Table[b, c, d] (2 rows)");
    }

    #[test]
    fn table_serializes_to_json() {
        let page = Page::from_html(FIXTURE);
        let table = page.find_with_columns(&["c"]).unwrap();
        let json = serde_json::to_value(table).unwrap();
        assert_eq!(json["header"][1], "c");
        assert_eq!(json["rows"][1][2], "6");
    }
}
