// src/grid.rs

use anyhow::{anyhow, Result};

use crate::page::Table;

/// One table's source rows, buffered in document order by the collector.
///
/// `col_spans` and `row_spans` parallel `rows` cell-for-cell; `max_cols`
/// tracks the widest source row seen so far.
#[derive(Debug, Default)]
pub(crate) struct RawTable {
    rows: Vec<Vec<String>>,
    col_spans: Vec<Vec<usize>>,
    row_spans: Vec<Vec<usize>>,
    max_cols: usize,
}

/// A rectangular reservation left by a spanning cell: `value` occupies
/// `[begin_x, end_x) x [begin_y, end_y)` of the logical grid.
#[derive(Debug)]
struct SpanClaim {
    begin_x: usize,
    end_x: usize,
    begin_y: usize,
    end_y: usize,
    value: String,
}

impl SpanClaim {
    fn covers(&self, x: usize, y: usize) -> bool {
        self.begin_x <= x && x < self.end_x && self.begin_y <= y && y < self.end_y
    }
}

/// Most tables have no spanning cells, so claims stay a short list scanned
/// per position instead of a dense occupancy grid.
#[derive(Debug, Default)]
struct Claims(Vec<SpanClaim>);

impl Claims {
    fn value_at(&self, x: usize, y: usize) -> Option<&str> {
        self.0
            .iter()
            .find(|claim| claim.covers(x, y))
            .map(|claim| claim.value.as_str())
    }
}

impl RawTable {
    pub(crate) fn push_row(
        &mut self,
        cells: Vec<String>,
        col_spans: Vec<usize>,
        row_spans: Vec<usize>,
    ) {
        self.max_cols = self.max_cols.max(cells.len());
        self.rows.push(cells);
        self.col_spans.push(col_spans);
        self.row_spans.push(row_spans);
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Resolves spans into a logical grid. The first surviving row becomes
    /// the header; an error abandons the whole table.
    ///
    /// Header cells with `colspan > 1` merge with the matching cells of the
    /// row below into `"{upper} {lower}"` column names, and that lower row is
    /// consumed. Only two stacked header rows are supported. After the header
    /// is fixed, spanning cells register a [`SpanClaim`] so their value is
    /// repeated at every grid position they cover.
    pub(crate) fn reconstruct(self) -> Result<Table> {
        let mut max_cols = self.max_cols;
        let mut logical: Vec<Vec<String>> = Vec::new();
        let mut claims = Claims::default();
        let mut got_header = false;

        let mut y = 0;
        while y < self.rows.len() {
            // a single cell spanning the full width is a divider, not data
            if self.rows[y].len() == 1 && self.col_spans[y][0] == max_cols {
                y += 1;
                continue;
            }
            let mut current: Vec<String> = Vec::new();
            let mut merged_header = false;
            let mut j = 0; // next unconsumed cell of the source row
            let mut k = 0; // cells consumed from the row below during a header merge
            let mut x = 0;
            while x < max_cols {
                if let Some(value) = claims.value_at(x, y) {
                    current.push(value.to_string());
                    x += 1;
                    continue;
                }
                if j >= self.rows[y].len() {
                    // jagged source row: the logical row stays short
                    break;
                }
                let col_span = self.col_spans[y][j];
                let row_span = self.row_spans[y][j];
                let value = &self.rows[y][j];
                if got_header && (row_span > 1 || col_span > 1) {
                    claims.0.push(SpanClaim {
                        begin_x: x,
                        end_x: x
                            .checked_add(col_span)
                            .ok_or_else(|| anyhow!("colspan overflow at ({x}, {y})"))?,
                        begin_y: y,
                        end_y: y
                            .checked_add(row_span)
                            .ok_or_else(|| anyhow!("rowspan overflow at ({x}, {y})"))?,
                        value: value.clone(),
                    });
                }
                if !got_header && col_span > 1 {
                    merged_header = true;
                    for _ in 0..col_span {
                        let below = self
                            .rows
                            .get(y + 1)
                            .and_then(|row| row.get(k))
                            .ok_or_else(|| {
                                anyhow!(
                                    "merged header cell at ({x}, {y}) has no matching cell in the next row"
                                )
                            })?;
                        current.push(format!("{value} {below}"));
                        k += 1;
                    }
                } else {
                    current.push(value.clone());
                }
                j += 1;
                x += 1;
            }
            if merged_header {
                // the row below was consumed into the header
                y += 1;
            }
            got_header = true;
            max_cols = max_cols.max(current.len());
            logical.push(current);
            y += 1;
        }

        let mut rows = logical.into_iter();
        let header = rows
            .next()
            .ok_or_else(|| anyhow!("table has no rows besides dividers"))?;
        Ok(Table {
            header,
            rows: rows.collect(),
        })
    }
}
