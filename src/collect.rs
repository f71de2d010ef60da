// src/collect.rs

use std::mem;

use ego_tree::NodeRef;
use scraper::node::Element;
use scraper::{Html, Node};
use tracing::{info, warn};

use crate::grid::RawTable;
use crate::page::Table;

/// Walks a parsed document in order, buffering `th`/`td` cells into rows and
/// handing each completed table to the grid reconstructor.
///
/// A table that fails reconstruction is logged and dropped; the rest of the
/// document is unaffected.
#[derive(Default)]
pub(crate) struct Collector {
    tables: Vec<Table>,
    raw: RawTable,
    row: Vec<String>,
    col_spans: Vec<usize>,
    row_spans: Vec<usize>,
}

impl Collector {
    pub(crate) fn collect(document: &Html) -> Vec<Table> {
        let mut collector = Collector::default();
        collector.walk(document.tree.root());
        // a table still open at end of document is flushed here
        collector.finish_table();
        collector.tables
    }

    fn walk(&mut self, node: NodeRef<'_, Node>) {
        if let Some(element) = node.value().as_element() {
            match element.name() {
                "td" | "th" => {
                    self.col_spans.push(span_attr(element, "colspan"));
                    self.row_spans.push(span_attr(element, "rowspan"));
                    self.row.push(inner_text(node));
                    // cell content is finalized; its subtree is not row structure
                    return;
                }
                "tr" => self.finish_row(),
                // also flushes a previous table that was never closed
                "table" => self.finish_table(),
                _ => {}
            }
        }
        for child in node.children() {
            self.walk(child);
        }
    }

    fn finish_row(&mut self) {
        if self.row.is_empty() {
            return;
        }
        self.raw.push_row(
            mem::take(&mut self.row),
            mem::take(&mut self.col_spans),
            mem::take(&mut self.row_spans),
        );
    }

    fn finish_table(&mut self) {
        self.finish_row();
        let raw = mem::take(&mut self.raw);
        if raw.is_empty() {
            return;
        }
        match raw.reconstruct() {
            Ok(table) => {
                info!(columns = ?table.header, count = table.rows.len(), "found table");
                self.tables.push(table);
            }
            Err(error) => warn!(%error, "dropping unparsable table"),
        }
    }
}

/// Resolves a span attribute as a positive integer, defaulting to 1 when the
/// attribute is absent or not a number.
fn span_attr(element: &Element, name: &str) -> usize {
    element
        .attr(name)
        .and_then(|value| value.parse::<usize>().ok())
        .filter(|&span| span >= 1)
        .unwrap_or(1)
}

/// Concatenated descendant text, trimmed once at the cell boundary so
/// interior whitespace between text fragments is preserved.
fn inner_text(node: NodeRef<'_, Node>) -> String {
    let mut out = String::new();
    for descendant in node.descendants() {
        if let Some(text) = descendant.value().as_text() {
            out.push_str(text);
        }
    }
    out.trim().to_string()
}
