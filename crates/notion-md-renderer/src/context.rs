//! Per-traversal rendering state.
//!
//! [`ConversionContext`] is a plain value threaded down the recursion. Each
//! sibling step and each descent returns a new context instead of mutating
//! shared state, so two conversions never observe each other's counters.

use crate::model::{Block, BlockKind};

/// Table rendering mode for the rows of one table block.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TableMode {
    /// First row is a header row.
    pub has_column_header: bool,
    /// Column count, fixed by the first row.
    pub columns: usize,
    /// Widest row of the table, used when the first row has no cells.
    pub widest_row: usize,
    /// Rows seen so far, including the current one.
    pub rows_seen: usize,
}

impl TableMode {
    fn new(has_column_header: bool) -> Self {
        Self {
            has_column_header,
            columns: 0,
            widest_row: 0,
            rows_seen: 0,
        }
    }

    /// Whether the current row is the first one (the header position).
    pub fn is_first_row(&self) -> bool {
        self.rows_seen == 1
    }
}

/// Rendering state for the current position in the tree.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ConversionContext {
    depth: usize,
    /// Numbered-list counters keyed by depth; 0 means no active run.
    counters: Vec<usize>,
    table: Option<TableMode>,
}

impl ConversionContext {
    /// Context for the top-level sibling list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Nesting depth of the current block (top level is 0).
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Number of the current numbered-list item, 0 outside a numbered run.
    pub fn list_number(&self) -> usize {
        self.counters.get(self.depth).copied().unwrap_or(0)
    }

    /// Table state when the current block is a row of a table.
    pub fn table(&self) -> Option<TableMode> {
        self.table
    }

    /// Context for `block` as the next sibling at this depth.
    ///
    /// Numbered items continue (or start) the run at this depth; any other
    /// block ends it. Table rows advance the row count, and the first row
    /// fixes the column count.
    #[must_use]
    pub fn advance(&self, block: &Block) -> Self {
        let mut next = self.clone();
        if next.counters.len() <= next.depth {
            next.counters.resize(next.depth + 1, 0);
        }
        let counter = &mut next.counters[next.depth];
        if matches!(block.kind, BlockKind::NumberedListItem { .. }) {
            *counter += 1;
        } else {
            *counter = 0;
        }

        if let (Some(table), BlockKind::TableRow { cells }) = (next.table.as_mut(), &block.kind) {
            if table.rows_seen == 0 {
                table.columns = if cells.is_empty() {
                    table.widest_row
                } else {
                    cells.len()
                };
            }
            table.rows_seen += 1;
        }
        next
    }

    /// Context for the children of `parent`.
    ///
    /// Counters of deeper levels are discarded so every child list starts its
    /// own numbering. Children of a table enter table mode.
    #[must_use]
    pub fn descend(&self, parent: &Block) -> Self {
        let depth = self.depth + 1;
        let mut counters = self.counters.clone();
        counters.truncate(depth);
        let table = match parent.kind {
            BlockKind::Table { has_column_header } => Some(TableMode::new(has_column_header)),
            _ => None,
        };
        Self {
            depth,
            counters,
            table,
        }
    }

    /// Record the widest row among the children of a table.
    #[must_use]
    pub fn with_widest_row(mut self, widest_row: usize) -> Self {
        if let Some(table) = self.table.as_mut() {
            table.widest_row = widest_row;
        }
        self
    }
}
