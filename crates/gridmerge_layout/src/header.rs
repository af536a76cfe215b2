//! Header block planning for one dataset.
//!
//! A block is planned in explicit phases:
//! 1. label row(s): one run of label cells per table, merged per run;
//! 2. column-name row: the literal column names, never merged.
//!
//! The label is the dataset name when present and the dataset holds more
//! than one table, otherwise the table name.
//! [`EnumDatasetLabelMode`] only changes the label phase of named datasets
//! that hold more than one table.

use crate::spec::{EnumDatasetLabelMode, LayoutError, SpecMergeRegion, SpecTable};

/// Header cell category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EnumHeaderCellKind {
    /// Dataset or table label.
    Label,
    /// Literal column name.
    ColumnName,
}

/// One planned header cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecHeaderCell {
    /// 1-based row.
    pub row: u32,
    /// 1-based column.
    pub col: u32,
    /// Display text.
    pub text: String,
    /// Index of the table whose span holds this cell.
    pub table_index: usize,
    /// Label or column name.
    pub kind: EnumHeaderCellKind,
}

/// Planned header block.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SpecHeaderPlan {
    /// Header cells, row by row, left to right.
    pub cells: Vec<SpecHeaderCell>,
    /// Merge regions over label runs.
    pub merges: Vec<SpecMergeRegion>,
    /// Number of header rows.
    pub height: u32,
    /// Number of columns spanned by the block.
    pub width: u32,
}

/// Inclusive 1-based column span of one table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct TableSpan {
    col_first: u32,
    col_last: u32,
}

/// Plan header rows and merges for one dataset block.
///
/// `row_origin` / `col_origin` are the 1-based top-left of the block.
pub fn plan_header_block(
    dataset_name: Option<&str>,
    tables: &[SpecTable],
    row_origin: u32,
    col_origin: u32,
    rule_label: EnumDatasetLabelMode,
) -> Result<SpecHeaderPlan, LayoutError> {
    let mut plan = SpecHeaderPlan::default();
    if tables.is_empty() {
        return Ok(plan);
    }

    let l_spans = derive_table_spans(tables, col_origin)?;
    let if_multi_table = tables.len() > 1;
    // A lone table collapses both labels into its own name.
    let c_dataset_label = dataset_name.filter(|name| !name.is_empty() && if_multi_table);
    let mut n_row = row_origin;

    match (c_dataset_label, rule_label) {
        (Some(c_label), EnumDatasetLabelMode::Spanning) => {
            push_label_row(&mut plan, n_row, &l_spans, |_| c_label, false);
            push_block_merge(&mut plan, n_row, &l_spans);
        }
        (Some(c_label), EnumDatasetLabelMode::Nested) => {
            push_label_row(&mut plan, n_row, &l_spans, |_| c_label, false);
            push_block_merge(&mut plan, n_row, &l_spans);
            n_row = advance_row(n_row)?;
            push_label_row(&mut plan, n_row, &l_spans, |idx| tables[idx].name.as_str(), true);
        }
        _ => {
            push_label_row(
                &mut plan,
                n_row,
                &l_spans,
                |idx| c_dataset_label.unwrap_or(tables[idx].name.as_str()),
                true,
            );
        }
    }

    n_row = advance_row(n_row)?;
    for (n_idx_table, table) in tables.iter().enumerate() {
        let mut n_col = l_spans[n_idx_table].col_first;
        for c_column in &table.columns {
            plan.cells.push(SpecHeaderCell {
                row: n_row,
                col: n_col,
                text: c_column.clone(),
                table_index: n_idx_table,
                kind: EnumHeaderCellKind::ColumnName,
            });
            n_col += 1;
        }
    }

    plan.height = n_row - row_origin + 1;
    plan.width = l_spans[l_spans.len() - 1].col_last - col_origin + 1;
    Ok(plan)
}

fn derive_table_spans(
    tables: &[SpecTable],
    col_origin: u32,
) -> Result<Vec<TableSpan>, LayoutError> {
    let mut l_spans = Vec::with_capacity(tables.len());
    let mut n_col_cursor = col_origin;
    for table in tables {
        if table.columns.is_empty() {
            return Err(LayoutError::EmptyTable {
                table: table.name.clone(),
            });
        }
        let n_width = u32::try_from(table.columns.len()).map_err(|_| {
            LayoutError::AddressOverflow {
                what: "column",
                value: table.columns.len() as u64,
            }
        })?;
        let n_col_last = n_col_cursor
            .checked_add(n_width - 1)
            .ok_or(LayoutError::AddressOverflow {
                what: "column",
                value: u64::from(n_col_cursor) + u64::from(n_width) - 1,
            })?;
        l_spans.push(TableSpan {
            col_first: n_col_cursor,
            col_last: n_col_last,
        });
        n_col_cursor = n_col_last.saturating_add(1);
    }
    Ok(l_spans)
}

fn push_label_row<'t>(
    plan: &mut SpecHeaderPlan,
    row: u32,
    spans: &[TableSpan],
    label_for: impl Fn(usize) -> &'t str,
    if_merge_per_table: bool,
) {
    for (n_idx_table, span) in spans.iter().enumerate() {
        let c_label = label_for(n_idx_table);
        for n_col in span.col_first..=span.col_last {
            plan.cells.push(SpecHeaderCell {
                row,
                col: n_col,
                text: c_label.to_string(),
                table_index: n_idx_table,
                kind: EnumHeaderCellKind::Label,
            });
        }
        if if_merge_per_table {
            push_merge(plan, SpecMergeRegion::horizontal(row, span.col_first, span.col_last));
        }
    }
}

fn push_block_merge(plan: &mut SpecHeaderPlan, row: u32, spans: &[TableSpan]) {
    if let (Some(span_first), Some(span_last)) = (spans.first(), spans.last()) {
        push_merge(
            plan,
            SpecMergeRegion::horizontal(row, span_first.col_first, span_last.col_last),
        );
    }
}

/// Single-cell runs are already one visual block; only wider runs are merged.
fn push_merge(plan: &mut SpecHeaderPlan, merge: SpecMergeRegion) {
    if merge.col_last > merge.col_first || merge.row_last > merge.row_first {
        plan.merges.push(merge);
    }
}

fn advance_row(row: u32) -> Result<u32, LayoutError> {
    row.checked_add(1).ok_or(LayoutError::AddressOverflow {
        what: "row",
        value: u64::from(row) + 1,
    })
}
