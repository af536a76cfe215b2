//! Grid composer: stacks datasets and lays their tables out side by side.
//!
//! Cursor state lives in a [`GridCursor`] created inside each
//! [`GridComposer::compose`] call and dropped when it returns.

use crate::header::plan_header_block;
use crate::spec::{
    EnumCellRole, EnumCellValue, LayoutError, SpecComposeOptions, SpecDataset, SpecMergeRegion,
    SpecPlacedCell, StyleId,
};
use crate::style::{StyleResolver, StyleRuleSet};

/// Composed grid: placed cells plus merge regions.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GridLayout {
    /// Cells in placement order (header rows first, then data row-major per dataset).
    pub cells: Vec<SpecPlacedCell>,
    /// Header merge regions.
    pub merges: Vec<SpecMergeRegion>,
}

impl GridLayout {
    /// Whether nothing was placed.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Lowest occupied row.
    pub fn first_row(&self) -> Option<u32> {
        self.cells.iter().map(|cell| cell.row).min()
    }

    /// Highest occupied row.
    pub fn last_row(&self) -> Option<u32> {
        self.cells.iter().map(|cell| cell.row).max()
    }

    /// Highest occupied column.
    pub fn last_col(&self) -> Option<u32> {
        self.cells.iter().map(|cell| cell.col).max()
    }

    /// Number of rows between the first and last occupied row.
    pub fn row_count(&self) -> u32 {
        match (self.first_row(), self.last_row()) {
            (Some(n_first), Some(n_last)) => n_last - n_first + 1,
            _ => 0,
        }
    }

    /// Number of columns between the first and last occupied column.
    pub fn col_count(&self) -> u32 {
        let n_first = self.cells.iter().map(|cell| cell.col).min();
        match (n_first, self.last_col()) {
            (Some(n_first), Some(n_last)) => n_last - n_first + 1,
            _ => 0,
        }
    }

    /// Cell placed at 1-based `(row, col)`.
    pub fn cell_at(&self, row: u32, col: u32) -> Option<&SpecPlacedCell> {
        self.cells
            .iter()
            .find(|cell| cell.row == row && cell.col == col)
    }
}

/// Transient write position for one composition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct GridCursor {
    /// Next row to write.
    row: u32,
    /// Current column within the row.
    col: u32,
    /// Column where every dataset block starts.
    col_initial: u32,
}

impl GridCursor {
    fn new(row: u32, col: u32) -> Self {
        Self {
            row,
            col,
            col_initial: col,
        }
    }

    fn advance_col(&mut self) -> Result<(), LayoutError> {
        self.col = checked_add(self.col, 1, "column")?;
        Ok(())
    }
}

/// Composes datasets into one grid with a fixed rule set and options.
#[derive(Debug, Clone)]
pub struct GridComposer<'a> {
    rules: &'a StyleRuleSet,
    options: SpecComposeOptions,
}

impl<'a> GridComposer<'a> {
    /// Create a composer over `rules`.
    pub fn new(rules: &'a StyleRuleSet, options: SpecComposeOptions) -> Self {
        Self { rules, options }
    }

    /// Composer options.
    pub fn options(&self) -> &SpecComposeOptions {
        &self.options
    }

    /// Compose `datasets` top to bottom.
    ///
    /// Every dataset is validated before the first cell is placed, so an
    /// error never leaves a partial grid behind.
    pub fn compose(&self, datasets: &[SpecDataset]) -> Result<GridLayout, LayoutError> {
        if self.options.row_origin == 0 {
            return Err(LayoutError::InvalidOrigin { what: "row" });
        }
        if self.options.col_origin == 0 {
            return Err(LayoutError::InvalidOrigin { what: "column" });
        }
        for dataset in datasets {
            dataset.validate()?;
        }

        let resolver = StyleResolver::new(self.rules);
        let mut cursor = GridCursor::new(self.options.row_origin, self.options.col_origin);
        let mut layout = GridLayout::default();

        for dataset in datasets {
            if dataset.tables.is_empty() {
                log::debug!("dataset {:?} has no tables; skipped", dataset.name);
                continue;
            }
            self.place_dataset(&resolver, &mut cursor, dataset, &mut layout)?;
        }

        Ok(layout)
    }

    fn place_dataset(
        &self,
        resolver: &StyleResolver<'_>,
        cursor: &mut GridCursor,
        dataset: &SpecDataset,
        layout: &mut GridLayout,
    ) -> Result<(), LayoutError> {
        cursor.col = cursor.col_initial;
        let n_row_block = cursor.row;

        let plan = plan_header_block(
            dataset.label(),
            &dataset.tables,
            n_row_block,
            cursor.col_initial,
            self.options.rule_label,
        )?;

        let l_targets: Vec<&str> = dataset
            .tables
            .iter()
            .map(|table| dataset.target_for(table))
            .collect();
        let l_header_styles: Vec<StyleId> = l_targets
            .iter()
            .map(|target| resolver.resolve(target, EnumCellRole::Header))
            .collect();

        for cell in plan.cells {
            layout.cells.push(SpecPlacedCell {
                row: cell.row,
                col: cell.col,
                value: EnumCellValue::Text(cell.text),
                style_id: l_header_styles[cell.table_index],
                role: EnumCellRole::Header,
            });
        }
        layout.merges.extend(plan.merges);

        // Column where each table's data block starts; tables sit side by side.
        let mut l_col_starts = Vec::with_capacity(dataset.tables.len());
        for table in &dataset.tables {
            l_col_starts.push(cursor.col);
            cursor.col = checked_add(cursor.col, cast_u32(table.width(), "column")?, "column")?;
        }

        let n_row_data = checked_add(n_row_block, plan.height, "row")?;
        let n_height_max = cast_u32(dataset.height_max(), "row")?;
        for n_idx_row in 0..n_height_max {
            cursor.row = checked_add(n_row_data, n_idx_row, "row")?;
            for (n_idx_table, table) in dataset.tables.iter().enumerate() {
                let Some(l_values) = table.rows.get(n_idx_row as usize) else {
                    continue;
                };
                cursor.col = l_col_starts[n_idx_table];
                for (n_idx_col, value) in l_values.iter().enumerate() {
                    let style_id = resolver.resolve_at(
                        l_targets[n_idx_table],
                        cast_u32(n_idx_col, "column")?,
                        EnumCellRole::Row,
                    );
                    layout.cells.push(SpecPlacedCell {
                        row: cursor.row,
                        col: cursor.col,
                        value: value.clone(),
                        style_id,
                        role: EnumCellRole::Row,
                    });
                    cursor.advance_col()?;
                }
            }
        }

        cursor.row = checked_add(n_row_data, n_height_max, "row")?;
        cursor.col = cursor.col_initial;

        log::debug!(
            "placed dataset {:?}: tables={} header_rows={} data_rows={} next_row={}",
            dataset.label(),
            dataset.tables.len(),
            plan.height,
            n_height_max,
            cursor.row
        );
        Ok(())
    }
}

/// Compose `datasets` with default options.
pub fn compose(datasets: &[SpecDataset], rules: &StyleRuleSet) -> Result<GridLayout, LayoutError> {
    GridComposer::new(rules, SpecComposeOptions::default()).compose(datasets)
}

fn checked_add(base: u32, delta: u32, what: &'static str) -> Result<u32, LayoutError> {
    base.checked_add(delta).ok_or(LayoutError::AddressOverflow {
        what,
        value: u64::from(base) + u64::from(delta),
    })
}

fn cast_u32(value: usize, what: &'static str) -> Result<u32, LayoutError> {
    u32::try_from(value).map_err(|_| LayoutError::AddressOverflow {
        what,
        value: value as u64,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conf::{EnumStyleId, STYLE_ID_HEADER_DEFAULT, STYLE_ID_ROW_DEFAULT};
    use crate::spec::{EnumDatasetLabelMode, SpecTable};

    fn derive_table(name: &str, n_cols: usize, n_rows: usize) -> SpecTable {
        let mut table = SpecTable::new(name, (1..=n_cols).map(|idx| format!("Column {idx}")));
        for n_idx_row in 0..n_rows {
            table
                .push_row((0..n_cols).map(|n_idx_col| (n_idx_row * 100 + n_idx_col) as i64))
                .unwrap();
        }
        table
    }

    fn derive_rows_text(layout: &GridLayout, row: u32) -> Vec<String> {
        let mut l_cells: Vec<&SpecPlacedCell> =
            layout.cells.iter().filter(|cell| cell.row == row).collect();
        l_cells.sort_by_key(|cell| cell.col);
        l_cells
            .into_iter()
            .map(|cell| cell.value.to_display_text())
            .collect()
    }

    #[test]
    fn single_table_dataset_occupies_header_plus_data_rows() {
        let datasets = vec![SpecDataset::from_table(derive_table("Sample", 3, 2))];
        let layout = compose(&datasets, &StyleRuleSet::new()).unwrap();

        assert_eq!(layout.merges, vec![SpecMergeRegion::horizontal(1, 1, 3)]);
        assert_eq!(layout.merges[0].reference(), "A1:C1");
        assert_eq!(
            derive_rows_text(&layout, 2),
            vec!["Column 1", "Column 2", "Column 3"]
        );
        assert_eq!(derive_rows_text(&layout, 3), vec!["0", "1", "2"]);
        assert_eq!(derive_rows_text(&layout, 4), vec!["100", "101", "102"]);
        assert_eq!(layout.row_count(), 4);
        assert_eq!(layout.col_count(), 3);
        assert_eq!(layout.cells.len(), 3 * 4);
    }

    #[test]
    fn named_dataset_styles_each_table_by_dataset_name() {
        let mut rules = StyleRuleSet::new();
        rules.add_named("Set 1", EnumStyleId::YellowFill, EnumStyleId::Default);
        rules.add_named("Table 2", EnumStyleId::NavyFill, EnumStyleId::NavyFill);

        let datasets = vec![SpecDataset::named(
            "Set 1",
            vec![derive_table("Table 1", 2, 1), derive_table("Table 2", 3, 1)],
        )];
        let layout = compose(&datasets, &rules).unwrap();

        assert_eq!(
            layout.merges,
            vec![
                SpecMergeRegion::horizontal(1, 1, 2),
                SpecMergeRegion::horizontal(1, 3, 5)
            ]
        );
        for cell in &layout.cells {
            match cell.role {
                EnumCellRole::Header => assert_eq!(cell.style_id, 4),
                EnumCellRole::Row => assert_eq!(cell.style_id, 0),
            }
        }
        assert_eq!(derive_rows_text(&layout, 1), vec!["Set 1"; 5]);
    }

    #[test]
    fn named_single_table_dataset_uses_table_name() {
        let mut rules = StyleRuleSet::new();
        rules.add_named("Set 1", EnumStyleId::YellowFill, EnumStyleId::Default);
        rules.add_named("Table 1", EnumStyleId::LiteBlueFill, EnumStyleId::Default);

        let datasets = vec![SpecDataset::named("Set 1", vec![derive_table("Table 1", 2, 1)])];
        let layout = compose(&datasets, &rules).unwrap();

        assert_eq!(layout.merges, vec![SpecMergeRegion::horizontal(1, 1, 2)]);
        assert_eq!(derive_rows_text(&layout, 1), vec!["Table 1"; 2]);
        assert_eq!(layout.cell_at(1, 1).map(|cell| cell.style_id), Some(7));
        assert_eq!(layout.cell_at(3, 2).map(|cell| cell.style_id), Some(0));
    }

    #[test]
    fn unnamed_dataset_styles_by_table_name() {
        let mut rules = StyleRuleSet::new();
        rules.add_named("Table 1", EnumStyleId::LiteBlueFill, EnumStyleId::Border);
        rules.add_column("Table 2", 1, EnumStyleId::Bold, EnumStyleId::BorderText);

        let datasets = vec![SpecDataset::unnamed(vec![
            derive_table("Table 1", 2, 1),
            derive_table("Table 2", 2, 1),
        ])];
        let layout = compose(&datasets, &rules).unwrap();

        let style_at = |row, col| layout.cell_at(row, col).map(|cell| cell.style_id);
        assert_eq!(style_at(1, 1), Some(7));
        assert_eq!(style_at(1, 3), Some(STYLE_ID_HEADER_DEFAULT));
        assert_eq!(style_at(3, 1), Some(6));
        assert_eq!(style_at(3, 3), Some(STYLE_ID_ROW_DEFAULT));
        assert_eq!(style_at(3, 4), Some(10));
        assert_eq!(derive_rows_text(&layout, 1), vec!["Table 1", "Table 1", "Table 2", "Table 2"]);
    }

    #[test]
    fn stacked_datasets_leave_no_gap_and_no_overlap() {
        let datasets = vec![
            SpecDataset::named(
                "Set 1",
                vec![derive_table("T One", 2, 2), derive_table("T Two", 3, 5)],
            ),
            SpecDataset::named("Set 2", vec![derive_table("T One", 4, 1)]),
        ];
        let layout = compose(&datasets, &StyleRuleSet::new()).unwrap();

        // Set 1: header rows 1-2, tallest table has 5 rows -> rows 3..=7.
        let n_last_row_set_1 = layout
            .cells
            .iter()
            .filter(|cell| cell.row <= 7)
            .map(|cell| cell.row)
            .max();
        assert_eq!(n_last_row_set_1, Some(7));
        assert_eq!(derive_rows_text(&layout, 8), vec!["T One"; 4]);
        assert!(layout.merges.contains(&SpecMergeRegion::horizontal(8, 1, 4)));
        assert_eq!(layout.last_row(), Some(10));

        // Shorter sibling stops early, taller one keeps going.
        assert!(layout.cell_at(5, 1).is_none());
        assert!(layout.cell_at(5, 3).is_some());

        let mut l_addresses: Vec<(u32, u32)> =
            layout.cells.iter().map(|cell| (cell.row, cell.col)).collect();
        let n_total = l_addresses.len();
        l_addresses.sort_unstable();
        l_addresses.dedup();
        assert_eq!(l_addresses.len(), n_total);
    }

    #[test]
    fn siblings_start_data_on_the_same_row() {
        let datasets = vec![SpecDataset::unnamed(vec![
            derive_table("A", 1, 3),
            derive_table("B", 2, 1),
        ])];
        let layout = compose(&datasets, &StyleRuleSet::new()).unwrap();

        assert_eq!(layout.cell_at(3, 1).map(|c| c.role), Some(EnumCellRole::Row));
        assert_eq!(layout.cell_at(3, 2).map(|c| c.role), Some(EnumCellRole::Row));
        assert_eq!(layout.cell_at(3, 3).map(|c| c.role), Some(EnumCellRole::Row));
        assert_eq!(layout.last_row(), Some(5));
    }

    #[test]
    fn mismatched_row_aborts_without_output() {
        let mut table_bad = derive_table("Bad", 3, 1);
        table_bad.rows.push(vec![EnumCellValue::from(1)]);
        let datasets = vec![
            SpecDataset::from_table(derive_table("Good", 2, 2)),
            SpecDataset::from_table(table_bad),
        ];

        let err = compose(&datasets, &StyleRuleSet::new()).unwrap_err();
        assert_eq!(
            err,
            LayoutError::RowWidthMismatch {
                table: "Bad".to_string(),
                row_index: 1,
                expected: 3,
                actual: 1,
            }
        );
    }

    #[test]
    fn zero_column_table_is_rejected() {
        let datasets = vec![SpecDataset::unnamed(vec![SpecTable::new(
            "Hollow",
            Vec::<String>::new(),
        )])];
        assert!(matches!(
            compose(&datasets, &StyleRuleSet::new()),
            Err(LayoutError::EmptyTable { .. })
        ));
    }

    #[test]
    fn empty_inputs_are_not_errors() {
        let layout = compose(&[], &StyleRuleSet::new()).unwrap();
        assert!(layout.is_empty());
        assert_eq!(layout.row_count(), 0);

        let datasets = vec![
            SpecDataset::named("Nothing", vec![]),
            SpecDataset::from_table(derive_table("Headers only", 2, 0)),
        ];
        let layout = compose(&datasets, &StyleRuleSet::new()).unwrap();
        assert_eq!(layout.row_count(), 2);
        assert_eq!(layout.first_row(), Some(1));
        assert!(layout.cells.iter().all(|cell| cell.role == EnumCellRole::Header));
    }

    #[test]
    fn origin_and_label_mode_are_honoured() {
        let rules = StyleRuleSet::new();
        let composer = GridComposer::new(
            &rules,
            SpecComposeOptions {
                row_origin: 3,
                col_origin: 2,
                rule_label: EnumDatasetLabelMode::Nested,
            },
        );
        let datasets = vec![
            SpecDataset::named("Set 1", vec![derive_table("A", 2, 1), derive_table("B", 2, 1)]),
            SpecDataset::from_table(derive_table("C", 1, 1)),
        ];
        let layout = composer.compose(&datasets).unwrap();

        assert_eq!(layout.cell_at(3, 2).and_then(|c| c.value.as_text()), Some("Set 1"));
        assert_eq!(layout.cell_at(4, 4).and_then(|c| c.value.as_text()), Some("B"));
        assert_eq!(layout.cell_at(5, 5).and_then(|c| c.value.as_text()), Some("Column 2"));
        assert_eq!(
            layout.merges[..3],
            [
                SpecMergeRegion::horizontal(3, 2, 5),
                SpecMergeRegion::horizontal(4, 2, 3),
                SpecMergeRegion::horizontal(4, 4, 5),
            ]
        );
        // Second dataset restarts at the block column, right under the first.
        assert_eq!(layout.cell_at(7, 2).and_then(|c| c.value.as_text()), Some("C"));
        assert!(layout.cells.iter().all(|cell| cell.col >= 2 && cell.row >= 3));
    }

    #[test]
    fn zero_origin_is_rejected() {
        let rules = StyleRuleSet::new();
        let composer = GridComposer::new(
            &rules,
            SpecComposeOptions {
                row_origin: 0,
                ..SpecComposeOptions::default()
            },
        );
        assert_eq!(
            composer.compose(&[]),
            Err(LayoutError::InvalidOrigin { what: "row" })
        );
    }

    #[test]
    fn composer_is_reusable_across_calls() {
        let rules = StyleRuleSet::new();
        let composer = GridComposer::new(&rules, SpecComposeOptions::default());
        let datasets = vec![SpecDataset::from_table(derive_table("Sample", 2, 2))];

        let layout_first = composer.compose(&datasets).unwrap();
        let layout_second = composer.compose(&datasets).unwrap();
        assert_eq!(layout_first, layout_second);
    }
}
