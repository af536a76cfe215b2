//! Layout models: input datasets, output cells and merges, options, errors.

use chrono::NaiveDateTime;
use thiserror::Error;

use crate::address::{format_cell_ref, format_range_ref};
use crate::conf::{N_COL_ORIGIN_DEFAULT, N_ROW_ORIGIN_DEFAULT};

/// Opaque style identifier understood by the document writer.
pub type StyleId = u32;

////////////////////////////////////////////////////////////////////////////////
// #region CellValue

/// Typed cell value, fixed when a row is built.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum EnumCellValue {
    /// Whole number.
    Integer(i64),
    /// Fractional number.
    Decimal(f64),
    /// Boolean flag.
    Boolean(bool),
    /// Date and time without zone.
    Timestamp(NaiveDateTime),
    /// Text.
    Text(String),
    /// Missing value.
    #[default]
    Empty,
}

/// Rendering class of an [`EnumCellValue`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EnumValueKind {
    /// Integer or decimal.
    Numeric,
    /// Boolean.
    Boolean,
    /// Timestamp.
    Temporal,
    /// Text.
    Text,
    /// Blank.
    Empty,
}

impl EnumCellValue {
    /// Rendering class for the writer.
    pub fn kind(&self) -> EnumValueKind {
        match self {
            Self::Integer(_) | Self::Decimal(_) => EnumValueKind::Numeric,
            Self::Boolean(_) => EnumValueKind::Boolean,
            Self::Timestamp(_) => EnumValueKind::Temporal,
            Self::Text(_) => EnumValueKind::Text,
            Self::Empty => EnumValueKind::Empty,
        }
    }

    /// Text as displayed in a plain grid (used for width estimation).
    pub fn to_display_text(&self) -> String {
        match self {
            Self::Integer(val) => val.to_string(),
            Self::Decimal(val) => val.to_string(),
            Self::Boolean(val) => if *val { "TRUE" } else { "FALSE" }.to_string(),
            Self::Timestamp(val) => val.format("%d/%m/%Y %H:%M:%S").to_string(),
            Self::Text(val) => val.clone(),
            Self::Empty => String::new(),
        }
    }

    /// Borrow text content, if this is a text value.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(val) => Some(val),
            _ => None,
        }
    }
}

impl From<i64> for EnumCellValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<i32> for EnumCellValue {
    fn from(value: i32) -> Self {
        Self::Integer(i64::from(value))
    }
}

impl From<f64> for EnumCellValue {
    fn from(value: f64) -> Self {
        Self::Decimal(value)
    }
}

impl From<bool> for EnumCellValue {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<NaiveDateTime> for EnumCellValue {
    fn from(value: NaiveDateTime) -> Self {
        Self::Timestamp(value)
    }
}

impl From<&str> for EnumCellValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for EnumCellValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl<T: Into<EnumCellValue>> From<Option<T>> for EnumCellValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Empty, Into::into)
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region DatasetModel

/// Named table: ordered column names and rows of values.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SpecTable {
    /// Table name (header label for unnamed datasets).
    pub name: String,
    /// Ordered column names.
    pub columns: Vec<String>,
    /// Row values; every row must have `columns.len()` entries.
    pub rows: Vec<Vec<EnumCellValue>>,
}

impl SpecTable {
    /// Create an empty table with the given columns.
    pub fn new<I, S>(name: impl Into<String>, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            columns: columns.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// Append one row after checking its width.
    pub fn push_row<I, V>(&mut self, values: I) -> Result<(), LayoutError>
    where
        I: IntoIterator<Item = V>,
        V: Into<EnumCellValue>,
    {
        let l_values: Vec<EnumCellValue> = values.into_iter().map(Into::into).collect();
        if l_values.len() != self.columns.len() {
            return Err(LayoutError::RowWidthMismatch {
                table: self.name.clone(),
                row_index: self.rows.len(),
                expected: self.columns.len(),
                actual: l_values.len(),
            });
        }
        self.rows.push(l_values);
        Ok(())
    }

    /// Builder form of [`Self::push_row`].
    pub fn with_row<I, V>(mut self, values: I) -> Result<Self, LayoutError>
    where
        I: IntoIterator<Item = V>,
        V: Into<EnumCellValue>,
    {
        self.push_row(values)?;
        Ok(self)
    }

    /// Number of columns.
    pub fn width(&self) -> usize {
        self.columns.len()
    }

    /// Number of data rows.
    pub fn height(&self) -> usize {
        self.rows.len()
    }

    /// Check column presence and every row width.
    pub fn validate(&self) -> Result<(), LayoutError> {
        if self.columns.is_empty() {
            return Err(LayoutError::EmptyTable {
                table: self.name.clone(),
            });
        }
        for (n_idx_row, l_row) in self.rows.iter().enumerate() {
            if l_row.len() != self.columns.len() {
                return Err(LayoutError::RowWidthMismatch {
                    table: self.name.clone(),
                    row_index: n_idx_row,
                    expected: self.columns.len(),
                    actual: l_row.len(),
                });
            }
        }
        Ok(())
    }
}

/// Ordered group of tables laid out side by side under one header block.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SpecDataset {
    /// Dataset label; `None` or empty means "no dataset-level label".
    pub name: Option<String>,
    /// Tables in placement order.
    pub tables: Vec<SpecTable>,
}

impl SpecDataset {
    /// Create a labelled dataset.
    pub fn named(name: impl Into<String>, tables: Vec<SpecTable>) -> Self {
        Self {
            name: Some(name.into()),
            tables,
        }
    }

    /// Create a dataset without a dataset-level label.
    pub fn unnamed(tables: Vec<SpecTable>) -> Self {
        Self { name: None, tables }
    }

    /// Wrap a single table into an unnamed dataset.
    pub fn from_table(table: SpecTable) -> Self {
        Self::unnamed(vec![table])
    }

    /// Non-empty dataset label.
    pub fn label(&self) -> Option<&str> {
        self.name.as_deref().filter(|name| !name.is_empty())
    }

    /// Header label and style target for `table`.
    ///
    /// The dataset label when several tables share the block, otherwise the
    /// table's own name.
    pub fn target_for<'a>(&'a self, table: &'a SpecTable) -> &'a str {
        match self.label() {
            Some(c_label) if self.tables.len() > 1 => c_label,
            _ => table.name.as_str(),
        }
    }

    /// Row count of the tallest table.
    pub fn height_max(&self) -> usize {
        self.tables.iter().map(SpecTable::height).max().unwrap_or(0)
    }

    /// Total column count across tables.
    pub fn width_total(&self) -> usize {
        self.tables.iter().map(SpecTable::width).sum()
    }

    /// Validate every table.
    pub fn validate(&self) -> Result<(), LayoutError> {
        self.tables.iter().try_for_each(SpecTable::validate)
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region GridOutput

/// Cell role used for style resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EnumCellRole {
    /// Header label or column name.
    Header,
    /// Data value.
    Row,
}

/// One addressed cell of the composed grid.
#[derive(Debug, Clone, PartialEq)]
pub struct SpecPlacedCell {
    /// 1-based row.
    pub row: u32,
    /// 1-based column.
    pub col: u32,
    /// Cell value.
    pub value: EnumCellValue,
    /// Writer style id.
    pub style_id: StyleId,
    /// Header or data.
    pub role: EnumCellRole,
}

impl SpecPlacedCell {
    /// A1-style reference, e.g. `"B3"`.
    pub fn reference(&self) -> String {
        format_cell_ref(self.row, self.col)
    }
}

/// Closed rectangular merge, 1-based inclusive bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SpecMergeRegion {
    /// Top row.
    pub row_first: u32,
    /// Left column.
    pub col_first: u32,
    /// Bottom row.
    pub row_last: u32,
    /// Right column.
    pub col_last: u32,
}

impl SpecMergeRegion {
    /// Single-row merge from `col_first` to `col_last`.
    pub fn horizontal(row: u32, col_first: u32, col_last: u32) -> Self {
        Self {
            row_first: row,
            col_first,
            row_last: row,
            col_last,
        }
    }

    /// A1-style range, e.g. `"A1:C1"`.
    pub fn reference(&self) -> String {
        format_range_ref(self.row_first, self.col_first, self.row_last, self.col_last)
    }

    /// Number of columns covered.
    pub fn width(&self) -> u32 {
        self.col_last - self.col_first + 1
    }

    /// Number of rows covered.
    pub fn height(&self) -> u32 {
        self.row_last - self.row_first + 1
    }

    /// Whether `(row, col)` lies inside the region.
    pub fn contains(&self, row: u32, col: u32) -> bool {
        (self.row_first..=self.row_last).contains(&row)
            && (self.col_first..=self.col_last).contains(&col)
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region ComposeOptions

/// Header label layout for datasets with a name and several tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EnumDatasetLabelMode {
    /// One merged dataset label per table span (default).
    #[default]
    PerTable,
    /// One merged dataset label across the whole block.
    Spanning,
    /// Dataset label across the block, then per-table name labels.
    Nested,
}

/// Composer options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecComposeOptions {
    /// First row of the grid (1-based).
    pub row_origin: u32,
    /// First column of every dataset block (1-based).
    pub col_origin: u32,
    /// Label layout for named multi-table datasets.
    pub rule_label: EnumDatasetLabelMode,
}

impl Default for SpecComposeOptions {
    fn default() -> Self {
        Self {
            row_origin: N_ROW_ORIGIN_DEFAULT,
            col_origin: N_COL_ORIGIN_DEFAULT,
            rule_label: EnumDatasetLabelMode::PerTable,
        }
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Errors

/// Configuration errors that abort a composition.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayoutError {
    /// A row does not have one value per column.
    #[error(
        "Row {row_index} of table {table:?} has {actual} value(s); the table declares {expected} column(s)."
    )]
    RowWidthMismatch {
        /// Owning table.
        table: String,
        /// Zero-based row index inside the table.
        row_index: usize,
        /// Declared column count.
        expected: usize,
        /// Values found in the row.
        actual: usize,
    },
    /// A table without columns cannot host a data block.
    #[error("Table {table:?} declares no columns.")]
    EmptyTable {
        /// Offending table.
        table: String,
    },
    /// Cursor arithmetic left the addressable range.
    #[error("{what} overflow: {value}")]
    AddressOverflow {
        /// Which coordinate overflowed.
        what: &'static str,
        /// Value that could not be represented.
        value: u64,
    },
    /// Origins are 1-based.
    #[error("{what} origin must be >= 1.")]
    InvalidOrigin {
        /// `"row"` or `"column"`.
        what: &'static str,
    },
}

/// Style-rule configuration loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// JSON could not be parsed into style rules.
    #[error("Invalid style rule JSON: {0}")]
    Json(#[from] serde_json::Error),
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
