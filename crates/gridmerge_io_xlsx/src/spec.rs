//! Shared XLSX models: formats, options, exports, reports.

use gridmerge_layout::{EnumStyleId, SpecDataset, StyleId};

use crate::conf::C_NUM_FORMAT_DATETIME;

////////////////////////////////////////////////////////////////////////////////
// #region CellFormat

/// Visual cell format bound to one style id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct SpecCellFormat {
    /// Font family name.
    pub font_name: Option<String>,
    /// Font size in points.
    pub font_size: Option<i64>,
    /// Bold style.
    pub bold: Option<bool>,
    /// Italic style.
    pub italic: Option<bool>,

    /// Horizontal alignment.
    pub align: Option<String>,
    /// Vertical alignment.
    pub valign: Option<String>,
    /// Border style for all sides.
    pub border: Option<i64>,
    /// Text wrap.
    pub text_wrap: Option<bool>,

    /// Number format code.
    pub num_format: Option<String>,
    /// Background fill color.
    pub bg_color: Option<String>,
    /// Font color.
    pub font_color: Option<String>,
}

impl SpecCellFormat {
    /// Return a new format by overlaying `patch` onto `self`.
    pub fn with_(&self, patch: SpecCellFormat) -> SpecCellFormat {
        self.merge(&patch)
    }

    /// Merge two formats with right-side non-`None` overwrite semantics.
    pub fn merge(&self, other: &SpecCellFormat) -> SpecCellFormat {
        SpecCellFormat {
            font_name: other.font_name.clone().or_else(|| self.font_name.clone()),
            font_size: other.font_size.or(self.font_size),
            bold: other.bold.or(self.bold),
            italic: other.italic.or(self.italic),
            align: other.align.clone().or_else(|| self.align.clone()),
            valign: other.valign.clone().or_else(|| self.valign.clone()),
            border: other.border.or(self.border),
            text_wrap: other.text_wrap.or(self.text_wrap),
            num_format: other.num_format.clone().or_else(|| self.num_format.clone()),
            bg_color: other.bg_color.clone().or_else(|| self.bg_color.clone()),
            font_color: other.font_color.clone().or_else(|| self.font_color.clone()),
        }
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region WriteOptions

/// Autofit rule for column width inference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EnumAutofitColumnsRule {
    /// Disable autofit.
    None,
    /// Infer width from header cells only (default).
    #[default]
    Header,
    /// Infer width from data cells only.
    Body,
    /// Infer width from both header and data cells.
    All,
}

/// Autofit policy for per-sheet write call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecAutofitCellsPolicy {
    /// Autofit width inference rule.
    pub rule_columns: EnumAutofitColumnsRule,
    /// Minimum final width.
    pub width_cell_min: usize,
    /// Maximum final width.
    pub width_cell_max: usize,
    /// Width padding added after inference.
    pub width_cell_padding: usize,
}

impl Default for SpecAutofitCellsPolicy {
    fn default() -> Self {
        Self {
            rule_columns: EnumAutofitColumnsRule::Header,
            width_cell_min: 8,
            width_cell_max: 60,
            width_cell_padding: 2,
        }
    }
}

/// Writer-wide options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecXlsxWriteOptions {
    /// Number format overlaid on the cell style of timestamp values.
    pub num_format_datetime: String,
    /// Style used when a placed cell carries an id missing from the stylesheet.
    pub style_id_fallback: StyleId,
    /// Column autofit policy.
    pub policy_autofit: SpecAutofitCellsPolicy,
    /// Freeze panes below the first header block of each sheet.
    pub if_freeze_header: bool,
}

impl Default for SpecXlsxWriteOptions {
    fn default() -> Self {
        Self {
            num_format_datetime: C_NUM_FORMAT_DATETIME.to_string(),
            style_id_fallback: EnumStyleId::Default.id(),
            policy_autofit: SpecAutofitCellsPolicy::default(),
            if_freeze_header: false,
        }
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region SheetExport

/// One sheet of a multi-sheet export.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SpecSheetExport {
    /// Requested sheet name (sanitized and de-duplicated on write).
    pub sheet_name: String,
    /// Datasets stacked on the sheet.
    pub datasets: Vec<SpecDataset>,
}

impl SpecSheetExport {
    /// Sheet holding `datasets`.
    pub fn new(sheet_name: impl Into<String>, datasets: Vec<SpecDataset>) -> Self {
        Self {
            sheet_name: sheet_name.into(),
            datasets,
        }
    }
}

/// Written extent of one sheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecSheetExtent {
    /// Actual unique sheet name in workbook.
    pub sheet_name: String,
    /// Occupied rows.
    pub row_count: u32,
    /// Occupied columns.
    pub col_count: u32,
    /// Merge regions written.
    pub merge_count: usize,
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Report

/// Per-write call report.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SpecXlsxReport {
    /// Sheets produced by the write call.
    pub sheets: Vec<SpecSheetExtent>,
    /// Non-fatal warnings.
    pub warnings: Vec<String>,
}

impl SpecXlsxReport {
    /// Add a warning message.
    pub fn warn(&mut self, msg: impl AsRef<str>) {
        log::warn!("{}", msg.as_ref());
        self.warnings.push(msg.as_ref().to_string());
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_prefers_right_side_values() {
        let fmt_base = SpecCellFormat {
            font_name: Some("Calibri".to_string()),
            border: Some(1),
            ..Default::default()
        };
        let fmt = fmt_base.with_(SpecCellFormat {
            border: Some(0),
            num_format: Some("0.00".to_string()),
            ..Default::default()
        });

        assert_eq!(fmt.font_name.as_deref(), Some("Calibri"));
        assert_eq!(fmt.border, Some(0));
        assert_eq!(fmt.num_format.as_deref(), Some("0.00"));
    }

    #[test]
    fn report_collects_warnings() {
        let mut report = SpecXlsxReport::default();
        report.warn("style id 42 missing");
        assert_eq!(report.warnings, vec!["style id 42 missing".to_string()]);
    }
}
