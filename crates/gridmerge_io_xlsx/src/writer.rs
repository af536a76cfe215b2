//! XLSX writer kernel that renders composed grids into workbook sheets.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use gridmerge_layout::{
    EnumCellRole, EnumCellValue, GridComposer, GridLayout, SpecComposeOptions, SpecDataset,
    SpecPlacedCell, StyleId, StyleRuleSet,
};
use rust_xlsxwriter::{Format, FormatAlign, FormatBorder, Workbook, Worksheet};

use crate::conf::{
    N_NCOLS_EXCEL_MAX, N_NROWS_EXCEL_MAX, derive_default_stylesheet,
    derive_default_xlsx_write_options,
};
use crate::error::XlsxExportError;
use crate::spec::{
    EnumAutofitColumnsRule, SpecCellFormat, SpecSheetExport, SpecSheetExtent, SpecXlsxReport,
    SpecXlsxWriteOptions,
};
use crate::util::{
    cast_col_num, cast_row_num, convert_naive_datetime, convert_nan_inf_to_str,
    derive_autofit_width, derive_unique_sheet_name, estimate_unicode_string_width,
    sanitize_sheet_name, validate_policy_autofit,
};

/// Stateful workbook writer.
pub struct XlsxWriter {
    path_file_out: PathBuf,
    workbook: Workbook,
    dict_stylesheet: BTreeMap<StyleId, SpecCellFormat>,
    write_options: SpecXlsxWriteOptions,
    set_sheet_names_existing: BTreeSet<String>,
    l_reports: Vec<SpecXlsxReport>,
    if_closed: bool,
}

impl XlsxWriter {
    /// Create writer bound to output path, stylesheet and options.
    ///
    /// The workbook is buffered in memory until [`Self::close`] is called.
    pub fn new(
        path_file_out: PathBuf,
        dict_stylesheet: BTreeMap<StyleId, SpecCellFormat>,
        write_options: SpecXlsxWriteOptions,
    ) -> Self {
        Self {
            path_file_out,
            workbook: Workbook::new(),
            dict_stylesheet,
            write_options,
            set_sheet_names_existing: BTreeSet::new(),
            l_reports: Vec::new(),
            if_closed: false,
        }
    }

    /// Writer with the default stylesheet and options.
    pub fn with_defaults(path_file_out: PathBuf) -> Self {
        Self::new(
            path_file_out,
            derive_default_stylesheet(),
            derive_default_xlsx_write_options(),
        )
    }

    /// Return output file path as string.
    pub fn file_out(&self) -> String {
        self.path_file_out.to_string_lossy().to_string()
    }

    /// Return immutable snapshot of per-sheet write reports.
    pub fn report(&self) -> Vec<SpecXlsxReport> {
        self.l_reports.clone()
    }

    /// Flush workbook to disk. Idempotent.
    pub fn close(&mut self) -> Result<(), XlsxExportError> {
        if self.if_closed {
            return Ok(());
        }
        self.workbook.save(&self.path_file_out)?;
        self.if_closed = true;
        log::debug!("saved workbook {}", self.path_file_out.display());
        Ok(())
    }

    /// Compose `datasets` and write them as one sheet.
    ///
    /// Composition finishes before the worksheet is created, so a rejected
    /// input leaves the workbook untouched.
    pub fn write_sheet(
        &mut self,
        sheet_name: &str,
        datasets: &[SpecDataset],
        rules: &StyleRuleSet,
        compose_options: &SpecComposeOptions,
    ) -> Result<(), XlsxExportError> {
        if self.if_closed {
            return Err(XlsxExportError::Closed);
        }
        let layout = GridComposer::new(rules, compose_options.clone()).compose(datasets)?;
        self.write_layout(sheet_name, &layout)
    }

    /// Write an already composed grid as one sheet.
    pub fn write_layout(
        &mut self,
        sheet_name: &str,
        layout: &GridLayout,
    ) -> Result<(), XlsxExportError> {
        if self.if_closed {
            return Err(XlsxExportError::Closed);
        }
        validate_policy_autofit(&self.write_options.policy_autofit)?;
        if let Some(n_row_last) = layout.last_row()
            && n_row_last > N_NROWS_EXCEL_MAX
        {
            return Err(XlsxExportError::IndexOverflow {
                what: "row",
                value: n_row_last,
            });
        }
        if let Some(n_col_last) = layout.last_col()
            && n_col_last > N_NCOLS_EXCEL_MAX
        {
            return Err(XlsxExportError::IndexOverflow {
                what: "column",
                value: n_col_last,
            });
        }

        let mut report = SpecXlsxReport::default();
        let dict_formats = self.derive_sheet_formats(layout, &mut report);

        let sheet_name_unique = derive_unique_sheet_name(
            &sanitize_sheet_name(sheet_name, "_"),
            &mut self.set_sheet_names_existing,
        );
        if sheet_name_unique != sheet_name {
            report.warn(format!(
                "Sheet name {sheet_name:?} written as {sheet_name_unique:?}."
            ));
        }

        let worksheet = self.workbook.add_worksheet();
        worksheet.set_name(&sheet_name_unique)?;

        write_grid(worksheet, layout, &dict_formats, &mut report)?;

        if !matches!(
            self.write_options.policy_autofit.rule_columns,
            EnumAutofitColumnsRule::None
        ) {
            for (n_col, n_width_recorded) in derive_column_widths(layout, &self.write_options) {
                worksheet.set_column_width(
                    cast_col_num(n_col)?,
                    derive_autofit_width(n_width_recorded, &self.write_options.policy_autofit)
                        as f64,
                )?;
            }
        }

        if self.write_options.if_freeze_header
            && let Some(n_row_freeze) = derive_freeze_row(layout)
        {
            worksheet.set_freeze_panes(n_row_freeze, 0)?;
        }

        log::debug!(
            "wrote sheet {sheet_name_unique:?}: {} cell(s), {} merge(s)",
            layout.cells.len(),
            layout.merges.len()
        );
        report.sheets.push(SpecSheetExtent {
            sheet_name: sheet_name_unique,
            row_count: layout.row_count(),
            col_count: layout.col_count(),
            merge_count: layout.merges.len(),
        });
        self.l_reports.push(report);
        Ok(())
    }

    /// Build one value format and one datetime format per style id used by `layout`.
    fn derive_sheet_formats(
        &self,
        layout: &GridLayout,
        report: &mut SpecXlsxReport,
    ) -> BTreeMap<StyleId, SpecSheetFormat> {
        let fmt_fallback = self
            .dict_stylesheet
            .get(&self.write_options.style_id_fallback)
            .cloned()
            .unwrap_or_default();

        let set_style_ids: BTreeSet<StyleId> =
            layout.cells.iter().map(|cell| cell.style_id).collect();

        let mut dict_formats = BTreeMap::new();
        for style_id in set_style_ids {
            let fmt_spec = match self.dict_stylesheet.get(&style_id) {
                Some(fmt_spec) => fmt_spec.clone(),
                None => {
                    report.warn(format!(
                        "Style id {style_id} is not in the stylesheet; using id {}.",
                        self.write_options.style_id_fallback
                    ));
                    fmt_fallback.clone()
                }
            };
            let fmt_datetime_spec = fmt_spec.with_(SpecCellFormat {
                num_format: Some(self.write_options.num_format_datetime.clone()),
                ..Default::default()
            });
            dict_formats.insert(
                style_id,
                SpecSheetFormat {
                    fmt_value: derive_rust_xlsx_format(&fmt_spec),
                    fmt_datetime: derive_rust_xlsx_format(&fmt_datetime_spec),
                },
            );
        }
        dict_formats
    }
}

/// Compose and write several sheets into one workbook, then save it.
///
/// Returns one report per sheet in input order.
pub fn export_workbook(
    path_file_out: &Path,
    sheets: &[SpecSheetExport],
    rules: &StyleRuleSet,
    compose_options: &SpecComposeOptions,
    write_options: SpecXlsxWriteOptions,
) -> Result<Vec<SpecXlsxReport>, XlsxExportError> {
    let mut writer = XlsxWriter::new(
        path_file_out.to_path_buf(),
        derive_default_stylesheet(),
        write_options,
    );
    for sheet in sheets {
        writer.write_sheet(&sheet.sheet_name, &sheet.datasets, rules, compose_options)?;
    }
    writer.close()?;
    Ok(writer.report())
}

/// Pair of formats for one style id.
struct SpecSheetFormat {
    fmt_value: Format,
    fmt_datetime: Format,
}

fn write_grid(
    worksheet: &mut Worksheet,
    layout: &GridLayout,
    dict_formats: &BTreeMap<StyleId, SpecSheetFormat>,
    report: &mut SpecXlsxReport,
) -> Result<(), XlsxExportError> {
    let dict_merge_by_anchor: BTreeMap<(u32, u32), _> = layout
        .merges
        .iter()
        .map(|merge| ((merge.row_first, merge.col_first), merge))
        .collect();

    let mut set_cells_merged_tail = BTreeSet::new();
    for merge in &layout.merges {
        for n_row in merge.row_first..=merge.row_last {
            for n_col in merge.col_first..=merge.col_last {
                if (n_row, n_col) != (merge.row_first, merge.col_first) {
                    set_cells_merged_tail.insert((n_row, n_col));
                }
            }
        }
    }

    for cell in &layout.cells {
        if set_cells_merged_tail.contains(&(cell.row, cell.col)) {
            continue;
        }
        let Some(fmt_pair) = dict_formats.get(&cell.style_id) else {
            continue;
        };

        if let Some(merge) = dict_merge_by_anchor.get(&(cell.row, cell.col)) {
            worksheet.merge_range(
                cast_row_num(merge.row_first)?,
                cast_col_num(merge.col_first)?,
                cast_row_num(merge.row_last)?,
                cast_col_num(merge.col_last)?,
                &cell.value.to_display_text(),
                &fmt_pair.fmt_value,
            )?;
            continue;
        }

        write_cell_with_format(worksheet, cell, fmt_pair, report)?;
    }

    Ok(())
}

fn write_cell_with_format(
    worksheet: &mut Worksheet,
    cell: &SpecPlacedCell,
    fmt_pair: &SpecSheetFormat,
    report: &mut SpecXlsxReport,
) -> Result<(), XlsxExportError> {
    let n_row = cast_row_num(cell.row)?;
    let n_col = cast_col_num(cell.col)?;
    let format = &fmt_pair.fmt_value;

    match &cell.value {
        EnumCellValue::Empty => {
            worksheet.write_blank(n_row, n_col, format)?;
        }
        EnumCellValue::Text(val) => {
            worksheet.write_string_with_format(n_row, n_col, val, format)?;
        }
        EnumCellValue::Boolean(val) => {
            worksheet.write_boolean_with_format(n_row, n_col, *val, format)?;
        }
        EnumCellValue::Integer(val) => {
            worksheet.write_number_with_format(n_row, n_col, *val as f64, format)?;
        }
        EnumCellValue::Decimal(val) => match convert_nan_inf_to_str(*val) {
            Some(c_text) => {
                worksheet.write_string_with_format(n_row, n_col, c_text, format)?;
            }
            None => {
                worksheet.write_number_with_format(n_row, n_col, *val, format)?;
            }
        },
        EnumCellValue::Timestamp(val) => match convert_naive_datetime(val) {
            Ok(datetime) => {
                worksheet.write_datetime_with_format(
                    n_row,
                    n_col,
                    &datetime,
                    &fmt_pair.fmt_datetime,
                )?;
            }
            Err(err) => {
                report.warn(format!(
                    "Timestamp at {} is outside the Excel date range ({err}); written as text.",
                    cell.reference()
                ));
                worksheet.write_string_with_format(
                    n_row,
                    n_col,
                    cell.value.to_display_text(),
                    format,
                )?;
            }
        },
    }
    Ok(())
}

/// Widest display text per 1-based column, filtered by the autofit rule.
fn derive_column_widths(
    layout: &GridLayout,
    write_options: &SpecXlsxWriteOptions,
) -> BTreeMap<u32, usize> {
    let rule_columns = write_options.policy_autofit.rule_columns;
    let mut dict_width_by_col: BTreeMap<u32, usize> = BTreeMap::new();

    for cell in &layout.cells {
        let if_count = match (rule_columns, cell.role) {
            (EnumAutofitColumnsRule::None, _) => false,
            (EnumAutofitColumnsRule::All, _) => true,
            (EnumAutofitColumnsRule::Header, role) => role == EnumCellRole::Header,
            (EnumAutofitColumnsRule::Body, role) => role == EnumCellRole::Row,
        };
        // Merged labels span several columns and never drive one column's width.
        if !if_count || layout.merges.iter().any(|merge| merge.contains(cell.row, cell.col)) {
            dict_width_by_col.entry(cell.col).or_insert(0);
            continue;
        }

        let n_width = match &cell.value {
            EnumCellValue::Timestamp(_) => write_options.num_format_datetime.len(),
            value => estimate_unicode_string_width(&value.to_display_text()),
        };
        let n_width_recorded = dict_width_by_col.entry(cell.col).or_insert(0);
        *n_width_recorded = usize::max(*n_width_recorded, n_width);
    }

    dict_width_by_col
}

/// Zero-based row of the first data cell, or the row below the last header when
/// there is no data.
fn derive_freeze_row(layout: &GridLayout) -> Option<u32> {
    let n_row_data_first = layout
        .cells
        .iter()
        .filter(|cell| cell.role == EnumCellRole::Row)
        .map(|cell| cell.row)
        .min();
    match n_row_data_first {
        Some(n_row) => Some(n_row - 1),
        None => layout.last_row(),
    }
}

fn derive_rust_xlsx_format(spec: &SpecCellFormat) -> Format {
    let mut format = Format::new();

    if let Some(val) = &spec.font_name {
        format = format.set_font_name(val.clone());
    }
    if let Some(val) = spec.font_size {
        format = format.set_font_size(val as f64);
    }
    if spec.bold.unwrap_or(false) {
        format = format.set_bold();
    }
    if spec.italic.unwrap_or(false) {
        format = format.set_italic();
    }

    if let Some(val) = &spec.align
        && let Some(align) = derive_format_align(val)
    {
        format = format.set_align(align);
    }
    if let Some(val) = &spec.valign
        && let Some(align) = derive_format_align(val)
    {
        format = format.set_align(align);
    }

    if let Some(val) = &spec.num_format {
        format = format.set_num_format(val.clone());
    }
    if let Some(val) = &spec.bg_color {
        format = format.set_background_color(val.as_str());
    }
    if let Some(val) = &spec.font_color {
        format = format.set_font_color(val.as_str());
    }
    if let Some(val) = spec.border {
        format = format.set_border(derive_format_border(val));
    }
    if spec.text_wrap.unwrap_or(false) {
        format = format.set_text_wrap();
    }

    format
}

fn derive_format_border(border: i64) -> FormatBorder {
    match border {
        1 => FormatBorder::Thin,
        2 => FormatBorder::Medium,
        3 => FormatBorder::Dashed,
        4 => FormatBorder::Dotted,
        5 => FormatBorder::Thick,
        6 => FormatBorder::Double,
        7 => FormatBorder::Hair,
        _ => FormatBorder::None,
    }
}

fn derive_format_align(align: &str) -> Option<FormatAlign> {
    let value = align.trim().to_ascii_lowercase();
    match value.as_str() {
        "general" => Some(FormatAlign::General),
        "left" => Some(FormatAlign::Left),
        "center" => Some(FormatAlign::Center),
        "right" => Some(FormatAlign::Right),
        "fill" => Some(FormatAlign::Fill),
        "justify" => Some(FormatAlign::Justify),
        "center_across" => Some(FormatAlign::CenterAcross),
        "top" => Some(FormatAlign::Top),
        "bottom" => Some(FormatAlign::Bottom),
        "vcenter" | "vertical_center" => Some(FormatAlign::VerticalCenter),
        _ => None,
    }
}
