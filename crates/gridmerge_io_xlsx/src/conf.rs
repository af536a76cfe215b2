//! XLSX constants and default preset factories.

use std::collections::BTreeMap;

use gridmerge_layout::{EnumStyleId, StyleId};

use crate::spec::{SpecCellFormat, SpecXlsxWriteOptions};

/// Excel worksheet maximum row count.
pub const N_NROWS_EXCEL_MAX: u32 = 1_048_576;
/// Excel worksheet maximum column count.
pub const N_NCOLS_EXCEL_MAX: u32 = 16_384;
/// Excel sheet name maximum length.
pub const N_LEN_EXCEL_SHEET_NAME_MAX: usize = 31;
/// Characters not allowed in sheet names.
pub const TUP_EXCEL_ILLEGAL: [&str; 7] = ["*", ":", "?", "/", "\\", "[", "]"];

/// Number format applied on top of a cell style for timestamp values.
pub const C_NUM_FORMAT_DATETIME: &str = "dd/mm/yyyy hh:mm:ss";
/// Number format forcing text display.
pub const C_NUM_FORMAT_TEXT: &str = "@";

/// Text written for NaN values (Excel has no NaN number).
pub const C_NAN_STR: &str = "NaN";
/// Text written for positive infinity.
pub const C_POSINF_STR: &str = "Inf";
/// Text written for negative infinity.
pub const C_NEGINF_STR: &str = "-Inf";

const C_COLOR_YELLOW: &str = "#FFFF00";
const C_COLOR_LITE_BLUE: &str = "#8DB3E2";
const C_COLOR_PEACH: &str = "#FBD4B4";

/// Build the default stylesheet covering every builtin [`EnumStyleId`].
///
/// Base font is Calibri 11; fills are centered both ways with a thin border.
pub fn derive_default_stylesheet() -> BTreeMap<StyleId, SpecCellFormat> {
    let cfg_base_fmt_spec = SpecCellFormat {
        font_name: Some("Calibri".to_string()),
        font_size: Some(11),
        ..Default::default()
    };
    let cfg_centered = SpecCellFormat {
        align: Some("center".to_string()),
        valign: Some("vcenter".to_string()),
        ..Default::default()
    };
    let cfg_bordered = SpecCellFormat {
        border: Some(1),
        ..Default::default()
    };
    let derive_fill = |color: &str| {
        cfg_base_fmt_spec
            .merge(&cfg_centered)
            .merge(&cfg_bordered)
            .with_(SpecCellFormat {
                bg_color: Some(color.to_string()),
                ..Default::default()
            })
    };

    let mut dict_fmt = BTreeMap::new();
    for style in EnumStyleId::ALL {
        let fmt = match style {
            EnumStyleId::Default => cfg_base_fmt_spec.clone(),
            EnumStyleId::Bold => cfg_base_fmt_spec.with_(SpecCellFormat {
                bold: Some(true),
                ..Default::default()
            }),
            EnumStyleId::Italic => cfg_base_fmt_spec.with_(SpecCellFormat {
                italic: Some(true),
                ..Default::default()
            }),
            EnumStyleId::TimesRoman => cfg_base_fmt_spec.with_(SpecCellFormat {
                font_name: Some("Times New Roman".to_string()),
                font_size: Some(16),
                ..Default::default()
            }),
            EnumStyleId::YellowFill => derive_fill(C_COLOR_YELLOW),
            EnumStyleId::Alignment => cfg_base_fmt_spec.merge(&cfg_centered),
            EnumStyleId::Border => cfg_base_fmt_spec.merge(&cfg_bordered),
            EnumStyleId::LiteBlueFill => derive_fill(C_COLOR_LITE_BLUE),
            EnumStyleId::NavyFill => derive_fill(C_COLOR_PEACH),
            EnumStyleId::AlignmentWithBorder => {
                cfg_base_fmt_spec.merge(&cfg_centered).merge(&cfg_bordered)
            }
            EnumStyleId::BorderText => cfg_base_fmt_spec.merge(&cfg_bordered).with_(SpecCellFormat {
                num_format: Some(C_NUM_FORMAT_TEXT.to_string()),
                ..Default::default()
            }),
        };
        dict_fmt.insert(style.id(), fmt);
    }

    dict_fmt
}

/// Build default write options.
pub fn derive_default_xlsx_write_options() -> SpecXlsxWriteOptions {
    SpecXlsxWriteOptions::default()
}
