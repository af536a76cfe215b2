//! Stateless helper utilities used by the XLSX writer kernel.

use std::collections::BTreeSet;

use chrono::{Datelike, NaiveDateTime, Timelike};
use rust_xlsxwriter::{ColNum, ExcelDateTime, RowNum, XlsxError};

use crate::conf::{
    C_NAN_STR, C_NEGINF_STR, C_POSINF_STR, N_LEN_EXCEL_SHEET_NAME_MAX, TUP_EXCEL_ILLEGAL,
};
use crate::error::XlsxExportError;
use crate::spec::SpecAutofitCellsPolicy;

////////////////////////////////////////////////////////////////////////////////
// #region CellValueConversion

/// Text replacement for `NaN`/`Inf`; `None` for finite values.
pub fn convert_nan_inf_to_str(x: f64) -> Option<&'static str> {
    if x.is_nan() {
        return Some(C_NAN_STR);
    }
    if x.is_infinite() {
        return Some(if x.is_sign_positive() {
            C_POSINF_STR
        } else {
            C_NEGINF_STR
        });
    }
    None
}

/// Convert a timestamp to an Excel serial datetime.
///
/// Fails for dates Excel cannot represent (before 1900 or after 9999).
pub fn convert_naive_datetime(value: &NaiveDateTime) -> Result<ExcelDateTime, XlsxError> {
    // Out-of-range years map to 0, which `from_ymd` rejects.
    let n_year = u16::try_from(value.year()).unwrap_or(0);
    let n_sec = f64::from(value.second()) + f64::from(value.nanosecond() % 1_000_000_000) / 1e9;
    ExcelDateTime::from_ymd(n_year, value.month() as u8, value.day() as u8)?.and_hms(
        value.hour() as u16,
        value.minute() as u8,
        n_sec,
    )
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region GridCoordinates

/// 1-based grid row to zero-based worksheet row.
pub fn cast_row_num(row: u32) -> Result<RowNum, XlsxExportError> {
    row.checked_sub(1)
        .ok_or(XlsxExportError::IndexOverflow { what: "row", value: row })
}

/// 1-based grid column to zero-based worksheet column.
pub fn cast_col_num(col: u32) -> Result<ColNum, XlsxExportError> {
    col.checked_sub(1)
        .and_then(|val| ColNum::try_from(val).ok())
        .ok_or(XlsxExportError::IndexOverflow {
            what: "column",
            value: col,
        })
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region SheetNormalization

/// Replace invalid chars and trim to valid Excel sheet name.
pub fn sanitize_sheet_name(name: &str, replace_to: &str) -> String {
    let mut c_name = name.to_string();
    for c_illegal in TUP_EXCEL_ILLEGAL {
        c_name = c_name.replace(c_illegal, replace_to);
    }
    c_name = c_name.trim().trim_matches('\'').to_string();
    if c_name.is_empty() {
        c_name = "Sheet".to_string();
    }

    c_name.chars().take(N_LEN_EXCEL_SHEET_NAME_MAX).collect()
}

/// Return `name`, or `name__2`, `name__3`, ... when already taken; records the result.
///
/// Excel compares sheet names case-insensitively, so `set_names_existing`
/// holds lowercase keys.
pub fn derive_unique_sheet_name(name: &str, set_names_existing: &mut BTreeSet<String>) -> String {
    if set_names_existing.insert(name.to_lowercase()) {
        return name.to_string();
    }

    let base_name: String = name
        .chars()
        .take(usize::max(1, N_LEN_EXCEL_SHEET_NAME_MAX - 4))
        .collect();

    let mut n_idx = 2usize;
    loop {
        let candidate: String = format!("{base_name}__{n_idx}")
            .chars()
            .take(N_LEN_EXCEL_SHEET_NAME_MAX)
            .collect();
        if set_names_existing.insert(candidate.to_lowercase()) {
            return candidate;
        }
        n_idx += 1;
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Autofit

/// Estimate displayed width units; non-ASCII glyphs count as 1.6.
pub fn estimate_unicode_string_width(s: &str) -> usize {
    let n_ascii = s.chars().filter(|chr| chr.is_ascii()).count();
    let n_non_ascii = s.chars().count().saturating_sub(n_ascii);
    n_ascii + (n_non_ascii as f64 * 1.6).round() as usize
}

/// Clamp a recorded width into the policy's `[min, max]` after padding.
pub fn derive_autofit_width(n_width_recorded: usize, policy: &SpecAutofitCellsPolicy) -> usize {
    let n_min = usize::max(1, policy.width_cell_min);
    let n_max = usize::min(255, usize::max(n_min, policy.width_cell_max));
    usize::min(
        n_max,
        usize::max(n_min, n_width_recorded + policy.width_cell_padding),
    )
}

/// Reject autofit bounds that cannot produce a width.
pub fn validate_policy_autofit(
    policy_autofit: &SpecAutofitCellsPolicy,
) -> Result<(), XlsxExportError> {
    if policy_autofit.width_cell_min == 0 {
        return Err(XlsxExportError::InvalidOption(
            "policy_autofit.width_cell_min must be >= 1.".to_string(),
        ));
    }
    if policy_autofit.width_cell_max < policy_autofit.width_cell_min {
        return Err(XlsxExportError::InvalidOption(
            "policy_autofit.width_cell_max must be >= policy_autofit.width_cell_min.".to_string(),
        ));
    }
    Ok(())
}

// #endregion
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    #[test]
    fn sanitize_replaces_illegal_chars_and_caps_length() {
        assert_eq!(sanitize_sheet_name("a/b:c", "_"), "a_b_c");
        assert_eq!(sanitize_sheet_name("   ", "_"), "Sheet");
        assert_eq!(sanitize_sheet_name(&"x".repeat(40), "_").len(), 31);
    }

    #[test]
    fn unique_names_get_numbered_suffix() {
        let mut set_names = BTreeSet::new();
        assert_eq!(derive_unique_sheet_name("Data", &mut set_names), "Data");
        assert_eq!(derive_unique_sheet_name("data", &mut set_names), "data__2");
        assert_eq!(derive_unique_sheet_name("Data", &mut set_names), "Data__3");

        let c_long = "y".repeat(31);
        derive_unique_sheet_name(&c_long, &mut set_names);
        let c_dup = derive_unique_sheet_name(&c_long, &mut set_names);
        assert_eq!(c_dup.chars().count(), 30);
        assert!(c_dup.ends_with("__2"));
    }

    #[test]
    fn one_based_coordinates_map_to_zero_based() {
        assert_eq!(cast_row_num(1).unwrap(), 0);
        assert_eq!(cast_col_num(3).unwrap(), 2);
        assert!(cast_row_num(0).is_err());
        assert!(cast_col_num(70_000).is_err());
    }

    #[test]
    fn non_finite_numbers_become_text() {
        assert_eq!(convert_nan_inf_to_str(f64::NAN), Some("NaN"));
        assert_eq!(convert_nan_inf_to_str(f64::NEG_INFINITY), Some("-Inf"));
        assert_eq!(convert_nan_inf_to_str(1.5), None);
    }

    #[test]
    fn datetimes_before_1900_are_rejected() {
        let ts_ok = NaiveDate::from_ymd_opt(2024, 2, 29)
            .unwrap()
            .and_hms_opt(13, 45, 30)
            .unwrap();
        assert!(convert_naive_datetime(&ts_ok).is_ok());

        let ts_old = NaiveDate::from_ymd_opt(1850, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        assert!(convert_naive_datetime(&ts_old).is_err());
    }

    #[test]
    fn autofit_width_is_padded_and_clamped() {
        let policy = SpecAutofitCellsPolicy::default();
        assert_eq!(derive_autofit_width(0, &policy), 8);
        assert_eq!(derive_autofit_width(10, &policy), 12);
        assert_eq!(derive_autofit_width(500, &policy), 60);
        assert_eq!(estimate_unicode_string_width("ab"), 2);
        assert_eq!(estimate_unicode_string_width("数据"), 3);

        let policy_bad = SpecAutofitCellsPolicy {
            width_cell_min: 10,
            width_cell_max: 5,
            ..Default::default()
        };
        assert!(validate_policy_autofit(&policy_bad).is_err());
    }
}
