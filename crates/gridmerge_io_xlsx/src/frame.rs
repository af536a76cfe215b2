//! Polars `DataFrame` to layout `SpecTable` conversion.

use std::io::Cursor;

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone};
use chrono_tz::Tz;
use gridmerge_layout::{EnumCellValue, SpecTable};
use polars::prelude::{AnyValue, Column, DataFrame, DataType, IpcReader, SerReader, TimeUnit};

use crate::error::XlsxExportError;

/// Days from 0001-01-01 (CE day 1) to 1970-01-01.
const N_DAYS_CE_TO_UNIX_EPOCH: i32 = 719_163;

/// Build a table named `name` from `df`, one row per DataFrame row.
///
/// Column names come from the frame schema; cell values are typed from the
/// column dtype. Timezone-aware datetimes are written as wall-clock time in
/// their column's zone; naive datetimes are taken as they are.
pub fn table_from_dataframe(name: &str, df: &DataFrame) -> Result<SpecTable, XlsxExportError> {
    let l_colnames: Vec<String> = df
        .get_column_names_str()
        .into_iter()
        .map(ToString::to_string)
        .collect();
    let mut table = SpecTable::new(name, l_colnames);

    let l_cols = df.get_columns();
    let l_time_zones: Vec<Option<Tz>> = l_cols
        .iter()
        .map(|col| derive_column_time_zone(name, col))
        .collect();
    for n_idx_row in 0..df.height() {
        let mut l_values = Vec::with_capacity(l_cols.len());
        for (col, tz) in l_cols.iter().zip(&l_time_zones) {
            l_values.push(derive_cell_value_from_any_value(
                col.get(n_idx_row)?,
                tz.as_ref(),
            ));
        }
        table.push_row(l_values)?;
    }

    log::debug!(
        "converted DataFrame into table {name:?}: {} column(s), {} row(s)",
        table.width(),
        table.height()
    );
    Ok(table)
}

/// Decode a Polars IPC payload and build a table from it.
pub fn table_from_ipc_bytes(name: &str, v_ipc_df: &[u8]) -> Result<SpecTable, XlsxExportError> {
    let df = derive_dataframe_from_ipc_bytes(v_ipc_df)?;
    table_from_dataframe(name, &df)
}

/// Decode a Polars IPC payload.
pub fn derive_dataframe_from_ipc_bytes(v_ipc_df: &[u8]) -> Result<DataFrame, XlsxExportError> {
    Ok(IpcReader::new(Cursor::new(v_ipc_df)).finish()?)
}

/// IANA zone of a timezone-aware datetime column.
///
/// Unknown zone names fall back to UTC wall-clock time with a warning.
fn derive_column_time_zone(table: &str, col: &Column) -> Option<Tz> {
    let DataType::Datetime(_, Some(tz)) = col.dtype() else {
        return None;
    };
    let c_tz = tz.to_string();
    let tz_parsed = parse_time_zone(&c_tz);
    if tz_parsed.is_none() {
        log::warn!(
            "column {:?} of table {table:?} has unknown time zone {c_tz:?}; writing UTC",
            col.name()
        );
    }
    tz_parsed
}

fn parse_time_zone(c_tz: &str) -> Option<Tz> {
    c_tz.parse::<Tz>().ok()
}

fn convert_utc_to_local(ts_utc: NaiveDateTime, tz: Option<&Tz>) -> NaiveDateTime {
    match tz {
        Some(tz) => tz.from_utc_datetime(&ts_utc).naive_local(),
        None => ts_utc,
    }
}

fn derive_cell_value_from_any_value(value: AnyValue<'_>, tz: Option<&Tz>) -> EnumCellValue {
    match value {
        AnyValue::Null => EnumCellValue::Empty,
        AnyValue::Boolean(val) => EnumCellValue::Boolean(val),
        AnyValue::String(val) => EnumCellValue::Text(val.to_string()),
        AnyValue::StringOwned(val) => EnumCellValue::Text(val.to_string()),
        AnyValue::UInt8(val) => EnumCellValue::Integer(i64::from(val)),
        AnyValue::UInt16(val) => EnumCellValue::Integer(i64::from(val)),
        AnyValue::UInt32(val) => EnumCellValue::Integer(i64::from(val)),
        AnyValue::UInt64(val) => match i64::try_from(val) {
            Ok(n_val) => EnumCellValue::Integer(n_val),
            Err(_) => EnumCellValue::Decimal(val as f64),
        },
        AnyValue::Int8(val) => EnumCellValue::Integer(i64::from(val)),
        AnyValue::Int16(val) => EnumCellValue::Integer(i64::from(val)),
        AnyValue::Int32(val) => EnumCellValue::Integer(i64::from(val)),
        AnyValue::Int64(val) => EnumCellValue::Integer(val),
        AnyValue::Float32(val) => EnumCellValue::Decimal(f64::from(val)),
        AnyValue::Float64(val) => EnumCellValue::Decimal(val),
        AnyValue::Date(n_days) => derive_naive_date(n_days)
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .map_or(EnumCellValue::Empty, EnumCellValue::Timestamp),
        AnyValue::Datetime(n_val, unit, _) | AnyValue::DatetimeOwned(n_val, unit, _) => {
            derive_naive_datetime(n_val, unit).map_or(EnumCellValue::Empty, |ts_utc| {
                EnumCellValue::Timestamp(convert_utc_to_local(ts_utc, tz))
            })
        }
        _ => EnumCellValue::Text(value.to_string()),
    }
}

fn derive_naive_date(n_days_since_epoch: i32) -> Option<NaiveDate> {
    NaiveDate::from_num_days_from_ce_opt(n_days_since_epoch.checked_add(N_DAYS_CE_TO_UNIX_EPOCH)?)
}

fn derive_naive_datetime(n_val: i64, unit: TimeUnit) -> Option<NaiveDateTime> {
    let n_per_sec: i64 = match unit {
        TimeUnit::Nanoseconds => 1_000_000_000,
        TimeUnit::Microseconds => 1_000_000,
        TimeUnit::Milliseconds => 1_000,
    };
    let n_secs = n_val.div_euclid(n_per_sec);
    let n_nanos = n_val.rem_euclid(n_per_sec) * (1_000_000_000 / n_per_sec);
    DateTime::from_timestamp(n_secs, u32::try_from(n_nanos).ok()?).map(|ts| ts.naive_utc())
}
