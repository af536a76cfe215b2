//! `gridmerge_io_xlsx` v1:
//! XLSX output and DataFrame input for the grid layout kernel.
//!
//! Module layout:
//! - `conf`   : Excel limits, default stylesheet and write options
//! - `spec`   : cell formats, write options, sheet exports, reports
//! - `error`  : export error type
//! - `util`   : pure helper functions
//! - `frame`  : Polars DataFrame / IPC to `SpecTable`
//! - `writer` : workbook writer and multi-sheet export
pub mod conf;
pub mod error;
pub mod frame;
pub mod spec;
pub mod util;
pub mod writer;

pub use conf::{
    C_NUM_FORMAT_DATETIME, N_LEN_EXCEL_SHEET_NAME_MAX, N_NCOLS_EXCEL_MAX, N_NROWS_EXCEL_MAX,
    TUP_EXCEL_ILLEGAL, derive_default_stylesheet, derive_default_xlsx_write_options,
};
pub use error::XlsxExportError;
pub use frame::{derive_dataframe_from_ipc_bytes, table_from_dataframe, table_from_ipc_bytes};
pub use spec::{
    EnumAutofitColumnsRule, SpecAutofitCellsPolicy, SpecCellFormat, SpecSheetExport,
    SpecSheetExtent, SpecXlsxReport, SpecXlsxWriteOptions,
};
pub use util::sanitize_sheet_name;
pub use writer::{XlsxWriter, export_workbook};
