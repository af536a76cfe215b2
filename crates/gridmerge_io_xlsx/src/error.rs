//! Error type for workbook export.

use gridmerge_layout::LayoutError;
use polars::prelude::PolarsError;
use rust_xlsxwriter::XlsxError;
use thiserror::Error;

/// Errors raised while composing, converting or writing a workbook.
#[derive(Debug, Error)]
pub enum XlsxExportError {
    /// Grid composition rejected the input.
    #[error("Layout error: {0}")]
    Layout(#[from] LayoutError),

    /// The underlying xlsx writer failed.
    #[error("xlsx write error: {0}")]
    Xlsx(#[from] XlsxError),

    /// DataFrame decoding or access failed.
    #[error("DataFrame error: {0}")]
    Polars(#[from] PolarsError),

    /// A 1-based grid coordinate does not fit the worksheet index type.
    #[error("{what} index overflow: {value}")]
    IndexOverflow {
        /// `"row"` or `"column"`.
        what: &'static str,
        /// Offending 1-based coordinate.
        value: u32,
    },

    /// Writer used after `close()`.
    #[error("Cannot write after close().")]
    Closed,

    /// Invalid writer option.
    #[error("Invalid option: {0}")]
    InvalidOption(String),
}
