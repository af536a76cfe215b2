use std::path::PathBuf;

use gridmerge_io_xlsx::spec::{
    EnumAutofitColumnsRule, SpecAutofitCellsPolicy, SpecSheetExtent, SpecXlsxWriteOptions,
};
use gridmerge_io_xlsx::{
    XlsxWriter as RsXlsxWriter, derive_default_stylesheet, table_from_ipc_bytes,
};
use gridmerge_layout::{
    EnumDatasetLabelMode, SpecComposeOptions, SpecDataset, SpecTable, StyleRuleSet,
    decode_column, encode_column,
};
use pyo3::exceptions::{PyRuntimeError, PyValueError};
use pyo3::prelude::*;
use pyo3::types::{PyAny, PyBytes, PyDict, PyList, PyTuple};

const C_BRIDGE_CONTRACT_VERSION: &str = "gridmerge.xlsx.writer.v1";
const C_BRIDGE_TRANSPORT: &str = "polars_ipc_bytes";

#[pyclass(name = "XlsxWriter")]
struct PyXlsxWriter {
    #[pyo3(get)]
    file_out: String,
    inner: RsXlsxWriter,
    rules: StyleRuleSet,
}

#[pymethods]
impl PyXlsxWriter {
    #[new]
    #[pyo3(signature = (
        file_out,
        rules_json = None,
        if_freeze_header = false,
        rule_autofit_columns = "header"
    ))]
    fn new(
        file_out: String,
        rules_json: Option<&str>,
        if_freeze_header: bool,
        rule_autofit_columns: &str,
    ) -> PyResult<Self> {
        let path_file_out = PathBuf::from(&file_out);

        let rules = match rules_json {
            Some(c_json) => StyleRuleSet::from_json_str(c_json)
                .map_err(|err| PyValueError::new_err(err.to_string()))?,
            None => StyleRuleSet::new(),
        };

        let cfg_write_options = SpecXlsxWriteOptions {
            if_freeze_header,
            policy_autofit: SpecAutofitCellsPolicy {
                rule_columns: parse_rule_autofit_columns(rule_autofit_columns)?,
                ..Default::default()
            },
            ..Default::default()
        };

        let inner =
            RsXlsxWriter::new(path_file_out, derive_default_stylesheet(), cfg_write_options);

        Ok(Self {
            file_out,
            inner,
            rules,
        })
    }

    fn __enter__(slf: PyRefMut<'_, Self>) -> PyRefMut<'_, Self> {
        slf
    }

    #[pyo3(signature = (_exc_type=None, _exc=None, _tb=None))]
    fn __exit__(
        &mut self,
        _exc_type: Option<&Bound<'_, PyAny>>,
        _exc: Option<&Bound<'_, PyAny>>,
        _tb: Option<&Bound<'_, PyAny>>,
    ) -> PyResult<()> {
        self.close()
    }

    fn close(&mut self) -> PyResult<()> {
        self.inner
            .close()
            .map_err(|err| PyRuntimeError::new_err(err.to_string()))
    }

    /// Register a style rule; `False` when the `(name, column_index)` key exists.
    #[pyo3(signature = (name, header_style, row_style, column_index = None))]
    fn add_style_rule(
        &mut self,
        name: String,
        header_style: u32,
        row_style: u32,
        column_index: Option<u32>,
    ) -> bool {
        match column_index {
            Some(n_col) => self.rules.add_column(name, n_col, header_style, row_style),
            None => self.rules.add_named(name, header_style, row_style),
        }
    }

    fn rules_json(&self) -> PyResult<String> {
        self.rules
            .to_json_string()
            .map_err(|err| PyValueError::new_err(err.to_string()))
    }

    fn report(&self, py: Python<'_>) -> PyResult<Py<PyAny>> {
        let l_reports = self.inner.report();

        let mut l_report_obj = Vec::with_capacity(l_reports.len());
        for report in l_reports {
            let mut l_sheet_obj = Vec::with_capacity(report.sheets.len());
            for sheet in &report.sheets {
                l_sheet_obj.push(create_sheet_extent_dict(py, sheet)?);
            }

            let dict_report = PyDict::new(py);
            dict_report.set_item("sheets", PyList::new(py, l_sheet_obj)?)?;
            dict_report.set_item("warnings", report.warnings)?;
            l_report_obj.push(dict_report.into_any().unbind());
        }

        let tup_report = PyTuple::new(py, l_report_obj)?;
        Ok(tup_report.into_any().unbind())
    }

    /// Compose and write one sheet.
    ///
    /// `datasets` is a sequence of `(name | None, [(table_name, polars.DataFrame), ...])`.
    #[pyo3(signature = (
        sheet_name,
        datasets,
        rule_label = "per_table",
        row_origin = 1,
        col_origin = 1
    ))]
    fn write_sheet<'py>(
        mut slf: PyRefMut<'py, Self>,
        py: Python<'py>,
        sheet_name: &str,
        datasets: &Bound<'py, PyAny>,
        rule_label: &str,
        row_origin: u32,
        col_origin: u32,
    ) -> PyResult<PyRefMut<'py, Self>> {
        let l_datasets = parse_datasets(py, datasets)?;
        let cfg_compose_options = SpecComposeOptions {
            row_origin,
            col_origin,
            rule_label: parse_rule_label(rule_label)?,
        };

        let this = &mut *slf;
        this.inner
            .write_sheet(sheet_name, &l_datasets, &this.rules, &cfg_compose_options)
            .map_err(|err| PyValueError::new_err(err.to_string()))?;

        Ok(slf)
    }
}

fn create_sheet_extent_dict(py: Python<'_>, sheet: &SpecSheetExtent) -> PyResult<Py<PyAny>> {
    let dict_sheet = PyDict::new(py);
    dict_sheet.set_item("sheet_name", &sheet.sheet_name)?;
    dict_sheet.set_item("row_count", sheet.row_count)?;
    dict_sheet.set_item("col_count", sheet.col_count)?;
    dict_sheet.set_item("merge_count", sheet.merge_count)?;
    Ok(dict_sheet.into_any().unbind())
}

fn parse_rule_autofit_columns(value: &str) -> PyResult<EnumAutofitColumnsRule> {
    match value {
        "none" => Ok(EnumAutofitColumnsRule::None),
        "header" => Ok(EnumAutofitColumnsRule::Header),
        "body" => Ok(EnumAutofitColumnsRule::Body),
        "all" => Ok(EnumAutofitColumnsRule::All),
        _ => Err(PyValueError::new_err(
            "rule_autofit_columns must be one of: 'none', 'header', 'body', 'all'.",
        )),
    }
}

fn parse_rule_label(value: &str) -> PyResult<EnumDatasetLabelMode> {
    match value {
        "per_table" => Ok(EnumDatasetLabelMode::PerTable),
        "spanning" => Ok(EnumDatasetLabelMode::Spanning),
        "nested" => Ok(EnumDatasetLabelMode::Nested),
        _ => Err(PyValueError::new_err(
            "rule_label must be one of: 'per_table', 'spanning', 'nested'.",
        )),
    }
}

fn parse_datasets<'py>(
    py: Python<'py>,
    datasets: &Bound<'py, PyAny>,
) -> PyResult<Vec<SpecDataset>> {
    let mut l_datasets = Vec::new();
    for item in datasets.try_iter()? {
        let (name, tables): (Option<String>, Bound<'py, PyAny>) = item?.extract()?;

        let mut l_tables = Vec::new();
        for table_item in tables.try_iter()? {
            let (table_name, df): (String, Bound<'py, PyAny>) = table_item?.extract()?;
            l_tables.push(derive_table_from_any_dataframe(py, &table_name, &df)?);
        }

        l_datasets.push(SpecDataset {
            name,
            tables: l_tables,
        });
    }
    Ok(l_datasets)
}

fn derive_table_from_any_dataframe<'py>(
    py: Python<'py>,
    table_name: &str,
    df: &Bound<'py, PyAny>,
) -> PyResult<SpecTable> {
    let df = convert_to_polars_dataframe(py, df)?;
    let obj_buf = df.call_method1("write_ipc", (py.None(),))?;
    let obj_bytes = obj_buf.call_method0("getvalue")?;
    let v_ipc_df = obj_bytes.downcast::<PyBytes>()?;

    table_from_ipc_bytes(table_name, v_ipc_df.as_bytes())
        .map_err(|err| PyValueError::new_err(err.to_string()))
}

fn convert_to_polars_dataframe<'py>(
    py: Python<'py>,
    df: &Bound<'py, PyAny>,
) -> PyResult<Bound<'py, PyAny>> {
    let module_polars = py.import("polars")?;
    let cls_dataframe = module_polars.getattr("DataFrame")?;

    if df.is_instance(&cls_dataframe)? {
        return Ok(df.clone());
    }

    cls_dataframe.call1((df,))
}

/// Column letters for a zero-based index.
#[pyfunction(name = "encode_column")]
fn py_encode_column(index: u32) -> String {
    encode_column(index)
}

/// Zero-based index for column letters; `None` when not a valid column.
#[pyfunction(name = "decode_column")]
fn py_decode_column(letters: &str) -> Option<u32> {
    decode_column(letters)
}

#[pymodule]
fn _gridmerge_io_xlsx_rs(_py: Python<'_>, module: &Bound<'_, PyModule>) -> PyResult<()> {
    module.add_class::<PyXlsxWriter>()?;
    module.add_function(wrap_pyfunction!(py_encode_column, module)?)?;
    module.add_function(wrap_pyfunction!(py_decode_column, module)?)?;
    module.add("__bridge_contract__", C_BRIDGE_CONTRACT_VERSION)?;
    module.add("__bridge_transport__", C_BRIDGE_TRANSPORT)?;
    Ok(())
}
