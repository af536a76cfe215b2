use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::NaiveDate;
use gridmerge_io_xlsx::{
    SpecSheetExport, SpecXlsxWriteOptions, XlsxExportError, XlsxWriter, export_workbook,
    table_from_dataframe,
};
use gridmerge_layout::{
    EnumCellValue, EnumStyleId, SampleSource, SpecComposeOptions, SpecDataset, SpecTable,
    StyleRuleSet,
};

fn read_zip_entry(path: &Path, name: &str) -> String {
    let mut archive = zip::ZipArchive::new(File::open(path).unwrap()).unwrap();
    let mut entry = archive.by_name(name).unwrap();
    let mut text = String::new();
    entry.read_to_string(&mut text).unwrap();
    text
}

fn derive_legacy_rules() -> StyleRuleSet {
    let mut rules = StyleRuleSet::new();
    rules.add_named("Set 1", EnumStyleId::YellowFill, EnumStyleId::Default);
    rules.add_named("Sample", EnumStyleId::NavyFill, EnumStyleId::Default);
    rules.add_named("Table 1", EnumStyleId::LiteBlueFill, EnumStyleId::Default);
    rules
}

#[test]
fn single_table_sheet_has_one_header_merge() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("single.xlsx");

    let table = SpecTable::new("Sample", ["Column 1", "Column 2", "Column 3"])
        .with_row([1, 2, 3])
        .unwrap()
        .with_row([4, 5, 6])
        .unwrap();

    let mut writer = XlsxWriter::with_defaults(path.clone());
    writer
        .write_sheet(
            "Multi Set Sheet One",
            &[SpecDataset::from_table(table)],
            &derive_legacy_rules(),
            &SpecComposeOptions::default(),
        )
        .unwrap();
    writer.close().unwrap();

    let c_sheet_xml = read_zip_entry(&path, "xl/worksheets/sheet1.xml");
    assert!(c_sheet_xml.contains(r#"<mergeCell ref="A1:C1"/>"#));
    assert!(c_sheet_xml.contains(r#"<dimension ref="A1:C4"/>"#));

    let c_workbook_xml = read_zip_entry(&path, "xl/workbook.xml");
    assert!(c_workbook_xml.contains(r#"name="Multi Set Sheet One""#));

    let l_reports = writer.report();
    assert_eq!(l_reports.len(), 1);
    assert_eq!(l_reports[0].sheets[0].row_count, 4);
    assert_eq!(l_reports[0].sheets[0].merge_count, 1);
    assert!(l_reports[0].warnings.is_empty());
}

#[test]
fn multi_sheet_export_stacks_sample_sets() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("multi.xlsx");

    let mut source = SampleSource::new(98);
    let mut datasets = source.datasets(3, 1);
    datasets.push(source.dataset(4, 2));
    let sheets = vec![
        SpecSheetExport::new(
            "Multi Set Sheet One",
            vec![SpecDataset::from_table(source.table("Sample", 10, 10))],
        ),
        SpecSheetExport::new("Multi Set Sheet Two", datasets),
    ];

    let l_reports = export_workbook(
        &path,
        &sheets,
        &derive_legacy_rules(),
        &SpecComposeOptions::default(),
        SpecXlsxWriteOptions::default(),
    )
    .unwrap();

    assert_eq!(l_reports.len(), 2);
    assert_eq!(l_reports[0].sheets[0].row_count, 12);
    // Sets 1-3: 2 header + 2 data rows each; set 4: 2 header + 8 data rows.
    assert_eq!(l_reports[1].sheets[0].row_count, 3 * 4 + 10);
    assert_eq!(l_reports[1].sheets[0].merge_count, 3 + 2);

    let c_sheet_xml = read_zip_entry(&path, "xl/worksheets/sheet2.xml");
    assert!(c_sheet_xml.contains(r#"<mergeCell ref="A1:D1"/>"#));
    assert!(c_sheet_xml.contains(r#"<mergeCell ref="A13:D13"/>"#));
    assert!(c_sheet_xml.contains(r#"<mergeCell ref="E13:H13"/>"#));
}

#[test]
fn typed_values_and_duplicate_sheet_names_are_handled() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("typed.xlsx");

    let ts = NaiveDate::from_ymd_opt(2024, 5, 1)
        .unwrap()
        .and_hms_opt(8, 30, 0)
        .unwrap();
    let table = SpecTable::new("Typed", ["when", "flag", "ratio", "note"])
        .with_row([
            EnumCellValue::from(ts),
            EnumCellValue::from(true),
            EnumCellValue::from(f64::NAN),
            EnumCellValue::Empty,
        ])
        .unwrap();
    let datasets = vec![SpecDataset::from_table(table)];

    let write_options = SpecXlsxWriteOptions {
        if_freeze_header: true,
        ..Default::default()
    };
    let mut writer = XlsxWriter::new(
        path.clone(),
        gridmerge_io_xlsx::derive_default_stylesheet(),
        write_options,
    );
    let rules = StyleRuleSet::new();
    let options = SpecComposeOptions::default();
    writer.write_sheet("Data", &datasets, &rules, &options).unwrap();
    writer.write_sheet("Data", &datasets, &rules, &options).unwrap();
    writer.write_sheet("a/b", &datasets, &rules, &options).unwrap();
    writer.close().unwrap();

    let l_names: Vec<String> = writer
        .report()
        .iter()
        .map(|report| report.sheets[0].sheet_name.clone())
        .collect();
    assert_eq!(l_names, vec!["Data", "Data__2", "a_b"]);

    let c_sheet_xml = read_zip_entry(&path, "xl/worksheets/sheet1.xml");
    assert!(c_sheet_xml.contains("<pane"));
    assert!(c_sheet_xml.contains(r#"t="b""#));

    let c_styles_xml = read_zip_entry(&path, "xl/styles.xml");
    assert!(c_styles_xml.contains("dd/mm/yyyy hh:mm:ss"));

    let c_shared_xml = read_zip_entry(&path, "xl/sharedStrings.xml");
    assert!(c_shared_xml.contains("NaN"));
}

#[test]
fn rejected_layout_leaves_workbook_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let mut writer = XlsxWriter::with_defaults(dir.path().join("rejected.xlsx"));

    let mut table = SpecTable::new("Bad", ["a", "b"]);
    table.rows.push(vec![EnumCellValue::from(1)]);
    let err = writer
        .write_sheet(
            "Bad",
            &[SpecDataset::from_table(table)],
            &StyleRuleSet::new(),
            &SpecComposeOptions::default(),
        )
        .unwrap_err();

    assert!(matches!(err, XlsxExportError::Layout(_)));
    assert!(writer.report().is_empty());
}

#[test]
fn dataframes_feed_the_writer() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("frames.xlsx");

    let df_one = polars::df!("Column 1" => [1i64, 2], "Column 2" => ["x", "y"]).unwrap();
    let df_two = polars::df!("Column 1" => [0.5f64]).unwrap();
    let datasets = vec![SpecDataset::named(
        "Set 1",
        vec![
            table_from_dataframe("T One", &df_one).unwrap(),
            table_from_dataframe("T Two", &df_two).unwrap(),
        ],
    )];

    let mut writer = XlsxWriter::with_defaults(path.clone());
    writer
        .write_sheet(
            "Frames",
            &datasets,
            &derive_legacy_rules(),
            &SpecComposeOptions::default(),
        )
        .unwrap();
    writer.close().unwrap();

    let c_sheet_xml = read_zip_entry(&path, "xl/worksheets/sheet1.xml");
    assert!(c_sheet_xml.contains(r#"<mergeCell ref="A1:B1"/>"#));
    assert!(!c_sheet_xml.contains(r#"ref="C1:C1""#));
    assert_eq!(writer.report()[0].sheets[0].col_count, 3);
}
