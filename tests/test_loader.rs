//! Tests for dataset loading and saving

mod common;

use biasbuster::io::{column_names, load_dataset, save_dataset};
use common::{create_hiring_dataframe, create_temp_csv, create_temp_parquet, f64_values};
use tempfile::TempDir;

#[test]
fn test_load_csv() {
    let mut df = create_hiring_dataframe();
    let (_temp_dir, path) = create_temp_csv(&mut df);

    let loaded = load_dataset(&path, 10000).unwrap();
    assert_eq!(loaded.height(), 20);
    assert_eq!(column_names(&loaded), vec!["sex", "hired"]);
}

#[test]
fn test_load_parquet() {
    let mut df = create_hiring_dataframe();
    let (_temp_dir, path) = create_temp_parquet(&mut df);

    let loaded = load_dataset(&path, 10000).unwrap();
    assert!(loaded.equals(&df));
}

#[test]
fn test_full_schema_scan() {
    let mut df = create_hiring_dataframe();
    let (_temp_dir, path) = create_temp_csv(&mut df);

    let loaded = load_dataset(&path, 0).unwrap();
    assert_eq!(f64_values(&loaded, "hired"), f64_values(&df, "hired"));
}

#[test]
fn test_unsupported_extension() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("data.xlsx");
    std::fs::write(&path, "sex,hired\n").unwrap();

    let err = load_dataset(&path, 10000).unwrap_err();
    assert!(err.to_string().contains("Unsupported file format"));
}

#[test]
fn test_missing_file_errors() {
    let temp_dir = TempDir::new().unwrap();
    assert!(load_dataset(&temp_dir.path().join("absent.csv"), 10000).is_err());
}

#[test]
fn test_save_and_reload_csv_and_parquet() {
    let temp_dir = TempDir::new().unwrap();
    for name in ["out.csv", "out.parquet"] {
        let path = temp_dir.path().join(name);
        let mut df = create_hiring_dataframe();
        save_dataset(&mut df, &path).unwrap();

        let loaded = load_dataset(&path, 10000).unwrap();
        assert_eq!(loaded.height(), df.height());
        assert_eq!(f64_values(&loaded, "hired"), f64_values(&df, "hired"));
    }
}

#[test]
fn test_save_unsupported_extension() {
    let temp_dir = TempDir::new().unwrap();
    let mut df = create_hiring_dataframe();
    let err = save_dataset(&mut df, &temp_dir.path().join("out.json")).unwrap_err();
    assert!(err.to_string().contains("Unsupported output format"));
}
