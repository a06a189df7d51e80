//! Shared test utilities and fixture generators

#![allow(dead_code)]

use polars::prelude::*;
use std::path::PathBuf;
use tempfile::TempDir;

/// Four rows with identical positive rates in both groups
pub fn create_balanced_dataframe() -> DataFrame {
    df! {
        "sex" => ["M", "M", "F", "F"],
        "hired" => [1i32, 0, 1, 0],
    }
    .unwrap()
}

/// Four rows where every F outcome is negative
pub fn create_skewed_dataframe() -> DataFrame {
    df! {
        "sex" => ["M", "M", "M", "F"],
        "hired" => [1i32, 1, 0, 0],
    }
    .unwrap()
}

/// M is 75% of rows with positive rate 0.8; F is 25% with positive rate 0.2
pub fn create_hiring_dataframe() -> DataFrame {
    let mut sex = vec!["M"; 15];
    sex.extend(vec!["F"; 5]);
    let mut hired = vec![1i32; 12];
    hired.extend(vec![0; 3]);
    hired.push(1);
    hired.extend(vec![0; 4]);

    df! {
        "sex" => sex,
        "hired" => hired,
    }
    .unwrap()
}

/// Strata (M,1):3, (F,1):1, (M,0):1, (F,0):1 with a row id for tracking
pub fn create_strata_dataframe() -> DataFrame {
    df! {
        "id" => [0i32, 1, 2, 3, 4, 5],
        "sex" => ["M", "M", "M", "F", "M", "F"],
        "hired" => [1i32, 1, 1, 1, 0, 0],
    }
    .unwrap()
}

/// Applicants with scores, for numeric adjustment and rank-and-quota tests
pub fn create_scored_dataframe() -> DataFrame {
    df! {
        "sex" => ["M", "M", "M", "M", "F", "F", "F", "F"],
        "score" => [0.9f64, 0.8, 0.7, 0.6, 0.5, 0.4, 0.3, 0.2],
        "skill" => [9.0f64, 8.0, 3.0, 2.0, 7.0, 6.0, 5.0, 1.0],
        "hired" => [1i32, 1, 1, 0, 1, 0, 0, 0],
    }
    .unwrap()
}

/// Create a temporary CSV file from a DataFrame
pub fn create_temp_csv(df: &mut DataFrame) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("test_data.csv");

    let mut file = std::fs::File::create(&path).unwrap();
    CsvWriter::new(&mut file).finish(df).unwrap();

    (temp_dir, path)
}

/// Create a temporary Parquet file from a DataFrame
pub fn create_temp_parquet(df: &mut DataFrame) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("test_data.parquet");

    let file = std::fs::File::create(&path).unwrap();
    ParquetWriter::new(file).finish(df).unwrap();

    (temp_dir, path)
}

/// Numeric view of a column, for assertions
pub fn f64_values(df: &DataFrame, name: &str) -> Vec<Option<f64>> {
    df.column(name)
        .unwrap()
        .cast(&DataType::Float64)
        .unwrap()
        .f64()
        .unwrap()
        .into_iter()
        .collect()
}

/// String view of a column, for assertions
pub fn str_values(df: &DataFrame, name: &str) -> Vec<String> {
    df.column(name)
        .unwrap()
        .str()
        .unwrap()
        .into_iter()
        .map(|v| v.unwrap_or_default().to_string())
        .collect()
}
