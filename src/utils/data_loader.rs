//! Loading traffic CSV files into feature matrices

use crate::error::{NetclassError, Result};
use crate::preprocessing::{ip_feature_names, parse_flow_duration, split_ip, IP_FEATURES};
use ndarray::Array2;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

/// How raw columns are turned into features
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadOptions {
    /// Address columns expanded into four octets plus an IPv6 flag
    pub ip_columns: Vec<String>,
    /// Column holding `"D days HH:MM:SS.ffffff"` durations
    pub duration_column: Option<String>,
    /// Column holding class labels, excluded from the features
    pub target_column: Option<String>,
    /// Columns ignored entirely
    pub drop_columns: Vec<String>,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            ip_columns: vec!["origin_ip".to_string(), "response_ip".to_string()],
            duration_column: Some("flow_duration".to_string()),
            target_column: None,
            drop_columns: Vec::new(),
        }
    }
}

impl LoadOptions {
    pub fn with_target(mut self, column: impl Into<String>) -> Self {
        self.target_column = Some(column.into());
        self
    }

    pub fn with_drop_columns(mut self, columns: Vec<String>) -> Self {
        self.drop_columns = columns;
        self
    }
}

/// Numeric features decoded from a traffic log, plus labels when a target
/// column was configured
#[derive(Debug, Clone)]
pub struct TrafficDataset {
    pub feature_names: Vec<String>,
    pub features: Array2<f64>,
    pub labels: Option<Vec<String>>,
}

impl TrafficDataset {
    /// Read a CSV file with a header row
    pub fn load_csv(path: impl AsRef<Path>, options: &LoadOptions) -> Result<Self> {
        let path = path.as_ref();
        let df = CsvReadOptions::default()
            .with_has_header(true)
            .with_infer_schema_length(Some(1000))
            .try_into_reader_with_file_path(Some(path.to_path_buf()))?
            .finish()?;

        info!(path = %path.display(), rows = df.height(), cols = df.width(), "Loaded CSV");
        Self::from_dataframe(&df, options)
    }

    /// Decode every column of `df` into features
    pub fn from_dataframe(df: &DataFrame, options: &LoadOptions) -> Result<Self> {
        let n_rows = df.height();
        let target = options.target_column.as_deref();

        let labels = match target {
            Some(column) => Some(string_values(df, column)?),
            None => None,
        };

        let mut feature_names = Vec::new();
        let mut columns: Vec<Vec<f64>> = Vec::new();

        for name in df.get_column_names() {
            let name = name.as_str();
            if Some(name) == target || options.drop_columns.iter().any(|c| c == name) {
                continue;
            }

            if options.ip_columns.iter().any(|c| c == name) {
                let decoded = string_values(df, name)?
                    .iter()
                    .map(|addr| split_ip(addr))
                    .collect::<Result<Vec<_>>>()?;
                for k in 0..IP_FEATURES {
                    columns.push(decoded.iter().map(|parts| parts[k]).collect());
                }
                feature_names.extend(ip_feature_names(name));
                debug!(column = name, "Expanded IP column");
            } else if options.duration_column.as_deref() == Some(name) {
                let seconds = string_values(df, name)?
                    .iter()
                    .map(|d| parse_flow_duration(d))
                    .collect::<Result<Vec<_>>>()?;
                columns.push(seconds);
                feature_names.push(name.to_string());
            } else {
                columns.push(numeric_values(df, name)?);
                feature_names.push(name.to_string());
            }
        }

        if columns.is_empty() {
            return Err(NetclassError::DataError(
                "no feature columns left after decoding".to_string(),
            ));
        }

        let features = Array2::from_shape_fn((n_rows, columns.len()), |(r, c)| columns[c][r]);
        Ok(Self {
            feature_names,
            features,
            labels,
        })
    }

    pub fn n_samples(&self) -> usize {
        self.features.nrows()
    }

    pub fn n_features(&self) -> usize {
        self.features.ncols()
    }
}

/// Read one label per line, skipping the header line.
pub fn load_labels(path: impl AsRef<Path>) -> Result<Vec<String>> {
    let content = std::fs::read_to_string(path.as_ref())?;
    Ok(content
        .lines()
        .skip(1)
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect())
}

fn string_values(df: &DataFrame, name: &str) -> Result<Vec<String>> {
    let column = df
        .column(name)
        .map_err(|_| NetclassError::FeatureNotFound(name.to_string()))?;
    let series = column.as_materialized_series().cast(&DataType::String)?;
    let values = series.str()?;
    values
        .into_iter()
        .enumerate()
        .map(|(row, v)| {
            v.map(str::to_string).ok_or_else(|| {
                NetclassError::DataError(format!("missing value in column '{}' at row {}", name, row))
            })
        })
        .collect()
}

fn numeric_values(df: &DataFrame, name: &str) -> Result<Vec<f64>> {
    let column = df
        .column(name)
        .map_err(|_| NetclassError::FeatureNotFound(name.to_string()))?;
    let series = column.as_materialized_series().cast(&DataType::Float64)?;
    let values = series.f64()?;
    values
        .into_iter()
        .enumerate()
        .map(|(row, v)| {
            v.ok_or_else(|| {
                NetclassError::DataError(format!(
                    "missing or non-numeric value in column '{}' at row {}",
                    name, row
                ))
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_traffic_csv() -> NamedTempFile {
        let mut file = tempfile::Builder::new()
            .suffix(".csv")
            .tempfile()
            .unwrap();
        writeln!(file, "origin_ip,response_ip,flow_duration,bytes,label").unwrap();
        writeln!(file, "192.168.0.1,fe80::1,0 days 00:00:01.500000,100,web").unwrap();
        writeln!(file, "10.0.0.2,10.0.0.3,0 days 00:00:02.000000,200,dns").unwrap();
        writeln!(file, "10.0.0.4,8.8.8.8,1 days 00:00:00.000000,300,web").unwrap();
        file
    }

    #[test]
    fn test_load_traffic_csv() {
        let file = create_traffic_csv();
        let options = LoadOptions::default().with_target("label");
        let dataset = TrafficDataset::load_csv(file.path(), &options).unwrap();

        assert_eq!(dataset.n_samples(), 3);
        assert_eq!(dataset.n_features(), 12);
        assert_eq!(dataset.feature_names[0], "origin_ip_0");
        assert_eq!(dataset.feature_names[9], "response_ip_ipv6");
        assert_eq!(dataset.feature_names[10], "flow_duration");

        assert_eq!(dataset.features[[0, 0]], 192.0);
        assert_eq!(dataset.features[[0, 9]], 1.0);
        assert_eq!(dataset.features[[0, 10]], 1.5);
        assert_eq!(dataset.features[[2, 10]], 86_400.0);
        assert_eq!(dataset.features[[1, 11]], 200.0);
        assert_eq!(dataset.labels.unwrap(), vec!["web", "dns", "web"]);
    }

    #[test]
    fn test_missing_target_column() {
        let file = create_traffic_csv();
        let options = LoadOptions::default().with_target("class");
        assert!(matches!(
            TrafficDataset::load_csv(file.path(), &options),
            Err(NetclassError::FeatureNotFound(_))
        ));
    }

    #[test]
    fn test_drop_columns() {
        let file = create_traffic_csv();
        let options = LoadOptions::default()
            .with_target("label")
            .with_drop_columns(vec!["origin_ip".to_string(), "response_ip".to_string()]);
        let dataset = TrafficDataset::load_csv(file.path(), &options).unwrap();
        assert_eq!(dataset.feature_names, vec!["flow_duration", "bytes"]);
    }

    #[test]
    fn test_load_labels_skips_header() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "label").unwrap();
        writeln!(file, "web").unwrap();
        writeln!(file, " dns ").unwrap();
        writeln!(file).unwrap();
        assert_eq!(load_labels(file.path()).unwrap(), vec!["web", "dns"]);
    }
}
