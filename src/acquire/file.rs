//! Delimited file loading with encoding and delimiter auto-detection.
//!
//! Input files arrive from different export tools, so neither the byte
//! encoding nor the separator is assumed: encoding is sniffed with
//! chardet and decoded through encoding_rs, the delimiter is picked by
//! counting candidates in the header line. Cell types are inferred
//! per-cell; empty cells become missing values.

use std::fs;
use std::io;
use std::path::Path;

use serde_json::Map;
use tracing::{debug, error, info};

use crate::dataset::Dataset;
use crate::error::{LoadError, LoadResult};
use crate::storage::{self, RunContext, Stage};

/// Detect the encoding of raw bytes using chardet.
pub fn detect_encoding(bytes: &[u8]) -> String {
    let result = chardet::detect(bytes);
    let charset = result.0;

    // Normalize charset names
    match charset.to_lowercase().as_str() {
        "ascii" | "utf-8" | "utf8" => "utf-8".to_string(),
        "iso-8859-1" | "iso-8859-15" | "latin-1" | "latin1" => "iso-8859-1".to_string(),
        "windows-1252" | "cp1252" => "windows-1252".to_string(),
        _ => charset,
    }
}

/// Decode bytes to text using the detected encoding.
pub fn decode_content(bytes: &[u8], encoding: &str) -> String {
    match encoding.to_lowercase().as_str() {
        "iso-8859-1" | "latin-1" | "latin1" => {
            encoding_rs::ISO_8859_15.decode(bytes).0.into_owned()
        }
        "windows-1252" | "cp1252" => encoding_rs::WINDOWS_1252.decode(bytes).0.into_owned(),
        _ => String::from_utf8_lossy(bytes).into_owned(),
    }
}

/// Detect the delimiter by counting occurrences in the first line.
pub fn detect_delimiter(content: &str) -> char {
    let first_line = content.lines().next().unwrap_or("");

    let separators = [',', ';', '\t', '|'];
    let mut best_sep = ',';
    let mut best_count = 0;

    for &sep in &separators {
        let count = first_line.matches(sep).count();
        if count > best_count {
            best_count = count;
            best_sep = sep;
        }
    }

    best_sep
}

/// Load a delimited file into a [`Dataset`].
///
/// Failures are classified as `NotFound`, `EmptyInput`,
/// `MalformedInput`, or `Unknown`.
pub fn try_load_csv_file(path: &Path) -> LoadResult<Dataset> {
    let bytes = fs::read(path).map_err(|e| classify_io_error(path, e))?;
    if bytes.is_empty() {
        return Err(LoadError::EmptyInput(path.to_path_buf()));
    }

    let encoding = detect_encoding(&bytes);
    let content = decode_content(&bytes, &encoding);
    if content.trim().is_empty() {
        return Err(LoadError::EmptyInput(path.to_path_buf()));
    }

    let delimiter = detect_delimiter(&content);
    debug!(%encoding, delimiter = %format_delimiter(delimiter), "detected input format");

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter as u8)
        .trim(csv::Trim::All)
        .from_reader(content.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| LoadError::MalformedInput(e.to_string()))?
        .iter()
        .map(str::to_string)
        .collect();
    if headers.is_empty() || headers.iter().all(|h| h.is_empty()) {
        return Err(LoadError::EmptyInput(path.to_path_buf()));
    }

    let mut records = Vec::new();
    for result in reader.records() {
        let record = result.map_err(|e| LoadError::MalformedInput(e.to_string()))?;
        let mut row = Map::new();
        for (i, header) in headers.iter().enumerate() {
            let raw = record.get(i).unwrap_or("");
            row.insert(header.clone(), Dataset::infer_cell(raw));
        }
        records.push(row);
    }

    Ok(Dataset::new(headers, records))
}

/// Boundary operation: load, log, and on success persist the raw stage.
pub fn load_csv_file(path: &Path, run: Option<&RunContext>) -> Option<Dataset> {
    info!(path = %path.display(), "attempting to load data from csv");
    match try_load_csv_file(path) {
        Ok(dataset) => {
            let (rows, columns) = dataset.shape();
            info!(rows, columns, "successfully loaded data");
            debug!(headers = ?dataset.headers, "csv header");
            debug!("first rows:\n{}", dataset.head(5));

            if let Some(run) = run {
                storage::persist_stage(Some(&dataset), run, Stage::Raw);
            }
            Some(dataset)
        }
        Err(err) => {
            log_load_error(&err);
            None
        }
    }
}

fn classify_io_error(path: &Path, err: io::Error) -> LoadError {
    match err.kind() {
        io::ErrorKind::NotFound => LoadError::NotFound(path.to_path_buf()),
        _ => LoadError::Unknown(err.to_string()),
    }
}

fn log_load_error(err: &LoadError) {
    match err {
        LoadError::NotFound(path) => {
            error!(path = %path.display(), "file was not found, please check the path")
        }
        LoadError::EmptyInput(path) => error!(path = %path.display(), "input file is empty"),
        LoadError::MalformedInput(detail) => {
            error!(%detail, "could not parse input file, check file format")
        }
        LoadError::Unknown(detail) => {
            error!(%detail, "an unexpected error occurred while loading the file")
        }
    }
}

fn format_delimiter(d: char) -> String {
    match d {
        '\t' => "\\t".to_string(),
        c => c.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FILE_PREFIX;
    use serde_json::{json, Value};
    use std::io::Write;
    use tempfile::tempdir;

    fn write_file(dir: &Path, name: &str, content: &str) -> std::path::PathBuf {
        let path = dir.join(name);
        let mut f = fs::File::create(&path).unwrap();
        f.write_all(content.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_load_simple_csv() {
        let dir = tempdir().unwrap();
        let path = write_file(
            dir.path(),
            "churn.csv",
            "customerID,tenure,TotalCharges,Churn\n0001-A,12,29.85,Yes\n0002-B,3, ,No\n",
        );

        let ds = try_load_csv_file(&path).unwrap();
        assert_eq!(ds.shape(), (2, 4));
        assert_eq!(ds.records[0]["tenure"], json!(12));
        assert_eq!(ds.records[0]["TotalCharges"], json!(29.85));
        // Whitespace-only cell is inferred as missing.
        assert_eq!(ds.records[1]["TotalCharges"], Value::Null);
        assert_eq!(ds.records[1]["Churn"], json!("No"));
    }

    #[test]
    fn test_load_semicolon_delimited() {
        let dir = tempdir().unwrap();
        let path = write_file(dir.path(), "export.csv", "a;b\n1;x\n2;y\n");

        let ds = try_load_csv_file(&path).unwrap();
        assert_eq!(ds.headers, vec!["a", "b"]);
        assert_eq!(ds.records[1]["a"], json!(2));
    }

    #[test]
    fn test_not_found_classification() {
        let err = try_load_csv_file(Path::new("/definitely/not/here.csv")).unwrap_err();
        assert!(matches!(err, LoadError::NotFound(_)));
    }

    #[test]
    fn test_empty_file_classification() {
        let dir = tempdir().unwrap();
        let path = write_file(dir.path(), "empty.csv", "");
        let err = try_load_csv_file(&path).unwrap_err();
        assert!(matches!(err, LoadError::EmptyInput(_)));
    }

    #[test]
    fn test_malformed_file_classification() {
        let dir = tempdir().unwrap();
        // Second data row has an extra field.
        let path = write_file(dir.path(), "ragged.csv", "a,b\n1,2\n1,2,3\n");
        let err = try_load_csv_file(&path).unwrap_err();
        assert!(matches!(err, LoadError::MalformedInput(_)));
    }

    #[test]
    fn test_boundary_returns_absent_on_failure() {
        assert!(load_csv_file(Path::new("/definitely/not/here.csv"), None).is_none());
    }

    #[test]
    fn test_successful_load_persists_raw_stage() {
        let dir = tempdir().unwrap();
        let path = write_file(dir.path(), "churn.csv", "tenure,Churn\n12,Yes\n");
        let run = RunContext::create(dir.path()).unwrap();

        let ds = load_csv_file(&path, Some(&run)).unwrap();
        assert_eq!(ds.n_rows(), 1);

        let raw_dir = run.base().join("raw");
        let artifacts: Vec<_> = fs::read_dir(&raw_dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(artifacts.len(), 1);
        assert!(artifacts[0].starts_with(&format!("{FILE_PREFIX}_raw_")));
    }

    #[test]
    fn test_latin1_decoding() {
        // "Société" in ISO-8859-1
        let bytes: &[u8] = &[0x53, 0x6F, 0x63, 0x69, 0xE9, 0x74, 0xE9];
        let decoded = decode_content(bytes, "iso-8859-1");
        assert!(decoded.contains("Soci"));
    }

    #[test]
    fn test_detect_delimiter() {
        assert_eq!(detect_delimiter("a,b,c\n1,2,3"), ',');
        assert_eq!(detect_delimiter("a;b;c\n1;2;3"), ';');
        assert_eq!(detect_delimiter("a\tb\tc"), '\t');
        assert_eq!(detect_delimiter("a|b|c"), '|');
    }
}
