//! Reads the two local source extracts into raw tables.
//!
//! Downloading the files is somebody else's job; this module only checks
//! that they exist, decodes them and splits them into header + rows.

use std::path::Path;

use encoding_rs::WINDOWS_1252;
use tokio::fs;
use tracing::{debug, info, warn};

use crate::error::{EtlError, Result};

/// A parsed delimited file. Every row has exactly `headers.len()` cells.
#[derive(Debug, Clone, PartialEq)]
pub struct RawTable {
    pub name: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    pub fn new(name: impl Into<String>, headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        let width = headers.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, String::new());
                row
            })
            .collect();
        Self {
            name: name.into(),
            headers,
            rows,
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Index of the first candidate that names a header of this table.
    pub fn find_column(&self, candidates: &[String]) -> Option<usize> {
        candidates
            .iter()
            .find_map(|candidate| self.headers.iter().position(|h| h == candidate))
    }
}

/// The two extracts the warehouse is built from.
#[derive(Debug, Clone)]
pub struct SourceTables {
    pub surveillance: RawTable,
    pub geda: RawTable,
}

pub async fn extract_sources(diabetes_file: &Path, geda_file: &Path) -> Result<SourceTables> {
    info!(path = %diabetes_file.display(), "reading diabetes surveillance extract (TSV)");
    let surveillance = read_table(diabetes_file, b'\t').await?;
    info!(path = %geda_file.display(), "reading GEDA extract (CSV)");
    let geda = read_table(geda_file, b',').await?;
    Ok(SourceTables { surveillance, geda })
}

pub async fn read_table(path: &Path, delimiter: u8) -> Result<RawTable> {
    let bytes = match fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(EtlError::MissingInput {
                path: path.to_path_buf(),
            })
        }
        Err(e) => return Err(e.into()),
    };

    if bytes.is_empty() {
        return Err(EtlError::MissingInput {
            path: path.to_path_buf(),
        });
    }

    let content = decode(&bytes, path);
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string());

    let table = parse_table(&name, &content, delimiter).map_err(|source| EtlError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    if table.is_empty() {
        return Err(EtlError::EmptyInput {
            path: path.to_path_buf(),
        });
    }

    info!(
        table = %table.name,
        rows = table.len(),
        columns = table.headers.len(),
        "extract loaded"
    );
    Ok(table)
}

/// UTF-8 first; the RKI exports occasionally come as Latin-1.
fn decode(bytes: &[u8], path: &Path) -> String {
    match std::str::from_utf8(bytes) {
        Ok(text) => text.to_string(),
        Err(_) => {
            warn!(path = %path.display(), "file is not valid UTF-8, decoding as Windows-1252");
            let (text, _, _) = WINDOWS_1252.decode(bytes);
            text.into_owned()
        }
    }
}

pub fn parse_table(name: &str, content: &str, delimiter: u8) -> Result<RawTable, csv::Error> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(content.as_bytes());

    let headers: Vec<String> = reader.headers()?.iter().map(|h| h.to_string()).collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        if record.iter().all(|cell| cell.is_empty()) {
            continue;
        }
        rows.push(record.iter().map(|cell| cell.to_string()).collect());
    }

    debug!(table = name, rows = rows.len(), "parsed delimited content");
    Ok(RawTable::new(name, headers, rows))
}
