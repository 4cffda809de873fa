use crate::models::Business;
use anyhow::{Context, Result};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use rust_xlsxwriter::{Format, Workbook};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Everything except unreserved characters gets percent-encoded
const FILENAME_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Turn a business name into something safe to embed in a file name
pub fn sanitize_filename(name: &str) -> String {
    let underscored = name.trim().replace(' ', "_");
    utf8_percent_encode(&underscored, FILENAME_SET).to_string()
}

/// Layout of the output directory
#[derive(Debug, Clone)]
pub struct OutputDir {
    root: PathBuf,
}

impl OutputDir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn create(&self) -> Result<()> {
        for dir in [self.root.clone(), self.reviews_dir(), self.images_dir()] {
            fs::create_dir_all(&dir)
                .with_context(|| format!("Failed to create {}", dir.display()))?;
        }
        Ok(())
    }

    pub fn reviews_dir(&self) -> PathBuf {
        self.root.join("reviews")
    }

    pub fn images_dir(&self) -> PathBuf {
        self.root.join("images")
    }

    pub fn reviews_file(&self, business_name: &str) -> PathBuf {
        self.reviews_dir()
            .join(format!("reviews_{}.csv", sanitize_filename(business_name)))
    }

    pub fn images_file(&self, business_name: &str) -> PathBuf {
        self.images_dir()
            .join(format!("images_{}.csv", sanitize_filename(business_name)))
    }

    pub fn csv(&self, stem: &str) -> PathBuf {
        self.root.join(format!("{}.csv", stem))
    }

    pub fn xlsx(&self, stem: &str) -> PathBuf {
        self.root.join(format!("{}.xlsx", stem))
    }
}

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    Ok(())
}

/// Write `records` with a header row, replacing any existing file
pub fn write_csv<T: Serialize>(path: &Path, records: &[T]) -> Result<()> {
    ensure_parent(path)?;
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to open {} for writing", path.display()))?;
    for record in records {
        writer
            .serialize(record)
            .with_context(|| format!("Failed to write row to {}", path.display()))?;
    }
    writer.flush()?;
    debug!("Wrote {} rows to {}", records.len(), path.display());
    Ok(())
}

pub fn read_csv<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("Failed to open {}", path.display()))?;
    reader
        .deserialize()
        .collect::<std::result::Result<Vec<T>, _>>()
        .with_context(|| format!("Failed to parse {}", path.display()))
}

/// Write the business table as a single-sheet workbook
pub fn write_businesses_xlsx(path: &Path, businesses: &[Business]) -> Result<()> {
    ensure_parent(path)?;
    let mut workbook = Workbook::new();
    let bold = Format::new().set_bold();
    let sheet = workbook.add_worksheet();

    for (col, header) in Business::COLUMNS.iter().enumerate() {
        sheet.write_string_with_format(0, col as u16, *header, &bold)?;
    }

    for (idx, business) in businesses.iter().enumerate() {
        let row = idx as u32 + 1;
        for (col, cell) in business.cells().into_iter().enumerate() {
            let col = col as u16;
            match cell {
                Cell::Text(text) => {
                    sheet.write_string(row, col, text)?;
                }
                Cell::Number(n) => {
                    sheet.write_number(row, col, n)?;
                }
                Cell::Empty => {}
            }
        }
    }

    workbook
        .save(path)
        .with_context(|| format!("Failed to save {}", path.display()))?;
    debug!("Wrote {} rows to {}", businesses.len(), path.display());
    Ok(())
}

/// Spreadsheet cell value
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Number(f64),
    Empty,
}

impl Business {
    pub const COLUMNS: [&'static str; 12] = [
        "name",
        "address",
        "website",
        "phone_number",
        "reviews_count",
        "reviews_average",
        "latitude",
        "longitude",
        "state",
        "city",
        "google_maps_url",
        "category",
    ];

    pub fn cells(&self) -> Vec<Cell> {
        let text = |s: &str| Cell::Text(s.to_string());
        let num = |n: Option<f64>| n.map(Cell::Number).unwrap_or(Cell::Empty);

        vec![
            text(&self.name),
            text(&self.address),
            text(&self.website),
            text(&self.phone_number),
            num(self.reviews_count.map(f64::from)),
            num(self.reviews_average),
            num(self.latitude),
            num(self.longitude),
            text(&self.state),
            text(&self.city),
            text(&self.google_maps_url),
            text(&self.category),
        ]
    }
}

/// Loosely typed CSV table, edited in place by the enrichment pass.
///
/// Columns the pass does not know about are carried through untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(headers: Vec<String>) -> Self {
        Self {
            headers,
            rows: Vec::new(),
        }
    }

    pub fn read_csv(path: &Path) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_path(path)
            .with_context(|| format!("Failed to open {}", path.display()))?;

        let mut headers: Vec<String> = reader
            .headers()
            .with_context(|| format!("Failed to read header of {}", path.display()))?
            .iter()
            .map(str::to_string)
            .collect();

        let mut rows: Vec<Vec<String>> = Vec::new();
        for (idx, record) in reader.records().enumerate() {
            let record = record.with_context(|| format!("Bad row in {}", path.display()))?;
            let mut row: Vec<String> = record.iter().map(str::to_string).collect();
            if row.len() > headers.len() {
                warn!(
                    "Row {} of {} has {} fields but the header has {}; keeping the extras",
                    idx + 1,
                    path.display(),
                    row.len(),
                    headers.len()
                );
                while headers.len() < row.len() {
                    headers.push(format!("column_{}", headers.len() + 1));
                }
                for earlier in &mut rows {
                    earlier.resize(headers.len(), String::new());
                }
            }
            row.resize(headers.len(), String::new());
            rows.push(row);
        }

        Ok(Self { headers, rows })
    }

    pub fn write_csv(&self, path: &Path) -> Result<()> {
        ensure_parent(path)?;
        let mut writer = csv::Writer::from_path(path)
            .with_context(|| format!("Failed to open {} for writing", path.display()))?;
        writer.write_record(&self.headers)?;
        for row in &self.rows {
            writer.write_record(row)?;
        }
        writer.flush()?;
        Ok(())
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn push_row(&mut self, mut row: Vec<String>) {
        row.resize(self.headers.len(), String::new());
        self.rows.push(row);
    }

    pub fn column(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Add `name` with `default` in every row unless it already exists
    pub fn ensure_column(&mut self, name: &str, default: &str) -> usize {
        if let Some(idx) = self.column(name) {
            return idx;
        }
        self.headers.push(name.to_string());
        for row in &mut self.rows {
            row.push(default.to_string());
        }
        self.headers.len() - 1
    }

    /// Cell value, empty when the column does not exist
    pub fn get(&self, row: usize, name: &str) -> &str {
        self.column(name)
            .and_then(|col| self.rows.get(row).and_then(|r| r.get(col)))
            .map(String::as_str)
            .unwrap_or("")
    }

    pub fn set(&mut self, row: usize, name: &str, value: impl Into<String>) {
        let col = self.ensure_column(name, "");
        if let Some(cells) = self.rows.get_mut(row) {
            cells[col] = value.into();
        }
    }

    pub fn count_where(&self, name: &str, pred: impl Fn(&str) -> bool) -> usize {
        (0..self.rows.len()).filter(|&i| pred(self.get(i, name))).count()
    }
}
