//! Offline pass that visits each business website and asks a language
//! model for sod-specific details.

pub mod gemini;

pub use gemini::GeminiExtractor;

use crate::models::{Enrichment, ScrapeStatus, SiteAttributes};
use crate::scrapers::traits::PageDriver;
use crate::scrapers::website;
use crate::storage::Table;
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Local;
use rand::Rng;
use std::ops::RangeInclusive;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{error, info, warn};

/// Turns website text into structured attributes
#[async_trait]
pub trait AttributeExtractor: Send + Sync {
    async fn extract(&self, content: &str, url: &str) -> Result<SiteAttributes>;

    fn name(&self) -> &str;
}

/// Columns the pass adds to the business table when missing
pub const ENRICH_COLUMNS: [&str; 10] = [
    "sod_types",
    "service_area",
    "delivery_info",
    "installation_services",
    "contact_email",
    "certifications",
    "brief_description",
    "scrape_status",
    "scrape_timestamp",
    "content_length",
];

pub fn prepare_columns(table: &mut Table) {
    for column in ENRICH_COLUMNS {
        let default = if column == "content_length" { "0" } else { "" };
        table.ensure_column(column, default);
    }
}

fn sod_types_in(cell: &str) -> Option<Vec<String>> {
    serde_json::from_str(cell).ok()
}

/// `false` only for rows that already hold a successful result with
/// at least one sod type and a description
pub fn needs_processing(table: &Table, row: usize) -> bool {
    if ScrapeStatus::parse(table.get(row, "scrape_status")) != Some(ScrapeStatus::Success) {
        return true;
    }
    let description = table.get(row, "brief_description").trim();
    if description.is_empty() || description == "null" {
        return true;
    }
    match sod_types_in(table.get(row, "sod_types")) {
        Some(types) => types.is_empty(),
        None => true,
    }
}

/// Write one row's outcome into the table
pub fn record(table: &mut Table, row: usize, enrichment: &Enrichment) {
    table.set(row, "scrape_status", enrichment.status.to_string());
    table.set(
        row,
        "scrape_timestamp",
        enrichment.scraped_at.format("%Y-%m-%d %H:%M:%S").to_string(),
    );
    if enrichment.content_length > 0 {
        table.set(row, "content_length", enrichment.content_length.to_string());
    }

    if enrichment.status != ScrapeStatus::Success {
        return;
    }

    let attrs = &enrichment.attributes;
    let sod_types = serde_json::to_string(&attrs.sod_types).unwrap_or_else(|_| "[]".to_string());
    table.set(row, "sod_types", sod_types);
    table.set(row, "service_area", attrs.service_area.as_str());
    table.set(row, "delivery_info", attrs.delivery_info.as_str());
    table.set(row, "installation_services", attrs.installation_services.as_str());
    table.set(row, "contact_email", attrs.contact_email.as_str());
    table.set(row, "certifications", attrs.certifications.as_str());
    table.set(row, "brief_description", attrs.brief_description.as_str());
}

#[derive(Debug, Clone)]
pub struct EnrichOptions {
    /// Rewritten after every row
    pub progress: PathBuf,
    /// Final copy of the table
    pub output: PathBuf,
    /// Stop after this many rows have been visited
    pub limit: Option<usize>,
    pub delay_ms: RangeInclusive<u64>,
}

impl EnrichOptions {
    pub fn new(progress: impl Into<PathBuf>, output: impl Into<PathBuf>) -> Self {
        Self {
            progress: progress.into(),
            output: output.into(),
            limit: None,
            delay_ms: 3000..=7000,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnrichSummary {
    pub rows: usize,
    pub visited: usize,
    pub success: usize,
    pub sod_types_found: usize,
    pub with_email: usize,
    pub with_description: usize,
}

impl EnrichSummary {
    pub fn from_table(table: &Table, visited: usize) -> Self {
        let sod_types_found = (0..table.len())
            .filter_map(|row| sod_types_in(table.get(row, "sod_types")))
            .map(|types| types.len())
            .sum();

        Self {
            rows: table.len(),
            visited,
            success: table.count_where("scrape_status", |s| s == "success"),
            sod_types_found,
            with_email: table.count_where("contact_email", |s| !s.trim().is_empty()),
            with_description: table.count_where("brief_description", |s| !s.trim().is_empty()),
        }
    }
}

/// Visits the website of every row in a business table
pub struct EnrichmentPass<'a, P: PageDriver + ?Sized, E: AttributeExtractor + ?Sized> {
    page: &'a P,
    extractor: &'a E,
    options: EnrichOptions,
}

impl<'a, P: PageDriver + ?Sized, E: AttributeExtractor + ?Sized> EnrichmentPass<'a, P, E> {
    pub fn new(page: &'a P, extractor: &'a E, options: EnrichOptions) -> Self {
        Self {
            page,
            extractor,
            options,
        }
    }

    pub async fn run(&self, table: &mut Table) -> Result<EnrichSummary> {
        prepare_columns(table);
        let total = table.len();
        let mut visited = 0;

        info!(
            "Enriching {} rows with {}",
            total,
            self.extractor.name()
        );

        for row in 0..total {
            if let Some(limit) = self.options.limit {
                if visited >= limit {
                    info!("Reached limit of {} rows", limit);
                    break;
                }
            }

            let url = match website::normalize_url(table.get(row, "website")) {
                Some(url) => url,
                None => {
                    warn!("Row {}: No valid URL found", row);
                    record(table, row, &Enrichment::new(ScrapeStatus::NoUrl));
                    continue;
                }
            };

            if !needs_processing(table, row) {
                info!("Row {}: Already processed with complete data, skipping {}", row, url);
                continue;
            }

            info!("Processing row {}/{}: {}", row, total.saturating_sub(1), url);
            let enrichment = self.enrich(&url).await;
            if enrichment.status == ScrapeStatus::Success {
                let attrs = &enrichment.attributes;
                info!(
                    "Row {}: {} sod types, service area: {}, email: {}",
                    row,
                    attrs.sod_types.len(),
                    attrs.service_area.chars().take(50).collect::<String>(),
                    attrs.contact_email
                );
            }
            record(table, row, &enrichment);
            visited += 1;

            if let Err(e) = table.write_csv(&self.options.progress) {
                error!("Failed to save progress: {:#}", e);
            }

            let delay = rand::thread_rng().gen_range(self.options.delay_ms.clone());
            if delay > 0 {
                info!("Waiting {:.1} seconds before next request...", delay as f64 / 1000.0);
                tokio::time::sleep(Duration::from_millis(delay)).await;
            }
        }

        table
            .write_csv(&self.options.output)
            .with_context(|| format!("Failed to save {}", self.options.output.display()))?;
        info!("Processing complete, results saved to {}", self.options.output.display());

        let summary = EnrichSummary::from_table(table, visited);
        log_summary(table, &summary);
        Ok(summary)
    }

    async fn enrich(&self, url: &str) -> Enrichment {
        let content = match website::fetch_site_text(self.page, url) {
            Some(content) => content,
            None => {
                warn!("Failed to scrape content from {}", url);
                return Enrichment::new(ScrapeStatus::FailedScrape);
            }
        };

        let content_length = content.chars().count();
        let (status, attributes) = match self.extractor.extract(&content, url).await {
            Ok(attributes) => (ScrapeStatus::Success, attributes),
            Err(e) => {
                error!("Error processing {}: {:#}", url, e);
                (ScrapeStatus::error(format!("{:#}", e)), SiteAttributes::default())
            }
        };

        Enrichment {
            status,
            content_length,
            scraped_at: Local::now(),
            attributes,
        }
    }
}

fn log_summary(table: &Table, summary: &EnrichSummary) {
    info!(
        "Summary: {}/{} websites successfully processed",
        summary.success, summary.rows
    );
    info!("Total sod types found: {}", summary.sod_types_found);
    info!("Businesses with email: {}", summary.with_email);
    info!("Businesses with description: {}", summary.with_description);

    let samples = (0..table.len())
        .filter(|&row| table.get(row, "scrape_status") == "success")
        .filter_map(|row| {
            let types = sod_types_in(table.get(row, "sod_types"))?;
            (!types.is_empty()).then_some((row, types))
        })
        .take(5);

    for (row, types) in samples {
        info!("Row {} ({}):", row, table.get(row, "website"));
        info!("  Sod Types: {:?}", types);
        info!("  Service Area: {}", table.get(row, "service_area"));
        info!("  Delivery: {}", table.get(row, "delivery_info"));
        info!("  Email: {}", table.get(row, "contact_email"));
        info!(
            "  Description: {}",
            table
                .get(row, "brief_description")
                .chars()
                .take(100)
                .collect::<String>()
        );
    }
}
