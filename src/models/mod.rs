use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Core business listing harvested from a Maps place page
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Business {
    pub name: String,
    pub address: String,
    pub website: String,
    pub phone_number: String,
    pub reviews_count: Option<u32>,
    pub reviews_average: Option<f64>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub state: String,
    pub city: String,
    pub google_maps_url: String,
    pub category: String,
}

/// A single customer review shown in a business's review list
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Review {
    pub reviewer_name: String,
    pub rating: Option<f64>,
    pub review_text: String,
    pub date: String,
    pub business_reply: String,
}

impl Review {
    /// Identity used to drop repeated reviews while scrolling.
    ///
    /// Only the first 100 characters of the text take part, so two long
    /// reviews from the same person on the same day sharing a prefix
    /// collapse into one.
    pub fn key(&self) -> ReviewKey {
        ReviewKey {
            name: self.reviewer_name.clone(),
            date: self.date.clone(),
            text_prefix: self.review_text.chars().take(REVIEW_KEY_PREFIX).collect(),
        }
    }
}

pub const REVIEW_KEY_PREFIX: usize = 100;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ReviewKey {
    pub name: String,
    pub date: String,
    pub text_prefix: String,
}

/// Where an image URL was found in the DOM
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ImageSource {
    #[serde(rename = "img-tag")]
    ImgTag,
    #[serde(rename = "background-image")]
    BackgroundImage,
    #[serde(rename = "nested-background-image")]
    NestedBackgroundImage,
}

impl fmt::Display for ImageSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self {
            ImageSource::ImgTag => "img-tag",
            ImageSource::BackgroundImage => "background-image",
            ImageSource::NestedBackgroundImage => "nested-background-image",
        };
        f.write_str(tag)
    }
}

/// Photo attached to a business listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Image {
    pub image_url: String,
    pub alt_text: String,
    pub original_url: String,
    pub width: String,
    pub height: String,
    pub source_type: ImageSource,
}

/// Outcome of visiting a business website during enrichment
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScrapeStatus {
    Success,
    FailedScrape,
    NoUrl,
    Error(String),
}

impl ScrapeStatus {
    /// Builds an `Error` status, keeping the first 100 characters of the message.
    pub fn error(message: impl fmt::Display) -> Self {
        ScrapeStatus::Error(message.to_string().chars().take(100).collect())
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "success" => Some(ScrapeStatus::Success),
            "failed_scrape" => Some(ScrapeStatus::FailedScrape),
            "no_url" => Some(ScrapeStatus::NoUrl),
            other => other
                .strip_prefix("error:")
                .map(|msg| ScrapeStatus::Error(msg.trim().to_string())),
        }
    }
}

impl fmt::Display for ScrapeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScrapeStatus::Success => f.write_str("success"),
            ScrapeStatus::FailedScrape => f.write_str("failed_scrape"),
            ScrapeStatus::NoUrl => f.write_str("no_url"),
            ScrapeStatus::Error(msg) => write!(f, "error: {}", msg),
        }
    }
}

/// Attributes derived from a business website by the language model
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SiteAttributes {
    #[serde(default)]
    pub sod_types: Vec<String>,
    #[serde(default)]
    pub service_area: String,
    #[serde(default)]
    pub delivery_info: String,
    #[serde(default)]
    pub installation_services: String,
    #[serde(default)]
    pub contact_email: String,
    #[serde(default)]
    pub certifications: String,
    #[serde(default)]
    pub brief_description: String,
}

/// Per-row result of the enrichment pass
#[derive(Debug, Clone)]
pub struct Enrichment {
    pub status: ScrapeStatus,
    pub content_length: usize,
    pub scraped_at: DateTime<Local>,
    pub attributes: SiteAttributes,
}

impl Enrichment {
    pub fn new(status: ScrapeStatus) -> Self {
        Self {
            status,
            content_length: 0,
            scraped_at: Local::now(),
            attributes: SiteAttributes::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_review_key_uses_text_prefix() {
        let long = "a".repeat(150);
        let first = Review {
            reviewer_name: "Dana".to_string(),
            date: "2 weeks ago".to_string(),
            review_text: format!("{}x", long),
            ..Default::default()
        };
        let second = Review {
            review_text: format!("{}y", long),
            ..first.clone()
        };
        assert_eq!(first.key(), second.key());
        assert_eq!(first.key().text_prefix.len(), REVIEW_KEY_PREFIX);
    }

    #[test]
    fn test_scrape_status_text() {
        assert_eq!(ScrapeStatus::Success.to_string(), "success");
        assert_eq!(ScrapeStatus::error("timeout").to_string(), "error: timeout");
        assert_eq!(ScrapeStatus::parse("no_url"), Some(ScrapeStatus::NoUrl));
        assert_eq!(
            ScrapeStatus::parse("error: boom"),
            Some(ScrapeStatus::Error("boom".to_string()))
        );
        assert_eq!(ScrapeStatus::parse(""), None);
    }

    #[test]
    fn test_scrape_status_error_truncates() {
        let status = ScrapeStatus::error("e".repeat(300));
        match status {
            ScrapeStatus::Error(msg) => assert_eq!(msg.len(), 100),
            other => panic!("unexpected status {:?}", other),
        }
    }

    #[test]
    fn test_image_source_tags() {
        assert_eq!(ImageSource::ImgTag.to_string(), "img-tag");
        assert_eq!(
            ImageSource::NestedBackgroundImage.to_string(),
            "nested-background-image"
        );
    }
}
