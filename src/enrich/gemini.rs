use crate::config::GeminiConfig;
use crate::enrich::AttributeExtractor;
use crate::models::SiteAttributes;
use crate::scrapers::cached_regex;
use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use regex::Regex;
use reqwest::Client;
use serde_json::{json, Value};
use std::sync::OnceLock;
use std::time::Duration;
use tracing::{debug, error};

const API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";

const DESCRIPTION_LIMIT: usize = 200;

const PROMPT_TEMPLATE: &str = r#"You are an expert assistant that extracts business data from sod farm and landscaping company websites.

Analyze the content carefully and extract all available information for each field below.

Common sod types include:
- Bermuda (varieties such as Tifway 419, Celebration, TifTuf, Tifton)
- Zoysia (Emerald, Meyer, Palisades, Zeon)
- St. Augustine (Palmetto, Floratam, Raleigh)
- Centipede
- Fescue (Tall Fescue, Fine Fescue)
- Buffalo grass
- Bahia

Service area indicators: "serving", "delivery area", "we serve", city or county names, radius mentions
Delivery info: "we deliver", "delivery available", "pickup only", "free delivery"
Installation: "installation available", "we install", "professional installation"
Certifications: "certified", "licensed", "accredited", "member of", professional associations
Contact: email addresses in any format

Below is content from: {url}

[BEGIN WEBSITE CONTENT]
{content}
[END WEBSITE CONTENT]

Return ONLY valid JSON in exactly this format:

{
  "sod_types": ["Bermuda", "Zoysia"],
  "service_area": "Local/Regional or specific areas mentioned",
  "delivery_info": "Delivery available/Pickup only/specific delivery details",
  "installation_services": "Installation available/Not mentioned/specific details",
  "contact_email": "email@example.com or empty string if not found",
  "certifications": "Any certifications mentioned or empty string",
  "brief_description": "First meaningful paragraph about the business"
}

Rules:
- If a field is not found, use an empty string "" or an empty array []
- For sod_types, include specific variety names when mentioned
- For service_area, mention specific cities or regions if listed
- Keep brief_description under 200 characters
- Extract actual email addresses, not "contact us" text"#;

/// Variety patterns used when the model answer is not parseable JSON
const SOD_PATTERNS: &[&str] = &[
    r"\b(bermuda|tifway|celebration|tiftuf|tifton)\b",
    r"\b(zoysia|emerald|meyer|palisades|zeon)\b",
    r"\b(st\.?\s*augustine|palmetto|floratam|raleigh)\b",
    r"\b(centipede)\b",
    r"\b(fescue|tall\s*fescue|fine\s*fescue)\b",
    r"\b(buffalo\s*grass)\b",
    r"\b(bahia)\b",
];

pub fn build_prompt(content: &str, url: &str) -> String {
    PROMPT_TEMPLATE
        .replace("{url}", url)
        .replace("{content}", content)
}

/// Reads business websites through the Gemini `generateContent` endpoint
pub struct GeminiExtractor {
    client: Client,
    config: GeminiConfig,
}

impl GeminiExtractor {
    pub fn new(config: GeminiConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client, config })
    }

    fn endpoint(&self) -> String {
        format!("{}/{}:generateContent", API_BASE, self.config.model)
    }
}

#[async_trait]
impl AttributeExtractor for GeminiExtractor {
    async fn extract(&self, content: &str, url: &str) -> Result<SiteAttributes> {
        let payload = json!({
            "contents": [{
                "role": "user",
                "parts": [{"text": build_prompt(content, url)}]
            }]
        });

        let response = self
            .client
            .post(self.endpoint())
            .query(&[("key", self.config.api_key.as_str())])
            .json(&payload)
            .send()
            .await
            .context("Gemini request failed")?;

        let status = response.status();
        let body: Value = response
            .json()
            .await
            .context("Gemini returned a non-JSON body")?;

        if !status.is_success() {
            let message = body
                .pointer("/error/message")
                .and_then(Value::as_str)
                .unwrap_or("no error message");
            bail!("Gemini returned {}: {}", status, message);
        }

        let text = body
            .pointer("/candidates/0/content/parts/0/text")
            .and_then(Value::as_str)
            .ok_or_else(|| anyhow!("Gemini response contained no text"))?;
        debug!("Gemini answered {} characters for {}", text.len(), url);

        Ok(parse_model_response(text, url))
    }

    fn name(&self) -> &str {
        "gemini"
    }
}

fn strip_fences(raw: &str) -> &str {
    let text = raw.trim();
    let text = text.strip_prefix("```json").unwrap_or(text);
    let text = text.strip_prefix("```").unwrap_or(text);
    let text = text.strip_suffix("```").unwrap_or(text);
    text.trim()
}

fn clean_string(value: &Value, field: &str) -> String {
    value
        .get(field)
        .and_then(Value::as_str)
        .map(|s| s.trim().to_string())
        .unwrap_or_default()
}

fn clean_attributes(value: &Value) -> SiteAttributes {
    let sod_types = value
        .get("sod_types")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    SiteAttributes {
        sod_types,
        service_area: clean_string(value, "service_area"),
        delivery_info: clean_string(value, "delivery_info"),
        installation_services: clean_string(value, "installation_services"),
        contact_email: clean_string(value, "contact_email"),
        certifications: clean_string(value, "certifications"),
        brief_description: clean_string(value, "brief_description")
            .chars()
            .take(DESCRIPTION_LIMIT)
            .collect(),
    }
}

/// Turn the model's answer into attributes.
///
/// Code fences and chatter around the JSON object are ignored. When no
/// JSON can be read, only sod types found by keyword survive.
pub fn parse_model_response(raw: &str, url: &str) -> SiteAttributes {
    static OBJECT: OnceLock<Regex> = OnceLock::new();

    let text = strip_fences(raw);
    let candidate = cached_regex(&OBJECT, r"\{[\s\S]*\}")
        .find(text)
        .map(|m| m.as_str())
        .unwrap_or(text);

    match serde_json::from_str::<Value>(candidate) {
        Ok(value) => clean_attributes(&value),
        Err(e) => {
            error!("JSON parsing error for {}: {}", url, e);
            let preview: String = raw.chars().take(500).collect();
            error!("Raw response: {}...", preview);
            SiteAttributes {
                sod_types: fallback_sod_types(raw),
                ..Default::default()
            }
        }
    }
}

fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut after_letter = false;
    for c in text.chars() {
        if c.is_alphabetic() {
            if after_letter {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            after_letter = true;
        } else {
            out.push(c);
            after_letter = false;
        }
    }
    out
}

/// Sod varieties mentioned anywhere in `text`, title-cased, first mention first
pub fn fallback_sod_types(text: &str) -> Vec<String> {
    static PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();
    let patterns = PATTERNS.get_or_init(|| {
        SOD_PATTERNS
            .iter()
            .map(|p| Regex::new(p).expect("static regex"))
            .collect()
    });

    let lower = text.to_lowercase();
    let mut found: Vec<String> = Vec::new();
    for pattern in patterns {
        for caps in pattern.captures_iter(&lower) {
            let name = title_case(&caps[1]);
            if !found.contains(&name) {
                found.push(name);
            }
        }
    }
    found
}
