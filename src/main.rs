mod config;
mod data;
mod enrich;
mod models;
mod scrapers;
mod storage;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use config::{BrowserConfig, GeminiConfig, ProxyConfig};
use enrich::{EnrichOptions, EnrichmentPass, GeminiExtractor};
use scrapers::{parse_terms, ChromePage, HarvestOptions, MapsHarvester, SearchScope};
use std::path::{Path, PathBuf};
use std::time::Duration;
use storage::{OutputDir, Table};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const ENRICH_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

const DEFAULT_ENRICHED_OUTPUT: &str = "output/all_usa_sod_farms_comprehensive_data.csv";

#[derive(Parser, Debug)]
#[command(name = "sod-scout", about = "Collects sod farm listings from Google Maps")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Search Google Maps and harvest business listings
    Harvest(HarvestArgs),
    /// Visit business websites and extract sod details with Gemini
    Enrich(EnrichArgs),
}

#[derive(Args, Debug)]
struct HarvestArgs {
    /// Single search term, e.g. "sod farms in Austin, TX"
    #[arg(long)]
    search: Option<String>,

    /// States to search; all states when omitted
    #[arg(long, num_args = 1..)]
    states: Vec<String>,

    /// Search every city of the selected states instead of the state itself
    #[arg(long)]
    cities: bool,

    #[arg(long)]
    max_cities: Option<usize>,

    /// Newline-delimited search terms, used when no search or states are given
    #[arg(long, default_value = "search_terms.txt")]
    terms_file: PathBuf,

    #[arg(long)]
    headless: bool,

    #[arg(long, default_value = "output")]
    output_dir: PathBuf,

    /// Pause before searching a new state
    #[arg(long, default_value_t = 10)]
    state_pause_secs: u64,
}

#[derive(Args, Debug)]
struct EnrichArgs {
    /// CSV produced by `harvest`; rewritten with progress after every row
    #[arg(long)]
    input: PathBuf,

    #[arg(long, default_value = DEFAULT_ENRICHED_OUTPUT)]
    output: PathBuf,

    #[arg(long)]
    headless: bool,

    /// Stop after visiting this many websites
    #[arg(long)]
    limit: Option<usize>,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Harvest(args) => harvest(args),
        Command::Enrich(args) => enrich(args).await,
    }
}

fn resolve_scope(args: &HarvestArgs) -> Result<SearchScope> {
    if let Some(term) = args.search.as_ref().filter(|t| !t.trim().is_empty()) {
        return Ok(SearchScope::Term(term.trim().to_string()));
    }

    if !args.states.is_empty() {
        return Ok(if args.cities {
            SearchScope::Cities {
                states: args.states.clone(),
                max_cities: args.max_cities,
            }
        } else {
            SearchScope::States(args.states.clone())
        });
    }

    if args.cities {
        return Ok(SearchScope::Cities {
            states: data::states().map(str::to_string).collect(),
            max_cities: args.max_cities,
        });
    }

    if args.terms_file.exists() {
        let content = std::fs::read_to_string(&args.terms_file)
            .with_context(|| format!("Failed to read {}", args.terms_file.display()))?;
        let terms = parse_terms(&content);
        if !terms.is_empty() {
            info!("Loaded {} search terms from {}", terms.len(), args.terms_file.display());
            return Ok(SearchScope::Terms(terms));
        }
        warn!("{} has no search terms", args.terms_file.display());
    }

    Ok(SearchScope::all_states())
}

fn harvest(args: HarvestArgs) -> Result<()> {
    let scope = resolve_scope(&args)?;

    info!("Sod Scout - Google Maps harvester");
    match &scope {
        SearchScope::Term(term) => info!("Searching for '{}'", term),
        SearchScope::Terms(terms) => info!("Searching {} terms from file", terms.len()),
        SearchScope::States(states) => info!("Searching {} states", states.len()),
        SearchScope::Cities { states, max_cities } => {
            let stats = data::stats();
            info!(
                "City-wise search over {} states ({} cities known, {:.1} per state on average)",
                states.len(),
                stats.total_cities,
                stats.avg_cities_per_state
            );
            if let Some(max) = max_cities {
                info!("Limiting to {} cities per state", max);
            }
        }
    }

    let output = OutputDir::new(&args.output_dir);
    output.create()?;

    let config = BrowserConfig {
        headless: args.headless,
        proxy: ProxyConfig::from_env(),
        ..Default::default()
    };
    if let Some(proxy) = &config.proxy {
        info!("Using proxy {}", proxy.server());
    }
    let page = ChromePage::launch(&config)?;

    let options = HarvestOptions {
        state_pause: Duration::from_secs(args.state_pause_secs),
        ..Default::default()
    };
    let mut harvester = MapsHarvester::new(&page, &output, options);
    harvester.open()?;
    let summary = harvester.run(&scope)?;

    info!("Scraping complete!");
    info!("Total businesses: {}", summary.businesses);
    info!("Elapsed: {:.1} minutes", summary.elapsed.as_secs_f64() / 60.0);
    for search in summary.searches.iter().filter(|s| s.found > 0) {
        info!(
            "  {}: {}/{} scraped ({:.1}%), {} skipped",
            search.label,
            search.scraped,
            search.found,
            search.success_rate(),
            search.skipped
        );
    }
    info!("CSV saved to {}", summary.csv.display());
    info!("Excel saved to {}", summary.xlsx.display());

    Ok(())
}

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    Ok(())
}

async fn enrich(args: EnrichArgs) -> Result<()> {
    let gemini = GeminiConfig::from_env()
        .context("GEMINI_API_KEY (or GOOGLE_API_KEY) must be set for enrichment")?;
    info!("Using Gemini model {}", gemini.model);
    let extractor = GeminiExtractor::new(gemini)?;

    let mut table = Table::read_csv(&args.input)?;
    info!("Loaded {} businesses from {}", table.len(), args.input.display());
    ensure_parent(&args.output)?;

    let config = BrowserConfig {
        headless: args.headless,
        proxy: ProxyConfig::from_env(),
        user_agent: Some(ENRICH_USER_AGENT.to_string()),
        extra_headers: vec![
            ("Accept-Language".to_string(), "en-US,en;q=0.9".to_string()),
            (
                "Accept".to_string(),
                "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8".to_string(),
            ),
            ("DNT".to_string(), "1".to_string()),
        ],
        ..Default::default()
    };
    let page = ChromePage::launch(&config)?;

    let options = EnrichOptions {
        limit: args.limit,
        ..EnrichOptions::new(&args.input, &args.output)
    };
    let summary = EnrichmentPass::new(&page, &extractor, options)
        .run(&mut table)
        .await?;

    info!(
        "Visited {} websites, {}/{} rows enriched",
        summary.visited, summary.success, summary.rows
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(extra: &[&str]) -> HarvestArgs {
        let mut argv = vec!["sod-scout", "harvest", "--terms-file", "/nonexistent/terms.txt"];
        argv.extend_from_slice(extra);
        match Cli::parse_from(argv).command {
            Command::Harvest(args) => args,
            Command::Enrich(_) => panic!("expected harvest"),
        }
    }

    #[test]
    fn test_search_term_wins() {
        let scope = resolve_scope(&args(&["--search", "turf farms", "--states", "Texas"])).unwrap();
        assert_eq!(scope, SearchScope::Term("turf farms".to_string()));
    }

    #[test]
    fn test_states_with_cities() {
        let scope = resolve_scope(&args(&[
            "--states",
            "Texas",
            "Georgia",
            "--cities",
            "--max-cities",
            "3",
        ]))
        .unwrap();
        assert_eq!(
            scope,
            SearchScope::Cities {
                states: vec!["Texas".to_string(), "Georgia".to_string()],
                max_cities: Some(3),
            }
        );
    }

    #[test]
    fn test_terms_file_then_all_states() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("terms.txt");
        std::fs::write(&path, "# farms\nsod farms in Ohio\n\nturf supply Ohio\n").unwrap();

        let mut harvest_args = args(&[]);
        harvest_args.terms_file = path;
        assert_eq!(
            resolve_scope(&harvest_args).unwrap(),
            SearchScope::Terms(vec![
                "sod farms in Ohio".to_string(),
                "turf supply Ohio".to_string()
            ])
        );

        assert_eq!(resolve_scope(&args(&[])).unwrap(), SearchScope::all_states());
    }

    #[test]
    fn test_enrich_defaults() {
        let cli = Cli::parse_from(["sod-scout", "enrich", "--input", "output/farms.csv"]);
        match cli.command {
            Command::Enrich(args) => {
                assert_eq!(args.output, PathBuf::from(DEFAULT_ENRICHED_OUTPUT));
                assert_eq!(args.limit, None);
                assert!(!args.headless);
            }
            Command::Harvest(_) => panic!("expected enrich"),
        }
    }
}
