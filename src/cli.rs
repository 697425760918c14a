use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use localfluence::api::PlacesClient;
use localfluence::prompts::{BuiltinTemplates, FileTemplates, TemplateSource};
use localfluence::{BusinessLookup, BusinessQuery, CandidatePolicy, Config, ExtractionMode, Pipeline};

const EXAMPLES: &str = "Examples:
  localfluence run \"Hamilton's\" \"174 E Magnolia Ave, Auburn, AL 36830, USA\"
  localfluence run \"Starbucks\" \"123 Main St, New York, NY 10001\" --mode full
  localfluence lookup \"Hamilton's\" \"174 E Magnolia Ave, Auburn, AL 36830, USA\"";

#[derive(Debug, Parser)]
#[command(name = "localfluence", version)]
#[command(about = "Business to Veo 3 prompt generator", after_help = EXAMPLES)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Resolve the business, scrape its website and print a VeoPrompt.
    Run {
        /// Name of the business
        business_name: String,
        /// Address of the business
        address: String,
        /// Extraction mode: full, influencer or ai_video
        #[arg(long, default_value = "ai_video")]
        mode: ExtractionMode,
        /// JSON prompt template store; built-in prompts when omitted
        #[arg(long)]
        prompts: Option<PathBuf>,
        /// Candidate policy: first or exact-name
        #[arg(long, default_value = "first")]
        candidate: CandidatePolicy,
    },
    /// Resolve the business and print its place details.
    Lookup {
        business_name: String,
        address: String,
        #[arg(long, default_value = "first")]
        candidate: CandidatePolicy,
    },
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn query_from_args(business_name: &str, address: &str) -> Result<BusinessQuery> {
    if business_name.trim().is_empty() || address.trim().is_empty() {
        bail!("Missing required arguments: business_name and address");
    }
    Ok(BusinessQuery::new(business_name.trim(), address.trim()))
}

fn http_client() -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .cookie_store(true)
        .build()
        .context("Failed to build HTTP client")
}

async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Run {
            business_name,
            address,
            mode,
            prompts,
            candidate,
        } => {
            let query = query_from_args(&business_name, &address)?;
            let config = Config::load().context("configuration is incomplete")?;
            let templates: Box<dyn TemplateSource> = match prompts {
                Some(path) => Box::new(FileTemplates::load(&path).await?),
                None => Box::new(BuiltinTemplates),
            };

            let pipeline = Pipeline::from_config(&config, http_client()?, templates, candidate)
                .with_mode(mode);
            let mut stdout = std::io::stdout().lock();
            pipeline.run(&query, &mut stdout).await?;
        }
        Commands::Lookup {
            business_name,
            address,
            candidate,
        } => {
            let query = query_from_args(&business_name, &address)?;
            let config = Config::load().context("configuration is incomplete")?;
            let places = PlacesClient::new(
                http_client()?,
                &config.endpoints.places_base,
                &config.credentials.places_api_key,
            )
            .with_policy(candidate);

            let Some(business) = places.find_one(&query).await? else {
                bail!("Business not found: {}", query);
            };
            println!("Found business details:");
            println!("Name: {}", business.name);
            println!("Address: {}", business.formatted_address);
            println!("Website: {}", business.website.as_deref().unwrap_or("-"));
            println!("Phone: {}", business.phone.as_deref().unwrap_or("-"));
            match (business.rating, business.ratings_count) {
                (Some(r), Some(n)) => println!("Rating: {r} ({n} reviews)"),
                (Some(r), None) => println!("Rating: {r}"),
                _ => println!("Rating: -"),
            }
            println!("Types: {}", business.types.join(", "));
        }
    }
    Ok(())
}

/// --help and --version are not failures; every other parse error is.
fn parse_exit_code(err: &clap::Error) -> i32 {
    if err.use_stderr() { 1 } else { 0 }
}

fn report(result: Result<()>) -> i32 {
    match result {
        Ok(()) => 0,
        Err(err) => {
            tracing::error!("{:#}", err);
            1
        }
    }
}

#[tokio::main]
async fn main() {
    init_tracing();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let _ = err.print();
            std::process::exit(parse_exit_code(&err));
        }
    };

    let code = report(run(cli).await);
    if code != 0 {
        std::process::exit(code);
    }
}
