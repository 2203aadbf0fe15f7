use clap::{Parser, Subcommand};
use serde_json::Value;
use url::Url;

#[derive(Parser)]
#[command(name = "ldbws-cli")]
#[command(about = "Query a running LDBWS REST proxy", long_about = None)]
struct Cli {
    /// Proxy base URL including the path prefix.
    #[arg(short, long, default_value = "http://localhost:8080/ldbws-rest-proxy/v0.1")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Departure board for a station
    Departures {
        /// Station CRS code
        crs: String,
        /// Only services calling at this station
        #[arg(long)]
        to: Option<String>,
    },
    /// Arrival board for a station
    Arrivals {
        /// Station CRS code
        crs: String,
        /// Only services that called at this station
        #[arg(long)]
        from: Option<String>,
    },
    /// Details of a single service
    Service {
        /// Service ID from a board
        id: String,
    },
}

impl Commands {
    /// Path segments below the proxy prefix, unencoded.
    fn segments(&self) -> Vec<&str> {
        match self {
            Commands::Departures { crs, to } => {
                let mut segments = vec!["departure-board", crs.as_str()];
                segments.extend(to.as_deref());
                segments
            }
            Commands::Arrivals { crs, from } => {
                let mut segments = vec!["arrival-board", crs.as_str()];
                segments.extend(from.as_deref());
                segments
            }
            Commands::Service { id } => vec!["service-details", id.as_str()],
        }
    }
}

/// Append the command's segments to `base`, percent-encoding each one.
fn request_url(base: &str, command: &Commands) -> Result<Url, Box<dyn std::error::Error>> {
    let mut url = Url::parse(base)?;
    url.path_segments_mut()
        .map_err(|_| format!("{base} cannot be used as a base URL"))?
        .pop_if_empty()
        .extend(command.segments());
    Ok(url)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    let url = request_url(&cli.url, &cli.command)?;
    let res = client.get(url).send().await?;
    print_response(res).await
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: proxy returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        std::process::exit(1);
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
