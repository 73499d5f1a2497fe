//! Audience Command Line Interface
//!
//! Runs the audience compiler against a live shop and prints the outcome as
//! JSON on stdout. Logs go to stderr.
//!
//! # Usage
//!
//! ```bash
//! # Filter with a saved FilterConfig
//! audience run --config segment.json
//!
//! # Country-only search
//! audience run --countries Canada,Germany
//!
//! # Show the query a config would send, without calling the shop
//! audience plan --config segment.json
//!
//! # Picker catalogs
//! audience options
//! ```

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use std::io::{self, Read};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use shop_audience::{
    build_fetch_spec, describe_filters, filter_options, AudienceCompiler, CompilerLimits,
    FilterConfig, FilterError, ProtectedDomain, ShopifyAdminClient, ShopifyConfig,
};

/// Exit code for missing protected-data approval
const EXIT_ACCESS_DENIED: u8 = 3;

#[derive(Parser)]
#[command(name = "audience")]
#[command(version)]
#[command(about = "Compile and run customer audience filters against a Shopify store")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct Selection {
    /// FilterConfig JSON file ("-" for stdin)
    #[arg(short, long, conflicts_with = "countries")]
    config: Option<PathBuf>,

    /// Comma-separated countries or regions
    #[arg(long, value_delimiter = ',')]
    countries: Vec<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch and filter customers
    Run {
        #[command(flatten)]
        selection: Selection,

        /// Pretty-print the JSON output
        #[arg(long)]
        pretty: bool,
    },

    /// Print the merged fetch query for a selection
    Plan {
        #[command(flatten)]
        selection: Selection,
    },

    /// Print the option catalogs as JSON
    Options,
}

// =============================================================================
// MAIN
// =============================================================================

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("shop_audience=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    match dispatch(cli.command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => match err.downcast_ref::<FilterError>() {
            Some(FilterError::AccessDenied { domain, message }) => {
                eprintln!(
                    "Access denied: this app is not approved for protected {} ({}).",
                    domain, message
                );
                eprintln!("{}", access_hint(*domain));
                ExitCode::from(EXIT_ACCESS_DENIED)
            }
            _ => {
                eprintln!("Error: {:#}", err);
                ExitCode::FAILURE
            }
        },
    }
}

/// What the merchant has to request for the denied domain
fn access_hint(domain: ProtectedDomain) -> &'static str {
    match domain {
        ProtectedDomain::CustomerData => {
            "Request protected customer data access (name, email, address fields) in the Partner Dashboard."
        }
        ProtectedDomain::OrderData => {
            "Request the read_orders scope and protected order data access in the Partner Dashboard; \
             timing, payment, delivery and product filters read order history."
        }
    }
}

async fn dispatch(command: Commands) -> Result<()> {
    match command {
        Commands::Run { selection, pretty } => {
            let config = load_selection(&selection)?;
            let limits = CompilerLimits::from_env()?;
            let client = ShopifyAdminClient::new(&ShopifyConfig::from_env()?)?;
            let compiler = AudienceCompiler::new(client).with_limits(limits);

            let outcome = compiler.filter(&config).await?;
            let json = if pretty {
                serde_json::to_string_pretty(&outcome)?
            } else {
                serde_json::to_string(&outcome)?
            };
            println!("{}", json);
        }
        Commands::Plan { selection } => {
            let config = load_selection(&selection)?;
            let limits = CompilerLimits::from_env()?;
            let spec = build_fetch_spec(&config, &limits);
            eprintln!("# {}", describe_filters(&config));
            eprintln!("# batch size {}", spec.batch_size);
            eprintln!("# requested cost {}", spec.requested_cost());
            print!("{}", spec.render_query());
        }
        Commands::Options => {
            println!("{}", serde_json::to_string_pretty(&filter_options())?);
        }
    }
    Ok(())
}

fn load_selection(selection: &Selection) -> Result<FilterConfig> {
    if let Some(path) = &selection.config {
        let raw = if path.as_os_str() == "-" {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read FilterConfig from stdin")?;
            buf
        } else {
            std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?
        };
        return serde_json::from_str(&raw).context("Invalid FilterConfig JSON");
    }
    if selection.countries.is_empty() {
        bail!("Pass --config <file> or --countries <list>");
    }
    Ok(FilterConfig::new().with_location(selection.countries.iter().cloned()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_access_hint_names_the_denied_domain() {
        let customer = access_hint(ProtectedDomain::CustomerData);
        let order = access_hint(ProtectedDomain::OrderData);
        assert_ne!(customer, order);
        assert!(customer.contains("customer data"));
        assert!(order.contains("read_orders"));
        assert!(!order.contains("customer data"));
    }
}
