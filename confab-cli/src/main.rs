//! Confab CLI - Command-line interface for the research pipeline
//!
//! Runs the planner on its own or the full plan/search/summarize/report
//! pipeline from a terminal, without going through the web server.

use clap::{Parser, Subcommand};
use confab_core::{LlmConfig, SearchConfig};
use confab_llm::ConfabLlmClient;
use confab_research::{Planner, ResearchManager, SerpApiSearch};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "confab")]
#[command(about = "Research assistant: plan searches and produce reports")]
#[command(version = "0.1.0")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Plan the web searches for a research question without running them
    Plan {
        /// Research question
        query: String,

        /// Print the plan as JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Run the full research pipeline and print the report
    Research {
        /// Research question
        query: String,

        /// Also print the email draft for the report
        #[arg(long)]
        email: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(format!("confab={0},confab_research={0}", default_level))),
        )
        .init();

    dotenvy::dotenv().ok();

    match cli.command {
        Commands::Plan { query, json } => handle_plan(query, json).await?,
        Commands::Research { query, email } => handle_research(query, email).await?,
    }

    Ok(())
}

fn build_llm() -> Arc<ConfabLlmClient> {
    Arc::new(ConfabLlmClient::new(LlmConfig::from_env()))
}

async fn handle_plan(query: String, json: bool) -> anyhow::Result<()> {
    info!("Planning searches for: {}", query);

    let planner = Planner::new(build_llm());
    let plan = planner.plan(&query).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&plan)?);
    } else {
        println!("📋 Search plan for: {}\n", query);
        for (i, item) in plan.searches.iter().enumerate() {
            println!("{}. {}", i + 1, item.query);
            println!("   {}", item.reason);
        }
    }

    Ok(())
}

async fn handle_research(query: String, email: bool) -> anyhow::Result<()> {
    info!("Starting research for: {}", query);

    let search = SerpApiSearch::new(SearchConfig::from_env())?;
    let manager = ResearchManager::new(build_llm(), Arc::new(search));

    let report = manager.run(&query).await?;

    println!("🔍 Ran {} searches, {} summaries", report.plan.searches.len(), report.summaries.len());
    println!("\n{}", report.report);

    if email {
        println!("\n--- Email draft ---\n");
        println!("{}", report.email);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parsing() {
        let cli = Cli::parse_from(["confab", "plan", "rust async runtimes", "--json"]);
        match cli.command {
            Commands::Plan { query, json } => {
                assert_eq!(query, "rust async runtimes");
                assert!(json);
            }
            _ => panic!("expected plan command"),
        }

        let cli = Cli::parse_from(["confab", "-v", "research", "rust async runtimes"]);
        assert!(cli.verbose);
        match cli.command {
            Commands::Research { query, email } => {
                assert_eq!(query, "rust async runtimes");
                assert!(!email);
            }
            _ => panic!("expected research command"),
        }
    }
}
