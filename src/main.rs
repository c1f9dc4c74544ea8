use clap::{Parser, Subcommand};

use brandloom::external::FsArtifactStore;
use brandloom::providers::ProviderFactory;
use brandloom::workflow::phase_for_agent;
use brandloom::{Config, Result, Workflow};

#[derive(Parser)]
#[command(name = "brandloom")]
#[command(about = "Brand analysis and social content generation", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a website and generate branded social content
    Analyze {
        #[arg(help = "Website URL to analyze")]
        url: String,
        #[arg(
            long,
            default_value = "complete",
            help = "Which agent to run: business, screenshot, content, prompts, images, or complete"
        )]
        agent: String,
        #[arg(long, default_value = "metrics", help = "Artifact output directory")]
        output_dir: String,
    },
    /// List configured AI providers and their capabilities
    Providers,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze {
            url,
            agent,
            output_dir,
        } => run_analysis(&url, &agent, &output_dir).await?,
        Commands::Providers => list_providers(),
    }

    Ok(())
}

async fn run_analysis(url: &str, agent: &str, output_dir: &str) -> Result<()> {
    let workflow = Workflow::from_config(Config::from_env(), FsArtifactStore::new(output_dir))?;

    let results = if agent == "complete" {
        workflow.run(url).await
    } else {
        let Some(target) = phase_for_agent(agent) else {
            return Err(brandloom::Error::InvalidInput(format!(
                "unknown agent: {agent}. Available: business, screenshot, content, prompts, images, complete"
            )));
        };
        workflow.run_single_agent(target, url).await
    };

    println!("\n=== Results for {url} ===");
    println!(
        "Workflow Status: {}",
        serde_json::to_value(results.workflow_status)?
            .as_str()
            .unwrap_or("unknown")
    );
    for phase in &results.phases {
        let status = serde_json::to_value(phase.status)?;
        println!("  {}: {}", phase.name, status.as_str().unwrap_or("unknown"));
    }
    if let Some(error) = &results.error {
        println!("Error: {error}");
    }
    println!("\nDetailed results saved to {output_dir}/");

    Ok(())
}

fn list_providers() {
    let factory = ProviderFactory::from_env();
    println!("Configured AI providers:");
    for status in factory.list_available() {
        if status.configured {
            let capabilities: Vec<&str> = status
                .capabilities
                .iter()
                .map(|c| c.as_str())
                .collect();
            println!(
                "  {} ({}): {}",
                status.name,
                status.model.as_deref().unwrap_or("-"),
                capabilities.join(", ")
            );
        } else {
            println!(
                "  {}: not configured ({})",
                status.name,
                status.error.as_deref().unwrap_or("unknown")
            );
        }
    }
}
