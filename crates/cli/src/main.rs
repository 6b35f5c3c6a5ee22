use anyhow::Result;
use clap::Parser;
use std::sync::Arc;
use storyline_engine::{analyze_pull_request, PullRequestHost};
use storyline_github::{parse_pull_request_url, GitHubHost};

#[derive(Parser)]
#[command(name = "storyline")]
#[command(about = "Narrate a pull request as semantic changes instead of a raw diff")]
#[command(version)]
struct Cli {
    /// GitHub pull request URL, e.g. https://github.com/owner/repo/pull/42
    url: String,

    /// Emit the full analysis report as JSON
    #[arg(long)]
    json: bool,

    /// Include the raw unified diff in text output
    #[arg(long)]
    raw_diff: bool,

    /// GitHub API token for higher rate limits
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Log only warnings and errors
    #[arg(long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "warn"
    } else {
        "info"
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .target(env_logger::Target::Stderr)
        .init();

    let pr = parse_pull_request_url(&cli.url)?;
    log::info!("analyzing {pr}");

    let host: Arc<dyn PullRequestHost> = Arc::new(GitHubHost::new().with_token(cli.token.clone()));
    let report = analyze_pull_request(host, &pr).await?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("{}", report.storyline);
    if !report.prompts.is_empty() {
        println!("\nSuggested follow-ups:");
        for prompt in &report.prompts {
            println!("  - {prompt}");
        }
    }
    if cli.raw_diff && !report.raw_diff.is_empty() {
        println!("\nRaw diff:\n{}", report.raw_diff.trim_end());
    }

    Ok(())
}
