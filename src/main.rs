use anyhow::Result;
use clap::Parser;
use std::io::{self, BufRead, Write};
use std::sync::Arc;
use tourguide::{
    BreakerRegistry, HttpDataSource, Intent, QueryOrchestrator, TourGuideConfig, response,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "tourguide", version, about = "Ask about any destination: live weather and top attractions")]
struct Cli {
    /// Free-text travel query; starts an interactive prompt when omitted
    query: Vec<String>,

    /// Force which sources to query (weather, places, both) instead of
    /// inferring from the text
    #[arg(long)]
    intent: Option<Intent>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = TourGuideConfig::load()?;
    init_tracing(cli.verbose, &config);

    let sources = Arc::new(HttpDataSource::new(
        config.sources.clone(),
        config.defaults.search_radius_km,
    )?);
    let orchestrator = QueryOrchestrator::new(
        sources,
        Arc::new(BreakerRegistry::new()),
        config.defaults.attraction_limit,
    );

    if cli.query.is_empty() {
        run_prompt(&orchestrator, cli.intent).await?;
    } else {
        let text = cli.query.join(" ");
        println!("{}", answer(&orchestrator, &text, cli.intent).await);
    }

    Ok(())
}

/// Interactive read-eval loop over stdin
async fn run_prompt(orchestrator: &QueryOrchestrator, intent: Option<Intent>) -> Result<()> {
    println!("Ask me about any destination! I'll provide weather info and top attractions.");
    println!("(Ctrl-D to quit)");

    let stdin = io::stdin();
    loop {
        print!("> ");
        io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        println!("{}\n", answer(orchestrator, &line, intent).await);
    }

    Ok(())
}

async fn answer(orchestrator: &QueryOrchestrator, text: &str, intent: Option<Intent>) -> String {
    if text.trim().is_empty() {
        return response::EMPTY_QUERY_PROMPT.to_string();
    }
    orchestrator.answer_query(text, intent).await
}

fn init_tracing(verbose: bool, config: &TourGuideConfig) {
    let level = if verbose {
        "debug".to_string()
    } else {
        config.logging.level.clone()
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}
