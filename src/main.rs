use clap::{Parser, Subcommand};
use content_engine::Pillar;
use marketeer_core::{AppConfig, CoreError, ErrorExt};
use marketing_agent::MarketingAgent;
use scheduler::MarketingScheduler;

#[derive(Parser)]
#[command(name = "marketeer", about = "Twitter marketing automation for AI Photo Editor")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Compose and post one tweet
    Post {
        /// Content pillar: product, tutorial, generation, editing, industry,
        /// community. Defaults to the day-of-week plan.
        category: Option<String>,
    },
    /// Show current platform trends
    Trends {
        #[arg(default_value_t = 5)]
        count: usize,
    },
    /// Analyze engagement of the most recent posted tweets
    Analyze {
        #[arg(default_value_t = 10)]
        count: usize,
    },
    /// Generate a test image without posting anything
    GenerateImage {
        #[arg(default_value = "AI photo editor interface with beautiful UI design")]
        prompt: String,
    },
    /// Generate two sample tweets per pillar, optionally publishing them
    Test {
        #[arg(default_value_t = true)]
        publish: bool,
    },
    /// Run the timed posting loop
    Schedule {
        /// Post one tweet immediately before entering the loop
        #[arg(long)]
        post_now: bool,
    },
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            "marketeer=debug,marketing_agent=debug,twitter_client=debug,\
             image_generator=debug,content_engine=debug,scheduler=debug",
        )
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(cli.command).await {
        e.log_error();
        eprintln!("{}", e.user_friendly_message());
        std::process::exit(1);
    }
}

async fn run(command: Command) -> Result<(), CoreError> {
    let config = AppConfig::from_env();
    let mut agent = MarketingAgent::new(config)?;

    // Image generation does not need a session; skip login for it.
    if let Command::GenerateImage { prompt } = &command {
        let image = agent.generate_image(prompt).await?;
        println!("Image written to {}", image.filepath.display());
        return Ok(());
    }

    agent.init().await?;

    match command {
        Command::Post { category } => {
            let pillar = match category.as_deref() {
                Some(alias) => Some(Pillar::from_cli_alias(alias).ok_or_else(|| {
                    CoreError::InvalidInput {
                        message: format!(
                            "unknown category '{}' (expected product, tutorial, generation, \
                             editing, industry or community)",
                            alias
                        ),
                    }
                })?),
                None => None,
            };

            let record = agent.post_tweet(pillar, false).await?;
            println!("Posted tweet {}:", record.id);
            println!("{}", record.text);
        }
        Command::Trends { count } => {
            let trends = agent.get_popular_trends(count).await?;
            println!("Current trends:");
            for (i, trend) in trends.iter().enumerate() {
                println!("{:>3}. {}", i + 1, trend);
            }
        }
        Command::Analyze { count } => {
            let report = agent.analyze_performance(count).await?;
            if report.tweets.is_empty() {
                println!("No posted tweets to analyze yet.");
                return Ok(());
            }

            println!("Engagement for the last {} tweet(s):", report.tweets.len());
            for tweet in &report.tweets {
                println!(
                    "  [{}] {} likes, {} retweets - {}",
                    tweet.content_type,
                    tweet.likes,
                    tweet.retweets,
                    preview(&tweet.text)
                );
            }
            if let Some(best) = &report.best {
                println!(
                    "Best performer: {} ({} total engagement)",
                    preview(&best.text),
                    best.engagement()
                );
            }
            println!("Average engagement per pillar:");
            for (pillar, average) in &report.pillar_averages {
                println!("  {}: {:.1}", pillar, average);
            }
        }
        Command::GenerateImage { .. } => unreachable!("handled before login"),
        Command::Test { publish } => {
            let results = agent.run_test_mode(publish).await?;
            let posted = results.iter().filter(|r| r.posted_id.is_some()).count();
            for result in &results {
                println!("--- {} ---", result.pillar);
                println!("{}", result.text);
                if let Some(id) = &result.posted_id {
                    println!("(posted as {})", id);
                }
                println!();
            }
            println!(
                "Test mode finished: {} tweet(s) generated, {} posted.",
                results.len(),
                posted
            );
        }
        Command::Schedule { post_now } => {
            MarketingScheduler::new(agent).run(post_now).await?;
        }
    }

    Ok(())
}

fn preview(text: &str) -> String {
    let flat = text.replace('\n', " ");
    if flat.chars().count() > 60 {
        let cut: String = flat.chars().take(57).collect();
        format!("{}...", cut)
    } else {
        flat
    }
}
