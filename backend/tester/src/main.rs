use std::time::{Duration, SystemTime, UNIX_EPOCH};

use acquirer::{
    FixConfig, LocationSample, LocationSubmission, ScriptedSource, SourceError, acquire_best_fix,
};
use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt};

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Base URL of a running server
    #[arg(long, default_value = "http://localhost:3000")]
    url: String,

    #[arg(long, default_value = "ABC123")]
    token: String,

    #[command(subcommand)]
    fix: Fix,
}

#[derive(Subcommand, Debug)]
enum Fix {
    /// Submit one position as is
    #[command(allow_negative_numbers = true)]
    Fixed {
        lat: f64,
        lon: f64,

        #[arg(long, default_value_t = 5.0)]
        accuracy: f64,
    },

    /// Run the best-fix loop over a simulated device, then submit the result
    #[command(allow_negative_numbers = true)]
    Simulate {
        lat: f64,
        lon: f64,

        /// Accuracy of each simulated update, in order
        #[arg(long, value_delimiter = ',', default_value = "80,45,20")]
        accuracies: Vec<f64>,

        /// Delay between simulated updates
        #[arg(long, default_value_t = 1000)]
        step_ms: u64,

        #[arg(long, default_value_t = 20_000)]
        max_wait_ms: u64,

        #[arg(long, default_value_t = 30.0)]
        min_accuracy: f64,
    },
}

fn now_ms() -> anyhow::Result<i64> {
    let elapsed = SystemTime::now().duration_since(UNIX_EPOCH)?;

    Ok(elapsed.as_millis() as i64)
}

async fn fix_from(args: Fix) -> anyhow::Result<LocationSample> {
    match args {
        Fix::Fixed { lat, lon, accuracy } => {
            Ok(LocationSample::new(lat, lon, accuracy, now_ms()?)?)
        }
        Fix::Simulate {
            lat,
            lon,
            accuracies,
            step_ms,
            max_wait_ms,
            min_accuracy,
        } => {
            let step = Duration::from_millis(step_ms);
            let started = now_ms()?;

            let script = accuracies
                .iter()
                .enumerate()
                .map(|(i, &accuracy)| {
                    let at = started + (i as i64 + 1) * step_ms as i64;
                    LocationSample::new(lat, lon, accuracy, at)
                        .map(|sample| (step, Ok::<_, SourceError>(sample)))
                })
                .collect::<Result<Vec<_>, _>>()?;

            let config = FixConfig {
                max_wait: Duration::from_millis(max_wait_ms),
                min_accuracy_meters: min_accuracy,
                ..FixConfig::default()
            };

            let source = ScriptedSource::new(script);
            let sample = acquire_best_fix(&source, &config).await?;

            info!(
                accuracy = sample.accuracy_meters(),
                updates = source.stats().delivered(),
                "Simulated fix acquired"
            );

            Ok(sample)
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).init();

    let args = Args::parse();

    let sample = fix_from(args.fix).await?;
    let submission = LocationSubmission::new(args.token, sample);

    let endpoint = format!("{}/api/location", args.url.trim_end_matches('/'));
    info!("Posting to {endpoint}");

    let response = reqwest::Client::new()
        .post(&endpoint)
        .json(&submission)
        .send()
        .await
        .with_context(|| format!("Failed to reach {endpoint}"))?;

    let status = response.status();
    let body = response.text().await.unwrap_or_default();

    println!("Status: {status}");
    println!("{body}");

    Ok(())
}
