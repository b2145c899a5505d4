use std::sync::Arc;
use std::time::Duration;

use pr_watchdog::{
    api::GithubClient,
    config::{Env, Settings},
    watchdog::{Context, WatchDog},
};
use shared::slack::SlackWebhook;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    let subscriber = tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer());
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Initializing PR watchdog...");

    // Failures are logged and the process still exits cleanly so that the
    // scheduler invoking us never sees a crash.
    let settings = match Env::from_env().and_then(Env::validate) {
        Ok(settings) => settings,
        Err(e) => {
            error!("[ERROR] {e:#}");
            return Ok(());
        }
    };

    let Settings {
        owner,
        repositories,
        slack_webhook_url,
        github_token,
        threshold_days,
        identities,
        messages,
        interval,
    } = settings;

    let github = match GithubClient::new(github_token) {
        Ok(github) => github,
        Err(e) => {
            error!("[ERROR] Failed to create GitHub client: {e:#}");
            return Ok(());
        }
    };

    let context = Context {
        github: Arc::new(github),
        notifier: Arc::new(SlackWebhook::new(slack_webhook_url)),
        messages: messages.into(),
        identities: identities.into(),
    };
    let watchdog = WatchDog::new(context, owner, threshold_days);

    match interval {
        None => run(&watchdog, &repositories).await,
        Some(period) => {
            tokio::select! {
                _ = run_periodically(&watchdog, &repositories, period) => {}
                _ = signal::ctrl_c() => {
                    warn!("Received SIGINT. Exiting.");
                }
            }
        }
    }

    Ok(())
}

async fn run(watchdog: &WatchDog, repositories: &[String]) {
    let results = watchdog.run_all(repositories).await;
    let failed = results.iter().filter(|result| result.is_err()).count();
    if failed > 0 {
        warn!(
            "Finished with {failed} failed repositories out of {}",
            results.len()
        );
    } else {
        info!("Finished checking {} repositories", results.len());
    }
}

async fn run_periodically(watchdog: &WatchDog, repositories: &[String], period: Duration) {
    info!("Running every {} minutes", period.as_secs() / 60);
    let mut interval: tokio::time::Interval = tokio::time::interval(period);

    loop {
        interval.tick().await;
        run(watchdog, repositories).await;
    }
}
