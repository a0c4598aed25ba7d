//! Top-level entry: one batch, or a batch every interval until shutdown.

use std::future::Future;
use std::time::Duration;

use reqwest::Client;
use tracing::{info, warn};

use crate::batch::{BatchRunner, ResultSink};
use crate::config::Config;
use crate::error::{CheckinError, Result};
use crate::gateway::GatewayResolver;
use crate::retry::RetryPolicy;

/// Wires resolver, retry policy and batch runner from config and drives the
/// loop. `shutdown` resolving stops the scheduler at the next checkpoint
/// (before a new batch or during the inter-batch sleep); a batch already in
/// flight always finishes.
pub async fn run(
    client: &Client,
    config: &Config,
    loop_mode: bool,
    sink: &dyn ResultSink,
    shutdown: impl Future<Output = ()>,
) -> Result<()> {
    if config.users.is_empty() {
        return Err(CheckinError::Config(
            "no users configured, nothing to sign in".into(),
        ));
    }
    let resolver = GatewayResolver::from_config(config)?;
    let runner = BatchRunner::new(client, &resolver, RetryPolicy::from(config.retry));
    let interval = Duration::from_secs(config.loop_interval_secs);

    let runner = &runner;
    let users = config.users.as_slice();
    let batch = move || async move {
        runner.run(users, sink).await;
    };
    run_loop(batch, loop_mode, interval, shutdown).await;
    Ok(())
}

/// The loop itself, generic over the batch so it can be exercised without a
/// network in tests.
pub async fn run_loop<F, Fut, S>(mut batch: F, loop_mode: bool, interval: Duration, shutdown: S)
where
    F: FnMut() -> Fut,
    Fut: Future<Output = ()>,
    S: Future<Output = ()>,
{
    tokio::pin!(shutdown);
    loop {
        batch().await;
        if !loop_mode {
            info!("single run complete");
            return;
        }
        info!(secs = interval.as_secs(), "sleeping until the next batch");
        tokio::select! {
            // shutdown wins when both are ready, so no batch starts after it
            biased;
            () = &mut shutdown => {
                warn!("shutdown requested, stopping");
                return;
            }
            () = tokio::time::sleep(interval) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    fn counting_batch(calls: &Arc<AtomicU32>) -> impl FnMut() -> std::future::Ready<()> {
        let calls = calls.clone();
        move || {
            calls.fetch_add(1, Ordering::SeqCst);
            std::future::ready(())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn single_run_mode_runs_exactly_once_without_sleeping() {
        let calls = Arc::new(AtomicU32::new(0));
        let started = tokio::time::Instant::now();
        run_loop(
            counting_batch(&calls),
            false,
            Duration::from_secs(3600),
            std::future::pending(),
        )
        .await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(started.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn loop_mode_reruns_after_the_interval() {
        let calls = Arc::new(AtomicU32::new(0));
        run_loop(
            counting_batch(&calls),
            true,
            Duration::from_secs(3600),
            tokio::time::sleep(Duration::from_secs(7200)),
        )
        .await;
        // batches at t=0 and t=3600; shutdown wins the race at t=7200
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_during_the_sleep_prevents_further_batches() {
        let calls = Arc::new(AtomicU32::new(0));
        run_loop(
            counting_batch(&calls),
            true,
            Duration::from_secs(3600),
            tokio::time::sleep(Duration::from_secs(1800)),
        )
        .await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn empty_account_list_is_rejected_before_any_network_activity() {
        // bypass Config::from_json validation to prove run() checks too
        let config = Config {
            users: vec![],
            gateway: Default::default(),
            webvpn: None,
            direct: Default::default(),
            retry: Default::default(),
            loop_interval_secs: 3600,
        };
        let client = Client::new();
        let err = run(
            &client,
            &config,
            false,
            &crate::batch::LogSink,
            std::future::pending(),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, CheckinError::Config(_)));
    }

    #[tokio::test]
    async fn webvpn_without_bases_is_rejected_before_any_network_activity() {
        let config = Config::from_json(
            r#"{
                "users": [ { "username": "u", "password": "p" } ],
                "gateway": "webvpn"
            }"#,
        )
        .unwrap();
        let client = Client::new();
        let err = run(
            &client,
            &config,
            false,
            &crate::batch::LogSink,
            std::future::pending(),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, CheckinError::Config(_)));
    }
}
