// src/feed/runner.rs
use super::PriceFeed;
use crate::domain::errors::{FeedError, FeedResult};
use crate::engine::{Analysis, SignalEngine};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex as StdMutex, MutexGuard, PoisonError};
use tokio::sync::{broadcast, watch, Mutex};
use tokio::task::JoinHandle;
use tokio::time::Duration;

/// The loop currently owned by a runner. Each `start` gets its own stop channel.
struct ActiveRun {
    id: u64,
    stop_tx: watch::Sender<bool>,
}

type RunSlot = Arc<StdMutex<Option<ActiveRun>>>;

fn lock_slot(slot: &StdMutex<Option<ActiveRun>>) -> MutexGuard<'_, Option<ActiveRun>> {
    slot.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Polls a price feed on a fixed interval and broadcasts every fresh analysis.
pub struct FeedRunner {
    engine: Arc<Mutex<SignalEngine>>,
    analysis_tx: broadcast::Sender<Analysis>,
    active: RunSlot,
    next_run_id: AtomicU64,
    poll_interval: Duration,
    max_consecutive_errors: u32,
}

impl FeedRunner {
    pub fn new(engine: SignalEngine) -> Self {
        let feed_config = engine.config().feed.clone();
        let (analysis_tx, _) = broadcast::channel(100);

        Self {
            engine: Arc::new(Mutex::new(engine)),
            analysis_tx,
            active: Arc::new(StdMutex::new(None)),
            next_run_id: AtomicU64::new(1),
            poll_interval: Duration::from_secs(feed_config.poll_interval_secs.max(1)),
            max_consecutive_errors: feed_config.max_consecutive_errors,
        }
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval.max(Duration::from_millis(1));
        self
    }

    /// Shared handle to the engine, e.g. for reading history between ticks.
    pub fn engine(&self) -> Arc<Mutex<SignalEngine>> {
        self.engine.clone()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Analysis> {
        self.analysis_tx.subscribe()
    }

    pub fn is_running(&self) -> bool {
        lock_slot(&self.active).is_some()
    }

    /// Signal the current loop to exit. It wakes immediately, even mid-interval
    /// or while waiting on the feed.
    pub fn stop(&self) {
        if let Some(run) = lock_slot(&self.active).take() {
            log::info!("Feed runner stopping (run {})", run.id);
            // the loop may already have exited
            let _ = run.stop_tx.send(true);
        }
    }

    /// Spawn the polling loop. The loop ends on `stop()` or when the feed closes.
    pub fn start<F>(&self, mut feed: F) -> FeedResult<JoinHandle<()>>
    where
        F: PriceFeed + 'static,
    {
        let (run_id, mut stop_rx) = {
            let mut slot = lock_slot(&self.active);
            if slot.is_some() {
                return Err(FeedError::AlreadyRunning);
            }
            let id = self.next_run_id.fetch_add(1, Ordering::SeqCst);
            let (stop_tx, stop_rx) = watch::channel(false);
            *slot = Some(ActiveRun { id, stop_tx });
            (id, stop_rx)
        };

        log::info!(
            "Polling {} every {:?} (run {})",
            feed.name(),
            self.poll_interval,
            run_id
        );

        let engine = self.engine.clone();
        let analysis_tx = self.analysis_tx.clone();
        let active = self.active.clone();
        let poll_interval = self.poll_interval;
        let max_errors = self.max_consecutive_errors;

        Ok(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(poll_interval);
            let mut consecutive_errors: u32 = 0;

            loop {
                tokio::select! {
                    biased;
                    _ = stop_rx.changed() => break,
                    _ = ticker.tick() => {}
                }

                let outcome = tokio::select! {
                    biased;
                    _ = stop_rx.changed() => break,
                    outcome = poll_once(&engine, &mut feed, &analysis_tx) => outcome,
                };

                match outcome {
                    Ok(_) => consecutive_errors = 0,
                    Err(FeedError::Closed) => {
                        log::info!("{} closed, runner exiting", feed.name());
                        break;
                    }
                    Err(e) => {
                        consecutive_errors += 1;
                        if consecutive_errors >= max_errors {
                            log::error!(
                                "{} failed {} times in a row: {}",
                                feed.name(),
                                consecutive_errors,
                                e
                            );
                        } else {
                            log::warn!("Feed error from {}: {}", feed.name(), e);
                        }
                    }
                }
            }

            // a restarted runner owns a newer run; leave its slot alone
            let mut slot = lock_slot(&active);
            if slot.as_ref().map_or(false, |run| run.id == run_id) {
                *slot = None;
            }
            log::debug!("Feed loop {} finished", run_id);
        }))
    }
}

/// Pull one quote into the engine and broadcast the resulting analysis.
///
/// A quote the window rejects is logged and skipped (`Ok(None)`); feed
/// failures are returned to the caller.
pub async fn poll_once<F>(
    engine: &Mutex<SignalEngine>,
    feed: &mut F,
    analysis_tx: &broadcast::Sender<Analysis>,
) -> FeedResult<Option<Analysis>>
where
    F: PriceFeed + ?Sized,
{
    let sample = feed.next_quote().await?;

    let analysis = {
        let mut engine = engine.lock().await;
        if let Err(e) = engine.push_sample(sample) {
            log::warn!("Skipping quote from {}: {}", feed.name(), e);
            return Ok(None);
        }
        engine.analysis()
    };

    log::debug!(
        "{} @ {:.2}: score {}, confidence {:.0}%",
        analysis.recommendation.label,
        analysis.recommendation.price,
        analysis.recommendation.score,
        analysis.recommendation.confidence
    );

    // no subscribers is fine
    let _ = analysis_tx.send(analysis.clone());
    Ok(Some(analysis))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::domain::models::PriceSample;
    use crate::feed::SyntheticFeed;
    use async_trait::async_trait;
    use chrono::{Duration as ChronoDuration, TimeZone, Utc};
    use std::collections::VecDeque;

    struct ScriptedFeed {
        quotes: VecDeque<FeedResult<PriceSample>>,
    }

    impl ScriptedFeed {
        fn prices(prices: &[f64]) -> Self {
            Self {
                quotes: prices.iter().enumerate().map(|(i, p)| Ok(sample(i, *p))).collect(),
            }
        }
    }

    #[async_trait]
    impl PriceFeed for ScriptedFeed {
        async fn next_quote(&mut self) -> FeedResult<PriceSample> {
            self.quotes.pop_front().unwrap_or(Err(FeedError::Closed))
        }

        fn name(&self) -> &str {
            "scripted"
        }
    }

    /// Never closes; quotes one fixed price stamped with the wall clock.
    struct SteadyFeed {
        price: f64,
    }

    #[async_trait]
    impl PriceFeed for SteadyFeed {
        async fn next_quote(&mut self) -> FeedResult<PriceSample> {
            Ok(PriceSample::new(Utc::now(), self.price))
        }

        fn name(&self) -> &str {
            "steady"
        }
    }

    /// Never answers.
    struct StalledFeed;

    #[async_trait]
    impl PriceFeed for StalledFeed {
        async fn next_quote(&mut self) -> FeedResult<PriceSample> {
            std::future::pending().await
        }

        fn name(&self) -> &str {
            "stalled"
        }
    }

    fn sample(i: usize, price: f64) -> PriceSample {
        let start = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
        PriceSample::new(start + ChronoDuration::seconds(5 * i as i64), price)
    }

    fn engine() -> SignalEngine {
        let mut config = Config::default();
        config.window.min_valid_price = 1.0;
        SignalEngine::new(config).unwrap()
    }

    #[tokio::test]
    async fn broadcasts_one_analysis_per_quote() {
        let prices: Vec<f64> = (0..30).map(|i| 100.0 + i as f64 * 30.0 / 29.0).collect();
        let runner = FeedRunner::new(engine()).with_poll_interval(Duration::from_millis(1));
        let mut rx = runner.subscribe();

        let handle = runner.start(ScriptedFeed::prices(&prices)).unwrap();
        handle.await.unwrap();
        assert!(!runner.is_running());

        let mut received = Vec::new();
        while let Ok(analysis) = rx.try_recv() {
            received.push(analysis);
        }
        assert_eq!(received.len(), 30);

        let last = received.last().unwrap();
        assert!(last.recommendation.label.is_buy());
        assert!(last.plan.take_profit > last.plan.entry);
        assert_eq!(runner.engine().lock().await.snapshot().len(), 30);
    }

    #[tokio::test]
    async fn skips_rejected_quotes_and_feed_errors() {
        let feed = ScriptedFeed {
            quotes: VecDeque::from(vec![
                Ok(sample(0, 100.0)),
                Ok(sample(1, f64::NAN)),
                Err(FeedError::Unavailable("timeout".into())),
                Ok(sample(2, 101.0)),
            ]),
        };
        let runner = FeedRunner::new(engine()).with_poll_interval(Duration::from_millis(1));
        let mut rx = runner.subscribe();

        runner.start(feed).unwrap().await.unwrap();

        let mut count = 0;
        while rx.try_recv().is_ok() {
            count += 1;
        }
        assert_eq!(count, 2);
        assert_eq!(
            runner.engine().lock().await.snapshot().close_prices(),
            vec![100.0, 101.0]
        );
    }

    #[tokio::test]
    async fn poll_once_reports_outcomes() {
        let engine = Mutex::new(engine());
        let (tx, _) = broadcast::channel(4);
        let mut feed = ScriptedFeed {
            quotes: VecDeque::from(vec![Ok(sample(0, 100.0)), Ok(sample(1, -1.0))]),
        };

        assert!(poll_once(&engine, &mut feed, &tx).await.unwrap().is_some());
        assert!(poll_once(&engine, &mut feed, &tx).await.unwrap().is_none());
        assert_eq!(
            poll_once(&engine, &mut feed, &tx).await.unwrap_err(),
            FeedError::Closed
        );
    }

    #[tokio::test]
    async fn refuses_to_start_twice() {
        let runner = FeedRunner::new(SignalEngine::new(Config::default()).unwrap())
            .with_poll_interval(Duration::from_millis(5));

        let handle = runner
            .start(SyntheticFeed::new(60_000.0, 0.5, 42))
            .unwrap();
        assert!(runner.is_running());
        assert_eq!(
            runner
                .start(SyntheticFeed::new(60_000.0, 0.5, 43))
                .unwrap_err(),
            FeedError::AlreadyRunning
        );

        tokio::time::sleep(Duration::from_millis(30)).await;
        runner.stop();
        handle.await.unwrap();
        assert!(!runner.is_running());
        assert!(!runner.engine().lock().await.snapshot().is_empty());
    }

    #[tokio::test]
    async fn restart_retires_the_previous_loop() {
        let runner = FeedRunner::new(engine()).with_poll_interval(Duration::from_millis(1));

        let first = runner.start(SteadyFeed { price: 100.0 }).unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;
        runner.stop();
        assert!(!runner.is_running());

        let second = runner.start(SteadyFeed { price: 200.0 }).unwrap();
        assert!(runner.is_running());

        tokio::time::timeout(Duration::from_secs(1), first)
            .await
            .expect("first loop kept running after a restart")
            .unwrap();
        // the retired loop must not clear the new run
        assert!(runner.is_running());

        tokio::time::sleep(Duration::from_millis(20)).await;
        let engine = runner.engine();
        let latest = engine.lock().await.snapshot().latest_price();
        assert_eq!(latest, Some(200.0));

        runner.stop();
        tokio::time::timeout(Duration::from_secs(1), second)
            .await
            .expect("second loop ignored stop")
            .unwrap();
    }

    #[tokio::test]
    async fn stop_does_not_wait_for_the_next_tick() {
        let runner = FeedRunner::new(engine()).with_poll_interval(Duration::from_secs(10));

        let handle = runner.start(SteadyFeed { price: 100.0 }).unwrap();
        // the first tick fires at once, the next one is ten seconds out
        tokio::time::sleep(Duration::from_millis(20)).await;
        runner.stop();

        tokio::time::timeout(Duration::from_millis(500), handle)
            .await
            .expect("stop waited for the poll interval")
            .unwrap();
        assert_eq!(runner.engine().lock().await.snapshot().len(), 1);
    }

    #[tokio::test]
    async fn stop_interrupts_a_stalled_feed() {
        let runner = FeedRunner::new(engine()).with_poll_interval(Duration::from_millis(1));

        let handle = runner.start(StalledFeed).unwrap();
        tokio::time::sleep(Duration::from_millis(10)).await;
        runner.stop();

        tokio::time::timeout(Duration::from_millis(500), handle)
            .await
            .expect("stop waited on the feed")
            .unwrap();
        assert!(runner.engine().lock().await.snapshot().is_empty());
    }
}
