//! Time-based triggers for the ingestion and digest jobs
//!
//! Two independently owned timer tasks with an explicit start/shutdown
//! lifecycle. Tick handlers are spawned fire-and-forget: the timer never
//! waits for a run to finish, and overlapping runs are not prevented.

use std::sync::Arc;
use std::time::Duration;

use time::{OffsetDateTime, Time};
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::ports::{ArticleStore, Clock, DigestStore, FeedSource, Mailer, UserDirectory};
use crate::usecases::digest::DigestAssembler;
use crate::usecases::ingest::IngestPipeline;

/// Timer configuration
#[derive(Debug, Clone)]
pub struct ScheduleConfig {
    /// Interval between ingestion runs; the first run fires immediately
    pub ingest_interval: Duration,
    /// Time of day (UTC) for the daily digest run
    pub digest_time: Time,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            ingest_interval: Duration::from_secs(3600),
            digest_time: Time::from_hms(20, 0, 0).expect("valid time"),
        }
    }
}

/// Delay from `now` until the next daily fire at `at`
///
/// Rolls to tomorrow when today's fire time has already passed.
pub fn next_digest_delay(now: OffsetDateTime, at: Time) -> Duration {
    let mut target = now.replace_time(at);
    if target <= now {
        target += time::Duration::days(1);
    }
    (target - now).try_into().unwrap_or(Duration::ZERO)
}

/// Owner of the two scheduled pipeline tasks
pub struct PipelineScheduler {
    shutdown_tx: watch::Sender<bool>,
    handles: Vec<JoinHandle<()>>,
}

impl PipelineScheduler {
    /// Spawn both timers
    #[allow(clippy::type_complexity)]
    pub fn start<F, A, D, U, M, Cl>(
        ingest: Arc<IngestPipeline<F, A, Cl>>,
        digest: Arc<DigestAssembler<A, D, U, M, Cl>>,
        clock: Arc<Cl>,
        config: ScheduleConfig,
    ) -> Self
    where
        F: FeedSource + ?Sized + 'static,
        A: ArticleStore + ?Sized + 'static,
        D: DigestStore + ?Sized + 'static,
        U: UserDirectory + ?Sized + 'static,
        M: Mailer + ?Sized + 'static,
        Cl: Clock + ?Sized + 'static,
    {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let ingest_handle = {
            let mut shutdown_rx = shutdown_rx.clone();
            tokio::spawn(async move {
                let mut ticker = tokio::time::interval(config.ingest_interval);
                loop {
                    tokio::select! {
                        _ = ticker.tick() => {
                            let ingest = Arc::clone(&ingest);
                            tokio::spawn(async move {
                                tracing::info!("Scheduled ingestion starting");
                                match ingest.run_once().await {
                                    Ok(report) => tracing::info!(
                                        fetched = report.fetched_count,
                                        stored = report.stored_count,
                                        "Scheduled ingestion complete"
                                    ),
                                    Err(e) => tracing::error!(error = %e, "Scheduled ingestion failed"),
                                }
                            });
                        }
                        _ = shutdown_rx.changed() => break,
                    }
                }
            })
        };

        let digest_handle = {
            let mut shutdown_rx = shutdown_rx.clone();
            tokio::spawn(async move {
                loop {
                    let delay = next_digest_delay(clock.now(), config.digest_time);
                    tracing::debug!(delay_secs = delay.as_secs(), "Next digest run scheduled");
                    tokio::select! {
                        _ = tokio::time::sleep(delay) => {
                            let digest = Arc::clone(&digest);
                            tokio::spawn(async move {
                                tracing::info!("Scheduled digest run starting");
                                match digest.run_once().await {
                                    Ok(outcomes) => tracing::info!(
                                        users = outcomes.len(),
                                        "Scheduled digest run complete"
                                    ),
                                    Err(e) => tracing::error!(error = %e, "Scheduled digest run failed"),
                                }
                            });
                            // Past the fire instant; recompute from a fresh now
                        }
                        _ = shutdown_rx.changed() => break,
                    }
                }
            })
        };

        Self {
            shutdown_tx,
            handles: vec![ingest_handle, digest_handle],
        }
    }

    /// Stop both timers; in-flight job runs are left to finish on their own
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(true);
        for handle in self.handles {
            let _ = handle.await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Article, Digest, FeedItem, User};
    use crate::policy::KeywordCategorizer;
    use crate::ports::{
        FeedError, MailError, OutgoingEmail, StoreError, SystemClock,
    };
    use crate::summarize::SummaryGateway;
    use crate::usecases::ingest::IngestConfig;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use time::macros::datetime;
    use uuid::Uuid;

    #[test]
    fn delay_targets_today_before_fire_time() {
        let now = datetime!(2025-03-01 08:30:00 UTC);
        let delay = next_digest_delay(now, Time::from_hms(20, 0, 0).unwrap());
        assert_eq!(delay, Duration::from_secs((11 * 60 + 30) * 60));
    }

    #[test]
    fn delay_rolls_to_tomorrow_after_fire_time() {
        let now = datetime!(2025-03-01 21:00:00 UTC);
        let delay = next_digest_delay(now, Time::from_hms(20, 0, 0).unwrap());
        assert_eq!(delay, Duration::from_secs(23 * 3600));
    }

    #[test]
    fn delay_at_fire_instant_rolls_a_full_day() {
        let now = datetime!(2025-03-01 20:00:00 UTC);
        let delay = next_digest_delay(now, Time::from_hms(20, 0, 0).unwrap());
        assert_eq!(delay, Duration::from_secs(24 * 3600));
    }

    struct CountingFeed {
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl FeedSource for CountingFeed {
        async fn fetch_top_headlines(&self, _page_size: u32) -> Result<Vec<FeedItem>, FeedError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(vec![])
        }
    }

    struct NullStore;

    #[async_trait]
    impl ArticleStore for NullStore {
        async fn insert_article(&self, _article: &Article) -> Result<(), StoreError> {
            Ok(())
        }

        async fn find_by_url(&self, _url: &str) -> Result<Option<Article>, StoreError> {
            Ok(None)
        }

        async fn find_by_id(&self, _id: Uuid) -> Result<Option<Article>, StoreError> {
            Ok(None)
        }

        async fn update_summary(
            &self,
            _id: Uuid,
            _summary: Option<&str>,
        ) -> Result<(), StoreError> {
            Ok(())
        }

        async fn published_between(
            &self,
            _start: OffsetDateTime,
            _end: OffsetDateTime,
        ) -> Result<Vec<Article>, StoreError> {
            Ok(vec![])
        }

        async fn count_articles(&self, _filter: Option<&str>) -> Result<u64, StoreError> {
            Ok(0)
        }

        async fn list_articles(
            &self,
            _filter: Option<&str>,
            _offset: u64,
            _limit: u64,
        ) -> Result<Vec<Article>, StoreError> {
            Ok(vec![])
        }
    }

    #[async_trait]
    impl DigestStore for NullStore {
        async fn insert_digest(&self, _digest: &Digest) -> Result<(), StoreError> {
            Ok(())
        }

        async fn latest_for_user(&self, _user_id: Uuid) -> Result<Option<Digest>, StoreError> {
            Ok(None)
        }
    }

    #[async_trait]
    impl UserDirectory for NullStore {
        async fn list_users(&self) -> Result<Vec<User>, StoreError> {
            Ok(vec![])
        }
    }

    #[async_trait]
    impl Mailer for NullStore {
        async fn send(&self, _email: &OutgoingEmail) -> Result<(), MailError> {
            Ok(())
        }

        fn is_enabled(&self) -> bool {
            false
        }
    }

    #[tokio::test(start_paused = true)]
    async fn ingest_timer_fires_immediately_and_on_interval() {
        let calls = Arc::new(AtomicUsize::new(0));
        let store = Arc::new(NullStore);
        let clock = Arc::new(SystemClock);

        let ingest = Arc::new(IngestPipeline::new(
            Arc::new(CountingFeed {
                calls: calls.clone(),
            }),
            store.clone(),
            Arc::new(SummaryGateway::disabled()),
            Arc::new(KeywordCategorizer::default()),
            clock.clone(),
            IngestConfig::default(),
        ));
        let digest = Arc::new(DigestAssembler::new(
            store.clone(),
            store.clone(),
            store.clone(),
            store.clone(),
            Arc::new(SummaryGateway::disabled()),
            clock.clone(),
        ));

        let scheduler = PipelineScheduler::start(
            ingest,
            digest,
            clock,
            ScheduleConfig {
                ingest_interval: Duration::from_secs(3600),
                digest_time: Time::from_hms(20, 0, 0).unwrap(),
            },
        );

        // First tick is immediate; advancing one interval yields a second run
        tokio::time::advance(Duration::from_millis(10)).await;
        drain().await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        tokio::time::advance(Duration::from_secs(3600)).await;
        drain().await;
        assert_eq!(calls.load(Ordering::SeqCst), 2);

        scheduler.shutdown().await;

        let after = calls.load(Ordering::SeqCst);
        tokio::time::advance(Duration::from_secs(7200)).await;
        drain().await;
        assert_eq!(calls.load(Ordering::SeqCst), after);
    }

    /// Let spawned tick handlers run to completion
    async fn drain() {
        for _ in 0..8 {
            tokio::task::yield_now().await;
        }
    }
}
