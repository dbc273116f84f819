//! Digest assembler - per-user matching, summarization, persistence, dispatch

use std::sync::Arc;

use time::Time;
use uuid::Uuid;

use crate::{
    model::{Article, Digest, DigestOutcome, User},
    ports::{ArticleStore, Clock, DigestStore, Mailer, StoreError, UserDirectory},
    summarize::SummaryGateway,
    usecases::render::render_digest_email,
};

/// Digest assembler orchestrator
///
/// One invocation assembles and dispatches digests for every user with
/// matching interests. Failures are isolated per user and per step: a failed
/// summarization still produces a digest, a failed email leaves the persisted
/// digest in place, and no user's failure touches another user.
pub struct DigestAssembler<A, D, U, M, Cl>
where
    A: ArticleStore + ?Sized,
    D: DigestStore + ?Sized,
    U: UserDirectory + ?Sized,
    M: Mailer + ?Sized,
    Cl: Clock + ?Sized,
{
    articles: Arc<A>,
    digests: Arc<D>,
    users: Arc<U>,
    mailer: Arc<M>,
    gateway: Arc<SummaryGateway>,
    clock: Arc<Cl>,
}

impl<A, D, U, M, Cl> DigestAssembler<A, D, U, M, Cl>
where
    A: ArticleStore + ?Sized,
    D: DigestStore + ?Sized,
    U: UserDirectory + ?Sized,
    M: Mailer + ?Sized,
    Cl: Clock + ?Sized,
{
    pub fn new(
        articles: Arc<A>,
        digests: Arc<D>,
        users: Arc<U>,
        mailer: Arc<M>,
        gateway: Arc<SummaryGateway>,
        clock: Arc<Cl>,
    ) -> Self {
        Self {
            articles,
            digests,
            users,
            mailer,
            gateway,
            clock,
        }
    }

    /// Run one digest cycle over all users
    ///
    /// Only loading the inputs (article window, user list) can fail the run.
    pub async fn run_once(&self) -> Result<Vec<(Uuid, DigestOutcome)>, DigestError> {
        let now = self.clock.now();
        let window_start = now.replace_time(Time::MIDNIGHT);

        let todays_articles = self
            .articles
            .published_between(window_start, now)
            .await
            .map_err(|e| DigestError::Store(e.to_string()))?;

        tracing::info!(
            window_start = %window_start,
            count = todays_articles.len(),
            "Loaded today's articles"
        );

        let users = self
            .users
            .list_users()
            .await
            .map_err(|e| DigestError::Store(e.to_string()))?;

        let mut outcomes = Vec::with_capacity(users.len());
        for user in &users {
            let outcome = self.process_user(user, &todays_articles, now).await;
            match &outcome {
                DigestOutcome::Delivered { digest_id, emailed } => {
                    tracing::info!(user = %user.email, digest_id = %digest_id, emailed, "Digest delivered");
                }
                DigestOutcome::Skipped { reason } => {
                    tracing::debug!(user = %user.email, reason = %reason, "Digest skipped");
                }
                DigestOutcome::Failed { error } => {
                    tracing::error!(user = %user.email, error = %error, "Digest failed");
                }
            }
            outcomes.push((user.id, outcome));
        }

        Ok(outcomes)
    }

    async fn process_user(
        &self,
        user: &User,
        todays_articles: &[Article],
        now: time::OffsetDateTime,
    ) -> DigestOutcome {
        if user.interests.is_empty() {
            return DigestOutcome::Skipped {
                reason: "no interests".to_string(),
            };
        }

        let matching: Vec<Article> = todays_articles
            .iter()
            .filter(|a| user.interests.iter().any(|i| *i == a.category))
            .cloned()
            .collect();

        if matching.is_empty() {
            return DigestOutcome::Skipped {
                reason: "no matching articles".to_string(),
            };
        }

        // Best effort, rate limiting included: a digest is still created
        // when the overview cannot be generated.
        let summary_text = match self.gateway.summarize_digest(&matching).await {
            Ok(text) => text,
            Err(e) => {
                tracing::error!(user = %user.email, error = %e, "Error summarizing digest");
                None
            }
        };

        let digest = Digest {
            id: Uuid::new_v4(),
            user_id: user.id,
            date: now,
            articles: matching,
            summary_text,
        };

        if let Err(e) = self.digests.insert_digest(&digest).await {
            return DigestOutcome::Failed {
                error: format!("Failed to persist digest: {e}"),
            };
        }

        // The persisted digest is never rolled back on email failure
        let emailed = if self.mailer.is_enabled() {
            let email = render_digest_email(user, &digest);
            match self.mailer.send(&email).await {
                Ok(()) => true,
                Err(e) => {
                    tracing::error!(user = %user.email, error = %e, "Error sending digest email");
                    false
                }
            }
        } else {
            tracing::warn!("Mailer not configured, skipping email send");
            false
        };

        DigestOutcome::Delivered {
            digest_id: digest.id,
            emailed,
        }
    }
}

/// Errors from the digest assembler
#[derive(Debug, thiserror::Error)]
pub enum DigestError {
    #[error("Store error: {0}")]
    Store(String),
}

/// Most recent digest for a user
///
/// Interactive lookup used by the CLI; `NotFound` when the user has no
/// digest yet.
pub async fn latest_digest<D: DigestStore + ?Sized>(
    digests: &D,
    user_id: Uuid,
) -> Result<Digest, StoreError> {
    digests
        .latest_for_user(user_id)
        .await?
        .ok_or_else(|| StoreError::NotFound(format!("no digest for user {user_id}")))
}
