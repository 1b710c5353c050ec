// src/services/cooldown.rs - Business logic
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use log::warn;

use crate::errors::RepositoryError;
use crate::models::CooldownStatus;
use crate::repositories::CooldownRepositoryTrait;

type Result<T> = std::result::Result<T, RepositoryError>;

const MILLIS_PER_MINUTE: i64 = 60_000;

pub struct CooldownService<R: CooldownRepositoryTrait> {
    repository: Arc<R>,
    window: Duration,
    retention: Duration,
}

impl<R: CooldownRepositoryTrait + Send + Sync> CooldownService<R> {
    pub fn new(repository: Arc<R>, window: Duration, retention: Duration) -> Self {
        Self {
            repository,
            window,
            retention,
        }
    }

    /// Reports the visitor's cooldown state, surfacing store failures to the caller
    pub async fn status(&self, sid: &str) -> Result<CooldownStatus> {
        let raw = self.repository.find_last_submission(sid).await?;
        Ok(evaluate(
            raw.as_deref(),
            Utc::now().timestamp_millis(),
            self.window,
        ))
    }

    /// Gate-check variant: a store read failure is logged and reported as
    /// not-on-cooldown, keeping the form reachable while the store is down
    pub async fn check(&self, sid: &str) -> CooldownStatus {
        match self.status(sid).await {
            Ok(status) => status,
            Err(e) => {
                warn!("Cooldown lookup failed, serving the form anyway: {}", e);
                CooldownStatus::inactive()
            }
        }
    }

    /// Records the current instant as the visitor's last submission
    pub async fn stamp(&self, sid: &str) -> Result<i64> {
        let now = Utc::now().timestamp_millis();
        self.repository
            .record_submission(sid, now, self.retention)
            .await?;
        Ok(now)
    }
}

/// Evaluates a stored submission timestamp against the cooldown window.
///
/// A missing, unparseable, or fully elapsed record all mean the same thing:
/// the visitor is not on cooldown.
fn evaluate(last: Option<&str>, now_ms: i64, window: Duration) -> CooldownStatus {
    let window_ms = window.as_millis() as i64;

    let last_ms = match last.and_then(|raw| raw.parse::<i64>().ok()) {
        Some(ms) => ms,
        None => return CooldownStatus::inactive(),
    };

    let elapsed = now_ms - last_ms;
    if elapsed >= window_ms {
        return CooldownStatus::inactive();
    }

    let remaining = window_ms - elapsed;
    CooldownStatus {
        active: true,
        // Whole minutes remaining, rounded up
        retry_after: ((remaining + MILLIS_PER_MINUTE - 1) / MILLIS_PER_MINUTE) as u64,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::MockCooldownRepositoryTrait;

    const WINDOW: Duration = Duration::from_secs(30 * 60);
    const RETENTION: Duration = Duration::from_secs(14 * 24 * 60 * 60);

    fn service(
        repository: MockCooldownRepositoryTrait,
    ) -> CooldownService<MockCooldownRepositoryTrait> {
        CooldownService::new(Arc::new(repository), WINDOW, RETENTION)
    }

    fn store_error() -> RepositoryError {
        RepositoryError::Store(redis::RedisError::from((
            redis::ErrorKind::IoError,
            "connection refused",
        )))
    }

    #[test]
    fn no_record_is_not_on_cooldown() {
        assert_eq!(evaluate(None, 1_000_000, WINDOW), CooldownStatus::inactive());
    }

    #[test]
    fn unparseable_record_is_not_on_cooldown() {
        assert_eq!(
            evaluate(Some("not-a-number"), 1_000_000, WINDOW),
            CooldownStatus::inactive()
        );
    }

    #[test]
    fn ten_minutes_elapsed_leaves_twenty_minutes() {
        let status = evaluate(Some("0"), 10 * MILLIS_PER_MINUTE, WINDOW);
        assert_eq!(
            status,
            CooldownStatus {
                active: true,
                retry_after: 20,
            }
        );
    }

    #[test]
    fn elapsed_window_reopens_the_form() {
        // The boundary itself counts as expired, and it stays expired
        assert_eq!(
            evaluate(Some("0"), 30 * MILLIS_PER_MINUTE, WINDOW),
            CooldownStatus::inactive()
        );
        assert_eq!(
            evaluate(Some("0"), 31 * MILLIS_PER_MINUTE, WINDOW),
            CooldownStatus::inactive()
        );
    }

    #[test]
    fn partial_minutes_round_up() {
        // 29m30s remaining reports 30 whole minutes
        assert_eq!(evaluate(Some("0"), 30_000, WINDOW).retry_after, 30);
        // 1ms into the window still reports the full 30
        assert_eq!(evaluate(Some("0"), 1, WINDOW).retry_after, 30);
        // 1ms of remaining time still reports a final minute
        assert_eq!(
            evaluate(Some("0"), 30 * MILLIS_PER_MINUTE - 1, WINDOW).retry_after,
            1
        );
    }

    #[tokio::test]
    async fn fresh_stamp_reports_full_window() {
        let mut repository = MockCooldownRepositoryTrait::new();
        repository
            .expect_record_submission()
            .withf(|sid, _, retention| sid == "visitor-1" && *retention == RETENTION)
            .times(1)
            .returning(|_, _, _| Ok(()));

        let service = service(repository);
        let ts = service.stamp("visitor-1").await.expect("stamp should succeed");

        assert_eq!(evaluate(Some(&ts.to_string()), ts, WINDOW).retry_after, 30);
    }

    #[tokio::test]
    async fn active_record_reported_through_status() {
        let now = Utc::now().timestamp_millis();
        let mut repository = MockCooldownRepositoryTrait::new();
        repository
            .expect_find_last_submission()
            .withf(|sid| sid == "visitor-1")
            .returning(move |_| Ok(Some((now - 10 * MILLIS_PER_MINUTE).to_string())));

        let service = service(repository);
        let status = service
            .status("visitor-1")
            .await
            .expect("status should succeed");

        assert!(status.active);
        assert_eq!(status.retry_after, 20);
    }

    #[tokio::test]
    async fn check_fails_open_on_read_error() {
        let mut repository = MockCooldownRepositoryTrait::new();
        repository
            .expect_find_last_submission()
            .returning(|_| Err(store_error()));

        let service = service(repository);
        assert_eq!(service.check("visitor-1").await, CooldownStatus::inactive());
    }

    #[tokio::test]
    async fn status_surfaces_read_errors() {
        let mut repository = MockCooldownRepositoryTrait::new();
        repository
            .expect_find_last_submission()
            .returning(|_| Err(store_error()));

        let service = service(repository);
        assert!(service.status("visitor-1").await.is_err());
    }

    #[tokio::test]
    async fn stamp_surfaces_write_errors() {
        let mut repository = MockCooldownRepositoryTrait::new();
        repository
            .expect_record_submission()
            .returning(|_, _, _| Err(store_error()));

        let service = service(repository);
        assert!(service.stamp("visitor-1").await.is_err());
    }
}
