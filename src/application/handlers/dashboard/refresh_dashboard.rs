//! DashboardRefreshService - Last-request-wins publication of dashboard runs.
//!
//! Each submission gets a generation number. A finished run publishes its
//! bundle only while its generation is still the newest one; otherwise the
//! result is dropped. Subscribers observe published bundles through a
//! `watch` channel and never see a superseded or partial result.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::watch;

use crate::domain::dashboard::DashboardBundle;
use crate::domain::filtering::FilterState;

use super::compute_dashboard::{ComputeDashboardHandler, ComputeDashboardQuery};
use super::DashboardError;

/// Latest published bundle, if any run has succeeded yet.
pub type PublishedBundle = Option<Arc<DashboardBundle>>;

/// What happened to a submitted run.
#[derive(Debug, Clone, PartialEq)]
pub enum RefreshOutcome {
    /// The run was the newest when it finished and its bundle is now visible.
    Published(Arc<DashboardBundle>),

    /// A newer submission arrived while the run was in flight.
    Superseded { generation: u64 },
}

/// Serializes dashboard runs into a single published view.
pub struct DashboardRefreshService {
    handler: ComputeDashboardHandler,
    generation: AtomicU64,
    publisher: watch::Sender<PublishedBundle>,
}

impl DashboardRefreshService {
    pub fn new(handler: ComputeDashboardHandler) -> Self {
        let (publisher, _) = watch::channel(None);
        Self {
            handler,
            generation: AtomicU64::new(0),
            publisher,
        }
    }

    /// Receiver notified on every publication.
    pub fn subscribe(&self) -> watch::Receiver<PublishedBundle> {
        self.publisher.subscribe()
    }

    /// The most recently published bundle.
    pub fn latest(&self) -> PublishedBundle {
        self.publisher.borrow().clone()
    }

    /// Runs the pipeline for `filters` and publishes the bundle if no newer
    /// submission arrived meanwhile.
    ///
    /// A failed run leaves the last published bundle untouched. Failures of
    /// superseded runs are not reported.
    pub async fn submit(&self, filters: FilterState) -> Result<RefreshOutcome, DashboardError> {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let result = self.handler.handle(ComputeDashboardQuery { filters }).await;

        let bundle = match result {
            Ok(bundle) => Arc::new(bundle),
            Err(err) if self.is_latest(generation) => {
                tracing::warn!(generation, error = %err, "Dashboard refresh failed, keeping last bundle");
                return Err(err);
            }
            Err(err) => {
                tracing::warn!(generation, error = %err, "Superseded dashboard run failed");
                return Ok(RefreshOutcome::Superseded { generation });
            }
        };

        // The generation check happens under the channel lock so an older run
        // can never overwrite a newer publication.
        let published = self.publisher.send_if_modified(|slot| {
            if !self.is_latest(generation) {
                return false;
            }
            *slot = Some(Arc::clone(&bundle));
            true
        });

        if published {
            tracing::debug!(generation, run_id = %bundle.meta.run_id, "Published dashboard bundle");
            Ok(RefreshOutcome::Published(bundle))
        } else {
            tracing::warn!(
                generation,
                latest = self.generation.load(Ordering::SeqCst),
                run_id = %bundle.meta.run_id,
                "Discarding superseded dashboard run"
            );
            Ok(RefreshOutcome::Superseded { generation })
        }
    }

    fn is_latest(&self, generation: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == generation
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{FixedClock, InMemoryProductionTable};
    use crate::domain::filtering::{Dimension, Predicate};
    use crate::domain::production::{Column, ProductionRecord, Value};
    use crate::ports::{Expression, GroupQuery, GroupRow, RelationError, RelationProvider};
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use std::sync::atomic::AtomicBool;
    use std::sync::Mutex;
    use tokio::sync::{oneshot, Notify};

    // ─────────────────────────────────────────────────────────────────────
    // Test relation
    // ─────────────────────────────────────────────────────────────────────

    /// In-memory relation whose first `count` call can be held open and
    /// whose grouped queries can be switched to fail.
    struct ControlledRelation {
        inner: InMemoryProductionTable,
        gate: Mutex<Option<oneshot::Receiver<()>>>,
        entered: Notify,
        fail_groups: AtomicBool,
    }

    impl ControlledRelation {
        fn new(gate: Option<oneshot::Receiver<()>>) -> Self {
            let date = NaiveDate::from_ymd_opt(2026, 3, 2).unwrap();
            let record = |unit: &str, amount: f64| ProductionRecord {
                patient_id: unit.to_string(),
                company_id: "C".to_string(),
                confirmation_date: date,
                completion_date: Some(date),
                amount,
                status: "Confirmado".to_string(),
                unit: Some(unit.to_string()),
                sub_area: None,
                specialty: None,
                category: None,
                attendance_type: None,
                service_type: None,
            };
            Self {
                inner: InMemoryProductionTable::new(vec![record("Norte", 10.0), record("Sul", 20.0)]),
                gate: Mutex::new(gate),
                entered: Notify::new(),
                fail_groups: AtomicBool::new(false),
            }
        }
    }

    #[async_trait]
    impl RelationProvider for ControlledRelation {
        async fn count(&self, predicate: &Predicate) -> Result<u64, RelationError> {
            let gate = self.gate.lock().unwrap().take();
            if let Some(gate) = gate {
                self.entered.notify_one();
                let _ = gate.await;
            }
            self.inner.count(predicate).await
        }

        async fn sum(&self, column: Column, predicate: &Predicate) -> Result<f64, RelationError> {
            self.inner.sum(column, predicate).await
        }

        async fn avg(
            &self,
            expression: Expression,
            predicate: &Predicate,
        ) -> Result<Option<f64>, RelationError> {
            self.inner.avg(expression, predicate).await
        }

        async fn distinct_count(
            &self,
            column: Column,
            predicate: &Predicate,
        ) -> Result<u64, RelationError> {
            self.inner.distinct_count(column, predicate).await
        }

        async fn group_by(&self, query: &GroupQuery) -> Result<Vec<GroupRow>, RelationError> {
            if self.fail_groups.load(Ordering::SeqCst) {
                return Err(RelationError::query("relation dropped"));
            }
            self.inner.group_by(query).await
        }

        async fn distinct_values(
            &self,
            column: Column,
            predicate: &Predicate,
        ) -> Result<Vec<Value>, RelationError> {
            self.inner.distinct_values(column, predicate).await
        }
    }

    fn service(relation: Arc<ControlledRelation>) -> DashboardRefreshService {
        let clock = FixedClock(NaiveDate::from_ymd_opt(2026, 10, 15).unwrap());
        DashboardRefreshService::new(ComputeDashboardHandler::new(relation, Arc::new(clock)))
    }

    fn unit(unit: &str) -> FilterState {
        FilterState::default().with_selected(Dimension::Unit, unit)
    }

    // ─────────────────────────────────────────────────────────────────────
    // Tests
    // ─────────────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_successful_run_is_published() {
        let service = service(Arc::new(ControlledRelation::new(None)));
        let mut updates = service.subscribe();
        assert!(service.latest().is_none());

        let outcome = service.submit(unit("Norte")).await.unwrap();

        let RefreshOutcome::Published(bundle) = outcome else {
            panic!("expected publication");
        };
        assert_eq!(bundle.kpis.realized_value, 10.0);
        assert!(updates.has_changed().unwrap());
        let seen = updates.borrow_and_update().clone();
        assert_eq!(seen, Some(bundle));
    }

    #[tokio::test]
    async fn test_in_flight_run_is_superseded_by_newer_request() {
        let (release, gate) = oneshot::channel();
        let relation = Arc::new(ControlledRelation::new(Some(gate)));
        let service = Arc::new(service(relation.clone()));

        let slow = tokio::spawn({
            let service = Arc::clone(&service);
            async move { service.submit(unit("Norte")).await }
        });
        relation.entered.notified().await;

        let fast = service.submit(unit("Sul")).await.unwrap();
        assert!(matches!(fast, RefreshOutcome::Published(_)));

        release.send(()).unwrap();
        let slow = slow.await.unwrap().unwrap();

        assert_eq!(slow, RefreshOutcome::Superseded { generation: 1 });
        let latest = service.latest().unwrap();
        assert_eq!(latest.kpis.realized_value, 20.0);
    }

    #[tokio::test]
    async fn test_failed_run_keeps_last_bundle() {
        let relation = Arc::new(ControlledRelation::new(None));
        let service = service(relation.clone());

        let RefreshOutcome::Published(first) = service.submit(unit("Norte")).await.unwrap() else {
            panic!("expected publication");
        };

        relation.fail_groups.store(true, Ordering::SeqCst);
        let result = service.submit(unit("Sul")).await;

        assert_eq!(result, Err(DashboardError::Query("relation dropped".to_string())));
        let latest = service.latest().unwrap();
        assert_eq!(latest.meta.run_id, first.meta.run_id);
    }
}
