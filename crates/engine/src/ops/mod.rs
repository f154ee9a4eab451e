use std::{fmt, sync::Arc, time::Duration};

use sea_orm::DatabaseConnection;

use crate::{
    EngineError, ReferenceCatalog, ResultEngine, SqlStore, TimeoutLog, TransactionLog,
    locks::KeyedLocks,
    risk::{HeuristicScorer, RiskEvaluator, RiskLimits, RiskScorer},
};

mod intake;
mod reference;
mod review;
mod stats;

pub use intake::TransactionPage;
pub use stats::{PairStats, RollingTotal};

/// Page size bounds for listings.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Pagination {
    pub default_limit: u64,
    pub max_limit: u64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            default_limit: 20,
            max_limit: 100,
        }
    }
}

pub struct Engine {
    log: Arc<dyn TransactionLog>,
    catalog: Arc<dyn ReferenceCatalog>,
    evaluator: RiskEvaluator,
    locks: KeyedLocks,
    pagination: Pagination,
}

impl fmt::Debug for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("evaluator", &self.evaluator)
            .field("pagination", &self.pagination)
            .finish_non_exhaustive()
    }
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    pub fn limits(&self) -> &RiskLimits {
        self.evaluator.limits()
    }

    pub fn pagination(&self) -> Pagination {
        self.pagination
    }
}

/// The builder for `Engine`
#[derive(Default)]
pub struct EngineBuilder {
    log: Option<Arc<dyn TransactionLog>>,
    catalog: Option<Arc<dyn ReferenceCatalog>>,
    limits: RiskLimits,
    scorer: Option<Arc<dyn RiskScorer>>,
    query_timeout: Option<Duration>,
    pagination: Pagination,
}

impl EngineBuilder {
    /// Pass the required database. Installs [`SqlStore`] as both the log and
    /// the reference catalog.
    pub fn database(self, db: DatabaseConnection) -> EngineBuilder {
        let store = Arc::new(SqlStore::new(db));
        self.log(store.clone()).catalog(store)
    }

    pub fn log(mut self, log: Arc<dyn TransactionLog>) -> EngineBuilder {
        self.log = Some(log);
        self
    }

    pub fn catalog(mut self, catalog: Arc<dyn ReferenceCatalog>) -> EngineBuilder {
        self.catalog = Some(catalog);
        self
    }

    pub fn limits(mut self, limits: RiskLimits) -> EngineBuilder {
        self.limits = limits;
        self
    }

    /// Replace the built-in [`HeuristicScorer`].
    pub fn scorer(mut self, scorer: Arc<dyn RiskScorer>) -> EngineBuilder {
        self.scorer = Some(scorer);
        self
    }

    /// Bound every log query; unbounded when not set.
    pub fn query_timeout(mut self, timeout: Duration) -> EngineBuilder {
        self.query_timeout = Some(timeout);
        self
    }

    pub fn pagination(mut self, pagination: Pagination) -> EngineBuilder {
        self.pagination = pagination;
        self
    }

    /// Construct `Engine`
    pub async fn build(self) -> ResultEngine<Engine> {
        let log = self
            .log
            .ok_or_else(|| EngineError::Config("a transaction log is required".to_string()))?;
        let catalog = self
            .catalog
            .ok_or_else(|| EngineError::Config("a reference catalog is required".to_string()))?;

        if self.pagination.default_limit == 0
            || self.pagination.default_limit > self.pagination.max_limit
        {
            return Err(EngineError::Config(format!(
                "default page size {} must be between 1 and {}",
                self.pagination.default_limit, self.pagination.max_limit
            )));
        }
        if self.limits.window <= chrono::TimeDelta::zero() {
            return Err(EngineError::Config(
                "risk window must be positive".to_string(),
            ));
        }

        let log: Arc<dyn TransactionLog> = match self.query_timeout {
            Some(timeout) => Arc::new(TimeoutLog::new(log, timeout)),
            None => log,
        };
        let scorer = self
            .scorer
            .unwrap_or_else(|| Arc::new(HeuristicScorer::default()));

        Ok(Engine {
            log,
            catalog,
            evaluator: RiskEvaluator::new(self.limits, scorer),
            locks: KeyedLocks::default(),
            pagination: self.pagination,
        })
    }
}
