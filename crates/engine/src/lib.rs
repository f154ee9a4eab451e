//! Transaction intake, risk evaluation and review workflow for a campus
//! marketplace where students exchange goods, favors and services.
//!
//! [`Engine`] is the entry point. It validates drafts, classifies them with
//! the [`RiskEvaluator`] rules and persists them through a
//! [`TransactionLog`].

pub use commands::{Candidate, ReviewCmd, TransactionDraft};
pub use error::EngineError;
pub use log::{PageRequest, ReferenceCatalog, ReviewPatch, TimeoutLog, TransactionFilter, TransactionLog};
pub use money::Amount;
pub use ops::{Engine, EngineBuilder, Pagination, PairStats, RollingTotal, TransactionPage};
pub use reference_values::{DEFAULT_REFERENCE_VALUES, ReferenceSeed, ReferenceValue};
pub use reviews::TransactionReview;
pub use risk::{
    HeuristicScorer, RiskAssessment, RiskContext, RiskEvaluator, RiskLimits, RiskRule, RiskScorer,
};
pub use store::SqlStore;
pub use transactions::{RiskLevel, Transaction, TransactionKind, TransactionStatus};
pub use validation::validate;

mod commands;
mod error;
mod locks;
mod log;
mod money;
mod ops;
mod reference_values;
mod reviews;
mod risk;
mod store;
mod transactions;
mod util;
mod validation;

pub type ResultEngine<T> = Result<T, EngineError>;
