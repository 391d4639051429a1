pub mod aggregate;
pub mod analyze;
pub mod audit;
pub mod checks;
pub mod config;
pub mod error;
pub mod executor;
pub mod model;
pub mod report;

pub use aggregate::{AuditAccumulator, aggregate};
pub use analyze::PageAnalyzer;
pub use audit::{Auditor, PhaseCallback, execute_audit};
pub use checks::{Check, CheckSet, PageSnapshot};
pub use config::{AuditOptions, AuditRequest, CheckConfig, RetryPolicy};
pub use error::{AuditError, CheckError, ConfigError};
pub use executor::{BatchOutcome, Executor, Failed, Succeeded};
pub use model::{AuditResult, Category, CategoryMap, FailedPage, Issue, PageResult, RunPhase, Severity};
