//! Audit collaborator: records who changed what, and how long it took.
//!
//! Calls are best-effort. The service logs a failed call and moves on.

use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuditError {
    #[error("audit sink unavailable: {0}")]
    Unavailable(String),
}

pub trait AuditLogger: Send + Sync {
    fn log_operation(&self, name: &str, details: &str, actor: &str) -> Result<(), AuditError>;

    fn log_data_change(
        &self,
        entity_type: &str,
        entity_id: &str,
        description: &str,
        actor: &str,
    ) -> Result<(), AuditError>;

    fn log_performance_metric(
        &self,
        name: &str,
        duration: Duration,
        details: &str,
    ) -> Result<(), AuditError>;
}

/// Emits audit records as `tracing` events on the `audit` target.
pub struct TracingAuditLogger;

impl AuditLogger for TracingAuditLogger {
    fn log_operation(&self, name: &str, details: &str, actor: &str) -> Result<(), AuditError> {
        tracing::info!(target: "audit", operation = name, actor, details, "operation");
        Ok(())
    }

    fn log_data_change(
        &self,
        entity_type: &str,
        entity_id: &str,
        description: &str,
        actor: &str,
    ) -> Result<(), AuditError> {
        tracing::info!(
            target: "audit",
            entity_type,
            entity_id,
            actor,
            description,
            "data change"
        );
        Ok(())
    }

    fn log_performance_metric(
        &self,
        name: &str,
        duration: Duration,
        details: &str,
    ) -> Result<(), AuditError> {
        tracing::debug!(
            target: "audit",
            metric = name,
            elapsed_ms = duration.as_secs_f64() * 1000.0,
            details,
            "performance"
        );
        Ok(())
    }
}

/// Discards every record.
pub struct NoAudit;

impl AuditLogger for NoAudit {
    fn log_operation(&self, _name: &str, _details: &str, _actor: &str) -> Result<(), AuditError> {
        Ok(())
    }

    fn log_data_change(
        &self,
        _entity_type: &str,
        _entity_id: &str,
        _description: &str,
        _actor: &str,
    ) -> Result<(), AuditError> {
        Ok(())
    }

    fn log_performance_metric(
        &self,
        _name: &str,
        _duration: Duration,
        _details: &str,
    ) -> Result<(), AuditError> {
        Ok(())
    }
}
