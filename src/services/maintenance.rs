use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info};

use crate::models::MaintenanceAudit;
use crate::store::{AuditStore, StoreResult};

/// Действия обслуживания. Реальной работы не выполняют: только пишут
/// строку в maintenance_audit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaintenanceAction {
    Backup,
    ClearCache,
    Diagnostics,
}

impl MaintenanceAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            MaintenanceAction::Backup => "backup",
            MaintenanceAction::ClearCache => "clear_cache",
            MaintenanceAction::Diagnostics => "diagnostics",
        }
    }

    fn message(&self) -> &'static str {
        match self {
            MaintenanceAction::Backup => "Database backup started (simulated)",
            MaintenanceAction::ClearCache => "Cache cleared (simulated)",
            MaintenanceAction::Diagnostics => "Diagnostics completed (simulated)",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MaintenanceOutcome {
    pub status: &'static str,
    pub message: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct SystemHealth {
    pub database: &'static str,
    pub server_load: &'static str,
    pub api_response_ms: u128,
    pub last_backup: Option<String>,
}

#[derive(Clone)]
pub struct MaintenanceService {
    audit: Arc<dyn AuditStore>,
}

impl MaintenanceService {
    pub fn new(audit: Arc<dyn AuditStore>) -> Self {
        Self { audit }
    }

    pub async fn run(&self, action: MaintenanceAction) -> StoreResult<MaintenanceOutcome> {
        self.audit.record_audit(action.as_str(), "ok").await?;
        info!(action = action.as_str(), "maintenance action recorded");
        Ok(MaintenanceOutcome { status: "ok", message: action.message() })
    }

    pub async fn recent(&self, limit: i64) -> StoreResult<Vec<MaintenanceAudit>> {
        self.audit.recent_audit(limit).await
    }

    /// Пингует хранилище и сообщает время ответа и дату последнего бэкапа.
    /// Ошибки хранилища не пробрасываются: отчет просто показывает `down`.
    pub async fn health(&self) -> SystemHealth {
        let started = Instant::now();
        let ping = self.audit.ping().await;
        let api_response_ms = started.elapsed().as_millis();

        if let Err(e) = ping {
            error!("health check ping failed: {:?}", e);
            return SystemHealth { database: "down", server_load: "normal", api_response_ms, last_backup: None };
        }

        let last_backup = match self.audit.last_audit(MaintenanceAction::Backup.as_str()).await {
            Ok(row) => row.map(|a| a.created_at.format("%Y-%m-%d %H:%M:%S").to_string()),
            Err(e) => {
                error!("failed to read last backup: {:?}", e);
                None
            }
        };

        SystemHealth { database: "connected", server_load: "normal", api_response_ms, last_backup }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    #[tokio::test]
    async fn actions_write_audit_rows() {
        let service = MaintenanceService::new(Arc::new(MemoryStore::new()));

        let outcome = service.run(MaintenanceAction::ClearCache).await.unwrap();
        assert_eq!(outcome.message, "Cache cleared (simulated)");

        let audit = service.recent(10).await.unwrap();
        assert_eq!(audit.len(), 1);
        assert_eq!(audit[0].action, "clear_cache");
        assert_eq!(audit[0].result, "ok");
    }

    #[tokio::test]
    async fn health_reports_last_backup() {
        let service = MaintenanceService::new(Arc::new(MemoryStore::new()));
        assert_eq!(service.health().await.last_backup, None);

        service.run(MaintenanceAction::Diagnostics).await.unwrap();
        assert_eq!(service.health().await.last_backup, None);

        service.run(MaintenanceAction::Backup).await.unwrap();
        let health = service.health().await;
        assert_eq!(health.database, "connected");
        assert!(health.last_backup.is_some());
    }
}
