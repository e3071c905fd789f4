//! Reports service.

use async_trait::async_trait;
use mockall::automock;

use crate::{
    database::Db,
    domain::reports::{
        errors::ReportsServiceError,
        records::{DashboardStats, ReportRange},
        repository::PgReportsRepository,
    },
};

#[derive(Debug, Clone)]
pub struct PgReportsService {
    db: Db,
    repository: PgReportsRepository,
}

impl PgReportsService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            repository: PgReportsRepository::new(),
        }
    }
}

#[async_trait]
impl ReportsService for PgReportsService {
    async fn dashboard(&self, range: ReportRange) -> Result<DashboardStats, ReportsServiceError> {
        if !range.is_ordered() {
            return Err(ReportsServiceError::InvalidDateRange);
        }

        let mut tx = self.db.begin().await?;

        let stats = self.repository.dashboard(&mut tx, range).await?;

        tx.commit().await?;

        Ok(stats)
    }
}

#[automock]
#[async_trait]
pub trait ReportsService: Send + Sync {
    /// Catalog and booking figures, bookings restricted to those created in
    /// `range`.
    async fn dashboard(&self, range: ReportRange) -> Result<DashboardStats, ReportsServiceError>;
}
