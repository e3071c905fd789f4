//! Reports Repository

use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{Postgres, Transaction, query};

use crate::{
    database::try_get_amount,
    domain::reports::records::{DashboardStats, ReportRange, rounded_mean},
};

const DASHBOARD_SQL: &str = include_str!("sql/dashboard.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgReportsRepository;

impl PgReportsRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn dashboard(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        range: ReportRange,
    ) -> Result<DashboardStats, sqlx::Error> {
        let row = query(DASHBOARD_SQL)
            .bind(range.start.map(SqlxTimestamp::from))
            .bind(range.end.map(SqlxTimestamp::from))
            .fetch_one(&mut **tx)
            .await?;

        let total_revenue = try_get_amount(&row, "total_revenue")?;
        let revenue_bookings = try_get_amount(&row, "revenue_bookings")?;

        Ok(DashboardStats {
            total_products: try_get_amount(&row, "total_products")?,
            total_customers: try_get_amount(&row, "total_customers")?,
            total_bookings: try_get_amount(&row, "total_bookings")?,
            active_rentals: try_get_amount(&row, "active_rentals")?,
            total_revenue,
            average_booking_value: rounded_mean(total_revenue, revenue_bookings),
        })
    }
}

