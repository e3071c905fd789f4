//! Report Records

use jiff::Timestamp;

/// Optional creation-time window of the bookings a report covers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReportRange {
    pub start: Option<Timestamp>,
    pub end: Option<Timestamp>,
}

impl ReportRange {
    #[must_use]
    pub fn is_ordered(&self) -> bool {
        match (self.start, self.end) {
            (Some(start), Some(end)) => start <= end,
            _ => true,
        }
    }
}

/// Admin dashboard figures. Money is in minor units.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DashboardStats {
    pub total_products: u64,
    pub total_customers: u64,
    pub total_bookings: u64,
    pub active_rentals: u64,

    /// Sum of the totals of active and completed bookings.
    pub total_revenue: u64,

    /// Mean total of active and completed bookings, rounded half up.
    pub average_booking_value: u64,
}

/// Mean of `count` values summing to `total`, rounded half up.
pub(crate) fn rounded_mean(total: u64, count: u64) -> u64 {
    if count == 0 {
        return 0;
    }

    let (quotient, remainder) = (total / count, total % count);

    if remainder >= count - remainder {
        quotient + 1
    } else {
        quotient
    }
}
