use serde::Serialize;

use crate::structs::{Payment, PaymentStatus, Room, RoomStatus, Tenant};

/// Headline numbers for the home screen.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DashboardSummary {
    pub period: String,
    pub total_rooms: usize,
    pub available_rooms: usize,
    pub occupied_rooms: usize,
    pub maintenance_rooms: usize,
    pub tenants: usize,
    /// Sum of fully paid amounts for the period.
    pub income: i64,
    pub outstanding_payments: usize,
}

impl DashboardSummary {
    pub fn compute(rooms: &[Room], tenants: &[Tenant], payments: &[Payment], period: &str) -> Self {
        let count = |status: RoomStatus| rooms.iter().filter(|r| r.status == status).count();
        let in_period = payments.iter().filter(|p| p.period.contains(period));

        let (income, outstanding_payments) =
            in_period.fold((0i64, 0usize), |(income, outstanding), p| match p.status {
                PaymentStatus::Paid => (income + p.amount_paid, outstanding),
                PaymentStatus::Unpaid | PaymentStatus::Partial => (income, outstanding + 1),
            });

        Self {
            period: period.to_owned(),
            total_rooms: rooms.len(),
            available_rooms: count(RoomStatus::Available),
            occupied_rooms: count(RoomStatus::Occupied),
            maintenance_rooms: count(RoomStatus::Maintenance),
            tenants: tenants.len(),
            income,
            outstanding_payments,
        }
    }

    /// Occupied share of all rooms, 0.0 when there are none.
    pub fn occupancy_rate(&self) -> f64 {
        if self.total_rooms == 0 {
            return 0.0;
        }
        self.occupied_rooms as f64 / self.total_rooms as f64
    }
}

#[derive(Debug, Clone, Default)]
pub struct RoomFilter {
    pub status: Option<RoomStatus>,
    pub query: String,
}

impl RoomFilter {
    pub fn matches(&self, room: &Room) -> bool {
        let status_ok = self.status.map_or(true, |s| room.status == s);
        let query = self.query.trim().to_lowercase();
        let query_ok = query.is_empty()
            || room.room_number.to_lowercase().contains(&query)
            || room.room_type.to_lowercase().contains(&query);
        status_ok && query_ok
    }

    pub fn apply<'a>(&self, rooms: &'a [Room]) -> Vec<&'a Room> {
        rooms.iter().filter(|r| self.matches(r)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rooms() -> Vec<Room> {
        vec![
            Room::new("101", "Standard", 1, 800_000).with_status(RoomStatus::Occupied),
            Room::new("102", "Standard", 1, 800_000),
            Room::new("201", "Deluxe AC", 2, 1_500_000).with_status(RoomStatus::Occupied),
            Room::new("202", "Deluxe AC", 2, 1_500_000).with_status(RoomStatus::Maintenance),
        ]
    }

    #[test]
    fn summary_counts_rooms_and_period_income() {
        let rooms = rooms();
        let payments = vec![
            Payment::new("t1", "r1", "Oktober 2026", 800_000, PaymentStatus::Paid, 0),
            Payment::new("t2", "r2", "Oktober 2026", 1_500_000, PaymentStatus::Paid, 0),
            Payment::new("t3", "r3", "Oktober 2026", 400_000, PaymentStatus::Partial, 0),
            Payment::new("t1", "r1", "September 2026", 800_000, PaymentStatus::Paid, 0),
        ];

        let summary = DashboardSummary::compute(&rooms, &[], &payments, "Oktober 2026");
        assert_eq!(summary.total_rooms, 4);
        assert_eq!(summary.occupied_rooms, 2);
        assert_eq!(summary.available_rooms, 1);
        assert_eq!(summary.maintenance_rooms, 1);
        assert_eq!(summary.income, 2_300_000);
        assert_eq!(summary.outstanding_payments, 1);
        assert_eq!(summary.occupancy_rate(), 0.5);
    }

    #[test]
    fn empty_summary_has_zero_rate() {
        let summary = DashboardSummary::compute(&[], &[], &[], "Mei 2026");
        assert_eq!(summary.occupancy_rate(), 0.0);
        assert_eq!(summary.income, 0);
    }

    #[test]
    fn filter_by_status_and_search() {
        let rooms = rooms();
        let filter = RoomFilter {
            status: Some(RoomStatus::Occupied),
            query: "deluxe".into(),
        };
        let found = filter.apply(&rooms);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].room_number, "201");

        let everything = RoomFilter::default().apply(&rooms);
        assert_eq!(everything.len(), 4);

        let by_number = RoomFilter {
            status: None,
            query: "10".into(),
        };
        assert_eq!(by_number.apply(&rooms).len(), 2);
    }
}
