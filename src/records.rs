//! Rows as they are stored in the local SQLite tables.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::structs::{PaymentStatus, RoomStatus};

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq, FromRow)]
pub struct TenantRecord {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub room_id: Option<String>,
    pub occupation: String,
    pub monthly_rate: i64,
    pub moved_in_at: i64,
    pub emergency_contact: String,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq, FromRow)]
pub struct RoomRecord {
    pub id: String,
    pub room_number: String,
    pub room_type: String,
    pub floor: i32,
    pub monthly_rate: i64,
    pub status: RoomStatus,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq, FromRow)]
pub struct PaymentRecord {
    pub id: String,
    pub tenant_id: String,
    pub room_id: String,
    pub period: String,
    pub amount_paid: i64,
    pub paid_at: i64,
    pub status: PaymentStatus,
    pub penalty: i64,
}
