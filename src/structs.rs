use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::utils::{new_id, now_millis};

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: String,
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub role: String,
    pub token: Option<String>,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct Tenant {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub room_id: Option<String>,
    pub occupation: String,
    pub monthly_rate: i64,
    /// Move-in time, epoch milliseconds.
    pub moved_in_at: i64,
    pub emergency_contact: String,
}

impl Tenant {
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        phone: impl Into<String>,
        occupation: impl Into<String>,
        monthly_rate: i64,
        emergency_contact: impl Into<String>,
    ) -> Self {
        Self {
            id: new_id(),
            name: name.into(),
            email: email.into(),
            phone: phone.into(),
            room_id: None,
            occupation: occupation.into(),
            monthly_rate,
            moved_in_at: now_millis(),
            emergency_contact: emergency_contact.into(),
        }
    }

    pub fn moved_in(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.moved_in_at)
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash, sqlx::Type)]
#[sqlx(rename_all = "lowercase")]
pub enum RoomStatus {
    #[serde(rename = "Tersedia", alias = "tersedia", alias = "available")]
    Available,
    #[serde(rename = "Terisi", alias = "terisi", alias = "occupied")]
    Occupied,
    #[serde(
        rename = "Maintenance",
        alias = "maintenance",
        alias = "Perbaikan",
        alias = "perbaikan"
    )]
    Maintenance,
}

impl RoomStatus {
    pub fn label(self) -> &'static str {
        match self {
            RoomStatus::Available => "Tersedia",
            RoomStatus::Occupied => "Terisi",
            RoomStatus::Maintenance => "Maintenance",
        }
    }
}

impl fmt::Display for RoomStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for RoomStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "tersedia" | "available" => Ok(RoomStatus::Available),
            "terisi" | "occupied" => Ok(RoomStatus::Occupied),
            "maintenance" | "perbaikan" => Ok(RoomStatus::Maintenance),
            other => Err(format!("unknown room status '{}'", other)),
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct Room {
    pub id: String,
    pub room_number: String,
    pub room_type: String,
    pub floor: i32,
    pub monthly_rate: i64,
    pub status: RoomStatus,
}

impl Room {
    pub fn new(
        room_number: impl Into<String>,
        room_type: impl Into<String>,
        floor: i32,
        monthly_rate: i64,
    ) -> Self {
        Self {
            id: new_id(),
            room_number: room_number.into(),
            room_type: room_type.into(),
            floor,
            monthly_rate,
            status: RoomStatus::Available,
        }
    }

    pub fn with_status(mut self, status: RoomStatus) -> Self {
        self.status = status;
        self
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash, sqlx::Type)]
#[sqlx(rename_all = "lowercase")]
pub enum PaymentStatus {
    #[serde(rename = "Lunas", alias = "lunas", alias = "paid")]
    Paid,
    #[serde(
        rename = "Belum Bayar",
        alias = "belum bayar",
        alias = "belum_bayar",
        alias = "unpaid"
    )]
    Unpaid,
    #[serde(rename = "Sebagian", alias = "sebagian", alias = "partial")]
    Partial,
}

impl PaymentStatus {
    pub fn label(self) -> &'static str {
        match self {
            PaymentStatus::Paid => "Lunas",
            PaymentStatus::Unpaid => "Belum Bayar",
            PaymentStatus::Partial => "Sebagian",
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct Payment {
    pub id: String,
    pub tenant_id: String,
    pub room_id: String,
    /// Billing period label, e.g. "Oktober 2026".
    pub period: String,
    pub amount_paid: i64,
    /// Payment time, epoch milliseconds.
    pub paid_at: i64,
    pub status: PaymentStatus,
    pub penalty: i64,
}

impl Payment {
    pub fn new(
        tenant_id: impl Into<String>,
        room_id: impl Into<String>,
        period: impl Into<String>,
        amount_paid: i64,
        status: PaymentStatus,
        penalty: i64,
    ) -> Self {
        Self {
            id: new_id(),
            tenant_id: tenant_id.into(),
            room_id: room_id.into(),
            period: period.into(),
            amount_paid,
            paid_at: now_millis(),
            status,
            penalty,
        }
    }

    pub fn paid_on(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.paid_at)
    }
}

/// Generators for property tests across the crate.
#[cfg(test)]
pub(crate) mod strategies {
    use super::*;
    use proptest::prelude::*;

    fn identifier() -> impl Strategy<Value = String> {
        "[a-z0-9]{8}-[a-z0-9]{4}"
    }

    fn text() -> impl Strategy<Value = String> {
        "[A-Za-z0-9 .,@'-]{0,24}"
    }

    /// Any i64, with the boundaries drawn often.
    pub fn amount() -> impl Strategy<Value = i64> {
        prop_oneof![Just(i64::MIN), Just(i64::MAX), Just(0i64), any::<i64>()]
    }

    pub fn room_status() -> impl Strategy<Value = RoomStatus> {
        prop_oneof![
            Just(RoomStatus::Available),
            Just(RoomStatus::Occupied),
            Just(RoomStatus::Maintenance),
        ]
    }

    pub fn payment_status() -> impl Strategy<Value = PaymentStatus> {
        prop_oneof![
            Just(PaymentStatus::Paid),
            Just(PaymentStatus::Unpaid),
            Just(PaymentStatus::Partial),
        ]
    }

    prop_compose! {
        pub fn tenant()(
            id in identifier(),
            name in text(),
            email in text(),
            phone in "[0-9+]{0,15}",
            room_id in proptest::option::of(identifier()),
            occupation in text(),
            monthly_rate in amount(),
            moved_in_at in amount(),
            emergency_contact in text(),
        ) -> Tenant {
            Tenant { id, name, email, phone, room_id, occupation, monthly_rate, moved_in_at, emergency_contact }
        }
    }

    prop_compose! {
        pub fn room()(
            id in identifier(),
            room_number in "[A-Z]?-?[0-9]{1,4}",
            room_type in text(),
            floor in any::<i32>(),
            monthly_rate in amount(),
            status in room_status(),
        ) -> Room {
            Room { id, room_number, room_type, floor, monthly_rate, status }
        }
    }

    prop_compose! {
        pub fn payment()(
            id in identifier(),
            tenant_id in identifier(),
            room_id in identifier(),
            period in text(),
            amount_paid in amount(),
            paid_at in amount(),
            status in payment_status(),
            penalty in amount(),
        ) -> Payment {
            Payment { id, tenant_id, room_id, period, amount_paid, paid_at, status, penalty }
        }
    }
}
