use chrono::{Datelike, Utc};

const MONTHS_ID: [&str; 12] = [
    "Januari",
    "Februari",
    "Maret",
    "April",
    "Mei",
    "Juni",
    "Juli",
    "Agustus",
    "September",
    "Oktober",
    "November",
    "Desember",
];

/// Client-side id for a new record.
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// Billing period label in the form used by payments, e.g. "Oktober 2026".
pub fn billing_period_label<D: Datelike>(date: &D) -> String {
    format!("{} {}", MONTHS_ID[date.month0() as usize], date.year())
}

pub fn current_billing_period() -> String {
    billing_period_label(&Utc::now())
}

pub fn format_rupiah_compact(amount: i64) -> String {
    match amount {
        a if a >= 1_000_000_000 => format!("Rp {}M", a / 1_000_000_000),
        a if a >= 1_000_000 => format!("Rp {}jt", a / 1_000_000),
        a if a >= 1_000 => format!("Rp {}rb", a / 1_000),
        a => format!("Rp {}", a),
    }
}
