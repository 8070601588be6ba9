//! Wire representations exchanged with the REST service.

use serde::{Deserialize, Serialize};

use crate::structs::{PaymentStatus, RoomStatus};

#[derive(Serialize, Debug, Clone)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Deserialize, Debug, Clone)]
pub struct LoginResponse {
    pub token: String,
    pub user: UserDto,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct UserDto {
    pub id: String,
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub role: String,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct TenantDto {
    pub id: String,
    pub nama: String,
    pub email: String,
    pub phone: String,
    #[serde(default)]
    pub room_id: Option<String>,
    pub pekerjaan: String,
    pub harga_bulanan: i64,
    pub tanggal_masuk: i64,
    pub emergency_contact: String,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct RoomDto {
    pub id: String,
    pub nomor_kamar: String,
    pub tipe_kamar: String,
    pub lantai: i32,
    pub harga_bulanan: i64,
    pub status_kamar: RoomStatus,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct PaymentDto {
    pub id: String,
    pub tenant_id: String,
    pub room_id: String,
    pub bulan_tahun: String,
    pub jumlah_bayar: i64,
    pub tanggal_bayar: i64,
    pub status_pembayaran: PaymentStatus,
    pub denda: i64,
}
