//! Conversions between the domain types, the stored rows and the wire types.

use crate::{
    dto::{LoginResponse, PaymentDto, RoomDto, TenantDto},
    records::{PaymentRecord, RoomRecord, TenantRecord},
    structs::{Payment, Room, Tenant, User},
};

impl From<LoginResponse> for User {
    fn from(response: LoginResponse) -> Self {
        User {
            id: response.user.id,
            username: response.user.username,
            email: response.user.email,
            full_name: response.user.full_name,
            role: response.user.role,
            token: Some(response.token),
        }
    }
}

// Tenant

impl From<TenantRecord> for Tenant {
    fn from(r: TenantRecord) -> Self {
        Tenant {
            id: r.id,
            name: r.name,
            email: r.email,
            phone: r.phone,
            room_id: r.room_id,
            occupation: r.occupation,
            monthly_rate: r.monthly_rate,
            moved_in_at: r.moved_in_at,
            emergency_contact: r.emergency_contact,
        }
    }
}

impl From<&Tenant> for TenantRecord {
    fn from(t: &Tenant) -> Self {
        TenantRecord {
            id: t.id.clone(),
            name: t.name.clone(),
            email: t.email.clone(),
            phone: t.phone.clone(),
            room_id: t.room_id.clone(),
            occupation: t.occupation.clone(),
            monthly_rate: t.monthly_rate,
            moved_in_at: t.moved_in_at,
            emergency_contact: t.emergency_contact.clone(),
        }
    }
}

impl From<TenantDto> for Tenant {
    fn from(d: TenantDto) -> Self {
        Tenant {
            id: d.id,
            name: d.nama,
            email: d.email,
            phone: d.phone,
            room_id: d.room_id,
            occupation: d.pekerjaan,
            monthly_rate: d.harga_bulanan,
            moved_in_at: d.tanggal_masuk,
            emergency_contact: d.emergency_contact,
        }
    }
}

impl From<&Tenant> for TenantDto {
    fn from(t: &Tenant) -> Self {
        TenantDto {
            id: t.id.clone(),
            nama: t.name.clone(),
            email: t.email.clone(),
            phone: t.phone.clone(),
            room_id: t.room_id.clone(),
            pekerjaan: t.occupation.clone(),
            harga_bulanan: t.monthly_rate,
            tanggal_masuk: t.moved_in_at,
            emergency_contact: t.emergency_contact.clone(),
        }
    }
}

// Room

impl From<RoomRecord> for Room {
    fn from(r: RoomRecord) -> Self {
        Room {
            id: r.id,
            room_number: r.room_number,
            room_type: r.room_type,
            floor: r.floor,
            monthly_rate: r.monthly_rate,
            status: r.status,
        }
    }
}

impl From<&Room> for RoomRecord {
    fn from(r: &Room) -> Self {
        RoomRecord {
            id: r.id.clone(),
            room_number: r.room_number.clone(),
            room_type: r.room_type.clone(),
            floor: r.floor,
            monthly_rate: r.monthly_rate,
            status: r.status,
        }
    }
}

impl From<RoomDto> for Room {
    fn from(d: RoomDto) -> Self {
        Room {
            id: d.id,
            room_number: d.nomor_kamar,
            room_type: d.tipe_kamar,
            floor: d.lantai,
            monthly_rate: d.harga_bulanan,
            status: d.status_kamar,
        }
    }
}

impl From<&Room> for RoomDto {
    fn from(r: &Room) -> Self {
        RoomDto {
            id: r.id.clone(),
            nomor_kamar: r.room_number.clone(),
            tipe_kamar: r.room_type.clone(),
            lantai: r.floor,
            harga_bulanan: r.monthly_rate,
            status_kamar: r.status,
        }
    }
}

// Payment

impl From<PaymentRecord> for Payment {
    fn from(r: PaymentRecord) -> Self {
        Payment {
            id: r.id,
            tenant_id: r.tenant_id,
            room_id: r.room_id,
            period: r.period,
            amount_paid: r.amount_paid,
            paid_at: r.paid_at,
            status: r.status,
            penalty: r.penalty,
        }
    }
}

impl From<&Payment> for PaymentRecord {
    fn from(p: &Payment) -> Self {
        PaymentRecord {
            id: p.id.clone(),
            tenant_id: p.tenant_id.clone(),
            room_id: p.room_id.clone(),
            period: p.period.clone(),
            amount_paid: p.amount_paid,
            paid_at: p.paid_at,
            status: p.status,
            penalty: p.penalty,
        }
    }
}

impl From<PaymentDto> for Payment {
    fn from(d: PaymentDto) -> Self {
        Payment {
            id: d.id,
            tenant_id: d.tenant_id,
            room_id: d.room_id,
            period: d.bulan_tahun,
            amount_paid: d.jumlah_bayar,
            paid_at: d.tanggal_bayar,
            status: d.status_pembayaran,
            penalty: d.denda,
        }
    }
}

impl From<&Payment> for PaymentDto {
    fn from(p: &Payment) -> Self {
        PaymentDto {
            id: p.id.clone(),
            tenant_id: p.tenant_id.clone(),
            room_id: p.room_id.clone(),
            bulan_tahun: p.period.clone(),
            jumlah_bayar: p.amount_paid,
            tanggal_bayar: p.paid_at,
            status_pembayaran: p.status,
            denda: p.penalty,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::structs::{strategies, PaymentStatus, RoomStatus};
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn any_tenant_survives_storage_and_wire(tenant in strategies::tenant()) {
            let stored = Tenant::from(TenantRecord::from(&tenant));
            prop_assert_eq!(TenantDto::from(&stored), TenantDto::from(&tenant));
            prop_assert_eq!(&stored, &tenant);

            let json = serde_json::to_string(&TenantDto::from(&tenant)).unwrap();
            let received = Tenant::from(serde_json::from_str::<TenantDto>(&json).unwrap());
            prop_assert_eq!(received, tenant);
        }

        #[test]
        fn any_room_survives_storage_and_wire(room in strategies::room()) {
            let stored = Room::from(RoomRecord::from(&room));
            prop_assert_eq!(RoomDto::from(&stored), RoomDto::from(&room));
            prop_assert_eq!(&stored, &room);

            let json = serde_json::to_string(&RoomDto::from(&room)).unwrap();
            let received = Room::from(serde_json::from_str::<RoomDto>(&json).unwrap());
            prop_assert_eq!(received, room);
        }

        #[test]
        fn any_payment_survives_storage_and_wire(payment in strategies::payment()) {
            let stored = Payment::from(PaymentRecord::from(&payment));
            prop_assert_eq!(PaymentDto::from(&stored), PaymentDto::from(&payment));
            prop_assert_eq!(&stored, &payment);

            let json = serde_json::to_string(&PaymentDto::from(&payment)).unwrap();
            let received = Payment::from(serde_json::from_str::<PaymentDto>(&json).unwrap());
            prop_assert_eq!(received, payment);
        }
    }

    fn sample_tenant() -> Tenant {
        Tenant {
            id: "t-1".into(),
            name: "Siti Aminah".into(),
            email: "siti@example.com".into(),
            phone: "081234567890".into(),
            room_id: Some("r-1".into()),
            occupation: "Karyawan".into(),
            monthly_rate: 1_250_000,
            moved_in_at: 1_717_200_000_000,
            emergency_contact: "081298765432".into(),
        }
    }

    #[test]
    fn tenant_survives_storage_representation() {
        let tenant = sample_tenant();
        let via_record = Tenant::from(TenantRecord::from(&tenant));
        assert_eq!(TenantDto::from(&via_record), TenantDto::from(&tenant));
        assert_eq!(via_record, tenant);
    }

    #[test]
    fn tenant_without_room_keeps_none() {
        let mut tenant = sample_tenant();
        tenant.room_id = None;
        let dto = TenantDto::from(&tenant);
        assert_eq!(dto.room_id, None);
        assert_eq!(Tenant::from(dto), tenant);
    }

    #[test]
    fn room_wire_fields_are_translated() {
        let json = r#"{
            "id": "r-9",
            "nomor_kamar": "A-09",
            "tipe_kamar": "Deluxe",
            "lantai": 2,
            "harga_bulanan": 1500000,
            "status_kamar": "Terisi"
        }"#;
        let room = Room::from(serde_json::from_str::<RoomDto>(json).unwrap());
        assert_eq!(room.room_number, "A-09");
        assert_eq!(room.room_type, "Deluxe");
        assert_eq!(room.floor, 2);
        assert_eq!(room.status, RoomStatus::Occupied);
        assert_eq!(Room::from(RoomRecord::from(&room)), room);
    }

    #[test]
    fn payment_wire_fields_are_translated() {
        let json = r#"{
            "id": "p-1",
            "tenant_id": "t-1",
            "room_id": "r-1",
            "bulan_tahun": "Oktober 2026",
            "jumlah_bayar": 1250000,
            "tanggal_bayar": 1760000000000,
            "status_pembayaran": "Sebagian",
            "denda": 50000
        }"#;
        let dto: PaymentDto = serde_json::from_str(json).unwrap();
        let payment = Payment::from(dto.clone());
        assert_eq!(payment.period, "Oktober 2026");
        assert_eq!(payment.amount_paid, 1_250_000);
        assert_eq!(payment.status, PaymentStatus::Partial);
        assert_eq!(payment.penalty, 50_000);
        assert_eq!(PaymentDto::from(&Payment::from(PaymentRecord::from(&payment))), dto);
    }

    #[test]
    fn login_response_becomes_user_with_token() {
        let json = r#"{"token":"abc","user":{"id":"u1","username":"admin","email":"a@b.c","full_name":"Admin Kost","role":"owner"}}"#;
        let user = User::from(serde_json::from_str::<LoginResponse>(json).unwrap());
        assert_eq!(user.full_name, "Admin Kost");
        assert_eq!(user.token.as_deref(), Some("abc"));
    }
}
