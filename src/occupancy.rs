//! Keeps room status and tenant room references consistent: a room is
//! occupied exactly when one tenant references it.

use std::collections::HashMap;

use log::info;
use sqlx::SqliteConnection;

use crate::{
    errors::AppError,
    records::{RoomRecord, TenantRecord},
    repository::{
        claim_room, fetch_room, tenants_in_room, update_tenant, upsert_room, upsert_tenant,
        RoomRepository, TenantRepository,
    },
    structs::{Room, RoomStatus, Tenant},
};

/// Stores `tenant` as living in `room_id` and marks the room occupied. A room the
/// tenant leaves behind is marked available.
///
/// The occupancy check and both writes run in one transaction, so concurrent
/// check-ins into the same room cannot both succeed. Both repositories must sit
/// on the same database.
pub async fn check_in(
    tenants: &TenantRepository,
    rooms: &RoomRepository,
    tenant: &Tenant,
    room_id: &str,
) -> Result<Tenant, AppError> {
    let mut tx = tenants.pool().begin().await?;

    if !claim_room(&mut *tx, room_id).await? {
        return Err(AppError::NotFound);
    }
    let room = fetch_room(&mut *tx, room_id)
        .await?
        .map(Room::from)
        .ok_or(AppError::NotFound)?;
    let occupants = tenants_in_room(&mut *tx, room_id).await?;
    let taken_by_other = occupants.iter().any(|t| t.id != tenant.id);

    if room.status == RoomStatus::Maintenance || taken_by_other {
        return Err(AppError::RoomUnavailable {
            room_number: room.room_number,
            status: room.status.to_string(),
        });
    }

    let previous_room = tenant.room_id.clone().filter(|id| id != room_id);

    let mut checked_in = tenant.clone();
    checked_in.room_id = Some(room_id.to_owned());
    upsert_tenant(&mut *tx, &TenantRecord::from(&checked_in)).await?;

    if room.status != RoomStatus::Occupied {
        let occupied = room.clone().with_status(RoomStatus::Occupied);
        upsert_room(&mut *tx, &RoomRecord::from(&occupied)).await?;
    }
    if let Some(previous) = previous_room {
        release_room(&mut tx, &previous).await?;
    }
    tx.commit().await?;

    tenants.publish().await?;
    rooms.publish().await?;
    info!("Tenant {} checked into room {}", checked_in.name, room.room_number);
    Ok(checked_in)
}

/// Clears the tenant's room reference and frees the room.
pub async fn check_out(
    tenants: &TenantRepository,
    rooms: &RoomRepository,
    tenant: &Tenant,
) -> Result<Tenant, AppError> {
    let mut checked_out = tenant.clone();
    let Some(room_id) = checked_out.room_id.take() else {
        return Ok(checked_out);
    };

    let mut tx = tenants.pool().begin().await?;
    if update_tenant(&mut *tx, &TenantRecord::from(&checked_out)).await? == 0 {
        return Err(AppError::NotFound);
    }
    release_room(&mut tx, &room_id).await?;
    tx.commit().await?;

    tenants.publish().await?;
    rooms.publish().await?;
    info!("Tenant {} checked out", checked_out.name);
    Ok(checked_out)
}

async fn release_room(conn: &mut SqliteConnection, room_id: &str) -> Result<(), AppError> {
    let Some(room) = fetch_room(&mut *conn, room_id).await?.map(Room::from) else {
        return Ok(());
    };
    if room.status == RoomStatus::Occupied
        && tenants_in_room(&mut *conn, room_id).await?.is_empty()
    {
        let available = room.with_status(RoomStatus::Available);
        upsert_room(&mut *conn, &RoomRecord::from(&available)).await?;
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OccupancyViolation {
    pub room_id: String,
    pub room_number: String,
    pub status: RoomStatus,
    pub tenant_count: usize,
}

/// Rooms whose status disagrees with how many tenants point at them.
pub fn find_violations(rooms: &[Room], tenants: &[Tenant]) -> Vec<OccupancyViolation> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for room_id in tenants.iter().filter_map(|t| t.room_id.as_deref()) {
        *counts.entry(room_id).or_default() += 1;
    }

    rooms
        .iter()
        .filter_map(|room| {
            let tenant_count = counts.get(room.id.as_str()).copied().unwrap_or(0);
            let consistent = match room.status {
                RoomStatus::Occupied => tenant_count == 1,
                RoomStatus::Available | RoomStatus::Maintenance => tenant_count == 0,
            };
            (!consistent).then(|| OccupancyViolation {
                room_id: room.id.clone(),
                room_number: room.room_number.clone(),
                status: room.status,
                tenant_count,
            })
        })
        .collect()
}
