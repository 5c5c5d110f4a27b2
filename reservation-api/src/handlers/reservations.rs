//! Reservation endpoints.

use lambda_http::Body;
use shared::models::{ReservationCreated, ReservationList};
use shared::{Error, Reservation, Result};
use tracing::{info, warn};
use uuid::Uuid;

use crate::slots::{conflicts_with, Slot};
use crate::state::AppState;
use crate::validation::{int_field, parse_fields, require_fields, str_field};

const REQUIRED: &[&str] = &[
    "tableNumber",
    "clientName",
    "phoneNumber",
    "date",
    "slotTimeStart",
    "slotTimeEnd",
];

pub async fn list(state: &AppState) -> Result<ReservationList> {
    let reservations = state.store.list_reservations().await?;
    Ok(ReservationList { reservations })
}

pub async fn create(state: &AppState, body: &Body) -> Result<ReservationCreated> {
    let fields = parse_fields(body)?;
    require_fields(REQUIRED, &fields)?;

    let mut reservation = Reservation {
        id: String::new(),
        table_number: int_field(&fields, "tableNumber")?,
        client_name: str_field(&fields, "clientName")?,
        phone_number: str_field(&fields, "phoneNumber")?,
        date: str_field(&fields, "date")?,
        slot_time_start: str_field(&fields, "slotTimeStart")?,
        slot_time_end: str_field(&fields, "slotTimeEnd")?,
    };
    let requested = Slot::from_request(
        &reservation.date,
        &reservation.slot_time_start,
        &reservation.slot_time_end,
    )?;

    // The guard version must be read before the overlap scan.
    let tables = state
        .store
        .find_tables_by_number(reservation.table_number)
        .await
        .map_err(|e| Error::rejected("Error checking table existence.", e))?;
    let Some(guard) = tables.into_iter().next() else {
        return Err(Error::Validation(format!(
            "Table with number {} does not exist.",
            reservation.table_number
        )));
    };

    let existing = state
        .store
        .list_reservations()
        .await
        .map_err(|e| Error::rejected("Error checking existing reservations.", e))?;

    for booked in existing
        .iter()
        .filter(|booked| booked.table_number == reservation.table_number)
    {
        if conflicts_with(&requested, booked)? {
            warn!(
                table_number = reservation.table_number,
                conflicting = %booked.id,
                "Rejected overlapping reservation"
            );
            return Err(Error::Validation(format!(
                "The reservation overlaps with an existing reservation for this table. \
                 slotTimeStart: {}, slotTimeEnd: {}, existingSlotStart: {}, existingSlotEnd: {}",
                reservation.slot_time_start,
                reservation.slot_time_end,
                booked.slot_time_start,
                booked.slot_time_end
            )));
        }
    }

    reservation.id = Uuid::new_v4().to_string();
    state
        .store
        .put_reservation(&reservation, guard.table.id, guard.reservation_version)
        .await
        .map_err(|e| match e {
            conflict @ Error::Conflict(_) => conflict,
            other => Error::rejected("Error saving reservation to the database.", other),
        })?;

    info!(
        id = %reservation.id,
        table_number = reservation.table_number,
        "Created reservation"
    );
    Ok(ReservationCreated {
        reservation_id: reservation.id,
    })
}
