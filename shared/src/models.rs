//! Shared data models.

use serde::{Deserialize, Serialize};

/// A dining table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Table {
    pub id: i32,
    pub number: i32,
    pub places: i32,
    pub is_vip: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_order: Option<i32>,
}

/// A table as read for a reservation write, with its guard counter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSnapshot {
    pub table: Table,
    /// Number of reservations written against this table so far
    pub reservation_version: i64,
}

/// A booking of one table for one time slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reservation {
    pub id: String,
    pub table_number: i32,
    pub client_name: String,
    pub phone_number: String,
    pub date: String,
    pub slot_time_start: String,
    pub slot_time_end: String,
}

/// Response for `GET /tables`.
#[derive(Debug, Serialize)]
pub struct TableList {
    pub tables: Vec<Table>,
}

/// Response for `GET /reservations`.
#[derive(Debug, Serialize)]
pub struct ReservationList {
    pub reservations: Vec<Reservation>,
}

/// Response for `POST /tables`.
#[derive(Debug, Serialize)]
pub struct TableCreated {
    pub id: i32,
}

/// Response for `POST /reservations`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReservationCreated {
    pub reservation_id: String,
}

/// Response for `POST /signup`.
#[derive(Debug, Serialize)]
pub struct SignUpResponse {
    pub message: String,
}

/// Response for `POST /signin`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignInResponse {
    pub access_token: String,
}
