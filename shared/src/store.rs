//! Storage abstraction for tables and reservations.

use async_trait::async_trait;

use crate::models::{Reservation, Table, TableSnapshot};
use crate::Result;

/// Persistence for the table and reservation collections.
///
/// Implementations must be cheap to share across requests; the Lambda builds
/// one at cold start and hands it to every invocation.
#[async_trait]
pub trait ReservationStore: Send + Sync {
    /// Full scan of the tables collection.
    async fn list_tables(&self) -> Result<Vec<Table>>;

    /// Fetch a table by its id.
    async fn get_table(&self, id: i32) -> Result<Option<Table>>;

    /// Tables carrying the given number, ordered by id.
    async fn find_tables_by_number(&self, number: i32) -> Result<Vec<TableSnapshot>>;

    /// Write a table, replacing any table with the same id.
    async fn put_table(&self, table: &Table) -> Result<()>;

    /// Full scan of the reservations collection.
    async fn list_reservations(&self) -> Result<Vec<Reservation>>;

    /// Write a reservation and bump the guard on `table_id`.
    ///
    /// Fails with `Error::Conflict` and writes nothing when the table's
    /// reservation version is no longer `expected_version`.
    async fn put_reservation(
        &self,
        reservation: &Reservation,
        table_id: i32,
        expected_version: i64,
    ) -> Result<()>;
}
