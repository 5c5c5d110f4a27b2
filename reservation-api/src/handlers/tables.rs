//! Dining table endpoints.

use lambda_http::Body;
use shared::models::{TableCreated, TableList};
use shared::{Error, Result, Table};
use tracing::info;

use crate::state::AppState;
use crate::validation::{bool_field, int_field, optional_int_field, parse_fields, require_fields};

pub async fn list(state: &AppState) -> Result<TableList> {
    let tables = state.store.list_tables().await?;
    Ok(TableList { tables })
}

pub async fn get(state: &AppState, table_id: Option<&str>) -> Result<Table> {
    let id: i32 = table_id
        .and_then(|raw| raw.trim().parse().ok())
        .ok_or_else(|| Error::Validation("Invalid or missing tableId".to_string()))?;

    state
        .store
        .get_table(id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("Table with id {} not found", id)))
}

pub async fn create(state: &AppState, body: &Body) -> Result<TableCreated> {
    let fields = parse_fields(body)?;
    require_fields(&["id", "number", "places", "isVip"], &fields)?;

    let table = Table {
        id: int_field(&fields, "id")?,
        number: int_field(&fields, "number")?,
        places: int_field(&fields, "places")?,
        is_vip: bool_field(&fields, "isVip")?,
        min_order: optional_int_field(&fields, "minOrder")?,
    };

    state
        .store
        .put_table(&table)
        .await
        .map_err(|e| Error::unavailable("Error saving data to the database.", e))?;

    info!(id = table.id, number = table.number, "Created table");
    Ok(TableCreated { id: table.id })
}
