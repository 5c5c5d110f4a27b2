//! DynamoDB-backed reservation storage.

use std::collections::HashMap;

use async_trait::async_trait;
use aws_sdk_dynamodb::error::DisplayErrorContext;
use aws_sdk_dynamodb::operation::transact_write_items::TransactWriteItemsError;
use aws_sdk_dynamodb::types::{
    AttributeValue, CancellationReason, Put, ReturnValuesOnConditionCheckFailure, TransactWriteItem, Update,
};
use aws_sdk_dynamodb::Client as DynamoClient;
use serde::Deserialize;
use serde_dynamo::{from_item, from_items, to_item};
use tracing::{debug, warn};

use crate::models::{Reservation, Table, TableSnapshot};
use crate::store::ReservationStore;
use crate::{Error, Result};

const VERSION_ATTRIBUTE: &str = "reservationVersion";

const CONDITION_FAILED: &str = "ConditionalCheckFailed";

type Item = HashMap<String, AttributeValue>;

/// Update expression that rewrites a table's fields while keeping its
/// reservation guard counter.
#[derive(Debug)]
struct TableUpdate {
    expression: String,
    names: HashMap<String, String>,
    values: Item,
}

fn table_update(table: &Table) -> TableUpdate {
    let names = HashMap::from([
        ("#number".to_string(), "number".to_string()),
        ("#places".to_string(), "places".to_string()),
        ("#isVip".to_string(), "isVip".to_string()),
        ("#minOrder".to_string(), "minOrder".to_string()),
        ("#version".to_string(), VERSION_ATTRIBUTE.to_string()),
    ]);
    let mut values = Item::from([
        (":number".to_string(), AttributeValue::N(table.number.to_string())),
        (":places".to_string(), AttributeValue::N(table.places.to_string())),
        (":isVip".to_string(), AttributeValue::Bool(table.is_vip)),
        (":zero".to_string(), AttributeValue::N("0".to_string())),
    ]);

    let mut expression = String::from(
        "SET #number = :number, #places = :places, #isVip = :isVip, #version = if_not_exists(#version, :zero)",
    );
    match table.min_order {
        Some(min_order) => {
            expression.push_str(", #minOrder = :minOrder");
            values.insert(":minOrder".to_string(), AttributeValue::N(min_order.to_string()));
        }
        None => expression.push_str(" REMOVE #minOrder"),
    }

    TableUpdate {
        expression,
        names,
        values,
    }
}

/// Condition on the table item for bumping the guard from `expected_version`.
/// Only version 0 may match an item that never had a counter.
fn guard_condition(expected_version: i64) -> &'static str {
    if expected_version == 0 {
        "attribute_exists(id) AND (attribute_not_exists(#version) OR #version = :expected)"
    } else {
        "attribute_exists(id) AND #version = :expected"
    }
}

/// Map the per-item reasons of a cancelled reservation transaction. The guard
/// update is item 0, the reservation put item 1.
fn cancellation_error(reasons: &[CancellationReason], reservation: &Reservation) -> Error {
    let failed = |index: usize| {
        reasons
            .get(index)
            .and_then(|reason| reason.code())
            .map(|code| code == CONDITION_FAILED)
            .unwrap_or(false)
    };

    if failed(0) {
        return match reasons.first().and_then(|reason| reason.item()) {
            Some(_) => Error::Conflict(format!(
                "Table {} received another reservation concurrently, please retry.",
                reservation.table_number
            )),
            None => Error::Aws(format!(
                "Table {} was removed before the reservation was written",
                reservation.table_number
            )),
        };
    }

    if failed(1) {
        return Error::Aws(format!("Reservation {} already exists", reservation.id));
    }

    let codes: Vec<&str> = reasons.iter().filter_map(|reason| reason.code()).collect();
    Error::Aws(format!("Reservation transaction cancelled: {}", codes.join(", ")))
}

/// Table item as stored, including the reservation guard counter.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TableItem {
    id: i32,
    number: i32,
    places: i32,
    is_vip: bool,
    #[serde(default)]
    min_order: Option<i32>,
    #[serde(default)]
    reservation_version: Option<i64>,
}

impl From<TableItem> for Table {
    fn from(item: TableItem) -> Self {
        Table {
            id: item.id,
            number: item.number,
            places: item.places,
            is_vip: item.is_vip,
            min_order: item.min_order,
        }
    }
}

/// Reservation store over two DynamoDB tables.
#[derive(Debug, Clone)]
pub struct DynamoStore {
    client: DynamoClient,
    tables_table: String,
    reservations_table: String,
}

impl DynamoStore {
    pub fn new(
        client: DynamoClient,
        tables_table: impl Into<String>,
        reservations_table: impl Into<String>,
    ) -> Self {
        Self {
            client,
            tables_table: tables_table.into(),
            reservations_table: reservations_table.into(),
        }
    }

    /// Scan a whole table, following pagination, optionally filtered on one
    /// numeric attribute.
    async fn scan_all(&self, table_name: &str, filter: Option<(&str, i32)>) -> Result<Vec<Item>> {
        let mut items = Vec::new();
        let mut last_evaluated_key = None;

        loop {
            let mut scan_request = self.client.scan().table_name(table_name);

            if let Some((attribute, value)) = filter {
                scan_request = scan_request
                    .filter_expression("#attr = :value")
                    .expression_attribute_names("#attr", attribute)
                    .expression_attribute_values(":value", AttributeValue::N(value.to_string()));
            }

            if let Some(key) = last_evaluated_key {
                scan_request = scan_request.set_exclusive_start_key(Some(key));
            }

            let result = scan_request
                .send()
                .await
                .map_err(|e| Error::Aws(format!("Failed to scan {}: {}", table_name, DisplayErrorContext(&e))))?;

            if let Some(page) = result.items {
                items.extend(page);
            }

            if result.last_evaluated_key.is_none() {
                break;
            }

            last_evaluated_key = result.last_evaluated_key;
        }

        debug!(table = table_name, count = items.len(), "Scanned table");
        Ok(items)
    }
}

#[async_trait]
impl ReservationStore for DynamoStore {
    async fn list_tables(&self) -> Result<Vec<Table>> {
        let items = self.scan_all(&self.tables_table, None).await?;
        let stored: Vec<TableItem> = from_items(items)?;
        Ok(stored.into_iter().map(Table::from).collect())
    }

    async fn get_table(&self, id: i32) -> Result<Option<Table>> {
        let result = self
            .client
            .get_item()
            .table_name(&self.tables_table)
            .key("id", AttributeValue::N(id.to_string()))
            .send()
            .await
            .map_err(|e| Error::Aws(format!("Failed to get table {}: {}", id, DisplayErrorContext(&e))))?;

        match result.item {
            Some(item) => {
                let stored: TableItem = from_item(item)?;
                Ok(Some(stored.into()))
            }
            None => Ok(None),
        }
    }

    async fn find_tables_by_number(&self, number: i32) -> Result<Vec<TableSnapshot>> {
        let items = self.scan_all(&self.tables_table, Some(("number", number))).await?;
        let stored: Vec<TableItem> = from_items(items)?;

        let mut snapshots: Vec<TableSnapshot> = stored
            .into_iter()
            .map(|item| TableSnapshot {
                reservation_version: item.reservation_version.unwrap_or(0),
                table: item.into(),
            })
            .collect();
        snapshots.sort_by_key(|snapshot| snapshot.table.id);

        if snapshots.len() > 1 {
            warn!(number, count = snapshots.len(), "Several tables share a number");
        }
        Ok(snapshots)
    }

    async fn put_table(&self, table: &Table) -> Result<()> {
        let update = table_update(table);

        self.client
            .update_item()
            .table_name(&self.tables_table)
            .key("id", AttributeValue::N(table.id.to_string()))
            .update_expression(update.expression)
            .set_expression_attribute_names(Some(update.names))
            .set_expression_attribute_values(Some(update.values))
            .send()
            .await
            .map_err(|e| Error::Aws(format!("Failed to put table {}: {}", table.id, DisplayErrorContext(&e))))?;

        Ok(())
    }

    async fn list_reservations(&self) -> Result<Vec<Reservation>> {
        let items = self.scan_all(&self.reservations_table, None).await?;
        Ok(from_items(items)?)
    }

    async fn put_reservation(
        &self,
        reservation: &Reservation,
        table_id: i32,
        expected_version: i64,
    ) -> Result<()> {
        let item: Item = to_item(reservation)?;

        let bump = Update::builder()
            .table_name(&self.tables_table)
            .key("id", AttributeValue::N(table_id.to_string()))
            .update_expression("SET #version = :next")
            .condition_expression(guard_condition(expected_version))
            .return_values_on_condition_check_failure(ReturnValuesOnConditionCheckFailure::AllOld)
            .expression_attribute_names("#version", VERSION_ATTRIBUTE)
            .expression_attribute_values(":next", AttributeValue::N((expected_version + 1).to_string()))
            .expression_attribute_values(":expected", AttributeValue::N(expected_version.to_string()))
            .build()
            .map_err(|e| Error::Internal(format!("Failed to build guard update: {}", e)))?;

        let put = Put::builder()
            .table_name(&self.reservations_table)
            .set_item(Some(item))
            .condition_expression("attribute_not_exists(id)")
            .build()
            .map_err(|e| Error::Internal(format!("Failed to build reservation put: {}", e)))?;

        let result = self
            .client
            .transact_write_items()
            .transact_items(TransactWriteItem::builder().update(bump).build())
            .transact_items(TransactWriteItem::builder().put(put).build())
            .send()
            .await;

        match result {
            Ok(_) => Ok(()),
            Err(e) => match e.as_service_error() {
                Some(TransactWriteItemsError::TransactionCanceledException(canceled)) => {
                    Err(cancellation_error(canceled.cancellation_reasons(), reservation))
                }
                _ => Err(Error::Aws(format!(
                    "Failed to write reservation {}: {}",
                    reservation.id,
                    DisplayErrorContext(&e)
                ))),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_item_round_trips_through_attribute_values() {
        let table = Table {
            id: 3,
            number: 12,
            places: 6,
            is_vip: true,
            min_order: Some(150),
        };
        let item: Item = to_item(&table).unwrap();
        assert_eq!(item.get("id"), Some(&AttributeValue::N("3".to_string())));
        assert_eq!(item.get("isVip"), Some(&AttributeValue::Bool(true)));
        assert!(!item.contains_key(VERSION_ATTRIBUTE));

        let mut stored = item.clone();
        stored.insert(VERSION_ATTRIBUTE.to_string(), AttributeValue::N("4".to_string()));
        let parsed: TableItem = from_item(stored).unwrap();
        assert_eq!(parsed.reservation_version, Some(4));
        assert_eq!(Table::from(parsed), table);
    }

    fn reservation() -> Reservation {
        Reservation {
            id: "r-1".into(),
            table_number: 5,
            client_name: "Ada".into(),
            phone_number: "555-0100".into(),
            date: "2024-01-01".into(),
            slot_time_start: "10:00".into(),
            slot_time_end: "11:00".into(),
        }
    }

    fn reason(code: &str, item: Option<Item>) -> CancellationReason {
        CancellationReason::builder()
            .code(code)
            .set_item(item)
            .build()
    }

    #[test]
    fn test_table_rewrite_keeps_guard_counter() {
        let update = table_update(&Table {
            id: 1,
            number: 5,
            places: 4,
            is_vip: true,
            min_order: Some(50),
        });
        assert!(update
            .expression
            .contains("#version = if_not_exists(#version, :zero)"));
        assert!(!update.expression.contains("REMOVE"));
        assert_eq!(update.names["#version"], VERSION_ATTRIBUTE);
        assert_eq!(update.values[":minOrder"], AttributeValue::N("50".into()));

        let plain = table_update(&Table {
            id: 1,
            number: 5,
            places: 4,
            is_vip: false,
            min_order: None,
        });
        assert!(plain.expression.ends_with(" REMOVE #minOrder"));
        assert!(!plain.values.contains_key(":minOrder"));
    }

    #[test]
    fn test_missing_counter_only_matches_version_zero() {
        assert!(guard_condition(0).contains("attribute_not_exists(#version)"));
        assert_eq!(guard_condition(3), "attribute_exists(id) AND #version = :expected");
    }

    #[test]
    fn test_stale_guard_is_a_conflict() {
        let table_item = Item::from([("id".to_string(), AttributeValue::N("1".into()))]);
        let reasons = [reason(CONDITION_FAILED, Some(table_item)), reason("None", None)];
        assert!(matches!(
            cancellation_error(&reasons, &reservation()),
            Error::Conflict(_)
        ));
    }

    #[test]
    fn test_other_cancellations_are_not_conflicts() {
        let removed_table = [reason(CONDITION_FAILED, None), reason("None", None)];
        let error = cancellation_error(&removed_table, &reservation());
        assert!(matches!(&error, Error::Aws(message) if message.contains("was removed")));

        let duplicate_id = [reason("None", None), reason(CONDITION_FAILED, None)];
        let error = cancellation_error(&duplicate_id, &reservation());
        assert!(matches!(&error, Error::Aws(message) if message.contains("r-1 already exists")));

        let throttled = [reason("ThrottlingError", None), reason("None", None)];
        let error = cancellation_error(&throttled, &reservation());
        assert!(matches!(&error, Error::Aws(message) if message.contains("ThrottlingError")));
    }

    #[test]
    fn test_table_item_without_min_order_or_version() {
        let mut item = Item::new();
        item.insert("id".into(), AttributeValue::N("1".into()));
        item.insert("number".into(), AttributeValue::N("5".into()));
        item.insert("places".into(), AttributeValue::N("2".into()));
        item.insert("isVip".into(), AttributeValue::Bool(false));

        let parsed: TableItem = from_item(item).unwrap();
        assert_eq!(parsed.min_order, None);
        assert_eq!(parsed.reservation_version, None);
    }
}
