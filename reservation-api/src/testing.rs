//! In-memory fakes for handler tests.

use std::collections::{BTreeMap, HashMap};
use std::ops::Deref;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use shared::{Error, IdentityProvider, NewUser, Reservation, ReservationStore, Result, Table, TableSnapshot};

use crate::state::AppState;

#[derive(Default)]
struct StoreInner {
    tables: BTreeMap<i32, (Table, i64)>,
    reservations: Vec<Reservation>,
    fail_writes: bool,
    bump_before_write: bool,
}

/// Reservation store kept in process memory.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<StoreInner>,
}

#[async_trait]
impl ReservationStore for MemoryStore {
    async fn list_tables(&self) -> Result<Vec<Table>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.tables.values().map(|(table, _)| table.clone()).collect())
    }

    async fn get_table(&self, id: i32) -> Result<Option<Table>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.tables.get(&id).map(|(table, _)| table.clone()))
    }

    async fn find_tables_by_number(&self, number: i32) -> Result<Vec<TableSnapshot>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .tables
            .values()
            .filter(|(table, _)| table.number == number)
            .map(|(table, version)| TableSnapshot {
                table: table.clone(),
                reservation_version: *version,
            })
            .collect())
    }

    async fn put_table(&self, table: &Table) -> Result<()> {
        let mut inner = self.inner.lock().unwrap();
        if inner.fail_writes {
            return Err(Error::Aws("simulated outage".to_string()));
        }
        let version = inner.tables.get(&table.id).map(|(_, version)| *version).unwrap_or(0);
        inner.tables.insert(table.id, (table.clone(), version));
        Ok(())
    }

    async fn list_reservations(&self) -> Result<Vec<Reservation>> {
        Ok(self.inner.lock().unwrap().reservations.clone())
    }

    async fn put_reservation(
        &self,
        reservation: &Reservation,
        table_id: i32,
        expected_version: i64,
    ) -> Result<()> {
        let mut inner = self.inner.lock().unwrap();
        if inner.fail_writes {
            return Err(Error::Aws("simulated outage".to_string()));
        }
        let bump = std::mem::take(&mut inner.bump_before_write);

        let Some((_, version)) = inner.tables.get_mut(&table_id) else {
            return Err(Error::Conflict(format!("Table {} disappeared", table_id)));
        };
        if bump {
            *version += 1;
        }
        if *version != expected_version {
            return Err(Error::Conflict(format!(
                "Table {} received another reservation concurrently, please retry.",
                reservation.table_number
            )));
        }
        *version += 1;
        inner.reservations.push(reservation.clone());
        Ok(())
    }
}

/// Identity provider that keeps users in memory.
#[derive(Default)]
pub struct MemoryIdentity {
    users: Mutex<HashMap<String, String>>,
}

#[async_trait]
impl IdentityProvider for MemoryIdentity {
    async fn sign_up(&self, user: &NewUser) -> Result<()> {
        let mut users = self.users.lock().unwrap();
        if users.contains_key(&user.email) {
            return Err(Error::Identity("An account with the given email already exists.".to_string()));
        }
        users.insert(user.email.clone(), user.password.clone());
        Ok(())
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<String> {
        let users = self.users.lock().unwrap();
        match users.get(email) {
            Some(stored) if stored == password => Ok(format!("token-{}", email)),
            _ => Err(Error::Identity("Incorrect username or password.".to_string())),
        }
    }
}

/// App state wired to the in-memory fakes, with handles to steer them.
pub struct TestState {
    app: AppState,
    memory: Arc<MemoryStore>,
}

impl Deref for TestState {
    type Target = AppState;

    fn deref(&self) -> &AppState {
        &self.app
    }
}

pub fn state() -> TestState {
    let store = Arc::new(MemoryStore::default());
    let app = AppState::new(store.clone(), Arc::new(MemoryIdentity::default()));
    TestState { app, memory: store }
}

pub fn table(id: i32, number: i32) -> Table {
    Table {
        id,
        number,
        places: 4,
        is_vip: false,
        min_order: None,
    }
}

/// Make every subsequent write fail.
pub fn fail_writes(state: &TestState) {
    state.memory.inner.lock().unwrap().fail_writes = true;
}

/// Simulate another writer committing between the guard read and our write.
pub fn bump_before_next_write(state: &TestState) {
    state.memory.inner.lock().unwrap().bump_before_write = true;
}

/// Store a reservation directly, bypassing validation.
pub fn insert_reservation(state: &TestState, reservation: Reservation) {
    state.memory.inner.lock().unwrap().reservations.push(reservation);
}
