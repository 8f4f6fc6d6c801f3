//! Implementación en memoria de todos los repositorios, para tests unitarios.
//!
//! Cada operación de escritura trabaja sobre una copia del estado y solo la
//! publica si termina bien, igual que una transacción. `fail_on` permite
//! provocar un fallo a mitad de una operación para comprobar el rollback.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

use super::{
    LeaseRepository, ParkingRepository, PurchaseRepository, ReportRepository, Repositories,
    StatusChange, UserRepository, VehicleRepository,
};
use crate::models::lease::{LeaseOrder, LeaseStatus, NewLease};
use crate::models::parking::{
    NewParkingSpot, OccupyRequest, ParkingRecord, ParkingSpot, ParkingStatus, ParkingType,
    SpotFilter,
};
use crate::models::purchase::PurchaseRecord;
use crate::models::report::{DailyReport, MaintenanceRecord, MaintenanceStatus, SpotTypeCount};
use crate::models::user::{NewUser, User, UserRole};
use crate::models::vehicle::{NewVehicle, Vehicle};
use crate::utils::errors::{not_found_error, AppError, AppResult};

/// Puntos donde se puede inyectar un fallo
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailPoint {
    /// Segunda escritura de `create_lease_with_expiry`
    SpotExpiryUpdate,
    /// Inserción del registro de compra en `purchase_spot`
    PurchaseInsert,
    /// `expire_lease` para un alquiler concreto
    ExpireLease(Uuid),
}

#[derive(Debug, Clone, Default)]
pub struct MemoryState {
    pub users: HashMap<Uuid, User>,
    pub spots: HashMap<Uuid, ParkingSpot>,
    pub records: HashMap<Uuid, ParkingRecord>,
    pub leases: HashMap<Uuid, LeaseOrder>,
    pub vehicles: HashMap<Uuid, Vehicle>,
    pub purchases: Vec<PurchaseRecord>,
    pub maintenance: Vec<MaintenanceRecord>,
    last_ts: Option<DateTime<Utc>>,
}

impl MemoryState {
    /// Reloj estrictamente creciente para que el orden por `created_at` sea estable
    fn now(&mut self) -> DateTime<Utc> {
        let now = Utc::now();
        let ts = match self.last_ts {
            Some(last) if now <= last => last + Duration::microseconds(1),
            _ => now,
        };
        self.last_ts = Some(ts);
        ts
    }

    fn open_record_for_license(&self, license: &str) -> bool {
        self.records
            .values()
            .any(|r| r.license == license && r.exit_time.is_none())
    }

    fn resolve_maintenance(&mut self, spot_id: Uuid, at: DateTime<Utc>) {
        for m in self
            .maintenance
            .iter_mut()
            .filter(|m| m.spot_id == spot_id && m.status == MaintenanceStatus::Pending)
        {
            m.status = MaintenanceStatus::Resolved;
            m.resolved_at = Some(at);
        }
    }
}

#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<MemoryState>,
    failures: Mutex<HashSet<FailPoint>>,
    writes: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Todos los traits apuntando al mismo almacén
    pub fn repositories(self: &Arc<Self>) -> Repositories {
        Repositories {
            users: self.clone(),
            parking: self.clone(),
            leases: self.clone(),
            vehicles: self.clone(),
            purchases: self.clone(),
            reports: self.clone(),
        }
    }

    pub fn fail_on(&self, point: FailPoint) {
        self.failures.lock().unwrap().insert(point);
    }

    /// Número de escrituras confirmadas
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn snapshot(&self) -> MemoryState {
        self.state.lock().unwrap().clone()
    }

    /// Modifica el estado directamente, sin contar como escritura
    pub fn seed<F: FnOnce(&mut MemoryState)>(&self, f: F) {
        f(&mut self.state.lock().unwrap());
    }

    pub fn spot(&self, id: Uuid) -> ParkingSpot {
        self.snapshot().spots[&id].clone()
    }

    pub fn record(&self, id: Uuid) -> ParkingRecord {
        self.snapshot().records[&id].clone()
    }

    fn should_fail(&self, point: FailPoint) -> bool {
        self.failures.lock().unwrap().contains(&point)
    }

    fn injected(point: FailPoint) -> AppError {
        AppError::Internal(format!("injected failure at {:?}", point))
    }

    fn read<T>(&self, f: impl FnOnce(&MemoryState) -> T) -> T {
        f(&self.state.lock().unwrap())
    }

    /// Ejecuta `f` sobre una copia y la publica solo si devuelve `Ok`
    fn transact<T>(&self, f: impl FnOnce(&mut MemoryState) -> AppResult<T>) -> AppResult<T> {
        let mut guard = self.state.lock().unwrap();
        let mut working = guard.clone();
        let value = f(&mut working)?;
        *guard = working;
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(value)
    }
}

/// occupied <=> exactamente un registro abierto
pub fn assert_occupancy_invariant(store: &MemoryStore) {
    let state = store.snapshot();
    for spot in state.spots.values() {
        let open = state
            .records
            .values()
            .filter(|r| r.spot_id == spot.id && r.exit_time.is_none())
            .count();
        match spot.status {
            ParkingStatus::Occupied => assert_eq!(open, 1, "spot {}", spot.id),
            _ => assert_eq!(open, 0, "spot {}", spot.id),
        }
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        Ok(self.read(|s| s.users.get(&id).cloned()))
    }

    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>> {
        Ok(self.read(|s| s.users.values().find(|u| u.username == username).cloned()))
    }

    async fn exists(&self, username: &str, email: &str) -> AppResult<bool> {
        Ok(self.read(|s| {
            s.users
                .values()
                .any(|u| u.username == username || u.email == email)
        }))
    }

    async fn create(&self, user: NewUser) -> AppResult<User> {
        self.transact(|s| {
            if s.users
                .values()
                .any(|u| u.username == user.username || u.email == user.email)
            {
                return Err(AppError::DuplicateUser(user.username));
            }
            let now = s.now();
            let created = User {
                id: Uuid::new_v4(),
                username: user.username,
                password_hash: user.password_hash,
                email: user.email,
                phone: None,
                roles: user.roles,
                is_active: true,
                created_at: now,
                updated_at: now,
            };
            s.users.insert(created.id, created.clone());
            Ok(created)
        })
    }

    async fn grant_role(&self, user_id: Uuid, role: UserRole) -> AppResult<()> {
        self.transact(|s| {
            if let Some(user) = s.users.get_mut(&user_id) {
                if !user.roles.contains(&role) {
                    user.roles.push(role);
                }
            }
            Ok(())
        })
    }
}

#[async_trait]
impl ParkingRepository for MemoryStore {
    async fn create_spot(&self, spot: NewParkingSpot) -> AppResult<ParkingSpot> {
        self.transact(|s| {
            let now = s.now();
            let created = ParkingSpot {
                id: Uuid::new_v4(),
                spot_type: spot.spot_type,
                status: ParkingStatus::Idle,
                owner_id: None,
                license: None,
                hourly_rate: spot.hourly_rate,
                monthly_rate: spot.monthly_rate,
                expires_at: None,
                notes: spot.notes,
                created_at: now,
                updated_at: now,
            };
            s.spots.insert(created.id, created.clone());
            Ok(created)
        })
    }

    async fn find_spot(&self, id: Uuid) -> AppResult<Option<ParkingSpot>> {
        Ok(self.read(|s| s.spots.get(&id).cloned()))
    }

    async fn list_spots(&self, filter: &SpotFilter) -> AppResult<Vec<ParkingSpot>> {
        let mut spots: Vec<ParkingSpot> = self.read(|s| {
            s.spots
                .values()
                .filter(|spot| filter.matches(spot))
                .cloned()
                .collect()
        });
        spots.sort_by_key(|spot| (spot.created_at, spot.id));
        Ok(spots)
    }

    async fn find_record(&self, id: Uuid) -> AppResult<Option<ParkingRecord>> {
        Ok(self.read(|s| s.records.get(&id).cloned()))
    }

    async fn find_open_record_by_license(&self, license: &str) -> AppResult<Option<ParkingRecord>> {
        Ok(self.read(|s| {
            s.records
                .values()
                .find(|r| r.license == license && r.exit_time.is_none())
                .cloned()
        }))
    }

    async fn find_open_record_by_spot(&self, spot_id: Uuid) -> AppResult<Option<ParkingRecord>> {
        Ok(self.read(|s| {
            s.records
                .values()
                .find(|r| r.spot_id == spot_id && r.exit_time.is_none())
                .cloned()
        }))
    }

    async fn occupy_spot(&self, request: OccupyRequest) -> AppResult<ParkingRecord> {
        self.transact(|s| {
            let status = s
                .spots
                .get(&request.spot_id)
                .map(|spot| spot.status)
                .ok_or_else(|| not_found_error("Parking spot", &request.spot_id))?;
            let spot_has_open_record = s
                .records
                .values()
                .any(|r| r.spot_id == request.spot_id && r.is_open());
            if status != ParkingStatus::Idle || spot_has_open_record {
                return Err(AppError::SpotUnavailable(request.spot_id));
            }
            if s.open_record_for_license(&request.license) {
                return Err(AppError::RecordAlreadyOpen(request.license));
            }

            let now = s.now();
            let record = ParkingRecord {
                id: Uuid::new_v4(),
                spot_id: request.spot_id,
                user_id: request.user_id,
                license: request.license.clone(),
                entry_time: now,
                exit_time: None,
                total_cost: Decimal::ZERO,
                is_completed: false,
                vehicle_id: request.vehicle_id,
            };
            s.records.insert(record.id, record.clone());

            if let Some(spot) = s.spots.get_mut(&request.spot_id) {
                spot.status = ParkingStatus::Occupied;
                spot.license = Some(request.license);
                spot.updated_at = now;
            }
            Ok(record)
        })
    }

    async fn release_spot(&self, record_id: Uuid) -> AppResult<ParkingRecord> {
        self.transact(|s| {
            let now = s.now();
            let record = s
                .records
                .get_mut(&record_id)
                .ok_or_else(|| not_found_error("Parking record", &record_id))?;
            if record.is_completed {
                return Err(AppError::AlreadyCompleted(record_id));
            }
            record.exit_time = Some(now);
            record.is_completed = true;
            let closed = record.clone();

            if let Some(spot) = s.spots.get_mut(&closed.spot_id) {
                spot.status = ParkingStatus::Idle;
                spot.license = None;
                spot.updated_at = now;
            }
            Ok(closed)
        })
    }

    async fn set_record_cost(&self, record_id: Uuid, cost: Decimal) -> AppResult<()> {
        self.transact(|s| {
            if let Some(record) = s.records.get_mut(&record_id) {
                record.total_cost = cost;
            }
            Ok(())
        })
    }

    async fn update_spot_status(&self, change: StatusChange) -> AppResult<ParkingSpot> {
        self.transact(|s| {
            let now = s.now();
            let spot = s
                .spots
                .get_mut(&change.spot_id)
                .ok_or_else(|| not_found_error("Parking spot", &change.spot_id))?;
            spot.status = change.status;
            spot.notes = change.notes.clone();
            spot.updated_at = now;
            let updated = spot.clone();

            match change.status {
                ParkingStatus::Faulty => s.maintenance.push(MaintenanceRecord {
                    id: Uuid::new_v4(),
                    spot_id: change.spot_id,
                    description: change.notes,
                    reported_by: change.reported_by,
                    status: MaintenanceStatus::Pending,
                    created_at: now,
                    resolved_at: None,
                }),
                ParkingStatus::Idle => s.resolve_maintenance(change.spot_id, now),
                ParkingStatus::Occupied => {}
            }
            Ok(updated)
        })
    }

    async fn reset_faulty_spots(&self, before: DateTime<Utc>) -> AppResult<Vec<Uuid>> {
        self.transact(|s| {
            let now = s.now();
            let mut ids: Vec<Uuid> = s
                .spots
                .values()
                .filter(|spot| spot.status == ParkingStatus::Faulty && spot.updated_at < before)
                .map(|spot| spot.id)
                .collect();
            ids.sort();
            for id in &ids {
                if let Some(spot) = s.spots.get_mut(id) {
                    spot.status = ParkingStatus::Idle;
                    spot.updated_at = now;
                }
                s.resolve_maintenance(*id, now);
            }
            Ok(ids)
        })
    }

    async fn bind_owner(&self, spot_id: Uuid, user_id: Uuid) -> AppResult<ParkingSpot> {
        self.transact(|s| {
            let owner = s
                .spots
                .get(&spot_id)
                .map(|spot| spot.owner_id)
                .ok_or_else(|| not_found_error("Parking spot", &spot_id))?;
            if owner.is_some() {
                return Err(AppError::AlreadyBound(spot_id));
            }
            let user = s
                .users
                .get_mut(&user_id)
                .ok_or_else(|| not_found_error("User", &user_id))?;
            if !user.roles.contains(&UserRole::Owner) {
                user.roles.push(UserRole::Owner);
            }

            let now = s.now();
            let spot = s
                .spots
                .get_mut(&spot_id)
                .ok_or_else(|| not_found_error("Parking spot", &spot_id))?;
            spot.owner_id = Some(user_id);
            spot.updated_at = now;
            Ok(spot.clone())
        })
    }

    async fn unbind_owner(&self, spot_id: Uuid, user_id: Uuid) -> AppResult<ParkingSpot> {
        self.transact(|s| {
            let now = s.now();
            let spot = s
                .spots
                .get_mut(&spot_id)
                .ok_or_else(|| not_found_error("Parking spot", &spot_id))?;
            if spot.owner_id != Some(user_id) {
                return Err(AppError::NotBoundToUser(spot_id, user_id));
            }
            spot.owner_id = None;
            spot.updated_at = now;
            Ok(spot.clone())
        })
    }

    async fn list_maintenance(
        &self,
        status: Option<MaintenanceStatus>,
    ) -> AppResult<Vec<MaintenanceRecord>> {
        let mut records: Vec<MaintenanceRecord> = self.read(|s| {
            s.maintenance
                .iter()
                .filter(|m| status.map_or(true, |st| m.status == st))
                .cloned()
                .collect()
        });
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(records)
    }
}

#[async_trait]
impl LeaseRepository for MemoryStore {
    async fn create_lease_with_expiry(&self, lease: NewLease) -> AppResult<LeaseOrder> {
        self.transact(|s| {
            if !s.spots.contains_key(&lease.spot_id) {
                return Err(not_found_error("Parking spot", &lease.spot_id));
            }
            let now = s.now();
            let order = LeaseOrder {
                id: Uuid::new_v4(),
                user_id: lease.user_id,
                spot_id: lease.spot_id,
                start_date: lease.start_date,
                end_date: lease.end_date,
                total_price: lease.total_price,
                status: LeaseStatus::Active,
                auto_renew: false,
                created_at: now,
            };
            s.leases.insert(order.id, order.clone());

            if self.should_fail(FailPoint::SpotExpiryUpdate) {
                return Err(Self::injected(FailPoint::SpotExpiryUpdate));
            }
            let spot = s
                .spots
                .get_mut(&lease.spot_id)
                .ok_or_else(|| not_found_error("Parking spot", &lease.spot_id))?;
            spot.expires_at = Some(lease.end_date);
            spot.updated_at = now;
            Ok(order)
        })
    }

    async fn find_expiring(&self, before: DateTime<Utc>) -> AppResult<Vec<LeaseOrder>> {
        let mut leases: Vec<LeaseOrder> = self.read(|s| {
            s.leases
                .values()
                .filter(|l| l.status == LeaseStatus::Active && l.end_date < before)
                .cloned()
                .collect()
        });
        leases.sort_by_key(|l| l.end_date);
        Ok(leases)
    }

    async fn expire_lease(&self, lease_id: Uuid) -> AppResult<()> {
        self.transact(|s| {
            let now = s.now();
            let lease = s
                .leases
                .get_mut(&lease_id)
                .ok_or_else(|| not_found_error("Lease", &lease_id))?;
            lease.status = LeaseStatus::Expired;
            let spot_id = lease.spot_id;

            if self.should_fail(FailPoint::ExpireLease(lease_id)) {
                return Err(Self::injected(FailPoint::ExpireLease(lease_id)));
            }
            if let Some(spot) = s.spots.get_mut(&spot_id) {
                spot.expires_at = None;
                spot.updated_at = now;
            }
            Ok(())
        })
    }

    async fn list_by_user(
        &self,
        user_id: Uuid,
        status: Option<LeaseStatus>,
    ) -> AppResult<Vec<LeaseOrder>> {
        let mut leases: Vec<LeaseOrder> = self.read(|s| {
            s.leases
                .values()
                .filter(|l| l.user_id == user_id && status.map_or(true, |st| l.status == st))
                .cloned()
                .collect()
        });
        leases.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(leases)
    }
}

#[async_trait]
impl VehicleRepository for MemoryStore {
    async fn add_vehicle(&self, vehicle: NewVehicle) -> AppResult<Vehicle> {
        self.transact(|s| {
            if s.vehicles
                .values()
                .any(|v| v.license_plate == vehicle.license_plate)
            {
                return Err(AppError::DuplicateLicense(vehicle.license_plate));
            }
            let first = !s.vehicles.values().any(|v| v.user_id == vehicle.user_id);
            let created = Vehicle {
                id: Uuid::new_v4(),
                user_id: vehicle.user_id,
                license_plate: vehicle.license_plate,
                brand: vehicle.brand,
                model: vehicle.model,
                is_default: first,
                created_at: s.now(),
            };
            s.vehicles.insert(created.id, created.clone());
            Ok(created)
        })
    }

    async fn remove_vehicle(&self, user_id: Uuid, vehicle_id: Uuid) -> AppResult<()> {
        self.transact(|s| {
            let removed = match s.vehicles.get(&vehicle_id) {
                Some(v) if v.user_id == user_id => v.clone(),
                _ => return Err(AppError::NotFoundOrForbidden(vehicle_id)),
            };
            s.vehicles.remove(&vehicle_id);

            if removed.is_default {
                let oldest = s
                    .vehicles
                    .values()
                    .filter(|v| v.user_id == user_id)
                    .min_by_key(|v| (v.created_at, v.id))
                    .map(|v| v.id);
                if let Some(id) = oldest {
                    if let Some(v) = s.vehicles.get_mut(&id) {
                        v.is_default = true;
                    }
                }
            }
            Ok(())
        })
    }

    async fn list_by_user(&self, user_id: Uuid) -> AppResult<Vec<Vehicle>> {
        let mut vehicles: Vec<Vehicle> = self.read(|s| {
            s.vehicles
                .values()
                .filter(|v| v.user_id == user_id)
                .cloned()
                .collect()
        });
        vehicles.sort_by(|a, b| {
            b.is_default
                .cmp(&a.is_default)
                .then(b.created_at.cmp(&a.created_at))
        });
        Ok(vehicles)
    }

    async fn find_by_license(&self, license_plate: &str) -> AppResult<Option<Vehicle>> {
        Ok(self.read(|s| {
            s.vehicles
                .values()
                .find(|v| v.license_plate == license_plate)
                .cloned()
        }))
    }
}

#[async_trait]
impl PurchaseRepository for MemoryStore {
    async fn purchase_spot(
        &self,
        user_id: Uuid,
        spot_id: Uuid,
        price: Decimal,
    ) -> AppResult<PurchaseRecord> {
        self.transact(|s| {
            let now = s.now();
            let occupied = s
                .records
                .values()
                .any(|r| r.spot_id == spot_id && r.exit_time.is_none());
            let spot = s
                .spots
                .get_mut(&spot_id)
                .ok_or_else(|| not_found_error("Parking spot", &spot_id))?;
            if !spot.spot_type.can_convert_to_permanent() {
                return Err(AppError::InvalidConversion(spot.spot_type));
            }
            if occupied || spot.status == ParkingStatus::Occupied {
                return Err(AppError::SpotUnavailable(spot_id));
            }
            spot.spot_type = ParkingType::Permanent;
            spot.status = ParkingStatus::Idle;
            spot.owner_id = Some(user_id);
            spot.license = None;
            spot.updated_at = now;

            if let Some(user) = s.users.get_mut(&user_id) {
                if !user.roles.contains(&UserRole::Owner) {
                    user.roles.push(UserRole::Owner);
                }
            }

            if self.should_fail(FailPoint::PurchaseInsert) {
                return Err(Self::injected(FailPoint::PurchaseInsert));
            }
            let record = PurchaseRecord {
                id: Uuid::new_v4(),
                user_id,
                spot_id,
                purchase_price: price,
                purchase_date: now,
            };
            s.purchases.push(record.clone());
            Ok(record)
        })
    }

    async fn list_by_user(&self, user_id: Uuid) -> AppResult<Vec<PurchaseRecord>> {
        let mut records: Vec<PurchaseRecord> = self.read(|s| {
            s.purchases
                .iter()
                .filter(|p| p.user_id == user_id)
                .cloned()
                .collect()
        });
        records.sort_by(|a, b| b.purchase_date.cmp(&a.purchase_date));
        Ok(records)
    }
}

#[async_trait]
impl ReportRepository for MemoryStore {
    async fn daily_income(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> AppResult<Vec<DailyReport>> {
        let state = self.snapshot();
        let mut by_date: HashMap<chrono::NaiveDate, DailyReport> = HashMap::new();

        for record in state.records.values().filter(|r| r.is_completed) {
            let Some(exit) = record.exit_time else { continue };
            if exit < from || exit > to {
                continue;
            }
            let Some(spot) = state.spots.get(&record.spot_id) else {
                continue;
            };
            let date = exit.date_naive();
            let row = by_date.entry(date).or_insert_with(|| DailyReport {
                date,
                total_income: Decimal::ZERO,
                temporary_count: 0,
                short_term_count: 0,
                permanent_count: 0,
            });
            row.total_income += record.total_cost;
            match spot.spot_type {
                ParkingType::Temporary => row.temporary_count += 1,
                ParkingType::ShortTerm => row.short_term_count += 1,
                ParkingType::Permanent => row.permanent_count += 1,
            }
        }

        let mut rows: Vec<DailyReport> = by_date.into_values().collect();
        rows.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(rows)
    }

    async fn spot_type_counts(&self) -> AppResult<Vec<SpotTypeCount>> {
        let state = self.snapshot();
        let mut counts: HashMap<ParkingType, (i64, i64)> = HashMap::new();
        for spot in state.spots.values() {
            let entry = counts.entry(spot.spot_type).or_insert((0, 0));
            entry.0 += 1;
            if spot.status == ParkingStatus::Idle {
                entry.1 += 1;
            }
        }
        let mut rows: Vec<SpotTypeCount> = counts
            .into_iter()
            .map(|(spot_type, (total, idle))| SpotTypeCount {
                spot_type,
                total,
                idle,
            })
            .collect();
        rows.sort_by_key(|row| row.spot_type);
        Ok(rows)
    }

    async fn user_activities(&self, user_id: Uuid) -> AppResult<Vec<ParkingRecord>> {
        let mut records: Vec<ParkingRecord> = self
            .snapshot()
            .records
            .into_values()
            .filter(|r| r.user_id == Some(user_id))
            .collect();
        records.sort_by(|a, b| b.entry_time.cmp(&a.entry_time));
        Ok(records)
    }
}
