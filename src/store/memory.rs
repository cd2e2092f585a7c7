//! In-memory store with an optional JSON snapshot file
//!
//! When opened from a path, every mutation is staged on a copy of the tables,
//! written to disk, and only then made visible. A failed write leaves both the
//! file and the in-memory state unchanged.

use chrono::Utc;
use log::{debug, error, info};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use super::Store;
use crate::error::{Error, Result};
use crate::records::{
    ApiKey, CashFlowProjection, FinancialProfile, Investment, MonthlyExpense, NewApiKey, NewExpense,
    NewInvestment, NewProjection, NewUser, User,
};

/// Records owned by a single user
trait Owned {
    fn user_id(&self) -> u64;
}

macro_rules! impl_owned {
    ($($ty:ty),*) => {
        $(impl Owned for $ty {
            fn user_id(&self) -> u64 { self.user_id }
        })*
    };
}

impl_owned!(MonthlyExpense, Investment, ApiKey, CashFlowProjection);

/// Auto-incrementing table keyed by id
#[derive(Debug, Clone, Serialize, Deserialize)]
struct Table<T> {
    next_id: u64,
    rows: BTreeMap<u64, T>,
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Self {
            next_id: 1,
            rows: BTreeMap::new(),
        }
    }
}

impl<T: Clone> Table<T> {
    fn allocate_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn find(&self, predicate: impl Fn(&T) -> bool) -> Option<T> {
        self.rows.values().find(|row| predicate(row)).cloned()
    }

    fn insert(&mut self, build: impl FnOnce(u64) -> T) -> T {
        let id = self.allocate_id();
        let row = build(id);
        self.rows.insert(id, row.clone());
        row
    }
}

impl<T: Owned + Clone> Table<T> {
    fn owned_by(&self, user_id: u64) -> Vec<T> {
        self.rows.values().filter(|r| r.user_id() == user_id).cloned().collect()
    }

    fn get_owned(&self, user_id: u64, id: u64) -> Option<T> {
        self.rows.get(&id).filter(|r| r.user_id() == user_id).cloned()
    }

    fn delete_owned(&mut self, user_id: u64, id: u64) -> bool {
        let owned = self.rows.get(&id).map(|r| r.user_id() == user_id).unwrap_or(false);
        if owned {
            self.rows.remove(&id);
        }
        owned
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct Tables {
    users: Table<User>,
    profiles: Table<FinancialProfile>,
    expenses: Table<MonthlyExpense>,
    investments: Table<Investment>,
    api_keys: Table<ApiKey>,
    projections: Table<CashFlowProjection>,
}

/// Thread-safe store; see the module docs for snapshot semantics
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
    snapshot_path: Option<PathBuf>,
}

impl MemoryStore {
    /// Empty store that lives only in memory
    pub fn new() -> Self {
        Self::default()
    }

    /// Store backed by a JSON snapshot; a missing file starts empty
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        let tables = if path.exists() {
            let reader = BufReader::new(File::open(&path)?);
            let tables: Tables = serde_json::from_reader(reader)?;
            info!(
                "Loaded store snapshot from {} ({} users)",
                path.display(),
                tables.users.rows.len()
            );
            tables
        } else {
            info!("No store snapshot at {}, starting empty", path.display());
            Tables::default()
        };

        Ok(Self {
            tables: RwLock::new(tables),
            snapshot_path: Some(path),
        })
    }

    fn read<R>(&self, f: impl FnOnce(&Tables) -> R) -> Result<R> {
        let tables = self
            .tables
            .read()
            .map_err(|_| Error::Storage("store lock poisoned".to_string()))?;
        Ok(f(&tables))
    }

    fn write<R>(&self, f: impl FnOnce(&mut Tables) -> Result<R>) -> Result<R> {
        let mut tables = self
            .tables
            .write()
            .map_err(|_| Error::Storage("store lock poisoned".to_string()))?;

        match &self.snapshot_path {
            None => f(&mut tables),
            Some(path) => {
                let mut staged = tables.clone();
                let out = f(&mut staged)?;
                write_snapshot(path, &staged).map_err(|e| {
                    error!("Failed to write store snapshot {}: {}", path.display(), e);
                    Error::Storage(format!("failed to persist changes: {}", e))
                })?;
                *tables = staged;
                Ok(out)
            }
        }
    }
}

/// Write to a sibling temp file, then rename over the snapshot
fn write_snapshot(path: &Path, tables: &Tables) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let tmp_path = path.with_extension("json.tmp");
    {
        let mut writer = BufWriter::new(File::create(&tmp_path)?);
        serde_json::to_writer_pretty(&mut writer, tables)?;
        writer.flush()?;
    }
    fs::rename(&tmp_path, path)?;
    debug!("Wrote store snapshot {}", path.display());
    Ok(())
}

impl Store for MemoryStore {
    fn insert_user(&self, new_user: NewUser) -> Result<User> {
        self.write(|t| {
            let users = &t.users.rows;
            if users.values().any(|u| u.username == new_user.username) {
                return Err(Error::Conflict("Username already exists".to_string()));
            }
            if users.values().any(|u| u.email == new_user.email) {
                return Err(Error::Conflict("Email already exists".to_string()));
            }
            if users.values().any(|u| u.access_key == new_user.access_key) {
                return Err(Error::Conflict("Access key already in use".to_string()));
            }

            let user = t.users.insert(|id| User {
                id,
                username: new_user.username,
                email: new_user.email,
                password: new_user.password,
                access_key: new_user.access_key,
                created_at: Utc::now(),
                is_active: true,
            });
            if t.profiles.find(|p| p.user_id == user.id).is_none() {
                t.profiles.insert(|id| FinancialProfile {
                    id,
                    ..FinancialProfile::default_for(user.id)
                });
            }
            Ok(user)
        })
    }

    fn get_user(&self, user_id: u64) -> Result<Option<User>> {
        self.read(|t| t.users.rows.get(&user_id).cloned())
    }

    fn find_user_by_username(&self, username: &str) -> Result<Option<User>> {
        self.read(|t| t.users.find(|u| u.username == username))
    }

    fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        self.read(|t| t.users.find(|u| u.email == email))
    }

    fn find_user_by_access_key(&self, access_key: &str) -> Result<Option<User>> {
        self.read(|t| t.users.find(|u| u.access_key == access_key))
    }

    fn update_user(&self, user: User) -> Result<User> {
        self.write(|t| {
            if !t.users.rows.contains_key(&user.id) {
                return Err(Error::not_found("User not found"));
            }
            if t.users.rows.values().any(|u| u.id != user.id && u.email == user.email) {
                return Err(Error::Conflict("Email already exists".to_string()));
            }
            t.users.rows.insert(user.id, user.clone());
            Ok(user)
        })
    }

    fn get_profile(&self, user_id: u64) -> Result<Option<FinancialProfile>> {
        self.read(|t| t.profiles.find(|p| p.user_id == user_id))
    }

    fn save_profile(&self, mut profile: FinancialProfile) -> Result<FinancialProfile> {
        self.write(|t| {
            let existing = t.profiles.find(|p| p.user_id == profile.user_id);
            profile.id = match existing {
                Some(p) => p.id,
                None => t.profiles.allocate_id(),
            };
            t.profiles.rows.insert(profile.id, profile.clone());
            Ok(profile)
        })
    }

    fn insert_expense(&self, user_id: u64, new_expense: NewExpense) -> Result<MonthlyExpense> {
        self.write(|t| {
            Ok(t.expenses.insert(|id| MonthlyExpense {
                id,
                user_id,
                category: new_expense.category,
                description: new_expense.description,
                amount: new_expense.amount,
                is_recurring: new_expense.is_recurring,
                created_at: Utc::now(),
            }))
        })
    }

    fn list_expenses(&self, user_id: u64) -> Result<Vec<MonthlyExpense>> {
        self.read(|t| t.expenses.owned_by(user_id))
    }

    fn get_expense(&self, user_id: u64, expense_id: u64) -> Result<Option<MonthlyExpense>> {
        self.read(|t| t.expenses.get_owned(user_id, expense_id))
    }

    fn update_expense(&self, expense: MonthlyExpense) -> Result<MonthlyExpense> {
        self.write(|t| {
            if t.expenses.get_owned(expense.user_id, expense.id).is_none() {
                return Err(Error::not_found("Expense not found"));
            }
            t.expenses.rows.insert(expense.id, expense.clone());
            Ok(expense)
        })
    }

    fn delete_expense(&self, user_id: u64, expense_id: u64) -> Result<bool> {
        self.write(|t| Ok(t.expenses.delete_owned(user_id, expense_id)))
    }

    fn insert_investment(&self, user_id: u64, new_investment: NewInvestment) -> Result<Investment> {
        self.write(|t| {
            Ok(t.investments.insert(|id| Investment {
                id,
                user_id,
                investment_type: new_investment.investment_type,
                name: new_investment.name,
                amount: new_investment.amount,
                expected_return: new_investment.expected_return,
                risk_level: new_investment.risk_level,
                created_at: Utc::now(),
            }))
        })
    }

    fn list_investments(&self, user_id: u64) -> Result<Vec<Investment>> {
        self.read(|t| t.investments.owned_by(user_id))
    }

    fn delete_investment(&self, user_id: u64, investment_id: u64) -> Result<bool> {
        self.write(|t| Ok(t.investments.delete_owned(user_id, investment_id)))
    }

    fn insert_api_key(&self, user_id: u64, new_key: NewApiKey) -> Result<ApiKey> {
        self.write(|t| {
            Ok(t.api_keys.insert(|id| ApiKey {
                id,
                user_id,
                key_name: new_key.key_name,
                api_key: new_key.api_key,
                created_at: Utc::now(),
                is_active: true,
            }))
        })
    }

    fn list_api_keys(&self, user_id: u64) -> Result<Vec<ApiKey>> {
        self.read(|t| t.api_keys.owned_by(user_id))
    }

    fn delete_api_key(&self, user_id: u64, key_id: u64) -> Result<bool> {
        self.write(|t| Ok(t.api_keys.delete_owned(user_id, key_id)))
    }

    fn insert_projection(&self, user_id: u64, new_projection: NewProjection) -> Result<CashFlowProjection> {
        self.write(|t| {
            Ok(t.projections.insert(|id| CashFlowProjection {
                id,
                user_id,
                projection_name: new_projection.projection_name,
                projection_data: new_projection.projection_data,
                created_at: Utc::now(),
            }))
        })
    }

    fn list_projections(&self, user_id: u64) -> Result<Vec<CashFlowProjection>> {
        self.read(|t| t.projections.owned_by(user_id))
    }

    fn get_projection(&self, user_id: u64, projection_id: u64) -> Result<Option<CashFlowProjection>> {
        self.read(|t| t.projections.get_owned(user_id, projection_id))
    }

    fn delete_projection(&self, user_id: u64, projection_id: u64) -> Result<bool> {
        self.write(|t| Ok(t.projections.delete_owned(user_id, projection_id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn new_user(name: &str) -> NewUser {
        NewUser {
            username: name.to_string(),
            email: format!("{}@example.com", name),
            password: "salt$digest".to_string(),
            access_key: format!("{}-key", name),
        }
    }

    fn new_expense(amount: f64) -> NewExpense {
        NewExpense {
            category: "housing".to_string(),
            description: String::new(),
            amount,
            is_recurring: true,
        }
    }

    fn temp_snapshot(tag: &str) -> PathBuf {
        static COUNTER: AtomicUsize = AtomicUsize::new(0);
        let n = COUNTER.fetch_add(1, Ordering::SeqCst);
        std::env::temp_dir()
            .join(format!("cashflow_planner_{}_{}_{}", tag, std::process::id(), n))
            .join("store.json")
    }

    #[test]
    fn test_user_ids_increment_and_lookup() {
        let store = MemoryStore::new();
        let a = store.insert_user(new_user("ana")).unwrap();
        let b = store.insert_user(new_user("bruno")).unwrap();
        assert_eq!(a.id, 1);
        assert_eq!(b.id, 2);
        assert!(a.is_active);

        assert_eq!(store.find_user_by_username("bruno").unwrap().unwrap().id, 2);
        assert_eq!(store.find_user_by_email("ana@example.com").unwrap().unwrap().id, 1);
        assert_eq!(store.find_user_by_access_key("ana-key").unwrap().unwrap().id, 1);
        assert!(store.find_user_by_access_key("nope").unwrap().is_none());
    }

    #[test]
    fn test_insert_user_creates_profile_in_same_write() {
        let path = temp_snapshot("profile");
        {
            let store = MemoryStore::open(&path).unwrap();
            let user = store.insert_user(new_user("ana")).unwrap();
            let profile = store.get_profile(user.id).unwrap().unwrap();
            assert_eq!(profile.user_id, user.id);
            assert_eq!(profile.inflation_rate, 4.5);

            // A rejected insert creates no profile either
            assert!(store.insert_user(new_user("ana")).is_err());
            assert!(store.get_profile(2).unwrap().is_none());
        }

        let reopened = MemoryStore::open(&path).unwrap();
        assert!(reopened.get_profile(1).unwrap().is_some());
        assert!(reopened.get_profile(2).unwrap().is_none());

        let _ = fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn test_duplicate_username_rejected() {
        let store = MemoryStore::new();
        store.insert_user(new_user("ana")).unwrap();

        let mut dup = new_user("ana");
        dup.email = "other@example.com".to_string();
        dup.access_key = "other".to_string();
        let err = store.insert_user(dup).unwrap_err();
        assert!(matches!(err, Error::Conflict(_)));
    }

    #[test]
    fn test_update_user_email_conflict() {
        let store = MemoryStore::new();
        let mut a = store.insert_user(new_user("ana")).unwrap();
        store.insert_user(new_user("bruno")).unwrap();

        a.email = "bruno@example.com".to_string();
        assert!(matches!(store.update_user(a).unwrap_err(), Error::Conflict(_)));
    }

    #[test]
    fn test_profile_upsert_keeps_id() {
        let store = MemoryStore::new();
        let saved = store.save_profile(FinancialProfile::default_for(1)).unwrap();
        assert_eq!(saved.id, 1);

        let mut changed = saved.clone();
        changed.monthly_income = 5000.0;
        let resaved = store.save_profile(changed).unwrap();
        assert_eq!(resaved.id, 1);
        assert_eq!(store.get_profile(1).unwrap().unwrap().monthly_income, 5000.0);
        assert!(store.get_profile(2).unwrap().is_none());
    }

    #[test]
    fn test_records_scoped_by_owner() {
        let store = MemoryStore::new();
        let e1 = store.insert_expense(1, new_expense(100.0)).unwrap();
        store.insert_expense(2, new_expense(200.0)).unwrap();
        store.insert_expense(1, new_expense(300.0)).unwrap();

        let mine = store.list_expenses(1).unwrap();
        assert_eq!(mine.len(), 2);
        assert!(mine.iter().all(|e| e.user_id == 1));

        assert!(store.get_expense(2, e1.id).unwrap().is_none());
        assert!(!store.delete_expense(2, e1.id).unwrap());
        assert!(store.delete_expense(1, e1.id).unwrap());
        assert_eq!(store.list_expenses(1).unwrap().len(), 1);
    }

    #[test]
    fn test_update_expense_requires_owner() {
        let store = MemoryStore::new();
        let mut expense = store.insert_expense(1, new_expense(100.0)).unwrap();
        expense.amount = 150.0;
        assert_eq!(store.update_expense(expense.clone()).unwrap().amount, 150.0);

        expense.user_id = 2;
        assert!(matches!(store.update_expense(expense).unwrap_err(), Error::NotFound(_)));
    }

    #[test]
    fn test_projection_roundtrip() {
        let store = MemoryStore::new();
        let saved = store
            .insert_projection(
                3,
                NewProjection {
                    projection_name: "plan".to_string(),
                    projection_data: "[]".to_string(),
                },
            )
            .unwrap();

        let loaded = store.get_projection(3, saved.id).unwrap().unwrap();
        assert_eq!(loaded, saved);
        assert!(store.get_projection(4, saved.id).unwrap().is_none());
        assert!(store.delete_projection(3, saved.id).unwrap());
        assert!(store.list_projections(3).unwrap().is_empty());
    }

    #[test]
    fn test_snapshot_survives_reopen() {
        let path = temp_snapshot("reopen");
        {
            let store = MemoryStore::open(&path).unwrap();
            store.insert_user(new_user("ana")).unwrap();
            store.insert_expense(1, new_expense(42.0)).unwrap();
        }

        let reopened = MemoryStore::open(&path).unwrap();
        assert_eq!(reopened.find_user_by_username("ana").unwrap().unwrap().id, 1);
        assert_eq!(reopened.list_expenses(1).unwrap()[0].amount, 42.0);

        // Ids continue after the persisted counter
        let next = reopened.insert_expense(1, new_expense(1.0)).unwrap();
        assert_eq!(next.id, 2);

        let _ = fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn test_failed_mutation_leaves_snapshot_untouched() {
        let path = temp_snapshot("conflict");
        let store = MemoryStore::open(&path).unwrap();
        store.insert_user(new_user("ana")).unwrap();
        assert!(store.insert_user(new_user("ana")).is_err());

        let reopened = MemoryStore::open(&path).unwrap();
        assert!(reopened.get_user(2).unwrap().is_none());

        let _ = fs::remove_dir_all(path.parent().unwrap());
    }
}
