//! Durable per-user ledger: an append-only list of transactions plus
//! per-category budget limits, each kept in its own JSON file.
//!
//! The whole collection is rewritten on every mutation (temp file + rename),
//! and reads are served from memory, so a caller always observes its own
//! committed writes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, info};
use uuid::Uuid;

pub const TRANSACTIONS_FILE: &str = "transactions.json";
pub const BUDGETS_FILE: &str = "budgets.json";

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("i/o error on {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("corrupt data in {path}: {source}")]
    Corrupt {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("ledger lock poisoned")]
    Poisoned,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    Expense,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: String,
    pub user_id: String,
    pub category: String,
    pub amount: u64,
    pub kind: TransactionKind,
    #[serde(default)]
    pub memo: String,
    pub timestamp: DateTime<Utc>,
}

/// Fields supplied by the caller; id and timestamp are assigned on append.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTransaction {
    pub category: String,
    pub amount: u64,
    pub kind: TransactionKind,
    pub memo: String,
}

impl NewTransaction {
    pub fn expense(category: impl Into<String>, amount: u64, memo: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            amount,
            kind: TransactionKind::Expense,
            memo: memo.into(),
        }
    }
}

/// Storage operations the interpreter relies on.
#[cfg_attr(test, mockall::automock)]
pub trait LedgerStore {
    /// Persist a new transaction and return it with its id and timestamp.
    fn append(&self, user_id: &str, txn: NewTransaction) -> Result<Transaction, StoreError>;

    /// Delete a transaction owned by `user_id`. Returns false when there was
    /// nothing to delete.
    fn remove(&self, user_id: &str, id: &str) -> Result<bool, StoreError>;

    /// All transactions for the user, in append order.
    fn list(&self, user_id: &str) -> Result<Vec<Transaction>, StoreError>;

    fn get_budget(&self, user_id: &str, category: &str) -> Result<Option<u64>, StoreError>;

    fn set_budget(&self, user_id: &str, category: &str, limit: u64) -> Result<(), StoreError>;

    /// Every budget the user has set, keyed by category.
    fn budgets(&self, user_id: &str) -> Result<BTreeMap<String, u64>, StoreError>;
}

type BudgetMap = HashMap<String, BTreeMap<String, u64>>;

struct State {
    transactions: Vec<Transaction>,
    budgets: BudgetMap,
}

/// JSON-file backed ledger
pub struct JsonLedgerStore {
    transactions_path: PathBuf,
    budgets_path: PathBuf,
    state: Mutex<State>,
}

impl JsonLedgerStore {
    pub fn open(dir: &Path) -> Result<Self, StoreError> {
        fs::create_dir_all(dir).map_err(|source| StoreError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
        let transactions_path = dir.join(TRANSACTIONS_FILE);
        let budgets_path = dir.join(BUDGETS_FILE);

        let transactions: Vec<Transaction> = load_json(&transactions_path)?.unwrap_or_default();
        let budgets: BudgetMap = load_json(&budgets_path)?.unwrap_or_default();

        info!(
            dir = %dir.display(),
            transactions = transactions.len(),
            users_with_budgets = budgets.len(),
            "ledger opened"
        );

        Ok(Self {
            transactions_path,
            budgets_path,
            state: Mutex::new(State {
                transactions,
                budgets,
            }),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, State>, StoreError> {
        self.state.lock().map_err(|_| StoreError::Poisoned)
    }
}

impl LedgerStore for JsonLedgerStore {
    fn append(&self, user_id: &str, txn: NewTransaction) -> Result<Transaction, StoreError> {
        let mut state = self.lock()?;

        let mut id = Uuid::new_v4().to_string();
        while state.transactions.iter().any(|t| t.id == id) {
            id = Uuid::new_v4().to_string();
        }

        let record = Transaction {
            id,
            user_id: user_id.to_string(),
            category: txn.category,
            amount: txn.amount,
            kind: txn.kind,
            memo: txn.memo,
            timestamp: Utc::now(),
        };

        state.transactions.push(record.clone());
        if let Err(e) = persist(&self.transactions_path, &state.transactions) {
            state.transactions.pop();
            return Err(e);
        }

        debug!(user_id = %user_id, id = %record.id, "transaction appended");
        Ok(record)
    }

    fn remove(&self, user_id: &str, id: &str) -> Result<bool, StoreError> {
        let mut state = self.lock()?;

        let Some(index) = state
            .transactions
            .iter()
            .position(|t| t.id == id && t.user_id == user_id)
        else {
            return Ok(false);
        };

        let removed = state.transactions.remove(index);
        if let Err(e) = persist(&self.transactions_path, &state.transactions) {
            state.transactions.insert(index, removed);
            return Err(e);
        }

        debug!(user_id = %user_id, id = %id, "transaction removed");
        Ok(true)
    }

    fn list(&self, user_id: &str) -> Result<Vec<Transaction>, StoreError> {
        let state = self.lock()?;
        Ok(state
            .transactions
            .iter()
            .filter(|t| t.user_id == user_id)
            .cloned()
            .collect())
    }

    fn get_budget(&self, user_id: &str, category: &str) -> Result<Option<u64>, StoreError> {
        let state = self.lock()?;
        Ok(state
            .budgets
            .get(user_id)
            .and_then(|b| b.get(category))
            .copied())
    }

    fn set_budget(&self, user_id: &str, category: &str, limit: u64) -> Result<(), StoreError> {
        let mut state = self.lock()?;

        let previous = state
            .budgets
            .entry(user_id.to_string())
            .or_default()
            .insert(category.to_string(), limit);

        if let Err(e) = persist(&self.budgets_path, &state.budgets) {
            if let Some(user) = state.budgets.get_mut(user_id) {
                match previous {
                    Some(old) => {
                        user.insert(category.to_string(), old);
                    }
                    None => {
                        user.remove(category);
                    }
                }
                if user.is_empty() {
                    state.budgets.remove(user_id);
                }
            }
            return Err(e);
        }

        debug!(user_id = %user_id, category = %category, limit, "budget set");
        Ok(())
    }

    fn budgets(&self, user_id: &str) -> Result<BTreeMap<String, u64>, StoreError> {
        let state = self.lock()?;
        Ok(state.budgets.get(user_id).cloned().unwrap_or_default())
    }
}

fn load_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<Option<T>, StoreError> {
    if !path.exists() {
        return Ok(None);
    }
    let data = fs::read_to_string(path).map_err(|source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&data)
        .map(Some)
        .map_err(|source| StoreError::Corrupt {
            path: path.to_path_buf(),
            source,
        })
}

fn persist<T: Serialize>(path: &Path, value: &T) -> Result<(), StoreError> {
    let data = serde_json::to_string_pretty(value)?;
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, data).map_err(|source| StoreError::Io {
        path: tmp.clone(),
        source,
    })?;
    fs::rename(&tmp, path).map_err(|source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    })
}
