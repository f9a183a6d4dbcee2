//! In-memory account and resource store.
//!
//! The store is deliberately dumb: it never makes access decisions. Handlers
//! load a record, ask the gate, then call back in to mutate.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

use warden_acl::{Owned, PrincipalId, ResourceKind, Role};
use warden_auth::AuthenticatedUser;

/// Errors raised by store operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum StoreError {
    /// An account with this email already exists.
    #[error("Email already registered")]
    DuplicateEmail,

    /// No record of this kind with this id.
    #[error("{kind} {id} not found")]
    NotFound {
        /// Kind that was looked up
        kind: ResourceKind,
        /// Id that was looked up
        id: u64,
    },
}

/// A registered account. Accounts double as the `author` resource.
#[derive(Debug, Clone, Serialize)]
pub struct Account {
    /// Principal id.
    pub id: PrincipalId,
    /// Display name.
    pub username: String,
    /// Login email (unique).
    pub email: String,
    /// Argon2 PHC string.
    #[serde(skip)]
    pub password_hash: String,
    /// Role.
    pub role: Role,
    /// When the account was registered.
    pub created_at: DateTime<Utc>,
}

impl Account {
    /// The identity carried in request extensions for this account.
    pub fn user(&self) -> AuthenticatedUser {
        AuthenticatedUser {
            id: self.id,
            email: self.email.clone(),
            role: self.role,
        }
    }
}

impl Owned for Account {
    fn owner(&self) -> Option<PrincipalId> {
        Some(self.id)
    }
}

/// A stored resource of any non-account kind.
#[derive(Debug, Clone, Serialize)]
pub struct Record {
    /// Id, unique within its kind.
    pub id: u64,
    /// Resource kind.
    pub kind: ResourceKind,
    /// Owning principal (`author` / `created_by` / `placed_by`).
    pub owner: Option<PrincipalId>,
    /// Free-form attributes supplied by clients.
    pub data: Map<String, Value>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last modification time.
    pub updated_at: DateTime<Utc>,
}

impl Owned for Record {
    fn owner(&self) -> Option<PrincipalId> {
        self.owner
    }
}

/// How an update applies the new attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateMode {
    /// `PUT`: replace every attribute.
    Replace,
    /// `PATCH`: overwrite only the supplied attributes.
    Merge,
}

/// Accounts and records, keyed by id.
#[derive(Debug, Default)]
pub struct Store {
    accounts: BTreeMap<u64, Account>,
    records: HashMap<ResourceKind, BTreeMap<u64, Record>>,
    next_account_id: u64,
    next_record_id: HashMap<ResourceKind, u64>,
}

impl Store {
    /// An empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new account. Emails are compared case-insensitively.
    pub fn create_account(
        &mut self,
        username: &str,
        email: &str,
        password_hash: String,
        role: Role,
    ) -> Result<Account, StoreError> {
        if self.account_by_email(email).is_some() {
            return Err(StoreError::DuplicateEmail);
        }
        self.next_account_id += 1;
        let account = Account {
            id: PrincipalId::new(self.next_account_id),
            username: username.to_string(),
            email: email.to_string(),
            password_hash,
            role,
            created_at: Utc::now(),
        };
        self.accounts.insert(self.next_account_id, account.clone());
        Ok(account)
    }

    /// Look an account up by login email.
    pub fn account_by_email(&self, email: &str) -> Option<&Account> {
        self.accounts
            .values()
            .find(|a| a.email.eq_ignore_ascii_case(email))
    }

    /// Look an account up by id.
    pub fn account(&self, id: PrincipalId) -> Option<&Account> {
        self.accounts.get(&id.get())
    }

    /// The account a validated token was issued for. Both the id and the
    /// email must still match.
    pub fn account_for(&self, claimed: &AuthenticatedUser) -> Option<&Account> {
        self.account(claimed.id)
            .filter(|a| a.email.eq_ignore_ascii_case(&claimed.email))
    }

    /// Every account, by id.
    pub fn accounts(&self) -> Vec<Account> {
        self.accounts.values().cloned().collect()
    }

    /// Change an account's display name.
    pub fn rename_account(
        &mut self,
        id: PrincipalId,
        username: &str,
    ) -> Result<Account, StoreError> {
        let account = self.account_mut(id)?;
        account.username = username.to_string();
        Ok(account.clone())
    }

    /// Replace an account's stored password hash.
    pub fn set_password_hash(
        &mut self,
        id: PrincipalId,
        password_hash: String,
    ) -> Result<Account, StoreError> {
        let account = self.account_mut(id)?;
        account.password_hash = password_hash;
        Ok(account.clone())
    }

    fn account_mut(&mut self, id: PrincipalId) -> Result<&mut Account, StoreError> {
        self.accounts
            .get_mut(&id.get())
            .ok_or(StoreError::NotFound {
                kind: ResourceKind::Author,
                id: id.get(),
            })
    }

    /// Remove an account.
    pub fn delete_account(&mut self, id: PrincipalId) -> Result<Account, StoreError> {
        self.accounts.remove(&id.get()).ok_or(StoreError::NotFound {
            kind: ResourceKind::Author,
            id: id.get(),
        })
    }

    /// Store a new record owned by `owner`.
    pub fn insert(
        &mut self,
        kind: ResourceKind,
        owner: Option<PrincipalId>,
        data: Map<String, Value>,
    ) -> Record {
        let next = self.next_record_id.entry(kind).or_default();
        *next += 1;
        let now = Utc::now();
        let record = Record {
            id: *next,
            kind,
            owner,
            data,
            created_at: now,
            updated_at: now,
        };
        self.records
            .entry(kind)
            .or_default()
            .insert(record.id, record.clone());
        record
    }

    /// Fetch one record.
    pub fn get(&self, kind: ResourceKind, id: u64) -> Result<&Record, StoreError> {
        self.records
            .get(&kind)
            .and_then(|records| records.get(&id))
            .ok_or(StoreError::NotFound { kind, id })
    }

    /// Every record of `kind`, by id.
    pub fn list(&self, kind: ResourceKind) -> Vec<Record> {
        self.records
            .get(&kind)
            .map(|records| records.values().cloned().collect())
            .unwrap_or_default()
    }

    /// Apply new attributes to a record. The owner never changes here.
    pub fn update(
        &mut self,
        kind: ResourceKind,
        id: u64,
        data: Map<String, Value>,
        mode: UpdateMode,
    ) -> Result<Record, StoreError> {
        let record = self
            .records
            .get_mut(&kind)
            .and_then(|records| records.get_mut(&id))
            .ok_or(StoreError::NotFound { kind, id })?;
        match mode {
            UpdateMode::Replace => record.data = data,
            UpdateMode::Merge => record.data.extend(data),
        }
        record.updated_at = Utc::now();
        Ok(record.clone())
    }

    /// Remove a record.
    pub fn delete(&mut self, kind: ResourceKind, id: u64) -> Result<Record, StoreError> {
        self.records
            .get_mut(&kind)
            .and_then(|records| records.remove(&id))
            .ok_or(StoreError::NotFound { kind, id })
    }
}
