//! Per-user analysis credits.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::{load_json, save_json, KeyValueStore, StoreError};
use crate::config::INITIAL_FREE_CREDITS;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CreditPackage {
    pub id: &'static str,
    pub credits: u32,
    /// Price in whole dollars.
    pub price: u32,
    pub name: &'static str,
    pub popular: bool,
}

pub const CREDIT_PACKAGES: &[CreditPackage] = &[
    CreditPackage { id: "5-credits", credits: 5, price: 20, name: "Starter Pack", popular: false },
    CreditPackage { id: "15-credits", credits: 15, price: 50, name: "Popular Pack", popular: true },
    CreditPackage { id: "30-credits", credits: 30, price: 90, name: "Professional Pack", popular: false },
    CreditPackage { id: "50-credits", credits: 50, price: 140, name: "Enterprise Pack", popular: false },
    CreditPackage { id: "100-credits", credits: 100, price: 250, name: "Mega Pack", popular: false },
];

pub fn find_package(id: &str) -> Option<&'static CreditPackage> {
    CREDIT_PACKAGES.iter().find(|p| p.id == id)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CreditEntryKind {
    Purchase,
    Usage,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreditEntry {
    #[serde(rename = "type")]
    pub kind: CreditEntryKind,
    pub amount: i64,
    pub date: String,
    pub description: String,
}

/// Credit balance, free-credit counter and transaction log for one user.
pub struct CreditLedger<'a> {
    store: &'a dyn KeyValueStore,
    user_id: String,
}

impl<'a> CreditLedger<'a> {
    pub fn new(store: &'a dyn KeyValueStore, user_id: &str) -> Self {
        Self {
            store,
            user_id: user_id.to_string(),
        }
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    fn credits_key(&self) -> String {
        format!("xrayai_credits_{}", self.user_id)
    }

    fn free_used_key(&self) -> String {
        format!("xrayai_free_credits_used_{}", self.user_id)
    }

    fn history_key(&self) -> String {
        format!("xrayai_credit_history_{}", self.user_id)
    }

    /// Current balance. A user seen for the first time is seeded with the
    /// free allowance.
    pub fn balance(&self) -> Result<u32, StoreError> {
        match load_json::<u32>(self.store, &self.credits_key())? {
            Some(credits) => Ok(credits),
            None => {
                tracing::info!(user = %self.user_id, credits = INITIAL_FREE_CREDITS, "Seeding free credits");
                save_json(self.store, &self.credits_key(), &INITIAL_FREE_CREDITS)?;
                Ok(INITIAL_FREE_CREDITS)
            }
        }
    }

    pub fn free_credits_used(&self) -> Result<u32, StoreError> {
        Ok(load_json(self.store, &self.free_used_key())?.unwrap_or(0))
    }

    /// Newest first.
    pub fn history(&self) -> Result<Vec<CreditEntry>, StoreError> {
        Ok(load_json(self.store, &self.history_key())?.unwrap_or_default())
    }

    fn record(&self, entry: CreditEntry) -> Result<(), StoreError> {
        let mut history = self.history()?;
        history.insert(0, entry);
        save_json(self.store, &self.history_key(), &history)
    }

    /// Add a package's credits. Returns the new balance.
    pub fn purchase(&self, package_id: &str) -> Result<u32, StoreError> {
        let package =
            find_package(package_id).ok_or_else(|| StoreError::UnknownPackage(package_id.to_string()))?;

        let credits = self.balance()? + package.credits;
        save_json(self.store, &self.credits_key(), &credits)?;
        self.record(CreditEntry {
            kind: CreditEntryKind::Purchase,
            amount: i64::from(package.credits),
            date: now_iso(),
            description: format!(
                "Purchased {} ({} credits) - ${}",
                package.name, package.credits, package.price
            ),
        })?;
        tracing::info!(user = %self.user_id, package = package.id, credits, "Credits purchased");
        Ok(credits)
    }

    /// Spend one credit. Returns false (and changes nothing) at zero.
    pub fn use_credit(&self) -> Result<bool, StoreError> {
        let credits = self.balance()?;
        if credits == 0 {
            tracing::warn!(user = %self.user_id, "No credits left");
            return Ok(false);
        }
        save_json(self.store, &self.credits_key(), &(credits - 1))?;

        let free_used = self.free_credits_used()?;
        if free_used < INITIAL_FREE_CREDITS {
            save_json(self.store, &self.free_used_key(), &(free_used + 1))?;
        }

        self.record(CreditEntry {
            kind: CreditEntryKind::Usage,
            amount: -1,
            date: now_iso(),
            description: "Used 1 credit for X-ray analysis".to_string(),
        })?;
        Ok(true)
    }
}

fn now_iso() -> String {
    Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    #[test]
    fn new_user_gets_free_credits() {
        let kv = MemoryStore::new();
        let ledger = CreditLedger::new(&kv, "u1");
        assert_eq!(ledger.balance().unwrap(), INITIAL_FREE_CREDITS);
        assert_eq!(kv.get("xrayai_credits_u1").unwrap().as_deref(), Some("3"));
        assert_eq!(ledger.free_credits_used().unwrap(), 0);
    }

    #[test]
    fn spending_stops_at_zero() {
        let kv = MemoryStore::new();
        let ledger = CreditLedger::new(&kv, "u1");
        for _ in 0..INITIAL_FREE_CREDITS {
            assert!(ledger.use_credit().unwrap());
        }
        assert!(!ledger.use_credit().unwrap());
        assert_eq!(ledger.balance().unwrap(), 0);
        assert_eq!(ledger.free_credits_used().unwrap(), INITIAL_FREE_CREDITS);
        assert_eq!(ledger.history().unwrap().len(), INITIAL_FREE_CREDITS as usize);
    }

    #[test]
    fn purchase_adds_credits_and_logs() {
        let kv = MemoryStore::new();
        let ledger = CreditLedger::new(&kv, "u1");
        assert_eq!(ledger.purchase("15-credits").unwrap(), 18);
        ledger.use_credit().unwrap();

        let history = ledger.history().unwrap();
        assert_eq!(history[0].kind, CreditEntryKind::Usage);
        assert_eq!(history[0].amount, -1);
        assert_eq!(history[1].kind, CreditEntryKind::Purchase);
        assert_eq!(history[1].description, "Purchased Popular Pack (15 credits) - $50");
    }

    #[test]
    fn free_counter_caps_at_allowance() {
        let kv = MemoryStore::new();
        let ledger = CreditLedger::new(&kv, "u1");
        ledger.purchase("5-credits").unwrap();
        for _ in 0..6 {
            ledger.use_credit().unwrap();
        }
        assert_eq!(ledger.free_credits_used().unwrap(), INITIAL_FREE_CREDITS);
        assert_eq!(ledger.balance().unwrap(), 2);
    }

    #[test]
    fn unknown_package_is_rejected() {
        let kv = MemoryStore::new();
        let ledger = CreditLedger::new(&kv, "u1");
        let err = ledger.purchase("7-credits").unwrap_err();
        assert!(matches!(err, StoreError::UnknownPackage(id) if id == "7-credits"));
        assert_eq!(ledger.balance().unwrap(), INITIAL_FREE_CREDITS);
    }

    #[test]
    fn users_are_isolated() {
        let kv = MemoryStore::new();
        CreditLedger::new(&kv, "alice").purchase("100-credits").unwrap();
        assert_eq!(CreditLedger::new(&kv, "bob").balance().unwrap(), INITIAL_FREE_CREDITS);
    }

    #[test]
    fn history_entries_use_type_field() {
        let kv = MemoryStore::new();
        let ledger = CreditLedger::new(&kv, "u1");
        ledger.use_credit().unwrap();
        let raw = kv.get("xrayai_credit_history_u1").unwrap().unwrap();
        assert!(raw.contains("\"type\":\"usage\""));
    }

    #[test]
    fn package_table() {
        let prices: Vec<(u32, u32)> = CREDIT_PACKAGES.iter().map(|p| (p.credits, p.price)).collect();
        assert_eq!(prices, vec![(5, 20), (15, 50), (30, 90), (50, 140), (100, 250)]);
        assert!(find_package("15-credits").unwrap().popular);
    }
}
