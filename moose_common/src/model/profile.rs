//! Profile records.
//!
//! A `Profile` is persisted as one JSON file and holds everything a user sets up:
//! accounts, watchlists and settings. Accounts, positions and transactions are
//! carried through persistence but nothing in the dashboard edits them yet.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Name of the watchlist created with every new profile.
pub const DEFAULT_WATCHLIST_NAME: &str = "Default";

/// A named bundle of accounts, watchlists and settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    /// Stable identifier, also the file stem on disk.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Time of the last save.
    pub last_modified: DateTime<Utc>,
    /// Financial accounts (TFSA, RRSP, ...).
    pub accounts: Vec<Account>,
    /// Watchlists in tab order.
    pub watchlists: Vec<Watchlist>,
    /// User preferences.
    pub settings: Settings,
}

impl Profile {
    /// Builds a profile with a single `Default` watchlist and default settings.
    pub fn new(id: impl Into<String>, name: impl Into<String>, now: DateTime<Utc>) -> Self {
        let watchlist = Watchlist::new(watchlist_id(now), DEFAULT_WATCHLIST_NAME, now);
        let settings = Settings {
            default_watchlist_id: watchlist.id.clone(),
            ..Settings::default()
        };
        Profile {
            id: id.into(),
            name: name.into(),
            created_at: now,
            last_modified: now,
            accounts: Vec::new(),
            watchlists: vec![watchlist],
            settings,
        }
    }

    /// Finds a watchlist by id.
    pub fn watchlist(&self, id: &str) -> Option<&Watchlist> {
        self.watchlists.iter().find(|w| w.id == id)
    }

    /// Finds a watchlist by id for mutation.
    pub fn watchlist_mut(&mut self, id: &str) -> Option<&mut Watchlist> {
        self.watchlists.iter_mut().find(|w| w.id == id)
    }

    /// Finds a watchlist by name, ignoring ASCII case.
    pub fn watchlist_by_name(&self, name: &str) -> Option<&Watchlist> {
        self.watchlists
            .iter()
            .find(|w| w.name.eq_ignore_ascii_case(name))
    }

    /// The settings' default watchlist, or the first one.
    pub fn default_watchlist(&self) -> Option<&Watchlist> {
        self.watchlist(&self.settings.default_watchlist_id)
            .or_else(|| self.watchlists.first())
    }

    /// Appends a new empty watchlist and returns its id.
    pub fn add_watchlist(&mut self, name: impl Into<String>, now: DateTime<Utc>) -> String {
        let mut id = watchlist_id(now);
        let mut bump = 1;
        while self.watchlist(&id).is_some() {
            id = format!("{}_{}", watchlist_id(now), bump);
            bump += 1;
        }
        self.watchlists.push(Watchlist::new(id.clone(), name, now));
        id
    }

    /// Re-creates the `Default` watchlist when the profile has none.
    ///
    /// Returns `true` when the profile changed and should be saved.
    pub fn ensure_watchlist(&mut self, now: DateTime<Utc>) -> bool {
        if !self.watchlists.is_empty() {
            return false;
        }
        let id = self.add_watchlist(DEFAULT_WATCHLIST_NAME, now);
        self.settings.default_watchlist_id = id;
        true
    }
}

fn watchlist_id(now: DateTime<Utc>) -> String {
    format!("watchlist_{}", now.timestamp())
}

/// A financial account within a profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    /// Identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Account kind: TFSA, RRSP, FHSA, ...
    #[serde(rename = "type")]
    pub kind: String,
    /// Cash balance.
    pub balance: f64,
    /// Holdings.
    pub positions: Vec<Position>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last update time.
    pub last_updated: DateTime<Utc>,
}

/// A holding of one stock within an account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    /// Held symbol.
    pub stock_symbol: String,
    /// Number of shares.
    pub quantity: f64,
    /// Average cost per share.
    pub average_cost: f64,
    /// Buys and sells that built the position.
    pub transactions: Vec<Transaction>,
}

/// A buy or sell of a position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Identifier.
    pub id: String,
    /// `buy` or `sell`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Number of shares.
    pub quantity: f64,
    /// Price per share.
    pub price: f64,
    /// Execution time.
    pub date: DateTime<Utc>,
    /// Fee paid.
    pub commission: f64,
    /// Free-form notes.
    pub notes: String,
}

/// A named ordered list of ticker symbols.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Watchlist {
    /// Identifier, unique within the profile.
    pub id: String,
    /// Tab title.
    pub name: String,
    /// Symbols in display order, without duplicates.
    pub symbols: Vec<String>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

impl Watchlist {
    /// Creates an empty watchlist.
    pub fn new(id: impl Into<String>, name: impl Into<String>, now: DateTime<Utc>) -> Self {
        Watchlist {
            id: id.into(),
            name: name.into(),
            symbols: Vec::new(),
            created_at: now,
        }
    }

    /// Appends a symbol unless it is already listed. Returns whether it was added.
    pub fn add_symbol(&mut self, symbol: &str) -> bool {
        if self.symbols.iter().any(|s| s == symbol) {
            return false;
        }
        self.symbols.push(symbol.to_string());
        true
    }

    /// Removes a symbol. Returns whether it was listed.
    pub fn remove_symbol(&mut self, symbol: &str) -> bool {
        let before = self.symbols.len();
        self.symbols.retain(|s| s != symbol);
        self.symbols.len() != before
    }
}

/// User preferences.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Dark colour palette.
    pub dark_mode: bool,
    /// Display currency code.
    pub currency: String,
    /// Seconds between periodic refreshes.
    pub refresh_interval: u64,
    /// Watchlist shown first.
    pub default_watchlist_id: String,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            dark_mode: true,
            currency: String::from("CAD"),
            refresh_interval: 60,
            default_watchlist_id: String::new(),
        }
    }
}

impl Settings {
    /// Refresh interval as a `Duration`, at least one second.
    pub fn refresh_every(&self) -> Duration {
        Duration::from_secs(self.refresh_interval.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn new_profile_has_default_watchlist() {
        let profile = Profile::new("profile_1", "Me", now());
        assert_eq!(profile.watchlists.len(), 1);
        assert_eq!(profile.watchlists[0].name, DEFAULT_WATCHLIST_NAME);
        assert_eq!(profile.settings.default_watchlist_id, profile.watchlists[0].id);
        assert_eq!(profile.settings.currency, "CAD");
        assert!(profile.settings.dark_mode);
        assert_eq!(profile.settings.refresh_interval, 60);
    }

    #[test]
    fn json_uses_snake_case_field_names() {
        let profile = Profile::new("profile_1", "Me", now());
        let value = serde_json::to_value(&profile).unwrap();
        assert_eq!(value["created_at"], "2024-03-01T12:00:00Z");
        assert_eq!(value["settings"]["default_watchlist_id"], "watchlist_1709294400");
        assert!(value["watchlists"][0]["symbols"].as_array().unwrap().is_empty());

        let back: Profile = serde_json::from_value(value).unwrap();
        assert_eq!(back, profile);
    }

    #[test]
    fn account_kind_is_serialized_as_type() {
        let account = Account {
            id: "acc".into(),
            name: "Retirement".into(),
            kind: "RRSP".into(),
            balance: 1500.0,
            positions: vec![Position {
                stock_symbol: "RY".into(),
                quantity: 10.0,
                average_cost: 120.5,
                transactions: vec![Transaction {
                    id: "t1".into(),
                    kind: "buy".into(),
                    quantity: 10.0,
                    price: 120.5,
                    date: now(),
                    commission: 4.95,
                    notes: String::new(),
                }],
            }],
            created_at: now(),
            last_updated: now(),
        };
        let value = serde_json::to_value(&account).unwrap();
        assert_eq!(value["type"], "RRSP");
        assert_eq!(value["positions"][0]["transactions"][0]["type"], "buy");
    }

    #[test]
    fn watchlist_symbols_stay_unique() {
        let mut list = Watchlist::new("w", "Tech", now());
        assert!(list.add_symbol("AAPL"));
        assert!(list.add_symbol("MSFT"));
        assert!(!list.add_symbol("AAPL"));
        assert_eq!(list.symbols, vec!["AAPL", "MSFT"]);
        assert!(list.remove_symbol("AAPL"));
        assert!(!list.remove_symbol("AAPL"));
        assert_eq!(list.symbols, vec!["MSFT"]);
    }

    #[test]
    fn watchlist_ids_do_not_collide_within_a_second() {
        let mut profile = Profile::new("p", "Me", now());
        let second = profile.add_watchlist("Tech", now());
        assert_ne!(second, profile.watchlists[0].id);
        assert_eq!(profile.watchlist(&second).unwrap().name, "Tech");
        assert_eq!(profile.watchlist_by_name("tech").unwrap().id, second);
    }

    #[test]
    fn ensure_watchlist_restores_default() {
        let mut profile = Profile::new("p", "Me", now());
        assert!(!profile.ensure_watchlist(now()));
        profile.watchlists.clear();
        assert!(profile.ensure_watchlist(now()));
        assert_eq!(profile.default_watchlist().unwrap().name, DEFAULT_WATCHLIST_NAME);
    }

    #[test]
    fn refresh_interval_has_a_floor() {
        let settings = Settings {
            refresh_interval: 0,
            ..Settings::default()
        };
        assert_eq!(settings.refresh_every(), Duration::from_secs(1));
    }
}
