//! JSON file storage.
//!
//! Layout under the data directory:
//!
//! ```text
//! <root>/profiles/<id>.json
//! <root>/stocks.json
//! <root>/candles/<SYMBOL>_<timeframe>.json
//! <root>/drawings/<SYMBOL>_drawings.json
//! ```
//!
//! Every file is rewritten whole on save. A single `RwLock` serializes all file
//! operations (readers share it, writers take it exclusively) and also holds the
//! active profile, so profile edits made through `update_active_profile` are
//! persisted in the same critical section.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use chrono::Utc;
use log::{debug, info, warn};
use moose_common::model::{CandleData, DrawingObject, Profile, Stock};
use moose_common::{MarketError, Result, Timeframe};
use serde::Serialize;
use serde::de::DeserializeOwned;

/// Default data directory, relative to the working directory.
pub const DEFAULT_DATA_DIR: &str = "moosemarket_data";
const PROFILES_DIR: &str = "profiles";
const STOCKS_FILE: &str = "stocks.json";
const CANDLES_DIR: &str = "candles";
const DRAWINGS_DIR: &str = "drawings";

/// File-backed store for profiles, quotes, candles and drawings.
pub struct Storage {
    root: PathBuf,
    /// Guards every file operation; holds the active profile.
    active: RwLock<Option<Profile>>,
}

impl Storage {
    /// Create a store rooted at `root`. Nothing touches the disk until
    /// [`Self::initialize`].
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            active: RwLock::new(None),
        }
    }

    /// Data directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Make sure all directories exist.
    pub fn initialize(&self) -> Result<()> {
        let _guard = self.active.write()?;
        for dir in [
            self.root.clone(),
            self.root.join(PROFILES_DIR),
            self.root.join(CANDLES_DIR),
            self.root.join(DRAWINGS_DIR),
        ] {
            fs::create_dir_all(&dir).map_err(|e| {
                MarketError::Format(format!("failed to create directory {}: {}", dir.display(), e))
            })?;
        }
        info!("Storage initialized at {}", self.root.display());
        Ok(())
    }

    // Profiles

    /// All readable profiles, oldest first. Unreadable or invalid files are skipped.
    pub fn profiles(&self) -> Result<Vec<Profile>> {
        let _guard = self.active.read()?;
        let mut profiles = Vec::new();

        for entry in fs::read_dir(self.root.join(PROFILES_DIR))? {
            let path = entry?.path();
            if !path.is_file() || path.extension().is_none_or(|ext| ext != "json") {
                continue;
            }
            match read_json::<Profile>(&path) {
                Ok(profile) => profiles.push(profile),
                Err(e) => warn!("Skipping profile file {}: {}", path.display(), e),
            }
        }

        profiles.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(profiles)
    }

    /// Load one profile by id.
    pub fn profile(&self, id: &str) -> Result<Profile> {
        let _guard = self.active.read()?;
        read_json(&self.profile_path(id)).map_err(|e| not_found(e, || MarketError::ProfileNotFound(id.to_string())))
    }

    /// Write a profile to disk. The active copy is replaced when the ids match.
    pub fn save_profile(&self, profile: &Profile) -> Result<()> {
        let mut active = self.active.write()?;
        write_json(&self.profile_path(&profile.id), profile)?;
        if let Some(current) = active.as_mut().filter(|p| p.id == profile.id) {
            *current = profile.clone();
        }
        debug!("Saved profile {}", profile.id);
        Ok(())
    }

    /// Create and persist a profile named `name`.
    pub fn create_profile(&self, name: &str) -> Result<Profile> {
        let _guard = self.active.write()?;
        let now = Utc::now();
        let mut stamp = now.timestamp_millis();
        let mut id = format!("profile_{}", stamp);
        while self.profile_path(&id).exists() {
            stamp += 1;
            id = format!("profile_{}", stamp);
        }

        let profile = Profile::new(id, name, now);
        write_json(&self.profile_path(&profile.id), &profile)?;
        info!("Created profile {} ({})", profile.name, profile.id);
        Ok(profile)
    }

    /// Remove a profile file. Clears the active profile when it was this one.
    pub fn delete_profile(&self, id: &str) -> Result<()> {
        let mut active = self.active.write()?;
        fs::remove_file(self.profile_path(id))
            .map_err(|e| not_found(e.into(), || MarketError::ProfileNotFound(id.to_string())))?;
        if active.as_ref().is_some_and(|p| p.id == id) {
            *active = None;
        }
        info!("Deleted profile {}", id);
        Ok(())
    }

    /// Set the profile the dashboard works on.
    pub fn set_active_profile(&self, profile: Profile) -> Result<()> {
        let mut active = self.active.write()?;
        info!("Active profile: {} ({})", profile.name, profile.id);
        *active = Some(profile);
        Ok(())
    }

    /// Copy of the active profile, if any.
    pub fn active_profile(&self) -> Result<Option<Profile>> {
        Ok(self.active.read()?.clone())
    }

    /// Mutate the active profile and persist it within one write lock.
    ///
    /// `f` works on a copy with `last_modified` bumped; the active profile is
    /// only replaced once the copy is on disk. Returns the updated profile
    /// together with the closure's result.
    pub fn update_active_profile<F, R>(&self, f: F) -> Result<(Profile, R)>
    where
        F: FnOnce(&mut Profile) -> R,
    {
        let mut active = self.active.write()?;
        let mut profile = active
            .clone()
            .ok_or_else(|| MarketError::ProfileNotFound(String::from("<active>")))?;
        let outcome = f(&mut profile);
        profile.last_modified = Utc::now();
        write_json(&self.profile_path(&profile.id), &profile)?;
        *active = Some(profile.clone());
        Ok((profile, outcome))
    }

    // Stocks

    /// Write the market snapshot.
    pub fn save_stocks(&self, stocks: &[Stock]) -> Result<()> {
        let _guard = self.active.write()?;
        write_json(&self.root.join(STOCKS_FILE), &stocks)
    }

    /// Read the market snapshot; empty when none was saved yet.
    pub fn load_stocks(&self) -> Result<Vec<Stock>> {
        let _guard = self.active.read()?;
        let path = self.root.join(STOCKS_FILE);
        if !path.exists() {
            return Ok(Vec::new());
        }
        read_json(&path)
    }

    // Candles

    /// Write candles for their symbol/timeframe pair.
    pub fn save_candles(&self, candles: &CandleData) -> Result<()> {
        let _guard = self.active.write()?;
        write_json(&self.candles_path(&candles.symbol, candles.timeframe), candles)
    }

    /// Read candles for a symbol/timeframe pair.
    pub fn load_candles(&self, symbol: &str, timeframe: Timeframe) -> Result<CandleData> {
        let _guard = self.active.read()?;
        let path = self.candles_path(symbol, timeframe);
        if !path.exists() {
            return Err(MarketError::CandlesNotFound {
                symbol: symbol.to_string(),
                timeframe: timeframe.to_string(),
            });
        }
        read_json(&path)
    }

    // Drawings

    /// Replace all drawings of a symbol.
    pub fn save_drawings(&self, symbol: &str, drawings: &[DrawingObject]) -> Result<()> {
        let _guard = self.active.write()?;
        write_json(&self.drawings_path(symbol), &drawings)
    }

    /// Drawings of a symbol; empty when none were saved.
    pub fn load_drawings(&self, symbol: &str) -> Result<Vec<DrawingObject>> {
        let _guard = self.active.read()?;
        let path = self.drawings_path(symbol);
        if !path.exists() {
            return Ok(Vec::new());
        }
        read_json(&path)
    }

    fn profile_path(&self, id: &str) -> PathBuf {
        self.root.join(PROFILES_DIR).join(format!("{}.json", file_stem(id)))
    }

    fn candles_path(&self, symbol: &str, timeframe: Timeframe) -> PathBuf {
        self.root
            .join(CANDLES_DIR)
            .join(format!("{}_{}.json", file_stem(symbol), timeframe))
    }

    fn drawings_path(&self, symbol: &str) -> PathBuf {
        self.root
            .join(DRAWINGS_DIR)
            .join(format!("{}_drawings.json", file_stem(symbol)))
    }
}

/// Keeps file names inside their directory.
fn file_stem(raw: &str) -> String {
    raw.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' { c } else { '_' })
        .collect()
}

fn not_found(err: MarketError, missing: impl FnOnce() -> MarketError) -> MarketError {
    match err {
        MarketError::Io(ref io) if io.kind() == ErrorKind::NotFound => missing(),
        other => other,
    }
}

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let data = serde_json::to_vec_pretty(value)?;
    fs::write(path, data)?;
    Ok(())
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let data = fs::read(path)?;
    Ok(serde_json::from_slice(&data)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockMarket;
    use tempfile::TempDir;

    fn storage() -> (TempDir, Storage) {
        let dir = TempDir::new().unwrap();
        let storage = Storage::new(dir.path().join("data"));
        storage.initialize().unwrap();
        (dir, storage)
    }

    #[test]
    fn initialize_creates_tree() {
        let (_dir, storage) = storage();
        for sub in [PROFILES_DIR, CANDLES_DIR, DRAWINGS_DIR] {
            assert!(storage.root().join(sub).is_dir());
        }
    }

    #[test]
    fn profile_lifecycle() {
        let (_dir, storage) = storage();
        assert!(storage.profiles().unwrap().is_empty());

        let first = storage.create_profile("Default Profile").unwrap();
        let second = storage.create_profile("Trading").unwrap();
        assert_ne!(first.id, second.id);

        let listed = storage.profiles().unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].id, first.id);

        let loaded = storage.profile(&second.id).unwrap();
        assert_eq!(loaded, second);

        storage.delete_profile(&first.id).unwrap();
        assert_eq!(storage.profiles().unwrap().len(), 1);
        assert!(matches!(
            storage.profile(&first.id),
            Err(MarketError::ProfileNotFound(_))
        ));
        assert!(matches!(
            storage.delete_profile(&first.id),
            Err(MarketError::ProfileNotFound(_))
        ));
    }

    #[test]
    fn invalid_profile_files_are_skipped() {
        let (_dir, storage) = storage();
        storage.create_profile("Me").unwrap();
        fs::write(storage.root().join(PROFILES_DIR).join("broken.json"), b"{ nope").unwrap();
        fs::write(storage.root().join(PROFILES_DIR).join("notes.txt"), b"hello").unwrap();
        assert_eq!(storage.profiles().unwrap().len(), 1);
    }

    #[test]
    fn active_profile_updates_are_persisted() {
        let (_dir, storage) = storage();
        assert!(storage.update_active_profile(|_| ()).is_err());

        let profile = storage.create_profile("Me").unwrap();
        let watchlist_id = profile.watchlists[0].id.clone();
        storage.set_active_profile(profile.clone()).unwrap();

        let (updated, added) = storage
            .update_active_profile(|p| p.watchlist_mut(&watchlist_id).unwrap().add_symbol("AAPL"))
            .unwrap();
        assert!(added);
        assert!(updated.last_modified >= profile.last_modified);

        let on_disk = storage.profile(&profile.id).unwrap();
        assert_eq!(on_disk.watchlists[0].symbols, vec!["AAPL"]);
        assert_eq!(storage.active_profile().unwrap().unwrap(), on_disk);
    }

    #[test]
    fn failed_update_leaves_active_profile_untouched() {
        let (_dir, storage) = storage();
        let profile = storage.create_profile("Me").unwrap();
        storage.set_active_profile(profile.clone()).unwrap();

        fs::remove_dir_all(storage.root().join(PROFILES_DIR)).unwrap();
        let result = storage.update_active_profile(|p| p.settings.dark_mode = false);
        assert!(matches!(result, Err(MarketError::Io(_))));
        assert_eq!(storage.active_profile().unwrap().unwrap(), profile);

        fs::create_dir_all(storage.root().join(PROFILES_DIR)).unwrap();
        let (updated, ()) = storage.update_active_profile(|p| p.name = "Renamed".into()).unwrap();
        assert!(updated.settings.dark_mode);
        assert!(storage.profile(&profile.id).unwrap().settings.dark_mode);
    }

    #[test]
    fn saving_the_active_profile_refreshes_the_copy() {
        let (_dir, storage) = storage();
        let mut profile = storage.create_profile("Me").unwrap();
        storage.set_active_profile(profile.clone()).unwrap();
        profile.settings.dark_mode = false;
        storage.save_profile(&profile).unwrap();
        assert!(!storage.active_profile().unwrap().unwrap().settings.dark_mode);

        storage.delete_profile(&profile.id).unwrap();
        assert!(storage.active_profile().unwrap().is_none());
    }

    #[test]
    fn stocks_round_trip_and_default_to_empty() {
        let (_dir, storage) = storage();
        assert!(storage.load_stocks().unwrap().is_empty());
        let stocks = MockMarket::new().market_data().unwrap();
        storage.save_stocks(&stocks).unwrap();
        assert_eq!(storage.load_stocks().unwrap(), stocks);
    }

    #[test]
    fn candles_are_keyed_by_symbol_and_timeframe() {
        let (_dir, storage) = storage();
        let candles = MockMarket::new().candles("AAPL", Timeframe::Min5, 10).unwrap();
        storage.save_candles(&candles).unwrap();
        assert!(storage.root().join(CANDLES_DIR).join("AAPL_5min.json").is_file());
        assert_eq!(storage.load_candles("AAPL", Timeframe::Min5).unwrap(), candles);
        assert!(matches!(
            storage.load_candles("AAPL", Timeframe::Day1),
            Err(MarketError::CandlesNotFound { .. })
        ));
    }

    #[test]
    fn drawings_default_to_empty() {
        let (_dir, storage) = storage();
        assert!(storage.load_drawings("MSFT").unwrap().is_empty());
        let drawings = vec![DrawingObject::horizontal_line("MSFT", 410.0, Utc::now())];
        storage.save_drawings("MSFT", &drawings).unwrap();
        assert!(storage.root().join(DRAWINGS_DIR).join("MSFT_drawings.json").is_file());
        assert_eq!(storage.load_drawings("MSFT").unwrap(), drawings);
    }

    #[test]
    fn file_names_cannot_escape_the_directory() {
        assert_eq!(file_stem("../etc/passwd"), ".._etc_passwd");
    }
}
