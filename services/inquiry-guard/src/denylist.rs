// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Denylisted client addresses, email addresses and email domains.

use crate::config::DenylistConfig;
use crate::error::GuardError;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};
use tracing::{info, warn};

/// A source of denylisted identifiers.
///
/// Lookups may fail for sources backed by something outside the process;
/// the validator decides what a failure means.
pub trait Denylist: Send + Sync {
    /// Whether `identifier` is denylisted. Matching ignores ASCII case.
    fn contains(&self, identifier: &str) -> Result<bool, GuardError>;

    /// Number of entries, for stats.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn normalize(identifier: &str) -> String {
    identifier.trim().to_ascii_lowercase()
}

/// In-memory denylist.
#[derive(Debug, Default)]
pub struct MemoryDenylist {
    entries: RwLock<HashSet<String>>,
}

impl MemoryDenylist {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed from the static lists in configuration.
    pub fn from_config(config: &DenylistConfig) -> Self {
        let list = Self::new();
        for entry in config.ips.iter().chain(&config.emails).chain(&config.domains) {
            list.add(entry);
        }
        list
    }

    pub fn add(&self, identifier: &str) {
        let entry = normalize(identifier);
        if entry.is_empty() {
            return;
        }
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(entry);
    }

    /// Add every entry of a denylist file: one identifier per line, blank
    /// lines and `#` comments ignored. Returns how many lines were read.
    pub fn load_file(&self, path: &Path) -> Result<usize, GuardError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| GuardError::Denylist(format!("{}: {}", path.display(), e)))?;
        let mut loaded = 0;
        for line in content.lines() {
            let entry = line.split('#').next().unwrap_or("").trim();
            if !entry.is_empty() {
                self.add(entry);
                loaded += 1;
            }
        }
        Ok(loaded)
    }
}

impl Denylist for MemoryDenylist {
    fn contains(&self, identifier: &str) -> Result<bool, GuardError> {
        Ok(self
            .entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(&normalize(identifier)))
    }

    fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

/// Denylist backed by a file that is re-read on [`FileDenylist::reload`].
///
/// A file that could not be read at startup leaves the list unavailable, so
/// lookups fail until a reload succeeds. A failed reload keeps the entries
/// from the last good read.
#[derive(Debug)]
pub struct FileDenylist {
    path: PathBuf,
    loaded: RwLock<Option<MemoryDenylist>>,
}

impl FileDenylist {
    /// Open the file. A read failure is logged, not returned.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let list = Self {
            path: path.into(),
            loaded: RwLock::new(None),
        };
        if let Err(e) = list.reload() {
            warn!(error = %e, "Denylist file unavailable");
        }
        list
    }

    /// Re-read the file, replacing the current entries on success.
    pub fn reload(&self) -> Result<usize, GuardError> {
        let fresh = MemoryDenylist::new();
        let count = fresh.load_file(&self.path)?;
        *self.loaded.write().unwrap_or_else(PoisonError::into_inner) = Some(fresh);
        info!(path = %self.path.display(), entries = count, "Loaded denylist file");
        Ok(count)
    }
}

impl Denylist for FileDenylist {
    fn contains(&self, identifier: &str) -> Result<bool, GuardError> {
        match &*self.loaded.read().unwrap_or_else(PoisonError::into_inner) {
            Some(list) => list.contains(identifier),
            None => Err(GuardError::Denylist(format!(
                "{} has not been loaded",
                self.path.display()
            ))),
        }
    }

    fn len(&self) -> usize {
        self.loaded
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map_or(0, Denylist::len)
    }
}

/// Static entries from configuration layered over an optional file.
pub struct LayeredDenylist {
    fixed: MemoryDenylist,
    file: Option<FileDenylist>,
}

impl LayeredDenylist {
    pub fn from_config(config: &DenylistConfig) -> Self {
        Self {
            fixed: MemoryDenylist::from_config(config),
            file: config.file.as_ref().map(FileDenylist::open),
        }
    }

    /// Re-read the file layer, if one is configured. Returns its entry count.
    pub fn reload(&self) -> Result<usize, GuardError> {
        match &self.file {
            Some(file) => file.reload(),
            None => Ok(0),
        }
    }

    pub fn has_file(&self) -> bool {
        self.file.is_some()
    }
}

impl Denylist for LayeredDenylist {
    fn contains(&self, identifier: &str) -> Result<bool, GuardError> {
        if self.fixed.contains(identifier)? {
            return Ok(true);
        }
        match &self.file {
            Some(file) => file.contains(identifier),
            None => Ok(false),
        }
    }

    fn len(&self) -> usize {
        self.fixed.len() + self.file.as_ref().map_or(0, Denylist::len)
    }
}
