//! Lead persistence collaborator: the single store implementation selected
//! at startup, plus the existing-contacts lookup the deduplicator is
//! seeded from.

use crate::error::Result;
use crate::models::CandidateLead;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

/// Contact signals already known to the store, used to seed a hunt's dedup
/// state. Phone scope is global across all users (phone numbers carry a
/// uniqueness constraint); email scope is per user.
#[derive(Debug, Clone, Default)]
pub(crate) struct ExistingContactSet {
    pub phones: HashSet<String>,
    pub emails: HashSet<String>,
}

/// The storage seam between the pipeline and whatever persists leads.
pub(crate) trait LeadStore {
    /// Returns the existing contacts relevant to a hunt for `user`.
    fn lookup(&self, user: &str) -> ExistingContactSet;

    /// Persists accepted leads for `user` after a hunt returns.
    fn append(&mut self, user: &str, leads: &[CandidateLead]) -> Result<()>;
}

#[derive(Serialize, Deserialize, Debug, Default)]
struct StoreFile {
    leads: HashMap<String, Vec<CandidateLead>>,
}

/// JSON-file backed lead store.
pub(crate) struct JsonLeadStore {
    path: PathBuf,
    data: StoreFile,
}

impl JsonLeadStore {
    /// Opens the store, loading existing leads if the file is present.
    pub(crate) fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let data = if path.exists() {
            let content = fs::read_to_string(&path)?;
            serde_json::from_str(&content)?
        } else {
            StoreFile::default()
        };

        let total: usize = data.leads.values().map(Vec::len).sum();
        tracing::info!(target: "store", "Opened lead store {} ({} leads)", path.display(), total);
        Ok(Self { path, data })
    }

    fn save(&self) -> Result<()> {
        let content = serde_json::to_string_pretty(&self.data)?;
        fs::write(&self.path, content)?;
        Ok(())
    }

    pub(crate) fn leads_for(&self, user: &str) -> &[CandidateLead] {
        self.data.leads.get(user).map(Vec::as_slice).unwrap_or(&[])
    }
}

impl LeadStore for JsonLeadStore {
    fn lookup(&self, user: &str) -> ExistingContactSet {
        let phones = self
            .data
            .leads
            .values()
            .flatten()
            .filter(|l| !l.phone.is_empty())
            .map(|l| l.phone.clone())
            .collect();

        let emails = self
            .data
            .leads
            .get(user)
            .into_iter()
            .flatten()
            .filter(|l| !l.email.is_empty())
            .map(|l| l.email.to_lowercase())
            .collect();

        ExistingContactSet { phones, emails }
    }

    fn append(&mut self, user: &str, leads: &[CandidateLead]) -> Result<()> {
        if leads.is_empty() {
            return Ok(());
        }
        self.data
            .leads
            .entry(user.to_string())
            .or_default()
            .extend_from_slice(leads);
        self.save()?;
        tracing::info!(target: "store", "Stored {} leads for user '{}'", leads.len(), user);
        Ok(())
    }
}
