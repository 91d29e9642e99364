//! The process-wide set of loaded locales and their messages.
//!
//! A [`LocaleCatalog`] is an immutable snapshot. [`SharedCatalog`] owns the
//! current snapshot: readers grab it without locking, while loads are
//! serialized behind a mutex and publish a new snapshot atomically.
//!
//! Every code is attempted once. A code whose messages failed to load stays
//! out of the catalog and is not retried until the process restarts.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use arc_swap::ArcSwap;
use serde::Serialize;
use tracing::{debug, info, warn};

use super::source::{MessageSource, Messages};

/// Locale used when negotiation finds nothing better.
pub const DEFAULT_LOCALE: &str = "en-US";

/// A loaded locale: its opaque code and human-readable name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Locale {
    pub code: String,
    pub display_name: String,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CatalogError {
    #[error("{codes} locale codes but {names} display names")]
    LengthMismatch { codes: usize, names: usize },
}

/// A locale that could not be loaded and was skipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadFailure {
    pub code: String,
    pub reason: String,
}

#[derive(Debug, Default, Clone)]
pub struct LocaleCatalog {
    locales: Vec<Locale>,
    messages: HashMap<String, Messages>,
    /// Loaded and failed codes alike.
    attempted: HashSet<String>,
}

impl LocaleCatalog {
    /// Builds a catalog from positionally paired codes and names, logging and
    /// skipping every locale whose messages cannot be loaded.
    pub fn load(
        codes: &[String],
        names: &[String],
        source: &dyn MessageSource,
    ) -> Result<Self, CatalogError> {
        let (catalog, failures) = LocaleCatalog::default().extend(codes, names, source)?;
        for failure in failures {
            warn!(
                event_name = "catalog.load.failed",
                event_domain = "i18n",
                locale = failure.code.as_str(),
                "skipping locale: {}",
                failure.reason
            );
        }
        Ok(catalog)
    }

    /// Returns a new catalog with every code not yet attempted added.
    ///
    /// Codes already attempted are left untouched, whether they loaded or
    /// failed, so loading the same input twice yields the same catalog.
    pub fn extend(
        &self,
        codes: &[String],
        names: &[String],
        source: &dyn MessageSource,
    ) -> Result<(Self, Vec<LoadFailure>), CatalogError> {
        if codes.len() != names.len() {
            return Err(CatalogError::LengthMismatch {
                codes: codes.len(),
                names: names.len(),
            });
        }

        let mut next = self.clone();
        let mut failures = Vec::new();
        for (code, name) in codes.iter().zip(names) {
            if !next.attempted.insert(code.clone()) {
                debug!(locale = code.as_str(), "locale already attempted");
                continue;
            }
            match source.load(code) {
                Ok(messages) => {
                    info!(
                        locale = code.as_str(),
                        messages = messages.len(),
                        "loaded locale"
                    );
                    next.locales.push(Locale {
                        code: code.clone(),
                        display_name: name.clone(),
                    });
                    next.messages.insert(code.clone(), messages);
                }
                Err(reason) => failures.push(LoadFailure {
                    code: code.clone(),
                    reason,
                }),
            }
        }
        Ok((next, failures))
    }

    pub fn is_known(&self, code: &str) -> bool {
        self.messages.contains_key(code)
    }

    /// True once `code` has been loaded or has failed to load.
    pub fn is_settled(&self, code: &str) -> bool {
        self.attempted.contains(code)
    }

    fn settles_all(&self, codes: &[String]) -> bool {
        codes.iter().all(|code| self.is_settled(code))
    }

    /// All loaded locales, in load order.
    pub fn list(&self) -> &[Locale] {
        &self.locales
    }

    pub fn get(&self, code: &str) -> Option<&Locale> {
        self.locales.iter().find(|locale| locale.code == code)
    }

    pub fn display_name(&self, code: &str) -> Option<&str> {
        self.get(code).map(|locale| locale.display_name.as_str())
    }

    /// Looks `key` up in `code`, then in the default locale, then gives the
    /// key back unchanged.
    pub fn translate(&self, code: &str, key: &str) -> String {
        [code, DEFAULT_LOCALE]
            .iter()
            .filter_map(|c| self.messages.get(*c))
            .find_map(|messages| messages.get(key))
            .cloned()
            .unwrap_or_else(|| key.to_string())
    }

    /// Binds this catalog to one locale.
    pub fn translator<'a>(&'a self, code: &'a str) -> Translator<'a> {
        Translator {
            catalog: self,
            code,
        }
    }
}

/// Translations for the locale negotiated for one request.
#[derive(Clone, Copy)]
pub struct Translator<'a> {
    catalog: &'a LocaleCatalog,
    code: &'a str,
}

impl Translator<'_> {
    pub fn code(&self) -> &str {
        self.code
    }

    pub fn translate(&self, key: &str) -> String {
        self.catalog.translate(self.code, key)
    }
}

/// The catalog shared by every request.
pub struct SharedCatalog {
    current: ArcSwap<LocaleCatalog>,
    load_lock: Mutex<()>,
    source: Arc<dyn MessageSource>,
}

impl SharedCatalog {
    pub fn new(source: Arc<dyn MessageSource>) -> Self {
        SharedCatalog {
            current: ArcSwap::from_pointee(LocaleCatalog::default()),
            load_lock: Mutex::new(()),
            source,
        }
    }

    /// The current snapshot; never blocks.
    pub fn snapshot(&self) -> Arc<LocaleCatalog> {
        self.current.load_full()
    }

    /// Adds any missing codes and returns the resulting snapshot.
    ///
    /// Safe to call from many requests at once: when every code has already
    /// been attempted no lock is taken and the current snapshot is returned
    /// as is. Otherwise loads run one at a time and each publishes a complete
    /// new snapshot.
    pub fn load(
        &self,
        codes: &[String],
        names: &[String],
    ) -> Result<Arc<LocaleCatalog>, CatalogError> {
        let snapshot = self.snapshot();
        if codes.len() == names.len() && snapshot.settles_all(codes) {
            return Ok(snapshot);
        }

        let _guard = self.load_lock.lock().unwrap_or_else(|e| e.into_inner());
        // another request may have finished the same load while we waited
        let current = self.snapshot();
        if codes.len() == names.len() && current.settles_all(codes) {
            return Ok(current);
        }
        let (next, failures) = current.extend(codes, names, self.source.as_ref())?;
        for failure in failures {
            warn!(
                event_name = "catalog.load.failed",
                event_domain = "i18n",
                locale = failure.code.as_str(),
                "skipping locale: {}",
                failure.reason
            );
        }

        let next = Arc::new(next);
        self.current.store(next.clone());
        Ok(next)
    }
}
