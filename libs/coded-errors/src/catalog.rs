//! Registry of named error codes.
//!
//! Codes stay plain integers at runtime; the catalog only attaches a stable
//! name and a title to them so logs and user-facing output can say
//! `[QUOTA_EXCEEDED] ...` instead of `[1003] ...`.

use std::collections::{BTreeMap, btree_map};
use std::error::Error as StdError;

use serde::{Deserialize, Serialize};

use crate::code::ErrorCode;
use crate::config::CatalogConfig;
use crate::error::{CodedError, new_with_code};
use crate::format::Arg;

/// A named code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeDef {
    pub code: ErrorCode,
    pub name: String,
    #[serde(default)]
    pub title: String,
}

impl CodeDef {
    #[must_use]
    pub fn new(code: ErrorCode, name: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            code,
            name: name.into(),
            title: title.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CatalogError {
    #[error("error code {code} is already registered as '{existing}'")]
    DuplicateCode { code: ErrorCode, existing: String },
    #[error("error code name '{name}' is already registered")]
    DuplicateName { name: String },
    #[error("invalid error code name '{name}': only A-Z, 0-9 and '_' are allowed")]
    InvalidName { name: String },
    #[error("unknown error code name '{name}'")]
    UnknownName { name: String },
}

/// Code-to-name registry, ordered by code.
///
/// A new catalog already knows the reserved codes `NONE`, `GENERIC` and
/// `NOT_FOUND`. Names are case-insensitive and stored upper-case.
#[derive(Debug, Clone)]
pub struct CodeCatalog {
    by_code: BTreeMap<ErrorCode, CodeDef>,
    by_name: BTreeMap<String, ErrorCode>,
}

impl Default for CodeCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl CodeCatalog {
    #[must_use]
    pub fn new() -> Self {
        let mut catalog = Self {
            by_code: BTreeMap::new(),
            by_name: BTreeMap::new(),
        };
        for def in [
            CodeDef::new(ErrorCode::NONE, "NONE", "No classification"),
            CodeDef::new(ErrorCode::GENERIC, "GENERIC", "Unclassified error"),
            CodeDef::new(ErrorCode::NOT_FOUND, "NOT_FOUND", "Not found"),
        ] {
            catalog.insert(def);
        }
        catalog
    }

    /// Builds a catalog from the reserved codes plus every configured entry.
    ///
    /// # Errors
    /// Returns the first [`CatalogError`] hit while registering entries.
    pub fn from_config(config: &CatalogConfig) -> Result<Self, CatalogError> {
        let mut catalog = Self::new();
        for (name, entry) in &config.codes {
            catalog.register(CodeDef::new(entry.code, name.as_str(), entry.title.as_str()))?;
        }
        Ok(catalog)
    }

    /// Adds a named code.
    ///
    /// # Errors
    /// - [`CatalogError::InvalidName`] if the name is empty or has characters
    ///   outside `A-Z`, `0-9` and `_` (after upper-casing)
    /// - [`CatalogError::DuplicateCode`] if the code is already named
    /// - [`CatalogError::DuplicateName`] if the name is already taken
    pub fn register(&mut self, def: CodeDef) -> Result<(), CatalogError> {
        let name = normalize(&def.name);
        if name.is_empty()
            || !name
                .chars()
                .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_')
        {
            return Err(CatalogError::InvalidName { name: def.name });
        }
        if let Some(existing) = self.by_code.get(&def.code) {
            return Err(CatalogError::DuplicateCode {
                code: def.code,
                existing: existing.name.clone(),
            });
        }
        if self.by_name.contains_key(&name) {
            return Err(CatalogError::DuplicateName { name });
        }
        tracing::debug!(code = %def.code, name = %name, "registered error code");
        self.insert(CodeDef { name, ..def });
        Ok(())
    }

    /// Chaining form of [`register`](Self::register).
    ///
    /// # Errors
    /// Same as [`register`](Self::register).
    pub fn with_code(
        mut self,
        code: ErrorCode,
        name: &str,
        title: &str,
    ) -> Result<Self, CatalogError> {
        self.register(CodeDef::new(code, name, title))?;
        Ok(self)
    }

    fn insert(&mut self, def: CodeDef) {
        self.by_name.insert(def.name.clone(), def.code);
        self.by_code.insert(def.code, def);
    }

    #[must_use]
    pub fn get(&self, code: ErrorCode) -> Option<&CodeDef> {
        self.by_code.get(&code)
    }

    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<ErrorCode> {
        self.by_name.get(&normalize(name)).copied()
    }

    #[must_use]
    pub fn name_of(&self, code: ErrorCode) -> Option<&str> {
        self.get(code).map(|def| def.name.as_str())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.by_code.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_code.is_empty()
    }

    #[must_use]
    pub fn iter(&self) -> btree_map::Values<'_, ErrorCode, CodeDef> {
        self.by_code.values()
    }

    /// One-line rendering for logs: `[NAME] message` for coded errors with a
    /// registered code, `[<code>] message` for unregistered codes, and the
    /// plain message for any other error.
    #[must_use]
    pub fn describe(&self, error: &(dyn StdError + 'static)) -> String {
        let Some(coded) = error.downcast_ref::<CodedError>() else {
            return error.to_string();
        };
        match self.name_of(coded.code()) {
            Some(name) => format!("[{name}] {}", coded.message()),
            None => format!("[{}] {}", coded.code(), coded.message()),
        }
    }

    /// Builds an error using the code registered under `name`.
    ///
    /// # Errors
    /// Returns [`CatalogError::UnknownName`] if no code has that name.
    pub fn error(
        &self,
        name: &str,
        format: &str,
        args: &[Arg],
    ) -> Result<CodedError, CatalogError> {
        let code = self.lookup(name).ok_or_else(|| CatalogError::UnknownName {
            name: name.to_owned(),
        })?;
        Ok(new_with_code(code, format, args))
    }
}

impl<'a> IntoIterator for &'a CodeCatalog {
    type Item = &'a CodeDef;
    type IntoIter = btree_map::Values<'a, ErrorCode, CodeDef>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

fn normalize(name: &str) -> String {
    name.trim().to_ascii_uppercase()
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::config::CodeEntry;
    use std::io;

    const QUOTA_EXCEEDED: ErrorCode = ErrorCode::new(1003);

    #[test]
    fn reserved_codes_are_preloaded() {
        let catalog = CodeCatalog::new();
        assert_eq!(catalog.len(), 3);
        assert_eq!(catalog.name_of(ErrorCode::NONE), Some("NONE"));
        assert_eq!(catalog.name_of(ErrorCode::GENERIC), Some("GENERIC"));
        assert_eq!(catalog.lookup("not_found"), Some(ErrorCode::NOT_FOUND));
    }

    #[test]
    fn register_normalizes_names() {
        let mut catalog = CodeCatalog::new();
        catalog
            .register(CodeDef::new(QUOTA_EXCEEDED, " quota_exceeded ", "Quota exceeded"))
            .unwrap();
        assert_eq!(catalog.lookup("QUOTA_EXCEEDED"), Some(QUOTA_EXCEEDED));
        assert_eq!(catalog.get(QUOTA_EXCEEDED).unwrap().name, "QUOTA_EXCEEDED");
        assert_eq!(catalog.get(QUOTA_EXCEEDED).unwrap().title, "Quota exceeded");
    }

    #[test]
    fn rejects_duplicates_and_bad_names() {
        let mut catalog = CodeCatalog::new();
        assert_eq!(
            catalog.register(CodeDef::new(ErrorCode::NOT_FOUND, "MISSING", "")),
            Err(CatalogError::DuplicateCode {
                code: ErrorCode::NOT_FOUND,
                existing: "NOT_FOUND".to_owned(),
            })
        );
        assert_eq!(
            catalog.register(CodeDef::new(QUOTA_EXCEEDED, "generic", "")),
            Err(CatalogError::DuplicateName {
                name: "GENERIC".to_owned()
            })
        );
        assert!(matches!(
            catalog.register(CodeDef::new(QUOTA_EXCEEDED, "quota-exceeded", "")),
            Err(CatalogError::InvalidName { .. })
        ));
        assert!(matches!(
            catalog.register(CodeDef::new(QUOTA_EXCEEDED, "  ", "")),
            Err(CatalogError::InvalidName { .. })
        ));
        assert_eq!(catalog.len(), 3);
    }

    #[test]
    fn iterates_in_code_order() {
        let catalog = CodeCatalog::new()
            .with_code(ErrorCode::new(-1), "NEGATIVE", "")
            .and_then(|c| c.with_code(QUOTA_EXCEEDED, "QUOTA_EXCEEDED", ""))
            .unwrap();
        let names: Vec<&str> = catalog.iter().map(|def| def.name.as_str()).collect();
        assert_eq!(
            names,
            ["NEGATIVE", "NONE", "GENERIC", "NOT_FOUND", "QUOTA_EXCEEDED"]
        );
    }

    #[test]
    fn describe_uses_names_when_known() {
        let catalog = CodeCatalog::new();
        let known = new_with_code(ErrorCode::NOT_FOUND, "user %d missing", &[42.into()]);
        assert_eq!(catalog.describe(&known), "[NOT_FOUND] user 42 missing");

        let unknown = new_with_code(ErrorCode::new(500), "boom", &[]);
        assert_eq!(catalog.describe(&unknown), "[500] boom");

        let foreign = io::Error::other("plain");
        assert_eq!(catalog.describe(&foreign), "plain");
    }

    #[test]
    fn error_by_name() {
        let catalog = CodeCatalog::new()
            .with_code(QUOTA_EXCEEDED, "QUOTA_EXCEEDED", "")
            .unwrap();
        let err = catalog
            .error("quota_exceeded", "%d of %d used", &[10.into(), 10.into()])
            .unwrap();
        assert_eq!(err.code(), QUOTA_EXCEEDED);
        assert_eq!(err.message(), "10 of 10 used");

        assert_eq!(
            catalog.error("NOPE", "x", &[]),
            Err(CatalogError::UnknownName {
                name: "NOPE".to_owned()
            })
        );
    }

    #[test]
    fn from_config_registers_entries() {
        let mut config = CatalogConfig::default();
        config.codes.insert(
            "quota_exceeded".to_owned(),
            CodeEntry {
                code: QUOTA_EXCEEDED,
                title: "Quota exceeded".to_owned(),
            },
        );
        let catalog = CodeCatalog::from_config(&config).unwrap();
        assert_eq!(catalog.lookup("QUOTA_EXCEEDED"), Some(QUOTA_EXCEEDED));

        config.codes.insert(
            "shadow".to_owned(),
            CodeEntry {
                code: ErrorCode::GENERIC,
                title: String::new(),
            },
        );
        assert!(matches!(
            CodeCatalog::from_config(&config),
            Err(CatalogError::DuplicateCode { .. })
        ));
    }
}
