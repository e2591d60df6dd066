use std::collections::BTreeMap;

use crate::dialect::Dialect;
use crate::error::{Error, Result};

/// Process-wide map from engine alias (e.g. `mysql5.6`, `fb2.5`) to adapter.
/// Built explicitly by the CLI's `main` rather than through a lazily
/// initialized global, so tests can assemble a private registry
/// (SPEC_FULL.md §9).
#[derive(Default)]
pub struct DialectRegistry {
    dialects: BTreeMap<String, Box<dyn Dialect>>,
}

impl DialectRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, dialect: Box<dyn Dialect>) {
        self.dialects.insert(dialect.alias().to_string(), dialect);
    }

    pub fn get(&self, alias: &str) -> Result<&dyn Dialect> {
        self.dialects
            .get(alias)
            .map(Box::as_ref)
            .ok_or_else(|| Error::UnknownEngine { alias: alias.to_string() })
    }

    #[must_use]
    pub fn aliases(&self) -> impl Iterator<Item = &str> {
        self.dialects.keys().map(String::as_str)
    }
}
