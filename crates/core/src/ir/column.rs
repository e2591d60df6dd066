use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Column {
    pub name: String,
    pub type_name: String,
    pub not_null: bool,
    pub charset: String,
    pub collate: String,
    pub has_default: bool,
    pub default: String,
    pub comment: String,
    pub position: u32,
    /// Dialect-specific extras: MySQL uses `key`/`extra`; Firebird uses `domain`/`field_source`.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, String>,
}

impl Column {
    #[must_use]
    pub fn new(name: impl Into<String>, type_name: impl Into<String>, position: u32) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
            not_null: false,
            charset: String::new(),
            collate: String::new(),
            has_default: false,
            default: String::new(),
            comment: String::new(),
            position,
            extra: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn not_null(mut self, value: bool) -> Self {
        self.not_null = value;
        self
    }

    #[must_use]
    pub fn with_default(mut self, default: impl Into<String>) -> Self {
        self.has_default = true;
        self.default = default.into();
        self
    }

    #[must_use]
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = comment.into();
        self
    }
}
