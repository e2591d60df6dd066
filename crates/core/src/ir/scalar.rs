//! Small, Firebird-family-only element kinds: domain, exception, sequence, role.

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Domain {
    pub name: String,
    pub type_name: String,
    pub has_default: bool,
    pub default: String,
    pub not_null: bool,
    pub comment: String,
}

impl Domain {
    #[must_use]
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
            has_default: false,
            default: String::new(),
            not_null: false,
            comment: String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Exception {
    pub name: String,
    pub number: i32,
    pub message: String,
    pub comment: String,
}

impl Exception {
    #[must_use]
    pub fn new(name: impl Into<String>, number: i32, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            number,
            message: message.into(),
            comment: String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Sequence {
    pub name: String,
    pub comment: String,
}

impl Sequence {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            comment: String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Role {
    pub name: String,
}

impl Role {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}
