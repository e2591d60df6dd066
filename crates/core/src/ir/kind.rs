use std::fmt;

/// Closed category of a schema element within a dialect.
///
/// Not every dialect populates every variant — `Dialect::kinds()` declares which
/// of these a given adapter actually uses, in the fixed order the differ walks them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
pub enum KindTag {
    Table,
    View,
    Routine,
    Trigger,
    Index,
    Domain,
    Exception,
    Sequence,
    Role,
}

impl KindTag {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Table => "table",
            Self::View => "view",
            Self::Routine => "routine",
            Self::Trigger => "trigger",
            Self::Index => "index",
            Self::Domain => "domain",
            Self::Exception => "exception",
            Self::Sequence => "sequence",
            Self::Role => "role",
        }
    }

    #[must_use]
    pub fn plural(self) -> &'static str {
        match self {
            Self::Table => "tables",
            Self::View => "views",
            Self::Routine => "routines",
            Self::Trigger => "triggers",
            Self::Index => "indexes",
            Self::Domain => "domains",
            Self::Exception => "exceptions",
            Self::Sequence => "sequences",
            Self::Role => "roles",
        }
    }
}

impl fmt::Display for KindTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sub-category of an `Index` element. Carries its own priority distinct from
/// the index kind's base priority (see `ordering::priority_for`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
pub enum IndexKind {
    PrimaryKey,
    ForeignKey,
    Unique,
    Index,
}

impl IndexKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::PrimaryKey => "primary_key",
            Self::ForeignKey => "foreign_key",
            Self::Unique => "unique",
            Self::Index => "index",
        }
    }
}

impl fmt::Display for IndexKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum RoutineKind {
    Procedure,
    Function,
}

impl RoutineKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Procedure => "procedure",
            Self::Function => "function",
        }
    }
}

impl fmt::Display for RoutineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
