use super::index::IndexDef;
use super::kind::KindTag;
use super::routine::Routine;
use super::scalar::{Domain, Exception, Role, Sequence};
use super::table::Table;
use super::trigger::{Trigger, View};

/// Tagged union over every element kind the core understands. Both dialects
/// share this type; `Dialect::kinds()` declares which variants a given
/// dialect actually populates.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SchemaObject {
    Table(Table),
    View(View),
    Routine(Routine),
    Trigger(Trigger),
    Index(IndexDef),
    Domain(Domain),
    Exception(Exception),
    Sequence(Sequence),
    Role(Role),
}

impl SchemaObject {
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Table(t) => &t.name,
            Self::View(v) => &v.name,
            Self::Routine(r) => &r.name,
            Self::Trigger(t) => &t.name,
            Self::Index(i) => &i.name,
            Self::Domain(d) => &d.name,
            Self::Exception(e) => &e.name,
            Self::Sequence(s) => &s.name,
            Self::Role(r) => &r.name,
        }
    }

    #[must_use]
    pub fn kind(&self) -> KindTag {
        match self {
            Self::Table(_) => KindTag::Table,
            Self::View(_) => KindTag::View,
            Self::Routine(_) => KindTag::Routine,
            Self::Trigger(_) => KindTag::Trigger,
            Self::Index(_) => KindTag::Index,
            Self::Domain(_) => KindTag::Domain,
            Self::Exception(_) => KindTag::Exception,
            Self::Sequence(_) => KindTag::Sequence,
            Self::Role(_) => KindTag::Role,
        }
    }

    #[must_use]
    pub fn plural_kind(&self) -> &'static str {
        self.kind().plural()
    }

    /// Structural equality over the attributes of §3; delegates to each
    /// variant's own equality, which is set-like (order-insensitive but
    /// position-honoring) where the data model calls for it.
    #[must_use]
    pub fn equals(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Table(a), Self::Table(b)) => a.equals(b),
            (Self::View(a), Self::View(b)) => a == b,
            (Self::Routine(a), Self::Routine(b)) => a.equals(b),
            (Self::Trigger(a), Self::Trigger(b)) => a == b,
            (Self::Index(a), Self::Index(b)) => a.equals(b),
            (Self::Domain(a), Self::Domain(b)) => a == b,
            (Self::Exception(a), Self::Exception(b)) => a == b,
            (Self::Sequence(a), Self::Sequence(b)) => a == b,
            (Self::Role(a), Self::Role(b)) => a == b,
            _ => false,
        }
    }

    #[must_use]
    pub fn as_table(&self) -> Option<&Table> {
        match self {
            Self::Table(t) => Some(t),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_index(&self) -> Option<&IndexDef> {
        match self {
            Self::Index(i) => Some(i),
            _ => None,
        }
    }
}
