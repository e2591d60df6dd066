use std::borrow::Cow;
use std::collections::BTreeMap;

use crate::ir::{IndexDef, KindTag, SchemaObject, Trigger};

/// A two-level aggregate `kind -> name -> element`, holding every element
/// belonging to one database or one file project.
///
/// `index` and `trigger` are *not* stored as their own top-level buckets —
/// they live nested inside each `Table`'s own maps, exactly as §3 describes a
/// table's attributes. `kind_elements(KindTag::Index | KindTag::Trigger)`
/// synthesizes the flattened top-level view the differ iterates, so the
/// generic per-kind algorithm in §4.D still sees them as first-class kinds
/// without the container physically duplicating the data.
#[derive(Debug, Clone, Default)]
pub struct Schema {
    elements: BTreeMap<KindTag, BTreeMap<String, SchemaObject>>,
}

impl Schema {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an element. Duplicate `(kind, name)` is a caller bug (invariant
    /// 1); loaders are responsible for enforcing uniqueness before calling
    /// this, so it simply overwrites rather than erroring at this layer.
    pub fn add(&mut self, element: SchemaObject) {
        self.elements
            .entry(element.kind())
            .or_default()
            .insert(element.name().to_string(), element);
    }

    #[must_use]
    pub fn children(&self) -> impl Iterator<Item = &SchemaObject> {
        self.elements.values().flat_map(|by_name| by_name.values())
    }

    #[must_use]
    pub fn get(&self, kind: KindTag, name: &str) -> Option<&SchemaObject> {
        self.elements.get(&kind).and_then(|by_name| by_name.get(name))
    }

    #[must_use]
    pub fn tables(&self) -> impl Iterator<Item = (&str, &crate::ir::Table)> {
        self.elements
            .get(&KindTag::Table)
            .into_iter()
            .flat_map(|by_name| by_name.iter())
            .filter_map(|(name, obj)| obj.as_table().map(|t| (name.as_str(), t)))
    }

    /// The name-keyed map for one declared kind, synthesizing `Index` and
    /// `Trigger` by flattening across every table when those kinds are
    /// requested directly.
    #[must_use]
    pub fn kind_elements(&self, kind: KindTag) -> Cow<'_, BTreeMap<String, SchemaObject>> {
        match kind {
            KindTag::Index => Cow::Owned(self.flatten_indexes()),
            KindTag::Trigger => Cow::Owned(self.flatten_triggers()),
            _ => self
                .elements
                .get(&kind)
                .map(Cow::Borrowed)
                .unwrap_or_else(|| Cow::Owned(BTreeMap::new())),
        }
    }

    fn flatten_indexes(&self) -> BTreeMap<String, SchemaObject> {
        let mut out = BTreeMap::new();
        for (_, table) in self.tables() {
            for index in table.all_indexes() {
                out.insert(index.name.clone(), SchemaObject::Index(clone_index(index)));
            }
        }
        out
    }

    fn flatten_triggers(&self) -> BTreeMap<String, SchemaObject> {
        let mut out = BTreeMap::new();
        for (_, table) in self.tables() {
            for trigger in table.ordered_triggers() {
                out.insert(trigger.name.clone(), SchemaObject::Trigger(clone_trigger(trigger)));
            }
        }
        out
    }
}

fn clone_index(index: &IndexDef) -> IndexDef {
    index.clone()
}

fn clone_trigger(trigger: &Trigger) -> Trigger {
    trigger.clone()
}
