use crate::ir::{KindTag, SchemaObject};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeState {
    Create,
    Update,
    Drop,
}

/// One element-level transformation discovered by the differ. `from` is
/// present for `Update`/`Drop`, `to` for `Create`/`Update`. Changes are
/// short-lived: built fresh for one diff/apply invocation and dropped once
/// the emitter has rendered or applied them.
#[derive(Debug, Clone)]
pub struct Change {
    pub state: ChangeState,
    pub kind: KindTag,
    pub from: Option<SchemaObject>,
    pub to: Option<SchemaObject>,
    pub priority: i32,
}

impl Change {
    #[must_use]
    pub fn create(to: SchemaObject, priority: i32) -> Self {
        Self {
            state: ChangeState::Create,
            kind: to.kind(),
            to: Some(to),
            from: None,
            priority,
        }
    }

    #[must_use]
    pub fn drop(from: SchemaObject, priority: i32) -> Self {
        Self {
            state: ChangeState::Drop,
            kind: from.kind(),
            from: Some(from),
            to: None,
            priority,
        }
    }

    #[must_use]
    pub fn update(from: SchemaObject, to: SchemaObject, priority: i32) -> Self {
        Self {
            state: ChangeState::Update,
            kind: from.kind(),
            from: Some(from),
            to: Some(to),
            priority,
        }
    }

    /// The name of the element being changed, used by the CLI's `--filter`.
    #[must_use]
    pub fn name(&self) -> &str {
        self.to
            .as_ref()
            .or(self.from.as_ref())
            .map(SchemaObject::name)
            .unwrap_or_default()
    }
}
