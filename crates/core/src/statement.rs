/// A single rendered DDL statement, already terminated by the caller-supplied
/// separator. The emitter never inspects or re-terminates this text — each
/// per-element formatter appends the separator exactly once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement(pub String);

impl Statement {
    #[must_use]
    pub fn new(sql: impl Into<String>) -> Self {
        Self(sql.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Statement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
