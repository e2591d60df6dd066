#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Trigger {
    pub name: String,
    pub table_name: String,
    /// Timing + event, e.g. `"BEFORE INSERT"`.
    pub type_name: String,
    pub source: String,
    #[serde(default)]
    pub position: Option<i32>,
    #[serde(default)]
    pub active: Option<bool>,
}

impl Trigger {
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        table_name: impl Into<String>,
        type_name: impl Into<String>,
        source: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            table_name: table_name.into(),
            type_name: type_name.into(),
            source: source.into(),
            position: None,
            active: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct View {
    pub name: String,
    pub source: String,
}

impl View {
    #[must_use]
    pub fn new(name: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            source: source.into(),
        }
    }
}
