use super::kind::RoutineKind;

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Parameter {
    pub name: String,
    pub type_name: String,
    pub charset: String,
    pub collate: String,
    pub position: u32,
}

impl Parameter {
    #[must_use]
    pub fn new(name: impl Into<String>, type_name: impl Into<String>, position: u32) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
            charset: String::new(),
            collate: String::new(),
            position,
        }
    }
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Routine {
    pub name: String,
    pub routine_kind: RoutineKind,
    pub source: String,
    pub input_parameters: Vec<Parameter>,
    /// Populated for procedures with `OUT`/`INOUT` parameters.
    pub output_parameters: Vec<Parameter>,
    /// Populated for functions.
    pub output_type: Option<String>,
    pub output_charset: String,
    pub deterministic: bool,
}

impl Routine {
    #[must_use]
    pub fn procedure(name: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            routine_kind: RoutineKind::Procedure,
            source: source.into(),
            input_parameters: Vec::new(),
            output_parameters: Vec::new(),
            output_type: None,
            output_charset: String::new(),
            deterministic: false,
        }
    }

    #[must_use]
    pub fn function(name: impl Into<String>, source: impl Into<String>, output_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            routine_kind: RoutineKind::Function,
            source: source.into(),
            input_parameters: Vec::new(),
            output_parameters: Vec::new(),
            output_type: Some(output_type.into()),
            output_charset: String::new(),
            deterministic: false,
        }
    }

    #[must_use]
    pub fn equals(&self, other: &Self) -> bool {
        self.name == other.name
            && self.routine_kind == other.routine_kind
            && self.source == other.source
            && ordered(&self.input_parameters) == ordered(&other.input_parameters)
            && ordered(&self.output_parameters) == ordered(&other.output_parameters)
            && self.output_type == other.output_type
            && self.output_charset == other.output_charset
            && self.deterministic == other.deterministic
    }
}

fn ordered(params: &[Parameter]) -> Vec<&Parameter> {
    let mut out: Vec<&Parameter> = params.iter().collect();
    out.sort_by_key(|p| p.position);
    out
}
