use smtwrap_smtlib::{Definition, Term};

/// A model as printed by `(get-model)`.
///
/// Holds every `define-fun` the solver reported, constants and functions
/// alike. Bodies are already read into [`Term`]s.
#[derive(Debug, Clone, PartialEq)]
pub struct SolverModel {
    definitions: Vec<Definition>,
}

impl SolverModel {
    /// Create a new empty model.
    pub fn new() -> Self {
        Self {
            definitions: Vec::new(),
        }
    }

    pub fn with_definitions(definitions: Vec<Definition>) -> Self {
        Self { definitions }
    }

    /// Value of a nullary definition.
    pub fn get(&self, name: &str) -> Option<&Term> {
        self.definition(name)
            .filter(|d| d.params.is_empty())
            .map(|d| &d.body)
    }

    pub fn definition(&self, name: &str) -> Option<&Definition> {
        self.definitions.iter().find(|d| d.name == name)
    }

    pub fn definitions(&self) -> &[Definition] {
        &self.definitions
    }

    pub fn into_definitions(self) -> Vec<Definition> {
        self.definitions
    }

    /// Return the number of definitions.
    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    /// Return whether the model is empty.
    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

impl Default for SolverModel {
    fn default() -> Self {
        Self::new()
    }
}
