use crate::value::Value;

/// An ordered set of field assignments applied by `update_fields`.
///
/// Setting the same field twice keeps its original position and replaces the
/// value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Patch {
    sets: Vec<(String, Value)>,
}

impl Patch {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn set(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        let field = field.into();
        let value = value.into();
        if let Some(slot) = self.sets.iter_mut().find(|(f, _)| *f == field) {
            slot.1 = value;
        } else {
            self.sets.push((field, value));
        }
        self
    }

    pub fn fields(&self) -> &[(String, Value)] {
        &self.sets
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.sets.iter().find(|(f, _)| f == field).map(|(_, v)| v)
    }

    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    pub fn len(&self) -> usize {
        self.sets.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.sets.iter().map(|(f, v)| (f.as_str(), v))
    }
}
