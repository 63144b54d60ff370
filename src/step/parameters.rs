use serde::{Deserialize, Serialize};

use crate::format::value::ParameterValue;

/// A declared step parameter and its value, if already captured.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepParameter {
    pub name: String,
    pub value: ParameterValue,
}

impl StepParameter {
    pub fn new(name: impl Into<String>, value: ParameterValue) -> Self {
        StepParameter {
            name: name.into(),
            value,
        }
    }

    pub fn unresolved(name: impl Into<String>) -> Self {
        StepParameter::new(name, ParameterValue::Unresolved)
    }
}

/// Ordered parameter list of one step occurrence.
///
/// Built in two passes: at declaration every parameter without a known
/// value is [`ParameterValue::Unresolved`]; when the step starts the
/// captured values are bound. Binding only fills unresolved slots, so
/// binding again is a no-op for values already fixed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepParameters {
    entries: Vec<StepParameter>,
}

impl StepParameters {
    /// Declare parameters. Entries whose value is not known yet carry
    /// [`ParameterValue::Unresolved`].
    pub fn declare(parameters: impl IntoIterator<Item = StepParameter>) -> Self {
        StepParameters {
            entries: parameters.into_iter().collect(),
        }
    }

    /// Bind captured values to the unresolved parameters, in order.
    ///
    /// Extra values are ignored; unresolved parameters left without a value
    /// stay unresolved.
    pub fn bind(&mut self, values: impl IntoIterator<Item = ParameterValue>) {
        let mut values = values.into_iter();
        for entry in self.entries.iter_mut().filter(|e| !e.value.is_resolved()) {
            match values.next() {
                Some(value) => entry.value = value,
                None => break,
            }
        }
    }

    pub fn is_fully_resolved(&self) -> bool {
        self.entries.iter().all(|e| e.value.is_resolved())
    }

    pub fn unresolved_count(&self) -> usize {
        self.entries.iter().filter(|e| !e.value.is_resolved()).count()
    }

    pub fn as_slice(&self) -> &[StepParameter] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
