use crate::result::result_model::ScenarioInfo;
use crate::step::error::DeclarationError;
use crate::step::step_model::Step;

/// An ordered list of steps under a scenario name, ready to be run.
#[derive(Debug)]
pub struct Scenario {
    info: ScenarioInfo,
    steps: Vec<Step>,
}

impl Scenario {
    pub fn new(name: impl Into<String>) -> Self {
        Scenario::from_info(ScenarioInfo::new(name))
    }

    pub fn from_info(info: ScenarioInfo) -> Self {
        Scenario {
            info,
            steps: Vec::new(),
        }
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.info.labels.push(label.into());
        self
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.info.categories.push(category.into());
        self
    }

    pub fn step(mut self, step: Step) -> Self {
        self.steps.push(step);
        self
    }

    pub fn steps(mut self, steps: impl IntoIterator<Item = Step>) -> Self {
        self.steps.extend(steps);
        self
    }

    pub fn info(&self) -> &ScenarioInfo {
        &self.info
    }

    pub fn step_count(&self) -> usize {
        self.steps.len()
    }

    /// Check every step declaration; the first problem found is returned.
    pub fn validate(&self) -> Result<(), DeclarationError> {
        self.steps
            .iter()
            .enumerate()
            .try_for_each(|(i, step)| step.validate(i + 1))
    }

    pub(crate) fn into_parts(self) -> (ScenarioInfo, Vec<Step>) {
        (self.info, self.steps)
    }
}
