use std::collections::HashSet;
use std::fmt;

use crate::format::template::{Template, is_parameter_name};
use crate::format::value::{ParameterValue, ToParameterValue};
use crate::step::context::StepContext;
use crate::step::error::DeclarationError;
use crate::step::parameters::{StepParameter, StepParameters};

/// Body of a step, run once with the step's context.
pub type StepBody = Box<dyn FnOnce(&mut StepContext) -> anyhow::Result<()> + Send>;

type Resolver = Box<dyn FnOnce() -> anyhow::Result<Invocation> + Send>;

/// A step whose arguments have been captured and which is ready to run.
pub(crate) struct Invocation {
    pub(crate) values: Vec<ParameterValue>,
    pub(crate) body: StepBody,
}

enum Pending {
    /// Body already owns its arguments.
    Ready(StepBody),

    /// Arguments are evaluated right before the body runs.
    Deferred { arity: usize, resolve: Resolver },
}

// ============================================================================
// Step descriptor
// ============================================================================

/// Declaration of one step: keyword, name template, parameters and body.
///
/// ```
/// use scenario_engine::step::step_model::Step;
///
/// let step = Step::new("given", "product {} is stored", || Ok(()))
///     .param("product", "wooden desk");
/// assert_eq!(step.parameter_names(), vec!["product"]);
/// ```
pub struct Step {
    keyword: String,
    template: String,
    parameters: Vec<(String, Option<ParameterValue>)>,
    pending: Pending,
}

impl Step {
    /// A step with a zero-argument body.
    pub fn new<F>(keyword: impl Into<String>, template: impl Into<String>, body: F) -> Self
    where
        F: FnOnce() -> anyhow::Result<()> + Send + 'static,
    {
        Step::with_context(keyword, template, move |_| body())
    }

    /// A step whose body receives the [`StepContext`] (for comments).
    pub fn with_context<F>(keyword: impl Into<String>, template: impl Into<String>, body: F) -> Self
    where
        F: FnOnce(&mut StepContext) -> anyhow::Result<()> + Send + 'static,
    {
        Step {
            keyword: keyword.into(),
            template: template.into(),
            parameters: Vec::new(),
            pending: Pending::Ready(Box::new(body)),
        }
    }

    /// A step whose arguments are evaluated immediately before the body runs.
    ///
    /// `resolve` is called exactly once, when the step starts; its values
    /// are captured for the step name and then moved into `body`. If the
    /// scenario halts earlier, `resolve` is never called and the parameters
    /// are reported as unresolved.
    pub fn deferred<A, R, F>(
        keyword: impl Into<String>,
        template: impl Into<String>,
        names: &[&str],
        resolve: R,
        body: F,
    ) -> Self
    where
        A: StepArguments + Send + 'static,
        R: FnOnce() -> anyhow::Result<A> + Send + 'static,
        F: FnOnce(A, &mut StepContext) -> anyhow::Result<()> + Send + 'static,
    {
        let resolve: Resolver = Box::new(move || {
            let args = resolve()?;
            let values = args.capture();
            let body: StepBody = Box::new(move |ctx| body(args, ctx));
            Ok(Invocation { values, body })
        });
        Step {
            keyword: keyword.into(),
            template: template.into(),
            parameters: names.iter().map(|n| (n.to_string(), None)).collect(),
            pending: Pending::Deferred {
                arity: A::ARITY,
                resolve,
            },
        }
    }

    /// Declare a parameter whose value is already known; it is captured now.
    pub fn param(mut self, name: impl Into<String>, value: impl ToParameterValue) -> Self {
        self.parameters
            .push((name.into(), Some(value.to_parameter_value())));
        self
    }

    pub fn keyword(&self) -> &str {
        &self.keyword
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    pub fn parameter_names(&self) -> Vec<&str> {
        self.parameters.iter().map(|(n, _)| n.as_str()).collect()
    }

    /// First resolution pass: preset values bound, everything else unresolved.
    pub fn declared_parameters(&self) -> StepParameters {
        StepParameters::declare(self.parameters.iter().map(|(name, value)| {
            StepParameter::new(
                name.clone(),
                value.clone().unwrap_or(ParameterValue::Unresolved),
            )
        }))
    }

    /// Check the declaration. `number` is the 1-based position in the scenario.
    pub fn validate(&self, number: usize) -> Result<(), DeclarationError> {
        let template = self.template.clone();
        if self.template.trim().is_empty() {
            return Err(DeclarationError::EmptyName { step: number });
        }

        let mut seen = HashSet::new();
        for (name, _) in &self.parameters {
            if !is_parameter_name(name) {
                return Err(DeclarationError::InvalidParameterName {
                    step: number,
                    template,
                    name: name.clone(),
                });
            }
            if !seen.insert(name.as_str()) {
                return Err(DeclarationError::DuplicateParameter {
                    step: number,
                    template,
                    name: name.clone(),
                });
            }
        }

        let unbound = self.parameters.iter().filter(|(_, v)| v.is_none()).count();
        let supplied = match &self.pending {
            Pending::Ready(_) => 0,
            Pending::Deferred { arity, .. } => *arity,
        };
        if unbound != supplied {
            return Err(DeclarationError::ArityMismatch {
                step: number,
                template,
                declared: unbound,
                provided: supplied,
            });
        }

        let parsed = Template::parse(&self.template).map_err(|source| {
            DeclarationError::MalformedTemplate {
                step: number,
                template: template.clone(),
                source,
            }
        })?;
        if let Some(name) = parsed.named().find(|n| !seen.contains(n)) {
            return Err(DeclarationError::UnknownPlaceholder {
                step: number,
                template,
                name: name.to_string(),
            });
        }
        if parsed.positional_count() > self.parameters.len() {
            return Err(DeclarationError::TooManyPlaceholders {
                step: number,
                template,
                placeholders: parsed.positional_count(),
                parameters: self.parameters.len(),
            });
        }
        Ok(())
    }

    /// Second resolution pass: evaluate deferred arguments and hand back the
    /// runnable body.
    pub(crate) fn into_invocation(self) -> anyhow::Result<Invocation> {
        match self.pending {
            Pending::Ready(body) => Ok(Invocation {
                values: Vec::new(),
                body,
            }),
            Pending::Deferred { resolve, .. } => resolve(),
        }
    }
}

impl fmt::Debug for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Step")
            .field("keyword", &self.keyword)
            .field("template", &self.template)
            .field("parameters", &self.parameters)
            .field(
                "deferred",
                &matches!(self.pending, Pending::Deferred { .. }),
            )
            .finish()
    }
}

// ============================================================================
// Argument tuples
// ============================================================================

/// Arguments of a deferred step, captured into parameter values in order.
pub trait StepArguments {
    const ARITY: usize;

    fn capture(&self) -> Vec<ParameterValue>;
}

impl StepArguments for () {
    const ARITY: usize = 0;

    fn capture(&self) -> Vec<ParameterValue> {
        Vec::new()
    }
}

macro_rules! tuple_arguments {
    ($arity:expr; $($ty:ident . $idx:tt),+) => {
        impl<$($ty: ToParameterValue),+> StepArguments for ($($ty,)+) {
            const ARITY: usize = $arity;

            fn capture(&self) -> Vec<ParameterValue> {
                vec![$(self.$idx.to_parameter_value()),+]
            }
        }
    };
}

tuple_arguments!(1; A.0);
tuple_arguments!(2; A.0, B.1);
tuple_arguments!(3; A.0, B.1, C.2);
tuple_arguments!(4; A.0, B.1, C.2, D.3);
tuple_arguments!(5; A.0, B.1, C.2, D.3, E.4);
tuple_arguments!(6; A.0, B.1, C.2, D.3, E.4, F.5);
