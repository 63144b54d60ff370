use crate::format::template::{Segment, Template};
use crate::format::value::{ParameterValue, UNRESOLVED_TOKEN};
use crate::step::parameters::StepParameter;

/// Renders step descriptions from a template and the step's parameters.
///
/// Implementations must be pure: the same inputs always give the same
/// output, and formatting never panics or fails.
pub trait NameFormatter: Send + Sync {
    fn format_name(&self, template: &str, parameters: &[StepParameter]) -> String;

    fn format_value(&self, value: &ParameterValue) -> String {
        value.render().into_owned()
    }
}

/// Default formatter.
///
/// `{}` takes the next parameter, in declaration order, that no `{name}`
/// placeholder refers to; `{name}` takes the named one. Parameters the
/// template never references are appended as ` [name: value]`. A template
/// that does not parse is used verbatim.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultNameFormatter;

impl NameFormatter for DefaultNameFormatter {
    fn format_name(&self, template: &str, parameters: &[StepParameter]) -> String {
        let mut used = vec![false; parameters.len()];
        let mut out = String::with_capacity(template.len());

        match Template::parse(template) {
            Ok(parsed) => {
                // named references claim their parameters before any `{}` is filled
                for name in parsed.named() {
                    if let Some(i) = parameters.iter().position(|p| p.name == name) {
                        used[i] = true;
                    }
                }
                for segment in parsed.segments() {
                    match segment {
                        Segment::Literal(text) => out.push_str(text),
                        Segment::Named(name) => {
                            match parameters.iter().position(|p| p.name == *name) {
                                Some(i) => out.push_str(&self.format_value(&parameters[i].value)),
                                None => out.push_str(UNRESOLVED_TOKEN),
                            }
                        }
                        Segment::Positional => match used.iter().position(|u| !u) {
                            Some(i) => {
                                used[i] = true;
                                out.push_str(&self.format_value(&parameters[i].value));
                            }
                            None => out.push_str(UNRESOLVED_TOKEN),
                        },
                    }
                }
            }
            Err(_) => out.push_str(template),
        }

        for (parameter, _) in parameters.iter().zip(&used).filter(|(_, u)| !**u) {
            out.push_str(&format!(
                " [{}: {}]",
                parameter.name,
                self.format_value(&parameter.value)
            ));
        }

        out
    }
}

/// Join a step keyword and its description: `GIVEN product "desk" is stored`.
///
/// The keyword is upper-cased; an empty keyword leaves the description alone.
pub fn format_step_name(keyword: &str, description: &str) -> String {
    let keyword = keyword.trim();
    if keyword.is_empty() {
        description.to_string()
    } else {
        format!("{} {}", keyword.to_uppercase(), description)
    }
}
