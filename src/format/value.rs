use std::borrow::Cow;
use std::fmt::{self, Display, Write};
use std::panic::{self, AssertUnwindSafe};

use serde::{Deserialize, Serialize};

/// Rendered in place of a parameter whose value is not known yet.
pub const UNRESOLVED_TOKEN: &str = "<?>";

/// Rendered in place of a parameter whose value could not be converted to text.
pub const INVALID_TOKEN: &str = "<!>";

// ============================================================================
// Parameter values
// ============================================================================

/// A step argument captured as owned text at the moment of invocation.
///
/// Capturing converts the runtime value immediately, so later mutation of
/// the original variable can never leak into a recorded step name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum ParameterValue {
    /// Declared but not captured yet (step has not started).
    Unresolved,

    /// String-like value, rendered quoted.
    Text(String),

    /// Any other value, rendered through its textual form.
    Plain(String),

    /// The value's textual conversion failed.
    Invalid,
}

impl ParameterValue {
    pub fn text(value: impl Into<String>) -> Self {
        ParameterValue::Text(value.into())
    }

    /// Capture a value through its `Display` implementation.
    ///
    /// A `Display` impl that reports an error or panics yields
    /// [`ParameterValue::Invalid`] instead of propagating.
    pub fn display<T: Display + ?Sized>(value: &T) -> Self {
        match render_with(|out| write!(out, "{}", value)) {
            Some(text) => ParameterValue::Plain(text),
            None => ParameterValue::Invalid,
        }
    }

    /// Capture a value through its `Debug` implementation.
    pub fn debug<T: fmt::Debug + ?Sized>(value: &T) -> Self {
        match render_with(|out| write!(out, "{:?}", value)) {
            Some(text) => ParameterValue::Plain(text),
            None => ParameterValue::Invalid,
        }
    }

    pub fn is_resolved(&self) -> bool {
        !matches!(self, ParameterValue::Unresolved)
    }

    /// Text used inside formatted step names.
    pub fn render(&self) -> Cow<'_, str> {
        match self {
            ParameterValue::Unresolved => Cow::Borrowed(UNRESOLVED_TOKEN),
            ParameterValue::Invalid => Cow::Borrowed(INVALID_TOKEN),
            ParameterValue::Text(text) => Cow::Owned(format!("\"{}\"", text)),
            ParameterValue::Plain(text) => Cow::Borrowed(text.as_str()),
        }
    }
}

impl Display for ParameterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

fn render_with<F>(write_value: F) -> Option<String>
where
    F: FnOnce(&mut String) -> fmt::Result,
{
    let mut out = String::new();
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| write_value(&mut out)));
    match outcome {
        Ok(Ok(())) => Some(out),
        _ => None,
    }
}

// ============================================================================
// Conversion into parameter values
// ============================================================================

/// Conversion used when a step argument is captured.
///
/// Implemented for strings, characters, numbers, booleans, references and
/// options of those. Other types can be captured with
/// [`ParameterValue::display`] or by implementing this trait.
pub trait ToParameterValue {
    fn to_parameter_value(&self) -> ParameterValue;
}

impl ToParameterValue for ParameterValue {
    fn to_parameter_value(&self) -> ParameterValue {
        self.clone()
    }
}

impl ToParameterValue for str {
    fn to_parameter_value(&self) -> ParameterValue {
        ParameterValue::Text(self.to_string())
    }
}

impl ToParameterValue for String {
    fn to_parameter_value(&self) -> ParameterValue {
        ParameterValue::Text(self.clone())
    }
}

impl ToParameterValue for Cow<'_, str> {
    fn to_parameter_value(&self) -> ParameterValue {
        ParameterValue::Text(self.to_string())
    }
}

impl ToParameterValue for char {
    fn to_parameter_value(&self) -> ParameterValue {
        ParameterValue::Text(self.to_string())
    }
}

impl<T: ToParameterValue + ?Sized> ToParameterValue for &T {
    fn to_parameter_value(&self) -> ParameterValue {
        (**self).to_parameter_value()
    }
}

impl<T: ToParameterValue> ToParameterValue for Option<T> {
    fn to_parameter_value(&self) -> ParameterValue {
        match self {
            Some(value) => value.to_parameter_value(),
            None => ParameterValue::Plain("null".to_string()),
        }
    }
}

macro_rules! plain_parameter_values {
    ($($ty:ty),* $(,)?) => {
        $(
            impl ToParameterValue for $ty {
                fn to_parameter_value(&self) -> ParameterValue {
                    ParameterValue::display(self)
                }
            }
        )*
    };
}

plain_parameter_values!(
    i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64, bool,
);

#[cfg(test)]
mod tests {
    use super::*;

    struct Broken;

    impl Display for Broken {
        fn fmt(&self, _f: &mut fmt::Formatter<'_>) -> fmt::Result {
            Err(fmt::Error)
        }
    }

    #[test]
    fn strings_are_quoted_numbers_are_not() {
        assert_eq!("wooden desk".to_parameter_value().render(), "\"wooden desk\"");
        assert_eq!(62.to_parameter_value().render(), "62");
        assert_eq!(Some(1.5).to_parameter_value().render(), "1.5");
        assert_eq!(None::<i32>.to_parameter_value().render(), "null");
    }

    #[test]
    fn failing_display_becomes_invalid() {
        assert_eq!(ParameterValue::display(&Broken), ParameterValue::Invalid);
        assert_eq!(ParameterValue::Invalid.render(), INVALID_TOKEN);
    }
}
