use thiserror::Error;

// ============================================================================
// Step name templates
// ============================================================================

/// One piece of a parsed step name template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Plain text, with `{{` / `}}` already unescaped.
    Literal(String),

    /// `{}`: filled with the next unused parameter in declaration order.
    Positional,

    /// `{name}`: filled with the parameter called `name`.
    Named(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    #[error("unclosed '{{' at byte {0}")]
    Unclosed(usize),

    #[error("unmatched '}}' at byte {0}")]
    UnmatchedClose(usize),

    #[error("invalid placeholder name '{0}'")]
    InvalidName(String),
}

/// A parsed step name template such as
/// `Customer receives invoice for product {product} in amount {} pounds`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    segments: Vec<Segment>,
}

impl Template {
    pub fn parse(source: &str) -> Result<Self, TemplateError> {
        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut chars = source.char_indices().peekable();

        while let Some((pos, c)) = chars.next() {
            match c {
                '{' if matches!(chars.peek(), Some((_, '{'))) => {
                    chars.next();
                    literal.push('{');
                }
                '}' if matches!(chars.peek(), Some((_, '}'))) => {
                    chars.next();
                    literal.push('}');
                }
                '{' => {
                    let mut name = String::new();
                    let mut closed = false;
                    for (_, inner) in chars.by_ref() {
                        if inner == '}' {
                            closed = true;
                            break;
                        }
                        name.push(inner);
                    }
                    if !closed {
                        return Err(TemplateError::Unclosed(pos));
                    }
                    if !literal.is_empty() {
                        segments.push(Segment::Literal(std::mem::take(&mut literal)));
                    }
                    let name = name.trim();
                    if name.is_empty() {
                        segments.push(Segment::Positional);
                    } else if is_parameter_name(name) {
                        segments.push(Segment::Named(name.to_string()));
                    } else {
                        return Err(TemplateError::InvalidName(name.to_string()));
                    }
                }
                '}' => return Err(TemplateError::UnmatchedClose(pos)),
                other => literal.push(other),
            }
        }

        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }
        Ok(Template { segments })
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn positional_count(&self) -> usize {
        self.segments
            .iter()
            .filter(|s| matches!(s, Segment::Positional))
            .count()
    }

    pub fn named(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|s| match s {
            Segment::Named(name) => Some(name.as_str()),
            _ => None,
        })
    }
}

/// Parameter names are identifiers: letters, digits and underscores,
/// not starting with a digit.
pub fn is_parameter_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_alphabetic() || first == '_' => {
            chars.all(|c| c.is_alphanumeric() || c == '_')
        }
        _ => false,
    }
}

// ============================================================================
// Identifier-style step names
// ============================================================================

/// Build a template from an identifier-style step name.
///
/// Underscores become spaces. For each parameter, in declaration order:
/// a word equal to the upper-cased parameter name is replaced by its
/// placeholder (`..._of_AMOUNT_pounds` -> `of {amount} pounds`); failing
/// that, a word equal to the parameter name ignoring case gets the
/// placeholder inserted after it (`Product_is...` -> `Product {product} is`).
/// Parameters matching no word are left for the `[name: value]` suffix.
pub fn template_from_identifier(identifier: &str, parameter_names: &[&str]) -> String {
    let mut words: Vec<String> = identifier
        .split('_')
        .filter(|w| !w.is_empty())
        .map(escape_literal)
        .collect();
    let mut placeholder_at = vec![false; words.len()];

    for name in parameter_names {
        let placeholder = format!("{{{}}}", name);
        let upper = name.to_uppercase();
        let lower = name.to_lowercase();

        let replaced = words
            .iter()
            .enumerate()
            .position(|(i, w)| !placeholder_at[i] && *w == upper && upper != *name);
        if let Some(i) = replaced {
            words[i] = placeholder;
            placeholder_at[i] = true;
            continue;
        }

        let after = words
            .iter()
            .enumerate()
            .position(|(i, w)| !placeholder_at[i] && w.to_lowercase() == lower);
        if let Some(i) = after {
            words.insert(i + 1, placeholder);
            placeholder_at.insert(i + 1, true);
            // the matched word itself stays plain text but must not match again
            placeholder_at[i] = true;
        }
    }

    words.join(" ")
}

fn escape_literal(word: &str) -> String {
    word.replace('{', "{{").replace('}', "}}")
}
