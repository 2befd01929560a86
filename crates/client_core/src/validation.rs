//! Declarative field rules and the schema that evaluates them.
//!
//! A [`Schema`] is an ordered list of fields, each with an ordered list of [`Rule`]s. The first
//! rule a value fails decides the one message reported for that field. Rules that do not apply
//! to the shape of a value (a length rule on a number, say) pass.

use std::{borrow::Cow, collections::BTreeMap};

use regex::Regex;

/// Per-field messages produced by a validation pass. At most one message per field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(BTreeMap<&'static str, String>);

impl FieldErrors {
    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.0.iter().map(|(field, message)| (*field, message.as_str()))
    }

    pub(crate) fn set(&mut self, field: &'static str, message: Option<String>) {
        match message {
            Some(message) => {
                self.0.insert(field, message);
            }
            None => {
                self.0.remove(field);
            }
        }
    }

    pub(crate) fn clear(&mut self, field: &str) {
        self.0.remove(field);
    }
}

/// Facts about one attached file that file rules look at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileFacts<'a> {
    pub size_bytes: u64,
    pub mime_type: &'a str,
}

/// The current value of a field, as the schema sees it.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue<'a> {
    Text(&'a str),
    /// `None` when the input was empty or not a number.
    Number(Option<f64>),
    Choice(Option<&'a str>),
    Files(Vec<FileFacts<'a>>),
}

/// Anything a [`Schema`] can read field values from.
pub trait FieldSource {
    fn field_value(&self, field: &str) -> Option<FieldValue<'_>>;
}

#[derive(Debug, Clone, PartialEq)]
pub enum FileConstraint {
    MaxCount(usize),
    MaxBytes(u64),
    MimeType(&'static [&'static str]),
}

#[derive(Debug, Clone)]
pub enum RuleKind {
    Required,
    MinLength(usize),
    NumericRange { min: Option<f64>, max: Option<f64> },
    /// Value must be a whole multiple of the step.
    Step(f64),
    EnumMembership(&'static [&'static str]),
    Pattern(Regex),
    File(FileConstraint),
}

#[derive(Debug, Clone)]
pub struct Rule {
    kind: RuleKind,
    message: Cow<'static, str>,
}

impl Rule {
    pub fn new(kind: RuleKind, message: impl Into<Cow<'static, str>>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn required(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(RuleKind::Required, message)
    }

    pub fn min_length(len: usize, message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(RuleKind::MinLength(len), message)
    }

    pub fn at_least(min: f64, message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(
            RuleKind::NumericRange {
                min: Some(min),
                max: None,
            },
            message,
        )
    }

    pub fn at_most(max: f64, message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(
            RuleKind::NumericRange {
                min: None,
                max: Some(max),
            },
            message,
        )
    }

    pub fn step(step: f64, message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(RuleKind::Step(step), message)
    }

    pub fn one_of(values: &'static [&'static str], message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(RuleKind::EnumMembership(values), message)
    }

    pub fn pattern(regex: Regex, message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(RuleKind::Pattern(regex), message)
    }

    pub fn file(constraint: FileConstraint, message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(RuleKind::File(constraint), message)
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn accepts(&self, value: &FieldValue<'_>) -> bool {
        match (&self.kind, value) {
            (RuleKind::Required, FieldValue::Text(text)) => !text.is_empty(),
            (RuleKind::Required, FieldValue::Number(number)) => number.is_some(),
            (RuleKind::Required, FieldValue::Choice(choice)) => choice.is_some(),
            (RuleKind::Required, FieldValue::Files(files)) => !files.is_empty(),

            // Lengths are counted in UTF-16 code units, the way browser inputs measure them.
            (RuleKind::MinLength(min), FieldValue::Text(text)) => {
                text.encode_utf16().count() >= *min
            }

            (RuleKind::NumericRange { min, max }, FieldValue::Number(number)) => match *number {
                Some(n) => {
                    n.is_finite()
                        && min.map_or(true, |lower| n >= lower)
                        && max.map_or(true, |upper| n <= upper)
                }
                None => false,
            },

            (RuleKind::Step(step), FieldValue::Number(Some(n))) => {
                let steps = *n / *step;
                (steps - steps.round()).abs() < 1e-9
            }

            (RuleKind::EnumMembership(values), FieldValue::Choice(Some(choice)))
            | (RuleKind::EnumMembership(values), FieldValue::Text(choice)) => {
                values.iter().any(|allowed| allowed == choice)
            }

            (RuleKind::Pattern(regex), FieldValue::Text(text)) => regex.is_match(text),

            (RuleKind::File(constraint), FieldValue::Files(files)) => match constraint {
                FileConstraint::MaxCount(max) => files.len() <= *max,
                FileConstraint::MaxBytes(max) => files.iter().all(|f| f.size_bytes <= *max),
                FileConstraint::MimeType(accepted) => {
                    files
                        .iter()
                        .all(|f| accepted.iter().any(|mime| *mime == f.mime_type))
                }
            },

            _ => true,
        }
    }
}

#[derive(Debug, Clone)]
struct FieldRules {
    name: &'static str,
    rules: Vec<Rule>,
}

#[derive(Debug, Clone, Default)]
pub struct Schema {
    fields: Vec<FieldRules>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(mut self, name: &'static str, rules: impl IntoIterator<Item = Rule>) -> Self {
        self.fields.push(FieldRules {
            name,
            rules: rules.into_iter().collect(),
        });
        self
    }

    pub fn field_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fields.iter().map(|entry| entry.name)
    }

    /// Message of the first rule `value` fails, if any. Unknown fields always pass.
    pub fn check_field(&self, field: &str, value: &FieldValue<'_>) -> Option<String> {
        self.fields
            .iter()
            .find(|entry| entry.name == field)?
            .rules
            .iter()
            .find(|rule| !rule.accepts(value))
            .map(|rule| rule.message().to_string())
    }

    pub fn validate(&self, source: &impl FieldSource) -> FieldErrors {
        let mut errors = FieldErrors::default();
        for entry in &self.fields {
            let Some(value) = source.field_value(entry.name) else {
                continue;
            };
            let message = entry
                .rules
                .iter()
                .find(|rule| !rule.accepts(&value))
                .map(|rule| rule.message().to_string());
            errors.set(entry.name, message);
        }
        errors
    }

    /// Re-runs one field and updates `errors` in place.
    pub fn revalidate_field(&self, source: &impl FieldSource, field: &str, errors: &mut FieldErrors) {
        let Some(entry) = self.fields.iter().find(|entry| entry.name == field) else {
            return;
        };
        let message = source
            .field_value(entry.name)
            .and_then(|value| self.check_field(entry.name, &value));
        errors.set(entry.name, message);
    }
}

#[cfg(test)]
#[path = "tests/validation_tests.rs"]
mod tests;
