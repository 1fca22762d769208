use std::collections::BTreeMap;
use std::fmt;

use super::Resource;
use crate::kind::ResourceKind;
use crate::report::ValidationReport;

const COMMON_FIELDS: [&str; 3] = ["title", "about", "notes"];
const CONTEST_FIELDS: [&str; 5] = [
    "start_time",
    "duration",
    "grading_style",
    "problem_order",
    "problem_scores",
];
const PROBLEM_FIELDS: [&str; 6] = [
    "origin",
    "authors",
    "test_weights",
    "memory_limit",
    "time_limit",
    "checker",
];

/// Descriptor fields that can be edited through [`Resource::update`].
pub fn editable_fields(kind: ResourceKind) -> Vec<&'static str> {
    let extra: &[&str] = match kind {
        ResourceKind::Series => &[],
        ResourceKind::Contest => &CONTEST_FIELDS,
        ResourceKind::Problem => &PROBLEM_FIELDS,
    };
    COMMON_FIELDS.iter().chain(extra).copied().collect()
}

/// Declared type of an editable field, used to coerce form input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    Text,
    Integer,
    Decimal,
    /// Comma separated, blank items dropped.
    TextList,
    /// Comma separated integers, blank items dropped.
    IntegerList,
}

impl FieldType {
    pub fn of(kind: ResourceKind, field: &str) -> Option<FieldType> {
        let field_type = match (kind, field) {
            (_, "title" | "about" | "notes") => FieldType::Text,
            (ResourceKind::Contest, "start_time" | "grading_style") => FieldType::Text,
            (ResourceKind::Contest, "duration") => FieldType::Integer,
            (ResourceKind::Contest, "problem_order") => FieldType::TextList,
            (ResourceKind::Contest, "problem_scores") => FieldType::IntegerList,
            (ResourceKind::Problem, "origin" | "checker") => FieldType::Text,
            (ResourceKind::Problem, "authors") => FieldType::TextList,
            (ResourceKind::Problem, "test_weights") => FieldType::IntegerList,
            (ResourceKind::Problem, "memory_limit") => FieldType::Integer,
            (ResourceKind::Problem, "time_limit") => FieldType::Decimal,
            _ => return None,
        };
        Some(field_type)
    }

    /// Lenient conversion: numbers that don't parse become zero.
    pub fn coerce(&self, raw: &str) -> FieldValue {
        match self {
            FieldType::Text => FieldValue::Text(raw.to_string()),
            FieldType::Integer => FieldValue::Integer(parse_integer(raw)),
            FieldType::Decimal => FieldValue::Decimal(raw.trim().parse().unwrap_or(0.0)),
            FieldType::TextList => {
                FieldValue::TextList(split_list(raw).map(str::to_string).collect())
            }
            FieldType::IntegerList => {
                FieldValue::IntegerList(split_list(raw).map(parse_integer).collect())
            }
        }
    }
}

fn parse_integer(raw: &str) -> i32 {
    raw.trim().parse().unwrap_or(0)
}

fn split_list(raw: &str) -> impl Iterator<Item = &str> {
    raw.split(',').map(str::trim).filter(|item| !item.is_empty())
}

#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Integer(i32),
    Decimal(f64),
    TextList(Vec<String>),
    IntegerList(Vec<i32>),
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Text(value) => write!(f, "{}", value),
            FieldValue::Integer(value) => write!(f, "{}", value),
            FieldValue::Decimal(value) => write!(f, "{}", value),
            FieldValue::TextList(values) => write!(f, "{}", values.join(", ")),
            FieldValue::IntegerList(values) => {
                let values = values.iter().map(i32::to_string).collect::<Vec<_>>();
                write!(f, "{}", values.join(", "))
            }
        }
    }
}

impl Resource {
    /// Current value of an editable field.
    pub fn field(&self, name: &str) -> Option<FieldValue> {
        let info = self.info();
        let value = match (self, name) {
            (_, "title") => FieldValue::Text(info.title.clone()),
            (_, "about") => FieldValue::Text(info.about.clone()),
            (_, "notes") => FieldValue::Text(info.notes.clone()),
            (Resource::Contest(c), "start_time") => FieldValue::Text(c.start_time.clone()),
            (Resource::Contest(c), "duration") => FieldValue::Integer(c.duration),
            (Resource::Contest(c), "grading_style") => FieldValue::Text(c.grading_style.clone()),
            (Resource::Contest(c), "problem_order") => FieldValue::TextList(c.problem_order.clone()),
            (Resource::Contest(c), "problem_scores") => {
                FieldValue::IntegerList(c.problem_scores.clone())
            }
            (Resource::Problem(p), "origin") => FieldValue::Text(p.origin.clone()),
            (Resource::Problem(p), "checker") => FieldValue::Text(p.checker.clone()),
            (Resource::Problem(p), "authors") => FieldValue::TextList(p.authors.clone()),
            (Resource::Problem(p), "test_weights") => FieldValue::IntegerList(p.test_weights.clone()),
            (Resource::Problem(p), "memory_limit") => FieldValue::Integer(p.memory_limit),
            (Resource::Problem(p), "time_limit") => FieldValue::Decimal(p.time_limit),
            _ => return None,
        };
        Some(value)
    }

    /// Assigns an editable field; values of the wrong shape are ignored.
    pub fn set_field(&mut self, name: &str, value: FieldValue) -> bool {
        match (self, name, value) {
            (resource, "title", FieldValue::Text(v)) => resource.info_mut().title = v,
            (resource, "about", FieldValue::Text(v)) => resource.info_mut().about = v,
            (resource, "notes", FieldValue::Text(v)) => resource.info_mut().notes = v,
            (Resource::Contest(c), "start_time", FieldValue::Text(v)) => c.start_time = v,
            (Resource::Contest(c), "duration", FieldValue::Integer(v)) => c.duration = v,
            (Resource::Contest(c), "grading_style", FieldValue::Text(v)) => c.set_grading_style(&v),
            (Resource::Contest(c), "problem_order", FieldValue::TextList(v)) => c.problem_order = v,
            (Resource::Contest(c), "problem_scores", FieldValue::IntegerList(v)) => {
                c.problem_scores = v
            }
            (Resource::Problem(p), "origin", FieldValue::Text(v)) => p.origin = v,
            (Resource::Problem(p), "checker", FieldValue::Text(v)) => p.checker = v,
            (Resource::Problem(p), "authors", FieldValue::TextList(v)) => p.authors = v,
            (Resource::Problem(p), "test_weights", FieldValue::IntegerList(v)) => {
                p.test_weights = v
            }
            (Resource::Problem(p), "memory_limit", FieldValue::Integer(v)) => p.memory_limit = v,
            (Resource::Problem(p), "time_limit", FieldValue::Decimal(v)) => p.time_limit = v,
            _ => return false,
        }
        true
    }

    /// Field-level optimistic update from form input.
    ///
    /// A field listed in `old_values` is only written when the resource still
    /// holds that value; otherwise `changed_<field>` is reported and the field
    /// is left alone. Fields missing from `old_values` are always written.
    /// The resource is modified in memory only.
    pub fn update(
        &mut self,
        old_values: &BTreeMap<String, String>,
        new_values: &BTreeMap<String, String>,
    ) -> ValidationReport {
        let mut report = ValidationReport::new();
        let kind = self.kind();

        for (field, raw) in new_values {
            let Some(field_type) = FieldType::of(kind, field) else {
                report.add_error(
                    format!("unknown_{}", field),
                    format!("{} is not an editable {} field", field, kind),
                );
                continue;
            };

            if let Some(old) = old_values.get(field) {
                if self.field(field) != Some(field_type.coerce(old)) {
                    report.add_error(
                        format!("changed_{}", field),
                        format!("{} has been changed", field),
                    );
                    continue;
                }
            }

            self.set_field(field, field_type.coerce(raw));
        }

        report
    }
}
