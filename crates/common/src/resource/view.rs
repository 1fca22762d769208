use serde_json::{Map, Value};

use crate::kind::ResourceKind;

/// Named projections of a descriptor, each one a superset of the previous.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum View {
    Basic,
    Public,
    BeforeStart,
    AfterStart,
    AfterEnd,
    Private,
}

/// Lowest view in which `field` of a `kind` descriptor is visible.
///
/// Fields this table doesn't know are only shown in the private view.
pub fn field_view(kind: ResourceKind, field: &str) -> View {
    match (kind, field) {
        (_, "format" | "title" | "about") => View::Basic,
        (_, "notes") => View::Private,
        (ResourceKind::Contest, "start_time" | "duration" | "grading_style") => View::BeforeStart,
        (ResourceKind::Contest, "problem_scores" | "problem_order") => View::AfterStart,
        (ResourceKind::Problem, "test_weights") => View::AfterEnd,
        // problem authors, limits, origin and checker included
        _ => View::Private,
    }
}

/// Drops every top-level field not visible in `view`.
pub fn project(kind: ResourceKind, value: Value, view: View) -> Value {
    match value {
        Value::Object(fields) => Value::Object(
            fields
                .into_iter()
                .filter(|(name, _)| field_view(kind, name) <= view)
                .collect::<Map<_, _>>(),
        ),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_project_contest_before_start() {
        let value = json!({
            "format": "core-contest-1",
            "title": "Finals",
            "about": "",
            "notes": "secret",
            "start_time": "2030-01-01T10:00:00Z",
            "duration": 300,
            "grading_style": "acm",
            "problem_scores": [1],
            "problem_order": ["a"]
        });
        let projected = project(ResourceKind::Contest, value, View::BeforeStart);
        let fields = projected.as_object().unwrap();
        assert!(fields.contains_key("start_time"));
        assert!(fields.contains_key("title"));
        assert!(!fields.contains_key("problem_order"));
        assert!(!fields.contains_key("notes"));
    }

    #[test]
    fn test_project_problem_after_end() {
        let value = json!({
            "title": "A",
            "test_weights": [1, 2],
            "checker": "diff",
            "authors": ["x"]
        });
        let projected = project(ResourceKind::Problem, value, View::AfterEnd);
        assert_eq!(projected, json!({"title": "A", "test_weights": [1, 2]}));
    }

    #[test]
    fn test_private_shows_everything() {
        let value = json!({"title": "S", "notes": "n"});
        assert_eq!(
            project(ResourceKind::Series, value.clone(), View::Private),
            value
        );
    }
}
