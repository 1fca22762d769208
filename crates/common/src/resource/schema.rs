use std::sync::LazyLock;

use serde_json::Value;

use crate::kind::ResourceKind;
use crate::report::ValidationReport;

const SERIES_SCHEMA: &str = include_str!("../../schema/series.json");
const CONTEST_SCHEMA: &str = include_str!("../../schema/contest.json");
const PROBLEM_SCHEMA: &str = include_str!("../../schema/problem.json");

type CompiledSchema = Result<jsonschema::Validator, String>;

fn compile(source: &str) -> CompiledSchema {
    let schema: Value = serde_json::from_str(source).map_err(|e| e.to_string())?;
    jsonschema::validator_for(&schema).map_err(|e| e.to_string())
}

static SERIES_VALIDATOR: LazyLock<CompiledSchema> = LazyLock::new(|| compile(SERIES_SCHEMA));
static CONTEST_VALIDATOR: LazyLock<CompiledSchema> = LazyLock::new(|| compile(CONTEST_SCHEMA));
static PROBLEM_VALIDATOR: LazyLock<CompiledSchema> = LazyLock::new(|| compile(PROBLEM_SCHEMA));

fn validator(kind: ResourceKind) -> &'static CompiledSchema {
    match kind {
        ResourceKind::Series => &SERIES_VALIDATOR,
        ResourceKind::Contest => &CONTEST_VALIDATOR,
        ResourceKind::Problem => &PROBLEM_VALIDATOR,
    }
}

/// Checks a descriptor document against the embedded schema for `kind`.
///
/// Each violation lands under its own `json_error_<n>` key.
pub fn validate_document(kind: ResourceKind, document: &Value) -> ValidationReport {
    let mut report = ValidationReport::new();
    match validator(kind) {
        Ok(validator) => {
            let messages = validator
                .iter_errors(document)
                .map(|error| error.to_string())
                .collect::<Vec<_>>();
            report.add_errors("json_error_", messages);
        }
        Err(e) => {
            tracing::error!(kind = %kind, "unable to load schema: {}", e);
            report.add_error("json_error", "Unable to load schema");
        }
    }
    report
}
