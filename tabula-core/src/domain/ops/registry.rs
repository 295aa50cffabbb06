// tabula-core/src/domain/ops/registry.rs
//
// Static metadata for every operation kind: which columns it may target and
// which parameters it takes. Validation happens here, BEFORE execution, so a
// malformed spec is rejected without touching the table.

use crate::domain::error::DomainError;
use crate::domain::ops::kind::{ALL_KINDS, OperationKind};
use crate::domain::ops::spec::OperationSpec;

/// Column families an operation is willing to touch.
///
/// `Categorical` behaves like `Any` for explicit targets but restricts an
/// `all` selection to text columns (encoding every numeric column of a wide
/// table by accident is never what the user meant).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetPolicy {
    Numeric,
    Text,
    Temporal,
    Categorical,
    Any,
}

impl TargetPolicy {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Numeric => "numeric",
            Self::Text => "text",
            Self::Temporal => "timestamp",
            Self::Categorical => "categorical",
            Self::Any => "any",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParamKind {
    Float { min: Option<f64>, max: Option<f64> },
    Integer { min: Option<i64>, max: Option<i64> },
    Text,
    TextList,
    OneOf(&'static [&'static str]),
    Any,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParameterSpec {
    pub name: &'static str,
    pub required: bool,
    pub kind: ParamKind,
}

/// Full description of one operation kind.
#[derive(Debug, Clone, Copy)]
pub struct OperationSchema {
    pub kind: OperationKind,
    pub target: TargetPolicy,
    pub params: &'static [ParameterSpec],
}

pub struct OperationRegistry;

impl OperationRegistry {
    pub fn kinds() -> &'static [OperationKind] {
        ALL_KINDS
    }

    pub fn describe(kind: OperationKind) -> OperationSchema {
        OperationSchema {
            kind,
            target: target_policy(kind),
            params: params_of(kind),
        }
    }

    /// Lookup by wire name, for callers holding untyped input.
    pub fn describe_name(name: &str) -> Result<OperationSchema, DomainError> {
        Ok(Self::describe(name.parse()?))
    }

    /// Check a spec's parameters against the declared schema: required
    /// parameters present, no unknown names, types and ranges respected.
    pub fn validate(spec: &OperationSpec) -> Result<(), DomainError> {
        let schema = Self::describe(spec.kind);

        for param in schema.params {
            if param.required && !spec.parameters.contains_key(param.name) {
                return Err(invalid(
                    spec.kind,
                    format!("missing required parameter '{}'", param.name),
                ));
            }
        }

        for (name, value) in &spec.parameters {
            let Some(param) = schema.params.iter().find(|p| p.name == name.as_str()) else {
                return Err(invalid(spec.kind, format!("unknown parameter '{}'", name)));
            };
            check_value(spec.kind, param, value)?;
        }

        Ok(())
    }
}

fn invalid(kind: OperationKind, reason: String) -> DomainError {
    DomainError::InvalidParameters {
        operation: kind.to_string(),
        reason,
    }
}

fn check_value(
    kind: OperationKind,
    param: &ParameterSpec,
    value: &serde_json::Value,
) -> Result<(), DomainError> {
    match param.kind {
        ParamKind::Float { min, max } => {
            let Some(f) = value.as_f64() else {
                return Err(invalid(kind, format!("'{}' must be a number", param.name)));
            };
            if min.is_some_and(|m| f < m) || max.is_some_and(|m| f > m) {
                return Err(invalid(
                    kind,
                    format!(
                        "'{}' = {} is out of range [{}, {}]",
                        param.name,
                        f,
                        min.map_or("-inf".into(), |m| m.to_string()),
                        max.map_or("+inf".into(), |m| m.to_string())
                    ),
                ));
            }
        }
        ParamKind::Integer { min, max } => {
            let Some(i) = value.as_i64() else {
                return Err(invalid(kind, format!("'{}' must be an integer", param.name)));
            };
            if min.is_some_and(|m| i < m) || max.is_some_and(|m| i > m) {
                return Err(invalid(
                    kind,
                    format!("'{}' = {} is out of the declared range", param.name, i),
                ));
            }
        }
        ParamKind::Text => {
            if value.as_str().is_none() {
                return Err(invalid(kind, format!("'{}' must be a string", param.name)));
            }
        }
        ParamKind::TextList => {
            let ok = value
                .as_array()
                .is_some_and(|items| items.iter().all(|v| v.is_string()));
            if !ok {
                return Err(invalid(
                    kind,
                    format!("'{}' must be a list of strings", param.name),
                ));
            }
        }
        ParamKind::OneOf(allowed) => {
            let ok = value.as_str().is_some_and(|s| allowed.contains(&s));
            if !ok {
                return Err(invalid(
                    kind,
                    format!("'{}' must be one of {:?}", param.name, allowed),
                ));
            }
        }
        ParamKind::Any => {}
    }
    Ok(())
}

fn target_policy(kind: OperationKind) -> TargetPolicy {
    use OperationKind::*;
    match kind {
        FillMean | FillMedian | Interpolate | IqrRemove | ZscoreRemove | IsolationForestRemove
        | StandardScale | MinmaxScale | RobustScale | MaxabsScale | Polynomial | Interaction
        | LogTransform | SqrtTransform | PowerTransform | Bin | Aggregate | RollingWindow => {
            TargetPolicy::Numeric
        }
        Lowercase | StripWhitespace | StripSpecialChars => TargetPolicy::Text,
        DateExtract => TargetPolicy::Temporal,
        LabelEncode | OnehotEncode | FrequencyEncode => TargetPolicy::Categorical,
        DropRows | DropColumns | FillMode | FillConstant | ForwardFill | BackwardFill
        | DropDuplicates | CastColumn => TargetPolicy::Any,
    }
}

fn params_of(kind: OperationKind) -> &'static [ParameterSpec] {
    use OperationKind::*;
    match kind {
        DropColumns => &[ParameterSpec {
            name: "threshold",
            required: false,
            kind: ParamKind::Float {
                min: Some(0.0),
                max: Some(1.0),
            },
        }],
        FillConstant => &[ParameterSpec {
            name: "fill_value",
            required: true,
            kind: ParamKind::Any,
        }],
        IqrRemove => &[ParameterSpec {
            name: "multiplier",
            required: false,
            kind: ParamKind::Float {
                min: Some(0.0),
                max: None,
            },
        }],
        ZscoreRemove => &[ParameterSpec {
            name: "threshold",
            required: false,
            kind: ParamKind::Float {
                min: Some(0.0),
                max: None,
            },
        }],
        IsolationForestRemove => &[ParameterSpec {
            name: "contamination",
            required: false,
            kind: ParamKind::Float {
                min: Some(0.0),
                max: Some(0.5),
            },
        }],
        DropDuplicates => &[ParameterSpec {
            name: "subset_columns",
            required: false,
            kind: ParamKind::TextList,
        }],
        CastColumn => &[ParameterSpec {
            name: "target_type",
            required: true,
            kind: ParamKind::OneOf(&["integer", "float", "boolean", "text", "timestamp"]),
        }],
        Polynomial => &[ParameterSpec {
            name: "degree",
            required: false,
            kind: ParamKind::Integer {
                min: Some(2),
                max: Some(6),
            },
        }],
        LogTransform => &[ParameterSpec {
            name: "base",
            required: false,
            kind: ParamKind::OneOf(&["natural", "10", "2"]),
        }],
        PowerTransform => &[ParameterSpec {
            name: "exponent",
            required: false,
            kind: ParamKind::Float {
                min: None,
                max: None,
            },
        }],
        Bin => &[
            ParameterSpec {
                name: "bins",
                required: false,
                kind: ParamKind::Integer {
                    min: Some(2),
                    max: Some(1000),
                },
            },
            ParameterSpec {
                name: "strategy",
                required: false,
                kind: ParamKind::OneOf(&["uniform", "quantile"]),
            },
        ],
        Aggregate => &[
            ParameterSpec {
                name: "group_by",
                required: true,
                kind: ParamKind::Text,
            },
            ParameterSpec {
                name: "aggregations",
                required: false,
                kind: ParamKind::TextList,
            },
        ],
        RollingWindow => &[
            ParameterSpec {
                name: "window",
                required: false,
                kind: ParamKind::Integer {
                    min: Some(1),
                    max: None,
                },
            },
            ParameterSpec {
                name: "aggregations",
                required: false,
                kind: ParamKind::TextList,
            },
        ],
        DropRows | FillMean | FillMedian | FillMode | ForwardFill | BackwardFill | Interpolate
        | Lowercase | StripWhitespace | StripSpecialChars | StandardScale | MinmaxScale
        | RobustScale | MaxabsScale | LabelEncode | OnehotEncode | FrequencyEncode
        | Interaction | SqrtTransform | DateExtract => &[],
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::domain::ops::spec::OperationSpec;
    use serde_json::json;

    #[test]
    fn test_every_kind_has_a_schema() {
        for kind in OperationRegistry::kinds() {
            // Must not panic, and the schema must point back at the kind.
            let schema = OperationRegistry::describe(*kind);
            assert_eq!(schema.kind, *kind);
        }
    }

    #[test]
    fn test_describe_name_unknown_operation() {
        let result = OperationRegistry::describe_name("transmogrify");
        assert!(matches!(result, Err(DomainError::UnknownOperation(_))));
    }

    #[test]
    fn test_missing_required_parameter() {
        let spec = OperationSpec::on(OperationKind::CastColumn, &["age"]);
        let result = OperationRegistry::validate(&spec);
        assert!(matches!(result, Err(DomainError::InvalidParameters { .. })));
    }

    #[test]
    fn test_unknown_parameter_rejected() {
        let spec = OperationSpec::new(OperationKind::DropDuplicates).param("keep", "last");
        let result = OperationRegistry::validate(&spec);
        assert!(matches!(result, Err(DomainError::InvalidParameters { .. })));
    }

    #[test]
    fn test_out_of_range_parameter() {
        let spec =
            OperationSpec::on(OperationKind::IsolationForestRemove, &["x"]).param("contamination", 0.9);
        let result = OperationRegistry::validate(&spec);
        assert!(matches!(result, Err(DomainError::InvalidParameters { .. })));
    }

    #[test]
    fn test_wrong_parameter_type() {
        let spec = OperationSpec::on(OperationKind::IqrRemove, &["x"]).param("multiplier", "wide");
        let result = OperationRegistry::validate(&spec);
        assert!(matches!(result, Err(DomainError::InvalidParameters { .. })));
    }

    #[test]
    fn test_valid_spec_passes() {
        let spec = OperationSpec::on(OperationKind::Bin, &["income"])
            .param("bins", 4)
            .param("strategy", "quantile");
        assert!(OperationRegistry::validate(&spec).is_ok());
    }

    #[test]
    fn test_enum_parameter_checked() {
        let spec = OperationSpec::on(OperationKind::CastColumn, &["age"])
            .param("target_type", json!("decimal"));
        let result = OperationRegistry::validate(&spec);
        assert!(matches!(result, Err(DomainError::InvalidParameters { .. })));
    }
}
