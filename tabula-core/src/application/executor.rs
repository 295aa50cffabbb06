// tabula-core/src/application/executor.rs
//
// Applies one validated operation to a table. Validation (registry schema +
// target resolution) runs before anything is built, so a rejected spec
// leaves the input table untouched by construction: the executor only ever
// works on a copy.

use tracing::{debug, instrument};

use crate::application::transforms::cleaning::{self, TextCleanup};
use crate::application::transforms::encoding;
use crate::application::transforms::features::{self, AggFn, BinStrategy, LogBase};
use crate::application::transforms::missing::{self, FillDirection, NumericFill};
use crate::application::transforms::outliers;
use crate::application::transforms::scaling::{self, ScaleMethod};
use crate::application::transforms::Outcome;
use crate::domain::dataset::{DataType, Table};
use crate::domain::error::DomainError;
use crate::domain::lineage::StepResult;
use crate::domain::ops::{ColumnSelection, OperationKind, OperationRegistry, TargetPolicy};
use crate::domain::ops::OperationSpec;
use crate::domain::project::TransformSettings;

#[derive(Debug, Clone, Default)]
pub struct TransformExecutor {
    settings: TransformSettings,
}

impl TransformExecutor {
    pub fn new(settings: TransformSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &TransformSettings {
        &self.settings
    }

    /// Apply one operation, producing the new table and its lineage record.
    /// The input table is never modified, not even on failure.
    #[instrument(skip(self, table, spec), fields(op = %spec.kind))]
    pub fn apply(
        &self,
        table: &Table,
        spec: &OperationSpec,
    ) -> Result<(Table, StepResult), DomainError> {
        OperationRegistry::validate(spec)?;
        let policy = OperationRegistry::describe(spec.kind).target;
        let targets = resolve_targets(table, &spec.targets, policy)?;
        let params = Params::new(spec);

        let outcome = self.dispatch(table, spec.kind, &targets, &params)?;
        let result = StepResult::diff(table, &outcome.table, spec.clone(), outcome.renames);
        debug!(
            rows_removed = result.rows_removed,
            columns_added = result.columns_added.len(),
            "operation applied"
        );
        Ok((outcome.table, result))
    }

    fn dispatch(
        &self,
        table: &Table,
        kind: OperationKind,
        targets: &[usize],
        params: &Params<'_>,
    ) -> Result<Outcome, DomainError> {
        use OperationKind::*;
        match kind {
            DropRows => Ok(missing::drop_rows(table, targets)),
            DropColumns => Ok(missing::drop_columns(
                table,
                targets,
                params.f64_or("threshold", self.settings.missing_threshold)?,
            )),
            FillMean => missing::fill_statistic(table, targets, NumericFill::Mean),
            FillMedian => missing::fill_statistic(table, targets, NumericFill::Median),
            FillMode => missing::fill_mode(table, targets),
            FillConstant => missing::fill_constant(table, targets, params.required("fill_value")?),
            ForwardFill => Ok(missing::directional_fill(
                table,
                targets,
                FillDirection::Forward,
            )),
            BackwardFill => Ok(missing::directional_fill(
                table,
                targets,
                FillDirection::Backward,
            )),
            Interpolate => Ok(missing::interpolate(table, targets)),

            IqrRemove => Ok(outliers::iqr_remove(
                table,
                targets,
                params.f64_or("multiplier", self.settings.iqr_multiplier)?,
            )),
            ZscoreRemove => Ok(outliers::zscore_remove(
                table,
                targets,
                params.f64_or("threshold", self.settings.zscore_threshold)?,
            )),
            IsolationForestRemove => Ok(outliers::isolation_forest_remove(
                table,
                targets,
                params.f64_or("contamination", self.settings.contamination)?,
            )),

            DropDuplicates => {
                let subset = match params.text_list_opt("subset_columns")? {
                    Some(names) => names
                        .iter()
                        .map(|n| {
                            table
                                .column_index(n)
                                .ok_or_else(|| DomainError::ColumnNotFound(n.clone()))
                        })
                        .collect::<Result<Vec<_>, _>>()?,
                    None => targets.to_vec(),
                };
                Ok(cleaning::drop_duplicates(table, &subset))
            }

            CastColumn => {
                let target = match params.required_str("target_type")? {
                    "integer" => DataType::Integer,
                    "float" => DataType::Float,
                    "boolean" => DataType::Boolean,
                    "timestamp" => DataType::Timestamp,
                    _ => DataType::Text,
                };
                Ok(cleaning::cast_column(table, targets, target))
            }

            Lowercase => cleaning::text_clean(table, targets, TextCleanup::Lowercase),
            StripWhitespace => cleaning::text_clean(table, targets, TextCleanup::StripWhitespace),
            StripSpecialChars => {
                cleaning::text_clean(table, targets, TextCleanup::StripSpecialChars)
            }

            StandardScale => scaling::scale(table, targets, ScaleMethod::Standard),
            MinmaxScale => scaling::scale(table, targets, ScaleMethod::MinMax),
            RobustScale => scaling::scale(table, targets, ScaleMethod::Robust),
            MaxabsScale => scaling::scale(table, targets, ScaleMethod::MaxAbs),

            LabelEncode => Ok(encoding::label_encode(table, targets)),
            OnehotEncode => {
                encoding::onehot_encode(table, targets, self.settings.cardinality_ceiling)
            }
            FrequencyEncode => encoding::frequency_encode(table, targets),

            Polynomial => features::polynomial(
                table,
                targets,
                params.u32_or("degree", self.settings.polynomial_degree)?,
            ),
            Interaction => {
                if targets.len() != 2 {
                    return Err(DomainError::InvalidParameters {
                        operation: kind.to_string(),
                        reason: format!(
                            "requires exactly 2 target columns, got {}",
                            targets.len()
                        ),
                    });
                }
                features::interaction(table, targets[0], targets[1])
            }
            LogTransform => {
                let base = match params.str_or("base", "natural")? {
                    "10" => LogBase::Ten,
                    "2" => LogBase::Two,
                    _ => LogBase::Natural,
                };
                features::log_transform(table, targets, base)
            }
            SqrtTransform => features::sqrt_transform(table, targets),
            PowerTransform => {
                features::power_transform(table, targets, params.f64_or("exponent", 2.0)?)
            }
            Bin => {
                let strategy = match params.str_or("strategy", "uniform")? {
                    "quantile" => BinStrategy::Quantile,
                    _ => BinStrategy::Uniform,
                };
                features::bin(
                    table,
                    targets,
                    params.usize_or("bins", self.settings.bins)?,
                    strategy,
                )
            }
            DateExtract => features::date_extract(table, targets),
            Aggregate => {
                let group_name = params.required_str("group_by")?;
                let group_idx = table
                    .column_index(group_name)
                    .ok_or_else(|| DomainError::ColumnNotFound(group_name.to_string()))?;
                let aggs = parse_aggregations(params, kind, &["mean"])?;
                features::aggregate(table, targets, group_idx, &aggs)
            }
            RollingWindow => {
                let aggs = parse_aggregations(params, kind, &["mean"])?;
                features::rolling_window(
                    table,
                    targets,
                    params.usize_or("window", self.settings.window)?,
                    &aggs,
                )
            }
        }
    }
}

fn parse_aggregations(
    params: &Params<'_>,
    kind: OperationKind,
    default: &[&str],
) -> Result<Vec<AggFn>, DomainError> {
    let names = params
        .text_list_opt("aggregations")?
        .unwrap_or_else(|| default.iter().map(|s| s.to_string()).collect());
    names.iter().map(|n| AggFn::parse(n, kind)).collect()
}

/// Map a column selection to concrete indexes, enforcing the operation's
/// target policy. Explicit names must exist and carry an acceptable type;
/// an `all` selection silently narrows to the eligible columns.
fn resolve_targets(
    table: &Table,
    selection: &ColumnSelection,
    policy: TargetPolicy,
) -> Result<Vec<usize>, DomainError> {
    match selection {
        ColumnSelection::Columns(names) => names
            .iter()
            .map(|name| {
                let idx = table
                    .column_index(name)
                    .ok_or_else(|| DomainError::ColumnNotFound(name.clone()))?;
                let dtype = table.columns()[idx].dtype;
                if !accepts_explicit(policy, dtype) {
                    return Err(DomainError::TypeMismatch {
                        column: name.clone(),
                        expected: policy.as_str().to_string(),
                        actual: dtype.to_string(),
                    });
                }
                Ok(idx)
            })
            .collect(),
        ColumnSelection::All => Ok((0..table.column_count())
            .filter(|&i| accepts_implicit(policy, table.columns()[i].dtype))
            .collect()),
    }
}

fn accepts_explicit(policy: TargetPolicy, dtype: DataType) -> bool {
    match policy {
        TargetPolicy::Numeric => dtype.is_numeric(),
        TargetPolicy::Text => dtype == DataType::Text,
        TargetPolicy::Temporal => dtype == DataType::Timestamp,
        TargetPolicy::Categorical | TargetPolicy::Any => true,
    }
}

fn accepts_implicit(policy: TargetPolicy, dtype: DataType) -> bool {
    match policy {
        // An `all` selection for encoders means "every text column", not
        // "encode my numeric measurements too".
        TargetPolicy::Categorical => dtype == DataType::Text,
        TargetPolicy::Any => true,
        _ => accepts_explicit(policy, dtype),
    }
}

/// Typed access into the free-form parameter map. The registry already
/// vetted types and ranges; these getters exist so execution never unwraps.
pub(crate) struct Params<'a> {
    kind: OperationKind,
    map: &'a std::collections::BTreeMap<String, serde_json::Value>,
}

impl<'a> Params<'a> {
    fn new(spec: &'a OperationSpec) -> Self {
        Self {
            kind: spec.kind,
            map: &spec.parameters,
        }
    }

    fn invalid(&self, reason: String) -> DomainError {
        DomainError::InvalidParameters {
            operation: self.kind.to_string(),
            reason,
        }
    }

    fn f64_or(&self, name: &str, default: f64) -> Result<f64, DomainError> {
        match self.map.get(name) {
            None => Ok(default),
            Some(v) => v
                .as_f64()
                .ok_or_else(|| self.invalid(format!("'{}' must be a number", name))),
        }
    }

    fn u32_or(&self, name: &str, default: u32) -> Result<u32, DomainError> {
        match self.map.get(name) {
            None => Ok(default),
            Some(v) => v
                .as_u64()
                .map(|n| n as u32)
                .ok_or_else(|| self.invalid(format!("'{}' must be a positive integer", name))),
        }
    }

    fn usize_or(&self, name: &str, default: usize) -> Result<usize, DomainError> {
        match self.map.get(name) {
            None => Ok(default),
            Some(v) => v
                .as_u64()
                .map(|n| n as usize)
                .ok_or_else(|| self.invalid(format!("'{}' must be a positive integer", name))),
        }
    }

    fn str_or(&self, name: &str, default: &'a str) -> Result<&'a str, DomainError> {
        match self.map.get(name) {
            None => Ok(default),
            Some(v) => v
                .as_str()
                .ok_or_else(|| self.invalid(format!("'{}' must be a string", name))),
        }
    }

    fn required_str(&self, name: &str) -> Result<&'a str, DomainError> {
        self.map
            .get(name)
            .and_then(|v| v.as_str())
            .ok_or_else(|| self.invalid(format!("missing required parameter '{}'", name)))
    }

    fn required(&self, name: &str) -> Result<&'a serde_json::Value, DomainError> {
        self.map
            .get(name)
            .ok_or_else(|| self.invalid(format!("missing required parameter '{}'", name)))
    }

    fn text_list_opt(&self, name: &str) -> Result<Option<Vec<String>>, DomainError> {
        let Some(value) = self.map.get(name) else {
            return Ok(None);
        };
        let items = value
            .as_array()
            .ok_or_else(|| self.invalid(format!("'{}' must be a list of strings", name)))?;
        items
            .iter()
            .map(|v| {
                v.as_str()
                    .map(str::to_string)
                    .ok_or_else(|| self.invalid(format!("'{}' must be a list of strings", name)))
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Some)
    }
}
