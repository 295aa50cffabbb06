// tabula-core/src/application/transforms/scaling.rs

use crate::application::transforms::{
    Outcome, SPREAD_EPSILON, mean, quantile, sorted_numeric, stddev_population,
};
use crate::domain::dataset::{DataType, Table, Value};
use crate::domain::error::DomainError;

#[derive(Debug, Clone, Copy)]
pub(crate) enum ScaleMethod {
    Standard,
    MinMax,
    Robust,
    MaxAbs,
}

/// Rescale numeric target columns in place: x -> (x - center) / scale.
/// A degenerate spread (all values equal) falls back to a unit scale, so
/// constant columns scale to zero instead of dividing by zero. Missing
/// cells stay missing; integer columns come out as float.
pub(crate) fn scale(
    table: &Table,
    targets: &[usize],
    method: ScaleMethod,
) -> Result<Outcome, DomainError> {
    let mut out = table.clone();
    for &idx in targets {
        let (center, spread) = {
            let col = &out.columns()[idx];
            let xs = sorted_numeric(col);
            if xs.is_empty() {
                return Err(DomainError::InsufficientData {
                    column: col.name.clone(),
                    reason: "cannot fit a scaler on a 100% missing column".to_string(),
                });
            }
            scaling_parameters(&xs, method)
        };
        let scale = if spread <= SPREAD_EPSILON { 1.0 } else { spread };

        let col = out.column_mut(idx);
        col.dtype = DataType::Float;
        for value in &mut col.values {
            if let Some(x) = value.as_f64() {
                *value = Value::Float((x - center) / scale);
            }
        }
    }
    Ok(Outcome::plain(out))
}

/// (center, spread) for each method, computed over the sorted non-missing
/// values. Quantiles exist because the slice is non-empty, hence the 0.0
/// fallbacks never fire.
fn scaling_parameters(sorted: &[f64], method: ScaleMethod) -> (f64, f64) {
    match method {
        ScaleMethod::Standard => (
            mean(sorted).unwrap_or(0.0),
            stddev_population(sorted).unwrap_or(0.0),
        ),
        ScaleMethod::MinMax => {
            let min = sorted[0];
            let max = sorted[sorted.len() - 1];
            (min, max - min)
        }
        ScaleMethod::Robust => {
            let median = quantile(sorted, 0.5).unwrap_or(0.0);
            let iqr = quantile(sorted, 0.75).unwrap_or(0.0) - quantile(sorted, 0.25).unwrap_or(0.0);
            (median, iqr)
        }
        ScaleMethod::MaxAbs => {
            let max_abs = sorted.iter().fold(0.0f64, |acc, x| acc.max(x.abs()));
            (0.0, max_abs)
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::domain::dataset::Column;

    fn column_of(values: &[Value]) -> Table {
        Table::from_columns(vec![Column::new("x", DataType::Float, values.to_vec())]).unwrap()
    }

    fn floats(table: &Table) -> Vec<f64> {
        table.columns()[0]
            .values
            .iter()
            .filter_map(Value::as_f64)
            .collect()
    }

    #[test]
    fn test_standard_scale_centers_and_normalizes() {
        let table = column_of(&[Value::Float(2.0), Value::Float(4.0), Value::Float(6.0)]);
        let out = scale(&table, &[0], ScaleMethod::Standard).unwrap().table;
        let xs = floats(&out);
        assert!((xs.iter().sum::<f64>()).abs() < 1e-12);
        assert!((xs[2] - (6.0 - 4.0) / stddev_population(&[2.0, 4.0, 6.0]).unwrap()).abs() < 1e-12);
    }

    #[test]
    fn test_minmax_scale_maps_to_unit_interval() {
        let table = column_of(&[Value::Float(10.0), Value::Float(15.0), Value::Float(20.0)]);
        let out = scale(&table, &[0], ScaleMethod::MinMax).unwrap().table;
        assert_eq!(floats(&out), vec![0.0, 0.5, 1.0]);
    }

    #[test]
    fn test_constant_column_scales_to_zero() {
        let table = column_of(&[Value::Float(3.0), Value::Float(3.0)]);
        let out = scale(&table, &[0], ScaleMethod::Standard).unwrap().table;
        assert_eq!(floats(&out), vec![0.0, 0.0]);
    }

    #[test]
    fn test_maxabs_preserves_sign() {
        let table = column_of(&[Value::Float(-4.0), Value::Float(2.0)]);
        let out = scale(&table, &[0], ScaleMethod::MaxAbs).unwrap().table;
        assert_eq!(floats(&out), vec![-1.0, 0.5]);
    }

    #[test]
    fn test_missing_cells_survive_scaling() {
        let table = column_of(&[Value::Float(1.0), Value::Null, Value::Float(3.0)]);
        let out = scale(&table, &[0], ScaleMethod::MinMax).unwrap().table;
        assert_eq!(out.columns()[0].values[1], Value::Null);
    }

    #[test]
    fn test_all_missing_column_is_insufficient_data() {
        let table = column_of(&[Value::Null, Value::Null]);
        let result = scale(&table, &[0], ScaleMethod::Robust);
        assert!(matches!(result, Err(DomainError::InsufficientData { .. })));
    }
}
