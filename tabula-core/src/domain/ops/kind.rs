// tabula-core/src/domain/ops/kind.rs

use serde::{Deserialize, Deserializer, Serialize, Serializer, de};
use std::fmt;
use std::str::FromStr;

use crate::domain::error::DomainError;

/// Closed set of supported transformation kinds. Wire names are snake_case
/// and double as the `operation_type` field of version records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    // Missing-value handling
    DropRows,
    DropColumns,
    FillMean,
    FillMedian,
    FillMode,
    FillConstant,
    ForwardFill,
    BackwardFill,
    Interpolate,
    // Outlier handling
    IqrRemove,
    ZscoreRemove,
    IsolationForestRemove,
    // Deduplication
    DropDuplicates,
    // Type conversion
    CastColumn,
    // Text normalization
    Lowercase,
    StripWhitespace,
    StripSpecialChars,
    // Scaling
    StandardScale,
    MinmaxScale,
    RobustScale,
    MaxabsScale,
    // Encoding
    LabelEncode,
    OnehotEncode,
    FrequencyEncode,
    // Feature creation
    Polynomial,
    Interaction,
    LogTransform,
    SqrtTransform,
    PowerTransform,
    Bin,
    DateExtract,
    Aggregate,
    RollingWindow,
}

pub const ALL_KINDS: &[OperationKind] = &[
    OperationKind::DropRows,
    OperationKind::DropColumns,
    OperationKind::FillMean,
    OperationKind::FillMedian,
    OperationKind::FillMode,
    OperationKind::FillConstant,
    OperationKind::ForwardFill,
    OperationKind::BackwardFill,
    OperationKind::Interpolate,
    OperationKind::IqrRemove,
    OperationKind::ZscoreRemove,
    OperationKind::IsolationForestRemove,
    OperationKind::DropDuplicates,
    OperationKind::CastColumn,
    OperationKind::Lowercase,
    OperationKind::StripWhitespace,
    OperationKind::StripSpecialChars,
    OperationKind::StandardScale,
    OperationKind::MinmaxScale,
    OperationKind::RobustScale,
    OperationKind::MaxabsScale,
    OperationKind::LabelEncode,
    OperationKind::OnehotEncode,
    OperationKind::FrequencyEncode,
    OperationKind::Polynomial,
    OperationKind::Interaction,
    OperationKind::LogTransform,
    OperationKind::SqrtTransform,
    OperationKind::PowerTransform,
    OperationKind::Bin,
    OperationKind::DateExtract,
    OperationKind::Aggregate,
    OperationKind::RollingWindow,
];

impl OperationKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::DropRows => "drop_rows",
            Self::DropColumns => "drop_columns",
            Self::FillMean => "fill_mean",
            Self::FillMedian => "fill_median",
            Self::FillMode => "fill_mode",
            Self::FillConstant => "fill_constant",
            Self::ForwardFill => "forward_fill",
            Self::BackwardFill => "backward_fill",
            Self::Interpolate => "interpolate",
            Self::IqrRemove => "iqr_remove",
            Self::ZscoreRemove => "zscore_remove",
            Self::IsolationForestRemove => "isolation_forest_remove",
            Self::DropDuplicates => "drop_duplicates",
            Self::CastColumn => "cast_column",
            Self::Lowercase => "lowercase",
            Self::StripWhitespace => "strip_whitespace",
            Self::StripSpecialChars => "strip_special_chars",
            Self::StandardScale => "standard_scale",
            Self::MinmaxScale => "minmax_scale",
            Self::RobustScale => "robust_scale",
            Self::MaxabsScale => "maxabs_scale",
            Self::LabelEncode => "label_encode",
            Self::OnehotEncode => "onehot_encode",
            Self::FrequencyEncode => "frequency_encode",
            Self::Polynomial => "polynomial",
            Self::Interaction => "interaction",
            Self::LogTransform => "log_transform",
            Self::SqrtTransform => "sqrt_transform",
            Self::PowerTransform => "power_transform",
            Self::Bin => "bin",
            Self::DateExtract => "date_extract",
            Self::Aggregate => "aggregate",
            Self::RollingWindow => "rolling_window",
        }
    }
}

impl FromStr for OperationKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ALL_KINDS
            .iter()
            .find(|k| k.as_str() == s)
            .copied()
            .ok_or_else(|| DomainError::UnknownOperation(s.to_string()))
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Serialize for OperationKind {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for OperationKind {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(|_| {
            de::Error::custom(format!(
                "Unknown operation kind '{}'. Run 'tabula ops' for the supported list.",
                s
            ))
        })
    }
}
