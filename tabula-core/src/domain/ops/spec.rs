// tabula-core/src/domain/ops/spec.rs

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;

use crate::domain::ops::kind::OperationKind;

/// Which columns an operation applies to: every eligible column, or an
/// explicit ordered list. In recipe YAML this is either the string `all`,
/// a single column name, or a list of names.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ColumnSelection {
    #[default]
    All,
    Columns(Vec<String>),
}

impl ColumnSelection {
    pub fn columns(names: &[&str]) -> Self {
        Self::Columns(names.iter().map(|s| s.to_string()).collect())
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SelectionRepr {
    One(String),
    Many(Vec<String>),
}

impl<'de> Deserialize<'de> for ColumnSelection {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        match SelectionRepr::deserialize(deserializer)? {
            SelectionRepr::One(s) if s == "all" => Ok(ColumnSelection::All),
            SelectionRepr::One(s) => Ok(ColumnSelection::Columns(vec![s])),
            SelectionRepr::Many(names) => Ok(ColumnSelection::Columns(names)),
        }
    }
}

impl Serialize for ColumnSelection {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            ColumnSelection::All => serializer.serialize_str("all"),
            ColumnSelection::Columns(names) => serializer.collect_seq(names),
        }
    }
}

/// One named, parameterized transformation. Parameters are free-form JSON
/// values; the registry schema decides what is acceptable before execution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationSpec {
    pub kind: OperationKind,
    #[serde(default)]
    pub targets: ColumnSelection,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub parameters: BTreeMap<String, serde_json::Value>,
}

impl OperationSpec {
    pub fn new(kind: OperationKind) -> Self {
        Self {
            kind,
            targets: ColumnSelection::All,
            parameters: BTreeMap::new(),
        }
    }

    /// Operation over an explicit column list.
    pub fn on(kind: OperationKind, columns: &[&str]) -> Self {
        Self {
            kind,
            targets: ColumnSelection::columns(columns),
            parameters: BTreeMap::new(),
        }
    }

    pub fn param(mut self, name: &str, value: impl Into<serde_json::Value>) -> Self {
        self.parameters.insert(name.to_string(), value.into());
        self
    }
}
