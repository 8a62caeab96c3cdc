use crate::RegisterMap;
use serde::{Deserialize, Serialize};

/// Drive families with a built-in register map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VfdModel {
    Delixi,
}

impl VfdModel {
    pub fn register_map(self) -> RegisterMap {
        match self {
            VfdModel::Delixi => RegisterMap::delixi(),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            VfdModel::Delixi => "delixi",
        }
    }
}
