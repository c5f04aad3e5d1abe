//! School model.

use serde::{Deserialize, Serialize};

/// School level classification.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum SchoolType {
    Elementary,
    Middle,
    High,
}

impl SchoolType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SchoolType::Elementary => "Elementary",
            SchoolType::Middle => "Middle",
            SchoolType::High => "High",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Elementary" => Some(SchoolType::Elementary),
            "Middle" => Some(SchoolType::Middle),
            "High" => Some(SchoolType::High),
            _ => None,
        }
    }
}

/// A school. Every other record except admins hangs off one.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct School {
    pub id: String,
    pub name: String,
    pub address: String,
    #[serde(rename = "type")]
    pub school_type: SchoolType,
    /// Ordered grade labels, e.g. `["K", "1", "2"]`
    pub grades_offered: Vec<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// Request body for creating a new school.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSchoolRequest {
    pub name: String,
    pub address: String,
    #[serde(rename = "type")]
    pub school_type: SchoolType,
    #[serde(default)]
    pub grades_offered: Vec<String>,
}

/// Request body for updating an existing school.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSchoolRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default, rename = "type")]
    pub school_type: Option<SchoolType>,
    #[serde(default)]
    pub grades_offered: Option<Vec<String>>,
}
