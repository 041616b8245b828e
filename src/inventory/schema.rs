//! Stream schema descriptions
//!
//! The JSON document stored with every inventory entry:
//!
//! ```json
//! {"class": "Position", "members": [{"name": "rx", "unit": "m"}, {"name": "ry"}]}
//! ```
//!
//! Member order is the positional index of each member in a record payload,
//! so member names must be unique. Keys other than `name` are kept as-is.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::{DdffError, Result};

/// One declared payload member
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Member {
    pub name: String,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Member {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            extra: serde_json::Map::new(),
        }
    }
}

/// Decoded schema description of one stream
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    pub class: String,
    #[serde(default)]
    pub members: Vec<Member>,
}

impl Schema {
    pub fn new<S: AsRef<str>>(class: impl Into<String>, members: &[S]) -> Self {
        Self {
            class: class.into(),
            members: members.iter().map(|m| Member::new(m.as_ref())).collect(),
        }
    }

    /// Parse and validate a JSON description
    pub fn from_json(description: &str) -> Result<Self> {
        let schema: Schema = serde_json::from_str(description)
            .map_err(|e| DdffError::Schema(format!("invalid stream description: {}", e)))?;
        schema.validate()?;
        Ok(schema)
    }

    /// Fail with `Schema` if a member name is declared twice
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for member in &self.members {
            if !seen.insert(member.name.as_str()) {
                return Err(DdffError::Schema(format!(
                    "member {} declared twice in class {}",
                    member.name, self.class
                )));
            }
        }
        Ok(())
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| DdffError::Serialization(e.to_string()))
    }

    pub fn member_names(&self) -> impl Iterator<Item = &str> {
        self.members.iter().map(|m| m.name.as_str())
    }
}
