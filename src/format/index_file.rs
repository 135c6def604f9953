//! On-disk project index.
//!
//! The index is a JSON array of `{ "id", "name", "lastModified" }` records.
//! Thumbnails are never written; they are cached in memory only.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::format::error::{DecodeError, EncodeError};
use crate::format::scene_file::parse_field;
use crate::model::{Project, ProjectId};

/// One stored index record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexEntry {
    pub id: ProjectId,
    pub name: String,
    pub last_modified: DateTime<Utc>,
}

impl IndexEntry {
    pub fn from_project(project: &Project) -> Self {
        Self {
            id: project.id,
            name: project.name.clone(),
            last_modified: project.last_modified,
        }
    }

    pub fn into_project(self) -> Project {
        Project {
            id: self.id,
            name: self.name,
            last_modified: self.last_modified,
            thumbnail: None,
        }
    }
}

/// Serialize the index.
pub fn encode_index(projects: &[Project]) -> Result<Vec<u8>, EncodeError> {
    let entries: Vec<IndexEntry> = projects.iter().map(IndexEntry::from_project).collect();
    Ok(serde_json::to_vec_pretty(&entries)?)
}

/// Parse the index, naming the first malformed record on failure.
pub fn decode_index(bytes: &[u8]) -> Result<Vec<Project>, DecodeError> {
    let value: Value = serde_json::from_slice(bytes)?;
    let Value::Array(values) = value else {
        return Err(DecodeError::invalid_field("$", "expected an array"));
    };

    values
        .into_iter()
        .enumerate()
        .map(|(index, value)| {
            parse_field::<IndexEntry>(value, &format!("[{index}]")).map(IndexEntry::into_project)
        })
        .collect()
}
