//! Location definitions.

use serde::{Deserialize, Serialize};

use super::LocationId;

/// A place where events happen. Locations may nest inside a parent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    pub id: LocationId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<LocationId>,
}

impl Location {
    pub fn new(id: impl Into<LocationId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            parent_id: None,
        }
    }

    /// Place this location inside another one.
    pub fn within(mut self, parent: impl Into<LocationId>) -> Self {
        self.parent_id = Some(parent.into());
        self
    }
}
