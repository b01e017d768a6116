//! Learning resources per career: courses, certifications, practice sites, project ideas.

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::lookup::{LookupTable, MatchKind, TableFile};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LearningResources {
    pub courses: Vec<String>,
    pub certifications: Vec<String>,
    pub practice: Vec<String>,
    pub projects: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct ResourceFile {
    #[serde(flatten)]
    table: TableFile<LearningResources>,
    default: LearningResources,
}

#[derive(Debug, Clone)]
pub struct ResourceTable {
    table: LookupTable<LearningResources>,
    default: LearningResources,
}

impl ResourceTable {
    pub fn new(table: LookupTable<LearningResources>, default: LearningResources) -> Self {
        Self { table, default }
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        let file: ResourceFile = serde_json::from_str(raw)?;
        Ok(Self::new(file.table.into(), file.default))
    }

    pub fn table(&self) -> &LookupTable<LearningResources> {
        &self.table
    }

    /// Never fails: unknown careers get the generic resource list.
    pub fn resources_for(&self, career: &str) -> (&LearningResources, MatchKind) {
        match self.table.resolve(career) {
            Some(hit) => (hit.value, hit.match_kind),
            None => (&self.default, MatchKind::Default),
        }
    }

    pub fn careers_with_resources(&self) -> Vec<&str> {
        self.table.keys().collect()
    }
}
