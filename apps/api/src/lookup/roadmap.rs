//! Step-by-step learning roadmaps, linked to roadmap.sh.

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::lookup::{LookupTable, MatchKind, TableFile};

pub const ROADMAP_SITE: &str = "https://roadmap.sh";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoadmapLink {
    pub title: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoadmapSection {
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub topics: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub resources: Vec<RoadmapLink>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Roadmap {
    pub title: String,
    pub description: String,
    pub url: String,
    pub sections: Vec<RoadmapSection>,
}

impl Roadmap {
    /// Skeleton roadmap for careers without curated content.
    pub fn generic(career: &str) -> Self {
        let section = |title: &str, description: &str, topics: [&str; 4]| RoadmapSection {
            title: title.to_string(),
            description: description.to_string(),
            topics: topics.iter().map(|t| t.to_string()).collect(),
            resources: Vec::new(),
        };

        Self {
            title: format!("{career} Roadmap"),
            description: format!("Learning path for {career}"),
            url: ROADMAP_SITE.to_string(),
            sections: vec![
                section(
                    "Fundamentals",
                    "Core concepts and foundational knowledge",
                    ["Industry overview", "Required skills", "Common tools", "Best practices"],
                ),
                section(
                    "Technical Skills",
                    "Essential technical competencies",
                    [
                        "Programming languages",
                        "Frameworks and libraries",
                        "Development tools",
                        "Version control",
                    ],
                ),
                section(
                    "Advanced Topics",
                    "Advanced skills and specializations",
                    [
                        "System design",
                        "Architecture patterns",
                        "Performance optimization",
                        "Security best practices",
                    ],
                ),
                section(
                    "Professional Development",
                    "Career growth and continuous learning",
                    [
                        "Portfolio building",
                        "Open source contribution",
                        "Networking",
                        "Staying updated with trends",
                    ],
                ),
            ],
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
struct Slug {
    key: String,
    slug: String,
}

#[derive(Debug, Deserialize)]
struct RoadmapFile {
    #[serde(flatten)]
    table: TableFile<Roadmap>,
    #[serde(default)]
    slugs: Vec<Slug>,
}

#[derive(Debug, Clone)]
pub struct RoadmapTable {
    table: LookupTable<Roadmap>,
    slugs: Vec<Slug>,
}

impl RoadmapTable {
    pub fn from_json(raw: &str) -> Result<Self> {
        let file: RoadmapFile = serde_json::from_str(raw)?;
        Ok(Self {
            table: file.table.into(),
            slugs: file.slugs,
        })
    }

    /// Curated roadmap if one resolves, otherwise `Roadmap::generic(career)`.
    pub fn roadmap_for(&self, career: &str) -> (Roadmap, MatchKind) {
        match self.table.resolve(career) {
            Some(hit) => (hit.value.clone(), hit.match_kind),
            None => (Roadmap::generic(career), MatchKind::Default),
        }
    }

    /// Exact key only; no fuzzy matching for links.
    pub fn roadmap_url(&self, career: &str) -> String {
        match self.slugs.iter().find(|s| s.key == career) {
            Some(s) => format!("{ROADMAP_SITE}/{}", s.slug),
            None => ROADMAP_SITE.to_string(),
        }
    }

    pub fn careers(&self) -> Vec<&str> {
        self.table.keys().collect()
    }
}
