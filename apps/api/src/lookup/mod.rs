//! Static career lookup tables: learning resources, salaries, books, roadmaps.
//!
//! Every table resolves a career name the same way, stopping at the first hit:
//! 1. exact key
//! 2. case-insensitive substring, either direction, in table order
//! 3. curated synonym patterns, in declaration order
//! 4. the table's default record
//!
//! Tables are bundled JSON; declaration order is part of the contract.

pub mod books;
pub mod handlers;
pub mod resources;
pub mod roadmap;
pub mod salary;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

pub use books::{Book, CategorizedBook};
pub use resources::LearningResources;
pub use roadmap::Roadmap;
pub use salary::SalaryInfo;

/// Which resolution tier produced a lookup result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchKind {
    Exact,
    Partial,
    Synonym,
    Default,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Synonym {
    pub pattern: String,
    pub target: String,
}

#[derive(Debug, Clone, Deserialize)]
struct KeyedEntry<T> {
    key: String,
    #[serde(flatten)]
    value: T,
}

/// On-disk shape shared by every bundled table.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct TableFile<T> {
    entries: Vec<KeyedEntry<T>>,
    #[serde(default)]
    synonyms: Vec<Synonym>,
}

/// Ordered key → record table with tiered fuzzy resolution.
#[derive(Debug, Clone)]
pub struct LookupTable<T> {
    entries: Vec<(String, T)>,
    synonyms: Vec<Synonym>,
}

/// A resolved record plus the key and tier it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolved<'a, T> {
    pub key: &'a str,
    pub value: &'a T,
    pub match_kind: MatchKind,
}

impl<T> LookupTable<T> {
    pub fn new(entries: Vec<(String, T)>, synonyms: Vec<Synonym>) -> Self {
        Self { entries, synonyms }
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn get(&self, key: &str) -> Option<&T> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &T)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Tiers 1–3. `None` means the caller falls back to its default record.
    pub fn resolve(&self, career: &str) -> Option<Resolved<'_, T>> {
        if let Some((key, value)) = self.entries.iter().find(|(k, _)| k == career) {
            return Some(Resolved {
                key,
                value,
                match_kind: MatchKind::Exact,
            });
        }

        let career_lower = career.to_lowercase();

        for (key, value) in &self.entries {
            let key_lower = key.to_lowercase();
            if key_lower.contains(&career_lower) || career_lower.contains(&key_lower) {
                return Some(Resolved {
                    key,
                    value,
                    match_kind: MatchKind::Partial,
                });
            }
        }

        for synonym in &self.synonyms {
            if career_lower.contains(&synonym.pattern) {
                if let Some((key, value)) = self.entries.iter().find(|(k, _)| *k == synonym.target)
                {
                    return Some(Resolved {
                        key,
                        value,
                        match_kind: MatchKind::Synonym,
                    });
                }
            }
        }

        None
    }
}

impl<T> From<TableFile<T>> for LookupTable<T> {
    fn from(file: TableFile<T>) -> Self {
        let entries = file.entries.into_iter().map(|e| (e.key, e.value)).collect();
        Self::new(entries, file.synonyms)
    }
}

/// All four tables, loaded once at startup.
#[derive(Debug, Clone)]
pub struct LookupTables {
    pub resources: resources::ResourceTable,
    pub salaries: salary::SalaryTable,
    pub books: books::BookTable,
    pub roadmaps: roadmap::RoadmapTable,
}

impl LookupTables {
    /// Tables compiled into the binary from `data/`.
    pub fn bundled() -> Result<Self> {
        Ok(Self {
            resources: resources::ResourceTable::from_json(include_str!(
                "../../data/resources.json"
            ))
            .context("parsing bundled resources.json")?,
            salaries: salary::SalaryTable::from_json(include_str!("../../data/salaries.json"))
                .context("parsing bundled salaries.json")?,
            books: books::BookTable::from_json(include_str!("../../data/books.json"))
                .context("parsing bundled books.json")?,
            roadmaps: roadmap::RoadmapTable::from_json(include_str!("../../data/roadmaps.json"))
                .context("parsing bundled roadmaps.json")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> LookupTable<u32> {
        LookupTable::new(
            vec![
                ("Data Scientist".to_string(), 1),
                ("Machine Learning Engineer".to_string(), 2),
                ("Data Engineer".to_string(), 3),
            ],
            vec![
                Synonym {
                    pattern: "ml engineer".to_string(),
                    target: "Machine Learning Engineer".to_string(),
                },
                Synonym {
                    pattern: "engineer".to_string(),
                    target: "Data Engineer".to_string(),
                },
            ],
        )
    }

    #[test]
    fn test_exact_match_wins() {
        let t = table();
        let r = t.resolve("Data Engineer").unwrap();
        assert_eq!(*r.value, 3);
        assert_eq!(r.match_kind, MatchKind::Exact);
    }

    #[test]
    fn test_partial_match_uses_declaration_order() {
        // "data" is a substring of both "Data Scientist" and "Data Engineer".
        let t = table();
        let r = t.resolve("data").unwrap();
        assert_eq!(r.key, "Data Scientist");
        assert_eq!(r.match_kind, MatchKind::Partial);
    }

    #[test]
    fn test_partial_match_either_direction() {
        let t = table();
        let r = t.resolve("Senior Data Scientist (Remote)").unwrap();
        assert_eq!(r.key, "Data Scientist");
        assert_eq!(r.match_kind, MatchKind::Partial);
    }

    #[test]
    fn test_synonym_after_partial() {
        let t = table();
        let r = t.resolve("Senior ML Engineer").unwrap();
        assert_eq!(r.key, "Machine Learning Engineer");
        assert_eq!(r.match_kind, MatchKind::Synonym);
    }

    #[test]
    fn test_synonyms_in_declaration_order() {
        // Both patterns match; the first declared wins.
        let t = table();
        assert_eq!(t.resolve("lead ml engineer").unwrap().key, "Machine Learning Engineer");
    }

    #[test]
    fn test_unknown_career_unresolved() {
        assert!(table().resolve("Pastry Chef").is_none());
    }

    #[test]
    fn test_bundled_tables_parse() {
        let tables = LookupTables::bundled().unwrap();
        assert_eq!(tables.resources.table().keys().count(), 8);
        assert_eq!(tables.books.categories().len(), 12);
        assert!(tables.salaries.table().get("Mobile Developer").is_some());
        assert_eq!(tables.roadmaps.careers().len(), 4);
    }
}
