//! US salary bands and job-growth outlook per career.

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::lookup::{LookupTable, MatchKind, TableFile};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalaryInfo {
    pub entry: String,
    pub mid: String,
    pub senior: String,
    pub growth: String,
}

#[derive(Debug, Deserialize)]
struct SalaryFile {
    #[serde(flatten)]
    table: TableFile<SalaryInfo>,
    default: SalaryInfo,
}

#[derive(Debug, Clone)]
pub struct SalaryTable {
    table: LookupTable<SalaryInfo>,
    default: SalaryInfo,
}

impl SalaryTable {
    pub fn from_json(raw: &str) -> Result<Self> {
        let file: SalaryFile = serde_json::from_str(raw)?;
        Ok(Self {
            table: file.table.into(),
            default: file.default,
        })
    }

    pub fn table(&self) -> &LookupTable<SalaryInfo> {
        &self.table
    }

    pub fn salary_for(&self, career: &str) -> (&SalaryInfo, MatchKind) {
        self.table
            .resolve(career)
            .map(|hit| (hit.value, hit.match_kind))
            .unwrap_or((&self.default, MatchKind::Default))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bundled() -> SalaryTable {
        SalaryTable::from_json(include_str!("../../data/salaries.json")).unwrap()
    }

    #[test]
    fn test_partial_match_before_synonym() {
        // "Cloud Engineer" substring wins over the "cloud" synonym; same target either way.
        let table = bundled();
        let (info, kind) = table.salary_for("AWS Cloud Engineer");
        assert_eq!(kind, MatchKind::Partial);
        assert_eq!(info, table.table().get("Cloud Engineer").unwrap());
    }

    #[test]
    fn test_android_maps_to_mobile() {
        let table = bundled();
        let (info, kind) = table.salary_for("Android Specialist");
        assert_eq!(kind, MatchKind::Synonym);
        assert_eq!(info, table.table().get("Mobile Developer").unwrap());
    }

    #[test]
    fn test_default_band() {
        let table = bundled();
        let (info, kind) = table.salary_for("Florist");
        assert_eq!(kind, MatchKind::Default);
        assert_eq!(info.growth, "15-25% (Faster than average)");
    }
}
