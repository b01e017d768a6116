//! Career profile submitted by the user, flattened into the ranker's query text.

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExperienceLevel {
    #[default]
    Beginner,
    Intermediate,
    Advanced,
    Expert,
}

impl fmt::Display for ExperienceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Beginner => "Beginner",
            Self::Intermediate => "Intermediate",
            Self::Advanced => "Advanced",
            Self::Expert => "Expert",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Education {
    #[default]
    #[serde(rename = "High School")]
    HighSchool,
    #[serde(rename = "Associate Degree")]
    AssociateDegree,
    #[serde(rename = "Bachelor's Degree")]
    BachelorsDegree,
    #[serde(rename = "Master's Degree")]
    MastersDegree,
    #[serde(rename = "PhD")]
    Phd,
    #[serde(rename = "Self-Taught")]
    SelfTaught,
}

impl fmt::Display for Education {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::HighSchool => "High School",
            Self::AssociateDegree => "Associate Degree",
            Self::BachelorsDegree => "Bachelor's Degree",
            Self::MastersDegree => "Master's Degree",
            Self::Phd => "PhD",
            Self::SelfTaught => "Self-Taught",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CareerProfile {
    pub description: String,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub experience: ExperienceLevel,
    #[serde(default)]
    pub education: Education,
}

impl CareerProfile {
    pub fn is_blank(&self) -> bool {
        self.description.trim().is_empty()
    }

    /// `"{description} Skills: {a, b}. Experience: {level}. Education: {degree}."`
    pub fn to_query(&self) -> String {
        format!(
            "{} Skills: {}. Experience: {}. Education: {}.",
            self.description,
            self.skills.join(", "),
            self.experience,
            self.education
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_format() {
        let profile = CareerProfile {
            description: "I love data".to_string(),
            skills: vec!["Python".to_string(), "SQL".to_string()],
            experience: ExperienceLevel::Intermediate,
            education: Education::BachelorsDegree,
        };
        assert_eq!(
            profile.to_query(),
            "I love data Skills: Python, SQL. Experience: Intermediate. Education: Bachelor's Degree."
        );
    }

    #[test]
    fn test_defaults_from_minimal_json() {
        let profile: CareerProfile =
            serde_json::from_str(r#"{"description": "I build websites"}"#).unwrap();
        assert_eq!(profile.experience, ExperienceLevel::Beginner);
        assert_eq!(profile.education, Education::HighSchool);
        assert_eq!(
            profile.to_query(),
            "I build websites Skills: . Experience: Beginner. Education: High School."
        );
    }

    #[test]
    fn test_education_uses_display_names_on_the_wire() {
        let education: Education = serde_json::from_str(r#""Master's Degree""#).unwrap();
        assert_eq!(education, Education::MastersDegree);
        assert!(serde_json::from_str::<Education>(r#""Kindergarten""#).is_err());
    }

    #[test]
    fn test_blank_description_detected() {
        let profile = CareerProfile {
            description: "  \n ".to_string(),
            ..Default::default()
        };
        assert!(profile.is_blank());
    }
}
