// Prompt templates for the coach's templated requests.

pub const INTERVIEW_MAX_TOKENS: u32 = 2000;
pub const LEARNING_PLAN_MAX_TOKENS: u32 = 2000;
pub const RESUME_MAX_TOKENS: u32 = 1500;
pub const SALARY_MAX_TOKENS: u32 = 1500;

pub const DEFAULT_QUESTION_TYPE: &str = "technical";
pub const DEFAULT_QUESTION_COUNT: u32 = 10;
pub const DEFAULT_TIMEFRAME: &str = "6 months";
pub const DEFAULT_LOCATION: &str = "US";

/// `question_type` is free text: technical, behavioral, system_design, ...
pub fn interview_questions(career: &str, question_type: &str, count: u32) -> String {
    format!(
        "Generate {count} {question_type} interview questions for a {career} position.

For each question, provide:
1. The question
2. Key points the interviewer is looking for
3. A brief example answer or approach

Format clearly with numbers and sections."
    )
}

pub fn learning_plan(current_role: &str, target_role: &str, timeframe: &str) -> String {
    format!(
        "Create a detailed {timeframe} learning plan for someone transitioning from:
Current: {current_role}
Target: {target_role}

Include:
1. Skills gap analysis
2. Monthly learning milestones
3. Specific resources (courses, books, projects)
4. Practice exercises and projects
5. Community/networking recommendations

Make it actionable and realistic for the given timeframe."
    )
}

pub fn resume_analysis(resume_text: &str, target_role: &str) -> String {
    format!(
        "Analyze this resume for a {target_role} position:

{resume_text}

Provide:
1. Strengths
2. Areas for improvement
3. Missing keywords/skills
4. Formatting suggestions
5. Specific action items to improve the resume

Be constructive and specific."
    )
}

pub fn salary_negotiation(
    career: &str,
    offered_salary: &str,
    experience_years: u32,
    location: &str,
) -> String {
    format!(
        "I received a {career} job offer:
- Offered Salary: {offered_salary}
- My Experience: {experience_years} years
- Location: {location}

Provide:
1. Market rate analysis
2. Is this offer competitive?
3. Negotiation strategies
4. What to ask for besides salary
5. How to frame the negotiation conversation

Be specific and practical."
    )
}
