// Conversation scaffolding shared by every coach request: the fixed coaching
// persona plus an optional system message summarising the user's recommendations.

use crate::llm_client::ChatMessage;
use crate::recommendation::models::RankedResult;

/// Number of recommendations summarised into the chat context.
pub const CONTEXT_RECOMMENDATIONS: usize = 3;

pub const CAREER_COACH_SYSTEM: &str = "\
You are an expert career coach and advisor with deep knowledge of:
- Technology careers and industry trends
- Skills development and learning paths
- Interview preparation and job search strategies
- Salary negotiations and career growth
- Work-life balance and career transitions

Provide practical, actionable advice tailored to the user's specific situation.
Be encouraging, professional, and honest. If you don't know something, say so.
Use examples and specific recommendations when possible.";

/// `"User's Career Recommendations:\n1. Data Scientist (Confidence: 87.3%)\n..."`
pub fn render_recommendations(result: &RankedResult) -> String {
    let mut out = String::from("User's Career Recommendations:\n");
    for (i, rec) in result.iter().take(CONTEXT_RECOMMENDATIONS).enumerate() {
        out.push_str(&format!(
            "{}. {} (Confidence: {:.1}%)\n",
            i + 1,
            rec.career,
            rec.confidence
        ));
    }
    out
}

fn non_empty(context: Option<&RankedResult>) -> Option<&RankedResult> {
    context.filter(|c| !c.is_empty())
}

pub fn advice_messages(prompt: &str, context: Option<&RankedResult>) -> Vec<ChatMessage> {
    let mut messages = vec![ChatMessage::system(CAREER_COACH_SYSTEM)];
    if let Some(result) = non_empty(context) {
        messages.push(ChatMessage::system(format!(
            "Context: {}\nUse this information to provide personalized advice.",
            render_recommendations(result)
        )));
    }
    messages.push(ChatMessage::user(prompt));
    messages
}

/// Streaming requests carry the bare context line.
pub fn stream_messages(prompt: &str, context: Option<&RankedResult>) -> Vec<ChatMessage> {
    let mut messages = vec![ChatMessage::system(CAREER_COACH_SYSTEM)];
    if let Some(result) = non_empty(context) {
        messages.push(ChatMessage::system(format!(
            "Context: {}",
            render_recommendations(result)
        )));
    }
    messages.push(ChatMessage::user(prompt));
    messages
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recommendation::models::{ScoredCareer, ScoringMethod};

    fn result(n: usize) -> RankedResult {
        let names = ["Data Scientist", "ML Engineer", "Data Engineer", "Analyst"];
        RankedResult {
            entries: names[..n]
                .iter()
                .enumerate()
                .map(|(i, name)| ScoredCareer {
                    career: name.to_string(),
                    confidence: 87.26 - i as f64 * 10.0,
                    method: ScoringMethod::Hybrid,
                })
                .collect(),
        }
    }

    #[test]
    fn test_context_lists_top_three() {
        let text = render_recommendations(&result(4));
        assert_eq!(
            text,
            "User's Career Recommendations:\n\
             1. Data Scientist (Confidence: 87.3%)\n\
             2. ML Engineer (Confidence: 77.3%)\n\
             3. Data Engineer (Confidence: 67.3%)\n"
        );
    }

    #[test]
    fn test_advice_messages_with_context() {
        let messages = advice_messages("What next?", Some(&result(1)));
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[0].content, CAREER_COACH_SYSTEM);
        assert!(messages[1].content.starts_with("Context: User's Career Recommendations:\n1."));
        assert!(messages[1]
            .content
            .ends_with("\nUse this information to provide personalized advice."));
        assert_eq!(messages[2], ChatMessage::user("What next?"));
    }

    #[test]
    fn test_empty_context_is_omitted() {
        assert_eq!(advice_messages("hi", Some(&RankedResult::default())).len(), 2);
        assert_eq!(advice_messages("hi", None).len(), 2);
    }

    #[test]
    fn test_stream_context_has_no_instruction() {
        let messages = stream_messages("hi", Some(&result(2)));
        assert!(messages[1].content.starts_with("Context: "));
        assert!(!messages[1].content.contains("personalized"));
    }
}
