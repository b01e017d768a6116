// AI career coach: free-form chat plus templated requests
// (interview prep, learning plans, resume review, salary negotiation).
// All chat calls go through llm_client::ChatClient.

pub mod handlers;
pub mod prompts;
