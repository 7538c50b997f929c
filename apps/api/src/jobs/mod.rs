// Job-offer endpoints: generic prompt, offer synthesis, skill matching, salary analysis.
// Replies go through the Response Normalizer and are returned as-is.

pub mod handlers;
pub mod prompts;
