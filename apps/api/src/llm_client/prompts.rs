// Shared prompt fragments. Each module that calls the model for a feature
// keeps its own prompts.rs alongside it.

/// Prompt used to check that an API key can reach the model.
pub const CONNECTIVITY_CHECK_PROMPT: &str =
    "Reply with the single word OK to confirm you are reachable.";
