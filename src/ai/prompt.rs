//! Prompt building for responder queries.

/// Instructions that keep the model's answer to a single command line.
pub const COMMAND_PROMPT: &str = "You are a terminal emulator in a Unix/Linux system. \
The user will ask for help with commands. \
Respond ONLY with a single line CLI command. \
Do NOT include explanations, code blocks, or multiple lines. \
If a command cannot be provided, respond with a very brief explanation why. \
For example, if the user asks for a command to list files, respond with only: ls";

/// Build the user message sent to the model for `query`.
pub fn build_prompt(query: &str) -> String {
    format!("{COMMAND_PROMPT}\n\nUser query: {query}\nResponse:")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_prompt_contains_query() {
        let prompt = build_prompt("list all files");

        assert!(prompt.starts_with(COMMAND_PROMPT));
        assert!(prompt.contains("User query: list all files\n"));
        assert!(prompt.ends_with("Response:"));
    }
}
