//! ChatML-style rendering of a single prompt/response exchange.

pub const USER_OPEN: &str = "<im_start>user\n";
pub const ASSISTANT_OPEN: &str = "<im_start>assistant\n";
pub const TURN_CLOSE: &str = "<im_end>";

/// Render a two-turn conversation. Content is inserted verbatim; marker-like
/// text inside `prompt` or `response` is not escaped.
pub fn format_conversation(prompt: &str, response: &str) -> String {
    format!("{USER_OPEN}{prompt}{TURN_CLOSE}\n{ASSISTANT_OPEN}{response}{TURN_CLOSE}")
}
