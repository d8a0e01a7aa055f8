//! Activation and exit detection
//!
//! Both checks run on the trimmed, lower-cased message (accents are kept).

use regex::Regex;
use std::sync::LazyLock;

/// Words that close a conversation
pub(crate) const EXIT_WORDS: &str = "sair|tchau|exit|bye|encerrar|finalizar|obrigado|valeu";

/// Closing word followed by end of text, whitespace, `!` or `?`
pub(crate) static EXIT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!(r"^({EXIT_WORDS})(\s|$|!|\?)")).unwrap());

/// True when the message closes the conversation
pub fn is_exit_command(message: &str) -> bool {
    EXIT_RE.is_match(&message.trim().to_lowercase())
}

/// Detects the activation keyword that hands a message to the action pipeline
#[derive(Debug, Clone)]
pub struct TriggerDetector {
    keyword: String,
    prefix: Regex,
}

impl TriggerDetector {
    pub fn new(keyword: &str) -> Self {
        let keyword = keyword.trim().to_lowercase();
        let prefix = Regex::new(&format!(r"(?i)^\s*{}[,\s]+", regex::escape(&keyword)))
            .expect("escaped keyword is a valid pattern");
        Self { keyword, prefix }
    }

    pub fn keyword(&self) -> &str {
        &self.keyword
    }

    /// Keyword followed by a space or a comma ("icarus ", "icarus,")
    pub fn is_activation(&self, message: &str) -> bool {
        let msg = message.trim().to_lowercase();
        match msg.strip_prefix(self.keyword.as_str()) {
            Some(rest) => rest.starts_with(' ') || rest.starts_with(','),
            None => false,
        }
    }

    /// Command text with the keyword and its separators removed
    pub fn strip_activation(&self, message: &str) -> String {
        self.prefix.replace(message, "").trim().to_string()
    }
}

impl Default for TriggerDetector {
    fn default() -> Self {
        Self::new("icarus")
    }
}
