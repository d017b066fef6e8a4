//! Token counting for LLM context budget management.
//!
//! Uses tiktoken-rs for OpenAI-compatible token counts. Counting is an
//! optional, additive step: when the tokenizer cannot be loaded the caller
//! gets [`TokenizationUnavailable`] and carries on without counts.

use std::sync::OnceLock;

use thiserror::Error;
use tiktoken_rs::CoreBPE;

/// Token encoding to use for counting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Encoding {
    /// cl100k_base: GPT-4, GPT-3.5-turbo, ChatGPT
    #[default]
    Cl100kBase,
    /// o200k_base: GPT-4o
    O200kBase,
}

impl std::fmt::Display for Encoding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Encoding::Cl100kBase => write!(f, "cl100k_base"),
            Encoding::O200kBase => write!(f, "o200k_base"),
        }
    }
}

impl std::str::FromStr for Encoding {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "cl100k" | "cl100k_base" => Ok(Encoding::Cl100kBase),
            "o200k" | "o200k_base" => Ok(Encoding::O200kBase),
            _ => Err(format!("unknown encoding: {}", s)),
        }
    }
}

/// The tokenizer for an encoding could not be loaded.
#[derive(Debug, Clone, Error)]
#[error("tokenizer unavailable for {encoding}: {reason}")]
pub struct TokenizationUnavailable {
    pub encoding: Encoding,
    pub reason: String,
}

/// Something that can count tokens in text.
pub trait CountTokens {
    fn count(&self, text: &str) -> Result<usize, TokenizationUnavailable>;
}

// Cached tokenizers - initialized once per encoding
static CL100K: OnceLock<Result<CoreBPE, String>> = OnceLock::new();
static O200K: OnceLock<Result<CoreBPE, String>> = OnceLock::new();

fn get_tokenizer(encoding: Encoding) -> Result<&'static CoreBPE, TokenizationUnavailable> {
    let cached = match encoding {
        Encoding::Cl100kBase => {
            CL100K.get_or_init(|| tiktoken_rs::cl100k_base().map_err(|e| e.to_string()))
        }
        Encoding::O200kBase => {
            O200K.get_or_init(|| tiktoken_rs::o200k_base().map_err(|e| e.to_string()))
        }
    };
    cached.as_ref().map_err(|reason| TokenizationUnavailable {
        encoding,
        reason: reason.clone(),
    })
}

/// Count tokens in text using the default encoding (cl100k_base).
///
/// # Examples
///
/// ```
/// use llmify::tokens::count_tokens;
///
/// let count = count_tokens("Hello, world!").unwrap();
/// assert!(count > 0);
/// ```
pub fn count_tokens(text: &str) -> Result<usize, TokenizationUnavailable> {
    count_tokens_with_encoding(text, Encoding::default())
}

/// Count tokens in text using the specified encoding.
pub fn count_tokens_with_encoding(
    text: &str,
    encoding: Encoding,
) -> Result<usize, TokenizationUnavailable> {
    let bpe = get_tokenizer(encoding)?;
    Ok(bpe.encode_ordinary(text).len())
}

/// Reusable token counter with cached tokenizer.
///
/// # Examples
///
/// ```
/// use llmify::tokens::{CountTokens, Encoding, TokenCounter};
///
/// let counter = TokenCounter::new(Encoding::Cl100kBase);
/// let count1 = counter.count("First text").unwrap();
/// let count2 = counter.count("Second text").unwrap();
/// assert!(count1 > 0 && count2 > 0);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct TokenCounter {
    encoding: Encoding,
}

impl TokenCounter {
    /// Create a new token counter with the specified encoding.
    pub fn new(encoding: Encoding) -> Self {
        Self { encoding }
    }

    /// Get the encoding this counter uses.
    pub fn encoding(&self) -> Encoding {
        self.encoding
    }
}

impl CountTokens for TokenCounter {
    fn count(&self, text: &str) -> Result<usize, TokenizationUnavailable> {
        count_tokens_with_encoding(text, self.encoding)
    }
}
