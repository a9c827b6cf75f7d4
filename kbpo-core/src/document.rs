//! Tokenized document input.
//!
//! ```json
//! { "sentences": [ [ { "word": "Alice", "span": [0, 5], "pos_tag": "NNP" }, ... ], ... ] }
//! ```
//!
//! Unknown fields (`lemma`, `ner_tag`, ...) are ignored.

use crate::entity::Span;
use serde::{Deserialize, Serialize};

/// One token of the source document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    /// Surface form
    pub word: String,
    /// Character span in the document
    pub span: Span,
    /// Part-of-speech tag
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pos_tag: Option<String>,
}

/// A sentence-split, tokenized document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    /// Document identifier
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Title
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Publication date
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    /// Sentences in document order
    pub sentences: Vec<Vec<Token>>,
}

/// A token together with its position in the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenRef<'a> {
    /// Sentence index
    pub sentence: usize,
    /// Token index within the sentence
    pub index: usize,
    /// The token
    pub token: &'a Token,
}

impl Document {
    /// Parse a document from JSON.
    pub fn from_json(json: &str) -> crate::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Iterate over all tokens in document order.
    pub fn tokens(&self) -> impl Iterator<Item = TokenRef<'_>> {
        self.sentences.iter().enumerate().flat_map(|(sentence, tokens)| {
            tokens.iter().enumerate().map(move |(index, token)| TokenRef {
                sentence,
                index,
                token,
            })
        })
    }

    /// Tokens lying entirely within `span`.
    #[must_use]
    pub fn tokens_in(&self, span: Span) -> Vec<TokenRef<'_>> {
        self.tokens()
            .filter(|t| span.contains(&t.token.span))
            .collect()
    }

    /// Total number of tokens.
    #[must_use]
    pub fn token_count(&self) -> usize {
        self.sentences.iter().map(Vec::len).sum()
    }

    /// Sentence containing the character offset, if any.
    #[must_use]
    pub fn sentence_of(&self, offset: usize) -> Option<usize> {
        self.tokens()
            .find(|t| t.token.span.begin <= offset && offset < t.token.span.end)
            .map(|t| t.sentence)
    }
}

/// Join token words, inserting one space wherever the source has a gap
/// between consecutive tokens.
#[must_use]
pub fn gloss_from_tokens(tokens: &[TokenRef<'_>]) -> String {
    let mut gloss = String::new();
    let mut prev_end: Option<usize> = None;
    for t in tokens {
        if prev_end.is_some_and(|end| t.token.span.begin > end) {
            gloss.push(' ');
        }
        gloss.push_str(&t.token.word);
        prev_end = Some(t.token.span.end);
    }
    gloss
}
