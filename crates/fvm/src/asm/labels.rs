//! The label table: identifier to 64-bit meaning.
//!
//! Eleven built-in names for the channels and registers are always
//! present; user definitions join them in a single pass over the token
//! stream. Lookup is first-match, so a duplicate definition (including
//! one colliding with a built-in) is inert.

use std::collections::HashMap;

use super::lexer::{DefinitionKind, Token, TokenKind};
use super::{literal, Diagnostic};
use crate::isa::Word;

/// Channel and register names every program can use without defining.
const BUILTIN_LABELS: [(&str, Word); 11] = [
    ("cst", 3),
    ("mem", 0),
    ("inp", 1),
    ("out", 2),
    ("mch", 0),
    ("mar", 1),
    ("mdr", 2),
    ("acc", 3),
    ("dat", 4),
    ("cea", 5),
    ("csp", 6),
];

#[derive(Debug)]
pub(crate) struct LabelTable {
    meanings: HashMap<String, Word>,
}

impl LabelTable {
    /// Collects every definition in the token stream. Address-bound
    /// names take the address stamped on their token during lexing,
    /// which is what makes forward references work.
    pub(crate) fn build(tokens: &[Token], diagnostics: &mut Vec<Diagnostic>) -> Self {
        let mut meanings = HashMap::new();
        for (name, meaning) in BUILTIN_LABELS {
            meanings.insert(name.to_string(), meaning);
        }

        for (index, token) in tokens.iter().enumerate() {
            let TokenKind::LabelDefinition(kind) = token.kind else {
                continue;
            };
            for c in token.text.chars() {
                if !c.is_ascii_alphanumeric() && c != '_' {
                    diagnostics.push(Diagnostic::new(
                        token.line,
                        format!(
                            "illegal character '{c}' in label declaration for '{}'",
                            token.text
                        ),
                    ));
                }
            }

            let meaning = match kind {
                DefinitionKind::Address => Some(token.address),
                DefinitionKind::Value => Self::value_of(tokens.get(index + 1), token, diagnostics),
            };
            if let Some(meaning) = meaning {
                meanings.entry(token.text.clone()).or_insert(meaning);
            }
        }

        Self { meanings }
    }

    fn value_of(
        successor: Option<&Token>,
        definition: &Token,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Option<Word> {
        let Some(successor) = successor else {
            diagnostics.push(Diagnostic::new(
                definition.line,
                "expected a token after value definition using '=', but got nothing",
            ));
            return None;
        };
        match successor.kind {
            TokenKind::Number(base) => Some(literal::decode(
                &successor.text,
                base,
                successor.line,
                diagnostics,
            )),
            TokenKind::Str => {
                diagnostics.push(Diagnostic::new(
                    definition.line,
                    "a label cannot be assigned a string; labels hold a single \
                     address or value",
                ));
                None
            }
            _ => Some(literal::decode_tagged(
                &successor.text,
                successor.line,
                diagnostics,
            )),
        }
    }

    pub(crate) fn lookup(&self, name: &str) -> Option<Word> {
        self.meanings.get(name).copied()
    }
}
