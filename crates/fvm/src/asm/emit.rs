//! Pass 2: resolve the token stream against the label table and emit
//! the flat word stream in source order.

use super::labels::LabelTable;
use super::lexer::{Token, TokenKind};
use super::{literal, Diagnostic};
use crate::isa::Word;

pub(crate) fn emit(
    tokens: &[Token],
    labels: &LabelTable,
    diagnostics: &mut Vec<Diagnostic>,
) -> Vec<Word> {
    let mut rom = Vec::new();
    for token in tokens {
        match token.kind {
            TokenKind::Instruction(op) => rom.push(op as Word),
            TokenKind::LabelDefinition(_) => {}
            TokenKind::Label => match labels.lookup(&token.text) {
                Some(meaning) => rom.push(meaning),
                None => diagnostics.push(Diagnostic::new(
                    token.line,
                    format!("unrecognised label '{}'", token.text),
                )),
            },
            TokenKind::Str => rom.extend(token.text.chars().map(|c| c as Word)),
            TokenKind::Number(base) => {
                rom.push(literal::decode(&token.text, base, token.line, diagnostics));
            }
        }
    }
    rom
}
