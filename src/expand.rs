//! Substitution of `$name` and `${name}` references.
//!
//! A bare reference takes the longest run of ASCII letters after `$`. A braced
//! reference takes everything up to the next `}`. Substituted values are not
//! expanded again. Bytes outside references are copied untouched, whether or
//! not they are valid UTF-8.

use crate::env::VariableStore;
use crate::error::{ExpansionError, ShellError};
use crate::lexer::CommandLine;

/// Expands references against one variable store for the duration of a pass.
pub struct Expander<'a> {
    vars: &'a VariableStore,
}

impl<'a> Expander<'a> {
    pub fn new(vars: &'a VariableStore) -> Self {
        Self { vars }
    }

    /// Rewrite every token of `line` in place, in order.
    ///
    /// Stops at the first failing token. The line must then be discarded, since
    /// earlier tokens have already been rewritten.
    pub fn expand_line(&self, line: &mut CommandLine) -> Result<(), ShellError> {
        for token in line.tokens_mut() {
            if !token.as_bytes().contains(&b'$') {
                continue;
            }
            let expanded = self.expand_word(token.as_bytes())?;
            token.replace(expanded);
        }
        Ok(())
    }

    /// Expand all references in `text`.
    pub fn expand_word(&self, text: &[u8]) -> Result<Vec<u8>, ShellError> {
        let mut output = Vec::new();
        let mut rest = text;

        while let Some(dollar) = rest.iter().position(|&b| b == b'$') {
            append(&mut output, &rest[..dollar])?;

            let (name, remainder) = split_reference(&rest[dollar + 1..])?;
            if name.is_empty() {
                return Err(ExpansionError::EmptyName.into());
            }
            let name = String::from_utf8_lossy(name);
            let value = self
                .vars
                .get(&name)
                .ok_or_else(|| ExpansionError::Undefined(name.to_string()))?;
            append(&mut output, value.as_bytes())?;

            rest = remainder;
        }
        append(&mut output, rest)?;

        Ok(output)
    }
}

/// Split the bytes following a `$` into the reference name and whatever comes
/// after the reference.
fn split_reference(after_dollar: &[u8]) -> Result<(&[u8], &[u8]), ExpansionError> {
    if let Some(braced) = after_dollar.strip_prefix(b"{") {
        let close = braced
            .iter()
            .position(|&b| b == b'}')
            .ok_or(ExpansionError::UnterminatedBrace)?;
        Ok((&braced[..close], &braced[close + 1..]))
    } else {
        let end = after_dollar
            .iter()
            .position(|b| !b.is_ascii_alphabetic())
            .unwrap_or(after_dollar.len());
        Ok(after_dollar.split_at(end))
    }
}

fn append(output: &mut Vec<u8>, bytes: &[u8]) -> Result<(), ShellError> {
    output.try_reserve(bytes.len())?;
    output.extend_from_slice(bytes);
    Ok(())
}
