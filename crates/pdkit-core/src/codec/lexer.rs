//! Statement splitting and field tokenizing.

use super::ESCAPE;

/// One logical statement, terminator stripped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Statement {
    /// 1-based line where the statement's first field starts.
    pub line: usize,
    pub text: String,
}

/// Splits patch text into statements.
///
/// Line endings are normalized first. A `\` directly before a newline joins the
/// two physical lines; any other escape pair is kept verbatim, so an escaped
/// `;` never ends a statement.
pub(crate) fn split_statements(source: &str) -> Vec<Statement> {
    let source = source.replace("\r\n", "\n").replace('\r', "\n");
    let mut statements = Vec::new();
    let mut current = String::new();
    let mut start: Option<usize> = None;
    let mut line = 1;
    let mut chars = source.chars();

    while let Some(c) = chars.next() {
        match c {
            ESCAPE => match chars.next() {
                Some('\n') => line += 1,
                Some(next) => {
                    start.get_or_insert(line);
                    current.push(ESCAPE);
                    current.push(next);
                }
                None => {
                    start.get_or_insert(line);
                    current.push(ESCAPE);
                }
            },
            ';' => {
                if let Some(first) = start.take() {
                    statements.push(Statement {
                        line: first,
                        text: current.trim().to_string(),
                    });
                }
                current.clear();
            }
            '\n' => {
                line += 1;
                current.push('\n');
            }
            _ => {
                if !c.is_whitespace() {
                    start.get_or_insert(line);
                }
                current.push(c);
            }
        }
    }

    if let Some(first) = start {
        statements.push(Statement {
            line: first,
            text: current.trim().to_string(),
        });
    }
    statements
}

/// Splits a statement into fields on unescaped whitespace.
///
/// Escape pairs stay inside their field, so `a\ b` is one field.
pub(crate) fn tokenize(text: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut chars = text.chars();

    while let Some(c) = chars.next() {
        if c == ESCAPE {
            current.push(c);
            if let Some(next) = chars.next() {
                current.push(next);
            }
        } else if c.is_whitespace() {
            if !current.is_empty() {
                fields.push(std::mem::take(&mut current));
            }
        } else {
            current.push(c);
        }
    }
    if !current.is_empty() {
        fields.push(current);
    }
    fields
}
