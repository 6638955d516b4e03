//! Statement dispatch and per-command field parsers.

use core::str::FromStr;

use super::lexer::{split_statements, tokenize};
use crate::ast::widget::Widget;
use crate::ast::{
    ArrayDecl, Atom, AtomBox, CanvasHeader, CanvasKind, Comment, Connect, Coords, Declare,
    Element, GuiBox, MsgBox, ObjBox, Opaque, Patch, Position, Restore, Subpatch,
};
use crate::error::{ParseError, ParseErrorKind};

/// Parses patch text into a [`Patch`].
///
/// Every statement either maps to an [`Element`] or fails with a
/// [`ParseError`] naming its line. Unknown `#X` commands and all `#A` records
/// are kept as [`Element::Opaque`].
pub fn parse(source: &str) -> Result<Patch, ParseError> {
    let statements = split_statements(source);
    if statements.is_empty() {
        return Err(ParseError {
            line: 1,
            statement: String::new(),
            kind: ParseErrorKind::Empty,
        });
    }

    let mut preamble = Vec::new();
    let mut stack: Vec<Frame> = Vec::new();

    for statement in &statements {
        let fail = |kind| ParseError {
            line: statement.line,
            statement: statement.text.clone(),
            kind,
        };
        let fields = tokenize(&statement.text);
        let record = fields.first().map_or("", String::as_str);
        let command = fields.get(1).map_or("", String::as_str);

        match record {
            "#N" if command == "canvas" => {
                let canvas = parse_canvas(&fields).map_err(fail)?;
                stack.push(Frame {
                    canvas,
                    elements: Vec::new(),
                });
            }
            "#N" => match stack.last_mut() {
                Some(frame) => frame.elements.push(Element::Opaque(Opaque { fields })),
                None => preamble.push(Opaque { fields }),
            },
            "#X" | "#A" => {
                let Some(frame) = stack.last_mut() else {
                    return Err(fail(ParseErrorKind::ElementBeforeCanvas));
                };
                if record == "#A" {
                    frame.elements.push(Element::Opaque(Opaque { fields }));
                    continue;
                }
                match parse_x(command, &fields).map_err(fail)? {
                    Parsed::Element(element) => frame.elements.push(element),
                    Parsed::Restore(restore) => {
                        if stack.len() < 2 {
                            return Err(fail(ParseErrorKind::UnmatchedRestore));
                        }
                        let Some(inner) = stack.pop() else {
                            return Err(fail(ParseErrorKind::UnmatchedRestore));
                        };
                        let subpatch = Element::Subpatch(Subpatch {
                            canvas: inner.canvas,
                            elements: inner.elements,
                            restore,
                        });
                        if let Some(parent) = stack.last_mut() {
                            parent.elements.push(subpatch);
                        }
                    }
                }
            }
            other => return Err(fail(ParseErrorKind::UnknownRecord(other.to_string()))),
        }
    }

    let last = statements.last().map_or(1, |s| s.line);
    let end = |kind| ParseError {
        line: last,
        statement: String::new(),
        kind,
    };
    if stack.len() > 1 {
        return Err(end(ParseErrorKind::UnclosedSubpatch(stack.len() - 1)));
    }
    let Some(root) = stack.pop() else {
        return Err(end(ParseErrorKind::MissingCanvas));
    };

    #[cfg(feature = "tracing")]
    tracing::debug!(
        "parse: {} statements, {} top-level elements",
        statements.len(),
        root.elements.len()
    );

    Ok(Patch {
        preamble,
        canvas: root.canvas,
        elements: root.elements,
    })
}

struct Frame {
    canvas: CanvasHeader,
    elements: Vec<Element>,
}

enum Parsed {
    Element(Element),
    Restore(Restore),
}

type FieldResult<T> = Result<T, ParseErrorKind>;

fn number<T: FromStr>(field: &str) -> FieldResult<T> {
    field
        .parse()
        .map_err(|_| ParseErrorKind::InvalidNumber(field.to_string()))
}

fn require(fields: &[String], expected: usize) -> FieldResult<()> {
    if fields.len() < expected {
        return Err(ParseErrorKind::TooFewFields {
            command: fields.get(1).cloned().unwrap_or_default(),
            expected,
            found: fields.len(),
        });
    }
    Ok(())
}

fn position(fields: &[String]) -> FieldResult<Position> {
    require(fields, 4)?;
    Ok(Position::new(number(&fields[2])?, number(&fields[3])?))
}

fn parse_canvas(fields: &[String]) -> FieldResult<CanvasHeader> {
    let kind = match fields.len() {
        7 => CanvasKind::Root {
            font_size: number(&fields[6])?,
        },
        8 => CanvasKind::Named {
            name: fields[6].clone(),
            open_on_load: number(&fields[7])?,
        },
        n => return Err(ParseErrorKind::CanvasShape(n)),
    };
    Ok(CanvasHeader {
        x: number(&fields[2])?,
        y: number(&fields[3])?,
        width: number(&fields[4])?,
        height: number(&fields[5])?,
        kind,
    })
}

fn parse_x(command: &str, fields: &[String]) -> FieldResult<Parsed> {
    let element = match command {
        "obj" => {
            let position = position(fields)?;
            let class = fields.get(4).cloned().unwrap_or_default();
            let args = fields.get(5..).map(<[String]>::to_vec).unwrap_or_default();
            match Widget::from_args(&class, &args) {
                Some(widget) => Element::Gui(GuiBox { position, widget }),
                None => Element::Obj(ObjBox {
                    position,
                    class,
                    args,
                }),
            }
        }
        "msg" => Element::Msg(MsgBox {
            position: position(fields)?,
            content: fields[4..].to_vec(),
        }),
        "text" => Element::Text(Comment {
            position: position(fields)?,
            content: fields[4..].to_vec(),
        }),
        "floatatom" => Element::FloatAtom(parse_atom(fields)?),
        "symbolatom" => Element::SymbolAtom(parse_atom(fields)?),
        "array" => {
            require(fields, 6)?;
            Element::Array(ArrayDecl {
                name: fields[2].clone(),
                size: number(&fields[3])?,
                element_type: fields[4].clone(),
                flags: number(&fields[5])?,
                extra: fields[6..].to_vec(),
            })
        }
        "declare" => Element::Declare(Declare {
            args: fields[2..].to_vec(),
        }),
        "coords" => Element::Coords(parse_coords(fields)?),
        "connect" => {
            require(fields, 6)?;
            Element::Connect(Connect {
                source: number(&fields[2])?,
                outlet: number(&fields[3])?,
                sink: number(&fields[4])?,
                inlet: number(&fields[5])?,
            })
        }
        "restore" => {
            require(fields, 5)?;
            return Ok(Parsed::Restore(Restore {
                position: position(fields)?,
                class: fields[4].clone(),
                args: fields[5..].to_vec(),
            }));
        }
        _ => Element::Opaque(Opaque {
            fields: fields.to_vec(),
        }),
    };
    Ok(Parsed::Element(element))
}

fn parse_atom(fields: &[String]) -> FieldResult<AtomBox> {
    require(fields, 11)?;
    Ok(AtomBox {
        position: position(fields)?,
        atom: Atom {
            width: number(&fields[4])?,
            lower: number(&fields[5])?,
            upper: number(&fields[6])?,
            label_pos: number(&fields[7])?,
            label: fields[8].clone(),
            receive: fields[9].clone(),
            send: fields[10].clone(),
            extra: fields[11..].to_vec(),
        },
    })
}

fn parse_coords(fields: &[String]) -> FieldResult<Coords> {
    require(fields, 9)?;
    let (margin, rest) = if fields.len() >= 11 {
        (Some((number(&fields[9])?, number(&fields[10])?)), 11)
    } else {
        (None, 9)
    };
    Ok(Coords {
        x_from: number(&fields[2])?,
        y_from: number(&fields[3])?,
        x_to: number(&fields[4])?,
        y_to: number(&fields[5])?,
        width: number(&fields[6])?,
        height: number(&fields[7])?,
        graph_on_parent: number(&fields[8])?,
        margin,
        extra: fields[rest..].to_vec(),
    })
}
