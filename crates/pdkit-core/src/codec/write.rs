//! Tree to text.

use crate::ast::{AtomBox, CanvasHeader, CanvasKind, Coords, Element, Patch, Position};

use super::format_float;

/// Serializes a patch to text, one statement per line.
///
/// Output of this function parses back to an equal tree and serializes to the
/// same bytes.
pub fn serialize(patch: &Patch) -> String {
    let mut w = Writer::default();
    for opaque in &patch.preamble {
        w.statement(opaque.fields.iter().map(String::as_str));
    }
    w.canvas(&patch.canvas);
    w.elements(&patch.elements);
    w.out
}

#[derive(Default)]
struct Writer {
    out: String,
}

impl Writer {
    fn statement<'a>(&mut self, fields: impl IntoIterator<Item = &'a str>) {
        for (i, field) in fields.into_iter().enumerate() {
            if i > 0 {
                self.out.push(' ');
            }
            self.out.push_str(field);
        }
        self.out.push_str(";\n");
    }

    fn canvas(&mut self, canvas: &CanvasHeader) {
        let mut fields = vec![
            "#N".to_string(),
            "canvas".to_string(),
            canvas.x.to_string(),
            canvas.y.to_string(),
            canvas.width.to_string(),
            canvas.height.to_string(),
        ];
        match &canvas.kind {
            CanvasKind::Root { font_size } => fields.push(font_size.to_string()),
            CanvasKind::Named { name, open_on_load } => {
                fields.push(name.clone());
                fields.push(open_on_load.to_string());
            }
        }
        self.statement(fields.iter().map(String::as_str));
    }

    fn placed(&mut self, command: &str, position: Position, rest: &[String]) {
        let x = position.x.to_string();
        let y = position.y.to_string();
        self.statement(
            ["#X", command, x.as_str(), y.as_str()]
                .into_iter()
                .chain(rest.iter().map(String::as_str)),
        );
    }

    fn elements(&mut self, elements: &[Element]) {
        for element in elements {
            self.element(element);
        }
    }

    fn element(&mut self, element: &Element) {
        match element {
            Element::Obj(o) => {
                let mut rest = Vec::with_capacity(o.args.len() + 1);
                if !o.class.is_empty() {
                    rest.push(o.class.clone());
                }
                rest.extend(o.args.iter().cloned());
                self.placed("obj", o.position, &rest);
            }
            Element::Msg(m) => self.placed("msg", m.position, &m.content),
            Element::Text(t) => self.placed("text", t.position, &t.content),
            Element::FloatAtom(a) => self.atom("floatatom", a),
            Element::SymbolAtom(a) => self.atom("symbolatom", a),
            Element::Gui(g) => {
                let mut rest = vec![g.widget.class_name().to_string()];
                rest.extend(g.widget.args());
                self.placed("obj", g.position, &rest);
            }
            Element::Array(a) => {
                let size = a.size.to_string();
                let flags = a.flags.to_string();
                self.statement(
                    [
                        "#X",
                        "array",
                        a.name.as_str(),
                        size.as_str(),
                        a.element_type.as_str(),
                        flags.as_str(),
                    ]
                        .into_iter()
                        .chain(a.extra.iter().map(String::as_str)),
                );
            }
            Element::Declare(d) => {
                self.statement(
                    ["#X", "declare"]
                        .into_iter()
                        .chain(d.args.iter().map(String::as_str)),
                );
            }
            Element::Coords(c) => self.coords(c),
            Element::Connect(c) => {
                let fields = [c.source, c.outlet, c.sink, c.inlet].map(|n| n.to_string());
                self.statement(
                    ["#X", "connect"]
                        .into_iter()
                        .chain(fields.iter().map(String::as_str)),
                );
            }
            Element::Opaque(o) => self.statement(o.fields.iter().map(String::as_str)),
            Element::Subpatch(s) => {
                self.canvas(&s.canvas);
                self.elements(&s.elements);
                let mut rest = vec![s.restore.class.clone()];
                rest.extend(s.restore.args.iter().cloned());
                self.placed("restore", s.restore.position, &rest);
            }
        }
    }

    fn atom(&mut self, command: &str, a: &AtomBox) {
        let atom = &a.atom;
        let mut rest = vec![
            atom.width.to_string(),
            format_float(atom.lower),
            format_float(atom.upper),
            atom.label_pos.to_string(),
            atom.label.clone(),
            atom.receive.clone(),
            atom.send.clone(),
        ];
        rest.extend(atom.extra.iter().cloned());
        self.placed(command, a.position, &rest);
    }

    fn coords(&mut self, c: &Coords) {
        let mut fields = vec![
            "#X".to_string(),
            "coords".to_string(),
            format_float(c.x_from),
            format_float(c.y_from),
            format_float(c.x_to),
            format_float(c.y_to),
            c.width.to_string(),
            c.height.to_string(),
            c.graph_on_parent.to_string(),
        ];
        if let Some((mx, my)) = c.margin {
            fields.push(mx.to_string());
            fields.push(my.to_string());
        }
        fields.extend(c.extra.iter().cloned());
        self.statement(fields.iter().map(String::as_str));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::parse;

    const SAMPLE: &str = "#N canvas 0 50 450 300 12;
#X obj 30 27 osc~ 440;
#X obj 30 60 *~ 0.3;
#X obj 30 93 dac~;
#X msg 120 27 \\; pd dsp 1;
#X text 120 60 gain \\, then out;
#X floatatom 200 27 5 0 127 0 - - -;
#X obj 200 60 bng 15 250 50 0 empty empty empty 17 7 0 10 -262144 -1 -1;
#N canvas 0 0 300 180 sub 0;
#X obj 10 10 inlet~;
#X obj 10 40 outlet~;
#X connect 0 0 1 0;
#X coords 0 -1 1 1 85 60 1 0 0;
#X restore 200 93 pd sub;
#X declare -path lib;
#X array tab 4 float 3;
#A 0 0 0.5 1 0.5;
#X obj 10 10;
#X connect 0 0 1 0;
#X connect 1 0 2 0;
#X connect 1 0 2 1;
";

    #[test]
    fn round_trip_is_byte_exact() {
        let patch = parse(SAMPLE).unwrap();
        assert_eq!(serialize(&patch), SAMPLE);
    }

    #[test]
    fn foreign_text_normalizes() {
        let foreign = "#N canvas 0 50 450 300 12;\r\n#X obj 30   27 osc~\n 440;\r\n#X floatatom 1 1 5 0.0 1e+02 0 - - -;";
        let patch = parse(foreign).unwrap();
        let canonical = serialize(&patch);
        assert_eq!(
            canonical,
            "#N canvas 0 50 450 300 12;\n#X obj 30 27 osc~ 440;\n#X floatatom 1 1 5 0 100 0 - - -;\n"
        );
        assert_eq!(parse(&canonical).unwrap(), patch);
    }

    #[test]
    fn empty_message_has_no_trailing_space() {
        let patch = parse("#N canvas 0 50 450 300 12;\n#X msg 10 10;\n").unwrap();
        assert_eq!(serialize(&patch), "#N canvas 0 50 450 300 12;\n#X msg 10 10;\n");
    }
}
