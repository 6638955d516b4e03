//! Read-only queries and whole-tree rewrites.

use super::{Element, INLET_CLASSES, OUTLET_CLASSES, Patch};

/// Object classes whose first argument is a send or receive symbol.
pub const SEND_RECEIVE_CLASSES: [&str; 10] = [
    "send", "s", "receive", "r", "send~", "s~", "receive~", "r~", "throw~", "catch~",
];

/// Lazy pre-order search over a tree, see [`Patch::find`].
#[derive(Clone)]
pub struct Find<'a, P> {
    stack: Vec<std::slice::Iter<'a, Element>>,
    predicate: P,
}

impl<'a, P> Find<'a, P> {
    pub(super) fn new(elements: &'a [Element], predicate: P) -> Self {
        Self {
            stack: vec![elements.iter()],
            predicate,
        }
    }
}

impl<'a, P> Iterator for Find<'a, P>
where
    P: Fn(&Element) -> bool,
{
    type Item = &'a Element;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let level = self.stack.last_mut()?;
            let Some(element) = level.next() else {
                self.stack.pop();
                continue;
            };
            if let Element::Subpatch(sub) = element {
                self.stack.push(sub.elements.iter());
            }
            if (self.predicate)(element) {
                return Some(element);
            }
        }
    }
}

/// Counts top-level boundary objects: `(inlets, outlets)`.
///
/// This is the arity a canvas shows when embedded as a subpatch or loaded as
/// an abstraction.
pub fn infer_arity(elements: &[Element]) -> (usize, usize) {
    let mut inlets = 0;
    let mut outlets = 0;
    for element in elements {
        if let Element::Obj(obj) = element {
            if INLET_CLASSES.contains(&obj.class.as_str()) {
                inlets += 1;
            } else if OUTLET_CLASSES.contains(&obj.class.as_str()) {
                outlets += 1;
            }
        }
    }
    (inlets, outlets)
}

impl Patch {
    /// Every `-path` value from declare statements, depth-first in file order.
    pub fn declare_paths(&self) -> Vec<&str> {
        self.find(|e| matches!(e, Element::Declare(_)))
            .filter_map(|e| match e {
                Element::Declare(d) => Some(d),
                _ => None,
            })
            .flat_map(|d| d.paths())
            .collect()
    }

    /// Renames a send/receive symbol everywhere in the tree.
    ///
    /// Covers atom boxes, IEM widgets, and the first argument of the
    /// send/receive family of objects. Names are compared in escaped form.
    pub fn rename_send_receive(&self, old: &str, new: &str) -> Patch {
        self.transform(|element| {
            Some(match element {
                Element::FloatAtom(mut a) => {
                    rename_atom(&mut a.atom, old, new);
                    Element::FloatAtom(a)
                }
                Element::SymbolAtom(mut a) => {
                    rename_atom(&mut a.atom, old, new);
                    Element::SymbolAtom(a)
                }
                Element::Gui(mut g) => {
                    g.widget.rename(old, new);
                    Element::Gui(g)
                }
                Element::Obj(mut o) => {
                    if SEND_RECEIVE_CLASSES.contains(&o.class.as_str())
                        && o.args.first().is_some_and(|a| a == old)
                    {
                        o.args[0] = new.to_string();
                    }
                    Element::Obj(o)
                }
                other => other,
            })
        })
    }
}

fn rename_atom(atom: &mut super::Atom, old: &str, new: &str) {
    if atom.send == old {
        atom.send = new.to_string();
    }
    if atom.receive == old {
        atom.receive = new.to_string();
    }
}

#[cfg(test)]
mod tests {
    use crate::codec::parse;

    const NESTED: &str = "#N canvas 0 50 450 300 12;
#X declare -path lib -stdpath x -path abs;
#X obj 10 10 r volume;
#X floatatom 10 40 5 0 0 0 - volume -;
#N canvas 0 0 300 180 inner 0;
#X declare -path deep;
#X obj 10 10 s volume;
#X obj 10 40 hsl 128 15 0 127 0 0 volume empty empty -2 -8 0 10 -262144 -1 -1 0 1;
#X restore 100 100 pd inner;
";

    #[test]
    fn declare_paths_depth_first() {
        let patch = parse(NESTED).unwrap();
        assert_eq!(patch.declare_paths(), vec!["lib", "abs", "deep"]);
    }

    #[test]
    fn rename_reaches_every_kind() {
        let patch = parse(NESTED).unwrap();
        let renamed = patch.rename_send_receive("volume", "gain");
        let text = crate::codec::serialize(&renamed);
        assert!(!text.contains("volume"), "{text}");
        assert_eq!(text.matches("gain").count(), 4);
    }

    #[test]
    fn infer_arity_counts_top_level_only() {
        let patch = parse(
            "#N canvas 0 50 450 300 12;
#X obj 0 0 inlet;
#X obj 0 0 inlet~;
#X obj 0 0 outlet~;
#N canvas 0 0 300 180 sub 0;
#X obj 0 0 outlet;
#X restore 0 0 pd sub;
",
        )
        .unwrap();
        assert_eq!(patch.infer_arity(), (2, 1));
    }
}
