//! Inlet/outlet counts for vanilla objects.
//!
//! [`Graph::add`](crate::Graph::add) looks each new object up here so that
//! [`Graph::link`](crate::Graph::link) can reject out-of-range ports. Classes
//! that are not listed get unknown arity and skip the bound check.
//!
//! Extra classes (discovered abstractions, externals) can be added to an
//! [`ObjectRegistry`] and installed on a graph with
//! [`Graph::set_registry`](crate::Graph::set_registry).

use std::collections::BTreeMap;

/// How many ports of one side an object class has.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ports {
    /// Always this many.
    Fixed(usize),
    /// One per creation argument plus `extra`, or `default` without arguments.
    PerArg {
        /// Ports added on top of the argument count.
        extra: usize,
        /// Count when the object has no arguments.
        default: usize,
    },
    /// Cannot be known statically.
    Variable,
}

impl Ports {
    /// Resolves the count for an object with `arg_count` creation arguments.
    pub fn resolve(self, arg_count: usize) -> Option<usize> {
        match self {
            Self::Fixed(n) => Some(n),
            Self::PerArg { extra, default } => Some(if arg_count == 0 {
                default
            } else {
                arg_count + extra
            }),
            Self::Variable => None,
        }
    }
}

/// Registry entry for one class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObjectSpec {
    /// Class name as typed in a box.
    pub name: &'static str,
    /// Inlet rule.
    pub inlets: Ports,
    /// Outlet rule.
    pub outlets: Ports,
}

const fn fixed(name: &'static str, inlets: usize, outlets: usize) -> ObjectSpec {
    ObjectSpec {
        name,
        inlets: Ports::Fixed(inlets),
        outlets: Ports::Fixed(outlets),
    }
}

const fn spec(name: &'static str, inlets: Ports, outlets: Ports) -> ObjectSpec {
    ObjectSpec {
        name,
        inlets,
        outlets,
    }
}

const PER_ARG: Ports = Ports::PerArg {
    extra: 0,
    default: 2,
};
const PER_ARG_PLUS_REJECT: Ports = Ports::PerArg {
    extra: 1,
    default: 2,
};

/// Built-in vanilla classes.
pub static VANILLA: &[ObjectSpec] = &[
    // audio sources
    fixed("osc~", 2, 1),
    fixed("phasor~", 2, 1),
    fixed("noise~", 0, 1),
    fixed("tabosc4~", 2, 1),
    // audio math
    fixed("+~", 2, 1),
    fixed("-~", 2, 1),
    fixed("*~", 2, 1),
    fixed("/~", 2, 1),
    fixed("clip~", 3, 1),
    fixed("wrap~", 1, 1),
    fixed("abs~", 1, 1),
    fixed("sqrt~", 1, 1),
    // audio filters
    fixed("lop~", 2, 1),
    fixed("hip~", 2, 1),
    fixed("bp~", 3, 1),
    fixed("vcf~", 3, 2),
    // audio i/o
    // one port per channel argument, stereo by default
    spec("dac~", PER_ARG, Ports::Fixed(0)),
    spec("adc~", Ports::Fixed(0), PER_ARG),
    fixed("line~", 1, 1),
    fixed("vline~", 1, 1),
    fixed("env~", 1, 1),
    fixed("threshold~", 2, 2),
    // audio delay
    fixed("delwrite~", 1, 0),
    fixed("delread~", 1, 1),
    fixed("delread4~", 1, 1),
    fixed("vd~", 1, 1),
    // audio tables
    fixed("tabread~", 1, 1),
    fixed("tabread4~", 1, 1),
    fixed("tabwrite~", 2, 0),
    fixed("tabsend~", 1, 0),
    fixed("tabreceive~", 0, 1),
    // control math
    fixed("+", 2, 1),
    fixed("-", 2, 1),
    fixed("*", 2, 1),
    fixed("/", 2, 1),
    fixed("mod", 2, 1),
    fixed("div", 2, 1),
    fixed("pow", 2, 1),
    fixed("abs", 1, 1),
    fixed("sqrt", 1, 1),
    fixed("min", 2, 1),
    fixed("max", 2, 1),
    fixed("random", 2, 1),
    // comparison
    fixed("==", 2, 1),
    fixed("!=", 2, 1),
    fixed(">", 2, 1),
    fixed("<", 2, 1),
    fixed(">=", 2, 1),
    fixed("<=", 2, 1),
    fixed("&&", 2, 1),
    fixed("||", 2, 1),
    // routing
    spec("trigger", Ports::Fixed(1), PER_ARG),
    spec("t", Ports::Fixed(1), PER_ARG),
    spec("pack", PER_ARG, Ports::Fixed(1)),
    spec("unpack", Ports::Fixed(1), PER_ARG),
    spec("route", Ports::Variable, PER_ARG_PLUS_REJECT),
    spec("select", Ports::Variable, PER_ARG_PLUS_REJECT),
    spec("sel", Ports::Variable, PER_ARG_PLUS_REJECT),
    fixed("spigot", 2, 1),
    fixed("swap", 2, 2),
    fixed("moses", 2, 2),
    // time
    fixed("delay", 2, 1),
    fixed("metro", 2, 1),
    fixed("timer", 2, 1),
    spec("pipe", Ports::Variable, Ports::Variable),
    fixed("line", 2, 1),
    // data
    fixed("float", 2, 1),
    fixed("f", 2, 1),
    fixed("int", 2, 1),
    fixed("i", 2, 1),
    fixed("symbol", 2, 1),
    spec("list", Ports::Variable, Ports::Fixed(1)),
    fixed("value", 1, 1),
    fixed("v", 1, 1),
    // send / receive
    fixed("send", 1, 0),
    fixed("s", 1, 0),
    fixed("receive", 0, 1),
    fixed("r", 0, 1),
    fixed("throw~", 1, 0),
    fixed("catch~", 0, 1),
    fixed("send~", 1, 0),
    fixed("s~", 1, 0),
    fixed("receive~", 0, 1),
    fixed("r~", 0, 1),
    // misc
    fixed("bang", 1, 1),
    fixed("loadbang", 0, 1),
    fixed("print", 1, 0),
    fixed("inlet", 0, 1),
    fixed("outlet", 1, 0),
    fixed("inlet~", 0, 1),
    fixed("outlet~", 1, 0),
    fixed("change", 1, 1),
    fixed("stripnote", 2, 2),
    fixed("makenote", 3, 2),
    fixed("tabread", 1, 1),
    fixed("tabwrite", 2, 0),
    // midi
    fixed("notein", 0, 3),
    fixed("noteout", 3, 0),
    fixed("ctlin", 0, 3),
    fixed("ctlout", 3, 0),
    fixed("bendin", 0, 2),
    fixed("bendout", 2, 0),
    fixed("midiin", 0, 2),
    fixed("midiout", 1, 0),
];

/// Looks up a built-in class.
pub fn lookup(class: &str) -> Option<&'static ObjectSpec> {
    VANILLA.iter().find(|spec| spec.name == class)
}

/// Vanilla classes plus caller-supplied entries.
///
/// Extra entries shadow built-ins of the same name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObjectRegistry {
    extra: BTreeMap<String, (Option<usize>, Option<usize>)>,
}

impl ObjectRegistry {
    /// Registry holding only the vanilla classes.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a class with a known or unknown arity.
    pub fn insert(
        &mut self,
        name: impl Into<String>,
        inlets: Option<usize>,
        outlets: Option<usize>,
    ) {
        self.extra.insert(name.into(), (inlets, outlets));
    }

    /// Returns `true` if `class` is built in or was inserted.
    pub fn contains(&self, class: &str) -> bool {
        self.extra.contains_key(class) || lookup(class).is_some()
    }

    /// Returns `true` if `class` was inserted and is not a vanilla class.
    pub fn is_external(&self, class: &str) -> bool {
        self.extra.contains_key(class) && lookup(class).is_none()
    }

    /// Inlet and outlet counts for `class` created with `arg_count` arguments.
    ///
    /// Unknown classes and variable sides yield `None`.
    pub fn arity(&self, class: &str, arg_count: usize) -> (Option<usize>, Option<usize>) {
        if let Some(&arity) = self.extra.get(class) {
            return arity;
        }
        lookup(class).map_or((None, None), |spec| {
            (
                spec.inlets.resolve(arg_count),
                spec.outlets.resolve(arg_count),
            )
        })
    }

    /// Names added on top of the vanilla set.
    pub fn extra_names(&self) -> impl Iterator<Item = &str> {
        self.extra.keys().map(String::as_str)
    }
}

impl<S: Into<String>> Extend<(S, Option<usize>, Option<usize>)> for ObjectRegistry {
    fn extend<I: IntoIterator<Item = (S, Option<usize>, Option<usize>)>>(&mut self, iter: I) {
        for (name, inlets, outlets) in iter {
            self.insert(name, inlets, outlets);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_classes() {
        let registry = ObjectRegistry::new();
        assert_eq!(registry.arity("osc~", 1), (Some(2), Some(1)));
        assert_eq!(registry.arity("dac~", 0), (Some(2), Some(0)));
    }

    #[test]
    fn argument_dependent_classes() {
        let registry = ObjectRegistry::new();
        assert_eq!(registry.arity("t", 0), (Some(1), Some(2)));
        assert_eq!(registry.arity("t", 3), (Some(1), Some(3)));
        assert_eq!(registry.arity("pack", 4), (Some(4), Some(1)));
        assert_eq!(registry.arity("route", 2), (None, Some(3)));
        assert_eq!(registry.arity("dac~", 4), (Some(4), Some(0)));
        assert_eq!(registry.arity("adc~", 1), (Some(0), Some(1)));
    }

    #[test]
    fn unknown_class_has_unknown_arity() {
        let registry = ObjectRegistry::new();
        assert_eq!(registry.arity("freeverb~", 0), (None, None));
        assert!(!registry.contains("freeverb~"));
    }

    #[test]
    fn extra_entries_shadow_builtins() {
        let mut registry = ObjectRegistry::new();
        registry.extend([("osc~", Some(1), Some(1)), ("mylib", None, None)]);
        assert_eq!(registry.arity("osc~", 0), (Some(1), Some(1)));
        assert!(registry.contains("mylib"));
        assert!(registry.is_external("mylib"));
        assert!(!registry.is_external("osc~"));
        assert_eq!(registry.extra_names().collect::<Vec<_>>(), vec!["mylib", "osc~"]);
    }

    #[test]
    fn vanilla_names_are_unique() {
        let mut names: Vec<_> = VANILLA.iter().map(|s| s.name).collect();
        names.sort_unstable();
        let before = names.len();
        names.dedup();
        assert_eq!(before, names.len());
    }
}
