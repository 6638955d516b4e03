//! Typed parameter records for the IEM GUI objects.
//!
//! In patch text these are ordinary `#X obj` statements whose class is one of
//! `bng`, `tgl`, `nbx`, `vsl`, `hsl`, `vradio`, `hradio`, `cnv` or `vu` and whose
//! argument list has that class's exact length. Anything else stays a generic
//! object, so an unexpected field layout never loses data.
//!
//! Colours are kept as raw fields: older patches use packed negative integers,
//! newer ones `#rrggbb` strings.

use crate::codec::{escape_symbol, format_float};

/// Send/receive values that mean "not connected".
pub const INACTIVE_NAMES: [&str; 3] = ["empty", "-", ""];

/// Returns `true` if `name` is a real send or receive symbol.
pub fn is_active_name(name: &str) -> bool {
    !INACTIVE_NAMES.contains(&name)
}

// ---------------------------------------------------------------------------
// Shared records
// ---------------------------------------------------------------------------

/// Label text plus placement, shared by every IEM widget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IemLabel {
    /// Label symbol, `empty` for none.
    pub text: String,
    /// Horizontal offset from the widget origin.
    pub x_offset: i32,
    /// Vertical offset from the widget origin.
    pub y_offset: i32,
    /// Font index.
    pub font: i32,
    /// Font size in points.
    pub font_size: i32,
}

impl IemLabel {
    fn new(x_offset: i32, y_offset: i32, font_size: i32) -> Self {
        Self {
            text: "empty".to_string(),
            x_offset,
            y_offset,
            font: 0,
            font_size,
        }
    }
}

/// `bng` parameters. Fields follow the argument order in patch text.
#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq)]
pub struct Bang {
    pub size: i32,
    pub hold: i32,
    pub interrupt: i32,
    pub init: i32,
    pub send: String,
    pub receive: String,
    pub label: IemLabel,
    pub background: String,
    pub foreground: String,
    pub label_color: String,
}

/// `tgl` parameters.
#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq)]
pub struct Toggle {
    pub size: i32,
    pub init: i32,
    pub send: String,
    pub receive: String,
    pub label: IemLabel,
    pub background: String,
    pub foreground: String,
    pub label_color: String,
    pub value: f64,
    pub nonzero: f64,
}

/// `nbx` parameters.
#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq)]
pub struct NumberBox {
    pub digits: i32,
    pub height: i32,
    pub min: f64,
    pub max: f64,
    pub log: i32,
    pub init: i32,
    pub send: String,
    pub receive: String,
    pub label: IemLabel,
    pub background: String,
    pub foreground: String,
    pub label_color: String,
    pub value: f64,
    pub log_height: i32,
}

/// `vsl` and `hsl` parameters.
#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq)]
pub struct Slider {
    pub width: i32,
    pub height: i32,
    pub min: f64,
    pub max: f64,
    pub log: i32,
    pub init: i32,
    pub send: String,
    pub receive: String,
    pub label: IemLabel,
    pub background: String,
    pub foreground: String,
    pub label_color: String,
    pub value: f64,
    pub steady: i32,
}

/// `vradio` and `hradio` parameters.
#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq)]
pub struct Radio {
    pub size: i32,
    pub new_old: i32,
    pub init: i32,
    pub number: i32,
    pub send: String,
    pub receive: String,
    pub label: IemLabel,
    pub background: String,
    pub foreground: String,
    pub label_color: String,
    pub value: f64,
}

/// `cnv` parameters.
#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq)]
pub struct Canvas {
    pub selectable: i32,
    pub width: i32,
    pub height: i32,
    pub send: String,
    pub receive: String,
    pub label: IemLabel,
    pub background: String,
    pub label_color: String,
}

/// `vu` parameters.
#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq)]
pub struct Meter {
    pub width: i32,
    pub height: i32,
    pub receive: String,
    pub label: IemLabel,
    pub background: String,
    pub label_color: String,
    pub scale: i32,
}

const BG: &str = "-262144";
const FG: &str = "-1";

impl Default for Bang {
    fn default() -> Self {
        Self {
            size: 15,
            hold: 250,
            interrupt: 50,
            init: 0,
            send: "empty".to_string(),
            receive: "empty".to_string(),
            label: IemLabel::new(17, 7, 10),
            background: BG.to_string(),
            foreground: FG.to_string(),
            label_color: FG.to_string(),
        }
    }
}

impl Default for Toggle {
    fn default() -> Self {
        Self {
            size: 15,
            init: 0,
            send: "empty".to_string(),
            receive: "empty".to_string(),
            label: IemLabel::new(17, 7, 10),
            background: BG.to_string(),
            foreground: FG.to_string(),
            label_color: FG.to_string(),
            value: 0.0,
            nonzero: 1.0,
        }
    }
}

impl Default for NumberBox {
    fn default() -> Self {
        Self {
            digits: 5,
            height: 14,
            min: -1e37,
            max: 1e37,
            log: 0,
            init: 0,
            send: "empty".to_string(),
            receive: "empty".to_string(),
            label: IemLabel::new(0, -8, 10),
            background: BG.to_string(),
            foreground: FG.to_string(),
            label_color: FG.to_string(),
            value: 0.0,
            log_height: 256,
        }
    }
}

impl Slider {
    /// Default vertical slider.
    pub fn vertical() -> Self {
        Self::with_shape(15, 128, IemLabel::new(0, -9, 10))
    }

    /// Default horizontal slider.
    pub fn horizontal() -> Self {
        Self::with_shape(128, 15, IemLabel::new(-2, -8, 10))
    }

    fn with_shape(width: i32, height: i32, label: IemLabel) -> Self {
        Self {
            width,
            height,
            min: 0.0,
            max: 127.0,
            log: 0,
            init: 0,
            send: "empty".to_string(),
            receive: "empty".to_string(),
            label,
            background: BG.to_string(),
            foreground: FG.to_string(),
            label_color: FG.to_string(),
            value: 0.0,
            steady: 1,
        }
    }
}

impl Default for Radio {
    fn default() -> Self {
        Self {
            size: 15,
            new_old: 1,
            init: 0,
            number: 8,
            send: "empty".to_string(),
            receive: "empty".to_string(),
            label: IemLabel::new(0, -8, 10),
            background: BG.to_string(),
            foreground: FG.to_string(),
            label_color: FG.to_string(),
            value: 0.0,
        }
    }
}

impl Default for Canvas {
    fn default() -> Self {
        Self {
            selectable: 15,
            width: 100,
            height: 60,
            send: "empty".to_string(),
            receive: "empty".to_string(),
            label: IemLabel::new(20, 12, 14),
            background: "-233017".to_string(),
            label_color: "-66577".to_string(),
        }
    }
}

impl Default for Meter {
    fn default() -> Self {
        Self {
            width: 15,
            height: 120,
            receive: "empty".to_string(),
            label: IemLabel::new(-1, -8, 10),
            background: "-66577".to_string(),
            label_color: FG.to_string(),
            scale: 1,
        }
    }
}

// ---------------------------------------------------------------------------
// Widget enum
// ---------------------------------------------------------------------------

/// One of the nine IEM GUI objects with its full parameter set.
#[derive(Debug, Clone, PartialEq)]
pub enum Widget {
    /// Bang button.
    Bng(Bang),
    /// Toggle.
    Tgl(Toggle),
    /// Number box.
    Nbx(NumberBox),
    /// Vertical slider.
    Vsl(Slider),
    /// Horizontal slider.
    Hsl(Slider),
    /// Vertical radio group.
    Vradio(Radio),
    /// Horizontal radio group.
    Hradio(Radio),
    /// Decorative canvas.
    Cnv(Canvas),
    /// VU meter.
    Vu(Meter),
}

impl Widget {
    /// Object class written in the patch.
    pub fn class_name(&self) -> &'static str {
        match self {
            Self::Bng(_) => "bng",
            Self::Tgl(_) => "tgl",
            Self::Nbx(_) => "nbx",
            Self::Vsl(_) => "vsl",
            Self::Hsl(_) => "hsl",
            Self::Vradio(_) => "vradio",
            Self::Hradio(_) => "hradio",
            Self::Cnv(_) => "cnv",
            Self::Vu(_) => "vu",
        }
    }

    /// Send symbol, if the widget has one.
    pub fn send(&self) -> Option<&str> {
        match self {
            Self::Bng(w) => Some(&w.send),
            Self::Tgl(w) => Some(&w.send),
            Self::Nbx(w) => Some(&w.send),
            Self::Vsl(w) | Self::Hsl(w) => Some(&w.send),
            Self::Vradio(w) | Self::Hradio(w) => Some(&w.send),
            Self::Cnv(w) => Some(&w.send),
            Self::Vu(_) => None,
        }
    }

    /// Receive symbol.
    pub fn receive(&self) -> &str {
        match self {
            Self::Bng(w) => &w.receive,
            Self::Tgl(w) => &w.receive,
            Self::Nbx(w) => &w.receive,
            Self::Vsl(w) | Self::Hsl(w) => &w.receive,
            Self::Vradio(w) | Self::Hradio(w) => &w.receive,
            Self::Cnv(w) => &w.receive,
            Self::Vu(w) => &w.receive,
        }
    }

    fn names_mut(&mut self) -> (Option<&mut String>, &mut String) {
        match self {
            Self::Bng(w) => (Some(&mut w.send), &mut w.receive),
            Self::Tgl(w) => (Some(&mut w.send), &mut w.receive),
            Self::Nbx(w) => (Some(&mut w.send), &mut w.receive),
            Self::Vsl(w) | Self::Hsl(w) => (Some(&mut w.send), &mut w.receive),
            Self::Vradio(w) | Self::Hradio(w) => (Some(&mut w.send), &mut w.receive),
            Self::Cnv(w) => (Some(&mut w.send), &mut w.receive),
            Self::Vu(w) => (None, &mut w.receive),
        }
    }

    fn label_mut(&mut self) -> &mut IemLabel {
        match self {
            Self::Bng(w) => &mut w.label,
            Self::Tgl(w) => &mut w.label,
            Self::Nbx(w) => &mut w.label,
            Self::Vsl(w) | Self::Hsl(w) => &mut w.label,
            Self::Vradio(w) | Self::Hradio(w) => &mut w.label,
            Self::Cnv(w) => &mut w.label,
            Self::Vu(w) => &mut w.label,
        }
    }

    /// Treats send, receive and label as display text and escapes each into
    /// a single field. Empty strings become `empty`.
    pub fn escaped(mut self) -> Self {
        let (send, receive) = self.names_mut();
        if let Some(send) = send {
            *send = escape_symbol(send, "empty");
        }
        *receive = escape_symbol(receive, "empty");
        let label = self.label_mut();
        label.text = escape_symbol(&label.text, "empty");
        self
    }

    /// Replaces send and receive symbols equal to `old` with `new`.
    ///
    /// Returns `true` if anything changed.
    pub fn rename(&mut self, old: &str, new: &str) -> bool {
        let (send, receive) = self.names_mut();
        let mut changed = false;
        if let Some(send) = send.filter(|s| s.as_str() == old) {
            *send = new.to_string();
            changed = true;
        }
        if receive == old {
            *receive = new.to_string();
            changed = true;
        }
        changed
    }

    /// Returns `true` if a send or receive symbol is set.
    pub fn has_active_names(&self) -> bool {
        self.send().is_some_and(is_active_name) || is_active_name(self.receive())
    }

    /// Visible inlet and outlet counts.
    ///
    /// Pd hides an IEM widget's inlet when it has a receive symbol and its
    /// outlet when it has a send symbol.
    pub fn arity(&self) -> (usize, usize) {
        match self {
            Self::Vu(_) => (2, 2),
            Self::Cnv(_) => (0, 0),
            _ => {
                let inlets = usize::from(!is_active_name(self.receive()));
                let outlets = usize::from(!self.send().is_some_and(is_active_name));
                (inlets, outlets)
            }
        }
    }

    /// On-canvas box size in pixels.
    pub fn size(&self) -> (i32, i32) {
        match self {
            Self::Bng(w) => (w.size, w.size),
            Self::Tgl(w) => (w.size, w.size),
            Self::Nbx(w) => (w.digits.saturating_mul(6).saturating_add(w.height), w.height),
            Self::Vsl(w) | Self::Hsl(w) => (w.width, w.height),
            Self::Vradio(w) => (w.size, w.size.saturating_mul(w.number)),
            Self::Hradio(w) => (w.size.saturating_mul(w.number), w.size),
            Self::Cnv(w) => (w.width, w.height),
            Self::Vu(w) => (w.width, w.height),
        }
    }

    /// Decodes a widget from an object's class and arguments.
    ///
    /// Returns `None` when the class is not an IEM widget, the argument count
    /// differs from the canonical layout, a numeric field does not parse, or a
    /// number is spelled non-canonically (`15.0`, `1e+37`).
    pub fn from_args(class: &str, args: &[String]) -> Option<Self> {
        let mut f = Fields(args.iter());
        let widget = match (class, args.len()) {
            ("bng", 14) => Self::Bng(Bang {
                size: f.int()?,
                hold: f.int()?,
                interrupt: f.int()?,
                init: f.int()?,
                send: f.text()?,
                receive: f.text()?,
                label: f.label()?,
                background: f.text()?,
                foreground: f.text()?,
                label_color: f.text()?,
            }),
            ("tgl", 14) => Self::Tgl(Toggle {
                size: f.int()?,
                init: f.int()?,
                send: f.text()?,
                receive: f.text()?,
                label: f.label()?,
                background: f.text()?,
                foreground: f.text()?,
                label_color: f.text()?,
                value: f.float()?,
                nonzero: f.float()?,
            }),
            ("nbx", 18) => Self::Nbx(NumberBox {
                digits: f.int()?,
                height: f.int()?,
                min: f.float()?,
                max: f.float()?,
                log: f.int()?,
                init: f.int()?,
                send: f.text()?,
                receive: f.text()?,
                label: f.label()?,
                background: f.text()?,
                foreground: f.text()?,
                label_color: f.text()?,
                value: f.float()?,
                log_height: f.int()?,
            }),
            ("vsl", 18) => Self::Vsl(f.slider()?),
            ("hsl", 18) => Self::Hsl(f.slider()?),
            ("vradio", 15) => Self::Vradio(f.radio()?),
            ("hradio", 15) => Self::Hradio(f.radio()?),
            ("cnv", 13) => {
                let canvas = Canvas {
                    selectable: f.int()?,
                    width: f.int()?,
                    height: f.int()?,
                    send: f.text()?,
                    receive: f.text()?,
                    label: f.label()?,
                    background: f.text()?,
                    label_color: f.text()?,
                };
                f.literal_zero()?;
                Self::Cnv(canvas)
            }
            ("vu", 12) => {
                let meter = Meter {
                    width: f.int()?,
                    height: f.int()?,
                    receive: f.text()?,
                    label: f.label()?,
                    background: f.text()?,
                    label_color: f.text()?,
                    scale: f.int()?,
                };
                f.literal_zero()?;
                Self::Vu(meter)
            }
            _ => return None,
        };
        // Only canonical spellings are typed, so re-encoding is lossless.
        (widget.args() == args).then_some(widget)
    }

    /// Encodes the widget's arguments in canonical field order.
    pub fn args(&self) -> Vec<String> {
        let mut a = Args::default();
        match self {
            Self::Bng(w) => {
                a.int(w.size).int(w.hold).int(w.interrupt).int(w.init);
                a.text(&w.send).text(&w.receive).label(&w.label);
                a.text(&w.background).text(&w.foreground).text(&w.label_color);
            }
            Self::Tgl(w) => {
                a.int(w.size).int(w.init);
                a.text(&w.send).text(&w.receive).label(&w.label);
                a.text(&w.background).text(&w.foreground).text(&w.label_color);
                a.float(w.value).float(w.nonzero);
            }
            Self::Nbx(w) => {
                a.int(w.digits).int(w.height).float(w.min).float(w.max);
                a.int(w.log).int(w.init);
                a.text(&w.send).text(&w.receive).label(&w.label);
                a.text(&w.background).text(&w.foreground).text(&w.label_color);
                a.float(w.value).int(w.log_height);
            }
            Self::Vsl(w) | Self::Hsl(w) => {
                a.int(w.width).int(w.height).float(w.min).float(w.max);
                a.int(w.log).int(w.init);
                a.text(&w.send).text(&w.receive).label(&w.label);
                a.text(&w.background).text(&w.foreground).text(&w.label_color);
                a.float(w.value).int(w.steady);
            }
            Self::Vradio(w) | Self::Hradio(w) => {
                a.int(w.size).int(w.new_old).int(w.init).int(w.number);
                a.text(&w.send).text(&w.receive).label(&w.label);
                a.text(&w.background).text(&w.foreground).text(&w.label_color);
                a.float(w.value);
            }
            Self::Cnv(w) => {
                a.int(w.selectable).int(w.width).int(w.height);
                a.text(&w.send).text(&w.receive).label(&w.label);
                a.text(&w.background).text(&w.label_color).int(0);
            }
            Self::Vu(w) => {
                a.int(w.width).int(w.height);
                a.text(&w.receive).label(&w.label);
                a.text(&w.background).text(&w.label_color).int(w.scale).int(0);
            }
        }
        a.0
    }
}

// ---------------------------------------------------------------------------
// Field cursor / builder
// ---------------------------------------------------------------------------

struct Fields<'a>(std::slice::Iter<'a, String>);

impl Fields<'_> {
    fn text(&mut self) -> Option<String> {
        self.0.next().cloned()
    }

    fn int(&mut self) -> Option<i32> {
        self.0.next()?.parse().ok()
    }

    fn float(&mut self) -> Option<f64> {
        self.0.next()?.parse().ok()
    }

    fn literal_zero(&mut self) -> Option<()> {
        (self.0.next()? == "0").then_some(())
    }

    fn label(&mut self) -> Option<IemLabel> {
        Some(IemLabel {
            text: self.text()?,
            x_offset: self.int()?,
            y_offset: self.int()?,
            font: self.int()?,
            font_size: self.int()?,
        })
    }

    fn slider(&mut self) -> Option<Slider> {
        Some(Slider {
            width: self.int()?,
            height: self.int()?,
            min: self.float()?,
            max: self.float()?,
            log: self.int()?,
            init: self.int()?,
            send: self.text()?,
            receive: self.text()?,
            label: self.label()?,
            background: self.text()?,
            foreground: self.text()?,
            label_color: self.text()?,
            value: self.float()?,
            steady: self.int()?,
        })
    }

    fn radio(&mut self) -> Option<Radio> {
        Some(Radio {
            size: self.int()?,
            new_old: self.int()?,
            init: self.int()?,
            number: self.int()?,
            send: self.text()?,
            receive: self.text()?,
            label: self.label()?,
            background: self.text()?,
            foreground: self.text()?,
            label_color: self.text()?,
            value: self.float()?,
        })
    }
}

#[derive(Default)]
struct Args(Vec<String>);

impl Args {
    fn int(&mut self, value: i32) -> &mut Self {
        self.0.push(value.to_string());
        self
    }

    fn float(&mut self, value: f64) -> &mut Self {
        self.0.push(format_float(value));
        self
    }

    fn text(&mut self, value: &str) -> &mut Self {
        self.0.push(value.to_string());
        self
    }

    fn label(&mut self, label: &IemLabel) -> &mut Self {
        self.text(&label.text)
            .int(label.x_offset)
            .int(label.y_offset)
            .int(label.font)
            .int(label.font_size)
    }
}
