//! Node placement strategies.
//!
//! A graph carries a [`Layout`] that positions each node as it is added.
//! [`FlowLayout`] stacks nodes in rows relative to the previous node;
//! [`GridLayout`] fills fixed-size cells left to right. Nodes added with an
//! explicit position bypass the strategy but still become the anchor for the
//! next relative placement.
//!
//! [`auto_layout`] repositions a finished graph from its connection topology.
//!
//! # Example
//!
//! ```rust
//! use pdkit_core::{FlowLayout, Placement, Position};
//!
//! let mut flow = FlowLayout::default();
//! let first = flow.place(Placement::default(), (50, 25));
//! let below = flow.place(Placement::default(), (50, 25));
//! let beside = flow.place(Placement::same_row(), (50, 25));
//! assert_eq!(first, Position::new(25, 25));
//! assert_eq!(below, Position::new(25, 50));
//! assert_eq!(beside, Position::new(75, 50));
//! ```

mod auto;

pub use auto::{AutoLayoutOptions, AutoLayoutReport, auto_layout};

use crate::ast::Position;

/// Margin from the canvas edge for the first node.
pub const DEFAULT_MARGIN: i32 = 25;
/// Extra vertical space per row step beyond the first.
pub const DEFAULT_ROW_HEIGHT: i32 = 25;
/// Horizontal step per column offset.
pub const DEFAULT_COLUMN_WIDTH: i32 = 50;

/// Relative placement request for a new node.
///
/// `row < 1` continues the current row to the right of the last node;
/// `row >= 1` starts a new row below the current row's first node, with
/// `row - 1` extra row heights of space. `column` shifts right by that many
/// column widths.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    /// Row step.
    pub row: f64,
    /// Column offset.
    pub column: f64,
}

impl Default for Placement {
    fn default() -> Self {
        Self {
            row: 1.0,
            column: 0.0,
        }
    }
}

impl Placement {
    /// Continue the current row.
    pub fn same_row() -> Self {
        Self {
            row: 0.0,
            column: 0.0,
        }
    }

    /// Start a new row, shifted right by `column` column widths.
    pub fn column(column: f64) -> Self {
        Self { row: 1.0, column }
    }
}

/// A placed node remembered as a layout anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Anchor {
    position: Position,
    size: (i32, i32),
}

/// Row-based placement relative to previously added nodes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowLayout {
    /// Margin from the canvas edge for the first node.
    pub margin: i32,
    /// Extra vertical space per row step beyond the first.
    pub row_height: i32,
    /// Horizontal step per column offset.
    pub column_width: i32,
    head: Option<Anchor>,
    tail: Option<Anchor>,
}

impl Default for FlowLayout {
    fn default() -> Self {
        Self::new(DEFAULT_MARGIN, DEFAULT_ROW_HEIGHT, DEFAULT_COLUMN_WIDTH)
    }
}

impl FlowLayout {
    /// Creates a flow layout with no anchors.
    pub fn new(margin: i32, row_height: i32, column_width: i32) -> Self {
        Self {
            margin,
            row_height,
            column_width,
            head: None,
            tail: None,
        }
    }

    /// Position for the next node, without recording it.
    pub fn position(&self, placement: Placement) -> Position {
        let anchor = if placement.row < 1.0 {
            self.tail
        } else {
            self.head
        };
        let Some(anchor) = anchor else {
            return Position::new(self.margin, self.margin);
        };
        let Position { mut x, mut y } = anchor.position;
        let (dx, dy) = anchor.size;
        let mut column = placement.column;
        if placement.row < 1.0 {
            x = x.saturating_add(dx);
            column -= 1.0;
        } else {
            let rows = (f64::from(self.row_height) * (placement.row - 1.0)) as i32;
            y = y.saturating_add(dy).saturating_add(rows);
        }
        x = x.saturating_add(((f64::from(self.column_width) * column) as i32).max(0));
        Position::new(x, y)
    }

    /// Places a node of `size` and records it as the new anchor.
    pub fn place(&mut self, placement: Placement, size: (i32, i32)) -> Position {
        let position = self.position(placement);
        self.register(
            Anchor { position, size },
            placement.row >= 1.0 || placement.column > 0.0,
        );
        position
    }

    /// Records a node placed at an explicit position.
    pub fn observe(&mut self, position: Position, size: (i32, i32)) {
        self.register(Anchor { position, size }, true);
    }

    fn register(&mut self, anchor: Anchor, starts_row: bool) {
        self.tail = Some(anchor);
        if starts_row || self.head.is_none() {
            self.head = Some(anchor);
        }
    }

    /// Forgets all anchors; the next node goes back to the margin.
    pub fn reset(&mut self) {
        self.head = None;
        self.tail = None;
    }
}

/// Fixed-cell placement that wraps after a number of columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridLayout {
    /// Cells per row. Zero behaves as one.
    pub columns: usize,
    /// Cell width in pixels.
    pub cell_width: i32,
    /// Cell height in pixels.
    pub cell_height: i32,
    /// Margin from the canvas edge.
    pub margin: i32,
    count: usize,
}

impl Default for GridLayout {
    fn default() -> Self {
        Self::new(4, 100, 40, DEFAULT_MARGIN)
    }
}

impl GridLayout {
    /// Creates an empty grid.
    pub fn new(columns: usize, cell_width: i32, cell_height: i32, margin: i32) -> Self {
        Self {
            columns,
            cell_width,
            cell_height,
            margin,
            count: 0,
        }
    }

    /// Position of the next free cell.
    pub fn position(&self) -> Position {
        let columns = self.columns.max(1);
        let column = (self.count % columns) as i32;
        let row = (self.count / columns) as i32;
        Position::new(
            self.margin + column * self.cell_width,
            self.margin + row * self.cell_height,
        )
    }

    /// Takes the next cell.
    pub fn place(&mut self) -> Position {
        let position = self.position();
        self.count += 1;
        position
    }

    /// Number of cells taken so far.
    pub fn count(&self) -> usize {
        self.count
    }

    /// Starts again from the first cell.
    pub fn reset(&mut self) {
        self.count = 0;
    }
}

/// Placement strategy owned by a graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Layout {
    /// Relative row placement.
    Flow(FlowLayout),
    /// Fixed grid.
    Grid(GridLayout),
}

impl Default for Layout {
    fn default() -> Self {
        Self::Flow(FlowLayout::default())
    }
}

impl Layout {
    /// Places a node of `size`. Grid layout ignores `placement` and `size`.
    pub fn place(&mut self, placement: Placement, size: (i32, i32)) -> Position {
        match self {
            Self::Flow(flow) => flow.place(placement, size),
            Self::Grid(grid) => grid.place(),
        }
    }

    /// Records a node placed at an explicit position.
    ///
    /// Explicit positions never consume a grid cell.
    pub fn observe(&mut self, position: Position, size: (i32, i32)) {
        if let Self::Flow(flow) = self {
            flow.observe(position, size);
        }
    }

    /// Clears placement state. Called after nodes are removed, since anchors
    /// may refer to them.
    pub fn reset(&mut self) {
        match self {
            Self::Flow(flow) => flow.reset(),
            Self::Grid(grid) => grid.reset(),
        }
    }
}

impl From<FlowLayout> for Layout {
    fn from(flow: FlowLayout) -> Self {
        Self::Flow(flow)
    }
}

impl From<GridLayout> for Layout {
    fn from(grid: GridLayout) -> Self {
        Self::Grid(grid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flow_first_node_at_margin() {
        let mut flow = FlowLayout::default();
        assert_eq!(
            flow.place(Placement::default(), (60, 25)),
            Position::new(25, 25)
        );
    }

    #[test]
    fn flow_new_rows_stack_under_row_head() {
        let mut flow = FlowLayout::default();
        flow.place(Placement::default(), (60, 25));
        flow.place(Placement::same_row(), (80, 25));
        // next row anchors on the row head, not the tail
        let next = flow.place(Placement::default(), (60, 25));
        assert_eq!(next, Position::new(25, 50));
    }

    #[test]
    fn flow_extra_row_space_and_columns() {
        let mut flow = FlowLayout::default();
        flow.place(Placement::default(), (60, 25));
        let spaced = flow.place(
            Placement {
                row: 2.0,
                column: 0.0,
            },
            (60, 25),
        );
        assert_eq!(spaced, Position::new(25, 75));
        let shifted = flow.place(Placement::column(2.0), (60, 25));
        assert_eq!(shifted, Position::new(125, 100));
    }

    #[test]
    fn flow_same_row_with_column_offset() {
        let mut flow = FlowLayout::default();
        flow.place(Placement::default(), (60, 25));
        let gap = flow.place(
            Placement {
                row: 0.0,
                column: 2.0,
            },
            (60, 25),
        );
        // right of the tail, one column width of gap
        assert_eq!(gap, Position::new(25 + 60 + 50, 25));
    }

    #[test]
    fn flow_observe_moves_anchor() {
        let mut flow = FlowLayout::default();
        flow.place(Placement::default(), (60, 25));
        flow.observe(Position::new(300, 300), (50, 20));
        assert_eq!(flow.position(Placement::default()), Position::new(300, 320));
        flow.reset();
        assert_eq!(flow.position(Placement::default()), Position::new(25, 25));
    }

    #[test]
    fn grid_wraps_after_columns() {
        let mut layout = Layout::Grid(GridLayout::new(2, 100, 40, 10));
        let cells: Vec<_> = (0..3)
            .map(|_| layout.place(Placement::default(), (0, 0)))
            .collect();
        assert_eq!(
            cells,
            vec![
                Position::new(10, 10),
                Position::new(110, 10),
                Position::new(10, 50),
            ]
        );
        layout.observe(Position::new(500, 500), (0, 0));
        assert_eq!(layout.place(Placement::default(), (0, 0)), Position::new(110, 50));
    }

    #[test]
    fn grid_zero_columns_is_single_column() {
        let mut grid = GridLayout::new(0, 100, 40, 0);
        grid.place();
        assert_eq!(grid.place(), Position::new(0, 40));
    }
}
