//! Spans (the units Tab moves between) and the solver's cursor.

use tracing::{debug, trace};

use crate::Axis::{self, Across, Down, NoDirection, ZAxis};
use crate::Puzzle;
use crate::clues::{ClueIdx, ClueTable};
use crate::grid::{Grid, Link, Pos};

/// A run of cells that the cursor can jump between as one unit: a clue's
/// own light, or a stretch of diagramless cells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span {
  pub axis: Axis,
  pub cells: Vec<Pos>,
  /// The clue whose light this is. None for diagramless runs.
  pub clue: Option<ClueIdx>,
  /// Index of the following span in navigation order, wrapping around.
  pub next: usize,
  /// Index of the preceding span in navigation order, wrapping around.
  pub prev: usize,
}

/// Runs of enterable cells along `axis` that contain a diagramless cell.
fn dgmless_runs(grid: &Grid, axis: Axis) -> Vec<Vec<Pos>> {
  let step = |pos: Pos, forward: bool| {
    grid
      .neighbor(pos, axis, forward)
      .filter(|&next| grid.get(next).is_enterable() && !grid.barred(pos, axis, forward))
  };
  let mut runs = vec![];
  for pos in grid.positions() {
    if !grid.get(pos).is_enterable() || step(pos, false).is_some() {
      continue;
    }
    let mut run = vec![pos];
    let mut at = pos;
    while let Some(next) = step(at, true) {
      run.push(next);
      at = next;
    }
    if run.len() > 1 && run.iter().any(|&p| grid.get(p).is_dgmless) {
      runs.push(run);
    }
  }
  runs
}

fn same_cells(a: &[Pos], b: &[Pos]) -> bool {
  let mut a = a.to_vec();
  let mut b = b.to_vec();
  a.sort_unstable();
  b.sort_unstable();
  a == b
}

/// Builds the spans in navigation order and records them on the cells.
/// Diagramless runs get spans (and typing links) of their own, taking over
/// any clue lights that lie inside them.
pub(crate) fn build_spans(grid: &mut Grid, table: &ClueTable) -> Vec<Span> {
  let mut spans = table
    .iter()
    .filter(|(_, clue)| !clue.cells.is_empty())
    .map(|(idx, clue)| Span {
      axis: clue.axis,
      cells: clue.cells.clone(),
      clue: Some(idx),
      next: 0,
      prev: 0,
    })
    .collect::<Vec<_>>();

  for &axis in Axis::grid_axes(grid.is_3d()) {
    for run in dgmless_runs(grid, axis) {
      if spans.iter().any(|s| s.axis == axis && same_cells(&s.cells, &run)) {
        continue;
      }
      spans.retain(|s| s.axis != axis || !s.cells.iter().all(|p| run.contains(p)));
      for pair in run.windows(2) {
        let (from, to) = (pair[0], pair[1]);
        grid.get_mut(from).succ[axis].get_or_insert(Link { pos: to, axis });
        grid.get_mut(to).pred[axis].get_or_insert(Link { pos: from, axis });
      }
      trace!(?axis, len = run.len(), "diagramless run");
      spans.push(Span {
        axis,
        cells: run,
        clue: None,
        next: 0,
        prev: 0,
      });
    }
  }

  spans.sort_by_key(|span| {
    let entry = span.cells[0];
    (span.axis, grid.row_key(entry), entry.1)
  });
  let n = spans.len();
  for (i, span) in spans.iter_mut().enumerate() {
    span.next = (i + 1) % n;
    span.prev = (i + n - 1) % n;
  }
  for (i, span) in spans.iter().enumerate() {
    for &pos in &span.cells {
      grid.get_mut(pos).spans[span.axis].get_or_insert(i);
    }
  }
  debug!(spans = n, "built navigation spans");
  spans
}

/// Represents the position of the solver's currently-highlighted square, and
/// the [Axis] of the entry they are currently filling in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor {
  /// The position of the currently-highlighted square.
  pub pos: Pos,
  /// The current axis.
  pub axis: Axis,
}

impl Cursor {
  /// A cursor at the start of the first span, if the puzzle has any.
  pub fn from_puzzle(puzzle: &Puzzle) -> Option<Self> {
    let span = puzzle.spans().first()?;
    Some(Self {
      pos: span.cells[0],
      axis: span.axis,
    })
  }

  /// The span under the cursor.
  pub fn span<'p>(&self, puzzle: &'p Puzzle) -> Option<&'p Span> {
    puzzle.span_at(self.pos, self.axis)
  }

  /// The clue whose text should be shown for the cursor.
  pub fn clue(&self, puzzle: &Puzzle) -> Option<ClueIdx> {
    puzzle
      .clue_at(self.pos, self.axis)
      .map(|idx| puzzle.owning_clue(idx))
  }

  /// Keeps the axis if the cell has a span along it; otherwise picks the
  /// first axis that does.
  fn adjust_axis(&mut self, puzzle: &Puzzle) {
    if puzzle.span_at(self.pos, self.axis).is_some() {
      return;
    }
    if let Some(axis) = [Across, Down, ZAxis, NoDirection]
      .into_iter()
      .find(|&axis| puzzle.span_at(self.pos, axis).is_some())
    {
      self.axis = axis;
    }
  }

  /// Switches to the next axis that has a span at the current cell.
  pub fn toggle_axis(&mut self, puzzle: &Puzzle) {
    let axes = [Across, Down, ZAxis, NoDirection];
    let start = axes.iter().position(|&a| a == self.axis).unwrap_or(0);
    for k in 1..axes.len() {
      let axis = axes[(start + k) % axes.len()];
      if puzzle.span_at(self.pos, axis).is_some() {
        self.axis = axis;
        return;
      }
    }
  }

  fn follow(&mut self, link: Option<Link>) {
    if let Some(link) = link {
      self.pos = link.pos;
      self.axis = link.axis;
    }
  }

  /// Moves to where typing continues after the current cell.
  pub fn advance(&mut self, puzzle: &Puzzle) {
    self.follow(puzzle.next_cell(self.pos, self.axis));
  }

  /// Moves back one cell along the entry, if possible.
  pub fn backup(&mut self, puzzle: &Puzzle) {
    self.follow(puzzle.prev_cell(self.pos, self.axis));
  }

  /// Moves the cursor to the start of the next span.
  pub fn advance_to_next_word(&mut self, puzzle: &Puzzle) {
    if let Some(span) = puzzle.next_span(self.pos, self.axis) {
      self.pos = span.cells[0];
      self.axis = span.axis;
    }
  }

  /// Moves the cursor to the start of the previous span.
  pub fn back_to_previous_word(&mut self, puzzle: &Puzzle) {
    if let Some(span) = puzzle.prev_span(self.pos, self.axis) {
      self.pos = span.cells[0];
      self.axis = span.axis;
    }
  }

  /// Moves the cursor to the next empty square starting from the current one,
  /// in the current span, wrapping around to its start.
  ///
  /// If there are no empty squares anywhere in the span, advances to the start
  /// of the next one.
  pub fn move_to_next_empty_in_current_word(&mut self, puzzle: &Puzzle) {
    if puzzle.cell(self.pos).curr_letter.is_none() {
      return;
    }
    let Some(span) = self.span(puzzle) else {
      return;
    };
    let n = span.cells.len();
    let at = span.cells.iter().position(|&p| p == self.pos).unwrap_or(0);
    if let Some(&pos) = (1..n)
      .map(|k| &span.cells[(at + k) % n])
      .find(|&&p| puzzle.cell(p).curr_letter.is_none())
    {
      self.pos = pos;
      return;
    }
    self.advance_to_next_word(puzzle);
  }

  /// Moves to the nearest enterable cell along `axis` on the grid, skipping
  /// blocks, as the arrow keys do.
  pub fn step(&mut self, puzzle: &Puzzle, axis: Axis, forward: bool) {
    let grid = puzzle.grid();
    let mut pos = self.pos;
    while let Some(next) = grid.neighbor(pos, axis, forward) {
      if grid.get(next).is_enterable() {
        self.pos = next;
        self.adjust_axis(puzzle);
        return;
      }
      pos = next;
    }
  }
}
