//! Grid geometry: cells, their decorators, and stepping along an axis.

use std::fmt::Debug;
use std::fmt::Display;

use tracing::debug;

use crate::Axis::{self, Across, Down, NoDirection, ZAxis};
use crate::clues::ClueIdx;
use crate::options::{Language, Options};
use crate::{Error, PerAxis, Result};

/// A position in a grid: (row, column), counted from the top left.
pub type Pos = (usize, usize);

/// What belongs in a cell.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Solution {
  /// Not a light.
  #[default]
  Block,
  /// A light whose letter the puzzle does not give.
  Unknown,
  /// A light and its letter. Compound scripts may use several codepoints.
  Letter(String),
}

/// A navigation edge: move to `pos`, now travelling along `axis`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Link {
  pub pos: Pos,
  pub axis: Axis,
}

/// One square of the grid.
#[derive(Debug, Clone, Default)]
pub struct Cell {
  pub solution: Solution,
  /// The solver cannot see whether this cell is a light.
  pub is_dgmless: bool,
  /// A bar between this cell and the next one across.
  pub has_bar_after: bool,
  /// A bar between this cell and the next one down.
  pub has_bar_under: bool,
  pub has_circle: bool,
  /// The solution letter is given to the solver.
  pub prefill: bool,
  /// Lights starting here are not numbered.
  pub skip_num: bool,
  /// What the solver has entered. Starts out as the prefill letter, if any.
  pub curr_letter: Option<String>,

  // Display-only decorations, from the exolve-force-*, exolve-colour and
  // exolve-nina sections.
  pub force_hyphen_right: bool,
  pub force_hyphen_below: bool,
  pub force_bar_right: bool,
  pub force_bar_below: bool,
  pub colour: Option<String>,
  /// Indices into [Puzzle::ninas](crate::Puzzle::ninas).
  pub ninas: Vec<usize>,

  /// The visible clue number. Set by the clue-start detector.
  pub number: Option<u32>,
  /// The clue covering this cell along each grid axis. Set by the linker.
  pub clues: PerAxis<Option<ClueIdx>>,
  /// Nodir clues that include this cell. Set by the linker.
  pub nodir_clues: Vec<ClueIdx>,
  /// Where typing a letter moves to. Set by the linker and navigation builder.
  pub succ: PerAxis<Option<Link>>,
  /// Where backspace moves to. Set by the linker and navigation builder.
  pub pred: PerAxis<Option<Link>>,
  /// The span containing this cell along each axis. Set by the navigation builder.
  pub spans: PerAxis<Option<usize>>,
}

impl Cell {
  pub fn is_light(&self) -> bool {
    self.solution != Solution::Block
  }

  /// Whether the solver can type into this cell: a light, or a diagramless
  /// cell that might be one.
  pub fn is_enterable(&self) -> bool {
    self.is_light() || self.is_dgmless
  }

  /// The solution letter, if the puzzle gives one.
  pub fn letter(&self) -> Option<&str> {
    match &self.solution {
      Solution::Letter(s) => Some(s),
      _ => None,
    }
  }

  pub fn square(&self) -> Square<'_> {
    if !self.is_enterable() {
      return Square::Block;
    }
    match &self.curr_letter {
      Some(s) => Square::Letter(s),
      None => Square::Empty,
    }
  }
}

/// What a cell currently looks like to the solver.
#[derive(Copy, Clone, Eq, PartialEq)]
pub enum Square<'a> {
  /// A block where nothing can be entered.
  Block,
  /// A cell where a letter could be entered, but that is currently empty.
  Empty,
  /// A cell with a letter written in it.
  Letter(&'a str),
}

impl Debug for Square<'_> {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Self::Block => write!(f, "■"),
      Self::Empty => write!(f, " "),
      Self::Letter(s) => write!(f, "{}", s),
    }?;
    Ok(())
  }
}

impl Display for Square<'_> {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{:?}", self)
  }
}

/// A `height × width` array of cells. In 3-D mode the rows are split into
/// `layers` equal bands, top band first.
pub struct Grid {
  cells: Vec<Vec<Cell>>,
  layers: usize,
  skew: usize,
}

impl Grid {
  /// The width of this grid.
  pub fn width(&self) -> usize {
    self.cells.first().map_or(0, Vec::len)
  }

  /// The height of this grid.
  pub fn height(&self) -> usize {
    self.cells.len()
  }

  /// The size of this grid, expressed as (width, height).
  fn size(&self) -> (usize, usize) {
    (self.width(), self.height())
  }

  pub fn is_3d(&self) -> bool {
    self.layers > 1
  }

  /// Number of 3-D layers; 1 for a flat grid.
  pub fn layers(&self) -> usize {
    self.layers
  }

  /// Rows per layer.
  pub fn layer_height(&self) -> usize {
    self.height() / self.layers
  }

  /// How far each 3-D layer is skewed when drawn. Not used for geometry.
  pub fn skew(&self) -> usize {
    self.skew
  }

  /// An iterator over all the positions of this grid, from left to right and top to bottom.
  pub fn positions(&self) -> GridPosIter {
    GridPosIter::new(self.size())
  }

  /// Returns the [Cell] at the given [Pos].
  pub fn get(&self, (r, c): Pos) -> &Cell {
    &self.cells[r][c]
  }

  pub(crate) fn get_mut(&mut self, (r, c): Pos) -> &mut Cell {
    &mut self.cells[r][c]
  }

  /// Returns an iterator over all the cells in the grid, paired with their
  /// position.
  pub fn enumerate(&self) -> impl Iterator<Item = (Pos, &Cell)> {
    self.positions().map(|pos| (pos, self.get(pos)))
  }

  /// Returns an iterator over all the lights in the grid, paired with their
  /// position.
  pub fn enumerate_light(&self) -> impl Iterator<Item = (Pos, &Cell)> {
    self.enumerate().filter(|(_, cell)| cell.is_light())
  }

  /// The next position along `axis` (or the previous one, when `forward` is
  /// false), ignoring blocks and bars. Down moves stay inside a 3-D layer;
  /// the Z axis moves between layers.
  pub fn neighbor(&self, (row, col): Pos, axis: Axis, forward: bool) -> Option<Pos> {
    let (width, height) = self.size();
    let lh = self.layer_height();
    match (axis, forward) {
      (Across, true) => (col + 1 < width).then_some((row, col + 1)),
      (Across, false) => col.checked_sub(1).map(|c| (row, c)),
      (Down, true) => ((row + 1) % lh != 0 && row + 1 < height).then_some((row + 1, col)),
      (Down, false) => (row % lh != 0).then(|| (row - 1, col)),
      (ZAxis, true) => (self.is_3d() && row + lh < height).then_some((row + lh, col)),
      (ZAxis, false) => (self.is_3d() && row >= lh).then(|| (row - lh, col)),
      (NoDirection, _) => None,
    }
  }

  /// Whether a bar separates `pos` from its neighbour along `axis`.
  pub fn barred(&self, pos: Pos, axis: Axis, forward: bool) -> bool {
    let before = if forward {
      Some(pos)
    } else {
      self.neighbor(pos, axis, false)
    };
    let Some(before) = before else {
      return false;
    };
    match axis {
      Across => self.get(before).has_bar_after,
      Down => self.get(before).has_bar_under,
      ZAxis | NoDirection => false,
    }
  }

  /// The next light along `axis`, unless a block, edge or bar is in the way.
  pub fn light_neighbor(&self, pos: Pos, axis: Axis, forward: bool) -> Option<Pos> {
    let next = self.neighbor(pos, axis, forward)?;
    (self.get(next).is_light() && !self.barred(pos, axis, forward)).then_some(next)
  }

  /// Positions in the order clue numbers are handed out: raster order, but
  /// within each 3-D layer the rows go from near (bottom) to far (top).
  pub fn numbering_order(&self) -> Vec<Pos> {
    if !self.is_3d() {
      return self.positions().collect();
    }
    let lh = self.layer_height();
    let mut order = Vec::with_capacity(self.width() * self.height());
    for layer in 0..self.layers {
      for i in (0..lh).rev() {
        for col in 0..self.width() {
          order.push((layer * lh + i, col));
        }
      }
    }
    order
  }

  /// Sort key for the row of `pos`: (layer, rank within the layer), with
  /// near rows ranked before far rows.
  pub fn row_key(&self, (row, _): Pos) -> (usize, usize) {
    if !self.is_3d() {
      return (0, row);
    }
    let lh = self.layer_height();
    (row / lh, lh - 1 - row % lh)
  }
}

/// Iterator over all the positions in the grid.
pub struct GridPosIter {
  pos: (usize, usize),
  size: (usize, usize),
}

impl GridPosIter {
  fn new(size: (usize, usize)) -> Self {
    Self { pos: (0, 0), size }
  }
}

impl Iterator for GridPosIter {
  type Item = Pos;
  fn next(&mut self) -> Option<Self::Item> {
    let (width, height) = self.size;
    let (row, col) = self.pos;

    if row == height || width == 0 {
      return None;
    }

    if col == width - 1 {
      self.pos = (row + 1, 0);
    } else {
      self.pos = (row, col + 1);
    }

    Some((row, col))
  }
}

impl Debug for Grid {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    for row in &self.cells {
      for cell in row {
        match &cell.solution {
          Solution::Block => write!(f, "■")?,
          Solution::Unknown => write!(f, "?")?,
          Solution::Letter(s) => write!(f, "{}", s)?,
        }
      }
      writeln!(f)?;
    }
    Ok(())
  }
}

impl Display for Grid {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "\n{:?}", self)
  }
}

const DECORATORS: &str = "+|_@!*~";

/// One cell as written in the grid section, before it is interpreted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct GridToken {
  letter: String,
  /// Written as `&x`: always a literal letter.
  escaped: bool,
  bar_after: bool,
  bar_under: bool,
  circle: bool,
  prefill: bool,
  dgmless: bool,
  skip_num: bool,
}

impl GridToken {
  fn is_block(&self) -> bool {
    !self.escaped && self.letter == "."
  }

  fn is_zero(&self) -> bool {
    !self.escaped && self.letter == "0"
  }

  /// Applies a decorator char, returning false if `c` is not one.
  fn decorate(&mut self, c: char) -> bool {
    match c {
      '+' => {
        self.bar_after = true;
        self.bar_under = true;
      }
      '|' => self.bar_after = true,
      '_' => self.bar_under = true,
      '@' => self.circle = true,
      '!' => self.prefill = true,
      '*' => self.dgmless = true,
      '~' => self.skip_num = true,
      _ => return false,
    }
    true
  }
}

/// Splits a grid line into cells. Single-codepoint scripts are read a char
/// at a time with whitespace ignored; otherwise cells are separated by
/// whitespace.
pub(crate) fn tokenize_line(line: &str, max_codepoints: usize) -> Vec<GridToken> {
  let mut tokens = vec![];
  if max_codepoints <= 1 {
    let mut chars = line.chars().peekable();
    while let Some(c) = chars.next() {
      if c.is_whitespace() {
        continue;
      }
      let mut token = GridToken::default();
      match (c, chars.peek().copied()) {
        ('&', Some(escaped)) if !escaped.is_whitespace() => {
          chars.next();
          token.letter = escaped.to_string();
          token.escaped = true;
        }
        _ => token.letter = c.to_string(),
      }
      while let Some(&d) = chars.peek() {
        if !token.decorate(d) {
          break;
        }
        chars.next();
      }
      tokens.push(token);
    }
    return tokens;
  }

  for word in line.split_whitespace() {
    let mut token = GridToken::default();
    let body = match word.strip_prefix('&') {
      Some(rest) if !rest.is_empty() => {
        token.escaped = true;
        rest
      }
      _ => word,
    };
    // Peel decorators off the end, always leaving at least one char.
    let mut letter_end = body.len();
    for (i, c) in body.char_indices().rev() {
      if i == 0 || !DECORATORS.contains(c) {
        break;
      }
      token.decorate(c);
      letter_end = i;
    }
    token.letter = body[..letter_end].to_string();
    tokens.push(token);
  }
  tokens
}

/// First pass over the grid: true when every light that is not prefilled is
/// a `0`, meaning the puzzle gives no solutions at all.
pub(crate) fn analyze_unsolved(rows: &[Vec<GridToken>]) -> bool {
  let mut lights = rows
    .iter()
    .flatten()
    .filter(|t| !t.is_block() && !t.prefill)
    .peekable();
  lights.peek().is_some() && lights.all(GridToken::is_zero)
}

/// Shape parameters from the exolve-width, exolve-height and exolve-3d sections.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct GridShape {
  pub width: usize,
  pub height: usize,
  pub layers: usize,
  pub skew: usize,
}

/// Builds the grid from the lines of the grid section.
pub(crate) fn build_grid(
  lines: &[&str],
  shape: GridShape,
  language: &Language,
  options: &Options,
) -> Result<Grid> {
  let GridShape {
    width,
    height,
    layers,
    skew,
  } = shape;
  if layers == 0 || height % layers != 0 {
    return Err(Error::LayerMismatch { height, layers });
  }
  if lines.len() != height {
    return Err(Error::GridLineCount {
      expected: height,
      found: lines.len(),
    });
  }

  let rows = lines
    .iter()
    .map(|line| tokenize_line(line, language.max_codepoints))
    .collect::<Vec<_>>();
  for (row, tokens) in rows.iter().enumerate() {
    if tokens.len() != width {
      return Err(Error::GridRowWidth {
        row,
        expected: width,
        found: tokens.len(),
      });
    }
  }

  let unsolved = analyze_unsolved(&rows);
  debug!(width, height, layers, unsolved, "building grid");

  let mut cells = Vec::with_capacity(height);
  for (r, tokens) in rows.into_iter().enumerate() {
    let mut row = Vec::with_capacity(width);
    for (c, token) in tokens.into_iter().enumerate() {
      let solution = if token.is_block() {
        Solution::Block
      } else if token.is_zero() && unsolved {
        Solution::Unknown
      } else {
        Solution::Letter(validate_letter(&token.letter, (r, c), language, options)?)
      };
      if token.prefill && !matches!(solution, Solution::Letter(_)) {
        return Err(Error::PrefillNotLight((r, c)));
      }
      let curr_letter = if token.prefill {
        match &solution {
          Solution::Letter(s) => Some(s.clone()),
          _ => None,
        }
      } else {
        None
      };
      row.push(Cell {
        solution,
        is_dgmless: token.dgmless,
        has_bar_after: token.bar_after,
        has_bar_under: token.bar_under,
        has_circle: token.circle,
        prefill: token.prefill,
        skip_num: token.skip_num,
        curr_letter,
        ..Default::default()
      });
    }
    cells.push(row);
  }

  let mut grid = Grid {
    cells,
    layers,
    skew,
  };
  drop_stray_bars(&mut grid);
  Ok(grid)
}

/// Bars only make sense between two lights.
fn drop_stray_bars(grid: &mut Grid) {
  for pos in grid.positions().collect::<Vec<_>>() {
    for axis in [Across, Down] {
      let has_bar = match axis {
        Across => grid.get(pos).has_bar_after,
        _ => grid.get(pos).has_bar_under,
      };
      if !has_bar {
        continue;
      }
      let between_lights = grid.get(pos).is_light()
        && grid
          .neighbor(pos, axis, true)
          .is_some_and(|next| grid.get(next).is_light());
      if between_lights {
        continue;
      }
      debug!(?pos, ?axis, "dropping bar that does not separate two lights");
      let cell = grid.get_mut(pos);
      match axis {
        Across => cell.has_bar_after = false,
        _ => cell.has_bar_under = false,
      }
    }
  }
}

fn validate_letter(
  letter: &str,
  pos: Pos,
  language: &Language,
  options: &Options,
) -> Result<String> {
  let allowed = |c: char| {
    c.is_ascii_alphabetic()
      || options.allow_chars.contains(&c)
      || (options.allow_digits && c.is_ascii_digit())
      || (!language.is_latin() && !c.is_ascii() && !c.is_whitespace())
  };
  let count = letter.chars().count();
  if count == 0 || count > language.max_codepoints || !letter.chars().all(allowed) {
    return Err(Error::InvalidLetter {
      letter: letter.to_string(),
      pos,
    });
  }
  Ok(letter.to_uppercase())
}

#[cfg(test)]
mod tests {
  use super::*;
  use pretty_assertions::assert_eq;

  fn shape(width: usize, height: usize) -> GridShape {
    GridShape {
      width,
      height,
      layers: 1,
      skew: 0,
    }
  }

  fn build(lines: &[&str], width: usize, height: usize) -> Result<Grid> {
    build_grid(
      lines,
      shape(width, height),
      &Language::default(),
      &Options::default(),
    )
  }

  #[test]
  fn basic_grid() {
    let grid = build(&["ab.c", "de|fg", "h.i_j", "klmn"], 4, 4).unwrap();

    #[rustfmt::skip]
    assert_eq!(
      grid.to_string(),
      concat!(
        "\n",
        "AB■C\n",
        "DEFG\n",
        "H■IJ\n",
        "KLMN\n",
      )
    );
    assert!(grid.get((1, 1)).has_bar_after);
    assert!(grid.get((2, 2)).has_bar_under);
    assert!(grid.get((0, 1)).is_light());
    assert!(!grid.get((0, 2)).is_light());
  }

  #[test]
  fn decorators_and_escapes() {
    let tokens = tokenize_line("A+ B@! &. C*~", 1);
    assert_eq!(tokens.len(), 4);
    assert!(tokens[0].bar_after && tokens[0].bar_under);
    assert!(tokens[1].circle && tokens[1].prefill);
    assert!(tokens[2].escaped && !tokens[2].is_block());
    assert!(tokens[3].dgmless && tokens[3].skip_num);
  }

  #[test]
  fn multi_codepoint_tokens() {
    let tokens = tokenize_line("कि| .  मा@", 2);
    assert_eq!(
      tokens.iter().map(|t| t.letter.as_str()).collect::<Vec<_>>(),
      ["कि", ".", "मा"]
    );
    assert!(tokens[0].bar_after);
    assert!(tokens[2].circle);
  }

  #[test]
  fn all_zero_grid_is_unsolved() {
    let grid = build(&["00", "0."], 2, 2).unwrap();
    assert_eq!(grid.get((0, 0)).solution, Solution::Unknown);
    assert_eq!(grid.get((1, 1)).solution, Solution::Block);
  }

  #[test]
  fn prefills_do_not_count_as_solutions() {
    let grid = build(&["0A!", "00."], 3, 2).unwrap();
    assert_eq!(grid.get((0, 0)).solution, Solution::Unknown);
    assert_eq!(grid.get((0, 1)).curr_letter.as_deref(), Some("A"));
  }

  #[test]
  fn zero_is_a_digit_in_a_solved_grid() {
    assert!(matches!(
      build(&["A0"], 2, 1),
      Err(Error::InvalidLetter { pos: (0, 1), .. })
    ));
    let options = Options {
      allow_digits: true,
      ..Default::default()
    };
    let grid = build_grid(&["A0"], shape(2, 1), &Language::default(), &options).unwrap();
    assert_eq!(grid.get((0, 1)).letter(), Some("0"));
  }

  #[test]
  fn structural_errors() {
    assert!(matches!(
      build(&["AB"], 2, 2),
      Err(Error::GridLineCount {
        expected: 2,
        found: 1
      })
    ));
    assert!(matches!(
      build(&["AB", "C"], 2, 2),
      Err(Error::GridRowWidth { row: 1, .. })
    ));
    assert!(matches!(
      build(&["A.!", "ABC"], 3, 2),
      Err(Error::PrefillNotLight((0, 1)))
    ));
    assert!(matches!(
      build(&["A?", "AB"], 2, 2),
      Err(Error::InvalidLetter { .. })
    ));
  }

  #[test]
  fn stray_bars_are_dropped() {
    let grid = build(&["A|.B|", "C_DE_"], 3, 2).unwrap();
    assert!(!grid.get((0, 0)).has_bar_after);
    assert!(!grid.get((0, 2)).has_bar_after);
    assert!(!grid.get((1, 0)).has_bar_under);
  }

  #[test]
  fn three_d_neighbors() {
    let grid = build_grid(
      &["AB", "CD", "EF", "GH"],
      GridShape {
        width: 2,
        height: 4,
        layers: 2,
        skew: 1,
      },
      &Language::default(),
      &Options::default(),
    )
    .unwrap();
    assert_eq!(grid.neighbor((0, 0), Down, true), Some((1, 0)));
    assert_eq!(grid.neighbor((1, 0), Down, true), None);
    assert_eq!(grid.neighbor((2, 0), Down, false), None);
    assert_eq!(grid.neighbor((1, 1), ZAxis, true), Some((3, 1)));
    assert_eq!(grid.neighbor((1, 1), ZAxis, false), None);
    assert_eq!(
      &grid.numbering_order()[..4],
      [(1, 0), (1, 1), (0, 0), (0, 1)]
    );
    assert_eq!(grid.row_key((1, 0)), (0, 0));
    assert_eq!(grid.row_key((2, 0)), (1, 1));
  }
}
