//! Parses exolve crossword specifications and builds the model a solving app
//! works against. Drawing is left to the host; `exolve-tui` is one such host.
//!
//! Puzzles are written as plain text: a grid plus clue lists, in `exolve-name:`
//! sections. [Puzzle::parse] turns that text into a connected model of cells,
//! lights and clues, including linked clues, reversed lights, diagramless cells
//! and 3-D grids, and a navigation graph for moving a [Cursor] around.

use std::collections::BTreeMap;
use std::ops::{Index, IndexMut};

use encoding::DecoderTrap::Strict;
use encoding::Encoding;
use encoding::all::ISO_8859_1;
use tracing::{debug, instrument, warn};

use Axis::{Across, Down, NoDirection, ZAxis};

mod clues;
mod decor;
mod detect;
mod error;
mod grid;
mod link;
mod nav;
mod options;
pub mod parse;
mod registry;
mod sections;

pub use clues::{Clue, ClueIdx, ClueLabel, ClueTable};
pub use error::{Error, Result, Warning};
pub use grid::{Cell, Grid, Link, Pos, Solution, Square};
pub use link::AllCells;
pub use nav::{Cursor, Span};
pub use options::{Language, Options};
pub use registry::Registry;
pub use sections::{Section, Sections};

use grid::GridShape;
use parse::{LabelContext, RawLabel, parse_label_token, parse_location_pair};

/// The axes a light or clue can run along. 3-D grids add the Z axis, which
/// runs through the layers. Clues that are not tied to one axis use
/// `NoDirection`.
///
/// Ordered by each axis's letter: `A`, `D`, `X`, `Z`.
#[derive(Debug, Eq, PartialEq, Hash, Copy, Clone, PartialOrd, Ord)]
pub enum Axis {
  Across,
  Down,
  NoDirection,
  ZAxis,
}

impl Axis {
  /// The axes lights can run along in a grid.
  pub fn grid_axes(three_d: bool) -> &'static [Axis] {
    if three_d {
      &[Across, Down, ZAxis]
    } else {
      &[Across, Down]
    }
  }

  pub fn letter(self) -> char {
    match self {
      Across => 'A',
      Down => 'D',
      NoDirection => 'X',
      ZAxis => 'Z',
    }
  }

  /// Short suffix used when naming a clue, e.g. the `a` in `5a`.
  pub fn suffix(self, reversed: bool) -> &'static str {
    match (self, reversed) {
      (Across, false) => "a",
      (Across, true) => "b",
      (Down, false) => "d",
      (Down, true) => "u",
      (ZAxis, false) => "aw",
      (ZAxis, true) => "to",
      (NoDirection, _) => "",
    }
  }
}

/// One value per [Axis]; a typed replacement for maps keyed by axis letter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PerAxis<T> {
  across: T,
  down: T,
  nodir: T,
  z: T,
}

impl<T> Index<Axis> for PerAxis<T> {
  type Output = T;
  fn index(&self, axis: Axis) -> &T {
    match axis {
      Across => &self.across,
      Down => &self.down,
      NoDirection => &self.nodir,
      ZAxis => &self.z,
    }
  }
}

impl<T> IndexMut<Axis> for PerAxis<T> {
  fn index_mut(&mut self, axis: Axis) -> &mut T {
    match axis {
      Across => &mut self.across,
      Down => &mut self.down,
      NoDirection => &mut self.nodir,
      ZAxis => &mut self.z,
    }
  }
}

/// Free-text information about a puzzle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Metadata {
  pub id: Option<String>,
  pub title: String,
  pub setter: String,
  pub copyright: String,
  pub credits: Vec<String>,
  pub questions: Vec<String>,
  pub preamble: String,
  pub explanations: String,
  /// Replacement headings and labels, e.g. `across -> Solved`.
  pub relabel: BTreeMap<String, String>,
}

/// A fully built puzzle. Its structure (cells, clues, navigation links) is
/// fixed once parsing succeeds; only what the solver has entered changes.
#[derive(Debug)]
pub struct Puzzle {
  grid: Grid,
  clues: ClueTable,
  spans: Vec<Span>,
  meta: Metadata,
  ninas: Vec<Vec<Pos>>,
  options: Options,
  language: Language,
  unused_reversals: Vec<(Pos, Pos)>,
}

impl Puzzle {
  /// Creates a Puzzle from the text of a puzzle specification.
  pub fn parse(text: &str) -> Result<(Self, Vec<Warning>)> {
    Self::parse_with(text, &Options::default())
  }

  /// Like [Puzzle::parse], but with options from the host merged into the
  /// ones the puzzle sets for itself.
  #[instrument(skip_all)]
  pub fn parse_with(text: &str, host: &Options) -> Result<(Self, Vec<Warning>)> {
    let mut warnings = vec![];
    let sections = Sections::extract(text);

    let option_lines = sections
      .all("option")
      .flat_map(|s| std::iter::once(s.value).chain(sections.content(s).iter().copied()))
      .collect::<Vec<_>>();
    let mut options = Options::parse(option_lines, &mut warnings);
    options.merge(host);
    let language = sections
      .value("language")
      .map(Language::parse)
      .unwrap_or_default();

    let width = required_number(&sections, "width")?;
    let height = required_number(&sections, "height")?;
    let (layers, skew) = match sections.value("3d") {
      Some(value) => parse_3d(value)?,
      None => (1, 0),
    };
    let grid_section = sections.get("grid").ok_or(Error::MissingSection("grid"))?;
    let shape = GridShape {
      width,
      height,
      layers,
      skew,
    };
    let mut grid = grid::build_grid(sections.content(grid_section), shape, &language, &options)?;
    let ctx = LabelContext {
      three_d: grid.is_3d(),
      height,
      width,
    };

    let mut reversals = parse_reversals(&sections, &ctx);
    let mut clues = ClueTable::default();
    detect::detect_clues(&mut grid, &mut reversals, &mut clues);
    for &(first, last) in &reversals {
      warn!(?first, ?last, "reversal does not match any light");
      warnings.push(Warning::UnusedReversal { first, last });
    }

    clues::parse_clue_lists(&sections, &grid, &ctx, &language, &mut clues, &mut warnings)?;
    clues.compact();
    link::link_children(&mut clues)?;
    link::install_links(&mut grid, &clues);
    link::project_breaks(&mut clues);
    link::derive_solutions(&grid, &mut clues);
    link::check_consistency(&grid, &clues, &options, &mut warnings);

    let ninas = decor::apply_decorations(&sections, &mut grid, &clues, &ctx, &mut warnings);
    let spans = nav::build_spans(&mut grid, &clues);
    let meta = metadata(&sections);
    debug!(
      clues = clues.len(),
      spans = spans.len(),
      warnings = warnings.len(),
      "puzzle built"
    );

    let puzzle = Self {
      grid,
      clues,
      spans,
      meta,
      ninas,
      options,
      language,
      unused_reversals: reversals,
    };
    Ok((puzzle, warnings))
  }

  /// Creates a Puzzle from raw file contents. Text that is not valid UTF-8
  /// is read as ISO-8859-1.
  pub fn from_bytes(data: Vec<u8>, host: &Options) -> Result<(Self, Vec<Warning>)> {
    let text = decode_text(data)?;
    Self::parse_with(&text, host)
  }

  /// Returns a reference to the puzzle grid.
  pub fn grid(&self) -> &Grid {
    &self.grid
  }

  pub fn cell(&self, pos: Pos) -> &Cell {
    self.grid.get(pos)
  }

  /// What the solver currently sees at `pos`.
  pub fn square(&self, pos: Pos) -> Square<'_> {
    self.grid.get(pos).square()
  }

  pub fn clues(&self) -> &ClueTable {
    &self.clues
  }

  pub fn clue(&self, idx: ClueIdx) -> &Clue {
    self.clues.get(idx)
  }

  /// Looks a clue up by axis and label. Bracket labels match on their text.
  pub fn find_clue(&self, axis: Axis, label: &ClueLabel) -> Option<ClueIdx> {
    self.clues.find(axis, label)
  }

  /// Looks a clue up by a written label such as `5a`, `12d` or `[P]`. A
  /// numbered label without a direction is tried across, then down, then
  /// along the other axes.
  pub fn lookup(&self, written: &str) -> Option<ClueIdx> {
    let ctx = LabelContext {
      three_d: self.grid.is_3d(),
      height: self.grid.height(),
      width: self.grid.width(),
    };
    let (token, rest) = parse_label_token(parse::Scanner::new(written.trim()), &ctx)?;
    if !rest.is_empty() {
      return None;
    }
    let axes = match token.direction {
      Some(direction) => vec![direction.axis],
      None => vec![Across, Down, ZAxis, NoDirection],
    };
    axes.into_iter().find_map(|axis| match &token.label {
      RawLabel::Number(n) => self.clues.find(axis, &ClueLabel::Number(*n)),
      RawLabel::Bracket(text) => self.clues.find_bracket(axis, text),
    })
  }

  /// The clue whose light covers `pos` along `axis`. For `NoDirection`, the
  /// first nodir clue that includes the cell.
  pub fn clue_at(&self, pos: Pos, axis: Axis) -> Option<ClueIdx> {
    let cell = self.grid.get(pos);
    match axis {
      NoDirection => cell.nodir_clues.first().copied(),
      _ => cell.clues[axis],
    }
  }

  /// The clue that holds the text for `idx`: its parent if it is a linked
  /// child, otherwise itself.
  pub fn owning_clue(&self, idx: ClueIdx) -> ClueIdx {
    self.clues.get(idx).parent.unwrap_or(idx)
  }

  /// Where the cursor goes after a letter is typed at `pos` along `axis`.
  pub fn next_cell(&self, pos: Pos, axis: Axis) -> Option<Link> {
    self.grid.get(pos).succ[axis]
  }

  /// Where the cursor goes on backspace from `pos` along `axis`.
  pub fn prev_cell(&self, pos: Pos, axis: Axis) -> Option<Link> {
    self.grid.get(pos).pred[axis]
  }

  /// All spans in navigation order.
  pub fn spans(&self) -> &[Span] {
    &self.spans
  }

  /// The span containing `pos` along `axis`.
  pub fn span_at(&self, pos: Pos, axis: Axis) -> Option<&Span> {
    self.grid.get(pos).spans[axis].map(|i| &self.spans[i])
  }

  /// The span after the one containing `pos` along `axis`, wrapping around.
  pub fn next_span(&self, pos: Pos, axis: Axis) -> Option<&Span> {
    self.span_at(pos, axis).map(|span| &self.spans[span.next])
  }

  /// The span before the one containing `pos` along `axis`, wrapping around.
  pub fn prev_span(&self, pos: Pos, axis: Axis) -> Option<&Span> {
    self.span_at(pos, axis).map(|span| &self.spans[span.prev])
  }

  /// Every cell of a clue, including the cells of its linked children.
  pub fn all_cells(&self, idx: ClueIdx) -> AllCells {
    link::all_cells(&self.clues, idx)
  }

  /// Whether the clue has no known cells.
  pub fn is_orphan(&self, idx: ClueIdx) -> bool {
    self.clues.get(idx).is_orphan()
  }

  /// Whether the clue and all of its linked children have known cells.
  pub fn all_cells_known(&self, idx: ClueIdx) -> bool {
    let clue = self.clues.get(idx);
    !clue.is_orphan() && clue.children.iter().all(|&c| !self.is_orphan(c))
  }

  /// The current entry for a clue, laid out with its enum's placeholder,
  /// e.g. `AB??? ???` for a (5,3) clue with two letters entered.
  pub fn clue_entry(&self, idx: ClueIdx) -> String {
    let cells = self.all_cells(idx).cells;
    let placeholder = self
      .clues
      .get(idx)
      .enumeration
      .as_ref()
      .map(|e| e.placeholder.as_str())
      .unwrap_or("");
    if cells.is_empty() || placeholder.chars().filter(|&c| c == '?').count() != cells.len() {
      return self.cells_entry(&cells);
    }
    let mut letters = cells.iter().map(|&pos| self.entry_at(pos));
    placeholder
      .chars()
      .map(|c| match c {
        '?' => letters.next().unwrap_or("?").to_string(),
        other => other.to_string(),
      })
      .collect()
  }

  /// The current entries of some cells, with `?` for empty ones.
  pub fn cells_entry(&self, cells: &[Pos]) -> String {
    cells.iter().map(|&pos| self.entry_at(pos)).collect()
  }

  fn entry_at(&self, pos: Pos) -> &str {
    self.grid.get(pos).curr_letter.as_deref().unwrap_or("?")
  }

  /// Writes the given letter to a cell. Blocks and prefilled cells are left
  /// alone; returns whether anything was written.
  pub fn set_letter(&mut self, pos: Pos, letter: &str) -> bool {
    let upper = letter.to_uppercase();
    let cell = self.grid.get_mut(pos);
    if !cell.is_enterable() || cell.prefill || upper.trim().is_empty() {
      return false;
    }
    cell.curr_letter = Some(upper);
    true
  }

  /// Empties a cell, unless it is prefilled.
  pub fn clear_letter(&mut self, pos: Pos) {
    let cell = self.grid.get_mut(pos);
    if !cell.prefill {
      cell.curr_letter = None;
    }
  }

  /// Fills in the known solution letters of a clue and its children.
  pub fn reveal(&mut self, idx: ClueIdx) {
    for pos in self.all_cells(idx).cells {
      let cell = self.grid.get_mut(pos);
      if let Solution::Letter(s) = &cell.solution {
        cell.curr_letter = Some(s.clone());
      }
    }
  }

  /// Whether the entry for a clue matches its solution. None if the
  /// solution is not known or the entry is incomplete.
  pub fn check(&self, idx: ClueIdx) -> Option<bool> {
    let solution = self.clues.get(idx).solution.as_ref()?;
    let entry = self.cells_entry(&self.all_cells(idx).cells);
    if entry.contains('?') {
      return None;
    }
    Some(&entry == solution)
  }

  /// Whether every light with a known solution holds the right letter.
  pub fn is_solved(&self) -> bool {
    self.grid.enumerate_light().all(|(_, cell)| match &cell.solution {
      Solution::Letter(s) => cell.curr_letter.as_ref() == Some(s),
      _ => cell.curr_letter.is_some(),
    })
  }

  pub fn metadata(&self) -> &Metadata {
    &self.meta
  }

  pub fn id(&self) -> Option<&str> {
    self.meta.id.as_deref()
  }

  pub(crate) fn set_id(&mut self, id: String) {
    self.meta.id = Some(id);
  }

  pub fn title(&self) -> &str {
    &self.meta.title
  }

  pub fn setter(&self) -> &str {
    &self.meta.setter
  }

  pub fn copyright(&self) -> &str {
    &self.meta.copyright
  }

  /// Cell groups from the exolve-nina sections.
  pub fn ninas(&self) -> &[Vec<Pos>] {
    &self.ninas
  }

  pub fn options(&self) -> &Options {
    &self.options
  }

  pub fn language(&self) -> &Language {
    &self.language
  }

  /// Reversal directives that did not match any light.
  pub fn unused_reversals(&self) -> &[(Pos, Pos)] {
    &self.unused_reversals
  }
}

fn required_number(sections: &Sections<'_>, name: &'static str) -> Result<usize> {
  let value = sections.value(name).ok_or(Error::MissingSection(name))?;
  value
    .parse()
    .ok()
    .filter(|&n| n > 0)
    .ok_or_else(|| Error::InvalidNumber {
      section: name,
      value: value.to_string(),
    })
}

/// `exolve-3d: <layers> [skew]`
fn parse_3d(value: &str) -> Result<(usize, usize)> {
  let invalid = || Error::InvalidNumber {
    section: "3d",
    value: value.to_string(),
  };
  let mut parts = value.split_whitespace();
  let layers = parts
    .next()
    .and_then(|n| n.parse().ok())
    .filter(|&n: &usize| n > 0)
    .ok_or_else(invalid)?;
  let skew = match parts.next() {
    Some(n) => n.parse().map_err(|_| invalid())?,
    None => 0,
  };
  Ok((layers, skew))
}

/// Reads all `first-last` pairs from exolve-reversals. Malformed entries are
/// logged and skipped.
fn parse_reversals(sections: &Sections<'_>, ctx: &LabelContext) -> Vec<(Pos, Pos)> {
  let mut reversals = vec![];
  for section in sections.all("reversals") {
    let lines = std::iter::once(section.value).chain(sections.content(section).iter().copied());
    for token in lines.flat_map(str::split_whitespace) {
      match parse_location_pair(token, ctx.height, ctx.width) {
        Some(pair) => reversals.push(pair),
        None => warn!(token, "ignoring malformed reversal"),
      }
    }
  }
  reversals
}

fn metadata(sections: &Sections<'_>) -> Metadata {
  let joined_all = |name: &str| {
    sections
      .all(name)
      .map(|s| sections.joined(s))
      .collect::<Vec<_>>()
  };
  let mut relabel = BTreeMap::new();
  for section in sections.all("relabel") {
    let lines = std::iter::once(section.value).chain(sections.content(section).iter().copied());
    for line in lines {
      if let Some((key, value)) = line.split_once(':') {
        relabel.insert(key.trim().to_lowercase(), value.trim().to_string());
      }
    }
  }
  Metadata {
    id: sections.value("id").map(str::to_string),
    title: sections.text("title"),
    setter: sections.text("setter"),
    copyright: sections.text("copyright"),
    credits: joined_all("credits"),
    questions: joined_all("question"),
    preamble: sections.text("preamble"),
    explanations: sections.text("explanations"),
    relabel,
  }
}

/// Turns file contents into text: UTF-8 if it is valid, ISO-8859-1 otherwise.
fn decode_text(data: Vec<u8>) -> Result<String> {
  match String::from_utf8(data) {
    Ok(text) => Ok(text),
    Err(e) => {
      let bytes = e.into_bytes();
      debug!("puzzle is not UTF-8; reading it as ISO-8859-1");
      ISO_8859_1
        .decode(&bytes, Strict)
        .map_err(|e| Error::Encoding(format!("Failed decoding as ISO-8859-1: {}", e)))
    }
  }
}
