//! Clues: the table they live in, and the parser for the clue-list sections.

use std::collections::HashMap;
use std::fmt::Display;

use tracing::{debug, trace, warn};

use crate::Axis::{self, Across, Down, NoDirection, ZAxis};
use crate::grid::{Grid, Pos};
use crate::options::Language;
use crate::parse::{
  CellRef, Enumeration, LabelContext, LabelToken, RawLabel, Scanner, parse_cell_ref,
  parse_clue_label, split_clue_text,
};
use crate::sections::Sections;
use crate::{Error, Result, Warning};

/// Index of a clue in its [ClueTable].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClueIdx(usize);

impl ClueIdx {
  pub fn index(self) -> usize {
    self.0
  }
}

/// How a clue is identified.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ClueLabel {
  /// A numbered light, or a numbered clue from the lists.
  Number(u32),
  /// A light starting at a `~` cell. These get no visible number; the value
  /// only keeps them apart.
  Skipped(u32),
  /// A `[text]` label. `id` is unique within the puzzle, so bracket clues
  /// with the same text stay distinct.
  Bracket { text: String, id: u32 },
}

impl Display for ClueLabel {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Self::Number(n) => write!(f, "{n}"),
      Self::Skipped(n) => write!(f, "~{n}"),
      Self::Bracket { text, .. } => write!(f, "[{text}]"),
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum LabelKey {
  Number(u32),
  Skipped(u32),
  Bracket(u32),
}

impl ClueLabel {
  fn key(&self) -> LabelKey {
    match self {
      Self::Number(n) => LabelKey::Number(*n),
      Self::Skipped(n) => LabelKey::Skipped(*n),
      Self::Bracket { id, .. } => LabelKey::Bracket(*id),
    }
  }
}

/// A clue, whether it came from a grid light, from the clue lists, or both.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Clue {
  pub axis: Axis,
  pub label: ClueLabel,
  /// What to show as the label. Empty for skipped lights without text.
  pub display_label: String,
  pub reversed: bool,
  /// The cells of this clue's own light, in entry order. Empty for an orphan.
  pub cells: Vec<Pos>,
  pub enumeration: Option<Enumeration>,
  pub text: String,
  pub anno: String,
  /// Lines that preceded the clue in its list without being clues themselves.
  pub filler: String,
  pub children: Vec<ClueIdx>,
  pub parent: Option<ClueIdx>,
  /// The answer, when every letter is known or the annotation gives it.
  pub solution: Option<String>,
  /// Word-end positions that land in this clue's own cells, as offsets.
  pub word_ends: Vec<usize>,
  /// Hyphen positions that land in this clue's own cells, as offsets.
  pub hyphens: Vec<usize>,
  /// The clue was created for a light in the grid.
  pub from_grid: bool,
  /// The clue lists gave text for this clue.
  pub has_text: bool,
  pub(crate) child_tokens: Vec<LabelToken>,
  pub(crate) solution_override: Option<String>,
  /// The bracket text a nodir clue was declared with before it moved onto
  /// this grid light.
  pub(crate) nodir_alias: Option<String>,
  pub(crate) deleted: bool,
}

impl Clue {
  pub(crate) fn new(axis: Axis, label: ClueLabel) -> Self {
    let display_label = match &label {
      ClueLabel::Number(n) => n.to_string(),
      ClueLabel::Skipped(_) => String::new(),
      ClueLabel::Bracket { text, .. } => text.clone(),
    };
    Self {
      axis,
      label,
      display_label,
      reversed: false,
      cells: vec![],
      enumeration: None,
      text: String::new(),
      anno: String::new(),
      filler: String::new(),
      children: vec![],
      parent: None,
      solution: None,
      word_ends: vec![],
      hyphens: vec![],
      from_grid: false,
      has_text: false,
      child_tokens: vec![],
      solution_override: None,
      nodir_alias: None,
      deleted: false,
    }
  }

  /// A short name such as `5a`, `7u` or `[P]`.
  pub fn name(&self) -> String {
    format!("{}{}", self.label, self.axis.suffix(self.reversed))
  }

  /// Whether the grid cells of this clue are unknown.
  pub fn is_orphan(&self) -> bool {
    self.cells.is_empty()
  }
}

/// All the clues of a puzzle, addressable by [ClueIdx] or by axis and label.
#[derive(Debug, Default)]
pub struct ClueTable {
  clues: Vec<Clue>,
  index: HashMap<(Axis, LabelKey), ClueIdx>,
  next_bracket_id: u32,
}

impl ClueTable {
  pub fn len(&self) -> usize {
    self.clues.len()
  }

  pub fn is_empty(&self) -> bool {
    self.clues.is_empty()
  }

  pub fn get(&self, idx: ClueIdx) -> &Clue {
    &self.clues[idx.0]
  }

  pub(crate) fn get_mut(&mut self, idx: ClueIdx) -> &mut Clue {
    &mut self.clues[idx.0]
  }

  /// All clues, in the order they were created: grid lights first, then
  /// clues that only appear in the lists.
  pub fn iter(&self) -> impl Iterator<Item = (ClueIdx, &Clue)> {
    self.clues.iter().enumerate().map(|(i, c)| (ClueIdx(i), c))
  }

  pub fn indices(&self) -> impl Iterator<Item = ClueIdx> + use<> {
    (0..self.clues.len()).map(ClueIdx)
  }

  pub fn find(&self, axis: Axis, label: &ClueLabel) -> Option<ClueIdx> {
    match label {
      ClueLabel::Bracket { text, .. } => self.find_bracket(axis, text),
      _ => self.index.get(&(axis, label.key())).copied(),
    }
  }

  /// The first bracket clue along `axis` with the given text. A nodir clue
  /// that moved onto a grid light is still found under `NoDirection`.
  pub fn find_bracket(&self, axis: Axis, text: &str) -> Option<ClueIdx> {
    self.iter().find_map(|(idx, clue)| {
      let own = clue.axis == axis
        && matches!(&clue.label, ClueLabel::Bracket { text: t, .. } if t == text);
      let alias = axis == NoDirection && clue.nodir_alias.as_deref() == Some(text);
      (!clue.deleted && (own || alias)).then_some(idx)
    })
  }

  pub(crate) fn insert(&mut self, clue: Clue) -> ClueIdx {
    let idx = ClueIdx(self.clues.len());
    self.index.insert((clue.axis, clue.label.key()), idx);
    self.clues.push(clue);
    idx
  }

  pub(crate) fn next_bracket_id(&mut self) -> u32 {
    self.next_bracket_id += 1;
    self.next_bracket_id
  }

  /// Drops deleted clues and rebuilds the index. Must run before anything
  /// holds on to a [ClueIdx].
  pub(crate) fn compact(&mut self) {
    self.clues.retain(|c| !c.deleted);
    self.index = self
      .clues
      .iter()
      .enumerate()
      .map(|(i, c)| ((c.axis, c.label.key()), ClueIdx(i)))
      .collect();
  }
}

/// The axis a clue-list section declares.
fn list_axis(name: &str, three_d: bool) -> Result<Option<Axis>> {
  let axis = match name {
    "across" => Across,
    "down" => Down,
    "nodir" => NoDirection,
    "3d-across" => Across,
    "3d-down" => Down,
    "3d-away" => ZAxis,
    _ => return Ok(None),
  };
  if name.starts_with("3d-") && !three_d {
    return Err(Error::InvalidSection(name.to_string()));
  }
  Ok(Some(axis))
}

/// Reads every clue-list section and merges it into `table`, which already
/// holds the clues detected from the grid.
pub(crate) fn parse_clue_lists(
  sections: &Sections<'_>,
  grid: &Grid,
  ctx: &LabelContext,
  language: &Language,
  table: &mut ClueTable,
  warnings: &mut Vec<Warning>,
) -> Result<()> {
  for section in sections.iter() {
    let Some(axis) = list_axis(&section.name, ctx.three_d)? else {
      continue;
    };
    let lines = std::iter::once(section.value)
      .filter(|v| !v.is_empty())
      .chain(sections.content(section).iter().copied());
    let mut parser = ListParser {
      axis,
      grid,
      ctx,
      language,
      table: &mut *table,
      warnings: &mut *warnings,
      filler: vec![],
    };
    for line in lines {
      parser.line(line)?;
    }
    if !parser.filler.is_empty() {
      debug!(section = %section.name, lines = parser.filler.len(), "dropping trailing filler");
    }
  }
  Ok(())
}

struct ListParser<'p, 'a> {
  axis: Axis,
  grid: &'p Grid,
  ctx: &'p LabelContext,
  language: &'p Language,
  table: &'p mut ClueTable,
  warnings: &'p mut Vec<Warning>,
  filler: Vec<&'a str>,
}

impl<'a> ListParser<'_, 'a> {
  fn line(&mut self, line: &'a str) -> Result<()> {
    let Some(parsed) = parse_clue_label(line, self.ctx) else {
      trace!(line, "filler");
      self.filler.push(line);
      return Ok(());
    };
    if !parsed.cell_refs.is_empty() && self.axis != NoDirection {
      return Err(Error::CellRefOutsideNodir(line.to_string()));
    }
    let direction = parsed.token.direction;
    let axis = direction.map_or(self.axis, |d| d.axis);
    let text = split_clue_text(parsed.rest);

    if text.body == "*" && text.enumeration.is_none() && text.anno.is_empty() {
      self.delete(axis, &parsed.token.label);
      return Ok(());
    }

    let cells = self.expand_cell_refs(&parsed.cell_refs, line)?;
    let idx = match &parsed.token.label {
      RawLabel::Number(n) => match self.table.find(axis, &ClueLabel::Number(*n)) {
        Some(idx) => {
          let clue = self.table.get_mut(idx);
          // A deleted light cannot be clued again further down.
          if clue.has_text || clue.deleted {
            return Err(Error::DuplicateClue(clue.name()));
          }
          if let Some(cells) = cells {
            if clue.cells.is_empty() {
              clue.cells = cells;
            } else if cells != clue.cells {
              return Err(Error::CellMismatch(clue.name()));
            }
          }
          idx
        }
        None => self.new_clue(axis, ClueLabel::Number(*n), cells),
      },
      RawLabel::Bracket(text) => {
        let label = ClueLabel::Bracket {
          text: text.clone(),
          id: self.table.next_bracket_id(),
        };
        self.new_clue(axis, label, cells)
      }
    };

    let filler = std::mem::take(&mut self.filler).join("\n");
    let clue = self.table.get_mut(idx);
    if !clue.from_grid {
      clue.reversed = direction.is_some_and(|d| d.reversed);
    } else if direction.is_some_and(|d| d.reversed != clue.reversed) {
      debug!(clue = %clue.name(), "label direction disagrees with the grid; keeping the grid's");
    }
    clue.text = text.body.to_string();
    clue.enumeration = text.enumeration;
    clue.anno = text.anno.to_string();
    clue.filler = filler;
    clue.child_tokens = parsed.children;
    clue.has_text = true;
    trace!(clue = %clue.name(), "parsed clue");

    self.reveal_from_anno(idx)?;
    if matches!(parsed.token.label, RawLabel::Bracket(_)) && !self.table.get(idx).cells.is_empty() {
      relocate_onto_light(self.table, idx);
    }
    Ok(())
  }

  fn new_clue(&mut self, axis: Axis, label: ClueLabel, cells: Option<Vec<Pos>>) -> ClueIdx {
    let mut clue = Clue::new(axis, label);
    clue.cells = cells.unwrap_or_default();
    if clue.cells.is_empty() {
      debug!(clue = %clue.name(), "clue has no cells in the grid");
    }
    self.table.insert(clue)
  }

  /// A `*` body removes a light the grid detector found.
  fn delete(&mut self, axis: Axis, label: &RawLabel) {
    let found = match label {
      RawLabel::Number(n) => self.table.find(axis, &ClueLabel::Number(*n)),
      RawLabel::Bracket(text) => self.table.find_bracket(axis, text),
    };
    match found {
      Some(idx) if self.table.get(idx).from_grid => {
        debug!(clue = %self.table.get(idx).name(), "deleting clue");
        self.table.get_mut(idx).deleted = true;
      }
      _ => {
        let name = match label {
          RawLabel::Number(n) => format!("{n}{}", axis.suffix(false)),
          RawLabel::Bracket(text) => format!("[{text}]"),
        };
        warn!(clue = %name, "cannot delete a clue the grid does not have");
        self.warnings.push(Warning::MissingDeletion(name));
      }
    }
  }

  /// Turns `#cell` references into cells. With a direction, a reference
  /// stands for the whole light starting there.
  fn expand_cell_refs(&self, refs: &[CellRef], line: &str) -> Result<Option<Vec<Pos>>> {
    if refs.is_empty() {
      return Ok(None);
    }
    let mut cells = vec![];
    for cell_ref in refs {
      match cell_ref.direction {
        Some(direction) => {
          let light = self
            .table
            .iter()
            .find(|(_, c)| {
              c.from_grid && c.axis == direction.axis && c.cells.first() == Some(&cell_ref.pos)
            })
            .map(|(_, c)| &c.cells)
            .ok_or_else(|| Error::CellMismatch(line.to_string()))?;
          cells.extend(light.iter().copied());
        }
        None => {
          if !self.grid.get(cell_ref.pos).is_enterable() {
            return Err(Error::CellMismatch(line.to_string()));
          }
          cells.push(cell_ref.pos);
        }
      }
    }
    Ok(Some(cells))
  }

  /// An annotation that starts with `[...]` either lists the clue's cells
  /// (`[#a1 #a2 ...]`) or gives its answer.
  fn reveal_from_anno(&mut self, idx: ClueIdx) -> Result<()> {
    let clue = self.table.get(idx);
    let Some(inner) = clue
      .anno
      .strip_prefix('[')
      .and_then(|rest| rest.split_once(']'))
      .map(|(inner, _)| inner.trim().to_string())
    else {
      return Ok(());
    };
    if inner.is_empty() {
      return Ok(());
    }

    if let Some(refs) = self.anno_cell_refs(&inner) {
      let cells = self.expand_cell_refs(&refs, &inner)?.unwrap_or_default();
      let clue = self.table.get_mut(idx);
      if clue.cells.is_empty() {
        clue.cells = cells;
      } else {
        debug!(clue = %clue.name(), "cells already known; ignoring annotation cells");
        self.warnings.push(Warning::AnnoCellsIgnored(clue.name()));
      }
      return Ok(());
    }

    let solution: String = inner
      .chars()
      .filter(|c| c.is_alphanumeric() || (!c.is_ascii() && !self.language.is_latin()))
      .collect::<String>()
      .to_uppercase();
    if !solution.is_empty() {
      self.table.get_mut(idx).solution_override = Some(solution);
    }
    Ok(())
  }

  fn anno_cell_refs(&self, inner: &str) -> Option<Vec<CellRef>> {
    inner
      .split_whitespace()
      .map(|token| {
        let (cell_ref, rest) = parse_cell_ref(Scanner::new(token.strip_prefix('#')?), self.ctx)?;
        rest.is_empty().then_some(cell_ref)
      })
      .collect()
  }
}

/// A bracket clue whose cells are exactly some grid light without text
/// takes that light over: the light gets the text and shows the bracket
/// label, and the bracket clue goes away.
fn relocate_onto_light(table: &mut ClueTable, idx: ClueIdx) {
  let clue = table.get(idx);
  if clue.axis != NoDirection {
    return;
  }
  let ClueLabel::Bracket { text: bracket, .. } = &clue.label else {
    return;
  };
  let candidates = [Across, Down, ZAxis]
    .into_iter()
    .flat_map(|axis| {
      table.iter().filter_map(move |(t, c)| {
        (c.from_grid && !c.deleted && !c.has_text && c.axis == axis && c.cells == clue.cells)
          .then_some(t)
      })
    })
    .collect::<Vec<_>>();
  let Some(&target) = candidates.first() else {
    return;
  };
  if candidates.len() > 1 {
    debug!(
      clue = %clue.name(),
      matches = candidates.len(),
      "several lights match; using the first"
    );
  }
  debug!(from = %clue.name(), to = %table.get(target).name(), "moving nodir clue onto its light");

  let bracket = bracket.clone();
  let source = table.get_mut(idx);
  source.deleted = true;
  let text = std::mem::take(&mut source.text);
  let enumeration = source.enumeration.take();
  let anno = std::mem::take(&mut source.anno);
  let filler = std::mem::take(&mut source.filler);
  let child_tokens = std::mem::take(&mut source.child_tokens);
  let solution_override = source.solution_override.take();

  let dest = table.get_mut(target);
  dest.text = text;
  dest.enumeration = enumeration;
  dest.anno = anno;
  dest.filler = filler;
  dest.child_tokens = child_tokens;
  dest.solution_override = solution_override;
  dest.has_text = true;
  dest.display_label = bracket.clone();
  dest.nodir_alias = Some(bracket);
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::Puzzle;
  use pretty_assertions::assert_eq;

  const GRID: &str = concat!(
    "exolve-width: 3\n",
    "exolve-height: 3\n",
    "exolve-grid:\n",
    "  CAT\n",
    "  A.O\n",
    "  BEE\n",
  );

  fn puzzle(lists: &str) -> Result<Puzzle> {
    Puzzle::parse(&format!("{GRID}{lists}")).map(|(p, _)| p)
  }

  #[test]
  fn merges_text_into_grid_clues() {
    let p = puzzle("exolve-across:\n  1 Pet (3)\n  Heading\n  3 Buzzer (3) [BEE]\n").unwrap();
    let one = p.lookup("1a").unwrap();
    assert_eq!(p.clue(one).text, "Pet");
    assert_eq!(p.clue(one).cells, [(0, 0), (0, 1), (0, 2)]);
    let three = p.lookup("3a").unwrap();
    assert_eq!(p.clue(three).filler, "Heading");
    assert_eq!(p.clue(three).anno, "[BEE]");
    assert_eq!(p.clue(three).solution.as_deref(), Some("BEE"));
  }

  #[test]
  fn duplicate_text_is_fatal() {
    assert!(matches!(
      puzzle("exolve-across:\n1 Pet (3)\n1 Again (3)\n"),
      Err(Error::DuplicateClue(name)) if name == "1a"
    ));
  }

  #[test]
  fn orphan_clues() {
    let p = puzzle("exolve-across:\n9 Not in the grid (4)\n").unwrap();
    let nine = p.lookup("9a").unwrap();
    assert!(p.is_orphan(nine));
    assert!(!p.clue(nine).from_grid);
  }

  #[test]
  fn deletion() {
    let (p, warnings) =
      Puzzle::parse(&format!("{GRID}exolve-down:\n2 *\n7 *\n")).unwrap();
    assert_eq!(p.lookup("2d"), None);
    assert!(p.lookup("1d").is_some());
    assert!(warnings.contains(&Warning::MissingDeletion("7d".into())));
  }

  #[test]
  fn deleted_clue_cannot_be_clued_again() {
    assert!(matches!(
      puzzle("exolve-across:\n1 *\n1 Pet (3)\n"),
      Err(Error::DuplicateClue(name)) if name == "1a"
    ));
  }

  #[test]
  fn cell_refs_only_in_nodir() {
    assert!(matches!(
      puzzle("exolve-across:\n#a3 [X] Clue\n"),
      Err(Error::CellRefOutsideNodir(_))
    ));
    assert!(matches!(
      puzzle("exolve-nodir:\n#b2 [X] Clue\n"),
      Err(Error::CellMismatch(_))
    ));
  }

  #[test]
  fn nodir_clue_moves_onto_its_light() {
    let p = puzzle("exolve-nodir:\n#a3 #b3 #c3 [P] Pet (3)\n#a1 #c1 [Q] Corners (2)\n").unwrap();
    let one = p.lookup("1a").unwrap();
    assert_eq!(p.clue(one).text, "Pet");
    assert_eq!(p.clue(one).display_label, "P");
    assert_eq!(p.clues().find_bracket(NoDirection, "P"), Some(one));

    let q = p.clues().find_bracket(NoDirection, "Q").unwrap();
    assert_eq!(p.clue(q).axis, NoDirection);
    assert_eq!(p.clue(q).cells, [(2, 0), (2, 2)]);
  }

  #[test]
  fn anno_cells_and_solutions() {
    let (p, warnings) = Puzzle::parse(&format!(
      "{GRID}exolve-nodir:\n[Z] Orphan (2) [#a1 #c1]\nexolve-across:\n1 Pet (3) [#a1 #b1]\n"
    ))
    .unwrap();
    let z = p.lookup("[Z]").unwrap();
    assert_eq!(p.clue(z).cells, [(2, 0), (2, 2)]);
    assert!(warnings.contains(&Warning::AnnoCellsIgnored("1a".into())));
    assert_eq!(p.clue(p.lookup("1a").unwrap()).cells.len(), 3);
  }

  #[test]
  fn three_d_sections_need_a_3d_grid() {
    assert!(matches!(
      puzzle("exolve-3d-across:\n1 Pet (3)\n"),
      Err(Error::InvalidSection(name)) if name == "3d-across"
    ));
  }
}
