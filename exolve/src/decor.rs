//! Display decorations: ninas, colours, and forced hyphens and bars.

use tracing::warn;

use crate::Axis::{Across, Down, NoDirection, ZAxis};
use crate::clues::{ClueLabel, ClueTable};
use crate::grid::{Grid, Pos};
use crate::link::all_cells;
use crate::parse::{LabelContext, RawLabel, Scanner, parse_label_token, parse_location_str};
use crate::sections::Sections;
use crate::Warning;

const FORCE_SECTIONS: &[&str] = &[
  "force-hyphen-right",
  "force-hyphen-below",
  "force-bar-right",
  "force-bar-below",
];

/// Resolves a location token: a single cell (`a1`, `r2c3`) or a clue label
/// (`5a`, `[P]`), which stands for all of that clue's cells.
fn resolve(token: &str, grid: &Grid, table: &ClueTable, ctx: &LabelContext) -> Option<Vec<Pos>> {
  if let Some(pos) = parse_location_str(token, grid.height(), grid.width()) {
    return Some(vec![pos]);
  }
  let (label, rest) = parse_label_token(Scanner::new(token), ctx)?;
  if !rest.is_empty() {
    return None;
  }
  let axes = match label.direction {
    Some(d) => vec![d.axis],
    None => vec![Across, Down, ZAxis, NoDirection],
  };
  let idx = axes.into_iter().find_map(|axis| match &label.label {
    RawLabel::Number(n) => table.find(axis, &ClueLabel::Number(*n)),
    RawLabel::Bracket(text) => table.find_bracket(axis, text),
  })?;
  let cells = all_cells(table, idx).cells;
  (!cells.is_empty()).then_some(cells)
}

fn section_lines<'a>(
  sections: &'a Sections<'_>,
  name: &'a str,
) -> impl Iterator<Item = (String, &'a str)> + 'a {
  sections.all(name).flat_map(move |s| {
    std::iter::once(s.value)
      .chain(sections.content(s).iter().copied())
      .filter(|line| !line.is_empty())
      .map(move |line| (s.name.clone(), line))
  })
}

/// Applies the exolve-nina, exolve-colour and exolve-force-* sections to
/// the grid, returning the nina cell groups. Tokens that are neither cells
/// nor clues are skipped with a warning.
pub(crate) fn apply_decorations(
  sections: &Sections<'_>,
  grid: &mut Grid,
  table: &ClueTable,
  ctx: &LabelContext,
  warnings: &mut Vec<Warning>,
) -> Vec<Vec<Pos>> {
  let mut invalid = |section: &str, token: &str| {
    warn!(section, token, "ignoring invalid location");
    warnings.push(Warning::InvalidLocation {
      section: section.to_string(),
      token: token.to_string(),
    });
  };

  let mut ninas = vec![];
  for (section, line) in section_lines(sections, "nina") {
    let mut cells = vec![];
    for token in line.split_whitespace() {
      match resolve(token, grid, table, ctx) {
        Some(found) => cells.extend(found),
        None => invalid(&section, token),
      }
    }
    if cells.is_empty() {
      continue;
    }
    for &pos in &cells {
      grid.get_mut(pos).ninas.push(ninas.len());
    }
    ninas.push(cells);
  }

  for (section, line) in section_lines(sections, "colour") {
    let mut tokens = line.split_whitespace();
    let Some(colour) = tokens.next() else {
      continue;
    };
    for token in tokens {
      match resolve(token, grid, table, ctx) {
        Some(found) => {
          for pos in found {
            grid.get_mut(pos).colour = Some(colour.to_string());
          }
        }
        None => invalid(&section, token),
      }
    }
  }

  for &name in FORCE_SECTIONS {
    for (section, line) in section_lines(sections, name) {
      for token in line.split_whitespace() {
        let Some(found) = resolve(token, grid, table, ctx) else {
          invalid(&section, token);
          continue;
        };
        for pos in found {
          let cell = grid.get_mut(pos);
          match name {
            "force-hyphen-right" => cell.force_hyphen_right = true,
            "force-hyphen-below" => cell.force_hyphen_below = true,
            "force-bar-right" => cell.force_bar_right = true,
            _ => cell.force_bar_below = true,
          }
        }
      }
    }
  }
  ninas
}
