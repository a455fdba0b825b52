//! Ties clues to each other and to the grid: linked children, typing order
//! between cells, and answers.

use tracing::{debug, warn};

use crate::Axis::{self, Across, Down, NoDirection, ZAxis};
use crate::clues::{ClueIdx, ClueLabel, ClueTable};
use crate::grid::{Grid, Link, Pos};
use crate::options::Options;
use crate::parse::{LabelToken, RawLabel};
use crate::{Error, Result, Warning};

/// Every cell of a clue and its linked children, in entry order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AllCells {
  /// Where a child starts on the cell its predecessor ended on, that cell
  /// appears once.
  pub cells: Vec<Pos>,
  /// The entry ends on the cell it started from. That cell is then both the
  /// first and the last element of `cells`.
  pub snake: bool,
}

impl AllCells {
  /// The number of different cells.
  pub fn distinct(&self) -> usize {
    self.cells.len() - usize::from(self.snake)
  }
}

pub(crate) fn all_cells(table: &ClueTable, idx: ClueIdx) -> AllCells {
  let clue = table.get(idx);
  let mut cells = clue.cells.clone();
  for &child in &clue.children {
    let child_cells = &table.get(child).cells;
    let skip = usize::from(!cells.is_empty() && cells.last() == child_cells.first());
    cells.extend(child_cells.iter().skip(skip).copied());
  }
  let snake = cells.len() > 1 && cells.first() == cells.last();
  AllCells { cells, snake }
}

fn token_name(token: &LabelToken) -> String {
  let label = match &token.label {
    RawLabel::Number(n) => n.to_string(),
    RawLabel::Bracket(text) => format!("[{text}]"),
  };
  match token.direction {
    Some(d) => format!("{label}{}", d.axis.suffix(d.reversed)),
    None => label,
  }
}

/// Finds the clue a child label refers to. An explicit direction wins;
/// otherwise a numbered child is looked up along the parent's axis first,
/// then across, down, away and nodir. Bracket children are only looked up
/// along the parent's axis.
fn resolve_child(table: &ClueTable, parent_axis: Axis, token: &LabelToken) -> Option<ClueIdx> {
  match &token.label {
    RawLabel::Bracket(text) => {
      table.find_bracket(token.direction.map_or(parent_axis, |d| d.axis), text)
    }
    RawLabel::Number(n) => {
      let label = ClueLabel::Number(*n);
      if let Some(d) = token.direction {
        return table.find(d.axis, &label);
      }
      std::iter::once(parent_axis)
        .chain([Across, Down, ZAxis, NoDirection])
        .find_map(|axis| table.find(axis, &label))
    }
  }
}

/// Resolves the child labels of every clue. A clue can be the child of only
/// one parent, and a parent cannot itself be a child.
pub(crate) fn link_children(table: &mut ClueTable) -> Result<()> {
  for idx in table.indices() {
    let tokens = std::mem::take(&mut table.get_mut(idx).child_tokens);
    if tokens.is_empty() {
      continue;
    }
    let parent = table.get(idx);
    let parent_name = parent.name();
    let parent_axis = parent.axis;
    if parent.parent.is_some() {
      return Err(Error::DuplicateChild {
        parent: parent_name,
        child: token_name(&tokens[0]),
      });
    }

    let mut children = Vec::with_capacity(tokens.len());
    for token in &tokens {
      let child = resolve_child(table, parent_axis, token).ok_or_else(|| Error::InvalidChild {
        parent: parent_name.clone(),
        child: token_name(token),
      })?;
      let c = table.get(child);
      if child == idx
        || c.parent.is_some()
        || children.contains(&child)
        || !c.children.is_empty()
        || !c.child_tokens.is_empty()
      {
        return Err(Error::DuplicateChild {
          parent: parent_name,
          child: token_name(token),
        });
      }
      table.get_mut(child).parent = Some(idx);
      children.push(child);
    }
    debug!(parent = %parent_name, children = children.len(), "linked clue");
    table.get_mut(idx).children = children;
  }
  Ok(())
}

/// Records clue membership on the cells, and the successor and predecessor
/// of each cell along each clue.
pub(crate) fn install_links(grid: &mut Grid, table: &ClueTable) {
  for (idx, clue) in table.iter() {
    let axis = clue.axis;
    for &pos in &clue.cells {
      let cell = grid.get_mut(pos);
      match axis {
        NoDirection => cell.nodir_clues.push(idx),
        _ => cell.clues[axis] = Some(idx),
      }
    }
    for pair in clue.cells.windows(2) {
      let (from, to) = (pair[0], pair[1]);
      // For nodir clues sharing a cell, the first one listed decides.
      if axis != NoDirection || grid.get(from).succ[axis].is_none() {
        grid.get_mut(from).succ[axis] = Some(Link { pos: to, axis });
      }
      if axis != NoDirection || grid.get(to).pred[axis].is_none() {
        grid.get_mut(to).pred[axis] = Some(Link { pos: from, axis });
      }
    }
  }

  for (idx, clue) in table.iter() {
    if clue.children.is_empty() {
      continue;
    }
    let parts = std::iter::once(idx)
      .chain(clue.children.iter().copied())
      .map(|i| table.get(i))
      .filter(|c| !c.cells.is_empty())
      .collect::<Vec<_>>();
    for pair in parts.windows(2) {
      let (prev, next) = (pair[0], pair[1]);
      let (Some(&last), Some(&first)) = (prev.cells.last(), next.cells.first()) else {
        continue;
      };
      if last == first {
        // Shared junction cell: typing there continues from the child's
        // second cell.
        if let Some(&second) = next.cells.get(1) {
          grid.get_mut(last).succ[prev.axis] = Some(Link {
            pos: second,
            axis: next.axis,
          });
        }
      } else {
        grid.get_mut(last).succ[prev.axis] = Some(Link {
          pos: first,
          axis: next.axis,
        });
        grid.get_mut(first).pred[next.axis] = Some(Link {
          pos: last,
          axis: prev.axis,
        });
      }
    }

    if all_cells(table, idx).snake {
      if let (Some(final_part), Some(&second)) = (parts.last(), clue.cells.get(1)) {
        // The snake closes on its first cell; keep going around, forwards only.
        if let Some(&end) = final_part.cells.last() {
          if final_part.axis != clue.axis {
            grid.get_mut(end).succ[final_part.axis] = Some(Link {
              pos: second,
              axis: clue.axis,
            });
          }
        }
      }
    }
  }
}

/// Spreads the word ends and hyphens of each parent's enum over the parent
/// and its children, as offsets into each part's own cells.
pub(crate) fn project_breaks(table: &mut ClueTable) {
  for idx in table.indices() {
    let clue = table.get(idx);
    if clue.parent.is_some() {
      continue;
    }
    let Some(enumeration) = &clue.enumeration else {
      continue;
    };
    let parts = std::iter::once(idx)
      .chain(clue.children.iter().copied())
      .collect::<Vec<_>>();
    let word_ends = enumeration.word_ends.clone();
    let hyphens = enumeration.hyphens.clone();

    let locate = |table: &ClueTable, offset: usize| -> Option<(ClueIdx, usize)> {
      let mut start = 0;
      let mut prev_last: Option<Pos> = None;
      for &part in &parts {
        let cells = &table.get(part).cells;
        let skip = usize::from(prev_last.is_some() && prev_last.as_ref() == cells.first());
        let new_cells = cells.len().saturating_sub(skip);
        if offset < start + new_cells {
          return Some((part, offset - start + skip));
        }
        start += new_cells;
        if let Some(&last) = cells.last() {
          prev_last = Some(last);
        }
      }
      None
    };

    for offset in word_ends {
      if let Some((part, local)) = locate(table, offset) {
        table.get_mut(part).word_ends.push(local);
      }
    }
    for offset in hyphens {
      if let Some((part, local)) = locate(table, offset) {
        table.get_mut(part).hyphens.push(local);
      }
    }
  }
}

/// Fills in answers: from the annotation when it gives one, otherwise from
/// the grid when every letter is known.
pub(crate) fn derive_solutions(grid: &Grid, table: &mut ClueTable) {
  for idx in table.indices() {
    let clue = table.get(idx);
    if let Some(solution) = clue.solution_override.clone() {
      table.get_mut(idx).solution = Some(solution);
      continue;
    }
    let cells = if clue.parent.is_some() {
      clue.cells.clone()
    } else {
      all_cells(table, idx).cells
    };
    if cells.is_empty() {
      continue;
    }
    let letters = cells
      .iter()
      .map(|&pos| grid.get(pos).letter())
      .collect::<Option<String>>();
    table.get_mut(idx).solution = letters;
  }
}

/// Reports enums that do not fit their cells, and lights without clues.
pub(crate) fn check_consistency(
  grid: &Grid,
  table: &ClueTable,
  options: &Options,
  warnings: &mut Vec<Warning>,
) {
  for (idx, clue) in table.iter() {
    if clue.parent.is_some() {
      continue;
    }
    if clue.from_grid && !clue.has_text && !options.ignore_unclued {
      debug!(clue = %clue.name(), "unclued light");
      warnings.push(Warning::UncluedLight(clue.name()));
    }

    if options.ignore_enum_mismatch {
      continue;
    }
    let Some(enum_len) = clue.enumeration.as_ref().map(|e| e.len).filter(|&n| n > 0) else {
      continue;
    };
    let known = !clue.is_orphan() && clue.children.iter().all(|&c| !table.get(c).is_orphan());
    if !known {
      continue;
    }
    let all = all_cells(table, idx);
    if all.cells.iter().any(|&pos| grid.get(pos).is_dgmless) {
      continue;
    }
    let distinct = all.distinct();
    if enum_len != distinct && !(all.snake && enum_len == distinct + 1) {
      warn!(clue = %clue.name(), enum_len, cells = distinct, "enum does not match the grid");
      warnings.push(Warning::EnumMismatch {
        clue: clue.name(),
        enum_len,
        cells: distinct,
      });
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::Puzzle;
  use pretty_assertions::assert_eq;

  const GRID: &str = concat!(
    "exolve-width: 5\n",
    "exolve-height: 3\n",
    "exolve-grid:\n",
    "  HOUSE\n",
    "  A.N.A\n",
    "  TABLE\n",
  );

  fn build(lists: &str) -> Result<(Puzzle, Vec<Warning>)> {
    Puzzle::parse(&format!("{GRID}{lists}"))
  }

  #[test]
  fn children_and_break_projection() {
    let (p, warnings) = build(concat!(
      "exolve-option: ignore-unclued\n",
      "exolve-across:\n",
      "1, 4 Where to eat (5,5)\n",
      "4 See 1\n",
    ))
    .unwrap();
    assert!(warnings.is_empty(), "{warnings:?}");

    let one = p.lookup("1a").unwrap();
    let four = p.lookup("4a").unwrap();
    assert_eq!(p.clue(one).children, [four]);
    assert_eq!(p.clue(four).parent, Some(one));
    assert_eq!(p.clue(one).word_ends, [4]);
    assert!(p.clue(four).word_ends.is_empty());
    assert_eq!(p.clue(one).solution.as_deref(), Some("HOUSETABLE"));
    assert_eq!(p.clue(four).solution.as_deref(), Some("TABLE"));

    let all = p.all_cells(one);
    assert_eq!(all.cells.len(), 10);
    assert!(!all.snake);

    // Typing off the end of 1a carries on into 4a.
    assert_eq!(
      p.next_cell((0, 4), Across),
      Some(Link {
        pos: (2, 0),
        axis: Across
      })
    );
    assert_eq!(
      p.prev_cell((2, 0), Across),
      Some(Link {
        pos: (0, 4),
        axis: Across
      })
    );
  }

  #[test]
  fn child_errors() {
    assert!(matches!(
      build("exolve-across:\n1, 9 Clue (8)\n"),
      Err(Error::InvalidChild { .. })
    ));
    assert!(matches!(
      build("exolve-across:\n1, 4 Clue (10)\n4 See 1\nexolve-down:\n1, 4a Clue (8)\n"),
      Err(Error::DuplicateChild { .. })
    ));
    assert!(matches!(
      build("exolve-across:\n1, 1 Clue (10)\n"),
      Err(Error::DuplicateChild { .. })
    ));
  }

  #[test]
  fn junction_cell_is_shared() {
    // 1d ends on the cell where 4a starts.
    let (p, warnings) = build(concat!(
      "exolve-option: ignore-unclued\n",
      "exolve-down:\n",
      "1, 4a Hat table (7)\n",
    ))
    .unwrap();
    assert!(warnings.is_empty(), "{warnings:?}");
    let one = p.lookup("1d").unwrap();
    let all = p.all_cells(one);
    assert_eq!(all.cells, [(0, 0), (1, 0), (2, 0), (2, 1), (2, 2), (2, 3), (2, 4)]);
    assert_eq!(
      p.next_cell((2, 0), Down),
      Some(Link {
        pos: (2, 1),
        axis: Across
      })
    );
    // No backward edge is added at the junction.
    assert_eq!(p.prev_cell((2, 0), Across), None);
    assert_eq!(p.clue(one).solution.as_deref(), Some("HATABLE"));
  }

  #[test]
  fn breaks_land_in_children() {
    let (p, warnings) = build(concat!(
      "exolve-option: ignore-unclued\n",
      "exolve-across:\n",
      "1, 4 Where (5,2-3)\n",
      "4 See 1\n",
    ))
    .unwrap();
    assert!(warnings.is_empty(), "{warnings:?}");
    let one = p.lookup("1a").unwrap();
    let four = p.lookup("4a").unwrap();
    assert_eq!(p.clue(one).word_ends, [4]);
    assert_eq!(p.clue(four).word_ends, [1]);
    assert_eq!(p.clue(four).hyphens, [1]);

    // The junction cell is counted once, in the parent.
    let (p, warnings) = build(concat!(
      "exolve-option: ignore-unclued\n",
      "exolve-down:\n",
      "1, 4a Hat table (4,3)\n",
    ))
    .unwrap();
    assert!(warnings.is_empty(), "{warnings:?}");
    let one = p.lookup("1d").unwrap();
    let four = p.lookup("4a").unwrap();
    assert!(p.clue(one).word_ends.is_empty());
    assert_eq!(p.clue(four).word_ends, [1]);
  }

  #[test]
  fn enum_mismatch_warnings() {
    let (_, warnings) =
      build("exolve-option: ignore-unclued\nexolve-across:\n1 Home (4)\n").unwrap();
    assert_eq!(
      warnings,
      [Warning::EnumMismatch {
        clue: "1a".into(),
        enum_len: 4,
        cells: 5
      }]
    );

    let (_, warnings) = build(concat!(
      "exolve-option: ignore-unclued ignore-enum-mismatch\n",
      "exolve-across:\n1 Home (4)\n",
    ))
    .unwrap();
    assert!(warnings.is_empty());

    // Orphans are not checked.
    let (_, warnings) =
      build("exolve-option: ignore-unclued\nexolve-across:\n7 Lost (4)\n").unwrap();
    assert!(warnings.is_empty());
  }

  #[test]
  fn unclued_lights_skip_children() {
    let (_, warnings) = build(concat!(
      "exolve-across:\n1, 4 Where to eat (5,5)\n",
      "exolve-down:\n1 Cap (3)\n2 Fruit (3)\n3 Ear (3)\n",
    ))
    .unwrap();
    assert_eq!(warnings, []);

    let (_, warnings) = build("exolve-across:\n1 House (5)\n4 Table (5)\n").unwrap();
    assert_eq!(
      warnings,
      [
        Warning::UncluedLight("1d".into()),
        Warning::UncluedLight("2d".into()),
        Warning::UncluedLight("3d".into()),
      ]
    );
  }

  #[test]
  fn snake() {
    let text = concat!(
      "exolve-width: 3\n",
      "exolve-height: 3\n",
      "exolve-grid:\n",
      "  ABC\n",
      "  D.E\n",
      "  FGH\n",
      "exolve-reversals: c1-a1 a1-a3\n",
      "exolve-across:\n",
      "1, 2, 4, 3 Round and round (9)\n",
    );
    let (p, warnings) = Puzzle::parse(text).unwrap();
    assert!(warnings.is_empty(), "{warnings:?}");
    let one = p.lookup("1a").unwrap();
    let all = p.all_cells(one);
    assert!(all.snake);
    assert_eq!(all.distinct(), 8);
    assert_eq!(all.cells.first(), all.cells.last());
    assert_eq!(p.lookup("4").map(|i| p.clue(i).name()), Some("4b".to_string()));

    // Off the end of the snake, typing goes around again.
    assert_eq!(
      p.next_cell((0, 0), Down),
      Some(Link {
        pos: (0, 1),
        axis: Across
      })
    );

    let (_, warnings) = Puzzle::parse(&text.replace("(9)", "(7)")).unwrap();
    assert_eq!(
      warnings,
      [Warning::EnumMismatch {
        clue: "1a".into(),
        enum_len: 7,
        cells: 8
      }]
    );
  }
}
