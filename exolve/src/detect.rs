//! Finds the lights in a grid, applies reversals, and numbers them.

use std::collections::BTreeMap;

use tracing::{debug, trace};

use crate::Axis;
use crate::clues::{Clue, ClueLabel, ClueTable};
use crate::grid::{Grid, Pos};

/// Whether a light along `axis` starts at `pos`: the cell is a light, the
/// cell before it is not (or a bar is in the way), and the cell after it is.
pub fn starts_light(grid: &Grid, pos: Pos, axis: Axis) -> bool {
  if !grid.get(pos).is_light() {
    return false;
  }
  grid.light_neighbor(pos, axis, false).is_none() && grid.light_neighbor(pos, axis, true).is_some()
}

/// The cells of the light starting at `start`.
pub fn light_from(grid: &Grid, start: Pos, axis: Axis) -> Vec<Pos> {
  let mut cells = vec![start];
  let mut pos = start;
  while let Some(next) = grid.light_neighbor(pos, axis, true) {
    cells.push(next);
    pos = next;
  }
  cells
}

#[derive(Debug)]
struct Light {
  axis: Axis,
  cells: Vec<Pos>,
  reversed: bool,
}

/// Adds a clue to `table` for every light in the grid, numbering the cells
/// where lights start. Matching reversals are removed from `reversals`, so
/// whatever is left there matched nothing.
pub(crate) fn detect_clues(
  grid: &mut Grid,
  reversals: &mut Vec<(Pos, Pos)>,
  table: &mut ClueTable,
) {
  let mut by_start: BTreeMap<Pos, Vec<Light>> = BTreeMap::new();
  for pos in grid.positions() {
    for &axis in Axis::grid_axes(grid.is_3d()) {
      if !starts_light(grid, pos, axis) {
        continue;
      }
      let mut cells = light_from(grid, pos, axis);
      let (first, last) = (cells[0], cells[cells.len() - 1]);
      let reversed = match reversals.iter().position(|&r| r == (last, first)) {
        Some(i) => {
          reversals.remove(i);
          cells.reverse();
          trace!(?first, ?last, ?axis, "reversed light");
          true
        }
        None => false,
      };
      by_start.entry(cells[0]).or_default().push(Light {
        axis,
        cells,
        reversed,
      });
    }
  }

  let mut next_number = 1;
  let mut next_skipped = 1;
  for pos in grid.numbering_order() {
    let Some(mut lights) = by_start.remove(&pos) else {
      continue;
    };
    lights.sort_by_key(|light| light.axis);
    let cell = grid.get_mut(pos);
    let label = if cell.skip_num {
      next_skipped += 1;
      ClueLabel::Skipped(next_skipped - 1)
    } else {
      cell.number = Some(next_number);
      next_number += 1;
      ClueLabel::Number(next_number - 1)
    };
    for light in lights {
      let mut clue = Clue::new(light.axis, label.clone());
      clue.cells = light.cells;
      clue.reversed = light.reversed;
      clue.from_grid = true;
      table.insert(clue);
    }
  }
  debug!(lights = table.len(), numbered = next_number - 1, "detected lights");
}
