use exolve::{Axis, Cursor, Link, Puzzle, Registry, Solution};
use pretty_assertions::assert_eq;

const SPARE_PARTS: &str = include_str!("../puzzles/spare-parts.txt");
const HIDDEN_RING: &str = include_str!("../puzzles/hidden-ring.txt");
const CUBE: &str = include_str!("../puzzles/cube.txt");

fn solution(puzzle: &Puzzle, written: &str) -> String {
  let idx = puzzle.lookup(written).unwrap();
  puzzle.clue(idx).solution.clone().unwrap_or_default()
}

#[test]
fn spare_parts() {
  let (puzzle, warnings) = Puzzle::parse(SPARE_PARTS).unwrap();
  assert!(warnings.is_empty(), "{warnings:?}");
  assert_eq!(puzzle.id(), Some("spare-parts"));
  assert_eq!(puzzle.title(), "Spare Parts");
  assert_eq!(puzzle.setter(), "Quill");
  assert_eq!(
    puzzle.metadata().preamble,
    "A small puzzle to get started.\nThe corners are marked as a nina."
  );

  assert_eq!(solution(&puzzle, "1a"), "SPARE");
  assert_eq!(solution(&puzzle, "1d"), "SHARD");
  assert_eq!(solution(&puzzle, "2d"), "ALONE");
  assert_eq!(solution(&puzzle, "3d"), "ENTER");
  assert_eq!(puzzle.clues().len(), 6);

  let one = puzzle.lookup("1a").unwrap();
  assert_eq!(puzzle.clue(one).text, "Extra");
  assert_eq!(puzzle.clue(one).anno, "[SPARE] S + PARE");

  let four = puzzle.lookup("4a").unwrap();
  let five = puzzle.lookup("5a").unwrap();
  assert_eq!(puzzle.clue(four).children, [five]);
  assert_eq!(puzzle.owning_clue(five), four);
  assert_eq!(puzzle.all_cells(four).cells.len(), 10);
  assert_eq!(
    puzzle.next_cell((2, 4), Axis::Across),
    Some(Link {
      pos: (4, 0),
      axis: Axis::Across
    })
  );

  assert_eq!(puzzle.ninas(), [vec![(0, 0), (0, 4), (4, 0), (4, 4)]]);
  assert_eq!(puzzle.cell((0, 3)).colour.as_deref(), Some("lightblue"));
  assert_eq!(puzzle.cell((1, 1)).solution, Solution::Block);
}

#[test]
fn solving_spare_parts() {
  let (mut puzzle, _) = Puzzle::parse(SPARE_PARTS).unwrap();
  let mut cursor = Cursor::from_puzzle(&puzzle).unwrap();
  assert_eq!(cursor.pos, (0, 0));
  for letter in ["s", "p", "a", "r", "e"] {
    puzzle.set_letter(cursor.pos, letter);
    cursor.advance(&puzzle);
  }
  let one = puzzle.lookup("1a").unwrap();
  assert_eq!(puzzle.check(one), Some(true));

  let four = puzzle.lookup("4a").unwrap();
  assert_eq!(puzzle.clue_entry(four), "????? ?????");
  puzzle.reveal(four);
  assert_eq!(puzzle.clue_entry(four), "ALOFT DREAR");
  assert!(!puzzle.is_solved());
  for written in ["1d", "2d", "3d"] {
    let idx = puzzle.lookup(written).unwrap();
    puzzle.reveal(idx);
  }
  assert!(puzzle.is_solved());
}

#[test]
fn hidden_ring() {
  let (puzzle, warnings) = Puzzle::parse(HIDDEN_RING).unwrap();
  // The enum of 1a does not fit, but the solver cannot see the light anyway.
  assert!(warnings.is_empty(), "{warnings:?}");
  assert!(puzzle.cell((1, 1)).is_enterable());
  assert!(!puzzle.cell((1, 1)).is_light());

  let spans = puzzle.spans();
  assert_eq!(spans.len(), 6);
  assert_eq!(spans.iter().filter(|s| s.clue.is_none()).count(), 2);
  let middle = puzzle.span_at((1, 1), Axis::Across).unwrap();
  assert_eq!(middle.cells, [(1, 0), (1, 1), (1, 2)]);
  assert_eq!(middle.clue, None);
  assert_eq!(
    puzzle.next_cell((1, 0), Axis::Across).map(|link| link.pos),
    Some((1, 1))
  );
}

#[test]
fn cube() {
  let (puzzle, warnings) = Puzzle::parse(CUBE).unwrap();
  assert!(warnings.is_empty(), "{warnings:?}");
  assert!(puzzle.grid().is_3d());
  assert_eq!(puzzle.clues().len(), 12);

  let expected = [
    ("1ac", "CD"),
    ("3ac", "AB"),
    ("5ac", "GH"),
    ("6ac", "EF"),
    ("3dn", "AC"),
    ("4dn", "BD"),
    ("6dn", "EG"),
    ("7dn", "FH"),
    ("1aw", "CG"),
    ("2aw", "DH"),
    ("3aw", "AE"),
    ("4aw", "BF"),
  ];
  for (written, answer) in expected {
    assert_eq!(solution(&puzzle, written), answer, "{written}");
  }
  assert_eq!(puzzle.lookup("1a"), None);

  let away = puzzle.lookup("1aw").unwrap();
  assert_eq!(puzzle.clue(away).text, "Through near left");
  assert_eq!(puzzle.clue(away).axis, Axis::ZAxis);
  assert_eq!(puzzle.cell((1, 0)).number, Some(1));
  assert_eq!(puzzle.cell((2, 1)).number, Some(7));

  let mut cursor = Cursor {
    pos: (1, 0),
    axis: Axis::ZAxis,
  };
  cursor.advance(&puzzle);
  assert_eq!(cursor.pos, (3, 0));
}

#[test]
fn sample_puzzles_share_a_registry() {
  let mut registry = Registry::new();
  for text in [SPARE_PARTS, HIDDEN_RING, CUBE] {
    let (puzzle, _) = Puzzle::parse(text).unwrap();
    registry.add(puzzle).unwrap();
  }
  assert_eq!(
    registry.ids().collect::<Vec<_>>(),
    ["spare-parts", "hidden-ring", "cube"]
  );
}
