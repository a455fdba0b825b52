use exolve::{Axis, Puzzle, Warning};
use pretty_assertions::assert_eq;
use rstest::rstest;

const CAT: &str = concat!(
  "exolve-width: 3\n",
  "exolve-height: 3\n",
  "exolve-grid:\n",
  "  CAT\n",
  "  A.O\n",
  "  BEE\n",
);

fn with_cat(rest: &str) -> String {
  format!("{CAT}{rest}")
}

#[rstest]
#[case("exolve-height: 1\nexolve-grid:\nAB\n", "MissingSection")]
#[case("exolve-width: 2\nexolve-height: 0\nexolve-grid:\n", "InvalidNumber")]
#[case("exolve-width: 2\nexolve-height: 2\nexolve-grid:\nAB\n", "GridLineCount")]
#[case("exolve-width: 2\nexolve-height: 2\nexolve-grid:\nAB\nC\n", "GridRowWidth")]
#[case("exolve-width: 2\nexolve-height: 1\nexolve-grid:\nA?\n", "InvalidLetter")]
#[case("exolve-width: 2\nexolve-height: 1\nexolve-grid:\nA.!\n", "PrefillNotLight")]
#[case("exolve-width: 1\nexolve-height: 3\nexolve-3d: 2\nexolve-grid:\nA\nB\nC\n", "LayerMismatch")]
#[case("exolve-width: 1\nexolve-height: 2\nexolve-3d: none\nexolve-grid:\nA\nB\n", "InvalidNumber")]
fn grid_errors(#[case] text: &str, #[case] expected: &str) {
  let e = Puzzle::parse(text).unwrap_err();
  assert!(format!("{e:?}").starts_with(expected), "{e:?}");
}

#[rstest]
#[case("exolve-across:\n1 Pet (3)\n1 Again (3)\n", "DuplicateClue")]
#[case("exolve-across:\n1, 9 Pet and more (6)\n", "InvalidChild")]
#[case("exolve-across:\n1, 3 Pet and more (6)\n3, 1 Round again (6)\n", "DuplicateChild")]
#[case("exolve-across:\n#a3 [X] Somewhere (3)\n", "CellRefOutsideNodir")]
#[case("exolve-nodir:\n#b2 [X] In the middle (1)\n", "CellMismatch")]
#[case("exolve-3d-across:\n1 Pet (3)\n", "InvalidSection")]
fn clue_errors(#[case] lists: &str, #[case] expected: &str) {
  let e = Puzzle::parse(&with_cat(lists)).unwrap_err();
  assert!(format!("{e:?}").starts_with(expected), "{e:?}");
  assert!(!e.to_string().is_empty());
}

#[rstest]
#[case("exolve-option: ignore-unclued\nexolve-across:\n1 Pet (4)\n", "EnumMismatch")]
#[case("exolve-across:\n1 Pet (3)\n", "UncluedLight")]
#[case("exolve-option: ignore-unclued\nexolve-nina: z9\n", "InvalidLocation")]
#[case("exolve-option: ignore-unclued\nexolve-down:\n8 *\n", "MissingDeletion")]
#[case("exolve-option: ignore-unclued no-such-option\n", "UnknownOption")]
fn warnings_do_not_stop_the_build(#[case] rest: &str, #[case] expected: &str) {
  let (_, warnings) = Puzzle::parse(&with_cat(rest)).unwrap();
  assert!(
    warnings.iter().any(|w| format!("{w:?}").starts_with(expected)),
    "{warnings:?}"
  );
}

const LOOP: &str = concat!(
  "exolve-width: 4\n",
  "exolve-height: 3\n",
  "exolve-grid:\n",
  "  LOOP\n",
  "  I..A\n",
  "  DRAW\n",
  "exolve-reversals: d1-a1 c3-a3\n",
  "exolve-across:\n",
  "  3 Pull (4)\n",
  "exolve-down:\n",
  "  1 Cover (3)\n",
  "  2 Sheet (3)\n",
  "exolve-nodir:\n",
  "  #a3 #b3 #c3 #d3 [L] Ring (4)\n",
);

#[test]
fn reversed_lights_and_nodir_clues() {
  let (puzzle, warnings) = Puzzle::parse(LOOP).unwrap();
  assert_eq!(
    warnings,
    vec![Warning::UnusedReversal {
      first: (0, 2),
      last: (0, 0)
    }]
  );
  assert_eq!(puzzle.unused_reversals(), [((0, 2), (0, 0))]);

  let three = puzzle.lookup("3b").unwrap();
  assert_eq!(puzzle.lookup("3a"), Some(three));
  let clue = puzzle.clue(three);
  assert!(clue.reversed);
  assert_eq!(clue.name(), "3b");
  assert_eq!(clue.text, "Pull");
  assert_eq!(clue.solution.as_deref(), Some("WARD"));
  assert_eq!(clue.cells, [(2, 3), (2, 2), (2, 1), (2, 0)]);
  assert_eq!(puzzle.cell((2, 3)).number, Some(3));
  assert_eq!(puzzle.cell((2, 0)).number, None);
  assert_eq!(
    puzzle.next_cell((2, 3), Axis::Across).map(|link| link.pos),
    Some((2, 2))
  );

  let one = puzzle.lookup("1a").unwrap();
  assert_eq!(puzzle.lookup("[L]"), Some(one));
  assert_eq!(puzzle.clue(one).text, "Ring");
  assert_eq!(puzzle.clue(one).display_label, "L");
  assert_eq!(puzzle.clues().len(), 4);
}
