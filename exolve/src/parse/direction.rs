use crate::Axis::{self, Across, Down, ZAxis};
use crate::parse::Scanner;

/// A direction as written next to a clue label: which axis, and whether the
/// light runs the "opposite" way (back, up, towards).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Direction {
  pub axis: Axis,
  pub reversed: bool,
}

// Longest tokens first, so that "across" is not read as "a" followed by "cross".
const TOKENS_2D: &[(&str, Axis, bool)] = &[
  ("across", Across, false),
  ("down", Down, false),
  ("back", Across, true),
  ("up", Down, true),
  ("a", Across, false),
  ("d", Down, false),
  ("b", Across, true),
  ("u", Down, true),
];

const TOKENS_3D: &[(&str, Axis, bool)] = &[
  ("towards", ZAxis, true),
  ("across", Across, false),
  ("away", ZAxis, false),
  ("back", Across, true),
  ("down", Down, false),
  ("ac", Across, false),
  ("ba", Across, true),
  ("aw", ZAxis, false),
  ("to", ZAxis, true),
  ("dn", Down, false),
  ("up", Down, true),
];

/// Parses a direction token at the scanner. The token must not run on into
/// more letters, so `5a` and `a5` work but the `a` of `5ab` is not a direction.
pub fn parse_direction(sc: Scanner<'_>, three_d: bool) -> Option<(Direction, Scanner<'_>)> {
  let tokens = if three_d { TOKENS_3D } else { TOKENS_2D };
  tokens.iter().find_map(|&(token, axis, reversed)| {
    let next = sc.take_str_ignore_case(token)?;
    if next.peek().is_some_and(char::is_alphabetic) {
      return None;
    }
    Some((Direction { axis, reversed }, next))
  })
}

#[cfg(test)]
mod tests {
  use super::*;
  use rstest::rstest;

  #[rstest]
  #[case("a", Across, false, "")]
  #[case("Across.", Across, false, ".")]
  #[case("d,", Down, false, ",")]
  #[case("DOWN", Down, false, "")]
  #[case("b 12", Across, true, " 12")]
  #[case("u", Down, true, "")]
  #[case("a5", Across, false, "5")]
  fn parses_2d_directions(
    #[case] input: &str,
    #[case] axis: Axis,
    #[case] reversed: bool,
    #[case] rest: &str,
  ) {
    let (dir, next) = parse_direction(Scanner::new(input), false).unwrap();
    assert_eq!(dir, Direction { axis, reversed });
    assert_eq!(next.rest(), rest);
  }

  #[rstest]
  #[case("ac", Across, false)]
  #[case("ba", Across, true)]
  #[case("aw", ZAxis, false)]
  #[case("To", ZAxis, true)]
  #[case("dn", Down, false)]
  #[case("up", Down, true)]
  #[case("away", ZAxis, false)]
  fn parses_3d_directions(#[case] input: &str, #[case] axis: Axis, #[case] reversed: bool) {
    let (dir, next) = parse_direction(Scanner::new(input), true).unwrap();
    assert_eq!(dir, Direction { axis, reversed });
    assert!(next.is_empty());
  }

  #[test]
  fn rejects_words() {
    assert!(parse_direction(Scanner::new("abc"), false).is_none());
    assert!(parse_direction(Scanner::new("dove"), false).is_none());
    // "a" is a 2-D token but not a 3-D one.
    assert!(parse_direction(Scanner::new("a"), true).is_none());
  }
}
