use crate::grid::Pos;
use crate::parse::Scanner;

/// Parses a cell location: `r<row>c<col>` or `c<col>r<row>` (1-based, rows
/// counted from the top), or chess notation `<letter><number>` where the
/// letter picks the column and the number counts rows from the bottom.
///
/// Returns None for malformed or out-of-bounds locations; callers decide
/// whether that is fatal.
pub fn parse_location(sc: Scanner<'_>, height: usize, width: usize) -> Option<(Pos, Scanner<'_>)> {
  parse_row_col(sc, height, width).or_else(|| parse_chess(sc, height, width))
}

fn parse_row_col(sc: Scanner<'_>, height: usize, width: usize) -> Option<(Pos, Scanner<'_>)> {
  let (first, sc) = sc.pop()?;
  let first = first.to_ascii_lowercase();
  if first != 'r' && first != 'c' {
    return None;
  }
  let (a, sc) = sc.take_number()?;
  let second = if first == 'r' { "c" } else { "r" };
  let sc = sc.take_str_ignore_case(second)?;
  let (b, sc) = sc.take_number()?;
  let (row, col) = if first == 'r' { (a, b) } else { (b, a) };
  let (row, col) = (row as usize, col as usize);
  if row == 0 || col == 0 || row > height || col > width {
    return None;
  }
  Some(((row - 1, col - 1), sc))
}

fn parse_chess(sc: Scanner<'_>, height: usize, width: usize) -> Option<(Pos, Scanner<'_>)> {
  let (letter, sc) = sc.pop()?;
  if !letter.is_ascii_alphabetic() {
    return None;
  }
  let col = (letter.to_ascii_lowercase() as u8 - b'a') as usize;
  let (n, sc) = sc.take_number()?;
  let n = n as usize;
  if col >= width || n == 0 || n > height {
    return None;
  }
  Some(((height - n, col), sc))
}

/// Parses a whole string as a single location.
pub fn parse_location_str(s: &str, height: usize, width: usize) -> Option<Pos> {
  match parse_location(Scanner::new(s.trim()), height, width) {
    Some((pos, rest)) if rest.is_empty() => Some(pos),
    _ => None,
  }
}

/// Parses `first-last`, as used by reversal directives.
pub fn parse_location_pair(s: &str, height: usize, width: usize) -> Option<(Pos, Pos)> {
  let (first, last) = s.split_once('-')?;
  Some((
    parse_location_str(first, height, width)?,
    parse_location_str(last, height, width)?,
  ))
}
