use std::ops::Range;

use crate::parse::Scanner;

/// The answer-length annotation of a clue, like `(5,3)` or `(4-2)`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Enumeration {
  /// Total number of letters; 0 when the enum does not say (e.g. `(2 words)`).
  pub len: usize,
  /// 0-based offsets of letters that end a word (not counting the last one).
  pub word_ends: Vec<usize>,
  /// 0-based offsets of letters followed by a hyphen.
  pub hyphens: Vec<usize>,
  /// One `?` per letter, with the separators of the enum between them, e.g.
  /// `????? ???` for `(5,3)`.
  pub placeholder: String,
  /// False for word-ish forms like `(6 letters)`.
  pub numeric: bool,
}

/// A clue line's text after the label, split into clue, enum and annotation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClueText<'a> {
  pub body: &'a str,
  pub enumeration: Option<Enumeration>,
  pub anno: &'a str,
  /// Byte range of the clue body in the original text.
  pub body_range: Range<usize>,
  /// Byte range of the enum, parentheses included. Empty when there is none.
  pub enum_range: Range<usize>,
  /// Byte range of the annotation.
  pub anno_range: Range<usize>,
}

/// Splits clue text around its enum. The last numeric enum is used, unless an
/// earlier one is directly followed by a `[...]` annotation, in which case that
/// one is. Failing any numeric enum, the last `(n letters)`-style one is used.
pub fn split_clue_text(text: &str) -> ClueText<'_> {
  let mut numeric = None;
  let mut wordy = None;

  for (i, _) in text.match_indices('(') {
    let sc = Scanner::new(text);
    let start = skip_to(sc, i);
    if let Some((enumeration, end)) = parse_numeric(start) {
      let followed_by_anno = end.skip_whitespace().peek() == Some('[');
      numeric = Some((enumeration, i..end.offset()));
      if followed_by_anno {
        break;
      }
    } else if let Some((enumeration, end)) = parse_wordy(start) {
      wordy = Some((enumeration, i..end.offset()));
    }
  }

  match numeric.or(wordy) {
    Some((enumeration, range)) => {
      let body_range = trimmed(text, 0..range.start);
      let anno_range = trimmed(text, range.end..text.len());
      ClueText {
        body: &text[body_range.clone()],
        enumeration: Some(enumeration),
        anno: &text[anno_range.clone()],
        body_range,
        enum_range: range,
        anno_range,
      }
    }
    None => {
      let body_range = trimmed(text, 0..text.len());
      ClueText {
        body: &text[body_range.clone()],
        enumeration: None,
        anno: "",
        body_range,
        enum_range: text.len()..text.len(),
        anno_range: text.len()..text.len(),
      }
    }
  }
}

fn skip_to(sc: Scanner<'_>, offset: usize) -> Scanner<'_> {
  let mut sc = sc;
  while sc.offset() < offset {
    match sc.pop() {
      Some((_, next)) => sc = next,
      None => break,
    }
  }
  sc
}

/// Narrows a byte range so that it excludes surrounding whitespace.
fn trimmed(text: &str, range: Range<usize>) -> Range<usize> {
  let slice = &text[range.clone()];
  let start = range.start + (slice.len() - slice.trim_start().len());
  let end = range.end - (slice.len() - slice.trim_end().len());
  if start > end { start..start } else { start..end }
}

/// Longest answer an enum may describe. Anything larger is read as clue text.
const MAX_LEN: usize = 1 << 12;

#[derive(Clone, Copy)]
enum Separator {
  WordEnd,
  Hyphen,
  Mark(char),
}

/// `(n)`, `(n,m)`, `(n-m)`, `(n'm)`, `(n.m)`, `(n m)` and any mix of those.
fn parse_numeric(sc: Scanner<'_>) -> Option<(Enumeration, Scanner<'_>)> {
  let mut sc = sc.take_char('(')?.skip_whitespace();
  let mut parts: Vec<(usize, Option<Separator>)> = vec![];
  loop {
    let (n, next) = sc.take_number()?;
    let after_space = next.skip_whitespace();
    let saw_space = after_space != next;
    let (separator, next) = match after_space.pop()? {
      (')', next) => {
        parts.push((n as usize, None));
        sc = next;
        break;
      }
      (',', next) => (Separator::WordEnd, next),
      ('-', next) => (Separator::Hyphen, next),
      (c @ ('\'' | '.'), next) => (Separator::Mark(c), next),
      (c, _) if saw_space && c.is_ascii_digit() => (Separator::WordEnd, after_space),
      _ => return None,
    };
    parts.push((n as usize, Some(separator)));
    sc = next.skip_whitespace();
  }

  if parts.iter().map(|&(n, _)| n).sum::<usize>() > MAX_LEN {
    return None;
  }
  let mut enumeration = Enumeration {
    numeric: true,
    ..Default::default()
  };
  for (n, separator) in parts {
    enumeration.placeholder.extend(std::iter::repeat_n('?', n));
    enumeration.len += n;
    let Some(separator) = separator else {
      continue;
    };
    let Some(last) = enumeration.len.checked_sub(1) else {
      continue;
    };
    match separator {
      Separator::WordEnd => {
        enumeration.word_ends.push(last);
        enumeration.placeholder.push(' ');
      }
      Separator::Hyphen => {
        enumeration.hyphens.push(last);
        enumeration.placeholder.push('-');
      }
      Separator::Mark(c) => enumeration.placeholder.push(c),
    }
  }
  Some((enumeration, sc))
}

/// `(?)`, `(? letters)`, `(6 letters)`, `(2 words)` and singular forms.
fn parse_wordy(sc: Scanner<'_>) -> Option<(Enumeration, Scanner<'_>)> {
  let sc = sc.take_char('(')?.skip_whitespace();
  let (count, sc) = match sc.take_char('?') {
    Some(next) => (None, next),
    None => {
      let (n, next) = sc.take_number()?;
      (Some(n as usize), next)
    }
  };
  let after_count = sc.skip_whitespace();
  if let Some(end) = after_count.take_char(')') {
    if count.is_none() {
      return Some((
        Enumeration {
          numeric: false,
          ..Default::default()
        },
        end,
      ));
    }
    return None;
  }
  if after_count == sc {
    return None;
  }
  let (word, sc) = after_count.take_while(char::is_alphabetic);
  let word = word.to_ascii_lowercase();
  let sc = sc.skip_whitespace().take_char(')')?;
  let len = match word.as_str() {
    "letter" | "letters" => count.unwrap_or(0),
    "word" | "words" => 0,
    _ => return None,
  };
  if len > MAX_LEN {
    return None;
  }
  Some((
    Enumeration {
      len,
      placeholder: "?".repeat(len),
      numeric: false,
      ..Default::default()
    },
    sc,
  ))
}

#[cfg(test)]
mod tests {
  use super::*;
  use pretty_assertions::assert_eq;
  use rstest::rstest;

  #[test]
  fn simple_enum() {
    let text = split_clue_text("Part of the foot (4)");
    assert_eq!(text.body, "Part of the foot");
    assert_eq!(text.anno, "");
    assert_eq!(
      text.enumeration,
      Some(Enumeration {
        len: 4,
        word_ends: vec![],
        hyphens: vec![],
        placeholder: "????".into(),
        numeric: true,
      })
    );
    assert_eq!(text.enum_range, 17..20);
  }

  #[test]
  fn multi_word_enum() {
    let e = split_clue_text("Compound phrase (5,3)").enumeration.unwrap();
    assert_eq!(e.len, 8);
    assert_eq!(e.word_ends, [4]);
    assert_eq!(e.placeholder, "????? ???");
  }

  #[rstest]
  #[case("(4-2)", 6, vec![], vec![3], "????-??")]
  #[case("(2'1)", 3, vec![], vec![], "??'?")]
  #[case("(1.1.1)", 3, vec![], vec![], "?.?.?")]
  #[case("(3, 2-4)", 9, vec![2], vec![4], "??? ??-????")]
  #[case("(3 4)", 7, vec![2], vec![], "??? ????")]
  fn separators(
    #[case] input: &str,
    #[case] len: usize,
    #[case] word_ends: Vec<usize>,
    #[case] hyphens: Vec<usize>,
    #[case] placeholder: &str,
  ) {
    let e = split_clue_text(input).enumeration.unwrap();
    assert_eq!(e.len, len);
    assert_eq!(e.word_ends, word_ends);
    assert_eq!(e.hyphens, hyphens);
    assert_eq!(e.placeholder, placeholder);
  }

  #[test]
  fn last_enum_wins_and_anno_follows() {
    let text = split_clue_text("Sailor (3) holds (2) lines (5) Nice one!");
    assert_eq!(text.body, "Sailor (3) holds (2) lines");
    assert_eq!(text.enumeration.unwrap().len, 5);
    assert_eq!(text.anno, "Nice one!");
  }

  #[test]
  fn enum_before_bracketed_anno_wins() {
    let text = split_clue_text("Lines (5) [LINES] from (2) and (3)");
    assert_eq!(text.body, "Lines");
    assert_eq!(text.enumeration.unwrap().len, 5);
    assert_eq!(text.anno, "[LINES] from (2) and (3)");
  }

  #[test]
  fn wordy_enums() {
    let e = split_clue_text("Hmm (6 letters)").enumeration.unwrap();
    assert_eq!((e.len, e.numeric, e.placeholder.as_str()), (6, false, "??????"));
    let e = split_clue_text("Hmm (2 words)").enumeration.unwrap();
    assert_eq!(e.len, 0);
    let e = split_clue_text("Hmm (? letters)").enumeration.unwrap();
    assert_eq!(e.len, 0);
    let e = split_clue_text("Hmm (?)").enumeration.unwrap();
    assert!(!e.numeric);
  }

  #[test]
  fn numeric_beats_wordy() {
    let text = split_clue_text("Hmm (5) (6 letters)");
    assert_eq!(text.enumeration.unwrap().len, 5);
    assert_eq!(text.anno, "(6 letters)");
  }

  #[rstest]
  #[case("Huge (4000000000)")]
  #[case("Huge (3000, 2000)")]
  #[case("Huge (4000000000 letters)")]
  fn oversized_enums_stay_in_the_text(#[case] input: &str) {
    let text = split_clue_text(input);
    assert_eq!(text.enumeration, None);
    assert_eq!(text.body, input);
  }

  #[test]
  fn no_enum() {
    let text = split_clue_text("  Just text (not an enum) ");
    assert_eq!(text.body, "Just text (not an enum)");
    assert_eq!(text.enumeration, None);
  }
}
