use std::fmt::Debug;

// Loosely based on
// https://depth-first.com/articles/2021/12/16/a-beginners-guide-to-parsing-in-rust/
//
// Unlike a byte scanner that advances in place, this one is `Copy`: every
// primitive takes a scanner by value and hands back the advanced one, so a
// failed attempt just means going on with the old value.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Scanner<'a> {
  cursor: usize,
  data: &'a str,
}

impl Debug for Scanner<'_> {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Scanner")
      .field("cursor", &self.cursor)
      .field("rest", &self.rest())
      .finish()
  }
}

impl<'a> Scanner<'a> {
  pub fn new(data: &'a str) -> Self {
    Self { cursor: 0, data }
  }

  /// Byte offset into the source.
  pub fn offset(&self) -> usize {
    self.cursor
  }

  /// Everything that has not been consumed yet.
  pub fn rest(&self) -> &'a str {
    &self.data[self.cursor..]
  }

  pub fn is_empty(&self) -> bool {
    self.cursor >= self.data.len()
  }

  /// The source text between `self` and a later scanner over the same data.
  pub fn until(&self, later: Self) -> &'a str {
    &self.data[self.cursor..later.cursor]
  }

  pub fn peek(&self) -> Option<char> {
    self.rest().chars().next()
  }

  /// Consume and return the next char, or return None if that can't be done.
  pub fn pop(self) -> Option<(char, Self)> {
    let c = self.peek()?;
    Some((
      c,
      Self {
        cursor: self.cursor + c.len_utf8(),
        ..self
      },
    ))
  }

  /// Consume the next char if it is `expected`.
  pub fn take_char(self, expected: char) -> Option<Self> {
    match self.pop() {
      Some((c, next)) if c == expected => Some(next),
      _ => None,
    }
  }

  /// Take the next `expected.len()` bytes if they match `expected`, ignoring
  /// ASCII case.
  pub fn take_str_ignore_case(self, expected: &str) -> Option<Self> {
    let rest = self.rest();
    if rest.len() < expected.len() || !rest.is_char_boundary(expected.len()) {
      return None;
    }
    if rest[..expected.len()].eq_ignore_ascii_case(expected) {
      Some(Self {
        cursor: self.cursor + expected.len(),
        ..self
      })
    } else {
      None
    }
  }

  /// Consume chars for as long as `pred` holds, returning them.
  pub fn take_while(self, pred: impl Fn(char) -> bool) -> (&'a str, Self) {
    let len = self
      .rest()
      .char_indices()
      .find(|&(_, c)| !pred(c))
      .map_or(self.rest().len(), |(i, _)| i);
    let next = Self {
      cursor: self.cursor + len,
      ..self
    };
    (self.until(next), next)
  }

  pub fn skip_whitespace(self) -> Self {
    self.take_while(char::is_whitespace).1
  }

  /// Parse a run of ASCII digits as a number.
  pub fn take_number(self) -> Option<(u32, Self)> {
    let (digits, next) = self.take_while(|c| c.is_ascii_digit());
    if digits.is_empty() {
      return None;
    }
    digits.parse().ok().map(|n| (n, next))
  }

  /// Whether the scanner sits at the end of a word: nothing left, or the next
  /// char is not alphanumeric.
  pub fn at_word_boundary(&self) -> bool {
    self.peek().is_none_or(|c| !c.is_alphanumeric())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn scanner_is_rewindable() {
    let start = Scanner::new("12ab cd");
    let (n, after_number) = start.take_number().unwrap();
    assert_eq!(n, 12);
    assert_eq!(after_number.rest(), "ab cd");

    // A failed attempt leaves the earlier scanner untouched.
    assert!(after_number.take_str_ignore_case("abc").is_none());
    let after_ab = after_number.take_str_ignore_case("AB").unwrap();
    assert!(after_ab.at_word_boundary());
    assert_eq!(after_ab.skip_whitespace().rest(), "cd");
    assert_eq!(start.until(after_ab), "12ab");
  }

  #[test]
  fn take_while_handles_multibyte() {
    let (word, rest) = Scanner::new("ÉTÉ é").take_while(|c| !c.is_whitespace());
    assert_eq!(word, "ÉTÉ");
    assert_eq!(rest.pop().map(|(c, _)| c), Some(' '));
  }
}
