use crate::grid::Pos;
use crate::parse::{Direction, Scanner, parse_direction, parse_location};

/// The shape of the grid, which the label grammar depends on: direction tokens
/// differ for 3-D grids, and `#cell` references need bounds.
#[derive(Debug, Clone, Copy)]
pub struct LabelContext {
  pub three_d: bool,
  pub height: usize,
  pub width: usize,
}

/// A clue label as written: a number or a `[bracketed]` token.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RawLabel {
  Number(u32),
  Bracket(String),
}

/// A label with the direction written next to it, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelToken {
  pub label: RawLabel,
  pub direction: Option<Direction>,
}

/// A `#cell` reference. With a direction, it stands for the whole light that
/// starts at that cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellRef {
  pub pos: Pos,
  pub direction: Option<Direction>,
}

/// The result of parsing the start of a clue line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedLabel<'a> {
  pub cell_refs: Vec<CellRef>,
  pub token: LabelToken,
  /// Linked labels after `,`, `&`, `/` or `and`.
  pub children: Vec<LabelToken>,
  /// The clue text following the label.
  pub rest: &'a str,
}

/// Parses the label part of a clue line:
///
/// `[#cell ...] [direction] (number | [token]) [direction] [(, | & | / | and) label]* [.]`
///
/// followed by whitespace or the end of the line. Returns None when the line
/// does not start with a label; such lines are headings or commentary.
pub fn parse_clue_label<'a>(line: &'a str, ctx: &LabelContext) -> Option<ParsedLabel<'a>> {
  let mut sc = Scanner::new(line).skip_whitespace();

  let mut cell_refs = vec![];
  while let Some(after_hash) = sc.take_char('#') {
    let (cell_ref, next) = parse_cell_ref(after_hash, ctx)?;
    if !next.peek().is_some_and(char::is_whitespace) {
      return None;
    }
    cell_refs.push(cell_ref);
    sc = next.skip_whitespace();
  }

  let (token, mut sc) = parse_label_token(sc, ctx)?;

  let mut children = vec![];
  while let Some((child, next)) = parse_child(sc, ctx) {
    children.push(child);
    sc = next;
  }

  if let Some(next) = sc.take_char('.') {
    sc = next;
  }
  if !sc.is_empty() && !sc.peek().is_some_and(char::is_whitespace) {
    return None;
  }

  Some(ParsedLabel {
    cell_refs,
    token,
    children,
    rest: sc.skip_whitespace().rest(),
  })
}

/// A single `#`-less cell reference with an optional direction, e.g. `a1`,
/// `r2c3d`.
pub fn parse_cell_ref<'a>(sc: Scanner<'a>, ctx: &LabelContext) -> Option<(CellRef, Scanner<'a>)> {
  let (pos, sc) = parse_location(sc, ctx.height, ctx.width)?;
  match parse_direction(sc, ctx.three_d) {
    Some((direction, next)) => Some((
      CellRef {
        pos,
        direction: Some(direction),
      },
      next,
    )),
    None => Some((
      CellRef {
        pos,
        direction: None,
      },
      sc,
    )),
  }
}

/// `[direction] (number | [token]) [direction]`. A direction prefix only
/// counts when a label follows it; a suffix must be attached to the label.
pub fn parse_label_token<'a>(
  sc: Scanner<'a>,
  ctx: &LabelContext,
) -> Option<(LabelToken, Scanner<'a>)> {
  if let Some((direction, after_prefix)) = parse_direction(sc, ctx.three_d) {
    if let Some((label, next)) = parse_raw_label(after_prefix.skip_whitespace()) {
      return Some((
        LabelToken {
          label,
          direction: Some(direction),
        },
        next,
      ));
    }
  }

  let (label, sc) = parse_raw_label(sc)?;
  match parse_direction(sc, ctx.three_d) {
    Some((direction, next)) => Some((
      LabelToken {
        label,
        direction: Some(direction),
      },
      next,
    )),
    None => Some((
      LabelToken {
        label,
        direction: None,
      },
      sc,
    )),
  }
}

fn parse_raw_label(sc: Scanner<'_>) -> Option<(RawLabel, Scanner<'_>)> {
  if let Some((n, next)) = sc.take_number() {
    return Some((RawLabel::Number(n), next));
  }
  let sc = sc.take_char('[')?;
  let (text, sc) = sc.take_while(|c| c != ']');
  let sc = sc.take_char(']')?;
  let text = text.trim();
  if text.is_empty() {
    return None;
  }
  Some((RawLabel::Bracket(text.to_string()), sc))
}

/// A separator and the label after it. Gives up (leaving the separator to the
/// clue text) when no label follows.
fn parse_child<'a>(sc: Scanner<'a>, ctx: &LabelContext) -> Option<(LabelToken, Scanner<'a>)> {
  let sc = sc.skip_whitespace();
  let after_sep = match sc.pop()? {
    (',' | '&' | '/', next) => next,
    _ => {
      let next = sc.take_str_ignore_case("and")?;
      if !next.peek().is_some_and(char::is_whitespace) {
        return None;
      }
      next
    }
  };
  parse_label_token(after_sep.skip_whitespace(), ctx)
}
