//! Splits puzzle text into clean lines and finds the `exolve-name: value`
//! sections in it.

use std::collections::HashMap;
use std::ops::Range;

use tracing::debug;

/// Every section marker starts with this.
pub const PREFIX: &str = "exolve-";

/// Sections that may appear several times, with every occurrence kept.
/// Anything else that repeats overwrites the earlier occurrence.
const ACCUMULATING: &[&str] = &[
  "credits",
  "question",
  "nina",
  "colour",
  "force-hyphen-right",
  "force-hyphen-below",
  "force-bar-right",
  "force-bar-below",
  "reversals",
  "option",
  "relabel",
];

const KNOWN: &[&str] = &[
  "begin",
  "end",
  "id",
  "title",
  "setter",
  "copyright",
  "credits",
  "preamble",
  "explanations",
  "question",
  "width",
  "height",
  "3d",
  "grid",
  "across",
  "down",
  "3d-across",
  "3d-away",
  "3d-down",
  "nodir",
  "nina",
  "colour",
  "force-hyphen-right",
  "force-hyphen-below",
  "force-bar-right",
  "force-bar-below",
  "reversals",
  "option",
  "language",
  "relabel",
];

/// One `exolve-name: value` marker and the lines that follow it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section<'a> {
  /// Lowercased name without the prefix, with aliases folded (`color` is
  /// stored as `colour`, `prelude` as `preamble`).
  pub name: String,
  /// Whatever followed the `:` on the marker line itself.
  pub value: &'a str,
  /// The content lines, as indices into [Sections::lines]. The marker line
  /// is not included. Empty when the next line is another marker.
  pub lines: Range<usize>,
}

/// The cleaned-up lines of a puzzle and the sections found in them.
#[derive(Debug)]
pub struct Sections<'a> {
  lines: Vec<&'a str>,
  sections: Vec<Section<'a>>,
}

impl<'a> Sections<'a> {
  /// Splits `text` into comment-stripped, trimmed, non-blank lines, then
  /// records every section marker among them.
  pub fn extract(text: &'a str) -> Self {
    let all_lines = text
      .lines()
      .map(|line| strip_comment(line).trim())
      .filter(|line| !line.is_empty())
      .collect::<Vec<_>>();

    // With an explicit begin marker, only what lies between begin and end counts.
    let begin = all_lines
      .iter()
      .position(|line| marker_name(line).is_some_and(|(name, _)| name == "begin"));
    let lines = match begin {
      Some(begin) => all_lines[begin + 1..]
        .iter()
        .copied()
        .take_while(|line| !marker_name(line).is_some_and(|(name, _)| name == "end"))
        .collect(),
      None => all_lines,
    };

    let mut sections: Vec<Section<'a>> = vec![];
    let mut by_name: HashMap<String, usize> = HashMap::new();
    let mut i = 0;
    while i < lines.len() {
      let Some((name, value)) = marker_name(lines[i]) else {
        debug!(line = lines[i], "ignoring text outside any section");
        i += 1;
        continue;
      };
      let first = i + 1;
      let mut last = first;
      while last < lines.len() && marker_name(lines[last]).is_none() {
        last += 1;
      }
      if !KNOWN.contains(&name.as_str()) {
        debug!(%name, "unknown section");
      }

      let section = Section {
        name: name.clone(),
        value,
        lines: first..last,
      };
      match by_name.get(&name) {
        Some(&earlier) if !ACCUMULATING.contains(&name.as_str()) => {
          debug!(%name, "section repeated; the last one wins");
          sections[earlier] = section;
        }
        _ => {
          by_name.insert(name, sections.len());
          sections.push(section);
        }
      }
      i = last;
    }

    Self { lines, sections }
  }

  /// All the cleaned-up lines.
  pub fn lines(&self) -> &[&'a str] {
    &self.lines
  }

  /// All sections, in the order they appear.
  pub fn iter(&self) -> impl Iterator<Item = &Section<'a>> {
    self.sections.iter()
  }

  /// The last section with the given name.
  pub fn get(&self, name: &str) -> Option<&Section<'a>> {
    self.sections.iter().rev().find(|s| s.name == name)
  }

  /// Every section with the given name, in order.
  pub fn all<'s>(&'s self, name: &'s str) -> impl Iterator<Item = &'s Section<'a>> {
    self.sections.iter().filter(move |s| s.name == name)
  }

  /// The content lines of a section.
  pub fn content(&self, section: &Section<'_>) -> &[&'a str] {
    &self.lines[section.lines.clone()]
  }

  /// The inline value of a section, if it is present and non-empty.
  pub fn value(&self, name: &str) -> Option<&'a str> {
    self.get(name).map(|s| s.value).filter(|v| !v.is_empty())
  }

  /// Inline value followed by content lines, joined with newlines. Used for
  /// free-text sections such as the preamble.
  pub fn text(&self, name: &str) -> String {
    self.get(name).map_or_else(String::new, |s| self.joined(s))
  }

  /// Inline value followed by content lines of one section.
  pub fn joined(&self, section: &Section<'_>) -> String {
    std::iter::once(section.value)
      .filter(|v| !v.is_empty())
      .chain(self.content(section).iter().copied())
      .collect::<Vec<_>>()
      .join("\n")
  }
}

/// Removes a trailing comment. A `#` only starts a comment when it is followed
/// by whitespace or the end of the line, so `#hashtags` and `#a1` cell
/// references survive.
fn strip_comment(line: &str) -> &str {
  let mut chars = line.char_indices().peekable();
  while let Some((i, c)) = chars.next() {
    if c == '#' && chars.peek().is_none_or(|&(_, next)| next.is_whitespace()) {
      return &line[..i];
    }
  }
  line
}

/// If `line` is a section marker, returns its normalised name and inline value.
fn marker_name(line: &str) -> Option<(String, &str)> {
  if !line
    .get(..PREFIX.len())
    .is_some_and(|start| start.eq_ignore_ascii_case(PREFIX))
  {
    return None;
  }
  let rest = &line[PREFIX.len()..];
  let end = rest
    .find(|c: char| !(c.is_ascii_alphanumeric() || c == '-'))
    .unwrap_or(rest.len());
  if end == 0 {
    return None;
  }
  let name = rest[..end].to_ascii_lowercase();
  let after = rest[end..].trim_start();
  let value = match after.strip_prefix(':') {
    Some(value) => value.trim(),
    None if after.is_empty() => "",
    // Something like "exolve-width 5" with no colon: not a marker.
    None => return None,
  };
  let name = match name.as_str() {
    "color" => "colour".to_string(),
    "prelude" => "preamble".to_string(),
    _ => name,
  };
  Some((name, value))
}
