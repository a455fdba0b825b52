//! Per-puzzle configuration: the `exolve-option` flags and the
//! `exolve-language` script settings.

use std::collections::BTreeMap;

use tracing::debug;

use crate::Warning;

/// Options that only matter to renderers. They are kept in
/// [Options::extra] without a warning.
const DISPLAY_OPTIONS: &[&str] = &[
  "clues-panel-lines",
  "font-family",
  "font-size",
  "grid-background",
  "highlight-overwritten-seconds",
  "hide-copy-placeholder-buttons",
  "no-auto-solution-in-anno",
  "no-nina-button",
  "no-smart-coloring",
  "offset-left",
  "offset-top",
  "print-completed-3cols",
  "print-incomplete-2cols",
  "show-cell-level-buttons",
  "top-clue-always",
];

/// Flags that change how strictly a puzzle is built, plus anything else given
/// in `exolve-option`.
///
/// A host can pass its own `Options` to [Puzzle::parse_with](crate::Puzzle::parse_with);
/// flags set on either side are set in the result.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Options {
  /// Don't warn about lights that have no clue.
  pub ignore_unclued: bool,
  /// Don't warn when an enum disagrees with the grid.
  pub ignore_enum_mismatch: bool,
  /// Allow digits as grid letters.
  pub allow_digits: bool,
  /// Extra characters allowed as grid letters.
  pub allow_chars: Vec<char>,
  /// Don't show numbers that were inferred from the grid.
  pub hide_inferred_numbers: bool,
  /// Everything else, as `key -> value`.
  pub extra: BTreeMap<String, Option<String>>,
}

impl Options {
  /// Parses a space-separated list of `key` or `key:value` entries.
  pub fn parse<'a>(
    entries: impl IntoIterator<Item = &'a str>,
    warnings: &mut Vec<Warning>,
  ) -> Self {
    let mut options = Self::default();
    for entry in entries.into_iter().flat_map(str::split_whitespace) {
      let (key, value) = match entry.split_once(':') {
        Some((key, value)) => (key, Some(value)),
        None => (entry, None),
      };
      match key {
        "ignore-unclued" => options.ignore_unclued = true,
        "ignore-enum-mismatch" => options.ignore_enum_mismatch = true,
        "allow-digits" => options.allow_digits = true,
        "allow-chars" => options.allow_chars.extend(value.unwrap_or("").chars()),
        "hide-inferred-numbers" => options.hide_inferred_numbers = true,
        _ => {
          if !DISPLAY_OPTIONS.contains(&key) && !key.starts_with("colour-") {
            warnings.push(Warning::UnknownOption(key.to_string()));
          }
          debug!(key, ?value, "option kept for renderers");
          options
            .extra
            .insert(key.to_string(), value.map(str::to_string));
        }
      }
    }
    options
  }

  /// Sets every flag that is set in `other`.
  pub fn merge(&mut self, other: &Options) {
    self.ignore_unclued |= other.ignore_unclued;
    self.ignore_enum_mismatch |= other.ignore_enum_mismatch;
    self.allow_digits |= other.allow_digits;
    self.hide_inferred_numbers |= other.hide_inferred_numbers;
    self.allow_chars.extend(other.allow_chars.iter().copied());
    for (key, value) in &other.extra {
      self.extra.entry(key.clone()).or_insert_with(|| value.clone());
    }
  }
}

/// The script a puzzle is written in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Language {
  /// Language code, e.g. `en` or `hi`.
  pub code: String,
  /// Script name, e.g. `Latin` or `Devanagari`.
  pub script: String,
  /// How many codepoints a single grid letter may use. Above 1, grid letters
  /// have to be separated by spaces.
  pub max_codepoints: usize,
}

impl Default for Language {
  fn default() -> Self {
    Self {
      code: "en".into(),
      script: "Latin".into(),
      max_codepoints: 1,
    }
  }
}

impl Language {
  /// Parses `<code> <script> [max-codepoints]`.
  pub fn parse(value: &str) -> Self {
    let mut parts = value.split_whitespace();
    let default = Self::default();
    let code = parts.next().map_or(default.code, str::to_string);
    let script = parts.next().map_or(default.script, str::to_string);
    let max_codepoints = parts
      .next()
      .and_then(|n| n.parse().ok())
      .filter(|&n| n > 0)
      .unwrap_or(1);
    Self {
      code,
      script,
      max_codepoints,
    }
  }

  pub fn is_latin(&self) -> bool {
    self.script.eq_ignore_ascii_case("latin")
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn parses_flags() {
    let mut warnings = vec![];
    let options = Options::parse(
      [
        "ignore-unclued allow-chars:#$",
        "font-family:serif frobnicate",
      ],
      &mut warnings,
    );
    assert!(options.ignore_unclued);
    assert!(!options.ignore_enum_mismatch);
    assert_eq!(options.allow_chars, ['#', '$']);
    assert_eq!(options.extra.get("font-family"), Some(&Some("serif".into())));
    assert_eq!(warnings, [Warning::UnknownOption("frobnicate".into())]);
  }

  #[test]
  fn merges_host_options() {
    let mut options = Options {
      allow_digits: true,
      ..Default::default()
    };
    options.merge(&Options {
      ignore_enum_mismatch: true,
      ..Default::default()
    });
    assert!(options.allow_digits && options.ignore_enum_mismatch);
  }

  #[test]
  fn parses_language() {
    let lang = Language::parse("hi Devanagari 4");
    assert_eq!(lang.max_codepoints, 4);
    assert!(!lang.is_latin());
    assert_eq!(Language::parse(""), Language::default());
  }
}
