use std::fmt::Display;

use thiserror::Error;

use crate::grid::Pos;

/// The fatal errors that abort building a puzzle. No partially-built puzzle is
/// ever handed out alongside one of these.
#[derive(Debug, Error)]
pub enum Error {
  /// A section that every puzzle needs was not found.
  #[error("missing required section 'exolve-{0}'")]
  MissingSection(&'static str),
  /// A section that should hold a number held something else.
  #[error("invalid number '{value}' in section 'exolve-{section}'")]
  InvalidNumber { section: &'static str, value: String },
  /// The grid section does not have exactly `height` lines.
  #[error("expected {expected} grid lines but found {found}")]
  GridLineCount { expected: usize, found: usize },
  /// A grid line does not have exactly `width` cells.
  #[error("grid line {row} has {found} cells, expected {expected}")]
  GridRowWidth {
    row: usize,
    expected: usize,
    found: usize,
  },
  /// A grid letter is not allowed by the puzzle's alphabet.
  #[error("invalid letter '{letter}' in grid at {pos:?}")]
  InvalidLetter { letter: String, pos: Pos },
  /// A `!` prefill decorator was put on a block, or on an unknown (`0`) cell.
  #[error("prefilled cell at {0:?} has no letter")]
  PrefillNotLight(Pos),
  /// In 3-D mode, the grid height must split evenly into layers.
  #[error("height {height} cannot be split into {layers} layers")]
  LayerMismatch { height: usize, layers: usize },
  /// The same clue was given text more than once.
  #[error("clue {0} is defined more than once")]
  DuplicateClue(String),
  /// A linked clue names a child that does not exist.
  #[error("clue {parent} names unknown child '{child}'")]
  InvalidChild { parent: String, child: String },
  /// A child is already linked to some parent, or is linked to itself.
  #[error("clue {parent} cannot take '{child}' as a child")]
  DuplicateChild { parent: String, child: String },
  /// Explicit cell references in a clue disagree with the grid light.
  #[error("cells given for clue {0} do not match the grid")]
  CellMismatch(String),
  /// `#cell` references are only allowed in the nodir section.
  #[error("cell references are only allowed in exolve-nodir: {0}")]
  CellRefOutsideNodir(String),
  /// A section that does not apply to this puzzle (e.g. 3-D clues in a 2-D grid).
  #[error("section 'exolve-{0}' cannot be used in this puzzle")]
  InvalidSection(String),
  /// A registry already holds a puzzle with this id.
  #[error("a puzzle with id '{0}' already exists")]
  DuplicateId(String),
  /// Got an error while decoding the input text.
  #[error("could not decode puzzle text: {0}")]
  Encoding(String),
  /// An [I/O error](std::io::Error) occurred.
  #[error(transparent)]
  Io(#[from] std::io::Error),
}

/// Soft inconsistencies found while building a puzzle. These never stop the
/// build; the host decides how to surface them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Warning {
  /// The enum length and the number of cells in the light differ.
  EnumMismatch {
    clue: String,
    enum_len: usize,
    cells: usize,
  },
  /// A light in the grid has no clue text.
  UncluedLight(String),
  /// A nina, colour, or force-* entry is not a valid cell or clue.
  InvalidLocation { section: String, token: String },
  /// A reversal directive did not match any light.
  UnusedReversal { first: Pos, last: Pos },
  /// A `*` deletion line named a clue that the grid does not have.
  MissingDeletion(String),
  /// An annotation listed cells for a clue whose cells were already known.
  AnnoCellsIgnored(String),
  /// An `exolve-option` key that is not understood.
  UnknownOption(String),
}

impl Display for Warning {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Self::EnumMismatch {
        clue,
        enum_len,
        cells,
      } => write!(
        f,
        "clue {clue} has enum length {enum_len} but {cells} cells in the grid"
      ),
      Self::UncluedLight(clue) => write!(f, "light {clue} has no clue"),
      Self::InvalidLocation { section, token } => {
        write!(f, "invalid location '{token}' in exolve-{section}")
      }
      Self::UnusedReversal { first, last } => {
        write!(f, "reversal {first:?}-{last:?} does not match any light")
      }
      Self::MissingDeletion(clue) => write!(f, "cannot delete unknown clue {clue}"),
      Self::AnnoCellsIgnored(clue) => {
        write!(f, "cells in the annotation of {clue} were ignored")
      }
      Self::UnknownOption(key) => write!(f, "unknown option '{key}'"),
    }
  }
}

/// Puzzle building result type.
pub type Result<T> = std::result::Result<T, Error>;

