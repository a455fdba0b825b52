//! Small composable parsers for the pieces of the puzzle text: cell
//! locations, enums, directions and clue labels.

mod direction;
mod enumeration;
mod label;
mod location;
mod scanner;

pub use direction::{Direction, parse_direction};
pub use enumeration::{ClueText, Enumeration, split_clue_text};
pub use label::{
  CellRef, LabelContext, LabelToken, ParsedLabel, RawLabel, parse_cell_ref, parse_clue_label,
  parse_label_token,
};
pub use location::{parse_location, parse_location_pair, parse_location_str};
pub use scanner::Scanner;
