//! Several puzzles side by side, each under a unique id.

use std::collections::HashMap;

use tracing::debug;

use crate::{Error, Puzzle, Result};

/// Holds puzzles by id, in the order they were added. Puzzles without an
/// `exolve-id` get one assigned.
#[derive(Debug, Default)]
pub struct Registry {
  puzzles: Vec<(String, Puzzle)>,
  by_id: HashMap<String, usize>,
  next_anonymous: usize,
}

impl Registry {
  pub fn new() -> Self {
    Self::default()
  }

  /// Adds a puzzle and returns its id. Fails if a puzzle with the same id is
  /// already registered.
  pub fn add(&mut self, mut puzzle: Puzzle) -> Result<String> {
    let id = match puzzle.id() {
      Some(id) => id.to_string(),
      None => {
        let id = self.fresh_id();
        puzzle.set_id(id.clone());
        id
      }
    };
    if self.by_id.contains_key(&id) {
      return Err(Error::DuplicateId(id));
    }
    debug!(%id, "registered puzzle");
    self.by_id.insert(id.clone(), self.puzzles.len());
    self.puzzles.push((id.clone(), puzzle));
    Ok(id)
  }

  fn fresh_id(&mut self) -> String {
    loop {
      self.next_anonymous += 1;
      let id = format!("xlv{}", self.next_anonymous);
      if !self.by_id.contains_key(&id) {
        return id;
      }
    }
  }

  pub fn get(&self, id: &str) -> Option<&Puzzle> {
    self.by_id.get(id).map(|&i| &self.puzzles[i].1)
  }

  pub fn get_mut(&mut self, id: &str) -> Option<&mut Puzzle> {
    self.by_id.get(id).map(|&i| &mut self.puzzles[i].1)
  }

  /// Removes a puzzle, freeing its id.
  pub fn remove(&mut self, id: &str) -> Option<Puzzle> {
    let i = self.by_id.remove(id)?;
    let (_, puzzle) = self.puzzles.remove(i);
    for index in self.by_id.values_mut() {
      if *index > i {
        *index -= 1;
      }
    }
    Some(puzzle)
  }

  /// Ids in the order the puzzles were added.
  pub fn ids(&self) -> impl Iterator<Item = &str> {
    self.puzzles.iter().map(|(id, _)| id.as_str())
  }

  pub fn len(&self) -> usize {
    self.puzzles.len()
  }

  pub fn is_empty(&self) -> bool {
    self.puzzles.is_empty()
  }
}
