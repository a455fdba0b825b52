use exolve::{Error, Options, Puzzle, Warning};
use std::env;
use std::fs;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

fn parse_file(path: &str) -> Result<(Puzzle, Vec<Warning>), Error> {
  let data: Vec<u8> = fs::read(path)?;
  Puzzle::from_bytes(data, &Options::default())
}

fn init_logging() {
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_target(false)
    .init();
}

fn report(path: &str) -> bool {
  match parse_file(path) {
    Ok((puzzle, warnings)) => {
      if warnings.is_empty() {
        info!(title = puzzle.title(), path, "parsed successfully");
      } else {
        info!(title = puzzle.title(), path, warnings = warnings.len(), "parsed with warnings");
        for warning in &warnings {
          warn!(path, "{warning}");
        }
      }
      true
    }
    Err(e) => {
      error!(path, "failed: {e}");
      false
    }
  }
}

/// Checks every file in `dir`, returning how many parsed and how many failed.
fn check_dir(dir: &str) -> Result<(usize, usize), Error> {
  let mut success = 0;
  let mut failure = 0;

  for entry in fs::read_dir(dir)? {
    let file_path = entry?.path();
    if let Some(p) = file_path.to_str() {
      if report(p) {
        success += 1;
      } else {
        failure += 1;
      }
    }
  }
  info!(success, failure, "done");
  Ok((success, failure))
}

/// A simple CLI for checking exolve puzzle files
fn main() -> Result<(), Error> {
  init_logging();
  let args: Vec<String> = env::args().collect();

  let Some(path) = args.get(1) else {
    eprintln!("usage: exolve <puzzle file or directory>");
    std::process::exit(1);
  };
  let ok = if fs::metadata(path)?.is_dir() {
    let (_, failure) = check_dir(path)?;
    failure == 0
  } else {
    report(path)
  };
  if !ok {
    std::process::exit(2);
  }

  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn sample_puzzles_all_parse() {
    let dir = concat!(env!("CARGO_MANIFEST_DIR"), "/puzzles");
    assert_eq!(check_dir(dir).unwrap(), (3, 0));
  }

  #[test]
  fn broken_files_are_counted() {
    let dir = env::temp_dir().join(format!("exolve-check-{}", std::process::id()));
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("good.txt"), "exolve-width: 2\nexolve-height: 1\nexolve-grid:\n  AB\n")
      .unwrap();
    fs::write(dir.join("short.txt"), "exolve-width: 3\nexolve-height: 1\nexolve-grid:\n  AB\n")
      .unwrap();

    let counts = check_dir(dir.to_str().unwrap()).unwrap();
    fs::remove_dir_all(&dir).unwrap();
    assert_eq!(counts, (1, 1));
  }
}
