use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use clap::Parser;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use exolve::Axis::{Across, Down, ZAxis};
use exolve::{ClueIdx, Cursor, Options, Pos, Puzzle, Registry, Square};
use ratatui::{
  DefaultTerminal, Frame,
  buffer::Buffer,
  layout::{Constraint, Flex, Layout, Rect},
  style::{Color, Modifier, Style, Stylize},
  text::Text,
  widgets::{Block, Padding, Paragraph, Widget, Wrap},
};
use ratatui_macros::{line, span};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

const SQUARE_WIDTH: u16 = 7;
const SQUARE_HEIGHT: u16 = 3;

/// Solve exolve crossword puzzles in your terminal
#[derive(Parser, Debug)]
#[command(name = "exolve-tui")]
struct Args {
  /// Puzzle files to play. Ctrl-N switches between them.
  #[arg(required = true)]
  files: Vec<PathBuf>,

  /// Don't warn when an enum disagrees with the grid
  #[arg(long)]
  ignore_enum_mismatch: bool,

  /// Don't warn about lights without clues
  #[arg(long)]
  ignore_unclued: bool,

  /// Write logs to this file
  #[arg(long)]
  log: Option<PathBuf>,
}

fn main() -> io::Result<()> {
  let args = Args::parse();
  if let Some(path) = &args.log {
    init_logging(path)?;
  }

  let host = Options {
    ignore_enum_mismatch: args.ignore_enum_mismatch,
    ignore_unclued: args.ignore_unclued,
    ..Default::default()
  };
  let mut registry = Registry::new();
  for path in &args.files {
    let puzzle = load_puzzle(path, &host);
    if let Err(e) = registry.add(puzzle) {
      println!("Cannot load {}: {}", path.display(), e);
      std::process::exit(2);
    }
  }
  let app = App::new(registry);

  let terminal = ratatui::init();
  let result = app.run(terminal);
  ratatui::restore();
  result
}

fn init_logging(path: &Path) -> io::Result<()> {
  let file = File::create(path)?;
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));
  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(Mutex::new(file))
    .with_ansi(false)
    .init();
  Ok(())
}

fn load_puzzle(path: &Path, host: &Options) -> Puzzle {
  let data: Vec<u8> = std::fs::read(path).unwrap_or_else(|err| {
    println!("{:?}", err);
    std::process::exit(1);
  });
  let (puzzle, warnings) = Puzzle::from_bytes(data, host).unwrap_or_else(|e| {
    println!("Failed to parse {}: {}", path.display(), e);
    std::process::exit(2);
  });
  for warning in &warnings {
    warn!(path = %path.display(), "{warning}");
  }
  info!(path = %path.display(), warnings = warnings.len(), "loaded puzzle");
  puzzle
}

#[derive(Debug)]
enum SquareStyle {
  // Default styling
  Standard,
  // The cursor is positioned on this square.
  Cursor,
  // This cursor is not on this square, but the clue under the cursor includes this square.
  Word,
}

impl From<SquareStyle> for Style {
  fn from(value: SquareStyle) -> Self {
    let base_style = match value {
      SquareStyle::Standard => Style::new().bg(Color::White),
      SquareStyle::Cursor => Style::new().bg(Color::LightRed),
      SquareStyle::Word => Style::new().bg(Color::LightYellow),
    };
    base_style.fg(Color::Black).add_modifier(Modifier::BOLD)
  }
}

#[derive(Debug)]
pub struct App {
  registry: Registry,
  ids: Vec<String>,
  current: usize,
  cursor: Option<Cursor>,
  running: bool,
}

impl App {
  fn new(registry: Registry) -> Self {
    let ids = registry.ids().map(str::to_string).collect::<Vec<_>>();
    let mut app = Self {
      registry,
      ids,
      current: 0,
      cursor: None,
      running: true,
    };
    app.cursor = app.puzzle().and_then(Cursor::from_puzzle);
    app
  }

  fn puzzle(&self) -> Option<&Puzzle> {
    self.registry.get(self.ids.get(self.current)?)
  }

  fn puzzle_mut(&mut self) -> Option<&mut Puzzle> {
    self.registry.get_mut(self.ids.get(self.current)?)
  }

  pub fn run(mut self, mut terminal: DefaultTerminal) -> io::Result<()> {
    self.running = true;
    while self.running {
      terminal.draw(|frame| self.draw(frame))?;
      self.handle_crossterm_events()?;
    }
    Ok(())
  }

  fn draw(&self, frame: &mut Frame) {
    frame.render_widget(self, frame.area());
  }

  /// Reads the crossterm events and updates the state of [`App`].
  fn handle_crossterm_events(&mut self) -> io::Result<()> {
    match event::read()? {
      // it's important to check KeyEventKind::Press to avoid handling key release events
      Event::Key(key) if key.kind == KeyEventKind::Press => self.on_key_event(key),
      Event::Mouse(_) => {}
      Event::Resize(_, _) => {}
      _ => {}
    }
    Ok(())
  }

  /// Handles the key events and updates the state of [`App`].
  fn on_key_event(&mut self, key: KeyEvent) {
    match (key.modifiers, key.code) {
      (_, KeyCode::Esc) | (KeyModifiers::CONTROL, KeyCode::Char('c') | KeyCode::Char('C')) => {
        self.quit()
      }
      (KeyModifiers::CONTROL, KeyCode::Char('n')) => self.next_puzzle(),
      (KeyModifiers::CONTROL, KeyCode::Char('r')) => self.reveal_current_clue(),
      (_, KeyCode::Char(' ') | KeyCode::Enter) => self.with_cursor(Cursor::toggle_axis),
      (_, KeyCode::Tab) => self.with_cursor(Cursor::advance_to_next_word),
      (_, KeyCode::BackTab) => self.with_cursor(Cursor::back_to_previous_word),
      (_, KeyCode::Backspace) => self.erase_letter(),
      (_, KeyCode::Up) => self.with_cursor(|c, p| c.step(p, Down, false)),
      (_, KeyCode::Down) => self.with_cursor(|c, p| c.step(p, Down, true)),
      (_, KeyCode::Left) => self.with_cursor(|c, p| c.step(p, Across, false)),
      (_, KeyCode::Right) => self.with_cursor(|c, p| c.step(p, Across, true)),
      (_, KeyCode::PageUp) => self.with_cursor(|c, p| c.step(p, ZAxis, false)),
      (_, KeyCode::PageDown) => self.with_cursor(|c, p| c.step(p, ZAxis, true)),
      (_, KeyCode::Char(c)) if c.is_alphanumeric() => self.add_letter(c),
      _ => {}
    }
  }

  fn with_cursor(&mut self, f: impl FnOnce(&mut Cursor, &Puzzle)) {
    let Some(mut cursor) = self.cursor else {
      return;
    };
    if let Some(puzzle) = self.puzzle() {
      f(&mut cursor, puzzle);
    }
    self.cursor = Some(cursor);
  }

  fn add_letter(&mut self, letter: char) {
    let Some(cursor) = self.cursor else {
      return;
    };
    let written = self
      .puzzle_mut()
      .is_some_and(|p| p.set_letter(cursor.pos, &letter.to_string()));
    if written {
      self.with_cursor(Cursor::advance);
    }
  }

  fn erase_letter(&mut self) {
    let Some(cursor) = self.cursor else {
      return;
    };
    if let Some(puzzle) = self.puzzle_mut() {
      puzzle.clear_letter(cursor.pos);
    }
    self.with_cursor(Cursor::backup);
  }

  fn reveal_current_clue(&mut self) {
    let Some(idx) = self.current_clue() else {
      return;
    };
    if let Some(puzzle) = self.puzzle_mut() {
      puzzle.reveal(idx);
    }
  }

  fn next_puzzle(&mut self) {
    if self.ids.is_empty() {
      return;
    }
    self.current = (self.current + 1) % self.ids.len();
    self.cursor = self.puzzle().and_then(Cursor::from_puzzle);
    debug!(id = %self.ids[self.current], "switched puzzle");
  }

  /// Set running to false to quit the application.
  fn quit(&mut self) {
    self.running = false;
  }

  fn current_clue(&self) -> Option<ClueIdx> {
    self.cursor?.clue(self.puzzle()?)
  }

  // Determines how a particular square should be styled.
  fn square_style(&self, puzzle: &Puzzle, pos: Pos, word: &[Pos]) -> SquareStyle {
    if self.cursor.is_some_and(|c| c.pos == pos) {
      return SquareStyle::Cursor;
    }
    let in_span = self
      .cursor
      .and_then(|c| c.span(puzzle))
      .is_some_and(|s| s.cells.contains(&pos));
    if word.contains(&pos) || in_span {
      return SquareStyle::Word;
    }
    SquareStyle::Standard
  }

  fn render_square(
    &self,
    puzzle: &Puzzle,
    pos: Pos,
    style: SquareStyle,
    square_area: Rect,
    buf: &mut Buffer,
  ) {
    let cell = puzzle.cell(pos);
    let number = if puzzle.options().hide_inferred_numbers {
      String::new()
    } else {
      cell.number.map(|n| n.to_string()).unwrap_or_default()
    };
    let circle = if cell.has_circle { "o" } else { "" };
    match puzzle.square(pos) {
      Square::Block => Block::new()
        .style(Style::new().bg(Color::Black))
        .render(square_area, buf),
      Square::Empty => Paragraph::new(line![span!(number), " ", span!(circle)])
        .block(Block::new().style(style))
        .render(square_area, buf),
      Square::Letter(s) => {
        let text = Text::from(vec![
          line![span!(number), " ", span!(circle)],
          line![span!(s.to_string())].centered(),
        ]);
        Paragraph::new(text)
          .block(Block::new().style(style))
          .render(square_area, buf);
      }
    };
  }

  fn clue_text(&self, puzzle: &Puzzle) -> Text<'static> {
    let Some(idx) = self.current_clue() else {
      return Text::from("No clue here");
    };
    let clue = puzzle.clue(idx);
    let enumeration = clue
      .enumeration
      .as_ref()
      .map(|e| e.placeholder.clone())
      .unwrap_or_default();
    Text::from(vec![
      line![span!(Modifier::BOLD; "{} ", clue.display_label), span!(clue.text.clone())],
      line![span!(Color::DarkGray; "{}", enumeration)],
      line![],
      line![span!(puzzle.clue_entry(idx))],
    ])
  }
}

impl Widget for &App {
  fn render(self, area: Rect, buf: &mut Buffer) {
    let Some(puzzle) = self.puzzle() else {
      return;
    };
    let [title_area, main_area] =
      Layout::vertical([Constraint::Length(2), Constraint::Percentage(100)]).areas(area);

    let title = line![
      "Exolve Crossword".bold().blue(),
      ": ".bold(),
      puzzle.title().to_string().bold(),
      if puzzle.setter().is_empty() {
        span!("")
      } else {
        span!(" by {}", puzzle.setter())
      },
    ]
    .centered();
    title.render(title_area, buf);

    let [puzzle_area, clue_area] =
      Layout::horizontal([Constraint::Percentage(100), Constraint::Length(45)]).areas(main_area);

    let grid = puzzle.grid();
    let puzzle_area = center(
      puzzle_area,
      Constraint::Length(to_u16(grid.width() * (2 + SQUARE_WIDTH as usize))),
      Constraint::Length(to_u16(grid.height() * (1 + SQUARE_HEIGHT as usize))),
    );

    let word = self
      .current_clue()
      .map(|idx| puzzle.all_cells(idx).cells)
      .unwrap_or_default();
    let mut square_area = Rect {
      x: puzzle_area.x,
      y: puzzle_area.y,
      width: SQUARE_WIDTH,
      height: SQUARE_HEIGHT,
    };
    for row in 0..grid.height() {
      for col in 0..grid.width() {
        let style = self.square_style(puzzle, (row, col), &word);
        self.render_square(puzzle, (row, col), style, square_area.intersection(area), buf);
        square_area.x = square_area.x.saturating_add(SQUARE_WIDTH + 2);
      }
      square_area.x = puzzle_area.x;
      square_area.y = square_area.y.saturating_add(SQUARE_HEIGHT + 1);
    }

    Paragraph::new(self.clue_text(puzzle))
      .wrap(Wrap { trim: true })
      .block(
        Block::bordered()
          .title(line!["Current clue"].centered())
          .padding(Padding::uniform(2)),
      )
      .render(clue_area, buf);
  }
}

fn to_u16(n: usize) -> u16 {
  u16::try_from(n).unwrap_or(u16::MAX)
}

/// https://ratatui.rs/recipes/layout/center-a-widget/
fn center(area: Rect, horizontal: Constraint, vertical: Constraint) -> Rect {
  let [area] = Layout::horizontal([horizontal])
    .flex(Flex::Center)
    .areas(area);
  let [area] = Layout::vertical([vertical]).flex(Flex::Center).areas(area);
  area
}
