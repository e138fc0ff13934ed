use std::io;

use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::prelude::*;

use cadenza_recommend::{Candidate, Recommendation, RecommendationEngine};

pub mod detail;
pub mod results;

/// Which view the TUI is currently displaying.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Results,
    /// Detail view for the candidate at the given index.
    Detail(usize),
}

/// Application state for the browse TUI.
#[derive(Debug)]
pub struct App {
    pub engine: RecommendationEngine,
    pub recommendation: Recommendation,
    pub view: View,
    pub selected: usize,
    pub offset: usize, // First visible row in the table
    /// One-line message shown in the title bar, e.g. after a failed re-seed.
    pub status: Option<String>,
    pub should_quit: bool,
}

impl App {
    #[must_use]
    pub fn new(engine: RecommendationEngine, recommendation: Recommendation) -> Self {
        Self {
            engine,
            recommendation,
            view: View::Results,
            selected: 0,
            offset: 0,
            status: None,
            should_quit: false,
        }
    }

    pub fn candidates(&self) -> &[Candidate] {
        self.recommendation.candidates()
    }

    fn handle_key(&mut self, key: KeyCode) {
        match self.view {
            View::Results => self.handle_results_key(key),
            View::Detail(_) => self.handle_detail_key(key),
        }
    }

    fn handle_results_key(&mut self, key: KeyCode) {
        // Assume reasonable viewport height (will be refined in render)
        const VIEWPORT_HEIGHT: usize = 20;

        match key {
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Char('j') | KeyCode::Down => {
                if self.selected + 1 < self.candidates().len() {
                    self.selected += 1;
                    if self.selected >= self.offset + VIEWPORT_HEIGHT {
                        self.offset = self.selected - VIEWPORT_HEIGHT + 1;
                    }
                }
            }
            KeyCode::Char('k') | KeyCode::Up => {
                if self.selected > 0 {
                    self.selected -= 1;
                    if self.selected < self.offset {
                        self.offset = self.selected;
                    }
                }
            }
            KeyCode::Enter => {
                if !self.candidates().is_empty() {
                    self.view = View::Detail(self.selected);
                }
            }
            KeyCode::Char('r') => self.reseed(),
            _ => {}
        }
    }

    fn handle_detail_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Esc | KeyCode::Char('b') => self.view = View::Results,
            KeyCode::Char('n' | 'j') | KeyCode::Down => {
                if self.selected + 1 < self.candidates().len() {
                    self.selected += 1;
                    self.view = View::Detail(self.selected);
                }
            }
            KeyCode::Char('p' | 'k') | KeyCode::Up => {
                if self.selected > 0 {
                    self.selected -= 1;
                    self.view = View::Detail(self.selected);
                }
            }
            KeyCode::Char('r') => self.reseed(),
            _ => {}
        }
    }

    /// Replace the results with recommendations for the selected candidate.
    fn reseed(&mut self) {
        let Some(candidate) = self.candidates().get(self.selected) else {
            return;
        };
        let title = candidate.title.clone();
        let limit = self.engine.config().top_n;

        match self.engine.recommend_position(candidate.position, limit) {
            Some(next) if next.is_found() => {
                self.recommendation = next;
                self.view = View::Results;
                self.selected = 0;
                self.offset = 0;
                self.status = None;
            }
            _ => {
                self.status = Some(format!("No recommendations for '{title}'"));
            }
        }
    }
}

/// Run the browse TUI.
///
/// Sets up the terminal, runs the main event loop, and restores the terminal
/// on exit (including on error).
pub fn run_tui(engine: RecommendationEngine, recommendation: Recommendation) -> Result<()> {
    let app = App::new(engine, recommendation);

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run the event loop, capturing any error so we can restore the terminal
    let result = run_event_loop(&mut terminal, app);

    // Restore terminal regardless of success or failure
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn run_event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    mut app: App,
) -> Result<()> {
    loop {
        terminal.draw(|frame| match app.view {
            View::Results => results::render(frame, &app),
            View::Detail(idx) => detail::render(frame, &app, idx),
        })?;

        if let Event::Key(key) = event::read()? {
            if key.kind == KeyEventKind::Press {
                app.handle_key(key.code);
            }
        }

        if app.should_quit {
            return Ok(());
        }
    }
}
