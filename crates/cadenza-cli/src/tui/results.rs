use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Cell, Paragraph, Row, Table};

use super::App;

/// Render the ranked recommendations view.
pub fn render(frame: &mut Frame, app: &App) {
    let area = frame.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Input summary
            Constraint::Min(5),    // Recommendations table
            Constraint::Length(3), // Help bar
        ])
        .split(area);

    render_title(frame, app, chunks[0]);
    render_table(frame, app, chunks[1]);
    render_help(frame, chunks[2]);
}

fn render_title(frame: &mut Frame, app: &App, area: Rect) {
    let text = match (app.recommendation.input(), &app.status) {
        (_, Some(status)) => status.clone(),
        (Some(input), None) => format!(
            "{} - {}    {} | {:?}dB | {:.0} BPM",
            input.title, input.artist, input.genre, input.loudness, input.tempo
        ),
        (None, None) => "No input".to_string(),
    };
    let title = Paragraph::new(text)
        .style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(title, area);
}

fn render_table(frame: &mut Frame, app: &App, area: Rect) {
    let header = Row::new(vec![
        Cell::from("#").style(Style::default().fg(Color::DarkGray)),
        Cell::from("Title").style(Style::default().add_modifier(Modifier::BOLD)),
        Cell::from("Artist"),
        Cell::from("Genre"),
        Cell::from("Vol dB"),
        Cell::from("Match"),
    ])
    .height(1);

    // area.height - 2 for borders - 1 for header
    let viewport_height = (area.height.saturating_sub(3)) as usize;
    let candidates = app.candidates();
    let visible_start = app.offset;
    let visible_end = (visible_start + viewport_height).min(candidates.len());
    let input_artist = app.recommendation.input().map(|i| i.artist.as_str());

    let rows: Vec<Row> = candidates
        .iter()
        .enumerate()
        .skip(visible_start)
        .take(viewport_height)
        .map(|(i, candidate)| {
            let style = if i == app.selected {
                Style::default().bg(Color::DarkGray).fg(Color::White)
            } else if Some(candidate.artist.as_str()) == input_artist {
                Style::default().fg(Color::Yellow)
            } else {
                Style::default()
            };
            Row::new(vec![
                Cell::from(format!("{}", candidate.rank)),
                Cell::from(candidate.title.clone()),
                Cell::from(candidate.artist.clone()),
                Cell::from(candidate.genre.clone()),
                Cell::from(format!("{}", candidate.loudness)),
                Cell::from(format!("{:.1}%", candidate.score)),
            ])
            .style(style)
        })
        .collect();

    let title = if candidates.len() > viewport_height {
        format!(
            "Recommendations [{}-{} of {}]",
            visible_start + 1,
            visible_end,
            candidates.len()
        )
    } else {
        "Recommendations".to_string()
    };

    let table = Table::new(
        rows,
        [
            Constraint::Length(4),
            Constraint::Percentage(35),
            Constraint::Percentage(25),
            Constraint::Percentage(15),
            Constraint::Length(8),
            Constraint::Length(8),
        ],
    )
    .header(header)
    .block(Block::default().borders(Borders::ALL).title(title));

    frame.render_widget(table, area);
}

fn render_help(frame: &mut Frame, area: Rect) {
    let help = Paragraph::new("  \u{2191}/k Up  \u{2193}/j Down  Enter Detail  r Re-seed  q Quit")
        .style(Style::default().fg(Color::DarkGray))
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(help, area);
}
