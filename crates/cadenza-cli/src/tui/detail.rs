use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph};

use cadenza_core::model::AudioFeature;
use cadenza_recommend::Candidate;

use super::App;

/// Render the detail view for the candidate at `idx`.
pub fn render(frame: &mut Frame, app: &App, idx: usize) {
    let area = frame.area();

    let Some(candidate) = app.candidates().get(idx) else {
        let msg = Paragraph::new("Candidate not found").style(Style::default().fg(Color::Red));
        frame.render_widget(msg, area);
        return;
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Candidate header
            Constraint::Length(3), // Match summary
            Constraint::Min(5),    // Audio features
            Constraint::Length(3), // Help bar
        ])
        .split(area);

    render_header(frame, candidate, chunks[0]);
    render_match(frame, app, candidate, chunks[1]);
    render_features(frame, app, candidate, chunks[2]);
    render_help(frame, chunks[3]);
}

fn render_header(frame: &mut Frame, candidate: &Candidate, area: Rect) {
    let header = Paragraph::new(format!(
        "#{} {} - {}",
        candidate.rank, candidate.title, candidate.artist
    ))
    .style(
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
    )
    .block(Block::default().borders(Borders::ALL));
    frame.render_widget(header, area);
}

fn render_match(frame: &mut Frame, app: &App, candidate: &Candidate, area: Rect) {
    let input = app.recommendation.input();
    let same_genre = input.is_some_and(|i| i.genre == candidate.genre);
    let same_artist = input.is_some_and(|i| i.artist == candidate.artist);

    let mut spans = vec![
        Span::styled(
            format!("Match {:.1}%", candidate.score),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::raw(format!("   distance {:.4}", candidate.distance)),
    ];
    if same_genre {
        spans.push(Span::styled("   +genre", Style::default().fg(Color::Green)));
    }
    if same_artist {
        spans.push(Span::styled("   +artist", Style::default().fg(Color::Green)));
    }

    let summary = Paragraph::new(Line::from(spans)).block(Block::default().borders(Borders::ALL));
    frame.render_widget(summary, area);
}

fn render_features(frame: &mut Frame, app: &App, candidate: &Candidate, area: Rect) {
    let catalog = app.engine.catalog();
    let track = catalog.get(candidate.position);
    let input = app
        .recommendation
        .input()
        .and_then(|i| catalog.get(i.position));

    let lines: Vec<Line<'_>> = match track {
        Some(track) => {
            let mut lines = vec![Line::from(Span::styled(
                format!("  {:<20}{:>12}{:>12}", "feature", "track", "input"),
                Style::default().fg(Color::DarkGray),
            ))];
            lines.push(feature_line("genre", &track.track_genre, input.map(|t| t.track_genre.as_str())));
            for feature in AudioFeature::ALL {
                lines.push(feature_line(
                    feature.name(),
                    &format!("{:.3}", track.audio(feature)),
                    input.map(|t| format!("{:.3}", t.audio(feature))).as_deref(),
                ));
            }
            lines.push(feature_line(
                "popularity",
                &format!("{}", track.popularity),
                input.map(|t| format!("{}", t.popularity)).as_deref(),
            ));
            lines.push(feature_line(
                "explicit",
                if track.explicit { "yes" } else { "no" },
                input.map(|t| if t.explicit { "yes" } else { "no" }),
            ));
            lines
        }
        None => vec![Line::from("  Track not in catalog")],
    };

    let features = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .title(format!("Features ({})", candidate.track_id)),
    );
    frame.render_widget(features, area);
}

fn feature_line(name: &str, value: &str, input: Option<&str>) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("  {:<20}", name), Style::default().fg(Color::Cyan)),
        Span::raw(format!("{:>12}", value)),
        Span::styled(
            format!("{:>12}", input.unwrap_or("-")),
            Style::default().fg(Color::DarkGray),
        ),
    ])
}

fn render_help(frame: &mut Frame, area: Rect) {
    let help = Paragraph::new("  \u{2191}/k Prev  \u{2193}/j Next  r Re-seed  b Back  q Quit")
        .style(Style::default().fg(Color::DarkGray))
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(help, area);
}
