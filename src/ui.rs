use image::{DynamicImage, GenericImageView};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols::Marker,
    text::{Line, Span},
    widgets::{
        canvas::{Canvas, Points},
        Block, Borders, List, ListItem, Paragraph, Wrap,
    },
    Frame,
};
use tui_big_text::{BigText, PixelSize};

use crate::app::{App, Focus, NO_GAMES_TEXT};
use crate::card::{GameCard, TeamBlock};
use crate::filter::GridStatus;
use crate::logos;

const ACCENT: Color = Color::Rgb(255, 165, 0);
const CARD_WIDTH: u16 = 36;
const CARD_HEIGHT: u16 = 7;
// Quadrant glyphs are 4 columns wide.
const BIG_GLYPH_WIDTH: u16 = 4;

pub fn ui(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            [
                Constraint::Length(6), // Displayed date
                Constraint::Length(3), // Date input
                Constraint::Length(4), // Week strip
                Constraint::Min(0),    // Filters + games
                Constraint::Length(3), // Status bar
            ]
            .as_ref(),
        )
        .split(f.area());

    draw_header(f, app, chunks[0]);
    draw_date_input(f, app, chunks[1]);
    draw_week(f, app, chunks[2]);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(25), Constraint::Percentage(75)].as_ref())
        .split(chunks[3]);

    draw_filters(f, app, body[0]);
    draw_games(f, app, body[1]);
    draw_status_bar(f, app, chunks[4]);
}

fn draw_header(f: &mut Frame, app: &App, area: Rect) {
    let block = Block::default().title(" COURTSIDE ").borders(Borders::ALL);
    let inner = block.inner(area);
    f.render_widget(block, area);

    let wanted = app.displayed_date.chars().count() as u16 * BIG_GLYPH_WIDTH;
    if inner.width >= wanted && inner.height >= 4 {
        let big = BigText::builder()
            .pixel_size(PixelSize::Quadrant)
            .style(Style::default().fg(ACCENT))
            .lines(vec![app.displayed_date.clone().into()])
            .alignment(Alignment::Center)
            .build();
        f.render_widget(big, inner);
    } else {
        let p = Paragraph::new(app.displayed_date.clone())
            .style(Style::default().fg(ACCENT).add_modifier(Modifier::BOLD))
            .alignment(Alignment::Center);
        f.render_widget(p, inner);
    }
}

fn draw_date_input(f: &mut Frame, app: &App, area: Rect) {
    let (value, style, title) = match &app.date_edit {
        Some(buffer) => (
            format!("{}_", buffer),
            Style::default().fg(Color::Black).bg(ACCENT),
            " DATE (Enter to load, Esc to cancel) ".to_string(),
        ),
        None => {
            let title = match app.browsing_week_of() {
                Some(start) => format!(" DATE (browsing week of {}, Enter to select) ", start),
                None => " DATE ".to_string(),
            };
            (app.date_input.clone(), Style::default(), title)
        }
    };
    let line = Line::from(vec![Span::raw(" "), Span::styled(value, style)]);
    let p = Paragraph::new(line).block(Block::default().title(title).borders(Borders::ALL));
    f.render_widget(p, area);
}

fn draw_week(f: &mut Frame, app: &App, area: Rect) {
    let cells = app.week.cells(app.today);
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, 7); 7].as_ref())
        .split(area);

    for (i, cell) in cells.iter().enumerate() {
        let mut text_style = Style::default();
        if cell.is_today {
            text_style = text_style.fg(Color::Yellow).add_modifier(Modifier::BOLD);
        }
        if cell.is_selected {
            text_style = text_style.fg(Color::Black).bg(ACCENT).add_modifier(Modifier::BOLD);
        }

        let border_style = if app.focus == Focus::Week && app.week.cursor() == i {
            Style::default().fg(ACCENT)
        } else {
            Style::default().fg(Color::DarkGray)
        };

        let lines = vec![
            Line::from(Span::styled(cell.day_name, text_style)),
            Line::from(Span::styled(cell.day_number.to_string(), text_style)),
        ];
        let p = Paragraph::new(lines)
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL).border_style(border_style));
        f.render_widget(p, columns[i]);
    }
}

fn draw_filters(f: &mut Frame, app: &mut App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(3)].as_ref())
        .split(area);

    let border_style = if app.focus == Focus::Filters {
        Style::default().fg(ACCENT)
    } else {
        Style::default()
    };

    let items: Vec<ListItem> = app
        .team_options
        .iter()
        .map(|option| ListItem::new(option.label.clone()))
        .collect();

    let teams = List::new(items)
        .block(
            Block::default()
                .title(" TEAM ")
                .borders(Borders::ALL)
                .border_style(border_style),
        )
        .highlight_style(
            Style::default()
                .add_modifier(Modifier::BOLD)
                .bg(Color::DarkGray)
                .fg(Color::White),
        );
    f.render_stateful_widget(teams, chunks[0], &mut app.team_state);

    let confidence = Paragraph::new(format!(" {}", app.confidence))
        .block(Block::default().title(" CONFIDENCE ").borders(Borders::ALL));
    f.render_widget(confidence, chunks[1]);
}

fn draw_games(f: &mut Frame, app: &App, area: Rect) {
    let block = Block::default().title(" GAMES ").borders(Borders::ALL);
    let inner = block.inner(area);
    f.render_widget(block, area);

    let message = match &app.grid.status {
        GridStatus::Idle => return,
        GridStatus::Loading => Some(("Loading games...", Color::Gray)),
        GridStatus::NoGamesScheduled => Some((NO_GAMES_TEXT, Color::Gray)),
        GridStatus::Failed(text) => Some((text.as_str(), Color::Red)),
        GridStatus::Loaded => app.grid.no_matches.map(|text| (text, Color::Gray)),
    };

    if let Some((text, color)) = message {
        let p = Paragraph::new(text)
            .style(Style::default().fg(color))
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true });
        f.render_widget(p, inner);
        return;
    }

    let columns = (inner.width / CARD_WIDTH).max(1);
    let card_width = inner.width / columns;

    for (i, card) in app.grid.visible_cards().enumerate() {
        let i = i as u16;
        let x = inner.x + (i % columns) * card_width;
        let y = inner.y + (i / columns) * CARD_HEIGHT;
        if y + CARD_HEIGHT > inner.bottom() {
            break;
        }
        draw_card(f, app, card, Rect::new(x, y, card_width, CARD_HEIGHT));
    }
}

fn draw_card(f: &mut Frame, app: &App, card: &GameCard, area: Rect) {
    let block = Block::default()
        .title(format!(" {} ", card.status_line))
        .borders(Borders::ALL);
    let inner = block.inner(area);
    f.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(
            [
                Constraint::Percentage(38), // Visitor
                Constraint::Percentage(24), // Score / VS
                Constraint::Percentage(38), // Home
            ]
            .as_ref(),
        )
        .split(inner);

    draw_team(f, app, &card.visitor, chunks[0]);

    let score = Paragraph::new(vec![
        Line::from(""),
        Line::from(Span::styled(
            card.score.to_string(),
            Style::default().add_modifier(Modifier::BOLD),
        )),
    ])
    .alignment(Alignment::Center);
    f.render_widget(score, chunks[1]);

    draw_team(f, app, &card.home, chunks[2]);
}

fn draw_team(f: &mut Frame, app: &App, team: &TeamBlock, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(0)].as_ref())
        .split(area);

    match app.logos.get(&team.abbreviation).filter(|_| app.show_logos) {
        Some(img) => draw_logo(f, img, chunks[0]),
        None => {
            let p = Paragraph::new(vec![Line::from(""), Line::from(logos::fallback_label(&team.abbreviation))])
                .style(Style::default().add_modifier(Modifier::BOLD))
                .alignment(Alignment::Center);
            f.render_widget(p, chunks[0]);
        }
    }

    let name = Paragraph::new(team.name.clone())
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
    f.render_widget(name, chunks[1]);
}

/// Samples the image onto a braille canvas, two dots per column and four per row.
fn draw_logo(f: &mut Frame, img: &DynamicImage, area: Rect) {
    let cols = area.width as u32 * 2;
    let rows = area.height as u32 * 4;
    if cols == 0 || rows == 0 {
        return;
    }

    let canvas = Canvas::default()
        .marker(Marker::Braille)
        .x_bounds([0.0, cols as f64])
        .y_bounds([0.0, rows as f64])
        .paint(|ctx| {
            let (w, h) = img.dimensions();
            for y in 0..rows {
                for x in 0..cols {
                    let img_x = (x as f64 / cols as f64 * w as f64) as u32;
                    let img_y = (y as f64 / rows as f64 * h as f64) as u32;
                    if img_x < w && img_y < h {
                        let p = img.get_pixel(img_x, img_y);
                        if p[3] > 128 {
                            ctx.draw(&Points {
                                coords: &[(x as f64, (rows - y) as f64)],
                                color: Color::Rgb(p[0], p[1], p[2]),
                            });
                        }
                    }
                }
            }
        });
    f.render_widget(canvas, area);
}

fn draw_status_bar(f: &mut Frame, app: &App, area: Rect) {
    let line = Line::from(vec![
        Span::styled(
            format!(" {} ", app.grid.counter),
            Style::default().bg(Color::White).fg(Color::Black).add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            "  d date  h/l day  Enter select  [/] week  t today  Tab focus  j/k team  c confidence  a apply  r reload  L logos  q quit",
            Style::default().fg(Color::DarkGray),
        ),
    ]);
    let p = Paragraph::new(line).block(Block::default().borders(Borders::TOP | Borders::BOTTOM));
    f.render_widget(p, area);
}
