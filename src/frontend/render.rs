//! Terminal rendering of the workshop.

use ratzilla::ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratzilla::ratatui::style::{Color, Modifier, Style};
use ratzilla::ratatui::text::{Line, Span};
use ratzilla::ratatui::widgets::{Block, Borders, Gauge, List, ListItem, Paragraph, Wrap};
use ratzilla::ratatui::Frame;

use crate::economy::logic::BonusRoll;
use crate::economy::save::SaveStorage;
use crate::economy::view::{format_money, CareBand, EconomyView};

use super::app::{App, LogEntry};

fn band_color(band: CareBand) -> Color {
    match band {
        CareBand::Critical => Color::Red,
        CareBand::Strained => Color::Yellow,
        CareBand::Steady => Color::Green,
    }
}

pub fn render<S: SaveStorage, R: BonusRoll>(app: &App<S, R>, f: &mut Frame, area: Rect) {
    let view = app.economy().view();

    let main_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(10),
            Constraint::Length(3),
        ])
        .split(area);

    render_title(f, main_chunks[0]);

    // Log panel on the right only when there is room for it.
    let (left, log_area) = if main_chunks[1].width >= 80 {
        let h = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
            .split(main_chunks[1]);
        (h[0], Some(h[1]))
    } else {
        (main_chunks[1], None)
    };

    let upgrade_height = view.upgrades.len() as u16 * 2 + 2;
    let left_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(7),
            Constraint::Length(3),
            Constraint::Length(upgrade_height),
            Constraint::Min(0),
        ])
        .split(left);

    render_stats(&view, app, f, left_chunks[0]);
    render_care(&view, f, left_chunks[1]);
    render_upgrades(&view, f, left_chunks[2]);
    match log_area {
        Some(area) => render_log(app.log(), f, area),
        None => render_log(app.log(), f, left_chunks[3]),
    }

    render_help(f, main_chunks[2]);
}

fn render_title(f: &mut Frame, area: Rect) {
    let title = Paragraph::new(Line::from(Span::styled(
        "Careful Tires: tire service clicker",
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
    )))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray)),
    )
    .alignment(Alignment::Center);
    f.render_widget(title, area);
}

fn render_stats<S: SaveStorage, R: BonusRoll>(
    view: &EconomyView,
    app: &App<S, R>,
    f: &mut Frame,
    area: Rect,
) {
    let label = Style::default().fg(Color::DarkGray);
    let value = Style::default().fg(Color::White).add_modifier(Modifier::BOLD);

    let last = match app.last_action() {
        Some(a) if a.bonus.is_some() => Span::styled(
            format!("+{} (tip!)", format_money(a.yield_amount)),
            Style::default().fg(Color::Yellow),
        ),
        Some(a) => Span::styled(format!("+{}", format_money(a.yield_amount)), value),
        None => Span::styled("-", label),
    };

    let lines = vec![
        Line::from(vec![
            Span::styled("Money: ", label),
            Span::styled(
                format_money(view.currency),
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            ),
        ]),
        Line::from(vec![
            Span::styled("Per wheel: ", label),
            Span::styled(format_money(view.ideal_action_yield), value),
            Span::styled("  Passive: ", label),
            Span::styled(format!("{}/s", format_money(view.auto_yield_per_second)), value),
        ]),
        Line::from(vec![
            Span::styled("Wheels: ", label),
            Span::styled(view.total_actions.to_string(), value),
            Span::styled("  Last: ", label),
            last,
        ]),
        Line::from(vec![
            Span::styled("Best wheel: ", label),
            Span::styled(format_money(view.best_single_action_yield), value),
            Span::styled("  Tips: ", label),
            Span::styled(format_money(view.total_bonus_yield), value),
        ]),
        Line::from(vec![
            Span::styled("Tip chance: ", label),
            Span::styled(
                format!("{:.0}%", view.bonus_roll_chance.clamp(0.0, 1.0) * 100.0),
                value,
            ),
        ]),
    ];

    let widget = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Green))
            .title(" Workshop "),
    );
    f.render_widget(widget, area);
}

fn render_care(view: &EconomyView, f: &mut Frame, area: Rect) {
    let color = band_color(view.care_band);
    let gauge = Gauge::default()
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(color))
                .title(" Care "),
        )
        .gauge_style(Style::default().fg(color).bg(Color::Black))
        .ratio(view.care.clamp(0.0, 1.0))
        .label(format!(
            "{:.0}% {}",
            view.care * 100.0,
            view.care_band.label()
        ));
    f.render_widget(gauge, area);
}

fn render_upgrades(view: &EconomyView, f: &mut Frame, area: Rect) {
    let items: Vec<ListItem> = view
        .upgrades
        .iter()
        .enumerate()
        .map(|(i, row)| {
            let (key_style, name_style) = if row.affordable {
                (
                    Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
                    Style::default().fg(Color::White),
                )
            } else {
                (
                    Style::default().fg(Color::DarkGray),
                    Style::default().fg(Color::DarkGray),
                )
            };
            ListItem::new(vec![
                Line::from(vec![
                    Span::styled(format!(" [{}] ", i + 1), key_style),
                    Span::styled(row.name, name_style),
                    Span::styled(
                        format!("  lvl {}  {}", row.level, format_money(row.cost)),
                        name_style,
                    ),
                ]),
                Line::from(Span::styled(
                    format!("      {}", row.description),
                    Style::default().fg(Color::DarkGray),
                )),
            ])
        })
        .collect();

    let list = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Yellow))
            .title(" Upgrades "),
    );
    f.render_widget(list, area);
}

fn render_log<'a, I>(entries: I, f: &mut Frame, area: Rect)
where
    I: DoubleEndedIterator<Item = &'a LogEntry>,
{
    let visible_height = area.height.saturating_sub(2) as usize;

    // Newest first.
    let lines: Vec<Line> = entries
        .rev()
        .take(visible_height)
        .enumerate()
        .map(|(i, entry)| {
            let style = match (entry.important, i < 3) {
                (true, true) => Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
                (true, false) => Style::default().fg(Color::Yellow),
                (false, true) => Style::default().fg(Color::White),
                (false, false) => Style::default().fg(Color::DarkGray),
            };
            Line::from(Span::styled(entry.text.as_str(), style))
        })
        .collect();

    let widget = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Blue))
                .title(" Log "),
        )
        .wrap(Wrap { trim: false });
    f.render_widget(widget, area);
}

fn render_help(f: &mut Frame, area: Rect) {
    let help = Paragraph::new(Line::from(Span::styled(
        "[C/Space] service wheel  [1-5] buy upgrade  [S] save",
        Style::default().fg(Color::DarkGray),
    )))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray)),
    )
    .alignment(Alignment::Center);
    f.render_widget(help, area);
}
