use crate::application::{
    App, FormField, FormMessage, LocationState, OrphanageDataScreen, OrphanageDetailsScreen,
    OrphanagesMapScreen, Screen, SelectPositionScreen, Viewport,
};
use crate::domain::{Coordinate, WeekendAvailability};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols::Marker,
    text::{Line, Span},
    widgets::{
        canvas::{Canvas, Context, Map, MapResolution, Points},
        Block, Borders, Clear, Paragraph, Wrap,
    },
    Frame,
};

const LISTING_WIDTH: u16 = 34;

pub fn render_ui(f: &mut Frame, app: &App) {
    let chunks = main_chunks(f.area());

    render_header(f, app, chunks[0]);
    match app.screen() {
        Screen::OrphanagesMap(screen) => render_orphanages_map(f, screen, chunks[1]),
        Screen::SelectPosition(screen) => render_select_position(f, screen, chunks[1]),
        Screen::OrphanageData(screen) => render_orphanage_data(f, screen, chunks[1]),
        Screen::OrphanageDetails(screen) => render_orphanage_details(f, screen, chunks[1]),
    }
    render_status_bar(f, app, chunks[2]);

    if app.show_help {
        render_help_popup(f, app.help_scroll);
    }
}

fn main_chunks(area: Rect) -> Vec<Rect> {
    Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(3),
        ])
        .split(area)
        .to_vec()
}

fn map_chunks(body: Rect) -> Vec<Rect> {
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(0), Constraint::Length(LISTING_WIDTH)])
        .split(body)
        .to_vec()
}

/// The drawable cells of the interactive map on the current screen, if it
/// shows one. Mouse clicks inside this area are projected onto the map.
pub fn map_canvas_area(app: &App, area: Rect) -> Option<Rect> {
    let body = main_chunks(area)[1];
    let outer = match app.screen() {
        Screen::OrphanagesMap(_) => map_chunks(body)[0],
        Screen::SelectPosition(_) => body,
        _ => return None,
    };
    Some(Block::default().borders(Borders::ALL).inner(outer))
}

fn render_header(f: &mut Frame, app: &App, area: Rect) {
    let header = Paragraph::new(format!("orphanages | {}", app.screen().title()))
        .style(Style::default().fg(Color::Cyan));
    f.render_widget(header, area);
}

/// Draws the world outline plus whatever `paint` adds on top of it.
fn render_map<F>(f: &mut Frame, area: Rect, title: &str, viewport: &Viewport, paint: F)
where
    F: Fn(&mut Context),
{
    let canvas = Canvas::default()
        .block(Block::default().borders(Borders::ALL).title(title.to_string()))
        .marker(Marker::Braille)
        .x_bounds(viewport.x_bounds())
        .y_bounds(viewport.y_bounds())
        .paint(|ctx| {
            ctx.draw(&Map {
                color: Color::DarkGray,
                resolution: MapResolution::High,
            });
            ctx.layer();
            paint(ctx);
        });
    f.render_widget(canvas, area);
}

fn render_map_placeholder(f: &mut Frame, area: Rect, title: &str, location: &LocationState) {
    let (text, style) = match location {
        LocationState::Failed(reason) => (
            format!("{}\n\nPress r to retry.", reason),
            Style::default().fg(Color::Red),
        ),
        _ => ("Locating device...".to_string(), Style::default().fg(Color::Yellow)),
    };
    let paragraph = Paragraph::new(text)
        .block(Block::default().borders(Borders::ALL).title(title.to_string()))
        .style(style)
        .wrap(Wrap { trim: true });
    f.render_widget(paragraph, area);
}

fn mark(ctx: &mut Context, position: Coordinate, color: Color) {
    ctx.draw(&Points {
        coords: &[(position.longitude(), position.latitude())],
        color,
    });
}

fn render_orphanages_map(f: &mut Frame, screen: &OrphanagesMapScreen, area: Rect) {
    let chunks = map_chunks(area);

    match screen.viewport() {
        Some(viewport) => {
            let selected = screen.selected().map(|o| o.id.clone());
            let device = screen.location().position();
            render_map(f, chunks[0], "Map", viewport, |ctx| {
                if let Some(device) = device {
                    mark(ctx, device, Color::Blue);
                    ctx.print(device.longitude(), device.latitude(), Span::styled("◎", Style::default().fg(Color::Blue)));
                }
                for orphanage in screen.orphanages() {
                    let is_selected = selected.as_ref() == Some(&orphanage.id);
                    let color = if is_selected { Color::Yellow } else { Color::LightRed };
                    ctx.print(
                        orphanage.longitude,
                        orphanage.latitude,
                        Span::styled("●", Style::default().fg(color)),
                    );
                    if is_selected {
                        ctx.print(
                            orphanage.longitude,
                            orphanage.latitude,
                            Span::styled(
                                format!("  {} >", orphanage.name),
                                Style::default().fg(Color::Black).bg(Color::Yellow),
                            ),
                        );
                    }
                }
            });
        }
        None => render_map_placeholder(f, chunks[0], "Map", screen.location()),
    }

    render_listing(f, screen, chunks[1]);
}

fn render_listing(f: &mut Frame, screen: &OrphanagesMapScreen, area: Rect) {
    let mut lines: Vec<Line> = screen
        .orphanages()
        .iter()
        .map(|orphanage| {
            let is_selected = screen.selected().map(|s| &s.id) == Some(&orphanage.id);
            let style = if is_selected {
                Style::default().bg(Color::Blue).fg(Color::White)
            } else {
                Style::default()
            };
            Line::from(Span::styled(orphanage.name.clone(), style))
        })
        .collect();

    if let Some(error) = screen.list_error() {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            format!("{}. Press r to retry.", error),
            Style::default().fg(Color::Red),
        )));
    }

    let count = screen.orphanages().len();
    let footer = if screen.is_loading() && count == 0 {
        "Loading...".to_string()
    } else {
        format!("{} orphanages found", count)
    };

    let listing = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Orphanages")
                .title_bottom(Line::from(format!(" {} | n: + ", footer))),
        )
        .wrap(Wrap { trim: true });
    f.render_widget(listing, area);
}

fn render_select_position(f: &mut Frame, screen: &SelectPositionScreen, area: Rect) {
    let title = match screen.candidate() {
        Some(candidate) => format!("Selected {} | Enter: Next", candidate),
        None => "Click the map or press Enter to place the marker".to_string(),
    };

    let Some(viewport) = screen.viewport() else {
        render_map_placeholder(f, area, &title, screen.location());
        return;
    };

    let center = viewport.center();
    let candidate = screen.candidate();
    render_map(f, area, &title, viewport, |ctx| {
        ctx.print(center.longitude(), center.latitude(), Span::styled("+", Style::default().fg(Color::Gray)));
        if let Some(candidate) = candidate {
            mark(ctx, candidate, Color::LightRed);
            ctx.print(
                candidate.longitude(),
                candidate.latitude(),
                Span::styled("●", Style::default().fg(Color::LightRed).add_modifier(Modifier::BOLD)),
            );
        }
    });
}

fn render_orphanage_data(f: &mut Frame, screen: &OrphanageDataScreen, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!("Data | {}", screen.context().position()));
    let inner = block.inner(area);

    let mut lines = Vec::new();
    let mut cursor_at = None;

    for field in FormField::ALL {
        let focused = screen.focus() == field;
        let label_style = if focused {
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Cyan)
        };

        let value = match field {
            FormField::Images => {
                let names: Vec<String> = screen.draft().images().iter().map(|i| i.display_name()).collect();
                let suffix = if screen.is_opening_library() { " (opening library...)" } else { "" };
                if names.is_empty() {
                    format!("[+]{}", suffix)
                } else {
                    format!("{} [+]{}", names.join(", "), suffix)
                }
            }
            FormField::OpenOnWeekends => {
                let toggle = if screen.draft().open_on_weekends { "[x] Yes" } else { "[ ] No" };
                toggle.to_string()
            }
            FormField::Submit => {
                let button = if screen.is_submitting() { "[ Registering... ]" } else { "[ Register ]" };
                button.to_string()
            }
            _ => screen.text(field).unwrap_or_default().to_string(),
        };

        let label = format!("{:>18}: ", field.label());
        if focused && field.is_text() {
            let column = label.chars().count() + screen.cursor();
            cursor_at = Some((inner.x + column as u16, inner.y + lines.len() as u16));
        }
        let value_style = if focused {
            Style::default().bg(Color::DarkGray)
        } else {
            Style::default()
        };
        lines.push(Line::from(vec![
            Span::styled(label, label_style),
            Span::styled(value, value_style),
        ]));
        lines.push(Line::from(""));
    }

    match screen.message() {
        Some(FormMessage::Info(text)) => {
            lines.push(Line::from(Span::styled(text.clone(), Style::default().fg(Color::Green))))
        }
        Some(FormMessage::Error(text)) => {
            lines.push(Line::from(Span::styled(text.clone(), Style::default().fg(Color::Red))))
        }
        None => {}
    }

    f.render_widget(Paragraph::new(lines).block(block), area);

    if let Some(picker) = screen.picker() {
        render_image_picker(f, picker.choices().iter().map(|c| c.display_name()).collect(), picker.selected());
    } else if let Some((x, y)) = cursor_at {
        if x < inner.right() && y < inner.bottom() {
            f.set_cursor_position((x, y));
        }
    }
}

fn render_image_picker(f: &mut Frame, names: Vec<String>, selected: usize) {
    let popup_area = popup(f.area());
    f.render_widget(Clear, popup_area);

    let visible_height = popup_area.height.saturating_sub(2) as usize;
    let start = selected.saturating_sub(visible_height.saturating_sub(1));
    let lines: Vec<Line> = names
        .into_iter()
        .enumerate()
        .skip(start)
        .take(visible_height)
        .map(|(index, name)| {
            let style = if index == selected {
                Style::default().bg(Color::Blue).fg(Color::White)
            } else {
                Style::default()
            };
            Line::from(Span::styled(name, style))
        })
        .collect();

    let picker = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .title("Photo library | Enter: add | Esc: cancel")
            .style(Style::default().fg(Color::Cyan)),
    );
    f.render_widget(picker, popup_area);
}

fn render_orphanage_details(f: &mut Frame, screen: &OrphanageDetailsScreen, area: Rect) {
    let Some(orphanage) = screen.orphanage() else {
        let (text, style) = match screen.error() {
            Some(error) => (format!("{}\n\nPress r to retry.", error), Style::default().fg(Color::Red)),
            None => ("Loading...".to_string(), Style::default().fg(Color::Yellow)),
        };
        let paragraph = Paragraph::new(text)
            .block(Block::default().borders(Borders::ALL).title(format!("Orphanage {}", screen.id())))
            .style(style);
        f.render_widget(paragraph, area);
        return;
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(6),
            Constraint::Length(10),
            Constraint::Length(4),
        ])
        .split(area);

    let gallery = match screen.current_image() {
        Some(image) => format!("{}/{}  {}", screen.gallery_page() + 1, orphanage.images.len(), image.url),
        None => "No photos".to_string(),
    };
    f.render_widget(
        Paragraph::new(gallery).block(Block::default().borders(Borders::ALL).title("Photos | ←/→")),
        chunks[0],
    );

    let text = vec![
        Line::from(Span::styled(
            orphanage.name.clone(),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(orphanage.about.clone()),
        Line::from(""),
        Line::from(Span::styled("Instructions for visiting", Style::default().fg(Color::Cyan))),
        Line::from(orphanage.instructions.clone()),
    ];
    f.render_widget(
        Paragraph::new(text)
            .block(Block::default().borders(Borders::ALL))
            .wrap(Wrap { trim: true }),
        chunks[1],
    );

    match orphanage.position() {
        Ok(position) => {
            let viewport = Viewport::centered_at(position);
            render_map(f, chunks[2], "c: copy route link", &viewport, |ctx| {
                ctx.print(
                    position.longitude(),
                    position.latitude(),
                    Span::styled("●", Style::default().fg(Color::LightRed)),
                );
            });
        }
        Err(e) => {
            f.render_widget(
                Paragraph::new(e.to_string()).block(Block::default().borders(Borders::ALL)),
                chunks[2],
            );
        }
    }

    let weekend_style = match orphanage.weekend_availability() {
        WeekendAvailability::Open => Style::default().fg(Color::Green),
        WeekendAvailability::Closed => Style::default().fg(Color::Red),
    };
    let schedule = vec![
        Line::from(Span::styled(orphanage.weekday_schedule(), Style::default().fg(Color::Blue))),
        Line::from(Span::styled(orphanage.weekend_availability().label(), weekend_style)),
    ];
    f.render_widget(
        Paragraph::new(schedule).block(Block::default().borders(Borders::ALL)),
        chunks[3],
    );
}

fn render_status_bar(f: &mut Frame, app: &App, area: Rect) {
    let hints = if app.show_help {
        "↑↓/jk: scroll | PgUp/PgDn: fast scroll | Home: top | Esc/q: close help".to_string()
    } else if let Some(status) = &app.status_message {
        status.clone()
    } else {
        let hint: &str = match app.screen() {
            Screen::OrphanagesMap(_) => {
                "Tab/click: select | Enter/click again: open | n: new orphanage | arrows: pan | +/-: zoom | r: refresh | ?: help | q: quit"
            }
            Screen::SelectPosition(_) => {
                "Click/Enter: place marker | Space: move marker to + | Enter: next | arrows: pan | +/-: zoom | Esc: back"
            }
            Screen::OrphanageData(screen) if screen.picker().is_some() => {
                "↑↓: choose photo | Enter: add | Esc: cancel"
            }
            Screen::OrphanageData(_) => "Tab/↑↓: move | Enter: select | Ctrl+S: register | F1: help | Esc: back",
            Screen::OrphanageDetails(screen) => match screen.notice() {
                Some(notice) => notice,
                None => "←/→: photos | c: copy route link | r: retry | Esc: back",
            },
        };
        hint.to_string()
    };

    let status = Paragraph::new(hints)
        .block(Block::default().borders(Borders::ALL).title("Status"))
        .style(if app.status_message.is_some() {
            Style::default().fg(Color::Green)
        } else {
            Style::default()
        });
    f.render_widget(status, area);
}

fn popup(area: Rect) -> Rect {
    Rect {
        x: area.width / 10,
        y: area.height / 10,
        width: area.width * 4 / 5,
        height: area.height * 4 / 5,
    }
}

fn render_help_popup(f: &mut Frame, scroll: usize) {
    let popup_area = popup(f.area());

    f.render_widget(Clear, popup_area);

    let help_text = get_help_text();
    let help_lines: Vec<&str> = help_text.lines().collect();
    let visible_height = popup_area.height.saturating_sub(2) as usize;

    let start_line = scroll.min(help_lines.len().saturating_sub(visible_height));
    let end_line = (start_line + visible_height).min(help_lines.len());

    let visible_text = help_lines[start_line..end_line].join("\n");

    let help_widget = Paragraph::new(visible_text)
        .block(Block::default()
            .borders(Borders::ALL)
            .title(format!("Help (Line {}/{})", start_line + 1, help_lines.len()))
            .style(Style::default().fg(Color::Cyan)))
        .style(Style::default().fg(Color::White));

    f.render_widget(help_widget, popup_area);
}

fn get_help_text() -> &'static str {
    r#"ORPHANAGES

Browse the orphanages registered around you, open their details, and
register new ones in two steps: pick a spot on the map, then fill in
the form.

=== MAP ===
Tab / Shift+Tab Select next/previous orphanage
Click marker    Select the orphanage under the pointer
Click again     Open the selected orphanage
Enter           Open the selected orphanage
Esc             Clear the selection
n               Register a new orphanage
Arrow keys      Pan the map
+ / -           Zoom in/out (mouse wheel works too)
r               Reload location and orphanages
q               Quit

=== SELECT POSITION ===
Click           Place the marker where you clicked
Space           Place the marker under the crosshair (+)
Enter           Place the marker under the crosshair, or continue
                to the form once a marker is placed
Arrow keys      Pan the map
+ / -           Zoom in/out
r               Retry locating the device
Esc             Back to the map

=== ORPHANAGE DATA ===
Tab / ↓         Next field
Shift+Tab / ↑   Previous field
Typing          Edit the focused text field
Enter           Next field, toggle, add photo or register
Space           Toggle "Open on weekends?" when focused
Ctrl+S          Register the orphanage
Esc             Back to position selection

Photos come from the photo directory (--photo-dir). Each one you
pick is uploaded with the form.

=== ORPHANAGE ===
← / →           Previous/next photo
c               Copy the route link to the clipboard
r               Retry loading after an error
Esc / q         Back to the map

=== HELP NAVIGATION ===
↑↓ or j/k       Scroll help text up/down one line
Page Up/Down    Scroll help text up/down 5 lines
Home            Jump to top of help text
Esc/F1/?/q      Close this help window"#
}
