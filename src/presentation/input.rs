use crate::application::{App, Screen, Transition, Viewport};
use crossterm::event::{KeyCode, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use ratatui::layout::Rect;

use super::ui::map_canvas_area;

/// Markers within this share of the visible region count as clicked.
const CLICK_RADIUS_RATIO: f64 = 0.04;

pub struct InputHandler;

impl InputHandler {
    pub fn handle_key_event(app: &mut App, key: KeyCode, modifiers: KeyModifiers) {
        if modifiers.contains(KeyModifiers::CONTROL) && key == KeyCode::Char('c') {
            app.should_quit = true;
            return;
        }

        if app.show_help {
            Self::handle_help_mode(app, key);
            return;
        }

        if key == KeyCode::F(1) {
            app.open_help();
            return;
        }

        match app.screen() {
            Screen::OrphanagesMap(_) => Self::handle_map(app, key, modifiers),
            Screen::SelectPosition(_) => Self::handle_select_position(app, key),
            Screen::OrphanageData(_) => Self::handle_orphanage_data(app, key, modifiers),
            Screen::OrphanageDetails(_) => Self::handle_orphanage_details(app, key),
        }
    }

    /// Handles clicks and wheel scrolling over the map of the current screen.
    /// `area` is the full terminal area the last frame was drawn into.
    pub fn handle_mouse_event(app: &mut App, mouse: MouseEvent, area: Rect) {
        if app.show_help {
            return;
        }
        let Some(canvas) = map_canvas_area(app, area) else {
            return;
        };
        let inside = mouse.column >= canvas.x
            && mouse.column < canvas.right()
            && mouse.row >= canvas.y
            && mouse.row < canvas.bottom();
        if !inside {
            return;
        }

        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                let column = mouse.column - canvas.x;
                let row = mouse.row - canvas.y;
                let project = |viewport: &Viewport| viewport.project(canvas.width, canvas.height, column, row);

                // A click on the marker whose callout is showing opens its details.
                app.on_map(|map, outbox| {
                    let Some(viewport) = map.viewport().copied() else {
                        return Transition::Stay;
                    };
                    let Some(position) = project(&viewport) else {
                        return Transition::Stay;
                    };
                    let shown = map.selected().map(|o| o.id.clone());
                    map.select_near(position, viewport.delta() * CLICK_RADIUS_RATIO);
                    match (shown, map.selected()) {
                        (Some(shown), Some(hit)) if hit.id == shown => map.open_selected(outbox),
                        _ => Transition::Stay,
                    }
                });
                app.on_select_position(|screen, _| {
                    if let Some(position) = screen.viewport().and_then(|viewport| project(viewport)) {
                        screen.tap(position);
                    }
                    Transition::Stay
                });
            }
            MouseEventKind::ScrollUp => Self::with_viewport(app, Viewport::zoom_in),
            MouseEventKind::ScrollDown => Self::with_viewport(app, Viewport::zoom_out),
            _ => {}
        }
    }

    fn with_viewport(app: &mut App, action: fn(&mut Viewport)) {
        app.on_map(|map, _| {
            if let Some(viewport) = map.viewport_mut() {
                action(viewport);
            }
            Transition::Stay
        });
        app.on_select_position(|screen, _| {
            if let Some(viewport) = screen.viewport_mut() {
                action(viewport);
            }
            Transition::Stay
        });
    }

    /// Arrow keys pan, `+`/`-` zoom. Returns whether the key was consumed.
    fn handle_viewport_key(app: &mut App, key: KeyCode) -> bool {
        let action: fn(&mut Viewport) = match key {
            KeyCode::Up => |v: &mut Viewport| v.pan(1, 0),
            KeyCode::Down => |v: &mut Viewport| v.pan(-1, 0),
            KeyCode::Left => |v: &mut Viewport| v.pan(0, -1),
            KeyCode::Right => |v: &mut Viewport| v.pan(0, 1),
            KeyCode::Char('+') | KeyCode::Char('=') => Viewport::zoom_in,
            KeyCode::Char('-') | KeyCode::Char('_') => Viewport::zoom_out,
            _ => return false,
        };
        Self::with_viewport(app, action);
        true
    }

    fn handle_map(app: &mut App, key: KeyCode, modifiers: KeyModifiers) {
        app.status_message = None;

        if Self::handle_viewport_key(app, key) {
            return;
        }

        match key {
            KeyCode::Char('q') => app.should_quit = true,
            KeyCode::Char('?') => app.open_help(),
            KeyCode::BackTab => app.on_map(|map, _| {
                map.select_previous();
                Transition::Stay
            }),
            KeyCode::Tab if modifiers.contains(KeyModifiers::SHIFT) => app.on_map(|map, _| {
                map.select_previous();
                Transition::Stay
            }),
            KeyCode::Tab | KeyCode::Char('j') => app.on_map(|map, _| {
                map.select_next();
                Transition::Stay
            }),
            KeyCode::Char('k') => app.on_map(|map, _| {
                map.select_previous();
                Transition::Stay
            }),
            KeyCode::Esc => app.on_map(|map, _| {
                map.clear_selection();
                Transition::Stay
            }),
            KeyCode::Enter => app.on_map(|map, outbox| map.open_selected(outbox)),
            KeyCode::Char('n') => app.on_map(|map, outbox| map.create_orphanage(outbox)),
            KeyCode::Char('r') => app.on_map(|map, outbox| {
                map.focus(outbox);
                Transition::Stay
            }),
            _ => {}
        }
    }

    fn handle_select_position(app: &mut App, key: KeyCode) {
        if Self::handle_viewport_key(app, key) {
            return;
        }

        match key {
            KeyCode::Esc => app.back(),
            KeyCode::Char('?') => app.open_help(),
            KeyCode::Char(' ') => app.on_select_position(|screen, _| {
                screen.tap_center();
                Transition::Stay
            }),
            KeyCode::Enter => app.on_select_position(|screen, _| {
                if screen.can_continue() {
                    screen.continue_to_form()
                } else {
                    screen.tap_center();
                    Transition::Stay
                }
            }),
            KeyCode::Char('r') => app.on_select_position(|screen, outbox| {
                screen.retry_location(outbox);
                Transition::Stay
            }),
            _ => {}
        }
    }

    fn handle_orphanage_data(app: &mut App, key: KeyCode, modifiers: KeyModifiers) {
        if let Screen::OrphanageData(screen) = app.screen() {
            if screen.picker().is_some() {
                Self::handle_image_picker(app, key);
                return;
            }
        }

        if modifiers.contains(KeyModifiers::CONTROL) {
            if key == KeyCode::Char('s') {
                app.on_orphanage_data(|screen, outbox| {
                    screen.submit(outbox);
                    Transition::Stay
                });
            }
            return;
        }

        if key == KeyCode::Esc {
            app.back();
            return;
        }

        app.on_orphanage_data(|screen, outbox| {
            let editing = screen.focus().is_text();
            match key {
                KeyCode::Tab | KeyCode::Down => screen.focus_next(),
                KeyCode::BackTab | KeyCode::Up => screen.focus_previous(),
                KeyCode::Enter => screen.activate(outbox),
                KeyCode::Char(c) if editing => screen.insert_char(c),
                KeyCode::Char(' ') => screen.activate(outbox),
                KeyCode::Backspace if editing => screen.backspace(),
                KeyCode::Delete if editing => screen.delete(),
                KeyCode::Left if editing => screen.cursor_left(),
                KeyCode::Right if editing => screen.cursor_right(),
                KeyCode::Home if editing => screen.cursor_home(),
                KeyCode::End if editing => screen.cursor_end(),
                _ => {}
            }
            Transition::Stay
        });
    }

    fn handle_image_picker(app: &mut App, key: KeyCode) {
        app.on_orphanage_data(|screen, _| {
            match key {
                KeyCode::Up | KeyCode::Char('k') => screen.picker_previous(),
                KeyCode::Down | KeyCode::Char('j') => screen.picker_next(),
                KeyCode::Enter => screen.pick_selected(),
                KeyCode::Esc => screen.cancel_picker(),
                _ => {}
            }
            Transition::Stay
        });
    }

    fn handle_orphanage_details(app: &mut App, key: KeyCode) {
        match key {
            KeyCode::Esc | KeyCode::Char('q') => app.back(),
            KeyCode::Char('?') => app.open_help(),
            KeyCode::Left | KeyCode::Char('h') => app.on_orphanage_details(|screen, _| {
                screen.previous_image();
                Transition::Stay
            }),
            KeyCode::Right | KeyCode::Char('l') => app.on_orphanage_details(|screen, _| {
                screen.next_image();
                Transition::Stay
            }),
            KeyCode::Char('c') => app.on_orphanage_details(|screen, outbox| {
                screen.copy_directions(outbox);
                Transition::Stay
            }),
            KeyCode::Char('r') => app.on_orphanage_details(|screen, outbox| {
                screen.retry(outbox);
                Transition::Stay
            }),
            _ => {}
        }
    }

    fn handle_help_mode(app: &mut App, key: KeyCode) {
        match key {
            KeyCode::Esc | KeyCode::F(1) | KeyCode::Char('?') | KeyCode::Char('q') => {
                app.close_help();
            }
            KeyCode::Up | KeyCode::Char('k') => {
                if app.help_scroll > 0 {
                    app.help_scroll -= 1;
                }
            }
            KeyCode::Down | KeyCode::Char('j') => {
                app.help_scroll += 1;
            }
            KeyCode::PageUp => {
                app.help_scroll = app.help_scroll.saturating_sub(5);
            }
            KeyCode::PageDown => {
                app.help_scroll += 5;
            }
            KeyCode::Home => {
                app.help_scroll = 0;
            }
            _ => {}
        }
    }
}
