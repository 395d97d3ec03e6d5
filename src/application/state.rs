//! Application state: the navigation stack and the request outbox.
//!
//! The stack always holds the map/listing screen at the bottom. Screens are
//! pushed by forward navigation and popped by `back`; a popped screen takes
//! its state and its unanswered requests with it.

use crate::application::effects::{Completion, Effect, Outbox};
use crate::application::screens::{
    OrphanageDataScreen, OrphanageDetailsScreen, OrphanagesMapScreen, SelectPositionScreen,
};

/// A mounted screen with its own state.
#[derive(Debug)]
pub enum Screen {
    OrphanagesMap(OrphanagesMapScreen),
    SelectPosition(SelectPositionScreen),
    OrphanageData(OrphanageDataScreen),
    OrphanageDetails(OrphanageDetailsScreen),
}

impl Screen {
    pub fn title(&self) -> &'static str {
        match self {
            Screen::OrphanagesMap(_) => "Orphanages",
            Screen::SelectPosition(_) => "Select the location on the map",
            Screen::OrphanageData(_) => "Orphanage data",
            Screen::OrphanageDetails(_) => "Orphanage",
        }
    }

    fn awaits(&self, completion: &Completion) -> bool {
        match self {
            Screen::OrphanagesMap(screen) => screen.awaits(completion.id),
            Screen::SelectPosition(screen) => screen.awaits(completion.id),
            Screen::OrphanageData(screen) => screen.awaits(completion.id),
            Screen::OrphanageDetails(screen) => screen.awaits(completion.id),
        }
    }

    fn apply(&mut self, completion: Completion) -> Transition {
        match self {
            Screen::OrphanagesMap(screen) => screen.apply(completion),
            Screen::SelectPosition(screen) => screen.apply(completion),
            Screen::OrphanageData(screen) => screen.apply(completion),
            Screen::OrphanageDetails(screen) => screen.apply(completion),
        }
    }
}

/// Navigation requested by a screen.
#[derive(Debug)]
pub enum Transition {
    Stay,
    Push(Screen),
    Back,
    /// Pops everything above the map and focuses it.
    ResetToMap,
}

/// Main application state.
///
/// # Examples
///
/// ```
/// use orphanages::application::{App, Request, Screen};
///
/// let mut app = App::new();
/// assert!(matches!(app.screen(), Screen::OrphanagesMap(_)));
///
/// let requests: Vec<Request> = app.take_effects().into_iter().map(|e| e.request).collect();
/// assert_eq!(requests, vec![Request::LocateDevice, Request::ListOrphanages]);
/// ```
#[derive(Debug)]
pub struct App {
    stack: Vec<Screen>,
    outbox: Outbox,
    /// Temporary status message to display
    pub status_message: Option<String>,
    /// Whether the help popup is open
    pub show_help: bool,
    /// Scroll position in help text
    pub help_scroll: usize,
    pub should_quit: bool,
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

impl App {
    pub fn new() -> Self {
        let mut outbox = Outbox::default();
        let map = OrphanagesMapScreen::mount(&mut outbox);
        Self {
            stack: vec![Screen::OrphanagesMap(map)],
            outbox,
            status_message: None,
            show_help: false,
            help_scroll: 0,
            should_quit: false,
        }
    }

    /// The screen currently on top of the stack.
    pub fn screen(&self) -> &Screen {
        // The map at the bottom is never popped.
        &self.stack[self.stack.len() - 1]
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    pub fn take_effects(&mut self) -> Vec<Effect> {
        self.outbox.drain()
    }

    /// Runs `action` against the top screen when it is the map.
    pub fn on_map<F>(&mut self, action: F)
    where
        F: FnOnce(&mut OrphanagesMapScreen, &mut Outbox) -> Transition,
    {
        if let Some(Screen::OrphanagesMap(screen)) = self.stack.last_mut() {
            let transition = action(screen, &mut self.outbox);
            self.transition(transition);
        }
    }

    pub fn on_select_position<F>(&mut self, action: F)
    where
        F: FnOnce(&mut SelectPositionScreen, &mut Outbox) -> Transition,
    {
        if let Some(Screen::SelectPosition(screen)) = self.stack.last_mut() {
            let transition = action(screen, &mut self.outbox);
            self.transition(transition);
        }
    }

    pub fn on_orphanage_data<F>(&mut self, action: F)
    where
        F: FnOnce(&mut OrphanageDataScreen, &mut Outbox) -> Transition,
    {
        if let Some(Screen::OrphanageData(screen)) = self.stack.last_mut() {
            let transition = action(screen, &mut self.outbox);
            self.transition(transition);
        }
    }

    pub fn on_orphanage_details<F>(&mut self, action: F)
    where
        F: FnOnce(&mut OrphanageDetailsScreen, &mut Outbox) -> Transition,
    {
        if let Some(Screen::OrphanageDetails(screen)) = self.stack.last_mut() {
            let transition = action(screen, &mut self.outbox);
            self.transition(transition);
        }
    }

    pub fn back(&mut self) {
        self.transition(Transition::Back);
    }

    pub fn transition(&mut self, transition: Transition) {
        match transition {
            Transition::Stay => {}
            Transition::Push(screen) => {
                tracing::info!(screen = screen.title(), "navigate");
                self.status_message = None;
                self.stack.push(screen);
            }
            Transition::Back => {
                if self.stack.len() > 1 {
                    self.stack.pop();
                    tracing::info!(screen = self.screen().title(), "navigate back");
                    self.status_message = None;
                    self.focus_top();
                }
            }
            Transition::ResetToMap => {
                self.stack.truncate(1);
                tracing::info!("navigate to map");
                self.focus_top();
            }
        }
    }

    fn focus_top(&mut self) {
        if let Some(Screen::OrphanagesMap(map)) = self.stack.last_mut() {
            map.focus(&mut self.outbox);
        }
    }

    /// Routes a completion to the mounted screen that issued it.
    ///
    /// Completions for requests that were superseded, or whose screen has
    /// been popped, are dropped.
    pub fn apply_completion(&mut self, completion: Completion) {
        let Some(index) = self.stack.iter().rposition(|screen| screen.awaits(&completion)) else {
            tracing::debug!(id = %completion.id, "discarding stale completion");
            return;
        };

        let on_top = index + 1 == self.stack.len();
        let transition = self.stack[index].apply(completion);
        if !on_top {
            return;
        }

        if matches!(transition, Transition::ResetToMap) {
            self.status_message = Some("Orphanage registered!".to_string());
        }
        self.transition(transition);
    }

    pub fn open_help(&mut self) {
        self.show_help = true;
        self.help_scroll = 0;
    }

    pub fn close_help(&mut self) {
        self.show_help = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::effects::{Outcome, Request};
    use crate::domain::{Coordinate, OrphanageDetails, OrphanageId, OrphanageSummary};
    use crate::infrastructure::ApiError;

    fn complete(app: &mut App, effect: &Effect, outcome: Outcome) {
        app.apply_completion(Completion {
            id: effect.id,
            outcome,
        });
    }

    fn requests(effects: &[Effect]) -> Vec<&'static str> {
        effects.iter().map(|e| e.request.name()).collect()
    }

    /// Drives the app from the map to a mounted data form at `position`.
    fn open_form(app: &mut App, position: Coordinate) {
        app.take_effects();
        app.on_map(|map, outbox| map.create_orphanage(outbox));
        let locate = app.take_effects().pop().unwrap();
        complete(app, &locate, Outcome::Located(Ok(position)));
        app.on_select_position(|screen, _| {
            screen.tap(position);
            screen.continue_to_form()
        });
    }

    #[test]
    fn test_app_starts_on_map() {
        let mut app = App::new();
        assert!(matches!(app.screen(), Screen::OrphanagesMap(_)));
        assert_eq!(app.depth(), 1);
        assert_eq!(requests(&app.take_effects()), vec!["locate_device", "list_orphanages"]);
        assert!(app.status_message.is_none());
    }

    #[test]
    fn test_back_on_root_is_noop() {
        let mut app = App::new();
        app.take_effects();
        app.back();
        assert_eq!(app.depth(), 1);
        assert!(app.take_effects().is_empty());
    }

    #[test]
    fn test_wizard_reaches_form_with_position() {
        let mut app = App::new();
        let position = Coordinate::new(-23.5, -46.6).unwrap();
        open_form(&mut app, position);

        assert_eq!(app.depth(), 3);
        match app.screen() {
            Screen::OrphanageData(form) => assert_eq!(form.context().position(), position),
            other => panic!("unexpected screen {:?}", other),
        }
    }

    #[test]
    fn test_successful_submit_returns_to_map_once() {
        let mut app = App::new();
        open_form(&mut app, Coordinate::new(-23.5, -46.6).unwrap());

        app.on_orphanage_data(|form, outbox| {
            form.submit(outbox);
            Transition::Stay
        });
        let create = app.take_effects().pop().unwrap();
        assert_eq!(create.request.name(), "create_orphanage");

        complete(&mut app, &create, Outcome::Created(Ok(())));

        assert_eq!(app.depth(), 1);
        assert!(matches!(app.screen(), Screen::OrphanagesMap(_)));
        assert_eq!(app.status_message.as_deref(), Some("Orphanage registered!"));
        assert_eq!(requests(&app.take_effects()), vec!["locate_device", "list_orphanages"]);

        // A new wizard starts from an empty draft.
        open_form(&mut app, Coordinate::new(1.0, 1.0).unwrap());
        match app.screen() {
            Screen::OrphanageData(form) => assert!(form.draft().name.is_empty()),
            other => panic!("unexpected screen {:?}", other),
        }
    }

    #[test]
    fn test_failed_submit_stays_on_form() {
        let mut app = App::new();
        open_form(&mut app, Coordinate::new(-23.5, -46.6).unwrap());
        app.on_orphanage_data(|form, outbox| {
            form.submit(outbox);
            Transition::Stay
        });
        let create = app.take_effects().pop().unwrap();

        complete(&mut app, &create, Outcome::Created(Err(ApiError::Status { status: 422 })));

        assert_eq!(app.depth(), 3);
        assert!(matches!(app.screen(), Screen::OrphanageData(_)));
        assert!(app.take_effects().is_empty());
    }

    #[test]
    fn test_back_to_map_refocuses_and_refetches() {
        let mut app = App::new();
        let initial = app.take_effects();
        complete(
            &mut app,
            &initial[1],
            Outcome::Listed(Ok(vec![OrphanageSummary {
                id: OrphanageId::new("42"),
                name: "Lar Feliz".to_string(),
                latitude: -23.5,
                longitude: -46.6,
            }])),
        );

        app.on_map(|map, outbox| {
            map.select_next();
            map.open_selected(outbox)
        });
        assert!(matches!(app.screen(), Screen::OrphanageDetails(_)));
        let fetch = app.take_effects().pop().unwrap();
        assert_eq!(fetch.request, Request::FetchOrphanage(OrphanageId::new("42")));

        app.back();
        assert_eq!(requests(&app.take_effects()), vec!["locate_device", "list_orphanages"]);

        // The details screen is gone; its late answer is dropped.
        complete(
            &mut app,
            &fetch,
            Outcome::Fetched(Ok(OrphanageDetails {
                id: OrphanageId::new("42"),
                name: "Lar Feliz".to_string(),
                latitude: -23.5,
                longitude: -46.6,
                about: String::new(),
                instructions: String::new(),
                opening_hours: String::new(),
                open_on_weekends: false,
                images: Vec::new(),
            })),
        );
        assert_eq!(app.depth(), 1);
    }

    #[test]
    fn test_completion_reaches_screen_below_top() {
        let mut app = App::new();
        let initial = app.take_effects();
        app.on_map(|map, outbox| map.create_orphanage(outbox));
        app.take_effects();

        complete(
            &mut app,
            &initial[1],
            Outcome::Listed(Ok(vec![OrphanageSummary {
                id: OrphanageId::new("7"),
                name: "Casa".to_string(),
                latitude: 0.0,
                longitude: 0.0,
            }])),
        );

        assert!(matches!(app.screen(), Screen::SelectPosition(_)));
        app.back();
        match app.screen() {
            Screen::OrphanagesMap(map) => assert_eq!(map.orphanages().len(), 1),
            other => panic!("unexpected screen {:?}", other),
        }
    }

    #[test]
    fn test_help_toggle() {
        let mut app = App::new();
        app.help_scroll = 4;
        app.open_help();
        assert!(app.show_help);
        assert_eq!(app.help_scroll, 0);
        app.close_help();
        assert!(!app.show_help);
    }
}
