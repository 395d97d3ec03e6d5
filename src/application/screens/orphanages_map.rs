//! Root screen: every registered orphanage as a marker around the device.

use crate::application::effects::{Completion, Outbox, Outcome, Pending, Request, RequestId};
use crate::application::state::{Screen, Transition};
use crate::application::viewport::Viewport;
use crate::domain::{Coordinate, OrphanageSummary};

use super::{LocationState, OrphanageDetailsScreen, SelectPositionScreen};

#[derive(Debug)]
pub struct OrphanagesMapScreen {
    location: LocationState,
    location_request: Pending,
    orphanages: Vec<OrphanageSummary>,
    list_request: Pending,
    list_error: Option<String>,
    viewport: Option<Viewport>,
    selected: Option<usize>,
}

impl OrphanagesMapScreen {
    pub fn mount(outbox: &mut Outbox) -> Self {
        let mut screen = Self {
            location: LocationState::Locating,
            location_request: Pending::default(),
            orphanages: Vec::new(),
            list_request: Pending::default(),
            list_error: None,
            viewport: None,
            selected: None,
        };
        screen.focus(outbox);
        screen
    }

    /// Runs on every focus: one location request and one full list refetch.
    pub fn focus(&mut self, outbox: &mut Outbox) {
        if self.location.position().is_none() {
            self.location = LocationState::Locating;
        }
        self.location_request.start(outbox.issue(Request::LocateDevice));
        self.list_request.start(outbox.issue(Request::ListOrphanages));
    }

    pub fn location(&self) -> &LocationState {
        &self.location
    }

    pub fn orphanages(&self) -> &[OrphanageSummary] {
        &self.orphanages
    }

    pub fn list_error(&self) -> Option<&str> {
        self.list_error.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        self.list_request.is_waiting()
    }

    pub fn viewport(&self) -> Option<&Viewport> {
        self.viewport.as_ref()
    }

    pub fn viewport_mut(&mut self) -> Option<&mut Viewport> {
        self.viewport.as_mut()
    }

    pub fn selected(&self) -> Option<&OrphanageSummary> {
        self.selected.and_then(|index| self.orphanages.get(index))
    }

    pub fn select_next(&mut self) {
        if self.orphanages.is_empty() {
            return;
        }
        self.selected = Some(match self.selected {
            Some(index) => (index + 1) % self.orphanages.len(),
            None => 0,
        });
        self.follow_selection();
    }

    pub fn select_previous(&mut self) {
        if self.orphanages.is_empty() {
            return;
        }
        let len = self.orphanages.len();
        self.selected = Some(match self.selected {
            Some(index) => (index + len - 1) % len,
            None => len - 1,
        });
        self.follow_selection();
    }

    /// Selects the marker closest to `position`, if one lies within `radius` degrees.
    pub fn select_near(&mut self, position: Coordinate, radius: f64) {
        let distance = |o: &OrphanageSummary| {
            let dlat = o.latitude - position.latitude();
            let dlon = o.longitude - position.longitude();
            (dlat * dlat + dlon * dlon).sqrt()
        };

        self.selected = self
            .orphanages
            .iter()
            .enumerate()
            .map(|(index, o)| (index, distance(o)))
            .filter(|(_, d)| *d <= radius)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(index, _)| index);
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    fn follow_selection(&mut self) {
        let target = self.selected().and_then(|o| o.position().ok());
        if let (Some(viewport), Some(target)) = (self.viewport.as_mut(), target) {
            if !viewport.contains(target) {
                *viewport = Viewport::centered_at(target);
            }
        }
    }

    /// Opens the details of the selected marker's callout.
    pub fn open_selected(&self, outbox: &mut Outbox) -> Transition {
        match self.selected() {
            Some(orphanage) => {
                tracing::info!(id = %orphanage.id, "opening orphanage details");
                Transition::Push(Screen::OrphanageDetails(OrphanageDetailsScreen::mount(
                    orphanage.id.clone(),
                    outbox,
                )))
            }
            None => Transition::Stay,
        }
    }

    pub fn create_orphanage(&self, outbox: &mut Outbox) -> Transition {
        tracing::info!("starting orphanage registration");
        Transition::Push(Screen::SelectPosition(SelectPositionScreen::mount(outbox)))
    }

    pub fn awaits(&self, id: RequestId) -> bool {
        self.location_request.is(id) || self.list_request.is(id)
    }

    pub fn apply(&mut self, completion: Completion) -> Transition {
        match completion.outcome {
            Outcome::Located(result) if self.location_request.settle(completion.id) => match result {
                Ok(position) => {
                    self.location = LocationState::Located(position);
                    if self.viewport.is_none() {
                        self.viewport = Some(Viewport::centered_at(position));
                    }
                }
                Err(e) => {
                    tracing::warn!(error = %e, "device location failed");
                    if self.location.position().is_none() {
                        self.location = LocationState::Failed(e.to_string());
                    }
                }
            },
            Outcome::Listed(result) if self.list_request.settle(completion.id) => match result {
                Ok(orphanages) => {
                    tracing::info!(count = orphanages.len(), "orphanages loaded");
                    let selected_id = self.selected().map(|o| o.id.clone());
                    self.orphanages = orphanages;
                    self.selected = selected_id
                        .and_then(|id| self.orphanages.iter().position(|o| o.id == id));
                    self.list_error = None;
                }
                Err(e) => {
                    tracing::warn!(error = %e, "orphanage list failed");
                    self.list_error = Some(e.to_string());
                }
            },
            other => tracing::debug!(?other, "discarding outcome for orphanages map"),
        }
        Transition::Stay
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::OrphanageId;
    use crate::infrastructure::{ApiError, LocationError};

    fn summary(id: &str, latitude: f64, longitude: f64) -> OrphanageSummary {
        OrphanageSummary {
            id: OrphanageId::new(id),
            name: format!("Orphanage {}", id),
            latitude,
            longitude,
        }
    }

    fn list_effect(outbox: &mut Outbox) -> RequestId {
        outbox
            .drain()
            .into_iter()
            .find(|e| e.request == Request::ListOrphanages)
            .map(|e| e.id)
            .unwrap()
    }

    #[test]
    fn test_mount_issues_location_and_list() {
        let mut outbox = Outbox::default();
        let _screen = OrphanagesMapScreen::mount(&mut outbox);

        let requests: Vec<Request> = outbox.drain().into_iter().map(|e| e.request).collect();
        assert_eq!(requests, vec![Request::LocateDevice, Request::ListOrphanages]);
    }

    #[test]
    fn test_list_replaces_markers_wholesale() {
        let mut outbox = Outbox::default();
        let mut screen = OrphanagesMapScreen::mount(&mut outbox);
        let first = list_effect(&mut outbox);
        screen.apply(Completion {
            id: first,
            outcome: Outcome::Listed(Ok(vec![summary("1", 0.0, 0.0), summary("2", 1.0, 1.0)])),
        });
        assert_eq!(screen.orphanages().len(), 2);

        screen.focus(&mut outbox);
        let second = list_effect(&mut outbox);
        screen.apply(Completion {
            id: second,
            outcome: Outcome::Listed(Ok(vec![summary("3", 2.0, 2.0)])),
        });

        let ids: Vec<&str> = screen.orphanages().iter().map(|o| o.id.as_str()).collect();
        assert_eq!(ids, vec!["3"]);
    }

    #[test]
    fn test_stale_list_response_is_discarded() {
        let mut outbox = Outbox::default();
        let mut screen = OrphanagesMapScreen::mount(&mut outbox);
        let older = list_effect(&mut outbox);
        screen.focus(&mut outbox);
        let newer = list_effect(&mut outbox);

        screen.apply(Completion {
            id: newer,
            outcome: Outcome::Listed(Ok(vec![summary("new", 0.0, 0.0)])),
        });
        assert!(!screen.awaits(older));
        screen.apply(Completion {
            id: older,
            outcome: Outcome::Listed(Ok(vec![summary("old", 0.0, 0.0)])),
        });

        assert_eq!(screen.orphanages()[0].id.as_str(), "new");
    }

    #[test]
    fn test_list_failure_keeps_previous_markers() {
        let mut outbox = Outbox::default();
        let mut screen = OrphanagesMapScreen::mount(&mut outbox);
        let first = list_effect(&mut outbox);
        screen.apply(Completion {
            id: first,
            outcome: Outcome::Listed(Ok(vec![summary("1", 0.0, 0.0)])),
        });

        screen.focus(&mut outbox);
        let second = list_effect(&mut outbox);
        screen.apply(Completion {
            id: second,
            outcome: Outcome::Listed(Err(ApiError::Status { status: 500 })),
        });

        assert_eq!(screen.orphanages().len(), 1);
        assert!(screen.list_error().unwrap().contains("500"));
    }

    #[test]
    fn test_location_failure_then_success() {
        let mut outbox = Outbox::default();
        let mut screen = OrphanagesMapScreen::mount(&mut outbox);
        let locate = outbox.drain()[0].id;
        screen.apply(Completion {
            id: locate,
            outcome: Outcome::Located(Err(LocationError::Unavailable)),
        });
        assert!(matches!(screen.location(), LocationState::Failed(_)));
        assert!(screen.viewport().is_none());

        screen.focus(&mut outbox);
        let locate = outbox.drain()[0].id;
        let here = Coordinate::new(-23.5, -46.6).unwrap();
        screen.apply(Completion {
            id: locate,
            outcome: Outcome::Located(Ok(here)),
        });
        assert_eq!(screen.viewport().unwrap().center(), here);
    }

    #[test]
    fn test_selection_cycles_and_opens_details() {
        let mut outbox = Outbox::default();
        let mut screen = OrphanagesMapScreen::mount(&mut outbox);
        let list = list_effect(&mut outbox);
        screen.apply(Completion {
            id: list,
            outcome: Outcome::Listed(Ok(vec![summary("1", 0.0, 0.0), summary("2", 1.0, 1.0)])),
        });

        assert!(matches!(screen.open_selected(&mut outbox), Transition::Stay));
        screen.select_previous();
        assert_eq!(screen.selected().unwrap().id.as_str(), "2");
        screen.select_next();
        assert_eq!(screen.selected().unwrap().id.as_str(), "1");

        let transition = screen.open_selected(&mut outbox);
        assert!(matches!(transition, Transition::Push(Screen::OrphanageDetails(_))));
        let effects = outbox.drain();
        assert_eq!(effects.len(), 1);
        assert_eq!(effects[0].request, Request::FetchOrphanage(OrphanageId::new("1")));
    }

    #[test]
    fn test_select_near_picks_closest_within_radius() {
        let mut outbox = Outbox::default();
        let mut screen = OrphanagesMapScreen::mount(&mut outbox);
        let list = list_effect(&mut outbox);
        screen.apply(Completion {
            id: list,
            outcome: Outcome::Listed(Ok(vec![summary("1", 0.0, 0.0), summary("2", 0.001, 0.001)])),
        });

        screen.select_near(Coordinate::new(0.0009, 0.0009).unwrap(), 0.0005);
        assert_eq!(screen.selected().unwrap().id.as_str(), "2");

        screen.select_near(Coordinate::new(5.0, 5.0).unwrap(), 0.0005);
        assert!(screen.selected().is_none());
    }

    #[test]
    fn test_selection_survives_refetch_by_id() {
        let mut outbox = Outbox::default();
        let mut screen = OrphanagesMapScreen::mount(&mut outbox);
        let list = list_effect(&mut outbox);
        screen.apply(Completion {
            id: list,
            outcome: Outcome::Listed(Ok(vec![summary("1", 0.0, 0.0), summary("2", 1.0, 1.0)])),
        });
        screen.select_previous();

        screen.focus(&mut outbox);
        let list = list_effect(&mut outbox);
        screen.apply(Completion {
            id: list,
            outcome: Outcome::Listed(Ok(vec![summary("2", 1.0, 1.0)])),
        });
        assert_eq!(screen.selected().unwrap().id.as_str(), "2");

        screen.focus(&mut outbox);
        let list = list_effect(&mut outbox);
        screen.apply(Completion {
            id: list,
            outcome: Outcome::Listed(Ok(vec![summary("1", 0.0, 0.0)])),
        });
        assert!(screen.selected().is_none());
    }
}
