//! First wizard step: choose where the new orphanage is.

use crate::application::effects::{Completion, Outbox, Outcome, Pending, Request, RequestId};
use crate::application::state::{Screen, Transition};
use crate::application::viewport::Viewport;
use crate::domain::{Coordinate, WizardContext};

use super::{LocationState, OrphanageDataScreen};

#[derive(Debug)]
pub struct SelectPositionScreen {
    location: LocationState,
    location_request: Pending,
    viewport: Option<Viewport>,
    candidate: Option<Coordinate>,
}

impl SelectPositionScreen {
    /// Creates the screen and asks once for the device position.
    pub fn mount(outbox: &mut Outbox) -> Self {
        let mut screen = Self {
            location: LocationState::Locating,
            location_request: Pending::default(),
            viewport: None,
            candidate: None,
        };
        screen.locate(outbox);
        screen
    }

    fn locate(&mut self, outbox: &mut Outbox) {
        self.location = LocationState::Locating;
        self.location_request.start(outbox.issue(Request::LocateDevice));
    }

    /// Re-issues the location request after a failure.
    pub fn retry_location(&mut self, outbox: &mut Outbox) {
        if matches!(self.location, LocationState::Failed(_)) {
            self.locate(outbox);
        }
    }

    pub fn location(&self) -> &LocationState {
        &self.location
    }

    pub fn viewport(&self) -> Option<&Viewport> {
        self.viewport.as_ref()
    }

    pub fn viewport_mut(&mut self) -> Option<&mut Viewport> {
        self.viewport.as_mut()
    }

    pub fn candidate(&self) -> Option<Coordinate> {
        self.candidate
    }

    /// The map is suspended until the device position is known.
    pub fn is_ready(&self) -> bool {
        self.viewport.is_some()
    }

    /// Places the candidate marker; the last tap wins.
    pub fn tap(&mut self, position: Coordinate) {
        if self.is_ready() {
            tracing::debug!(%position, "registration position tapped");
            self.candidate = Some(position);
        }
    }

    /// Taps the point under the map crosshair.
    pub fn tap_center(&mut self) {
        if let Some(center) = self.viewport.map(|viewport| viewport.center()) {
            self.tap(center);
        }
    }

    pub fn can_continue(&self) -> bool {
        self.candidate.is_some()
    }

    /// Hands the chosen position to the next step, if one was tapped.
    pub fn next(&self) -> Option<WizardContext> {
        self.candidate.map(WizardContext::new)
    }

    pub fn continue_to_form(&self) -> Transition {
        match self.next() {
            Some(context) => {
                tracing::info!(position = %context.position(), "position selected");
                Transition::Push(Screen::OrphanageData(OrphanageDataScreen::new(context)))
            }
            None => Transition::Stay,
        }
    }

    pub fn awaits(&self, id: RequestId) -> bool {
        self.location_request.is(id)
    }

    pub fn apply(&mut self, completion: Completion) -> Transition {
        if !self.location_request.settle(completion.id) {
            return Transition::Stay;
        }

        match completion.outcome {
            Outcome::Located(Ok(position)) => {
                self.location = LocationState::Located(position);
                if self.viewport.is_none() {
                    self.viewport = Some(Viewport::centered_at(position));
                }
            }
            Outcome::Located(Err(e)) => {
                tracing::warn!(error = %e, "device location failed");
                self.location = LocationState::Failed(e.to_string());
            }
            other => tracing::debug!(?other, "unexpected outcome for position selector"),
        }
        Transition::Stay
    }
}
