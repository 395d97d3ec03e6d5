//! Requests issued by screens and the results that come back for them.
//!
//! Screens never talk to the network or the device directly. They push an
//! [`Effect`] into the [`Outbox`], remember its [`RequestId`] in a
//! [`Pending`] slot, and later accept only the [`Completion`] carrying that
//! same id. Ids grow monotonically, so a newer request always supersedes an
//! older one and late answers are dropped.

use std::fmt;

use crate::domain::{Coordinate, ImageHandle, OrphanageDetails, OrphanageId, OrphanageSummary, SubmissionForm};
use crate::infrastructure::{ApiError, ClipboardError, LocationError, PhotoError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestId(u64);

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Request {
    LocateDevice,
    ListOrphanages,
    FetchOrphanage(OrphanageId),
    CreateOrphanage(SubmissionForm),
    OpenPhotoLibrary,
    CopyText(String),
}

impl Request {
    pub fn name(&self) -> &'static str {
        match self {
            Request::LocateDevice => "locate_device",
            Request::ListOrphanages => "list_orphanages",
            Request::FetchOrphanage(_) => "fetch_orphanage",
            Request::CreateOrphanage(_) => "create_orphanage",
            Request::OpenPhotoLibrary => "open_photo_library",
            Request::CopyText(_) => "copy_text",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Effect {
    pub id: RequestId,
    pub request: Request,
}

#[derive(Debug)]
pub enum Outcome {
    Located(Result<Coordinate, LocationError>),
    Listed(Result<Vec<OrphanageSummary>, ApiError>),
    Fetched(Result<OrphanageDetails, ApiError>),
    Created(Result<(), ApiError>),
    PhotoLibrary(Result<Vec<ImageHandle>, PhotoError>),
    Copied(Result<(), ClipboardError>),
}

#[derive(Debug)]
pub struct Completion {
    pub id: RequestId,
    pub outcome: Outcome,
}

/// Queue of effects waiting to be executed, and the id sequence.
#[derive(Debug, Default)]
pub struct Outbox {
    last_id: u64,
    effects: Vec<Effect>,
}

impl Outbox {
    pub fn issue(&mut self, request: Request) -> RequestId {
        self.last_id += 1;
        let id = RequestId(self.last_id);
        tracing::debug!(%id, request = request.name(), "request issued");
        self.effects.push(Effect { id, request });
        id
    }

    pub fn drain(&mut self) -> Vec<Effect> {
        std::mem::take(&mut self.effects)
    }

    #[cfg(test)]
    pub fn pending(&self) -> &[Effect] {
        &self.effects
    }
}

/// Tracks the latest request of one kind for one screen.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Pending(Option<RequestId>);

impl Pending {
    pub fn start(&mut self, id: RequestId) {
        self.0 = Some(id);
    }

    /// Clears the slot if `id` is the latest request and reports whether it was.
    pub fn settle(&mut self, id: RequestId) -> bool {
        if self.0 == Some(id) {
            self.0 = None;
            true
        } else {
            false
        }
    }

    pub fn is_waiting(&self) -> bool {
        self.0.is_some()
    }

    pub fn is(&self, id: RequestId) -> bool {
        self.0 == Some(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_monotonic() {
        let mut outbox = Outbox::default();
        let first = outbox.issue(Request::ListOrphanages);
        let second = outbox.issue(Request::LocateDevice);

        assert!(second > first);
        assert_eq!(outbox.pending().len(), 2);

        let drained = outbox.drain();
        assert_eq!(drained[0].id, first);
        assert_eq!(drained[1].request, Request::LocateDevice);
        assert!(outbox.pending().is_empty());

        let third = outbox.issue(Request::ListOrphanages);
        assert!(third > second);
    }

    #[test]
    fn test_pending_accepts_only_latest() {
        let mut outbox = Outbox::default();
        let mut slot = Pending::default();

        let old = outbox.issue(Request::ListOrphanages);
        slot.start(old);
        let new = outbox.issue(Request::ListOrphanages);
        slot.start(new);

        assert!(!slot.settle(old));
        assert!(slot.is_waiting());
        assert!(slot.settle(new));
        assert!(!slot.is_waiting());
        assert!(!slot.settle(new));
    }
}
