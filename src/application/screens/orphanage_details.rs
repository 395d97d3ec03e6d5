use crate::application::effects::{Completion, Outbox, Outcome, Pending, Request, RequestId};
use crate::application::state::Transition;
use crate::domain::{ImageRecord, OrphanageDetails, OrphanageId};

#[derive(Debug)]
pub struct OrphanageDetailsScreen {
    id: OrphanageId,
    orphanage: Option<OrphanageDetails>,
    request: Pending,
    copy_request: Pending,
    error: Option<String>,
    notice: Option<String>,
    gallery_page: usize,
}

impl OrphanageDetailsScreen {
    /// Creates the screen and fetches the record for `id`.
    pub fn mount(id: OrphanageId, outbox: &mut Outbox) -> Self {
        let mut screen = Self {
            id,
            orphanage: None,
            request: Pending::default(),
            copy_request: Pending::default(),
            error: None,
            notice: None,
            gallery_page: 0,
        };
        screen.fetch(outbox);
        screen
    }

    fn fetch(&mut self, outbox: &mut Outbox) {
        self.error = None;
        self.request
            .start(outbox.issue(Request::FetchOrphanage(self.id.clone())));
    }

    pub fn retry(&mut self, outbox: &mut Outbox) {
        if self.error.is_some() && !self.request.is_waiting() {
            self.fetch(outbox);
        }
    }

    pub fn id(&self) -> &OrphanageId {
        &self.id
    }

    pub fn orphanage(&self) -> Option<&OrphanageDetails> {
        self.orphanage.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub fn gallery_page(&self) -> usize {
        self.gallery_page
    }

    pub fn current_image(&self) -> Option<&ImageRecord> {
        self.orphanage
            .as_ref()
            .and_then(|orphanage| orphanage.images.get(self.gallery_page))
    }

    pub fn next_image(&mut self) {
        let count = self.orphanage.as_ref().map(|o| o.images.len()).unwrap_or(0);
        if self.gallery_page + 1 < count {
            self.gallery_page += 1;
        }
    }

    pub fn previous_image(&mut self) {
        self.gallery_page = self.gallery_page.saturating_sub(1);
    }

    /// Puts the route link for this orphanage on the clipboard.
    pub fn copy_directions(&mut self, outbox: &mut Outbox) {
        if let Some(orphanage) = &self.orphanage {
            self.notice = None;
            self.copy_request
                .start(outbox.issue(Request::CopyText(orphanage.directions_url())));
        }
    }

    pub fn awaits(&self, id: RequestId) -> bool {
        self.request.is(id) || self.copy_request.is(id)
    }

    pub fn apply(&mut self, completion: Completion) -> Transition {
        match completion.outcome {
            Outcome::Fetched(result) if self.request.settle(completion.id) => match result {
                Ok(orphanage) => {
                    self.gallery_page = 0;
                    self.orphanage = Some(orphanage);
                }
                Err(e) => {
                    tracing::warn!(id = %self.id, error = %e, "orphanage fetch failed");
                    self.error = Some(e.to_string());
                }
            },
            Outcome::Copied(result) if self.copy_request.settle(completion.id) => {
                self.notice = Some(match result {
                    Ok(()) => "Route link copied to clipboard".to_string(),
                    Err(e) => e.to_string(),
                });
            }
            other => tracing::debug!(?other, "discarding outcome for orphanage details"),
        }
        Transition::Stay
    }
}
