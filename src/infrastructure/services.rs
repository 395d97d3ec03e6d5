//! Executes effects against the real (or fake) collaborators.

use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::thread::{self, JoinHandle};

use crate::application::{Completion, Effect, Outcome, Request};

use super::api::{ApiError, HttpApi, OrphanageApi};
use super::clipboard::{Clipboard, SystemClipboard};
use super::config::{Config, ConfigError, LocationSource};
use super::location::{FixedLocation, GeocodedLocation, LocationError, LocationProvider, UnavailableLocation};
use super::photos::{DirectoryLibrary, PhotoLibrary};

#[derive(Debug, thiserror::Error)]
pub enum SetupError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error(transparent)]
    Location(#[from] LocationError),
}

/// Every collaborator an effect may need.
pub struct Services {
    api: Box<dyn OrphanageApi>,
    location: Box<dyn LocationProvider>,
    photos: Box<dyn PhotoLibrary>,
    clipboard: Box<dyn Clipboard>,
}

impl Services {
    pub fn new(
        api: Box<dyn OrphanageApi>,
        location: Box<dyn LocationProvider>,
        photos: Box<dyn PhotoLibrary>,
        clipboard: Box<dyn Clipboard>,
    ) -> Self {
        Self {
            api,
            location,
            photos,
            clipboard,
        }
    }

    pub fn from_config(config: &Config) -> Result<Self, SetupError> {
        let api = HttpApi::new(&config.api_url, config.timeout())?;
        tracing::info!(api = %api.base_url(), "using orphanage API");

        let location: Box<dyn LocationProvider> = match config.location_source()? {
            LocationSource::Fixed(position) => {
                tracing::info!(%position, "device location pinned");
                Box::new(FixedLocation::new(position))
            }
            LocationSource::Address { geocoder, address } => {
                tracing::info!(%address, "device location from address");
                Box::new(GeocodedLocation::new(geocoder, address, config.timeout())?)
            }
            LocationSource::Unavailable => {
                tracing::warn!("no device location configured");
                Box::new(UnavailableLocation)
            }
        };

        Ok(Self::new(
            Box::new(api),
            location,
            Box::new(DirectoryLibrary::new(config.photo_dir.clone())),
            Box::new(SystemClipboard::new()),
        ))
    }

    /// Runs one effect to completion.
    pub fn execute(&self, effect: Effect) -> Completion {
        let name = effect.request.name();
        let outcome = match effect.request {
            Request::LocateDevice => Outcome::Located(self.location.current_position()),
            Request::ListOrphanages => Outcome::Listed(self.api.list_orphanages()),
            Request::FetchOrphanage(id) => Outcome::Fetched(self.api.get_orphanage(&id)),
            Request::CreateOrphanage(form) => Outcome::Created(self.api.create_orphanage(&form)),
            Request::OpenPhotoLibrary => Outcome::PhotoLibrary(self.photos.open()),
            Request::CopyText(text) => Outcome::Copied(self.clipboard.copy_text(&text)),
        };
        tracing::debug!(id = %effect.id, request = name, "request finished");

        Completion {
            id: effect.id,
            outcome,
        }
    }
}

/// A background thread executing effects one at a time, in submission order.
pub struct Worker {
    jobs: Option<Sender<Effect>>,
    completions: Receiver<Completion>,
    handle: Option<JoinHandle<()>>,
}

impl Worker {
    pub fn spawn(services: Services) -> Self {
        let (jobs, job_rx) = mpsc::channel::<Effect>();
        let (done_tx, completions) = mpsc::channel::<Completion>();

        let handle = thread::spawn(move || {
            for effect in job_rx {
                if done_tx.send(services.execute(effect)).is_err() {
                    break;
                }
            }
        });

        Self {
            jobs: Some(jobs),
            completions,
            handle: Some(handle),
        }
    }

    pub fn submit(&self, effect: Effect) {
        if let Some(jobs) = &self.jobs {
            if jobs.send(effect).is_err() {
                tracing::error!("worker thread has stopped; request dropped");
            }
        }
    }

    /// Returns every completion that has arrived so far.
    pub fn poll(&self) -> Vec<Completion> {
        let mut ready = Vec::new();
        loop {
            match self.completions.try_recv() {
                Ok(completion) => ready.push(completion),
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => return ready,
            }
        }
    }

    #[cfg(test)]
    pub fn recv_timeout(&self, timeout: std::time::Duration) -> Option<Completion> {
        self.completions.recv_timeout(timeout).ok()
    }
}

impl Drop for Worker {
    fn drop(&mut self) {
        // Closing the job channel ends the thread's loop once the current request returns.
        self.jobs.take();
        if let Some(handle) = self.handle.take() {
            if handle.is_finished() {
                let _ = handle.join();
            }
        }
    }
}
