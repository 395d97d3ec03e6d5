use crate::domain::Coordinate;

/// Initial region size used when a map is first centred, in degrees.
pub const DEFAULT_REGION_DELTA: f64 = 0.008;
const MIN_DELTA: f64 = 0.0005;
const MAX_DELTA: f64 = 180.0;

/// The visible square region of a map.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    center: Coordinate,
    delta: f64,
}

impl Viewport {
    pub fn centered_at(center: Coordinate) -> Self {
        Self {
            center,
            delta: DEFAULT_REGION_DELTA,
        }
    }

    pub fn center(&self) -> Coordinate {
        self.center
    }

    pub fn delta(&self) -> f64 {
        self.delta
    }

    /// `[west, east]` in degrees of longitude.
    pub fn x_bounds(&self) -> [f64; 2] {
        let half = self.delta / 2.0;
        [self.center.longitude() - half, self.center.longitude() + half]
    }

    /// `[south, north]` in degrees of latitude.
    pub fn y_bounds(&self) -> [f64; 2] {
        let half = self.delta / 2.0;
        [self.center.latitude() - half, self.center.latitude() + half]
    }

    pub fn zoom_in(&mut self) {
        self.delta = (self.delta / 2.0).max(MIN_DELTA);
    }

    pub fn zoom_out(&mut self) {
        self.delta = (self.delta * 2.0).min(MAX_DELTA);
    }

    /// Moves the centre by a quarter of the region per step.
    pub fn pan(&mut self, north_steps: i32, east_steps: i32) {
        let step = self.delta / 4.0;
        self.center = Coordinate::normalized(
            self.center.latitude() + step * f64::from(north_steps),
            self.center.longitude() + step * f64::from(east_steps),
        );
    }

    /// Converts a cell of a `width` x `height` drawing area to the coordinate
    /// under the middle of that cell.
    pub fn project(&self, width: u16, height: u16, column: u16, row: u16) -> Option<Coordinate> {
        if width == 0 || height == 0 || column >= width || row >= height {
            return None;
        }

        let [west, _] = self.x_bounds();
        let [_, north] = self.y_bounds();
        let longitude = west + (f64::from(column) + 0.5) / f64::from(width) * self.delta;
        let latitude = north - (f64::from(row) + 0.5) / f64::from(height) * self.delta;

        Some(Coordinate::normalized(latitude, longitude))
    }

    pub fn contains(&self, position: Coordinate) -> bool {
        let [west, east] = self.x_bounds();
        let [south, north] = self.y_bounds();
        (west..=east).contains(&position.longitude()) && (south..=north).contains(&position.latitude())
    }
}
