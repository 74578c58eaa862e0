use crate::angles::{angular_difference, normalize_angle, rad_to_deg};
use crate::geo::{bearing_of, bearing_vector, LocalFrame};
use crate::types::{BlockResult, Coordinates, Obstacle, ObstacleKind, Season, SolarPosition};

/// Floor for distance, height and width so the angular maths stays finite.
pub const MIN_DIMENSION_METERS: f64 = 0.01;

impl ObstacleKind {
    pub fn default_transparency(self, season: Season) -> f64 {
        match self {
            ObstacleKind::Building | ObstacleKind::Fence => 0.0,
            ObstacleKind::EvergreenTree => 0.1,
            ObstacleKind::Hedge => 0.3,
            ObstacleKind::DeciduousTree => match season {
                Season::Summer => 0.2,
                Season::Spring | Season::Fall => 0.5,
                Season::Winter => 0.8,
            },
        }
    }

    /// Trees cast a fan from the trunk; everything else a full-width band.
    pub fn is_point_like(self) -> bool {
        matches!(self, ObstacleKind::EvergreenTree | ObstacleKind::DeciduousTree)
    }
}

impl Obstacle {
    pub fn new(
        id: impl Into<String>,
        kind: ObstacleKind,
        direction: f64,
        distance: f64,
        height: f64,
        width: f64,
    ) -> Self {
        Self {
            id: id.into(),
            kind,
            direction,
            distance,
            height,
            width,
            transparency: None,
        }
    }

    pub fn with_transparency(mut self, transparency: f64) -> Self {
        self.transparency = Some(transparency.clamp(0.0, 1.0));
        self
    }

    pub fn transparency_in(&self, season: Season) -> f64 {
        self.transparency
            .unwrap_or_else(|| self.kind.default_transparency(season))
            .clamp(0.0, 1.0)
    }

    /// Transparency with leaves on when nothing pins it.
    pub fn transparency(&self) -> f64 {
        self.transparency_in(Season::Summer)
    }

    pub fn shade_intensity(&self) -> f64 {
        1.0 - self.transparency()
    }

    /// Copy with the transparency fixed for `season`.
    pub fn for_season(&self, season: Season) -> Obstacle {
        Obstacle {
            transparency: Some(self.transparency_in(season)),
            ..self.clone()
        }
    }

    pub fn sanitized(&self) -> Obstacle {
        Obstacle {
            direction: normalize_angle(self.direction),
            distance: self.distance.max(MIN_DIMENSION_METERS),
            height: self.height.max(MIN_DIMENSION_METERS),
            width: self.width.max(MIN_DIMENSION_METERS),
            ..self.clone()
        }
    }

    pub fn angular_height(&self) -> f64 {
        let distance = self.distance.max(MIN_DIMENSION_METERS);
        rad_to_deg((self.height.max(MIN_DIMENSION_METERS) / distance).atan())
    }

    pub fn angular_half_width(&self) -> f64 {
        let distance = self.distance.max(MIN_DIMENSION_METERS);
        rad_to_deg((self.width.max(MIN_DIMENSION_METERS) / 2.0 / distance).atan())
    }

    /// (east, north) of the obstacle base in metres from the point its
    /// bearing is measured from.
    pub fn local_offset(&self) -> (f64, f64) {
        let (east, north) = bearing_vector(self.direction);
        (east * self.distance, north * self.distance)
    }

    /// The same obstacle as seen from `point`, given bearings measured from `origin`.
    pub fn relative_to(&self, origin: &Coordinates, point: &Coordinates) -> Obstacle {
        let (point_east, point_north) = LocalFrame::new(*origin).to_local(point);
        let (east, north) = self.local_offset();
        let (de, dn) = (east - point_east, north - point_north);
        Obstacle {
            direction: bearing_of(de, dn),
            distance: de.hypot(dn).max(MIN_DIMENSION_METERS),
            ..self.clone()
        }
    }
}

pub fn is_blocked(sun: &SolarPosition, obstacle: &Obstacle) -> BlockResult {
    if !sun.is_above_horizon() {
        return BlockResult::CLEAR;
    }
    if sun.altitude > obstacle.angular_height() {
        return BlockResult::CLEAR;
    }
    let offset = angular_difference(sun.azimuth, obstacle.direction);
    if offset > obstacle.angular_half_width() {
        return BlockResult::CLEAR;
    }
    BlockResult {
        blocked: true,
        shade_intensity: obstacle.shade_intensity(),
    }
}

/// Strongest shade among `obstacles`; overlapping shadows do not compound.
pub fn combined_block(sun: &SolarPosition, obstacles: &[Obstacle]) -> BlockResult {
    obstacles
        .iter()
        .map(|o| is_blocked(sun, o))
        .filter(|r| r.blocked)
        .fold(BlockResult::CLEAR, |acc, r| BlockResult {
            blocked: true,
            shade_intensity: acc.shade_intensity.max(r.shade_intensity),
        })
}

pub fn max_shade_intensity(sun: &SolarPosition, obstacles: &[Obstacle]) -> f64 {
    combined_block(sun, obstacles).shade_intensity
}
