use std::fmt;

const EARTH_RADIUS_M: f64 = 6_371_000.0;
const NINETY: f64 = 90.0;
const ONE_EIGHTY: f64 = NINETY * 2.0;

/// One geographic stop: stable identity, descriptive address fields and
/// coordinates. `lat`/`lng` are degrees; distances are meters.
#[derive(Clone, Debug, PartialEq)]
pub struct Waypoint {
    pub number: u32,
    pub name: String,
    pub street: String,
    pub house_number: String,
    pub postal_code: String,
    pub city: String,
    pub lat: f64,
    pub lng: f64,
}

impl Waypoint {
    /// Coordinate-only constructor; address fields stay empty.
    pub fn new(number: u32, name: impl Into<String>, lat: f64, lng: f64) -> Self {
        Self {
            number,
            name: name.into(),
            street: String::new(),
            house_number: String::new(),
            postal_code: String::new(),
            city: String::new(),
            lat,
            lng,
        }
    }

    /// Haversine great-circle distance to `other`, in meters.
    pub fn distance_to(&self, other: &Waypoint) -> f64 {
        let dlat = (other.lat - self.lat).to_radians();
        let dlng = (other.lng - self.lng).to_radians();
        let s1 = (dlat / 2.0).sin();
        let s2 = (dlng / 2.0).sin();
        let a = s1 * s1 + self.lat.to_radians().cos() * other.lat.to_radians().cos() * s2 * s2;
        let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
        (EARTH_RADIUS_M * c).abs()
    }

    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lng.is_finite()
            && (-NINETY..=NINETY).contains(&self.lat)
            && (-ONE_EIGHTY..=ONE_EIGHTY).contains(&self.lng)
    }
}

impl fmt::Display for Waypoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut b1 = ryu::Buffer::new();
        let mut b2 = ryu::Buffer::new();
        write!(
            f,
            "{},{},{},{}",
            self.number,
            self.name,
            b1.format(self.lat),
            b2.format(self.lng)
        )
    }
}
