use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Weather {
    #[default]
    Clear,
    Cloudy,
    Rain,
}

impl Weather {
    pub const fn as_str(self) -> &'static str {
        match self {
            Weather::Clear => "clear",
            Weather::Cloudy => "cloudy",
            Weather::Rain => "rain",
        }
    }

    /// Number of drifting clouds the background keeps on screen.
    pub const fn cloud_count(self) -> usize {
        match self {
            Weather::Clear => 3,
            Weather::Cloudy => 7,
            Weather::Rain => 9,
        }
    }

    /// Darkening of the cloud colour, 0 for white.
    pub const fn cloud_shade(self) -> f32 {
        match self {
            Weather::Clear => 0.0,
            Weather::Cloudy => 0.25,
            Weather::Rain => 0.5,
        }
    }

    pub const fn is_raining(self) -> bool {
        matches!(self, Weather::Rain)
    }
}
