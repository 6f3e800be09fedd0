use crate::config::TimeOfDayConfig;
use crate::rendering::{lerp_rgba, Rgba};

const HOURS_PER_DAY: f64 = 24.0;
const DAWN_START: f64 = 5.0 / HOURS_PER_DAY;
const DAY_START: f64 = 7.0 / HOURS_PER_DAY;
const DUSK_START: f64 = 18.0 / HOURS_PER_DAY;
const NIGHT_START: f64 = 20.0 / HOURS_PER_DAY;

const NIGHT_TINT: Rgba = [18, 24, 74, 255];
const DAWN_TINT: Rgba = [255, 176, 128, 255];
const DUSK_TINT: Rgba = [255, 122, 64, 255];
const NIGHT_ALPHA: f32 = 0.45;
const DUSK_START_ALPHA: f32 = 0.12;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayPeriod {
    Night,
    Dawn,
    Day,
    Dusk,
}

impl DayPeriod {
    pub const fn as_str(self) -> &'static str {
        match self {
            DayPeriod::Night => "night",
            DayPeriod::Dawn => "dawn",
            DayPeriod::Day => "day",
            DayPeriod::Dusk => "dusk",
        }
    }
}

/// Full-screen tint composited over the overworld.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AmbientLight {
    pub color: Rgba,
    pub alpha: f32,
}

impl AmbientLight {
    pub const NONE: AmbientLight = AmbientLight {
        color: [0, 0, 0, 255],
        alpha: 0.0,
    };
}

/// Day phase in `[0, 1)`. 0 is midnight, 0.5 is noon.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeOfDay {
    phase: f64,
    speed: f32,
    cycle_duration_ms: f32,
    paused: bool,
}

impl TimeOfDay {
    pub fn new(config: &TimeOfDayConfig) -> Self {
        let mut time = Self {
            phase: 0.0,
            speed: config.speed,
            cycle_duration_ms: config.cycle_duration_ms,
            paused: config.paused,
        };
        time.set_hour(config.start_hour);
        time
    }

    pub fn update(&mut self, dt_ms: f32) {
        if self.paused || dt_ms <= 0.0 || self.cycle_duration_ms <= 0.0 {
            return;
        }
        let advance = dt_ms as f64 * self.speed as f64 / self.cycle_duration_ms as f64;
        self.phase = wrap_phase(self.phase + advance);
    }

    pub fn phase(&self) -> f32 {
        self.phase as f32
    }

    pub fn set_phase(&mut self, phase: f32) {
        self.phase = wrap_phase(phase as f64);
    }

    /// Hours outside `[0, 24)` wrap around.
    pub fn set_hour(&mut self, hour: f32) {
        self.phase = wrap_phase(hour as f64 / HOURS_PER_DAY);
    }

    pub fn hour(&self) -> f32 {
        (self.phase * HOURS_PER_DAY) as f32
    }

    /// `HH:MM` on a 24-hour clock.
    pub fn clock_label(&self) -> String {
        let total_minutes = (self.phase * HOURS_PER_DAY * 60.0).floor() as u32 % (24 * 60);
        format!("{:02}:{:02}", total_minutes / 60, total_minutes % 60)
    }

    pub fn pause(&mut self) {
        self.paused = true;
    }

    pub fn resume(&mut self) {
        self.paused = false;
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn set_speed(&mut self, speed: f32) {
        self.speed = speed.max(0.0);
    }

    pub fn period(&self) -> DayPeriod {
        period_for_phase(self.phase)
    }

    pub fn is_night(&self) -> bool {
        self.period() == DayPeriod::Night
    }

    pub fn is_dawn(&self) -> bool {
        self.period() == DayPeriod::Dawn
    }

    pub fn is_day(&self) -> bool {
        self.period() == DayPeriod::Day
    }

    pub fn is_dusk(&self) -> bool {
        self.period() == DayPeriod::Dusk
    }

    /// How far into the night the current phase is, 0 in full day and 1 in full night.
    pub fn darkness(&self) -> f32 {
        match self.period() {
            DayPeriod::Night => 1.0,
            DayPeriod::Day => 0.0,
            DayPeriod::Dawn => 1.0 - band_progress(self.phase, DAWN_START, DAY_START),
            DayPeriod::Dusk => band_progress(self.phase, DUSK_START, NIGHT_START),
        }
    }

    pub fn ambient_light(&self) -> AmbientLight {
        match self.period() {
            DayPeriod::Day => AmbientLight::NONE,
            DayPeriod::Night => AmbientLight {
                color: NIGHT_TINT,
                alpha: NIGHT_ALPHA,
            },
            DayPeriod::Dawn => {
                let t = band_progress(self.phase, DAWN_START, DAY_START);
                AmbientLight {
                    color: lerp_rgba(NIGHT_TINT, DAWN_TINT, t),
                    alpha: NIGHT_ALPHA * (1.0 - t),
                }
            }
            DayPeriod::Dusk => {
                let t = band_progress(self.phase, DUSK_START, NIGHT_START);
                AmbientLight {
                    color: lerp_rgba(DUSK_TINT, NIGHT_TINT, t),
                    alpha: DUSK_START_ALPHA + (NIGHT_ALPHA - DUSK_START_ALPHA) * t,
                }
            }
        }
    }
}

fn wrap_phase(phase: f64) -> f64 {
    let wrapped = phase.rem_euclid(1.0);
    if wrapped >= 1.0 {
        0.0
    } else {
        wrapped
    }
}

fn period_for_phase(phase: f64) -> DayPeriod {
    if !(DAWN_START..NIGHT_START).contains(&phase) {
        DayPeriod::Night
    } else if phase < DAY_START {
        DayPeriod::Dawn
    } else if phase < DUSK_START {
        DayPeriod::Day
    } else {
        DayPeriod::Dusk
    }
}

fn band_progress(phase: f64, start: f64, end: f64) -> f32 {
    ((phase - start) / (end - start)).clamp(0.0, 1.0) as f32
}
