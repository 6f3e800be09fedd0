use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::rendering::{lerp_rgba, with_alpha, RenderTarget, Rgba};

use super::{AmbientState, Layer};

const STAR_SEED: u64 = 0x5eed_57a2;
const STAR_COUNT: usize = 90;
const STAR_COLOR: Rgba = [236, 240, 255, 255];
const SUN_COLOR: Rgba = [255, 236, 170, 255];
const MOON_COLOR: Rgba = [220, 226, 240, 255];

/// `(phase, top, horizon)` keyframes, looping at 1.0.
const SKY_KEYS: [(f32, Rgba, Rgba); 7] = [
    (0.0, [6, 8, 26, 255], [20, 24, 58, 255]),
    (0.2, [12, 14, 40, 255], [44, 40, 82, 255]),
    (0.25, [82, 98, 170, 255], [250, 170, 128, 255]),
    (0.32, [88, 150, 222, 255], [182, 218, 244, 255]),
    (0.72, [78, 138, 214, 255], [176, 210, 240, 255]),
    (0.8, [64, 58, 128, 255], [246, 132, 86, 255]),
    (0.86, [14, 16, 46, 255], [40, 34, 80, 255]),
];

#[derive(Debug, Clone, Copy)]
struct Star {
    x: f32,
    y: f32,
    twinkle_offset: f32,
}

pub fn sky_colors(phase: f32) -> (Rgba, Rgba) {
    let phase = phase.rem_euclid(1.0);
    let next_index = SKY_KEYS
        .iter()
        .position(|(key_phase, _, _)| *key_phase > phase)
        .unwrap_or(SKY_KEYS.len());
    let (from, to, span_start, span_end) = if next_index == 0 || next_index == SKY_KEYS.len() {
        let last = SKY_KEYS[SKY_KEYS.len() - 1];
        (last, SKY_KEYS[0], last.0, 1.0)
    } else {
        let from = SKY_KEYS[next_index - 1];
        let to = SKY_KEYS[next_index];
        (from, to, from.0, to.0)
    };
    let t = ((phase - span_start) / (span_end - span_start)).clamp(0.0, 1.0);
    (lerp_rgba(from.1, to.1, t), lerp_rgba(from.2, to.2, t))
}

pub struct SkyLayer {
    ambient: AmbientState,
    stars: Vec<Star>,
}

impl SkyLayer {
    pub fn new() -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(STAR_SEED);
        let stars = (0..STAR_COUNT)
            .map(|_| Star {
                x: rng.gen_range(0.0..1.0),
                y: rng.gen_range(0.0..0.7),
                twinkle_offset: rng.gen_range(0.0..std::f32::consts::TAU),
            })
            .collect();
        Self {
            ambient: AmbientState::default(),
            stars,
        }
    }
}

impl Default for SkyLayer {
    fn default() -> Self {
        Self::new()
    }
}

impl Layer for SkyLayer {
    fn name(&self) -> &'static str {
        "sky"
    }

    fn z_index(&self) -> i32 {
        0
    }

    fn set_ambient(&mut self, ambient: &AmbientState) {
        self.ambient = *ambient;
    }

    fn render(&self, target: &mut RenderTarget<'_>) {
        let (width, height) = target.canvas_size();
        let (top, horizon) = sky_colors(self.ambient.phase);
        let bottom = height as i32;
        target.canvas.vertical_gradient(0, bottom, top, horizon);

        if self.ambient.darkness > 0.0 {
            let seconds = (target.clock_ms / 1000.0) as f32;
            for star in &self.stars {
                let twinkle = (seconds * 2.0 + star.twinkle_offset).sin() * 0.3 + 0.7;
                let alpha = self.ambient.darkness * twinkle;
                target.canvas.blend_pixel(
                    (star.x * width as f32) as i32,
                    (star.y * height as f32) as i32,
                    with_alpha(STAR_COLOR, alpha),
                );
            }
        }

        // Sun rises at 06:00 and sets at 18:00, the moon takes the other half.
        let phase = self.ambient.phase;
        let (body_color, arc) = if (0.25..0.75).contains(&phase) {
            (SUN_COLOR, (phase - 0.25) * 2.0)
        } else {
            (MOON_COLOR, ((phase + 0.25).rem_euclid(1.0)) * 2.0)
        };
        let x = (arc * width as f32) as i32;
        let lift = (arc * std::f32::consts::PI).sin();
        let y = (height as f32 * (0.45 - 0.35 * lift)) as i32;
        let radius = (width.min(height) as i32 / 24).max(3);
        let halo = with_alpha(body_color, 0.3);
        target.canvas.fill_circle(x, y, radius + 2, halo);
        target.canvas.fill_circle(x, y, radius, body_color);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn noon_sky_is_bright_and_midnight_dark() {
        let (noon_top, _) = sky_colors(0.5);
        let (midnight_top, _) = sky_colors(0.0);
        assert!(noon_top[2] > 150);
        assert!(midnight_top[2] < 60);
    }

    #[test]
    fn keyframes_are_hit_exactly_and_wrap_smoothly() {
        assert_eq!(sky_colors(0.32), (SKY_KEYS[3].1, SKY_KEYS[3].2));
        let (late, _) = sky_colors(0.999);
        let (start, _) = sky_colors(0.0);
        for channel in 0..3 {
            assert!((late[channel] as i32 - start[channel] as i32).abs() <= 2);
        }
    }

    #[test]
    fn stars_are_seeded_deterministically() {
        let a = SkyLayer::new();
        let b = SkyLayer::new();
        assert_eq!(a.stars.len(), STAR_COUNT);
        assert_eq!(a.stars[0].x, b.stars[0].x);
        assert_eq!(a.stars[STAR_COUNT - 1].y, b.stars[STAR_COUNT - 1].y);
    }
}
