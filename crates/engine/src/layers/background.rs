use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::rendering::{lerp_rgba, with_alpha, RenderTarget, Rgba};

use super::{AmbientState, Layer};

pub const HILL_PARALLAX: f32 = 0.3;
const FAR_HILL_PARALLAX: f32 = 0.15;
const CLOUD_PARALLAX: f32 = 0.1;
const CLOUD_POOL: usize = 10;
const CLOUD_WRAP_PX: f32 = 2048.0;
const RAIN_DROPS: usize = 160;
const BACKGROUND_SEED: u64 = 0xc10d_5eed;

const FAR_HILL_DAY: Rgba = [112, 152, 128, 255];
const FAR_HILL_NIGHT: Rgba = [30, 40, 58, 255];
const NEAR_HILL_DAY: Rgba = [78, 132, 84, 255];
const NEAR_HILL_NIGHT: Rgba = [22, 34, 40, 255];
const CLOUD_LIGHT: Rgba = [250, 250, 252, 255];
const CLOUD_DARK: Rgba = [120, 126, 140, 255];
const RAIN_COLOR: Rgba = [180, 200, 230, 255];

/// One parallax band of hills.
#[derive(Debug, Clone, Copy)]
struct HillPlane {
    parallax: f32,
    day: Rgba,
    night: Rgba,
    frequency: f32,
    amplitude: f32,
    /// Resting height as a fraction of the canvas.
    base: f32,
}

impl HillPlane {
    /// Height of the hill line above the bottom edge, in pixels, at world column `x`.
    fn height_at(&self, x: f32, canvas_height: f32) -> f32 {
        let wave = x * self.frequency;
        canvas_height * self.base
            + wave.sin() * canvas_height * self.amplitude
            + (wave * 2.7 + 1.3).sin() * canvas_height * self.amplitude * 0.4
    }
}

const HILL_PLANES: [HillPlane; 2] = [
    HillPlane {
        parallax: FAR_HILL_PARALLAX,
        day: FAR_HILL_DAY,
        night: FAR_HILL_NIGHT,
        frequency: 0.011,
        amplitude: 0.05,
        base: 0.42,
    },
    HillPlane {
        parallax: HILL_PARALLAX,
        day: NEAR_HILL_DAY,
        night: NEAR_HILL_NIGHT,
        frequency: 0.017,
        amplitude: 0.04,
        base: 0.32,
    },
];

#[derive(Debug, Clone, Copy)]
struct Cloud {
    x: f32,
    y_frac: f32,
    width: f32,
    speed_px_per_ms: f32,
}

#[derive(Debug, Clone, Copy)]
struct RainDrop {
    x_frac: f32,
    y_frac: f32,
    speed_frac_per_ms: f32,
    length: i32,
}

/// Parallax hills, drifting clouds and rain.
pub struct BackgroundLayer {
    ambient: AmbientState,
    clouds: Vec<Cloud>,
    rain: Vec<RainDrop>,
}

impl BackgroundLayer {
    pub fn new() -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(BACKGROUND_SEED);
        let clouds = (0..CLOUD_POOL)
            .map(|index| Cloud {
                x: index as f32 * CLOUD_WRAP_PX / CLOUD_POOL as f32 + rng.gen_range(0.0..80.0),
                y_frac: rng.gen_range(0.04..0.3),
                width: rng.gen_range(48.0..120.0),
                speed_px_per_ms: rng.gen_range(0.004..0.012),
            })
            .collect();
        let rain = (0..RAIN_DROPS)
            .map(|_| RainDrop {
                x_frac: rng.gen_range(0.0..1.0),
                y_frac: rng.gen_range(0.0..1.0),
                speed_frac_per_ms: rng.gen_range(0.0012..0.002),
                length: rng.gen_range(5..10),
            })
            .collect();
        Self {
            ambient: AmbientState::default(),
            clouds,
            rain,
        }
    }

    fn visible_clouds(&self) -> &[Cloud] {
        let count = self.ambient.weather.cloud_count().min(self.clouds.len());
        &self.clouds[..count]
    }
}

impl Default for BackgroundLayer {
    fn default() -> Self {
        Self::new()
    }
}

impl Layer for BackgroundLayer {
    fn name(&self) -> &'static str {
        "background"
    }

    fn z_index(&self) -> i32 {
        1
    }

    fn set_ambient(&mut self, ambient: &AmbientState) {
        self.ambient = *ambient;
    }

    fn update(&mut self, dt_ms: f32) {
        let dt_ms = dt_ms.max(0.0);
        for cloud in &mut self.clouds {
            cloud.x = (cloud.x + cloud.speed_px_per_ms * dt_ms).rem_euclid(CLOUD_WRAP_PX);
        }
        if self.ambient.weather.is_raining() {
            for drop in &mut self.rain {
                drop.y_frac = (drop.y_frac + drop.speed_frac_per_ms * dt_ms).rem_euclid(1.0);
            }
        }
    }

    fn render(&self, target: &mut RenderTarget<'_>) {
        let (width, height) = target.canvas_size();
        let canvas_height = height as f32;
        let darkness = self.ambient.darkness;

        let cloud_color = lerp_rgba(
            lerp_rgba(CLOUD_LIGHT, CLOUD_DARK, self.ambient.weather.cloud_shade()),
            FAR_HILL_NIGHT,
            darkness * 0.7,
        );
        let (cloud_shift, _) = target.camera.parallax_offset(CLOUD_PARALLAX);
        for cloud in self.visible_clouds() {
            let x = (cloud.x - cloud_shift).rem_euclid(CLOUD_WRAP_PX) - cloud.width;
            let y = (cloud.y_frac * canvas_height) as i32;
            let half = (cloud.width * 0.5) as i32;
            let puff = (cloud.width * 0.22) as i32;
            let cx = x as i32 + half;
            let puff_color = with_alpha(cloud_color, 0.85);
            target.canvas.fill_ellipse(cx, y, half, puff, puff_color);
            target
                .canvas
                .fill_circle(cx - half / 3, y - puff / 2, puff, puff_color);
            target
                .canvas
                .fill_circle(cx + half / 4, y - puff * 2 / 3, puff + 2, puff_color);
        }

        for plane in &HILL_PLANES {
            let (shift_x, shift_y) = target.camera.parallax_offset(plane.parallax);
            let color = lerp_rgba(plane.day, plane.night, darkness);
            for column in 0..width as i32 {
                let world_x = column as f32 + shift_x;
                let rise = plane.height_at(world_x, canvas_height);
                let top = (canvas_height - rise + shift_y * 0.2) as i32;
                let depth = height as i32 - top;
                target.canvas.fill_rect(column, top, 1, depth, color);
            }
        }
    }

    fn render_overlay(&self, target: &mut RenderTarget<'_>) {
        if !self.ambient.weather.is_raining() {
            return;
        }
        let (width, height) = target.canvas_size();
        let color = with_alpha(RAIN_COLOR, 0.55);
        for drop in &self.rain {
            let x = (drop.x_frac * width as f32) as i32;
            let y = (drop.y_frac * height as f32) as i32;
            let (end_x, end_y) = (x - drop.length / 3, y + drop.length);
            target.canvas.draw_line(x, y, end_x, end_y, color);
        }
    }
}
