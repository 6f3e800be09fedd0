use super::sprites::SpriteImage;

pub type Rgba = [u8; 4];

pub const BLACK: Rgba = [0, 0, 0, 255];

/// Pixel-aligned rectangle in canvas space.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScreenRect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl ScreenRect {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn center_x(&self) -> i32 {
        self.x + self.width / 2
    }

    pub fn bottom(&self) -> i32 {
        self.y + self.height
    }
}

pub fn with_alpha(color: Rgba, alpha: f32) -> Rgba {
    let alpha = (alpha.clamp(0.0, 1.0) * 255.0).round() as u8;
    [color[0], color[1], color[2], alpha]
}

pub fn lerp_rgba(from: Rgba, to: Rgba, t: f32) -> Rgba {
    let t = t.clamp(0.0, 1.0);
    let mut out = [0u8; 4];
    for channel in 0..4 {
        let a = from[channel] as f32;
        let b = to[channel] as f32;
        out[channel] = (a + (b - a) * t).round() as u8;
    }
    out
}

/// Mutable view over an RGBA8 frame. All drawing is clipped to the frame.
pub struct Canvas<'a> {
    frame: &'a mut [u8],
    width: u32,
    height: u32,
}

impl<'a> Canvas<'a> {
    pub fn new(frame: &'a mut [u8], width: u32, height: u32) -> Self {
        Self {
            frame,
            width,
            height,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn clear(&mut self, color: Rgba) {
        for chunk in self.frame.chunks_exact_mut(4) {
            chunk.copy_from_slice(&color);
        }
    }

    pub fn pixel(&self, x: i32, y: i32) -> Option<Rgba> {
        let offset = self.byte_offset(x, y)?;
        let slice = self.frame.get(offset..offset + 4)?;
        Some([slice[0], slice[1], slice[2], slice[3]])
    }

    /// Source-over blend of one pixel. Opaque colors overwrite.
    pub fn blend_pixel(&mut self, x: i32, y: i32, color: Rgba) {
        if color[3] == 0 {
            return;
        }
        let Some(offset) = self.byte_offset(x, y) else {
            return;
        };
        let Some(dst) = self.frame.get_mut(offset..offset + 4) else {
            return;
        };
        if color[3] == 255 {
            dst.copy_from_slice(&color);
            return;
        }
        let alpha = color[3] as u32;
        let inverse = 255 - alpha;
        for channel in 0..3 {
            let blended = color[channel] as u32 * alpha + dst[channel] as u32 * inverse;
            dst[channel] = (blended / 255) as u8;
        }
        dst[3] = 255;
    }

    pub fn fill_rect(&mut self, x: i32, y: i32, width: i32, height: i32, color: Rgba) {
        let left = x.max(0);
        let top = y.max(0);
        let right = x.saturating_add(width).min(self.width as i32);
        let bottom = y.saturating_add(height).min(self.height as i32);
        for py in top..bottom {
            for px in left..right {
                self.blend_pixel(px, py, color);
            }
        }
    }

    pub fn fill(&mut self, rect: ScreenRect, color: Rgba) {
        self.fill_rect(rect.x, rect.y, rect.width, rect.height, color);
    }

    pub fn stroke_rect(&mut self, x: i32, y: i32, width: i32, height: i32, color: Rgba) {
        if width <= 0 || height <= 0 {
            return;
        }
        let right = x.saturating_add(width - 1);
        let bottom = y.saturating_add(height - 1);
        let inner_top = y.saturating_add(1);
        self.fill_rect(x, y, width, 1, color);
        self.fill_rect(x, bottom, width, 1, color);
        self.fill_rect(x, inner_top, 1, height - 2, color);
        self.fill_rect(right, inner_top, 1, height - 2, color);
    }

    /// Blends `color` over the whole frame.
    pub fn wash(&mut self, color: Rgba) {
        self.fill_rect(0, 0, self.width as i32, self.height as i32, color);
    }

    pub fn fill_circle(&mut self, cx: i32, cy: i32, radius: i32, color: Rgba) {
        self.fill_ellipse(cx, cy, radius, radius, color);
    }

    pub fn fill_ellipse(&mut self, cx: i32, cy: i32, rx: i32, ry: i32, color: Rgba) {
        if rx <= 0 || ry <= 0 {
            return;
        }
        let rx2 = (rx * rx) as f32;
        let ry2 = (ry * ry) as f32;
        for dy in -ry..=ry {
            let span = (rx2 * (1.0 - (dy * dy) as f32 / ry2)).max(0.0).sqrt() as i32;
            let left = cx.saturating_sub(span);
            self.fill_rect(left, cy.saturating_add(dy), span * 2 + 1, 1, color);
        }
    }

    pub fn stroke_circle(&mut self, cx: i32, cy: i32, radius: i32, color: Rgba) {
        if radius <= 0 {
            return;
        }
        let steps = (radius * 8).max(16);
        for step in 0..steps {
            let angle = step as f32 / steps as f32 * std::f32::consts::TAU;
            let x = cx.saturating_add((angle.cos() * radius as f32).round() as i32);
            let y = cy.saturating_add((angle.sin() * radius as f32).round() as i32);
            self.blend_pixel(x, y, color);
        }
    }

    /// Isoceles triangle pointing up, apex at `(cx, apex_y)`.
    pub fn fill_triangle_up(
        &mut self,
        cx: i32,
        apex_y: i32,
        base_y: i32,
        half_width: i32,
        color: Rgba,
    ) {
        let height = base_y - apex_y;
        if height <= 0 {
            return;
        }
        for row in 0..=height {
            let span = half_width * row / height;
            self.fill_rect(cx - span, apex_y + row, span * 2 + 1, 1, color);
        }
    }

    pub fn draw_line(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, color: Rgba) {
        let dx = (x1 - x0).abs();
        let dy = -(y1 - y0).abs();
        let sx = if x0 < x1 { 1 } else { -1 };
        let sy = if y0 < y1 { 1 } else { -1 };
        let (mut x, mut y, mut error) = (x0, y0, dx + dy);
        loop {
            self.blend_pixel(x, y, color);
            if x == x1 && y == y1 {
                break;
            }
            let doubled = error * 2;
            if doubled >= dy {
                error += dy;
                x += sx;
            }
            if doubled <= dx {
                error += dx;
                y += sy;
            }
        }
    }

    /// Vertical gradient across rows `[top, bottom)`.
    pub fn vertical_gradient(&mut self, top: i32, bottom: i32, from: Rgba, to: Rgba) {
        let span = (bottom - top).max(1) as f32;
        for y in top.max(0)..bottom.min(self.height as i32) {
            let color = lerp_rgba(from, to, (y - top) as f32 / span);
            self.fill_rect(0, y, self.width as i32, 1, color);
        }
    }

    /// Nearest-neighbour scaled blit into `dest`.
    pub fn draw_image(&mut self, image: &SpriteImage, dest: ScreenRect) {
        if image.width() == 0 || image.height() == 0 || dest.width <= 0 || dest.height <= 0 {
            return;
        }
        let left = dest.x.max(0);
        let top = dest.y.max(0);
        let right = dest.x.saturating_add(dest.width).min(self.width as i32);
        let bottom = dest.y.saturating_add(dest.height).min(self.height as i32);
        for py in top..bottom {
            let sy = ((py - dest.y) as u64 * image.height() as u64 / dest.height as u64) as u32;
            for px in left..right {
                let sx = ((px - dest.x) as u64 * image.width() as u64 / dest.width as u64) as u32;
                if let Some(color) = image.pixel(sx, sy) {
                    self.blend_pixel(px, py, color);
                }
            }
        }
    }

    fn byte_offset(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x as u32 >= self.width || y as u32 >= self.height {
            return None;
        }
        let pixel = (y as usize)
            .checked_mul(self.width as usize)?
            .checked_add(x as usize)?;
        let offset = pixel.checked_mul(4)?;
        if offset + 4 > self.frame.len() {
            return None;
        }
        Some(offset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drawing_outside_bounds_is_ignored() {
        let mut frame = vec![0u8; 4 * 4 * 4];
        let mut canvas = Canvas::new(&mut frame, 4, 4);
        canvas.fill_rect(-10, -10, 5, 5, BLACK);
        canvas.fill_rect(3, 3, 100, 100, [255, 0, 0, 255]);
        canvas.draw_line(-5, 2, 10, 2, [0, 255, 0, 255]);
        canvas.fill_circle(50, 50, 10, BLACK);
        assert_eq!(canvas.pixel(3, 3), Some([255, 0, 0, 255]));
        assert_eq!(canvas.pixel(0, 2), Some([0, 255, 0, 255]));
        assert_eq!(canvas.pixel(4, 0), None);
    }

    #[test]
    fn half_alpha_blends_toward_source() {
        let mut frame = vec![0u8; 4];
        let mut canvas = Canvas::new(&mut frame, 1, 1);
        canvas.clear([200, 100, 0, 255]);
        canvas.blend_pixel(0, 0, with_alpha(BLACK, 0.5));
        let pixel = canvas.pixel(0, 0).expect("pixel");
        assert!((99..=101).contains(&pixel[0]), "r={}", pixel[0]);
        assert!((49..=51).contains(&pixel[1]), "g={}", pixel[1]);
        assert_eq!(pixel[3], 255);
    }

    #[test]
    fn transparent_color_leaves_frame_untouched() {
        let mut frame = vec![7u8; 2 * 2 * 4];
        let mut canvas = Canvas::new(&mut frame, 2, 2);
        canvas.wash(with_alpha(BLACK, 0.0));
        assert!(frame.iter().all(|byte| *byte == 7));
    }

    #[test]
    fn scaled_image_blit_fills_destination() {
        let image = SpriteImage::from_rgba(1, 1, vec![9, 8, 7, 255]).expect("image");
        let mut frame = vec![0u8; 4 * 4 * 4];
        let mut canvas = Canvas::new(&mut frame, 4, 4);
        canvas.draw_image(&image, ScreenRect::new(1, 1, 2, 2));
        assert_eq!(canvas.pixel(2, 2), Some([9, 8, 7, 255]));
        assert_eq!(canvas.pixel(0, 0), Some([0, 0, 0, 0]));
    }
}
