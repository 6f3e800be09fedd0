use thiserror::Error;

#[derive(Debug, Error)]
pub enum SurfaceError {
    #[error("drawing surface has zero size ({width}x{height})")]
    ZeroSize { width: u32, height: u32 },
    #[error("drawing surface buffer holds {actual} bytes, expected {expected}")]
    BufferSize { expected: usize, actual: usize },
    #[error("failed to present frame: {0}")]
    Present(String),
    #[error("failed to resize output: {0}")]
    Resize(String),
}

/// An RGBA8 frame the engine draws into once per tick.
pub trait Surface {
    fn size(&self) -> (u32, u32);

    fn frame_mut(&mut self) -> &mut [u8];

    fn present(&mut self) -> Result<(), SurfaceError>;

    /// Output (window) size changed; the frame buffer keeps its size.
    fn resize_output(&mut self, _width: u32, _height: u32) -> Result<(), SurfaceError> {
        Ok(())
    }
}

/// Checks that `surface` can be drawn into at all.
pub fn validate_surface(surface: &mut dyn Surface) -> Result<(), SurfaceError> {
    let (width, height) = surface.size();
    if width == 0 || height == 0 {
        return Err(SurfaceError::ZeroSize { width, height });
    }
    let expected = width as usize * height as usize * 4;
    let actual = surface.frame_mut().len();
    if actual != expected {
        return Err(SurfaceError::BufferSize { expected, actual });
    }
    Ok(())
}

/// Headless surface backed by a plain buffer.
#[derive(Debug, Clone)]
pub struct MemorySurface {
    width: u32,
    height: u32,
    frame: Vec<u8>,
    presented_frames: u64,
}

impl MemorySurface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            frame: vec![0; width as usize * height as usize * 4],
            presented_frames: 0,
        }
    }

    pub fn frame(&self) -> &[u8] {
        &self.frame
    }

    pub fn presented_frames(&self) -> u64 {
        self.presented_frames
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let offset = (y as usize * self.width as usize + x as usize) * 4;
        let slice = self.frame.get(offset..offset + 4)?;
        Some([slice[0], slice[1], slice[2], slice[3]])
    }
}

impl Surface for MemorySurface {
    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn frame_mut(&mut self) -> &mut [u8] {
        &mut self.frame
    }

    fn present(&mut self) -> Result<(), SurfaceError> {
        self.presented_frames += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Broken;

    impl Surface for Broken {
        fn size(&self) -> (u32, u32) {
            (4, 4)
        }

        fn frame_mut(&mut self) -> &mut [u8] {
            &mut []
        }

        fn present(&mut self) -> Result<(), SurfaceError> {
            Err(SurfaceError::Present("lost".to_string()))
        }
    }

    #[test]
    fn memory_surface_validates() {
        let mut surface = MemorySurface::new(8, 6);
        assert!(validate_surface(&mut surface).is_ok());
        surface.present().expect("present");
        assert_eq!(surface.presented_frames(), 1);
    }

    #[test]
    fn zero_size_and_short_buffers_are_rejected() {
        let mut empty = MemorySurface::new(0, 10);
        assert!(matches!(
            validate_surface(&mut empty),
            Err(SurfaceError::ZeroSize {
                width: 0,
                height: 10,
            })
        ));
        assert!(matches!(
            validate_surface(&mut Broken),
            Err(SurfaceError::BufferSize {
                expected: 64,
                actual: 0
            })
        ));
    }
}
