use serde::{Deserialize, Serialize};

/// Surface dimensions in physical pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SurfaceSize {
    pub width: u32,
    pub height: u32,
}

impl SurfaceSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    fn area(&self) -> usize {
        self.width as usize * self.height as usize
    }
}

/// CPU-side ARGB8888 pixel target handed to engines each rendered frame.
///
/// A zero-sized canvas is invalid; engines should decline to draw into it.
#[derive(Debug, Clone, PartialEq)]
pub struct Canvas {
    size: SurfaceSize,
    pixels: Vec<u32>,
}

impl Canvas {
    pub fn new(size: SurfaceSize) -> Self {
        Self {
            size,
            pixels: vec![0; size.area()],
        }
    }

    pub fn resize(&mut self, size: SurfaceSize) {
        self.size = size;
        self.pixels.clear();
        self.pixels.resize(size.area(), 0);
    }

    pub fn is_valid(&self) -> bool {
        !self.size.is_empty()
    }

    pub fn size(&self) -> SurfaceSize {
        self.size
    }

    pub fn width(&self) -> u32 {
        self.size.width
    }

    pub fn height(&self) -> u32 {
        self.size.height
    }

    pub fn fill(&mut self, argb: u32) {
        self.pixels.fill(argb);
    }

    /// Writes one pixel; out-of-bounds coordinates are ignored.
    pub fn set_pixel(&mut self, x: u32, y: u32, argb: u32) {
        if let Some(index) = self.index(x, y) {
            self.pixels[index] = argb;
        }
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<u32> {
        self.index(x, y).map(|index| self.pixels[index])
    }

    pub fn pixels(&self) -> &[u32] {
        &self.pixels
    }

    fn index(&self, x: u32, y: u32) -> Option<usize> {
        if x >= self.size.width || y >= self.size.height {
            return None;
        }
        Some(y as usize * self.size.width as usize + x as usize)
    }
}

/// Packs an opaque colour from normalised channels.
pub fn argb(r: f32, g: f32, b: f32) -> u32 {
    let channel = |value: f32| (value.clamp(0.0, 1.0) * 255.0).round() as u32;
    0xFF00_0000 | channel(r) << 16 | channel(g) << 8 | channel(b)
}
