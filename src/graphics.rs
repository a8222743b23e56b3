//! A wrapper around the 64x32 monochrome display buffer

pub const WIDTH: usize = 64;
pub const HEIGHT: usize = 32;

/// Value of a lit pixel in the buffer handed out by [`Graphics::pixels`]
pub const PIXEL_ON: u32 = 0xFFFFFF;
pub const PIXEL_OFF: u32 = 0;

/// Rows of pixels, each pixel either 0 (dark) or 1 (lit)
pub type Grid = [[u8; WIDTH]; HEIGHT];

#[derive(Clone)]
pub struct Graphics {
    buffer: Grid,
}

impl Graphics {
    pub fn new() -> Self {
        Graphics {
            buffer: [[0; WIDTH]; HEIGHT],
        }
    }

    pub fn len(&self) -> usize {
        WIDTH * HEIGHT
    }

    /// Turn every pixel off
    pub fn clear(&mut self) {
        self.buffer = [[0; WIDTH]; HEIGHT];
    }

    /// Return the pixel at the given coordinates, 0 or 1
    pub fn get(&self, x: usize, y: usize) -> u8 {
        self.buffer[y][x]
    }

    /// XOR a single pixel, wrapping coordinates that fall off the right or bottom
    /// edge. Returns true when a lit pixel got turned off
    pub fn xor_set(&mut self, x: usize, y: usize, on: bool) -> bool {
        if !on {
            return false;
        }

        let pixel = &mut self.buffer[y % HEIGHT][x % WIDTH];
        let collided = *pixel == 1;
        *pixel ^= 1;
        collided
    }

    /// XOR one 8-pixel sprite row into the buffer with its left edge at (x, y).
    /// The most significant bit is the leftmost pixel. Returns true if any lit
    /// pixel got turned off
    pub fn draw_row(&mut self, x: usize, y: usize, row: u8) -> bool {
        let mut collision = false;
        for bit in 0..8 {
            let on = row & (0x80 >> bit) != 0;
            if self.xor_set(x + bit, y, on) {
                collision = true;
            }
        }
        collision
    }

    pub fn grid(&self) -> &Grid {
        &self.buffer
    }

    /// The buffer as one `u32` per pixel, row major, which is what minifb
    /// windows take
    pub fn pixels(&self) -> Vec<u32> {
        self.buffer
            .iter()
            .flat_map(|row| row.iter())
            .map(|&p| if p == 1 { PIXEL_ON } else { PIXEL_OFF })
            .collect()
    }

    /// The buffer as RGBA bytes: lit pixels white, dark pixels black, both opaque
    pub fn rgba(&self) -> Vec<u8> {
        self.buffer
            .iter()
            .flat_map(|row| row.iter())
            .flat_map(|&p| {
                let c = if p == 1 { 0xFF } else { 0x00 };
                vec![c, c, c, 0xFF]
            })
            .collect()
    }
}

impl Default for Graphics {
    fn default() -> Self {
        Self::new()
    }
}
