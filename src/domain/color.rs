/// 24-bit colour shared by ghosts, particles and the renderer.

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    /// Build from a packed `0xRRGGBB` value.
    pub const fn hex(v: u32) -> Rgb {
        Rgb {
            r: ((v >> 16) & 0xFF) as u8,
            g: ((v >> 8) & 0xFF) as u8,
            b: (v & 0xFF) as u8,
        }
    }

    /// Blend toward `bg` by `1 - alpha`. Alpha is clamped to [0, 1].
    pub fn fade(self, bg: Rgb, alpha: f32) -> Rgb {
        let a = alpha.clamp(0.0, 1.0);
        let mix = |fg: u8, bg: u8| -> u8 {
            (fg as f32 * a + bg as f32 * (1.0 - a)).round() as u8
        };
        Rgb { r: mix(self.r, bg.r), g: mix(self.g, bg.g), b: mix(self.b, bg.b) }
    }
}

// ── Palette ──

pub const RED: Rgb = Rgb::hex(0xFF0000);
pub const ORANGE: Rgb = Rgb::hex(0xFF8800);
pub const YELLOW: Rgb = Rgb::hex(0xFFFF00);
pub const WHITE: Rgb = Rgb::hex(0xFFFFFF);
pub const PURPLE: Rgb = Rgb::hex(0x790ECB);
pub const GREEN: Rgb = Rgb::hex(0x00FF00);
pub const BLUE: Rgb = Rgb::hex(0x0000FF);

pub const GHOST_RED: Rgb = Rgb::hex(0xFF0000);
pub const GHOST_PINK: Rgb = Rgb::hex(0xFFB8FF);
pub const GHOST_CYAN: Rgb = Rgb::hex(0x00FFFF);
pub const GHOST_ORANGE: Rgb = Rgb::hex(0xFFB852);
