/// RGBA tint color, components in `0.0..=1.0`.
///
/// The default is opaque white, i.e. "no tint".
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ColorRgba {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl ColorRgba {
    pub const BLACK: ColorRgba = ColorRgba::from_rgb_u32(0x000000);
    pub const BLUE: ColorRgba = ColorRgba::from_rgb_u32(0x0000ff);
    pub const BROWN: ColorRgba = ColorRgba::from_rgb_u32(0x964b00);
    pub const COPPER: ColorRgba = ColorRgba::from_rgb_u32(0xb87333);
    pub const CYAN: ColorRgba = ColorRgba::from_rgb_u32(0x00ffff);
    pub const GREEN: ColorRgba = ColorRgba::from_rgb_u32(0x00ff00);
    pub const HOT_PINK: ColorRgba = ColorRgba::from_rgb_u32(0xff69b4);
    pub const PINK: ColorRgba = ColorRgba::from_rgb_u32(0xffc0cb);
    pub const PURPLE: ColorRgba = ColorRgba::from_rgb_u32(0xff00ff);
    pub const RED: ColorRgba = ColorRgba::from_rgb_u32(0xff0000);
    pub const WHITE: ColorRgba = ColorRgba::from_rgb_u32(0xffffff);
    pub const YELLOW: ColorRgba = ColorRgba::from_rgb_u32(0xffff00);

    /// Palette addressable by name from formatted text (`{red ...}`).
    pub const NAMED: [(&'static str, ColorRgba); 12] = [
        ("black", Self::BLACK),
        ("blue", Self::BLUE),
        ("brown", Self::BROWN),
        ("copper", Self::COPPER),
        ("cyan", Self::CYAN),
        ("green", Self::GREEN),
        ("hotpink", Self::HOT_PINK),
        ("pink", Self::PINK),
        ("purple", Self::PURPLE),
        ("red", Self::RED),
        ("white", Self::WHITE),
        ("yellow", Self::YELLOW),
    ];

    #[inline]
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    #[inline]
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self::new(r, g, b, 1.0)
    }

    #[inline]
    pub const fn black() -> Self {
        Self::BLACK
    }

    #[inline]
    pub const fn white() -> Self {
        Self::WHITE
    }

    /// `0xRRGGBB`, fully opaque.
    pub const fn from_rgb_u32(rgb: u32) -> Self {
        Self::from_rgba_u32((rgb << 8) | 0xff)
    }

    /// `0xRRGGBBAA`.
    pub const fn from_rgba_u32(rgba: u32) -> Self {
        Self::new(
            ((rgba >> 24) & 0xff) as f32 / 255.0,
            ((rgba >> 16) & 0xff) as f32 / 255.0,
            ((rgba >> 8) & 0xff) as f32 / 255.0,
            (rgba & 0xff) as f32 / 255.0,
        )
    }

    /// Parses `0xRRGGBB`, `0xRRGGBBAA`, `#RRGGBB` or `#RRGGBBAA`.
    ///
    /// The prefix is optional. Returns `None` for any other shape.
    pub fn from_hex(s: &str) -> Option<Self> {
        let digits = s
            .strip_prefix("0x")
            .or_else(|| s.strip_prefix("0X"))
            .or_else(|| s.strip_prefix('#'))
            .unwrap_or(s);

        if !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return None;
        }
        let value = u32::from_str_radix(digits, 16).ok()?;
        match digits.len() {
            6 => Some(Self::from_rgb_u32(value)),
            8 => Some(Self::from_rgba_u32(value)),
            _ => None,
        }
    }

    /// Looks up a color of the named palette (case-insensitive).
    pub fn named(name: &str) -> Option<Self> {
        Self::NAMED
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|&(_, c)| c)
    }

    #[inline]
    pub fn to_array(self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }

    #[inline]
    pub fn is_finite(self) -> bool {
        self.r.is_finite() && self.g.is_finite() && self.b.is_finite() && self.a.is_finite()
    }
}

impl Default for ColorRgba {
    fn default() -> Self {
        Self::WHITE
    }
}
