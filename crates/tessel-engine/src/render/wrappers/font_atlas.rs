use crate::backend::GfxBackend;
use crate::coords::{ColorRgba, Vec2, Vec3};
use crate::gfx::FontAtlas;
use crate::render::RenderStack;

/// Rune cell size and spacing used when printing, in target pixels.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct FontStyle {
    pub rune_size: Vec2,
    pub spacing: Vec2,
}

impl FontStyle {
    /// The font's own cell size and spacing.
    pub fn of(font: &FontAtlas) -> Self {
        Self {
            rune_size: font.cell_size().to_vec2(),
            spacing: font.spacing().to_vec2(),
        }
    }
}

/// A text cursor over a font atlas.
///
/// `print*` draws and advances right; `puts*` additionally returns to the
/// starting column on the next line. Text is iterated by `char`, so every
/// code point takes one cell regardless of its UTF-8 width.
pub struct FontAtlasWrapper<'a, B: GfxBackend> {
    stack: &'a mut RenderStack<B>,
    font: &'a FontAtlas,
    init_pos: Vec3,
    pos: Vec3,
    style: FontStyle,
    bg_padding: Vec2,
}

impl<'a, B: GfxBackend> FontAtlasWrapper<'a, B> {
    pub(crate) fn new(stack: &'a mut RenderStack<B>, font: &'a FontAtlas, pos: Vec3, style: FontStyle) -> Self {
        Self {
            stack,
            font,
            init_pos: pos,
            pos,
            style,
            bg_padding: Vec2::zero(),
        }
    }

    // ── cursor ────────────────────────────────────────────────────────────

    /// Advances one blank cell.
    pub fn print(&mut self) -> &mut Self {
        self.print_blanks(1)
    }

    pub fn print_rune(&mut self, rune: char) -> &mut Self {
        if let Some(src) = self.font.rune_src(rune) {
            self.stack.draw_src_quad(src, self.pos, self.style.rune_size);
        }
        self.print()
    }

    /// Prints `text`; `'\n'` starts a new line.
    pub fn print_str(&mut self, text: &str) -> &mut Self {
        for rune in text.chars() {
            if rune == '\n' {
                self.puts();
            } else {
                self.print_rune(rune);
            }
        }
        self
    }

    pub fn print_blanks(&mut self, count: u32) -> &mut Self {
        self.pos.x += (self.style.rune_size.x + self.style.spacing.x) * count as f32;
        self
    }

    /// Moves to the start of the next line.
    pub fn puts(&mut self) -> &mut Self {
        self.puts_blanks(1)
    }

    pub fn puts_rune(&mut self, rune: char) -> &mut Self {
        self.print_rune(rune).puts()
    }

    pub fn puts_str(&mut self, text: &str) -> &mut Self {
        self.print_str(text).puts()
    }

    pub fn puts_blanks(&mut self, count: u32) -> &mut Self {
        self.pos.x = self.init_pos.x;
        self.pos.y += (self.style.rune_size.y + self.style.spacing.y) * count as f32;
        self
    }

    /// Each line followed by a line break, except the last.
    pub fn print_lines(&mut self, lines: &[&str]) -> &mut Self {
        for (i, line) in lines.iter().enumerate() {
            if i > 0 {
                self.puts();
            }
            self.print_str(line);
        }
        self
    }

    pub fn puts_lines(&mut self, lines: &[&str]) -> &mut Self {
        for line in lines {
            self.puts_str(line);
        }
        self
    }

    // ── formatted ─────────────────────────────────────────────────────────

    /// Prints a template with positional arguments and colored runs.
    ///
    /// - `{}` is replaced by the next argument, or printed as-is once they run out
    /// - `{red ` or `{0xff8800 ` starts a colored run that ` }` ends; runs nest
    /// - `{{`, `}}` and ` }}` print `{`, `}` and ` }`
    ///
    /// Unknown color names fall back to white. Unclosed runs end with the call.
    pub fn print_fmt(&mut self, fmt: &str, args: &[&str]) -> &mut Self {
        let mut args = args.iter();
        let mut runs = 0usize;
        let mut it = fmt.char_indices().peekable();

        while let Some((_, rune)) = it.next() {
            match rune {
                '{' => {
                    let Some(&(start, next)) = it.peek() else {
                        self.print_rune('{');
                        break;
                    };
                    match next {
                        '{' => {
                            it.next();
                            self.print_rune('{');
                        }
                        '}' => {
                            it.next();
                            match args.next() {
                                Some(arg) => {
                                    self.print_str(arg);
                                }
                                None => {
                                    self.print_rune('{').print_rune('}');
                                }
                            }
                        }
                        _ => {
                            // The color token runs up to the next space, which is consumed.
                            let mut end = start;
                            for (i, c) in it.by_ref() {
                                if c == ' ' {
                                    end = i;
                                    break;
                                }
                            }
                            let color = self.run_color(&fmt[start..end]);
                            self.stack.begin_color(color);
                            runs += 1;
                        }
                    }
                }
                ' ' => {
                    let mut ahead = it.clone();
                    match ahead.next() {
                        Some((_, '}')) => {
                            if matches!(ahead.peek(), Some((_, '}'))) {
                                self.print_rune(' ').print_rune('}');
                                it.next();
                                it.next();
                            } else {
                                if runs > 0 {
                                    self.stack.end_color();
                                    runs -= 1;
                                }
                                it.next();
                            }
                        }
                        _ => {
                            self.print_rune(' ');
                        }
                    }
                }
                '}' => {
                    self.print_rune('}');
                    if matches!(it.peek(), Some((_, '}'))) {
                        it.next();
                    }
                }
                '\n' => {
                    self.puts();
                }
                _ => {
                    self.print_rune(rune);
                }
            }
        }

        for _ in 0..runs {
            self.stack.end_color();
        }
        self
    }

    pub fn puts_fmt(&mut self, fmt: &str, args: &[&str]) -> &mut Self {
        self.print_fmt(fmt, args).puts()
    }

    fn run_color(&self, token: &str) -> ColorRgba {
        let color = if token.starts_with("0x") || token.starts_with("0X") {
            ColorRgba::from_hex(token)
        } else {
            self.stack.font_color(token)
        };
        color.unwrap_or(ColorRgba::WHITE)
    }

    // ── background ────────────────────────────────────────────────────────

    /// Fills a `cols x rows` text block at the cursor, padding included.
    ///
    /// The font texture is unbound for the fill and rebound afterward.
    pub fn draw_bg(&mut self, color: ColorRgba, str_size: (u32, u32)) -> &mut Self {
        let size = self.calc_total_size(str_size);
        let pos = Vec3::new(self.pos.x - self.bg_padding.x, self.pos.y - self.bg_padding.y, self.pos.z);
        self.stack.wrap_texture_id(None, |s| {
            s.wrap_color(color, |s| {
                s.draw_quad(pos, size);
            });
        });
        self
    }

    /// Size of a `cols x rows` text block with spacing between cells and
    /// background padding on every side.
    pub fn calc_total_size(&self, (cols, rows): (u32, u32)) -> Vec2 {
        let FontStyle { rune_size, spacing } = self.style;
        Vec2::new(
            cols as f32 * rune_size.x + cols.saturating_sub(1) as f32 * spacing.x + self.bg_padding.x * 2.0,
            rows as f32 * rune_size.y + rows.saturating_sub(1) as f32 * spacing.y + self.bg_padding.y * 2.0,
        )
    }

    /// Shifts the cursor and its line start by the change in padding.
    pub fn set_bg_padding(&mut self, padding: Vec2) -> &mut Self {
        let delta = padding - self.bg_padding;
        self.init_pos.x += delta.x;
        self.init_pos.y += delta.y;
        self.pos.x += delta.x;
        self.pos.y += delta.y;
        self.bg_padding = padding;
        self
    }

    #[inline]
    pub fn bg_padding(&self) -> Vec2 {
        self.bg_padding
    }

    #[inline]
    pub fn pos(&self) -> Vec3 {
        self.pos
    }

    #[inline]
    pub fn init_pos(&self) -> Vec3 {
        self.init_pos
    }

    #[inline]
    pub fn style(&self) -> FontStyle {
        self.style
    }

    pub fn stack(&mut self) -> &mut RenderStack<B> {
        &mut *self.stack
    }
}
