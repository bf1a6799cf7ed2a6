use ab_glyph::{point, Font, FontArc, FontVec, PxScale, ScaleFont};
use font8x8::{UnicodeFonts, BASIC_FONTS, LATIN_FONTS};
use image::{Rgb, RgbImage};
use log::debug;
use std::ffi::OsStr;
use std::path::Path;

use crate::layout::{FONT_SIZE_COMPASS, FONT_SIZE_MAIN, FONT_SIZE_SECONDARY};
use crate::location::FontRole;

const BITMAP_CELL: u32 = 8;

/// Size of the inked area of a rendered string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TextMetrics {
    pub width: i32,
    pub height: i32,
}

#[derive(Clone)]
enum Typeface {
    TrueType(FontArc),
    Bitmap,
}

/// A typeface at one pixel size.
#[derive(Clone)]
pub struct Face {
    typeface: Typeface,
    size: f32,
}

impl std::fmt::Debug for Face {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kind = match self.typeface {
            Typeface::TrueType(_) => "truetype",
            Typeface::Bitmap => "bitmap",
        };
        f.debug_struct("Face")
            .field("kind", &kind)
            .field("size", &self.size)
            .finish()
    }
}

impl Face {
    fn truetype(font: FontArc, size: f32) -> Self {
        Self {
            typeface: Typeface::TrueType(font),
            size,
        }
    }

    /// The fixed-size 8x8 font compiled into the binary.
    pub fn bitmap() -> Self {
        Self {
            typeface: Typeface::Bitmap,
            size: BITMAP_CELL as f32,
        }
    }

    pub fn is_bitmap(&self) -> bool {
        matches!(self.typeface, Typeface::Bitmap)
    }

    pub fn size(&self) -> f32 {
        self.size
    }

    pub fn measure(&self, text: &str) -> TextMetrics {
        match &self.typeface {
            Typeface::TrueType(font) => measure_truetype(font, self.size, text),
            Typeface::Bitmap => {
                let chars = text.chars().count() as i32;
                if chars == 0 {
                    return TextMetrics::default();
                }
                TextMetrics {
                    width: chars * BITMAP_CELL as i32,
                    height: BITMAP_CELL as i32,
                }
            }
        }
    }

    /// Draws `text` with its layout box's top-left corner at (x, y). Pixels
    /// outside the canvas are clipped.
    pub fn draw(&self, canvas: &mut RgbImage, x: i32, y: i32, text: &str, color: Rgb<u8>) {
        match &self.typeface {
            Typeface::TrueType(font) => {
                imageproc::drawing::draw_text_mut(
                    canvas,
                    color,
                    x,
                    y,
                    PxScale::from(self.size),
                    font,
                    text,
                );
            }
            Typeface::Bitmap => draw_bitmap(canvas, x, y, text, color),
        }
    }
}

fn measure_truetype(font: &FontArc, size: f32, text: &str) -> TextMetrics {
    let scale = PxScale::from(size);
    let scaled = font.as_scaled(scale);

    let mut caret = 0.0f32;
    let mut prev = None;
    let mut bounds: Option<(f32, f32, f32, f32)> = None;

    for c in text.chars() {
        let id = scaled.glyph_id(c);
        if let Some(prev) = prev {
            caret += scaled.kern(prev, id);
        }
        let glyph = id.with_scale_and_position(scale, point(caret, scaled.ascent()));
        caret += scaled.h_advance(id);
        prev = Some(id);

        if let Some(outlined) = font.outline_glyph(glyph) {
            let bb = outlined.px_bounds();
            bounds = Some(match bounds {
                None => (bb.min.x, bb.min.y, bb.max.x, bb.max.y),
                Some((x0, y0, x1, y1)) => (
                    x0.min(bb.min.x),
                    y0.min(bb.min.y),
                    x1.max(bb.max.x),
                    y1.max(bb.max.y),
                ),
            });
        }
    }

    match bounds {
        Some((x0, y0, x1, y1)) => TextMetrics {
            width: (x1 - x0).ceil() as i32,
            height: (y1 - y0).ceil() as i32,
        },
        // whitespace only
        None => TextMetrics {
            width: caret.ceil() as i32,
            height: 0,
        },
    }
}

fn bitmap_glyph(c: char) -> [u8; 8] {
    BASIC_FONTS
        .get(c)
        .or_else(|| LATIN_FONTS.get(c))
        .or_else(|| BASIC_FONTS.get('?'))
        .unwrap_or([0; 8])
}

fn draw_bitmap(canvas: &mut RgbImage, x: i32, y: i32, text: &str, color: Rgb<u8>) {
    let (w, h) = canvas.dimensions();
    for (i, c) in text.chars().enumerate() {
        let left = x + i as i32 * BITMAP_CELL as i32;
        for (row, bits) in bitmap_glyph(c).iter().enumerate() {
            for col in 0..BITMAP_CELL {
                if bits & (1 << col) == 0 {
                    continue;
                }
                let px = left + col as i32;
                let py = y + row as i32;
                if px < 0 || py < 0 || px >= w as i32 || py >= h as i32 {
                    continue;
                }
                canvas.put_pixel(px as u32, py as u32, color);
            }
        }
    }
}

/// The three faces the annotator draws with.
#[derive(Debug, Clone)]
pub struct FontSet {
    pub main: Face,
    pub secondary: Face,
    pub compass: Face,
}

impl FontSet {
    pub fn builtin() -> Self {
        Self {
            main: Face::bitmap(),
            secondary: Face::bitmap(),
            compass: Face::bitmap(),
        }
    }

    /// Looks up `font` and loads it at the three stock sizes. Falls back to the
    /// built-in bitmap font for every role when the file cannot be found or parsed.
    pub fn resolve(font: &Path) -> Self {
        match load_font(font) {
            Some(font) => Self {
                main: Face::truetype(font.clone(), FONT_SIZE_MAIN),
                secondary: Face::truetype(font.clone(), FONT_SIZE_SECONDARY),
                compass: Face::truetype(font, FONT_SIZE_COMPASS),
            },
            None => {
                debug!("font {} unavailable, using built-in bitmap font", font.display());
                Self::builtin()
            }
        }
    }

    pub fn for_role(&self, role: FontRole) -> &Face {
        match role {
            FontRole::Main => &self.main,
            FontRole::Secondary => &self.secondary,
        }
    }
}

fn face_file_name(face: &fontdb::FaceInfo) -> Option<&OsStr> {
    match &face.source {
        fontdb::Source::File(path) | fontdb::Source::SharedFile(path, _) => path.file_name(),
        _ => None,
    }
}

fn normalized(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Picks a face for `font`: first by file name, then by family name taken from
/// the file stem (`arial.ttf` matches the `Arial` family).
fn find_face(db: &fontdb::Database, font: &Path) -> Option<fontdb::ID> {
    let file_name = font.file_name()?;
    if let Some(face) = db.faces().find(|face| {
        face_file_name(face).is_some_and(|name| name.eq_ignore_ascii_case(file_name))
    }) {
        return Some(face.id);
    }

    let family = font.file_stem()?.to_str()?;
    let query = fontdb::Query {
        families: &[fontdb::Family::Name(family)],
        ..fontdb::Query::default()
    };
    if let Some(id) = db.query(&query) {
        return Some(id);
    }

    let wanted = normalized(family);
    db.faces()
        .find(|face| face.families.iter().any(|(name, _)| normalized(name) == wanted))
        .map(|face| face.id)
}

fn load_font(font: &Path) -> Option<FontArc> {
    let mut db = fontdb::Database::new();
    if font.is_file() {
        if let Err(e) = db.load_font_file(font) {
            debug!("could not read font {}: {e}", font.display());
        }
    }
    db.load_system_fonts();

    let id = find_face(&db, font)?;
    let parsed = db.with_face_data(id, |data, index| {
        FontVec::try_from_vec_and_index(data.to_vec(), index).map(FontArc::new)
    })?;
    match parsed {
        Ok(parsed) => {
            debug!("loaded font {:?} for {}", id, font.display());
            Some(parsed)
        }
        Err(e) => {
            debug!("ignoring font for {}: {e}", font.display());
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blocks_font() -> std::path::PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/blocks.ttf")
    }

    #[test]
    fn missing_font_falls_back() {
        let fonts = FontSet::resolve(Path::new("definitely-not-a-font-7c1e.ttf"));
        assert!(fonts.main.is_bitmap());
        assert!(fonts.secondary.is_bitmap());
        assert!(fonts.compass.is_bitmap());
    }

    #[test]
    fn garbage_font_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.ttf");
        std::fs::write(&path, b"not a truetype file").unwrap();

        let fonts = FontSet::resolve(&path);
        assert!(fonts.main.is_bitmap());
    }

    #[test]
    fn bitmap_metrics() {
        let face = Face::bitmap();
        assert_eq!(TextMetrics { width: 72, height: 8 }, face.measure("Test Site"));
        assert_eq!(TextMetrics::default(), face.measure(""));
    }

    #[test]
    fn bitmap_draw_clips_and_inks() {
        let mut canvas = RgbImage::new(16, 8);
        let white = Rgb([255, 255, 255]);
        Face::bitmap().draw(&mut canvas, -4, 0, "NN", white);
        Face::bitmap().draw(&mut canvas, 100, 100, "N", white);
        assert!(canvas.pixels().any(|p| *p == white));
    }

    #[test]
    fn degree_sign_has_a_glyph() {
        assert_ne!([0; 8], bitmap_glyph('°'));
    }

    #[test]
    fn literal_font_file_loads_at_stock_sizes() {
        let fonts = FontSet::resolve(&blocks_font());
        assert!(!fonts.main.is_bitmap());
        assert!(!fonts.compass.is_bitmap());
        assert_eq!(32.0, fonts.main.size());
        assert_eq!(28.0, fonts.secondary.size());
        assert_eq!(18.0, fonts.compass.size());
    }

    #[test]
    fn faces_match_by_file_name_or_family() {
        let mut db = fontdb::Database::new();
        db.load_font_file(blocks_font()).unwrap();

        assert!(find_face(&db, Path::new("BLOCKS.TTF")).is_some());
        assert!(find_face(&db, Path::new("Geostamp Blocks")).is_some());
        assert!(find_face(&db, Path::new("geostampblocks.ttf")).is_some());
        assert!(find_face(&db, Path::new("arial.ttf")).is_none());
    }

    #[test]
    fn truetype_metrics_follow_ink() {
        let face = FontSet::resolve(&blocks_font()).main;

        // one box glyph is 500x700 units on a 1000-unit em, 16x22.4px at 32px
        let one = face.measure("I");
        assert!((15..=18).contains(&one.width), "{one:?}");
        assert!((22..=24).contains(&one.height), "{one:?}");
        assert!(face.measure("II").width > one.width);
        assert_eq!(0, face.measure(" ").height);
    }

    #[test]
    fn truetype_draw_inks_inside_the_box() {
        let face = FontSet::resolve(&blocks_font()).main;
        let white = Rgb([255, 255, 255]);
        let mut canvas = RgbImage::new(80, 40);
        face.draw(&mut canvas, 10, 5, "I", white);

        // box spans roughly x 11..28, y 8..31
        assert!(canvas.get_pixel(19, 19)[0] > 200);
        assert_eq!(Rgb([0, 0, 0]), *canvas.get_pixel(60, 19));
    }
}
