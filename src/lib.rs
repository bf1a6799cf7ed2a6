use anyhow::{Context, Result};
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{ImageFormat, RgbImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_hollow_rect_mut, draw_polygon_mut};
use imageproc::point::Point;
use imageproc::rect::Rect;
use log::{debug, info, warn};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

pub mod fonts;
pub mod layout;
pub mod location;

pub use fonts::{Face, FontSet, TextMetrics};
pub use layout::Layout;
pub use location::{FontRole, LocationInfo, TextRow};

// --- compass ---

/// Needle triangle as (tip, left base, right base) for an angle in degrees
/// clockwise from north. The base points sit `half_width` either side of the
/// center along `(cos θ, sin θ)`.
pub fn needle_points(
    center: (f32, f32),
    length: f32,
    half_width: f32,
    angle_deg: f64,
) -> [(f32, f32); 3] {
    let theta = angle_deg.to_radians();
    let (sin, cos) = (theta.sin() as f32, theta.cos() as f32);
    let (cx, cy) = center;

    let tip = (cx + length * sin, cy - length * cos);
    let left = (cx - half_width * cos, cy - half_width * sin);
    let right = (cx + half_width * cos, cy + half_width * sin);
    [tip, left, right]
}

fn draw_compass(canvas: &mut RgbImage, layout: &Layout, label_face: &Face, angle_deg: f64) {
    let (cx, cy) = layout.compass_center();
    let radius = layout.compass_size / 2;
    draw_filled_circle_mut(canvas, (cx, cy), radius, layout.compass_outline);
    draw_filled_circle_mut(
        canvas,
        (cx, cy),
        radius - layout.compass_outline_width,
        layout.compass_fill,
    );

    let points = needle_points(
        (cx as f32, cy as f32),
        layout.needle_length,
        layout.needle_half_width,
        angle_deg,
    )
    .map(|(x, y)| Point::new(x.round() as i32, y.round() as i32));
    if points[0] != points[2] {
        draw_polygon_mut(canvas, &points, layout.needle_color);
    }

    let (left, top, size) = (layout.compass_x, layout.compass_y, layout.compass_size);
    let labels = [
        ("N", cx - 8, top - 2),
        ("S", cx - 8, top + size - 20),
        ("E", left + size + 5, cy - 10),
        ("W", left - 20, cy - 10),
    ];
    for (label, x, y) in labels {
        label_face.draw(canvas, x, y, label, layout.compass_label_color);
    }
}

// --- map thumbnail ---

/// Loads the map thumbnail stretched to the layout's map size, or a flat
/// placeholder when there is no usable file.
pub fn map_thumbnail(map: Option<&Path>, layout: &Layout) -> RgbImage {
    let placeholder =
        || RgbImage::from_pixel(layout.map_width, layout.map_height, layout.map_placeholder);

    let Some(path) = map.filter(|p| p.exists()) else {
        debug!("no map file, using placeholder");
        return placeholder();
    };

    match image::open(path) {
        Ok(img) => img
            .resize_exact(layout.map_width, layout.map_height, FilterType::CatmullRom)
            .to_rgb8(),
        Err(e) => {
            warn!("could not read map {}: {e}; using placeholder", path.display());
            placeholder()
        }
    }
}

fn draw_map(canvas: &mut RgbImage, layout: &Layout, thumbnail: &RgbImage) {
    let (x, y) = layout.map_origin(canvas.height());
    image::imageops::replace(canvas, thumbnail, x as i64, y as i64);

    // Border box spans [x - gap, x + w + gap] inclusive and grows inward.
    let gap = layout.map_border_gap;
    let outer_w = layout.map_width as i32 + 2 * gap + 1;
    let outer_h = layout.map_height as i32 + 2 * gap + 1;
    for i in 0..layout.map_border_width {
        let (w, h) = (outer_w - 2 * i, outer_h - 2 * i);
        if w <= 0 || h <= 0 {
            break;
        }
        let rect = Rect::at(x - gap + i, y - gap + i).of_size(w as u32, h as u32);
        draw_hollow_rect_mut(canvas, rect, layout.map_border);
    }
}

// --- right-aligned text block ---

/// One row of the text block with its resolved position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlacedLine {
    pub text: String,
    pub role: FontRole,
    pub x: i32,
    pub y: i32,
    pub metrics: TextMetrics,
}

/// Positions every row so its right edge sits on the text margin. Each row
/// starts below the previous one by that row's measured height plus the gap.
pub fn layout_text_block(
    info: &LocationInfo,
    fonts: &FontSet,
    layout: &Layout,
    image_width: u32,
    image_height: u32,
) -> Vec<PlacedLine> {
    let (right, mut y) = layout.text_anchor(image_width, image_height);
    info.text_rows()
        .into_iter()
        .map(|row| {
            let metrics = fonts.for_role(row.role).measure(&row.text);
            let line = PlacedLine {
                text: row.text,
                role: row.role,
                x: right - metrics.width,
                y,
                metrics,
            };
            y += metrics.height + layout.text_line_gap;
            line
        })
        .collect()
}

fn draw_text_block(canvas: &mut RgbImage, layout: &Layout, fonts: &FontSet, lines: &[PlacedLine]) {
    let (dx, dy) = layout.shadow_offset;
    for line in lines {
        debug!("text row {:?} at ({}, {})", line.text, line.x, line.y);
        let face = fonts.for_role(line.role);
        face.draw(canvas, line.x + dx, line.y + dy, &line.text, layout.shadow_color);
        face.draw(canvas, line.x, line.y, &line.text, layout.text_color);
    }
}

// --- encoding ---

/// Writes `img` to `path` in the format implied by its extension. JPEG output
/// uses the given quality.
pub fn save_image(img: &RgbImage, path: &Path, quality: u8) -> Result<()> {
    let format = ImageFormat::from_path(path)
        .with_context(|| format!("Unsupported output format: {}", path.display()))?;

    if format == ImageFormat::Jpeg {
        let file = File::create(path)
            .with_context(|| format!("Failed to create output image: {}", path.display()))?;
        let mut writer = BufWriter::new(file);
        JpegEncoder::new_with_quality(&mut writer, quality)
            .encode_image(img)
            .with_context(|| format!("Failed to encode output image: {}", path.display()))?;
        writer
            .flush()
            .with_context(|| format!("Failed to save output image: {}", path.display()))?;
    } else {
        img.save_with_format(path, format)
            .with_context(|| format!("Failed to save output image: {}", path.display()))?;
    }
    Ok(())
}

// --- annotator ---

/// Draws the compass, map and text overlays with one layout and font set.
#[derive(Debug, Clone)]
pub struct Annotator {
    layout: Layout,
    fonts: FontSet,
}

impl Annotator {
    pub fn new(fonts: FontSet) -> Self {
        Self {
            layout: Layout::default(),
            fonts,
        }
    }

    /// Resolves `font` through the usual font search, falling back to the built-in font.
    pub fn with_font_file(font: &Path) -> Self {
        Self::new(FontSet::resolve(font))
    }

    pub fn with_layout(mut self, layout: Layout) -> Self {
        self.layout = layout;
        self
    }

    pub fn fonts(&self) -> &FontSet {
        &self.fonts
    }

    /// Draws every overlay onto `canvas` in place.
    pub fn render(&self, canvas: &mut RgbImage, info: &LocationInfo, map: Option<&Path>) {
        draw_compass(canvas, &self.layout, &self.fonts.compass, info.compass_angle());

        let thumbnail = map_thumbnail(map, &self.layout);
        draw_map(canvas, &self.layout, &thumbnail);

        let (w, h) = canvas.dimensions();
        let lines = layout_text_block(info, &self.fonts, &self.layout, w, h);
        draw_text_block(canvas, &self.layout, &self.fonts, &lines);
    }

    /// Loads `source`, draws the overlays and writes the result to `output`.
    pub fn annotate(
        &self,
        source: &Path,
        output: &Path,
        info: &LocationInfo,
        map: Option<&Path>,
    ) -> Result<()> {
        let mut canvas = image::open(source)
            .with_context(|| format!("Failed to open input image: {}", source.display()))?
            .to_rgb8();

        self.render(&mut canvas, info, map);

        save_image(&canvas, output, self.layout.jpeg_quality)?;
        info!("annotated {} -> {}", source.display(), output.display());
        Ok(())
    }

    /// Same as [`Annotator::annotate`] for encoded image bytes (png/jpg/webp/etc),
    /// returning JPEG bytes.
    pub fn annotate_encoded_bytes(
        &self,
        input: &[u8],
        info: &LocationInfo,
        map: Option<&Path>,
    ) -> Result<Vec<u8>> {
        let mut canvas = image::load_from_memory(input)
            .context("Failed to decode input bytes as an image")?
            .to_rgb8();

        self.render(&mut canvas, info, map);

        let mut out: Vec<u8> = Vec::new();
        JpegEncoder::new_with_quality(&mut out, self.layout.jpeg_quality)
            .encode_image(&canvas)
            .context("Failed to encode output JPEG")?;
        Ok(out)
    }
}

/// Annotates `source` into `output` using the stock layout and the default font file.
pub fn annotate(
    source: &Path,
    output: &Path,
    info: &LocationInfo,
    map: Option<&Path>,
) -> Result<()> {
    Annotator::with_font_file(Path::new(layout::FONT_FILE)).annotate(source, output, info, map)
}
