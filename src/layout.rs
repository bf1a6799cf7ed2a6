use image::Rgb;

// --- compass ---

pub const COMPASS_X: i32 = 30;
pub const COMPASS_Y: i32 = 30;
pub const COMPASS_SIZE: i32 = 120;
pub const COMPASS_OUTLINE_WIDTH: i32 = 4;
pub const NEEDLE_LENGTH: f32 = (COMPASS_SIZE / 2 - 10) as f32;
pub const NEEDLE_HALF_WIDTH: f32 = 5.0;

pub const COMPASS_OUTLINE: Rgb<u8> = Rgb([100, 100, 100]);
pub const COMPASS_FILL: Rgb<u8> = Rgb([230, 230, 200]);
pub const NEEDLE_COLOR: Rgb<u8> = Rgb([100, 180, 255]);
pub const COMPASS_LABEL_COLOR: Rgb<u8> = Rgb([60, 60, 60]);

// --- map thumbnail ---

pub const MAP_WIDTH: u32 = 250;
pub const MAP_HEIGHT: u32 = 180;
pub const MAP_MARGIN_LEFT: i32 = 30;
pub const MAP_MARGIN_BOTTOM: i32 = 30;
pub const MAP_PLACEHOLDER: Rgb<u8> = Rgb([200, 220, 200]);
pub const MAP_BORDER: Rgb<u8> = Rgb([255, 255, 255]);
pub const MAP_BORDER_WIDTH: i32 = 3;
pub const MAP_BORDER_GAP: i32 = 2;

// --- text block ---

pub const TEXT_START_FROM_BOTTOM: i32 = 350;
pub const TEXT_MARGIN_RIGHT: i32 = 50;
pub const TEXT_LINE_GAP: i32 = 5;
pub const SHADOW_OFFSET: (i32, i32) = (2, 2);
pub const TEXT_COLOR: Rgb<u8> = Rgb([255, 255, 255]);
pub const SHADOW_COLOR: Rgb<u8> = Rgb([0, 0, 0]);

// --- fonts and output ---

pub const FONT_FILE: &str = "arial.ttf";
pub const FONT_SIZE_MAIN: f32 = 32.0;
pub const FONT_SIZE_SECONDARY: f32 = 28.0;
pub const FONT_SIZE_COMPASS: f32 = 18.0;
pub const JPEG_QUALITY: u8 = 95;

/// Fixed pixel layout of every overlay. `Default` yields the stock layout.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Layout {
    pub compass_x: i32,
    pub compass_y: i32,
    pub compass_size: i32,
    pub compass_outline_width: i32,
    pub needle_length: f32,
    pub needle_half_width: f32,
    pub compass_outline: Rgb<u8>,
    pub compass_fill: Rgb<u8>,
    pub needle_color: Rgb<u8>,
    pub compass_label_color: Rgb<u8>,

    pub map_width: u32,
    pub map_height: u32,
    pub map_margin_left: i32,
    pub map_margin_bottom: i32,
    pub map_placeholder: Rgb<u8>,
    pub map_border: Rgb<u8>,
    pub map_border_width: i32,
    pub map_border_gap: i32,

    pub text_start_from_bottom: i32,
    pub text_margin_right: i32,
    pub text_line_gap: i32,
    pub shadow_offset: (i32, i32),
    pub text_color: Rgb<u8>,
    pub shadow_color: Rgb<u8>,

    pub jpeg_quality: u8,
}

impl Default for Layout {
    fn default() -> Self {
        Self {
            compass_x: COMPASS_X,
            compass_y: COMPASS_Y,
            compass_size: COMPASS_SIZE,
            compass_outline_width: COMPASS_OUTLINE_WIDTH,
            needle_length: NEEDLE_LENGTH,
            needle_half_width: NEEDLE_HALF_WIDTH,
            compass_outline: COMPASS_OUTLINE,
            compass_fill: COMPASS_FILL,
            needle_color: NEEDLE_COLOR,
            compass_label_color: COMPASS_LABEL_COLOR,

            map_width: MAP_WIDTH,
            map_height: MAP_HEIGHT,
            map_margin_left: MAP_MARGIN_LEFT,
            map_margin_bottom: MAP_MARGIN_BOTTOM,
            map_placeholder: MAP_PLACEHOLDER,
            map_border: MAP_BORDER,
            map_border_width: MAP_BORDER_WIDTH,
            map_border_gap: MAP_BORDER_GAP,

            text_start_from_bottom: TEXT_START_FROM_BOTTOM,
            text_margin_right: TEXT_MARGIN_RIGHT,
            text_line_gap: TEXT_LINE_GAP,
            shadow_offset: SHADOW_OFFSET,
            text_color: TEXT_COLOR,
            shadow_color: SHADOW_COLOR,

            jpeg_quality: JPEG_QUALITY,
        }
    }
}

impl Layout {
    /// Center of the compass dial.
    pub fn compass_center(&self) -> (i32, i32) {
        (
            self.compass_x + self.compass_size / 2,
            self.compass_y + self.compass_size / 2,
        )
    }

    /// Top-left corner of the map thumbnail for an image of the given height.
    pub fn map_origin(&self, image_height: u32) -> (i32, i32) {
        (
            self.map_margin_left,
            image_height as i32 - self.map_height as i32 - self.map_margin_bottom,
        )
    }

    /// Right edge shared by every text line, and the top of the first line.
    pub fn text_anchor(&self, image_width: u32, image_height: u32) -> (i32, i32) {
        (
            image_width as i32 - self.text_margin_right,
            image_height as i32 - self.text_start_from_bottom,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stock_anchors() {
        let layout = Layout::default();
        assert_eq!((90, 90), layout.compass_center());
        assert_eq!(50.0, layout.needle_length);
        assert_eq!((30, 390), layout.map_origin(600));
        assert_eq!((750, 250), layout.text_anchor(800, 600));
    }
}
