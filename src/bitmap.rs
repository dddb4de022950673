//! Conversion of decoded pixel rows into the printer's monochrome raster.
//!
//! The printer feeds paper along the image's horizontal axis, so the packed
//! bitmap is the transpose of the source: source column `x` becomes scan
//! line `x`, and source row `y` becomes bit `y` within that scan line.

use std::io::Read;

use log::debug;

use crate::error::Error;

/// Cutoff applied when none is given on the command line.
pub const DEFAULT_CUTOFF: u8 = 180;

/// Pixel layouts the transcoder accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelFormat {
    /// One bit per pixel, 8 pixels per byte, MSB first. A 0 bit is dark.
    Mono1,
    /// Four 8-bit channels per pixel: red, green, blue, alpha.
    Rgba8,
}

/// Pixel rows as produced by the image decoder.
#[derive(Debug, Clone)]
pub struct DecodedImage {
    width: u32,
    height: u32,
    channels: u8,
    bit_depth: u8,
    row_stride: usize,
    data: Vec<u8>,
}

impl DecodedImage {
    /// Wrap raw decoder output.
    ///
    /// Rows are expected back to back, each padded to a whole byte as PNG
    /// scanlines are.
    pub fn new(
        width: u32,
        height: u32,
        channels: u8,
        bit_depth: u8,
        data: Vec<u8>,
    ) -> Result<Self, Error> {
        let row_bits = width as usize * channels as usize * bit_depth as usize;
        let row_stride = (row_bits + 7) / 8;
        let expected = row_stride * height as usize;

        if data.len() < expected {
            return Err(Error::TruncatedImage {
                expected,
                actual: data.len(),
            });
        }

        Ok(DecodedImage {
            width,
            height,
            channels,
            bit_depth,
            row_stride,
            data,
        })
    }

    /// Decode a PNG stream without any colour transformation.
    ///
    /// 1-bit images stay packed, so mono input is read with the same bit
    /// convention it was stored with.
    pub fn read_png<R: Read>(reader: R) -> Result<Self, Error> {
        let mut decoder = png::Decoder::new(reader);
        decoder.set_transformations(png::Transformations::IDENTITY);
        let mut reader = decoder.read_info()?;

        let mut buf = vec![0; reader.output_buffer_size()];
        let frame = reader.next_frame(&mut buf)?;
        buf.truncate(frame.buffer_size());

        debug!(
            "Decoded PNG {}x{} {:?} {:?}",
            frame.width, frame.height, frame.color_type, frame.bit_depth
        );

        Self::new(
            frame.width,
            frame.height,
            frame.color_type.samples() as u8,
            frame.bit_depth as u8,
            buf,
        )
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Classify the channel and bit depth combination.
    pub fn format(&self) -> Result<PixelFormat, Error> {
        match (self.channels, self.bit_depth) {
            (1, 1) => Ok(PixelFormat::Mono1),
            (4, 8) => Ok(PixelFormat::Rgba8),
            (channels, bit_depth) => Err(Error::UnsupportedFormat {
                channels,
                bit_depth,
            }),
        }
    }

    fn rows(&self) -> impl Iterator<Item = &[u8]> {
        let stride = self.row_stride;
        (0..self.height as usize).map(move |y| &self.data[y * stride..(y + 1) * stride])
    }
}

/// Monochrome bit matrix in printer coordinates.
///
/// Each scan line occupies `line_bytes` bytes; bit `col` of line `row` lives
/// in byte `col / 8` at mask `0x80 >> (col % 8)`. A set bit heats the
/// corresponding dot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackedBitmap {
    width: usize,
    height: usize,
    line_bytes: usize,
    data: Vec<u8>,
}

impl PackedBitmap {
    /// Zero-filled bitmap of `height` scan lines, `width` dots each.
    pub fn new(width: usize, height: usize) -> Self {
        let line_bytes = (width + 7) / 8;
        PackedBitmap {
            width,
            height,
            line_bytes,
            data: vec![0; line_bytes * height],
        }
    }

    /// Dots per scan line.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Number of scan lines.
    pub fn height(&self) -> usize {
        self.height
    }

    pub fn line_bytes(&self) -> usize {
        self.line_bytes
    }

    /// Mark dot `col` of scan line `row`.
    ///
    /// # Panics
    /// Panics if the position lies outside the bitmap.
    pub fn set_bit(&mut self, row: usize, col: usize) {
        assert!(
            row < self.height && col < self.width,
            "bit ({}, {}) outside {}x{} bitmap",
            row,
            col,
            self.width,
            self.height
        );
        self.data[row * self.line_bytes + col / 8] |= 0x80 >> (col % 8);
    }

    pub fn bit(&self, row: usize, col: usize) -> bool {
        if row >= self.height || col >= self.width {
            return false;
        }
        self.data[row * self.line_bytes + col / 8] & (0x80 >> (col % 8)) != 0
    }

    pub fn line(&self, row: usize) -> &[u8] {
        &self.data[row * self.line_bytes..(row + 1) * self.line_bytes]
    }

    pub fn lines(&self) -> impl Iterator<Item = &[u8]> {
        (0..self.height).map(move |row| self.line(row))
    }

    /// Render the bitmap as text, one line per scan line, `#` for heated dots.
    pub fn preview(&self) -> String {
        let mut out = String::with_capacity((self.width + 1) * self.height);
        for row in 0..self.height {
            for col in 0..self.width {
                out.push(if self.bit(row, col) { '#' } else { ' ' });
            }
            out.push('\n');
        }
        out
    }
}

/// Convert decoded pixels into a transposed, packed bitmap.
///
/// Mono pixels are marked when their bit is 0 and ignore `cutoff`. RGBA
/// pixels are marked when any of red, green or blue is below `cutoff`;
/// alpha is ignored. This is a per-channel test, not a luminance one.
pub fn transcode(image: &DecodedImage, cutoff: u8) -> Result<PackedBitmap, Error> {
    let format = image.format()?;
    let width = image.width() as usize;
    let mut bitmap = PackedBitmap::new(image.height() as usize, width);

    debug!("Transcoding {:?} image with cutoff {}", format, cutoff);

    for (y, row) in image.rows().enumerate() {
        for x in 0..width {
            let mark = match format {
                PixelFormat::Mono1 => row[x / 8] & (0x80 >> (x % 8)) == 0,
                PixelFormat::Rgba8 => row[x * 4..x * 4 + 3].iter().any(|&c| c < cutoff),
            };
            if mark {
                bitmap.set_bit(x, y);
            }
        }
    }

    Ok(bitmap)
}

/// Reject cutoffs that would blank or blacken the whole label.
pub fn validate_cutoff(cutoff: i64) -> Result<u8, Error> {
    if cutoff <= 0 || cutoff >= 255 {
        return Err(Error::InvalidCutoff(cutoff.to_string()));
    }
    Ok(cutoff as u8)
}

/// Parse and validate a cutoff given as text.
pub fn parse_cutoff(value: &str) -> Result<u8, Error> {
    let cutoff = value
        .trim()
        .parse::<i64>()
        .map_err(|_| Error::InvalidCutoff(value.to_string()))?;
    validate_cutoff(cutoff)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mono(width: u32, rows: &[&[u8]]) -> DecodedImage {
        let data = rows.concat();
        DecodedImage::new(width, rows.len() as u32, 1, 1, data).unwrap()
    }

    fn rgba(width: u32, pixels: &[[u8; 4]]) -> DecodedImage {
        let height = pixels.len() as u32 / width;
        let data = pixels.iter().flatten().copied().collect();
        DecodedImage::new(width, height, 4, 8, data).unwrap()
    }

    #[test]
    fn set_bit_is_msb_first() {
        let mut bitmap = PackedBitmap::new(12, 2);
        assert_eq!(bitmap.line_bytes(), 2);

        bitmap.set_bit(0, 0);
        bitmap.set_bit(1, 9);
        assert_eq!(bitmap.line(0), &[0x80, 0x00]);
        assert_eq!(bitmap.line(1), &[0x00, 0x40]);
        assert!(bitmap.bit(1, 9));
        assert!(!bitmap.bit(1, 8));
        assert!(!bitmap.bit(5, 0));
    }

    #[test]
    #[should_panic]
    fn set_bit_outside_panics() {
        PackedBitmap::new(8, 1).set_bit(0, 8);
    }

    #[test]
    fn mono_marks_zero_bits_and_transposes() {
        // 2x2: row 0 = [0, 1], row 1 = [1, 0]
        let image = mono(2, &[&[0b0100_0000], &[0b1000_0000]]);
        let bitmap = transcode(&image, 1).unwrap();

        assert_eq!(bitmap.width(), 2);
        assert_eq!(bitmap.height(), 2);
        assert!(bitmap.bit(0, 0));
        assert!(!bitmap.bit(0, 1));
        assert!(!bitmap.bit(1, 0));
        assert!(bitmap.bit(1, 1));
        assert_eq!(bitmap.line(0), &[0x80]);
        assert_eq!(bitmap.line(1), &[0x40]);
    }

    #[test]
    fn mono_ignores_cutoff() {
        let image = mono(8, &[&[0x0F], &[0xF0], &[0xAA]]);
        assert_eq!(
            transcode(&image, 1).unwrap(),
            transcode(&image, 254).unwrap()
        );
    }

    #[test]
    fn mono_ignores_padding_bits() {
        let image = mono(3, &[&[0b1110_0000]]);
        let bitmap = transcode(&image, 180).unwrap();
        assert_eq!(bitmap.height(), 3);
        assert!(bitmap.lines().all(|line| line == [0x00]));
    }

    #[test]
    fn dimensions_are_swapped() {
        let image = rgba(5, &[[255; 4]; 15]);
        let bitmap = transcode(&image, 180).unwrap();
        assert_eq!(bitmap.width(), 3);
        assert_eq!(bitmap.height(), 5);
        assert_eq!(bitmap.line_bytes(), 1);
    }

    #[test]
    fn any_dark_channel_marks_pixel() {
        let pixels = [
            [10, 255, 255, 255],
            [255, 10, 255, 255],
            [255, 255, 10, 255],
            [255, 255, 255, 0],
        ];
        let bitmap = transcode(&rgba(4, &pixels), 180).unwrap();
        assert!(bitmap.bit(0, 0));
        assert!(bitmap.bit(1, 0));
        assert!(bitmap.bit(2, 0));
        assert!(!bitmap.bit(3, 0), "alpha must be ignored");
    }

    #[test]
    fn cutoff_is_strictly_less_than() {
        let pixels = [
            [0, 200, 200, 255],
            [1, 1, 1, 255],
            [253, 253, 253, 255],
            [254, 254, 254, 255],
        ];

        let low = transcode(&rgba(4, &pixels), 1).unwrap();
        assert!(low.bit(0, 0));
        assert!(!low.bit(1, 0));
        assert!(!low.bit(2, 0));

        let high = transcode(&rgba(4, &pixels), 254).unwrap();
        assert!(high.bit(0, 0));
        assert!(high.bit(1, 0));
        assert!(high.bit(2, 0));
        assert!(!high.bit(3, 0));
    }

    #[test]
    fn rgba_pixel_lands_at_transposed_position() {
        let mut pixels = vec![[255u8; 4]; 3 * 10];
        // x = 2, y = 9
        pixels[9 * 3 + 2] = [0, 0, 0, 255];
        let bitmap = transcode(&rgba(3, &pixels), 128).unwrap();

        assert_eq!(bitmap.width(), 10);
        assert_eq!(bitmap.line_bytes(), 2);
        assert_eq!(bitmap.line(2), &[0x00, 0x40]);
        assert_eq!(bitmap.line(0), &[0x00, 0x00]);
    }

    #[test]
    fn unsupported_formats_are_rejected() {
        let rgb = DecodedImage::new(1, 1, 3, 8, vec![0; 3]).unwrap();
        match transcode(&rgb, 180) {
            Err(Error::UnsupportedFormat {
                channels: 3,
                bit_depth: 8,
            }) => (),
            other => panic!("unexpected result {:?}", other),
        }

        let gray16 = DecodedImage::new(1, 1, 1, 16, vec![0; 2]).unwrap();
        assert!(matches!(
            transcode(&gray16, 180),
            Err(Error::UnsupportedFormat { .. })
        ));
    }

    #[test]
    fn short_buffer_is_rejected() {
        match DecodedImage::new(9, 2, 1, 1, vec![0; 3]) {
            Err(Error::TruncatedImage {
                expected: 4,
                actual: 3,
            }) => (),
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[test]
    fn cutoff_bounds() {
        assert!(matches!(validate_cutoff(0), Err(Error::InvalidCutoff(_))));
        assert!(matches!(validate_cutoff(255), Err(Error::InvalidCutoff(_))));
        assert!(matches!(validate_cutoff(-3), Err(Error::InvalidCutoff(_))));
        assert_eq!(validate_cutoff(1).unwrap(), 1);
        assert_eq!(validate_cutoff(254).unwrap(), 254);
    }

    #[test]
    fn cutoff_parsing() {
        assert_eq!(parse_cutoff("180").unwrap(), 180);
        assert_eq!(parse_cutoff(" 80 ").unwrap(), 80);
        assert!(matches!(parse_cutoff("0"), Err(Error::InvalidCutoff(_))));
        assert!(matches!(parse_cutoff("1000"), Err(Error::InvalidCutoff(_))));
        match parse_cutoff("dark") {
            Err(Error::InvalidCutoff(value)) => assert_eq!(value, "dark"),
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[test]
    fn preview_draws_marked_dots() {
        let mut bitmap = PackedBitmap::new(3, 2);
        bitmap.set_bit(0, 0);
        bitmap.set_bit(1, 2);
        assert_eq!(bitmap.preview(), "#  \n  #\n");
    }
}
