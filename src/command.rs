//! Raster command stream for the QL series.
//!
//! A job is framed as
//!
//! ```text
//! ESC @                              initialize
//! ESC i z <flags> <kind> ...         media setup (13 bytes)
//! ESC i K <mode>                     cut type
//! ESC i A <n>                        cut every n labels
//! ESC i d 00 00                      margin
//! g 00 90 <line> <padding>           one per scan line
//! ^Z                                 print
//! ```
//!
//! The whole stream is built in memory so it can be checked before anything
//! reaches the device.

use bitflags::bitflags;
use log::debug;

use crate::{bitmap::PackedBitmap, error::Error, media::Media};

/// Payload size of every raster line frame, one bit per print head dot.
///
/// Shorter lines are zero padded, longer ones are rejected.
pub const FRAME_CAPACITY: usize = crate::PRINT_HEAD_DOTS / 8;

const ESC: u8 = 0x1B;
const MEDIA_CONTINUOUS: u8 = 0x0A;
const MEDIA_DIE_CUT: u8 = 0x0B;
const RASTER_LINE: u8 = 0x67;
const PRINT: u8 = 0x1A;
const PING: u8 = 0x00;
const MARGIN_DOTS: u16 = 0;

bitflags! {
    /// Validity flags of the `ESC i z` print information command.
    pub struct PrintInfo: u8 {
        const KIND = 0b0000_0010;
        const WIDTH = 0b0000_0100;
        const LENGTH = 0b0000_1000;
        /// Undocumented, always set for continuous rolls.
        const LEGACY = 0b0010_0000;
        const QUALITY = 0b0100_0000;
        const RECOVER = 0b1000_0000;
        /// Endless media: width and line count given explicitly.
        const CONTINUOUS =
            Self::RECOVER.bits | Self::LEGACY.bits | Self::WIDTH.bits | Self::KIND.bits;
        /// Die-cut media: addressed by its dimension descriptor.
        const DIE_CUT = Self::LENGTH.bits | Self::WIDTH.bits | Self::KIND.bits;
    }
}

bitflags! {
    /// `ESC i K` expanded mode.
    pub struct ExpandedMode: u8 {
        const CUT_AT_END = 0b0000_1000;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutoCut {
    Enabled(u8),
    Disabled,
}

/// Per-job print settings.
///
/// Defaults: high speed, cutter enabled, one cut per label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrintOptions {
    auto_cut: AutoCut,
    high_quality: bool,
}

impl Default for PrintOptions {
    fn default() -> Self {
        PrintOptions {
            auto_cut: AutoCut::Enabled(1),
            high_quality: false,
        }
    }
}

impl PrintOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Give priority to print quality over speed.
    pub fn high_quality(self, high_quality: bool) -> Self {
        PrintOptions {
            high_quality,
            ..self
        }
    }

    /// Enable the cutter, cutting after every `every` labels.
    pub fn enable_auto_cut(self, every: u8) -> Self {
        PrintOptions {
            auto_cut: AutoCut::Enabled(every),
            ..self
        }
    }

    pub fn disable_auto_cut(self) -> Self {
        PrintOptions {
            auto_cut: AutoCut::Disabled,
            ..self
        }
    }

    pub fn auto_cut(&self) -> AutoCut {
        self.auto_cut
    }

    pub fn is_high_quality(&self) -> bool {
        self.high_quality
    }

    fn expanded_mode(&self) -> ExpandedMode {
        match self.auto_cut {
            AutoCut::Enabled(_) => ExpandedMode::CUT_AT_END,
            AutoCut::Disabled => ExpandedMode::empty(),
        }
    }

    fn auto_cut_num(&self) -> Result<u8, Error> {
        match self.auto_cut {
            AutoCut::Enabled(0) => Err(Error::InvalidConfig(
                "auto cut needs at least 1 label between cuts".to_string(),
            )),
            AutoCut::Enabled(n) => Ok(n),
            AutoCut::Disabled => Ok(1),
        }
    }
}

/// Build the complete command stream for one label.
pub fn encode(
    bitmap: &PackedBitmap,
    media: Media,
    options: &PrintOptions,
) -> Result<Vec<u8>, Error> {
    if bitmap.line_bytes() > FRAME_CAPACITY {
        return Err(Error::LineTooLong {
            line_bytes: bitmap.line_bytes(),
            capacity: FRAME_CAPACITY,
        });
    }
    let auto_cut_num = options.auto_cut_num()?;

    let mut buf: Vec<u8> = Vec::with_capacity(26 + bitmap.height() * (3 + FRAME_CAPACITY));

    initialize(&mut buf);
    set_media(&mut buf, media, options, bitmap.height())?;

    let expanded_mode = options.expanded_mode();
    debug!("Expanded mode: {:X}", expanded_mode.bits());
    debug!("Auto cut num: {:X}", auto_cut_num);
    buf.extend_from_slice(&[ESC, 0x69, 0x4B, expanded_mode.bits()]); // ESC i K : Set expanded mode
    buf.extend_from_slice(&[ESC, 0x69, 0x41, auto_cut_num]); // ESC i A : Set auto cut number

    buf.extend_from_slice(&[ESC, 0x69, 0x64]); // ESC i d : Set margin
    buf.extend_from_slice(&MARGIN_DOTS.to_le_bytes());

    for line in bitmap.lines() {
        raster_line(&mut buf, line);
    }

    buf.push(PRINT);

    debug!(
        "Encoded {} raster lines into {} bytes",
        bitmap.height(),
        buf.len()
    );
    Ok(buf)
}

/// The presence check: a single NUL byte and nothing else.
pub fn encode_ping() -> Vec<u8> {
    vec![PING]
}

fn initialize(buf: &mut Vec<u8>) {
    buf.extend_from_slice(&[ESC, 0x40]);
}

fn set_media(
    buf: &mut Vec<u8>,
    media: Media,
    options: &PrintOptions,
    lines: usize,
) -> Result<(), Error> {
    let quality = if options.high_quality {
        PrintInfo::QUALITY
    } else {
        PrintInfo::empty()
    };

    buf.extend_from_slice(&[ESC, 0x69, 0x7A]); // ESC i z : Print information

    match media {
        Media::Continuous { width_code } => {
            if lines > u16::MAX as usize {
                return Err(Error::TooManyLines(lines));
            }
            let flags = PrintInfo::CONTINUOUS | quality;
            debug!(
                "Continuous media {}mm, {} lines, flags {:X}",
                width_code,
                lines,
                flags.bits()
            );

            buf.extend_from_slice(&[flags.bits(), MEDIA_CONTINUOUS, width_code, 0x00]);
            buf.extend_from_slice(&(lines as u16).to_le_bytes());
        }
        Media::DieCut { dims } => {
            let flags = PrintInfo::DIE_CUT | quality;
            debug!("Die-cut media {:X?}, flags {:X}", dims, flags.bits());

            buf.extend_from_slice(&[flags.bits(), MEDIA_DIE_CUT]);
            buf.extend_from_slice(&dims);
        }
        Media::Ping => {
            return Err(Error::InvalidConfig(
                "ping media can not carry a print job".to_string(),
            ))
        }
    }

    buf.extend_from_slice(&[0x00; 4]);
    Ok(())
}

fn raster_line(buf: &mut Vec<u8>, line: &[u8]) {
    buf.extend_from_slice(&[RASTER_LINE, 0x00, FRAME_CAPACITY as u8]);
    buf.extend_from_slice(line);
    buf.resize(buf.len() + FRAME_CAPACITY - line.len(), 0x00);
}
