//! Error types for label printing.
//!
//! Every failure is fatal to the job: nothing is retried and no partial
//! command stream is sent to the device.

use thiserror::Error;

/// Main error type for the transcoding, encoding and device stages.
#[derive(Error, Debug)]
pub enum Error {
    /// The image is neither 1-bit single-channel nor 8-bit four-channel.
    #[error("Unsupported image format: {channels} channel(s) at {bit_depth} bit(s), only mono or 4x8-bit RGBA images are allowed")]
    UnsupportedFormat { channels: u8, bit_depth: u8 },

    #[error("Unknown media identifier: {0:?}")]
    UnknownMedia(String),

    /// The cutoff must lie strictly between 0 and 255.
    ///
    /// 0 would produce an all-white label and 255 an all-black one.
    #[error("Invalid cutoff {0:?}: expected a value between 1 and 254")]
    InvalidCutoff(String),

    /// A scan line does not fit into a single raster frame.
    ///
    /// The image is taller than the print head of the printer.
    #[error("Scan line of {line_bytes} bytes exceeds the raster frame capacity of {capacity} bytes")]
    LineTooLong { line_bytes: usize, capacity: usize },

    /// Continuous media carries the line count as a 16-bit value.
    #[error("Too many scan lines for a single label: {0}")]
    TooManyLines(usize),

    #[error("Invalid configuration parameter: {0}")]
    InvalidConfig(String),

    /// Opening or writing the printer device failed.
    #[error(transparent)]
    DeviceIo(#[from] std::io::Error),

    #[error("Can't read image {path}: {source}")]
    ImageOpen {
        path: String,
        source: std::io::Error,
    },

    /// Wraps errors reported by the PNG decoder.
    #[error(transparent)]
    ImageDecode(#[from] png::DecodingError),

    #[error("Image data is truncated: expected {expected} bytes, found {actual}")]
    TruncatedImage { expected: usize, actual: usize },
}
