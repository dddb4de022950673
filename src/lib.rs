//! Brother QL Label Printer Driver
//!
//! This crate turns PNG images into the raster command stream of Brother QL
//! series label printers and writes it to the printer's device node.
//!
//! # Example
//!
//! ```rust,no_run
//! use ql570::{transcode, DecodedImage, Media, PrintOptions, Printer, DEFAULT_CUTOFF};
//!
//! let file = std::fs::File::open("label.png").unwrap();
//! let image = DecodedImage::read_png(file).unwrap();
//! let bitmap = transcode(&image, DEFAULT_CUTOFF).unwrap();
//!
//! let media = Media::lookup("29").unwrap();
//! let mut printer = Printer::open("/dev/usb/lp0").unwrap();
//! printer.print(&bitmap, media, &PrintOptions::default()).unwrap();
//! ```

mod bitmap;
mod command;
mod error;
mod media;
mod printer;

pub use crate::{
    bitmap::{
        parse_cutoff, transcode, validate_cutoff, DecodedImage, PackedBitmap, PixelFormat,
        DEFAULT_CUTOFF,
    },
    command::{encode, encode_ping, AutoCut, ExpandedMode, PrintInfo, PrintOptions, FRAME_CAPACITY},
    error::Error,
    media::Media,
    printer::Printer,
};

/// Dots across the print head of the QL-5xx/7xx/8xx printers.
///
/// A raster frame carries exactly this many dots, packed into
/// [`FRAME_CAPACITY`] bytes.
pub const PRINT_HEAD_DOTS: usize = 720;
