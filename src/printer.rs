use log::{debug, info, log_enabled, trace, Level};
use std::{
    fs::{File, OpenOptions},
    io::Write,
    path::Path,
};

use crate::{
    bitmap::PackedBitmap,
    command::{self, PrintOptions},
    error::Error,
    media::Media,
};

/// A printer reached through a byte sink, usually its device node.
///
/// The sink is owned for the duration of the job and released on drop.
pub struct Printer<W: Write> {
    sink: W,
}

impl Printer<File> {
    /// Open a printer device node such as `/dev/usb/lp0`.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let path = path.as_ref();
        debug!("Opening printer device {}", path.display());
        let file = OpenOptions::new().read(true).write(true).open(path)?;
        Ok(Printer::new(file))
    }
}

impl<W: Write> Printer<W> {
    pub fn new(sink: W) -> Self {
        Printer { sink }
    }

    /// Print a single label.
    ///
    /// The command stream is fully built before the first byte is written,
    /// so an encoding error leaves the device untouched.
    pub fn print(
        &mut self,
        bitmap: &PackedBitmap,
        media: Media,
        options: &PrintOptions,
    ) -> Result<usize, Error> {
        info!(
            "Printing image with width: {} and height: {}",
            bitmap.width(),
            bitmap.height()
        );
        if log_enabled!(Level::Trace) {
            trace!("Label preview:\n{}", bitmap.preview());
        }

        let buf = command::encode(bitmap, media, options)?;
        self.write(&buf)
    }

    /// Check that the printer is present without submitting a job.
    pub fn ping(&mut self) -> Result<usize, Error> {
        debug!("Sending ping");
        self.write(&command::encode_ping())
    }

    pub fn into_inner(self) -> W {
        self.sink
    }

    fn write(&mut self, buf: &[u8]) -> Result<usize, Error> {
        self.sink.write_all(buf)?;
        self.sink.flush()?;
        debug!("Wrote {} bytes to printer", buf.len());
        Ok(buf.len())
    }
}
