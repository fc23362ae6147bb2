// Frame stream - Reads fixed-size grayscale frames from a byte stream
//
// Frames arrive back to back with no header: exactly width * height bytes
// each, one byte per pixel, rows top to bottom. The stream is read in
// binary form; a trailing partial frame is dropped, never shown.

use log::{trace, warn};
use std::io::{self, ErrorKind, Read};

/// One grayscale frame laid out as a 2-D grid
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    width: usize,
    height: usize,
    data: Vec<u8>,
}

impl Frame {
    /// Create a black frame
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            data: vec![0; width * height],
        }
    }

    /// Frame width in pixels
    pub fn width(&self) -> usize {
        self.width
    }

    /// Frame height in pixels
    pub fn height(&self) -> usize {
        self.height
    }

    /// Raw samples, row-major
    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    /// One row of samples
    ///
    /// # Panics
    /// Panics if `y` is out of bounds
    pub fn row(&self, y: usize) -> &[u8] {
        assert!(y < self.height, "Row {} out of bounds", y);
        &self.data[y * self.width..(y + 1) * self.width]
    }

    /// Iterate over rows, top to bottom
    pub fn rows(&self) -> impl Iterator<Item = &[u8]> {
        self.data.chunks_exact(self.width.max(1))
    }

    /// Sample at `(x, y)`; `None` outside the frame
    pub fn get(&self, x: usize, y: usize) -> Option<u8> {
        if x < self.width && y < self.height {
            Some(self.data[y * self.width + x])
        } else {
            None
        }
    }
}

/// Reader splitting a byte stream into frames
pub struct FrameReader<R: Read> {
    reader: R,
    frame: Frame,
    frames_read: u64,
    frames_dropped: u64,
}

impl<R: Read> FrameReader<R> {
    /// Create a reader producing `width x height` frames
    pub fn new(reader: R, width: usize, height: usize) -> Self {
        Self {
            reader,
            frame: Frame::new(width, height),
            frames_read: 0,
            frames_dropped: 0,
        }
    }

    /// Read the next complete frame
    ///
    /// # Returns
    /// `Ok(Some(frame))` for a complete frame, `Ok(None)` at end of stream.
    /// A partial frame at the end of the stream is counted as dropped and
    /// ends the stream.
    ///
    /// # Errors
    /// Any I/O error other than `Interrupted`
    pub fn next_frame(&mut self) -> io::Result<Option<&Frame>> {
        let wanted = self.frame.data.len();
        if wanted == 0 {
            return Ok(None);
        }

        let filled = fill(&mut self.reader, &mut self.frame.data)?;

        if filled == wanted {
            self.frames_read += 1;
            trace!("Frame #{} read", self.frames_read);
            return Ok(Some(&self.frame));
        }

        if filled > 0 {
            self.frames_dropped += 1;
            warn!("Dropping partial frame: got {} of {} bytes", filled, wanted);
        }

        Ok(None)
    }

    /// Number of complete frames read so far
    pub fn frames_read(&self) -> u64 {
        self.frames_read
    }

    /// Number of partial frames discarded
    pub fn frames_dropped(&self) -> u64 {
        self.frames_dropped
    }

    /// Size of one frame in bytes
    pub fn frame_size(&self) -> usize {
        self.frame.data.len()
    }
}

/// Read until `buf` is full or the stream ends; returns the byte count
fn fill<R: Read>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}
