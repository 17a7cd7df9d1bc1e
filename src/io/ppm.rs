//! Binary PPM (`P6`) pixel source and writer.
//!
//! Header: `P6 <width> <height> <maxval>` separated by whitespace, `#`
//! comments running to end of line, then exactly one whitespace byte and
//! `width * height` interleaved RGB sample triples. Only 8-bit rasters
//! (`maxval <= 255`) are accepted.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use crate::error::{HistoError, Result};
use crate::pixel::{Channel, PixelBuffer, MAX_DEPTH};

const MAGIC: &[u8; 2] = b"P6";

struct Header {
    xsize: u32,
    ysize: u32,
    maxval: u32,
    raster_offset: usize,
}

struct Cursor<'a> {
    data: &'a [u8],
    pos: usize,
}

impl Cursor<'_> {
    fn skip_whitespace_and_comments(&mut self) {
        while let Some(&b) = self.data.get(self.pos) {
            if b == b'#' {
                while let Some(&c) = self.data.get(self.pos) {
                    self.pos += 1;
                    if c == b'\n' || c == b'\r' {
                        break;
                    }
                }
            } else if b.is_ascii_whitespace() {
                self.pos += 1;
            } else {
                break;
            }
        }
    }

    fn number(&mut self, field: &str) -> Result<u32> {
        self.skip_whitespace_and_comments();
        let start = self.pos;
        while self.data.get(self.pos).is_some_and(u8::is_ascii_digit) {
            self.pos += 1;
        }
        if start == self.pos {
            return Err(HistoError::invalid_format(format!("missing {field} in PPM header")));
        }
        // digits only, so from_utf8 cannot fail
        let text = std::str::from_utf8(&self.data[start..self.pos]).unwrap_or_default();
        text.parse()
            .map_err(|_| HistoError::invalid_format(format!("{field} {text} out of range")))
    }
}

fn parse_header(data: &[u8]) -> Result<Header> {
    if data.len() < MAGIC.len() || &data[..MAGIC.len()] != MAGIC {
        return Err(HistoError::invalid_format("not a binary PPM (expected P6 magic)"));
    }
    let mut cursor = Cursor {
        data,
        pos: MAGIC.len(),
    };
    let xsize = cursor.number("width")?;
    let ysize = cursor.number("height")?;
    let maxval = cursor.number("maxval")?;

    match data.get(cursor.pos) {
        Some(b) if b.is_ascii_whitespace() => cursor.pos += 1,
        _ => return Err(HistoError::invalid_format("missing whitespace before raster")),
    }

    Ok(Header {
        xsize,
        ysize,
        maxval,
        raster_offset: cursor.pos,
    })
}

/// Parse a complete P6 image from `reader`.
pub fn read(mut reader: impl BufRead) -> Result<PixelBuffer> {
    let mut data = Vec::new();
    reader.read_to_end(&mut data)?;

    let header = parse_header(&data)?;
    if header.maxval == 0 {
        return Err(HistoError::invalid_format("maxval must be positive"));
    }
    if header.maxval > MAX_DEPTH {
        return Err(HistoError::UnsupportedDepth { depth: header.maxval });
    }

    let overflow = || HistoError::invalid_format("image dimensions overflow");
    let n = (header.xsize as usize)
        .checked_mul(header.ysize as usize)
        .ok_or_else(overflow)?;
    let bytes = n.checked_mul(3).ok_or_else(overflow)?;
    let raster = &data[header.raster_offset..];
    if raster.len() < bytes {
        return Err(HistoError::invalid_format(format!(
            "truncated raster: {} bytes, expected {bytes}",
            raster.len()
        )));
    }

    let mut r = Vec::with_capacity(n);
    let mut g = Vec::with_capacity(n);
    let mut b = Vec::with_capacity(n);
    for px in raster[..bytes].chunks_exact(3) {
        r.push(px[0]);
        g.push(px[1]);
        b.push(px[2]);
    }

    PixelBuffer::new(header.xsize, header.ysize, header.maxval, r, g, b)
}

pub fn read_path(path: impl AsRef<Path>) -> Result<PixelBuffer> {
    let path = path.as_ref();
    let file = File::open(path)?;
    tracing::debug!(path = %path.display(), "reading PPM");
    read(BufReader::new(file))
}

pub fn write(mut writer: impl Write, buffer: &PixelBuffer) -> Result<()> {
    write!(
        writer,
        "P6\n{} {}\n{}\n",
        buffer.xsize(),
        buffer.ysize(),
        buffer.depth_bound()
    )?;
    let r = buffer.channel(Channel::Red);
    let g = buffer.channel(Channel::Green);
    let b = buffer.channel(Channel::Blue);
    let mut row = Vec::with_capacity(3 * buffer.xsize().max(1) as usize);
    let width = (buffer.xsize() as usize).max(1);
    for start in (0..buffer.len()).step_by(width) {
        row.clear();
        for i in start..(start + width).min(buffer.len()) {
            row.extend_from_slice(&[r[i], g[i], b[i]]);
        }
        writer.write_all(&row)?;
    }
    writer.flush()?;
    Ok(())
}

pub fn write_path(path: impl AsRef<Path>, buffer: &PixelBuffer) -> Result<()> {
    let file = File::create(path.as_ref())?;
    write(BufWriter::new(file), buffer)
}
