use crate::attributes::{AttributeRow, AttributeStore};
use crate::result::{Error, Result};
use crate::types::*;
use crate::util::{ShpReader, ShpWriter};
use std::io::{Read, Write};
use tracing::{debug, trace, warn};

// counts come straight from the file, so don't trust them for allocation
const PREALLOC_LIMIT: usize = 1 << 16;

/// The fixed 12 byte prefix of every record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordHeader {
    pub record_number: u32,
    /// Length of the record content in 16-bit words
    pub content_length: u32,
    pub shape_type: ShapeType,
}

impl RecordHeader {
    /// Reads the header. An unknown shape tag fails after the whole header has
    /// been consumed, so the source is left at the start of the record body.
    pub fn read_from<R: Read>(r: &mut ShpReader<R>) -> Result<Self> {
        let record_number = r.read_u32_be()?;
        let content_length = r.read_u32_be()?;
        let tag = r.read_u32_le()?;
        let shape_type = ShapeType::from_code(tag).map_err(|e| {
            warn!(record_number, tag, "unsupported shape type");
            e
        })?;
        Ok(RecordHeader {
            record_number,
            content_length,
            shape_type,
        })
    }

    pub fn write_to<W: Write>(&self, w: &mut ShpWriter<W>) -> Result<()> {
        w.write_u32_be(self.record_number)?;
        w.write_u32_be(self.content_length)?;
        w.write_u32_le(self.shape_type.code())?;
        Ok(())
    }
}

/// Options controlling how strictly records are decoded
#[derive(Debug, Clone, Default)]
pub struct DecodeOptions {
    /// Fail when the length declared in the header differs from the length of the decoded shape
    pub verify_content_length: bool,
}

/// A decoded record: its number, its shape and the attribute row that goes with it.
#[derive(Debug, Clone, PartialEq)]
pub struct ShapeRecord {
    /// 1-based position of the record in its file
    pub record_number: u32,
    pub shape: Shape,
    pub attributes: AttributeRow,
}

impl ShapeRecord {
    pub fn new(record_number: u32, shape: Shape) -> Self {
        ShapeRecord {
            record_number,
            shape,
            attributes: AttributeRow::default(),
        }
    }

    /// Decode the next record from `source` and fetch its attributes from `store`.
    ///
    /// A record without an attribute row gets an empty one.
    pub fn load<R: Read, S: AttributeStore + ?Sized>(source: &mut R, store: &S) -> Result<Self> {
        let mut record = decode_record(source)?;
        match store.fetch_row(record.record_number)? {
            Some(row) => record.attributes = row,
            None => debug!(
                record_number = record.record_number,
                "no attribute row for record"
            ),
        }
        Ok(record)
    }

    /// Write the record to `sink` as number `record_number`, then upsert its attributes.
    pub fn save<W: Write, S: AttributeStore + ?Sized>(
        &mut self,
        sink: &mut W,
        store: &mut S,
        record_number: u32,
    ) -> Result<()> {
        self.record_number = record_number;
        encode_record(sink, self)?;
        store.write_row(record_number, &self.attributes)
    }
}

// Primitive point codec. Aggregates call this with Dimension::XY and
// append their measure and elevation blocks separately.
trait ShpBytesRaw: Sized {
    fn write_as_bytes<W: Write>(&self, w: &mut ShpWriter<W>, dim: Dimension) -> Result<()>;
    fn read_from_bytes<R: Read>(r: &mut ShpReader<R>, dim: Dimension) -> Result<Self>;
}

impl ShpBytesRaw for Coordinate {
    fn write_as_bytes<W: Write>(&self, w: &mut ShpWriter<W>, dim: Dimension) -> Result<()> {
        w.write_f64(self.x)?;
        w.write_f64(self.y)?;
        // elevation precedes measure
        if dim.has_z() {
            w.write_f64(self.z.unwrap_or(0.0))?;
        }
        if dim.has_m() {
            w.write_f64(self.m.unwrap_or(0.0))?;
        }
        Ok(())
    }

    fn read_from_bytes<R: Read>(r: &mut ShpReader<R>, dim: Dimension) -> Result<Self> {
        let x = r.read_f64()?;
        let y = r.read_f64()?;
        let z = if dim.has_z() {
            Some(r.read_f64()?)
        } else {
            None
        };
        let m = if dim.has_m() {
            Some(r.read_f64()?)
        } else {
            None
        };
        Ok(Coordinate { x, y, z, m })
    }
}

fn read_xy_extent<R: Read>(r: &mut ShpReader<R>) -> Result<Extent> {
    Ok(Extent {
        xmin: r.read_f64()?,
        ymin: r.read_f64()?,
        xmax: r.read_f64()?,
        ymax: r.read_f64()?,
        z: None,
        m: None,
    })
}

fn write_xy_extent<W: Write>(w: &mut ShpWriter<W>, extent: Option<&Extent>) -> Result<()> {
    let e = extent.copied().unwrap_or_default();
    w.write_f64(e.xmin)?;
    w.write_f64(e.ymin)?;
    w.write_f64(e.xmax)?;
    w.write_f64(e.ymax)?;
    Ok(())
}

fn read_planar_points<R: Read>(r: &mut ShpReader<R>, count: usize) -> Result<Vec<Coordinate>> {
    let mut points = Vec::with_capacity(count.min(PREALLOC_LIMIT));
    for _ in 0..count {
        points.push(Coordinate::read_from_bytes(r, Dimension::XY)?);
    }
    Ok(points)
}

// One trailing block: min, max, then one value per point in flattened order.
fn read_value_block<R, F>(r: &mut ShpReader<R>, points: &mut [Coordinate], mut assign: F) -> Result<Range>
where
    R: Read,
    F: FnMut(&mut Coordinate, f64),
{
    let min = r.read_f64()?;
    let max = r.read_f64()?;
    for p in points.iter_mut() {
        assign(p, r.read_f64()?);
    }
    Ok(Range { min, max })
}

fn read_value_blocks<R: Read>(
    r: &mut ShpReader<R>,
    dim: Dimension,
    extent: &mut Extent,
    points: &mut [Coordinate],
) -> Result<()> {
    if dim.has_z() {
        extent.z = Some(read_value_block(r, points, |c, v| c.z = Some(v))?);
    }
    if dim.has_m() {
        extent.m = Some(read_value_block(r, points, |c, v| c.m = Some(v))?);
    }
    Ok(())
}

fn write_value_blocks<'a, W, I>(
    w: &mut ShpWriter<W>,
    dim: Dimension,
    extent: Option<&Extent>,
    points: I,
) -> Result<()>
where
    W: Write,
    I: Iterator<Item = &'a Coordinate> + Clone,
{
    if dim.has_z() {
        let range = extent.and_then(|e| e.z).unwrap_or_default();
        w.write_f64(range.min)?;
        w.write_f64(range.max)?;
        for p in points.clone() {
            w.write_f64(p.z.unwrap_or(0.0))?;
        }
    }
    if dim.has_m() {
        let range = extent.and_then(|e| e.m).unwrap_or_default();
        w.write_f64(range.min)?;
        w.write_f64(range.max)?;
        for p in points {
            w.write_f64(p.m.unwrap_or(0.0))?;
        }
    }
    Ok(())
}

fn read_multipoint<R: Read>(r: &mut ShpReader<R>, dim: Dimension) -> Result<Body> {
    let mut extent = read_xy_extent(r)?;
    let num_points = r.read_u32_le()? as usize;
    let mut points = read_planar_points(r, num_points)?;
    read_value_blocks(r, dim, &mut extent, &mut points)?;
    Ok(Body::MultiPoint {
        extent: stored_extent(extent, points.len()),
        points,
    })
}

fn read_poly<R: Read>(r: &mut ShpReader<R>, dim: Dimension) -> Result<Body> {
    let mut extent = read_xy_extent(r)?;
    let num_parts = r.read_u32_le()? as usize;
    let num_points = r.read_u32_le()? as usize;
    let mut offsets = Vec::with_capacity(num_parts.min(PREALLOC_LIMIT));
    for _ in 0..num_parts {
        offsets.push(r.read_u32_le()? as usize);
    }
    let mut points = read_planar_points(r, num_points)?;
    read_value_blocks(r, dim, &mut extent, &mut points)?;
    Ok(Body::Poly {
        extent: stored_extent(extent, points.len()),
        parts: split_parts(&offsets, points)?,
    })
}

// an empty shape has no extent, whatever the file says
fn stored_extent(extent: Extent, num_points: usize) -> Option<Extent> {
    (num_points > 0).then_some(extent)
}

/// Partition the flattened point list: part `i` owns `offsets[i]..offsets[i + 1]`,
/// the last part runs to the end of the list.
fn split_parts(offsets: &[usize], mut points: Vec<Coordinate>) -> Result<Vec<Part>> {
    let total = points.len();
    let mut parts = Vec::with_capacity(offsets.len());
    for (i, &start) in offsets.iter().enumerate().rev() {
        if start > points.len() {
            return Err(Error::InvalidPartTable(format!(
                "part {} starts at point {} but only {} points precede the next part",
                i,
                start,
                points.len()
            )));
        }
        parts.push(Part(points.split_off(start)));
    }
    if !points.is_empty() {
        return Err(Error::InvalidPartTable(format!(
            "{} of {} points are not covered by any part",
            points.len(),
            total
        )));
    }
    parts.reverse();
    Ok(parts)
}

fn read_body<R: Read>(r: &mut ShpReader<R>, shape_type: ShapeType) -> Result<Body> {
    let dim = shape_type.dimension();
    match shape_type.family() {
        Family::Null => Ok(Body::Null),
        Family::Point => Ok(Body::Point(Coordinate::read_from_bytes(r, dim)?)),
        Family::MultiPoint => read_multipoint(r, dim),
        Family::PolyLine | Family::Polygon => read_poly(r, dim),
    }
}

fn write_body<W: Write>(w: &mut ShpWriter<W>, shape: &Shape) -> Result<()> {
    let dim = shape.shape_type.dimension();
    match &shape.body {
        Body::Null => Ok(()),
        Body::Point(c) => c.write_as_bytes(w, dim),
        Body::MultiPoint { extent, points } => {
            write_xy_extent(w, extent.as_ref())?;
            w.write_u32_le(points.len() as u32)?;
            for p in points {
                p.write_as_bytes(w, Dimension::XY)?;
            }
            write_value_blocks(w, dim, extent.as_ref(), points.iter())
        }
        Body::Poly { extent, parts } => {
            write_xy_extent(w, extent.as_ref())?;
            w.write_u32_le(parts.len() as u32)?;
            w.write_u32_le(shape.num_points() as u32)?;
            let mut start = 0;
            for part in parts {
                w.write_u32_le(start as u32)?;
                start += part.len();
            }
            let flattened = parts.iter().flat_map(|p| p.0.iter());
            for p in flattened.clone() {
                p.write_as_bytes(w, Dimension::XY)?;
            }
            write_value_blocks(w, dim, extent.as_ref(), flattened)
        }
    }
}

/// The size of a shape's record content in 16-bit words, as declared in the record header.
///
/// A double takes 4 words and an integer 2. Measure and elevation each add a
/// min/max pair and one double per point.
pub fn content_length(shape: &Shape) -> Result<u32> {
    let (block_words, point_words): (u64, u64) = match shape.shape_type.dimension() {
        Dimension::XY => (0, 8),
        Dimension::XYM => (8, 12),
        Dimension::XYZM => (16, 16),
    };
    let words = match &shape.body {
        Body::Null => 0,
        // tag + one full coordinate
        Body::Point(_) => 2 + point_words,
        // tag + extent + count
        Body::MultiPoint { points, .. } => 20 + block_words + point_words * points.len() as u64,
        // tag + extent + part count + point count + one offset per part
        Body::Poly { parts, .. } => {
            22 + 2 * parts.len() as u64 + block_words + point_words * shape.num_points() as u64
        }
    };
    // the header field is a signed 32-bit integer
    i32::try_from(words)
        .map(|w| w as u32)
        .map_err(|_| Error::ContentTooLarge(words))
}

/// Decode one record from a source positioned at the start of its header
pub fn decode_record<R: Read>(source: &mut R) -> Result<ShapeRecord> {
    decode_record_with(source, &DecodeOptions::default())
}

pub fn decode_record_with<R: Read>(source: &mut R, options: &DecodeOptions) -> Result<ShapeRecord> {
    let mut r = ShpReader::new(source);
    let header = RecordHeader::read_from(&mut r)?;
    let body = read_body(&mut r, header.shape_type)?;
    let shape = Shape {
        shape_type: header.shape_type,
        body,
    };
    let actual = content_length(&shape)?;
    if actual != header.content_length {
        if options.verify_content_length {
            return Err(Error::ContentLengthMismatch {
                declared: header.content_length,
                actual,
            });
        }
        debug!(
            record_number = header.record_number,
            declared = header.content_length,
            actual,
            "record content length disagrees with its shape"
        );
    }
    trace!(
        record_number = header.record_number,
        shape_type = ?header.shape_type,
        bytes = r.offset(),
        "decoded record"
    );
    Ok(ShapeRecord::new(header.record_number, shape))
}

/// Encode a record, header first. The content length is computed before anything is written.
pub fn encode_record<W: Write>(sink: &mut W, record: &ShapeRecord) -> Result<()> {
    let header = RecordHeader {
        record_number: record.record_number,
        content_length: content_length(&record.shape)?,
        shape_type: record.shape.shape_type,
    };
    let mut w = ShpWriter::new(sink);
    header.write_to(&mut w)?;
    write_body(&mut w, &record.shape)?;
    trace!(
        record_number = header.record_number,
        shape_type = ?header.shape_type,
        content_length = header.content_length,
        "encoded record"
    );
    Ok(())
}
