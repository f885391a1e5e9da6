//! Reading and writing the geometry records of shapefiles.
//!
//! A record is a 12 byte header (big endian record number and content length,
//! little endian shape type) followed by a body whose layout depends on the
//! shape type. [decode_record] and [encode_record] translate between those
//! bytes and a [ShapeRecord]; [content_length] gives the size a shape takes on disk.
//!
//! Shapes can also be built and edited in memory with [Shape::add_point] and
//! [Shape::delete_point]. Attribute rows live in an [AttributeStore], either a
//! plain `BTreeMap` or a SQLite table through [SqliteAttributeStore].
//!
//! # Examples
//! ```
//! use shp::{decode_record, encode_record, Coordinate, Shape, ShapeRecord, ShapeType};
//!
//! let mut square = Shape::new(ShapeType::Polygon);
//! for (x, y) in [(0.0, 0.0), (0.0, 1.0), (1.0, 1.0), (1.0, 0.0)] {
//!     square.add_point(Coordinate::xy(x, y), 0);
//! }
//!
//! let mut bytes = Vec::new();
//! encode_record(&mut bytes, &ShapeRecord::new(1, square.clone())).unwrap();
//!
//! let record = decode_record(&mut bytes.as_slice()).unwrap();
//! assert_eq!(record.shape, square);
//! ```
pub mod attributes;
mod edit;
mod geo;
pub mod result;
pub mod shp_record;
pub mod types;
pub mod util;

pub use crate::attributes::{
    AttributeRow, AttributeStore, AttributeValue, ColumnDef, ColumnType, SqliteAttributeStore,
};
pub use crate::result::{Error, Result};
pub use crate::shp_record::{
    content_length, decode_record, decode_record_with, encode_record, DecodeOptions, RecordHeader,
    ShapeRecord,
};
pub use crate::types::{Coordinate, Dimension, Extent, Family, Part, Range, Shape, ShapeType};
