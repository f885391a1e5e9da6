/// The result returned by many methods within the crate
pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Shape type {0} is not supported")]
    UnsupportedShapeType(u32),
    #[error("Record truncated: {needed} bytes needed at offset {offset}")]
    TruncatedInput { offset: u64, needed: usize },
    #[error("Error reading from the record source")]
    Read(#[source] std::io::Error),
    #[error("Unable to write to the record sink")]
    UnwritableSink(#[source] std::io::Error),
    #[error("Content length of {0} words does not fit in a record header")]
    ContentTooLarge(u64),
    #[error("Record declares {declared} words of content but holds {actual}")]
    ContentLengthMismatch { declared: u32, actual: u32 },
    #[error("Invalid part table: {0}")]
    InvalidPartTable(String),
    #[error("Unsupported geo-types geometry")]
    UnsupportedGeometryType,
    #[error("A null shape has no geometry")]
    NullShape,
    #[error("Attribute table {0} does not exist")]
    MissingTable(String),
    #[error("Error when accessing the SQLite attribute table")]
    AttributeStore(#[from] rusqlite::Error),
}
