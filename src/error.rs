//! Error taxonomy for the metadata decoder.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("unexpected end of input while reading {0}")]
    UnexpectedEof(&'static str),

    #[error("malformed container: {0}")]
    MalformedContainer(String),

    #[error("malformed payload: {0}")]
    MalformedPayload(String),

    #[error("unsupported box version {version} for box type {type_code:?}")]
    UnsupportedVersion { type_code: String, version: u8 },

    #[error("invalid TIFF/EXIF byte order signature")]
    InvalidByteOrder,

    #[error("XML decode error: {0}")]
    Xml(String),
}

impl From<quick_xml::DeError> for Error {
    fn from(e: quick_xml::DeError) -> Self {
        Error::Xml(e.to_string())
    }
}
