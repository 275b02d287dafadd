use crate::QrMatrix;
use qrcode::{EcLevel, QrCode, types::QrError};
use std::fmt;

/// Error correction level of the QR symbol
///
/// Higher levels tolerate more damage at the price of symbol capacity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Ecc {
    /// Tolerates ~7% erroneous modules
    Low,
    /// Tolerates ~15% erroneous modules
    Medium,
    /// Tolerates ~25% erroneous modules
    Quartile,
    /// Tolerates ~30% erroneous modules
    High,
}

impl From<Ecc> for EcLevel {
    fn from(ecc: Ecc) -> Self {
        match ecc {
            Ecc::Low => EcLevel::L,
            Ecc::Medium => EcLevel::M,
            Ecc::Quartile => EcLevel::Q,
            Ecc::High => EcLevel::H,
        }
    }
}

/// Encode text into a module matrix at the requested correction level
///
/// The encoder picks the smallest symbol version that fits the data. All
/// failures happen here, before any rendering is involved.
pub fn encode(text: &str, ecc: Ecc) -> Result<QrMatrix, EncodeError> {
    let code = QrCode::with_error_correction_level(text, EcLevel::from(ecc))?;
    let matrix = QrMatrix::from(&code);
    tracing::debug!("[encode] {} bytes -> {} modules", text.len(), matrix.size());
    Ok(matrix)
}

/// Error raised by the symbol encoder
#[derive(Debug)]
pub enum EncodeError {
    /// Data does not fit the symbol capacity at the requested level
    DataTooLong,
    /// Any other encoder failure
    Encoder(QrError),
}

impl From<QrError> for EncodeError {
    fn from(error: QrError) -> Self {
        match error {
            QrError::DataTooLong => Self::DataTooLong,
            error => Self::Encoder(error),
        }
    }
}

impl fmt::Display for EncodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EncodeError::DataTooLong => write!(f, "data does not fit the symbol capacity"),
            EncodeError::Encoder(error) => write!(f, "encoder failure: {:?}", error),
        }
    }
}

impl std::error::Error for EncodeError {}
