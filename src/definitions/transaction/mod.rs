//! Card and transaction fields, each parsed from its string wire form.

pub mod atc;
pub mod expiry;
pub mod pan;
pub mod pan_sequence_number;
pub mod service_code;
pub mod validation_data;

pub use atc::Atc;
pub use expiry::Expiry;
pub use pan::Pan;
pub use pan_sequence_number::PanSequenceNumber;
pub use service_code::ServiceCode;
pub use validation_data::ValidationData;

/// All fields a single generate/verify request carries. Constructed per
/// request and never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionContext {
    pub pan: Pan,
    pub pan_sequence_number: PanSequenceNumber,
    pub expiry: Expiry,
    pub atc: Atc,
    pub service_code: ServiceCode,
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum Error {
    #[error("invalid pan: {0}")]
    Pan(#[from] pan::Error),
    #[error("invalid pan sequence number: {0}")]
    PanSequenceNumber(#[from] pan_sequence_number::Error),
    #[error("invalid expiry: {0}")]
    Expiry(#[from] expiry::Error),
    #[error("invalid application transaction counter: {0}")]
    Atc(#[from] atc::Error),
    #[error("invalid service code: {0}")]
    ServiceCode(#[from] service_code::Error),
}

impl TransactionContext {
    pub fn new(
        pan: &str,
        pan_sequence_number: &str,
        expiry: &str,
        atc: &str,
        service_code: &str,
    ) -> Result<Self, Error> {
        Ok(Self {
            pan: pan.parse()?,
            pan_sequence_number: pan_sequence_number.parse()?,
            expiry: expiry.parse()?,
            atc: atc.parse()?,
            service_code: service_code.parse()?,
        })
    }
}
