// Memory configuration error types

use thiserror::Error;

use crate::region::RegionKind;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MemoryError {
    #[error("Unable to allocate {size} bytes for {region}")]
    OutOfMemory { region: RegionKind, size: usize },

    #[error("Invalid {region} size: {size:#X} bytes")]
    InvalidSize { region: RegionKind, size: usize },

    #[error("{region} image of {size:#X} bytes exceeds the maximum of {max:#X} bytes")]
    FirmwareTooLarge {
        region: RegionKind,
        size: usize,
        max: usize,
    },

    #[error("No WOM is installed")]
    NoWom,

    #[error("No {0} is installed")]
    NoFirmware(RegionKind),
}

pub type Result<T> = std::result::Result<T, MemoryError>;
