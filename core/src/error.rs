//! Gateway core error types

/// Frame decoding errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FrameError {
    /// Buffer length differs from the fixed frame size
    Length { expected: usize, actual: usize },
}

impl core::fmt::Display for FrameError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Length { expected, actual } => {
                write!(f, "Frame length {} (expected {})", actual, expected)
            }
        }
    }
}

impl core::error::Error for FrameError {}

/// Control request parse failures
///
/// A rejected request is a normal outcome for the control endpoint; these
/// variants only say why it was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ControlError {
    /// Nothing was received before the first line break
    Empty,
    /// First line does not start with `POST`
    MethodNotAllowed,
    /// Path is not one of the relay command paths
    UnknownPath,
}

impl core::fmt::Display for ControlError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Empty => write!(f, "Empty request"),
            Self::MethodNotAllowed => write!(f, "Method not allowed"),
            Self::UnknownPath => write!(f, "Unknown path"),
        }
    }
}

impl core::error::Error for ControlError {}

/// Outbound payload formatting errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PayloadError {
    /// Formatted text does not fit its fixed buffer
    Overflow,
}

impl core::fmt::Display for PayloadError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Overflow => write!(f, "Payload buffer overflow"),
        }
    }
}

impl core::error::Error for PayloadError {}
