use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    InvalidProductId(i64),
    BlankProductField(&'static str),
    FrameSizeMismatch {
        width: u32,
        height: u32,
        pixels: usize,
    },
}

impl Display for DomainError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidProductId(value) => write!(f, "product id must be positive, got {value}"),
            Self::BlankProductField(name) => write!(f, "product {name} must not be blank"),
            Self::FrameSizeMismatch {
                width,
                height,
                pixels,
            } => write!(
                f,
                "frame {width}x{height} expects {} pixels, got {pixels}",
                u64::from(*width) * u64::from(*height)
            ),
        }
    }
}

impl std::error::Error for DomainError {}
