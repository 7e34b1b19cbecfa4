//! Unified error codes for the catalog backend
//!
//! Error codes are organized by category:
//! - 0xxx: General errors
//! - 6xxx: Catalog errors (categories, brands, products, images)
//! - 65xx: File upload errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// All error codes are represented as u16 values for efficient serialization
/// and cross-language compatibility (Rust, TypeScript, etc.)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Operation completed successfully
    Success = 0,
    /// Unknown error
    Unknown = 1,
    /// Validation failed
    ValidationFailed = 2,
    /// Resource not found
    NotFound = 3,
    /// Resource already exists
    AlreadyExists = 4,
    /// Invalid request
    InvalidRequest = 5,
    /// Business rule violation
    BusinessRule = 9,

    // ==================== 6xxx: Catalog ====================
    /// Product not found
    ProductNotFound = 6001,
    /// Category not found
    CategoryNotFound = 6101,
    /// Category name already exists
    CategoryNameExists = 6103,
    /// Category slug already exists
    CategorySlugExists = 6104,
    /// Candidate parent is the category itself or one of its descendants
    CategoryInvalidParent = 6105,
    /// Brand not found
    BrandNotFound = 6201,
    /// Brand name already exists
    BrandNameExists = 6202,

    // ==================== 65xx: File Upload ====================
    /// File too large
    FileTooLarge = 6501,
    /// Unsupported file format
    UnsupportedFileFormat = 6502,
    /// Empty file provided
    EmptyFile = 6505,
    /// File storage failed
    FileStorageFailed = 6509,

    // ==================== 66xx: Product images ====================
    /// Product image not found
    ImageNotFound = 6601,
    /// Image URL already used by another image
    ImageUrlExists = 6602,
    /// More than one principal image requested in one batch
    ImageMultiplePrincipal = 6603,
    /// Cannot delete the last image of a product
    ProductLastImage = 6604,
    /// Image does not belong to the product
    ImageNotInProduct = 6605,

    // ==================== 9xxx: System ====================
    /// Internal server error
    InternalError = 9001,
    /// Database error
    DatabaseError = 9002,
    /// Configuration error
    ConfigError = 9005,
}

impl ErrorCode {
    /// Get the numeric code value
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Check if this is a success code
    #[inline]
    pub const fn is_success(&self) -> bool {
        matches!(self, ErrorCode::Success)
    }

    /// Get the default message for this error code
    pub const fn message(&self) -> &'static str {
        match self {
            // General
            ErrorCode::Success => "Operation completed successfully",
            ErrorCode::Unknown => "An unknown error occurred",
            ErrorCode::ValidationFailed => "Validation failed",
            ErrorCode::NotFound => "Resource not found",
            ErrorCode::AlreadyExists => "Resource already exists",
            ErrorCode::InvalidRequest => "Invalid request",
            ErrorCode::BusinessRule => "Business rule violation",

            // Catalog
            ErrorCode::ProductNotFound => "Product not found",
            ErrorCode::CategoryNotFound => "Category not found",
            ErrorCode::CategoryNameExists => "Category name already exists",
            ErrorCode::CategorySlugExists => "Category slug already exists",
            ErrorCode::CategoryInvalidParent => {
                "A category cannot be moved under itself or one of its descendants"
            }
            ErrorCode::BrandNotFound => "Brand not found",
            ErrorCode::BrandNameExists => "Brand name already exists",

            // File Upload
            ErrorCode::FileTooLarge => "File too large",
            ErrorCode::UnsupportedFileFormat => "Unsupported file format",
            ErrorCode::EmptyFile => "Empty file provided",
            ErrorCode::FileStorageFailed => "File storage failed",

            // Product images
            ErrorCode::ImageNotFound => "Product image not found",
            ErrorCode::ImageUrlExists => "Image URL already exists",
            ErrorCode::ImageMultiplePrincipal => "Only one principal image is allowed per batch",
            ErrorCode::ProductLastImage => "A product must keep at least one image",
            ErrorCode::ImageNotInProduct => "Image does not belong to this product",

            // System
            ErrorCode::InternalError => "Internal server error",
            ErrorCode::DatabaseError => "Database error",
            ErrorCode::ConfigError => "Configuration error",
        }
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// Error when converting from an invalid u16 to ErrorCode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            // General
            0 => Ok(ErrorCode::Success),
            1 => Ok(ErrorCode::Unknown),
            2 => Ok(ErrorCode::ValidationFailed),
            3 => Ok(ErrorCode::NotFound),
            4 => Ok(ErrorCode::AlreadyExists),
            5 => Ok(ErrorCode::InvalidRequest),
            9 => Ok(ErrorCode::BusinessRule),

            // Catalog
            6001 => Ok(ErrorCode::ProductNotFound),
            6101 => Ok(ErrorCode::CategoryNotFound),
            6103 => Ok(ErrorCode::CategoryNameExists),
            6104 => Ok(ErrorCode::CategorySlugExists),
            6105 => Ok(ErrorCode::CategoryInvalidParent),
            6201 => Ok(ErrorCode::BrandNotFound),
            6202 => Ok(ErrorCode::BrandNameExists),

            // File Upload
            6501 => Ok(ErrorCode::FileTooLarge),
            6502 => Ok(ErrorCode::UnsupportedFileFormat),
            6505 => Ok(ErrorCode::EmptyFile),
            6509 => Ok(ErrorCode::FileStorageFailed),

            // Product images
            6601 => Ok(ErrorCode::ImageNotFound),
            6602 => Ok(ErrorCode::ImageUrlExists),
            6603 => Ok(ErrorCode::ImageMultiplePrincipal),
            6604 => Ok(ErrorCode::ProductLastImage),
            6605 => Ok(ErrorCode::ImageNotInProduct),

            // System
            9001 => Ok(ErrorCode::InternalError),
            9002 => Ok(ErrorCode::DatabaseError),
            9005 => Ok(ErrorCode::ConfigError),

            _ => Err(InvalidErrorCode(value)),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}
