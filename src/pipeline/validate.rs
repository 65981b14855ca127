//! Local validation of a selection before anything is sent.
//!
//! Only presence and size are checked. The declared media type is not
//! compared against the category; a mismatched file goes to the server as-is.

use crate::category::ConversionCategory;
use crate::error::ValidationError;
use crate::file::SelectedFile;
use tracing::warn;

/// Check that a file is selected and fits the category's size ceiling.
///
/// A file of exactly the ceiling passes. Categories without a ceiling only
/// check presence. Returns the validated file.
pub fn validate(
    file: Option<&SelectedFile>,
    category: ConversionCategory,
) -> Result<&SelectedFile, ValidationError> {
    let file = file.ok_or_else(|| {
        warn!("No file provided for {} conversion", category);
        ValidationError::MissingFile
    })?;

    if let Some(limit) = category.max_size() {
        let size = file.size();
        if size > limit {
            warn!("File size {} exceeds the {} limit of {}", size, category, limit);
            return Err(ValidationError::FileTooLarge { size, limit });
        }
    }

    Ok(file)
}
