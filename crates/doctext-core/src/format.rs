//! Filename → [`FormatTag`] classification.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{ExtractError, Strategy};

/// A supported upload kind, derived from the filename extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormatTag {
    Pdf,
    Docx,
    Jpg,
    Jpeg,
    Png,
}

impl FormatTag {
    pub const ALL: [FormatTag; 5] = [
        FormatTag::Pdf,
        FormatTag::Docx,
        FormatTag::Jpg,
        FormatTag::Jpeg,
        FormatTag::Png,
    ];

    /// Classify a filename by the text after its last `.`, case-insensitively.
    ///
    /// A name without any `.` is taken whole as its own extension. That is
    /// deliberate: `"notes"` is rejected as `notes`, and a file literally
    /// named `"pdf"` is accepted as [`FormatTag::Pdf`].
    pub fn from_file_name(file_name: &str) -> Result<Self, ExtractError> {
        let ext = match file_name.rsplit_once('.') {
            Some((_, ext)) => ext,
            None => file_name,
        };
        ext.parse()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FormatTag::Pdf => "pdf",
            FormatTag::Docx => "docx",
            FormatTag::Jpg => "jpg",
            FormatTag::Jpeg => "jpeg",
            FormatTag::Png => "png",
        }
    }

    pub fn strategy(&self) -> Strategy {
        match self {
            FormatTag::Pdf => Strategy::Pdf,
            FormatTag::Docx => Strategy::Document,
            FormatTag::Jpg | FormatTag::Jpeg | FormatTag::Png => Strategy::Image,
        }
    }
}

impl FromStr for FormatTag {
    type Err = ExtractError;

    fn from_str(ext: &str) -> Result<Self, Self::Err> {
        let lower = ext.to_lowercase();
        match lower.as_str() {
            "pdf" => Ok(FormatTag::Pdf),
            "docx" => Ok(FormatTag::Docx),
            "jpg" => Ok(FormatTag::Jpg),
            "jpeg" => Ok(FormatTag::Jpeg),
            "png" => Ok(FormatTag::Png),
            _ => Err(ExtractError::UnsupportedFormat { extension: lower }),
        }
    }
}

impl fmt::Display for FormatTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
