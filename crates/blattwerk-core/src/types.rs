// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types shared by the document engine and the annotation canvas.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::BlattwerkError;

/// An opaque sRGB colour, written as `#rrggbb` in configs and JSON.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const BLUE: Color = Color::rgb(0, 0, 255);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Lowercase `#rrggbb` form.
    pub fn to_hex(&self) -> String {
        format!("#{}", hex::encode([self.r, self.g, self.b]))
    }

    /// Fully opaque RGBA channels for raster drawing.
    pub fn to_rgba(&self) -> [u8; 4] {
        [self.r, self.g, self.b, 255]
    }

    /// Channels scaled to 0.0..=1.0, as PDF `rg` operands expect.
    pub fn to_unit_rgb(&self) -> [f32; 3] {
        [
            f32::from(self.r) / 255.0,
            f32::from(self.g) / 255.0,
            f32::from(self.b) / 255.0,
        ]
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::BLACK
    }
}

impl FromStr for Color {
    type Err = BlattwerkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s.trim().trim_start_matches('#');
        if digits.len() != 6 {
            return Err(BlattwerkError::Validation(format!(
                "colour must be #rrggbb, got {s:?}"
            )));
        }
        let bytes = hex::decode(digits).map_err(|err| {
            BlattwerkError::Validation(format!("colour {s:?} is not hex: {err}"))
        })?;
        Ok(Self::rgb(bytes[0], bytes[1], bytes[2]))
    }
}

impl TryFrom<String> for Color {
    type Error = BlattwerkError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_hex()
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Output payload formats produced by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DocumentType {
    Pdf,
    PlainText,
}

impl DocumentType {
    /// MIME type exposed with a downloadable blob.
    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Pdf => "application/pdf",
            Self::PlainText => "text/plain",
        }
    }

    /// Infer document type from file extension.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "pdf" => Some(Self::Pdf),
            "txt" => Some(Self::PlainText),
            _ => None,
        }
    }
}

/// The closed set of transformation engine operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Operation {
    Compress,
    Split,
    Merge,
    Delete,
    Crop,
    Sign,
    Convert,
    WordToPdf,
}

impl Operation {
    pub const ALL: [Operation; 8] = [
        Self::Compress,
        Self::Split,
        Self::Merge,
        Self::Delete,
        Self::Crop,
        Self::Sign,
        Self::Convert,
        Self::WordToPdf,
    ];

    /// Wire identifier, e.g. `"word-to-pdf"`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Compress => "compress",
            Self::Split => "split",
            Self::Merge => "merge",
            Self::Delete => "delete",
            Self::Crop => "crop",
            Self::Sign => "sign",
            Self::Convert => "convert",
            Self::WordToPdf => "word-to-pdf",
        }
    }
}

impl FromStr for Operation {
    type Err = BlattwerkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|op| op.as_str() == s)
            .ok_or_else(|| BlattwerkError::UnsupportedOperation(s.to_owned()))
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
