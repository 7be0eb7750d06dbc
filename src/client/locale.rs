// ABOUTME: Localized user-facing notices for the upload client
// ABOUTME: Spanish is the default locale, English is available
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::fmt;
use std::str::FromStr;

/// Display language for client notices
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Locale {
    /// Spanish
    #[default]
    Es,
    /// English
    En,
}

/// Messages the upload client shows to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    /// The plan was processed and stored
    Processed,
    /// The upload failed
    Failed,
    /// No image attached
    FileRequired,
    /// Start date missing
    StartDateRequired,
    /// End date missing
    EndDateRequired,
    /// Attached file is not an image
    ImageRequired,
}

impl Locale {
    /// Language tag
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Es => "es",
            Self::En => "en",
        }
    }

    /// Render a notice in this locale
    #[must_use]
    pub const fn message(&self, notice: Notice) -> &'static str {
        match (self, notice) {
            (Self::Es, Notice::Processed) => "Plan procesado correctamente",
            (Self::Es, Notice::Failed) => "Error al procesar el archivo",
            (Self::Es, Notice::FileRequired) => "El archivo es requerido",
            (Self::Es, Notice::StartDateRequired) => "La fecha de inicio es requerida",
            (Self::Es, Notice::EndDateRequired) => "La fecha de fin es requerida",
            (Self::Es, Notice::ImageRequired) => "Solo se permiten imágenes",
            (Self::En, Notice::Processed) => "Plan processed successfully",
            (Self::En, Notice::Failed) => "Error processing the file",
            (Self::En, Notice::FileRequired) => "A file is required",
            (Self::En, Notice::StartDateRequired) => "A start date is required",
            (Self::En, Notice::EndDateRequired) => "An end date is required",
            (Self::En, Notice::ImageRequired) => "Only image files are allowed",
        }
    }
}

impl FromStr for Locale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "es" | "es-es" | "spanish" => Ok(Self::Es),
            "en" | "en-us" | "en-gb" | "english" => Ok(Self::En),
            other => Err(format!("Unsupported locale '{other}' (expected es or en)")),
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_locale_is_spanish() {
        let locale = Locale::default();
        assert_eq!(locale, Locale::Es);
        assert_eq!(
            locale.message(Notice::Processed),
            "Plan procesado correctamente"
        );
        assert_eq!(locale.message(Notice::Failed), "Error al procesar el archivo");
    }

    #[test]
    fn test_parse_locale() {
        assert_eq!("EN".parse::<Locale>(), Ok(Locale::En));
        assert_eq!("es".parse::<Locale>(), Ok(Locale::Es));
        assert!("fr".parse::<Locale>().is_err());
    }
}
