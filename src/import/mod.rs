//! Plaine & Easie import
//!
//! Entry points that turn a PAE record set (header records plus `@data`)
//! into a [`Score`](crate::models::score::Score). Decoding never aborts on
//! malformed music; problems are collected in the returned diagnostics.
//!
//! # Usage
//!
//! ```rust,ignore
//! use pae_wasm::import::PaeInput;
//!
//! let result = PaeInput::new().import_string("@clef:G-2\n@data:4CDEF/2G/\n");
//! assert_eq!(result.score.measure_count(), 2);
//! ```

pub mod errors;
pub mod types;

pub use errors::ImportError;
pub use types::{ImportResult, ImportSettings};

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::converters::score_builder::{build_score, ScoreDefaults};
use crate::diagnostics::Diagnostics;
use crate::models::score::ScoreMeta;
use crate::parse::header::Header;
use crate::parse::incipit::parse_incipit;
use crate::parse::tokens::{decode_clef, decode_key, decode_time};

/// Importer for PAE record sets
#[derive(Debug, Clone, Default)]
pub struct PaeInput {
    settings: ImportSettings,
}

impl PaeInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_settings(settings: ImportSettings) -> Self {
        Self { settings }
    }

    /// Import records held in memory
    pub fn import_string(&self, text: &str) -> ImportResult {
        self.import_header(&Header::parse_str(text))
    }

    /// Import records from any buffered reader
    pub fn import_reader<R: BufRead>(&self, reader: R) -> Result<ImportResult, ImportError> {
        let header = Header::read_from(reader).map_err(|source| ImportError::Io {
            path: "<reader>".into(),
            source,
        })?;
        Ok(self.import_header(&header))
    }

    /// Import records from a file
    pub fn import_file(&self, path: impl AsRef<Path>) -> Result<ImportResult, ImportError> {
        let path = path.as_ref();
        let io_error = |source| ImportError::Io {
            path: path.to_path_buf(),
            source,
        };
        let file = File::open(path).map_err(io_error)?;
        let header = Header::read_from(BufReader::new(file)).map_err(io_error)?;
        log::info!("importing incipit from {}", path.display());
        Ok(self.import_header(&header))
    }

    /// Decode already-split header records
    pub fn import_header(&self, header: &Header) -> ImportResult {
        let mut diags = Diagnostics::new();

        let clef = if header.clef.is_empty() {
            None
        } else {
            Some(decode_clef(header.clef.as_bytes(), 0, &mut diags).0)
        };
        let key_sig = if header.keysig.is_empty() {
            None
        } else {
            Some(decode_key(header.keysig.as_bytes(), 0).0)
        };
        let meter_sig = if header.timesig.is_empty() {
            None
        } else {
            decode_time(header.timesig.as_bytes(), 0, &mut diags).0
        };
        let meta = ScoreMeta {
            key: non_empty(&header.key),
            alt_timesig: non_empty(&header.alttimesig),
        };

        let parsed = parse_incipit(&header.data, clef.clone(), &mut diags);
        let defaults = ScoreDefaults {
            clef,
            key_sig,
            meter_sig,
        };
        let score = build_score(&parsed, defaults, meta, &self.settings, &mut diags);

        log::debug!(
            "imported {} measure(s) with {} diagnostic(s)",
            score.measure_count(),
            diags.marks.len()
        );
        ImportResult {
            score,
            diagnostics: diags,
        }
    }
}

fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}

/// Import an in-memory record set with default settings
pub fn import_pae_str(text: &str) -> ImportResult {
    PaeInput::new().import_string(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::attributes::{Accidental, ClefShape, MeterSign};

    #[test]
    fn test_header_defaults_reach_score_def() {
        let result = import_pae_str("@clef:F-4\n@keysig:bBEA\n@timesig:c/\n@key:Es\n@data:4C/\n");
        let score_def = &result.score.score_def;
        let clef = score_def.staff_grp.staff_defs[0].clef.as_ref().unwrap();
        assert_eq!((clef.shape, clef.line), (Some(ClefShape::F), 4));
        let key = score_def.key_sig.as_ref().unwrap();
        assert_eq!((key.accid, key.count), (Some(Accidental::Flat), 3));
        assert_eq!(score_def.meter_sig.as_ref().unwrap().sym, Some(MeterSign::Cut));
        assert_eq!(result.score.meta.key.as_deref(), Some("Es"));
        assert!(result.score.meta.alt_timesig.is_none());
    }

    #[test]
    fn test_records_after_end_are_ignored() {
        let result = import_pae_str("@data:4C/\n@end:\n@data:4CDEF/GA/\n");
        assert_eq!(result.score.measure_count(), 1);
    }

    #[test]
    fn test_empty_input() {
        let result = import_pae_str("");
        assert_eq!(result.score.measure_count(), 0);
        assert!(result.score.score_def.staff_grp.staff_defs[0].clef.is_none());
        assert!(result.diagnostics.is_empty());
    }

    #[test]
    fn test_import_reader() {
        let text = "@clef:G-2\n@data:8ABC/\n";
        let result = PaeInput::new().import_reader(text.as_bytes()).unwrap();
        assert_eq!(result.score.measure_count(), 1);
    }

    #[test]
    fn test_missing_file() {
        let err = PaeInput::new().import_file("/nonexistent/incipit.pae").unwrap_err();
        assert!(matches!(err, ImportError::Io { .. }));
    }

    #[test]
    fn test_settings_applied() {
        let settings = ImportSettings {
            first_measure_n: 0,
            staff_lines: 4,
            ..ImportSettings::default()
        };
        let result = PaeInput::with_settings(settings).import_string("@data:4C/D/\n");
        let numbers: Vec<u32> = result.score.measures().map(|m| m.n).collect();
        assert_eq!(numbers, vec![0, 1]);
        assert_eq!(result.score.score_def.staff_grp.staff_defs[0].lines, 4);
    }
}
