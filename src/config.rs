//! CLI configuration.
//!
//! Thin argument-parsing glue around the engine: a mode, a snapshot path,
//! and a handful of flags. Parsing returns [`ConfigError`] so the binary
//! can report the fault on stderr and exit non-zero before anything is
//! scanned.

use std::path::PathBuf;

use thiserror::Error;

use crate::engine::DEFAULT_PAGE_SIZE;

/// Fatal configuration faults. All of them abort before the first fetch.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// No mode was given.
    #[error("missing mode (expected backfill-codes or repair-owner)")]
    MissingMode,

    /// The mode is not one the engine knows.
    #[error("unknown mode: {0} (expected backfill-codes or repair-owner)")]
    UnknownMode(String),

    /// No snapshot path was given.
    #[error("missing snapshot path")]
    MissingSnapshot,

    /// Repair mode without a UID to assign.
    #[error("Missing required arg: --uid <USER_UID>")]
    MissingUid,

    /// A flag that takes a value was given without one.
    #[error("{0} requires a value")]
    MissingValue(String),

    /// `--page-size` was not a positive integer.
    #[error("invalid page size: {0}")]
    InvalidPageSize(String),

    /// An argument the parser does not recognize.
    #[error("unknown argument: {0}")]
    UnknownArgument(String),
}

/// Which correctness rule the run applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Backfill `codes/{CODE}` mapping documents.
    BackfillCodes,
    /// Assign an owner to documents missing one.
    RepairOwner,
}

/// Parsed invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// The rule to run.
    pub mode: Mode,
    /// Snapshot file to load the collections from.
    pub snapshot: PathBuf,
    /// Where to write the mutated snapshot; defaults to in-place.
    pub out: Option<PathBuf>,
    /// UID to assign in repair mode.
    pub uid: Option<String>,
    /// Compute and count everything, persist nothing.
    pub dry_run: bool,
    /// Documents per fetched page.
    pub page_size: usize,
}

impl Config {
    /// Parses an argument list (without the program name).
    ///
    /// # Errors
    /// Returns the first configuration fault found; the caller reports it
    /// and exits non-zero.
    pub fn from_args<I>(args: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = String>,
    {
        let mut mode = None;
        let mut snapshot = None;
        let mut out = None;
        let mut uid = None;
        let mut dry_run = false;
        let mut page_size = DEFAULT_PAGE_SIZE;

        let mut args = args.into_iter();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--dry-run" => dry_run = true,
                "--uid" => {
                    uid = Some(args.next().ok_or_else(|| ConfigError::MissingValue(arg))?);
                }
                "--out" => {
                    out = Some(PathBuf::from(
                        args.next().ok_or_else(|| ConfigError::MissingValue(arg))?,
                    ));
                }
                "--page-size" => {
                    let raw = args.next().ok_or_else(|| ConfigError::MissingValue(arg))?;
                    page_size = match raw.parse::<usize>() {
                        Ok(n) if n > 0 => n,
                        _ => return Err(ConfigError::InvalidPageSize(raw)),
                    };
                }
                flag if flag.starts_with("--") => {
                    return Err(ConfigError::UnknownArgument(arg));
                }
                "backfill-codes" if mode.is_none() => mode = Some(Mode::BackfillCodes),
                "repair-owner" if mode.is_none() => mode = Some(Mode::RepairOwner),
                _ if mode.is_none() => return Err(ConfigError::UnknownMode(arg)),
                _ if snapshot.is_none() => snapshot = Some(PathBuf::from(arg)),
                _ => return Err(ConfigError::UnknownArgument(arg)),
            }
        }

        let mode = mode.ok_or(ConfigError::MissingMode)?;
        let snapshot = snapshot.ok_or(ConfigError::MissingSnapshot)?;
        if mode == Mode::RepairOwner && uid.as_deref().map_or(true, |u| u.trim().is_empty()) {
            return Err(ConfigError::MissingUid);
        }

        Ok(Self {
            mode,
            snapshot,
            out,
            uid,
            dry_run,
            page_size,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Config, ConfigError> {
        Config::from_args(args.iter().map(|s| (*s).to_string()))
    }

    #[test]
    fn test_backfill_defaults() {
        let config = parse(&["backfill-codes", "export.json"]).unwrap();
        assert_eq!(config.mode, Mode::BackfillCodes);
        assert_eq!(config.snapshot, PathBuf::from("export.json"));
        assert!(!config.dry_run);
        assert_eq!(config.page_size, DEFAULT_PAGE_SIZE);
        assert_eq!(config.uid, None);
    }

    #[test]
    fn test_repair_requires_uid() {
        assert_eq!(
            parse(&["repair-owner", "export.json"]).unwrap_err(),
            ConfigError::MissingUid
        );
        assert_eq!(
            parse(&["repair-owner", "export.json", "--uid", "  "]).unwrap_err(),
            ConfigError::MissingUid
        );

        let config = parse(&["repair-owner", "export.json", "--uid", "u9"]).unwrap();
        assert_eq!(config.uid.as_deref(), Some("u9"));
    }

    #[test]
    fn test_dry_run_and_page_size() {
        let config = parse(&[
            "backfill-codes",
            "export.json",
            "--dry-run",
            "--page-size",
            "50",
        ])
        .unwrap();
        assert!(config.dry_run);
        assert_eq!(config.page_size, 50);
    }

    #[test]
    fn test_invalid_page_size() {
        assert_eq!(
            parse(&["backfill-codes", "export.json", "--page-size", "0"]).unwrap_err(),
            ConfigError::InvalidPageSize("0".to_string())
        );
        assert_eq!(
            parse(&["backfill-codes", "export.json", "--page-size", "many"]).unwrap_err(),
            ConfigError::InvalidPageSize("many".to_string())
        );
    }

    #[test]
    fn test_missing_and_unknown_pieces() {
        assert_eq!(parse(&[]).unwrap_err(), ConfigError::MissingMode);
        assert_eq!(
            parse(&["backfill-codes"]).unwrap_err(),
            ConfigError::MissingSnapshot
        );
        assert!(matches!(
            parse(&["resync-everything", "export.json"]).unwrap_err(),
            ConfigError::UnknownMode(_)
        ));
        assert!(matches!(
            parse(&["backfill-codes", "export.json", "--fast"]).unwrap_err(),
            ConfigError::UnknownArgument(_)
        ));
        assert_eq!(
            parse(&["backfill-codes", "export.json", "--uid"]).unwrap_err(),
            ConfigError::MissingValue("--uid".to_string())
        );
    }

    #[test]
    fn test_out_path() {
        let config = parse(&["backfill-codes", "in.json", "--out", "fixed.json"]).unwrap();
        assert_eq!(config.out, Some(PathBuf::from("fixed.json")));
    }
}
