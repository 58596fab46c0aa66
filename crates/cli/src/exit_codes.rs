//! CLI Exit Code Registry
//!
//! Single source of truth for `colcmp` exit codes. Scripts rely on them.
//!
//! | Code | Meaning                                            |
//! |------|----------------------------------------------------|
//! | 0    | Success (columns may still differ)                 |
//! | 1    | Columns differ and `--strict` was given            |
//! | 2    | Usage error (bad flags, missing selection/profile) |
//! | 3    | Workbook could not be loaded                       |
//! | 4    | Comparison failed (unknown sheet, bad column)      |
//! | 5    | Result could not be written                        |
//!
//! # Adding New Exit Codes
//!
//! 1. Add the constant here
//! 2. Update the table above
//! 3. Wire it into `CliError`

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// Columns differ. Only returned under `--strict` (or `compare.strictExit`).
/// Like `diff(1)`, exit 1 means "inputs differ."
pub const EXIT_DIFFERENCES: u8 = 1;

/// Usage error - bad arguments, missing required options, bad profile.
pub const EXIT_USAGE: u8 = 2;

/// Load error - unreadable file, unsupported container, no sheets.
pub const EXIT_LOAD: u8 = 3;

/// Compare error - a selected sheet does not exist or a column is not letters.
pub const EXIT_COMPARE: u8 = 4;

/// Output error - writing stdout or the `--output` file failed.
pub const EXIT_OUTPUT: u8 = 5;
