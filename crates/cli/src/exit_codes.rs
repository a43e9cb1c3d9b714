//! CLI Exit Code Registry
//!
//! This is the single source of truth for all CLI exit codes.
//! Exit codes are part of the shell contract; scripts rely on them.
//!
//! | Code | Description                                           |
//! |------|-------------------------------------------------------|
//! | 0    | Success                                               |
//! | 1    | General error (unspecified)                           |
//! | 2    | CLI usage error (bad args, no input files)            |
//! | 3    | I/O error (missing input, unwritable output)          |
//! | 4    | Workbook could not be parsed                          |
//! | 5    | Invalid config (TOML syntax or validation)            |
//! | 6    | Missing bids found and `--strict` was given           |
//!
//! # Adding New Exit Codes
//!
//! 1. Add the constant
//! 2. Document what triggers it
//! 3. Update the table above
//! 4. Wire it into the relevant command's error handling

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
/// Avoid using this; prefer a specific error code.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, missing required options.
pub const EXIT_USAGE: u8 = 2;

/// Input file missing or unreadable, or an output could not be written.
pub const EXIT_IO: u8 = 3;

/// Input exists but is not a readable workbook.
pub const EXIT_WORKBOOK_PARSE: u8 = 4;

/// Config file failed to parse or validate.
pub const EXIT_INVALID_CONFIG: u8 = 5;

/// At least one contractor left a priced row without a rate or amount.
/// Only raised under `--strict`; otherwise missing bids are reported, not fatal.
pub const EXIT_MISSING_BIDS: u8 = 6;
