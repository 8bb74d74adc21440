//! Standard exit codes for CLI operations
//!
//! These exit codes follow Unix conventions and sysexits.h where applicable.

#![allow(dead_code)]

/// Success - operation completed without errors
pub const SUCCESS: i32 = 0;

/// General error - unspecified failure
pub const ERROR: i32 = 1;

/// Validation error - the desired state is not admissible
pub const VALIDATION_ERROR: i32 = 2;

/// Chart error - a referenced chart is not resolvable
pub const CHART_ERROR: i32 = 3;

/// State file error - unreadable or unparsable desired state file
pub const STATE_FILE_ERROR: i32 = 4;

/// Usage error - invalid arguments or options (following sysexits.h convention)
pub const USAGE_ERROR: i32 = 64;
