//! Exit codes for the ampute CLI.
//!
//! Stable across releases so scripts can branch on the outcome without
//! parsing output.

use amp_common::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// Success
    Clean = 0,

    /// Invalid configuration or pattern set
    ConfigError = 10,

    /// Dataset unusable for the requested amputation
    DataError = 11,

    /// I/O error
    IoError = 13,

    /// Internal/unknown error
    InternalError = 99,
}

impl ExitCode {
    /// Convert to i32 for process exit.
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    pub fn is_success(self) -> bool {
        matches!(self, ExitCode::Clean)
    }

    /// Map an engine error to the code reported to the shell.
    pub fn from_error(err: &Error) -> Self {
        if err.is_config() {
            return ExitCode::ConfigError;
        }
        if err.is_data() {
            return ExitCode::DataError;
        }
        match err {
            // A caller-supplied transform produced the bad values.
            Error::InvalidProbability { .. } => ExitCode::ConfigError,
            Error::Io(_) => ExitCode::IoError,
            Error::Json(_) => ExitCode::ConfigError,
            _ => ExitCode::InternalError,
        }
    }
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code as i32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn families_map_to_codes() {
        assert_eq!(ExitCode::from_error(&Error::PartialFrequencies), ExitCode::ConfigError);
        assert_eq!(
            ExitCode::from_error(&Error::DatasetTooSmall { columns: 1 }),
            ExitCode::DataError
        );
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        assert_eq!(ExitCode::from_error(&Error::Io(io)), ExitCode::IoError);
        assert_eq!(ExitCode::IoError.as_i32(), 13);
        assert!(ExitCode::Clean.is_success());
        assert!(!ExitCode::DataError.is_success());
    }
}
