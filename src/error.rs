//! Application-level error type.
//!
//! Every failure that reaches `main` carries a process exit code:
//!
//! - `2`: usage, configuration or local IO problems
//! - `3`: no usable data
//! - `4`: runtime failures (network, terminal, numerical)

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

impl From<crate::forecast::ForecastError> for AppError {
    fn from(err: crate::forecast::ForecastError) -> Self {
        let code = match err {
            crate::forecast::ForecastError::NoData => 3,
            _ => 4,
        };
        AppError::new(code, format!("Forecast unavailable: {err}"))
    }
}
