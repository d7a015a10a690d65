//! Input validation and sanitization stages.
//!
//! - [`patterns`] – the compiled-in injection blacklist and the
//!   [`InjectionScanner`](patterns::InjectionScanner) shared engine
//! - [`validator`] – length, encoding, and critical-context bounds checks
//! - [`sanitizer`] – blacklist rejection and pattern stripping

pub mod patterns;
pub mod sanitizer;
pub mod validator;

pub use patterns::{INJECTION_PATTERNS, InjectionScanner};
pub use sanitizer::InputSanitizer;
pub use validator::InputValidator;
