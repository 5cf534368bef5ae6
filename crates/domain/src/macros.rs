//! Macro for implementing Display and FromStr for wire-named enums
//!
//! Roles and account states travel as lowercase strings. This macro provides
//! `as_str`, `Display` and case-insensitive `FromStr` from a single mapping.
//!
//! # Example
//!
//! ```rust
//! use coursehub_domain::impl_wire_name_conversions;
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq)]
//! pub enum Level {
//!     Beginner,
//!     Advanced,
//! }
//!
//! impl_wire_name_conversions!(Level {
//!     Beginner => "beginner",
//!     Advanced => "advanced",
//! });
//!
//! assert_eq!(Level::Advanced.as_str(), "advanced");
//! ```

/// Implements `as_str`, Display and FromStr for a fieldless enum
///
/// Parsing is case-insensitive and ignores surrounding whitespace; the
/// error names the enum and echoes the rejected input.
#[macro_export]
macro_rules! impl_wire_name_conversions {
    ($enum_name:ident { $($variant:ident => $str:expr),+ $(,)? }) => {
        impl $enum_name {
            /// Wire representation of this value
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $str,)+
                }
            }
        }

        impl std::fmt::Display for $enum_name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $enum_name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_lowercase().as_str() {
                    $($str => Ok(Self::$variant),)+
                    _ => Err(format!("Invalid {}: {}", stringify!($enum_name), s)),
                }
            }
        }
    };
}
