// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Diagnostic code registry.
//!
//! Maps codes (E0001, guarded-by/invalid, etc.) to titles and categories.
//! Used for JSON output and `guardcheck explain`-style listings.

use std::collections::HashMap;

/// Registry of all known diagnostic codes.
pub struct ErrorCodeRegistry {
    codes: HashMap<&'static str, ErrorCodeInfo>,
}

/// Information about a single code.
pub struct ErrorCodeInfo {
    pub code: &'static str,
    pub title: &'static str,
    pub category: ErrorCategory,
}

/// Category for grouping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Syntax,
    Resolution,
    Locking,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorCategory::Syntax => write!(f, "Syntax"),
            ErrorCategory::Resolution => write!(f, "Resolution"),
            ErrorCategory::Locking => write!(f, "Locking"),
        }
    }
}

macro_rules! register_codes {
    ($($code:literal => ($title:literal, $cat:expr)),* $(,)?) => {{
        let mut map = HashMap::new();
        $(
            map.insert($code, ErrorCodeInfo {
                code: $code,
                title: $title,
                category: $cat,
            });
        )*
        map
    }};
}

impl Default for ErrorCodeRegistry {
    fn default() -> Self {
        use ErrorCategory::*;

        Self {
            codes: register_codes! {
                // Lexer errors (E00xx)
                "E0001" => ("invalid token", Syntax),

                // Parser errors (E01xx)
                "E0100" => ("unexpected token", Syntax),

                // Resolver errors (E02xx)
                "E0201" => ("duplicate class", Resolution),
                "E0202" => ("duplicate field", Resolution),
                "E0203" => ("cyclic inheritance", Resolution),

                // Lock discipline rules
                "guarded-by/unguarded-access" => ("guarded member accessed without its lock", Locking),
                "guarded-by/invalid" => ("guard expression does not name a lock", Locking),
            },
        }
    }
}

impl ErrorCodeRegistry {
    pub fn get(&self, code: &str) -> Option<&ErrorCodeInfo> {
        self.codes.get(code)
    }

    pub fn all(&self) -> impl Iterator<Item = &ErrorCodeInfo> {
        self.codes.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rule_ids_are_registered() {
        let registry = ErrorCodeRegistry::default();
        let info = registry.get("guarded-by/invalid").unwrap();
        assert_eq!(info.category, ErrorCategory::Locking);
        assert_eq!(registry.get("E0203").unwrap().title, "cyclic inheritance");
        assert!(registry.get("E9999").is_none());
        assert_eq!(registry.all().count(), 7);
    }
}
