use convert_case::{Case, Casing};
use std::str::FromStr;
use thiserror::Error as ThisError;

///
/// RenameRuleError
///

#[derive(Debug, Eq, PartialEq, ThisError)]
pub enum RenameRuleError {
    #[error("unsupported rename rule '{0}'")]
    Unsupported(String),
}

///
/// RenameRule
///
/// Subset of serde's `rename_all` rules the schema derive understands.
/// Names are interpreted as Rust snake_case field identifiers.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RenameRule {
    Lower,
    Upper,
    Camel,
    Pascal,
    Snake,
    ScreamingSnake,
    Kebab,
}

impl RenameRule {
    /// Apply the rule to one field identifier.
    #[must_use]
    pub fn apply(self, name: &str) -> String {
        match self {
            Self::Lower | Self::Snake => name.to_string(),
            Self::Upper | Self::ScreamingSnake => name.to_ascii_uppercase(),
            Self::Camel => name.to_case(Case::Camel),
            Self::Pascal => name.to_case(Case::Pascal),
            Self::Kebab => name.to_case(Case::Kebab),
        }
    }
}

impl FromStr for RenameRule {
    type Err = RenameRuleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let rule = match s {
            "lowercase" => Self::Lower,
            "UPPERCASE" => Self::Upper,
            "camelCase" => Self::Camel,
            "PascalCase" => Self::Pascal,
            "snake_case" => Self::Snake,
            "SCREAMING_SNAKE_CASE" => Self::ScreamingSnake,
            "kebab-case" => Self::Kebab,
            other => return Err(RenameRuleError::Unsupported(other.to_string())),
        };

        Ok(rule)
    }
}

/// Convert any identifier (PascalCase, camelCase, kebab-case) to snake_case.
#[must_use]
pub fn to_snake_case(s: &str) -> String {
    s.to_case(Case::Snake)
}

/// Default collection name for an entity type: snake_case plural.
///
/// `OrderLine` becomes `order_lines`.
#[must_use]
pub fn default_collection_name(type_name: &str) -> String {
    format!("{}s", to_snake_case(type_name))
}
