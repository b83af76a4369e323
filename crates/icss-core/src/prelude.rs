use crate::ast::Literal;
use crate::error::PreludeError;
use crate::parser::parse_literal;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Variables defined before the stylesheet's own, loaded from JSON.
///
/// Expected structure:
/// ```json
/// { "variables": { "PrimaryColor": "#ff0000", "Gutter": "10px" } }
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Prelude {
    variables: BTreeMap<String, Literal>,
}

#[derive(Debug, Deserialize)]
struct RawPrelude {
    #[serde(default)]
    variables: BTreeMap<String, String>,
}

impl Prelude {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load(path: &Path) -> Result<Self, PreludeError> {
        let data = fs::read_to_string(path).map_err(|source| PreludeError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&data).map_err(|err| match err {
            PreludeError::Json { source, .. } => PreludeError::Json {
                path: path.display().to_string(),
                source,
            },
            other => other,
        })
    }

    pub fn from_json(data: &str) -> Result<Self, PreludeError> {
        let raw: RawPrelude = serde_json::from_str(data).map_err(|source| PreludeError::Json {
            path: "<inline>".to_string(),
            source,
        })?;

        let mut prelude = Self::new();
        for (name, text) in raw.variables {
            let literal = parse_literal(&text).map_err(|source| PreludeError::InvalidValue {
                name: name.clone(),
                source,
            })?;
            prelude.define(name, literal)?;
        }
        tracing::debug!(variables = prelude.len(), "loaded prelude");
        Ok(prelude)
    }

    pub fn define(&mut self, name: impl Into<String>, value: Literal) -> Result<(), PreludeError> {
        let name = name.into();
        if !name.starts_with(|c: char| c.is_ascii_uppercase()) {
            return Err(PreludeError::InvalidName { name });
        }
        self.variables.insert(name, value);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Literal> {
        self.variables.get(name)
    }

    pub fn len(&self) -> usize {
        self.variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Literal)> {
        self.variables
            .iter()
            .map(|(name, value)| (name.as_str(), value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_literal_values() {
        let prelude = Prelude::from_json(
            r##"{ "variables": { "Brand": "#336699", "Gutter": "12px", "Dark": "false" } }"##,
        )
        .expect("prelude");
        assert_eq!(prelude.len(), 3);
        assert_eq!(prelude.get("Brand"), Some(&Literal::Color("#336699".into())));
        assert_eq!(prelude.get("Gutter"), Some(&Literal::Pixel(12)));
        assert_eq!(prelude.get("Dark"), Some(&Literal::Bool(false)));
    }

    #[test]
    fn missing_variables_key_is_empty() {
        assert!(Prelude::from_json("{}").expect("prelude").is_empty());
    }

    #[test]
    fn rejects_lowercase_names() {
        let err = Prelude::from_json(r#"{ "variables": { "gutter": "1px" } }"#).unwrap_err();
        assert!(matches!(err, PreludeError::InvalidName { name } if name == "gutter"));
    }

    #[test]
    fn rejects_expressions_as_values() {
        let err = Prelude::from_json(r#"{ "variables": { "Gutter": "1px + 1px" } }"#).unwrap_err();
        assert!(matches!(err, PreludeError::InvalidValue { .. }));
    }

    #[test]
    fn reports_bad_json() {
        let err = Prelude::from_json("{ variables").unwrap_err();
        assert!(matches!(err, PreludeError::Json { .. }));
    }

    #[test]
    fn reports_missing_file() {
        let err = Prelude::load(Path::new("does/not/exist.json")).unwrap_err();
        assert!(err.to_string().starts_with("Failed to read does/not/exist.json"));
    }
}
