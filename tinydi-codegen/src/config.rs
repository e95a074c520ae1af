use crate::error::{CodegenError, Result};
use serde::{Deserialize, Serialize};
use std::env;

/// Variables read by [`GeneratorConfig::from_env`].
pub const ENV_VARS: &[&str] = &[
    "TINYDI_MARKER",
    "TINYDI_COMPONENT_NAMESPACE",
    "TINYDI_COMPONENT_NAME",
    "TINYDI_RUNTIME_PATH",
    "TINYDI_MAX_ROUNDS",
    "TINYDI_DENY_CYCLES",
];

/// Generator settings.
///
/// Defaults work for a crate that includes the generated component in a
/// `di` module and depends on `tinydi` under its own name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Attribute name marking injectable constructors.
    pub marker: String,
    /// Module the component file is meant to be included in.
    pub component_namespace: String,
    pub component_name: String,
    /// Path of the runtime crate as seen from generated code.
    pub runtime_path: String,
    pub max_rounds: usize,
    /// Fail generation on dependency cycles instead of warning.
    pub deny_cycles: bool,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            marker: "inject".to_string(),
            component_namespace: "crate::di".to_string(),
            component_name: "TinyDiComponent".to_string(),
            runtime_path: "::tinydi".to_string(),
            max_rounds: 8,
            deny_cycles: false,
        }
    }
}

impl GeneratorConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults overlaid with `TINYDI_*` environment variables.
    pub fn from_env() -> Result<Self> {
        Self::default().overlay(env::vars())
    }

    /// Apply `TINYDI_*` variables from `vars`, ignoring everything else.
    pub fn overlay<I, K, V>(mut self, vars: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        for (key, value) in vars {
            let value = value.into();
            match key.as_ref() {
                "TINYDI_MARKER" => self.marker = value,
                "TINYDI_COMPONENT_NAMESPACE" => self.component_namespace = value,
                "TINYDI_COMPONENT_NAME" => self.component_name = value,
                "TINYDI_RUNTIME_PATH" => self.runtime_path = value,
                "TINYDI_MAX_ROUNDS" => {
                    self.max_rounds = value.parse().map_err(|_| {
                        CodegenError::config(format!("TINYDI_MAX_ROUNDS is not a number: {}", value))
                    })?;
                }
                "TINYDI_DENY_CYCLES" => self.deny_cycles = parse_flag("TINYDI_DENY_CYCLES", &value)?,
                _ => {}
            }
        }
        self.validate()?;
        Ok(self)
    }

    pub fn marker(mut self, marker: impl Into<String>) -> Self {
        self.marker = marker.into();
        self
    }

    pub fn component_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.component_namespace = namespace.into();
        self
    }

    pub fn component_name(mut self, name: impl Into<String>) -> Self {
        self.component_name = name.into();
        self
    }

    pub fn runtime_path(mut self, path: impl Into<String>) -> Self {
        self.runtime_path = path.into();
        self
    }

    pub fn max_rounds(mut self, rounds: usize) -> Self {
        self.max_rounds = rounds;
        self
    }

    pub fn deny_cycles(mut self, deny: bool) -> Self {
        self.deny_cycles = deny;
        self
    }

    pub fn validate(&self) -> Result<()> {
        syn::parse_str::<syn::Ident>(&self.marker)
            .map_err(|_| CodegenError::config(format!("marker `{}` is not an identifier", self.marker)))?;
        syn::parse_str::<syn::Ident>(&self.component_name).map_err(|_| {
            CodegenError::config(format!(
                "component name `{}` is not an identifier",
                self.component_name
            ))
        })?;
        syn::parse_str::<syn::Path>(&self.component_namespace).map_err(|_| {
            CodegenError::config(format!(
                "component namespace `{}` is not a path",
                self.component_namespace
            ))
        })?;
        syn::parse_str::<syn::Path>(&self.runtime_path).map_err(|_| {
            CodegenError::config(format!("runtime path `{}` is not a path", self.runtime_path))
        })?;
        if self.max_rounds == 0 {
            return Err(CodegenError::config("max_rounds must be at least 1"));
        }
        Ok(())
    }
}

fn parse_flag(key: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        other => Err(CodegenError::config(format!("{} is not a boolean: {}", key, other))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = GeneratorConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.component_name, "TinyDiComponent");
        assert_eq!(config.max_rounds, 8);
    }

    #[test]
    fn test_overlay_reads_tinydi_variables() {
        let config = GeneratorConfig::default()
            .overlay([
                ("TINYDI_COMPONENT_NAME", "AppComponent"),
                ("TINYDI_MAX_ROUNDS", "3"),
                ("TINYDI_DENY_CYCLES", "yes"),
                ("PATH", "/usr/bin"),
            ])
            .unwrap();

        assert_eq!(config.component_name, "AppComponent");
        assert_eq!(config.max_rounds, 3);
        assert!(config.deny_cycles);
    }

    #[test]
    fn test_overlay_rejects_bad_values() {
        let err = GeneratorConfig::default()
            .overlay([("TINYDI_MAX_ROUNDS", "many")])
            .unwrap_err();
        assert!(matches!(err, CodegenError::Config(_)));

        let err = GeneratorConfig::default()
            .overlay([("TINYDI_COMPONENT_NAME", "not an ident")])
            .unwrap_err();
        assert!(err.to_string().contains("not an identifier"));
    }

    #[test]
    fn test_deserializes_partial_json() {
        let config: GeneratorConfig =
            serde_json::from_str(r#"{ "component_namespace": "crate::wiring" }"#).unwrap();
        assert_eq!(config.component_namespace, "crate::wiring");
        assert_eq!(config.marker, "inject");
    }
}
