//! Run configuration (`apigen.toml`) parsing, CLI overrides and validation.

use crate::error::{ApigenError, Result};
use crate::registry::{validate_group_name, GroupRules};
use regex::Regex;
use serde::Deserialize;
use std::collections::HashSet;

/// Type pattern identifying subscript-method helpers: a dotted name whose
/// last segment starts with an underscore.
pub const DEFAULT_SUBSCRIPT_PATTERN: &str = r".*\._[^.]*";

/// Default column limit for summary signatures.
pub const DEFAULT_COLUMN_LIMIT: usize = 68;

/// A module to document and the directory its pages go to.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModuleSpec {
    pub name: String,
    pub output: String,
}

impl ModuleSpec {
    /// Parse a `name=dir` command-line mapping.
    pub fn parse_mapping(text: &str) -> Result<Self> {
        let (name, output) = text.split_once('=').ok_or_else(|| ApigenError::Config {
            reason: format!("module mapping '{}' must have the form name=dir", text),
        })?;
        let name = name.trim();
        if name.is_empty() {
            return Err(ApigenError::Config {
                reason: format!("module mapping '{}' has an empty module name", text),
            });
        }
        Ok(Self {
            name: name.to_string(),
            output: output.trim().trim_matches('/').to_string(),
        })
    }
}

/// Group assignment for every member with a given name.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GroupOverride {
    pub name: String,
    pub group: String,
}

/// The on-disk configuration file.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    #[serde(default)]
    pub subscript_method_types: Option<String>,
    #[serde(default)]
    pub column_limit: Option<usize>,
    #[serde(default)]
    pub class_page_suffix: Option<bool>,
    #[serde(default)]
    pub modules: Vec<ModuleSpec>,
    #[serde(default)]
    pub group_overrides: Vec<GroupOverride>,
}

impl FileConfig {
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| ApigenError::Config {
            reason: e.to_string(),
        })
    }
}

/// Settings given on the command line; they take precedence over the file.
#[derive(Debug, Default)]
pub struct Overrides {
    pub modules: Vec<ModuleSpec>,
    pub subscript_pattern: Option<String>,
    pub column_limit: Option<usize>,
}

/// Validated, immutable settings for one run.
#[derive(Debug)]
pub struct Config {
    pub modules: Vec<ModuleSpec>,
    /// Anchored form of the subscript-method type pattern.
    pub subscript_pattern: Regex,
    pub column_limit: usize,
    pub class_page_suffix: bool,
    pub group_rules: GroupRules,
}

impl Config {
    /// Merge file settings with command-line overrides and validate.
    ///
    /// A command-line module mapping replaces the output directory of a
    /// configured module with the same name; new names are appended.
    pub fn resolve(file: FileConfig, overrides: Overrides) -> Result<Self> {
        let mut seen = HashSet::new();
        for module in &file.modules {
            if !seen.insert(module.name.clone()) {
                return Err(ApigenError::DuplicateModule {
                    module: module.name.clone(),
                });
            }
        }

        let mut modules = file.modules;
        let mut cli_seen = HashSet::new();
        for module in overrides.modules {
            if !cli_seen.insert(module.name.clone()) {
                return Err(ApigenError::DuplicateModule { module: module.name });
            }
            match modules.iter_mut().find(|m| m.name == module.name) {
                Some(existing) => existing.output = module.output,
                None => modules.push(module),
            }
        }
        for module in &mut modules {
            module.output = module.output.trim_matches('/').to_string();
        }

        let source = overrides
            .subscript_pattern
            .or(file.subscript_method_types)
            .unwrap_or_else(|| DEFAULT_SUBSCRIPT_PATTERN.to_string());
        let subscript_pattern = compile_pattern(&source)?;

        let column_limit = overrides
            .column_limit
            .or(file.column_limit)
            .unwrap_or(DEFAULT_COLUMN_LIMIT);
        if column_limit == 0 {
            return Err(ApigenError::Config {
                reason: "column_limit must be greater than zero".to_string(),
            });
        }

        for o in &file.group_overrides {
            validate_group_name(&o.name, &o.group)?;
        }
        let group_rules = GroupRules::new(file.group_overrides.into_iter().map(|o| (o.name, o.group)));

        Ok(Self {
            modules,
            subscript_pattern,
            column_limit,
            class_page_suffix: file.class_page_suffix.unwrap_or(false),
            group_rules,
        })
    }
}

/// Compile a pattern that must match a whole type name.
pub fn compile_pattern(source: &str) -> Result<Regex> {
    Regex::new(&format!("^(?:{})$", source)).map_err(|e| ApigenError::InvalidPattern {
        pattern: source.to_string(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::EntityKind;

    const SAMPLE: &str = r#"
subscript_method_types = '.*\._[^.]*'
column_limit = 80

[[modules]]
name = "m"
output = "api/"

[[modules]]
name = "m.sub"
output = "api/sub"

[[group_overrides]]
name = "__call__"
group = "Call operators"
"#;

    #[test]
    fn parses_file() {
        let file = FileConfig::parse(SAMPLE).unwrap();
        assert_eq!(file.modules.len(), 2);
        assert_eq!(file.column_limit, Some(80));
        let config = Config::resolve(file, Overrides::default()).unwrap();
        assert_eq!(config.modules[0].output, "api");
        assert!(config.subscript_pattern.is_match("Arr._Vindex"));
        assert!(!config.subscript_pattern.is_match("Arr.Vindex"));
        assert_eq!(
            config.group_rules.default_group("__call__", EntityKind::Method),
            "Call operators"
        );
    }

    #[test]
    fn defaults_apply() {
        let config = Config::resolve(FileConfig::default(), Overrides::default()).unwrap();
        assert_eq!(config.column_limit, DEFAULT_COLUMN_LIMIT);
        assert!(!config.class_page_suffix);
        assert!(config.subscript_pattern.is_match("m.Arr._Oindex"));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = FileConfig::parse("colum_limit = 3\n").unwrap_err();
        assert!(matches!(err, ApigenError::Config { .. }));
    }

    #[test]
    fn duplicate_module_in_file() {
        let file = FileConfig::parse(
            "[[modules]]\nname = \"m\"\noutput = \"a\"\n[[modules]]\nname = \"m\"\noutput = \"b\"\n",
        )
        .unwrap();
        let err = Config::resolve(file, Overrides::default()).unwrap_err();
        assert!(matches!(err, ApigenError::DuplicateModule { .. }));
    }

    #[test]
    fn cli_mapping_replaces_output() {
        let file = FileConfig::parse(SAMPLE).unwrap();
        let overrides = Overrides {
            modules: vec![
                ModuleSpec::parse_mapping("m=docs").unwrap(),
                ModuleSpec::parse_mapping("other=x").unwrap(),
            ],
            ..Default::default()
        };
        let config = Config::resolve(file, overrides).unwrap();
        let names: Vec<(&str, &str)> = config
            .modules
            .iter()
            .map(|m| (m.name.as_str(), m.output.as_str()))
            .collect();
        assert_eq!(names, [("m", "docs"), ("m.sub", "api/sub"), ("other", "x")]);
    }

    #[test]
    fn invalid_pattern() {
        let overrides = Overrides {
            subscript_pattern: Some("(".to_string()),
            ..Default::default()
        };
        let err = Config::resolve(FileConfig::default(), overrides).unwrap_err();
        assert!(matches!(err, ApigenError::InvalidPattern { .. }));
    }

    #[test]
    fn mapping_requires_equals() {
        assert!(ModuleSpec::parse_mapping("m").is_err());
        assert!(ModuleSpec::parse_mapping("=dir").is_err());
    }

    #[test]
    fn override_group_is_validated() {
        let file = FileConfig::parse("[[group_overrides]]\nname = \"f\"\ngroup = \"a|b\"\n").unwrap();
        assert!(matches!(
            Config::resolve(file, Overrides::default()),
            Err(ApigenError::InvalidGroupName { .. })
        ));
    }
}
