//! Build targets and their persisted configuration.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use serde::de::Error as _;
use serde::ser::SerializeStruct;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_yaml::Value;

use crate::builder::context::BuildParameters;
use crate::core::workspace::{Workspace, WorkspaceError};
use crate::util::yaml::{null_as_default, scalar_to_string};

/// The only project type the build driver knows how to drive.
pub const CMAKE_PROJECT_TYPE: &str = "CMake";

/// A named CMake cache option.
///
/// Written either as a bare scalar (`OPT: "ON"`) or as a typed mapping
/// (`OPT: {type: BOOL, value: "ON"}`); the shape survives a round-trip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CMakeOption {
    Bare(String),
    Typed { kind: String, value: String },
}

impl CMakeOption {
    pub fn value(&self) -> &str {
        match self {
            CMakeOption::Bare(value) | CMakeOption::Typed { value, .. } => value,
        }
    }

    /// The cache type, empty for bare options.
    pub fn kind(&self) -> &str {
        match self {
            CMakeOption::Bare(_) => "",
            CMakeOption::Typed { kind, .. } => kind,
        }
    }

    /// Render as a `-D` definition for the configure command line.
    pub fn to_define(&self, name: &str) -> String {
        match self {
            CMakeOption::Bare(value) => format!("-D{}={}", name, value),
            CMakeOption::Typed { kind, value } => format!("-D{}:{}={}", name, kind, value),
        }
    }
}

impl Serialize for CMakeOption {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            CMakeOption::Bare(value) => serializer.serialize_str(value),
            CMakeOption::Typed { kind, value } => {
                let mut state = serializer.serialize_struct("CMakeOption", 2)?;
                state.serialize_field("type", kind)?;
                state.serialize_field("value", value)?;
                state.end()
            }
        }
    }
}

impl<'de> Deserialize<'de> for CMakeOption {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Value::deserialize(deserializer)?;

        let Value::Mapping(map) = &raw else {
            return scalar_to_string(&raw).map(CMakeOption::Bare).ok_or_else(|| {
                D::Error::custom("cmake option must be a scalar or a {type, value} mapping")
            });
        };

        let field = |name: &str| -> Result<String, D::Error> {
            match map.get(name) {
                None => Ok(String::new()),
                Some(v) => scalar_to_string(v)
                    .ok_or_else(|| D::Error::custom(format!("cmake option `{}` must be a scalar", name))),
            }
        };

        let kind = field("type")?;
        let value = field("value")?;
        if kind.is_empty() {
            Ok(CMakeOption::Bare(value))
        } else {
            Ok(CMakeOption::Typed { kind, value })
        }
    }
}

/// Per-target settings, as stored under `targets:` in the workspace file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TargetConfiguration {
    /// Workspace source to build from; empty means the source named like the target.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub source: String,

    /// Sub-directory of the source to treat as the project root.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root_path: Option<String>,

    /// Targets this one depends on, optionally with a `/subpath` suffix.
    #[serde(default, deserialize_with = "null_as_default")]
    pub depends: Vec<String>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub project_type: String,

    /// Name used by dependents in `find_package`, if not the target name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cmake_package_name: Option<String>,

    /// Emits `<ALIAS>_ROOT=<source path>` for dependents.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub find_package_root: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub staged: Option<bool>,

    /// Absolute, or workspace-relative, path superseding `sources/<name>`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_source_override: Option<PathBuf>,

    /// Sub-directory of the build tree holding the generated package config.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub override_cmake_config_path: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extra_cmake_configure_args: Vec<String>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub cmake_options: BTreeMap<String, CMakeOption>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cxx_standard: Option<String>,
}

impl TargetConfiguration {
    /// A CMake target built from the given source.
    pub fn cmake(source: impl Into<String>) -> Self {
        TargetConfiguration {
            source: source.into(),
            project_type: CMAKE_PROJECT_TYPE.to_string(),
            ..Default::default()
        }
    }

    pub fn is_staged(&self) -> bool {
        self.staged.unwrap_or(false)
    }

    /// The source this target builds from, defaulting to the target name.
    pub fn source_name<'a>(&'a self, target_name: &'a str) -> &'a str {
        if self.source.is_empty() {
            target_name
        } else {
            &self.source
        }
    }

    /// Check that the project type is one the driver supports.
    ///
    /// An empty project type is treated as CMake.
    pub fn check_project_type(&self) -> Result<(), WorkspaceError> {
        if self.project_type.is_empty() || self.project_type.eq_ignore_ascii_case(CMAKE_PROJECT_TYPE) {
            Ok(())
        } else {
            Err(WorkspaceError::UnsupportedProjectType {
                project_type: self.project_type.clone(),
            })
        }
    }
}

/// Split a dependency entry into the target name and its optional sub-path.
pub fn split_dependency(dep: &str) -> (&str, Option<&str>) {
    match dep.split_once('/') {
        Some((name, sub)) => (name, Some(sub)),
        None => (dep, None),
    }
}

/// A target name paired with a snapshot of its configuration.
///
/// Changes made here are not persisted unless written back into the
/// workspace's target map.
#[derive(Debug, Clone)]
pub struct TargetContext {
    pub name: String,
    pub config: TargetConfiguration,
}

impl TargetContext {
    pub fn new(name: impl Into<String>, config: TargetConfiguration) -> Self {
        TargetContext {
            name: name.into(),
            config,
        }
    }

    pub fn source_name(&self) -> &str {
        self.config.source_name(&self.name)
    }

    /// Package name dependents pass to `find_package`.
    pub fn package_name(&self) -> &str {
        self.config
            .cmake_package_name
            .as_deref()
            .filter(|n| !n.is_empty())
            .unwrap_or(&self.name)
    }

    /// Directory holding the project's top-level `CMakeLists.txt`.
    pub fn source_path(&self, ws: &Workspace) -> PathBuf {
        if let Some(ref external) = self.config.external_source_override {
            // Relative overrides hang off the workspace root, not `sources/`.
            return if external.is_absolute() {
                external.clone()
            } else {
                ws.root().join(external)
            };
        }

        let mut path = ws.sources_dir().join(self.source_name());
        if let Some(ref root) = self.config.root_path {
            if !root.is_empty() {
                path = path.join(root);
            }
        }
        path
    }

    /// `buildspaces/<toolchain>/<target>/<configuration>`
    pub fn build_path(&self, ws: &Workspace, bp: &BuildParameters) -> PathBuf {
        ws.buildspaces_dir()
            .join(&bp.toolchain)
            .join(&self.name)
            .join(&bp.configuration)
    }

    /// `staging/<toolchain>/<configuration>/<target>`
    pub fn staging_path(&self, ws: &Workspace, bp: &BuildParameters) -> PathBuf {
        ws.root()
            .join("staging")
            .join(&bp.toolchain)
            .join(&bp.configuration)
            .join(&self.name)
    }

    /// `exports/<toolchain>/<target>/<configuration>`
    pub fn export_path(&self, ws: &Workspace, bp: &BuildParameters) -> PathBuf {
        ws.root()
            .join("exports")
            .join(&bp.toolchain)
            .join(&self.name)
            .join(&bp.configuration)
    }

    /// Where dependents find this target's generated package config.
    pub fn config_path(&self, ws: &Workspace, bp: &BuildParameters) -> PathBuf {
        let build = self.build_path(ws, bp);
        match self.config.override_cmake_config_path.as_deref() {
            Some(sub) if !sub.is_empty() => build.join(sub),
            _ => build,
        }
    }

    /// Whether the source directory exists on disk.
    pub fn source_exists(&self, ws: &Workspace) -> bool {
        self.source_path(ws).is_dir()
    }
}

impl fmt::Display for TargetContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn params() -> BuildParameters {
        BuildParameters::new("gcc", "Debug")
    }

    #[test]
    fn test_cmake_options_shapes() {
        let yaml = r#"
project_type: CMake
cmake_options:
  ENABLE_FEATURE:
    type: BOOL
    value: "ON"
  SOME_STRING:
    value: "hello"
  SIMPLE_OPT: "off"
  COUNT: 3
"#;
        let config: TargetConfiguration = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(
            config.cmake_options["ENABLE_FEATURE"],
            CMakeOption::Typed {
                kind: "BOOL".into(),
                value: "ON".into()
            }
        );
        assert_eq!(config.cmake_options["SOME_STRING"], CMakeOption::Bare("hello".into()));
        assert_eq!(config.cmake_options["SIMPLE_OPT"], CMakeOption::Bare("off".into()));
        assert_eq!(config.cmake_options["COUNT"], CMakeOption::Bare("3".into()));
    }

    #[test]
    fn test_cmake_options_round_trip() {
        let mut config = TargetConfiguration::cmake("");
        config
            .cmake_options
            .insert("OPT".into(), CMakeOption::Typed { kind: "STRING".into(), value: "VAL".into() });
        config.cmake_options.insert("BARE".into(), CMakeOption::Bare("yes".into()));

        let yaml = serde_yaml::to_string(&config).unwrap();
        let back: TargetConfiguration = serde_yaml::from_str(&yaml).unwrap();

        assert_eq!(back.cmake_options, config.cmake_options);
        assert_eq!(back.cmake_options["BARE"].kind(), "");
    }

    #[test]
    fn test_to_define() {
        let typed = CMakeOption::Typed { kind: "BOOL".into(), value: "ON".into() };
        assert_eq!(typed.to_define("ENABLE_FEATURE"), "-DENABLE_FEATURE:BOOL=ON");
        assert_eq!(CMakeOption::Bare("hello".into()).to_define("SOME_STRING"), "-DSOME_STRING=hello");
    }

    #[test]
    fn test_null_depends() {
        let config: TargetConfiguration = serde_yaml::from_str("depends:\nproject_type:\n").unwrap();
        assert!(config.depends.is_empty());
        assert!(config.check_project_type().is_ok());
    }

    #[test]
    fn test_project_type_check() {
        let mut config = TargetConfiguration::default();
        config.project_type = "cmake".into();
        assert!(config.check_project_type().is_ok());

        config.project_type = "meson".into();
        assert!(matches!(
            config.check_project_type(),
            Err(WorkspaceError::UnsupportedProjectType { .. })
        ));
    }

    #[test]
    fn test_split_dependency() {
        assert_eq!(split_dependency("fmt"), ("fmt", None));
        assert_eq!(split_dependency("boost/libs/asio"), ("boost", Some("libs/asio")));
    }

    #[test]
    fn test_paths() {
        let tmp = TempDir::new().unwrap();
        let ws = Workspace::empty(tmp.path());
        let root = ws.root().to_path_buf();

        let mut config = TargetConfiguration::cmake("monorepo");
        config.root_path = Some("libs/core".into());
        let target = TargetContext::new("core", config);

        assert_eq!(target.source_path(&ws), root.join("sources/monorepo/libs/core"));
        assert_eq!(target.build_path(&ws, &params()), root.join("buildspaces/gcc/core/Debug"));
        assert_eq!(target.staging_path(&ws, &params()), root.join("staging/gcc/Debug/core"));
        assert_eq!(target.export_path(&ws, &params()), root.join("exports/gcc/core/Debug"));
        assert_eq!(target.config_path(&ws, &params()), target.build_path(&ws, &params()));
    }

    #[test]
    fn test_external_override_and_config_path() {
        let tmp = TempDir::new().unwrap();
        let ws = Workspace::empty(tmp.path());

        let mut config = TargetConfiguration::default();
        config.external_source_override = Some(PathBuf::from("../elsewhere/zlib"));
        config.root_path = Some("ignored".into());
        config.override_cmake_config_path = Some("lib/cmake/ZLIB".into());
        let target = TargetContext::new("zlib", config);

        assert_eq!(target.source_path(&ws), ws.root().join("../elsewhere/zlib"));
        assert_eq!(
            target.config_path(&ws, &params()),
            ws.root().join("buildspaces/gcc/zlib/Debug/lib/cmake/ZLIB")
        );

        let abs = tmp.path().join("abs");
        let mut config = TargetConfiguration::default();
        config.external_source_override = Some(abs.clone());
        assert_eq!(TargetContext::new("zlib", config).source_path(&ws), abs);
    }

    #[test]
    fn test_relative_override_is_not_under_sources() {
        let tmp = TempDir::new().unwrap();
        let ws = Workspace::empty(tmp.path());
        std::fs::create_dir_all(ws.root().join("vendor/zlib")).unwrap();
        std::fs::create_dir_all(ws.sources_dir().join("vendor/zlib")).unwrap();

        let mut config = TargetConfiguration::default();
        config.external_source_override = Some(PathBuf::from("vendor/zlib"));
        let target = TargetContext::new("zlib", config);

        assert_eq!(target.source_path(&ws), ws.root().join("vendor/zlib"));
        assert!(target.source_exists(&ws));

        std::fs::remove_dir_all(ws.root().join("vendor")).unwrap();
        assert!(!target.source_exists(&ws));
    }

    #[test]
    fn test_package_name_defaults_to_target() {
        let target = TargetContext::new("fmt", TargetConfiguration::default());
        assert_eq!(target.package_name(), "fmt");

        let mut config = TargetConfiguration::default();
        config.cmake_package_name = Some("FMT".into());
        assert_eq!(TargetContext::new("fmt", config).package_name(), "FMT");
    }
}
