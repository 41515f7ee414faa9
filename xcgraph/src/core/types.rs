//! Node types for the project graph.
//!
//! Every entity lives in the graph arena under a [`NodeId`]. Relationships are
//! expressed as ids, never as embedded values, so two nodes with identical
//! fields remain distinct entities.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::GraphError;

/// Stable, document-unique node identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub u64);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// What a node's `path` is relative to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceTree {
    /// Relative to the enclosing group's directory.
    Group,
    /// Relative to the directory holding the project document.
    SourceRoot,
    Absolute,
    Sdk,
    BuiltProductsDir,
}

/// File classification derived from the extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileKind {
    Source,
    Header,
    Resource,
    AssetCatalog,
    Storyboard,
    Archive,
    Framework,
    Bundle,
    Folder,
    Text,
    Application,
    Unknown,
}

impl FileKind {
    /// Kinds that belong in the compile-sources step.
    pub fn is_compilable(self) -> bool {
        matches!(self, FileKind::Source)
    }

    /// Kinds that exist on disk as directories.
    pub fn is_directory(self) -> bool {
        matches!(
            self,
            FileKind::AssetCatalog
                | FileKind::Framework
                | FileKind::Bundle
                | FileKind::Folder
                | FileKind::Application
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    pub source_tree: SourceTree,
    #[serde(default)]
    pub children: Vec<NodeId>,
}

impl Group {
    /// Virtual group with a display name and no directory of its own.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            path: None,
            source_tree: SourceTree::Group,
            children: Vec::new(),
        }
    }

    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .or(self.path.as_deref())
            .unwrap_or("")
    }

    /// True when either the display name or the path segment equals `segment`.
    pub fn matches_segment(&self, segment: &str) -> bool {
        self.name.as_deref() == Some(segment) || self.path.as_deref() == Some(segment)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileReference {
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub source_tree: SourceTree,
    pub file_kind: FileKind,
}

impl FileReference {
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.path)
    }

    /// Last path component.
    pub fn leaf_name(&self) -> &str {
        leaf_name(&self.path)
    }
}

/// A group whose members mirror a directory at build time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SynchronizedGroup {
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub source_tree: SourceTree,
}

impl SynchronizedGroup {
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.path)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepKind {
    Sources,
    Resources,
    Frameworks,
    CopyFiles,
    RunScript,
}

impl fmt::Display for StepKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            StepKind::Sources => "sources",
            StepKind::Resources => "resources",
            StepKind::Frameworks => "frameworks",
            StepKind::CopyFiles => "copy-files",
            StepKind::RunScript => "run-script",
        };
        f.write_str(label)
    }
}

/// Destination folder of a copy-files step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CopyDestination {
    Frameworks,
    Resources,
    Executables,
    PlugIns,
    SharedSupport,
    Products,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildStep {
    pub kind: StepKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination: Option<CopyDestination>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub script: Option<String>,
    #[serde(default)]
    pub joins: Vec<NodeId>,
}

impl BuildStep {
    pub fn new(kind: StepKind) -> Self {
        Self {
            kind,
            name: None,
            destination: None,
            script: None,
            joins: Vec::new(),
        }
    }
}

/// Inclusion of one file (or synchronized group) in one build step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Join {
    pub file: NodeId,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attributes: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductType {
    Application,
    Framework,
    StaticLibrary,
    DynamicLibrary,
    UnitTests,
    UiTests,
    CommandLineTool,
    AppExtension,
    Bundle,
}

impl ProductType {
    /// File name of the built product for a target called `name`.
    pub fn product_file_name(self, name: &str) -> String {
        match self {
            ProductType::Application => format!("{name}.app"),
            ProductType::Framework => format!("{name}.framework"),
            ProductType::StaticLibrary => format!("lib{name}.a"),
            ProductType::DynamicLibrary => format!("lib{name}.dylib"),
            ProductType::UnitTests | ProductType::UiTests => format!("{name}.xctest"),
            ProductType::CommandLineTool => name.to_string(),
            ProductType::AppExtension => format!("{name}.appex"),
            ProductType::Bundle => format!("{name}.bundle"),
        }
    }

    pub fn product_kind(self) -> FileKind {
        match self {
            ProductType::Application | ProductType::AppExtension => FileKind::Application,
            ProductType::Framework => FileKind::Framework,
            ProductType::StaticLibrary => FileKind::Archive,
            ProductType::UnitTests | ProductType::UiTests | ProductType::Bundle => {
                FileKind::Bundle
            }
            ProductType::DynamicLibrary | ProductType::CommandLineTool => FileKind::Unknown,
        }
    }
}

impl FromStr for ProductType {
    type Err = GraphError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let parsed = match value.to_ascii_lowercase().as_str() {
            "app" | "application" => ProductType::Application,
            "framework" => ProductType::Framework,
            "static-library" | "staticlib" | "library.static" => ProductType::StaticLibrary,
            "dynamic-library" | "dylib" | "library.dynamic" => ProductType::DynamicLibrary,
            "unit-tests" | "unit-test" | "tests" => ProductType::UnitTests,
            "ui-tests" | "ui-test" => ProductType::UiTests,
            "tool" | "command-line-tool" => ProductType::CommandLineTool,
            "app-extension" | "extension" => ProductType::AppExtension,
            "bundle" => ProductType::Bundle,
            _ => return Err(GraphError::invalid(value, "unknown product type")),
        };
        Ok(parsed)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Platform {
    Ios,
    Macos,
    Tvos,
    Watchos,
    Visionos,
}

impl Platform {
    pub fn sdk_root(self) -> &'static str {
        match self {
            Platform::Ios => "iphoneos",
            Platform::Macos => "macosx",
            Platform::Tvos => "appletvos",
            Platform::Watchos => "watchos",
            Platform::Visionos => "xros",
        }
    }
}

impl FromStr for Platform {
    type Err = GraphError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let parsed = match value.to_ascii_lowercase().as_str() {
            "ios" | "iphoneos" => Platform::Ios,
            "macos" | "macosx" | "osx" => Platform::Macos,
            "tvos" | "appletvos" => Platform::Tvos,
            "watchos" => Platform::Watchos,
            "visionos" | "xros" => Platform::Visionos,
            _ => return Err(GraphError::invalid(value, "unknown platform")),
        };
        Ok(parsed)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Target {
    pub name: String,
    pub product_type: ProductType,
    #[serde(default)]
    pub steps: Vec<NodeId>,
    /// Ids of [`DependencyEdge`] nodes owned by this target.
    #[serde(default)]
    pub dependencies: Vec<NodeId>,
    pub configuration_list: NodeId,
    /// Ids of [`PackageReference`] nodes this target links against.
    #[serde(default)]
    pub package_products: Vec<NodeId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product: Option<NodeId>,
}

/// Directed edge from the owning target to `target`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyEdge {
    pub target: NodeId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigurationList {
    pub configurations: Vec<NodeId>,
    pub default_configuration: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Configuration {
    pub name: String,
    #[serde(default)]
    pub settings: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum VersionRequirement {
    Exact { version: String },
    UpToNextMajor { version: String },
    Branch { name: String },
}

impl fmt::Display for VersionRequirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VersionRequirement::Exact { version } => write!(f, "exact {version}"),
            VersionRequirement::UpToNextMajor { version } => write!(f, "from {version}"),
            VersionRequirement::Branch { name } => write!(f, "branch {name}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageReference {
    pub url: String,
    pub requirement: VersionRequirement,
}

/// Every entity stored in the graph arena.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "isa", rename_all = "snake_case")]
pub enum Node {
    Group(Group),
    FileReference(FileReference),
    SynchronizedGroup(SynchronizedGroup),
    BuildStep(BuildStep),
    Join(Join),
    Target(Target),
    DependencyEdge(DependencyEdge),
    ConfigurationList(ConfigurationList),
    Configuration(Configuration),
    PackageReference(PackageReference),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Group,
    FileReference,
    SynchronizedGroup,
    BuildStep,
    Join,
    Target,
    DependencyEdge,
    ConfigurationList,
    Configuration,
    PackageReference,
}

impl Node {
    pub fn kind(&self) -> NodeKind {
        match self {
            Node::Group(_) => NodeKind::Group,
            Node::FileReference(_) => NodeKind::FileReference,
            Node::SynchronizedGroup(_) => NodeKind::SynchronizedGroup,
            Node::BuildStep(_) => NodeKind::BuildStep,
            Node::Join(_) => NodeKind::Join,
            Node::Target(_) => NodeKind::Target,
            Node::DependencyEdge(_) => NodeKind::DependencyEdge,
            Node::ConfigurationList(_) => NodeKind::ConfigurationList,
            Node::Configuration(_) => NodeKind::Configuration,
            Node::PackageReference(_) => NodeKind::PackageReference,
        }
    }

    /// Nodes that may appear in a group's `children`.
    pub fn is_group_member(&self) -> bool {
        matches!(
            self,
            Node::Group(_) | Node::FileReference(_) | Node::SynchronizedGroup(_)
        )
    }

    /// Nodes a [`Join`] may point at.
    pub fn is_joinable(&self) -> bool {
        matches!(self, Node::FileReference(_) | Node::SynchronizedGroup(_))
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            NodeKind::Group => "group",
            NodeKind::FileReference => "file reference",
            NodeKind::SynchronizedGroup => "synchronized group",
            NodeKind::BuildStep => "build step",
            NodeKind::Join => "join",
            NodeKind::Target => "target",
            NodeKind::DependencyEdge => "dependency edge",
            NodeKind::ConfigurationList => "configuration list",
            NodeKind::Configuration => "configuration",
            NodeKind::PackageReference => "package reference",
        };
        f.write_str(label)
    }
}

/// Last `/`-separated component of `path`, ignoring a trailing slash.
pub fn leaf_name(path: &str) -> &str {
    let trimmed = path.trim_end_matches('/');
    trimmed.rsplit('/').next().unwrap_or(trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leaf_name_handles_nested_and_trailing_slash() {
        assert_eq!(leaf_name("Sources/Login/Login.swift"), "Login.swift");
        assert_eq!(leaf_name("Assets/"), "Assets");
        assert_eq!(leaf_name("README.md"), "README.md");
    }

    #[test]
    fn node_serializes_with_kind_tag() {
        let node = Node::Join(Join {
            file: NodeId(7),
            attributes: Vec::new(),
        });
        let json = serde_json::to_string(&node).expect("serialize");
        assert_eq!(json, r#"{"isa":"join","file":7}"#);
    }

    #[test]
    fn product_type_parses_aliases() {
        assert_eq!("app".parse::<ProductType>(), Ok(ProductType::Application));
        assert_eq!("ui-tests".parse::<ProductType>(), Ok(ProductType::UiTests));
        assert!("widget".parse::<ProductType>().is_err());
    }
}
