//! # Manifest Documents
//!
//! `ManifestDocument` is the in-memory form of a repo-tool manifest: a root
//! `<manifest>` element holding `<project>` entries alongside whatever else the
//! file declares (`<remote>`, `<default>`, `<include>`, comments, ...). The
//! parsed `xot` tree is kept as is, including layout whitespace, and written
//! back with the `xot` serializer, so everything except inserted projects is
//! carried through untouched. A document this tool wrote that is loaded and
//! serialized again comes back byte for byte.
//!
//! Mutation is append-only. A new project is placed after the last node of the
//! root element, indented like its previous sibling. The document is persisted
//! with a single [`ManifestDocument::commit`] that replaces the file through a
//! temporary sibling, so readers never observe a half-written file.

use std::fs;
use std::io::Write as _;
use std::path::Path;

use log::warn;
use tempfile::NamedTempFile;
use xot::output::xml::{Declaration, Parameters};
use xot::{Node, Xot};

use crate::error::{Error, Result};

const MANIFEST: &str = "manifest";
const PROJECT: &str = "project";
const DEFAULT: &str = "default";
const INCLUDE: &str = "include";

/// Layout used when the root element gives nothing to copy.
const DEFAULT_SEPARATOR: &str = "\n  ";

/// Mode of overlays created by this tool.
#[cfg(unix)]
const NEW_FILE_MODE: u32 = 0o644;

/// A single `<project>` entry, identified by its checkout path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectEntry {
    pub path: String,
    pub remote: Option<String>,
    pub name: String,
    pub revision: Option<String>,
}

impl ProjectEntry {
    pub fn new(
        path: impl Into<String>,
        remote: impl Into<String>,
        name: impl Into<String>,
        revision: impl Into<String>,
    ) -> Self {
        Self {
            path: path.into(),
            remote: Some(remote.into()),
            name: name.into(),
            revision: Some(revision.into()),
        }
    }

    /// Attributes in the order they are written.
    fn attributes(&self) -> Vec<(&'static str, &str)> {
        let mut attributes = vec![("path", self.path.as_str())];
        if let Some(remote) = &self.remote {
            attributes.push(("remote", remote));
        }
        attributes.push(("name", &self.name));
        if let Some(revision) = &self.revision {
            attributes.push(("revision", revision));
        }
        attributes
    }
}

/// An ordered manifest document.
#[derive(Debug, Clone)]
pub struct ManifestDocument {
    xot: Xot,
    /// Document node of a parsed file; `None` for a document built in memory.
    document: Option<Node>,
    root: Node,
}

impl Default for ManifestDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for ManifestDocument {
    fn eq(&self, other: &Self) -> bool {
        match (self.to_xml_string(), other.to_xml_string()) {
            (Ok(left), Ok(right)) => left == right,
            _ => false,
        }
    }
}

impl Eq for ManifestDocument {}

impl ManifestDocument {
    /// Creates an empty `<manifest/>` document.
    pub fn new() -> Self {
        let mut xot = Xot::new();
        let name = xot.add_name(MANIFEST);
        let root = xot.new_element(name);
        Self {
            xot,
            document: None,
            root,
        }
    }

    /// Parses a manifest from a string. `origin` is only used for error
    /// messages.
    pub fn parse(content: &str, origin: &Path) -> Result<Self> {
        let malformed = |message: String| Error::ManifestParse {
            path: origin.to_path_buf(),
            message,
        };

        let mut xot = Xot::new();
        let document = xot.parse(content).map_err(|err| malformed(err.to_string()))?;
        let root = xot
            .document_element(document)
            .map_err(|err| malformed(err.to_string()))?;
        Ok(Self {
            xot,
            document: Some(document),
            root,
        })
    }

    /// Loads and parses the manifest at `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::parse(&content, path)
    }

    /// Loads the manifest at `path`, treating a missing, unreadable or
    /// malformed file as an empty manifest.
    pub fn load_or_empty(path: &Path) -> Self {
        if !path.exists() {
            return Self::new();
        }
        match Self::load(path) {
            Ok(document) => document,
            Err(err) => {
                warn!("Treating {} as empty: {}", path.display(), err);
                Self::new()
            }
        }
    }

    /// All project entries, in document order. A project without a `path`
    /// is checked out at its `name`, so that is the path it claims.
    pub fn projects(&self) -> impl Iterator<Item = ProjectEntry> + '_ {
        self.child_elements(PROJECT).filter_map(|node| {
            let name = self.attribute(node, "name");
            let path = self.attribute(node, "path").or(name)?;
            Some(ProjectEntry {
                path: path.to_string(),
                remote: self.attribute(node, "remote").map(str::to_string),
                name: name.unwrap_or_default().to_string(),
                revision: self.attribute(node, "revision").map(str::to_string),
            })
        })
    }

    /// Whether any project in this document is checked out at `path`.
    pub fn contains_path(&self, path: &str) -> bool {
        self.projects().any(|project| project.path == path)
    }

    /// Whether the document declares a top-level `<default>` element.
    pub fn has_default(&self) -> bool {
        self.child_elements(DEFAULT).next().is_some()
    }

    /// The `name` of the first top-level `<include>`, if any.
    pub fn include_name(&self) -> Option<&str> {
        self.child_elements(INCLUDE)
            .next()
            .and_then(|include| self.attribute(include, "name"))
    }

    /// Appends `entry` unless a project with the same path already exists in
    /// this document. Returns whether the entry was added.
    pub fn append(&mut self, entry: ProjectEntry) -> Result<bool> {
        if self.contains_path(&entry.path) {
            return Ok(false);
        }

        let name = self.xot.add_name(PROJECT);
        let project = self.xot.new_element(name);
        for (key, value) in entry.attributes() {
            let key = self.xot.add_name(key);
            self.xot.set_attribute(project, key, value);
        }
        self.insert_project(project)?;
        Ok(true)
    }

    /// Serializes the whole document with a single XML declaration. Each
    /// top-level node ends with a newline.
    pub fn to_xml_string(&self) -> Result<String> {
        let declared = Parameters {
            declaration: Some(Declaration {
                encoding: Some("UTF-8".to_string()),
                ..Default::default()
            }),
            ..Default::default()
        };

        let top_level: Vec<Node> = match self.document {
            Some(document) => self.xot.children(document).collect(),
            None => vec![self.root],
        };

        let mut xml = String::new();
        for (index, node) in top_level.into_iter().enumerate() {
            let parameters = if index == 0 {
                declared.clone()
            } else {
                Parameters::default()
            };
            xml.push_str(&self.xot.serialize_xml_string(parameters, node)?);
            xml.push('\n');
        }
        Ok(xml)
    }

    /// Writes the document to `path`, replacing any previous content in one
    /// step. Parent directories are created as needed. An existing file keeps
    /// its permissions; a new one is created world-readable.
    pub fn commit(&self, path: &Path) -> Result<()> {
        let parent = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(parent)?;

        let content = self.to_xml_string()?;
        let mut staged = NamedTempFile::new_in(parent)?;
        staged.write_all(content.as_bytes())?;
        staged.as_file().sync_all()?;
        match fs::metadata(path) {
            Ok(existing) => staged.as_file().set_permissions(existing.permissions())?,
            Err(_) => set_new_file_mode(staged.as_file())?,
        }
        staged.persist(path).map_err(|err| Error::Io(err.error))?;
        Ok(())
    }

    fn child_elements<'a>(&'a self, name: &'a str) -> impl Iterator<Item = Node> + 'a {
        self.xot.children(self.root).filter(move |child| {
            self.xot
                .element(*child)
                .is_some_and(|element| self.xot.local_name_str(element.name()) == name)
        })
    }

    fn attribute(&self, node: Node, name: &str) -> Option<&str> {
        let name = self.xot.name(name)?;
        self.xot.get_attribute(node, name)
    }

    fn is_layout(&self, node: Node) -> bool {
        self.xot
            .text_str(node)
            .is_some_and(|text| text.trim().is_empty())
    }

    /// Places `project` at the end of the root element. When the root's
    /// content ends in layout whitespace, the project goes before it and
    /// takes the whitespace that precedes the last node as its indentation.
    fn insert_project(&mut self, project: Node) -> Result<()> {
        let root = self.root;
        let Some(last) = self.xot.last_child(root) else {
            let open = self.xot.new_text(DEFAULT_SEPARATOR);
            self.xot.append(root, open)?;
            self.xot.append(root, project)?;
            let close = self.xot.new_text("\n");
            self.xot.append(root, close)?;
            return Ok(());
        };

        if !self.is_layout(last) {
            self.xot.append(root, project)?;
            return Ok(());
        }

        let separator = self
            .xot
            .previous_sibling(last)
            .and_then(|node| self.xot.previous_sibling(node))
            .filter(|node| self.is_layout(*node))
            .and_then(|node| self.xot.text_str(node))
            .unwrap_or(DEFAULT_SEPARATOR)
            .to_string();

        self.xot.insert_before(last, project)?;
        let separator = self.xot.new_text(&separator);
        self.xot.insert_before(project, separator)?;
        Ok(())
    }
}

#[cfg(unix)]
fn set_new_file_mode(file: &fs::File) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    file.set_permissions(fs::Permissions::from_mode(NEW_FILE_MODE))
}

#[cfg(not(unix))]
fn set_new_file_mode(_file: &fs::File) -> std::io::Result<()> {
    Ok(())
}
