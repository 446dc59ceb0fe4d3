use crate::areas::database::Database;
use crate::areas::index::Index;
use crate::areas::merge_marker::MergeMarker;
use crate::areas::refs::Refs;
use crate::areas::workspace::Workspace;
use crate::errors::BitError;
use anyhow::Context;
use std::cell::{RefCell, RefMut};
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;

const GIT_DIR: &str = ".git";

/// Where a repository keeps its metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryLayout {
    pub root: PathBuf,
    pub git_dir: PathBuf,
    pub bare: bool,
}

impl RepositoryLayout {
    /// Inspect `dir` itself: a `.git` directory makes it a work tree, a directory holding
    /// `HEAD`, `objects/` and `refs/` directly makes it bare.
    pub fn detect(dir: &Path) -> Option<Self> {
        let git_dir = dir.join(GIT_DIR);
        if git_dir.is_dir() {
            return Some(RepositoryLayout {
                root: dir.to_path_buf(),
                git_dir,
                bare: false,
            });
        }

        let looks_bare = dir.join("HEAD").is_file()
            && dir.join("objects").is_dir()
            && dir.join("refs").is_dir();
        looks_bare.then(|| RepositoryLayout {
            root: dir.to_path_buf(),
            git_dir: dir.to_path_buf(),
            bare: true,
        })
    }

    /// Walk up from `start` to the first directory that is a repository.
    pub fn discover(start: &Path) -> Option<Self> {
        start.ancestors().find_map(Self::detect)
    }
}

/// Root of the repository containing `start`, if any.
pub fn find_repo_root(start: &Path) -> Option<PathBuf> {
    RepositoryLayout::discover(start).map(|layout| layout.root)
}

pub struct Repository {
    layout: RepositoryLayout,
    writer: RefCell<Box<dyn std::io::Write>>,
    index: Arc<Mutex<Index>>,
    database: Database,
    workspace: Option<Workspace>,
    refs: Refs,
    marker: MergeMarker,
}

impl Repository {
    /// A work-tree repository rooted at `path`, which need not be initialized yet.
    pub fn new(path: &Path, writer: Box<dyn std::io::Write>) -> anyhow::Result<Self> {
        let root = Self::prepare_dir(path)?;
        let git_dir = root.join(GIT_DIR);

        Ok(Self::from_layout(
            RepositoryLayout {
                root,
                git_dir,
                bare: false,
            },
            writer,
        ))
    }

    /// A bare repository whose metadata lives directly in `path`.
    pub fn new_bare(path: &Path, writer: Box<dyn std::io::Write>) -> anyhow::Result<Self> {
        let root = Self::prepare_dir(path)?;

        Ok(Self::from_layout(
            RepositoryLayout {
                root: root.clone(),
                git_dir: root,
                bare: true,
            },
            writer,
        ))
    }

    /// Open the repository containing `start`.
    pub fn open(start: &Path, writer: Box<dyn std::io::Write>) -> anyhow::Result<Self> {
        let start = start
            .canonicalize()
            .with_context(|| format!("failed to resolve {}", start.display()))?;
        let layout = RepositoryLayout::discover(&start).ok_or(BitError::NotARepository)?;

        Ok(Self::from_layout(layout, writer))
    }

    fn prepare_dir(path: &Path) -> anyhow::Result<PathBuf> {
        if !path.exists() {
            std::fs::create_dir_all(path)
                .with_context(|| format!("failed to create {}", path.display()))?;
        }

        path.canonicalize()
            .with_context(|| format!("failed to resolve {}", path.display()))
    }

    fn from_layout(layout: RepositoryLayout, writer: Box<dyn std::io::Write>) -> Self {
        let git_dir = layout.git_dir.as_path();
        let index = Index::new(git_dir.join("index").into_boxed_path());
        let database = Database::new(git_dir.join("objects").into_boxed_path());
        let refs = Refs::new(git_dir.to_path_buf().into_boxed_path());
        let marker = MergeMarker::new(git_dir.to_path_buf().into_boxed_path());
        let workspace =
            (!layout.bare).then(|| Workspace::new(layout.root.clone().into_boxed_path()));

        Repository {
            layout,
            writer: RefCell::new(writer),
            index: Arc::new(Mutex::new(index)),
            database,
            workspace,
            refs,
            marker,
        }
    }

    pub fn path(&self) -> &Path {
        &self.layout.root
    }

    pub fn git_dir(&self) -> &Path {
        &self.layout.git_dir
    }

    pub fn is_bare(&self) -> bool {
        self.layout.bare
    }

    pub fn writer(&'_ self) -> RefMut<'_, Box<dyn std::io::Write>> {
        self.writer.borrow_mut()
    }

    pub fn index(&self) -> Arc<Mutex<Index>> {
        self.index.clone()
    }

    pub fn database(&self) -> &Database {
        &self.database
    }

    /// The work tree, or `BareRepository` for bare repositories.
    pub fn workspace(&self) -> anyhow::Result<&Workspace> {
        self.workspace
            .as_ref()
            .ok_or_else(|| anyhow::Error::from(BitError::BareRepository))
    }

    pub fn refs(&self) -> &Refs {
        &self.refs
    }

    pub fn marker(&self) -> &MergeMarker {
        &self.marker
    }

    /// Turn a user-supplied path (relative to the current directory) into a path relative
    /// to the work tree root.
    pub fn relative_path(&self, path: &Path) -> anyhow::Result<PathBuf> {
        let absolute = if path.is_absolute() {
            path.to_path_buf()
        } else {
            std::env::current_dir()?.join(path)
        };

        let normalized = absolute
            .components()
            .fold(PathBuf::new(), |mut acc, component| {
                match component {
                    Component::CurDir => {}
                    Component::ParentDir => {
                        acc.pop();
                    }
                    other => acc.push(other.as_os_str()),
                }
                acc
            });

        normalized
            .strip_prefix(self.path())
            .map(Path::to_path_buf)
            .with_context(|| {
                format!(
                    "'{}' is outside repository at '{}'",
                    path.display(),
                    self.path().display()
                )
            })
    }
}
