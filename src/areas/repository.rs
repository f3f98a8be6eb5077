//! Repository facade
//!
//! Coordinates the database, index, workspace, and refs behind one handle
//! that every operation receives explicitly. Output goes through an
//! injected writer so commands stay testable.

use crate::areas::database::Database;
use crate::areas::index::Index;
use crate::areas::refs::Refs;
use crate::areas::workspace::Workspace;
use crate::artifacts::database::database_entry::DatabaseEntry;
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::status::status_info::Status;
use std::cell::{RefCell, RefMut};
use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Git directory name
pub const GIT_DIR: &str = ".git";

/// Object database directory name
const DATABASE_DIR: &str = "objects";

/// Index file name
const INDEX_FILE: &str = "index";

pub struct Repository {
    /// Repository root path
    path: Box<Path>,
    /// Output writer (stdout in the CLI, a buffer in tests)
    writer: RefCell<Box<dyn Write>>,
    index: RefCell<Index>,
    database: Database,
    workspace: Workspace,
    refs: Refs,
}

impl Repository {
    pub fn new(path: PathBuf, writer: Box<dyn Write>) -> anyhow::Result<Self> {
        if !path.exists() {
            std::fs::create_dir_all(&path)?;
        }
        let path = path.canonicalize()?;

        let index = Index::new(path.join(GIT_DIR).join(INDEX_FILE).into_boxed_path());
        let database = Database::new(path.join(GIT_DIR).join(DATABASE_DIR).into_boxed_path());
        let workspace = Workspace::new(path.clone().into_boxed_path());
        let refs = Refs::new(path.join(GIT_DIR).into_boxed_path());

        Ok(Repository {
            path: path.into_boxed_path(),
            writer: RefCell::new(writer),
            index: RefCell::new(index),
            database,
            workspace,
            refs,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn git_path(&self) -> PathBuf {
        self.path.join(GIT_DIR)
    }

    pub fn writer(&self) -> RefMut<'_, Box<dyn Write>> {
        self.writer.borrow_mut()
    }

    pub fn index(&self) -> RefMut<'_, Index> {
        self.index.borrow_mut()
    }

    pub fn database(&self) -> &Database {
        &self.database
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    pub fn refs(&self) -> &Refs {
        &self.refs
    }

    pub fn status_view(&self) -> Status<'_> {
        Status::new(self)
    }

    /// The HEAD commit's tree flattened to `path -> (oid, mode)`; empty
    /// when no commit exists yet.
    pub fn load_head_tree(&self) -> anyhow::Result<BTreeMap<PathBuf, DatabaseEntry>> {
        match self.refs.read_head()? {
            Some(head_oid) => {
                let commit = self.database.parse_object_as_commit(&head_oid)?;
                self.database.load_flat_tree(commit.tree_oid())
            }
            None => Ok(BTreeMap::new()),
        }
    }

    /// Restore a commit into the working tree: clear everything but
    /// hidden entries, lay the tree down, then rebuild the index so it
    /// reflects the checked-out state.
    pub fn materialize_commit(&self, commit_oid: &ObjectId) -> anyhow::Result<()> {
        let commit = self.database.parse_object_as_commit(commit_oid)?;

        self.workspace.clear()?;
        self.checkout_tree(commit.tree_oid(), &PathBuf::new())?;
        self.rebuild_index_from_workspace()
    }

    fn checkout_tree(&self, tree_oid: &ObjectId, prefix: &Path) -> anyhow::Result<()> {
        let tree = self.database.parse_object_as_tree(tree_oid)?;

        for (name, entry) in tree.entries() {
            let path = prefix.join(name);

            if entry.is_tree() {
                self.workspace.make_directory(&path)?;
                self.checkout_tree(&entry.oid, &path)?;
            } else {
                let blob = self.database.parse_object_as_blob(&entry.oid)?;
                self.workspace.write_file(&path, blob.content(), entry.mode)?;
            }
        }

        Ok(())
    }

    /// Regenerate the index from what is on disk, hashing every file
    pub fn rebuild_index_from_workspace(&self) -> anyhow::Result<()> {
        use crate::artifacts::index::index_entry::IndexEntry;

        let mut index = self.index.borrow_mut();
        *index = Index::new(self.git_path().join(INDEX_FILE).into_boxed_path());
        // an empty tree still replaces whatever index was on disk
        index.mark_changed();

        for path in self.workspace.list_files(None)? {
            let blob = self.workspace.parse_blob(&path)?;
            let blob_oid = self.database.store(blob)?;
            let stat = self.workspace.stat_file(&path)?;

            index.add(IndexEntry::new(path, blob_oid, stat));
        }

        index.write_updates()
    }
}
