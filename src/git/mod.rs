//! Git operations used to retrieve remote bundles
//!
//! This module handles:
//! - Cloning repositories (HTTPS, SSH and `file://`)
//! - Resolving refs (branches, tags) to exact SHAs
//! - Checking out a resolved commit
//!
//! Authentication is delegated to git's native credential system.

mod auth;
mod clone;
mod error;
mod refs;
mod url;

pub use clone::clone;
pub use refs::{checkout_commit, resolve_ref};

#[cfg(test)]
pub(crate) mod test_support {
    use std::path::Path;

    use git2::{Oid, Repository, Signature};

    /// Commit every file under the repository's working tree
    pub fn commit_all(repo: &Repository, message: &str) -> Oid {
        let mut index = repo.index().unwrap();
        index
            .add_all(["*"].iter(), git2::IndexAddOption::DEFAULT, None)
            .unwrap();
        index.write().unwrap();
        let tree_id = index.write_tree().unwrap();
        let tree = repo.find_tree(tree_id).unwrap();
        let sig = Signature::now("Test", "test@test.com").unwrap();
        let parents: Vec<_> = repo
            .head()
            .ok()
            .and_then(|h| h.peel_to_commit().ok())
            .into_iter()
            .collect();
        let parent_refs: Vec<_> = parents.iter().collect();
        repo.commit(Some("HEAD"), &sig, &sig, message, &tree, &parent_refs)
            .unwrap()
    }

    /// Create a repository at `path` with the given files committed
    pub fn init_repo_with(path: &Path, files: &[(&str, &str)]) -> (Repository, Oid) {
        let repo = Repository::init(path).unwrap();
        for (rel, content) in files {
            let file = path.join(rel);
            std::fs::create_dir_all(file.parent().unwrap()).unwrap();
            std::fs::write(file, content).unwrap();
        }
        let oid = commit_all(&repo, "Initial commit");
        (repo, oid)
    }

    pub fn file_url(path: &Path) -> String {
        format!("file://{}", path.display())
    }
}
