//! Ref resolution and checkout

use git2::{Commit, Oid, Repository, build::CheckoutBuilder};

use crate::error::{Result, fetch};

/// Resolve a git ref (branch, tag, or SHA) to a full commit SHA; HEAD when `None`
pub fn resolve_ref(repo: &Repository, git_ref: Option<&str>) -> Result<String> {
    let commit = match git_ref {
        Some(r) => resolve_reference(repo, r)?,
        None => repo
            .head()
            .and_then(|head| head.peel_to_commit())
            .map_err(|e| fetch::ref_resolve_failed("HEAD", e.message()))?,
    };
    Ok(commit.id().to_string())
}

fn resolve_reference<'a>(repo: &'a Repository, refname: &str) -> Result<Commit<'a>> {
    let candidates = [
        refname.to_string(),
        format!("refs/heads/{refname}"),
        format!("refs/tags/{refname}"),
        format!("refs/remotes/origin/{refname}"),
    ];

    for candidate in &candidates {
        if let Ok(commit) = repo
            .find_reference(candidate)
            .and_then(|reference| reference.peel_to_commit())
        {
            return Ok(commit);
        }
    }

    if let Ok(commit) = Oid::from_str(refname).and_then(|oid| repo.find_commit(oid)) {
        return Ok(commit);
    }

    repo.revparse_single(refname)
        .and_then(|obj| obj.peel_to_commit())
        .map_err(|_| fetch::ref_resolve_failed(refname, "Could not resolve reference"))
}

/// Detach HEAD at `sha` and force the working tree to match
pub fn checkout_commit(repo: &Repository, sha: &str) -> Result<()> {
    let failed = |e: git2::Error| fetch::checkout_failed(sha, e.message());

    let oid = Oid::from_str(sha).map_err(failed)?;
    let commit = repo.find_commit(oid).map_err(failed)?;
    repo.set_head_detached(commit.id()).map_err(failed)?;

    let mut checkout = CheckoutBuilder::new();
    checkout.force();
    repo.checkout_head(Some(&mut checkout)).map_err(failed)
}
