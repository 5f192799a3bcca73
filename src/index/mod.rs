//! Source indexer
//!
//! Extracts the package declaration and imported packages from the header of
//! each policy file. Only the header is read: blank lines and comments are
//! skipped, the first statement must be `package <ref>`, and `import`
//! statements are collected until the first statement of any other kind.
//!
//! Only `data.` imports name packages. `input`, `future.keywords…` and
//! `rego.…` imports are language features and are ignored.

mod reference;

use std::num::NonZeroUsize;
use std::thread;

use tracing::debug;

use crate::domain::{IndexedSourceFile, RawSourceFile};
use crate::error::{Result, link};

const DATA_ROOT: &str = "data";

/// Index a single file
pub fn index(raw: &RawSourceFile) -> Result<IndexedSourceFile> {
    let text = raw.text();
    let mut statements = text
        .lines()
        .enumerate()
        .map(|(i, line)| (i + 1, strip_comment(line).trim()))
        .filter(|(_, line)| !line.is_empty());

    let Some((line_no, first)) = statements.next() else {
        return Err(link::malformed(&raw.path, 1, "missing package declaration"));
    };
    let package = parse_package(first)
        .ok_or_else(|| link::malformed(&raw.path, line_no, "expected `package <path>` as the first statement"))?;

    let mut imports = Vec::new();
    for (line_no, statement) in statements {
        let Some(rest) = keyword(statement, "import") else {
            break;
        };
        let target = parse_import(rest)
            .ok_or_else(|| link::malformed(&raw.path, line_no, format!("invalid import `{statement}`")))?;
        if let Some(package) = target {
            imports.push(package);
        }
    }
    imports.sort();
    imports.dedup();

    Ok(IndexedSourceFile {
        raw: raw.clone(),
        package,
        imports,
    })
}

/// Index many files in parallel.
///
/// The result is sorted by path. When several files are malformed, the error
/// for the first one in path order is returned.
pub fn index_all<'a>(files: impl IntoIterator<Item = &'a RawSourceFile>) -> Result<Vec<IndexedSourceFile>> {
    let mut files: Vec<&RawSourceFile> = files.into_iter().collect();
    files.sort_by(|a, b| a.path.cmp(&b.path));
    if files.is_empty() {
        return Ok(Vec::new());
    }

    let workers = thread::available_parallelism().map_or(1, NonZeroUsize::get);
    let chunk_size = files.len().div_ceil(workers);

    let results: Vec<Result<IndexedSourceFile>> = thread::scope(|s| {
        let handles: Vec<_> = files
            .chunks(chunk_size)
            .map(|chunk| s.spawn(move || chunk.iter().map(|f| index(f)).collect::<Vec<_>>()))
            .collect();
        handles
            .into_iter()
            .flat_map(|h| h.join().unwrap_or_else(|e| std::panic::resume_unwind(e)))
            .collect()
    });

    let indexed = results.into_iter().collect::<Result<Vec<_>>>()?;
    debug!(files = indexed.len(), "indexed sources");
    Ok(indexed)
}

/// Remainder after `word` when the statement starts with that keyword
fn keyword<'s>(statement: &'s str, word: &str) -> Option<&'s str> {
    let rest = statement.strip_prefix(word)?;
    rest.starts_with(char::is_whitespace).then(|| rest.trim_start())
}

fn parse_package(statement: &str) -> Option<String> {
    let rest = keyword(statement, "package")?;
    let (path, tail) = reference::parse(rest)?;
    if !tail.trim().is_empty() {
        return None;
    }
    // `package data.x` is accepted as `package x`
    Some(match path.strip_prefix("data.") {
        Some(stripped) => stripped.to_string(),
        None => path,
    })
}

/// `Some(Some(pkg))` for a package import, `Some(None)` for an ignored import,
/// `None` when malformed
fn parse_import(rest: &str) -> Option<Option<String>> {
    let (path, tail) = reference::parse(rest)?;
    let tail = tail.trim();
    if !tail.is_empty() {
        let alias = keyword(tail, "as")?;
        if !reference::is_identifier(alias) {
            return None;
        }
    }

    Some(
        path.strip_prefix(DATA_ROOT)
            .and_then(|p| p.strip_prefix('.'))
            .map(str::to_string),
    )
}

/// Drop a trailing `#` comment, ignoring `#` inside string literals
fn strip_comment(line: &str) -> &str {
    let mut in_string = false;
    let mut escaped = false;
    for (i, c) in line.char_indices() {
        match c {
            _ if escaped => escaped = false,
            '\\' if in_string => escaped = true,
            '"' => in_string = !in_string,
            '#' if !in_string => return &line[..i],
            _ => {}
        }
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{BpmError, ErrorKind};

    fn raw(path: &str, content: &str) -> RawSourceFile {
        RawSourceFile::new(path, content)
    }

    #[test]
    fn test_index_extracts_package_and_imports() {
        let file = raw(
            "authz.rego",
            r#"# Authorization rules
# for the acme platform

package acme.authz

import data.acme.users
import data.acme.roles.admin as admins   # trailing comment
import input.request
import future.keywords.in
import rego.v1
import data.acme.users

allow if input.user in admins
import data.never.seen
"#,
        );

        let indexed = index(&file).unwrap();
        assert_eq!(indexed.package, "acme.authz");
        assert_eq!(indexed.imports, vec!["acme.roles.admin", "acme.users"]);
    }

    #[test]
    fn test_index_is_idempotent() {
        let file = raw("a.rego", "package a\nimport data.b\nimport data.c\n");
        assert_eq!(index(&file).unwrap(), index(&file).unwrap());
    }

    #[test]
    fn test_index_normalizes_quoted_segments() {
        let file = raw(
            "a.rego",
            "package acme[\"my-lib\"]\nimport data.acme[\"other-lib\"].rules\n",
        );
        let indexed = index(&file).unwrap();
        assert_eq!(indexed.package, "acme.my-lib");
        assert_eq!(indexed.imports, vec!["acme.other-lib.rules"]);
    }

    #[test]
    fn test_index_accepts_data_prefixed_package() {
        let indexed = index(&raw("a.rego", "package data.acme\n")).unwrap();
        assert_eq!(indexed.package, "acme");
    }

    #[test]
    fn test_missing_package_reports_line() {
        let err = index(&raw("bad.rego", "# header\n\nallow := true\n")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedSource);
        match err {
            BpmError::MalformedSource { path, line, .. } => {
                assert_eq!(path, "bad.rego");
                assert_eq!(line, 3);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_empty_file_is_malformed() {
        let err = index(&raw("empty.rego", "  \n# only comments\n")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedSource);
    }

    #[test]
    fn test_malformed_package_path() {
        for content in ["package\n", "package 1abc\n", "package a.b c\n", "packages a\n"] {
            let err = index(&raw("bad.rego", content)).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::MalformedSource, "content: {content:?}");
        }
    }

    #[test]
    fn test_malformed_import() {
        let err = index(&raw("bad.rego", "package a\nimport data.b extra\n")).unwrap_err();
        assert!(matches!(err, BpmError::MalformedSource { line: 2, .. }));
    }

    #[test]
    fn test_hash_inside_string_is_not_a_comment() {
        assert_eq!(strip_comment(r#"x := "a#b" # c"#), r#"x := "a#b" "#);
    }

    #[test]
    fn test_index_all_sorted_and_first_error_by_path() {
        let files = vec![
            raw("z.rego", "package z\n"),
            raw("a.rego", "package a\n"),
            raw("m.rego", "package m\n"),
        ];
        let indexed = index_all(&files).unwrap();
        let paths: Vec<&str> = indexed.iter().map(|f| f.path()).collect();
        assert_eq!(paths, vec!["a.rego", "m.rego", "z.rego"]);

        let broken = vec![
            raw("z.rego", "not a package\n"),
            raw("b.rego", "also broken\n"),
            raw("a.rego", "package a\n"),
        ];
        match index_all(&broken).unwrap_err() {
            BpmError::MalformedSource { path, .. } => assert_eq!(path, "b.rego"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_index_all_empty() {
        assert!(index_all(&Vec::<RawSourceFile>::new()).unwrap().is_empty());
    }
}
