use crate::cli::{CacheArgs, CacheSubcommand};
use crate::error::{Result, storage};
use crate::storage::Storage;

use super::Context;

pub fn run(ctx: &Context, args: CacheArgs) -> Result<()> {
    let store = &ctx.storage;
    match args.command {
        Some(CacheSubcommand::List) => list_stored_bundles(store),
        Some(CacheSubcommand::Clear(clear_args)) => match clear_args.only {
            Some(digest) => remove_entry(store, &digest),
            None => clear_all(store),
        },
        // Default: show only statistics
        None => show_stats(store),
    }
}

fn print_stats(store: &Storage) -> Result<usize> {
    let stats = store.stats()?;
    println!("Store Statistics:");
    println!("  Location: {}", store.root().display());
    println!("  Bundles: {}", stats.entries);
    println!("  Refs: {}", stats.refs);
    println!("  Size: {}", stats.formatted_size());
    Ok(stats.entries)
}

fn show_stats(store: &Storage) -> Result<()> {
    if print_stats(store)? == 0 {
        println!("\nStore is empty.");
    } else {
        println!("\nRun 'bpm cache list' to list stored bundles.");
        println!("Run 'bpm cache clear' to remove everything from the store.");
        println!("Run 'bpm cache clear --only <digest>' to remove a single bundle.");
    }
    Ok(())
}

fn list_stored_bundles(store: &Storage) -> Result<()> {
    print_stats(store)?;
    println!();

    let bundles = store.list()?;
    if bundles.is_empty() {
        println!("No stored bundles.");
        return Ok(());
    }

    println!("Stored bundles ({}):", bundles.len());
    for bundle in &bundles {
        println!(
            "  {} {} ({})",
            bundle.package,
            bundle.version,
            bundle.formatted_size()
        );
        println!("    Digest: {}", bundle.digest);
    }
    Ok(())
}

fn clear_all(store: &Storage) -> Result<()> {
    let removed = store.clear()?;
    println!(
        "Store cleared ({removed} bundle{}).",
        if removed == 1 { "" } else { "s" }
    );
    Ok(())
}

fn remove_entry(store: &Storage, digest: &str) -> Result<()> {
    if !store.remove(digest)? {
        return Err(storage::entry_not_found(digest));
    }
    println!("Removed stored bundle: {digest}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BundleFile;
    use crate::domain::{Bundle, RawSourceFile};
    use tempfile::TempDir;

    fn store(temp: &TempDir) -> Storage {
        Storage::open(temp.path().join("store")).unwrap()
    }

    #[test]
    fn test_show_stats_empty() {
        let temp = TempDir::new().unwrap();
        assert!(show_stats(&store(&temp)).is_ok());
    }

    #[test]
    fn test_remove_entry_not_found() {
        let temp = TempDir::new().unwrap();
        let err = remove_entry(&store(&temp), &crate::hash::hash_bytes(b"x")).unwrap_err();
        assert!(matches!(err, crate::error::BpmError::EntryNotFound { .. }));
        assert!(err.to_string().contains("is not in the store"));
    }

    #[test]
    fn test_remove_then_clear() {
        let temp = TempDir::new().unwrap();
        let store = store(&temp);
        let mut bundle = Bundle::new(BundleFile::new("acme", "1.0.0"));
        bundle.insert(RawSourceFile::new("a.rego", "package a\n"));
        let entry = store.store(&bundle).unwrap();

        remove_entry(&store, &entry.digest).unwrap();
        assert!(!store.contains(&entry.digest));

        store.store(&bundle).unwrap();
        clear_all(&store).unwrap();
        assert_eq!(store.stats().unwrap().entries, 0);
    }
}
