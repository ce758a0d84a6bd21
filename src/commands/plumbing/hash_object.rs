use crate::areas::database::Database;
use crate::areas::repository::Repository;
use crate::artifacts::objects::object_type::ObjectType;
use anyhow::Context;
use std::path::Path;

/// Print the object ID of a file's content; with `write`, persist it.
///
/// Stands apart from `Repository` because without `-w` no repository is
/// needed at all.
pub fn hash_object(
    write: bool,
    kind: &str,
    file: &Path,
    out: &mut dyn std::io::Write,
) -> anyhow::Result<()> {
    let object_type = ObjectType::try_from(kind)?;

    let repository = if write {
        Some(Repository::discover(
            &std::env::current_dir()?,
            Box::new(std::io::sink()),
        )?)
    } else {
        None
    };

    let reader = std::fs::File::open(file)
        .with_context(|| format!("unable to open {}", file.display()))?;
    let oid = Database::hash(reader, object_type, repository.as_ref().map(|r| r.database()))?;

    writeln!(out, "{oid}")?;
    Ok(())
}
