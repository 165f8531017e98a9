//! `confmerge locate`

use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};

use confmerge::{FieldPath, SourceKind};
use confmerge_locate::PathFinder;
use confmerge_source_map::excerpt;

/// Arguments for the locate command
#[derive(Debug)]
pub struct LocateArgs {
    pub file: PathBuf,
    /// Dotted field path
    pub path: String,
    pub kind: Option<SourceKind>,
}

pub fn execute(args: LocateArgs) -> Result<()> {
    let kind = args
        .kind
        .or_else(|| SourceKind::from_path(&args.file))
        .ok_or_else(|| anyhow!("Cannot detect the format of '{}'; use --kind", args.file.display()))?;
    let text = std::fs::read_to_string(&args.file)
        .with_context(|| format!("Failed to read '{}'", args.file.display()))?;

    match locate(kind, &text, &args.path) {
        Some(lines) => {
            for line in lines {
                println!("{line}");
            }
        }
        None => println!("not found"),
    }
    Ok(())
}

/// The range header followed by the excerpt, or `None` when the path is not in `text`.
fn locate(kind: SourceKind, text: &str, dotted: &str) -> Option<Vec<String>> {
    let path = FieldPath::from_dotted(dotted);
    let range = match kind {
        SourceKind::Env => None,
        SourceKind::EnvFile => confmerge_locate::find_env_var(text, dotted),
        kind => PathFinder::for_kind(kind)?.find_line_range(text, path.segments()),
    }?;
    let mut out = vec![range.to_string()];
    out.extend(excerpt(text, range));
    Some(out)
}
