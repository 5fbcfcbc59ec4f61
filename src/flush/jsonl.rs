use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::Path;

use serde::Serialize;

use crate::family::FamilyTree;

/// Write an iterator of serializable items to a JSONL file (one JSON object per line).
fn write_jsonl<T: Serialize>(path: &Path, items: impl Iterator<Item = T>) -> io::Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    for item in items {
        serde_json::to_writer(&mut writer, &item)?;
        writer.write_all(b"\n")?;
    }
    writer.flush()
}

/// Flush the family tree to JSONL files in the given output directory.
///
/// Creates the output directory if it does not exist. Writes 4 files:
/// - `persons.jsonl`: one Person per line, in id order
/// - `kinship.jsonl`: parent and spouse edges of the kinship graph
/// - `history.jsonl`: the full chronicle, oldest entry first
/// - `generations.jsonl`: per-generation counters, the running one last
pub fn flush_to_jsonl(tree: &FamilyTree, output_dir: &Path) -> io::Result<()> {
    fs::create_dir_all(output_dir)?;

    write_jsonl(&output_dir.join("persons.jsonl"), tree.persons())?;
    write_jsonl(
        &output_dir.join("kinship.jsonl"),
        tree.graph().edges().into_iter(),
    )?;
    write_jsonl(
        &output_dir.join("history.jsonl"),
        tree.history().entries().iter(),
    )?;
    write_jsonl(
        &output_dir.join("generations.jsonl"),
        tree.history().all_generations(),
    )?;

    Ok(())
}
