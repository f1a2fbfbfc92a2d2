use ::std::{io, path::Path};
use compact_str::CompactString;
use langtree::{model_file_name, write_model_file, GramTree};

/// Writes one model blob per trained language into `out_dir`, named after
/// its language code.
pub fn write_models(trees: &[(CompactString, GramTree)], out_dir: &Path) -> io::Result<()> {
    for (code, tree) in trees {
        let file_path = out_dir.join(model_file_name(code));
        write_model_file(tree, &file_path)?;
        tracing::info!(%code, path = %file_path.display(), "model written");
    }
    Ok(())
}
