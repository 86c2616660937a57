mod formatter;

use std::{
    fs,
    io::{self, BufWriter, Write},
    path::Path,
};

use anyhow::Context;

pub use crate::commands::disasm::formatter::DisasmOptions;
use crate::commands::{common::load_ksm, disasm::formatter::KsmFormatter};

pub fn run(path: &Path, output: Option<&Path>, opts: DisasmOptions) -> anyhow::Result<()> {
    let (file, ksm) = load_ksm(path)?;
    let fmt = KsmFormatter::new(opts);

    match output {
        Some(target) => {
            let out = fs::File::create(target)
                .with_context(|| format!("failed to create output file: {}", target.display()))?;
            let mut w = BufWriter::new(out);
            fmt.format_listing(&mut w, &ksm, path, file.len())?;
            w.flush()?;
        }
        None => {
            let stdout = io::stdout();
            let mut w = BufWriter::new(stdout.lock());
            fmt.format_listing(&mut w, &ksm, path, file.len())?;
            w.flush()?;
        }
    }

    Ok(())
}
