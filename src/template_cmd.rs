//! Template command: write a starter events table.

use anyhow::{Context, Result};
use tracing::info_span;

use selene_io::write_events_template;

use crate::cli::TemplateArgs;

pub fn run(args: TemplateArgs) -> Result<()> {
    let _cmd = info_span!("template").entered();
    write_events_template(&args.path)
        .with_context(|| format!("failed to write template: {}", args.path.display()))?;
    println!(
        "Created {} with three example events. Edit it with your own.",
        args.path.display()
    );
    Ok(())
}
