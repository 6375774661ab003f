//! `check`

use std::path::Path;

use anyhow::Result;

use courier::presentation::output::print_manifest;

use super::{Context, Outcome};

/// Validate the manifest and list its rules. Never touches the network.
pub fn cmd_check(ctx: &Context, manifest: Option<&Path>) -> Result<Outcome> {
    let manifest = ctx.load_manifest(manifest)?;
    print_manifest(&manifest, ctx.format);
    Ok(Outcome::Success)
}
