//! `push` / `pull`

use std::path::Path;

use anyhow::Result;

use courier::domain::entities::{Manifest, RunResult};
use courier::domain::ports::Transport;
use courier::domain::value_objects::{Direction, RemoteTarget};
use courier::presentation::factory;
use courier::presentation::output::print_sync_summary;

use super::{cancel_flag, Context, Outcome};

pub fn cmd_sync(
    ctx: &Context,
    direction: Direction,
    manifest: Option<&Path>,
    dry_run: bool,
) -> Result<Outcome> {
    let manifest = ctx.load_manifest(manifest)?;
    let target = ctx.target()?;
    let transport = factory::create_transport(&ctx.config);

    let result = run_rules(ctx, &transport, &manifest, &target, direction, dry_run);
    print_sync_summary(&result, ctx.format);

    Ok(if result.is_success() {
        Outcome::Success
    } else {
        Outcome::Failed
    })
}

/// Run the rules of one direction, streaming progress events.
pub(crate) fn run_rules<T: Transport>(
    ctx: &Context,
    transport: T,
    manifest: &Manifest,
    target: &RemoteTarget,
    direction: Direction,
    dry_run: bool,
) -> RunResult {
    tracing::debug!(
        "{} {} rules via {}",
        direction,
        manifest.count_for(direction),
        transport.name()
    );

    let engine = factory::create_sync_engine(transport, &ctx.config, dry_run);
    let sink = factory::create_event_sink(ctx.json());
    let cancel = cancel_flag();
    engine.run_with_events(manifest, target, direction, sink.as_ref(), &cancel)
}
