//! `deploy`

use std::path::Path;

use anyhow::Result;

use courier::domain::entities::RunStatus;
use courier::domain::value_objects::Direction;
use courier::presentation::factory;
use courier::presentation::output::{print_release_summary, print_sync_summary};

use super::sync::run_rules;
use super::{Context, Outcome};

pub fn cmd_deploy(
    ctx: &Context,
    service: Option<&str>,
    push: bool,
    manifest: Option<&Path>,
) -> Result<Outcome> {
    // Everything that can be rejected up front is checked before any
    // remote command runs.
    let options = factory::release_options(&ctx.config, service)?;
    let target = ctx.target()?;
    let manifest = if push {
        Some(ctx.load_manifest(manifest)?)
    } else {
        None
    };

    let transport = factory::create_transport(&ctx.config);

    if let Some(manifest) = &manifest {
        let result = run_rules(ctx, &transport, manifest, &target, Direction::Push, false);
        print_sync_summary(&result, ctx.format);
        if matches!(result.status(), RunStatus::Aborted | RunStatus::Cancelled) {
            tracing::warn!("push did not complete, not deploying");
            return Ok(Outcome::Failed);
        }
    }

    let trigger = factory::create_release_trigger(&transport, options);
    let sink = factory::create_event_sink(ctx.json());
    let result = trigger.deploy_with_events(&target, sink.as_ref());
    print_release_summary(&result, ctx.format);

    Ok(match result {
        Ok(_) => Outcome::Success,
        Err(_) => Outcome::Failed,
    })
}
