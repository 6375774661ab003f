//! Property tests for fail-fast and ordering in the sync engine.

use std::cell::RefCell;
use std::collections::HashSet;
use std::time::Duration;

use proptest::prelude::*;

use courier::domain::entities::{Manifest, RuleStatus, RunStatus, SyncRule};
use courier::domain::ports::{CommandOutput, CopyRequest, Transport, TransportError};
use courier::domain::value_objects::{Direction, RemoteTarget};
use courier::{SyncEngine, SyncOptions};

/// Transport that fails the copy of every rule whose index is in `failing`.
struct ScriptedTransport {
    failing: HashSet<usize>,
    copies: RefCell<Vec<String>>,
}

impl ScriptedTransport {
    fn new(failing: HashSet<usize>) -> Self {
        Self {
            failing,
            copies: RefCell::new(Vec::new()),
        }
    }
}

impl Transport for ScriptedTransport {
    fn name(&self) -> String {
        "scripted".to_string()
    }

    fn copy(&self, _target: &RemoteTarget, request: &CopyRequest<'_>) -> Result<(), TransportError> {
        self.copies.borrow_mut().push(request.remote.to_string());
        let index: usize = request
            .remote
            .trim_start_matches("/opt/app/r")
            .parse()
            .unwrap();
        if self.failing.contains(&index) {
            Err(TransportError::PathNotFound {
                path: request.local.display().to_string(),
            })
        } else {
            Ok(())
        }
    }

    fn run_command(
        &self,
        _target: &RemoteTarget,
        _command: &str,
        _timeout: Duration,
    ) -> Result<CommandOutput, TransportError> {
        Ok(CommandOutput::default())
    }
}

fn manifest(optional: &[bool]) -> Manifest {
    Manifest::new(
        optional
            .iter()
            .enumerate()
            .map(|(i, &opt)| {
                SyncRule::new(format!("r{}", i), format!("/w/r{}", i), format!("/opt/app/r{}", i))
                    .with_index(i)
                    .with_optional(opt)
            })
            .collect(),
    )
}

fn run(optional: &[bool], failing: HashSet<usize>) -> (courier::RunResult, Vec<String>) {
    let transport = ScriptedTransport::new(failing);
    let engine = SyncEngine::new(&transport, SyncOptions::default());
    let result = engine.run(&manifest(optional), &RemoteTarget::new("h"), Direction::Push);
    let copies = transport.copies.borrow().clone();
    (result, copies)
}

fn rules_and_failures() -> impl Strategy<Value = (Vec<bool>, HashSet<usize>)> {
    proptest::collection::vec(any::<bool>(), 0..12).prop_flat_map(|optional| {
        let n = optional.len();
        let failing = proptest::collection::hash_set(0..n.max(1), 0..=n);
        (Just(optional), failing)
    })
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        .. ProptestConfig::default()
    })]

    /// PROPERTY: Rules are attempted in manifest order, stopping right
    /// after the first failing required rule.
    #[test]
    fn property_fail_fast_at_first_required_failure(
        (optional, failing) in rules_and_failures()
    ) {
        let first_fatal = (0..optional.len()).find(|i| failing.contains(i) && !optional[*i]);
        let (result, copies) = run(&optional, failing.clone());

        let expected_attempts = first_fatal.map_or(optional.len(), |i| i + 1);
        let expected: Vec<String> = (0..expected_attempts)
            .map(|i| format!("/opt/app/r{}", i))
            .collect();
        prop_assert_eq!(copies, expected);

        match first_fatal {
            Some(i) => {
                prop_assert_eq!(result.status(), RunStatus::Aborted);
                prop_assert_eq!(result.failed_rule().map(|o| o.rule.index), Some(i));
                prop_assert_eq!(result.count(RuleStatus::Failed), 1);
            }
            None => prop_assert!(result.is_success()),
        }
    }

    /// PROPERTY: A manifest of only optional rules always succeeds and
    /// attempts every rule.
    #[test]
    fn property_optional_only_never_aborts(
        (optional, failing) in rules_and_failures()
    ) {
        let all_optional = vec![true; optional.len()];
        let (result, copies) = run(&all_optional, failing.clone());

        prop_assert!(result.is_success());
        prop_assert_eq!(copies.len(), all_optional.len());
        let expected_skips = failing.iter().filter(|i| **i < all_optional.len()).count();
        prop_assert_eq!(result.count(RuleStatus::Skipped), expected_skips);
    }
}
