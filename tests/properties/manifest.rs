//! Property tests for manifest resolution.

use proptest::prelude::*;

use courier::ManifestResolver;

fn segment() -> impl Strategy<Value = String> {
    proptest::string::string_regex("[A-Za-z0-9_-][A-Za-z0-9._-]{0,11}").unwrap()
}

fn remote_path() -> impl Strategy<Value = String> {
    proptest::collection::vec(segment(), 1..=4).prop_map(|s| format!("/{}", s.join("/")))
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 128,
        .. ProptestConfig::default()
    })]

    /// PROPERTY: Resolving arbitrary text never panics.
    #[test]
    fn property_resolve_never_panics(s in "(?s).{0,256}") {
        let _ = ManifestResolver::new("/w").resolve(&s);
    }

    /// PROPERTY: Valid push rules keep their order and get absolute
    /// local paths under the manifest directory.
    #[test]
    fn property_rule_order_preserved(remotes in proptest::collection::hash_set(remote_path(), 1..8)) {
        let remotes: Vec<String> = remotes.into_iter().collect();
        let text: String = remotes
            .iter()
            .enumerate()
            .map(|(i, r)| format!("[[rule]]\nlocal = \"f{}\"\nremote = \"{}\"\n\n", i, r))
            .collect();

        let manifest = ManifestResolver::new("/w").resolve(&text).unwrap();
        prop_assert_eq!(manifest.len(), remotes.len());
        for (i, rule) in manifest.rules().iter().enumerate() {
            prop_assert_eq!(rule.index, i);
            prop_assert_eq!(&rule.remote_path, &remotes[i]);
            prop_assert!(rule.local_path.is_absolute());
        }
    }
}
