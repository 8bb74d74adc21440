//! Tests for target resolution and cascading disablement

use std::collections::BTreeMap;

use flotilla_state::{DesiredState, Namespace, Release};

fn release(namespace: &str, group: &str) -> Release {
    Release {
        name: String::new(),
        namespace: namespace.to_string(),
        group: group.to_string(),
        chart: "stable/app".to_string(),
        version: "1.0.0".to_string(),
        ..Default::default()
    }
}

/// app1(group=g1, ns1), app2(group=g2, ns2), app3(group=g3, ns3)
fn three_groups_state() -> DesiredState {
    DesiredState {
        namespaces: BTreeMap::from([
            ("ns1".to_string(), Namespace::default()),
            ("ns2".to_string(), Namespace::default()),
            ("ns3".to_string(), Namespace::default()),
        ]),
        apps: BTreeMap::from([
            ("app1".to_string(), release("ns1", "g1")),
            ("app2".to_string(), release("ns2", "g2")),
            ("app3".to_string(), release("ns3", "g3")),
        ]),
        ..Default::default()
    }
}

#[test]
fn test_group_and_name_selectors_union() {
    let mut state = three_groups_state();
    state.make_target_map(&["g1".to_string()], &["app3".to_string()]);

    assert!(state.target_map.contains("app1"));
    assert!(!state.target_map.contains("app2"));
    assert!(state.target_map.contains("app3"));

    state.disable_untargeted_apps();

    assert!(state.apps["app1"].is_considered_to_run());
    assert!(!state.apps["app2"].is_considered_to_run());
    assert!(state.apps["app3"].is_considered_to_run());

    // app2's exclusive namespace is cascaded out, the others survive
    assert!(state.namespaces["ns1"].enabled);
    assert!(!state.namespaces["ns2"].enabled);
    assert!(state.namespaces["ns3"].enabled);
}

#[test]
fn test_empty_selectors_disable_nothing() {
    let mut state = three_groups_state();
    state.make_target_map(&[], &[]);

    assert!(state.target_map.is_empty());

    state.disable_untargeted_apps();

    assert!(state.apps.values().all(Release::is_considered_to_run));
    assert!(state.namespaces.values().all(|ns| ns.enabled));
}

#[test]
fn test_shared_namespace_survives_while_any_release_keeps_it() {
    let mut state = three_groups_state();
    // app2 moves into ns1, sharing it with app1
    state.apps.get_mut("app2").unwrap().namespace = "ns1".to_string();

    state.make_target_map(&["g1".to_string()], &[]);
    state.disable_untargeted_apps();

    assert!(state.apps["app1"].is_considered_to_run());
    assert!(!state.apps["app2"].is_considered_to_run());

    // ns1 is kept alive by app1, ns2 and ns3 lost their releases
    assert!(state.namespaces["ns1"].enabled);
    assert!(!state.namespaces["ns2"].enabled);
    assert!(!state.namespaces["ns3"].enabled);
}

#[test]
fn test_targeted_but_disabled_release_keeps_nothing_alive() {
    let mut state = three_groups_state();
    state.apps.get_mut("app1").unwrap().disable();

    state.make_target_map(&["g1".to_string()], &[]);
    state.disable_untargeted_apps();

    // app1 was targeted but administratively disabled, its namespace goes too
    assert!(!state.apps["app1"].is_considered_to_run());
    assert!(!state.namespaces["ns1"].enabled);
}

#[test]
fn test_selecting_by_name_only() {
    let mut state = three_groups_state();
    state.make_target_map(&[], &["app2".to_string()]);
    state.disable_untargeted_apps();

    assert!(!state.apps["app1"].is_considered_to_run());
    assert!(state.apps["app2"].is_considered_to_run());
    assert!(!state.apps["app3"].is_considered_to_run());
    assert!(state.namespaces["ns2"].enabled);
}

#[test]
fn test_context_labels_follow_target_resolution() {
    let mut state = three_groups_state();
    state.context = "prod".to_string();
    state.settings.storage_backend = "secret".to_string();
    // names are normally filled by the defaults pass
    for (name, release) in state.apps.iter_mut() {
        release.name = name.clone();
    }

    state.make_target_map(&["g1".to_string()], &[]);
    state.disable_untargeted_apps();
    state.update_context_labels();

    let labeled = &state.apps["app1"];
    assert_eq!(labeled.labels.get("MANAGED-BY").unwrap(), "flotilla");
    assert_eq!(labeled.labels.get("CONTEXT").unwrap(), "prod");
    assert_eq!(labeled.labels.get("STORAGE-BACKEND").unwrap(), "secret");

    // excluded releases are skipped, not relabeled
    assert!(state.apps["app2"].labels.is_empty());
}
