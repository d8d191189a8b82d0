//! Library-level invocation of the demo plugin: runner → response → materializer.

use std::fs;

use scaffold::{
    ExternalPlugin, PluginRequest, PluginRunner, RunError, RunnerConfig, Universe, materialize,
};

const DEMO_PLUGIN: &str = env!("CARGO_BIN_EXE_scaffold-demo-plugin");

#[tokio::test]
async fn init_round_trip_materializes_project() {
    let root = tempfile::tempdir().unwrap();
    let plugin = ExternalPlugin::new(DEMO_PLUGIN, root.path()).with_version("v1-alpha");
    let request = PluginRequest::new("init").with_args(["--domain", "example.com"]);

    let response = PluginRunner::default()
        .invoke(&plugin, &request)
        .await
        .unwrap();
    assert_eq!(response.command, "init");
    assert!(!response.error);

    materialize(plugin.dir_context(), &response.universe).unwrap();

    assert_eq!(
        fs::read_to_string(root.path().join("PROJECT")).unwrap(),
        "domain: example.com\n"
    );
}

#[tokio::test]
async fn request_universe_is_carried_forward() {
    let root = tempfile::tempdir().unwrap();
    let plugin = ExternalPlugin::new(DEMO_PLUGIN, root.path());
    let mut prior = Universe::new();
    prior.insert("PROJECT".to_string(), "domain: example.com\n".to_string());
    let request = PluginRequest::new("create api")
        .with_args(["--group", "batch", "--version", "v1", "--kind", "CronJob"])
        .with_universe(prior);

    let response = PluginRunner::new(RunnerConfig::new())
        .run(&plugin, &request)
        .await
        .unwrap();

    let paths: Vec<&str> = response.universe.keys().map(String::as_str).collect();
    assert_eq!(paths, vec!["PROJECT", "api/v1/cronjob_types.yaml"]);
}

#[tokio::test]
async fn unknown_command_is_reported_by_plugin() {
    let root = tempfile::tempdir().unwrap();
    let plugin = ExternalPlugin::new(DEMO_PLUGIN, root.path());

    let err = PluginRunner::default()
        .run(&plugin, &PluginRequest::new("create webhook"))
        .await
        .unwrap_err();

    match err {
        RunError::Reported(reported) => {
            assert_eq!(reported.command, "create webhook");
            assert_eq!(reported.message, "unknown command: \"create webhook\"");
        }
        other => panic!("expected Reported, got {other:?}"),
    }
}
