//! Unit tests for `GcloudCompute` over a scripted command runner.

#![allow(clippy::expect_used)]

use netcheck::application::ports::CloudCompute;
use netcheck::domain::Instance;
use netcheck::infra::gcloud::GcloudCompute;

use crate::mocks::{ScriptedRunner, err_output, ok_output};

fn gcloud(responses: Vec<std::process::Output>) -> GcloudCompute<ScriptedRunner> {
    GcloudCompute::new(ScriptedRunner::new(responses), "gcloud")
}

fn private_instance() -> Instance {
    Instance {
        name: "netcheck-abc123-private".to_string(),
        zone: "us-east1-b".to_string(),
        public_ip: None,
    }
}

const DESCRIBE_WITH_KEYS: &[u8] = br#"{
    "name": "netcheck-abc123-private",
    "zone": "https://www.googleapis.com/compute/v1/projects/p/zones/us-east1-b",
    "networkInterfaces": [{"networkIP": "10.0.16.2"}],
    "metadata": {
        "fingerprint": "xyz=",
        "items": [{"key": "ssh-keys", "value": "alice:ssh-rsa AAAA alice"}]
    }
}"#;

#[tokio::test]
async fn test_regions_lists_names() {
    let gc = gcloud(vec![ok_output(
        br#"[{"name": "us-east1", "status": "UP"}, {"name": "europe-west1", "status": "UP"}]"#,
    )]);

    let regions = gc.regions("p").await.expect("regions parse");

    assert_eq!(regions, ["us-east1", "europe-west1"]);
    let args = gc.runner().call_args(0);
    assert_eq!(args[..3], ["compute", "regions", "list"]);
    assert!(args.contains(&"--format=json".to_string()));
}

#[tokio::test]
async fn test_fetch_instance_keeps_exact_name_only() {
    let gc = gcloud(vec![ok_output(
        br#"[
            {"name": "netcheck-abc123-public-with-ip", "zone": "zones/us-east1-c"},
            {
                "name": "netcheck-abc123-public",
                "zone": "https://www.googleapis.com/compute/v1/projects/p/zones/us-east1-b",
                "networkInterfaces": [{"accessConfigs": [{"natIP": "34.1.2.3"}]}]
            }
        ]"#,
    )]);

    let instance = gc
        .fetch_instance("p", "netcheck-abc123-public")
        .await
        .expect("instance found");

    assert_eq!(instance.zone, "us-east1-b");
    assert_eq!(instance.public_ip.as_deref(), Some("34.1.2.3"));
    assert!(
        gc.runner()
            .call_args(0)
            .contains(&"--filter=name=(netcheck-abc123-public)".to_string())
    );
}

#[tokio::test]
async fn test_fetch_instance_not_found() {
    let gc = gcloud(vec![ok_output(b"[]")]);

    let err = gc
        .fetch_instance("p", "netcheck-abc123-private")
        .await
        .expect_err("nothing listed");

    assert!(err.to_string().contains("not found in project 'p'"));
}

#[tokio::test]
async fn test_add_ssh_key_appends_to_existing_metadata() {
    let gc = gcloud(vec![ok_output(DESCRIBE_WITH_KEYS), ok_output(b"")]);

    gc.add_ssh_key("p", &private_instance(), "terratest", "ssh-rsa BBBB netcheck\n")
        .await
        .expect("key added");

    let runner = gc.runner();
    assert_eq!(runner.call_count(), 2);
    assert_eq!(runner.call_args(0)[..3], ["compute", "instances", "describe"]);
    let add = runner.call_args(1);
    assert_eq!(
        add[..4],
        ["compute", "instances", "add-metadata", "netcheck-abc123-private"]
    );
    assert!(add.iter().any(|a| a.starts_with("--metadata-from-file=ssh-keys=")));
    assert!(add.windows(2).any(|w| w == ["--zone", "us-east1-b"]));
}

#[tokio::test]
async fn test_add_ssh_key_skips_write_when_key_present() {
    let gc = gcloud(vec![ok_output(DESCRIBE_WITH_KEYS)]);

    gc.add_ssh_key("p", &private_instance(), "alice", "ssh-rsa AAAA alice")
        .await
        .expect("nothing to do");

    assert_eq!(gc.runner().call_count(), 1);
}

#[tokio::test]
async fn test_add_ssh_key_surfaces_fingerprint_conflict() {
    let gc = gcloud(vec![
        ok_output(DESCRIBE_WITH_KEYS),
        err_output(
            1,
            b"ERROR: Supplied fingerprint does not match current metadata fingerprint.",
        ),
    ]);

    let err = gc
        .add_ssh_key("p", &private_instance(), "terratest", "ssh-rsa BBBB netcheck")
        .await
        .expect_err("conflict");

    assert!(err.to_string().contains("fingerprint does not match"));
}
