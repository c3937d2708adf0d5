use std::path::Path;

use anyhow::Result;
use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::{Value, json};
use tempfile::tempdir;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TOOL_NAMES: [&str; 6] = [
    "list_current_workflows",
    "get_workflow_information",
    "create_workflow",
    "make_workflow_conversational",
    "add_manager_agent_to_workflow",
    "add_agent_to_workflow",
];

/// The binary under `cargo run`, isolated from the caller's environment and
/// `.env` files.
fn agent_studio_cmd(home: &Path) -> Command {
    let mut cmd = Command::new("cargo");
    cmd.arg("run")
        .arg("--quiet")
        .arg("-p")
        .arg("agent-studio-mcp")
        .arg("--bin")
        .arg("agent-studio-mcp")
        .arg("--manifest-path")
        .arg(concat!(env!("CARGO_MANIFEST_DIR"), "/../Cargo.toml"))
        .arg("--");
    cmd.current_dir(home)
        .env("AGENT_STUDIO_MCP_HOME", home)
        .env_remove("AGENT_STUDIO_DOMAIN")
        .env_remove("CDSW_APIV2_KEY")
        .env_remove("AGENT_STUDIO_VERIFY_TLS")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn tools_lists_every_registered_tool() -> Result<()> {
    let temp = tempdir()?;
    let assert = agent_studio_cmd(temp.path()).arg("tools").assert().success();

    let stdout = String::from_utf8(assert.get_output().stdout.clone())?;
    for name in TOOL_NAMES {
        assert!(stdout.contains(name), "missing {name} in:\n{stdout}");
    }
    Ok(())
}

#[test]
fn tools_json_carries_input_schemas() -> Result<()> {
    let temp = tempdir()?;
    let assert = agent_studio_cmd(temp.path())
        .arg("tools")
        .arg("--json")
        .assert()
        .success();

    let tools: Vec<Value> = serde_json::from_slice(&assert.get_output().stdout)?;
    assert_eq!(tools.len(), TOOL_NAMES.len());
    let add_agent = tools
        .iter()
        .find(|tool| tool["name"] == "add_agent_to_workflow")
        .expect("add_agent_to_workflow registered");
    let properties = &add_agent["inputSchema"]["properties"];
    for field in ["workflow_id", "agent_name", "agent_role", "agent_backstory", "agent_goal"] {
        assert!(properties.get(field).is_some(), "schema lacks {field}: {add_agent}");
    }
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn invoke_calls_backend_with_configured_credentials() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/grpc/listWorkflows"))
        .and(header("authorization", "Bearer file-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "workflows": [{"workflow_id": "w1", "name": "Support"}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let temp = tempdir()?;
    let home = temp.path().to_path_buf();
    std::fs::write(
        home.join(".env"),
        format!("AGENT_STUDIO_DOMAIN={}\nCDSW_APIV2_KEY=\"file-token\"\n", server.uri()),
    )?;

    let stdout = tokio::task::spawn_blocking(move || {
        let assert = agent_studio_cmd(&home)
            .arg("invoke")
            .arg("--tool")
            .arg("list_current_workflows")
            .assert()
            .success();
        assert.get_output().stdout.clone()
    })
    .await?;

    let listed: Value = serde_json::from_slice(&stdout)?;
    assert_eq!(listed, json!([{"id": "w1", "name": "Support"}]));
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn dotenv_is_loaded_before_logging_starts() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/grpc/listWorkflows"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"workflows": []})))
        .mount(&server)
        .await;

    let temp = tempdir()?;
    let home = temp.path().to_path_buf();
    std::fs::write(
        home.join(".env"),
        format!(
            "RUST_LOG=agent_studio_mcp=debug\nAGENT_STUDIO_DOMAIN={}\nCDSW_APIV2_KEY=very-secret-token\n",
            server.uri()
        ),
    )?;

    let stderr = tokio::task::spawn_blocking(move || {
        let assert = agent_studio_cmd(&home)
            .arg("invoke")
            .arg("--tool")
            .arg("list_current_workflows")
            .assert()
            .success();
        String::from_utf8_lossy(&assert.get_output().stderr).into_owned()
    })
    .await?;

    assert!(
        stderr.contains("resolved Agent Studio configuration"),
        "debug filter from .env not applied:\n{stderr}"
    );
    assert!(!stderr.contains("very-secret-token"), "token leaked:\n{stderr}");
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn invoke_failure_exits_non_zero_with_backend_message() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/grpc/getWorkflow"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"error": "workflow ghost not found"})))
        .mount(&server)
        .await;

    let temp = tempdir()?;
    let home = temp.path().to_path_buf();
    let base_url = server.uri();

    tokio::task::spawn_blocking(move || {
        agent_studio_cmd(&home)
            .arg("--base-url")
            .arg(&base_url)
            .arg("--api-key")
            .arg("flag-token")
            .arg("invoke")
            .arg("--tool")
            .arg("get_workflow_information")
            .arg("--args")
            .arg(r#"{"id":"ghost"}"#)
            .assert()
            .failure()
            .stderr(predicate::str::contains("workflow ghost not found"));
    })
    .await?;
    Ok(())
}

#[test]
fn unknown_tool_is_rejected() -> Result<()> {
    let temp = tempdir()?;
    agent_studio_cmd(temp.path())
        .arg("--base-url")
        .arg("http://127.0.0.1:9")
        .arg("invoke")
        .arg("--tool")
        .arg("drop_workflow")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown tool 'drop_workflow'"));
    Ok(())
}
