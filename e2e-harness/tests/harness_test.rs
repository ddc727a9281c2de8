/*!

These tests run the namespace context against a stand-in `kubectl` script so
that no cluster is needed: the script records every invocation in a file and
plays back canned output. See `tests/integ_test.rs` for the real-cluster
variant.

!*/

use e2e_harness::{Settings, TestNamespace};
use kubectl::{Cmd, Kubectl};
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::TempDir;

fn fake_kubectl(dir: &Path, body: &str) -> PathBuf {
    let path = dir.join("fake-kubectl");
    fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
    let mut perms = fs::metadata(&path).unwrap().permissions();
    perms.set_mode(0o755);
    fs::set_permissions(&path, perms).unwrap();
    path
}

fn context(dir: &TempDir, script: &Path, settings: Settings) -> TestNamespace {
    let settings = Settings {
        base_log_dir: dir.path().join("dumps"),
        ..settings
    };
    TestNamespace::new(
        "Fake Suite",
        "widget-test",
        Kubectl::new().with_program(script),
        settings,
    )
    .unwrap()
}

#[test]
fn logged_steps_scope_the_command_and_dump_diagnostics() {
    let dir = TempDir::new().unwrap();
    let calls = dir.path().join("calls.log");
    let script = fake_kubectl(
        dir.path(),
        &format!(r#"echo "$@" >> {}"#, calls.display()),
    );
    let ns = context(&dir, &script, Settings::default());

    ns.exec_and_log("create the widget", Cmd::apply_files(["widget.yaml"]))
        .unwrap();

    let calls = fs::read_to_string(&calls).unwrap();
    let lines: Vec<&str> = calls.lines().collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0], "apply -f widget.yaml --namespace widget-test");
    assert!(lines[1].starts_with("cluster-info dump --namespaces widget-test --output-directory"));
    assert!(lines[1].contains("01_create_the_widget"));
}

#[test]
fn diagnostics_are_dumped_when_the_step_fails() {
    let dir = TempDir::new().unwrap();
    let calls = dir.path().join("calls.log");
    let script = fake_kubectl(
        dir.path(),
        &format!(
            r#"if [ "$1" = "apply" ]; then exit 1; fi
echo "$@" >> {}"#,
            calls.display()
        ),
    );
    let ns = context(&dir, &script, Settings::default());

    let err = ns
        .exec_and_log("create the widget", Cmd::apply_files(["widget.yaml"]))
        .unwrap_err();
    assert!(err.to_string().contains("Step 'create the widget' failed"));

    let calls = fs::read_to_string(&calls).unwrap();
    assert!(calls.contains("cluster-info dump"));
    assert!(calls.contains("01_create_the_widget"));
}

#[test]
fn steps_are_numbered_in_call_order() {
    let dir = TempDir::new().unwrap();
    let calls = dir.path().join("calls.log");
    let script = fake_kubectl(
        dir.path(),
        &format!(r#"echo "$@" >> {}"#, calls.display()),
    );
    let ns = context(&dir, &script, Settings::default());

    ns.exec_and_log("first step", Cmd::get("pods")).unwrap();
    // The script prints nothing to stdout, so expecting empty output is
    // satisfied on the first check.
    ns.wait_for_output_and_log("second step", Cmd::get("pods"), "", Duration::ZERO)
        .unwrap();

    let calls = fs::read_to_string(&calls).unwrap();
    assert!(calls.contains("01_first_step"));
    assert!(calls.contains("02_second_step"));
}

#[test]
fn wait_for_output_polls_until_the_output_matches() {
    let dir = TempDir::new().unwrap();
    let state = dir.path().join("attempts");
    let script = fake_kubectl(
        dir.path(),
        &format!(
            r#"n=$(cat {state} 2>/dev/null || echo 0)
n=$((n+1))
echo "$n" > {state}
if [ "$n" -ge 3 ]; then echo Ready; else echo Pending; fi"#,
            state = state.display()
        ),
    );
    let ns = context(&dir, &script, Settings::default());

    ns.wait_for_output(
        Cmd::get_by_type_and_name("Widget", "example")
            .format_output("jsonpath={.status.phase}"),
        "Ready",
        Duration::from_secs(10),
    )
    .unwrap();

    assert_eq!(fs::read_to_string(&state).unwrap().trim(), "3");
}

#[test]
fn wait_tolerates_transient_command_failures() {
    let dir = TempDir::new().unwrap();
    let state = dir.path().join("attempts");
    let script = fake_kubectl(
        dir.path(),
        &format!(
            r#"n=$(cat {state} 2>/dev/null || echo 0)
n=$((n+1))
echo "$n" > {state}
if [ "$n" -lt 3 ]; then echo "the server is unavailable" >&2; exit 1; fi
echo "widget-0 is Ready""#,
            state = state.display()
        ),
    );
    let ns = context(&dir, &script, Settings::default());

    ns.wait_for_output_contains(Cmd::get("pods"), "Ready", Duration::from_secs(10))
        .unwrap();
}

#[test]
fn wait_for_output_pattern_matches_through_the_context() {
    let dir = TempDir::new().unwrap();
    let script = fake_kubectl(dir.path(), r#"echo "true true true""#);
    let ns = context(&dir, &script, Settings::default());

    ns.wait_for_output_pattern(Cmd::get("pods"), "^true( true)*$", Duration::from_secs(5))
        .unwrap();
}

#[test]
fn output_and_log_returns_the_captured_output() {
    let dir = TempDir::new().unwrap();
    let calls = dir.path().join("calls.log");
    let script = fake_kubectl(
        dir.path(),
        &format!(
            r#"echo "$@" >> {}
echo "3""#,
            calls.display()
        ),
    );
    let ns = context(&dir, &script, Settings::default());

    let size = ns
        .output_and_log(
            "read the widget size",
            Cmd::get_by_type_and_name("Widget", "example").format_output("jsonpath={.spec.size}"),
        )
        .unwrap();
    assert_eq!(size, "3");
}

#[test]
fn pod_names_are_sorted() {
    let dir = TempDir::new().unwrap();
    let script = fake_kubectl(dir.path(), r#"echo "widget-2 widget-0 widget-1""#);
    let ns = context(&dir, &script, Settings::default());

    let names = ns.pod_names("app=widget").unwrap();
    assert_eq!(names, vec!["widget-0", "widget-1", "widget-2"]);
}

#[test]
fn get_json_parses_the_object() {
    let dir = TempDir::new().unwrap();
    let script = fake_kubectl(dir.path(), r#"echo '{"spec":{"size":3}}'"#);
    let ns = context(&dir, &script, Settings::default());

    let widget = ns.get_json("Widget", "example").unwrap();
    assert_eq!(widget["spec"]["size"], 3);
}

#[test]
fn terminate_deletes_workload_resources_then_the_namespace() {
    let dir = TempDir::new().unwrap();
    let calls = dir.path().join("calls.log");
    let script = fake_kubectl(
        dir.path(),
        &format!(r#"echo "$@" >> {}"#, calls.display()),
    );
    let settings = Settings {
        cleanup_resources: vec!["widgets".to_string()],
        ..Settings::default()
    };
    let ns = context(&dir, &script, settings);

    ns.terminate().unwrap();

    let calls = fs::read_to_string(&calls).unwrap();
    let lines: Vec<&str> = calls.lines().collect();
    assert_eq!(
        lines,
        vec![
            "delete widgets --all --namespace widget-test",
            "delete namespace widget-test",
        ]
    );
}

#[test]
fn terminate_respects_keep_namespace() {
    let dir = TempDir::new().unwrap();
    let calls = dir.path().join("calls.log");
    let script = fake_kubectl(
        dir.path(),
        &format!(r#"echo "$@" >> {}"#, calls.display()),
    );
    let settings = Settings {
        keep_namespace: true,
        cleanup_resources: vec!["widgets".to_string()],
        ..Settings::default()
    };
    let ns = context(&dir, &script, settings);

    ns.terminate().unwrap();

    assert!(!calls.exists());
}
