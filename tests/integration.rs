//! Integration tests for the arcanum engine binary.
//!
//! Spawns the engine process, feeds it JSON-lines commands on stdin, and
//! checks the JSON lines it writes to stdout.

use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::process::{Command, Output, Stdio};

use serde_json::Value;

/// Two wizards: Merlin attacks from (7,5) into Sss'ra's stack at (8,5),
/// three cells from his fortress.
const SCENARIO: &str = r#"{
  "ruleset": {
    "spells": [
      {"id": "SP001", "name": "Prayer", "realm": "life", "kind": "combat_enchantment",
       "combat_cost": 10, "combat_area_effects": ["CSE001"]},
      {"id": "SP002", "name": "Heroism", "realm": "life", "kind": "unit_enchantment",
       "overland_cost": 25, "combat_cost": 12, "unit_effects": ["US001"]}
    ],
    "unit_types": [
      {"id": "UN100", "name": "Spearmen", "movement": 1}
    ]
  },
  "world": {
    "players": [
      {"id": 1, "name": "Merlin", "kind": "human", "casting_skill": 20,
       "fortress": {"x": 5, "y": 5, "plane": 0},
       "research": {"SP001": "available", "SP002": "available"},
       "budget": {"mana_reserve": 100}},
      {"id": 2, "name": "Sss'ra", "kind": "ai", "casting_skill": 10,
       "fortress": {"x": 30, "y": 20, "plane": 0}}
    ],
    "units": [
      {"id": 1, "owner": 1, "unit_type": "UN100", "status": "alive", "location": {"x": 7, "y": 5, "plane": 0}},
      {"id": 2, "owner": 1, "unit_type": "UN100", "status": "alive", "location": {"x": 7, "y": 5, "plane": 0}},
      {"id": 3, "owner": 2, "unit_type": "UN100", "status": "alive", "location": {"x": 8, "y": 5, "plane": 0}}
    ]
  }
}"#;

const START: &str = r#"{"cmd":"start_combat","defending_location":{"x":8,"y":5,"plane":0},"attacking_from":{"x":7,"y":5,"plane":0},"attacking_units":[1,2]}"#;
const PRAYER: &str = r#"{"cmd":"cast_spell","player":1,"spell":"SP001","combat_location":{"x":8,"y":5,"plane":0}}"#;

/// Writes a scenario to a file unique to this test process.
fn scenario_file(name: &str, contents: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!("arcanum-{}-{name}.json", std::process::id()));
    std::fs::write(&path, contents).expect("failed to write scenario");
    path
}

fn spawn(args: &[&str], commands: &[&str]) -> Output {
    let exe = env!("CARGO_BIN_EXE_arcanum");
    let mut child = Command::new(exe)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .expect("failed to start arcanum");

    // The child may exit before reading stdin (e.g. on bad startup flags),
    // so a broken pipe here is expected and not a test failure.
    let mut stdin = child.stdin.take().unwrap();
    let written = commands
        .iter()
        .try_for_each(|cmd| writeln!(stdin, "{}", cmd))
        .and_then(|_| stdin.flush());
    if let Err(e) = written {
        assert_eq!(e.kind(), std::io::ErrorKind::BrokenPipe, "write to child failed: {e}");
    }
    drop(stdin);

    child.wait_with_output().expect("failed to wait on child")
}

/// Sends a sequence of commands and returns the parsed stdout lines.
fn run_engine(args: &[&str], commands: &[&str]) -> Vec<Value> {
    let output = spawn(args, commands);
    assert!(output.status.success());
    output
        .stdout
        .as_slice()
        .lines()
        .map(|l| serde_json::from_str(&l.unwrap()).expect("stdout line is not JSON"))
        .collect()
}

fn messages_of_type<'a>(lines: &'a [Value], kind: &str) -> Vec<&'a Value> {
    lines
        .iter()
        .filter(|l| l["message"]["type"] == kind)
        .collect()
}

fn oks(lines: &[Value]) -> Vec<String> {
    lines
        .iter()
        .filter_map(|l| l["ok"].as_str().map(str::to_string))
        .collect()
}

#[test]
fn commands_without_scenario_report_error() {
    let lines = run_engine(&[], &[START, "quit"]);
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0]["error"], "no scenario loaded");
}

#[test]
fn malformed_and_empty_lines_are_ignored() {
    let lines = run_engine(&[], &["", "   ", "not json", r#"{"cmd":"dance"}"#, "quit"]);
    assert!(lines.is_empty());
}

#[test]
fn quit_stops_reading() {
    let lines = run_engine(&[], &["quit", START]);
    assert!(lines.is_empty());

    let lines = run_engine(&[], &[r#"{"cmd":"quit"}"#, START]);
    assert!(lines.is_empty());
}

#[test]
fn missing_scenario_file_is_reported() {
    let lines = run_engine(&[], &[r#"{"cmd":"load_scenario","path":"/nonexistent/arcanum.json"}"#, "quit"]);
    assert_eq!(lines.len(), 1);
    assert!(lines[0]["error"]
        .as_str()
        .unwrap()
        .starts_with("cannot read scenario file"));
}

#[test]
fn bad_scenario_flag_fails_startup() {
    let output = spawn(&["--scenario", "/nonexistent/arcanum.json"], &["quit"]);
    assert!(!output.status.success());

    let output = spawn(&["--seed", "many"], &["quit"]);
    assert!(!output.status.success());
}

#[test]
fn full_combat_over_stdin() {
    let path = scenario_file("combat", SCENARIO);
    let load = format!(r#"{{"cmd":"load_scenario","path":{}}}"#, Value::from(path.to_string_lossy().as_ref()));
    let lines = run_engine(
        &["--seed", "9"],
        &[
            &load,
            START,
            PRAYER,
            PRAYER,
            r#"{"cmd":"next_combat_turn","location":{"x":8,"y":5,"plane":0}}"#,
            r#"{"cmd":"kill_unit","unit":3}"#,
            "quit",
        ],
    );
    let _ = std::fs::remove_file(&path);

    assert_eq!(
        oks(&lines),
        vec![
            "load_scenario".to_string(),
            "combat started at (8, 5, 0)".to_string(),
            "cast".to_string(),
            "rejected: You have already cast a spell this combat turn.".to_string(),
            "combat turn 2".to_string(),
            "combat ended, winner player 1".to_string(),
        ]
    );

    // Only Merlin has a client connection.
    let started = messages_of_type(&lines, "combat_started");
    assert_eq!(started.len(), 1);
    assert_eq!(started[0]["recipient"], 1);
    assert_eq!(started[0]["message"]["placements"].as_array().unwrap().len(), 3);

    let added = messages_of_type(&lines, "combat_area_effect_added");
    assert_eq!(added.len(), 1);
    assert_eq!(added[0]["message"]["effect"]["effect_id"], "CSE001");

    let popups = messages_of_type(&lines, "text_popup");
    assert_eq!(popups.len(), 1);
    assert_eq!(popups[0]["message"]["text"], "You have already cast a spell this combat turn.");

    let ended = messages_of_type(&lines, "combat_ended");
    assert_eq!(ended.len(), 1);
    assert_eq!(ended[0]["message"]["winning_player"], 1);
}

#[test]
fn scenario_flag_preloads_session() {
    let path = scenario_file("preload", SCENARIO);
    let path_arg = path.to_string_lossy().to_string();
    let lines = run_engine(
        &["--scenario", &path_arg],
        &[
            r#"{"cmd":"start_turn","player":1}"#,
            r#"{"cmd":"cast_spell","player":1,"spell":"SP002"}"#,
            r#"{"cmd":"progress_casting","player":1}"#,
            r#"{"cmd":"start_turn","player":1}"#,
            r#"{"cmd":"target_spell","player":1,"spell":"SP002","target":{"unit":1}}"#,
            "quit",
        ],
    );
    let _ = std::fs::remove_file(&path);

    assert_eq!(
        oks(&lines),
        vec![
            "turn started, completed: false".to_string(),
            "queued".to_string(),
            "casting progressed, completed: false".to_string(),
            "turn started, completed: true".to_string(),
            "cast".to_string(),
        ]
    );
    assert_eq!(messages_of_type(&lines, "overland_cast_queued").len(), 1);
    assert_eq!(messages_of_type(&lines, "ask_for_spell_target").len(), 1);
    assert_eq!(messages_of_type(&lines, "maintained_spell_added").len(), 1);
}
