use clap::Parser;
use scenario_engine::cli::commands::{ReportFormat, cmd_demo, cmd_format};
use scenario_engine::cli::config::{
    AppConfig, Cli, Commands, ConfigError, RunConfig, load_config, merge_run_config, parse_param,
    read_config,
};

// ============================================================================
// Helper builders
// ============================================================================

fn write_config(content: &str) -> (tempfile::TempDir, String) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("scenario-engine.yaml");
    std::fs::write(&path, content).unwrap();
    let path = path.to_string_lossy().into_owned();
    (dir, path)
}

// ============================================================================
// 1. CLI Argument Parsing
// ============================================================================

#[test]
fn cli_parse_demo_minimal() {
    let cli = Cli::parse_from(["scenario-engine", "demo"]);
    assert_eq!(cli.verbose, 0);
    assert!(cli.config.is_none());
    match cli.command {
        Commands::Demo {
            format,
            output,
            parallel,
            stop_on_ignored,
            repeated_keyword,
        } => {
            assert!(format.is_none());
            assert!(output.is_none());
            assert!(parallel.is_none());
            assert!(!stop_on_ignored);
            assert!(repeated_keyword.is_none());
        }
        _ => panic!("Expected Demo command"),
    }
}

#[test]
fn cli_parse_demo_all_args() {
    let cli = Cli::parse_from([
        "scenario-engine",
        "-vv",
        "--config",
        "custom.yaml",
        "demo",
        "--format",
        "junit",
        "-o",
        "report.xml",
        "--parallel",
        "4",
        "--stop-on-ignored",
        "--repeated-keyword",
        "and",
    ]);
    assert_eq!(cli.verbose, 2);
    assert_eq!(cli.config.as_deref(), Some("custom.yaml"));
    match cli.command {
        Commands::Demo {
            format,
            output,
            parallel,
            stop_on_ignored,
            repeated_keyword,
        } => {
            assert_eq!(format.as_deref(), Some("junit"));
            assert_eq!(output.as_deref(), Some("report.xml"));
            assert_eq!(parallel, Some(4));
            assert!(stop_on_ignored);
            assert_eq!(repeated_keyword.as_deref(), Some("and"));
        }
        _ => panic!("Expected Demo command"),
    }
}

#[test]
fn cli_parse_format_with_params() {
    let cli = Cli::parse_from([
        "scenario-engine",
        "format",
        "--template",
        "customer pays {amount}",
        "--keyword",
        "when",
        "amount=62",
        "card=visa",
    ]);
    match cli.command {
        Commands::Format {
            template,
            keyword,
            params,
        } => {
            assert_eq!(template, "customer pays {amount}");
            assert_eq!(keyword, "when");
            assert_eq!(params, vec!["amount=62", "card=visa"]);
        }
        _ => panic!("Expected Format command"),
    }
}

#[test]
fn cli_rejects_unknown_subcommand() {
    assert!(Cli::try_parse_from(["scenario-engine", "explore"]).is_err());
}

// ============================================================================
// 2. Config File Loading
// ============================================================================

#[test]
fn config_defaults() {
    let config = AppConfig::default();
    assert_eq!(config.run.format, "console");
    assert_eq!(config.run.parallel, 2);
    assert!(!config.run.stop_on_ignored);
    assert_eq!(config.logging.filter, "warn");
    assert!(!config.logging.json);
}

#[test]
fn config_is_read_from_yaml() {
    let (_dir, path) = write_config(
        "run:\n  format: junit\n  stop_on_ignored: true\n  repeated_keyword: and\nlogging:\n  json: true\n",
    );
    let config = load_config(Some(path.as_str()));
    assert_eq!(config.run.format, "junit");
    assert!(config.run.stop_on_ignored);
    assert_eq!(config.run.repeated_keyword.as_deref(), Some("and"));
    assert_eq!(config.run.parallel, 2);
    assert!(config.logging.json);
    assert_eq!(config.logging.filter, "warn");
}

#[test]
fn missing_config_gives_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.yaml");
    let path = path.to_string_lossy();
    assert!(read_config(&path).unwrap().is_none());
    assert_eq!(load_config(Some(&*path)), AppConfig::default());
}

#[test]
fn malformed_config_is_reported_and_defaults_are_used() {
    let (_dir, path) = write_config("run: [not, a, map\n");
    assert!(matches!(read_config(&path), Err(ConfigError::Parse { .. })));
    assert_eq!(load_config(Some(path.as_str())), AppConfig::default());
}

// ============================================================================
// 3. Config Builders
// ============================================================================

#[test]
fn cli_values_override_config() {
    let file = RunConfig {
        format: "junit".into(),
        output: Some("file.xml".into()),
        stop_on_ignored: false,
        repeated_keyword: Some("and".into()),
        parallel: 3,
    };

    let merged = merge_run_config(&file, Some("json".into()), None, Some(0), true, None);
    assert_eq!(merged.format, "json");
    assert_eq!(merged.output.as_deref(), Some("file.xml"));
    assert!(merged.stop_on_ignored);
    assert_eq!(merged.repeated_keyword.as_deref(), Some("and"));
    // At least one thread
    assert_eq!(merged.parallel, 1);

    let runner = merged.runner_config();
    assert!(runner.stop_on_ignored());
    assert_eq!(runner.repeated_keyword(), Some("and"));
}

#[test]
fn params_split_on_first_equals() {
    assert_eq!(parse_param("a=b=c"), Some(("a", "b=c")));
    assert_eq!(parse_param(" amount =62"), Some(("amount", "62")));
    assert_eq!(parse_param("=62"), None);
    assert_eq!(parse_param("amount"), None);
}

// ============================================================================
// 4. Commands
// ============================================================================

#[test]
fn format_command_renders_a_step_name() {
    let name = cmd_format(
        "customer pays {amount} pounds",
        "when",
        &["amount=62".into(), "card=visa".into()],
    )
    .unwrap();
    assert_eq!(name, "WHEN customer pays 62 pounds [card: \"visa\"]");
}

#[test]
fn format_command_rejects_bad_input() {
    assert!(cmd_format("broken {", "", &[]).is_err());
    assert!(cmd_format("ok", "", &["novalue".into()]).is_err());
}

#[test]
fn demo_writes_a_json_report() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("demo.json");
    let run = RunConfig {
        format: "json".into(),
        output: Some(path.to_string_lossy().into_owned()),
        ..RunConfig::default()
    };

    let all_passed = cmd_demo(&run, 0).unwrap();
    assert!(!all_passed);

    let report: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(report["total"], 4);
    assert_eq!(report["passed"], 1);
    assert_eq!(report["failed"], 1);
    assert_eq!(report["ignored"], 1);
    assert_eq!(report["bypassed"], 1);

    let receiving = report["features"][0]["scenarios"]
        .as_array()
        .unwrap()
        .iter()
        .find(|s| s["info"]["name"] == "Receiving invoice for products")
        .unwrap();
    assert_eq!(receiving["status"], "Passed");
    assert_eq!(
        receiving["steps"][0]["formatted_name"],
        "GIVEN product \"wooden desk\" is available in products storage for 62 pounds"
    );
    assert_eq!(
        receiving["steps"][2]["formatted_name"],
        "WHEN customer \"Joe\" buys \"wooden desk\""
    );
    assert_eq!(receiving["steps"][2]["comments"][0], "invoice total: 62 pounds");
}

#[test]
fn demo_rejects_an_unknown_format_up_front() {
    assert_eq!("junit".parse::<ReportFormat>().unwrap(), ReportFormat::Junit);
    assert!("html".parse::<ReportFormat>().is_err());

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("demo.html");
    let run = RunConfig {
        format: "html".into(),
        output: Some(path.to_string_lossy().into_owned()),
        ..RunConfig::default()
    };

    let err = cmd_demo(&run, 1).unwrap_err();
    assert!(err.to_string().contains("unknown report format 'html'"), "{}", err);
    assert!(!path.exists());
}
