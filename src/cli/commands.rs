use std::str::FromStr;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, bail};
use tracing::info;

use crate::cli::config::{RunConfig, parse_param};
use crate::demo::invoice::run_invoice_feature;
use crate::format::name_formatter::{DefaultNameFormatter, NameFormatter, format_step_name};
use crate::format::template::Template;
use crate::format::value::ParameterValue;
use crate::notify::notifier::{CompositeNotifier, ProgressNotifier};
use crate::notify::text::TextProgressNotifier;
use crate::notify::tracing_notifier::TracingProgressNotifier;
use crate::report::console::format_console_report;
use crate::report::junit::generate_junit_xml;
use crate::report::report_model::RunSummary;
use crate::runner::coordinator::RunCoordinator;
use crate::step::parameters::StepParameter;

// ============================================================================
// demo subcommand
// ============================================================================

/// Run the built-in invoice feature and return whether no scenario failed.
pub fn cmd_demo(run: &RunConfig, verbose: u8) -> anyhow::Result<bool> {
    let format: ReportFormat = run.format.parse()?;

    let mut notifiers: Vec<Arc<dyn ProgressNotifier>> = vec![Arc::new(TracingProgressNotifier)];
    if verbose > 0 {
        notifiers.push(Arc::new(TextProgressNotifier::stderr()));
    }
    let config = run
        .runner_config()
        .with_notifier(Arc::new(CompositeNotifier::new(notifiers)));

    let coordinator = RunCoordinator::new(config);
    let start = Instant::now();
    run_invoice_feature(&coordinator, run.parallel)?;
    let run_result = coordinator.finish();
    let duration = start.elapsed().as_millis();

    let report = RunSummary::from_run("Demo", &run_result).with_duration(duration);
    let all_passed = report.all_passed();
    info!(
        passed = report.passed,
        failed = report.failed,
        total = report.total,
        "demo finished"
    );

    let output_content = format.render(&report)?;

    // Write or print
    match &run.output {
        Some(path) => std::fs::write(path, &output_content)
            .with_context(|| format!("cannot write report to {}", path))?,
        None => print!("{}", output_content),
    }

    Ok(all_passed)
}

/// Report output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    Console,
    Junit,
    Json,
}

impl FromStr for ReportFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "console" => ReportFormat::Console,
            "junit" => ReportFormat::Junit,
            "json" => ReportFormat::Json,
            other => bail!("unknown report format '{}' (expected console, junit or json)", other),
        })
    }
}

impl ReportFormat {
    pub fn render(self, report: &RunSummary) -> anyhow::Result<String> {
        Ok(match self {
            ReportFormat::Console => format_console_report(report),
            ReportFormat::Junit => generate_junit_xml(report),
            ReportFormat::Json => {
                let mut json = serde_json::to_string_pretty(report)?;
                json.push('\n');
                json
            }
        })
    }
}

/// Render a summary in one of the supported formats: console, junit, json.
pub fn render_report(report: &RunSummary, format: &str) -> anyhow::Result<String> {
    format.parse::<ReportFormat>()?.render(report)
}

// ============================================================================
// format subcommand
// ============================================================================

/// Render a step name from a template and `name=value` parameters.
///
/// Values that read as numbers or booleans are shown bare, anything else
/// is quoted.
pub fn cmd_format(template: &str, keyword: &str, params: &[String]) -> anyhow::Result<String> {
    Template::parse(template).with_context(|| format!("invalid template '{}'", template))?;

    let parameters = params
        .iter()
        .map(|raw| {
            let (name, value) = parse_param(raw)
                .with_context(|| format!("expected name=value, got '{}'", raw))?;
            Ok(StepParameter::new(name, cli_value(value)))
        })
        .collect::<anyhow::Result<Vec<_>>>()?;

    let description = DefaultNameFormatter.format_name(template, &parameters);
    Ok(format_step_name(keyword, &description))
}

fn cli_value(raw: &str) -> ParameterValue {
    if raw.parse::<f64>().is_ok() || raw.parse::<bool>().is_ok() {
        ParameterValue::display(raw)
    } else {
        ParameterValue::text(raw)
    }
}
