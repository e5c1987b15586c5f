use std::fmt;
use std::io::{self, Write};

use crate::dataset::ReferenceDataset;
use crate::dispatch::Dispatcher;
use crate::error::ScenarioError;
use crate::scenario::{catalog, RangeScenario};
use crate::validate::validate;

/// Result of one scenario, ready for reporting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationOutcome {
    pub scenario: String,
    pub passed: bool,
    pub detail: Option<String>,
}

impl ValidationOutcome {
    pub fn new(scenario: &RangeScenario, result: Result<(), ScenarioError>) -> Self {
        match result {
            Ok(()) => ValidationOutcome { scenario: scenario.name.clone(), passed: true, detail: None },
            Err(e) => ValidationOutcome {
                scenario: scenario.name.clone(),
                passed: false,
                detail: Some(e.to_string()),
            },
        }
    }
}

impl fmt::Display for ValidationOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.passed {
            return write!(f, "[PASS] {}", self.scenario);
        }
        write!(f, "[FAIL] {}", self.scenario)?;
        if let Some(detail) = &self.detail {
            write!(f, "\n       {}", detail)?;
        }
        Ok(())
    }
}

/// Outcomes of a whole run, in catalog order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Report {
    pub outcomes: Vec<ValidationOutcome>,
}

impl Report {
    pub fn passed(&self) -> usize {
        self.outcomes.iter().filter(|o| o.passed).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.passed()
    }

    pub fn all_passed(&self) -> bool {
        self.failed() == 0
    }
}

/// Runs every scenario against one target, one at a time.
pub struct Suite {
    dispatcher: Dispatcher,
    dataset: ReferenceDataset,
    scenarios: Vec<RangeScenario>,
}

impl Suite {
    /// The standard catalog for `dataset`.
    pub fn new(dispatcher: Dispatcher, dataset: ReferenceDataset) -> Self {
        let scenarios = catalog(dataset.len());
        Suite::with_scenarios(dispatcher, dataset, scenarios)
    }

    pub fn with_scenarios(dispatcher: Dispatcher, dataset: ReferenceDataset, scenarios: Vec<RangeScenario>) -> Self {
        Suite { dispatcher, dataset, scenarios }
    }

    pub fn scenarios(&self) -> &[RangeScenario] {
        &self.scenarios
    }

    /// Sends the request for `scenario` and validates the answer.
    pub async fn run_scenario(&self, scenario: &RangeScenario) -> ValidationOutcome {
        let result = match self.dispatcher.send(scenario).await {
            Ok(response) => validate(scenario, &self.dataset, response).await,
            Err(e) => Err(e),
        };
        ValidationOutcome::new(scenario, result)
    }

    /// Runs the whole catalog, writing each outcome to `out` as soon as it is known.
    ///
    /// A failing scenario never stops the run. Only errors writing to `out` do.
    pub async fn run<W: Write>(&self, out: &mut W) -> io::Result<Report> {
        tracing::info!(url = %self.dispatcher.target(), scenarios = self.scenarios.len(), "starting range conformance run");

        let mut report = Report::default();
        for scenario in &self.scenarios {
            let outcome = self.run_scenario(scenario).await;
            if let Some(detail) = &outcome.detail {
                tracing::debug!(scenario = %outcome.scenario, %detail, "scenario failed");
            }

            writeln!(out, "{}", outcome)?;
            out.flush()?;
            report.outcomes.push(outcome);
        }

        tracing::info!(passed = report.passed(), failed = report.failed(), "run finished");
        Ok(report)
    }
}
