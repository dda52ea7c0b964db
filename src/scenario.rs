/// Scenario construction: a fluent builder plus JSON scenario files.
///
/// A `Scenario` is plain data (flows, quantum, horizon, optional seed).
/// Turning it into a running `Simulator` goes through the same validating
/// constructor as direct use.

use std::path::Path;

use serde::Deserialize;

use crate::error::{SimError, SimResult};
use crate::flow::FlowSpec;
use crate::simulation::Simulator;

/// Quantum used by the bundled scenarios: 1500 bytes.
pub const DEFAULT_QUANTUM: f64 = 12_000.0;

/// Horizon used by the bundled scenarios, in seconds.
pub const DEFAULT_MAX_TIME: f64 = 10_000.0;

// ── Scenario ──────────────────────────────────────────────────────────

/// Everything needed to run one simulation.
#[derive(Debug, Clone, PartialEq)]
pub struct Scenario {
    pub name: String,
    pub flows: Vec<FlowSpec>,
    pub quantum: f64,
    pub max_time: f64,
    /// Fixed RNG seed. `None` lets the caller choose one.
    pub seed: Option<u64>,
}

impl Scenario {
    /// Parse a scenario from JSON text.
    pub fn from_json(text: &str) -> SimResult<Self> {
        let file: ScenarioFile = serde_json::from_str(text)?;
        file.try_into()
    }

    /// Read and parse a JSON scenario file.
    pub fn load(path: impl AsRef<Path>) -> SimResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Scenario::from_json(&text)
    }

    /// Build a simulator for this scenario. `seed` is used when the
    /// scenario does not fix one.
    pub fn build(&self, seed: u64) -> SimResult<Simulator> {
        Simulator::seeded(self.flows.clone(), self.quantum, self.seed.unwrap_or(seed))
    }
}

// ── JSON format ───────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ScenarioFile {
    #[serde(default)]
    name: Option<String>,
    #[serde(default = "default_quantum")]
    quantum: f64,
    #[serde(default = "default_max_time")]
    max_time: f64,
    #[serde(default)]
    seed: Option<u64>,
    flows: Vec<FlowEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct FlowEntry {
    kind: String,
    rate: f64,
}

fn default_quantum() -> f64 {
    DEFAULT_QUANTUM
}

fn default_max_time() -> f64 {
    DEFAULT_MAX_TIME
}

impl TryFrom<FlowEntry> for FlowSpec {
    type Error = SimError;

    fn try_from(entry: FlowEntry) -> SimResult<Self> {
        match entry.kind.to_ascii_lowercase().as_str() {
            "cbr" => Ok(FlowSpec::cbr(entry.rate)),
            "poisson" => Ok(FlowSpec::poisson(entry.rate)),
            _ => Err(SimError::UnsupportedFlowKind(entry.kind)),
        }
    }
}

impl TryFrom<ScenarioFile> for Scenario {
    type Error = SimError;

    fn try_from(file: ScenarioFile) -> SimResult<Self> {
        let flows = file
            .flows
            .into_iter()
            .map(FlowSpec::try_from)
            .collect::<SimResult<Vec<_>>>()?;
        Ok(Scenario {
            name: file.name.unwrap_or_else(|| "scenario".into()),
            flows,
            quantum: file.quantum,
            max_time: file.max_time,
            seed: file.seed,
        })
    }
}

// ── ScenarioBuilder ───────────────────────────────────────────────────

/// Fluent builder for a `Scenario`.
///
/// # Example
/// ```rust
/// use drrsim::scenario::ScenarioBuilder;
///
/// let mut sim = ScenarioBuilder::new("mixed")
///     .cbr(264_000.0)
///     .poisson(160_000.0)
///     .quantum(12_000.0)
///     .seed(42)
///     .build()
///     .unwrap();
/// sim.run_simulation(1.0);
/// ```
#[derive(Debug, Clone)]
pub struct ScenarioBuilder {
    scenario: Scenario,
}

impl ScenarioBuilder {
    /// Start an empty scenario with the default quantum and horizon.
    pub fn new(name: &str) -> Self {
        ScenarioBuilder {
            scenario: Scenario {
                name: name.to_string(),
                flows: Vec::new(),
                quantum: DEFAULT_QUANTUM,
                max_time: DEFAULT_MAX_TIME,
                seed: None,
            },
        }
    }

    /// Two CBR flows at 264 kbps and 120 kbps.
    pub fn cbr_pair() -> Self {
        ScenarioBuilder::new("cbr").cbr(264_000.0).cbr(120_000.0)
    }

    /// Two Poisson flows averaging 320 kbps and 160 kbps.
    pub fn poisson_pair() -> Self {
        ScenarioBuilder::new("poisson")
            .poisson(320_000.0)
            .poisson(160_000.0)
    }

    // ── Flows ─────────────────────────────────────────────────

    pub fn flow(mut self, spec: FlowSpec) -> Self {
        self.scenario.flows.push(spec);
        self
    }

    /// Add a CBR flow with the given peak rate (bits/s).
    pub fn cbr(self, peak_rate: f64) -> Self {
        self.flow(FlowSpec::cbr(peak_rate))
    }

    /// Add a Poisson flow with the given mean rate (bits/s).
    pub fn poisson(self, mean_bit_rate: f64) -> Self {
        self.flow(FlowSpec::poisson(mean_bit_rate))
    }

    // ── Parameters ────────────────────────────────────────────

    pub fn quantum(mut self, quantum: f64) -> Self {
        self.scenario.quantum = quantum;
        self
    }

    pub fn max_time(mut self, max_time: f64) -> Self {
        self.scenario.max_time = max_time;
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.scenario.seed = Some(seed);
        self
    }

    // ── Build ─────────────────────────────────────────────────

    /// Finish without constructing a simulator.
    pub fn scenario(self) -> Scenario {
        self.scenario
    }

    /// Construct the simulator. Without an explicit seed, seed 0 is used.
    pub fn build(self) -> SimResult<Simulator> {
        self.scenario.build(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_presets() {
        let cbr = ScenarioBuilder::cbr_pair().scenario();
        assert_eq!(cbr.name, "cbr");
        assert_eq!(cbr.flows, vec![FlowSpec::cbr(264_000.0), FlowSpec::cbr(120_000.0)]);
        assert_eq!(cbr.quantum, 12_000.0);
        assert_eq!(cbr.max_time, 10_000.0);

        let poisson = ScenarioBuilder::poisson_pair().scenario();
        assert_eq!(
            poisson.flows,
            vec![FlowSpec::poisson(320_000.0), FlowSpec::poisson(160_000.0)]
        );
    }

    #[test]
    fn test_builder_builds_simulator() {
        let sim = ScenarioBuilder::new("one")
            .cbr(100_000.0)
            .quantum(800.0)
            .seed(3)
            .build()
            .unwrap();
        assert_eq!(sim.flow_count(), 1);
        assert_eq!(sim.quantum(), 800.0);
    }

    #[test]
    fn test_builder_rejects_empty() {
        let r = ScenarioBuilder::new("empty").build();
        assert!(matches!(r, Err(SimError::InvalidConfiguration(_))));
    }

    #[test]
    fn test_from_json() {
        let s = Scenario::from_json(
            r#"{
                "name": "mixed",
                "quantum": 4000,
                "max_time": 60,
                "seed": 9,
                "flows": [
                    {"kind": "cbr", "rate": 264000},
                    {"kind": "Poisson", "rate": 160000}
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(s.name, "mixed");
        assert_eq!(s.quantum, 4_000.0);
        assert_eq!(s.max_time, 60.0);
        assert_eq!(s.seed, Some(9));
        assert_eq!(s.flows, vec![FlowSpec::cbr(264_000.0), FlowSpec::poisson(160_000.0)]);
    }

    #[test]
    fn test_from_json_defaults() {
        let s = Scenario::from_json(r#"{"flows": [{"kind": "cbr", "rate": 1000}]}"#).unwrap();
        assert_eq!(s.name, "scenario");
        assert_eq!(s.quantum, DEFAULT_QUANTUM);
        assert_eq!(s.max_time, DEFAULT_MAX_TIME);
        assert_eq!(s.seed, None);
    }

    #[test]
    fn test_unknown_flow_kind_fails_fast() {
        let r = Scenario::from_json(r#"{"flows": [{"kind": "vbr", "rate": 1000}]}"#);
        match r {
            Err(SimError::UnsupportedFlowKind(kind)) => assert_eq!(kind, "vbr"),
            other => panic!("expected UnsupportedFlowKind, got {:?}", other),
        }
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(
            Scenario::from_json(r#"{"flows": "#),
            Err(SimError::Parse(_))
        ));
        assert!(matches!(
            Scenario::from_json(r#"{"flows": [], "speed": 1}"#),
            Err(SimError::Parse(_))
        ));
    }

    #[test]
    fn test_scenario_seed_takes_precedence() {
        let fixed = ScenarioBuilder::poisson_pair().seed(5).scenario();
        let mut a = fixed.build(100).unwrap();
        let mut b = fixed.build(200).unwrap();
        a.run_simulation(1.0);
        b.run_simulation(1.0);
        assert_eq!(a.packets_served(0), b.packets_served(0));
        assert_eq!(a.total_sojourn_time(1), b.total_sojourn_time(1));
    }

    #[test]
    fn test_bundled_scenario_files_parse() {
        let dir = concat!(env!("CARGO_MANIFEST_DIR"), "/scenarios");
        let mixed = Scenario::load(format!("{}/mixed.json", dir)).unwrap();
        assert_eq!(mixed.flows.len(), 3);
        assert_eq!(mixed.seed, Some(42));

        let saturated = Scenario::load(format!("{}/saturated.json", dir)).unwrap();
        assert_eq!(saturated.name, "saturated");
        assert!(saturated.build(1).is_ok());
    }

    #[test]
    fn test_load_missing_file() {
        let r = Scenario::load("/nonexistent/drrsim/scenario.json");
        assert!(matches!(r, Err(SimError::Io(_))));
    }
}
