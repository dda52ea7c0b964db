/// Result reporting.
///
/// Reads a finished `Simulator` through its query methods only and turns
/// the figures into a `SimulationReport`, which can be rendered as text
/// or JSON and written to a results file.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use rand::RngCore;
use serde::Serialize;

use crate::error::{SimError, SimResult};
use crate::flow::{FlowKind, LINK_SPEED_BPS, PACKET_SIZE_BITS};
use crate::simulation::Simulator;

const RULE_WIDTH: usize = 50;

/// Per-flow figures.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlowReport {
    pub index: usize,
    pub kind: FlowKind,
    pub rate_bps: f64,
    /// Configured packets per second.
    pub arrival_intensity: f64,
    pub theoretical_rho: f64,
    /// Zero for Poisson flows.
    pub simulated_rho: f64,
    /// Share of simulated time the link spent on this flow.
    pub utilization: f64,
    pub packets_served: u64,
    pub mean_sojourn_ms: Option<f64>,
    pub mean_service_ms: Option<f64>,
    pub mean_queue_length: f64,
    pub throughput_pps: f64,
    pub throughput_bps: f64,
    pub deficit_bits: f64,
}

/// Figures for a whole run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationReport {
    pub scenario: String,
    pub packet_size_bits: f64,
    pub link_speed_bps: f64,
    pub quantum_bits: f64,
    pub simulated_time: f64,
    pub events_processed: u64,
    pub flows: Vec<FlowReport>,
    /// Sum of per-flow utilisation.
    pub utilization: f64,
    pub fairness_index: f64,
}

impl SimulationReport {
    /// Collect the figures of `sim` under the label `scenario`.
    pub fn from_simulator<R: RngCore>(scenario: &str, sim: &Simulator<R>) -> Self {
        let elapsed = sim.simulated_time().as_secs();
        let rho = sim.calculate_rho();
        let simulated_rho = sim.calculate_simulated_rho();

        let flows: Vec<FlowReport> = sim
            .flows()
            .enumerate()
            .map(|(index, spec)| {
                let stats = sim.flow_stats(index);
                FlowReport {
                    index,
                    kind: spec.kind(),
                    rate_bps: spec.rate(),
                    arrival_intensity: spec.packet_rate(),
                    theoretical_rho: rho[index],
                    simulated_rho: simulated_rho[index],
                    utilization: stats.utilization(elapsed),
                    packets_served: stats.packets_served,
                    mean_sojourn_ms: stats.mean_sojourn_time().map(|t| t * 1000.0),
                    mean_service_ms: stats.mean_service_time().map(|t| t * 1000.0),
                    mean_queue_length: stats.mean_queue_length(elapsed),
                    throughput_pps: stats.packet_throughput(elapsed),
                    throughput_bps: stats.throughput_bps(elapsed),
                    deficit_bits: sim.deficit(index),
                }
            })
            .collect();

        SimulationReport {
            scenario: scenario.to_string(),
            packet_size_bits: PACKET_SIZE_BITS,
            link_speed_bps: LINK_SPEED_BPS,
            quantum_bits: sim.quantum(),
            simulated_time: elapsed,
            events_processed: sim.events_processed(),
            utilization: flows.iter().map(|f| f.utilization).sum(),
            fairness_index: sim.fairness_index(),
            flows,
        }
    }

    /// Render the human-readable report.
    pub fn write_text<W: Write>(&self, out: &mut W) -> io::Result<()> {
        let rule = "-".repeat(RULE_WIDTH);

        writeln!(out, "\nDRR simulation results ({}):", self.scenario)?;
        writeln!(out, "{}\n", rule)?;
        writeln!(out, "Packet size: {:.3} bits", self.packet_size_bits)?;
        writeln!(out, "Quantum: {:.3} bits\n", self.quantum_bits)?;

        for f in &self.flows {
            writeln!(out, "Flow {}:", f.index + 1)?;
            match f.kind {
                FlowKind::Cbr => {
                    writeln!(out, "  Traffic: CBR")?;
                    writeln!(out, "  Peak rate: {:.3} bps", f.rate_bps)?;
                }
                FlowKind::Poisson => {
                    writeln!(out, "  Traffic: Poisson")?;
                    writeln!(out, "  Mean rate: {:.3} bps", f.rate_bps)?;
                    writeln!(
                        out,
                        "  Theoretical arrival intensity: {:.3} packets/s",
                        f.arrival_intensity
                    )?;
                }
            }
            writeln!(out, "  Theoretical rho: {:.3}%", f.theoretical_rho * 100.0)?;
            if f.kind == FlowKind::Cbr {
                writeln!(out, "  Simulated rho: {:.3}%", f.simulated_rho * 100.0)?;
            }
            writeln!(out, "  Server utilization: {:.3}%", f.utilization * 100.0)?;
            writeln!(out, "  Packets served: {}", f.packets_served)?;
            if let (Some(sojourn), Some(service)) = (f.mean_sojourn_ms, f.mean_service_ms) {
                writeln!(out, "  Mean sojourn time: {:.3} ms", sojourn)?;
                writeln!(out, "  Mean service time: {:.3} ms", service)?;
            }
            writeln!(out, "  Mean queue length: {:.3} packets", f.mean_queue_length)?;
            writeln!(out, "  Throughput: {:.3} packets/s", f.throughput_pps)?;
            writeln!(out, "  Achieved rate: {:.3} bps\n", f.throughput_bps)?;
        }

        writeln!(out, "System:")?;
        writeln!(out, "  Simulated time: {:.3} s", self.simulated_time)?;
        writeln!(out, "  Events processed: {}", self.events_processed)?;
        writeln!(out, "  Server utilization: {:.3}%", self.utilization * 100.0)?;
        writeln!(out, "  Fairness index: {:.3}", self.fairness_index)?;

        writeln!(out, "\nCurrent deficits:")?;
        for f in &self.flows {
            writeln!(out, "  Flow {}: {:.3} bits", f.index + 1, f.deficit_bits)?;
        }
        writeln!(out, "{}", rule)?;
        Ok(())
    }

    /// Render the text report into a `String`.
    pub fn to_text(&self) -> String {
        let mut buf = Vec::new();
        // Writing into a Vec cannot fail.
        let _ = self.write_text(&mut buf);
        String::from_utf8_lossy(&buf).into_owned()
    }

    pub fn to_json(&self) -> SimResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write `<dir>/<scenario>_results.txt` (or `.json`) and return its path.
    ///
    /// The scenario name must be a plain file name component.
    pub fn write_to_dir(&self, dir: &Path, json: bool) -> SimResult<PathBuf> {
        if !is_plain_name(&self.scenario) {
            return Err(SimError::InvalidConfiguration(format!(
                "scenario name {:?} cannot be used as a file name",
                self.scenario
            )));
        }
        std::fs::create_dir_all(dir)?;
        let ext = if json { "json" } else { "txt" };
        let path = dir.join(format!("{}_results.{}", self.scenario, ext));
        let body = if json { self.to_json()? } else { self.to_text() };
        std::fs::write(&path, body)?;
        Ok(path)
    }
}

fn is_plain_name(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\'])
        && !name.chars().any(char::is_control)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flow::FlowSpec;

    fn finished() -> SimulationReport {
        let mut sim = Simulator::seeded(
            vec![FlowSpec::cbr(264_000.0), FlowSpec::poisson(160_000.0)],
            12_000.0,
            1,
        )
        .unwrap();
        sim.run_simulation(2.0);
        SimulationReport::from_simulator("mixed", &sim)
    }

    #[test]
    fn test_report_figures() {
        let r = finished();
        assert_eq!(r.flows.len(), 2);
        assert_eq!(r.flows[0].kind, FlowKind::Cbr);
        assert_eq!(r.flows[1].kind, FlowKind::Poisson);
        assert_eq!(r.flows[1].simulated_rho, 0.0);
        assert_eq!(r.flows[1].arrival_intensity, 2_000.0);
        assert!((r.flows[0].simulated_rho - 0.264).abs() < 1e-2);
        assert!(r.flows[0].mean_sojourn_ms.unwrap() >= 0.08 - 1e-9);
        assert!((r.utilization - (0.264 + 0.16)).abs() < 0.05);
        assert!(r.fairness_index > 0.0 && r.fairness_index <= 1.0);
    }

    #[test]
    fn test_report_before_run() {
        let sim = Simulator::seeded(vec![FlowSpec::cbr(1_000.0)], 12_000.0, 1).unwrap();
        let r = SimulationReport::from_simulator("idle", &sim);
        assert_eq!(r.simulated_time, 0.0);
        assert_eq!(r.flows[0].mean_sojourn_ms, None);
        assert_eq!(r.flows[0].utilization, 0.0);
        assert_eq!(r.fairness_index, 1.0);
        assert!(!r.to_text().contains("Mean sojourn"));
    }

    #[test]
    fn test_text_sections() {
        let text = finished().to_text();
        assert!(text.contains("DRR simulation results (mixed)"));
        assert!(text.contains("Flow 1:"));
        assert!(text.contains("Traffic: CBR"));
        assert!(text.contains("Traffic: Poisson"));
        assert!(text.contains("Theoretical arrival intensity: 2000.000 packets/s"));
        assert!(text.contains("Fairness index:"));
        assert!(text.contains("Current deficits:"));
    }

    #[test]
    fn test_json_round_trips_through_value() {
        let json = finished().to_json().unwrap();
        let v: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(v["scenario"], "mixed");
        assert_eq!(v["flows"][0]["kind"], "cbr");
        assert_eq!(v["packet_size_bits"], 80.0);
    }

    #[test]
    fn test_write_to_dir() {
        let dir = tempfile::tempdir().unwrap();
        let report = finished();

        let txt = report.write_to_dir(dir.path(), false).unwrap();
        assert_eq!(txt.file_name().unwrap(), "mixed_results.txt");
        assert!(std::fs::read_to_string(&txt).unwrap().contains("Flow 2:"));

        let json = report.write_to_dir(dir.path(), true).unwrap();
        assert_eq!(json.file_name().unwrap(), "mixed_results.json");
    }

    #[test]
    fn test_write_to_dir_rejects_path_like_names() {
        let dir = tempfile::tempdir().unwrap();
        let mut report = finished();

        for name in ["../escape", "a/b", "a\\b", "..", ""] {
            report.scenario = name.to_string();
            assert!(
                matches!(
                    report.write_to_dir(dir.path(), false),
                    Err(SimError::InvalidConfiguration(_))
                ),
                "accepted {:?}",
                name
            );
        }
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
        assert!(!dir.path().parent().unwrap().join("escape_results.txt").exists());
    }
}
