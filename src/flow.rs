/// Per-flow traffic models.
///
/// Each flow is a closed variant (`FlowSpec`) and its generator
/// (`FlowModel`) is built once at construction. Arrival processes draw
/// from the injected RNG; service times are the fixed transmission time
/// of one packet on the link.

use rand::Rng;
use rand_distr::{Distribution, Exp};
use serde::Serialize;

use crate::error::{SimError, SimResult};

/// Size of every packet, in bits. Unit of both transmission time and
/// deficit consumption.
pub const PACKET_SIZE_BITS: f64 = 80.0;

/// Service rate of the output link, in bits per second.
pub const LINK_SPEED_BPS: f64 = 1_000_000.0;

/// Time to put one packet on the wire, in seconds.
#[inline]
pub fn transmission_time() -> f64 {
    PACKET_SIZE_BITS / LINK_SPEED_BPS
}

/// Lower bound on Poisson interarrival draws, in seconds.
///
/// Draws below this are rejected and resampled. This truncates the
/// exponential law, so realised Poisson arrivals are slightly sparser
/// than `mean_bit_rate` implies: the mean gap grows by exactly this floor.
#[inline]
pub fn interarrival_floor() -> f64 {
    transmission_time() / 100.0
}

// ── FlowSpec ──────────────────────────────────────────────────────────

/// Traffic class of a flow, without its parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FlowKind {
    Cbr,
    Poisson,
}

impl FlowKind {
    /// Short lowercase name, as used in scenario files.
    pub fn as_str(&self) -> &'static str {
        match self {
            FlowKind::Cbr => "cbr",
            FlowKind::Poisson => "poisson",
        }
    }
}

impl std::fmt::Display for FlowKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Traffic description of a single flow.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FlowSpec {
    /// Constant bit rate: evenly spaced arrivals at `peak_rate` bits/s.
    Cbr { peak_rate: f64 },
    /// Exponential interarrivals averaging `mean_bit_rate` bits/s.
    Poisson { mean_bit_rate: f64 },
}

impl FlowSpec {
    pub fn cbr(peak_rate: f64) -> Self {
        FlowSpec::Cbr { peak_rate }
    }

    pub fn poisson(mean_bit_rate: f64) -> Self {
        FlowSpec::Poisson { mean_bit_rate }
    }

    pub fn kind(&self) -> FlowKind {
        match self {
            FlowSpec::Cbr { .. } => FlowKind::Cbr,
            FlowSpec::Poisson { .. } => FlowKind::Poisson,
        }
    }

    /// Configured bit rate (peak for CBR, mean for Poisson).
    pub fn rate(&self) -> f64 {
        match *self {
            FlowSpec::Cbr { peak_rate } => peak_rate,
            FlowSpec::Poisson { mean_bit_rate } => mean_bit_rate,
        }
    }

    /// Offered load as a fraction of link capacity.
    pub fn theoretical_rho(&self) -> f64 {
        self.rate() / LINK_SPEED_BPS
    }

    /// Configured arrival intensity in packets per second.
    pub fn packet_rate(&self) -> f64 {
        self.rate() / PACKET_SIZE_BITS
    }

    pub fn is_cbr(&self) -> bool {
        self.kind() == FlowKind::Cbr
    }
}

impl std::fmt::Display for FlowSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FlowSpec::Cbr { peak_rate } => write!(f, "CBR({} bps)", peak_rate),
            FlowSpec::Poisson { mean_bit_rate } => write!(f, "Poisson({} bps)", mean_bit_rate),
        }
    }
}

// ── FlowModel ─────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
enum Arrivals {
    Fixed(f64),
    Exponential(Exp<f64>),
}

/// Arrival and service time generator for one flow.
#[derive(Debug, Clone)]
pub struct FlowModel {
    spec: FlowSpec,
    arrivals: Arrivals,
}

impl FlowModel {
    /// Build the generator for `spec`, rejecting rates that cannot
    /// produce a positive, finite interarrival time.
    pub fn new(spec: FlowSpec) -> SimResult<Self> {
        let rate = spec.rate();
        if !rate.is_finite() || rate <= 0.0 {
            return Err(SimError::InvalidConfiguration(format!(
                "{} rate must be positive and finite, got {}",
                spec.kind(),
                rate
            )));
        }

        let mean_gap = PACKET_SIZE_BITS / rate;
        let arrivals = match spec {
            FlowSpec::Cbr { .. } => Arrivals::Fixed(mean_gap),
            FlowSpec::Poisson { .. } => {
                let exp = Exp::new(1.0 / mean_gap).map_err(|e| {
                    SimError::InvalidConfiguration(format!("poisson rate {}: {}", rate, e))
                })?;
                Arrivals::Exponential(exp)
            }
        };

        Ok(FlowModel { spec, arrivals })
    }

    pub fn spec(&self) -> &FlowSpec {
        &self.spec
    }

    /// Time until the next packet of this flow arrives.
    pub fn generate_interarrival_time<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        match &self.arrivals {
            Arrivals::Fixed(gap) => *gap,
            Arrivals::Exponential(exp) => {
                let floor = interarrival_floor();
                loop {
                    let gap = exp.sample(rng);
                    if gap >= floor {
                        return gap;
                    }
                }
            }
        }
    }

    /// Time the link needs to transmit one packet of this flow.
    pub fn generate_service_time(&self) -> f64 {
        transmission_time()
    }
}
