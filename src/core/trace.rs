//! Traces recorded by the external simulator during a run.
use derivative::Derivative;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use std::str::FromStr;

use crate::core::metrics::nrmse;
use crate::error::SynError;

/// The quantities recorded during a simulation run.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy, Serialize, Deserialize)]
pub enum TraceKind {
    /// The simulation time (in ms).
    #[serde(rename = "t")]
    Time,
    /// The membrane voltage at the synapse (in mV).
    #[serde(rename = "v")]
    Voltage,
    /// The receptor conductance (in nS).
    #[serde(rename = "g")]
    Conductance,
    /// The receptor-mediated current (in nA).
    #[serde(rename = "i")]
    Current,
    /// The fraction of receptor channels in a conducting state.
    #[serde(rename = "osp")]
    OpenProbability,
}

impl TraceKind {
    pub const ALL: [TraceKind; 5] = [
        TraceKind::Time,
        TraceKind::Voltage,
        TraceKind::Conductance,
        TraceKind::Current,
        TraceKind::OpenProbability,
    ];

    /// The short name of the trace, as used in output files.
    pub fn name(&self) -> &'static str {
        match self {
            TraceKind::Time => "t",
            TraceKind::Voltage => "v",
            TraceKind::Conductance => "g",
            TraceKind::Current => "i",
            TraceKind::OpenProbability => "osp",
        }
    }
}

impl fmt::Display for TraceKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for TraceKind {
    type Err = SynError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TraceKind::ALL
            .into_iter()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| SynError::UnknownTrace(format!("no trace is named {}", s)))
    }
}

/// The output of a single simulation run: named traces sampled on a common time grid.
#[derive(Derivative, Clone, Serialize, Deserialize)]
#[derivative(Debug, PartialEq)]
pub struct SimulationOutput {
    /// The wall-clock duration of the run (in seconds).
    #[derivative(PartialEq = "ignore")]
    runtime: f64,
    /// The recorded traces.
    traces: BTreeMap<TraceKind, Vec<f64>>,
}

impl SimulationOutput {
    pub fn new(runtime: f64) -> Self {
        SimulationOutput {
            runtime,
            traces: BTreeMap::new(),
        }
    }

    /// Add (or replace) a trace in the output.
    pub fn with_trace(mut self, kind: TraceKind, values: Vec<f64>) -> Self {
        self.traces.insert(kind, values);
        self
    }

    pub fn runtime(&self) -> f64 {
        self.runtime
    }

    /// Returns the recorded values of a trace.
    pub fn trace(&self, kind: TraceKind) -> Result<&[f64], SynError> {
        self.traces
            .get(&kind)
            .map(|values| &values[..])
            .ok_or_else(|| SynError::MissingTrace(format!("{} was not recorded", kind)))
    }

    pub fn contains(&self, kind: TraceKind) -> bool {
        self.traces.contains_key(&kind)
    }

    /// Iterate over the recorded trace kinds.
    pub fn kinds(&self) -> impl Iterator<Item = TraceKind> + '_ {
        self.traces.keys().copied()
    }

    /// Score the trace of this output against the same trace of a reference output.
    pub fn nrmse_against(&self, reference: &SimulationOutput, kind: TraceKind) -> Result<f64, SynError> {
        nrmse(reference.trace(kind)?, self.trace(kind)?)
    }

    /// Save the output to a file.
    pub fn save_to<P: AsRef<Path>>(&self, path: P) -> Result<(), SynError> {
        let file = File::create(path).map_err(|e| SynError::IOError(e.to_string()))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, self)
            .map_err(|e| SynError::IOError(e.to_string()))?;
        writer.flush().map_err(|e| SynError::IOError(e.to_string()))
    }

    /// Load an output from a file.
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, SynError> {
        let file = File::open(path).map_err(|e| SynError::IOError(e.to_string()))?;
        let reader = BufReader::new(file);
        serde_json::from_reader(reader).map_err(|e| SynError::IOError(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use tempfile::tempdir;

    use super::*;

    fn output(scale: f64, runtime: f64) -> SimulationOutput {
        SimulationOutput::new(runtime)
            .with_trace(TraceKind::Time, vec![0.0, 0.1, 0.2, 0.3, 0.4])
            .with_trace(
                TraceKind::Conductance,
                vec![0.0, 2.0 * scale, 4.0 * scale, 2.0 * scale, 0.0],
            )
    }

    #[test]
    fn test_trace_kind_names() {
        for kind in TraceKind::ALL {
            assert_eq!(kind.name().parse::<TraceKind>(), Ok(kind));
        }
        assert_eq!(TraceKind::OpenProbability.to_string(), "osp");
        assert!(matches!(
            "open".parse::<TraceKind>(),
            Err(SynError::UnknownTrace(_))
        ));
    }

    #[test]
    fn test_trace_lookup() {
        let output = output(1.0, 0.5);
        assert_eq!(output.trace(TraceKind::Conductance).unwrap().len(), 5);
        assert!(output.contains(TraceKind::Time));
        assert!(!output.contains(TraceKind::OpenProbability));
        assert!(matches!(
            output.trace(TraceKind::OpenProbability),
            Err(SynError::MissingTrace(_))
        ));
        assert_eq!(
            output.kinds().collect::<Vec<_>>(),
            vec![TraceKind::Time, TraceKind::Conductance]
        );
    }

    #[test]
    fn test_equality_ignores_runtime() {
        assert_eq!(output(1.0, 0.5), output(1.0, 12.0));
        assert_ne!(output(1.0, 0.5), output(0.5, 0.5));
    }

    #[test]
    fn test_nrmse_against() {
        let reference = output(1.0, 0.5);
        let candidate = output(0.5, 0.2);
        assert_relative_eq!(
            candidate
                .nrmse_against(&reference, TraceKind::Conductance)
                .unwrap(),
            0.5,
            epsilon = 1e-12
        );
        assert!(matches!(
            candidate.nrmse_against(&reference, TraceKind::Current),
            Err(SynError::MissingTrace(_))
        ));
    }

    #[test]
    fn test_output_json_layout() {
        let json = serde_json::to_value(output(1.0, 0.5)).unwrap();
        assert_eq!(json["runtime"], 0.5);
        assert_eq!(json["traces"]["g"][2], 4.0);
        assert!(json["traces"].get("osp").is_none());
    }

    #[test]
    fn test_output_save_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("output.json");

        let output = output(1.0, 0.5);
        output.save_to(&path).unwrap();
        let loaded = SimulationOutput::load_from(&path).unwrap();
        assert_eq!(loaded, output);
        assert_eq!(loaded.runtime(), 0.5);
    }

    #[test]
    fn test_output_save_load_exact() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("output.json");

        let times: Vec<f64> = (0..2000).map(|k| k as f64 * 0.1).collect();
        let conductance: Vec<f64> = times
            .iter()
            .map(|t| 2.146142e-4 * ((-t / 4.4).exp() - (-t / 0.9).exp()))
            .collect();
        let output = SimulationOutput::new(1.0 / 3.0)
            .with_trace(TraceKind::Time, times)
            .with_trace(TraceKind::Conductance, conductance.clone());
        output.save_to(&path).unwrap();

        let loaded = SimulationOutput::load_from(&path).unwrap();
        for (x, y) in loaded
            .trace(TraceKind::Conductance)
            .unwrap()
            .iter()
            .zip(conductance.iter())
        {
            assert_eq!(x.to_bits(), y.to_bits());
        }
        assert_eq!(loaded.runtime(), 1.0 / 3.0);
        assert_eq!(loaded, output);
    }
}
