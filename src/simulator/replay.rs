//! A simulator replaying outputs recorded beforehand.
//!
//! Outputs are stored as one JSON file per synapse model, named after the model identifier,
//! e.g., `LUTsyn_AMPA.json`.
use log;
use std::path::{Path, PathBuf};

use crate::core::synapse::SynapseModel;
use crate::core::trace::SimulationOutput;
use crate::error::SynError;

use super::simulator::{RunRequest, Simulator};

/// Replays the outputs stored in a directory.
#[derive(Debug, PartialEq, Clone)]
pub struct ReplaySimulator {
    dir: PathBuf,
}

impl ReplaySimulator {
    /// Create a replay simulator reading from an existing directory.
    pub fn build<P: AsRef<Path>>(dir: P) -> Result<Self, SynError> {
        let dir = dir.as_ref();
        if !dir.is_dir() {
            return Err(SynError::IOError(format!(
                "{} is not a directory",
                dir.display()
            )));
        }
        Ok(ReplaySimulator {
            dir: dir.to_path_buf(),
        })
    }

    /// The file holding the output of a model.
    pub fn path_for(&self, model: &SynapseModel) -> PathBuf {
        self.dir.join(format!("{}.json", model.name()))
    }

    /// Store the output of a model, to be replayed later.
    pub fn record(&self, model: &SynapseModel, output: &SimulationOutput) -> Result<(), SynError> {
        output.save_to(self.path_for(model))
    }
}

impl Simulator for ReplaySimulator {
    fn run(&mut self, request: &RunRequest) -> Result<SimulationOutput, SynError> {
        let path = self.path_for(request.model());
        log::debug!("Replaying {} from {}", request.model(), path.display());
        SimulationOutput::load_from(&path)
    }
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;
    use crate::core::config::{CellSetup, SimulationConfig};
    use crate::core::synapse::Receptor;
    use crate::core::trace::TraceKind;

    #[test]
    fn test_replay_build() {
        let dir = tempdir().unwrap();
        assert!(ReplaySimulator::build(dir.path()).is_ok());
        assert!(matches!(
            ReplaySimulator::build(dir.path().join("missing")),
            Err(SynError::IOError(_))
        ));
    }

    #[test]
    fn test_replay_run() {
        let dir = tempdir().unwrap();
        let mut simulator = ReplaySimulator::build(dir.path()).unwrap();

        let model: SynapseModel = "E2_AMPA".parse().unwrap();
        assert_eq!(simulator.path_for(&model), dir.path().join("E2_AMPA.json"));

        let request = RunRequest::build(
            &SimulationConfig::default(),
            CellSetup::default(),
            Receptor::Ampa,
            model.clone(),
        )
        .unwrap();

        // Nothing recorded yet
        assert!(matches!(simulator.run(&request), Err(SynError::IOError(_))));

        let output = SimulationOutput::new(1.5)
            .with_trace(TraceKind::Time, vec![0.0, 0.1, 0.2])
            .with_trace(TraceKind::Conductance, vec![0.0, 1e-3, 2e-3]);
        simulator.record(&model, &output).unwrap();
        assert_eq!(simulator.run(&request).unwrap(), output);
    }
}
