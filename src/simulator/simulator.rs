//! This module contains the run request and the simulator interface.
use serde::{Deserialize, Serialize};

use crate::core::config::{CellSetup, SimulationConfig};
use crate::core::spike_train::SpikeTrain;
use crate::core::synapse::{MechanismRequest, Receptor, Recording, StimulusTarget, SynapseModel};
use crate::core::trace::SimulationOutput;
use crate::error::SynError;

/// Everything the simulator needs to run one synapse model under stimulation.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct RunRequest {
    setup: CellSetup,
    sim_time: f64,
    receptor: Receptor,
    model: SynapseModel,
    mechanism: MechanismRequest,
    recordings: Vec<Recording>,
    spike_train: SpikeTrain,
}

impl RunRequest {
    /// Create a run request for the specified model.
    /// The stimulation is generated from the configuration.
    /// The function returns an error for invalid stimulation parameters or if the model does not
    /// belong to the receptor family.
    pub fn build(
        config: &SimulationConfig,
        setup: CellSetup,
        receptor: Receptor,
        model: SynapseModel,
    ) -> Result<Self, SynError> {
        if model.receptor() != receptor {
            return Err(SynError::IncompatibleModel(format!(
                "{} is not a {} model",
                model, receptor
            )));
        }

        if !(config.sim_time.is_finite() && setup.dt.is_finite() && setup.dt > 0.0) {
            return Err(SynError::InvalidParameter(format!(
                "the simulated time must be finite and the time step positive, got {} and {}",
                config.sim_time, setup.dt
            )));
        }

        let spike_train = config.generator()?.generate();

        Ok(RunRequest {
            setup,
            sim_time: config.sim_time,
            receptor,
            mechanism: model.mechanism_request(),
            recordings: model.recordings(),
            model,
            spike_train,
        })
    }

    pub fn setup(&self) -> &CellSetup {
        &self.setup
    }

    /// Returns the simulated time (in ms).
    pub fn sim_time(&self) -> f64 {
        self.sim_time
    }

    pub fn receptor(&self) -> Receptor {
        self.receptor
    }

    pub fn model(&self) -> &SynapseModel {
        &self.model
    }

    pub fn mechanism(&self) -> &MechanismRequest {
        &self.mechanism
    }

    pub fn recordings(&self) -> &[Recording] {
        &self.recordings[..]
    }

    /// Returns the stimulation times (in ms).
    pub fn spike_train(&self) -> &SpikeTrain {
        &self.spike_train
    }

    pub fn stimulus_target(&self) -> StimulusTarget {
        self.mechanism.stimulus_target()
    }

    /// Check that an output holds every requested recording and that all of them have the same
    /// number of samples.
    pub fn check_output(&self, output: &SimulationOutput) -> Result<(), SynError> {
        let mut num_samples: Option<usize> = None;
        for recording in self.recordings.iter() {
            let values = output.trace(recording.kind).map_err(|_| {
                SynError::MissingTrace(format!(
                    "{} (read from {}) is missing in the output of {}",
                    recording.kind, recording.field, self.model
                ))
            })?;
            match num_samples {
                Some(n) if n != values.len() => {
                    return Err(SynError::IncompatibleTraces(format!(
                        "{} has {} samples instead of {} in the output of {}",
                        recording.kind,
                        values.len(),
                        n,
                        self.model
                    )));
                }
                _ => num_samples = Some(values.len()),
            }
        }
        Ok(())
    }
}

/// An engine able to run a synapse model under stimulation and to return the recorded traces.
pub trait Simulator {
    /// Run the request and return the recorded traces.
    fn run(&mut self, request: &RunRequest) -> Result<SimulationOutput, SynError>;
}
