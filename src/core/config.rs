//! Simulation configuration: stimulation parameters and the test cell setup.
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use crate::core::spike_train::{SpikeTrainGenerator, StimulusParams};
use crate::core::DEFAULT_SEED;
use crate::error::SynError;

/// The stimulation parameters of a comparison run.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// The simulated time (in ms).
    pub sim_time: f64,
    /// The mean input firing rate (in Hz).
    pub freq: f64,
    /// The recovery time constant of the input process (in seconds).
    #[serde(rename = "tau_AHP")]
    pub tau_ahp: f64,
    /// The seed of the input process.
    #[serde(default)]
    pub seed: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        SimulationConfig {
            sim_time: 20000.0,
            freq: 10.0,
            tau_ahp: 0.035,
            seed: DEFAULT_SEED,
        }
    }
}

impl SimulationConfig {
    /// The stimulation duration (in seconds).
    pub fn tstop(&self) -> f64 {
        self.sim_time / 1e3
    }

    /// Returns the checked stimulation parameters.
    pub fn stimulus_params(&self) -> Result<StimulusParams, SynError> {
        StimulusParams::build(self.freq, self.tau_ahp, self.tstop())
    }

    /// Returns the spike train generator for this configuration.
    pub fn generator(&self) -> Result<SpikeTrainGenerator, SynError> {
        Ok(SpikeTrainGenerator::new(self.stimulus_params()?).with_seed(self.seed))
    }

    /// Save the configuration to a file.
    pub fn save_to<P: AsRef<Path>>(&self, path: P) -> Result<(), SynError> {
        let file = File::create(path).map_err(|e| SynError::IOError(e.to_string()))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, self)
            .map_err(|e| SynError::IOError(e.to_string()))?;
        writer.flush().map_err(|e| SynError::IOError(e.to_string()))
    }

    /// Load a configuration from a file.
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, SynError> {
        let file = File::open(path).map_err(|e| SynError::IOError(e.to_string()))?;
        let reader = BufReader::new(file);
        serde_json::from_reader(reader).map_err(|e| SynError::IOError(e.to_string()))
    }
}

/// The ball-and-stick test cell hosting the synapse, and the integration settings of the run.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct CellSetup {
    /// The integration time step (in ms).
    pub dt: f64,
    /// The initial membrane voltage (in mV).
    pub v_init: f64,
    /// The temperature (in °C).
    pub celsius: f64,
    /// The soma diameter (in µm).
    pub soma_diam: f64,
    /// The dendrite diameter (in µm).
    pub dendrite_diam: f64,
    /// The dendrite length (in µm).
    pub dendrite_length: f64,
    /// The normalized position of the synapse along the dendrite.
    pub synapse_site: f64,
    /// The delay of the stimulation connection (in ms).
    pub delay: f64,
}

impl Default for CellSetup {
    fn default() -> Self {
        CellSetup {
            dt: 0.1,
            v_init: -73.0,
            celsius: 35.0,
            soma_diam: 15.0,
            dendrite_diam: 5.0,
            dendrite_length: 3000.0,
            synapse_site: 0.5,
            delay: 1.0,
        }
    }
}

impl CellSetup {
    pub fn steps_per_ms(&self) -> f64 {
        1.0 / self.dt
    }

    /// The number of samples of each trace over a run of `sim_time` ms, initial state included.
    pub fn num_samples(&self, sim_time: f64) -> usize {
        (sim_time / self.dt).round() as usize + 1
    }
}
