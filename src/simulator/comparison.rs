//! Comparison of candidate synapse models against the reference model of their receptor family.
//!
//! Every model of a family is run under the same stimulation. The trace scored for the family
//! ([`Receptor::scored_trace`]) of each candidate is compared to the one of the reference model
//! with the normalized root-mean-square error.
use log;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use crate::core::config::{CellSetup, SimulationConfig};
use crate::core::synapse::{Receptor, SynapseModel};
use crate::core::trace::{SimulationOutput, TraceKind};
use crate::error::SynError;
use crate::utils::round_to;

use super::simulator::{RunRequest, Simulator};

/// The number of decimals kept in the reported scores.
pub const SCORE_DECIMALS: i32 = 4;

/// The score of a candidate model.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct ModelScore {
    pub model: String,
    pub nrmse: f64,
    /// The wall-clock duration of the candidate run (in seconds).
    pub runtime: f64,
}

/// The scores of the candidate models of a receptor family.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct ReceptorReport {
    pub receptor: Receptor,
    /// The reference model.
    pub reference: String,
    /// The wall-clock duration of the reference run (in seconds).
    pub reference_runtime: f64,
    /// The scored trace.
    pub trace: TraceKind,
    pub scores: Vec<ModelScore>,
}

impl ReceptorReport {
    /// Returns the score of a candidate model, if it was scored.
    pub fn score(&self, model: &str) -> Option<f64> {
        self.scores
            .iter()
            .find(|score| score.model == model)
            .map(|score| score.nrmse)
    }
}

/// The outcome of a comparison over one or more receptor families.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct ComparisonReport {
    pub config: SimulationConfig,
    pub receptors: Vec<ReceptorReport>,
}

impl ComparisonReport {
    pub fn receptor(&self, receptor: Receptor) -> Option<&ReceptorReport> {
        self.receptors
            .iter()
            .find(|report| report.receptor == receptor)
    }

    /// Save the report to a file.
    pub fn save_to<P: AsRef<Path>>(&self, path: P) -> Result<(), SynError> {
        let file = File::create(path).map_err(|e| SynError::IOError(e.to_string()))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, self)
            .map_err(|e| SynError::IOError(e.to_string()))?;
        writer.flush().map_err(|e| SynError::IOError(e.to_string()))
    }

    /// Load a report from a file.
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, SynError> {
        let file = File::open(path).map_err(|e| SynError::IOError(e.to_string()))?;
        let reader = BufReader::new(file);
        serde_json::from_reader(reader).map_err(|e| SynError::IOError(e.to_string()))
    }
}

/// Drives the runs of a comparison and scores the candidate models.
#[derive(Debug, PartialEq, Clone)]
pub struct Comparison {
    config: SimulationConfig,
    setup: CellSetup,
}

impl Comparison {
    /// Create a comparison with the default cell setup.
    /// The function returns an error for invalid stimulation parameters.
    pub fn build(config: SimulationConfig) -> Result<Self, SynError> {
        config.stimulus_params()?;
        Ok(Comparison {
            config,
            setup: CellSetup::default(),
        })
    }

    /// Replace the cell setup of the comparison.
    pub fn with_setup(mut self, setup: CellSetup) -> Self {
        self.setup = setup;
        self
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn setup(&self) -> &CellSetup {
        &self.setup
    }

    /// Run a single model and check that its output holds every requested trace.
    pub fn run_model<S: Simulator + ?Sized>(
        &self,
        simulator: &mut S,
        receptor: Receptor,
        model: SynapseModel,
    ) -> Result<SimulationOutput, SynError> {
        let request = RunRequest::build(&self.config, self.setup.clone(), receptor, model)?;
        log::info!(
            "Simulating {} with {} ({} stimulation entries)",
            receptor,
            request.model(),
            request.spike_train().len()
        );

        let output = simulator.run(&request)?;
        request.check_output(&output)?;
        log::info!("{} run time: {:.3} s", request.model(), output.runtime());
        Ok(output)
    }

    /// Run the reference and the candidate models of a receptor family and score the candidates.
    pub fn compare_receptor<S: Simulator + ?Sized>(
        &self,
        simulator: &mut S,
        receptor: Receptor,
    ) -> Result<ReceptorReport, SynError> {
        let reference_model = receptor.reference_model();
        let trace = receptor.scored_trace();

        let reference = self.run_model(simulator, receptor, reference_model.clone())?;

        let scores = receptor
            .candidate_models()
            .into_iter()
            .map(|model| -> Result<ModelScore, SynError> {
                let name = model.name().to_string();
                let output = self.run_model(&mut *simulator, receptor, model)?;
                let nrmse = output.nrmse_against(&reference, trace)?;
                log::info!("{} NRMSE on {}: {:.4}", name, trace, nrmse);
                Ok(ModelScore {
                    model: name,
                    nrmse: round_to(nrmse, SCORE_DECIMALS),
                    runtime: output.runtime(),
                })
            })
            .collect::<Result<Vec<ModelScore>, SynError>>()?;

        Ok(ReceptorReport {
            receptor,
            reference: reference_model.name().to_string(),
            reference_runtime: reference.runtime(),
            trace,
            scores,
        })
    }

    /// Compare the models of every requested receptor family.
    pub fn compare<S: Simulator + ?Sized>(
        &self,
        simulator: &mut S,
        receptors: &[Receptor],
    ) -> Result<ComparisonReport, SynError> {
        let receptors = receptors
            .iter()
            .map(|receptor| self.compare_receptor(&mut *simulator, *receptor))
            .collect::<Result<Vec<ReceptorReport>, SynError>>()?;

        Ok(ComparisonReport {
            config: self.config.clone(),
            receptors,
        })
    }
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;

    /// Returns the same conductance and open-state probability for every model, up to a per-model scale.
    struct ScaledSimulator {
        runs: Vec<String>,
    }

    impl ScaledSimulator {
        fn scale(model: &SynapseModel) -> f64 {
            match model.name() {
                "LUTsyn_AMPA" | "LUTsyn_NMDA" => 0.9,
                "E2_AMPA" | "E3_NMDA" => 0.5,
                _ => 1.0,
            }
        }
    }

    impl Simulator for ScaledSimulator {
        fn run(&mut self, request: &RunRequest) -> Result<SimulationOutput, SynError> {
            self.runs.push(request.model().name().to_string());
            let scale = Self::scale(request.model());
            let shape = vec![0.0, 2.0, 4.0, 2.0, 0.0];
            let scaled: Vec<f64> = shape.iter().map(|x| scale * x).collect();

            let mut output = SimulationOutput::new(0.01)
                .with_trace(TraceKind::Time, vec![0.0, 0.1, 0.2, 0.3, 0.4])
                .with_trace(TraceKind::Voltage, vec![-73.0; 5])
                .with_trace(TraceKind::Conductance, scaled.clone())
                .with_trace(TraceKind::Current, scaled.clone());
            if request.receptor() == Receptor::Nmda {
                output = output.with_trace(TraceKind::OpenProbability, scaled);
            }
            Ok(output)
        }
    }

    #[test]
    fn test_comparison_build() {
        assert!(Comparison::build(SimulationConfig::default()).is_ok());
        assert!(matches!(
            Comparison::build(SimulationConfig {
                tau_ahp: 0.0,
                ..Default::default()
            }),
            Err(SynError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_compare_receptor() {
        let comparison = Comparison::build(SimulationConfig {
            sim_time: 200.0,
            ..Default::default()
        })
        .unwrap();
        let mut simulator = ScaledSimulator { runs: vec![] };

        let report = comparison
            .compare_receptor(&mut simulator, Receptor::Nmda)
            .unwrap();
        assert_eq!(simulator.runs, vec!["Kinetic_NMDA", "LUTsyn_NMDA", "E3_NMDA"]);
        assert_eq!(report.reference, "Kinetic_NMDA");
        assert_eq!(report.trace, TraceKind::OpenProbability);
        assert_eq!(report.score("LUTsyn_NMDA"), Some(0.1));
        assert_eq!(report.score("E3_NMDA"), Some(0.5));
        assert_eq!(report.score("Kinetic_NMDA"), None);
    }

    #[test]
    fn test_compare_save_load() {
        let comparison = Comparison::build(SimulationConfig {
            sim_time: 200.0,
            ..Default::default()
        })
        .unwrap();
        let mut simulator = ScaledSimulator { runs: vec![] };

        let report = comparison
            .compare(&mut simulator, &Receptor::ALL)
            .unwrap();
        assert_eq!(simulator.runs.len(), 6);
        assert_eq!(
            report.receptor(Receptor::Ampa).unwrap().trace,
            TraceKind::Conductance
        );

        let dir = tempdir().unwrap();
        let path = dir.path().join("report.json");
        report.save_to(&path).unwrap();
        assert_eq!(ComparisonReport::load_from(&path).unwrap(), report);
    }

    #[test]
    fn test_missing_scored_trace() {
        struct NoOpenProbability;

        impl Simulator for NoOpenProbability {
            fn run(&mut self, _request: &RunRequest) -> Result<SimulationOutput, SynError> {
                Ok(SimulationOutput::new(0.0)
                    .with_trace(TraceKind::Time, vec![0.0])
                    .with_trace(TraceKind::Voltage, vec![-73.0])
                    .with_trace(TraceKind::Conductance, vec![0.0])
                    .with_trace(TraceKind::Current, vec![0.0]))
            }
        }

        let comparison = Comparison::build(SimulationConfig::default()).unwrap();
        assert!(comparison
            .compare_receptor(&mut NoOpenProbability, Receptor::Ampa)
            .is_err());
        assert!(matches!(
            comparison.compare_receptor(&mut NoOpenProbability, Receptor::Nmda),
            Err(SynError::MissingTrace(_))
        ));
    }
}
