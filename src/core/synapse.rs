//! Receptor families and synapse models under comparison.
//!
//! Each synapse model carries its own parameter record. The simulator-side mechanism that
//! realizes a model is described by a [`MechanismRequest`], built by
//! [`SynapseModel::mechanism_request`].
//!
//! # Examples
//!
//! ```rust
//! use rusty_syn::core::synapse::{Receptor, StimulusTarget, SynapseModel};
//!
//! let model: SynapseModel = "Kinetic_NMDA".parse().unwrap();
//! assert_eq!(model.receptor(), Receptor::Nmda);
//!
//! // Kinetic models are stimulated through their neurotransmitter diffusion mechanism
//! let request = model.mechanism_request();
//! assert_eq!(request.mechanism, "NMDA_v6_3_opt");
//! assert_eq!(request.stimulus_target(), StimulusTarget::Transmitter);
//! ```
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::core::trace::TraceKind;
use crate::error::SynError;

/// The receptor family simulated at the synapse.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy, Serialize, Deserialize)]
pub enum Receptor {
    #[serde(rename = "AMPA")]
    Ampa,
    #[serde(rename = "NMDA")]
    Nmda,
}

impl Receptor {
    pub const ALL: [Receptor; 2] = [Receptor::Ampa, Receptor::Nmda];

    pub fn name(&self) -> &'static str {
        match self {
            Receptor::Ampa => "AMPA",
            Receptor::Nmda => "NMDA",
        }
    }

    /// The model every other model of the family is scored against.
    pub fn reference_model(&self) -> SynapseModel {
        match self {
            Receptor::Ampa => SynapseModel::KineticAmpa(KineticParams::ampa()),
            Receptor::Nmda => SynapseModel::KineticNmda(KineticParams::nmda()),
        }
    }

    /// The models scored against the reference model.
    pub fn candidate_models(&self) -> Vec<SynapseModel> {
        match self {
            Receptor::Ampa => vec![
                SynapseModel::LutsynAmpa(LutsynParams::ampa()),
                SynapseModel::E2Ampa(DoubleExpParams::default()),
            ],
            Receptor::Nmda => vec![
                SynapseModel::LutsynNmda(LutsynParams::nmda()),
                SynapseModel::E3Nmda(TripleExpParams::default()),
            ],
        }
    }

    /// The trace on which the models of the family are compared.
    pub fn scored_trace(&self) -> TraceKind {
        match self {
            Receptor::Ampa => TraceKind::Conductance,
            Receptor::Nmda => TraceKind::OpenProbability,
        }
    }
}

impl fmt::Display for Receptor {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Receptor {
    type Err = SynError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "AMPA" => Ok(Receptor::Ampa),
            "NMDA" => Ok(Receptor::Nmda),
            _ => Err(SynError::UnknownReceptor(format!(
                "{} (expected AMPA or NMDA)",
                s
            ))),
        }
    }
}

/// Parameters of a double exponential synapse.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct DoubleExpParams {
    /// Rise time constant (in ms).
    pub tau1: f64,
    /// Decay time constant (in ms).
    pub tau2: f64,
    /// The connection weight scaling the response.
    pub weight: f64,
}

impl Default for DoubleExpParams {
    fn default() -> Self {
        DoubleExpParams {
            tau1: 0.9,
            tau2: 4.4,
            weight: 2.146142e-04,
        }
    }
}

/// Parameters of a triple exponential synapse.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct TripleExpParams {
    pub tau1: f64,
    pub tau2: f64,
    pub tau3: f64,
    /// Weight of the second decay, the third decay has weight `1 - wtau2`.
    pub wtau2: f64,
    pub factor: f64,
    pub scalar: f64,
}

impl Default for TripleExpParams {
    fn default() -> Self {
        TripleExpParams {
            tau1: 20.3877436154,
            tau2: 26.6830234133,
            tau3: 158.729359569,
            wtau2: 0.963468100127,
            factor: 8.670516899305603,
            scalar: 2.4594359743378894e-05,
        }
    }
}

/// The kernel of one nonlinear order of a lookup-table synapse.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct LutsynOrder {
    pub tc1: f64,
    pub tc2: f64,
    pub tc3: f64,
    pub factor: f64,
}

impl LutsynOrder {
    fn new(tc1: f64, tc2: f64, tc3: f64, factor: f64) -> Self {
        LutsynOrder {
            tc1,
            tc2,
            tc3,
            factor,
        }
    }
}

/// Parameters of a lookup-table synapse.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct LutsynParams {
    /// The gain lookup table linked to the mechanism.
    pub lookup_table: PathBuf,
    pub basis_gain: f64,
    pub scalar: f64,
    /// The time granularity of the lookup table (in ms), when it is not the default one.
    pub gran: Option<f64>,
    pub tc1: f64,
    pub tc2: f64,
    pub tc3: f64,
    /// Weight of the second kernel, the third kernel has weight `1 - wtc2`.
    pub wtc2: f64,
    pub factor: f64,
    /// The per-order kernels, first order first.
    pub orders: Vec<LutsynOrder>,
}

impl LutsynParams {
    /// The 4th order AMPA conductance table.
    pub fn ampa() -> Self {
        LutsynParams {
            lookup_table: PathBuf::from(
                "LUT_AMPA_kinetic_g_4th_M300ms_d1ms_NT0.1_DIFF_v3/LUT_AMPA_kinetic_g_4th_M300ms_d1ms_NT0.1_DIFF_v3.npy",
            ),
            basis_gain: 0.00021258154267359922,
            scalar: 1.0,
            gran: None,
            tc1: 1.05,
            tc2: 3.8,
            tc3: 16.0,
            wtc2: 0.963468100127,
            factor: 2.2071045693250277,
            orders: vec![
                LutsynOrder::new(1.05, 3.8, 16.0, 2.2071045693250277),
                LutsynOrder::new(1.05, 3.95, 19.0, 2.150761928070988),
                LutsynOrder::new(1.1, 3.85, 18.0, 2.2546969539333945),
                LutsynOrder::new(1.05, 4.2, 19.5, 2.0721351225715905),
            ],
        }
    }

    /// The 5th order NMDA open-state probability table.
    pub fn nmda() -> Self {
        LutsynParams {
            lookup_table: PathBuf::from(
                "LUT_NMDA_kinetic_OSP_5th_M1000ms_d5ms_NT0.1_DIFF_v3/LUT_NMDA_kinetic_OSP_5th_M1000ms_d5ms_NT0.1_DIFF_v3.npy",
            ),
            basis_gain: 2.4594359743378894e-05,
            scalar: 1.0,
            gran: Some(5.0),
            tc1: 18.0,
            tc2: 23.0,
            tc3: 148.0,
            wtc2: 0.963468100127,
            factor: 9.336247512713125,
            orders: vec![
                LutsynOrder::new(18.0, 23.0, 148.0, 9.336247512713125),
                LutsynOrder::new(17.0, 20.0, 140.0, 12.845340591656415),
                LutsynOrder::new(18.0, 21.0, 144.0, 13.378037918262585),
                LutsynOrder::new(18.0, 22.0, 168.0, 10.878447743899189),
                LutsynOrder::new(18.0, 21.0, 140.0, 13.402875584141828),
            ],
        }
    }
}

/// Parameters of a kinetic synapse driven by a neurotransmitter diffusion mechanism.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct KineticParams {
    /// The diffusion radius (in µm).
    pub radius: f64,
    /// The diffusion rate.
    pub k: f64,
    /// The number of receptors at the synapse.
    pub num_receptors: f64,
}

impl KineticParams {
    pub fn ampa() -> Self {
        KineticParams {
            radius: 0.060,
            k: 1.32,
            num_receptors: 5.0,
        }
    }

    pub fn nmda() -> Self {
        KineticParams {
            radius: 0.060,
            k: 1.32,
            num_receptors: 1.235,
        }
    }
}

/// A synapse model, with its parameters.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
#[serde(tag = "model", content = "params")]
pub enum SynapseModel {
    #[serde(rename = "E2_AMPA")]
    E2Ampa(DoubleExpParams),
    #[serde(rename = "LUTsyn_AMPA")]
    LutsynAmpa(LutsynParams),
    #[serde(rename = "Kinetic_AMPA")]
    KineticAmpa(KineticParams),
    #[serde(rename = "E3_NMDA")]
    E3Nmda(TripleExpParams),
    #[serde(rename = "LUTsyn_NMDA")]
    LutsynNmda(LutsynParams),
    #[serde(rename = "Kinetic_NMDA")]
    KineticNmda(KineticParams),
}

/// Where the stimulation events are delivered.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize, Deserialize)]
pub enum StimulusTarget {
    /// The synapse mechanism itself.
    Synapse,
    /// The neurotransmitter mechanism feeding the synapse.
    Transmitter,
}

/// A neurotransmitter diffusion mechanism placed in series with a kinetic synapse.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct TransmitterRequest {
    pub mechanism: String,
    pub parameters: Vec<(String, f64)>,
    /// The synapse field linked to the transmitter concentration.
    pub pointer: String,
}

/// What the simulator has to instantiate to realize a synapse model.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct MechanismRequest {
    /// The name of the synapse mechanism.
    pub mechanism: String,
    /// The mechanism parameters, in assignment order.
    pub parameters: Vec<(String, f64)>,
    /// The lookup table linked to the `gain_array` pointer of the mechanism, if any.
    pub lookup_table: Option<PathBuf>,
    /// The transmitter mechanism in series with the synapse, if any.
    pub transmitter: Option<TransmitterRequest>,
    /// The weight of the stimulation connection.
    pub weight: f64,
}

impl MechanismRequest {
    /// Returns the value assigned to a parameter of the synapse mechanism.
    pub fn parameter(&self, name: &str) -> Option<f64> {
        self.parameters
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| *value)
    }

    pub fn stimulus_target(&self) -> StimulusTarget {
        match self.transmitter {
            Some(_) => StimulusTarget::Transmitter,
            None => StimulusTarget::Synapse,
        }
    }
}

/// A trace to record, with the mechanism field it is read from.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct Recording {
    pub kind: TraceKind,
    pub field: String,
}

impl Recording {
    fn new(kind: TraceKind, field: &str) -> Self {
        Recording {
            kind,
            field: field.to_string(),
        }
    }
}

fn named(parameters: &[(&str, f64)]) -> Vec<(String, f64)> {
    parameters
        .iter()
        .map(|(name, value)| (name.to_string(), *value))
        .collect()
}

fn lutsyn_request(mechanism: &str, params: &LutsynParams) -> MechanismRequest {
    let mut parameters = named(&[("basis_gain", params.basis_gain), ("scalar", params.scalar)]);
    if let Some(gran) = params.gran {
        parameters.push(("gran".to_string(), gran));
    }
    parameters.extend(named(&[
        ("tc1", params.tc1),
        ("tc2", params.tc2),
        ("tc3", params.tc3),
        ("wtc2", params.wtc2),
        ("wtc3", 1.0 - params.wtc2),
        ("factor", params.factor),
    ]));
    for (n, order) in params.orders.iter().enumerate() {
        parameters.extend([
            (format!("o{}_tc1", n + 1), order.tc1),
            (format!("o{}_tc2", n + 1), order.tc2),
            (format!("o{}_tc3", n + 1), order.tc3),
            (format!("factor{}", n + 1), order.factor),
        ]);
    }

    MechanismRequest {
        mechanism: mechanism.to_string(),
        parameters,
        lookup_table: Some(params.lookup_table.clone()),
        transmitter: None,
        weight: 1.0,
    }
}

fn kinetic_request(mechanism: &str, receptors_field: &str, params: &KineticParams) -> MechanismRequest {
    MechanismRequest {
        mechanism: mechanism.to_string(),
        parameters: named(&[(receptors_field, params.num_receptors)]),
        lookup_table: None,
        transmitter: Some(TransmitterRequest {
            mechanism: "NTDiffusion".to_string(),
            parameters: named(&[("Radius", params.radius), ("k", params.k)]),
            pointer: "Glu".to_string(),
        }),
        weight: 1.0,
    }
}

impl SynapseModel {
    pub const NAMES: [&'static str; 6] = [
        "E2_AMPA",
        "LUTsyn_AMPA",
        "Kinetic_AMPA",
        "E3_NMDA",
        "LUTsyn_NMDA",
        "Kinetic_NMDA",
    ];

    /// The identifier of the model.
    pub fn name(&self) -> &'static str {
        match self {
            SynapseModel::E2Ampa(_) => "E2_AMPA",
            SynapseModel::LutsynAmpa(_) => "LUTsyn_AMPA",
            SynapseModel::KineticAmpa(_) => "Kinetic_AMPA",
            SynapseModel::E3Nmda(_) => "E3_NMDA",
            SynapseModel::LutsynNmda(_) => "LUTsyn_NMDA",
            SynapseModel::KineticNmda(_) => "Kinetic_NMDA",
        }
    }

    pub fn receptor(&self) -> Receptor {
        match self {
            SynapseModel::E2Ampa(_) | SynapseModel::LutsynAmpa(_) | SynapseModel::KineticAmpa(_) => {
                Receptor::Ampa
            }
            SynapseModel::E3Nmda(_) | SynapseModel::LutsynNmda(_) | SynapseModel::KineticNmda(_) => {
                Receptor::Nmda
            }
        }
    }

    /// Returns the description of the mechanism realizing the model.
    pub fn mechanism_request(&self) -> MechanismRequest {
        match self {
            SynapseModel::E2Ampa(params) => MechanismRequest {
                mechanism: "Exp2Syn_v2".to_string(),
                parameters: named(&[("tau1", params.tau1), ("tau2", params.tau2)]),
                lookup_table: None,
                transmitter: None,
                weight: params.weight,
            },
            SynapseModel::LutsynAmpa(params) => lutsyn_request("LUTsyn_AMPA_4th_E3_dtc", params),
            SynapseModel::KineticAmpa(params) => kinetic_request("AMPA16v8_noNC", "nbAMPAR", params),
            SynapseModel::E3Nmda(params) => MechanismRequest {
                mechanism: "E3_NMDA_v2".to_string(),
                parameters: named(&[
                    ("tau1", params.tau1),
                    ("tau2", params.tau2),
                    ("tau3", params.tau3),
                    ("wtau2", params.wtau2),
                    ("wtau3", 1.0 - params.wtau2),
                    ("factor", params.factor),
                    ("scalar", params.scalar),
                ]),
                lookup_table: None,
                transmitter: None,
                weight: 1.0,
            },
            SynapseModel::LutsynNmda(params) => lutsyn_request("LUTsyn_NMDA_5th_E3_dtc", params),
            SynapseModel::KineticNmda(params) => kinetic_request("NMDA_v6_3_opt", "nbNMDAR", params),
        }
    }

    /// The traces to record for the model.
    /// The open-state probability is only recorded for NMDA models.
    pub fn recordings(&self) -> Vec<Recording> {
        let mut recordings = vec![
            Recording::new(TraceKind::Time, "t"),
            Recording::new(TraceKind::Voltage, "v1"),
            Recording::new(TraceKind::Conductance, "g"),
            Recording::new(TraceKind::Current, "i"),
        ];
        match self {
            SynapseModel::KineticNmda(_) => {
                recordings.push(Recording::new(TraceKind::OpenProbability, "open_total"))
            }
            SynapseModel::E3Nmda(_) | SynapseModel::LutsynNmda(_) => {
                recordings.push(Recording::new(TraceKind::OpenProbability, "open"))
            }
            _ => {}
        }
        recordings
    }
}

impl fmt::Display for SynapseModel {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for SynapseModel {
    type Err = SynError;

    /// Parse a model identifier into the model with its default parameters.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "E2_AMPA" => Ok(SynapseModel::E2Ampa(DoubleExpParams::default())),
            "LUTsyn_AMPA" => Ok(SynapseModel::LutsynAmpa(LutsynParams::ampa())),
            "Kinetic_AMPA" => Ok(SynapseModel::KineticAmpa(KineticParams::ampa())),
            "E3_NMDA" => Ok(SynapseModel::E3Nmda(TripleExpParams::default())),
            "LUTsyn_NMDA" => Ok(SynapseModel::LutsynNmda(LutsynParams::nmda())),
            "Kinetic_NMDA" => Ok(SynapseModel::KineticNmda(KineticParams::nmda())),
            _ => Err(SynError::UnknownModel(format!(
                "{} (expected one of {})",
                s,
                SynapseModel::NAMES.join(", ")
            ))),
        }
    }
}
