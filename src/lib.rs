//! This crate provides the simulator-independent tools to compare synapse models in Rust:
//! stimulus generation for the simulation runs and fidelity scoring of their outputs.
//!
//! # Generating Stimulations
//!
//! ```rust
//! use rusty_syn::core::config::SimulationConfig;
//!
//! // 20 seconds of stimulation at 10 Hz, with a 35 ms recovery time constant
//! let config = SimulationConfig::default();
//! let spike_train = config.generator().unwrap().generate();
//!
//! // Stimulation times are in milliseconds
//! assert!(spike_train.times().iter().all(|t| *t < 20000.0));
//! assert!(spike_train.times().windows(2).all(|w| w[0] < w[1]));
//! ```
//!
//! # Describing Synapse Models
//!
//! ```rust
//! use rusty_syn::core::synapse::{Receptor, SynapseModel};
//!
//! let model: SynapseModel = "LUTsyn_AMPA".parse().unwrap();
//! assert_eq!(model.receptor(), Receptor::Ampa);
//! assert_eq!(Receptor::Ampa.reference_model().name(), "Kinetic_AMPA");
//!
//! let request = model.mechanism_request();
//! assert_eq!(request.parameter("tc3"), Some(16.0));
//! ```
//!
//! # Scoring Simulations
//!
//! ```rust
//! use approx::assert_relative_eq;
//! use rusty_syn::core::trace::{SimulationOutput, TraceKind};
//!
//! let reference = SimulationOutput::new(12.3).with_trace(TraceKind::Conductance, vec![0.0, 2.0, 4.0, 2.0, 0.0]);
//! let candidate = SimulationOutput::new(0.4).with_trace(TraceKind::Conductance, vec![0.0, 1.0, 2.0, 1.0, 0.0]);
//!
//! let score = candidate.nrmse_against(&reference, TraceKind::Conductance).unwrap();
//! assert_relative_eq!(score, 0.5);
//! ```

pub mod core;
pub mod error;
pub mod simulator;
pub mod utils;
