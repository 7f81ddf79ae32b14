//! Interface to the external biophysical simulator and comparison of synapse models.
//!
//! This module provides three components:
//! - [`simulator`]: The run request handed to the simulator, and the [`simulator::Simulator`] trait.
//! - [`replay`]: A simulator replaying traces recorded beforehand.
//! - [`comparison`]: Scores candidate synapse models against the reference model of their receptor.
//!
//! # Example
//!
//! ```rust
//! use rusty_syn::core::config::SimulationConfig;
//! use rusty_syn::core::synapse::{Receptor, StimulusTarget};
//! use rusty_syn::simulator::simulator::RunRequest;
//!
//! let config = SimulationConfig { sim_time: 1000.0, ..Default::default() };
//! let request = RunRequest::build(&config, Default::default(), Receptor::Ampa, "E2_AMPA".parse().unwrap()).unwrap();
//!
//! assert_eq!(request.mechanism().mechanism, "Exp2Syn_v2");
//! assert_eq!(request.stimulus_target(), StimulusTarget::Synapse);
//! assert!(request.spike_train().times().iter().all(|t| *t < 1000.0));
//! ```

pub mod comparison;
pub mod replay;
pub mod simulator;
