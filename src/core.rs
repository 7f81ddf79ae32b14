//! Core module defining the simulator-independent components of the Rusty Syn library.
//!
//! It consists of the following components:
//!
//! - [`spike_train`]: Generates the refractory-modulated Poisson stimulus
//! - [`metrics`]: Scores a test trace against a reference trace
//! - [`trace`]: Holds the named traces returned by a simulation run
//! - [`synapse`]: Describes the receptor families and synapse models under comparison
//! - [`config`]: Stimulation parameters and the test cell setup
//!
//! # Examples
//!
//! ```
//! use rusty_syn::core::spike_train::{SpikeTrainGenerator, StimulusParams};
//! use rusty_syn::core::metrics::nrmse;
//!
//! // No stimulation: a single timestamp that is never reached by the run
//! let params = StimulusParams::build(0.0, 0.035, 20.0).unwrap();
//! let spike_train = SpikeTrainGenerator::new(params).generate();
//! assert_eq!(spike_train.times(), &[20010.0]);
//!
//! // A uniformly half-scaled trace
//! let score = nrmse(&[0.0, 2.0, 4.0, 2.0, 0.0], &[0.0, 1.0, 2.0, 1.0, 0.0]).unwrap();
//! assert!((score - 0.5).abs() < 1e-12);
//! ```
pub mod config;
pub mod metrics;
pub mod spike_train;
pub mod synapse;
pub mod trace;

/// The time step of the stimulus generation clock (in seconds).
pub const TIME_RESOLUTION: f64 = 0.00025;
/// The same time step, in milliseconds. Emitted stimulation times are exact multiples of it.
pub const TIME_RESOLUTION_MS: f64 = 0.25;
/// The offset (in milliseconds) past the end of the run at which the no-stimulation sentinel is placed.
pub const SENTINEL_OFFSET: f64 = 10.0;
/// The seed used when none is provided.
pub const DEFAULT_SEED: u64 = 0;
/// Minimum number of seeds to consider parallel generation.
pub const MIN_PARALLEL_SEEDS: usize = 4;
