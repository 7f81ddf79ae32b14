//! Module implementing the stimulus spike train and its generator.
//!
//! The generator approximates a Poisson process of mean rate `freq` in discrete time: the clock
//! advances by [`TIME_RESOLUTION`] and, at every step, an event is admitted with probability
//! `freq * TIME_RESOLUTION * r`, where `r = 1 - exp(-(t - t_last) / tau_ahp)` is the recovery
//! factor since the last admitted event at `t_last`.
//!
//! # Examples
//!
//! ```rust
//! use rusty_syn::core::spike_train::{SpikeTrainGenerator, StimulusParams};
//!
//! // 10 Hz mean rate, 35 ms recovery time constant, 2 seconds of stimulation
//! let params = StimulusParams::build(10.0, 0.035, 2.0).unwrap();
//! let generator = SpikeTrainGenerator::new(params).with_seed(42);
//!
//! let spike_train = generator.generate();
//! assert!(spike_train.times().windows(2).all(|w| w[0] < w[1]));
//! assert!(spike_train.times().iter().all(|t| *t < 2000.0));
//!
//! // The same seed always produces the same spike train
//! assert_eq!(spike_train, generator.generate());
//! ```
use log;
use rand::Rng;
use rand_chacha::{rand_core::SeedableRng, ChaCha8Rng};
use rand_distr::{Distribution, Uniform};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use crate::core::{
    DEFAULT_SEED, MIN_PARALLEL_SEEDS, SENTINEL_OFFSET, TIME_RESOLUTION, TIME_RESOLUTION_MS,
};
use crate::error::SynError;

/// The stimulation parameters of a spike train.
#[derive(Debug, PartialEq, Clone, Copy, Serialize, Deserialize)]
pub struct StimulusParams {
    /// The mean firing rate (in Hz).
    freq: f64,
    /// The recovery time constant after an event (in seconds).
    tau_ahp: f64,
    /// The duration of the stimulation (in seconds).
    tstop: f64,
}

impl StimulusParams {
    /// Create the stimulation parameters after checking their domain.
    /// A non-positive duration is accepted and results in an empty stimulation window.
    pub fn build(freq: f64, tau_ahp: f64, tstop: f64) -> Result<Self, SynError> {
        if !freq.is_finite() || freq < 0.0 {
            return Err(SynError::InvalidParameter(format!(
                "the firing rate must be finite and non-negative, got {}",
                freq
            )));
        }

        if !tau_ahp.is_finite() || tau_ahp <= 0.0 {
            return Err(SynError::InvalidParameter(format!(
                "the recovery time constant must be finite and positive, got {}",
                tau_ahp
            )));
        }

        if !tstop.is_finite() {
            return Err(SynError::InvalidParameter(format!(
                "the stimulation duration must be finite, got {}",
                tstop
            )));
        }

        Ok(StimulusParams {
            freq,
            tau_ahp,
            tstop,
        })
    }

    /// Returns the mean firing rate (in Hz).
    pub fn freq(&self) -> f64 {
        self.freq
    }

    /// Returns the recovery time constant (in seconds).
    pub fn tau_ahp(&self) -> f64 {
        self.tau_ahp
    }

    /// Returns the stimulation duration (in seconds).
    pub fn tstop(&self) -> f64 {
        self.tstop
    }

    /// The admission probability of a single step once the process has fully recovered.
    /// Values above one saturate the process, i.e., every recovered step is admitted.
    pub fn step_probability(&self) -> f64 {
        self.freq * TIME_RESOLUTION
    }

    /// The recovery factor after `elapsed` seconds without any event.
    pub fn recovery(&self, elapsed: f64) -> f64 {
        1.0 - (-elapsed / self.tau_ahp).exp()
    }
}

/// An ordered sequence of stimulation times (in milliseconds).
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct SpikeTrain {
    /// The event times, in increasing order.
    times: Vec<f64>,
    /// Whether the only event is the no-stimulation sentinel.
    sentinel: bool,
}

impl SpikeTrain {
    /// A spike train holding a single event placed past the end of the stimulation window.
    /// It keeps the event-driven stimulation valid while never delivering any event.
    pub fn sentinel(tstop: f64) -> Self {
        SpikeTrain {
            times: vec![tstop * 1e3 + SENTINEL_OFFSET],
            sentinel: true,
        }
    }

    /// Returns the event times (in milliseconds).
    pub fn times(&self) -> &[f64] {
        &self.times[..]
    }

    /// Consumes the spike train and returns the event times (in milliseconds).
    pub fn into_times(self) -> Vec<f64> {
        self.times
    }

    /// Returns the number of entries, the sentinel included.
    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    /// Returns true if the spike train is the no-stimulation sentinel.
    pub fn is_sentinel(&self) -> bool {
        self.sentinel
    }

    /// The empirical firing rate (in Hz) over a window of `duration` seconds.
    /// The sentinel does not count as an event.
    pub fn mean_rate(&self, duration: f64) -> f64 {
        if self.sentinel || duration <= 0.0 {
            return 0.0;
        }
        self.times.len() as f64 / duration
    }

    /// Save the spike train to a file.
    pub fn save_to<P: AsRef<Path>>(&self, path: P) -> Result<(), SynError> {
        let file = File::create(path).map_err(|e| SynError::IOError(e.to_string()))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, self)
            .map_err(|e| SynError::IOError(e.to_string()))?;
        writer.flush().map_err(|e| SynError::IOError(e.to_string()))
    }

    /// Load a spike train from a file.
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, SynError> {
        let file = File::open(path).map_err(|e| SynError::IOError(e.to_string()))?;
        let reader = BufReader::new(file);
        serde_json::from_reader(reader).map_err(|e| SynError::IOError(e.to_string()))
    }
}

/// A generator of refractory-modulated Poisson spike trains.
///
/// Every call to [`SpikeTrainGenerator::generate`] owns a fresh random stream seeded from the
/// generator's seed, hence repeated calls return identical spike trains and concurrent calls do
/// not interfere.
#[derive(Debug, PartialEq, Clone, Copy)]
pub struct SpikeTrainGenerator {
    params: StimulusParams,
    seed: u64,
}

impl SpikeTrainGenerator {
    /// Create a generator with the default seed.
    pub fn new(params: StimulusParams) -> Self {
        SpikeTrainGenerator {
            params,
            seed: DEFAULT_SEED,
        }
    }

    /// Replace the seed of the generator.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn params(&self) -> &StimulusParams {
        &self.params
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Generate a spike train from a random stream seeded with the generator's seed.
    pub fn generate(&self) -> SpikeTrain {
        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
        self.sample(&mut rng)
    }

    /// Generate one spike train per seed, each from its own random stream.
    /// The output is ordered as the seeds.
    pub fn generate_batch(&self, seeds: &[u64]) -> Vec<SpikeTrain> {
        let generate_with = |seed: &u64| self.with_seed(*seed).generate();
        if seeds.len() >= MIN_PARALLEL_SEEDS {
            seeds.par_iter().map(generate_with).collect()
        } else {
            seeds.iter().map(generate_with).collect()
        }
    }

    /// Sample a spike train from the provided random number generator.
    ///
    /// One uniform draw is consumed per clock step. Without stimulation (zero firing rate), no
    /// draw is consumed and the sentinel spike train is returned.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> SpikeTrain {
        if self.params.freq == 0.0 {
            return SpikeTrain::sentinel(self.params.tstop);
        }

        let step_probability = self.params.step_probability();
        if step_probability > 1.0 {
            log::warn!(
                "The step probability {} exceeds one (firing rate {} Hz with a {} s step): the process saturates",
                step_probability,
                self.params.freq,
                TIME_RESOLUTION
            );
        }

        let uniform = Uniform::new(0.0, 1.0);
        let mut last_time = f64::NEG_INFINITY;
        let mut times = Vec::new();

        let clock = (0..).map(|step: u64| (step, step as f64 * TIME_RESOLUTION));
        for (step, time) in clock.take_while(|(_, time)| *time < self.params.tstop) {
            let draw: f64 = uniform.sample(rng);
            if draw <= step_probability * self.params.recovery(time - last_time) {
                times.push(step as f64 * TIME_RESOLUTION_MS);
                last_time = time;
            }
        }

        log::debug!(
            "Generated {} events over {} s (rate {} Hz, recovery time constant {} s)",
            times.len(),
            self.params.tstop,
            self.params.freq,
            self.params.tau_ahp
        );

        SpikeTrain {
            times,
            sentinel: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use tempfile::tempdir;

    use super::*;

    const SEED: u64 = 42;

    fn generator(freq: f64, tau_ahp: f64, tstop: f64) -> SpikeTrainGenerator {
        SpikeTrainGenerator::new(StimulusParams::build(freq, tau_ahp, tstop).unwrap())
    }

    #[test]
    fn test_stimulus_params_build() {
        assert!(StimulusParams::build(10.0, 0.035, 20.0).is_ok());
        assert!(StimulusParams::build(0.0, 0.035, 20.0).is_ok());
        assert!(StimulusParams::build(10.0, 0.035, 0.0).is_ok());
        assert!(StimulusParams::build(10.0, 0.035, -1.0).is_ok());

        // Invalid firing rates
        assert!(matches!(
            StimulusParams::build(-1.0, 0.035, 20.0),
            Err(SynError::InvalidParameter(_))
        ));
        assert!(matches!(
            StimulusParams::build(f64::NAN, 0.035, 20.0),
            Err(SynError::InvalidParameter(_))
        ));

        // Invalid recovery time constants
        assert!(matches!(
            StimulusParams::build(10.0, 0.0, 20.0),
            Err(SynError::InvalidParameter(_))
        ));
        assert!(matches!(
            StimulusParams::build(10.0, -0.035, 20.0),
            Err(SynError::InvalidParameter(_))
        ));
        assert!(matches!(
            StimulusParams::build(0.0, 0.0, 20.0),
            Err(SynError::InvalidParameter(_))
        ));

        // Invalid duration
        assert!(matches!(
            StimulusParams::build(10.0, 0.035, f64::INFINITY),
            Err(SynError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_recovery() {
        let params = StimulusParams::build(10.0, 0.035, 20.0).unwrap();
        assert_eq!(params.recovery(0.0), 0.0);
        assert_eq!(params.recovery(f64::INFINITY), 1.0);
        assert_relative_eq!(params.recovery(0.035), 1.0 - (-1.0_f64).exp());
        assert!(params.recovery(0.01) < params.recovery(0.02));
    }

    #[test]
    fn test_sentinel_without_stimulation() {
        let spike_train = generator(0.0, 0.035, 20.0).generate();
        assert_eq!(spike_train.times(), &[20010.0]);
        assert!(spike_train.is_sentinel());
        assert_eq!(spike_train.mean_rate(20.0), 0.0);

        for tau_ahp in [1e-6, 0.001, 1.0, 100.0] {
            let spike_train = generator(0.0, tau_ahp, 2.5).with_seed(SEED).generate();
            assert_eq!(spike_train.times(), &[2510.0]);
        }
    }

    #[test]
    fn test_empty_stimulation_window() {
        for tstop in [0.0, -1.0] {
            let spike_train = generator(10.0, 0.035, tstop).generate();
            assert!(spike_train.is_empty());
            assert!(!spike_train.is_sentinel());
        }
    }

    #[test]
    fn test_generate_deterministic() {
        let generator = generator(10.0, 0.035, 20.0).with_seed(SEED);
        let spike_train = generator.generate();
        assert!(!spike_train.is_empty());
        assert_eq!(spike_train, generator.generate());

        // Default seed
        let generator = generator.with_seed(DEFAULT_SEED);
        assert_eq!(generator.generate(), generator.generate());
    }

    #[test]
    fn test_generate_seeds_differ() {
        let generator = generator(10.0, 0.035, 20.0);
        assert_ne!(
            generator.with_seed(0).generate(),
            generator.with_seed(1).generate()
        );
    }

    #[test]
    fn test_generate_sorted_and_bounded() {
        for seed in 0..8 {
            let spike_train = generator(50.0, 0.01, 5.0).with_seed(seed).generate();
            assert!(spike_train.times().windows(2).all(|w| w[0] < w[1]));
            assert!(spike_train.times().iter().all(|t| *t >= 0.0 && *t < 5000.0));
        }
    }

    #[test]
    fn test_generate_on_time_grid() {
        let spike_train = generator(100.0, 0.01, 2.0).with_seed(SEED).generate();
        assert!(!spike_train.is_empty());
        for t in spike_train.times() {
            assert_eq!(t % TIME_RESOLUTION_MS, 0.0, "{} is off the time grid", t);
        }
        assert_relative_eq!(TIME_RESOLUTION * 1e3, TIME_RESOLUTION_MS, epsilon = 1e-15);
    }

    #[test]
    fn test_saturated_step_probability() {
        // freq * TIME_RESOLUTION = 2.0, every recovered step is admitted
        let spike_train = generator(8000.0, 1e-6, 0.0101).generate();
        assert_eq!(spike_train.len(), 41);
        for (n, t) in spike_train.times().iter().enumerate() {
            assert_eq!(*t, n as f64 * TIME_RESOLUTION_MS);
        }
    }

    #[test]
    fn test_mean_rate_without_refractoriness() {
        // With a negligible recovery time constant, the process is a Bernoulli approximation of a Poisson process
        let spike_train = generator(10.0, 1e-6, 100.0).with_seed(SEED).generate();
        let rate = spike_train.mean_rate(100.0);
        assert!(rate > 8.5 && rate < 11.5, "rate {} far from 10 Hz", rate);
    }

    #[test]
    fn test_refractory_suppression() {
        let seeds: Vec<u64> = (0..16).collect();
        let mean_count = |tau_ahp: f64| {
            let spike_trains = generator(10.0, tau_ahp, 20.0).generate_batch(&seeds);
            spike_trains.iter().map(|st| st.len()).sum::<usize>() as f64 / seeds.len() as f64
        };

        let fast = mean_count(0.005);
        let medium = mean_count(0.035);
        let slow = mean_count(0.5);
        assert!(fast >= medium, "{} < {}", fast, medium);
        assert!(medium > slow, "{} <= {}", medium, slow);
    }

    #[test]
    fn test_generate_batch() {
        let generator = generator(20.0, 0.035, 3.0);
        let seeds = [3, 1, 4, 1, 5, 9, 2, 6];
        let spike_trains = generator.generate_batch(&seeds);
        assert_eq!(spike_trains.len(), seeds.len());
        for (spike_train, seed) in spike_trains.iter().zip(seeds.iter()) {
            assert_eq!(spike_train, &generator.with_seed(*seed).generate());
        }

        // Below the parallel threshold
        let spike_trains = generator.generate_batch(&[7]);
        assert_eq!(spike_trains, vec![generator.with_seed(7).generate()]);
        assert!(generator.generate_batch(&[]).is_empty());
    }

    #[test]
    fn test_sample_with_external_rng() {
        let generator = generator(10.0, 0.035, 5.0).with_seed(SEED);
        let mut rng = ChaCha8Rng::seed_from_u64(SEED);
        assert_eq!(generator.sample(&mut rng), generator.generate());
    }

    #[test]
    fn test_spike_train_save_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("spike_train.json");

        let spike_train = generator(10.0, 0.035, 2.0).with_seed(SEED).generate();
        spike_train.save_to(&path).unwrap();
        assert_eq!(SpikeTrain::load_from(&path).unwrap(), spike_train);

        assert!(matches!(
            SpikeTrain::load_from(dir.path().join("missing.json")),
            Err(SynError::IOError(_))
        ));
    }
}
