// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Error type for radar configuration validation.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Waveform frequency and time grids differ in length ({freq} vs {time})")]
    WaveformGridLength { freq: usize, time: usize },

    #[error("The waveform grid needs at least two points, got {0}")]
    WaveformTooShort(usize),

    #[error("Waveform time grid is not strictly increasing at index {index}")]
    TimeGridNotIncreasing { index: usize },

    #[error("The waveform contains a non-finite value")]
    NonFiniteWaveform,

    #[error("There must be at least one pulse")]
    NoPulses,

    #[error("Pulse start times are not strictly increasing at index {index}")]
    PulseStartNotIncreasing { index: usize },

    #[error("Got {got} per-pulse frequency offsets for {pulses} pulses")]
    FreqOffsetCount { got: usize, pulses: usize },

    #[error("A pattern's angle and gain sequences differ in length ({angles} vs {gains})")]
    PatternLength { angles: usize, gains: usize },

    #[error("Pattern angles are not strictly ascending at index {index}")]
    PatternNotSorted { index: usize },

    #[error("Got {got} per-pulse modulation weights for {pulses} pulses")]
    PulseModCount { got: usize, pulses: usize },

    #[error("Waveform modulation time and weight sequences differ in length ({times} vs {weights})")]
    WaveformModLength { times: usize, weights: usize },

    #[error("Waveform modulation times are not strictly ascending at index {index}")]
    WaveformModNotSorted { index: usize },

    #[error("The transmitter has no channels")]
    NoTxChannels,

    #[error("The receiver has no channels")]
    NoRxChannels,

    #[error("`pulses` says {stated} but {got} pulse start times were given")]
    PulseCountMismatch { stated: usize, got: usize },

    #[error("Sampling frequency must be positive, got {0} Hz")]
    NonPositiveSampleRate(f64),

    #[error("The per-pulse sample count is zero; the waveform is shorter than one sample")]
    ZeroSamples,

    #[error("Ray density must be positive, got {0}")]
    NonPositiveDensity(f64),

    #[error("Frequency must be positive, got {0} Hz")]
    NonPositiveFrequency(f64),

    #[error(
        "Phase noise shape {got:?} does not match the timestamp tensor {expected:?} \
         (channels × pulses × samples)"
    )]
    PhaseNoiseShape {
        got: (usize, usize, usize),
        expected: (usize, usize, usize),
    },

    #[error("Frame start times are empty")]
    FrameTimesEmpty,

    #[error("Frame start times are not strictly increasing at index {index}")]
    FrameTimesNotIncreasing { index: usize },

    #[error(
        "A motion table's shape {got:?} does not match the timestamp tensor {expected:?} \
         (channels × pulses × samples)"
    )]
    MotionShape {
        got: (usize, usize, usize),
        expected: (usize, usize, usize),
    },

    #[error("Timestamps are not monotone within channel {channel}, pulse {pulse}")]
    TimestampsNotMonotone { channel: usize, pulse: usize },

    #[error("A motion description contains a non-finite value")]
    NonFiniteMotion,

    #[error("Interference simulation supports only uniform interferer platform motion")]
    InterfererMotionSampled,
}
