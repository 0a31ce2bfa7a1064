//! Balance mixer with equal-power scaling
//!
//! Maps a single balance scalar to independent music/calls gains.
//! 0.0 = music only, 1.0 = calls only, 0.5 = both at -3 dB.

use std::f32::consts::FRAC_PI_2;

/// Gain pair for the two streams
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChannelVolumes {
    /// Music stream gain (0.0 - 1.0)
    pub music: f32,

    /// Calls stream gain (0.0 - 1.0)
    pub calls: f32,
}

impl ChannelVolumes {
    /// Same volumes with the calls stream silenced
    #[must_use]
    pub fn with_calls_silenced(self) -> Self {
        Self {
            music: self.music,
            calls: 0.0,
        }
    }
}

/// Convert a balance to music/calls gains
///
/// Equal-power law: `music = cos(b·π/2)`, `calls = sin(b·π/2)`, so
/// `music² + calls² = 1` across the whole slider and neither channel is ever
/// boosted above unity. Callers clamp `balance` to [0, 1].
pub fn volumes_for(balance: f32) -> ChannelVolumes {
    let angle = balance * FRAC_PI_2;
    ChannelVolumes {
        music: angle.cos(),
        calls: angle.sin(),
    }
}

/// Clamp a requested balance into [0, 1] (NaN falls back to centre)
pub fn clamp_balance(balance: f32) -> f32 {
    if balance.is_nan() {
        0.5
    } else {
        balance.clamp(0.0, 1.0)
    }
}
