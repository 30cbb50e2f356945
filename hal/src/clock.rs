//! Core clock frequency derivation
//!
//! Programming the PRCI block is the board's business; drivers only need the
//! resulting core frequency to compute baud divisors. [`CoreClock::from_pll`]
//! applies the same range checks the hardware imposes on the PLL path so a
//! bad board configuration is rejected before any divisor is derived from it.

use thiserror::Error;

/// Maximum rated core frequency.
pub const CORECLK_MAX: u32 = 320_000_000;

const HFXCLK_MIN: u32 = 10_000_000;
const HFXCLK_MAX: u32 = 20_000_000;
const PLLIN_MIN: u32 = 6_000_000;
const PLLIN_MAX: u32 = 48_000_000;
const PLLVCO_MIN: u64 = 384_000_000;
const PLLVCO_MAX: u64 = 768_000_000;
const PLLOUT_MIN: u32 = 48_000_000;
const PLLOUT_MAX: u32 = 384_000_000;

/// Errors rejected while deriving the core clock.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockError {
    #[error("HFX frequency {0} Hz outside 10-20 MHz")]
    HfxOutOfRange(u32),
    #[error("PLL pre-divider {0} outside 1..=4")]
    InvalidPreDivider(u32),
    #[error("PLL multiplier {0} must be even and within 2..=128")]
    InvalidMultiplier(u32),
    #[error("PLL post-divider {0} must be 2, 4 or 8")]
    InvalidPostDivider(u32),
    #[error("PLL input {0} Hz outside 6-48 MHz")]
    PllInputOutOfRange(u32),
    #[error("PLL VCO {0} Hz outside 384-768 MHz")]
    VcoOutOfRange(u64),
    #[error("PLL output {0} Hz outside 48-384 MHz")]
    PllOutputOutOfRange(u32),
    #[error("core clock {0} Hz above rated maximum")]
    CoreClockTooHigh(u32),
}

/// PLL parameters fed from the external high-frequency crystal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PllConfig {
    pub hfx_hz: u32,
    pub pre_divider: u32,
    pub multiplier: u32,
    pub post_divider: u32,
}

impl PllConfig {
    /// 48 MHz from a 16 MHz crystal.
    pub const DEFAULT: PllConfig = PllConfig {
        hfx_hz: 16_000_000,
        pre_divider: 2,
        multiplier: 48,
        post_divider: 8,
    };

    /// 320 MHz from a 16 MHz crystal, as used by RED-V class boards.
    pub const RED_V: PllConfig = PllConfig {
        hfx_hz: 16_000_000,
        pre_divider: 2,
        multiplier: 80,
        post_divider: 2,
    };
}

impl Default for PllConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Frequency of the clock feeding the core and the peripheral bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct CoreClock(u32);

impl CoreClock {
    /// A core clock whose frequency is known by other means.
    pub const fn from_hz(hz: u32) -> Self {
        CoreClock(hz)
    }

    /// Validate a PLL configuration and return the clock it produces.
    pub fn from_pll(pll: &PllConfig) -> Result<Self, ClockError> {
        if !(HFXCLK_MIN..=HFXCLK_MAX).contains(&pll.hfx_hz) {
            return Err(ClockError::HfxOutOfRange(pll.hfx_hz));
        }
        if !(1..=4).contains(&pll.pre_divider) {
            return Err(ClockError::InvalidPreDivider(pll.pre_divider));
        }
        if !(2..=128).contains(&pll.multiplier) || pll.multiplier % 2 != 0 {
            return Err(ClockError::InvalidMultiplier(pll.multiplier));
        }
        if !matches!(pll.post_divider, 2 | 4 | 8) {
            return Err(ClockError::InvalidPostDivider(pll.post_divider));
        }

        let input = pll.hfx_hz / pll.pre_divider;
        if !(PLLIN_MIN..=PLLIN_MAX).contains(&input) {
            return Err(ClockError::PllInputOutOfRange(input));
        }

        let vco = u64::from(input) * u64::from(pll.multiplier);
        if !(PLLVCO_MIN..=PLLVCO_MAX).contains(&vco) {
            return Err(ClockError::VcoOutOfRange(vco));
        }

        // Bounded by PLLVCO_MAX / 2, fits u32.
        let output = (vco / u64::from(pll.post_divider)) as u32;
        if !(PLLOUT_MIN..=PLLOUT_MAX).contains(&output) {
            return Err(ClockError::PllOutputOutOfRange(output));
        }
        if output > CORECLK_MAX {
            return Err(ClockError::CoreClockTooHigh(output));
        }

        Ok(CoreClock(output))
    }

    pub const fn hz(self) -> u32 {
        self.0
    }
}

impl Default for CoreClock {
    fn default() -> Self {
        // 16 MHz / 2 * 48 / 8
        CoreClock(48_000_000)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_pll_gives_48_mhz() {
        let clock = CoreClock::from_pll(&PllConfig::DEFAULT).unwrap();
        assert_eq!(clock.hz(), 48_000_000);
        assert_eq!(clock, CoreClock::default());
    }

    #[test]
    fn red_v_pll_runs_at_rated_maximum() {
        let clock = CoreClock::from_pll(&PllConfig::RED_V).unwrap();
        assert_eq!(clock.hz(), CORECLK_MAX);
    }

    #[test]
    fn rejects_out_of_range_parameters() {
        let bad_crystal = PllConfig {
            hfx_hz: 8_000_000,
            ..PllConfig::DEFAULT
        };
        assert_eq!(
            CoreClock::from_pll(&bad_crystal),
            Err(ClockError::HfxOutOfRange(8_000_000))
        );

        let odd_multiplier = PllConfig {
            multiplier: 47,
            ..PllConfig::DEFAULT
        };
        assert_eq!(
            CoreClock::from_pll(&odd_multiplier),
            Err(ClockError::InvalidMultiplier(47))
        );

        // 8 MHz * 40 = 320 MHz VCO, below the lock range.
        let slow_vco = PllConfig {
            multiplier: 40,
            ..PllConfig::DEFAULT
        };
        assert_eq!(
            CoreClock::from_pll(&slow_vco),
            Err(ClockError::VcoOutOfRange(320_000_000))
        );

        // 8 MHz * 96 / 2 = 384 MHz, a valid PLL output the core cannot take.
        let too_fast = PllConfig {
            multiplier: 96,
            post_divider: 2,
            ..PllConfig::DEFAULT
        };
        assert_eq!(
            CoreClock::from_pll(&too_fast),
            Err(ClockError::CoreClockTooHigh(384_000_000))
        );
    }
}
