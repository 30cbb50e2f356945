//! UART (Universal Asynchronous Receiver/Transmitter) configuration

/// Default line speed when the board does not ask for one.
pub const DEFAULT_BAUD_RATE: u32 = 38400;

/// UART stop bits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StopBits {
    #[default]
    One,
    Two,
}

/// Serial line configuration.
///
/// FE310-class UARTs are fixed at 8 data bits without parity, so only the
/// rate and the stop bit count are configurable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SerialConfig {
    pub baud_rate: u32,
    pub stop_bits: StopBits,
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            baud_rate: DEFAULT_BAUD_RATE,
            stop_bits: StopBits::One,
        }
    }
}

impl SerialConfig {
    pub const fn new(baud_rate: u32) -> Self {
        Self {
            baud_rate,
            stop_bits: StopBits::One,
        }
    }

    /// Creates a new serial configuration builder.
    pub fn builder() -> SerialConfigBuilder {
        SerialConfigBuilder::default()
    }
}

/// Builder for ergonomic serial configuration construction.
#[derive(Debug, Clone, Default)]
pub struct SerialConfigBuilder {
    config: SerialConfig,
}

impl SerialConfigBuilder {
    /// Sets the line speed in bits per second.
    pub fn baud_rate(mut self, baud_rate: u32) -> Self {
        self.config.baud_rate = baud_rate;
        self
    }

    /// Sets the number of stop bits.
    pub fn stop_bits(mut self, stop_bits: StopBits) -> Self {
        self.config.stop_bits = stop_bits;
        self
    }

    /// Builds the serial configuration.
    pub fn build(self) -> SerialConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_overrides_defaults() {
        let config = SerialConfig::builder()
            .baud_rate(115_200)
            .stop_bits(StopBits::Two)
            .build();

        assert_eq!(config.baud_rate, 115_200);
        assert_eq!(config.stop_bits, StopBits::Two);
        assert_eq!(SerialConfig::default().baud_rate, DEFAULT_BAUD_RATE);
    }
}
