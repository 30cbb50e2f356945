//! Interrupt-driven serial driver.
//!
//! All mutable driver state (operating state, both queues, event flags)
//! lives behind the system lock. The UART registers are never shadowed:
//! the interrupt enable register is read back whenever it is modified, and
//! every register write that can race with the interrupt handler happens
//! with the lock held or before the source is enabled at the controller.

use core::convert::Infallible;

use fe310_hal::{
    CoreClock, HalError, HalResult, InterruptController, Mmio, Priority, RegisterBus,
    SerialConfig, StopBits,
};
use fe310_osal::{ByteQueue, IsrContext, SysLock, ThreadContext, Timeout};
use fe310_plic::{InterruptHandler, PlicParams};
use log::debug;

use crate::error::SerialError;
use crate::events::ChannelEvents;
use crate::regs::{self, RxCtrl, TxCtrl, Watermarks};
use crate::unit::UartUnit;

/// Controller priority of every serial unit. Must stay within the kernel
/// priority range since the handler takes the system lock.
pub const SERIAL_IRQ_PRIORITY: Priority = Priority::new_unchecked(1);

const _: () = assert!(
    SERIAL_IRQ_PRIORITY.raw() > 0
        && SERIAL_IRQ_PRIORITY.raw() <= PlicParams::FE310_G002.max_kernel_priority.raw()
);

/// Default capacity of each software queue.
pub const DEFAULT_QUEUE_SIZE: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverState {
    Stopped,
    Ready,
}

struct Shared<const IQ: usize, const OQ: usize> {
    state: DriverState,
    baud_rate: u32,
    input: ByteQueue<IQ>,
    output: ByteQueue<OQ>,
    events: ChannelEvents,
}

impl<const IQ: usize, const OQ: usize> Shared<IQ, OQ> {
    const fn new() -> Self {
        Self {
            state: DriverState::Stopped,
            baud_rate: 0,
            input: ByteQueue::new(),
            output: ByteQueue::new(),
            events: ChannelEvents::empty(),
        }
    }

    fn incoming(&mut self, byte: u8) {
        if self.input.is_empty() {
            self.events |= ChannelEvents::INPUT_AVAILABLE;
        }
        if self.input.put(byte).is_err() {
            self.events |= ChannelEvents::QUEUE_FULL;
        }
    }
}

/// Driver for one UART unit with `IQ` bytes of input and `OQ` bytes of
/// output buffering.
pub struct SerialDriver<B, const IQ: usize = DEFAULT_QUEUE_SIZE, const OQ: usize = DEFAULT_QUEUE_SIZE>
{
    unit: UartUnit,
    regs: B,
    clock: CoreClock,
    shared: SysLock<Shared<IQ, OQ>>,
}

/// Stopped drivers for both units, UART0 first. `bus` supplies the
/// register access of each unit.
pub fn init_units<B, F, const IQ: usize, const OQ: usize>(
    clock: CoreClock,
    mut bus: F,
) -> [SerialDriver<B, IQ, OQ>; 2]
where
    B: RegisterBus,
    F: FnMut(UartUnit) -> B,
{
    [UartUnit::UART0, UartUnit::UART1].map(|unit| SerialDriver::new(unit, bus(unit), clock))
}

impl<const IQ: usize, const OQ: usize> SerialDriver<Mmio, IQ, OQ> {
    /// Drivers for both units at their fixed addresses.
    ///
    /// # Safety
    ///
    /// Must be called at most once, on an FE310-G002.
    pub unsafe fn fe310(clock: CoreClock) -> [Self; 2] {
        init_units(clock, |unit| unsafe { unit.mmio() })
    }
}

impl<B: RegisterBus, const IQ: usize, const OQ: usize> SerialDriver<B, IQ, OQ> {
    /// A stopped driver with empty queues. Nothing is written to the
    /// hardware and no interrupt is enabled until [`start`](Self::start).
    pub const fn new(unit: UartUnit, regs: B, clock: CoreClock) -> Self {
        Self {
            unit,
            regs,
            clock,
            shared: SysLock::new(Shared::new()),
        }
    }

    pub fn unit(&self) -> UartUnit {
        self.unit
    }

    pub fn state(&self, thread: &ThreadContext) -> DriverState {
        self.shared.lock(thread, |shared| shared.state)
    }

    /// Rate of the last successful start, 0 before the first one.
    pub fn baud_rate(&self, thread: &ThreadContext) -> u32 {
        self.shared.lock(thread, |shared| shared.baud_rate)
    }

    /// Program the unit and enable its interrupt source.
    ///
    /// Only the receive watermark interrupt is armed; the transmit one is
    /// armed by the first write, or here already when output was queued
    /// while the driver was stopped. Starting a running driver reprograms
    /// the line without touching the controller.
    pub fn start<C: InterruptController>(
        &self,
        thread: &ThreadContext,
        controller: &C,
        config: &SerialConfig,
    ) -> Result<(), SerialError> {
        let div = divisor(self.clock, config.baud_rate)?;

        let mut txctrl = TxCtrl::TXEN | TxCtrl::watermark(1);
        if config.stop_bits == StopBits::Two {
            txctrl |= TxCtrl::NSTOP;
        }
        let rxctrl = RxCtrl::RXEN | RxCtrl::watermark(1);

        let was_stopped = self.shared.lock(thread, |shared| {
            self.regs.write32(regs::DIV, div);
            self.regs.write32(regs::TXCTRL, txctrl.bits());
            self.regs.write32(regs::RXCTRL, rxctrl.bits());

            let mut ie = Watermarks::RXWM;
            if !shared.output.is_empty() {
                ie |= Watermarks::TXWM;
            }
            self.regs.write32(regs::IE, ie.bits());

            shared.baud_rate = config.baud_rate;
            core::mem::replace(&mut shared.state, DriverState::Ready) == DriverState::Stopped
        });

        if was_stopped {
            controller.enable(self.unit.source, SERIAL_IRQ_PRIORITY);
        }
        debug!(
            "serial {}: ready at {} baud (div {})",
            self.unit.source, config.baud_rate, div
        );
        Ok(())
    }

    /// Silence the unit and disable its interrupt source.
    ///
    /// Queued bytes in either direction are kept; whatever sat in the
    /// hardware FIFOs is lost. Stopping a stopped driver does nothing.
    pub fn stop<C: InterruptController>(&self, thread: &ThreadContext, controller: &C) {
        let was_ready = self.shared.lock(thread, |shared| {
            if shared.state != DriverState::Ready {
                return false;
            }
            self.regs.write32(regs::IE, 0);
            self.regs.write32(regs::TXCTRL, 0);
            self.regs.write32(regs::RXCTRL, 0);
            shared.state = DriverState::Stopped;
            true
        });

        if was_ready {
            controller.disable(self.unit.source);
            debug!("serial {}: stopped", self.unit.source);
        }
    }

    /// Queue `bytes` for transmission, waiting for room as `timeout`
    /// allows. Returns how many bytes were queued.
    pub fn write(&self, thread: &ThreadContext, bytes: &[u8], timeout: Timeout) -> usize {
        let mut written = 0;
        let mut poller = timeout.poller();

        while written < bytes.len() {
            let rest = &bytes[written..];
            written += self.shared.lock(thread, |shared| {
                let was_empty = shared.output.is_empty();
                let queued = shared.output.put_slice(rest);
                if was_empty && queued > 0 {
                    self.notify_tx(shared);
                }
                queued
            });

            if written == bytes.len() || !poller.wait() {
                break;
            }
        }

        written
    }

    /// Take received bytes into `buf`, waiting for data as `timeout`
    /// allows. Returns how many bytes were taken.
    pub fn read(&self, thread: &ThreadContext, buf: &mut [u8], timeout: Timeout) -> usize {
        let mut read = 0;
        let mut poller = timeout.poller();

        while read < buf.len() {
            let rest = &mut buf[read..];
            read += self.shared.lock(thread, |shared| shared.input.get_slice(rest));

            if read == buf.len() || !poller.wait() {
                break;
            }
        }

        read
    }

    /// [`write`](Self::write) that reports a partial transfer as an error.
    pub fn write_all(&self, thread: &ThreadContext, bytes: &[u8], timeout: Timeout) -> HalResult<()> {
        if self.write(thread, bytes, timeout) == bytes.len() {
            Ok(())
        } else {
            Err(HalError::Timeout)
        }
    }

    /// [`read`](Self::read) that reports a partial transfer as an error.
    pub fn read_exact(&self, thread: &ThreadContext, buf: &mut [u8], timeout: Timeout) -> HalResult<()> {
        if self.read(thread, buf, timeout) == buf.len() {
            Ok(())
        } else {
            Err(HalError::Timeout)
        }
    }

    /// Queue one byte without waiting.
    pub fn put(&self, thread: &ThreadContext, byte: u8) -> nb::Result<(), Infallible> {
        self.shared.lock(thread, |shared| {
            let was_empty = shared.output.is_empty();
            shared.output.put(byte).map_err(|_| nb::Error::WouldBlock)?;
            if was_empty {
                self.notify_tx(shared);
            }
            Ok(())
        })
    }

    /// Take one received byte without waiting.
    pub fn get(&self, thread: &ThreadContext) -> nb::Result<u8, Infallible> {
        self.shared
            .lock(thread, |shared| shared.input.get())
            .ok_or(nb::Error::WouldBlock)
    }

    pub fn input_len(&self, thread: &ThreadContext) -> usize {
        self.shared.lock(thread, |shared| shared.input.len())
    }

    pub fn output_len(&self, thread: &ThreadContext) -> usize {
        self.shared.lock(thread, |shared| shared.output.len())
    }

    /// Return and clear the accumulated channel events.
    pub fn take_events(&self, thread: &ThreadContext) -> ChannelEvents {
        self.shared
            .lock(thread, |shared| core::mem::take(&mut shared.events))
    }

    /// Discard everything in both queues.
    pub fn reset(&self, thread: &ThreadContext) {
        self.shared.lock(thread, |shared| {
            shared.input.clear();
            shared.output.clear();
        });
    }

    /// Interrupt service routine of this unit.
    pub fn serve_interrupt(&self, isr: &IsrContext) {
        let ie = Watermarks::from_bits_truncate(self.regs.read32(regs::IE));
        let ip = Watermarks::from_bits_truncate(self.regs.read32(regs::IP));
        let active = ie & ip;

        // Level triggered: anything left in the FIFO re-raises at once.
        if active.contains(Watermarks::RXWM) {
            self.shared.lock_from_isr(isr, |shared| loop {
                let data = self.regs.read32(regs::RXDATA);
                if data & regs::RXDATA_EMPTY != 0 {
                    break;
                }
                shared.incoming((data & regs::DATA_MASK) as u8);
            });
        }

        if active.contains(Watermarks::TXWM) {
            self.shared.lock_from_isr(isr, |shared| match shared.output.get() {
                None => {
                    shared.events |= ChannelEvents::OUTPUT_EMPTY | ChannelEvents::TRANSMISSION_END;
                    self.regs
                        .modify32(regs::IE, |ie| ie & !Watermarks::TXWM.bits());
                }
                Some(byte) => {
                    self.regs.write32(regs::TXDATA, u32::from(byte));
                    while self.regs.read32(regs::TXDATA) & regs::TXDATA_FULL == 0 {
                        match shared.output.get() {
                            Some(byte) => self.regs.write32(regs::TXDATA, u32::from(byte)),
                            None => break,
                        }
                    }
                }
            });
        }
    }

    /// Arm the transmit watermark interrupt after the output queue left
    /// the empty state. A stopped unit is left alone; `start` arms it.
    fn notify_tx(&self, shared: &Shared<IQ, OQ>) {
        if shared.state == DriverState::Ready {
            self.regs
                .modify32(regs::IE, |ie| ie | Watermarks::TXWM.bits());
        }
    }
}

impl<B, const IQ: usize, const OQ: usize> InterruptHandler for SerialDriver<B, IQ, OQ>
where
    B: RegisterBus + Sync,
{
    fn on_interrupt(&self, isr: &IsrContext) {
        self.serve_interrupt(isr);
    }
}

/// `coreClock / baud - 1`, which must fit the 16-bit divisor field.
fn divisor(clock: CoreClock, baud: u32) -> Result<u32, SerialError> {
    if baud == 0 {
        return Err(SerialError::InvalidBaudRate);
    }
    match (clock.hz() / baud).checked_sub(1) {
        Some(div) if div <= regs::DIV_MASK => Ok(div),
        _ => Err(SerialError::DivisorOutOfRange {
            baud,
            clock_hz: clock.hz(),
        }),
    }
}
