//! Thread-level blocking calls racing a free-running interrupt thread.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use fe310_hal::{CoreClock, InterruptController, SerialConfig};
use fe310_osal::{IsrContext, ThreadContext, Timeout};
use fe310_plic::{ExternalInterrupts, Fe310DispatchTable, Plic, PlicParams};
use fe310_serial::{SerialDriver, UartUnit};
use fe310_sim::{SimPlic, SimUart};

const MESSAGE_LEN: usize = 200;
const PATIENCE: Timeout = Timeout::Polls(1_000_000);

#[test]
fn blocking_write_and_read_over_loopback() {
    let _ = env_logger::builder().is_test(true).try_init();

    let uart = Arc::new(SimUart::fe310().with_loopback());
    let plic = Plic::new(SimPlic::fe310(), PlicParams::FE310_G002);
    plic.init();
    plic.bus().connect(UartUnit::UART0.source.raw(), uart.clone());
    // Small output queue so the writer has to wait on the interrupt thread.
    let driver: SerialDriver<_, 256, 8> =
        SerialDriver::new(UartUnit::UART0, uart.clone(), CoreClock::default());

    let main = unsafe { ThreadContext::enter() };
    driver
        .start(&main, &plic, &SerialConfig::default())
        .unwrap();

    let message: Vec<u8> = (0..MESSAGE_LEN).map(|i| (i * 7) as u8).collect();
    let done = AtomicBool::new(false);

    let received = thread::scope(|s| {
        s.spawn(|| {
            let table = Fe310DispatchTable::builder()
                .register(UartUnit::UART0.source, &driver)
                .build();
            let trap = ExternalInterrupts::new(&plic, table);
            while !done.load(Ordering::Acquire) {
                let isr = unsafe { IsrContext::enter() };
                trap.service(&isr);
                uart.shift_out(1);
                thread::yield_now();
            }
        });

        let writer = s.spawn(|| {
            let writer = unsafe { ThreadContext::enter() };
            driver.write(&writer, &message, PATIENCE)
        });

        let mut received = vec![0; MESSAGE_LEN];
        let read = driver.read(&main, &mut received, PATIENCE);
        done.store(true, Ordering::Release);

        assert_eq!(writer.join().unwrap(), MESSAGE_LEN);
        assert_eq!(read, MESSAGE_LEN);
        received
    });

    assert_eq!(received, message);
    assert_eq!(uart.lost(), 0);
}
