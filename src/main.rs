// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Tower firmware entry point.
//!
//! Bring-up order: clocks, pins, LEDs, serial queues and USART1, ADC, non-volatile storage and
//! the tower state, then SysTick. The startup burst goes out before the main loop starts.
//!
//! Interrupts do the minimum: USART1 moves bytes between the data registers and the queues,
//! SysTick advances the tick counter and the clock. Everything else runs in the main loop.

#![cfg_attr(target_os = "none", no_std)]
#![cfg_attr(target_os = "none", no_main)]

#[cfg(target_os = "none")]
mod firmware {
    use cortex_m_rt::{entry, exception};
    #[cfg(feature = "defmt")]
    use defmt_rtt as _;
    use panic_halt as _;

    use stm32f7xx_hal::{pac, pac::interrupt, prelude::*};

    use tower::{
        config,
        dispatch::Dispatcher,
        error,
        hw::{self, Adc1, BoardPins, FlashBlock, StatusLeds, Usart1},
        info,
        nvm::NvStore,
        transport::SerialQueues,
        tower::{SoftClock, Ticker, Tower},
        warn,
    };

    static SERIAL: SerialQueues<{ config::RX_QUEUE_SIZE }, { config::TX_QUEUE_SIZE }> =
        SerialQueues::new();
    static CLOCK: SoftClock = SoftClock::new();
    static TICKER: Ticker = Ticker::new(config::TICK_HZ);

    #[entry]
    fn main() -> ! {
        // Peripherals
        let dp = pac::Peripherals::take().unwrap();
        let cp = cortex_m::Peripherals::take().unwrap();

        // Clocks
        let rcc = dp.RCC.constrain();
        let clocks = rcc.cfgr.freeze();

        // GPIO
        let pins = BoardPins::new(dp.GPIOA, dp.GPIOC, dp.GPIOD);
        let mut leds = StatusLeds::new(pins.leds);

        // USART1 (protocol link)
        SERIAL.init();
        let _serial = Usart1::init(dp.USART1, (pins.usart1.tx, pins.usart1.rx), &clocks);
        unsafe { pac::NVIC::unmask(pac::Interrupt::USART1) };
        let mut link = SERIAL.link(Usart1::arm_tx);

        // ADC1
        let _analog = pins.analog;
        let mut adc = Adc1::new(dp.ADC1, hw::pins::AnalogPins::ADC1_INPUTS);

        // Non-volatile storage
        let nv = NvStore::new(FlashBlock::new(dp.FLASH));
        let mut tower = match Tower::new(nv, &CLOCK) {
            Ok(tower) => tower,
            Err(e) => {
                error!("startup: tower init failed: {:?}", e);
                leds.error.on();
                loop {
                    cortex_m::asm::wfi();
                }
            }
        };

        // SysTick
        let _syst = hw::systick::start(cp.SYST, clocks.sysclk().raw(), config::TICK_HZ);

        if tower.send_startup_values(&mut link).is_err() {
            warn!("startup: values not sent");
        }
        info!("startup: tower running");

        let mut dispatcher = Dispatcher::new();
        let mut rx_dropped = 0;
        loop {
            if dispatcher.poll(&mut link, &mut tower).is_some() {
                leds.flash_activity(TICKER.now(), config::ACTIVITY_TICKS);
            }

            if TICKER.take_sample() && tower.sample_analog(&mut adc, &mut link).is_err() {
                warn!("analog: report dropped");
            }

            if TICKER.take_second() {
                if tower.send_time(&mut link).is_err() {
                    warn!("clock: report dropped");
                }
                leds.heartbeat.toggle();

                let dropped = SERIAL.rx_dropped();
                if dropped != rx_dropped {
                    warn!("serial: {} received bytes dropped", dropped.wrapping_sub(rx_dropped));
                    rx_dropped = dropped;
                }
            }

            leds.update(TICKER.now());
        }
    }

    #[interrupt]
    fn USART1() {
        let mut usart = Usart1::steal();
        SERIAL.service(&mut usart);
    }

    #[exception]
    fn SysTick() {
        TICKER.on_tick(&CLOCK);
    }
}

#[cfg(not(target_os = "none"))]
fn main() {}
