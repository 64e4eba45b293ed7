//! Helpers shared by the test files.

use super::sim_bus::{Op, SimBus};
use mpu9250_driver::mpu9250::bus::BusConfig;
use embedded_hal::delay::DelayNs;
use mpu9250_driver::mpu9250::i2c::MpuImu;
use mpu9250_driver::mpu9250::MPU_ADDR;
use std::cell::Cell;
use std::rc::Rc;

/// Delay that only adds up the requested time.
#[derive(Clone, Default)]
pub struct MockDelay(Rc<Cell<u64>>);

impl MockDelay {
    pub fn total_ms(&self) -> u64 {
        self.0.get() / 1_000_000
    }

    pub fn total_us(&self) -> u64 {
        self.0.get() / 1_000
    }
}

impl DelayNs for MockDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.0.set(self.0.get() + u64::from(ns));
    }
}

pub type TestImu = MpuImu<SimBus, MockDelay>;

pub fn create_imu() -> (TestImu, SimBus, MockDelay) {
    let bus = SimBus::new();
    let delay = MockDelay::default();
    let imu = MpuImu::new(bus.clone(), delay.clone(), MPU_ADDR);
    (imu, bus, delay)
}

pub fn create_imu_with_config(config: BusConfig) -> (TestImu, SimBus, MockDelay) {
    let bus = SimBus::new();
    let delay = MockDelay::default();
    let imu = MpuImu::new_with_bus_config(bus.clone(), delay.clone(), MPU_ADDR, config);
    (imu, bus, delay)
}

/// Number of primitives of one kind in the log.
pub fn count(ops: &[Op], pred: impl Fn(&Op) -> bool) -> usize {
    ops.iter().filter(|op| pred(op)).count()
}
