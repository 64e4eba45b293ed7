// Copyright (c) 2022, Zachary D. Olkin.
// This code is provided under the MIT license.

//! Device agnostic driver for the MPU-9250 9-axis IMU (inertial measurement unit).
//!
//! The driver talks to the device through a byte-oriented I2C master: start, repeated start, stop,
//! byte write and byte read with ACK or NAK. Implement [`mpu9250::bus::I2cMaster`] for your
//! bus peripheral and hand it to [`mpu9250::i2c::MpuImu`] along with an `embedded-hal` delay.
//!
//! The data sheet and register map can be found [here](https://invensense.tdk.com/products/motion-tracking/9-axis/mpu-9250/).
//!
//! Register-level configuration (full scale ranges, sample rate divider, low pass filters, interrupt
//! pin and interrupt sources, magnetometer bypass) and data acquisition (raw counts or m/s^2, dps, uT
//! and Celsius) are supported, as is the factory self-test of the accelerometer and the gyro.
//!
//! Every bus facing call returns a typed [`mpu9250::MpuError`], and transactions can be retried a
//! bounded number of times with [`mpu9250::bus::BusConfig`].
//!
//! You can instantiate multiple objects if you have multiple IMUs. The driver assumes control of
//! the bus master, so sharing the physical bus needs a master that locks around each transaction.
//!
//! There is no support for the FIFO, the DMP or the internal I2C master.
//!
//! Enable the `defmt` feature to log through defmt, and `rtt` in firmware builds to also link the RTT
//! logger and the panic handler.

#![deny(missing_docs)]
#![cfg_attr(not(test), no_std)]

#[cfg(feature = "rtt")]
use defmt_rtt as _; // global logger
#[cfg(feature = "rtt")]
use panic_probe as _;

/// Main module that holds the bus layer, the driver and the self-test.
/// Also holds the enums and constants they share.
pub mod mpu9250;
