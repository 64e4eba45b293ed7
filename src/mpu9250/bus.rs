// Copyright (c) 2022, Zachary D. Olkin.
// This code is provided under the MIT license.

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::{Error, ErrorKind, ErrorType, NoAcknowledgeSource, SevenBitAddress};

/// Transfer direction requested with a start or restart condition.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    /// Master writes to the device
    Write,
    /// Master reads from the device
    Read,
}

/// What the master answers after receiving a byte.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Acknowledge {
    /// More bytes will follow
    Ack,
    /// Last byte, the device must release the bus
    Nak,
}

/// A byte-oriented I2C bus master.
///
/// This is the interface the driver needs from the hardware. Each primitive must busy-wait until the
/// condition or byte has completed on the bus, and must return an error rather than block forever if
/// the bus hangs. The error kind is used to decide whether a transaction may be retried.
pub trait I2cMaster: ErrorType {
    /// Generate a start condition followed by the address byte.
    ///
    /// Fails with [`ErrorKind::NoAcknowledge`] when no device answers the address.
    fn send_start(
        &mut self,
        address: SevenBitAddress,
        direction: Direction,
    ) -> Result<(), Self::Error>;

    /// Generate a repeated start condition followed by the address byte, without releasing the bus.
    fn send_restart(
        &mut self,
        address: SevenBitAddress,
        direction: Direction,
    ) -> Result<(), Self::Error>;

    /// Generate a stop condition, releasing the bus.
    fn send_stop(&mut self) -> Result<(), Self::Error>;

    /// Write one byte to the addressed device.
    fn write_byte(&mut self, byte: u8) -> Result<(), Self::Error>;

    /// Read one byte from the addressed device and answer with `ack`.
    fn read_byte(&mut self, ack: Acknowledge) -> Result<u8, Self::Error>;
}

impl<T: I2cMaster + ?Sized> I2cMaster for &mut T {
    fn send_start(
        &mut self,
        address: SevenBitAddress,
        direction: Direction,
    ) -> Result<(), Self::Error> {
        T::send_start(self, address, direction)
    }

    fn send_restart(
        &mut self,
        address: SevenBitAddress,
        direction: Direction,
    ) -> Result<(), Self::Error> {
        T::send_restart(self, address, direction)
    }

    fn send_stop(&mut self) -> Result<(), Self::Error> {
        T::send_stop(self)
    }

    fn write_byte(&mut self, byte: u8) -> Result<(), Self::Error> {
        T::write_byte(self, byte)
    }

    fn read_byte(&mut self, ack: Acknowledge) -> Result<u8, Self::Error> {
        T::read_byte(self, ack)
    }
}

/// Retry policy for register transactions.
///
/// A transaction is only repeated when it failed with a lost arbitration or with a NACK of the
/// address byte, both of which can clear up on their own. `retries` is the number of extra attempts.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BusConfig {
    /// Extra attempts after the first failure
    pub retries: u8,
    /// Pause before each retry, in microseconds
    pub retry_delay_us: u32,
}

impl Default for BusConfig {
    fn default() -> Self {
        BusConfig {
            retries: 0,
            retry_delay_us: 100,
        }
    }
}

/// Combine a big-endian register pair into a signed 16-bit value.
pub fn combine_be(high: u8, low: u8) -> i16 {
    i16::from_be_bytes([high, low])
}

/// Split six contiguous signal registers (X high, X low, Y high, ...) into three axes.
pub fn be_axes(buf: &[u8; 6]) -> [i16; 3] {
    [
        combine_be(buf[0], buf[1]),
        combine_be(buf[2], buf[3]),
        combine_be(buf[4], buf[5]),
    ]
}

fn is_transient(kind: ErrorKind) -> bool {
    matches!(
        kind,
        ErrorKind::ArbitrationLoss | ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address)
    )
}

fn read_into<M: I2cMaster>(master: &mut M, buf: &mut [u8]) -> Result<(), M::Error> {
    let last = buf.len().saturating_sub(1);
    for (i, byte) in buf.iter_mut().enumerate() {
        let ack = if i == last {
            Acknowledge::Nak
        } else {
            Acknowledge::Ack
        };
        *byte = master.read_byte(ack)?;
    }
    Ok(())
}

/// Register-addressed transactions on a shared bus.
///
/// Every method runs one complete transaction (start to stop) before returning, so no state is
/// carried between calls. Owning the master means `&mut self` already serializes transactions;
/// sharing one physical bus between drivers needs a master implementation that locks around the
/// whole transaction.
pub struct Transactions<M, D> {
    master: M,
    delay: D,
    config: BusConfig,
}

impl<M, D, E> Transactions<M, D>
where
    M: I2cMaster<Error = E>,
    E: Error,
    D: DelayNs,
{
    /// Wrap a bus master and a delay provider.
    pub fn new(master: M, delay: D, config: BusConfig) -> Self {
        Transactions {
            master,
            delay,
            config,
        }
    }

    /// Give back the bus master and the delay provider.
    pub fn release(self) -> (M, D) {
        (self.master, self.delay)
    }

    /// Block for `ms` milliseconds.
    pub fn delay_ms(&mut self, ms: u32) {
        self.delay.delay_ms(ms);
    }

    /// Block for `us` microseconds.
    pub fn delay_us(&mut self, us: u32) {
        self.delay.delay_us(us);
    }

    /// Check that a device acknowledges `address`. Never retried.
    pub fn probe(&mut self, address: SevenBitAddress) -> Result<(), E> {
        let started = self.master.send_start(address, Direction::Write);
        let stopped = self.master.send_stop();
        started.and(stopped)
    }

    /// Read a single register.
    ///
    /// The register pointer is written in its own transaction, then the byte is read back and NAK'd.
    pub fn read_byte(&mut self, address: SevenBitAddress, reg: u8) -> Result<u8, E> {
        self.run(|m| {
            m.send_start(address, Direction::Write)?;
            m.write_byte(reg)?;
            m.send_stop()?;
            m.send_start(address, Direction::Read)?;
            let data = m.read_byte(Acknowledge::Nak)?;
            m.send_stop()?;
            Ok(data)
        })
    }

    /// Read `buf.len()` contiguous registers starting at `reg`.
    ///
    /// The read phase follows a repeated start so the device keeps its register pointer. An empty
    /// `buf` only opens and closes the transaction.
    pub fn read_burst(&mut self, address: SevenBitAddress, reg: u8, buf: &mut [u8]) -> Result<(), E> {
        if buf.is_empty() {
            return self.run(|m| {
                m.send_start(address, Direction::Write)?;
                m.send_stop()
            });
        }

        self.run(|m| {
            m.send_start(address, Direction::Write)?;
            m.write_byte(reg)?;
            m.send_restart(address, Direction::Read)?;
            read_into(m, buf)?;
            m.send_stop()
        })
    }

    /// Write a single register.
    pub fn write_byte(&mut self, address: SevenBitAddress, reg: u8, data: u8) -> Result<(), E> {
        self.run(|m| {
            m.send_start(address, Direction::Write)?;
            m.write_byte(reg)?;
            m.write_byte(data)?;
            m.send_stop()
        })
    }

    /// Write `data` to contiguous registers starting at `reg`.
    pub fn write_burst(&mut self, address: SevenBitAddress, reg: u8, data: &[u8]) -> Result<(), E> {
        self.run(|m| {
            m.send_start(address, Direction::Write)?;
            m.write_byte(reg)?;
            for byte in data {
                m.write_byte(*byte)?;
            }
            m.send_stop()
        })
    }

    /// Read one byte from a device without a register pointer.
    pub fn read_byte_no_reg(&mut self, address: SevenBitAddress) -> Result<u8, E> {
        self.run(|m| {
            m.send_start(address, Direction::Read)?;
            let data = m.read_byte(Acknowledge::Nak)?;
            m.send_stop()?;
            Ok(data)
        })
    }

    /// Read `buf.len()` bytes from a device without a register pointer.
    pub fn read_burst_no_reg(&mut self, address: SevenBitAddress, buf: &mut [u8]) -> Result<(), E> {
        if buf.is_empty() {
            return self.run(|m| {
                m.send_start(address, Direction::Write)?;
                m.send_stop()
            });
        }

        self.run(|m| {
            m.send_start(address, Direction::Read)?;
            read_into(m, buf)?;
            m.send_stop()
        })
    }

    /// Write one byte to a device without a register pointer.
    pub fn write_byte_no_reg(&mut self, address: SevenBitAddress, data: u8) -> Result<(), E> {
        self.run(|m| {
            m.send_start(address, Direction::Write)?;
            m.write_byte(data)?;
            m.send_stop()
        })
    }

    /// Write `data` to a device without a register pointer.
    pub fn write_burst_no_reg(&mut self, address: SevenBitAddress, data: &[u8]) -> Result<(), E> {
        self.run(|m| {
            m.send_start(address, Direction::Write)?;
            for byte in data {
                m.write_byte(*byte)?;
            }
            m.send_stop()
        })
    }

    /// Read-modify-write: replace the bits of `reg` selected by `mask` with those of `value`.
    ///
    /// Returns the value written.
    pub fn set_bits(
        &mut self,
        address: SevenBitAddress,
        reg: u8,
        mask: u8,
        value: u8,
    ) -> Result<u8, E> {
        let old = self.read_byte(address, reg)?;
        let new = (old & !mask) | (value & mask);
        self.write_byte(address, reg, new)?;
        Ok(new)
    }

    fn run<T>(&mut self, mut transaction: impl FnMut(&mut M) -> Result<T, E>) -> Result<T, E> {
        let mut attempt = 0;
        loop {
            match transaction(&mut self.master) {
                Ok(res) => return Ok(res),
                Err(e) => {
                    // release the bus whatever state the transaction stopped in
                    self.master.send_stop().ok();

                    if attempt >= self.config.retries || !is_transient(e.kind()) {
                        return Err(e);
                    }
                    attempt += 1;

                    #[cfg(feature = "defmt")]
                    defmt::warn!("I2C transaction failed, retry {=u8}", attempt);

                    self.delay.delay_us(self.config.retry_delay_us);
                }
            }
        }
    }
}
