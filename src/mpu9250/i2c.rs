// Copyright (c) 2022, Zachary D. Olkin.
// This code is provided under the MIT license.

use crate::mpu9250::bits::{mask_of, AccelConfig, GyroConfig, IntStatus, MagSt1, MagSt2};
use crate::mpu9250::bus::{be_axes, combine_be, BusConfig, I2cMaster, Transactions};
use crate::mpu9250::{AccLPF, AccSensitivity, GyroLPF, GyroSensitivity, MagMode, MpuConfig};
use crate::mpu9250::{MagRegisters, MpuError, Registers};
use crate::mpu9250::{MAG_ADDR, MAG_SEN, MPU_WAI, TEMP_OFFSET, TEMP_SEN};
#[cfg(feature = "defmt")]
use defmt::{Format, Formatter};

use embedded_hal::delay::DelayNs;

const POWER_UP_SETTLE_MS: u32 = 10;
const MAG_SETTLE_MS: u32 = 10;
const MAG_POWER_DOWN_US: u32 = 100;
// a single measurement takes at most 9ms
const MAG_DRDY_POLLS: u32 = 10;
const MAG_DRDY_POLL_MS: u32 = 1;
const DATA_READY_POLL_US: u32 = 100;

/// The MPU IMU struct is the base of the driver. Instantiate this struct in your application code then use
/// it to interact with the IMU.
///
/// The struct remembers the full scale ranges it last wrote, so the conversion factors used by
/// [`read_acc`](Self::read_acc) and [`read_gyro`](Self::read_gyro) always match the device.
pub struct MpuImu<M, D> {
    pub(super) bus: Transactions<M, D>,
    pub(super) addr: u8,

    acc_sen: AccSensitivity,
    gyro_sen: GyroSensitivity,

    mag_mode: MagMode,
    bypass_en: bool,
    int_enabled: bool,
}

impl<M, D, E> MpuImu<M, D>
where
    M: I2cMaster<Error = E>,
    E: embedded_hal::i2c::Error,
    D: DelayNs,
{
    /// Create a new IMU driver. No bus traffic happens until [`init`](Self::init) or another method is called.
    ///
    /// The byte-oriented bus master is given as `master`
    ///
    /// The 7-bit address is specified as `addr`, usually [`MPU_ADDR`](crate::mpu9250::MPU_ADDR)
    pub fn new(master: M, delay: D, addr: u8) -> Self {
        Self::new_with_bus_config(master, delay, addr, BusConfig::default())
    }

    /// Same as [`new`](Self::new) with a retry policy for every transaction.
    pub fn new_with_bus_config(master: M, delay: D, addr: u8, bus_config: BusConfig) -> Self {
        MpuImu {
            bus: Transactions::new(master, delay, bus_config),
            addr,
            acc_sen: AccSensitivity::Sen2g,
            gyro_sen: GyroSensitivity::Sen250dps,
            mag_mode: MagMode::PowerDown,
            bypass_en: false,
            int_enabled: false,
        }
    }

    /// Give back the bus master and the delay provider.
    pub fn release(self) -> (M, D) {
        self.bus.release()
    }

    /// Wake the device, check that it is an MPU-9250 and apply `config`.
    pub fn init(&mut self, config: &MpuConfig) -> Result<(), MpuError<E>> {
        self.wake()?;
        self.bus.delay_ms(POWER_UP_SETTLE_MS);
        self.verify()?;

        self.set_acc_sen(config.acc_sen)?;
        self.set_gyro_sen(config.gyro_sen)?;
        self.set_sample_rate_divider(config.sample_rate_div)?;
        self.config_gyro_lpf(config.gyro_lpf)?;
        self.config_acc_lpf(config.acc_lpf)?;

        self.set_pin_flag(mask_of!(IntPinCfg: set_actl(true)), config.int_active_low)?;
        self.set_pin_flag(mask_of!(IntPinCfg: set_open(true)), config.int_open_drain)?;
        self.set_pin_flag(mask_of!(IntPinCfg: set_latch_int_en(true)), config.int_latched)?;
        self.set_pin_flag(
            mask_of!(IntPinCfg: set_int_anyrd_2clear(true)),
            config.int_clear_any_read,
        )?;

        if config.bypass {
            self.enable_bypass()?;
        } else {
            self.disable_bypass()?;
        }

        if config.raw_data_int {
            self.enable_int()?;
        } else {
            self.disable_int()?;
        }
        self.disable_fifo_overflow_int()?;
        self.disable_wom_int()?;
        self.disable_fsync_int()?;

        #[cfg(feature = "defmt")]
        defmt::info!("MPU-9250 initialized: {}", config);

        Ok(())
    }

    // ----------------- Presence ----------------- //
    /// Who Am I? Reads the wai register and reports the value.
    ///
    /// Useful for testing that the IMU is properly connected. The expected value is [`MPU_WAI`].
    pub fn wai(&mut self) -> Result<u8, MpuError<E>> {
        Ok(self.bus.read_byte(self.addr, Registers::Wai.get_addr())?)
    }

    /// Reads the WIA register of the magnetometer. Bypass must be enabled.
    pub fn mag_wai(&mut self) -> Result<u8, MpuError<E>> {
        Ok(self.bus.read_byte(MAG_ADDR, MagRegisters::Wia.get_addr())?)
    }

    /// Probes the address and checks the WHO_AM_I register.
    ///
    /// Returns `BusError` if the device does not acknowledge and `IdentityMismatch` if another device answers.
    pub fn verify(&mut self) -> Result<(), MpuError<E>> {
        self.bus.probe(self.addr)?;

        let wai = self.wai()?;
        if wai != MPU_WAI {
            #[cfg(feature = "defmt")]
            defmt::warn!("WHO_AM_I mismatch: {=u8:#x}", wai);
            return Err(MpuError::IdentityMismatch(wai));
        }
        Ok(())
    }

    /// Checks if the IMU is present on the bus. Returns true only if the address is acknowledged and the
    /// WHO_AM_I register holds the expected value.
    pub fn is_connected(&mut self) -> bool {
        self.verify().is_ok()
    }

    // ----------------- Power ----------------- //
    /// Puts the IMU into sleep mode.
    pub fn sleep(&mut self) -> Result<(), MpuError<E>> {
        let mask = mask_of!(PwrMgmt1: set_sleep(true));
        self.set_bits(Registers::PwrMgmt1, mask, mask)?;
        Ok(())
    }

    /// Wakes the IMU from sleep mode.
    pub fn wake(&mut self) -> Result<(), MpuError<E>> {
        self.set_bits(Registers::PwrMgmt1, mask_of!(PwrMgmt1: set_sleep(true)), 0)?;
        Ok(())
    }

    /// Resets the IMU.
    /// After the reset a 100ms sleep is suggested, then [`init`](Self::init) must run again.
    pub fn reset(&mut self) -> Result<(), MpuError<E>> {
        self.bus.write_byte(
            self.addr,
            Registers::PwrMgmt1.get_addr(),
            mask_of!(PwrMgmt1: set_h_reset(true)),
        )?;

        self.acc_sen = AccSensitivity::Sen2g;
        self.gyro_sen = GyroSensitivity::Sen250dps;
        // the AK8963 keeps its mode across this reset
        self.bypass_en = false;
        self.int_enabled = false;
        Ok(())
    }

    // ----------------- Accelerometer and Gyro ----------------- //
    /// Reads the six accelerometer data registers in one burst (X high first).
    pub fn read_acc_bytes(&mut self) -> Result<[u8; 6], MpuError<E>> {
        let mut buf = [0; 6];
        self.bus
            .read_burst(self.addr, Registers::AccelXOutH.get_addr(), &mut buf)?;
        Ok(buf)
    }

    /// Reads all three accelerometer axes as raw counts.
    pub fn read_acc_raw(&mut self) -> Result<[i16; 3], MpuError<E>> {
        Ok(be_axes(&self.read_acc_bytes()?))
    }

    /// Reads all three accelerometer values and returns them in m/s^2.
    pub fn read_acc(&mut self) -> Result<[f32; 3], MpuError<E>> {
        let raw = self.read_acc_raw()?;
        let scale = self.acc_sen.scale();
        Ok([
            raw[0] as f32 * scale,
            raw[1] as f32 * scale,
            raw[2] as f32 * scale,
        ])
    }

    /// Reads the six gyro data registers in one burst (X high first).
    pub fn read_gyro_bytes(&mut self) -> Result<[u8; 6], MpuError<E>> {
        let mut buf = [0; 6];
        self.bus
            .read_burst(self.addr, Registers::GyroXOutH.get_addr(), &mut buf)?;
        Ok(buf)
    }

    /// Reads all three gyro axes as raw counts.
    pub fn read_gyro_raw(&mut self) -> Result<[i16; 3], MpuError<E>> {
        Ok(be_axes(&self.read_gyro_bytes()?))
    }

    /// Reads all three gyro values and returns them in dps.
    pub fn read_gyro(&mut self) -> Result<[f32; 3], MpuError<E>> {
        let raw = self.read_gyro_raw()?;
        let scale = self.gyro_sen.scale();
        Ok([
            raw[0] as f32 * scale,
            raw[1] as f32 * scale,
            raw[2] as f32 * scale,
        ])
    }

    /// Reads accelerometer and gyro raw counts from a single 14 byte burst, so both belong to the same sample.
    ///
    /// Returns `(acc, gyro)`.
    pub fn read_acc_gyro_raw(&mut self) -> Result<([i16; 3], [i16; 3]), MpuError<E>> {
        let mut buf = [0; 14];
        self.bus
            .read_burst(self.addr, Registers::AccelXOutH.get_addr(), &mut buf)?;

        let mut acc = [0; 6];
        let mut gyro = [0; 6];
        acc.copy_from_slice(&buf[0..6]);
        // buf[6..8] is the temperature
        gyro.copy_from_slice(&buf[8..14]);
        Ok((be_axes(&acc), be_axes(&gyro)))
    }

    /// Read the temperature sensor.
    ///
    /// Returns the temperature in Celsius.
    pub fn read_temp(&mut self) -> Result<f32, MpuError<E>> {
        let mut buf = [0; 2];
        self.bus
            .read_burst(self.addr, Registers::TempOutH.get_addr(), &mut buf)?;

        Ok(combine_be(buf[0], buf[1]) as f32 / TEMP_SEN + TEMP_OFFSET)
    }

    /// Reads the factory accelerometer offset registers, in the order x, y, z.
    pub fn read_acc_offsets(&mut self) -> Result<[i16; 3], MpuError<E>> {
        let mut res = [0; 3];
        let regs = [
            Registers::XaOffsetH,
            Registers::YaOffsetH,
            Registers::ZaOffsetH,
        ];

        // the three pairs are not contiguous
        for (axis, reg) in res.iter_mut().zip(regs.iter()) {
            let mut buf = [0; 2];
            self.bus.read_burst(self.addr, reg.get_addr(), &mut buf)?;
            *axis = combine_be(buf[0], buf[1]);
        }
        Ok(res)
    }

    /// Sets the sensitivity of the accelerometer.
    ///
    /// `acc_sen` specifies the desired sensitivity. The conversion factor changes only once the register write succeeded.
    pub fn set_acc_sen(&mut self, acc_sen: AccSensitivity) -> Result<(), MpuError<E>> {
        self.set_bits(
            Registers::AccelConfig,
            mask_of!(AccelConfig: set_accel_fs_sel(0b11)),
            mask_of!(AccelConfig: set_accel_fs_sel(acc_sen as u8)),
        )?;
        self.acc_sen = acc_sen;

        #[cfg(feature = "defmt")]
        defmt::debug!("Accelerometer range set to {}", acc_sen);
        Ok(())
    }

    /// Sets the sensitivity of the gyro.
    ///
    /// `gyro_sen` specifies the desired sensitivity. The conversion factor changes only once the register write succeeded.
    pub fn set_gyro_sen(&mut self, gyro_sen: GyroSensitivity) -> Result<(), MpuError<E>> {
        self.set_bits(
            Registers::GyroConfig,
            mask_of!(GyroConfig: set_gyro_fs_sel(0b11)),
            mask_of!(GyroConfig: set_gyro_fs_sel(gyro_sen as u8)),
        )?;
        self.gyro_sen = gyro_sen;

        #[cfg(feature = "defmt")]
        defmt::debug!("Gyro range set to {}", gyro_sen);
        Ok(())
    }

    /// The accelerometer range last written by this driver.
    pub fn acc_sen(&self) -> AccSensitivity {
        self.acc_sen
    }

    /// The gyro range last written by this driver.
    pub fn gyro_sen(&self) -> GyroSensitivity {
        self.gyro_sen
    }

    /// Reads the accelerometer range currently configured in the device.
    pub fn read_acc_sen(&mut self) -> Result<AccSensitivity, MpuError<E>> {
        let reg = self.bus.read_byte(self.addr, Registers::AccelConfig.get_addr())?;
        let fs = AccelConfig(reg).accel_fs_sel();
        AccSensitivity::from_repr(fs).ok_or(MpuError::InvalidInput)
    }

    /// Reads the gyro range currently configured in the device.
    pub fn read_gyro_sen(&mut self) -> Result<GyroSensitivity, MpuError<E>> {
        let reg = self.bus.read_byte(self.addr, Registers::GyroConfig.get_addr())?;
        let fs = GyroConfig(reg).gyro_fs_sel();
        GyroSensitivity::from_repr(fs).ok_or(MpuError::InvalidInput)
    }

    /// Writes the sample rate divider. With the DLPF enabled the output rate is 1kHz / (1 + `div`).
    pub fn set_sample_rate_divider(&mut self, div: u8) -> Result<(), MpuError<E>> {
        self.bus
            .write_byte(self.addr, Registers::SmplrtDiv.get_addr(), div)?;
        Ok(())
    }

    /// Configures the Low Pass Filter (LPF) for the gyro and the temperature sensor.
    ///
    /// `bw` is the 3DB bandwidth of the LPF. See the data sheet for more details.
    pub fn config_gyro_lpf(&mut self, bw: GyroLPF) -> Result<(), MpuError<E>> {
        self.set_bits(
            Registers::Config,
            mask_of!(Config: set_dlpf_cfg(0b111)),
            mask_of!(Config: set_dlpf_cfg(bw as u8)),
        )?;
        // FCHOICE_B = 0b00 so the DLPF setting is used
        self.set_bits(
            Registers::GyroConfig,
            mask_of!(GyroConfig: set_fchoice_b(0b11)),
            0,
        )?;
        Ok(())
    }

    /// Configures the Low Pass Filter (LPF) for the accelerometer.
    ///
    /// `bw` is the 3DB bandwidth of the LPF. See the data sheet for more details.
    pub fn config_acc_lpf(&mut self, bw: AccLPF) -> Result<(), MpuError<E>> {
        self.set_bits(
            Registers::AccelConfig2,
            mask_of!(AccelConfig2: set_accel_fchoice_b(true), set_a_dlpfcfg(0b111)),
            mask_of!(AccelConfig2: set_a_dlpfcfg(bw as u8)),
        )?;
        Ok(())
    }

    // ----------------- Interrupts ----------------- //
    /// Enable the raw data ready interrupt.
    pub fn enable_int(&mut self) -> Result<(), MpuError<E>> {
        self.set_int_flag(mask_of!(IntEnable: set_raw_rdy_en(true)), true)?;
        self.int_enabled = true;
        Ok(())
    }

    /// Disable the raw data ready interrupt.
    pub fn disable_int(&mut self) -> Result<(), MpuError<E>> {
        self.set_int_flag(mask_of!(IntEnable: set_raw_rdy_en(true)), false)?;
        self.int_enabled = false;
        Ok(())
    }

    /// Checks if the raw data ready interrupt is enabled. Returns true if enabled, false if otherwise.
    pub fn int_on(&self) -> bool {
        self.int_enabled
    }

    /// Enable the FSYNC interrupt.
    pub fn enable_fsync_int(&mut self) -> Result<(), MpuError<E>> {
        self.set_int_flag(mask_of!(IntEnable: set_fsync_int_en(true)), true)
    }

    /// Disable the FSYNC interrupt.
    pub fn disable_fsync_int(&mut self) -> Result<(), MpuError<E>> {
        self.set_int_flag(mask_of!(IntEnable: set_fsync_int_en(true)), false)
    }

    /// Enable the FIFO overflow interrupt.
    pub fn enable_fifo_overflow_int(&mut self) -> Result<(), MpuError<E>> {
        self.set_int_flag(mask_of!(IntEnable: set_fifo_oflow_en(true)), true)
    }

    /// Disable the FIFO overflow interrupt.
    pub fn disable_fifo_overflow_int(&mut self) -> Result<(), MpuError<E>> {
        self.set_int_flag(mask_of!(IntEnable: set_fifo_oflow_en(true)), false)
    }

    /// Enable the wake on motion interrupt.
    pub fn enable_wom_int(&mut self) -> Result<(), MpuError<E>> {
        self.set_int_flag(mask_of!(IntEnable: set_wom_en(true)), true)
    }

    /// Disable the wake on motion interrupt.
    pub fn disable_wom_int(&mut self) -> Result<(), MpuError<E>> {
        self.set_int_flag(mask_of!(IntEnable: set_wom_en(true)), false)
    }

    /// Reads the interrupt status register. Unless the pin is set to clear on any read, this also clears it.
    pub fn read_int_status(&mut self) -> Result<IntStatus, MpuError<E>> {
        let status = self
            .bus
            .read_byte(self.addr, Registers::IntStatus.get_addr())?;
        Ok(IntStatus(status))
    }

    /// Polls the interrupt status until raw data is ready, at most `max_polls` times.
    ///
    /// Returns `Timeout` if no new sample showed up.
    pub fn wait_data_ready(&mut self, max_polls: u32) -> Result<(), MpuError<E>> {
        for _ in 0..max_polls {
            if self.read_int_status()?.raw_data_rdy_int() {
                return Ok(());
            }
            self.bus.delay_us(DATA_READY_POLL_US);
        }
        Err(MpuError::Timeout)
    }

    /// INT pin is driven high while an interrupt is pending.
    pub fn set_int_active_high(&mut self) -> Result<(), MpuError<E>> {
        self.set_pin_flag(mask_of!(IntPinCfg: set_actl(true)), false)
    }

    /// INT pin is driven low while an interrupt is pending.
    pub fn set_int_active_low(&mut self) -> Result<(), MpuError<E>> {
        self.set_pin_flag(mask_of!(IntPinCfg: set_actl(true)), true)
    }

    /// INT pin is push-pull.
    pub fn set_int_push_pull(&mut self) -> Result<(), MpuError<E>> {
        self.set_pin_flag(mask_of!(IntPinCfg: set_open(true)), false)
    }

    /// INT pin is open drain.
    pub fn set_int_open_drain(&mut self) -> Result<(), MpuError<E>> {
        self.set_pin_flag(mask_of!(IntPinCfg: set_open(true)), true)
    }

    /// INT pin is held active until the interrupt is cleared.
    pub fn set_int_latched(&mut self) -> Result<(), MpuError<E>> {
        self.set_pin_flag(mask_of!(IntPinCfg: set_latch_int_en(true)), true)
    }

    /// INT pin emits a 50us pulse.
    pub fn set_int_pulsed(&mut self) -> Result<(), MpuError<E>> {
        self.set_pin_flag(mask_of!(IntPinCfg: set_latch_int_en(true)), false)
    }

    /// Any register read clears the interrupt status.
    pub fn set_int_clear_any_read(&mut self) -> Result<(), MpuError<E>> {
        self.set_pin_flag(mask_of!(IntPinCfg: set_int_anyrd_2clear(true)), true)
    }

    /// Only reading INT_STATUS clears the interrupt status.
    pub fn set_int_clear_status_read(&mut self) -> Result<(), MpuError<E>> {
        self.set_pin_flag(mask_of!(IntPinCfg: set_int_anyrd_2clear(true)), false)
    }

    // ----------------- Magnetometer ----------------- //
    // The AK8963 sits on the auxiliary bus. With the internal I2C master disabled and
    // bypass enabled, the auxiliary bus is tied to the main one and the magnetometer
    // answers at MAG_ADDR.

    /// Connects the auxiliary bus to the main bus so the magnetometer can be addressed directly.
    pub fn enable_bypass(&mut self) -> Result<(), MpuError<E>> {
        self.set_bits(
            Registers::UserCtrl,
            mask_of!(UserCtrl: set_i2c_mst_en(true)),
            0,
        )?;
        self.set_pin_flag(mask_of!(IntPinCfg: set_bypass_en(true)), true)?;
        self.bypass_en = true;
        Ok(())
    }

    /// Hands the auxiliary bus back to the internal I2C master.
    pub fn disable_bypass(&mut self) -> Result<(), MpuError<E>> {
        let mask = mask_of!(UserCtrl: set_i2c_mst_en(true));
        self.set_bits(Registers::UserCtrl, mask, mask)?;
        self.set_pin_flag(mask_of!(IntPinCfg: set_bypass_en(true)), false)?;
        self.bypass_en = false;
        Ok(())
    }

    /// Checks if the bypass is enabled. Returns true if enabled, false if otherwise.
    pub fn bypass_on(&self) -> bool {
        self.bypass_en
    }

    /// Enable the magnetometer in the given mode. Enables the bypass first if needed.
    ///
    /// Leaving an active mode goes through power down. In [`MagMode::Single`] the magnetometer stays
    /// powered down and every [`read_mag_raw`](Self::read_mag_raw) triggers one measurement.
    pub fn enable_mag(&mut self, mode: MagMode) -> Result<(), MpuError<E>> {
        if !self.bypass_en {
            self.enable_bypass()?;
        }

        if self.mag_mode != MagMode::PowerDown || mode == MagMode::PowerDown {
            self.write_mag_mode(MagMode::PowerDown)?;
            self.mag_mode = MagMode::PowerDown;
            self.bus.delay_us(MAG_POWER_DOWN_US);
        }

        if mode == MagMode::Single {
            self.mag_mode = mode;
        } else if mode != MagMode::PowerDown {
            self.write_mag_mode(mode)?;
            self.bus.delay_ms(MAG_SETTLE_MS);
            self.mag_mode = mode;
        }

        #[cfg(feature = "defmt")]
        defmt::debug!("Magnetometer mode set to {}", mode);
        Ok(())
    }

    /// Disable the magnetometer.
    pub fn disable_mag(&mut self) -> Result<(), MpuError<E>> {
        self.enable_mag(MagMode::PowerDown)
    }

    /// Checks if the magnetometer is enabled. Returns true if enabled, false if otherwise.
    pub fn mag_on(&self) -> bool {
        self.mag_mode != MagMode::PowerDown
    }

    /// The magnetometer mode last set by this driver.
    pub fn mag_mode(&self) -> MagMode {
        self.mag_mode
    }

    /// Reads all axis of the magnetometer as raw counts.
    /// If the magnetometer is off, this function will first turn it on at 100Hz.
    ///
    /// In single measurement mode the measurement is triggered here, and `Timeout` is returned if
    /// it does not complete.
    ///
    /// Returns the values in the order: x, y, z
    pub fn read_mag_raw(&mut self) -> Result<[i16; 3], MpuError<E>> {
        if self.mag_mode == MagMode::PowerDown {
            self.enable_mag(MagMode::Continuous100Hz)?;
        } else if !self.bypass_en {
            self.enable_bypass()?;
        }

        if self.mag_mode == MagMode::Single {
            self.write_mag_mode(MagMode::Single)?;
            self.wait_mag_ready()?;
        }

        // HXL..HZH then ST2, reading ST2 releases the data registers for the next sample
        let mut buf = [0; 7];
        self.bus
            .read_burst(MAG_ADDR, MagRegisters::Hxl.get_addr(), &mut buf)?;

        if MagSt2(buf[6]).hofl() {
            return Err(MpuError::MagOverflow);
        }

        // the AK8963 stores the low byte first
        Ok([
            combine_be(buf[1], buf[0]),
            combine_be(buf[3], buf[2]),
            combine_be(buf[5], buf[4]),
        ])
    }

    /// Reads all axis of the magnetometer in uT.
    /// If the magnetometer is off, this function will first turn it on at 100Hz.
    ///
    /// Returns the values in the order: x, y, z
    pub fn read_mag(&mut self) -> Result<[f32; 3], MpuError<E>> {
        let raw = self.read_mag_raw()?;
        Ok([
            raw[0] as f32 * MAG_SEN,
            raw[1] as f32 * MAG_SEN,
            raw[2] as f32 * MAG_SEN,
        ])
    }

    fn write_mag_mode(&mut self, mode: MagMode) -> Result<(), MpuError<E>> {
        self.bus
            .write_byte(MAG_ADDR, MagRegisters::Cntl1.get_addr(), mode.cntl1())?;
        Ok(())
    }

    fn wait_mag_ready(&mut self) -> Result<(), MpuError<E>> {
        for _ in 0..MAG_DRDY_POLLS {
            self.bus.delay_ms(MAG_DRDY_POLL_MS);
            let st1 = self.bus.read_byte(MAG_ADDR, MagRegisters::St1.get_addr())?;
            if MagSt1(st1).drdy() {
                return Ok(());
            }
        }
        Err(MpuError::Timeout)
    }

    pub(super) fn set_bits(
        &mut self,
        reg: Registers,
        mask: u8,
        value: u8,
    ) -> Result<u8, MpuError<E>> {
        Ok(self.bus.set_bits(self.addr, reg.get_addr(), mask, value)?)
    }

    fn set_int_flag(&mut self, mask: u8, on: bool) -> Result<(), MpuError<E>> {
        self.set_bits(Registers::IntEnable, mask, if on { mask } else { 0 })?;
        Ok(())
    }

    fn set_pin_flag(&mut self, mask: u8, on: bool) -> Result<(), MpuError<E>> {
        self.set_bits(Registers::IntPinCfg, mask, if on { mask } else { 0 })?;
        Ok(())
    }
}

#[cfg(feature = "defmt")]
impl<M, D> Format for MpuImu<M, D> {
    fn format(&self, fmt: Formatter) {
        defmt::write!(fmt, "MPU-9250 IMU at {=u8:#x}", self.addr)
    }
}
