// Copyright (c) 2022, Zachary D. Olkin.
// This code is provided under the MIT license.

/// Bit-field views of the configuration and status registers.
pub mod bits;

/// Register-addressed transactions on top of a byte-oriented I2C master.
pub mod bus;

/// The driver itself: configuration, data acquisition and presence checks.
pub mod i2c;


#[cfg(feature = "defmt")]
use defmt::{Format, Formatter};
use strum::{EnumIter, FromRepr};

/// 7-bit bus address of the MPU-9250 with AD0 pulled low.
pub const MPU_ADDR: u8 = 0x68;

/// 7-bit bus address of the MPU-9250 with AD0 pulled high.
pub const MPU_ADDR_ALT: u8 = 0x69;

/// 7-bit bus address of the AK8963 magnetometer. Only reachable while bypass is enabled.
pub const MAG_ADDR: u8 = 0x0C;

/// Expected content of the MPU-9250 WHO_AM_I register.
pub const MPU_WAI: u8 = 0x71;

/// Expected content of the AK8963 WIA register.
pub const MAG_WAI: u8 = 0x48;

// accel scale below follows the datasheet's 16384 LSB/g at +-2g
const G: f32 = 9.807;

// uT per count with 16-bit magnetometer output
const MAG_SEN: f32 = 0.15;

const TEMP_SEN: f32 = 333.87;
const TEMP_OFFSET: f32 = 21.0;

// AK8963 CNTL1 BIT flag, 16-bit output
const MAG_16BIT: u8 = 0x10;

/// Accelerometer full scale range options in g's.
///
/// The discriminant is the value of the `ACCEL_FS_SEL` field.
#[derive(Clone, Copy, PartialEq, Eq, Debug, FromRepr, EnumIter)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum AccSensitivity {
    /// +-2g
    Sen2g = 0,
    /// +-4g
    Sen4g = 1,
    /// +-8g
    Sen8g = 2,
    /// +-16g
    Sen16g = 3,
}

impl AccSensitivity {
    /// Full scale range in g.
    pub fn range_g(self) -> f32 {
        match self {
            AccSensitivity::Sen2g => 2.0,
            AccSensitivity::Sen4g => 4.0,
            AccSensitivity::Sen8g => 8.0,
            AccSensitivity::Sen16g => 16.0,
        }
    }

    /// Conversion factor from raw counts to m/s^2.
    pub fn scale(self) -> f32 {
        G * self.range_g() * 2.0 / 65_536.0
    }
}

/// Gyro full scale range options in degrees per second (dps).
///
/// The discriminant is the value of the `GYRO_FS_SEL` field.
#[derive(Clone, Copy, PartialEq, Eq, Debug, FromRepr, EnumIter)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum GyroSensitivity {
    /// +-250 dps
    Sen250dps = 0,
    /// +-500 dps
    Sen500dps = 1,
    /// +-1000 dps
    Sen1000dps = 2,
    /// +-2000 dps
    Sen2000dps = 3,
}

impl GyroSensitivity {
    /// Full scale range in dps.
    pub fn range_dps(self) -> f32 {
        match self {
            GyroSensitivity::Sen250dps => 250.0,
            GyroSensitivity::Sen500dps => 500.0,
            GyroSensitivity::Sen1000dps => 1_000.0,
            GyroSensitivity::Sen2000dps => 2_000.0,
        }
    }

    /// Conversion factor from raw counts to dps.
    pub fn scale(self) -> f32 {
        self.range_dps() * 2.0 / 65_536.0
    }
}

/// Gyro (and temperature) Low Pass Filter (LPF) options, written to `CONFIG.DLPF_CFG`.
/// All values are the 3DB BW of the gyro filter.
#[derive(Clone, Copy, PartialEq, Eq, Debug, FromRepr, EnumIter)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum GyroLPF {
    /// 250Hz 3DB BW
    BW250 = 0,
    /// 184Hz 3DB BW
    BW184 = 1,
    /// 92Hz 3DB BW
    BW92 = 2,
    /// 41Hz 3DB BW
    BW41 = 3,
    /// 20Hz 3DB BW
    BW20 = 4,
    /// 10Hz 3DB BW
    BW10 = 5,
    /// 5Hz 3DB BW
    BW5 = 6,
    /// 3600Hz 3DB BW
    BW3600 = 7,
}

/// Accelerometer Low Pass Filter (LPF) options, written to `ACCEL_CONFIG_2.A_DLPFCFG`.
/// All values are the 3DB BW of the filter.
#[derive(Clone, Copy, PartialEq, Eq, Debug, FromRepr, EnumIter)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum AccLPF {
    /// 218.1Hz 3DB BW
    BW218 = 1,
    /// 99Hz 3DB BW
    BW99 = 2,
    /// 44.8Hz 3DB BW
    BW45 = 3,
    /// 21.2Hz 3DB BW
    BW21 = 4,
    /// 10.2Hz 3DB BW
    BW10 = 5,
    /// 5.05Hz 3DB BW
    BW5 = 6,
    /// 420Hz 3DB BW
    BW420 = 7,
}

/// Operating modes of the AK8963 magnetometer. Output is always 16-bit.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MagMode {
    /// Power down
    PowerDown,
    /// One measurement, then power down
    Single,
    /// Continuous measurement at 8Hz
    Continuous8Hz,
    /// Continuous measurement at 100Hz
    Continuous100Hz,
}

impl MagMode {
    fn cntl1(self) -> u8 {
        match self {
            MagMode::PowerDown => 0x00,
            MagMode::Single => MAG_16BIT | 0x01,
            MagMode::Continuous8Hz => MAG_16BIT | 0x02,
            MagMode::Continuous100Hz => MAG_16BIT | 0x06,
        }
    }
}

/// Settings applied by [`i2c::MpuImu::init`].
///
/// The default matches the usual start-up of the device: most sensitive ranges,
/// 200Hz output, 41/45Hz filters, an active high push-pull latched interrupt on raw
/// data ready and the magnetometer bypass enabled.
#[derive(Clone, Copy, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MpuConfig {
    /// Accelerometer full scale range
    pub acc_sen: AccSensitivity,
    /// Gyro full scale range
    pub gyro_sen: GyroSensitivity,
    /// Sample rate divider. Output rate is 1kHz / (1 + div) while the DLPF is enabled.
    pub sample_rate_div: u8,
    /// Gyro and temperature filter
    pub gyro_lpf: GyroLPF,
    /// Accelerometer filter
    pub acc_lpf: AccLPF,
    /// INT pin is active low
    pub int_active_low: bool,
    /// INT pin is open drain
    pub int_open_drain: bool,
    /// INT pin is held active until the interrupt is cleared
    pub int_latched: bool,
    /// Any read clears the interrupt status, not only a read of INT_STATUS
    pub int_clear_any_read: bool,
    /// Expose the magnetometer on the main bus
    pub bypass: bool,
    /// Raise the INT pin on raw data ready
    pub raw_data_int: bool,
}

impl Default for MpuConfig {
    fn default() -> Self {
        MpuConfig {
            acc_sen: AccSensitivity::Sen2g,
            gyro_sen: GyroSensitivity::Sen250dps,
            sample_rate_div: 4,
            gyro_lpf: GyroLPF::BW41,
            acc_lpf: AccLPF::BW45,
            int_active_low: false,
            int_open_drain: false,
            int_latched: true,
            int_clear_any_read: false,
            bypass: true,
            raw_data_int: true,
        }
    }
}

/// The possible errors that the driver can return.
///
/// `BusError` is for when a bus primitive of the master fails, after any configured retries.
/// Addressing an absent device, for example, makes the start condition fail with a NACK.
///
/// `IdentityMismatch` carries the WHO_AM_I value that was read instead of the expected one.
#[derive(Debug, PartialEq)]
pub enum MpuError<E> {
    /// An error occurred when using the bus
    BusError(E),
    /// The device answered but is not an MPU-9250
    IdentityMismatch(u8),
    /// A bounded wait ran out before the device became ready
    Timeout,
    /// An invalid input was passed to the function, or an invalid value was read back
    InvalidInput,
    /// The magnetometer measurement overflowed
    MagOverflow,
}

impl<E> From<E> for MpuError<E> {
    fn from(error: E) -> Self {
        MpuError::BusError(error)
    }
}

#[cfg(feature = "defmt")]
impl<E> Format for MpuError<E> {
    fn format(&self, fmt: Formatter) {
        match *self {
            MpuError::BusError(_) => defmt::write!(fmt, "Bus Error!"),
            MpuError::IdentityMismatch(wai) => {
                defmt::write!(fmt, "Unexpected WHO_AM_I value: {=u8:#x}", wai)
            }
            MpuError::Timeout => defmt::write!(fmt, "Timed out waiting for the device!"),
            MpuError::InvalidInput => defmt::write!(fmt, "Invalid input in the function!"),
            MpuError::MagOverflow => defmt::write!(fmt, "Magnetometer overflow!"),
        }
    }
}

#[derive(Clone, Copy)]
enum Registers {
    SelfTestXGyro,
    SelfTestXAccel,
    SmplrtDiv,
    Config,
    GyroConfig,
    AccelConfig,
    AccelConfig2,
    IntPinCfg,
    IntEnable,
    IntStatus,
    AccelXOutH,
    TempOutH,
    GyroXOutH,
    UserCtrl,
    PwrMgmt1,
    Wai,
    XaOffsetH,
    YaOffsetH,
    ZaOffsetH,
}

impl Registers {
    fn get_addr(&self) -> u8 {
        match *self {
            Registers::SelfTestXGyro => 0x00,
            Registers::SelfTestXAccel => 0x0D,
            Registers::SmplrtDiv => 0x19,
            Registers::Config => 0x1A,
            Registers::GyroConfig => 0x1B,
            Registers::AccelConfig => 0x1C,
            Registers::AccelConfig2 => 0x1D,
            Registers::IntPinCfg => 0x37,
            Registers::IntEnable => 0x38,
            Registers::IntStatus => 0x3A,
            Registers::AccelXOutH => 0x3B,
            Registers::TempOutH => 0x41,
            Registers::GyroXOutH => 0x43,
            Registers::UserCtrl => 0x6A,
            Registers::PwrMgmt1 => 0x6B,
            Registers::Wai => 0x75,
            Registers::XaOffsetH => 0x77,
            Registers::YaOffsetH => 0x7A,
            Registers::ZaOffsetH => 0x7D,
        }
    }
}

#[derive(Clone, Copy)]
enum MagRegisters {
    Wia,
    St1,
    Hxl,
    Cntl1,
}

impl MagRegisters {
    fn get_addr(&self) -> u8 {
        match *self {
            MagRegisters::Wia => 0x00,
            MagRegisters::St1 => 0x02,
            MagRegisters::Hxl => 0x03,
            MagRegisters::Cntl1 => 0x0A,
        }
    }
}
