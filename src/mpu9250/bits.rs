// Copyright (c) 2022, Zachary D. Olkin.
// This code is provided under the MIT license.

use bitfield::{bitfield_bitrange, bitfield_fields};

// `u8` register newtype with bit-field accessors. The value is public so that `mask_of!` and
// the driver can build and unwrap registers from sibling modules.
macro_rules! register {
    ($(#[$attr:meta])* $name:ident { $($fields:tt)* }) => {
        $(#[$attr])*
        #[derive(Clone, Copy, PartialEq, Eq, Debug)]
        pub struct $name(pub u8);

        bitfield_bitrange! {struct $name(u8)}

        impl $name {
            bitfield_fields! {
                $($fields)*
            }
        }
    };
}

register! {
    /// bitfields of CONFIG register
    Config {
        /// gyro and temperature low pass filter setting
        pub u8, dlpf_cfg, set_dlpf_cfg: 2, 0;
    }
}

register! {
    /// bitfields of GYRO_CONFIG register
    GyroConfig {
        /// X gyro self-test
        pub xgyro_cten, set_xgyro_cten: 7;
        /// Y gyro self-test
        pub ygyro_cten, set_ygyro_cten: 6;
        /// Z gyro self-test
        pub zgyro_cten, set_zgyro_cten: 5;
        /// gyro full scale select
        pub u8, gyro_fs_sel, set_gyro_fs_sel: 4, 3;
        /// inverted filter choice, 0b00 routes the gyro through the DLPF
        pub u8, fchoice_b, set_fchoice_b: 1, 0;
    }
}

register! {
    /// bitfields of ACCEL_CONFIG register
    AccelConfig {
        /// X accel self-test
        pub ax_st_en, set_ax_st_en: 7;
        /// Y accel self-test
        pub ay_st_en, set_ay_st_en: 6;
        /// Z accel self-test
        pub az_st_en, set_az_st_en: 5;
        /// accel full scale select
        pub u8, accel_fs_sel, set_accel_fs_sel: 4, 3;
    }
}

register! {
    /// bitfields of ACCEL_CONFIG_2 register
    AccelConfig2 {
        /// inverted filter choice, false routes the accelerometer through the DLPF
        pub accel_fchoice_b, set_accel_fchoice_b: 3;
        /// accelerometer low pass filter setting
        pub u8, a_dlpfcfg, set_a_dlpfcfg: 2, 0;
    }
}

register! {
    /// bitfields of INT_ENABLE register
    IntEnable {
        /// enable wake on motion interrupt
        pub wom_en, set_wom_en: 6;
        /// enable FIFO overflow interrupt
        pub fifo_oflow_en, set_fifo_oflow_en: 4;
        /// enable FSYNC interrupt
        pub fsync_int_en, set_fsync_int_en: 3;
        /// enable raw sensor data ready interrupt
        pub raw_rdy_en, set_raw_rdy_en: 0;
    }
}

register! {
    /// bitfields of INT_PIN_CFG register
    IntPinCfg {
        /// active low logic level for INT pin
        pub actl, set_actl: 7;
        /// INT pin is open drain
        pub open, set_open: 6;
        /// INT pin is held active until cleared
        pub latch_int_en, set_latch_int_en: 5;
        /// true = any read operation clears INT_STATUS register
        /// false = only reading INT_STATUS register clear it
        pub int_anyrd_2clear, set_int_anyrd_2clear: 4;
        /// set i2c master interface pins to bypass mode when i2c master is disabled
        pub bypass_en, set_bypass_en: 1;
    }
}

register! {
    /// bitfields of INT_STATUS register
    IntStatus {
        /// wake on motion interrupt occurred
        pub wom_int, _: 6;
        /// FIFO overflow interrupt occurred
        pub fifo_oflow_int, _: 4;
        /// FSYNC interrupt occurred
        pub fsync_int, _: 3;
        /// new raw sensor data is available
        pub raw_data_rdy_int, _: 0;
    }
}

register! {
    /// bitfields of USER_CTRL register
    UserCtrl {
        /// enable the auxiliary i2c master, which takes the aux pins away from bypass
        pub i2c_mst_en, set_i2c_mst_en: 5;
    }
}

register! {
    /// bitfields of PWR_MGMT_1 register
    PwrMgmt1 {
        /// reset the internal registers
        pub h_reset, set_h_reset: 7;
        /// enter sleep mode
        pub sleep, set_sleep: 6;
    }
}

register! {
    /// bitfields of AK8963 ST1 register
    MagSt1 {
        /// a measurement is ready to be read
        pub drdy, _: 0;
    }
}

register! {
    /// bitfields of AK8963 ST2 register
    MagSt2 {
        /// measurement overflowed
        pub hofl, _: 3;
    }
}

/// Builds a register mask by setting fields on an all-zero register value.
///
/// `mask_of!(IntEnable: set_raw_rdy_en(true))` evaluates to `0x01`.
macro_rules! mask_of {
    ($reg:ident : $($setter:ident($value:expr)),+ $(,)?) => {{
        let mut reg = $crate::mpu9250::bits::$reg(0);
        $(reg.$setter($value);)+
        reg.0
    }};
}

pub(crate) use mask_of;
