//! AK8963 access through the bypass

use crate::common::*;
use embedded_hal::i2c::{ErrorKind, NoAcknowledgeSource};
use mpu9250_driver::mpu9250::bus::Direction;
use mpu9250_driver::mpu9250::{MagMode, MpuError, MAG_ADDR, MPU_ADDR};

fn set_mag_sample(bus: &SimBus, data: [u8; 6], st2: u8) {
    for (i, byte) in data.iter().enumerate() {
        bus.set_reg(MAG_ADDR, MAG_HXL + i as u8, *byte);
    }
    bus.set_reg(MAG_ADDR, MAG_ST2, st2);
}

#[test]
fn test_first_read_turns_the_magnetometer_on() {
    let (mut imu, bus, _) = create_imu();
    set_mag_sample(&bus, [0x10, 0x00, 0xF0, 0xFF, 0x00, 0x01], 0x10);

    assert!(!imu.mag_on());
    assert_eq!(imu.read_mag_raw(), Ok([16, -16, 256]));

    assert!(imu.mag_on());
    assert!(imu.bypass_on());
    assert_eq!(bus.reg(MAG_ADDR, MAG_CNTL1), 0x16);
    assert_eq!(bus.reg(MPU_ADDR, INT_PIN_CFG) & 0x02, 0x02);
}

#[test]
fn test_sample_is_one_burst_through_st2() {
    let (mut imu, bus, _) = create_imu();
    imu.enable_mag(MagMode::Continuous8Hz).unwrap();
    assert_eq!(bus.reg(MAG_ADDR, MAG_CNTL1), 0x12);

    bus.clear_ops();
    imu.read_mag_raw().unwrap();

    let ops = bus.ops();
    assert_eq!(ops[0], Op::Start(MAG_ADDR, Direction::Write));
    assert_eq!(ops[1], Op::Write(MAG_HXL));
    assert_eq!(count(&ops, |op| matches!(op, Op::Read(_, _))), 7);
}

#[test]
fn test_mag_in_micro_tesla() {
    let (mut imu, bus, _) = create_imu();
    set_mag_sample(&bus, [0x10, 0x00, 0x00, 0x00, 0x9C, 0xFF], 0x00);

    let mag = imu.read_mag().unwrap();

    assert!((mag[0] - 2.4).abs() < 1e-4);
    assert_eq!(mag[1], 0.0);
    assert!((mag[2] + 15.0).abs() < 1e-4);
}

#[test]
fn test_overflow_is_an_error() {
    let (mut imu, bus, _) = create_imu();
    set_mag_sample(&bus, [0xFF; 6], 0x08);

    assert_eq!(imu.read_mag_raw(), Err(MpuError::MagOverflow));
}

#[test]
fn test_power_down() {
    let (mut imu, bus, _) = create_imu();
    imu.enable_mag(MagMode::Continuous100Hz).unwrap();

    imu.disable_mag().unwrap();

    assert_eq!(bus.writes_to(MAG_ADDR, MAG_CNTL1), vec![0x16, 0x00]);
    assert!(!imu.mag_on());
    assert_eq!(imu.mag_mode(), MagMode::PowerDown);
}

#[test]
fn test_first_enable_writes_mode_directly() {
    let (mut imu, bus, _) = create_imu();

    imu.enable_mag(MagMode::Continuous100Hz).unwrap();

    assert_eq!(bus.writes_to(MAG_ADDR, MAG_CNTL1), vec![0x16]);
}

#[test]
fn test_mode_change_goes_through_power_down() {
    let (mut imu, bus, delay) = create_imu();
    imu.enable_mag(MagMode::Continuous8Hz).unwrap();
    let before = delay.total_us();

    imu.enable_mag(MagMode::Continuous100Hz).unwrap();

    assert_eq!(bus.writes_to(MAG_ADDR, MAG_CNTL1), vec![0x12, 0x00, 0x16]);
    // 100us in power down, then 10ms for the new mode to settle
    assert_eq!(delay.total_us() - before, 10_100);
    assert_eq!(imu.mag_mode(), MagMode::Continuous100Hz);
}

#[test]
fn test_single_mode_triggers_every_read() {
    let (mut imu, bus, _) = create_imu();
    set_mag_sample(&bus, [0x10, 0x00, 0x00, 0x00, 0x00, 0x00], 0x10);
    imu.enable_mag(MagMode::Single).unwrap();
    assert!(imu.mag_on());
    assert!(bus.writes_to(MAG_ADDR, MAG_CNTL1).is_empty());

    assert_eq!(imu.read_mag_raw(), Ok([16, 0, 0]));
    assert_eq!(imu.read_mag_raw(), Ok([16, 0, 0]));

    assert_eq!(bus.writes_to(MAG_ADDR, MAG_CNTL1), vec![0x11, 0x11]);
    assert_eq!(imu.mag_mode(), MagMode::Single);
}

#[test]
fn test_single_mode_from_continuous_powers_down_first() {
    let (mut imu, bus, _) = create_imu();
    imu.enable_mag(MagMode::Continuous100Hz).unwrap();

    imu.enable_mag(MagMode::Single).unwrap();
    imu.read_mag_raw().unwrap();

    assert_eq!(bus.writes_to(MAG_ADDR, MAG_CNTL1), vec![0x16, 0x00, 0x11]);
}

#[test]
fn test_single_mode_without_data_ready_times_out() {
    let (mut imu, bus, delay) = create_imu();
    bus.set_reg(MAG_ADDR, MAG_ST1, 0x00);
    imu.enable_mag(MagMode::Single).unwrap();
    let before = delay.total_ms();

    assert_eq!(imu.read_mag_raw(), Err(MpuError::Timeout));
    assert_eq!(delay.total_ms() - before, 10);
}

#[test]
fn test_missing_magnetometer() {
    let (mut imu, bus, _) = create_imu();
    bus.remove_device(MAG_ADDR);

    assert_eq!(
        imu.enable_mag(MagMode::Continuous100Hz),
        Err(MpuError::BusError(SimError(ErrorKind::NoAcknowledge(
            NoAcknowledgeSource::Address
        ))))
    );
    assert!(!imu.mag_on());
}
