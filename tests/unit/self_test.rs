//! Unit tests for the factory self-test

use crate::common::*;
use embedded_hal::i2c::ErrorKind;
use mpu9250_driver::mpu9250::self_test::{factory_trim, SELF_TEST_SAMPLES};
use mpu9250_driver::mpu9250::{AccSensitivity, GyroSensitivity, MpuConfig, MpuError, MPU_ADDR};

#[test]
fn test_matching_response_has_no_deviation() {
    let (mut imu, bus, _) = create_imu();
    bus.set_acc([100, -50, 16_384]);
    bus.set_gyro([3, -7, 12]);
    bus.set_excitation([2620; 3], [2620; 3]);

    let report = imu.self_test().unwrap();

    assert_eq!(report.accel, [0.0; 3]);
    assert_eq!(report.gyro, [0.0; 3]);
    assert!(report.passed(14.0));
}

#[test]
fn test_weak_response() {
    let (mut imu, bus, _) = create_imu();
    bus.set_excitation([1310; 3], [2620, 2620, 0]);

    let report = imu.self_test().unwrap();

    assert_eq!(report.accel, [-50.0; 3]);
    assert_eq!(report.gyro, [0.0, 0.0, -100.0]);
    assert!(!report.passed(14.0));
}

#[test]
fn test_each_axis_uses_its_own_code() {
    let (mut imu, bus, _) = create_imu();
    bus.set_factory_codes([1, 2, 3], [10, 1, 1]);
    bus.set_excitation([2620; 3], [2620; 3]);

    let report = imu.self_test().unwrap();

    assert_eq!(report.accel[0], 0.0);
    assert!(report.accel[1] < 0.0);
    assert!(report.accel[2] < report.accel[1]);

    let expected = 100.0 * 2620.0 / factory_trim(10, 0) - 100.0;
    assert!((report.gyro[0] - expected).abs() < 1e-3);
    assert_eq!(report.gyro[1], 0.0);
}

#[test]
fn test_missing_factory_code() {
    let (mut imu, bus, _) = create_imu();
    bus.set_factory_codes([1, 1, 1], [0, 1, 1]);
    bus.set_excitation([2620; 3], [2620; 3]);

    let report = imu.self_test().unwrap();

    assert!(report.gyro[0].is_nan());
    assert!(!report.passed(100.0));
}

#[test]
fn test_ranges_are_restored() {
    let (mut imu, bus, delay) = create_imu();
    imu.init(&MpuConfig::default()).unwrap();
    imu.set_acc_sen(AccSensitivity::Sen8g).unwrap();
    imu.set_gyro_sen(GyroSensitivity::Sen1000dps).unwrap();
    let before = delay.total_ms();

    imu.self_test().unwrap();

    assert_eq!(bus.reg(MPU_ADDR, ACCEL_CONFIG), 0x10);
    assert_eq!(bus.reg(MPU_ADDR, GYRO_CONFIG), 0x10);
    assert_eq!(imu.acc_sen(), AccSensitivity::Sen8g);
    assert_eq!(imu.gyro_sen(), GyroSensitivity::Sen1000dps);
    assert!(delay.total_ms() - before >= 40);
}

#[test]
fn test_divider_and_filters_are_left_in_test_setup() {
    let (mut imu, bus, _) = create_imu();
    imu.init(&MpuConfig::default()).unwrap();

    imu.self_test().unwrap();

    assert_eq!(bus.reg(MPU_ADDR, SMPLRT_DIV), 0);
    assert_eq!(bus.reg(MPU_ADDR, CONFIG), 0x02);
    assert_eq!(bus.reg(MPU_ADDR, ACCEL_CONFIG_2), 0x02);
}

#[test]
fn test_sample_count() {
    let (mut imu, bus, _) = create_imu();

    imu.self_test().unwrap();

    let ops = bus.ops();
    let acc_bursts = count(&ops, |op| *op == Op::Write(ACCEL_XOUT_H));
    let gyro_bursts = count(&ops, |op| *op == Op::Write(GYRO_XOUT_H));
    assert_eq!(acc_bursts, 2 * SELF_TEST_SAMPLES as usize);
    assert_eq!(gyro_bursts, 2 * SELF_TEST_SAMPLES as usize);
}

#[test]
fn test_bus_fault_aborts_and_cleans_up() {
    let (mut imu, bus, _) = create_imu();
    imu.set_acc_sen(AccSensitivity::Sen8g).unwrap();
    imu.set_gyro_sen(GyroSensitivity::Sen1000dps).unwrap();

    // lands in the baseline average
    bus.fail_read_at(50);
    let res = imu.self_test();

    assert_eq!(res, Err(MpuError::BusError(SimError(ErrorKind::Bus))));
    assert_eq!(bus.reg(MPU_ADDR, ACCEL_CONFIG), 0x10);
    assert_eq!(bus.reg(MPU_ADDR, GYRO_CONFIG), 0x10);
    assert_eq!(imu.acc_sen(), AccSensitivity::Sen8g);
}

#[test]
fn test_factory_codes() {
    let (mut imu, bus, _) = create_imu();
    bus.set_factory_codes([0x80, 0x81, 0x82], [0x40, 0x41, 0x42]);

    assert_eq!(
        imu.read_factory_codes(),
        Ok(([0x80, 0x81, 0x82], [0x40, 0x41, 0x42]))
    );
}
