//! Async implementation of the DS3231 driver.
//!
//! This module provides the same interface as the blocking [`crate::DS3231`]
//! over `embedded-hal-async` traits. It is only available when the `async`
//! feature is enabled.
//!
//! # Example
//!
//! ```rust,ignore
//! use ds3231_alarm::asynch::DS3231;
//! use ds3231_alarm::{Alarm, AlarmTime, MatchType, DEFAULT_ADDRESS};
//!
//! let mut rtc = DS3231::new(i2c, DEFAULT_ADDRESS);
//! rtc.set_alarm(Alarm::Alarm2, &AlarmTime::new(3, 8, 15, None, MatchType::EveryWeek))
//!     .await?;
//! rtc.enable_alarm_interrupt(Alarm::Alarm2).await?;
//! ```

use embedded_hal_async::i2c::I2c;
use paste::paste;

#[cfg(any(feature = "log", feature = "defmt"))]
use crate::debug;
use crate::{
    Alarm, AlarmRegisters, AlarmTime, Control, DS3231Error, DateTime, Field, InterruptControl,
    RegAddr, Status,
};

/// DS3231 Real-Time Clock async driver.
pub struct DS3231<I2C: I2c> {
    i2c: I2C,
    address: u8,
}

impl<I2C: I2c> DS3231<I2C> {
    /// Creates a new DS3231 async driver instance.
    ///
    /// # Arguments
    /// * `i2c` - The async I2C bus implementation
    /// * `address` - The I2C address of the device (typically [`crate::DEFAULT_ADDRESS`])
    pub fn new(i2c: I2C, address: u8) -> Self {
        Self { i2c, address }
    }

    /// Destroys the driver and returns the I2C bus.
    pub fn release(self) -> I2C {
        self.i2c
    }

    async fn read_register(&mut self, register: RegAddr) -> Result<u8, DS3231Error<I2C::Error>> {
        let mut data = [0];
        self.i2c
            .write_read(self.address, &[register as u8], &mut data)
            .await?;
        Ok(data[0])
    }

    async fn write_register(
        &mut self,
        register: RegAddr,
        value: u8,
    ) -> Result<(), DS3231Error<I2C::Error>> {
        #[cfg(any(feature = "log", feature = "defmt"))]
        debug!("DS3231: writing {:?} = {}", register, value);
        self.i2c
            .write(self.address, &[register as u8, value])
            .await?;
        Ok(())
    }

    async fn read_field(&mut self, field: Field) -> Result<u8, DS3231Error<I2C::Error>> {
        let raw = self.read_register(field.register()).await?;
        Ok(field.decode(raw))
    }

    async fn write_field(
        &mut self,
        field: Field,
        value: u8,
    ) -> Result<(), DS3231Error<I2C::Error>> {
        let raw = field.encode(value).map_err(DS3231Error::DateTime)?;
        self.write_register(field.register(), raw).await
    }

    /// Reads the last two digits of the year.
    pub async fn year(&mut self) -> Result<u8, DS3231Error<I2C::Error>> {
        self.read_field(Field::Year).await
    }

    /// Sets the year, keeping only its last two digits.
    pub async fn set_year(&mut self, year: u16) -> Result<(), DS3231Error<I2C::Error>> {
        self.write_field(Field::Year, DateTime::truncate_year(year))
            .await
    }

    /// Reads all time keeping registers.
    pub async fn datetime(&mut self) -> Result<DateTime, DS3231Error<I2C::Error>> {
        let mut data = [0; 7];
        for (byte, field) in data.iter_mut().zip(Field::ALL) {
            *byte = self.read_register(field.register()).await?;
        }
        Ok(DateTime::from_registers(data))
    }

    /// Writes all time keeping registers, or nothing if a field is out of range.
    pub async fn set_datetime(
        &mut self,
        datetime: &DateTime,
    ) -> Result<(), DS3231Error<I2C::Error>> {
        let data = datetime.to_registers().map_err(DS3231Error::DateTime)?;
        for (byte, field) in data.into_iter().zip(Field::ALL) {
            self.write_register(field.register(), byte).await?;
        }
        Ok(())
    }

    /// Reads and unpacks the registers of `alarm`.
    pub async fn alarm(&mut self, alarm: Alarm) -> Result<AlarmTime, DS3231Error<I2C::Error>> {
        let registers = alarm.registers();
        let mut data = [0; 4];
        for (byte, register) in data.iter_mut().zip(registers) {
            *byte = self.read_register(*register).await?;
        }
        let raw = AlarmRegisters::from_bytes(&data[..registers.len()])
            .map_err(DS3231Error::Alarm)?;
        Ok(raw.unpack())
    }

    /// Validates, packs and writes the registers of `alarm`.
    pub async fn set_alarm(
        &mut self,
        alarm: Alarm,
        time: &AlarmTime,
    ) -> Result<(), DS3231Error<I2C::Error>> {
        time.validate(alarm).map_err(DS3231Error::Alarm)?;
        let raw = alarm.pack(time).map_err(DS3231Error::Alarm)?;
        for (register, byte) in alarm.registers().iter().zip(raw.as_bytes()) {
            self.write_register(*register, *byte).await?;
        }
        Ok(())
    }

    /// Switches INT/SQW to interrupt mode and enables the interrupt of `alarm`.
    pub async fn enable_alarm_interrupt(
        &mut self,
        alarm: Alarm,
    ) -> Result<(), DS3231Error<I2C::Error>> {
        let mut control = self.control().await?;
        control.set_interrupt_control(InterruptControl::Interrupt);
        control.set_alarm_interrupt_enable(alarm, true);
        self.set_control(control).await
    }

    /// Disables the interrupt of `alarm`. The flag is still raised on a match.
    pub async fn disable_alarm_interrupt(
        &mut self,
        alarm: Alarm,
    ) -> Result<(), DS3231Error<I2C::Error>> {
        let mut control = self.control().await?;
        control.set_alarm_interrupt_enable(alarm, false);
        self.set_control(control).await
    }

    /// Reads the triggered flag of `alarm` without clearing it.
    pub async fn alarm_flag(&mut self, alarm: Alarm) -> Result<bool, DS3231Error<I2C::Error>> {
        Ok(self.status().await?.alarm_flag(alarm))
    }

    /// Clears the triggered flag of `alarm` without clearing the other one.
    pub async fn clear_alarm_flag(&mut self, alarm: Alarm) -> Result<(), DS3231Error<I2C::Error>> {
        let mut status = self.status().await?;
        status.acknowledge(alarm);
        self.set_status(status).await
    }

    /// Returns whether `alarm` fired, clearing its flag if it did.
    pub async fn alarm_triggered(
        &mut self,
        alarm: Alarm,
    ) -> Result<bool, DS3231Error<I2C::Error>> {
        let mut status = self.status().await?;
        if !status.alarm_flag(alarm) {
            return Ok(false);
        }
        #[cfg(any(feature = "log", feature = "defmt"))]
        debug!("DS3231: {:?} triggered, clearing flag", alarm);
        status.acknowledge(alarm);
        self.set_status(status).await?;
        Ok(true)
    }

    /// Reads the control register.
    pub async fn control(&mut self) -> Result<Control, DS3231Error<I2C::Error>> {
        Ok(Control::from(self.read_register(RegAddr::Control).await?))
    }

    /// Writes the control register.
    pub async fn set_control(&mut self, control: Control) -> Result<(), DS3231Error<I2C::Error>> {
        self.write_register(RegAddr::Control, control.into()).await
    }

    /// Reads the status register.
    pub async fn status(&mut self) -> Result<Status, DS3231Error<I2C::Error>> {
        Ok(Status::from(
            self.read_register(RegAddr::Status).await?,
        ))
    }

    /// Writes the status register.
    pub async fn set_status(&mut self, status: Status) -> Result<(), DS3231Error<I2C::Error>> {
        self.write_register(RegAddr::Status, status.into())
            .await
    }
}

macro_rules! impl_field_access {
    ($(($name:ident, $field:expr)),+) => {
        impl<I2C: I2c> DS3231<I2C> {
            $(
                paste! {
                    #[doc = concat!("Reads the ", stringify!($name), " register asynchronously.")]
                    pub async fn $name(&mut self) -> Result<u8, DS3231Error<I2C::Error>> {
                        self.read_field($field).await
                    }

                    #[doc = concat!("Sets the ", stringify!($name), " register asynchronously.")]
                    pub async fn [<set_ $name>](&mut self, value: u8) -> Result<(), DS3231Error<I2C::Error>> {
                        self.write_field($field, value).await
                    }
                }
            )+
        }
    };
}

impl_field_access!(
    (second, Field::Second),
    (minute, Field::Minute),
    (hour, Field::Hour),
    (weekday, Field::Weekday),
    (date, Field::Date),
    (month, Field::Month)
);

#[cfg(test)]
mod tests {
    extern crate alloc;
    use super::*;
    use crate::{AlarmError, DateTimeError, MatchType};
    use alloc::vec;
    use chrono::{NaiveDate, Timelike};
    use embedded_hal::i2c::ErrorKind;
    use embedded_hal_mock::eh1::i2c::{Mock as I2cMock, Transaction as I2cTrans};

    const DEVICE_ADDRESS: u8 = 0x68;

    async fn setup_mock(expectations: &[I2cTrans]) -> I2cMock {
        I2cMock::new(expectations)
    }

    fn read(register: RegAddr, value: u8) -> I2cTrans {
        I2cTrans::write_read(DEVICE_ADDRESS, vec![register as u8], vec![value])
    }

    fn write(register: RegAddr, value: u8) -> I2cTrans {
        I2cTrans::write(DEVICE_ADDRESS, vec![register as u8, value])
    }

    #[tokio::test]
    async fn test_async_read_datetime() {
        // 2024-03-14 15:30:00
        let datetime_registers = [
            0x00, // seconds
            0x30, // minutes
            0x15, // hours
            0x05, // weekday (Thursday, Sunday = 1)
            0x14, // date
            0x03, // month
            0x24, // year
        ];
        let expectations: vec::Vec<I2cTrans> = Field::ALL
            .iter()
            .zip(datetime_registers)
            .map(|(field, byte)| read(field.register(), byte))
            .collect();
        let mock = setup_mock(&expectations).await;
        let mut dev = DS3231::new(mock, DEVICE_ADDRESS);

        let datetime = dev.datetime().await.unwrap();
        let naive = datetime.to_naive_datetime().unwrap();
        assert_eq!(
            naive.date(),
            NaiveDate::from_ymd_opt(2024, 3, 14).unwrap()
        );
        assert_eq!(naive.hour(), 15);
        assert_eq!(naive.minute(), 30);
        assert_eq!(datetime.weekday, 5);
        dev.release().done();
    }

    #[tokio::test]
    async fn test_async_set_fields() {
        let mock = setup_mock(&[
            write(RegAddr::Hours, 0x23),
            write(RegAddr::Year, 0x24),
        ])
        .await;
        let mut dev = DS3231::new(mock, DEVICE_ADDRESS);
        dev.set_hour(23).await.unwrap();
        dev.set_year(2024).await.unwrap();
        assert!(matches!(
            dev.set_second(60).await,
            Err(DS3231Error::DateTime(DateTimeError::OutOfRange(
                Field::Second,
                60
            )))
        ));
        dev.release().done();
    }

    #[tokio::test]
    async fn test_async_set_alarm1() {
        let mock = setup_mock(&[
            write(RegAddr::Alarm1Seconds, 0x00),
            write(RegAddr::Alarm1Minutes, 0x30),
            write(RegAddr::Alarm1Hours, 0x07),
            write(RegAddr::Alarm1DayDate, 0x80 | 0x01),
        ])
        .await;
        let mut dev = DS3231::new(mock, DEVICE_ADDRESS);
        dev.set_alarm(
            Alarm::Alarm1,
            &AlarmTime::new(1, 7, 30, Some(0), MatchType::EveryDay),
        )
        .await
        .unwrap();
        dev.release().done();
    }

    #[tokio::test]
    async fn test_async_set_alarm_invalid_day() {
        let mock = setup_mock(&[]).await;
        let mut dev = DS3231::new(mock, DEVICE_ADDRESS);
        assert!(matches!(
            dev.set_alarm(
                Alarm::Alarm2,
                &AlarmTime::new(8, 7, 30, None, MatchType::EveryWeek)
            )
            .await,
            Err(DS3231Error::Alarm(AlarmError::InvalidDayOfWeek))
        ));
        dev.release().done();
    }

    #[tokio::test]
    async fn test_async_read_alarm2() {
        let mock = setup_mock(&[
            read(RegAddr::Alarm2Minutes, 0x80 | 0x15),
            read(RegAddr::Alarm2Hours, 0x80 | 0x08),
            read(RegAddr::Alarm2DayDate, 0x80 | 0x03),
        ])
        .await;
        let mut dev = DS3231::new(mock, DEVICE_ADDRESS);
        assert_eq!(
            dev.alarm(Alarm::Alarm2).await.unwrap(),
            AlarmTime::new(3, 8, 15, None, MatchType::EveryMinute)
        );
        dev.release().done();
    }

    #[tokio::test]
    async fn test_async_interrupts_and_flags() {
        let mock = setup_mock(&[
            read(RegAddr::Control, 0b0001_1100),
            write(RegAddr::Control, 0b0001_1110),
            read(RegAddr::Status, 0b0000_0010),
            // A1F written as 1 so a concurrent alarm 1 match survives
            write(RegAddr::Status, 0b0000_0001),
        ])
        .await;
        let mut dev = DS3231::new(mock, DEVICE_ADDRESS);
        dev.enable_alarm_interrupt(Alarm::Alarm2).await.unwrap();
        assert!(dev.alarm_triggered(Alarm::Alarm2).await.unwrap());
        dev.release().done();
    }

    #[tokio::test]
    async fn test_async_bus_error() {
        let mock = setup_mock(&[I2cTrans::write_read(
            DEVICE_ADDRESS,
            vec![RegAddr::Status as u8],
            vec![0],
        )
        .with_error(ErrorKind::Other)])
        .await;
        let mut dev = DS3231::new(mock, DEVICE_ADDRESS);
        assert!(matches!(
            dev.alarm_flag(Alarm::Alarm1).await,
            Err(DS3231Error::I2c(ErrorKind::Other))
        ));
        dev.release().done();
    }
}
