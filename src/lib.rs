//! A platform-agnostic driver for the time keeping and alarm registers of the
//! DS3231 real-time clock.
//!
//! The DS3231 keeps time and both alarms in packed BCD registers with control
//! bits mixed into the value bytes. The driver is split accordingly:
//!
//! - [`bcd`] converts two digit decimals to and from packed nibbles
//! - [`alarm`] packs and unpacks alarm registers, turning the scattered mask
//!   and DY/DT bits into a [`MatchType`]
//! - [`datetime`] models the seven time keeping registers
//! - [`DS3231`] reads and writes single registers over an `embedded-hal` I2C
//!   bus and runs the codecs (an async twin lives in `asynch` behind the
//!   `async` feature)
//!
//! Only 24-hour mode is supported and the year is stored as two digits.
//!
//! # Features
//!
//! - `async` - async driver based on `embedded-hal-async`
//! - `log` - debug logging through the `log` crate
//! - `defmt` - debug logging and `defmt::Format` impls through `defmt`
//!
//! # Example
//!
//! ```rust,ignore
//! use ds3231_alarm::{Alarm, AlarmTime, MatchType, DS3231, DEFAULT_ADDRESS};
//!
//! let mut rtc = DS3231::new(i2c, DEFAULT_ADDRESS);
//! rtc.set_year(2019)?;
//! // fire every day at 07:30:00
//! rtc.set_alarm(Alarm::Alarm1, &AlarmTime::new(1, 7, 30, Some(0), MatchType::EveryDay))?;
//! rtc.enable_alarm_interrupt(Alarm::Alarm1)?;
//! if rtc.alarm_triggered(Alarm::Alarm1)? {
//!     // ...
//! }
//! ```
#![no_std]

use core::fmt;

use embedded_hal::i2c::I2c;
use paste::paste;

cfg_if::cfg_if! {
    if #[cfg(feature = "defmt")] {
        #[allow(unused_imports)]
        pub(crate) use defmt::{debug, warn};
    } else if #[cfg(feature = "log")] {
        #[allow(unused_imports)]
        pub(crate) use log::{debug, warn};
    }
}

pub mod alarm;
#[cfg(feature = "async")]
pub mod asynch;
pub mod bcd;
pub mod datetime;
pub mod registers;

pub use alarm::{Alarm, AlarmError, AlarmRegisters, AlarmTime, MatchBits, MatchType};
pub use datetime::{DateTime, DateTimeError, Field};
pub use registers::{Control, DayDateSelect, InterruptControl, RegAddr, Status};

/// Default I2C address of the DS3231.
pub const DEFAULT_ADDRESS: u8 = 0x68;

/// Error type for DS3231 operations.
#[derive(Debug)]
pub enum DS3231Error<I2CE> {
    /// I2C bus error, passed through unchanged
    I2c(I2CE),
    /// Alarm encoding or validation error
    Alarm(AlarmError),
    /// Date/time validation or conversion error
    DateTime(DateTimeError),
}

impl<I2CE> From<I2CE> for DS3231Error<I2CE> {
    fn from(e: I2CE) -> Self {
        DS3231Error::I2c(e)
    }
}

impl<I2CE: fmt::Debug> fmt::Display for DS3231Error<I2CE> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DS3231Error::I2c(e) => write!(f, "I2C error: {:?}", e),
            DS3231Error::Alarm(e) => write!(f, "alarm error: {}", e),
            DS3231Error::DateTime(e) => write!(f, "date/time error: {}", e),
        }
    }
}

/// DS3231 Real-Time Clock driver.
///
/// Every register is transferred on its own: a read is a one byte
/// `write_read` and a write sends the register address followed by the value.
pub struct DS3231<I2C: I2c> {
    i2c: I2C,
    address: u8,
}

impl<I2C: I2c> DS3231<I2C> {
    /// Creates a new DS3231 driver instance.
    ///
    /// # Arguments
    /// * `i2c` - The I2C bus implementation
    /// * `address` - The I2C address of the device (typically [`DEFAULT_ADDRESS`])
    pub fn new(i2c: I2C, address: u8) -> Self {
        Self { i2c, address }
    }

    /// Destroys the driver and returns the I2C bus.
    pub fn release(self) -> I2C {
        self.i2c
    }

    fn read_register(&mut self, register: RegAddr) -> Result<u8, DS3231Error<I2C::Error>> {
        let mut data = [0];
        self.i2c
            .write_read(self.address, &[register as u8], &mut data)?;
        Ok(data[0])
    }

    fn write_register(
        &mut self,
        register: RegAddr,
        value: u8,
    ) -> Result<(), DS3231Error<I2C::Error>> {
        #[cfg(any(feature = "log", feature = "defmt"))]
        debug!("DS3231: writing {:?} = {}", register, value);
        self.i2c.write(self.address, &[register as u8, value])?;
        Ok(())
    }

    fn read_field(&mut self, field: Field) -> Result<u8, DS3231Error<I2C::Error>> {
        let raw = self.read_register(field.register())?;
        Ok(field.decode(raw))
    }

    fn write_field(&mut self, field: Field, value: u8) -> Result<(), DS3231Error<I2C::Error>> {
        let raw = field.encode(value).map_err(DS3231Error::DateTime)?;
        self.write_register(field.register(), raw)
    }

    /// Reads the last two digits of the year.
    pub fn year(&mut self) -> Result<u8, DS3231Error<I2C::Error>> {
        self.read_field(Field::Year)
    }

    /// Sets the year, keeping only its last two digits (2019 and 119 store 19).
    pub fn set_year(&mut self, year: u16) -> Result<(), DS3231Error<I2C::Error>> {
        self.write_field(Field::Year, DateTime::truncate_year(year))
    }

    /// Reads all time keeping registers.
    ///
    /// # Returns
    /// * `Ok(DateTime)` - The decoded registers, not range checked
    /// * `Err(DS3231Error)` on error
    pub fn datetime(&mut self) -> Result<DateTime, DS3231Error<I2C::Error>> {
        let mut data = [0; 7];
        for (byte, field) in data.iter_mut().zip(Field::ALL) {
            *byte = self.read_register(field.register())?;
        }
        Ok(DateTime::from_registers(data))
    }

    /// Writes all time keeping registers.
    ///
    /// Nothing is written unless every field is in range.
    pub fn set_datetime(&mut self, datetime: &DateTime) -> Result<(), DS3231Error<I2C::Error>> {
        let data = datetime.to_registers().map_err(DS3231Error::DateTime)?;
        for (byte, field) in data.into_iter().zip(Field::ALL) {
            self.write_register(field.register(), byte)?;
        }
        Ok(())
    }

    /// Reads and unpacks the registers of `alarm`.
    ///
    /// An unknown mask combination is reported as [`MatchType::Invalid`]
    /// with the field values still decoded.
    pub fn alarm(&mut self, alarm: Alarm) -> Result<AlarmTime, DS3231Error<I2C::Error>> {
        let registers = alarm.registers();
        let mut data = [0; 4];
        for (byte, register) in data.iter_mut().zip(registers) {
            *byte = self.read_register(*register)?;
        }
        let raw = AlarmRegisters::from_bytes(&data[..registers.len()])
            .map_err(DS3231Error::Alarm)?;
        Ok(raw.unpack())
    }

    /// Validates, packs and writes the registers of `alarm`.
    pub fn set_alarm(
        &mut self,
        alarm: Alarm,
        time: &AlarmTime,
    ) -> Result<(), DS3231Error<I2C::Error>> {
        time.validate(alarm).map_err(DS3231Error::Alarm)?;
        let raw = alarm.pack(time).map_err(DS3231Error::Alarm)?;
        for (register, byte) in alarm.registers().iter().zip(raw.as_bytes()) {
            self.write_register(*register, *byte)?;
        }
        Ok(())
    }

    /// Switches INT/SQW to interrupt mode and enables the interrupt of `alarm`.
    pub fn enable_alarm_interrupt(&mut self, alarm: Alarm) -> Result<(), DS3231Error<I2C::Error>> {
        let mut control = self.control()?;
        control.set_interrupt_control(InterruptControl::Interrupt);
        control.set_alarm_interrupt_enable(alarm, true);
        self.set_control(control)
    }

    /// Disables the interrupt of `alarm`.
    ///
    /// The chip still raises the alarm flag when the alarm matches.
    pub fn disable_alarm_interrupt(
        &mut self,
        alarm: Alarm,
    ) -> Result<(), DS3231Error<I2C::Error>> {
        let mut control = self.control()?;
        control.set_alarm_interrupt_enable(alarm, false);
        self.set_control(control)
    }

    /// Reads the triggered flag of `alarm` without clearing it.
    pub fn alarm_flag(&mut self, alarm: Alarm) -> Result<bool, DS3231Error<I2C::Error>> {
        Ok(self.status()?.alarm_flag(alarm))
    }

    /// Clears the triggered flag of `alarm` without clearing the other one.
    pub fn clear_alarm_flag(&mut self, alarm: Alarm) -> Result<(), DS3231Error<I2C::Error>> {
        let mut status = self.status()?;
        status.acknowledge(alarm);
        self.set_status(status)
    }

    /// Returns whether `alarm` fired, clearing its flag if it did.
    pub fn alarm_triggered(&mut self, alarm: Alarm) -> Result<bool, DS3231Error<I2C::Error>> {
        let mut status = self.status()?;
        if !status.alarm_flag(alarm) {
            return Ok(false);
        }
        #[cfg(any(feature = "log", feature = "defmt"))]
        debug!("DS3231: {:?} triggered, clearing flag", alarm);
        status.acknowledge(alarm);
        self.set_status(status)?;
        Ok(true)
    }

    /// Reads the control register.
    pub fn control(&mut self) -> Result<Control, DS3231Error<I2C::Error>> {
        Ok(Control::from(self.read_register(RegAddr::Control)?))
    }

    /// Writes the control register.
    pub fn set_control(&mut self, control: Control) -> Result<(), DS3231Error<I2C::Error>> {
        self.write_register(RegAddr::Control, control.into())
    }

    /// Reads the status register.
    pub fn status(&mut self) -> Result<Status, DS3231Error<I2C::Error>> {
        Ok(Status::from(self.read_register(RegAddr::Status)?))
    }

    /// Writes the status register.
    pub fn set_status(&mut self, status: Status) -> Result<(), DS3231Error<I2C::Error>> {
        self.write_register(RegAddr::Status, status.into())
    }
}

// Per-field time accessors. Getters decode without a range check, setters
// reject out of range values before touching the bus.
macro_rules! impl_field_access {
    ($(($name:ident, $field:expr)),+) => {
        impl<I2C: I2c> DS3231<I2C> {
            $(
                paste! {
                    #[doc = concat!("Reads the ", stringify!($name), " register.")]
                    pub fn $name(&mut self) -> Result<u8, DS3231Error<I2C::Error>> {
                        self.read_field($field)
                    }

                    #[doc = concat!("Sets the ", stringify!($name), " register.")]
                    #[doc = "\n\n# Errors"]
                    #[doc = "* `DS3231Error::DateTime` if the value is out of range"]
                    #[doc = "* `DS3231Error::I2c` on bus error"]
                    pub fn [<set_ $name>](&mut self, value: u8) -> Result<(), DS3231Error<I2C::Error>> {
                        self.write_field($field, value)
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
