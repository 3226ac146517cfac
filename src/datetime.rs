//! Time keeping register model for the DS3231 RTC.
//!
//! The DS3231 stores date and time in 7 consecutive BCD registers:
//! seconds, minutes, hours, day of week, date, month and year. Two of them
//! carry flags next to the value: bit 6 of the hours register selects 12-hour
//! mode and bit 7 of the month register is the century flag. Neither is
//! supported here, so both are masked off on read and written as zero.
//!
//! The year is kept as its last two digits. [`DateTime::truncate_year`]
//! applies that policy to four digit years before encoding.
//!
//! # Conversions
//!
//! [`DateTime`] converts from chrono's `NaiveDateTime` (weekday 1 = Sunday)
//! and back, mapping the two digit year into 2000-2099.

use core::fmt;
use core::ops::RangeInclusive;

use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike};

use crate::bcd;
use crate::registers::RegAddr;

/// One of the seven time keeping registers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Field {
    /// Seconds (0-59)
    Second,
    /// Minutes (0-59)
    Minute,
    /// Hours, 24-hour (0-23)
    Hour,
    /// Day of week (1-7), meaning assigned by the user
    Weekday,
    /// Date of month (1-31)
    Date,
    /// Month (1-12)
    Month,
    /// Last two digits of the year (0-99)
    Year,
}

impl Field {
    /// All fields in register address order.
    pub const ALL: [Field; 7] = [
        Field::Second,
        Field::Minute,
        Field::Hour,
        Field::Weekday,
        Field::Date,
        Field::Month,
        Field::Year,
    ];

    /// The register holding this field.
    #[must_use]
    pub const fn register(self) -> RegAddr {
        match self {
            Field::Second => RegAddr::Seconds,
            Field::Minute => RegAddr::Minutes,
            Field::Hour => RegAddr::Hours,
            Field::Weekday => RegAddr::Day,
            Field::Date => RegAddr::Date,
            Field::Month => RegAddr::Month,
            Field::Year => RegAddr::Year,
        }
    }

    /// Bits of the register that hold the BCD value.
    #[must_use]
    pub const fn value_mask(self) -> u8 {
        match self {
            // bit 6 selects 12-hour mode
            Field::Hour => 0x3F,
            // bit 7 is the century flag
            Field::Month => 0x7F,
            _ => 0xFF,
        }
    }

    /// Valid decimal range.
    #[must_use]
    pub const fn range(self) -> RangeInclusive<u8> {
        match self {
            Field::Second | Field::Minute => 0..=59,
            Field::Hour => 0..=23,
            Field::Weekday => 1..=7,
            Field::Date => 1..=31,
            Field::Month => 1..=12,
            Field::Year => 0..=99,
        }
    }

    /// Decodes a raw register byte. No range check is applied.
    #[must_use]
    pub fn decode(self, raw: u8) -> u8 {
        bcd::decode(raw & self.value_mask())
    }

    /// Encodes a value for this register after checking its range.
    ///
    /// # Errors
    ///
    /// Returns [`DateTimeError::OutOfRange`] when `value` is outside
    /// [`Field::range`].
    pub fn encode(self, value: u8) -> Result<u8, DateTimeError> {
        if !self.range().contains(&value) {
            return Err(DateTimeError::OutOfRange(self, value));
        }
        Ok(bcd::encode(value) & self.value_mask())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
/// Errors that can occur during DS3231 date/time conversion or validation.
pub enum DateTimeError {
    /// A field value is outside its valid range
    OutOfRange(Field, u8),
    /// The fields do not form a calendar date/time (e.g. February 30)
    InvalidDateTime,
}

impl fmt::Display for DateTimeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DateTimeError::OutOfRange(field, value) => {
                let range = field.range();
                write!(
                    f,
                    "{:?} {} out of range {}-{}",
                    field,
                    value,
                    range.start(),
                    range.end()
                )
            }
            DateTimeError::InvalidDateTime => f.write_str("invalid date/time"),
        }
    }
}

/// Decimal contents of the seven time keeping registers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DateTime {
    /// Last two digits of the year (0-99)
    pub year: u8,
    /// Month (1-12)
    pub month: u8,
    /// Date of month (1-31)
    pub date: u8,
    /// Day of week (1-7)
    pub weekday: u8,
    /// Hours (0-23)
    pub hour: u8,
    /// Minutes (0-59)
    pub minute: u8,
    /// Seconds (0-59)
    pub second: u8,
}

impl DateTime {
    /// Keeps the last two digits of a year, e.g. 2019 and 119 both give 19.
    #[must_use]
    pub fn truncate_year(year: u16) -> u8 {
        // always < 100
        (year % 100) as u8
    }

    /// The value of `field`.
    #[must_use]
    pub fn get(&self, field: Field) -> u8 {
        match field {
            Field::Second => self.second,
            Field::Minute => self.minute,
            Field::Hour => self.hour,
            Field::Weekday => self.weekday,
            Field::Date => self.date,
            Field::Month => self.month,
            Field::Year => self.year,
        }
    }

    /// Decodes the seven registers starting at [`RegAddr::Seconds`].
    #[must_use]
    pub fn from_registers(data: [u8; 7]) -> Self {
        Self {
            second: Field::Second.decode(data[0]),
            minute: Field::Minute.decode(data[1]),
            hour: Field::Hour.decode(data[2]),
            weekday: Field::Weekday.decode(data[3]),
            date: Field::Date.decode(data[4]),
            month: Field::Month.decode(data[5]),
            year: Field::Year.decode(data[6]),
        }
    }

    /// Encodes the fields into register order.
    ///
    /// # Errors
    ///
    /// Returns [`DateTimeError::OutOfRange`] for the first field outside its
    /// valid range.
    pub fn to_registers(&self) -> Result<[u8; 7], DateTimeError> {
        let mut data = [0; 7];
        for (byte, field) in data.iter_mut().zip(Field::ALL) {
            *byte = field.encode(self.get(field))?;
        }
        Ok(data)
    }

    /// Checks every field against its valid range.
    ///
    /// # Errors
    ///
    /// Returns [`DateTimeError::OutOfRange`] for the first invalid field.
    pub fn validate(&self) -> Result<(), DateTimeError> {
        self.to_registers().map(|_| ())
    }

    /// Converts to a chrono date/time in the years 2000-2099.
    ///
    /// The weekday register is ignored since its meaning is user assigned.
    ///
    /// # Errors
    ///
    /// Returns [`DateTimeError::InvalidDateTime`] if the fields do not form a
    /// valid calendar date and time.
    pub fn to_naive_datetime(&self) -> Result<NaiveDateTime, DateTimeError> {
        NaiveDate::from_ymd_opt(
            2000 + i32::from(self.year),
            u32::from(self.month),
            u32::from(self.date),
        )
        .and_then(|d| {
            d.and_hms_opt(
                u32::from(self.hour),
                u32::from(self.minute),
                u32::from(self.second),
            )
        })
        .ok_or(DateTimeError::InvalidDateTime)
    }
}

impl TryFrom<&NaiveDateTime> for DateTime {
    type Error = DateTimeError;

    /// Converts a chrono date/time, keeping the last two digits of the year
    /// and numbering weekdays from Sunday = 1.
    fn try_from(datetime: &NaiveDateTime) -> Result<Self, Self::Error> {
        let narrow = |v: u32| u8::try_from(v).map_err(|_| DateTimeError::InvalidDateTime);
        Ok(Self {
            year: u8::try_from(datetime.year().rem_euclid(100))
                .map_err(|_| DateTimeError::InvalidDateTime)?,
            month: narrow(datetime.month())?,
            date: narrow(datetime.day())?,
            weekday: narrow(datetime.weekday().number_from_sunday())?,
            hour: narrow(datetime.hour())?,
            minute: narrow(datetime.minute())?,
            second: narrow(datetime.second())?,
        })
    }
}
