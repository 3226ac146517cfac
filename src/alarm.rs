//! Alarm register codec for the DS3231 RTC.
//!
//! The DS3231 does not store an alarm "mode". Instead each alarm register
//! carries a mask bit in bit 7 and the day/date register carries the DY/DT
//! selector in bit 6. The combination of these bits decides which fields have
//! to match the clock for the alarm to fire. This module converts between
//! that scattered bit pattern and a closed [`MatchType`] enum, and packs or
//! unpacks the full register set of either alarm.
//!
//! # Register layout
//!
//! | Register | bit 7 | bit 6 | bits 5-0 |
//! |---|---|---|---|
//! | seconds (alarm 1 only) | M1 | BCD seconds | BCD seconds |
//! | minutes | M2 | BCD minutes | BCD minutes |
//! | hours | M3 | 12/24 (always 0) | BCD hours |
//! | day/date | M4 | DY/DT | BCD day or date |
//!
//! # Match types
//!
//! - `EverySecond` - all masks set (alarm 1 only)
//! - `EveryMinute` - seconds match (alarm 1), every minute at :00 (alarm 2)
//! - `EveryHour` - minutes (and seconds) match
//! - `EveryDay` - hours, minutes (and seconds) match
//! - `EveryWeek` - day of week, hours, minutes (and seconds) match
//! - `EveryMonth` - date of month, hours, minutes (and seconds) match
//!
//! Any other bit combination read back from the chip decodes to
//! [`MatchType::Invalid`].

use core::fmt;

use bitfield::bitfield;

use crate::bcd;
#[cfg(any(feature = "log", feature = "defmt"))]
use crate::{debug, warn};
use crate::registers::{
    AlarmDayDate, AlarmHours, AlarmMinutes, AlarmSeconds, DayDateSelect, RegAddr,
};

// Width of the BCD value inside the alarm registers.
const SIX_BIT_FIELD: u8 = 0x3F;
const SEVEN_BIT_FIELD: u8 = 0x7F;

/// Error type for alarm encoding and validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AlarmError {
    /// The match type cannot be encoded for the requested alarm
    InvalidMatchType(MatchType),
    /// A register set must be 4 bytes (alarm 1) or 3 bytes (alarm 2)
    InvalidRegisterCount(usize),
    /// Invalid time component value
    InvalidTime(&'static str),
    /// Invalid day of week (must be 1-7)
    InvalidDayOfWeek,
    /// Invalid date of month (must be 1-31)
    InvalidDateOfMonth,
}

impl fmt::Display for AlarmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AlarmError::InvalidMatchType(match_type) => {
                write!(f, "unsupported alarm match type {:?}", match_type)
            }
            AlarmError::InvalidRegisterCount(count) => {
                write!(f, "expected 3 or 4 alarm registers, got {}", count)
            }
            AlarmError::InvalidTime(reason) => f.write_str(reason),
            AlarmError::InvalidDayOfWeek => f.write_str("day of week must be 1-7"),
            AlarmError::InvalidDateOfMonth => f.write_str("date of month must be 1-31"),
        }
    }
}

/// The condition under which an alarm fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MatchType {
    /// Fire every second (alarm 1 only)
    EverySecond,
    /// Fire once a minute
    EveryMinute,
    /// Fire once an hour
    EveryHour,
    /// Fire once a day
    EveryDay,
    /// Fire once a week, on the given day of week
    EveryWeek,
    /// Fire once a month, on the given date
    EveryMonth,
    /// The registers hold a mask combination with no defined meaning
    Invalid,
}

/// One of the two alarms of the DS3231.
///
/// The discriminant is also the alarm's bit in the control (AxIE) and status
/// (AxF) registers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Alarm {
    /// Alarm 1, seconds resolution
    Alarm1 = 1,
    /// Alarm 2, minute resolution, fires at second 00
    Alarm2 = 2,
}

impl Alarm {
    /// Register addresses of this alarm in ascending order.
    #[must_use]
    pub const fn registers(self) -> &'static [RegAddr] {
        match self {
            Alarm::Alarm1 => &[
                RegAddr::Alarm1Seconds,
                RegAddr::Alarm1Minutes,
                RegAddr::Alarm1Hours,
                RegAddr::Alarm1DayDate,
            ],
            Alarm::Alarm2 => &[
                RegAddr::Alarm2Minutes,
                RegAddr::Alarm2Hours,
                RegAddr::Alarm2DayDate,
            ],
        }
    }

    /// Packs an alarm time into register-ready bytes for this alarm.
    ///
    /// Field values are BCD-encoded without a range check, use
    /// [`AlarmTime::validate`] first when the values come from user input.
    /// Alarm 2 has no seconds register, so `time.second` is ignored for it.
    ///
    /// # Errors
    ///
    /// Returns [`AlarmError::InvalidMatchType`] for [`MatchType::Invalid`] and
    /// for [`MatchType::EverySecond`] on alarm 2.
    pub fn pack(self, time: &AlarmTime) -> Result<AlarmRegisters, AlarmError> {
        let bits = MatchBits::encode(time.match_type, self)?;

        let mut day_date = AlarmDayDate::default();
        day_date.set_day_or_date(bcd::encode(time.day) & SIX_BIT_FIELD);
        day_date.set_day_date_select(if bits.dy() {
            DayDateSelect::Day
        } else {
            DayDateSelect::Date
        });
        day_date.set_alarm_mask4(bits.m4());

        let mut hours = AlarmHours::default();
        hours.set_hours(bcd::encode(time.hour) & SIX_BIT_FIELD);
        hours.set_alarm_mask3(bits.m3());

        let mut minutes = AlarmMinutes::default();
        minutes.set_minutes(bcd::encode(time.minute) & SEVEN_BIT_FIELD);
        minutes.set_alarm_mask2(bits.m2());

        let registers = match self {
            Alarm::Alarm1 => {
                let mut seconds = AlarmSeconds::default();
                seconds.set_seconds(bcd::encode(time.second.unwrap_or(0)) & SEVEN_BIT_FIELD);
                seconds.set_alarm_mask1(bits.m1());
                AlarmRegisters::Alarm1([
                    seconds.into(),
                    minutes.into(),
                    hours.into(),
                    day_date.into(),
                ])
            }
            Alarm::Alarm2 => {
                AlarmRegisters::Alarm2([minutes.into(), hours.into(), day_date.into()])
            }
        };
        #[cfg(any(feature = "log", feature = "defmt"))]
        debug!(
            "alarm {:?} packed {:?} as {:?}",
            self,
            time.match_type,
            registers.as_bytes()
        );
        Ok(registers)
    }
}

bitfield! {
    /// The five alarm control bits, M1 (most significant) through DY.
    ///
    /// This is the only information the chip keeps about an alarm's match
    /// type. Alarm 2 has no M1; it is always clear for that alarm.
    #[derive(Clone, Copy, Default, PartialEq, Eq)]
    pub struct MatchBits(u8);
    impl Debug;
    /// Seconds mask (A1M1)
    pub m1, set_m1: 4;
    /// Minutes mask (AxM2)
    pub m2, set_m2: 3;
    /// Hours mask (AxM3)
    pub m3, set_m3: 2;
    /// Day/date mask (AxM4)
    pub m4, set_m4: 1;
    /// DY/DT select, set for day of week
    pub dy, set_dy: 0;
}

impl MatchBits {
    const EVERY_SECOND: u8 = 0b11110;
    const EVERY_MINUTE: u8 = 0b01110;
    const EVERY_HOUR: u8 = 0b00110;
    const EVERY_DAY: u8 = 0b00010;
    const EVERY_MONTH: u8 = 0b00000;
    const EVERY_WEEK: u8 = 0b00001;

    /// Returns the control bits for `match_type` on `alarm`.
    ///
    /// # Errors
    ///
    /// Returns [`AlarmError::InvalidMatchType`] when the match type is
    /// [`MatchType::Invalid`], or [`MatchType::EverySecond`] on alarm 2 which
    /// has no seconds register to carry M1.
    pub fn encode(match_type: MatchType, alarm: Alarm) -> Result<Self, AlarmError> {
        let bits = match (match_type, alarm) {
            (MatchType::EverySecond, Alarm::Alarm1) => Self::EVERY_SECOND,
            (MatchType::EveryMinute, _) => Self::EVERY_MINUTE,
            (MatchType::EveryHour, _) => Self::EVERY_HOUR,
            (MatchType::EveryDay, _) => Self::EVERY_DAY,
            (MatchType::EveryMonth, _) => Self::EVERY_MONTH,
            (MatchType::EveryWeek, _) => Self::EVERY_WEEK,
            (MatchType::EverySecond, Alarm::Alarm2) | (MatchType::Invalid, _) => {
                return Err(AlarmError::InvalidMatchType(match_type));
            }
        };
        Ok(MatchBits(bits))
    }

    /// Looks the bit pattern up in the match table.
    ///
    /// Only the six exact patterns produced by [`MatchBits::encode`] are
    /// recognised; everything else is [`MatchType::Invalid`].
    #[must_use]
    pub fn decode(self) -> MatchType {
        match self.0 & 0b11111 {
            Self::EVERY_SECOND => MatchType::EverySecond,
            Self::EVERY_MINUTE => MatchType::EveryMinute,
            Self::EVERY_HOUR => MatchType::EveryHour,
            Self::EVERY_DAY => MatchType::EveryDay,
            Self::EVERY_MONTH => MatchType::EveryMonth,
            Self::EVERY_WEEK => MatchType::EveryWeek,
            _ => MatchType::Invalid,
        }
    }
}

impl From<MatchBits> for u8 {
    fn from(v: MatchBits) -> Self {
        v.0
    }
}

/// Decimal alarm fields together with the match type.
///
/// `day` is a day of week (1-7) for [`MatchType::EveryWeek`] and a date of
/// month (1-31) otherwise. `second` is `None` when read back from alarm 2.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AlarmTime {
    /// Day of week or date of month
    pub day: u8,
    /// Hours (0-23)
    pub hour: u8,
    /// Minutes (0-59)
    pub minute: u8,
    /// Seconds (0-59), alarm 1 only
    pub second: Option<u8>,
    /// When the alarm fires
    pub match_type: MatchType,
}

impl AlarmTime {
    /// Creates an alarm time.
    #[must_use]
    pub const fn new(
        day: u8,
        hour: u8,
        minute: u8,
        second: Option<u8>,
        match_type: MatchType,
    ) -> Self {
        Self {
            day,
            hour,
            minute,
            second,
            match_type,
        }
    }

    /// Checks the fields the match type compares against the clock.
    ///
    /// Fields a match type ignores are not checked, so an `EverySecond`
    /// alarm accepts any day, hour and minute.
    ///
    /// # Errors
    ///
    /// Returns an error if the match type cannot be used on `alarm` or if a
    /// compared field is out of range.
    pub fn validate(&self, alarm: Alarm) -> Result<(), AlarmError> {
        MatchBits::encode(self.match_type, alarm)?;

        let compares_seconds = alarm == Alarm::Alarm1 && self.match_type != MatchType::EverySecond;
        if compares_seconds && self.second.unwrap_or(0) > 59 {
            return Err(AlarmError::InvalidTime("seconds must be 0-59"));
        }

        let compares_minutes = !matches!(
            self.match_type,
            MatchType::EverySecond | MatchType::EveryMinute
        );
        if compares_minutes && self.minute > 59 {
            return Err(AlarmError::InvalidTime("minutes must be 0-59"));
        }

        let compares_hours = matches!(
            self.match_type,
            MatchType::EveryDay | MatchType::EveryWeek | MatchType::EveryMonth
        );
        if compares_hours && self.hour > 23 {
            return Err(AlarmError::InvalidTime("hours must be 0-23"));
        }

        match self.match_type {
            MatchType::EveryWeek if !(1..=7).contains(&self.day) => {
                Err(AlarmError::InvalidDayOfWeek)
            }
            MatchType::EveryMonth if !(1..=31).contains(&self.day) => {
                Err(AlarmError::InvalidDateOfMonth)
            }
            _ => Ok(()),
        }
    }
}

/// Raw register bytes of one alarm in ascending register address order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AlarmRegisters {
    /// Seconds, minutes, hours, day/date
    Alarm1([u8; 4]),
    /// Minutes, hours, day/date
    Alarm2([u8; 3]),
}

impl AlarmRegisters {
    /// Wraps register bytes read from the chip.
    ///
    /// # Errors
    ///
    /// Returns [`AlarmError::InvalidRegisterCount`] unless `bytes` holds
    /// exactly 4 (alarm 1) or 3 (alarm 2) registers.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, AlarmError> {
        match *bytes {
            [seconds, minutes, hours, day_date] => {
                Ok(AlarmRegisters::Alarm1([seconds, minutes, hours, day_date]))
            }
            [minutes, hours, day_date] => Ok(AlarmRegisters::Alarm2([minutes, hours, day_date])),
            _ => Err(AlarmError::InvalidRegisterCount(bytes.len())),
        }
    }

    /// The register bytes, lowest address first.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            AlarmRegisters::Alarm1(bytes) => bytes,
            AlarmRegisters::Alarm2(bytes) => bytes,
        }
    }

    /// Which alarm this register set belongs to.
    #[must_use]
    pub fn alarm(&self) -> Alarm {
        match self {
            AlarmRegisters::Alarm1(_) => Alarm::Alarm1,
            AlarmRegisters::Alarm2(_) => Alarm::Alarm2,
        }
    }

    fn views(&self) -> (Option<AlarmSeconds>, AlarmMinutes, AlarmHours, AlarmDayDate) {
        match *self {
            AlarmRegisters::Alarm1([seconds, minutes, hours, day_date]) => (
                Some(AlarmSeconds::from(seconds)),
                AlarmMinutes::from(minutes),
                AlarmHours::from(hours),
                AlarmDayDate::from(day_date),
            ),
            AlarmRegisters::Alarm2([minutes, hours, day_date]) => (
                None,
                AlarmMinutes::from(minutes),
                AlarmHours::from(hours),
                AlarmDayDate::from(day_date),
            ),
        }
    }

    /// Collects the mask and DY/DT bits spread over the registers.
    #[must_use]
    pub fn match_bits(&self) -> MatchBits {
        let (seconds, minutes, hours, day_date) = self.views();
        let mut bits = MatchBits::default();
        bits.set_m1(seconds.is_some_and(|s| s.alarm_mask1()));
        bits.set_m2(minutes.alarm_mask2());
        bits.set_m3(hours.alarm_mask3());
        bits.set_m4(day_date.alarm_mask4());
        bits.set_dy(day_date.day_date_select() == DayDateSelect::Day);
        bits
    }

    /// Decodes the match type from the control bits.
    #[must_use]
    pub fn match_type(&self) -> MatchType {
        self.match_bits().decode()
    }

    /// Decodes field values and match type.
    ///
    /// Field values are always returned, even when the match type is
    /// [`MatchType::Invalid`].
    #[must_use]
    pub fn unpack(&self) -> AlarmTime {
        let (seconds, minutes, hours, day_date) = self.views();
        let match_type = self.match_type();
        if match_type == MatchType::Invalid {
            #[cfg(any(feature = "log", feature = "defmt"))]
            warn!(
                "alarm registers {:?} hold an unknown mask combination",
                self.as_bytes()
            );
        }
        AlarmTime {
            day: bcd::decode(day_date.day_or_date()),
            hour: bcd::decode(hours.hours()),
            minute: bcd::decode(minutes.minutes()),
            second: seconds.map(|s| bcd::decode(s.seconds())),
            match_type,
        }
    }
}
