//! Register definitions and bitfield structures for the DS3231 RTC.
//!
//! This module contains the register addresses used by the driver and the
//! bitfield views over the alarm, control and status registers. Time keeping
//! registers are plain BCD bytes and are handled by [`crate::datetime`].

use bitfield::bitfield;

use crate::alarm::Alarm;

/// Register addresses for the DS3231 RTC.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RegAddr {
    /// Seconds register (0-59)
    Seconds = 0x00,
    /// Minutes register (0-59)
    Minutes = 0x01,
    /// Hours register (0-23)
    Hours = 0x02,
    /// Day of week register (1-7)
    Day = 0x03,
    /// Date register (1-31)
    Date = 0x04,
    /// Month register (1-12), bit 7 is the century flag
    Month = 0x05,
    /// Year register (0-99)
    Year = 0x06,
    /// Alarm 1 seconds register
    Alarm1Seconds = 0x07,
    /// Alarm 1 minutes register
    Alarm1Minutes = 0x08,
    /// Alarm 1 hours register
    Alarm1Hours = 0x09,
    /// Alarm 1 day/date register
    Alarm1DayDate = 0x0A,
    /// Alarm 2 minutes register
    Alarm2Minutes = 0x0B,
    /// Alarm 2 hours register
    Alarm2Hours = 0x0C,
    /// Alarm 2 day/date register
    Alarm2DayDate = 0x0D,
    /// Control register
    Control = 0x0E,
    /// Status register (alarm flags)
    Status = 0x0F,
}

/// Interrupt control mode for the INT/SQW pin (INTCN bit).
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum InterruptControl {
    /// Output square wave on INT/SQW pin
    SquareWave = 0,
    /// Output interrupt signal on INT/SQW pin
    Interrupt = 1,
}
impl From<u8> for InterruptControl {
    /// Creates an `InterruptControl` from a raw register value.
    ///
    /// # Panics
    /// Panics if the value is not 0 or 1.
    fn from(v: u8) -> Self {
        match v {
            0 => InterruptControl::SquareWave,
            1 => InterruptControl::Interrupt,
            _ => panic!("Invalid value for InterruptControl: {}", v),
        }
    }
}
impl From<InterruptControl> for u8 {
    fn from(v: InterruptControl) -> Self {
        v as u8
    }
}

/// Day/Date select for alarm registers (DY/DT bit).
///
/// This controls whether the alarm day/date register matches against
/// the day of the week or the date of the month.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DayDateSelect {
    /// Match against date of the month (1-31)
    Date = 0,
    /// Match against day of the week (1-7)
    Day = 1,
}

impl From<u8> for DayDateSelect {
    /// Creates a `DayDateSelect` from a raw register value.
    ///
    /// # Panics
    /// Panics if the value is not 0 or 1.
    fn from(v: u8) -> Self {
        match v {
            0 => DayDateSelect::Date,
            1 => DayDateSelect::Day,
            _ => panic!("Invalid value for DayDateSelect: {}", v),
        }
    }
}

impl From<DayDateSelect> for u8 {
    fn from(v: DayDateSelect) -> Self {
        v as u8
    }
}

// This macro generates the From<u8> and Into<u8> implementations for the
// register type
macro_rules! from_register_u8 {
    ($typ:ty) => {
        impl From<u8> for $typ {
            fn from(v: u8) -> Self {
                paste::paste!([< $typ >](v))
            }
        }
        impl From<$typ> for u8 {
            fn from(v: $typ) -> Self {
                v.0
            }
        }
    };
}

bitfield! {
    /// Control register, limited to the alarm interrupt bits.
    #[derive(Clone, Copy, Default, PartialEq, Eq)]
    pub struct Control(u8);
    impl Debug;
    /// INT/SQW pin function control
    pub from into InterruptControl, interrupt_control, set_interrupt_control: 2, 2;
    /// Enable alarm 2 interrupt
    pub alarm2_interrupt_enable, set_alarm2_interrupt_enable: 1;
    /// Enable alarm 1 interrupt
    pub alarm1_interrupt_enable, set_alarm1_interrupt_enable: 0;
}
from_register_u8!(Control);

impl Control {
    /// Interrupt enable bit (AxIE) of `alarm`.
    #[must_use]
    pub fn alarm_interrupt_enable(&self, alarm: Alarm) -> bool {
        match alarm {
            Alarm::Alarm1 => self.alarm1_interrupt_enable(),
            Alarm::Alarm2 => self.alarm2_interrupt_enable(),
        }
    }

    /// Sets or clears the interrupt enable bit (AxIE) of `alarm`.
    pub fn set_alarm_interrupt_enable(&mut self, alarm: Alarm, enable: bool) {
        match alarm {
            Alarm::Alarm1 => self.set_alarm1_interrupt_enable(enable),
            Alarm::Alarm2 => self.set_alarm2_interrupt_enable(enable),
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Control {
    fn format(&self, f: defmt::Formatter) {
        match self.interrupt_control() {
            InterruptControl::SquareWave => defmt::write!(f, "Control(square wave"),
            InterruptControl::Interrupt => defmt::write!(f, "Control(interrupt"),
        }
        if self.alarm2_interrupt_enable() {
            defmt::write!(f, ", A2IE");
        }
        if self.alarm1_interrupt_enable() {
            defmt::write!(f, ", A1IE");
        }
        defmt::write!(f, ")");
    }
}

bitfield! {
    /// Status register, limited to the alarm flags.
    #[derive(Clone, Copy, Default, PartialEq, Eq)]
    pub struct Status(u8);
    impl Debug;
    /// Alarm 2 triggered flag
    pub alarm2_flag, set_alarm2_flag: 1;
    /// Alarm 1 triggered flag
    pub alarm1_flag, set_alarm1_flag: 0;
}
from_register_u8!(Status);

impl Status {
    /// Triggered flag (AxF) of `alarm`.
    #[must_use]
    pub fn alarm_flag(&self, alarm: Alarm) -> bool {
        match alarm {
            Alarm::Alarm1 => self.alarm1_flag(),
            Alarm::Alarm2 => self.alarm2_flag(),
        }
    }

    /// Sets or clears the triggered flag (AxF) of `alarm`.
    pub fn set_alarm_flag(&mut self, alarm: Alarm, flag: bool) {
        match alarm {
            Alarm::Alarm1 => self.set_alarm1_flag(flag),
            Alarm::Alarm2 => self.set_alarm2_flag(flag),
        }
    }

    /// Prepares a write that clears the flag of `alarm` only.
    ///
    /// AxF bits ignore a written 1, so the other alarm's flag is set to 1.
    /// A match of that alarm between reading and writing the register is
    /// then kept instead of being cleared by a stale 0.
    pub fn acknowledge(&mut self, alarm: Alarm) {
        let other = match alarm {
            Alarm::Alarm1 => Alarm::Alarm2,
            Alarm::Alarm2 => Alarm::Alarm1,
        };
        self.set_alarm_flag(alarm, false);
        self.set_alarm_flag(other, true);
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Status {
    fn format(&self, f: defmt::Formatter) {
        match (self.alarm1_flag(), self.alarm2_flag()) {
            (false, false) => defmt::write!(f, "Status(clear)"),
            (true, false) => defmt::write!(f, "Status(A1F)"),
            (false, true) => defmt::write!(f, "Status(A2F)"),
            (true, true) => defmt::write!(f, "Status(A1F, A2F)"),
        }
    }
}

// Alarm register types with mask bits and special control bits. The value
// fields are the raw BCD bits; seconds and minutes use 7 bits, hours and
// day/date only 6.

bitfield! {
    /// Alarm Seconds register with mask bit (only used by Alarm 1).
    #[derive(Clone, Copy, Default, PartialEq, Eq)]
    pub struct AlarmSeconds(u8);
    impl Debug;
    /// Alarm mask bit 1 (A1M1)
    pub alarm_mask1, set_alarm_mask1: 7;
    /// BCD seconds
    pub seconds, set_seconds: 6, 0;
}
from_register_u8!(AlarmSeconds);

bitfield! {
    /// Alarm Minutes register with mask bit (used by both Alarm 1 and Alarm 2).
    #[derive(Clone, Copy, Default, PartialEq, Eq)]
    pub struct AlarmMinutes(u8);
    impl Debug;
    /// Alarm mask bit 2 (A1M2/A2M2)
    pub alarm_mask2, set_alarm_mask2: 7;
    /// BCD minutes
    pub minutes, set_minutes: 6, 0;
}
from_register_u8!(AlarmMinutes);

bitfield! {
    /// Alarm Hours register with mask bit (used by both Alarm 1 and Alarm 2).
    ///
    /// Bit 6 would select 12-hour mode; the driver always writes 24-hour
    /// alarms so the bit is cleared on pack and ignored on unpack.
    #[derive(Clone, Copy, Default, PartialEq, Eq)]
    pub struct AlarmHours(u8);
    impl Debug;
    /// Alarm mask bit 3 (A1M3/A2M3)
    pub alarm_mask3, set_alarm_mask3: 7;
    /// BCD hours (24-hour)
    pub hours, set_hours: 5, 0;
}
from_register_u8!(AlarmHours);

bitfield! {
    /// Alarm Day/Date register with mask bit and DY/DT control (used by both Alarm 1 and Alarm 2).
    #[derive(Clone, Copy, Default, PartialEq, Eq)]
    pub struct AlarmDayDate(u8);
    impl Debug;
    /// Alarm mask bit 4 (A1M4/A2M4)
    pub alarm_mask4, set_alarm_mask4: 7;
    /// Day/Date select (1=day of week, 0=date of month)
    pub from into DayDateSelect, day_date_select, set_day_date_select: 6, 6;
    /// BCD day of week or date of month
    pub day_or_date, set_day_or_date: 5, 0;
}
from_register_u8!(AlarmDayDate);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_day_date_select_conversions() {
        assert_eq!(DayDateSelect::from(0), DayDateSelect::Date);
        assert_eq!(DayDateSelect::from(1), DayDateSelect::Day);
        assert_eq!(u8::from(DayDateSelect::Date), 0);
        assert_eq!(u8::from(DayDateSelect::Day), 1);
    }

    #[test]
    #[should_panic(expected = "Invalid value for DayDateSelect: 2")]
    fn test_invalid_day_date_select_conversion() {
        let _ = DayDateSelect::from(2);
    }

    #[test]
    #[should_panic(expected = "Invalid value for InterruptControl: 3")]
    fn test_invalid_interrupt_control_conversion() {
        let _ = InterruptControl::from(3);
    }

    #[test]
    fn test_alarm_seconds_register_conversions() {
        let alarm_seconds = AlarmSeconds::from(0x80); // Mask bit set, 0 seconds
        assert!(alarm_seconds.alarm_mask1());
        assert_eq!(alarm_seconds.seconds(), 0);
        assert_eq!(u8::from(alarm_seconds), 0x80);

        let alarm_seconds = AlarmSeconds::from(0xB9); // Mask bit set, 39 seconds
        assert!(alarm_seconds.alarm_mask1());
        assert_eq!(alarm_seconds.seconds(), 0x39);
    }

    #[test]
    fn test_alarm_minutes_register_conversions() {
        let alarm_minutes = AlarmMinutes::from(0x42); // No mask, 42 minutes
        assert!(!alarm_minutes.alarm_mask2());
        assert_eq!(alarm_minutes.minutes(), 0x42);

        let alarm_minutes = AlarmMinutes::from(0xD7); // Mask bit set, 57 minutes
        assert!(alarm_minutes.alarm_mask2());
        assert_eq!(alarm_minutes.minutes(), 0x57);
    }

    #[test]
    fn test_alarm_hours_register_ignores_bit_six() {
        let alarm_hours = AlarmHours::from(0x95); // Mask bit set, 15 hours
        assert!(alarm_hours.alarm_mask3());
        assert_eq!(alarm_hours.hours(), 0x15);

        // 12-hour select bit is outside the 6-bit value field
        let alarm_hours = AlarmHours::from(0x72);
        assert!(!alarm_hours.alarm_mask3());
        assert_eq!(alarm_hours.hours(), 0x32);
    }

    #[test]
    fn test_alarm_day_date_register_conversions() {
        let alarm_day_date = AlarmDayDate::from(0xC3); // Mask bit set, day mode, day 3
        assert!(alarm_day_date.alarm_mask4());
        assert_eq!(alarm_day_date.day_date_select(), DayDateSelect::Day);
        assert_eq!(alarm_day_date.day_or_date(), 0x03);

        let alarm_day_date = AlarmDayDate::from(0x31); // No mask, date mode, date 31
        assert!(!alarm_day_date.alarm_mask4());
        assert_eq!(alarm_day_date.day_date_select(), DayDateSelect::Date);
        assert_eq!(alarm_day_date.day_or_date(), 0x31);
    }

    #[test]
    fn test_value_setters_stay_inside_their_field() {
        let mut hours = AlarmHours::default();
        hours.set_hours(0xFF);
        assert_eq!(u8::from(hours), 0x3F);

        let mut minutes = AlarmMinutes::default();
        minutes.set_minutes(0xFF);
        assert_eq!(u8::from(minutes), 0x7F);
    }

    #[test]
    fn test_control_register_alarm_bits() {
        let mut control = Control::from(0b0001_1000); // square wave at 8kHz bits set
        assert_eq!(control.interrupt_control(), InterruptControl::SquareWave);
        control.set_interrupt_control(InterruptControl::Interrupt);
        control.set_alarm1_interrupt_enable(true);
        // bits outside the alarm fields are preserved
        assert_eq!(u8::from(control), 0b0001_1101);
        control.set_alarm1_interrupt_enable(false);
        control.set_alarm2_interrupt_enable(true);
        assert_eq!(u8::from(control), 0b0001_1110);
    }

    #[test]
    fn test_per_alarm_helpers_match_alarm_bits() {
        let mut control = Control::default();
        control.set_alarm_interrupt_enable(Alarm::Alarm2, true);
        assert_eq!(u8::from(control), Alarm::Alarm2 as u8);
        assert!(control.alarm_interrupt_enable(Alarm::Alarm2));
        assert!(!control.alarm_interrupt_enable(Alarm::Alarm1));

        let mut status = Status::from(0xFF);
        status.set_alarm_flag(Alarm::Alarm1, false);
        assert_eq!(u8::from(status), 0xFF - Alarm::Alarm1 as u8);
        assert!(!status.alarm_flag(Alarm::Alarm1));
        assert!(status.alarm_flag(Alarm::Alarm2));
    }

    #[test]
    fn test_status_register_alarm_flags() {
        let status = Status::from(0b1000_0011);
        assert!(status.alarm1_flag());
        assert!(status.alarm2_flag());

        let mut status = Status::from(0b1000_0001);
        status.set_alarm1_flag(false);
        assert_eq!(u8::from(status), 0b1000_0000);
    }

    #[test]
    fn test_control_and_status_addresses() {
        assert_eq!(RegAddr::Control as u8, 0x0E);
        assert_eq!(RegAddr::Status as u8, 0x0F);
    }

    #[test]
    fn test_acknowledge_never_writes_zero_to_other_flag() {
        // alarm 2 was clear when read, it may fire before the write
        let mut status = Status::from(0b1000_0001);
        status.acknowledge(Alarm::Alarm1);
        assert_eq!(u8::from(status), 0b1000_0010);

        let mut status = Status::from(0b0000_0011);
        status.acknowledge(Alarm::Alarm2);
        assert_eq!(u8::from(status), 0b0000_0001);
    }
}
