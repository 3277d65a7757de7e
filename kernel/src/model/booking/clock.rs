use std::fmt;

/// A wall-clock time of day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClockTime {
    hour: u8,
    minute: u8,
}

impl ClockTime {
    /// Returns `None` unless `hour` is in `0..=23` and `minute` in `0..=59`.
    pub fn try_new(hour: i64, minute: i64) -> Option<Self> {
        if !(0..=23).contains(&hour) || !(0..=59).contains(&minute) {
            return None;
        }
        Some(Self {
            hour: hour as u8,
            minute: minute as u8,
        })
    }

    pub fn hour(self) -> u8 {
        self.hour
    }

    pub fn minute(self) -> u8 {
        self.minute
    }

    pub fn minutes_of_day(self) -> u16 {
        u16::from(self.hour) * 60 + u16::from(self.minute)
    }

    pub fn is_before(self, other: ClockTime) -> bool {
        self.minutes_of_day() < other.minutes_of_day()
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

/// A booked interval within one day; `start` is strictly before `end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeSlot {
    start: ClockTime,
    end: ClockTime,
}

impl TimeSlot {
    pub fn new(start: ClockTime, end: ClockTime) -> Option<Self> {
        start.is_before(end).then_some(Self { start, end })
    }

    pub fn start(self) -> ClockTime {
        self.start
    }

    pub fn end(self) -> ClockTime {
        self.end
    }

    /// Hour-granular overlap test: only the hour components take part, so
    /// 9:00-9:30 and 9:45-10:15 collide.
    pub fn overlaps_by_hour(self, candidate: TimeSlot) -> bool {
        let (start, end) = (self.start.hour, self.end.hour);
        let (cand_start, cand_end) = (candidate.start.hour, candidate.end.hour);

        (start <= cand_start && end > cand_start)
            || (start < cand_end && end >= cand_end)
            || (start >= cand_start && end <= cand_end)
    }
}
