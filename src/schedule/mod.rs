//! Timetabling domain.
//!
//! Assigns a course and a teacher to every (timeslot, room) cell. A
//! conflict is a teacher or room used twice within one timeslot.

mod domain;
mod timetable;

pub use domain::{EntrySwap, ScheduleDomain, SwapMode};
pub use timetable::{Catalog, Entry, Timetable};
