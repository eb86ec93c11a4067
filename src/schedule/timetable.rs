//! Timetable representation and conflict counting.

use std::collections::{HashMap, HashSet};

use rand::Rng;

use crate::error::TabuError;

/// Names of the resources a timetable assigns.
///
/// Entries refer to these by index.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Catalog {
    pub timeslots: Vec<String>,
    pub rooms: Vec<String>,
    pub courses: Vec<String>,
    pub teachers: Vec<String>,
}

impl Default for Catalog {
    /// Five half-day timeslots, three rooms, three courses, three teachers.
    fn default() -> Self {
        Self {
            timeslots: names(["Mon AM", "Mon PM", "Tue AM", "Tue PM", "Wed AM"]),
            rooms: names(["Room 1", "Room 2", "Room 3"]),
            courses: names(["Mathematics", "History", "Science"]),
            teachers: names(["Teacher A", "Teacher B", "Teacher C"]),
        }
    }
}

impl Catalog {
    /// Creates a catalog, rejecting empty resource lists.
    pub fn new<S: Into<String>>(
        timeslots: impl IntoIterator<Item = S>,
        rooms: impl IntoIterator<Item = S>,
        courses: impl IntoIterator<Item = S>,
        teachers: impl IntoIterator<Item = S>,
    ) -> Result<Self, TabuError> {
        let catalog = Self {
            timeslots: names(timeslots),
            rooms: names(rooms),
            courses: names(courses),
            teachers: names(teachers),
        };
        for (kind, len) in [
            ("timeslot", catalog.timeslots.len()),
            ("room", catalog.rooms.len()),
            ("course", catalog.courses.len()),
            ("teacher", catalog.teachers.len()),
        ] {
            if len == 0 {
                return Err(TabuError::InvalidTimetable(format!(
                    "catalog needs at least one {kind}"
                )));
            }
        }
        Ok(catalog)
    }

    /// Number of (timeslot, room) cells, one entry each in a random timetable.
    pub fn slot_count(&self) -> usize {
        self.timeslots.len() * self.rooms.len()
    }

    /// Resolves an entry to `(timeslot, room, course, teacher)` names.
    pub fn labels(&self, entry: &Entry) -> Option<(&str, &str, &str, &str)> {
        Some((
            self.timeslots.get(entry.timeslot)?.as_str(),
            self.rooms.get(entry.room)?.as_str(),
            self.courses.get(entry.course)?.as_str(),
            self.teachers.get(entry.teacher)?.as_str(),
        ))
    }

    fn check(&self, entry: &Entry) -> Result<(), TabuError> {
        if self.labels(entry).is_none() {
            return Err(TabuError::InvalidTimetable(format!(
                "entry {entry:?} refers outside the catalog"
            )));
        }
        Ok(())
    }
}

fn names<S: Into<String>>(items: impl IntoIterator<Item = S>) -> Vec<String> {
    items.into_iter().map(Into::into).collect()
}

/// One scheduled class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Entry {
    pub timeslot: usize,
    pub room: usize,
    pub course: usize,
    pub teacher: usize,
}

impl Entry {
    pub fn new(timeslot: usize, room: usize, course: usize, teacher: usize) -> Self {
        Self {
            timeslot,
            room,
            course,
            teacher,
        }
    }
}

/// An ordered list of entries.
///
/// Nothing prevents two entries from sharing a teacher or room in the same
/// timeslot; such clashes are what [`conflicts`](Self::conflicts) counts.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Timetable {
    entries: Vec<Entry>,
}

impl Timetable {
    /// Builds a timetable from explicit entries, checking every index
    /// against `catalog`.
    pub fn from_entries(catalog: &Catalog, entries: Vec<Entry>) -> Result<Self, TabuError> {
        for entry in &entries {
            catalog.check(entry)?;
        }
        Ok(Self { entries })
    }

    /// One entry per (timeslot, room), in timeslot-major order, with a
    /// uniformly random course and teacher.
    pub fn random<R: Rng>(catalog: &Catalog, rng: &mut R) -> Self {
        let mut entries = Vec::with_capacity(catalog.slot_count());
        for timeslot in 0..catalog.timeslots.len() {
            for room in 0..catalog.rooms.len() {
                let course = rng.random_range(0..catalog.courses.len());
                let teacher = rng.random_range(0..catalog.teachers.len());
                entries.push(Entry::new(timeslot, room, course, teacher));
            }
        }
        Self { entries }
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Counts repeated teachers and repeated rooms within each timeslot.
    ///
    /// Every entry whose teacher already appeared earlier in the same
    /// timeslot adds one, and likewise for rooms.
    pub fn conflicts(&self) -> usize {
        let mut seen: HashMap<usize, (HashSet<usize>, HashSet<usize>)> = HashMap::new();
        let mut conflicts = 0;
        for entry in &self.entries {
            let (teachers, rooms) = seen.entry(entry.timeslot).or_default();
            if !teachers.insert(entry.teacher) {
                conflicts += 1;
            }
            if !rooms.insert(entry.room) {
                conflicts += 1;
            }
        }
        conflicts
    }

    /// Exchanges the course and teacher of two entries, leaving their
    /// timeslot and room in place.
    pub fn swap_payload(&mut self, i: usize, j: usize) {
        let (a, b) = (self.entries[i], self.entries[j]);
        self.entries[i].course = b.course;
        self.entries[i].teacher = b.teacher;
        self.entries[j].course = a.course;
        self.entries[j].teacher = a.teacher;
    }

    /// Exchanges the positions of two whole entries.
    pub fn swap_entries(&mut self, i: usize, j: usize) {
        self.entries.swap(i, j);
    }
}
