use std::fmt::{Debug, Formatter};
use std::hash::{Hash, Hasher};
use std::num::NonZeroU16;
use rand::random;

/// Generational arena: indices to removed entries never alias later inserts
pub struct Arenal<T> {
    arenal_id: ArenalId,
    entries: Vec<Entry<T>>,
    free_list: Vec<OffsetType>,
    len: usize,
}

type OffsetType = u32;
type ArenalId = u16;
type Generation = NonZeroU16;

pub enum Entry<T> {
    Occupied(Occupied<T>),
    Empty(Empty),
}

pub struct Occupied<T> {
    generation: Generation,
    value: T,
}

pub struct Empty {
    next_generation: Generation,
}

pub struct Idx<T> {
    arenal_id: ArenalId,
    generation: Generation,
    offset: OffsetType,
    marker: std::marker::PhantomData<fn() -> T>,
}

impl<T> Clone for Idx<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Idx<T> {}

impl<T> PartialEq for Idx<T> {
    fn eq(&self, other: &Self) -> bool {
        self.arenal_id == other.arenal_id
            && self.generation == other.generation
            && self.offset == other.offset
    }
}

impl<T> Eq for Idx<T> {}

impl<T> Hash for Idx<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.arenal_id.hash(state);
        self.generation.hash(state);
        self.offset.hash(state);
    }
}

impl<T> Debug for Idx<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Idx({}v{})", self.offset, self.generation)
    }
}

fn next(generation: Generation) -> Generation {
    generation.checked_add(1).unwrap_or(Generation::MIN)
}

impl<T> Default for Arenal<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Arenal<T> {
    pub fn new() -> Self {
        Self {
            arenal_id: random(),
            entries: Vec::new(),
            free_list: Vec::new(),
            len: 0,
        }
    }

    pub fn insert(&mut self, value: T) -> Idx<T> {
        self.len += 1;
        if let Some(offset) = self.free_list.pop() {
            let entry = &mut self.entries[offset as usize];
            let generation = match entry {
                Entry::Empty(empty) => empty.next_generation,
                Entry::Occupied(occupied) => next(occupied.generation),
            };
            *entry = Entry::Occupied(Occupied { generation, value });
            return self.make_index(generation, offset);
        }
        let generation = Generation::MIN;
        let offset = self.entries.len() as OffsetType;
        self.entries.push(Entry::Occupied(Occupied { generation, value }));
        self.make_index(generation, offset)
    }

    fn make_index(&self, generation: Generation, offset: OffsetType) -> Idx<T> {
        Idx {
            arenal_id: self.arenal_id,
            generation,
            offset,
            marker: std::marker::PhantomData,
        }
    }

    pub fn get(&self, idx: &Idx<T>) -> Option<&T> {
        if idx.arenal_id != self.arenal_id {
            return None;
        }
        match self.entries.get(idx.offset as usize)? {
            Entry::Occupied(Occupied { generation, value }) if *generation == idx.generation => {
                Some(value)
            }
            _ => None,
        }
    }

    pub fn get_mut(&mut self, idx: &Idx<T>) -> Option<&mut T> {
        if idx.arenal_id != self.arenal_id {
            return None;
        }
        match self.entries.get_mut(idx.offset as usize)? {
            Entry::Occupied(Occupied { generation, value }) if *generation == idx.generation => {
                Some(value)
            }
            _ => None,
        }
    }

    pub fn remove(&mut self, idx: &Idx<T>) -> Option<T> {
        self.get(idx)?;
        let entry = &mut self.entries[idx.offset as usize];
        let old = std::mem::replace(
            entry,
            Entry::Empty(Empty {
                next_generation: next(idx.generation),
            }),
        );
        self.free_list.push(idx.offset);
        self.len -= 1;
        match old {
            Entry::Occupied(occupied) => Some(occupied.value),
            Entry::Empty(_) => None,
        }
    }

    pub fn contains(&self, idx: &Idx<T>) -> bool {
        self.get(idx).is_some()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn entries(&mut self) -> impl Iterator<Item = &mut T> {
        self.entries.iter_mut().filter_map(|item| {
            if let Entry::Occupied(o) = item {
                Some(&mut o.value)
            } else {
                None
            }
        })
    }
}
