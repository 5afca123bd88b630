use crate::{ByteReader, CarIndex, DecodeError};

/// Number of car slots in every per-car array on the wire.
pub const NUM_CARS: usize = 22;

/// Fixed array of exactly [`NUM_CARS`] entries, one per car slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CarArray<T>([T; NUM_CARS]);

impl<T: Default> Default for CarArray<T> {
    fn default() -> Self {
        Self(std::array::from_fn(|_| T::default()))
    }
}

impl<T> From<[T; NUM_CARS]> for CarArray<T> {
    fn from(entries: [T; NUM_CARS]) -> Self {
        Self(entries)
    }
}

impl<T> CarArray<T> {
    pub fn get(&self, index: usize) -> Option<&T> {
        self.0.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        self.0.get_mut(index)
    }

    pub fn car(&self, index: CarIndex) -> Option<&T> {
        self.0.get(index.get())
    }

    pub fn car_mut(&mut self, index: CarIndex) -> Option<&mut T> {
        self.0.get_mut(index.get())
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.0.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, T> {
        self.0.iter_mut()
    }

    /// Entries paired with their slot index.
    pub fn indexed(&self) -> impl Iterator<Item = (CarIndex, &T)> {
        self.0
            .iter()
            .enumerate()
            .filter_map(|(i, entry)| CarIndex::from_usize(i).map(|idx| (idx, entry)))
    }

    pub fn as_slice(&self) -> &[T] {
        &self.0
    }

    pub const fn len(&self) -> usize {
        NUM_CARS
    }

    pub const fn is_empty(&self) -> bool {
        false
    }
}

impl<T: Default> CarArray<T> {
    /// Decode [`NUM_CARS`] consecutive entries with `decode`.
    pub fn decode_with<'a, F>(r: &mut ByteReader<'a>, mut decode: F) -> Result<Self, DecodeError>
    where
        F: FnMut(&mut ByteReader<'a>) -> Result<T, DecodeError>,
    {
        let mut out = Self::default();
        for slot in out.iter_mut() {
            *slot = decode(r)?;
        }
        Ok(out)
    }
}

impl<'a, T> IntoIterator for &'a CarArray<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type TestResult = Result<(), Box<dyn std::error::Error>>;

    #[test]
    fn test_decode_with_reads_every_slot() -> TestResult {
        let data: Vec<u8> = (0..NUM_CARS as u8).collect();
        let mut r = ByteReader::new(&data);
        let cars = CarArray::decode_with(&mut r, ByteReader::u8)?;
        assert_eq!(cars.get(0), Some(&0));
        assert_eq!(cars.get(21), Some(&21));
        assert_eq!(cars.get(22), None);
        assert_eq!(r.remaining(), 0);
        Ok(())
    }

    #[test]
    fn test_decode_with_short_input_fails() {
        let data = [0u8; NUM_CARS - 1];
        let mut r = ByteReader::new(&data);
        assert!(CarArray::decode_with(&mut r, ByteReader::u8).is_err());
    }

    #[test]
    fn test_arrays_compare_by_entries() {
        fn assert_eq_bound<T: Eq>(_: &T) {}

        let mut cars: CarArray<u8> = CarArray::default();
        assert_eq_bound(&cars);
        assert_eq!(cars, CarArray::default());
        if let Some(slot) = cars.get_mut(21) {
            *slot = 1;
        }
        assert_ne!(cars, CarArray::default());
    }

    #[test]
    fn test_indexed_yields_all_slots() {
        let cars: CarArray<u8> = CarArray::default();
        assert_eq!(cars.indexed().count(), NUM_CARS);
        assert_eq!(cars.len(), NUM_CARS);
    }
}
