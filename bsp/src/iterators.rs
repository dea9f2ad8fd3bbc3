use crate::lumps::Lump;
use std::marker::PhantomData;

/// Decodes the records of a lump lazily from its raw bytes. Any trailing
/// bytes short of a full record are ignored, callers that care check the
/// length first (see `BspReader::read_lump`).
pub struct LumpIter<'a, T: Lump> {
    data: &'a [u8],
    item_count: usize,
    current: usize,
    _phantom: PhantomData<T>,
}

impl<'a, T: Lump> LumpIter<'a, T> {
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            item_count: data.len() / T::SIZE,
            current: 0,
            _phantom: PhantomData,
        }
    }
}

impl<T: Lump> Iterator for LumpIter<'_, T> {
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> {
        if self.current < self.item_count {
            let offset = self.current * T::SIZE;
            let item = T::from_le_bytes(&self.data[offset..offset + T::SIZE]);
            self.current += 1;
            return Some(item);
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = self.item_count - self.current;
        (left, Some(left))
    }
}

impl<T: Lump> ExactSizeIterator for LumpIter<'_, T> {}

#[cfg(test)]
mod tests {
    use crate::iterators::LumpIter;
    use crate::lumps::Lump;

    #[test]
    fn leaf_face_iter() {
        let mut data = Vec::new();
        for i in [7u32, 3, 9] {
            i.write_le_bytes(&mut data);
        }
        // A dangling partial record is not decoded
        data.push(0xff);

        let mut iter = LumpIter::<u32>::new(&data);
        assert_eq!(iter.len(), 3);
        assert_eq!(iter.next(), Some(7));
        let rest: Vec<u32> = iter.collect();
        assert_eq!(rest, vec![3, 9]);
    }
}
