//! 고정 용량 순환 버퍼.
//!
//! 이벤트/측정/스크린샷 보관용. 가득 차면 가장 오래된 항목을 덮어쓴다.
//! 추가(append)만 지원하며 임의 위치 삽입/삭제는 제공하지 않는다.

use std::ops::Index;

/// 고정 용량 순환 버퍼: append 전용
///
/// 논리 인덱스 0은 항상 가장 오래된 항목, `len() - 1`은 가장 최근 항목이다.
/// `clear()`는 백킹 저장소를 해제하지 않으므로 이전 슬롯을
/// [`pending_eviction_mut`](Self::pending_eviction_mut)로 재활용할 수 있다.
#[derive(Debug, Clone)]
pub struct BoundedRingBuffer<T> {
    slots: Vec<T>,
    capacity: usize,
    count: usize,
    next: usize,
}

impl<T> BoundedRingBuffer<T> {
    /// 새 순환 버퍼 생성
    ///
    /// # Panics
    ///
    /// `capacity`가 0이면 패닉. 설정값은 생성 전에 1 이상으로 보정해야 한다.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "BoundedRingBuffer capacity must be >= 1");
        Self {
            slots: Vec::with_capacity(capacity),
            capacity,
            count: 0,
            next: 0,
        }
    }

    /// 항목 추가 (O(1)). 가득 찬 경우 가장 오래된 항목을 덮어쓴다.
    pub fn push(&mut self, item: T) {
        if self.next < self.slots.len() {
            self.slots[self.next] = item;
        } else {
            self.slots.push(item);
        }
        self.count = (self.count + 1).min(self.capacity);
        self.next = (self.next + 1) % self.capacity;
    }

    /// 현재 보관 중인 항목 수
    pub fn len(&self) -> usize {
        self.count
    }

    /// 비어 있는지 여부
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// 최대 용량
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// 가득 찼는지 여부 (다음 `push`가 항목을 밀어냄)
    pub fn is_full(&self) -> bool {
        self.count == self.capacity
    }

    /// 논리 인덱스로 조회 (0 = 가장 오래된 항목)
    pub fn get(&self, index: usize) -> Option<&T> {
        if index >= self.count {
            return None;
        }
        self.slots.get(self.physical(index))
    }

    /// 논리 인덱스로 가변 조회
    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        if index >= self.count {
            return None;
        }
        let slot = self.physical(index);
        self.slots.get_mut(slot)
    }

    /// 가장 오래된 항목
    pub fn oldest(&self) -> Option<&T> {
        self.get(0)
    }

    /// 가장 최근 항목
    pub fn newest(&self) -> Option<&T> {
        self.count.checked_sub(1).and_then(|i| self.get(i))
    }

    /// 다음 `push`가 덮어쓸 슬롯
    ///
    /// 아직 한 번도 채워지지 않은 슬롯이면 `None`. `clear()` 이후에는
    /// 논리적으로 비어 있어도 이전 항목이 남아 있어 재활용 대상으로 반환된다.
    pub fn pending_eviction_mut(&mut self) -> Option<&mut T> {
        self.slots.get_mut(self.next)
    }

    /// 모든 항목을 논리적으로 제거 (백킹 저장소는 유지)
    pub fn clear(&mut self) {
        self.count = 0;
        self.next = 0;
    }

    /// 오래된 순서로 순회
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &T> + ExactSizeIterator + '_ {
        (0..self.count).map(move |i| &self.slots[self.physical(i)])
    }

    /// 논리 인덱스 → 물리 슬롯
    #[inline]
    fn physical(&self, index: usize) -> usize {
        if self.count < self.capacity {
            index
        } else {
            (self.next + index) % self.capacity
        }
    }
}

impl<T: Clone> BoundedRingBuffer<T> {
    /// 오래된 순서의 복사본 (스냅샷용)
    pub fn to_vec(&self) -> Vec<T> {
        self.iter().cloned().collect()
    }
}

impl<T> Index<usize> for BoundedRingBuffer<T> {
    type Output = T;

    fn index(&self, index: usize) -> &T {
        match self.get(index) {
            Some(item) => item,
            None => panic!(
                "ring index out of range: index {index}, len {}",
                self.count
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overwrites_oldest_when_full() {
        let mut ring = BoundedRingBuffer::new(3);
        for e in ["E1", "E2", "E3", "E4", "E5"] {
            ring.push(e);
        }
        assert_eq!(ring.len(), 3);
        assert_eq!(ring.to_vec(), vec!["E3", "E4", "E5"]);
        assert_eq!(ring.oldest(), Some(&"E3"));
        assert_eq!(ring.newest(), Some(&"E5"));
    }

    #[test]
    fn occupancy_and_head_for_any_insert_count() {
        for capacity in 1..=5 {
            for n in 0..=12usize {
                let mut ring = BoundedRingBuffer::new(capacity);
                for i in 1..=n {
                    ring.push(i);
                }
                assert_eq!(ring.len(), n.min(capacity));
                if n > 0 {
                    let expected_head = if n > capacity { n - capacity + 1 } else { 1 };
                    assert_eq!(ring[0], expected_head, "capacity={capacity} n={n}");
                    assert_eq!(*ring.newest().unwrap(), n);
                }
                // 논리 순서는 항상 삽입 순서
                let items = ring.to_vec();
                assert!(items.windows(2).all(|w| w[0] + 1 == w[1]));
            }
        }
    }

    #[test]
    fn identity_mapping_before_full() {
        let mut ring = BoundedRingBuffer::new(4);
        ring.push('a');
        ring.push('b');
        assert_eq!(ring.get(0), Some(&'a'));
        assert_eq!(ring.get(1), Some(&'b'));
        assert_eq!(ring.get(2), None);
        assert!(!ring.is_full());
    }

    #[test]
    fn pending_eviction_points_at_next_overwrite() {
        let mut ring = BoundedRingBuffer::new(2);
        assert!(ring.pending_eviction_mut().is_none());
        ring.push(10);
        assert!(ring.pending_eviction_mut().is_none());
        ring.push(20);
        assert_eq!(ring.pending_eviction_mut().copied(), Some(10));
        ring.push(30);
        assert_eq!(ring.pending_eviction_mut().copied(), Some(20));
        assert_eq!(ring.to_vec(), vec![20, 30]);
    }

    #[test]
    fn clear_keeps_storage_for_recycling() {
        let mut ring = BoundedRingBuffer::new(3);
        ring.push(vec![1, 2, 3]);
        ring.push(vec![4]);
        ring.clear();
        assert!(ring.is_empty());
        assert_eq!(ring.iter().count(), 0);
        // 논리적으로 비었지만 이전 슬롯은 재활용 가능
        let recycled = ring.pending_eviction_mut().map(std::mem::take);
        assert_eq!(recycled, Some(vec![1, 2, 3]));
        ring.push(vec![9]);
        assert_eq!(ring.to_vec(), vec![vec![9]]);
    }

    #[test]
    fn get_mut_uses_logical_index() {
        let mut ring = BoundedRingBuffer::new(2);
        ring.push(1);
        ring.push(2);
        ring.push(3);
        *ring.get_mut(0).unwrap() = 20;
        assert_eq!(ring.to_vec(), vec![20, 3]);
    }

    #[test]
    fn reverse_iteration_is_newest_first() {
        let mut ring = BoundedRingBuffer::new(3);
        for i in 0..5 {
            ring.push(i);
        }
        let rev: Vec<_> = ring.iter().rev().copied().collect();
        assert_eq!(rev, vec![4, 3, 2]);
        assert_eq!(ring.iter().len(), 3);
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn index_out_of_range_panics() {
        let mut ring = BoundedRingBuffer::new(2);
        ring.push(1);
        let _ = ring[1];
    }

    #[test]
    #[should_panic]
    fn zero_capacity_rejected() {
        let _ = BoundedRingBuffer::<u8>::new(0);
    }
}
