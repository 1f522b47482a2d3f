//! 지연 실행 큐.
//!
//! 임의 스레드(전송 완료, 캡처 완료)가 넣은 작업을 업데이트 틱에서 순서대로 실행한다.
//! 드레인은 대기 목록을 락 안에서 빈 목록과 교체한 뒤 락 밖에서 실행하므로,
//! 실행 중에 새로 넣은 작업은 다음 드레인에서 처리된다.

use parking_lot::Mutex;

/// 큐에 들어가는 작업
pub type SyncAction<C> = Box<dyn FnOnce(&mut C) + Send>;

/// 업데이트 컨텍스트로 작업을 넘기는 FIFO 큐
pub struct SyncQueue<C> {
    pending: Mutex<Vec<SyncAction<C>>>,
}

impl<C> SyncQueue<C> {
    pub fn new() -> Self {
        Self {
            pending: Mutex::new(Vec::new()),
        }
    }

    /// 작업 추가 (모든 스레드에서 호출 가능)
    pub fn enqueue<F>(&self, action: F)
    where
        F: FnOnce(&mut C) + Send + 'static,
    {
        self.pending.lock().push(Box::new(action));
    }

    /// 대기 중인 작업 수
    pub fn len(&self) -> usize {
        self.pending.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.lock().is_empty()
    }

    /// 대기 목록을 꺼내 `context`에서 순서대로 실행. 실행한 작업 수를 반환한다.
    pub fn drain(&self, context: &mut C) -> usize {
        let actions = std::mem::take(&mut *self.pending.lock());
        let count = actions.len();
        for action in actions {
            action(context);
        }
        count
    }
}

impl<C> Default for SyncQueue<C> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    struct Recorder {
        seen: Vec<u32>,
        queue: Arc<SyncQueue<Recorder>>,
    }

    #[test]
    fn runs_actions_in_fifo_order() {
        let queue = SyncQueue::<Vec<u32>>::new();
        for i in 0..5 {
            queue.enqueue(move |v: &mut Vec<u32>| v.push(i));
        }
        let mut seen = Vec::new();
        assert_eq!(queue.drain(&mut seen), 5);
        assert_eq!(seen, vec![0, 1, 2, 3, 4]);
        assert!(queue.is_empty());
    }

    #[test]
    fn action_enqueued_during_drain_runs_next_time() {
        let queue = Arc::new(SyncQueue::<Recorder>::new());
        let mut recorder = Recorder {
            seen: Vec::new(),
            queue: Arc::clone(&queue),
        };

        queue.enqueue(|r: &mut Recorder| {
            r.seen.push(1);
            let inner = Arc::clone(&r.queue);
            inner.enqueue(|r: &mut Recorder| r.seen.push(2));
        });

        assert_eq!(queue.drain(&mut recorder), 1);
        assert_eq!(recorder.seen, vec![1]);
        assert_eq!(queue.len(), 1);

        assert_eq!(queue.drain(&mut recorder), 1);
        assert_eq!(recorder.seen, vec![1, 2]);
    }

    #[test]
    fn producers_on_other_threads() {
        let queue = Arc::new(SyncQueue::<Vec<u32>>::new());
        let handles: Vec<_> = (0..4)
            .map(|t| {
                let queue = Arc::clone(&queue);
                std::thread::spawn(move || {
                    for i in 0..25 {
                        queue.enqueue(move |v: &mut Vec<u32>| v.push(t * 100 + i));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let mut seen = Vec::new();
        assert_eq!(queue.drain(&mut seen), 100);
        // 같은 생산자 안에서는 순서 유지
        for t in 0..4 {
            let mine: Vec<_> = seen.iter().filter(|v| **v / 100 == t).copied().collect();
            assert!(mine.windows(2).all(|w| w[0] < w[1]));
        }
    }
}
