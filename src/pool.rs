use crate::value::Value;

const MAX_POOLED: usize = 16;

/// Reusable argument buffers for method and constructor calls.
///
/// A buffer from [`ArgPool::acquire`] is empty with at least the requested
/// capacity; callers push every argument before use and hand it back with
/// [`ArgPool::release`] once the call returns.
#[derive(Debug, Default)]
pub struct ArgPool {
    free: Vec<Vec<Value>>,
    reused: usize,
}

impl ArgPool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn acquire(&mut self, len: usize) -> Vec<Value> {
        match self.free.iter().position(|buf| buf.capacity() >= len) {
            Some(i) => {
                self.reused += 1;
                self.free.swap_remove(i)
            }
            None => Vec::with_capacity(len),
        }
    }

    pub fn release(&mut self, mut buffer: Vec<Value>) {
        buffer.clear();
        if self.free.len() < MAX_POOLED {
            self.free.push(buffer);
        }
    }

    /// Buffers waiting to be reused.
    pub fn available(&self) -> usize {
        self.free.len()
    }

    /// How many acquisitions were served from the pool.
    pub fn reused(&self) -> usize {
        self.reused
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_released_buffers_are_reused_empty() {
        let mut pool = ArgPool::new();
        let mut buf = pool.acquire(2);
        buf.push(Value::Int(1));
        buf.push(Value::Int(2));
        pool.release(buf);
        assert_eq!(pool.available(), 1);

        let again = pool.acquire(2);
        assert!(again.is_empty());
        assert!(again.capacity() >= 2);
        assert_eq!(pool.reused(), 1);
    }

    #[test]
    fn test_too_small_buffers_are_not_handed_out() {
        let mut pool = ArgPool::new();
        pool.release(Vec::with_capacity(1));
        let buf = pool.acquire(8);
        assert!(buf.capacity() >= 8);
        assert_eq!(pool.reused(), 0);
    }
}
