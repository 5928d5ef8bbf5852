/// Hands out the ids shared by steps, suites and runs.
///
/// One counter is threaded through segmentation and every parse of a job log, so ids
/// are strictly increasing in allocation order and never reused.
#[derive(Debug, Clone)]
pub struct IdCounter {
    next: u64,
}

impl IdCounter {
    pub fn new() -> Self {
        Self::starting_at(1)
    }

    pub fn starting_at(first: u64) -> Self {
        Self { next: first }
    }

    pub fn allocate(&mut self) -> u64 {
        let id = self.next;
        self.next += 1;
        id
    }

    /// The id the next call to [`IdCounter::allocate`] will return.
    pub fn peek(&self) -> u64 {
        self.next
    }
}

impl Default for IdCounter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_at_one() {
        let mut ids = IdCounter::new();
        assert_eq!(ids.allocate(), 1);
        assert_eq!(ids.allocate(), 2);
    }

    #[test]
    fn peek_does_not_consume() {
        let mut ids = IdCounter::starting_at(10);
        assert_eq!(ids.peek(), 10);
        assert_eq!(ids.peek(), 10);
        assert_eq!(ids.allocate(), 10);
        assert_eq!(ids.peek(), 11);
    }
}
