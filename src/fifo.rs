use std::collections::VecDeque;

#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Fifo<T> {
    inner: VecDeque<T>,
}

impl<T> std::fmt::Display for Fifo<T>
where
    T: std::fmt::Display,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Fifo({:>2}){:?}",
            self.inner.len(),
            self.inner
                .iter()
                .map(std::string::ToString::to_string)
                .collect::<Vec<_>>()
        )
    }
}

impl<T> Fifo<T> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: VecDeque::new(),
        }
    }

    pub fn enqueue(&mut self, value: T) {
        self.inner.push_back(value);
    }

    pub fn dequeue(&mut self) -> Option<T> {
        self.inner.pop_front()
    }

    /// Puts `value` back at the head, e.g. after it could not be sent.
    pub fn requeue(&mut self, value: T) {
        self.inner.push_front(value);
    }

    #[must_use]
    pub fn first(&self) -> Option<&T> {
        self.inner.front()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::Fifo;

    #[test]
    fn requeue_restores_head() {
        let mut fifo = Fifo::new();
        fifo.enqueue(1);
        fifo.enqueue(2);
        let head = fifo.dequeue().unwrap();
        fifo.requeue(head);
        assert_eq!(fifo.first(), Some(&1));
        assert_eq!(fifo.len(), 2);
        assert_eq!(fifo.to_string(), "Fifo( 2)[\"1\", \"2\"]");
    }
}
