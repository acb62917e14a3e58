use fxhash::FxHashMap;

/// Run-scoped record of every structural change, so that the same change made independently in
/// two genomes carries the same id
#[derive(Debug, Clone, Default)]
pub struct InnovationRegistry {
    head: usize,
    seen: FxHashMap<(usize, usize), usize>,
    neuron_head: usize,
    splits: FxHashMap<usize, usize>,
}

impl InnovationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Innovation id of the connection `source -> target`, allocating the next id if the pair is
    /// new
    pub fn get_or_create(&mut self, source: usize, target: usize) -> usize {
        match self.seen.get(&(source, target)) {
            Some(n) => *n,
            None => {
                let n = self.head;
                self.head += 1;
                self.seen.insert((source, target), n);
                n
            }
        }
    }

    /// Neuron id for a split of the connection with `innovation`
    pub fn split_neuron(&mut self, innovation: usize) -> usize {
        match self.splits.get(&innovation) {
            Some(n) => *n,
            None => {
                let n = self.fresh_neuron();
                self.splits.insert(innovation, n);
                n
            }
        }
    }

    pub fn fresh_neuron(&mut self) -> usize {
        let n = self.neuron_head;
        self.neuron_head += 1;
        n
    }

    /// Mark neuron ids `0..count` as taken
    pub fn reserve_neurons(&mut self, count: usize) {
        self.neuron_head = self.neuron_head.max(count);
    }

    /// Next innovation id to be handed out
    pub fn head(&self) -> usize {
        self.head
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_get_or_create() {
        let mut registry = InnovationRegistry::new();
        assert_eq!(registry.head(), 0);
        assert_eq!(registry.get_or_create(0, 1), 0);
        assert_eq!(registry.get_or_create(1, 2), 1);
        assert_eq!(registry.get_or_create(0, 1), 0);
        assert_eq!(registry.get_or_create(1, 0), 2);
        assert_eq!(registry.head(), 3);
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn test_deterministic_across_runs() {
        let pairs = [(0, 3), (1, 3), (2, 3), (0, 4), (4, 3), (1, 3)];
        let ids = |mut r: InnovationRegistry| {
            pairs
                .iter()
                .map(|(s, t)| r.get_or_create(*s, *t))
                .collect::<Vec<_>>()
        };
        assert_eq!(ids(InnovationRegistry::new()), ids(InnovationRegistry::new()));
        assert_eq!(ids(InnovationRegistry::new()), vec![0, 1, 2, 3, 4, 1]);
    }

    #[test]
    fn test_split_neuron() {
        let mut registry = InnovationRegistry::new();
        registry.reserve_neurons(4);
        assert_eq!(registry.split_neuron(0), 4);
        assert_eq!(registry.split_neuron(2), 5);
        assert_eq!(registry.split_neuron(0), 4);
        assert_eq!(registry.fresh_neuron(), 6);
        assert_eq!(registry.split_neuron(7), 7);
    }

    #[test]
    fn test_reserve_never_shrinks() {
        let mut registry = InnovationRegistry::new();
        registry.reserve_neurons(10);
        registry.reserve_neurons(3);
        assert_eq!(registry.fresh_neuron(), 10);
    }

    #[test]
    fn test_empty() {
        let mut registry = InnovationRegistry::new();
        assert!(registry.is_empty());
        registry.split_neuron(0);
        assert!(registry.is_empty());
        registry.get_or_create(0, 0);
        assert!(!registry.is_empty());
    }
}
